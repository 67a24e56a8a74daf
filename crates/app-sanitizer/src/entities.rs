use std::cmp::Ordering;

use tracing::{trace, warn};

use crate::message::{InboundMessage, MessageEntity};

pub const URL_ENTITY_KIND: &str = "url";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    #[error("Message has url entities but no text")]
    MissingText,
    #[error("Entity span at {offset} with length {length} is not a valid span")]
    InvalidSpan { offset: i64, length: i64 },
    #[error("Entity span at {offset} with length {length} is past the end of the text")]
    OutOfRange { offset: i64, length: i64 },
    #[error("Entity span at {offset} with length {length} splits a character")]
    SplitsCharacter { offset: i64, length: i64 },
}

/// URLs marked by the message's `url` entities, in the order they appear in the text.
///
/// Extraction is best-effort: entities that can't be resolved are skipped with a
/// warning and never fail the message.
#[tracing::instrument(skip_all, fields(msg = %msg.message_id))]
pub fn urls_in_message(msg: &InboundMessage) -> Vec<String> {
    let (text, entities) = msg.annotated_text();

    let mut url_entities = entities
        .iter()
        .filter(|x| x.kind == URL_ENTITY_KIND)
        .collect::<Vec<_>>();
    url_entities.sort_by_key(|x| x.offset);

    let Some(text) = text else {
        if !url_entities.is_empty() {
            warn!(err = %EntityError::MissingText, "Skipping url entities");
        }
        return Vec::new();
    };

    let urls = url_entities
        .into_iter()
        .filter_map(|entity| match entity_text(text, entity) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!(?entity, err = %e, "Skipping malformed url entity");
                None
            }
        })
        .collect::<Vec<_>>();

    trace!(?urls, "Extracted urls");

    urls
}

/// Slice the text covered by an entity.
///
/// Entity offsets count UTF-16 code units, so they are translated to byte
/// indices before slicing.
pub fn entity_text<'a>(text: &'a str, entity: &MessageEntity) -> Result<&'a str, EntityError> {
    let (offset, length) = (entity.offset, entity.length);

    let (start, end) = match (usize::try_from(offset), usize::try_from(length)) {
        (Ok(start), Ok(len)) if len > 0 => match start.checked_add(len) {
            Some(end) => (start, end),
            None => return Err(EntityError::InvalidSpan { offset, length }),
        },
        _ => return Err(EntityError::InvalidSpan { offset, length }),
    };

    let resolve = |pos| match utf16_boundary(text, pos) {
        Boundary::At(idx) => Ok(idx),
        Boundary::Inside => Err(EntityError::SplitsCharacter { offset, length }),
        Boundary::Past => Err(EntityError::OutOfRange { offset, length }),
    };

    let start = resolve(start)?;
    let end = resolve(end)?;

    Ok(&text[start..end])
}

enum Boundary {
    At(usize),
    Inside,
    Past,
}

fn utf16_boundary(text: &str, pos: usize) -> Boundary {
    let mut units = 0;

    for (idx, ch) in text.char_indices() {
        match units.cmp(&pos) {
            Ordering::Equal => return Boundary::At(idx),
            Ordering::Greater => return Boundary::Inside,
            Ordering::Less => {}
        }

        units += ch.len_utf16();
    }

    match units.cmp(&pos) {
        Ordering::Equal => Boundary::At(text.len()),
        Ordering::Greater => Boundary::Inside,
        Ordering::Less => Boundary::Past,
    }
}
