use std::borrow::Cow;

use url::{form_urlencoded, Url};

use crate::blacklist::ParameterBlacklist;

/// Result of running a URL through the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// No blacklisted parameter was present, the URL is left untouched
    Unchanged,
    /// At least one parameter was removed
    Rewritten(String),
}
impl Sanitized {
    #[must_use]
    pub const fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten(_))
    }

    #[must_use]
    pub fn into_rewritten(self) -> Option<String> {
        match self {
            Self::Rewritten(url) => Some(url),
            Self::Unchanged => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    #[error("Malformed URL {url:?}: `{source}`")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Strip every blacklisted query parameter from `url`.
///
/// Only the query string is touched. Scheme, authority, path and fragment are
/// copied over byte for byte, as are the remaining parameters in their
/// original order. When nothing matches the URL is not rebuilt at all.
pub fn remove_tracking(url: &str, blacklist: &ParameterBlacklist) -> Result<Sanitized, SanitizeError> {
    ensure_parseable(url)?;

    let parts = UrlParts::split(url);
    let Some(query) = parts.query else {
        return Ok(Sanitized::Unchanged);
    };

    let mut removed = false;
    let mut kept = Vec::new();
    for pair in query.split('&').filter(|x| !x.is_empty()) {
        if blacklist.contains(&pair_key(pair)) {
            removed = true;
        } else {
            kept.push(pair);
        }
    }

    if !removed {
        return Ok(Sanitized::Unchanged);
    }

    let mut rewritten = String::with_capacity(url.len());
    rewritten.push_str(parts.base);
    if !kept.is_empty() {
        rewritten.push('?');
        rewritten.push_str(&kept.join("&"));
    }
    if let Some(fragment) = parts.fragment {
        rewritten.push('#');
        rewritten.push_str(fragment);
    }

    Ok(Sanitized::Rewritten(rewritten))
}

fn ensure_parseable(url: &str) -> Result<(), SanitizeError> {
    let malformed = |source| SanitizeError::MalformedUrl {
        url: url.to_string(),
        source,
    };

    match Url::parse(url) {
        Ok(_) => Ok(()),
        // Telegram also marks scheme-less links like `example.com/page?a=b`
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{url}"))
            .map(drop)
            .map_err(malformed),
        Err(e) => Err(malformed(e)),
    }
}

struct UrlParts<'a> {
    base: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}
impl<'a> UrlParts<'a> {
    fn split(url: &'a str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (url, None),
        };

        let (base, query) = match rest.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (rest, None),
        };

        Self {
            base,
            query,
            fragment,
        }
    }
}

fn pair_key(pair: &str) -> Cow<'_, str> {
    let raw_key = pair.split_once('=').map_or(pair, |(key, _)| key);

    form_urlencoded::parse(raw_key.as_bytes())
        .next()
        .map_or(Cow::Borrowed(""), |(key, _)| key)
}
