use std::borrow::Cow;

use validator::ValidationError;

/// An absolute URL path such as `/webhook`, without query or fragment.
pub fn validate_is_url_path<'a, T>(path: T) -> Result<(), ValidationError>
where
    T: Into<Cow<'a, str>>,
{
    let path = path.into();

    if !path.starts_with('/') {
        return Err(ValidationError::new("Path must start with `/`"));
    }

    if path.contains(['?', '#']) || path.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(
            "Path must not contain a query, fragment or whitespace",
        ));
    }

    Ok(())
}

#[must_use]
pub fn value_parser_parse_url_path() -> impl clap::builder::TypedValueParser {
    move |s: &str| validate_is_url_path(s).map(|()| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_paths() {
        assert!(validate_is_url_path("/webhook").is_ok());
        assert!(validate_is_url_path("/bot/updates").is_ok());
        assert!(validate_is_url_path("webhook").is_err());
        assert!(validate_is_url_path("/webhook?x=1").is_err());
        assert!(validate_is_url_path("/web hook").is_err());
    }
}
