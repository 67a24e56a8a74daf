use std::borrow::Cow;

use url::Url;
use validator::ValidationError;

pub fn validate_is_absolute_url<'a, T>(url: T) -> Result<(), ValidationError>
where
    T: Into<Cow<'a, str>>,
{
    parse_absolute_url(url.into().as_ref())
        .map(drop)
        .map_err(|_| ValidationError::new("URL must be absolute"))
}

#[must_use]
pub fn value_parser_parse_absolute_url_as_url() -> impl clap::builder::TypedValueParser {
    move |s: &str| parse_absolute_url(s)
}

fn parse_absolute_url(s: &str) -> Result<Url, String> {
    let parsed = match Url::parse(s) {
        Ok(parsed) => parsed,
        Err(e) => return Err(format!("URL must be absolute: {e}")),
    };

    if parsed.cannot_be_a_base() {
        return Err("URL must be absolute".to_string());
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls() {
        assert!(validate_is_absolute_url("https://bot.example.com/webhook").is_ok());
        assert!(validate_is_absolute_url("/webhook").is_err());
        assert!(validate_is_absolute_url("mailto:someone@example.com").is_err());
    }
}
