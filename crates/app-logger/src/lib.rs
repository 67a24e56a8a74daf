use std::env;

use tracing::Level;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "LINK_SANITIZER_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "LINK_SANITIZER_LOG_FORMAT";

pub const COMPONENT_LEVELS: &[(&str, Level)] = &[
    ("link_sanitizer", Level::INFO),
    ("request", Level::INFO),
    ("app_config", Level::INFO),
    ("app_logger", Level::INFO),
    ("app_sanitizer", Level::INFO),
];

/// Initialize the logger
///
/// # Panics
/// Panics if the logger fails to initialize
pub fn init() {
    init_with(COMPONENT_LEVELS.to_vec());
}

pub fn init_with<T>(levels: T)
where
    T: IntoIterator<Item = (&'static str, Level)>,
{
    let mut base_level = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .parse_lossy(default_directives(levels));

    for d in env_directives(&env::var(LOG_LEVEL_ENV).unwrap_or_default()) {
        base_level = base_level.add_directive(d);
    }

    let json = env::var(LOG_FORMAT_ENV).is_ok_and(|x| x.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(base_level);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    res.expect("setting default subscriber failed");
}

fn default_directives<T>(levels: T) -> String
where
    T: IntoIterator<Item = (&'static str, Level)>,
{
    levels
        .into_iter()
        .map(|(k, v)| {
            if k.is_empty() {
                v.to_string()
            } else {
                format!("{}={}", k, v)
            }
        })
        .fold(String::new(), |acc, a| format!("{},{}", acc, a))
}

fn env_directives(raw: &str) -> Vec<Directive> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(d) => Some(d),
            Err(e) => {
                eprintln!("Failed to parse log level directive {s:?}: {e:?}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_default_directives() {
        let directives = default_directives([("link_sanitizer", Level::INFO), ("", Level::DEBUG)]);

        assert_eq!(directives, ",link_sanitizer=INFO,DEBUG");
    }

    #[test]
    fn skips_bad_env_directives() {
        let directives = env_directives("app_sanitizer=trace, ,request=notalevel=x,warn");

        assert_eq!(directives.len(), 2);
    }
}
