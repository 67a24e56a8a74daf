use std::collections::HashSet;

use crate::error::ConfigError;

/// Query parameter names that get stripped from links.
///
/// Never mutated after loading, so it can be shared freely between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBlacklist {
    params: HashSet<String>,
}
impl ParameterBlacklist {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the blacklist from its configured form, a JSON array of strings.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Vec<String>>(raw)
            .map(Self::new)
            .map_err(|e| ConfigError::Invalid {
                name: "url_blacklist",
                reason: e.to_string(),
            })
    }

    /// Load the blacklist from an optional configured value.
    pub fn from_config(raw: Option<&str>) -> Result<Self, ConfigError> {
        match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => Self::from_json(raw),
            _ => Err(ConfigError::Missing("url_blacklist")),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ParameterBlacklist {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}
