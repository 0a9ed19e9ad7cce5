//! The pod value type

use serde::{Deserialize, Serialize};

/// A third-party dependency tracked as a git submodule plus descriptive metadata.
///
/// Two pods with the same `name` refer to the same dependency slot; the
/// remaining fields are free text and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    /// Submodule path inside the repository, also the pod's identifier
    pub name: String,
    /// Git fetch location
    pub url: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub website: String,
}

impl Pod {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Pod names must already be lowercase to be valid
    pub fn has_valid_name(&self) -> bool {
        is_valid_name(&self.name)
    }

    /// First line of the description, for listings
    pub fn short_description(&self) -> &str {
        self.description.lines().next().unwrap_or("")
    }
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    name == name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validity() {
        assert!(Pod::new("qtcurl", "u").has_valid_name());
        assert!(Pod::new("qt-json_2", "u").has_valid_name());
        assert!(!Pod::new("QtCurl", "u").has_valid_name());
    }

    #[test]
    fn test_short_description() {
        let mut pod = Pod::new("qtcurl", "u");
        assert_eq!(pod.short_description(), "");

        pod.description = "Curl wrapper\nMore details".to_string();
        assert_eq!(pod.short_description(), "Curl wrapper");
    }
}
