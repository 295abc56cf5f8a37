use serde::{Deserialize, Serialize};

/// One key -> destination mapping, exactly as it appears in the store file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenerRecord {
    #[serde(rename = "Key")]
    pub key: String,

    /// Target URL. Not validated; an empty string is a valid (unset) destination.
    #[serde(rename = "Dest", default)]
    pub destination: String,
}

impl ShortenerRecord {
    pub fn new(key: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            destination: destination.into(),
        }
    }
}

/// Keys are one or more ASCII letters or digits (`^[a-zA-Z0-9]+$`).
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphanumeric())
}
