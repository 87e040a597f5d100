use std::fmt;
use std::str::FromStr;

/// How backend failures ([`StoreError::Unavailable`](crate::storage::StoreError::Unavailable))
/// are reported to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreFailurePolicy {
    /// Report backend failures as a server error (500).
    #[default]
    Distinct,
    /// Fold backend failures into the category the call path assumes:
    /// not found (404) when reading, invalid input (400) when writing.
    Legacy,
}

impl FromStr for StoreFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distinct" => Ok(Self::Distinct),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!(
                "unknown store failure policy '{other}', expected 'distinct' or 'legacy'"
            )),
        }
    }
}

impl fmt::Display for StoreFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distinct => f.write_str("distinct"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// Adapter behaviour knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterConfig {
    pub store_failure: StoreFailurePolicy,
}
