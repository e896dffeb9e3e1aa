use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque record identifier.
///
/// Ids are assigned once at creation time and never reused. The inner
/// text is treated as opaque by every store: there is no numeric
/// auto-increment and no ordering semantics beyond lexicographic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh id.
    #[must_use]
    pub fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an externally supplied id without validation. Used when
    /// ingesting legacy records that already carry an identity.
    #[must_use]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::RecordId;

    #[test]
    fn fresh_ids_are_distinct() {
        let a = RecordId::fresh();
        let b = RecordId::fresh();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn unchecked_preserves_text() {
        let id = RecordId::new_unchecked("legacy-42");
        assert_eq!(id.to_string(), "legacy-42");
    }

    #[test]
    fn serializes_transparently() {
        let id = RecordId::new_unchecked("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
