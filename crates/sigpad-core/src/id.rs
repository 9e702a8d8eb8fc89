use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

const PREFIX: &str = "sig_";

static NEXT: AtomicU64 = AtomicU64::new(0);

/// Opaque identifier of one placed signature, rendered as `sig_<n>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlacementId(u64);

impl PlacementId {
    /// A fresh id, unique for the life of the process.
    pub fn generate() -> Self {
        PlacementId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Parse the `sig_<n>` form echoed back by the host page.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(PlacementId)
    }
}

impl fmt::Debug for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{PREFIX}{}", self.0)
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

impl Serialize for PlacementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlacementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PlacementId::parse(&s).ok_or_else(|| D::Error::custom(format!("bad placement id {s:?}")))
    }
}
