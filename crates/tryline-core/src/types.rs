//! Shared types for stream selection.

use serde::{Deserialize, Serialize};

/// Which variant to pick from the bandwidth-ascending stream list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualitySelection {
    /// Ordinal position in the ascending list (0 = lowest bandwidth).
    Index(usize),
    /// The last (highest-bandwidth) variant.
    Highest,
}

impl QualitySelection {
    /// The index this selection resolves to for a list of `len` variants,
    /// or `None` when out of range.
    pub const fn resolve(self, len: usize) -> Option<usize> {
        match self {
            Self::Index(i) if i < len => Some(i),
            Self::Highest if len > 0 => Some(len - 1),
            _ => None,
        }
    }

    /// The requested position as a signed index for diagnostics
    /// (`Highest` reports as -1, matching the host setting sentinel).
    pub const fn as_requested(self) -> i64 {
        match self {
            Self::Index(i) => i as i64,
            Self::Highest => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_index() {
        assert_eq!(QualitySelection::Index(0).resolve(3), Some(0));
        assert_eq!(QualitySelection::Index(2).resolve(3), Some(2));
        assert_eq!(QualitySelection::Index(3).resolve(3), None);
    }

    #[test]
    fn test_resolve_highest() {
        assert_eq!(QualitySelection::Highest.resolve(3), Some(2));
        assert_eq!(QualitySelection::Highest.resolve(1), Some(0));
        assert_eq!(QualitySelection::Highest.resolve(0), None);
    }

    #[test]
    fn test_requested_sentinel() {
        assert_eq!(QualitySelection::Highest.as_requested(), -1);
        assert_eq!(QualitySelection::Index(4).as_requested(), 4);
    }
}
