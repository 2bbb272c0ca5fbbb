use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Result severity (spec §3 "Result"), ordered OK < Info < Verify < Bad.
///
/// `Skip` and `Diagnostic` are orthogonal to the total order: `Skip`
/// records that an inspection did not run at all, and `Diagnostic` is
/// always emitted and never suppressed or compared against the
/// threshold. [`Severity::rank`] gives the total order used for the
/// watermark; `Skip`/`Diagnostic` rank alongside `OK` so they never raise
/// it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    #[serde(rename = "OK")]
    #[strum(serialize = "OK")]
    Ok,
    Info,
    Verify,
    Bad,
    Skip,
    Diagnostic,
}

impl Severity {
    /// Position on the OK < Info < Verify < Bad total order used for the
    /// run's severity watermark (spec §3, §5, §8). `Skip` and `Diagnostic`
    /// never raise the watermark.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Ok | Severity::Skip | Severity::Diagnostic => 0,
            Severity::Info => 1,
            Severity::Verify => 2,
            Severity::Bad => 3,
        }
    }

    /// True for the two severities the watermark/ordering contract
    /// considers orthogonal rather than part of the total order.
    pub fn is_orthogonal(self) -> bool {
        matches!(self, Severity::Skip | Severity::Diagnostic)
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// Who may waive a finding (spec Glossary, §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WaiverAuth {
    NotWaivable,
    Anyone,
    Security,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order_matches_spec() {
        assert!(Severity::Ok < Severity::Info);
        assert!(Severity::Info < Severity::Verify);
        assert!(Severity::Verify < Severity::Bad);
    }

    #[test]
    fn skip_and_diagnostic_never_raise_watermark() {
        assert_eq!(Severity::Skip.rank(), Severity::Ok.rank());
        assert_eq!(Severity::Diagnostic.rank(), Severity::Ok.rank());
        assert!(Severity::Skip.is_orthogonal());
        assert!(Severity::Diagnostic.is_orthogonal());
        assert!(!Severity::Bad.is_orthogonal());
    }
}
