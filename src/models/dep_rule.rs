//! Normalized representation of an RPM dependency row (spec §3, §4.3).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Which of the eight RPM dependency tags a [`DepRule`] came from.
///
/// Modeled as a single exhaustive enum rather than the original's
/// tag-dispatched if/else ladder (spec §9 design note): the collection
/// routine becomes a loop over `DepKind::iter()`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum DepKind {
    Requires,
    Provides,
    Conflicts,
    Obsoletes,
    Enhances,
    Recommends,
    Suggests,
    Supplements,
}

/// Version-comparison operator decoded from RPM sense flags (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum DepOp {
    #[strum(serialize = "")]
    None,
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
}

/// One normalized dependency row, peerable across builds (spec §3, §4.3).
#[derive(Debug, Clone)]
pub struct DepRule {
    pub kind: DepKind,
    pub name: String,
    pub op: DepOp,
    pub version: Option<String>,
    /// Tracks an "expected change" classification (rich dep or package's
    /// own explicit `Requires: pkg = %{version}-%{release}`-style rule).
    pub explicit: bool,
    /// Rich (boolean) dependency syntax, e.g. `(foo and bar)`.
    pub rich: bool,
    /// Subpackage names known to provide `name` (populated by
    /// cross-subpackage provider analysis, spec §4.3).
    pub providers: Vec<String>,
    /// Index into the peer `Pkg`'s dep-rule vector of the same `kind`,
    /// once peered. Symmetric: if `a.peer == Some(i)` points at `b`, then
    /// `b.peer` points back at `a`'s own index.
    pub peer: Option<usize>,
}

impl DepRule {
    pub fn new(kind: DepKind, name: impl Into<String>, op: DepOp, version: Option<String>) -> Self {
        DepRule {
            kind,
            name: name.into(),
            op,
            version,
            explicit: false,
            rich: false,
            providers: Vec::new(),
            peer: None,
        }
    }

    /// Human-readable form used in result messages, e.g. `Requires: foo >= 1.0`.
    pub fn describe(&self) -> String {
        let mut s = format!("{}: {}", self.kind, self.name);
        if self.op != DepOp::None
            && let Some(v) = &self.version
        {
            s.push_str(&format!(" {} {}", self.op, v));
        }
        s
    }

    /// True if `version` still contains an unexpanded RPM macro token
    /// (spec §4.3 "Macro unexpansion diagnostic").
    pub fn has_unexpanded_macro(&self) -> bool {
        self.version
            .as_deref()
            .is_some_and(|v| v.contains("%{") && v.contains('}'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_includes_operator_and_version() {
        let r = DepRule::new(DepKind::Requires, "libfoo.so.0()(64bit)", DepOp::Ge, Some("1.0".into()));
        assert_eq!(r.describe(), "Requires: libfoo.so.0()(64bit) >= 1.0");
    }

    #[test]
    fn describe_without_version() {
        let r = DepRule::new(DepKind::Provides, "bash", DepOp::None, None);
        assert_eq!(r.describe(), "Provides: bash");
    }

    #[test]
    fn detects_unexpanded_macro() {
        let r = DepRule::new(DepKind::Requires, "baz", DepOp::Eq, Some("%{version}".into()));
        assert!(r.has_unexpanded_macro());
        let r2 = DepRule::new(DepKind::Requires, "baz", DepOp::Eq, Some("1.0".into()));
        assert!(!r2.has_unexpanded_macro());
    }
}
