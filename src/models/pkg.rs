//! The per-package model (spec §3): one parsed, extracted RPM.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use super::dep_rule::DepRule;
use super::file::File;

/// Index of a [`Pkg`] within `RunCtx::packages`. Plain `usize` rather than
/// a newtype wrapper kept deliberately cheap: every producer/consumer of
/// it lives inside this crate, so the extra type-safety of a newtype
/// wouldn't catch anything a code review wouldn't.
pub type PkgId = usize;

/// One extracted, parsed RPM package (source or binary) participating in
/// a run, belonging to either the "before" or "after" build.
#[derive(Debug)]
pub struct Pkg {
    pub id: PkgId,
    /// Which side of the comparison this package was extracted from.
    pub side: BuildSide,
    /// The parsed RPM header/payload. Reference-counted because `File`
    /// entries belonging to this package also hold a clone of it (spec
    /// §3 "a reference to its owning package's header").
    pub header: Arc<rpm::Package>,
    pub name: String,
    pub epoch: u32,
    pub version: String,
    pub release: String,
    pub arch: String,
    pub vendor: Option<String>,
    pub buildhost: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    /// `Source` tags, in RPM tag order (spec §4.1 fileinfo/rebaseable
    /// context, §4.6 patches).
    pub source: Vec<String>,
    /// `Patch` tags, in RPM tag order.
    pub patch: Vec<String>,
    pub is_source_rpm: bool,
    pub nevra: String,
    /// Directory under the run's workdir this package's payload was
    /// extracted into.
    pub extract_root: PathBuf,
    pub files: Vec<File>,
    /// Dependency rows, computed lazily on first access and cached —
    /// most packages in a run are never asked for their dep rules (only
    /// the `rpmdeps` inspection and a few peers need them), so eagerly
    /// collecting all eight tags for every package would be wasted work.
    dep_rules: RefCell<Option<Vec<DepRule>>>,
}

/// Which build a [`Pkg`] was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSide {
    Before,
    After,
}

impl Pkg {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PkgId,
        side: BuildSide,
        header: Arc<rpm::Package>,
        name: String,
        epoch: u32,
        version: String,
        release: String,
        arch: String,
        extract_root: PathBuf,
    ) -> Self {
        let nevra = if epoch == 0 {
            format!("{name}-{version}-{release}.{arch}")
        } else {
            format!("{epoch}:{name}-{version}-{release}.{arch}")
        };
        Pkg {
            id,
            side,
            header,
            name,
            epoch,
            version,
            release,
            arch,
            vendor: None,
            buildhost: None,
            summary: None,
            description: None,
            license: None,
            source: Vec::new(),
            patch: Vec::new(),
            is_source_rpm: false,
            nevra,
            extract_root,
            files: Vec::new(),
            dep_rules: RefCell::new(None),
        }
    }

    /// Return this package's dependency rules, computing and caching
    /// them on first call via `collect`.
    pub fn dep_rules_with<F>(&self, collect: F) -> Vec<DepRule>
    where
        F: FnOnce(&rpm::Package) -> Vec<DepRule>,
    {
        if self.dep_rules.borrow().is_none() {
            let rules = collect(&self.header);
            *self.dep_rules.borrow_mut() = Some(rules);
        }
        self.dep_rules.borrow().clone().unwrap()
    }

    pub fn invalidate_dep_rule_cache(&self) {
        *self.dep_rules.borrow_mut() = None;
    }

    /// (name, arch) identity used for package-level peer matching
    /// (spec §4.2 step 5).
    pub fn peer_key(&self) -> (&str, &str) {
        (&self.name, &self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nevra_omits_zero_epoch() {
        assert_eq!(
            format_nevra("foo", 0, "1.0", "1.el9", "x86_64"),
            "foo-1.0-1.el9.x86_64"
        );
    }

    #[test]
    fn nevra_includes_nonzero_epoch() {
        assert_eq!(
            format_nevra("foo", 2, "1.0", "1.el9", "x86_64"),
            "2:foo-1.0-1.el9.x86_64"
        );
    }

    fn format_nevra(name: &str, epoch: u32, version: &str, release: &str, arch: &str) -> String {
        if epoch == 0 {
            format!("{name}-{version}-{release}.{arch}")
        } else {
            format!("{epoch}:{name}-{version}-{release}.{arch}")
        }
    }
}
