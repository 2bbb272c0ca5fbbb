//! Dependency model: collecting, filtering, peering, and classifying
//! RPM dependency rows (spec §4.3).

mod filter;
mod peer;

pub use filter::is_noise_dependency;
pub use peer::peer_dep_rules;

use std::collections::HashMap;

use crate::models::dep_rule::{DepKind, DepOp, DepRule};
use crate::models::pkg::Pkg;

/// Name, version, release, and epoch of the package a dependency row
/// belongs to — all `is_expected_change` needs, kept separate from `Pkg`
/// so the classification logic can be unit tested without constructing a
/// real RPM header.
#[derive(Debug, Clone, Copy)]
pub struct PkgIdentity<'a> {
    pub name: &'a str,
    pub epoch: u32,
    pub version: &'a str,
    pub release: &'a str,
}

impl<'a> From<&'a Pkg> for PkgIdentity<'a> {
    fn from(pkg: &'a Pkg) -> Self {
        PkgIdentity { name: &pkg.name, epoch: pkg.epoch, version: &pkg.version, release: &pkg.release }
    }
}

/// Whether `version` equals `vr` (`version-release`) or `evr`
/// (`epoch:version-release`), optionally followed by a trailing
/// `.<arch>` or `+<suffix>` tag (spec §4.3 condition 4, e.g. a dependency
/// pinned to `2.0-1.x86_64` or `2.0-1+debug`).
fn version_matches_own(version: &str, vr: &str, evr: &str) -> bool {
    let tolerance_ok = |rest: &str| {
        rest.is_empty()
            || rest.strip_prefix('.').is_some_and(|s| !s.is_empty() && !s.contains(['.', '+']))
            || rest.strip_prefix('+').is_some_and(|s| !s.is_empty())
    };
    [vr, evr].into_iter().any(|base| version.strip_prefix(base).is_some_and(tolerance_ok))
}

/// RPM sense-flag bits relevant to version comparison, mirrored from
/// `rpm`'s own `DependencyFlags` (teacher's `rpm_parser.rs::format_rpm_requirement`
/// decodes the same bits for its own, simpler, purposes).
const SENSE_LESS: u32 = 1 << 1;
const SENSE_GREATER: u32 = 1 << 2;
const SENSE_EQUAL: u32 = 1 << 3;

fn decode_op(flags: u32) -> DepOp {
    let less = flags & SENSE_LESS != 0;
    let greater = flags & SENSE_GREATER != 0;
    let equal = flags & SENSE_EQUAL != 0;
    match (less, greater, equal) {
        (true, false, true) => DepOp::Le,
        (false, true, true) => DepOp::Ge,
        (true, false, false) => DepOp::Lt,
        (false, true, false) => DepOp::Gt,
        (false, false, true) => DepOp::Eq,
        _ => DepOp::None,
    }
}

/// Collect every non-noise dependency row across all eight tags for one
/// package's header, in tag-then-array order.
pub fn collect_dep_rules(header: &rpm::Package) -> Vec<DepRule> {
    let kinds = [
        DepKind::Requires,
        DepKind::Provides,
        DepKind::Conflicts,
        DepKind::Obsoletes,
        DepKind::Enhances,
        DepKind::Recommends,
        DepKind::Suggests,
        DepKind::Supplements,
    ];

    let own_name = header.metadata.get_name().unwrap_or_default();
    let own_version = header.metadata.get_version().unwrap_or_default();
    let own_release = header.metadata.get_release().unwrap_or_default();
    let own_epoch = header.metadata.get_epoch().unwrap_or(0);
    let own_vr = format!("{own_version}-{own_release}");
    let own_evr = format!("{own_epoch}:{own_version}-{own_release}");

    let mut rules = Vec::new();
    for kind in kinds {
        for dep in header_deps_for(header, kind) {
            if is_noise_dependency(&dep.name) {
                continue;
            }
            let op = decode_op(dep.flags);
            let rich = dep.name.starts_with('(');
            let mut rule = DepRule::new(kind, dep.name, op, (!dep.version.is_empty()).then_some(dep.version));
            rule.rich = rich;
            // The package's own explicit pin on itself, e.g.
            // `Requires: pkg = %{version}-%{release}` (spec §4.3
            // "expected change classification", condition 2).
            if kind == DepKind::Requires
                && op == DepOp::Eq
                && rule.name == own_name
                && let Some(v) = rule.version.as_deref()
                && version_matches_own(v, &own_vr, &own_evr)
            {
                rule.explicit = true;
            }
            rules.push(rule);
        }
    }
    rules
}

/// One raw dependency row as read off the header, before classification.
struct RawDep {
    name: String,
    version: String,
    flags: u32,
}

fn header_deps_for(header: &rpm::Package, kind: DepKind) -> Vec<RawDep> {
    let entries = match kind {
        DepKind::Requires => header.metadata.get_requires(),
        DepKind::Provides => header.metadata.get_provides(),
        DepKind::Conflicts => header.metadata.get_conflicts(),
        DepKind::Obsoletes => header.metadata.get_obsoletes(),
        DepKind::Enhances => header.metadata.get_enhances(),
        DepKind::Recommends => header.metadata.get_recommends(),
        DepKind::Suggests => header.metadata.get_suggests(),
        DepKind::Supplements => header.metadata.get_supplements(),
    };
    match entries {
        Ok(deps) => deps
            .into_iter()
            .map(|d| RawDep { name: d.name, version: d.version, flags: d.flags.bits() })
            .collect(),
        Err(e) => {
            log::debug!("no {kind} tag present ({e})");
            Vec::new()
        }
    }
}

/// Cross-subpackage shared-library provider analysis (spec §4.3): for
/// every `Requires: libfoo.so.N()(bit)`-shaped rule in `rules`, record
/// which of `subpackage_names` advertises a matching `Provides` so the
/// `dsodeps`/`rpmdeps` inspections can flag a dependency satisfied by
/// more than one subpackage.
pub fn annotate_cross_subpackage_providers(
    rules: &mut [DepRule],
    subpackages: &[&Pkg],
) {
    let provides_by_pkg: HashMap<&str, Vec<String>> = subpackages
        .iter()
        .map(|pkg| {
            let names = pkg
                .dep_rules_with(collect_dep_rules)
                .into_iter()
                .filter(|r| r.kind == DepKind::Provides)
                .map(|r| strip_isa_annotation(&r.name).to_string())
                .collect::<Vec<_>>();
            (pkg.name.as_str(), names)
        })
        .collect();

    for rule in rules.iter_mut() {
        if rule.kind != DepKind::Requires || !is_shared_library(&rule.name) {
            continue;
        }
        let want = strip_isa_annotation(&rule.name);
        for (pkg_name, provided) in &provides_by_pkg {
            if provided.iter().any(|p| p == want) {
                rule.providers.push((*pkg_name).to_string());
            }
        }
    }
}

fn is_shared_library(name: &str) -> bool {
    let base = strip_isa_annotation(name);
    base.contains(".so") && (base.starts_with("lib") || base.contains("/lib"))
}

/// Strip a trailing ISA annotation like `()(64bit)` from a dependency
/// name, as `rpmbuild` appends to `Provides`/`Requires` for shared
/// libraries.
fn strip_isa_annotation(name: &str) -> &str {
    name.split("()(").next().unwrap_or(name)
}

/// Outcome of the "explicit-version check" (spec §4.3): once a
/// `Requires: libfoo.so.N()(bit)` rule has been annotated with the
/// subpackages that provide it, decide whether it's a policy violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFinding {
    /// Exactly one subpackage provides the capability, but this
    /// package carries no explicit `Requires: <provider> = version-release`
    /// pinning it.
    MissingExplicitVersion { capability: String, provider: String },
    /// More than one subpackage provides the capability.
    MultipleProviders { capability: String, providers: Vec<String> },
}

/// Apply the explicit-version check to one annotated `Requires` rule.
/// `own_requires` is the requiring package's own (unfiltered) dependency
/// rows, used to look for an explicit pin on the single-provider case.
pub fn check_providers(
    rule: &DepRule,
    own_requires: &[DepRule],
    own_version_release: &str,
) -> Option<ProviderFinding> {
    if rule.kind != DepKind::Requires || rule.providers.is_empty() {
        return None;
    }
    if rule.providers.len() > 1 {
        return Some(ProviderFinding::MultipleProviders {
            capability: rule.name.clone(),
            providers: rule.providers.clone(),
        });
    }
    let provider = &rule.providers[0];
    let has_explicit_pin = own_requires.iter().any(|r| {
        r.kind == DepKind::Requires
            && r.name == *provider
            && r.op == DepOp::Eq
            && r.version.as_deref() == Some(own_version_release)
    });
    if has_explicit_pin {
        None
    } else {
        Some(ProviderFinding::MissingExplicitVersion {
            capability: rule.name.clone(),
            provider: provider.clone(),
        })
    }
}

/// Whether a peered dependency row represents an "expected" change
/// across builds rather than one worth flagging (spec §4.3, "expected
/// change classification"): the build is a rebase, the rule is rich or
/// carries the package's own explicit version pin, its name matches a
/// known after-build subpackage, or its version string equals the
/// after-build package's own `version-release`/`epoch:version-release`.
pub fn is_expected_change<'a>(
    rule: &DepRule,
    before: impl Into<PkgIdentity<'a>>,
    after: impl Into<PkgIdentity<'a>>,
    subpackage_names: &[&str],
    rebaseable: bool,
) -> bool {
    let before = before.into();
    let after = after.into();

    if before.version != after.version || rebaseable {
        return true;
    }
    if rule.rich || rule.explicit {
        return true;
    }
    if subpackage_names.iter().any(|name| *name == rule.name) {
        return true;
    }
    let own_vr = format!("{}-{}", after.version, after.release);
    let own_evr = format!("{}:{}-{}", after.epoch, after.version, after.release);
    if let Some(v) = rule.version.as_deref()
        && version_matches_own(v, &own_vr, &own_evr)
    {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dep_rule::{DepKind, DepOp};

    #[test]
    fn decode_op_handles_all_combinations() {
        assert_eq!(decode_op(SENSE_LESS | SENSE_EQUAL), DepOp::Le);
        assert_eq!(decode_op(SENSE_GREATER | SENSE_EQUAL), DepOp::Ge);
        assert_eq!(decode_op(SENSE_LESS), DepOp::Lt);
        assert_eq!(decode_op(SENSE_GREATER), DepOp::Gt);
        assert_eq!(decode_op(SENSE_EQUAL), DepOp::Eq);
        assert_eq!(decode_op(0), DepOp::None);
    }

    #[test]
    fn strip_isa_annotation_removes_suffix() {
        assert_eq!(strip_isa_annotation("libfoo.so.0()(64bit)"), "libfoo.so.0");
        assert_eq!(strip_isa_annotation("bash"), "bash");
    }

    #[test]
    fn is_shared_library_detects_so_and_lib_prefix() {
        assert!(is_shared_library("libfoo.so.0()(64bit)"));
        assert!(!is_shared_library("bash"));
        assert!(!is_shared_library("/usr/bin/perl"));
    }

    #[test]
    fn rich_dependency_is_always_expected() {
        let rule = DepRule {
            rich: true,
            ..DepRule::new(DepKind::Requires, "(foo and bar)", DepOp::None, None)
        };
        let pkg = PkgIdentity { name: "bar", epoch: 0, version: "2.0", release: "1" };
        assert!(is_expected_change(&rule, pkg, pkg, &[], false));
    }

    #[test]
    fn explicit_dependency_is_always_expected() {
        let rule = DepRule {
            explicit: true,
            ..DepRule::new(DepKind::Requires, "bar", DepOp::Eq, Some("2.0-1".to_string()))
        };
        let pkg = PkgIdentity { name: "bar", epoch: 0, version: "2.0", release: "1" };
        assert!(is_expected_change(&rule, pkg, pkg, &[], false));
    }

    #[test]
    fn rebase_makes_every_change_expected() {
        let rule = DepRule::new(DepKind::Requires, "libfoo.so.0()(64bit)", DepOp::None, None);
        let before = PkgIdentity { name: "bar", epoch: 0, version: "1.0", release: "1" };
        let after = PkgIdentity { name: "bar", epoch: 0, version: "2.0", release: "1" };
        assert!(is_expected_change(&rule, before, after, &[], false));
    }

    #[test]
    fn vendor_rebaseable_flag_makes_every_change_expected() {
        let rule = DepRule::new(DepKind::Requires, "libfoo.so.0()(64bit)", DepOp::None, None);
        let pkg = PkgIdentity { name: "bar", epoch: 0, version: "2.0", release: "1" };
        assert!(is_expected_change(&rule, pkg, pkg, &[], true));
    }

    #[test]
    fn subpackage_name_match_is_expected() {
        let rule = DepRule::new(DepKind::Requires, "bar-libs", DepOp::None, None);
        let pkg = PkgIdentity { name: "bar", epoch: 0, version: "2.0", release: "1" };
        assert!(is_expected_change(&rule, pkg, pkg, &["bar-libs"], false));
    }

    #[test]
    fn self_reference_pinned_to_own_version_release_is_expected() {
        let rule = DepRule::new(
            DepKind::Requires,
            "bar",
            DepOp::Eq,
            Some("2.0-1".to_string()),
        );
        let pkg = PkgIdentity { name: "bar", epoch: 0, version: "2.0", release: "1" };
        assert!(is_expected_change(&rule, pkg, pkg, &[], false));
    }

    #[test]
    fn own_version_release_with_arch_suffix_tolerance_is_expected() {
        let rule = DepRule::new(DepKind::Requires, "other", DepOp::Eq, Some("2.0-1.x86_64".to_string()));
        let pkg = PkgIdentity { name: "bar", epoch: 0, version: "2.0", release: "1" };
        assert!(is_expected_change(&rule, pkg, pkg, &[], false));
    }

    #[test]
    fn epoch_qualified_own_version_release_is_expected() {
        let rule = DepRule::new(DepKind::Requires, "other", DepOp::Eq, Some("1:2.0-1+debug".to_string()));
        let pkg = PkgIdentity { name: "bar", epoch: 1, version: "2.0", release: "1" };
        assert!(is_expected_change(&rule, pkg, pkg, &[], false));
    }

    #[test]
    fn unrelated_new_dependency_is_not_expected() {
        let rule = DepRule::new(DepKind::Requires, "baz", DepOp::None, None);
        let pkg = PkgIdentity { name: "bar", epoch: 0, version: "2.0", release: "1" };
        assert!(!is_expected_change(&rule, pkg, pkg, &[], false));
    }

    #[test]
    fn multi_provider_lib_dependency_flagged() {
        // spec §8 scenario 5: Requires: libfoo.so.0()(64bit) provided by
        // both foo-libs and foo-compat, and the requiring package carries
        // Requires: foo-libs and Requires: foo-compat (no version pin on
        // either, irrelevant once there's more than one provider).
        let mut rule = DepRule::new(DepKind::Requires, "libfoo.so.0()(64bit)", DepOp::None, None);
        rule.providers = vec!["foo-libs".to_string(), "foo-compat".to_string()];
        let own_requires = vec![
            DepRule::new(DepKind::Requires, "foo-libs", DepOp::None, None),
            DepRule::new(DepKind::Requires, "foo-compat", DepOp::None, None),
        ];
        let finding = check_providers(&rule, &own_requires, "1.0-1").unwrap();
        assert_eq!(
            finding,
            ProviderFinding::MultipleProviders {
                capability: "libfoo.so.0()(64bit)".to_string(),
                providers: vec!["foo-libs".to_string(), "foo-compat".to_string()],
            }
        );
    }

    #[test]
    fn single_provider_without_explicit_pin_is_a_violation() {
        let mut rule = DepRule::new(DepKind::Requires, "libfoo.so.0()(64bit)", DepOp::None, None);
        rule.providers = vec!["foo-libs".to_string()];
        let finding = check_providers(&rule, &[], "1.0-1").unwrap();
        assert_eq!(
            finding,
            ProviderFinding::MissingExplicitVersion {
                capability: "libfoo.so.0()(64bit)".to_string(),
                provider: "foo-libs".to_string(),
            }
        );
    }

    #[test]
    fn single_provider_with_explicit_pin_is_clean() {
        let mut rule = DepRule::new(DepKind::Requires, "libfoo.so.0()(64bit)", DepOp::None, None);
        rule.providers = vec!["foo-libs".to_string()];
        let own_requires = vec![DepRule::new(
            DepKind::Requires,
            "foo-libs",
            DepOp::Eq,
            Some("1.0-1".to_string()),
        )];
        assert!(check_providers(&rule, &own_requires, "1.0-1").is_none());
    }

    #[test]
    fn rule_with_no_providers_is_not_checked() {
        let rule = DepRule::new(DepKind::Requires, "libfoo.so.0()(64bit)", DepOp::None, None);
        assert!(check_providers(&rule, &[], "1.0-1").is_none());
    }
}
