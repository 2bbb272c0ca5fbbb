//! Black-box tests for spec §8's "Concrete end-to-end scenarios",
//! exercised against the public, `Pkg`/`RunCtx`-independent analyzer and
//! dependency-classification API (see SPEC_FULL.md §A.4: real
//! `Arc<rpm::Package>` fixtures aren't vendored into the repo, so these
//! scenarios are driven through the pure functions each inspection
//! driver calls into rather than through a full extracted package tree).

use rpminspect::analyzers::abi::{build_args, AbiCompareArgs, ToolStatus};
use rpminspect::analyzers::elf::{lost_fortification, ElfFindings};
use rpminspect::analyzers::kmod::compare_module_aliases;
use rpminspect::analyzers::macros::{expand_patch_macros, extract_macro_defs};
use rpminspect::analyzers::patch::{detect_format, is_corrupt, DiffFormat};
use rpminspect::config::{parse_document, parse_mode10};
use rpminspect::deps::{check_providers, ProviderFinding};
use rpminspect::models::dep_rule::{DepKind, DepOp, DepRule};
use rpminspect::Severity;
use std::collections::HashMap;

/// Scenario 2: a rebuilt shared library drops `__sprintf_chk` in favor
/// of the plain, unfortified `sprintf` — the `elf` inspection's core
/// fortification-loss check.
#[test]
fn scenario_2_lost_fortification_is_detected() {
    let before = ElfFindings {
        imported_symbols: vec!["__sprintf_chk".into(), "__memcpy_chk".into()],
        ..Default::default()
    };
    let after = ElfFindings {
        imported_symbols: vec!["sprintf".into(), "__memcpy_chk".into()],
        ..Default::default()
    };

    let regressions = lost_fortification(&before, &after);
    assert_eq!(regressions.len(), 1);
    assert_eq!(regressions[0].chk_symbol, "__sprintf_chk");
    assert_eq!(regressions[0].plain_symbol, "sprintf");
}

/// Scenario 3's patch-filename resolution: a `Patch:` tag recorded with
/// an unexpanded `%{name}`/`%{version}` macro, plus a spec-local
/// `%define`, resolves to the literal filename an extracted source RPM
/// would actually carry.
#[test]
fn patch_filename_macro_expansion_resolves_spec_macros() {
    let spec_text = "\
%define patchver 3
Name: foo
Version: 1.2
Patch0: %{name}-%{version}-fix%{patchver}.patch
%changelog
";
    let defs = extract_macro_defs(spec_text);
    let resolved = expand_patch_macros("%{name}-%{version}-fix%{patchver}.patch", &defs, "foo", "1.2");
    assert_eq!(resolved, "foo-1.2-fix3.patch");
}

#[test]
fn patch_integrity_checks_corruption_and_format() {
    assert!(is_corrupt(b"ab"));
    assert!(!is_corrupt(b"abcd"));

    let unified = "--- a/foo.c\n+++ b/foo.c\n@@ -1,3 +1,4 @@\n context\n+added\n";
    assert_eq!(detect_format(unified), DiffFormat::Unified);

    let garbage = "this is not a patch at all, just prose\nwith several lines\nof nothing\n";
    assert_eq!(detect_format(garbage), DiffFormat::Unknown);
}

/// Scenario 5: a `Requires: libfoo.so.N()(64bit)` satisfied by exactly
/// one subpackage without an explicit version pin is `Bad`; satisfied
/// by more than one subpackage is `Verify`.
#[test]
fn scenario_5_provider_analysis_distinguishes_missing_pin_from_multiple_providers() {
    let mut single_provider = DepRule::new(DepKind::Requires, "libfoo.so.1()(64bit)", DepOp::None, None);
    single_provider.providers.push("foo-libs".to_string());

    let own_requires = vec![DepRule::new(DepKind::Requires, "bar", DepOp::None, None)];
    let finding = check_providers(&single_provider, &own_requires, "1.0-1.el9");
    assert_eq!(
        finding,
        Some(ProviderFinding::MissingExplicitVersion {
            capability: "libfoo.so.1()(64bit)".to_string(),
            provider: "foo-libs".to_string(),
        })
    );

    let mut pinned = single_provider.clone();
    let pinning_requires = vec![DepRule::new(
        DepKind::Requires,
        "foo-libs",
        DepOp::Eq,
        Some("1.0-1.el9".to_string()),
    )];
    pinned.providers = vec!["foo-libs".to_string()];
    assert_eq!(check_providers(&pinned, &pinning_requires, "1.0-1.el9"), None);

    let mut multi_provider = DepRule::new(DepKind::Requires, "libfoo.so.1()(64bit)", DepOp::None, None);
    multi_provider.providers = vec!["foo-libs".to_string(), "foo-compat-libs".to_string()];
    assert_eq!(
        check_providers(&multi_provider, &own_requires, "1.0-1.el9"),
        Some(ProviderFinding::MultipleProviders {
            capability: "libfoo.so.1()(64bit)".to_string(),
            providers: vec!["foo-libs".to_string(), "foo-compat-libs".to_string()],
        })
    );
}

/// Scenario 6: cxgb3's kernel module alias relaxes a fixed subdevice ID
/// to a wildcard between builds; the relaxed alias should not be
/// reported as a regression.
#[test]
fn scenario_6_relaxed_kmod_alias_is_not_a_regression() {
    let mut before = HashMap::new();
    before.insert(
        "cxgb3".to_string(),
        vec!["pci:v00001425d00000020sv*sd00000001bc*sc*i*".to_string()],
    );
    let mut after = HashMap::new();
    after.insert(
        "cxgb3".to_string(),
        vec!["pci:v00001425d00000020sv*sd*bc*sc*i*".to_string()],
    );

    assert!(compare_module_aliases(&before, &after).is_empty());
}

/// §8 boundary: `abidiff`/`kmidiff` usage errors (e.g. a missing debug
/// package) decode distinctly from an outright tool crash, and the
/// argument vector carries the suppression/debug-info flags the
/// inspection configures.
#[test]
fn abi_tool_usage_error_is_distinct_from_tool_crash() {
    let usage_error = ToolStatus::from_exit_code(0b10);
    assert!(usage_error.usage_error);
    assert!(!usage_error.tool_error);

    let crashed = ToolStatus::from_exit_code(0b01);
    assert!(crashed.tool_error);
    assert!(!crashed.usage_error);

    let incompatible = ToolStatus::from_exit_code(0b1100);
    assert!(incompatible.abi_incompatible);
    assert!(incompatible.abi_changed);

    let args = build_args(&AbiCompareArgs {
        before: "/work/before/libfoo.so.1",
        after: "/work/after/libfoo.so.1",
        before_debuginfo: Some("/work/before/debug"),
        after_debuginfo: Some("/work/after/debug"),
        suppression_file: Some("/etc/rpminspect/suppressions"),
        headers_dir: None,
        extra_args: &[],
    });
    assert!(args.contains(&"--suppressions".to_string()));
    assert!(args.iter().any(|a| a == "/etc/rpminspect/suppressions"));
}

/// §8 boundary: `size_threshold == -1` (spelled `info`/`info-only` in the
/// config document) makes every changed-file size diff informational.
#[test]
fn filesize_info_only_threshold_parses_from_yaml() {
    let cfg = parse_document("filesize:\n  size_threshold: info-only\n").unwrap();
    assert_eq!(cfg.filesize.size_threshold, -1);

    let cfg = parse_document("filesize:\n  size_threshold: 1024\n").unwrap();
    assert_eq!(cfg.filesize.size_threshold, 1024);
}

/// §8 boundary: a mode string of any length other than 10 is malformed
/// and parses to mode 0 rather than failing the vendor-data load.
#[test]
fn fileinfo_mode_string_boundary() {
    assert_eq!(parse_mode10("-rwxr-xr-x"), 0o100755);
    assert_eq!(parse_mode10("-rwxr-xr-"), 0);
    assert_eq!(parse_mode10(""), 0);
}

/// The severity total order underlies every threshold/watermark
/// decision in the run; `Skip`/`Diagnostic` never participate in it.
#[test]
fn severity_total_order_and_orthogonal_members() {
    assert!(Severity::Ok < Severity::Info);
    assert!(Severity::Info < Severity::Verify);
    assert!(Severity::Verify < Severity::Bad);
    assert!(Severity::Skip.is_orthogonal());
    assert!(Severity::Diagnostic.is_orthogonal());
    assert_eq!(Severity::Skip.rank(), Severity::Ok.rank());
}
