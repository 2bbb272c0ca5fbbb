//! `rpmdeps` inspection driver (spec §4.4), one of the five worked
//! examples: peers each package's dependency rules across the before/
//! after build and reports unexpected changes plus unexpanded macros.

use crate::deps::{
    ProviderFinding, annotate_cross_subpackage_providers, check_providers, collect_dep_rules,
    is_expected_change, peer_dep_rules,
};
use crate::inspections::register_inspection;
use crate::models::dep_rule::DepKind;
use crate::models::pkg::BuildSide;
use crate::models::result::ResultParams;
use crate::models::run_ctx::RunCtx;
use crate::models::severity::{Severity, WaiverAuth};
use strum::IntoEnumIterator;

const NAME: &str = "rpmdeps";

pub fn driver(ctx: &RunCtx) {
    check_cross_subpackage_providers(ctx);

    let after_subpackage_names: Vec<&str> = ctx
        .packages
        .iter()
        .filter(|p| p.side == BuildSide::After)
        .map(|p| p.name.as_str())
        .collect();

    for peer in ctx.peers.complete_peers() {
        let (Some(before_id), Some(after_id)) = (peer.before, peer.after) else { continue };
        let before_pkg = &ctx.packages[before_id];
        let after_pkg = &ctx.packages[after_id];
        let rebaseable = ctx.vendor_data.is_rebaseable(&after_pkg.name);

        for kind in DepKind::iter() {
            let mut before_rules: Vec<_> = before_pkg
                .dep_rules_with(collect_dep_rules)
                .into_iter()
                .filter(|r| r.kind == kind)
                .collect();
            let mut after_rules: Vec<_> = after_pkg
                .dep_rules_with(collect_dep_rules)
                .into_iter()
                .filter(|r| r.kind == kind)
                .collect();

            peer_dep_rules(&mut before_rules, &mut after_rules);

            for rule in &after_rules {
                if rule.has_unexpanded_macro() {
                    ctx.add_result(ResultParams {
                        severity: Severity::Bad,
                        waiver_auth: WaiverAuth::Anyone,
                        inspection: NAME.to_string(),
                        message: format!(
                            "{} has an unexpanded macro in its version: {}",
                            after_pkg.name,
                            rule.describe()
                        ),
                        remedy: Some("expand build-time macros before packaging".to_string()),
                        arch: Some(after_pkg.arch.clone()),
                        ..Default::default()
                    });
                }

                if rule.peer.is_none()
                    && !is_expected_change(rule, before_pkg, after_pkg, &after_subpackage_names, rebaseable)
                {
                    ctx.add_result(ResultParams {
                        severity: Severity::Verify,
                        waiver_auth: WaiverAuth::Anyone,
                        inspection: NAME.to_string(),
                        message: format!(
                            "{} gained new {kind}: {}",
                            after_pkg.nevra,
                            rule.describe()
                        ),
                        arch: Some(after_pkg.arch.clone()),
                        ..Default::default()
                    });
                }
            }

            for rule in &before_rules {
                if rule.peer.is_none()
                    && !is_expected_change(rule, before_pkg, after_pkg, &after_subpackage_names, rebaseable)
                {
                    ctx.add_result(ResultParams {
                        severity: Severity::Verify,
                        waiver_auth: WaiverAuth::Anyone,
                        inspection: NAME.to_string(),
                        message: format!(
                            "{} lost {kind}: {}",
                            before_pkg.nevra,
                            rule.describe()
                        ),
                        arch: Some(before_pkg.arch.clone()),
                        ..Default::default()
                    });
                }
            }
        }
    }
}

/// Cross-subpackage provider analysis and explicit-version check (spec
/// §4.3): run once per after-build, not per peer, since it compares
/// sibling subpackages rather than before/after.
fn check_cross_subpackage_providers(ctx: &RunCtx) {
    let after_pkgs: Vec<_> = ctx.packages.iter().filter(|p| p.side == BuildSide::After).collect();
    if after_pkgs.len() < 2 {
        return;
    }

    for pkg in &after_pkgs {
        let mut requires: Vec<_> = pkg
            .dep_rules_with(collect_dep_rules)
            .into_iter()
            .filter(|r| r.kind == DepKind::Requires)
            .collect();
        annotate_cross_subpackage_providers(&mut requires, &after_pkgs);

        let own_vr = format!("{}-{}", pkg.version, pkg.release);
        for rule in &requires {
            let Some(finding) = check_providers(rule, &requires, &own_vr) else { continue };
            match finding {
                ProviderFinding::MultipleProviders { capability, providers } => {
                    ctx.add_result(ResultParams {
                        severity: Severity::Verify,
                        waiver_auth: WaiverAuth::Anyone,
                        inspection: NAME.to_string(),
                        message: format!(
                            "Multiple subpackages provide '{capability}': [{}]",
                            providers.join(", ")
                        ),
                        arch: Some(pkg.arch.clone()),
                        ..Default::default()
                    });
                }
                ProviderFinding::MissingExplicitVersion { capability, provider } => {
                    ctx.add_result(ResultParams {
                        severity: Severity::Bad,
                        waiver_auth: WaiverAuth::Anyone,
                        inspection: NAME.to_string(),
                        message: format!(
                            "{} requires '{capability}', provided only by {provider}, without an explicit versioned Requires: {provider}",
                            pkg.nevra
                        ),
                        remedy: Some(format!(
                            "add Requires: {provider} = %{{version}}-%{{release}}"
                        )),
                        arch: Some(pkg.arch.clone()),
                        ..Default::default()
                    });
                }
            }
        }
    }
}

register_inspection!(2, NAME, false, driver);
