//! `patches` inspection driver (spec §4.4), one of the five worked
//! examples: resolves macro-expanded patch filenames, flags corrupt
//! (sub-4-byte) patches, oversized patches (file/line count
//! thresholds), and patches dropped between builds.

use crate::analyzers::macros::{expand_patch_macros, extract_macro_defs};
use crate::analyzers::patch::{count_patch_stats, detect_format, is_corrupt, DiffFormat};
use crate::inspections::register_inspection;
use crate::models::result::ResultParams;
use crate::models::run_ctx::RunCtx;
use crate::models::severity::{Severity, WaiverAuth};

const NAME: &str = "patches";

pub fn driver(ctx: &RunCtx) {
    for peer in ctx.peers.complete_peers() {
        let (Some(before_id), Some(after_id)) = (peer.before, peer.after) else { continue };
        let before = &ctx.packages[before_id];
        let after = &ctx.packages[after_id];

        for patch_name in &after.patch {
            check_patch_integrity(ctx, after, patch_name);
        }

        for patch_name in &before.patch {
            if !after.patch.contains(patch_name) {
                // Informational even for a non-rebase (spec §8 scenario 3):
                // the framework doesn't try to determine whether anything
                // in the after tree still references the removed patch, so
                // it can't justifiably escalate past Info on its own.
                ctx.add_result(ResultParams {
                    severity: Severity::Info,
                    waiver_auth: WaiverAuth::Anyone,
                    inspection: NAME.to_string(),
                    message: format!("Patch file `{patch_name}` removed"),
                    remedy: Some("confirm the patch removal was intentional".to_string()),
                    ..Default::default()
                });
            }
        }
    }
}

/// Resolve a `Patch*:` tag value that still contains a `%{...}` macro
/// reference against the source package's own spec file (spec §4.6: the
/// `Patch:` tag is recorded on the header verbatim, unexpanded, so a
/// filename like `%{name}-fix.patch` has to be resolved the same way
/// `rpmbuild` would before it can be matched against an extracted file).
fn resolve_patch_name(pkg: &crate::models::pkg::Pkg, patch_name: &str) -> String {
    if !patch_name.contains('%') {
        return patch_name.to_string();
    }
    let Some(spec_file) = pkg.files.iter().find(|f| f.localpath.ends_with(".spec")) else {
        return patch_name.to_string();
    };
    let Some(fullpath) = &spec_file.fullpath else { return patch_name.to_string() };
    let Ok(text) = std::fs::read_to_string(fullpath) else { return patch_name.to_string() };
    let defs = extract_macro_defs(&text);
    expand_patch_macros(patch_name, &defs, &pkg.name, &pkg.version)
}

fn check_patch_integrity(ctx: &RunCtx, pkg: &crate::models::pkg::Pkg, patch_name: &str) {
    let resolved = resolve_patch_name(pkg, patch_name);
    let Some(file) = pkg.files.iter().find(|f| f.localpath.ends_with(resolved.as_str())) else {
        return;
    };
    let Some(fullpath) = &file.fullpath else { return };
    let Ok(data) = std::fs::read(fullpath) else { return };

    if is_corrupt(&data) {
        ctx.add_result(ResultParams {
            severity: Severity::Bad,
            waiver_auth: WaiverAuth::Anyone,
            inspection: NAME.to_string(),
            message: format!("{patch_name} is under 4 bytes in size - is it corrupt?"),
            file: Some(file.localpath.clone()),
            ..Default::default()
        });
        return;
    }

    let Ok(text) = std::str::from_utf8(&data) else { return };

    if detect_format(text) == DiffFormat::Unknown {
        ctx.add_result(ResultParams {
            severity: Severity::Info,
            inspection: NAME.to_string(),
            message: format!("{patch_name} does not look like a unified or context diff"),
            file: Some(file.localpath.clone()),
            ..Default::default()
        });
        return;
    }

    let stats = count_patch_stats(text);
    let cfg = &ctx.config.patches;
    if let Some(threshold) = cfg.file_count_threshold
        && stats.files_touched as u32 > threshold
    {
        ctx.add_result(ResultParams {
            severity: Severity::Verify,
            waiver_auth: WaiverAuth::Anyone,
            inspection: NAME.to_string(),
            message: format!(
                "{patch_name} touches {} files, over the configured threshold of {threshold}",
                stats.files_touched
            ),
            file: Some(file.localpath.clone()),
            ..Default::default()
        });
    }
    if let Some(threshold) = cfg.line_count_threshold
        && stats.changed_lines as u32 > threshold
    {
        ctx.add_result(ResultParams {
            severity: Severity::Verify,
            waiver_auth: WaiverAuth::Anyone,
            inspection: NAME.to_string(),
            message: format!(
                "{patch_name} changes {} lines, over the configured threshold of {threshold}",
                stats.changed_lines
            ),
            file: Some(file.localpath.clone()),
            ..Default::default()
        });
    }
}

register_inspection!(1, NAME, true, driver);
