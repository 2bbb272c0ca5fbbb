//! `abidiff`/`kmidiff` inspection drivers (spec §4.4): run libabigail's
//! comparison tools over a peered shared library or kernel module and
//! decode the bitfield exit status.

use crate::analyzers::abi::{build_args, failure_verb, AbiCompareArgs, ToolStatus};
use crate::inspections::{for_each_peer_file, register_inspection};
use crate::models::result::ResultParams;
use crate::models::run_ctx::RunCtx;
use crate::models::severity::{Severity, WaiverAuth};

fn run_one(
    ctx: &RunCtx,
    inspection: &'static str,
    tool: &str,
    is_shared_object: fn(&str) -> bool,
    extra_args: &[String],
    suppression_file: Option<&str>,
    debuginfo_path: Option<&str>,
) {
    for_each_peer_file(ctx, inspection, |pkg, after_file, before_file| {
        let Some(before_file) = before_file else { return };
        if !is_shared_object(&after_file.localpath) {
            return;
        }
        let (Some(before_path), Some(after_path)) = (&before_file.fullpath, &after_file.fullpath) else {
            return;
        };

        let args = build_args(&AbiCompareArgs {
            before: &before_path.to_string_lossy(),
            after: &after_path.to_string_lossy(),
            before_debuginfo: debuginfo_path,
            after_debuginfo: debuginfo_path,
            suppression_file,
            headers_dir: None,
            extra_args,
        });

        let Ok(output) = std::process::Command::new(tool).args(&args).output() else {
            ctx.add_result(ResultParams {
                severity: Severity::Skip,
                inspection: inspection.to_string(),
                message: format!("{tool} unavailable, skipping comparison of {}", after_file.localpath),
                arch: Some(pkg.arch.clone()),
                ..Default::default()
            });
            return;
        };

        let status = ToolStatus::from_exit_code(output.status.code().unwrap_or(0));
        if status.usage_error {
            // spec §8 boundary: a usage error (e.g. missing debug info)
            // is Verify, not Bad or Diagnostic — the comparison couldn't
            // run, but that's not necessarily the package's fault.
            ctx.add_result(ResultParams {
                severity: Severity::Verify,
                waiver_auth: WaiverAuth::Anyone,
                inspection: inspection.to_string(),
                message: format!("{tool} {} {}", failure_verb(&status), after_file.localpath),
                arch: Some(pkg.arch.clone()),
                ..Default::default()
            });
            return;
        }
        if status.tool_error {
            ctx.add_result(ResultParams {
                severity: Severity::Diagnostic,
                inspection: inspection.to_string(),
                message: format!("{tool} {} {}", failure_verb(&status), after_file.localpath),
                arch: Some(pkg.arch.clone()),
                ..Default::default()
            });
            return;
        }
        if status.abi_incompatible {
            ctx.add_result(ResultParams {
                severity: Severity::Bad,
                waiver_auth: WaiverAuth::Anyone,
                inspection: inspection.to_string(),
                message: format!("{} has an ABI-incompatible change", after_file.localpath),
                arch: Some(pkg.arch.clone()),
                file: Some(after_file.localpath.clone()),
                ..Default::default()
            });
        } else if status.abi_changed {
            ctx.add_result(ResultParams {
                severity: Severity::Info,
                inspection: inspection.to_string(),
                message: format!("{} has a compatible ABI change", after_file.localpath),
                arch: Some(pkg.arch.clone()),
                file: Some(after_file.localpath.clone()),
                ..Default::default()
            });
        }
    });
}

pub fn abidiff_driver(ctx: &RunCtx) {
    let cfg = &ctx.config.abidiff;
    run_one(
        ctx,
        "abidiff",
        "abidiff",
        |p| p.contains(".so"),
        &cfg.extra_args,
        cfg.suppression_file.as_deref().and_then(|p| p.to_str()),
        cfg.debuginfo_path.as_deref().and_then(|p| p.to_str()),
    );
}

pub fn kmidiff_driver(ctx: &RunCtx) {
    let cfg = &ctx.config.kmidiff;
    run_one(
        ctx,
        "kmidiff",
        "kmidiff",
        |p| p.ends_with(".ko"),
        &cfg.extra_args,
        cfg.suppression_file.as_deref().and_then(|p| p.to_str()),
        cfg.debuginfo_path.as_deref().and_then(|p| p.to_str()),
    );
}

register_inspection!(5, "abidiff", false, abidiff_driver);
register_inspection!(6, "kmidiff", false, kmidiff_driver);
