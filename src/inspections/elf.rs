//! `elf` inspection driver (spec §4.4), one of the five worked examples.

use crate::analyzers::elf::{examine, lost_fortification};
use crate::inspections::{for_each_peer_file, register_inspection};
use crate::models::result::ResultParams;
use crate::models::run_ctx::RunCtx;
use crate::models::severity::{Severity, WaiverAuth};

const NAME: &str = "elf";

pub fn driver(ctx: &RunCtx) {
    let regex_opts = match ctx.config.elf.compile() {
        Ok(opts) => opts,
        Err(e) => {
            ctx.add_result(ResultParams {
                severity: Severity::Diagnostic,
                inspection: NAME.to_string(),
                message: format!("could not compile elf include/exclude regex: {e}"),
                ..Default::default()
            });
            return;
        }
    };

    for_each_peer_file(ctx, NAME, |pkg, file, before| {
        if !regex_opts.applies(&file.localpath) {
            return;
        }
        let Some(fullpath) = &file.fullpath else { return };
        let Ok(data) = std::fs::read(fullpath) else { return };
        let Ok(Some(findings)) = examine(&data) else { return };

        if let Some(before_file) = before {
            if let Some(before_fullpath) = &before_file.fullpath {
                if let Ok(before_data) = std::fs::read(before_fullpath) {
                    if let Ok(Some(before_findings)) = examine(&before_data) {
                        for lost in lost_fortification(&before_findings, &findings) {
                            ctx.add_result(ResultParams {
                                severity: Severity::Verify,
                                waiver_auth: WaiverAuth::Anyone,
                                inspection: NAME.to_string(),
                                message: format!(
                                    "{} lost fortification: {} is gone, now calling {}",
                                    file.localpath, lost.chk_symbol, lost.plain_symbol
                                ),
                                details: Some(format!(
                                    "lost fortified symbol: {}\nfortifiable symbol now present: {}",
                                    lost.chk_symbol, lost.plain_symbol
                                )),
                                remedy: Some(
                                    "rebuild with -D_FORTIFY_SOURCE=2 and -O2 or higher".to_string(),
                                ),
                                arch: Some(pkg.arch.clone()),
                                file: Some(file.localpath.clone()),
                                ..Default::default()
                            });
                        }
                    }
                }
            }
        }

        if findings.executable_stack {
            ctx.add_result(ResultParams {
                severity: Severity::Bad,
                waiver_auth: WaiverAuth::Security,
                inspection: NAME.to_string(),
                message: format!("{} has an executable stack", file.localpath),
                remedy: Some("rebuild with an explicit non-executable GNU_STACK marking".to_string()),
                arch: Some(pkg.arch.clone()),
                file: Some(file.localpath.clone()),
                ..Default::default()
            });
        }
        if !findings.has_relro {
            ctx.add_result(ResultParams {
                severity: Severity::Verify,
                waiver_auth: WaiverAuth::Anyone,
                inspection: NAME.to_string(),
                message: format!("{} is missing a GNU_RELRO segment", file.localpath),
                arch: Some(pkg.arch.clone()),
                file: Some(file.localpath.clone()),
                ..Default::default()
            });
        }
        if findings.text_relocations {
            ctx.add_result(ResultParams {
                severity: Severity::Bad,
                waiver_auth: WaiverAuth::Security,
                inspection: NAME.to_string(),
                message: format!("{} contains text relocations", file.localpath),
                arch: Some(pkg.arch.clone()),
                file: Some(file.localpath.clone()),
                ..Default::default()
            });
        }
        if !findings.bind_now {
            ctx.add_result(ResultParams {
                severity: Severity::Info,
                inspection: NAME.to_string(),
                message: format!("{} was not linked with -z now", file.localpath),
                arch: Some(pkg.arch.clone()),
                file: Some(file.localpath.clone()),
                ..Default::default()
            });
        }
    });
}

register_inspection!(0, NAME, true, driver);
