//! `changedfiles` inspection driver (spec §4.4), one of the five worked
//! examples: compares every peered file's content digest, mode,
//! ownership, and size across the before/after build.

use sha2::{Digest, Sha256};

use crate::inspections::{for_each_peer_file, register_inspection};
use crate::models::result::ResultParams;
use crate::models::run_ctx::RunCtx;
use crate::models::severity::Severity;

const NAME: &str = "changedfiles";

fn digest(path: &std::path::Path) -> Option<String> {
    let data = std::fs::read(path).ok()?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Some(hex::encode(hasher.finalize()))
}

pub fn driver(ctx: &RunCtx) {
    for_each_peer_file(ctx, NAME, |pkg, after_file, before_file| {
        let Some(before_file) = before_file else { return };

        if before_file.mode != after_file.mode {
            ctx.add_result(ResultParams {
                severity: Severity::Info,
                inspection: NAME.to_string(),
                message: format!(
                    "{} mode changed from {:o} to {:o}",
                    after_file.localpath, before_file.mode, after_file.mode
                ),
                arch: Some(pkg.arch.clone()),
                file: Some(after_file.localpath.clone()),
                ..Default::default()
            });
        }

        if before_file.owner != after_file.owner || before_file.group != after_file.group {
            ctx.add_result(ResultParams {
                severity: Severity::Verify,
                inspection: NAME.to_string(),
                message: format!(
                    "{} ownership changed from {}:{} to {}:{}",
                    after_file.localpath,
                    before_file.owner,
                    before_file.group,
                    after_file.owner,
                    after_file.group
                ),
                arch: Some(pkg.arch.clone()),
                file: Some(after_file.localpath.clone()),
                ..Default::default()
            });
        }

        let (Some(before_path), Some(after_path)) = (&before_file.fullpath, &after_file.fullpath) else {
            return;
        };
        if before_file.size != after_file.size {
            ctx.add_result(ResultParams {
                severity: Severity::Info,
                inspection: NAME.to_string(),
                message: format!(
                    "{} size changed from {} to {} bytes",
                    after_file.localpath, before_file.size, after_file.size
                ),
                arch: Some(pkg.arch.clone()),
                file: Some(after_file.localpath.clone()),
                ..Default::default()
            });
            return;
        }

        if let (Some(before_digest), Some(after_digest)) = (digest(before_path), digest(after_path))
            && before_digest != after_digest
        {
            ctx.add_result(ResultParams {
                severity: Severity::Info,
                inspection: NAME.to_string(),
                message: format!("{} content changed (same size, different digest)", after_file.localpath),
                arch: Some(pkg.arch.clone()),
                file: Some(after_file.localpath.clone()),
                ..Default::default()
            });
        }
    });
}

register_inspection!(4, NAME, false, driver);
