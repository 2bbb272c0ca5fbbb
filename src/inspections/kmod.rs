//! `kmod` inspection driver (spec §4.4), one of the five worked
//! examples: compares kernel module parameters, dependencies, and PCI
//! aliases across the before/after build.

use std::collections::HashMap;
use std::process::Command;

use crate::analyzers::kmod::{compare_module_aliases, parse_modinfo, ModInfo};
use crate::inspections::{for_each_peer_file, register_inspection};
use crate::models::result::ResultParams;
use crate::models::run_ctx::RunCtx;
use crate::models::severity::{Severity, WaiverAuth};

const NAME: &str = "kmod";

fn run_modinfo(path: &std::path::Path) -> Option<ModInfo> {
    let output = Command::new("modinfo").arg(path).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(parse_modinfo(&String::from_utf8_lossy(&output.stdout)))
}

pub fn driver(ctx: &RunCtx) {
    let mut before_aliases: HashMap<String, Vec<String>> = HashMap::new();
    let mut after_aliases: HashMap<String, Vec<String>> = HashMap::new();
    let mut before_info: HashMap<String, ModInfo> = HashMap::new();
    let mut after_info: HashMap<String, ModInfo> = HashMap::new();

    for_each_peer_file(ctx, NAME, |pkg, file, before_file| {
        if !file.localpath.ends_with(".ko") {
            return;
        }
        let Some(fullpath) = &file.fullpath else { return };
        let Some(info) = run_modinfo(fullpath) else {
            ctx.add_result(ResultParams {
                severity: Severity::Skip,
                inspection: NAME.to_string(),
                message: format!("modinfo unavailable or failed on {}", file.localpath),
                arch: Some(pkg.arch.clone()),
                ..Default::default()
            });
            return;
        };
        let module_name = module_name_from_path(&file.localpath);
        after_aliases.insert(module_name.clone(), info.pci_aliases.clone());
        after_info.insert(module_name.clone(), info);

        if let Some(before_file) = before_file {
            let before_path = &before_file.localpath;
            let before_module = module_name_from_path(before_path);
            if let Some(before_full) = &before_file.fullpath
                && let Some(before_modinfo) = run_modinfo(before_full)
            {
                before_aliases.insert(before_module.clone(), before_modinfo.pci_aliases.clone());
                before_info.insert(before_module, before_modinfo);
            }
        }
    });

    for regression in compare_module_aliases(&before_aliases, &after_aliases) {
        ctx.add_result(ResultParams {
            severity: Severity::Bad,
            waiver_auth: WaiverAuth::Anyone,
            inspection: NAME.to_string(),
            message: format!(
                "PCI alias {} moved from module {} to {:?}",
                regression.alias, regression.before_provider, regression.after_provider
            ),
            ..Default::default()
        });
    }

    for (module, before) in &before_info {
        let Some(after) = after_info.get(module) else { continue };
        for removed_param in before.parameters.iter().filter(|p| !after.parameters.contains(p)) {
            ctx.add_result(ResultParams {
                severity: Severity::Verify,
                inspection: NAME.to_string(),
                message: format!("module {module} lost parameter {removed_param}"),
                ..Default::default()
            });
        }
        for removed_dep in before.depends.iter().filter(|d| !after.depends.contains(d)) {
            ctx.add_result(ResultParams {
                severity: Severity::Info,
                inspection: NAME.to_string(),
                message: format!("module {module} no longer depends on {removed_dep}"),
                ..Default::default()
            });
        }
    }
}

fn module_name_from_path(path: &str) -> String {
    path.rsplit('/')
        .next()
        .unwrap_or(path)
        .trim_end_matches(".ko")
        .to_string()
}

register_inspection!(3, NAME, false, driver);
