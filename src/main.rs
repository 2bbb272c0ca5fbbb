use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use rpminspect::acquisition::{self, DirectorySource, SingleFileSource};
use rpminspect::cli::Cli;
use rpminspect::config::{self, Config, VendorData};
use rpminspect::error::{self, RpmInspectError};
use rpminspect::inspections;
use rpminspect::models::pkg::BuildSide;
use rpminspect::models::run_ctx::RunCtx;
use rpminspect::models::severity::Severity;
use rpminspect::report::{self, Format};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            log::error!("{err:#}");
            std::process::exit(error::program_error_exit_code(&err));
        }
    }
}

/// Install `env_logger` with a default level raised one step per
/// `--verbose` occurrence (SPEC_FULL.md §A.1), the way the teacher
/// crate's (unused) `env_logger` dependency was meant to be wired.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn run(cli: Cli) -> Result<i32> {
    let started = chrono::Utc::now();

    let config = load_config(&cli)?;

    if cli.list_profiles {
        list_profiles(&config);
        return Ok(0);
    }
    if cli.list_inspections {
        list_inspections();
        return Ok(0);
    }

    let Some(after_ident) = cli.after.clone().or_else(|| cli.before.clone()) else {
        bail!(RpmInspectError::Config("at least one build identifier is required".to_string()));
    };
    let before_ident = cli.after.as_ref().and(cli.before.clone());

    let vendor_data = load_vendor_data(&config)?;

    let (workdir, _keep_guard) = resolve_workdir(&cli)?;
    let arches: Vec<String> = if cli.arches.iter().any(|a| a.eq_ignore_ascii_case("all")) {
        Vec::new()
    } else {
        cli.arches.clone()
    };

    let mut next_id = 0usize;
    let mut packages = Vec::new();

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}").unwrap());

    if let Some(before_ident) = &before_ident {
        progress.set_message(format!("acquiring before build {before_ident}"));
        let source = resolve_source(before_ident, "before")?;
        packages.extend(acquisition::acquire_build(
            source.as_ref(),
            BuildSide::Before,
            &workdir,
            &arches,
            &mut next_id,
        )?);
    }

    progress.set_message(format!("acquiring after build {after_ident}"));
    let source = resolve_source(&after_ident, "after")?;
    packages.extend(acquisition::acquire_build(
        source.as_ref(),
        BuildSide::After,
        &workdir,
        &arches,
        &mut next_id,
    )?);
    progress.finish_and_clear();

    if cli.fetch_only {
        log::info!("--fetch-only given, {} package(s) extracted under {}", packages.len(), workdir.display());
        return Ok(0);
    }

    let peers = acquisition::resolve_package_peers(&packages);
    let mut packages = packages;
    for peer in &peers.peers {
        if let (Some(before_id), Some(after_id)) = (peer.before, peer.after) {
            let (before_pkg, after_pkg) = two_mut(&mut packages, before_id, after_id);
            acquisition::resolve_file_peers(before_pkg, after_pkg);
        }
    }

    let mut ctx = RunCtx::new(config, vendor_data, workdir.clone());
    ctx.before_build = before_ident;
    ctx.after_build = Some(after_ident);
    ctx.packages = packages;
    ctx.peers = peers;
    ctx.threshold = cli.threshold.parse().unwrap_or(Severity::Verify);
    ctx.enabled_mask = resolve_enabled_mask(&cli);

    inspections::run_enabled(&ctx);

    let format: Format = cli.format.parse()?;
    write_report(&cli.output, format, &ctx)?;

    let elapsed = chrono::Utc::now().signed_duration_since(started);
    log::info!("run completed in {}ms, worst severity {}", elapsed.num_milliseconds(), ctx.worst());

    if !cli.keep {
        let _ = std::fs::remove_dir_all(&workdir);
    }

    Ok(if ctx.exceeds_threshold() { error::RI_INSPECTION_FAILURE } else { 0 })
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut document = match &cli.config {
        Some(path) => config::load_document(path)
            .map_err(|e| RpmInspectError::Config(e.to_string()))?,
        None => Config::default(),
    };

    if let Some(profile_name) = &cli.profile {
        let profiledir = document
            .common
            .profiledir
            .clone()
            .ok_or_else(|| RpmInspectError::Config("--profile given but no common.profiledir configured".to_string()))?;
        let profile_path = profiledir.join(format!("{profile_name}.yaml"));
        let profile_text = std::fs::read_to_string(&profile_path)
            .with_context(|| format!("reading profile {}", profile_path.display()))?;
        document = apply_profile(document, &profile_text)?;
    }

    Ok(document)
}

fn apply_profile(base: Config, profile_text: &str) -> Result<Config> {
    let base_value = serde_yaml::to_value(&base).context("re-serializing base configuration")?;
    let profile_value: serde_yaml::Value =
        serde_yaml::from_str(profile_text).context("parsing profile document")?;
    let merged = config::overlay_profile(base_value, profile_value);
    serde_yaml::from_value(merged).context("deserializing profile-overlaid configuration").map_err(Into::into)
}

fn load_vendor_data(config: &Config) -> Result<VendorData> {
    let mut vendor_data = VendorData::default();
    if let Some(path) = &config.vendor_data.fileinfo {
        vendor_data.fileinfo = config::parse_fileinfo(path)?;
    }
    if let Some(path) = &config.vendor_data.capabilities {
        vendor_data.capabilities = config::parse_capabilities(path)?;
    }
    if let Some(path) = &config.vendor_data.rebaseable {
        vendor_data.rebaseable = config::parse_rebaseable(path)?;
    }
    if let Some(path) = &config.vendor_data.politics {
        vendor_data.politics = config::parse_politics(path)?;
    }
    if let Some(path) = &config.vendor_data.security {
        vendor_data.security = config::parse_security(path)?;
    }
    Ok(vendor_data)
}

/// Resolve the scratch workdir (spec §6 `--workdir`, `--keep`). Without
/// `--workdir` a fresh `tempfile::TempDir` is used; its guard is
/// returned so the directory survives for the run and is cleaned up on
/// drop unless `--keep` asked us to persist it, in which case the guard
/// is leaked (`into_path`) so the files outlive this process.
fn resolve_workdir(cli: &Cli) -> Result<(PathBuf, Option<tempfile::TempDir>)> {
    if let Some(dir) = &cli.workdir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating workdir {}", dir.display()))?;
        return Ok((dir.clone(), None));
    }
    let tmp = tempfile::Builder::new().prefix("rpminspect-").tempdir().context("creating scratch workdir")?;
    let path = tmp.path().to_path_buf();
    if cli.keep {
        let _ = tmp.keep();
        Ok((path, None))
    } else {
        Ok((path, Some(tmp)))
    }
}

/// Resolve a CLI-given build identifier to a [`BuildSource`] (spec §4.2
/// "build specification resolution"). Only local filesystem sources are
/// implemented; a remote build service (koji) client is an external
/// collaborator per spec §1 Non-goals.
fn resolve_source(identifier: &str, label: &str) -> Result<Box<dyn acquisition::BuildSource>> {
    let path = Path::new(identifier);
    if path.is_dir() {
        return Ok(Box::new(DirectorySource { dir: path.to_path_buf(), label: label.to_string() }));
    }
    if path.is_file() {
        return Ok(Box::new(SingleFileSource { path: path.to_path_buf(), label: label.to_string() }));
    }
    bail!(RpmInspectError::Acquisition(format!(
        "{identifier:?} is not a local RPM file or directory (remote build-service resolution is out of scope)"
    )))
}

fn resolve_enabled_mask(cli: &Cli) -> u64 {
    if cli.tests.is_empty() && cli.exclude.is_empty() {
        return u64::MAX;
    }
    let mut mask = if cli.tests.is_empty() {
        u64::MAX
    } else {
        let mut m = 0u64;
        for name in &cli.tests {
            if let Some(meta) = inspections::by_name(name) {
                m |= 1u64 << meta.id_bit;
            } else {
                log::warn!("--tests names unknown inspection {name:?}");
            }
        }
        m
    };
    for name in &cli.exclude {
        if let Some(meta) = inspections::by_name(name) {
            mask &= !(1u64 << meta.id_bit);
        }
    }
    mask
}

fn write_report(output: &Option<PathBuf>, format: Format, ctx: &RunCtx) -> Result<()> {
    let results = ctx.results();
    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("creating report output {}", path.display()))?;
            report::render(&mut file, format, ctx.worst(), &results)
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            let result = report::render(&mut lock, format, ctx.worst(), &results);
            let _ = lock.flush();
            result
        }
    }
}

fn list_profiles(config: &Config) {
    let Some(dir) = &config.common.profiledir else {
        println!("no common.profiledir configured");
        return;
    };
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                if let Some(name) = entry.path().file_stem().and_then(|s| s.to_str()) {
                    println!("{name}");
                }
            }
        }
        Err(e) => log::warn!("could not read profiledir {}: {e}", dir.display()),
    }
}

/// Borrow two distinct elements of `v` mutably at once, regardless of
/// which index is larger. Needed for `resolve_file_peers`, which takes
/// `&mut Pkg` on both sides of a peer whose indices can fall in either
/// order (a removed before-package does not consume an after-id).
fn two_mut<T>(v: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "peer's before/after package ids must differ");
    if i < j {
        let (left, right) = v.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = v.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

fn list_inspections() {
    for meta in inspections::all() {
        println!("{}\t(single_build_ok={})", meta.name, meta.single_build_ok);
    }
}
