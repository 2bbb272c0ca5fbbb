//! Acquiring, extracting, and peering the before/after builds
//! (spec §4.2).

mod cpio;
mod extract;
mod peer_resolve;

pub use peer_resolve::{resolve_file_peers, resolve_package_peers};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::error::RpmInspectError;
use crate::models::pkg::{BuildSide, Pkg};

/// Where a build's RPMs come from. Fetching from a remote build system
/// (koji, a copr repo, ...) is explicitly out of scope (spec Non-goals);
/// every `BuildSource` implementation here resolves to paths already on
/// local disk, the same way the teacher's CLI takes a `dir_path`
/// argument rather than a registry URL.
pub trait BuildSource {
    /// Ordered list of RPM (or SRPM) file paths making up this build.
    fn packages(&self) -> Result<Vec<PathBuf>>;
    /// Label used in log messages and, by default, the extraction root
    /// (e.g. "before", "after").
    fn label(&self) -> &str;
}

/// A single RPM file.
pub struct SingleFileSource {
    pub path: PathBuf,
    pub label: String,
}

impl BuildSource for SingleFileSource {
    fn packages(&self) -> Result<Vec<PathBuf>> {
        Ok(vec![self.path.clone()])
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// A directory containing one or more RPMs belonging to the same build
/// (the common case: a koji task's output directory, or an `rpmbuild`
/// `RPMS`/`SRPMS` tree).
pub struct DirectorySource {
    pub dir: PathBuf,
    pub label: String,
}

impl BuildSource for DirectorySource {
    fn packages(&self) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("reading build directory {}", self.dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            let is_rpm = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("rpm"));
            if is_rpm {
                out.push(path);
            }
        }
        out.sort();
        Ok(out)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Acquire and extract every package from `source`, filtering by
/// `arches` (empty means "all architectures", spec §6 `--arches`).
pub fn acquire_build(
    source: &dyn BuildSource,
    side: BuildSide,
    workdir: &Path,
    arches: &[String],
    next_id: &mut usize,
) -> Result<Vec<Pkg>> {
    let paths = source
        .packages()
        .map_err(|e| RpmInspectError::Acquisition(e.to_string()))?;
    if paths.is_empty() {
        bail!(RpmInspectError::Acquisition(format!(
            "{} build contains no RPM files",
            source.label()
        )));
    }

    let mut packages = Vec::with_capacity(paths.len());
    for path in paths {
        let raw = std::fs::read(&path)
            .with_context(|| format!("reading package {}", path.display()))?;
        let parsed = rpm::Package::parse(&mut std::io::Cursor::new(&raw))
            .with_context(|| format!("parsing RPM header for {}", path.display()))?;

        let arch = parsed
            .metadata
            .get_arch()
            .unwrap_or("noarch")
            .to_string();
        if !arches.is_empty() && !arches.iter().any(|a| a == &arch) {
            log::debug!("skipping {} (arch {arch} not in --arches)", path.display());
            continue;
        }

        let name = parsed.metadata.get_name().unwrap_or_default().to_string();
        let version = parsed.metadata.get_version().unwrap_or_default().to_string();
        let release = parsed.metadata.get_release().unwrap_or_default().to_string();
        let epoch = parsed.metadata.get_epoch().unwrap_or(0);
        let is_source_rpm = arch == "src" || arch == "nosrc";

        let id = *next_id;
        *next_id += 1;

        let header = Arc::new(parsed);
        let extract_root = extract::extraction_root(
            workdir,
            source.label(),
            &format!("{name}-{version}-{release}.{arch}"),
        );

        let payload = header
            .content
            .clone()
            .unwrap_or_default();
        let files = extract::extract_package(id, &header, &extract_root, &payload)
            .with_context(|| format!("extracting payload of {}", path.display()))?;

        let mut pkg = Pkg::new(id, side, Arc::clone(&header), name, epoch, version, release, arch, extract_root);
        pkg.vendor = header.metadata.get_vendor().ok().map(str::to_string);
        pkg.buildhost = header.metadata.get_buildhost().ok().map(str::to_string);
        pkg.summary = header.metadata.get_summary().ok().map(str::to_string);
        pkg.description = header.metadata.get_description().ok().map(str::to_string);
        pkg.license = header.metadata.get_license().ok().map(str::to_string);
        pkg.source = header
            .metadata
            .get_source_rpm()
            .ok()
            .map(|s| vec![s.to_string()])
            .unwrap_or_default();
        pkg.is_source_rpm = is_source_rpm;
        pkg.files = files;
        packages.push(pkg);
    }

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_source_filters_non_rpm_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rpm"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::write(dir.path().join("B.RPM"), b"").unwrap();
        let source = DirectorySource { dir: dir.path().to_path_buf(), label: "before".into() };
        let files = source.packages().unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn single_file_source_returns_exactly_its_path() {
        let source = SingleFileSource { path: PathBuf::from("/tmp/foo-1.0-1.x86_64.rpm"), label: "after".into() };
        assert_eq!(source.packages().unwrap(), vec![PathBuf::from("/tmp/foo-1.0-1.x86_64.rpm")]);
    }
}
