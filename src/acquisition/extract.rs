//! Extracting a parsed RPM's payload to disk and building the `File`
//! model for each member (spec §4.2 step 4).

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use super::cpio;
use crate::models::file::{File, FileType};
use crate::models::pkg::PkgId;

/// Extract every payload member of `header` under `extract_root`,
/// returning the `File` list in RPM tag order.
///
/// File metadata (mode, owner, group, size, mtime) is read from the RPM
/// header's own parallel tag arrays, not from the cpio member headers:
/// those are authoritative in a real RPM (the cpio uid/gid are usually
/// both 0, with real ownership expressed through `RPMTAG_FILEUSERNAME`/
/// `RPMTAG_FILEGROUPNAME`). The cpio archive is read only for path → byte
/// content, used to materialize the files on disk.
pub fn extract_package(
    pkg_id: PkgId,
    header: &Arc<rpm::Package>,
    extract_root: &Path,
    payload: &[u8],
) -> Result<Vec<File>> {
    fs::create_dir_all(extract_root)
        .with_context(|| format!("creating extraction root {}", extract_root.display()))?;

    let members = cpio::read_newc_archive(payload).context("reading RPM cpio payload")?;
    let entries = header
        .metadata
        .get_file_entries()
        .context("reading RPM file entries from header")?;

    let mut files = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let localpath = entry.path.to_string_lossy().trim_start_matches('/').to_string();
        let mode: u32 = entry.mode.into();
        let file_type = FileType::from_mode(mode);

        let fullpath = if file_type == FileType::Regular || file_type == FileType::Symlink {
            let dest = extract_root.join(&localpath);
            if let Some((_, data)) = members.get(&localpath) {
                write_member(&dest, data, mode)?;
                Some(dest)
            } else {
                log::warn!(
                    "payload has no cpio member for header-listed file {localpath:?}, \
                     skipping extraction (metadata is still recorded)"
                );
                None
            }
        } else {
            None
        };

        files.push(File {
            pkg: pkg_id,
            header: Arc::clone(header),
            idx,
            localpath,
            fullpath,
            file_type,
            mode,
            size: entry.size,
            owner: entry.ownership.user.to_string(),
            group: entry.ownership.group.to_string(),
            mtime: entry.modified_time as i64,
            peer_file: None,
        });
    }

    Ok(files)
}

fn write_member(dest: &Path, data: &[u8], mode: u32) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(dest, data).with_context(|| format!("writing extracted file {}", dest.display()))?;
    let perm_bits = mode & 0o7777;
    fs::set_permissions(dest, fs::Permissions::from_mode(perm_bits))
        .with_context(|| format!("setting permissions on {}", dest.display()))?;
    Ok(())
}

/// Build an extraction root path for one package within the run's
/// workdir: `<workdir>/<side>/<nevra>/`.
pub fn extraction_root(workdir: &Path, side: &str, nevra: &str) -> PathBuf {
    workdir.join(side).join(nevra)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_root_is_namespaced_by_side_and_nevra() {
        let root = extraction_root(Path::new("/tmp/work"), "before", "foo-1.0-1.el9.x86_64");
        assert_eq!(root, PathBuf::from("/tmp/work/before/foo-1.0-1.el9.x86_64"));
    }
}
