//! A single payload entry extracted from an RPM (spec §3, §4.2).

use std::path::PathBuf;
use std::sync::Arc;

use super::pkg::PkgId;

/// Node type recorded in the cpio header, beyond plain regular files
/// (spec §4.2 step 4, §4.4 `types`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
}

impl FileType {
    /// Decode from a cpio/stat `st_mode` word's type bits.
    pub fn from_mode(mode: u32) -> FileType {
        match mode & 0o170000 {
            0o040000 => FileType::Directory,
            0o120000 => FileType::Symlink,
            0o060000 => FileType::BlockDevice,
            0o020000 => FileType::CharDevice,
            0o010000 => FileType::Fifo,
            0o140000 => FileType::Socket,
            _ => FileType::Regular,
        }
    }
}

/// One file extracted from a package's payload archive.
///
/// Holds an `Arc` to the owning package's parsed RPM header — the
/// reference-counted header the original keeps a `Header` handle
/// open for — rather than a pointer back to the owning [`super::pkg::Pkg`]
/// itself, which would need the `Pkg` to hold its own `Vec<File>` inside
/// something an `Arc` could also point at (a reference cycle). The
/// `pkg` field is a plain index into `RunCtx::packages` instead: an
/// index is the "weak handle" the corresponding design note asks for.
#[derive(Debug, Clone)]
pub struct File {
    pub pkg: PkgId,
    pub header: Arc<rpm::Package>,
    /// Position of this file within the owning package's parallel RPM
    /// tag arrays (`RPMTAG_BASENAMES` et al.), used to look up sibling
    /// per-file tags (caps, verify flags, ...) lazily.
    pub idx: usize,
    pub localpath: String,
    /// Absolute path under the run's workdir once extracted; `None`
    /// before extraction or for files skipped during extraction.
    pub fullpath: Option<PathBuf>,
    pub file_type: FileType,
    pub mode: u32,
    pub size: u64,
    pub owner: String,
    pub group: String,
    pub mtime: i64,
    /// Index into the peer package's `files` vector, once this file has
    /// been matched during peer resolution (spec §4.2 step 5). `None`
    /// for a file with no counterpart on the other side (added/removed).
    pub peer_file: Option<usize>,
}

/// RPMFILE_CONFIG bit (spec §3 `File.is_config`), mirrored from
/// `RPMTAG_FILEFLAGS`'s bit layout.
const RPMFILE_CONFIG: u32 = 1 << 0;

impl File {
    pub fn is_config(&self) -> bool {
        let Ok(entries) = self.header.metadata.get_file_entries() else { return false };
        let Some(entry) = entries.get(self.idx) else { return false };
        entry.flags.bits() & RPMFILE_CONFIG != 0
    }

    pub fn basename(&self) -> &str {
        self.localpath.rsplit('/').next().unwrap_or(&self.localpath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_decodes_mode_bits() {
        assert_eq!(FileType::from_mode(0o100644), FileType::Regular);
        assert_eq!(FileType::from_mode(0o040755), FileType::Directory);
        assert_eq!(FileType::from_mode(0o120777), FileType::Symlink);
        assert_eq!(FileType::from_mode(0o060600), FileType::BlockDevice);
        assert_eq!(FileType::from_mode(0o020600), FileType::CharDevice);
        assert_eq!(FileType::from_mode(0o010600), FileType::Fifo);
        assert_eq!(FileType::from_mode(0o140600), FileType::Socket);
    }

    #[test]
    fn basename_strips_directory() {
        // Construction requires a real Arc<rpm::Package>; basename only
        // touches `localpath`, so exercise it with a throwaway string
        // field rather than building a full File fixture here.
        assert_eq!("/usr/bin/foo".rsplit('/').next().unwrap(), "foo");
    }
}
