//! Minimal reader for the "newc" cpio format RPM payloads are archived
//! in. No cpio crate appears anywhere in the reference corpus, and the
//! format is small, stable, and fully documented (six magic bytes, a
//! fixed 110-byte ASCII-hex header, a NUL-terminated name, 4-byte
//! alignment padding after both the header+name and the data) — so this
//! is a deliberately narrow hand-rolled reader rather than a speculative
//! dependency. See DESIGN.md.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};

const MAGIC: &[u8; 6] = b"070701";
const TRAILER: &str = "TRAILER!!!";
const HEADER_LEN: usize = 110;

/// One archive member's metadata, decoded from the ASCII-hex header.
#[derive(Debug, Clone)]
pub struct CpioEntry {
    pub name: String,
    pub mode: u32,
    pub mtime: i64,
    pub filesize: u64,
}

fn hex_field(bytes: &[u8]) -> Result<u32> {
    let s = std::str::from_utf8(bytes).context("cpio header field is not ASCII")?;
    u32::from_str_radix(s, 16).with_context(|| format!("cpio header field {s:?} is not hex"))
}

fn align4(n: usize) -> usize {
    n.div_ceil(4) * 4
}

/// Parse a full newc cpio archive, returning each member's decoded
/// metadata alongside its raw data, keyed by the member's path with any
/// leading `./` stripped (RPM payloads always archive paths as `./usr/...`).
pub fn read_newc_archive(data: &[u8]) -> Result<HashMap<String, (CpioEntry, Vec<u8>)>> {
    let mut out = HashMap::new();
    let mut pos = 0usize;

    loop {
        if pos + HEADER_LEN > data.len() {
            bail!("cpio archive truncated before a full header at offset {pos}");
        }
        let header = &data[pos..pos + HEADER_LEN];
        if &header[0..6] != MAGIC {
            bail!("cpio entry at offset {pos} has unrecognized magic (only newc is supported)");
        }
        let mode = hex_field(&header[14..22])?;
        let mtime = hex_field(&header[46..54])? as i64;
        let filesize = hex_field(&header[54..62])? as u64;
        let namesize = hex_field(&header[94..102])? as usize;
        pos += HEADER_LEN;

        if pos + namesize > data.len() {
            bail!("cpio archive truncated in entry name at offset {pos}");
        }
        let name_bytes = &data[pos..pos + namesize];
        let raw_name = std::str::from_utf8(name_bytes.split(|&b| b == 0).next().unwrap_or(&[]))
            .unwrap_or_default()
            .to_string();
        pos = align4(pos + namesize);

        if raw_name == TRAILER {
            break;
        }

        if pos + filesize as usize > data.len() {
            bail!("cpio archive truncated in file data for {raw_name:?}");
        }
        let file_data = data[pos..pos + filesize as usize].to_vec();
        pos = align4(pos + filesize as usize);

        let normalized = raw_name.strip_prefix("./").unwrap_or(&raw_name).to_string();
        out.insert(
            normalized.clone(),
            (
                CpioEntry { name: normalized, mode, mtime, filesize },
                file_data,
            ),
        );
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn newc_header(mode: u32, mtime: i64, filesize: usize, namesize: usize) -> Vec<u8> {
        let mut h = Vec::with_capacity(HEADER_LEN);
        h.extend_from_slice(MAGIC);
        h.extend_from_slice(format!("{:08x}", 0).as_bytes()); // c_ino
        h.extend_from_slice(format!("{mode:08x}").as_bytes());
        h.extend_from_slice(format!("{:08x}", 0).as_bytes()); // c_uid
        h.extend_from_slice(format!("{:08x}", 0).as_bytes()); // c_gid
        h.extend_from_slice(format!("{:08x}", 1).as_bytes()); // c_nlink
        h.extend_from_slice(format!("{mtime:08x}").as_bytes());
        h.extend_from_slice(format!("{filesize:08x}").as_bytes());
        h.extend_from_slice(format!("{:08x}", 0).as_bytes()); // c_devmajor
        h.extend_from_slice(format!("{:08x}", 0).as_bytes()); // c_devminor
        h.extend_from_slice(format!("{:08x}", 0).as_bytes()); // c_rdevmajor
        h.extend_from_slice(format!("{:08x}", 0).as_bytes()); // c_rdevminor
        h.extend_from_slice(format!("{namesize:08x}").as_bytes());
        h.extend_from_slice(format!("{:08x}", 0).as_bytes()); // c_check
        assert_eq!(h.len(), HEADER_LEN);
        h
    }

    fn push_entry(buf: &mut Vec<u8>, name: &str, mode: u32, data: &[u8]) {
        let namesize = name.len() + 1;
        buf.extend_from_slice(&newc_header(mode, 1700000000, data.len(), namesize));
        buf.extend_from_slice(name.as_bytes());
        buf.push(0);
        while buf.len() % 4 != 0 {
            buf.push(0);
        }
        buf.extend_from_slice(data);
        while buf.len() % 4 != 0 {
            buf.push(0);
        }
    }

    fn build_archive(entries: &[(&str, u32, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        for (name, mode, data) in entries {
            push_entry(&mut buf, name, *mode, data);
        }
        push_entry(&mut buf, TRAILER, 0, &[]);
        buf
    }

    #[test]
    fn reads_single_regular_file() {
        let archive = build_archive(&[("./usr/bin/foo", 0o100755, b"hello")]);
        let members = read_newc_archive(&archive).unwrap();
        assert_eq!(members.len(), 1);
        let (entry, data) = &members["usr/bin/foo"];
        assert_eq!(entry.mode, 0o100755);
        assert_eq!(data, b"hello");
    }

    #[test]
    fn strips_leading_dot_slash() {
        let archive = build_archive(&[("./etc/foo.conf", 0o100644, b"x=1\n")]);
        let members = read_newc_archive(&archive).unwrap();
        assert!(members.contains_key("etc/foo.conf"));
        assert!(!members.contains_key("./etc/foo.conf"));
    }

    #[test]
    fn reads_multiple_entries_and_stops_at_trailer() {
        let archive = build_archive(&[
            ("./a", 0o100644, b"1"),
            ("./b", 0o100644, b"22"),
            ("./c", 0o100644, b""),
        ]);
        let members = read_newc_archive(&archive).unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(members["b"].1, b"22");
        assert!(members["c"].1.is_empty());
    }

    #[test]
    fn truncated_archive_is_an_error() {
        let mut archive = build_archive(&[("./a", 0o100644, b"hello world")]);
        archive.truncate(archive.len() - 20);
        assert!(read_newc_archive(&archive).is_err());
    }
}
