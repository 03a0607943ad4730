// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Best-effort target resolution for Windows Shell Link (`.lnk`) files
//!
//! Only the local base path stored in the LinkInfo block is read. Network
//! targets, environment-variable blocks and the shell item ID list are
//! skipped. Any malformed input resolves to `None`.

use std::path::Path;
use tracing::debug;

const HEADER_SIZE: u32 = 0x4C;
const LINK_CLSID: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

const HAS_LINK_TARGET_ID_LIST: u32 = 0x0000_0001;
const HAS_LINK_INFO: u32 = 0x0000_0002;
const VOLUME_ID_AND_LOCAL_BASE_PATH: u32 = 0x0000_0001;

// LinkInfo headers this long carry the Unicode path offsets
const UNICODE_LINK_INFO_HEADER: u32 = 0x24;

/// Read a shortcut file and return its target path
pub fn resolve_shortcut_target(path: &Path) -> Option<String> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!("Could not read shortcut {:?}: {}", path, e);
            return None;
        }
    };

    let target = parse_link_target(&data);
    if target.is_none() {
        debug!("No local target found in shortcut {:?}", path);
    }
    target
}

/// Extract the local target path from raw Shell Link bytes
pub fn parse_link_target(data: &[u8]) -> Option<String> {
    if read_u32(data, 0)? != HEADER_SIZE || data.get(4..20)? != &LINK_CLSID[..] {
        return None;
    }

    let flags = read_u32(data, 20)?;
    let mut offset = HEADER_SIZE as usize;

    if flags & HAS_LINK_TARGET_ID_LIST != 0 {
        let id_list_size = read_u16(data, offset)? as usize;
        offset = offset.checked_add(2)?.checked_add(id_list_size)?;
    }

    if flags & HAS_LINK_INFO == 0 {
        return None;
    }

    let info = data.get(offset..)?;
    let info_size = read_u32(info, 0)? as usize;
    let info = info.get(..info_size)?;
    let header_size = read_u32(info, 4)?;
    let info_flags = read_u32(info, 8)?;

    if info_flags & VOLUME_ID_AND_LOCAL_BASE_PATH == 0 {
        return None;
    }

    if header_size >= UNICODE_LINK_INFO_HEADER {
        let unicode_offset = read_u32(info, 28)? as usize;
        if let Some(target) = read_utf16z(info, unicode_offset) {
            return Some(target);
        }
    }

    let base = read_cstr(info, read_u32(info, 16)? as usize)?;
    let suffix = read_u32(info, 24)
        .and_then(|off| read_cstr(info, off as usize))
        .unwrap_or_default();

    let target = base + &suffix;
    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// NUL-terminated string in the system code page, decoded lossily
fn read_cstr(data: &[u8], offset: usize) -> Option<String> {
    let rest = data.get(offset..)?;
    let end = rest.iter().position(|&b| b == 0)?;
    Some(String::from_utf8_lossy(&rest[..end]).into_owned())
}

fn read_utf16z(data: &[u8], offset: usize) -> Option<String> {
    let rest = data.get(offset..)?;
    let units: Vec<u16> = rest
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();

    if units.is_empty() {
        return None;
    }
    String::from_utf16(&units).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(flags: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&HEADER_SIZE.to_le_bytes());
        data.extend_from_slice(&LINK_CLSID);
        data.extend_from_slice(&flags.to_le_bytes());
        data.resize(HEADER_SIZE as usize, 0);
        data
    }

    fn ansi_link(target: &str, suffix: &str, with_id_list: bool) -> Vec<u8> {
        let mut flags = HAS_LINK_INFO;
        if with_id_list {
            flags |= HAS_LINK_TARGET_ID_LIST;
        }
        let mut data = header(flags);
        if with_id_list {
            data.extend_from_slice(&6u16.to_le_bytes());
            data.extend_from_slice(&[0xAB; 6]);
        }

        let header_len = 0x1Cu32;
        let base_offset = header_len;
        let suffix_offset = base_offset + target.len() as u32 + 1;
        let total = suffix_offset + suffix.len() as u32 + 1;
        for field in [total, header_len, VOLUME_ID_AND_LOCAL_BASE_PATH, 0, base_offset, 0, suffix_offset] {
            data.extend_from_slice(&field.to_le_bytes());
        }
        data.extend_from_slice(target.as_bytes());
        data.push(0);
        data.extend_from_slice(suffix.as_bytes());
        data.push(0);
        data
    }

    #[test]
    fn test_local_base_path() {
        let data = ansi_link(r"C:\Program Files\Steam\steam.exe", "", false);
        assert_eq!(parse_link_target(&data).as_deref(), Some(r"C:\Program Files\Steam\steam.exe"));
    }

    #[test]
    fn test_skips_id_list_and_appends_suffix() {
        let data = ansi_link(r"C:\Tools\", "nmap.exe", true);
        assert_eq!(parse_link_target(&data).as_deref(), Some(r"C:\Tools\nmap.exe"));
    }

    #[test]
    fn test_unicode_base_path_preferred() {
        let mut data = header(HAS_LINK_INFO);
        let header_len = UNICODE_LINK_INFO_HEADER;
        let ansi_offset = header_len;
        let unicode_offset = ansi_offset + 2;
        let target: Vec<u16> = r"D:\Spiele\Café.exe".encode_utf16().collect();
        let total = unicode_offset + (target.len() as u32 + 1) * 2;

        for field in [total, header_len, VOLUME_ID_AND_LOCAL_BASE_PATH, 0, ansi_offset, 0, ansi_offset, unicode_offset, 0] {
            data.extend_from_slice(&field.to_le_bytes());
        }
        data.extend_from_slice(b"?\0");
        for unit in target.iter().chain(std::iter::once(&0u16)) {
            data.extend_from_slice(&unit.to_le_bytes());
        }

        assert_eq!(parse_link_target(&data).as_deref(), Some(r"D:\Spiele\Café.exe"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_link_target(b""), None);
        assert_eq!(parse_link_target(b"not a shortcut at all, just text"), None);
        assert_eq!(parse_link_target(&header(0)), None);
    }

    #[test]
    fn test_truncated_link_info() {
        let mut data = ansi_link(r"C:\x.exe", "", false);
        data.truncate(data.len() - 5);
        assert_eq!(parse_link_target(&data), None);
    }

    #[test]
    fn test_unreadable_file_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_shortcut_target(&dir.path().join("missing.lnk")), None);

        let path = dir.path().join("Steam.lnk");
        std::fs::write(&path, ansi_link(r"C:\Steam\steam.exe", "", true)).unwrap();
        assert_eq!(resolve_shortcut_target(&path).as_deref(), Some(r"C:\Steam\steam.exe"));
    }
}
