//! File identifiers
//!
//! A file id (`fid`) is issued by the master on assign and names one needle
//! inside one volume: `"<volume_id>,<key_hex><cookie_hex>"`, for example
//! `"3,01637037d6"`. The cookie is always the trailing 8 hex digits. When the
//! master hands out several ids at once (`count > 1`) the extra ids are
//! written as `"<fid>_<n>"`, meaning key + n.

use crate::error::{WeedError, WeedResult};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const COOKIE_HEX_LEN: usize = 8;
const KEY_HEX_MAX_LEN: usize = 16;

/// Extract the volume id from a file id.
///
/// Only the part before the first `,` is inspected. It must be a non-empty
/// run of ASCII digits that fits in a `u32`; anything else is rejected
/// instead of being passed on to the master.
pub fn parse_volume_id(fid: &str) -> WeedResult<u32> {
    let (prefix, _) = fid
        .split_once(',')
        .ok_or_else(|| WeedError::MalformedIdentifier(fid.to_string()))?;

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WeedError::MalformedIdentifier(fid.to_string()));
    }

    prefix
        .parse::<u32>()
        .map_err(|_| WeedError::MalformedIdentifier(fid.to_string()))
}

/// Decoded file identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    pub volume_id: u32,
    pub file_key: u64,
    pub cookie: u32,
}

impl FileId {
    pub fn new(volume_id: u32, file_key: u64, cookie: u32) -> Self {
        Self {
            volume_id,
            file_key,
            cookie,
        }
    }
}

impl FromStr for FileId {
    type Err = WeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || WeedError::MalformedIdentifier(s.to_string());

        let volume_id = parse_volume_id(s)?;
        let (_, needle) = s.split_once(',').ok_or_else(malformed)?;

        let (key_cookie, delta) = match needle.split_once('_') {
            Some((head, delta)) => {
                if delta.is_empty() || !delta.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed());
                }
                (head, delta.parse::<u64>().map_err(|_| malformed())?)
            }
            None => (needle, 0),
        };

        if key_cookie.len() <= COOKIE_HEX_LEN
            || key_cookie.len() > KEY_HEX_MAX_LEN + COOKIE_HEX_LEN
            || !key_cookie.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(malformed());
        }

        let (key_hex, cookie_hex) = key_cookie.split_at(key_cookie.len() - COOKIE_HEX_LEN);
        let file_key = u64::from_str_radix(key_hex, 16).map_err(|_| malformed())?;
        let cookie = u32::from_str_radix(cookie_hex, 16).map_err(|_| malformed())?;
        let file_key = file_key.checked_add(delta).ok_or_else(malformed)?;

        Ok(FileId {
            volume_id,
            file_key,
            cookie,
        })
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut bytes = [0u8; 12];
        bytes[..8].copy_from_slice(&self.file_key.to_be_bytes());
        bytes[8..].copy_from_slice(&self.cookie.to_be_bytes());

        // Leading zero bytes of the key are dropped, the cookie is kept whole.
        let start = bytes[..8].iter().take_while(|b| **b == 0).count();
        write!(f, "{},{}", self.volume_id, hex::encode(&bytes[start..]))
    }
}
