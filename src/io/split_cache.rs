//! On-disk cache of division-candidate track ids.
//!
//! Layout (little-endian): magic `TCSP`, u16 version, u16 reserved, u64 CRC-64
//! of the raw input table bytes, u64 count, count x u64 track ids. The stored
//! CRC must match the current input before the set is reused; a mismatch or a
//! malformed file triggers recomputation rather than an error.

use std::path::Path;

use anyhow::{Context, Result, bail};

pub const MAGIC: [u8; 4] = *b"TCSP";
pub const VERSION: u16 = 1;

const HEADER_BYTES: usize = 24;

#[derive(Debug)]
pub struct SplitCache {
    pub input_crc: u64,
    pub tracks: Vec<u64>,
}

pub fn write_cache(path: &Path, input_crc: u64, tracks: &[u64]) -> Result<()> {
    let mut bytes = Vec::with_capacity(HEADER_BYTES + tracks.len() * 8);
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&input_crc.to_le_bytes());
    bytes.extend_from_slice(&(tracks.len() as u64).to_le_bytes());
    for track_id in tracks {
        bytes.extend_from_slice(&track_id.to_le_bytes());
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write candidate cache {}", path.display()))?;
    Ok(())
}

pub fn read_cache(path: &Path) -> Result<SplitCache> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read candidate cache {}", path.display()))?;
    if bytes.len() < HEADER_BYTES {
        bail!("candidate cache {} is truncated", path.display());
    }
    if bytes[0..4] != MAGIC {
        bail!("candidate cache {} has bad magic", path.display());
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        bail!(
            "candidate cache {} has unsupported version {}",
            path.display(),
            version
        );
    }
    let input_crc = u64::from_le_bytes(bytes[8..16].try_into()?);
    let count = u64::from_le_bytes(bytes[16..24].try_into()?) as usize;
    let expected = HEADER_BYTES + count * 8;
    if bytes.len() != expected {
        bail!(
            "candidate cache {} length mismatch: {} != {}",
            path.display(),
            bytes.len(),
            expected
        );
    }

    let mut tracks = Vec::with_capacity(count);
    for i in 0..count {
        let offset = HEADER_BYTES + i * 8;
        tracks.push(u64::from_le_bytes(bytes[offset..offset + 8].try_into()?));
    }
    Ok(SplitCache { input_crc, tracks })
}
