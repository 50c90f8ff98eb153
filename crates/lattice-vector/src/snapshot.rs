//! Binary snapshot format for the `flat` backend.
//!
//! ```text
//! magic     8 bytes  "LATVEC01"
//! dims      u32 LE   0 when the index never received a vector
//! count     u32 LE
//! count x { id_len u32 LE, id utf-8, dims x f32 LE }
//! ```

use std::path::Path;

use lattice_core::constants::VECTOR_SNAPSHOT_MAGIC;
use lattice_core::errors::PersistenceError;

use crate::atomic_write::{io_err, write_atomic};

pub type Entries = Vec<(String, Vec<f32>)>;

pub fn encode(dims: Option<usize>, entries: &[(String, Vec<f32>)]) -> Vec<u8> {
    let d = dims.unwrap_or(0);
    let mut out = Vec::with_capacity(16 + entries.len() * (16 + d * 4));
    out.extend_from_slice(VECTOR_SNAPSHOT_MAGIC);
    out.extend_from_slice(&(d as u32).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for (id, v) in entries {
        out.extend_from_slice(&(id.len() as u32).to_le_bytes());
        out.extend_from_slice(id.as_bytes());
        for x in v {
            out.extend_from_slice(&x.to_le_bytes());
        }
    }
    out
}

pub fn decode(bytes: &[u8]) -> Result<(Option<usize>, Entries), String> {
    let mut r = Reader { bytes, pos: 0 };
    if r.take(VECTOR_SNAPSHOT_MAGIC.len())? != VECTOR_SNAPSHOT_MAGIC {
        return Err("bad magic".to_string());
    }
    let dims = r.u32()? as usize;
    let count = r.u32()? as usize;
    if dims == 0 && count > 0 {
        return Err(format!("{count} records with zero dimensions"));
    }
    // Every record needs at least an id length and its vector.
    let min_record = dims.saturating_mul(4).saturating_add(4);
    let remaining = bytes.len() - r.pos;
    if count > remaining / min_record {
        return Err(format!(
            "header claims {count} records but only {remaining} bytes follow"
        ));
    }
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let id_len = r.u32()? as usize;
        let id = std::str::from_utf8(r.take(id_len)?)
            .map_err(|e| format!("record {i}: id is not utf-8: {e}"))?
            .to_string();
        let raw = r.take(dims * 4)?;
        let v = raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        entries.push((id, v));
    }
    if r.pos != bytes.len() {
        return Err(format!("{} trailing bytes", bytes.len() - r.pos));
    }
    Ok(((dims > 0).then_some(dims), entries))
}

pub fn write(
    path: &Path,
    dims: Option<usize>,
    entries: &[(String, Vec<f32>)],
) -> Result<(), PersistenceError> {
    write_atomic(path, &encode(dims, entries))
}

pub fn read(path: &Path) -> Result<(Option<usize>, Entries), PersistenceError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    decode(&bytes).map_err(|reason| PersistenceError::Corrupt {
        path: path.display().to_string(),
        reason,
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| format!("truncated at byte {}", self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32, String> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_encodes_header_only() {
        let bytes = encode(None, &[]);
        assert_eq!(bytes.len(), 16);
        assert_eq!(decode(&bytes).unwrap(), (None, vec![]));
    }

    #[test]
    fn decodes_what_it_encodes() {
        let entries = vec![
            ("chunk-1".to_string(), vec![0.5, -1.0]),
            ("chunk-2".to_string(), vec![2.0, 0.25]),
        ];
        let bytes = encode(Some(2), &entries);
        assert_eq!(decode(&bytes).unwrap(), (Some(2), entries));
    }

    #[test]
    fn truncation_and_garbage_are_rejected() {
        let bytes = encode(Some(2), &[("a".to_string(), vec![1.0, 2.0])]);
        assert!(decode(&bytes[..bytes.len() - 1]).is_err());
        let mut extra = bytes.clone();
        extra.push(0);
        assert!(decode(&extra).unwrap_err().contains("trailing"));
        assert!(decode(b"NOTMAGIC\0\0\0\0\0\0\0\0").unwrap_err().contains("magic"));
    }

    #[test]
    fn huge_length_prefix_does_not_panic() {
        let mut bytes = encode(Some(1), &[]);
        bytes[12..16].copy_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn record_count_beyond_body_is_rejected_up_front() {
        let mut bytes = encode(Some(4), &[("a".to_string(), vec![0.0; 4])]);
        bytes[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(decode(&bytes).unwrap_err().contains("claims"));

        let bytes = encode(Some(4), &[("a".to_string(), vec![0.0; 4])]);
        assert_eq!(decode(&bytes).unwrap().1.len(), 1);
    }
}
