//! On-disk form of [`FlatL2Index`].
//!
//! Little-endian layout:
//!
//! ```text
//! "HRVI" | version u16 | dim u32 | population u64 | dim*population f32 | blake3(all preceding bytes)
//! ```

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use hrrag_core::error::{Error, Result};
use hrrag_core::store::write_atomic;

use crate::flat::FlatL2Index;

pub const MAGIC: &[u8; 4] = b"HRVI";
pub const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 4 + 8;
const DIGEST_LEN: usize = 32;

impl FlatL2Index {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let dim = u32::try_from(self.dim).map_err(|_| Error::InvalidConfig(format!("dimension {} does not fit the index format", self.dim)))?;
        let mut buf = Vec::with_capacity(HEADER_LEN + self.data.len() * 4 + DIGEST_LEN);
        buf.extend_from_slice(MAGIC);
        buf.write_u16::<LittleEndian>(FORMAT_VERSION)?;
        buf.write_u32::<LittleEndian>(dim)?;
        buf.write_u64::<LittleEndian>(self.len as u64)?;
        for v in &self.data {
            buf.write_f32::<LittleEndian>(*v)?;
        }
        let digest = blake3::hash(&buf);
        buf.extend_from_slice(digest.as_bytes());
        Ok(buf)
    }

    /// `origin` is only used to name the source in error messages.
    pub fn from_bytes(bytes: &[u8], origin: &str) -> Result<Self> {
        let corrupt = |msg: String| Error::CorruptStore(format!("vector index {origin}: {msg}"));
        if bytes.len() < HEADER_LEN + DIGEST_LEN {
            return Err(corrupt(format!("{} bytes is shorter than the header", bytes.len())));
        }
        let (body, digest) = bytes.split_at(bytes.len() - DIGEST_LEN);
        if blake3::hash(body).as_bytes().as_slice() != digest {
            return Err(corrupt("checksum mismatch".to_string()));
        }
        let mut cursor = Cursor::new(body);
        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(corrupt("bad magic".to_string()));
        }
        let version = cursor.read_u16::<LittleEndian>()?;
        if version != FORMAT_VERSION {
            return Err(corrupt(format!("unsupported format version {version}")));
        }
        let dim = cursor.read_u32::<LittleEndian>()? as usize;
        let len = usize::try_from(cursor.read_u64::<LittleEndian>()?).map_err(|_| corrupt("population overflows usize".to_string()))?;
        let payload = body.len() - HEADER_LEN;
        let expected = dim.checked_mul(len).and_then(|n| n.checked_mul(4));
        if expected != Some(payload) {
            return Err(corrupt(format!("header declares {len} vectors of dimension {dim} but payload has {payload} bytes")));
        }
        if dim == 0 && len > 0 {
            return Err(corrupt("zero dimension".to_string()));
        }
        let mut data = vec![0f32; dim * len];
        cursor.read_f32_into::<LittleEndian>(&mut data)?;
        Ok(Self { dim, len, data })
    }

    /// Write to a temp file beside `path`, then rename into place.
    pub fn persist(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_bytes()?)?;
        tracing::info!(path = %path.display(), population = self.len, dim = self.dim, "persisted vector index");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let index = Self::from_bytes(&bytes, &path.display().to_string())?;
        tracing::info!(path = %path.display(), population = index.len, dim = index.dim, "loaded vector index");
        Ok(index)
    }
}
