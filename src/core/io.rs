use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

enum UploadBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// The raw bytes of one uploaded file plus the name it was declared under.
pub struct Upload {
    name: String,
    bytes: UploadBytes,
}

impl Upload {
    pub fn open(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .context("failed to determine input filename")?;
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("failed to stat {}", path.display()))?
            .len();
        // Zero-length files cannot be mapped on every platform.
        let bytes = if len == 0 {
            UploadBytes::Owned(Vec::new())
        } else {
            // SAFETY: read-only file mapping.
            let mmap = unsafe { Mmap::map(&file) }.with_context(|| "mmap failed")?;
            UploadBytes::Mapped(mmap)
        };
        Ok(Self { name, bytes })
    }

    pub fn from_reader<R: Read>(mut reader: R, name: &str) -> Result<Self> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .with_context(|| format!("failed to read {}", name))?;
        Ok(Self::from_bytes(buf, name))
    }

    pub fn from_bytes(bytes: Vec<u8>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            bytes: UploadBytes::Owned(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.bytes {
            UploadBytes::Mapped(m) => &m[..],
            UploadBytes::Owned(v) => &v[..],
        }
    }
}

pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC
}

pub fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len() * 4);
    MultiGzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

/// Splits `reads.fasta.gz` into `("reads.fasta", true)`.
pub fn strip_gz_suffix(name: &str) -> (&str, bool) {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".gz") {
        (&name[..name.len() - 3], true)
    } else {
        (name, false)
    }
}

pub fn extension(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(|s| s.to_str())
}
