use modgraph_types::{digests::Sha256, Checksum, ModuleId};

use crate::error::Error;
use crate::wire::{put_bytes, put_str, put_u64, Cursor};

/// One published module's catalog record: its sizes, hash, and descriptor text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepoEntry {
    id: ModuleId,
    compressed_size: u64,
    uncompressed_size: u64,
    hash: Checksum<Sha256>,
    descriptor_text: String,
}

impl RepoEntry {
    /// Creates a new entry.
    pub fn new(
        id: ModuleId,
        compressed_size: u64,
        uncompressed_size: u64,
        hash: Checksum<Sha256>,
        descriptor_text: String,
    ) -> Self {
        Self {
            id,
            compressed_size,
            uncompressed_size,
            hash,
            descriptor_text,
        }
    }

    /// Returns the entry's module id.
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Returns the module file's compressed (on-disk) size.
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    /// Returns the module file's uncompressed payload size.
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Returns the module file's whole-file hash.
    pub fn hash(&self) -> &Checksum<Sha256> {
        &self.hash
    }

    /// Returns the entry's stored descriptor text.
    pub fn descriptor_text(&self) -> &str {
        &self.descriptor_text
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        put_str(buf, &self.id.name().to_string());
        put_str(buf, &self.id.version().to_string());
        put_bytes(buf, self.hash.as_bytes());
        put_u64(buf, self.compressed_size);
        put_u64(buf, self.uncompressed_size);
        put_str(buf, &self.descriptor_text);
    }

    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self, Error> {
        use std::str::FromStr;

        let name = cursor.read_str("entry name")?;
        let version = cursor.read_str("entry version")?;
        let id_text = format!("{name}@{version}");
        let id = ModuleId::from_str(&id_text).map_err(|_| Error::UnexpectedEof("entry id"))?;
        let hash = Checksum::from_bytes(cursor.read_bytes("entry hash")?);
        let compressed_size = cursor.read_u64("compressed size")?;
        let uncompressed_size = cursor.read_u64("uncompressed size")?;
        let descriptor_text = cursor.read_str("descriptor text")?;
        Ok(Self {
            id,
            compressed_size,
            uncompressed_size,
            hash,
            descriptor_text,
        })
    }
}
