use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;

use digest::Digest;

/// Public re-exports of the hash algorithms usable with [`Checksum`].
///
/// The module-file codec's default is [`digests::Sha256`].
pub mod digests {
    pub use sha2::Sha256;
}

/// A digest value produced by hash algorithm `D`, stored as raw bytes.
///
/// `Checksum` is generic over the [`Digest`] implementation so the same type
/// serves the module-file codec's whole-file hash, its per-section hashes,
/// and the repository catalog's per-entry hashes, all of which currently use
/// SHA-256 but are not required to.
pub struct Checksum<D: Digest> {
    bytes: Vec<u8>,
    _algorithm: PhantomData<D>,
}

impl<D: Digest> Clone for Checksum<D> {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
            _algorithm: PhantomData,
        }
    }
}

impl<D: Digest> Eq for Checksum<D> {}

impl<D: Digest> PartialEq for Checksum<D> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl<D: Digest> Checksum<D> {
    /// Computes the checksum of `data`.
    pub fn calculate_from(data: impl AsRef<[u8]>) -> Self {
        let mut hasher = D::new();
        hasher.update(data.as_ref());
        Self {
            bytes: hasher.finalize().to_vec(),
            _algorithm: PhantomData,
        }
    }

    /// Wraps a previously computed digest's raw bytes without recomputing it.
    ///
    /// Used when reading a stored checksum back off disk or off the wire; the
    /// caller is responsible for having gotten the bytes from an actual `D` digest.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            _algorithm: PhantomData,
        }
    }

    /// Returns the digest's raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl<D: Digest> Debug for Checksum<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Checksum").field(&hex(&self.bytes)).finish()
    }
}

impl<D: Digest> Display for Checksum<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.bytes))
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculates_sha256() {
        let checksum = Checksum::<digests::Sha256>::calculate_from(b"hello world");
        assert_eq!(
            checksum.to_string(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde"
        );
    }

    #[test]
    fn same_input_same_checksum() {
        let a = Checksum::<digests::Sha256>::calculate_from(b"abc");
        let b = Checksum::<digests::Sha256>::calculate_from(b"abc");
        assert_eq!(a, b);
    }

    #[test]
    fn different_input_different_checksum() {
        let a = Checksum::<digests::Sha256>::calculate_from(b"abc");
        let b = Checksum::<digests::Sha256>::calculate_from(b"abd");
        assert_ne!(a, b);
    }
}
