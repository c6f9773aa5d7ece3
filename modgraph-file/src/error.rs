/// An error that can occur while reading or writing a module file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The file's magic number did not match [`crate::format::MAGIC`].
    #[error("bad magic number 0x{found:08x} at offset {offset}")]
    BadMagic {
        /// The magic number actually found.
        found: u32,
        /// The byte offset at which it was read.
        offset: usize,
    },

    /// An artifact, section, compressor, or subsection tag did not map to a known value.
    #[error("invalid {field} value {value} at offset {offset}")]
    InvalidTag {
        /// The name of the field that carried the bad value, e.g. "section type".
        field: &'static str,
        /// The raw value that was read.
        value: u64,
        /// The byte offset at which it was read.
        offset: usize,
    },

    /// A section carried a compressor or subsection count its type does not allow.
    #[error("section {section:?} may not use compressor {compressor:?}")]
    IllegalCompressorForSection {
        /// The offending section type.
        section: crate::format::SectionType,
        /// The offending compressor.
        compressor: crate::format::Compressor,
    },

    /// MODULE_INFO was missing, duplicated, or not first.
    #[error("{0}")]
    ModuleInfoPlacement(&'static str),

    /// CLASSES appeared more than once.
    #[error("CLASSES section may appear at most once")]
    DuplicateClasses,

    /// SIGNATURE appeared somewhere other than immediately after MODULE_INFO.
    #[error("SIGNATURE section must immediately follow MODULE_INFO")]
    MisplacedSignature,

    /// A computed hash did not match the hash stored in the file.
    #[error("hash mismatch in {scope}: expected {expected}, computed {actual}")]
    HashMismatch {
        /// What the hash covers, e.g. "file" or "section CLASSES".
        scope: String,
        /// The hash recorded in the file.
        expected: String,
        /// The hash actually computed while reading.
        actual: String,
    },

    /// A reader method was called in a state that does not allow it.
    #[error("illegal reader state: {0}")]
    IllegalState(&'static str),

    /// The file ended before a length-prefixed field could be fully read.
    #[error("unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),

    /// A subsection path was absolute or escaped the destination root.
    #[error(transparent)]
    PathEscape(#[from] modgraph_common::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
