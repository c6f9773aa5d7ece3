/// The fixed magic number opening every module-file and library artifact.
pub const MAGIC: u32 = 0xCAFE_00FA;

/// The artifact type recorded in a file header, distinguishing module files from
/// the other binary artifacts that share the same magic number and header shape.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::FromRepr)]
#[repr(u16)]
pub enum ArtifactType {
    /// The library directory's own header file.
    LibraryHeader = 0,
    /// A library's module index.
    LibraryModuleIndex = 1,
    /// A library's per-module stored configuration.
    LibraryModuleConfig = 2,
    /// A module file, as produced by [`crate::writer::ModuleFileWriter`].
    ModuleFile = 3,
    /// A repository's stream catalog.
    StreamCatalog = 4,
    /// A remote repository's metadata file.
    RemoteRepoMeta = 5,
    /// A remote repository's module list.
    RemoteRepoList = 6,
}

/// The kind of content carried by a section.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, strum::FromRepr)]
#[repr(u16)]
pub enum SectionType {
    /// The module descriptor. Exactly one per file, first, uncompressed, no subsections.
    ModuleInfo = 0,
    /// The module's compiled classes, packed as a single payload.
    Classes = 1,
    /// Arbitrary resource files, one subsection per file.
    Resources = 2,
    /// Native shared libraries, one subsection per file.
    NativeLibs = 3,
    /// Native executables, one subsection per file.
    NativeCmds = 4,
    /// Configuration files, one subsection per file.
    Config = 5,
    /// An optional signature over the rest of the file.
    Signature = 6,
}

impl SectionType {
    /// Returns whether this section type is carried as a sequence of named
    /// subsections (one per file) rather than a single opaque payload.
    pub fn has_files(self) -> bool {
        matches!(
            self,
            Self::Resources | Self::NativeLibs | Self::NativeCmds | Self::Config
        )
    }
}

/// A compression scheme applied to a section's payload bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::FromRepr)]
#[repr(u16)]
pub enum Compressor {
    /// Payload bytes are stored as-is.
    None = 0,
    /// Payload bytes are gzip-compressed.
    Gzip = 1,
    /// Payload bytes are nominally pack200-then-gzip compressed.
    ///
    /// The true pack200 byte-transposition transform is specific to Java
    /// class files and out of scope here; this variant is accepted on read
    /// and produced on write at the container level (same tag value, same
    /// section-typing rules, same hash discipline) but its payload is carried
    /// as plain gzip bytes rather than a classfile-aware repacking.
    Pack200Gzip = 2,
}

/// The hash algorithm used for a file or section digest.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::FromRepr)]
#[repr(u16)]
pub enum HashType {
    /// SHA-256.
    Sha256 = 0,
}

/// The kind of a subsection entry within a sectioned section.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::FromRepr)]
#[repr(u16)]
pub enum SubsectionKind {
    /// An individual file, identified by a relative path.
    File = 0,
}
