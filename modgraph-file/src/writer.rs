//! Two-pass module-file writer.
//!
//! Pass one builds each section's body bytes and hashes them; pass two
//! assembles the sections into their final order and computes the whole-file
//! hash over everything but the hash bytes themselves and any SIGNATURE
//! section (see the SIGNATURE-vs-`csize` decision recorded in `DESIGN.md`).

use modgraph_types::{digests::Sha256, Checksum};

use crate::compression::compress;
use crate::error::Error;
use crate::format::{Compressor, SectionType};
use crate::wire::{put_bytes_u16_prefixed, put_str_u16_prefixed, put_u16, put_u32, put_u64};

/// The content carried by one section, before compression.
#[derive(Clone, Debug)]
pub enum Payload {
    /// A single opaque blob, used by MODULE_INFO, CLASSES, and SIGNATURE.
    Single(Vec<u8>),
    /// A sequence of named files, used by RESOURCES, NATIVE_LIBS, NATIVE_CMDS, and CONFIG.
    Files(Vec<(String, Vec<u8>)>),
}

#[derive(Debug)]
struct SectionSpec {
    section_type: SectionType,
    compressor: Compressor,
    payload: Payload,
}

/// Builds a module file in memory, section by section, then finalizes it into bytes.
#[derive(Debug, Default)]
pub struct ModuleFileWriter {
    sections: Vec<SectionSpec>,
}

impl ModuleFileWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module descriptor payload. Must be called exactly once, before finishing.
    pub fn module_info(&mut self, descriptor_bytes: Vec<u8>) -> &mut Self {
        self.sections.push(SectionSpec {
            section_type: SectionType::ModuleInfo,
            compressor: Compressor::None,
            payload: Payload::Single(descriptor_bytes),
        });
        self
    }

    /// Sets the packed classes payload, compressed with `compressor`
    /// (which must be [`Compressor::Pack200Gzip`]).
    pub fn classes(&mut self, packed_jar: Vec<u8>, compressor: Compressor) -> &mut Self {
        self.sections.push(SectionSpec {
            section_type: SectionType::Classes,
            compressor,
            payload: Payload::Single(packed_jar),
        });
        self
    }

    /// Adds an optional signature payload, which must be added immediately after
    /// [`Self::module_info`] and before any other section.
    pub fn signature(&mut self, signature_bytes: Vec<u8>) -> &mut Self {
        self.sections.push(SectionSpec {
            section_type: SectionType::Signature,
            compressor: Compressor::None,
            payload: Payload::Single(signature_bytes),
        });
        self
    }

    /// Adds a section carrying individual files (RESOURCES, NATIVE_LIBS, NATIVE_CMDS, CONFIG).
    pub fn files_section(
        &mut self,
        section_type: SectionType,
        compressor: Compressor,
        files: Vec<(String, Vec<u8>)>,
    ) -> &mut Self {
        self.sections.push(SectionSpec {
            section_type,
            compressor,
            payload: Payload::Files(files),
        });
        self
    }

    /// Validates section-typing rules, then assembles and hashes the final file bytes.
    pub fn finish(self) -> Result<Vec<u8>, Error> {
        validate_rules(&self.sections)?;

        let mut usize_total: u64 = 0;
        let mut section_blobs: Vec<(SectionType, Vec<u8>)> = Vec::with_capacity(self.sections.len());

        for spec in &self.sections {
            let (blob, raw_len) = build_section(spec)?;
            usize_total += raw_len;
            section_blobs.push((spec.section_type, blob));
        }

        let sections_concat: Vec<u8> = section_blobs
            .iter()
            .flat_map(|(_, blob)| blob.iter().copied())
            .collect();
        let csize = sections_concat.len() as u64;

        let hashable_sections: Vec<u8> = section_blobs
            .iter()
            .filter(|(section_type, _)| *section_type != SectionType::Signature)
            .flat_map(|(_, blob)| blob.iter().copied())
            .collect();

        // The digest is fixed-length for a given algorithm, so the header's
        // length-prefixed hash field can be sized before the hash itself is known.
        let hash_len = Checksum::<Sha256>::calculate_from(b"").as_bytes().len();
        let header_prefix = build_header_prefix(csize, usize_total, hash_len);

        let mut hashable = header_prefix.clone();
        hashable.extend_from_slice(&hashable_sections);
        let file_hash = Checksum::<Sha256>::calculate_from(&hashable);

        let mut out = header_prefix;
        out.extend_from_slice(file_hash.as_bytes());
        out.extend_from_slice(&sections_concat);
        Ok(out)
    }
}

/// Builds the file header's fixed-length fields, up to but excluding the
/// hash bytes themselves. Included in the whole-file hash per the module-file
/// format's "every byte but the hash bytes and any SIGNATURE section" rule.
fn build_header_prefix(csize: u64, usize_total: u64, hash_len: usize) -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, crate::format::MAGIC);
    put_u16(&mut out, crate::format::ArtifactType::ModuleFile as u16);
    put_u16(&mut out, 0); // major version
    put_u16(&mut out, 0); // minor version
    put_u64(&mut out, csize);
    put_u64(&mut out, usize_total);
    put_u16(&mut out, crate::format::HashType::Sha256 as u16);
    put_u16(&mut out, hash_len as u16);
    out
}

fn build_section(spec: &SectionSpec) -> Result<(Vec<u8>, u64), Error> {
    let (body, subsection_count, raw_len) = match &spec.payload {
        Payload::Single(data) => {
            let compressed = compress(spec.compressor, data)?;
            (compressed, 0u16, data.len() as u64)
        }
        Payload::Files(files) => {
            let mut body = Vec::new();
            let mut raw_len = 0u64;
            for (path, content) in files {
                let compressed = compress(spec.compressor, content)?;
                put_u16(&mut body, crate::format::SubsectionKind::File as u16);
                put_u32(&mut body, compressed.len() as u32);
                put_str_u16_prefixed(&mut body, path);
                body.extend_from_slice(&compressed);
                raw_len += content.len() as u64;
            }
            (body, files.len() as u16, raw_len)
        }
    };

    let section_hash = Checksum::<Sha256>::calculate_from(&body);

    let mut blob = Vec::new();
    put_u16(&mut blob, spec.section_type as u16);
    put_u16(&mut blob, spec.compressor as u16);
    put_u32(&mut blob, body.len() as u32);
    put_u16(&mut blob, subsection_count);
    put_bytes_u16_prefixed(&mut blob, section_hash.as_bytes());
    blob.extend_from_slice(&body);

    Ok((blob, raw_len))
}

fn validate_rules(sections: &[SectionSpec]) -> Result<(), Error> {
    match sections.first() {
        Some(spec) if spec.section_type == SectionType::ModuleInfo => {}
        _ => {
            return Err(Error::ModuleInfoPlacement(
                "MODULE_INFO must be the first section",
            ))
        }
    }
    if sections
        .iter()
        .filter(|s| s.section_type == SectionType::ModuleInfo)
        .count()
        != 1
    {
        return Err(Error::ModuleInfoPlacement(
            "MODULE_INFO must appear exactly once",
        ));
    }
    if sections
        .iter()
        .filter(|s| s.section_type == SectionType::Classes)
        .count()
        > 1
    {
        return Err(Error::DuplicateClasses);
    }
    if let Some(index) = sections
        .iter()
        .position(|s| s.section_type == SectionType::Signature)
    {
        if index != 1 {
            return Err(Error::MisplacedSignature);
        }
    }
    for spec in sections {
        let allowed = match spec.section_type {
            SectionType::ModuleInfo | SectionType::Signature => spec.compressor == Compressor::None,
            SectionType::Classes => spec.compressor == Compressor::Pack200Gzip,
            SectionType::Resources
            | SectionType::NativeLibs
            | SectionType::NativeCmds
            | SectionType::Config => {
                matches!(spec.compressor, Compressor::None | Compressor::Gzip)
            }
        };
        if !allowed {
            return Err(Error::IllegalCompressorForSection {
                section: spec.section_type,
                compressor: spec.compressor,
            });
        }
        if spec.section_type.has_files() != matches!(spec.payload, Payload::Files(_)) {
            return Err(Error::ModuleInfoPlacement(
                "section's payload shape does not match its type",
            ));
        }
    }
    Ok(())
}
