//! Pull-based module-file reader.
//!
//! Consumers drive the reader by repeatedly calling [`ModuleFileReader::next_event`],
//! which walks the sequence `START_FILE -> (START_SECTION -> (START_SUBSECTION ->
//! END_SUBSECTION)* -> END_SECTION)* -> END_FILE`. Content is only accessible
//! while positioned at `START_SECTION` (for sections without subsections) or
//! `START_SUBSECTION`.

use modgraph_types::{digests::Sha256, Checksum};

use crate::compression::decompress;
use crate::error::Error;
use crate::format::{ArtifactType, Compressor, HashType, SectionType};
use crate::wire::Cursor;

/// One step emitted by the reader's pull-based event stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// The file header has been parsed and its declared hash is available.
    StartFile,
    /// Positioned at the start of a section; content is accessible if it has no subsections.
    StartSection {
        /// The section's type.
        section_type: SectionType,
        /// The section's compressor.
        compressor: Compressor,
        /// Whether this section carries named subsections rather than a single payload.
        has_subsections: bool,
    },
    /// Positioned at the start of a subsection; its content is accessible.
    StartSubsection {
        /// The subsection's relative path.
        path: String,
    },
    /// The current subsection has been fully consumed.
    EndSubsection,
    /// The current section has been fully consumed; its hash has been verified.
    EndSection,
    /// The file has been fully consumed; its whole-file hash has been verified.
    EndFile,
}

#[derive(Debug)]
struct SectionMeta {
    section_type: SectionType,
    compressor: Compressor,
    body_start: usize,
    body_len: usize,
    subsections: u16,
    hash: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    StartFile,
    StartSection,
    StartSubsection,
    EndSubsection,
    EndSection,
    EndFile,
    Done,
}

/// A reader positioned over an in-memory module-file buffer.
#[derive(Debug)]
pub struct ModuleFileReader<'a> {
    data: &'a [u8],
    sections: Vec<SectionMeta>,
    hashable: Vec<u8>,
    file_hash: Vec<u8>,
    phase: Phase,
    section_index: usize,
    sub_cursor: usize,
    sub_index: u16,
    current_subsection: Option<(String, usize, usize)>,
}

impl<'a> ModuleFileReader<'a> {
    /// Parses the file header and scans (without decompressing) every section's extent.
    pub fn parse(data: &'a [u8]) -> Result<Self, Error> {
        let mut cursor = Cursor::new(data);
        let magic = cursor.read_u32("magic")?;
        if magic != crate::format::MAGIC {
            return Err(Error::BadMagic { found: magic, offset: 0 });
        }
        let artifact_type_value = cursor.read_u16("artifact type")?;
        let artifact_type = ArtifactType::from_repr(artifact_type_value).ok_or(Error::InvalidTag {
            field: "artifact type",
            value: artifact_type_value as u64,
            offset: cursor.position(),
        })?;
        if artifact_type != ArtifactType::ModuleFile {
            return Err(Error::InvalidTag {
                field: "artifact type",
                value: artifact_type_value as u64,
                offset: cursor.position(),
            });
        }
        let _major = cursor.read_u16("major version")?;
        let _minor = cursor.read_u16("minor version")?;
        let csize = cursor.read_u64("csize")? as usize;
        let _usize_total = cursor.read_u64("uncompressed size")?;
        let hash_type_value = cursor.read_u16("hash type")?;
        let _hash_type = HashType::from_repr(hash_type_value).ok_or(Error::InvalidTag {
            field: "hash type",
            value: hash_type_value as u64,
            offset: cursor.position(),
        })?;
        let hash_len = cursor.read_u16("hash length")? as usize;
        let header_prefix_len = cursor.position();
        let file_hash = cursor.read_bytes(hash_len, "file hash")?.to_vec();
        let region_start = cursor.position();

        if data.len() < region_start + csize {
            return Err(Error::UnexpectedEof("section bytes"));
        }
        let sections = scan_sections(data, region_start, csize)?;

        // The whole-file hash covers the fixed header fields (everything up to,
        // but not including, the stored hash bytes) plus every non-SIGNATURE section.
        let mut hashable: Vec<u8> = data[..header_prefix_len].to_vec();
        hashable.extend(
            sections
                .iter()
                .filter(|meta| meta.section_type != SectionType::Signature)
                .flat_map(|meta| section_header_and_body(data, meta)),
        );

        Ok(Self {
            data,
            sections,
            hashable,
            file_hash,
            phase: Phase::StartFile,
            section_index: 0,
            sub_cursor: 0,
            sub_index: 0,
            current_subsection: None,
        })
    }

    /// Advances the reader and returns the next event.
    pub fn next_event(&mut self) -> Result<Event, Error> {
        match self.phase {
            Phase::StartFile => self.enter_section_or_end_file(),
            Phase::StartSection => {
                let (subsections, body_start) = {
                    let meta = self.current_section();
                    (meta.subsections, meta.body_start)
                };
                if subsections > 0 {
                    self.sub_cursor = body_start;
                    self.sub_index = 0;
                    self.begin_subsection()
                } else {
                    self.finish_section()
                }
            }
            Phase::StartSubsection => {
                self.current_subsection = None;
                self.phase = Phase::EndSubsection;
                Ok(Event::EndSubsection)
            }
            Phase::EndSubsection => {
                let subsections = self.current_section().subsections;
                if self.sub_index < subsections {
                    self.begin_subsection()
                } else {
                    self.finish_section()
                }
            }
            Phase::EndSection => {
                self.section_index += 1;
                self.enter_section_or_end_file()
            }
            Phase::EndFile => {
                self.phase = Phase::Done;
                Ok(Event::EndFile)
            }
            Phase::Done => Err(Error::IllegalState("reader already reached END_FILE")),
        }
    }

    /// Returns the decompressed content of the current section or subsection.
    ///
    /// Valid only immediately after [`Event::StartSection`] (for a section with
    /// no subsections) or [`Event::StartSubsection`].
    pub fn content(&self) -> Result<Vec<u8>, Error> {
        match self.phase {
            Phase::StartSection => {
                let meta = self.current_section();
                if meta.subsections > 0 {
                    return Err(Error::IllegalState(
                        "section has subsections; read subsection content instead",
                    ));
                }
                let body = &self.data[meta.body_start..meta.body_start + meta.body_len];
                decompress(meta.compressor, body)
            }
            Phase::StartSubsection => {
                let (_, start, len) = self
                    .current_subsection
                    .as_ref()
                    .expect("StartSubsection phase always has current_subsection set");
                let compressor = self.current_section().compressor;
                decompress(compressor, &self.data[*start..*start + *len])
            }
            _ => Err(Error::IllegalState(
                "content is only accessible at START_SECTION or START_SUBSECTION",
            )),
        }
    }

    fn current_section(&self) -> &SectionMeta {
        &self.sections[self.section_index]
    }

    fn enter_section_or_end_file(&mut self) -> Result<Event, Error> {
        if self.section_index >= self.sections.len() {
            self.verify_file_hash()?;
            self.phase = Phase::EndFile;
            return self.next_event();
        }
        self.phase = Phase::StartSection;
        let meta = self.current_section();
        Ok(Event::StartSection {
            section_type: meta.section_type,
            compressor: meta.compressor,
            has_subsections: meta.subsections > 0,
        })
    }

    fn begin_subsection(&mut self) -> Result<Event, Error> {
        let mut cursor = Cursor::new(&self.data[self.sub_cursor..]);
        let kind_value = cursor.read_u16("subsection kind")?;
        crate::format::SubsectionKind::from_repr(kind_value).ok_or(Error::InvalidTag {
            field: "subsection kind",
            value: kind_value as u64,
            offset: self.sub_cursor,
        })?;
        let csize = cursor.read_u32("subsection csize")? as usize;
        let path = cursor.read_str_u16_prefixed("subsection path")?;
        let header_len = cursor.position();
        let content_start = self.sub_cursor + header_len;
        modgraph_common::resolve_within(
            std::path::Path::new("."),
            std::path::Path::new(&path),
        )?;
        self.current_subsection = Some((path.clone(), content_start, csize));
        self.sub_cursor = content_start + csize;
        self.sub_index += 1;
        self.phase = Phase::StartSubsection;
        Ok(Event::StartSubsection { path })
    }

    fn finish_section(&mut self) -> Result<Event, Error> {
        let meta = self.current_section();
        let body = &self.data[meta.body_start..meta.body_start + meta.body_len];
        let computed = Checksum::<Sha256>::calculate_from(body);
        if computed.as_bytes() != meta.hash.as_slice() {
            return Err(Error::HashMismatch {
                scope: format!("section {:?}", meta.section_type),
                expected: hex(&meta.hash),
                actual: computed.to_string(),
            });
        }
        self.phase = Phase::EndSection;
        Ok(Event::EndSection)
    }

    fn verify_file_hash(&self) -> Result<(), Error> {
        let computed = Checksum::<Sha256>::calculate_from(&self.hashable);
        if computed.as_bytes() != self.file_hash.as_slice() {
            return Err(Error::HashMismatch {
                scope: "file".to_string(),
                expected: hex(&self.file_hash),
                actual: computed.to_string(),
            });
        }
        Ok(())
    }
}

fn section_header_and_body(data: &[u8], meta: &SectionMeta) -> Vec<u8> {
    // The header precedes `body_start` by type(2)+compressor(2)+csize(4)+subsections(2)+
    // hashLength(2)+hash(N); recomputing its start from body_start keeps this function
    // a pure slice lookup rather than needing the scan to remember header offsets too.
    let header_len = 2 + 2 + 4 + 2 + 2 + meta.hash.len();
    let header_start = meta.body_start - header_len;
    data[header_start..meta.body_start + meta.body_len].to_vec()
}

fn scan_sections(data: &[u8], region_start: usize, region_len: usize) -> Result<Vec<SectionMeta>, Error> {
    let region = &data[region_start..region_start + region_len];
    let mut cursor = Cursor::new(region);
    let mut metas = Vec::new();
    let mut seen_module_info = false;
    let mut seen_classes = false;
    let mut index = 0usize;

    while cursor.remaining() > 0 {
        let type_value = cursor.read_u16("section type")?;
        let section_type = SectionType::from_repr(type_value).ok_or(Error::InvalidTag {
            field: "section type",
            value: type_value as u64,
            offset: region_start + cursor.position(),
        })?;
        let compressor_value = cursor.read_u16("compressor")?;
        let compressor = Compressor::from_repr(compressor_value).ok_or(Error::InvalidTag {
            field: "compressor",
            value: compressor_value as u64,
            offset: region_start + cursor.position(),
        })?;
        let csize = cursor.read_u32("section csize")? as usize;
        let subsections = cursor.read_u16("subsection count")?;
        let hash_len = cursor.read_u16("section hash length")? as usize;
        let hash = cursor.read_bytes(hash_len, "section hash")?.to_vec();
        let body_start = region_start + cursor.position();
        cursor.read_bytes(csize, "section body")?;

        if index == 0 && section_type != SectionType::ModuleInfo {
            return Err(Error::ModuleInfoPlacement(
                "MODULE_INFO must be the first section",
            ));
        }
        if section_type == SectionType::ModuleInfo {
            if seen_module_info {
                return Err(Error::ModuleInfoPlacement(
                    "MODULE_INFO must appear exactly once",
                ));
            }
            seen_module_info = true;
        }
        if section_type == SectionType::Classes {
            if seen_classes {
                return Err(Error::DuplicateClasses);
            }
            seen_classes = true;
        }
        if section_type == SectionType::Signature && index != 1 {
            return Err(Error::MisplacedSignature);
        }

        metas.push(SectionMeta {
            section_type,
            compressor,
            body_start,
            body_len: csize,
            subsections,
            hash,
        });
        index += 1;
    }

    if !seen_module_info {
        return Err(Error::ModuleInfoPlacement("MODULE_INFO section is missing"));
    }
    Ok(metas)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::writer::ModuleFileWriter;

    #[test]
    fn round_trips_module_info_only() -> TestResult {
        let mut writer = ModuleFileWriter::new();
        writer.module_info(b"name com.example".to_vec());
        let bytes = writer.finish()?;

        let mut reader = ModuleFileReader::parse(&bytes)?;
        assert_eq!(reader.next_event()?, Event::StartFile);
        assert_eq!(
            reader.next_event()?,
            Event::StartSection {
                section_type: SectionType::ModuleInfo,
                compressor: Compressor::None,
                has_subsections: false,
            }
        );
        assert_eq!(reader.content()?, b"name com.example");
        assert_eq!(reader.next_event()?, Event::EndSection);
        assert_eq!(reader.next_event()?, Event::EndFile);
        Ok(())
    }

    #[test]
    fn round_trips_resources_with_subsections() -> TestResult {
        let mut writer = ModuleFileWriter::new();
        writer.module_info(b"name com.example".to_vec());
        writer.files_section(
            SectionType::Resources,
            Compressor::Gzip,
            vec![
                ("a.txt".to_string(), b"alpha".to_vec()),
                ("b.txt".to_string(), b"beta".to_vec()),
            ],
        );
        let bytes = writer.finish()?;

        let mut reader = ModuleFileReader::parse(&bytes)?;
        assert_eq!(reader.next_event()?, Event::StartFile);
        reader.next_event()?; // StartSection MODULE_INFO
        reader.next_event()?; // EndSection MODULE_INFO
        assert_eq!(
            reader.next_event()?,
            Event::StartSection {
                section_type: SectionType::Resources,
                compressor: Compressor::Gzip,
                has_subsections: true,
            }
        );
        assert_eq!(
            reader.next_event()?,
            Event::StartSubsection { path: "a.txt".to_string() }
        );
        assert_eq!(reader.content()?, b"alpha");
        assert_eq!(reader.next_event()?, Event::EndSubsection);
        assert_eq!(
            reader.next_event()?,
            Event::StartSubsection { path: "b.txt".to_string() }
        );
        assert_eq!(reader.content()?, b"beta");
        assert_eq!(reader.next_event()?, Event::EndSubsection);
        assert_eq!(reader.next_event()?, Event::EndSection);
        assert_eq!(reader.next_event()?, Event::EndFile);
        Ok(())
    }

    #[test]
    fn corrupt_section_body_fails_hash_at_end_section() -> TestResult {
        let mut writer = ModuleFileWriter::new();
        writer.module_info(b"name com.example".to_vec());
        writer.classes(b"fake packed jar bytes".to_vec(), Compressor::Pack200Gzip);
        let mut bytes = writer.finish()?;
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let mut reader = ModuleFileReader::parse(&bytes)?;
        reader.next_event()?; // StartFile
        reader.next_event()?; // StartSection MODULE_INFO
        reader.next_event()?; // EndSection MODULE_INFO
        reader.next_event()?; // StartSection CLASSES
        let result = reader.next_event(); // EndSection CLASSES should fail
        assert!(matches!(result, Err(Error::HashMismatch { .. })));
        Ok(())
    }

    #[test]
    fn corrupt_file_hash_fails_at_end_file() -> TestResult {
        let mut writer = ModuleFileWriter::new();
        writer.module_info(b"name com.example".to_vec());
        let mut bytes = writer.finish()?;
        // Byte 24 sits inside the 30-byte fixed header prefix (in the uncompressed-size
        // field), which is covered by the whole-file hash, so tampering here must be caught.
        bytes[24] ^= 0xFF;

        let mut reader = ModuleFileReader::parse(&bytes)?;
        reader.next_event()?; // StartFile
        reader.next_event()?; // StartSection
        reader.next_event()?; // EndSection
        let result = reader.next_event(); // should attempt EndFile and fail
        assert!(matches!(result, Err(Error::HashMismatch { .. })));
        Ok(())
    }
}
