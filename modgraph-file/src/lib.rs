#![doc = "Reader and writer for the modgraph module-file binary container format."]

mod compression;
mod error;
mod format;
mod reader;
mod wire;
mod writer;

pub use error::Error;
pub use format::{ArtifactType, Compressor, HashType, SectionType, SubsectionKind, MAGIC};
pub use reader::{Event, ModuleFileReader};
pub use writer::{ModuleFileWriter, Payload};

#[cfg(test)]
mod integration_tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn full_module_round_trip() -> TestResult {
        let mut writer = ModuleFileWriter::new();
        writer
            .module_info(b"module com.example.widget 1.0.0".to_vec())
            .classes(b"packed classes bytes".to_vec(), Compressor::Pack200Gzip)
            .files_section(
                SectionType::Resources,
                Compressor::Gzip,
                vec![("icon.png".to_string(), vec![0u8; 32])],
            )
            .files_section(
                SectionType::Config,
                Compressor::None,
                vec![("settings.properties".to_string(), b"k=v".to_vec())],
            );
        let bytes = writer.finish()?;

        let mut reader = ModuleFileReader::parse(&bytes)?;
        let mut events = Vec::new();
        loop {
            let event = reader.next_event()?;
            let done = event == Event::EndFile;
            events.push(event);
            if done {
                break;
            }
        }
        assert_eq!(events.first(), Some(&Event::StartFile));
        assert_eq!(events.last(), Some(&Event::EndFile));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::StartSection {
                section_type: SectionType::Classes,
                ..
            }
        )));
        Ok(())
    }
}
