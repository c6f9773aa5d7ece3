//! A line-oriented text encoding for [`ModuleInfo`], used as the payload of a
//! module file's MODULE_INFO section and as the on-disk format for a
//! [`crate::Library`]'s per-module descriptor file.
//!
//! One declaration per line, grounded on the simple `key value` line grammar
//! this workspace's metadata-file crates use for their own descriptor formats:
//!
//! ```text
//! module com.example.widget@1.2.0
//! main-class com.example.widget.Main
//! export com.example.widget.api
//! permit com.example.trusted
//! alias com.example.widget.legacy@1.2.0
//! provide com.example.widget.Plugin com.example.widget.impl.DefaultPlugin
//! requires local optional com.example.logging
//! requires public com.example.collections@>=2.0
//! ```

use std::str::FromStr;

use modgraph_types::{Dependence, ModuleId, ModuleInfo, ModuleView, Name};

use crate::error::Error;

/// Serializes a [`ModuleInfo`] into its text descriptor form.
pub fn to_text(info: &ModuleInfo) -> String {
    let mut out = String::new();
    let view = info.declared_view();
    out.push_str(&format!("module {}\n", view.id()));
    if let Some(main_class) = view.main_class() {
        out.push_str(&format!("main-class {main_class}\n"));
    }
    for export in view.exports() {
        out.push_str(&format!("export {export}\n"));
    }
    for permit in view.permits() {
        out.push_str(&format!("permit {permit}\n"));
    }
    for alias in view.aliases() {
        out.push_str(&format!("alias {alias}\n"));
    }
    for (interface, providers) in view.services() {
        for provider in providers {
            out.push_str(&format!("provide {interface} {provider}\n"));
        }
    }
    for dependence in info.requires() {
        let mut line = String::from("requires ");
        if dependence.is_local() {
            line.push_str("local ");
        }
        if dependence.is_public() {
            line.push_str("public ");
        }
        if dependence.is_optional() {
            line.push_str("optional ");
        }
        line.push_str(&dependence.query().to_string());
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Parses a module descriptor's text form into a [`ModuleInfo`].
pub fn from_text(text: &str) -> Result<ModuleInfo, Error> {
    let mut declared_id: Option<ModuleId> = None;
    let mut main_class = None;
    let mut exports = Vec::new();
    let mut permits = Vec::new();
    let mut aliases = Vec::new();
    let mut services: Vec<(Name, Name)> = Vec::new();
    let mut requires = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        let rest = rest.trim();
        match keyword {
            "module" => {
                declared_id = Some(parse_id(rest, line_no)?);
            }
            "main-class" => {
                main_class = Some(parse_name(rest, line_no)?);
            }
            "export" => exports.push(parse_name(rest, line_no)?),
            "permit" => permits.push(parse_name(rest, line_no)?),
            "alias" => aliases.push(parse_id(rest, line_no)?),
            "provide" => {
                let (interface, provider) = rest.split_once(char::is_whitespace).ok_or_else(|| {
                    Error::InvalidDescriptor {
                        line: line_no,
                        message: "expected `provide <interface> <provider>`".to_string(),
                    }
                })?;
                services.push((
                    parse_name(interface, line_no)?,
                    parse_name(provider.trim(), line_no)?,
                ));
            }
            "requires" => {
                requires.push(Dependence::parse_declaration(rest).map_err(|error| {
                    Error::InvalidDescriptor {
                        line: line_no,
                        message: error.to_string(),
                    }
                })?);
            }
            other => {
                return Err(Error::InvalidDescriptor {
                    line: line_no,
                    message: format!("unknown declaration keyword {other:?}"),
                })
            }
        }
    }

    let declared_id = declared_id.ok_or_else(|| Error::InvalidDescriptor {
        line: 0,
        message: "missing `module` declaration".to_string(),
    })?;

    let mut view = ModuleView::new(declared_id);
    if let Some(main_class) = main_class {
        view = view.with_main_class(main_class);
    }
    for export in exports {
        view = view.with_export(export);
    }
    for permit in permits {
        view = view.with_permit(permit);
    }
    for alias in aliases {
        view = view.with_alias(alias);
    }
    for (interface, provider) in services {
        view = view.with_service(interface, provider);
    }

    Ok(ModuleInfo::new(view, requires))
}

fn parse_id(text: &str, line: usize) -> Result<ModuleId, Error> {
    ModuleId::from_str(text).map_err(|error| Error::InvalidDescriptor {
        line,
        message: error.to_string(),
    })
}

fn parse_name(text: &str, line: usize) -> Result<Name, Error> {
    Name::from_str(text).map_err(|error| Error::InvalidDescriptor {
        line,
        message: error.to_string(),
    })
}
