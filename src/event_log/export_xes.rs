use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use quick_xml::events::BytesDecl;
use quick_xml::Writer;

use super::event_log_struct::{Attribute, AttributeValue, Attributes, EventLog};

const OK: Result<(), std::io::Error> = Ok(());

///
/// Export an [`EventLog`] as XES XML to a writer
///
pub fn export_xes_event_log<W: Write>(
    writer: &mut Writer<W>,
    log: &EventLog,
) -> Result<(), quick_xml::Error> {
    writer.write_event(quick_xml::events::Event::Decl(BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        None,
    )))?;
    writer
        .create_element("log")
        .with_attributes(vec![
            ("xes.version", "2.0"),
            ("xmlns", "http://www.xes-standard.org/"),
        ])
        .write_inner_content(|w| {
            if let Some(global_trace_attrs) = &log.global_trace_attrs {
                write_globals(w, "trace", global_trace_attrs)?;
            }
            if let Some(global_event_attrs) = &log.global_event_attrs {
                write_globals(w, "event", global_event_attrs)?;
            }
            if let Some(classifiers) = &log.classifiers {
                for cl in classifiers {
                    w.create_element("classifier")
                        .with_attributes(vec![
                            ("name", cl.name.as_str()),
                            ("keys", cl.keys.join(" ").as_str()),
                        ])
                        .write_empty()?;
                }
            }
            for a in &log.attributes {
                write_xes_attribute(w, a)?;
            }
            for t in &log.traces {
                w.create_element("trace").write_inner_content(|w| {
                    for a in &t.attributes {
                        write_xes_attribute(w, a)?;
                    }
                    for e in &t.events {
                        w.create_element("event").write_inner_content(|w| {
                            for a in &e.attributes {
                                write_xes_attribute(w, a)?;
                            }
                            OK
                        })?;
                    }
                    OK
                })?;
            }
            OK
        })?;
    Ok(())
}

fn write_globals<W: Write>(
    w: &mut Writer<W>,
    scope: &str,
    attrs: &Attributes,
) -> Result<(), std::io::Error> {
    w.create_element("global")
        .with_attribute(("scope", scope))
        .write_inner_content(|w| {
            for a in attrs {
                write_xes_attribute(w, a)?;
            }
            OK
        })?;
    OK
}

fn write_xes_attribute<W: Write>(w: &mut Writer<W>, a: &Attribute) -> Result<(), std::io::Error> {
    let (tag_name, value_opt): (&str, Option<String>) = match &a.value {
        AttributeValue::String(s) => ("string", Some(s.clone())),
        AttributeValue::Date(d) => ("date", Some(d.to_rfc3339())),
        AttributeValue::Int(i) => ("int", Some(i.to_string())),
        AttributeValue::Float(f) => ("float", Some(f.to_string())),
        AttributeValue::Boolean(b) => ("boolean", Some(b.to_string())),
        AttributeValue::ID(id) => ("id", Some(id.to_string())),
        AttributeValue::None => ("string", None),
    };
    match value_opt {
        Some(value) => w
            .create_element(tag_name)
            .with_attributes(vec![("key", a.key.as_str()), ("value", value.as_str())])
            .write_empty()?,
        None => w
            .create_element(tag_name)
            .with_attribute(("key", a.key.as_str()))
            .write_empty()?,
    };
    OK
}

///
/// Export an [`EventLog`] to a XES file at the given path
///
/// Compresses the output with gzip if the path ends with `.gz`.
///
pub fn export_xes_event_log_to_file_path<P: AsRef<Path>>(
    log: &EventLog,
    path: P,
) -> Result<(), quick_xml::Error> {
    let is_gz = path
        .as_ref()
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    let file = File::create(path)?;
    if is_gz {
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::fast());
        export_xes_event_log(&mut Writer::new(BufWriter::new(encoder)), log)
    } else {
        export_xes_event_log(&mut Writer::new(BufWriter::new(file)), log)
    }
}

///
/// Export an [`EventLog`] to a XES XML string
///
pub fn export_xes_event_log_to_string(log: &EventLog) -> Result<String, quick_xml::Error> {
    let mut buf = Vec::new();
    export_xes_event_log(&mut Writer::new(&mut buf), log)?;
    Ok(String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?)
}
