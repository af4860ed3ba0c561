use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use flate2::bufread::GzDecoder;
use quick_xml::events::{BytesStart, Event as XMLEvent};
use quick_xml::Error as QuickXMLError;
use quick_xml::Reader;
use uuid::Uuid;

use super::event_log_struct::{
    Attribute, AttributeValue, Attributes, EditableAttributes, Event, EventLog,
    EventLogClassifier, Trace,
};

///
/// Error encountered while parsing XES
///
#[derive(Debug, Clone)]
pub enum XESParseError {
    /// An attribute was encountered outside an open `<log>` tag
    AttributeOutsideLog,
    /// There is no top-level `<log>`
    NoTopLevelLog,
    /// Parsing error: expected to have a previously constructed event available
    MissingLastEvent,
    /// Parsing error: expected to have a previously constructed trace available
    MissingLastTrace,
    /// IO error
    IOError(std::rc::Rc<std::io::Error>),
    /// XML error (e.g., incorrect XML format)
    XMLParsingError(QuickXMLError),
}

impl std::fmt::Display for XESParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse XES: {:?}", self)
    }
}

impl std::error::Error for XESParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XESParseError::IOError(e) => Some(e.as_ref()),
            XESParseError::XMLParsingError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for XESParseError {
    fn from(e: std::io::Error) -> Self {
        Self::IOError(std::rc::Rc::new(e))
    }
}

impl From<QuickXMLError> for XESParseError {
    fn from(e: QuickXMLError) -> Self {
        Self::XMLParsingError(e)
    }
}

///
/// Options for XES import
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XESImportOptions {
    /// Optional date format to try before the default formats (rfc3339, then a naive
    /// `%Y-%m-%dT%H:%M:%S%.f` interpreted as UTC)
    ///
    /// See <https://docs.rs/chrono/latest/chrono/format/strftime/index.html> for specifiers.
    pub date_format: Option<String>,
    /// Sort the events of each trace by the timestamp under this key after parsing
    ///
    /// Events without a (valid) timestamp are sorted before all other events (stable).
    pub sort_events_with_timestamp_key: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    None,
    Log,
    Trace,
    Event,
    GlobalTraceAttributes,
    GlobalEventAttributes,
}

/// Parse XES from the given reader
pub fn import_xes<T: BufRead>(
    reader: T,
    options: &XESImportOptions,
) -> Result<EventLog, XESParseError> {
    let mut reader = Reader::from_reader(reader);
    let mut buf: Vec<u8> = Vec::new();

    let mut mode = Mode::None;
    // Depth of currently open (nested) attribute tags; nested child attributes are skipped
    let mut attr_depth: usize = 0;
    let mut encountered_log = false;

    let mut log = EventLog::new();
    let mut classifiers: Vec<EventLogClassifier> = Vec::new();
    let mut global_trace_attrs: Attributes = Vec::new();
    let mut global_event_attrs: Attributes = Vec::new();
    let mut current_trace: Option<Trace> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XMLEvent::Start(t)) => match t.name().as_ref() {
                b"log" => {
                    encountered_log = true;
                    mode = Mode::Log;
                }
                b"trace" => {
                    if !encountered_log {
                        return Err(XESParseError::NoTopLevelLog);
                    }
                    current_trace = Some(Trace {
                        attributes: Vec::new(),
                        events: Vec::new(),
                    });
                    mode = Mode::Trace;
                }
                b"event" => {
                    let trace = current_trace
                        .as_mut()
                        .ok_or(XESParseError::MissingLastTrace)?;
                    trace.events.push(Event {
                        attributes: Vec::new(),
                    });
                    mode = Mode::Event;
                }
                b"global" => {
                    mode = match get_tag_attribute(&t, "scope").as_deref() {
                        Some("trace") => Mode::GlobalTraceAttributes,
                        Some("event") => Mode::GlobalEventAttributes,
                        _ => Mode::Log,
                    };
                }
                b"extension" | b"classifier" => {}
                _ => {
                    // Attribute tag with nested children; the children are skipped
                    if attr_depth == 0 {
                        add_attribute_from_tag(
                            &t,
                            mode,
                            &mut log,
                            &mut current_trace,
                            &mut global_trace_attrs,
                            &mut global_event_attrs,
                            options,
                        )?;
                    }
                    attr_depth += 1;
                }
            },
            Ok(XMLEvent::Empty(t)) => match t.name().as_ref() {
                b"classifier" => {
                    if let (Some(name), Some(keys)) = (
                        get_tag_attribute(&t, "name"),
                        get_tag_attribute(&t, "keys"),
                    ) {
                        classifiers.push(EventLogClassifier {
                            name,
                            keys: keys.split_whitespace().map(String::from).collect(),
                        });
                    }
                }
                b"extension" | b"log" | b"trace" | b"event" | b"global" => {}
                _ => {
                    if attr_depth == 0 {
                        add_attribute_from_tag(
                            &t,
                            mode,
                            &mut log,
                            &mut current_trace,
                            &mut global_trace_attrs,
                            &mut global_event_attrs,
                            options,
                        )?;
                    }
                }
            },
            Ok(XMLEvent::End(t)) => match t.name().as_ref() {
                b"trace" => {
                    if let Some(mut trace) = current_trace.take() {
                        if let Some(key) = &options.sort_events_with_timestamp_key {
                            trace.events.sort_by_key(|e| {
                                e.attributes
                                    .get_by_key(key)
                                    .and_then(|a| a.value.try_as_date())
                                    .copied()
                            });
                        }
                        log.traces.push(trace);
                    }
                    mode = Mode::Log;
                }
                b"event" => mode = Mode::Trace,
                b"global" => mode = Mode::Log,
                b"log" => mode = Mode::None,
                _ => {
                    attr_depth = attr_depth.saturating_sub(1);
                }
            },
            Ok(XMLEvent::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
        buf.clear();
    }

    if !encountered_log {
        return Err(XESParseError::NoTopLevelLog);
    }

    log.classifiers = Some(classifiers);
    log.global_trace_attrs = if global_trace_attrs.is_empty() {
        None
    } else {
        Some(global_trace_attrs)
    };
    log.global_event_attrs = if global_event_attrs.is_empty() {
        None
    } else {
        Some(global_event_attrs)
    };
    Ok(log)
}

fn add_attribute_from_tag(
    t: &BytesStart<'_>,
    mode: Mode,
    log: &mut EventLog,
    current_trace: &mut Option<Trace>,
    global_trace_attrs: &mut Attributes,
    global_event_attrs: &mut Attributes,
    options: &XESImportOptions,
) -> Result<(), XESParseError> {
    let key = get_tag_attribute(t, "key").unwrap_or_default();
    let value = parse_attribute_value_from_tag(t, options);
    let attribute = Attribute::new(key, value);
    match mode {
        Mode::Log => log.attributes.push(attribute),
        Mode::Trace => current_trace
            .as_mut()
            .ok_or(XESParseError::MissingLastTrace)?
            .attributes
            .push(attribute),
        Mode::Event => current_trace
            .as_mut()
            .ok_or(XESParseError::MissingLastTrace)?
            .events
            .last_mut()
            .ok_or(XESParseError::MissingLastEvent)?
            .attributes
            .push(attribute),
        Mode::GlobalTraceAttributes => global_trace_attrs.push(attribute),
        Mode::GlobalEventAttributes => global_event_attrs.push(attribute),
        Mode::None => return Err(XESParseError::AttributeOutsideLog),
    }
    Ok(())
}

fn get_tag_attribute(t: &BytesStart<'_>, key: &str) -> Option<String> {
    t.try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok())
        .map(|v| v.to_string())
}

fn parse_attribute_value_from_tag(t: &BytesStart<'_>, options: &XESImportOptions) -> AttributeValue {
    let value = get_tag_attribute(t, "value").unwrap_or_default();
    match t.name().as_ref() {
        b"string" => AttributeValue::String(value),
        b"date" => match parse_date(&value, options.date_format.as_deref()) {
            Some(dt) => AttributeValue::Date(dt),
            None => {
                eprintln!("Failed to parse date from {:?}", value);
                AttributeValue::None
            }
        },
        b"int" => match value.parse::<i64>() {
            Ok(n) => AttributeValue::Int(n),
            Err(e) => {
                eprintln!("Could not parse integer {:?}: Error {}", value, e);
                AttributeValue::None
            }
        },
        b"float" => match value.parse::<f64>() {
            Ok(n) => AttributeValue::Float(n),
            Err(e) => {
                eprintln!("Could not parse float {:?}: Error {}", value, e);
                AttributeValue::None
            }
        },
        b"boolean" => match value.parse::<bool>() {
            Ok(b) => AttributeValue::Boolean(b),
            Err(e) => {
                eprintln!("Could not parse boolean {:?}: Error {}", value, e);
                AttributeValue::None
            }
        },
        b"id" => match Uuid::from_str(&value) {
            Ok(id) => AttributeValue::ID(id),
            Err(e) => {
                eprintln!("Could not parse id {:?}: Error {}", value, e);
                AttributeValue::None
            }
        },
        _ => AttributeValue::String(value),
    }
}

/// Parse a date string, trying (in order) the passed format, rfc3339 and a naive UTC format
pub(crate) fn parse_date(value: &str, date_format: Option<&str>) -> Option<DateTime<Utc>> {
    if let Some(format) = date_format {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    None
}

///
/// Import a XES [`EventLog`] from a file path
///
/// Transparently decompresses `.gz` files.
///
pub fn import_xes_file<P: AsRef<Path>>(
    path: P,
    options: &XESImportOptions,
) -> Result<EventLog, XESParseError> {
    let is_gz = path
        .as_ref()
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    let file = File::open(path)?;
    if is_gz {
        let dec = GzDecoder::new(BufReader::new(&file));
        import_xes(BufReader::new(dec), options)
    } else {
        import_xes(BufReader::new(file), options)
    }
}

///
/// Import a XES [`EventLog`] directly from a string
///
pub fn import_xes_str(xes_str: &str, options: &XESImportOptions) -> Result<EventLog, XESParseError> {
    import_xes(BufReader::new(xes_str.as_bytes()), options)
}

///
/// Import a XES [`EventLog`] from a byte slice (&\[u8\])
///
/// * `is_compressed_gz`: parse the passed `xes_data` as a compressed .gz archive
///
pub fn import_xes_slice(
    xes_data: &[u8],
    is_compressed_gz: bool,
    options: &XESImportOptions,
) -> Result<EventLog, XESParseError> {
    if is_compressed_gz {
        let gz: GzDecoder<&[u8]> = GzDecoder::new(xes_data);
        return import_xes(BufReader::new(gz), options);
    }
    import_xes(BufReader::new(xes_data), options)
}
