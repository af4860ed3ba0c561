#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]
#![doc = include_str!("../README.md")]

///
/// Classical (case-centric) event logs: XES import/export and trace transformations
///
pub mod event_log;

///
/// OCEL 2.0 object-centric event logs: model, persistence, filtering, OLAP and flattening
///
pub mod ocel;

///
/// Temporal object-centric event logs (object snapshots with validity intervals) and
/// their freezing into OCEL
///
pub mod tocel;

///
/// Directly-follows graphs
///
pub mod dfg;

///
/// Object-centric directly-follows graphs: discovery, Markov abstraction, similarity
/// based clustering of object types
///
pub mod ocdfg;


use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;

#[doc(inline)]
pub use event_log::event_log_struct::EventLog;

#[doc(inline)]
pub use event_log::import_xes::import_xes_file;

#[doc(inline)]
pub use event_log::import_xes::import_xes_slice;

#[doc(inline)]
pub use event_log::import_xes::XESImportOptions;

#[doc(inline)]
pub use event_log::export_xes::export_xes_event_log_to_file_path;

#[doc(inline)]
pub use event_log::transform::add_boundary_events;

#[doc(inline)]
pub use event_log::transform::unfold_activity;

#[doc(inline)]
pub use ocel::ocel_struct::OCEL;

#[doc(inline)]
pub use ocel::linked_ocel::LinkedOCEL;

#[doc(inline)]
pub use ocel::filter::filter_ocel;

#[doc(inline)]
pub use ocel::flatten::flatten_ocel_on;

#[doc(inline)]
pub use ocel::archive::import_ocel_archive_from_path;

#[doc(inline)]
pub use ocel::archive::export_ocel_archive_to_path;

#[doc(inline)]
pub use tocel::tocel_struct::TOCEL;

#[doc(inline)]
pub use tocel::freeze::freeze_at;

#[doc(inline)]
pub use tocel::freeze::freeze_global;

#[doc(inline)]
pub use tocel::archive::import_tocel_archive_from_path;

#[doc(inline)]
pub use tocel::archive::export_tocel_archive_to_path;

#[doc(inline)]
pub use dfg::DirectlyFollowsGraph;

#[doc(inline)]
pub use ocdfg::OCDirectlyFollowsGraph;

#[doc(inline)]
pub use ocdfg::markov::MarkovOCDFG;

///
/// Serialize [`OCEL`] as a JSON [`String`]
///
/// [`serde_json`] can also be used to convert [`OCEL`] to other targets (e.g., `serde_json::to_writer`)
///
pub fn ocel_to_json(ocel: &OCEL) -> String {
    serde_json::to_string(ocel).unwrap()
}

///
/// Import [`OCEL`] from a JSON [`String`]
///
/// [`serde_json`] can also be used to import [`OCEL`] from other targets (e.g., `serde_json::from_reader`)
///
pub fn json_to_ocel(ocel_json: &str) -> OCEL {
    serde_json::from_str(ocel_json).unwrap()
}

///
/// Import [`OCEL`] from a JSON file given by a filepath
///
/// See also [`import_ocel_json_from_slice`].
///
pub fn import_ocel_json_from_path<P: AsRef<Path>>(path: P) -> Result<OCEL, std::io::Error> {
    let reader: BufReader<File> = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

///
/// Import [`OCEL`] from a JSON byte slice
///
/// See also [`import_ocel_json_from_path`].
///
pub fn import_ocel_json_from_slice(slice: &[u8]) -> Result<OCEL, std::io::Error> {
    Ok(serde_json::from_slice(slice)?)
}

///
/// Export [`OCEL`] to a JSON file at the specified path
///
/// To import an OCEL .json file see [`import_ocel_json_from_path`] instead.
///
pub fn export_ocel_json_path<P: AsRef<Path>>(ocel: &OCEL, path: P) -> Result<(), std::io::Error> {
    let writer: BufWriter<File> = BufWriter::new(File::create(path)?);
    Ok(serde_json::to_writer(writer, ocel)?)
}

///
/// Export [`OCEL`] to JSON in a byte array ([`Vec<u8>`])
///
/// To import an OCEL .json file see [`import_ocel_json_from_path`] instead.
///
pub fn export_ocel_json_to_vec(ocel: &OCEL) -> Result<Vec<u8>, std::io::Error> {
    Ok(serde_json::to_vec(ocel)?)
}

///
/// Import [`TOCEL`] from a JSON file given by a filepath
///
pub fn import_tocel_json_from_path<P: AsRef<Path>>(path: P) -> Result<TOCEL, std::io::Error> {
    let reader: BufReader<File> = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

///
/// Export [`TOCEL`] to a JSON file at the specified path
///
pub fn export_tocel_json_path<P: AsRef<Path>>(
    tocel: &TOCEL,
    path: P,
) -> Result<(), std::io::Error> {
    let writer: BufWriter<File> = BufWriter::new(File::create(path)?);
    Ok(serde_json::to_writer(writer, tocel)?)
}
