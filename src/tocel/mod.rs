/// Zip-of-CSV archive import/export
pub mod archive;
/// Freezing a temporal OCEL into a regular OCEL
pub mod freeze;
/// Temporal OCEL struct and sub-structs
pub mod tocel_struct;
