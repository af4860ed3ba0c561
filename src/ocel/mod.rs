/// Zip-of-CSV archive import/export
pub mod archive;
/// Filtering by object types and event-type frequency
pub mod filter;
/// Flattening on an object type into a classical event log
pub mod flatten;
/// Index-linked OCEL with fast relation access
pub mod linked_ocel;
/// OLAP operations (drill-down/roll-up, event type unfolding/folding)
pub mod olap;
/// OCEL struct and sub-structs
pub mod ocel_struct;
