/// Well-known XES attribute keys
pub mod constants;
/// Event log struct and sub-structs
pub mod event_log_struct;
/// XES export
pub mod export_xes;
/// XES import
pub mod import_xes;
/// Trace-level transformations (boundary events, activity unfolding)
pub mod transform;

#[doc(inline)]
pub use event_log_struct::{
    Attribute, AttributeValue, Attributes, EditableAttributes, Event, EventLog,
    EventLogClassifier, Trace,
};
