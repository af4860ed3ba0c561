/// Attribute key for the activity name of an event (concept XES extension)
pub const ACTIVITY_NAME: &str = "concept:name";

/// Attribute key for the timestamp of an event (time XES extension)
pub const TIMESTAMP_KEY: &str = "time:timestamp";

/// Attribute key for the case identifier of a trace
pub const CASE_ID_NAME: &str = "concept:name";

/// Attribute key for the lifecycle transition of an event (lifecycle XES extension)
pub const LIFECYCLE_KEY: &str = "lifecycle:transition";

/// Activity name of the artificial trace-start event added by
/// [`add_boundary_events`](super::transform::add_boundary_events)
pub const BEGIN_ACTIVITY: &str = "BEGIN";

/// Activity name of the artificial trace-end event added by
/// [`add_boundary_events`](super::transform::add_boundary_events)
pub const END_ACTIVITY: &str = "END";
