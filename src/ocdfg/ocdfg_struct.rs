use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dfg::DirectlyFollowsGraph;
use crate::event_log::event_log_struct::EventLogClassifier;
use crate::ocel::flatten::flatten_ocel_on;
use crate::ocel::linked_ocel::LinkedOCEL;

///
/// An object-centric directly-follows graph: one [`DirectlyFollowsGraph`] per object type
///
/// Discovered by flattening the OCEL on each object type and building the classical DFG
/// of the flattened log.
///
#[derive(Debug, Serialize, Deserialize)]
pub struct OCDirectlyFollowsGraph<'a> {
    /// The per-object-type directly-follows graphs
    pub object_type_to_dfg: HashMap<String, DirectlyFollowsGraph<'a>>,
}

impl Default for OCDirectlyFollowsGraph<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl OCDirectlyFollowsGraph<'_> {
    /// Create a new [`OCDirectlyFollowsGraph`] with no object types
    pub fn new() -> Self {
        Self {
            object_type_to_dfg: HashMap::new(),
        }
    }

    /// Discover an [`OCDirectlyFollowsGraph`] from a [`LinkedOCEL`]
    pub fn create_from_locel(locel: &LinkedOCEL) -> Self {
        let mut result = Self::new();
        for ob_type in locel.get_ob_types() {
            let event_log = flatten_ocel_on(locel, ob_type);
            let dfg =
                DirectlyFollowsGraph::create_from_log(&event_log, &EventLogClassifier::default());
            result.object_type_to_dfg.insert(ob_type.to_string(), dfg);
        }
        result
    }

    /// The union of all activities over the per-type graphs
    pub fn all_activities(&self) -> HashSet<&str> {
        self.object_type_to_dfg
            .values()
            .flat_map(|dfg| dfg.activities.keys().map(|a| a.as_str()))
            .collect()
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
