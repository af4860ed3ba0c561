use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ocel::ocel_struct::{OCELAttributeValue, OCELEvent, OCELType};

///
/// Temporal object-centric event log
///
/// Extends the object-centric model with temporal validity: instead of a single type and
/// a timestamped attribute history, every object consists of a sequence of
/// [`ObjectSnapshot`]s, each valid in the interval `[valid_from, valid_to]`. Both the
/// object type and the attribute values can change between snapshots. O2O relationships
/// carry an optional validity interval as well.
///
/// Events are point-based and identical to OCEL events.
///
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TOCEL {
    /// Event types
    #[serde(rename = "eventTypes")]
    pub event_types: Vec<OCELType>,
    /// Object types
    #[serde(rename = "objectTypes")]
    pub object_types: Vec<OCELType>,
    /// Events
    #[serde(default)]
    pub events: Vec<OCELEvent>,
    /// Objects with their snapshot histories
    #[serde(default)]
    pub objects: Vec<TOCELObject>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
/// Temporal object: a snapshot history plus temporal O2O relationships
pub struct TOCELObject {
    /// Object ID
    pub id: String,
    /// Snapshot history of the object (ordered by `valid_from` after normalization)
    pub snapshots: Vec<ObjectSnapshot>,
    /// Temporal O2O relationships
    #[serde(default)]
    pub relationships: Vec<TOCELRelationship>,
}

impl TOCELObject {
    /// Sort the snapshot history by `valid_from`
    pub fn sort_snapshots(&mut self) {
        self.snapshots.sort_by_key(|s| s.valid_from);
    }

    /// The object type of the last snapshot
    pub fn last_type(&self) -> Option<&str> {
        self.snapshots
            .iter()
            .max_by_key(|s| s.valid_from)
            .map(|s| s.object_type.as_str())
    }

    /// Whether the object type changes over the snapshot history
    pub fn is_dynamically_typed(&self) -> bool {
        let mut types = self.snapshots.iter().map(|s| s.object_type.trim());
        match types.next() {
            Some(first) => types.any(|t| t != first),
            None => false,
        }
    }

    /// Pick the snapshot valid at time `t`
    ///
    /// As-of rule: the snapshot with the maximum `valid_from` not after `t` wins. If no
    /// snapshot starts at or before `t`, the earliest snapshot is used as fallback.
    pub fn snapshot_as_of(&self, t: DateTime<Utc>) -> Option<&ObjectSnapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.valid_from <= t)
            .max_by_key(|s| s.valid_from)
            .or_else(|| self.snapshots.iter().min_by_key(|s| s.valid_from))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
/// One snapshot of a temporal object
pub struct ObjectSnapshot {
    /// Snapshot ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    /// Object type during the validity interval
    #[serde(rename = "type")]
    pub object_type: String,
    /// Start of the validity interval
    #[serde(rename = "validFrom")]
    pub valid_from: DateTime<Utc>,
    /// End of the validity interval (`None` for the open-ended last snapshot)
    #[serde(rename = "validTo", skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    /// Attribute values during the validity interval
    #[serde(default)]
    pub attributes: Vec<SnapshotAttribute>,
}

impl ObjectSnapshot {
    /// Get the value of an attribute in this snapshot
    pub fn attribute_value(&self, name: &str) -> Option<&OCELAttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Named attribute value of an [`ObjectSnapshot`]
pub struct SnapshotAttribute {
    /// Name of the attribute
    pub name: String,
    /// Value of the attribute
    pub value: OCELAttributeValue,
}

impl SnapshotAttribute {
    /// Helper to create a new snapshot attribute
    pub fn new(name: impl Into<String>, value: OCELAttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Temporal O2O relationship with an optional validity interval
pub struct TOCELRelationship {
    /// ID of the referenced [`TOCELObject`]
    #[serde(rename = "objectId")]
    pub object_id: String,
    /// Qualifier of the relationship
    pub qualifier: String,
    /// Start of the validity interval
    #[serde(rename = "validFrom", skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    /// End of the validity interval
    #[serde(rename = "validTo", skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl TOCELRelationship {
    /// Helper to create a new temporal relationship
    pub fn new(object_id: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            qualifier: qualifier.into(),
            valid_from: None,
            valid_to: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()
    }

    fn snapshot(object_type: &str, from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> ObjectSnapshot {
        ObjectSnapshot {
            snapshot_id: None,
            object_type: object_type.to_string(),
            valid_from: from,
            valid_to: to,
            attributes: Vec::new(),
        }
    }

    #[test]
    fn snapshot_as_of_picks_latest_started_snapshot() {
        let object = TOCELObject {
            id: "o1".into(),
            snapshots: vec![
                snapshot("lead", t(8), Some(t(12))),
                snapshot("customer", t(12), None),
            ],
            relationships: Vec::new(),
        };
        assert_eq!(object.snapshot_as_of(t(10)).unwrap().object_type, "lead");
        assert_eq!(
            object.snapshot_as_of(t(13)).unwrap().object_type,
            "customer"
        );
        // Before the first snapshot: fall back to the earliest one
        assert_eq!(object.snapshot_as_of(t(6)).unwrap().object_type, "lead");
    }

    #[test]
    fn dynamically_typed_objects_are_detected() {
        let stable = TOCELObject {
            id: "o1".into(),
            snapshots: vec![
                snapshot("order", t(8), Some(t(9))),
                snapshot("order", t(9), None),
            ],
            relationships: Vec::new(),
        };
        assert!(!stable.is_dynamically_typed());

        let dynamic = TOCELObject {
            id: "o2".into(),
            snapshots: vec![
                snapshot("lead", t(8), Some(t(9))),
                snapshot("customer", t(9), None),
            ],
            relationships: Vec::new(),
        };
        assert!(dynamic.is_dynamically_typed());
        assert_eq!(dynamic.last_type(), Some("customer"));
    }
}
