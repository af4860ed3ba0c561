//! Freezing a temporal OCEL into a regular OCEL
//!
//! Two modes are supported: snapshot freezing at a concrete time `t` (every object is
//! projected to the snapshot valid at `t`) and global freezing (objects whose type
//! changes over time are collapsed into a distinguished "dynamic" type, with the type
//! evolution preserved as an attribute history).

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::tocel_struct::{TOCELObject, TOCEL};
use crate::ocel::ocel_struct::{
    OCELAttributeValue, OCELObject, OCELObjectAttribute, OCELRelationship, OCELType,
    OCELTypeAttribute, OCEL,
};

///
/// Options for [`freeze_global`]
///
#[derive(Debug, Clone)]
pub struct GlobalFreezeOptions {
    /// Distinguished object type assigned to dynamically typed objects
    pub dynamic_type_name: String,
    /// Attribute name under which the type evolution of dynamic objects is recorded
    pub type_attr_name: String,
}

impl Default for GlobalFreezeOptions {
    fn default() -> Self {
        Self {
            dynamic_type_name: "dynamic".to_string(),
            type_attr_name: "__tocel_type_history".to_string(),
        }
    }
}

// Derive the timestamped attribute-change history from the snapshot history: the first
// snapshot emits all attributes, later snapshots only the values that differ from the
// previous snapshot.
fn changes_from_snapshots(object: &TOCELObject) -> Vec<OCELObjectAttribute> {
    let mut snapshots: Vec<_> = object.snapshots.iter().collect();
    snapshots.sort_by_key(|s| s.valid_from);

    let mut changes = Vec::new();
    let mut prev: Option<&super::tocel_struct::ObjectSnapshot> = None;
    for snapshot in snapshots {
        for at in &snapshot.attributes {
            if at.value == OCELAttributeValue::Null {
                continue;
            }
            let changed = match prev {
                None => true,
                Some(p) => p.attribute_value(&at.name) != Some(&at.value),
            };
            if changed {
                changes.push(OCELObjectAttribute::new(
                    at.name.clone(),
                    at.value.clone(),
                    snapshot.valid_from,
                ));
            }
        }
        prev = Some(snapshot);
    }
    changes
}

// Collapse the temporal O2O relationships to the union over all validity intervals
fn collapse_relationships(object: &TOCELObject) -> Vec<OCELRelationship> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    object
        .relationships
        .iter()
        .filter(|rel| seen.insert((rel.object_id.as_str(), rel.qualifier.as_str())))
        .map(|rel| OCELRelationship::new(rel.object_id.clone(), rel.qualifier.clone()))
        .collect()
}

fn reconstruct_object_types(tocel: &TOCEL, objects: &[OCELObject]) -> Vec<OCELType> {
    let mut object_types: Vec<OCELType> = Vec::new();
    for o in objects {
        if !object_types.iter().any(|t| t.name == o.object_type) {
            // Carry over the declaration of the original type where one exists
            let attributes = tocel
                .object_types
                .iter()
                .find(|t| t.name == o.object_type)
                .map(|t| t.attributes.clone())
                .unwrap_or_default();
            object_types.push(OCELType {
                name: o.object_type.clone(),
                attributes,
            });
        }
        let ot = object_types
            .iter_mut()
            .find(|t| t.name == o.object_type)
            .unwrap();
        for at in &o.attributes {
            if !ot.attributes.iter().any(|a| a.name == at.name) {
                ot.attributes
                    .push(OCELTypeAttribute::new(at.name.clone(), at.value.type_name()));
            }
        }
    }
    object_types
}

///
/// Freeze a [`TOCEL`] into an [`OCEL`] at time `t` (snapshot freezing)
///
/// Every object takes the type of its snapshot valid at `t` ([`TOCELObject::snapshot_as_of`]).
/// The full attribute history of the object is preserved as timestamped OCEL object
/// attributes. O2O relationships are collapsed to their union, objects without any
/// snapshot are dropped.
///
pub fn freeze_at(tocel: &TOCEL, t: DateTime<Utc>) -> OCEL {
    let objects: Vec<OCELObject> = tocel
        .objects
        .iter()
        .filter_map(|object| {
            let picked = object.snapshot_as_of(t)?;
            let mut attributes = changes_from_snapshots(object);
            attributes.sort_by(|a, b| (a.time, &a.name).cmp(&(b.time, &b.name)));
            Some(OCELObject {
                id: object.id.clone(),
                object_type: picked.object_type.clone(),
                attributes,
                relationships: collapse_relationships(object),
            })
        })
        .collect();

    let object_types = reconstruct_object_types(tocel, &objects);
    OCEL {
        event_types: tocel.event_types.clone(),
        object_types,
        events: tocel.events.clone(),
        objects,
    }
}

///
/// Freeze a [`TOCEL`] into an [`OCEL`] without a freeze time (global freezing)
///
/// Objects with a stable type keep it; objects whose type changes over the snapshot
/// history are assigned the distinguished dynamic type instead, and their type evolution
/// is recorded as additional timestamped attribute changes under
/// [`GlobalFreezeOptions::type_attr_name`] (one entry per type change, starting with the
/// first snapshot).
///
pub fn freeze_global(tocel: &TOCEL, options: &GlobalFreezeOptions) -> OCEL {
    let objects: Vec<OCELObject> = tocel
        .objects
        .iter()
        .filter_map(|object| {
            let last_type = object.last_type()?.to_string();
            let dynamic = object.is_dynamically_typed();
            let mut attributes = changes_from_snapshots(object);

            if dynamic {
                let mut snapshots: Vec<_> = object.snapshots.iter().collect();
                snapshots.sort_by_key(|s| s.valid_from);
                let mut prev_type: Option<&str> = None;
                for snapshot in snapshots {
                    if prev_type != Some(snapshot.object_type.as_str()) {
                        attributes.push(OCELObjectAttribute::new(
                            options.type_attr_name.clone(),
                            OCELAttributeValue::String(snapshot.object_type.clone()),
                            snapshot.valid_from,
                        ));
                    }
                    prev_type = Some(snapshot.object_type.as_str());
                }
            }
            attributes.sort_by(|a, b| (a.time, &a.name).cmp(&(b.time, &b.name)));

            Some(OCELObject {
                id: object.id.clone(),
                object_type: if dynamic {
                    options.dynamic_type_name.clone()
                } else {
                    last_type
                },
                attributes,
                relationships: collapse_relationships(object),
            })
        })
        .collect();

    let object_types = reconstruct_object_types(tocel, &objects);
    OCEL {
        event_types: tocel.event_types.clone(),
        object_types,
        events: tocel.events.clone(),
        objects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tocel::tocel_struct::{ObjectSnapshot, SnapshotAttribute, TOCELRelationship};
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()
    }

    fn sample_tocel() -> TOCEL {
        TOCEL {
            event_types: Vec::new(),
            object_types: vec![OCELType {
                name: "lead".into(),
                attributes: Vec::new(),
            }],
            events: Vec::new(),
            objects: vec![
                TOCELObject {
                    id: "c1".into(),
                    snapshots: vec![
                        ObjectSnapshot {
                            snapshot_id: Some("c1s1".into()),
                            object_type: "lead".into(),
                            valid_from: t(8),
                            valid_to: Some(t(12)),
                            attributes: vec![SnapshotAttribute::new(
                                "score",
                                OCELAttributeValue::Integer(10),
                            )],
                        },
                        ObjectSnapshot {
                            snapshot_id: Some("c1s2".into()),
                            object_type: "customer".into(),
                            valid_from: t(12),
                            valid_to: None,
                            attributes: vec![SnapshotAttribute::new(
                                "score",
                                OCELAttributeValue::Integer(50),
                            )],
                        },
                    ],
                    relationships: vec![
                        TOCELRelationship {
                            object_id: "a1".into(),
                            qualifier: "managed by".into(),
                            valid_from: Some(t(8)),
                            valid_to: Some(t(12)),
                        },
                        TOCELRelationship {
                            object_id: "a1".into(),
                            qualifier: "managed by".into(),
                            valid_from: Some(t(12)),
                            valid_to: None,
                        },
                    ],
                },
                TOCELObject {
                    id: "a1".into(),
                    snapshots: vec![ObjectSnapshot {
                        snapshot_id: None,
                        object_type: "agent".into(),
                        valid_from: t(7),
                        valid_to: None,
                        attributes: Vec::new(),
                    }],
                    relationships: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn snapshot_freeze_projects_types_to_time_t() {
        let ocel = freeze_at(&sample_tocel(), t(10));
        let c1 = &ocel.objects[0];
        assert_eq!(c1.object_type, "lead");
        // Full attribute history is preserved
        let scores: Vec<_> = c1
            .attributes
            .iter()
            .filter(|a| a.name == "score")
            .map(|a| (a.value.clone(), a.time))
            .collect();
        assert_eq!(
            scores,
            vec![
                (OCELAttributeValue::Integer(10), t(8)),
                (OCELAttributeValue::Integer(50), t(12))
            ]
        );
        // Temporal O2O relationships collapse to their union
        assert_eq!(
            c1.relationships,
            vec![OCELRelationship::new("a1", "managed by")]
        );
        assert!(ocel.object_type("lead").is_some());
        assert!(ocel.object_type("dynamic").is_none());
    }

    #[test]
    fn snapshot_freeze_after_last_snapshot_uses_it() {
        let ocel = freeze_at(&sample_tocel(), t(20));
        assert_eq!(ocel.objects[0].object_type, "customer");
    }

    #[test]
    fn global_freeze_assigns_dynamic_type_with_history() {
        let options = GlobalFreezeOptions::default();
        let ocel = freeze_global(&sample_tocel(), &options);
        let c1 = &ocel.objects[0];
        assert_eq!(c1.object_type, "dynamic");
        let type_history: Vec<_> = c1
            .attributes
            .iter()
            .filter(|a| a.name == options.type_attr_name)
            .map(|a| (a.value.clone(), a.time))
            .collect();
        assert_eq!(
            type_history,
            vec![
                (OCELAttributeValue::String("lead".into()), t(8)),
                (OCELAttributeValue::String("customer".into()), t(12))
            ]
        );
        // Statically typed objects keep their type
        assert_eq!(ocel.objects[1].object_type, "agent");
        assert!(ocel.object_type("dynamic").is_some());
    }
}
