use std::collections::{HashMap, HashSet};

use super::ocel_struct::OCEL;

///
/// Options for [`filter_ocel`]
///
#[derive(Debug, Clone, Default)]
pub struct OCELFilterOptions {
    /// Only keep objects of these types (`None` keeps all object types)
    pub object_types: Option<Vec<String>>,
    /// Only keep events whose event type occurs at least this often (after the
    /// object-type restriction has been applied)
    pub event_threshold: usize,
}

///
/// Filter an [`OCEL`] down to a set of object types and frequent event types
///
/// Filtering cascades:
/// 1. Objects of other types are removed, together with all relationships pointing at them.
/// 2. Events left without any E2O relationship are removed.
/// 3. Events of an event type that occurs fewer than `event_threshold` times are removed.
/// 4. Objects no longer referenced by any remaining event are removed.
///
/// Type declarations without remaining instances are dropped as well.
///
pub fn filter_ocel(ocel: &OCEL, options: &OCELFilterOptions) -> OCEL {
    let kept_object_types: HashSet<&str> = match &options.object_types {
        Some(types) => types.iter().map(|t| t.as_str()).collect(),
        None => ocel.object_types.iter().map(|t| t.name.as_str()).collect(),
    };

    let kept_object_ids: HashSet<&str> = ocel
        .objects
        .iter()
        .filter(|o| kept_object_types.contains(o.object_type.as_str()))
        .map(|o| o.id.as_str())
        .collect();

    // Events that still point at at least one kept object
    let mut event_type_counts: HashMap<&str, usize> = HashMap::new();
    let mut candidate_events: Vec<&super::ocel_struct::OCELEvent> = Vec::new();
    for e in &ocel.events {
        if e.relationships
            .iter()
            .any(|rel| kept_object_ids.contains(rel.object_id.as_str()))
        {
            *event_type_counts.entry(e.event_type.as_str()).or_default() += 1;
            candidate_events.push(e);
        }
    }

    let mut events: Vec<_> = candidate_events
        .into_iter()
        .filter(|e| {
            event_type_counts
                .get(e.event_type.as_str())
                .is_some_and(|c| *c >= options.event_threshold)
        })
        .cloned()
        .collect();
    for e in &mut events {
        e.relationships
            .retain(|rel| kept_object_ids.contains(rel.object_id.as_str()));
    }

    // Only keep objects still referenced by a remaining event
    let referenced_object_ids: HashSet<&str> = events
        .iter()
        .flat_map(|e| e.relationships.iter().map(|rel| rel.object_id.as_str()))
        .collect();
    let mut objects: Vec<_> = ocel
        .objects
        .iter()
        .filter(|o| referenced_object_ids.contains(o.id.as_str()))
        .cloned()
        .collect();
    let remaining_object_ids: HashSet<String> = objects.iter().map(|o| o.id.clone()).collect();
    for o in &mut objects {
        o.relationships
            .retain(|rel| remaining_object_ids.contains(&rel.object_id));
    }

    let remaining_event_types: HashSet<&str> =
        events.iter().map(|e| e.event_type.as_str()).collect();
    let remaining_object_types: HashSet<&str> =
        objects.iter().map(|o| o.object_type.as_str()).collect();

    OCEL {
        event_types: ocel
            .event_types
            .iter()
            .filter(|t| remaining_event_types.contains(t.name.as_str()))
            .cloned()
            .collect(),
        object_types: ocel
            .object_types
            .iter()
            .filter(|t| remaining_object_types.contains(t.name.as_str()))
            .cloned()
            .collect(),
        events,
        objects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocel::ocel_struct::{OCELEvent, OCELObject, OCELRelationship, OCELType};
    use chrono::{TimeZone, Utc};

    fn log_with_two_object_types() -> OCEL {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        OCEL {
            event_types: vec![
                OCELType {
                    name: "place".into(),
                    attributes: Vec::new(),
                },
                OCELType {
                    name: "invoice".into(),
                    attributes: Vec::new(),
                },
            ],
            object_types: vec![
                OCELType {
                    name: "order".into(),
                    attributes: Vec::new(),
                },
                OCELType {
                    name: "payment".into(),
                    attributes: Vec::new(),
                },
            ],
            events: vec![
                OCELEvent::new(
                    "e1",
                    "place",
                    t0,
                    Vec::new(),
                    vec![OCELRelationship::new("o1", "order")],
                ),
                OCELEvent::new(
                    "e2",
                    "place",
                    t0 + chrono::Duration::hours(1),
                    Vec::new(),
                    vec![
                        OCELRelationship::new("o2", "order"),
                        OCELRelationship::new("p1", "paid by"),
                    ],
                ),
                OCELEvent::new(
                    "e3",
                    "invoice",
                    t0 + chrono::Duration::hours(2),
                    Vec::new(),
                    vec![OCELRelationship::new("p1", "invoiced")],
                ),
            ],
            objects: vec![
                OCELObject {
                    id: "o1".into(),
                    object_type: "order".into(),
                    attributes: Vec::new(),
                    relationships: Vec::new(),
                },
                OCELObject {
                    id: "o2".into(),
                    object_type: "order".into(),
                    attributes: Vec::new(),
                    relationships: vec![OCELRelationship::new("p1", "paid by")],
                },
                OCELObject {
                    id: "p1".into(),
                    object_type: "payment".into(),
                    attributes: Vec::new(),
                    relationships: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn restricting_object_types_cascades_to_events_and_objects() {
        let ocel = log_with_two_object_types();
        let filtered = filter_ocel(
            &ocel,
            &OCELFilterOptions {
                object_types: Some(vec!["order".to_string()]),
                event_threshold: 0,
            },
        );
        let event_ids: Vec<_> = filtered.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(event_ids, vec!["e1", "e2"]);
        // The relationship of e2 to the payment object must be gone
        assert_eq!(filtered.events[1].relationships.len(), 1);
        let object_ids: Vec<_> = filtered.objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(object_ids, vec!["o1", "o2"]);
        // O2O relationships to removed objects are pruned too
        assert!(filtered.objects[1].relationships.is_empty());
        assert!(filtered.object_type("payment").is_none());
        assert!(filtered.event_type("invoice").is_none());
    }

    #[test]
    fn event_threshold_drops_rare_event_types() {
        let ocel = log_with_two_object_types();
        let filtered = filter_ocel(
            &ocel,
            &OCELFilterOptions {
                object_types: None,
                event_threshold: 2,
            },
        );
        let event_types: Vec<_> = filtered
            .events
            .iter()
            .map(|e| e.event_type.as_str())
            .collect();
        assert_eq!(event_types, vec!["place", "place"]);
        assert!(filtered.event_type("invoice").is_none());
    }

    #[test]
    fn no_options_keep_the_log_intact() {
        let ocel = log_with_two_object_types();
        let filtered = filter_ocel(&ocel, &OCELFilterOptions::default());
        assert_eq!(filtered.events.len(), 3);
        assert_eq!(filtered.objects.len(), 3);
    }
}
