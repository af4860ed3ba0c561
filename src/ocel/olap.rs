//! OLAP-style transformations of object-centric event logs: drilling object types
//! down by an object attribute (and rolling them back up), and unfolding event
//! types by a related object type (and folding them back).

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::ocel_struct::{OCELAttributeValue, OCELObject, OCELType, OCEL};

/// Get the value an object attribute had at time `t`
///
/// Performs a backward as-of lookup over the timestamped attribute entries of the
/// object: the entry with the latest time not after `t` wins. Returns `None` if the
/// attribute has no entry at or before `t`.
pub fn value_as_of<'a>(
    object: &'a OCELObject,
    attribute: &str,
    t: DateTime<Utc>,
) -> Option<&'a OCELAttributeValue> {
    object
        .attributes
        .iter()
        .filter(|a| a.name == attribute && a.time <= t)
        .max_by_key(|a| a.time)
        .map(|a| &a.value)
}

/// Get the earliest recorded value of an object attribute
pub fn earliest_value<'a>(
    object: &'a OCELObject,
    attribute: &str,
) -> Option<&'a OCELAttributeValue> {
    object
        .attributes
        .iter()
        .filter(|a| a.name == attribute)
        .min_by_key(|a| a.time)
        .map(|a| &a.value)
}

/// Get the last known value of an object attribute
pub fn last_known_value<'a>(
    object: &'a OCELObject,
    attribute: &str,
) -> Option<&'a OCELAttributeValue> {
    object
        .attributes
        .iter()
        .filter(|a| a.name == attribute)
        .max_by_key(|a| a.time)
        .map(|a| &a.value)
}

fn drilled_type_label(object_type: &str, value: &OCELAttributeValue) -> String {
    format!("({object_type},{value})")
}

///
/// Drill an object type down by an object attribute
///
/// Objects of `object_type` are re-typed to `(object_type,value)` where `value` is the
/// value of `object_attribute` for the object. Without `consider_history`, the earliest
/// recorded attribute value is used and objects without any value get the label
/// `(object_type,null)`. With `consider_history`, the last known value is used instead
/// and objects without any value keep their original type.
///
/// Type declarations are updated accordingly: one declaration per new label (carrying
/// over the attribute declarations of the base type), and the base type declaration is
/// removed once no object of it remains.
///
pub fn drill_down(ocel: &mut OCEL, object_type: &str, object_attribute: &str, consider_history: bool) {
    let base_attrs = ocel
        .object_type(object_type)
        .map(|t| t.attributes.clone())
        .unwrap_or_default();
    let mut new_types: Vec<String> = Vec::new();
    for o in &mut ocel.objects {
        if o.object_type != object_type {
            continue;
        }
        let value = if consider_history {
            match last_known_value(o, object_attribute) {
                Some(v) => v.clone(),
                None => continue,
            }
        } else {
            earliest_value(o, object_attribute)
                .cloned()
                .unwrap_or(OCELAttributeValue::Null)
        };
        o.object_type = drilled_type_label(object_type, &value);
        if !new_types.contains(&o.object_type) {
            new_types.push(o.object_type.clone());
        }
    }

    for name in new_types {
        if ocel.object_type(&name).is_none() {
            ocel.object_types.push(OCELType {
                name,
                attributes: base_attrs.clone(),
            });
        }
    }
    if !ocel.objects.iter().any(|o| o.object_type == object_type) {
        ocel.object_types.retain(|t| t.name != object_type);
    }
}

///
/// Roll drilled-down object types back up to their base type
///
/// Collapses every type label of the form `(object_type,...)` back to `object_type`,
/// independent of how the drill-down was computed.
///
pub fn roll_up(ocel: &mut OCEL, object_type: &str) {
    let prefix = format!("({object_type},");
    let is_drilled = |label: &str| label.starts_with(&prefix) && label.ends_with(')');

    let mut rolled_any = false;
    for o in &mut ocel.objects {
        if is_drilled(&o.object_type) {
            o.object_type = object_type.to_string();
            rolled_any = true;
        }
    }
    ocel.object_types.retain(|t| !is_drilled(&t.name));
    if rolled_any {
        ocel.add_object_type_if_missing(object_type);
    }
}

fn unfolded_type_label(event_type: &str, object_type: &str) -> String {
    format!("({event_type},{object_type})")
}

///
/// Unfold an event type by a related object type
///
/// Every event of `event_type` that has an E2O relationship to an object of
/// `object_type` (with a qualifier in `qualifiers`, if given) is re-typed to
/// `(event_type,object_type)`. Event type declarations are updated the same way object
/// type declarations are in [`drill_down`].
///
pub fn unfold_event_type(
    ocel: &mut OCEL,
    event_type: &str,
    object_type: &str,
    qualifiers: Option<&[String]>,
) {
    let qualifier_set: Option<HashSet<&str>> =
        qualifiers.map(|qs| qs.iter().map(|q| q.as_str()).collect());
    let objects_of_type: HashSet<&str> = ocel
        .objects
        .iter()
        .filter(|o| o.object_type == object_type)
        .map(|o| o.id.as_str())
        .collect();

    let new_type = unfolded_type_label(event_type, object_type);
    let base_attrs = ocel
        .event_type(event_type)
        .map(|t| t.attributes.clone())
        .unwrap_or_default();

    let mut unfolded_any = false;
    for e in &mut ocel.events {
        if e.event_type != event_type {
            continue;
        }
        let affected = e.relationships.iter().any(|rel| {
            objects_of_type.contains(rel.object_id.as_str())
                && qualifier_set
                    .as_ref()
                    .map_or(true, |qs| qs.contains(rel.qualifier.as_str()))
        });
        if affected {
            e.event_type = new_type.clone();
            unfolded_any = true;
        }
    }

    if unfolded_any && ocel.event_type(&new_type).is_none() {
        ocel.event_types.push(OCELType {
            name: new_type,
            attributes: base_attrs,
        });
    }
    if !ocel.events.iter().any(|e| e.event_type == event_type) {
        ocel.event_types.retain(|t| t.name != event_type);
    }
}

///
/// Fold an unfolded event type back to its base event type
///
pub fn fold_event_type(ocel: &mut OCEL, event_type: &str, object_type: &str) {
    let unfolded = unfolded_type_label(event_type, object_type);
    let mut folded_any = false;
    for e in &mut ocel.events {
        if e.event_type == unfolded {
            e.event_type = event_type.to_string();
            folded_any = true;
        }
    }
    ocel.event_types.retain(|t| t.name != unfolded);
    if folded_any {
        ocel.add_event_type_if_missing(event_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocel::ocel_struct::{
        OCELEvent, OCELObjectAttribute, OCELRelationship, OCELType,
    };
    use chrono::{TimeZone, Utc};

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()
    }

    fn order_ocel() -> OCEL {
        OCEL {
            event_types: vec![OCELType {
                name: "place".into(),
                attributes: Vec::new(),
            }],
            object_types: vec![OCELType {
                name: "order".into(),
                attributes: Vec::new(),
            }],
            events: vec![OCELEvent::new(
                "e1",
                "place",
                t(9),
                Vec::new(),
                vec![OCELRelationship::new("o1", "order")],
            )],
            objects: vec![
                OCELObject {
                    id: "o1".into(),
                    object_type: "order".into(),
                    attributes: vec![
                        OCELObjectAttribute::new(
                            "status",
                            OCELAttributeValue::String("open".into()),
                            t(8),
                        ),
                        OCELObjectAttribute::new(
                            "status",
                            OCELAttributeValue::String("shipped".into()),
                            t(12),
                        ),
                    ],
                    relationships: Vec::new(),
                },
                OCELObject {
                    id: "o2".into(),
                    object_type: "order".into(),
                    attributes: Vec::new(),
                    relationships: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn value_as_of_picks_the_latest_value_not_after_t() {
        let ocel = order_ocel();
        let o1 = &ocel.objects[0];
        assert_eq!(
            value_as_of(o1, "status", t(10)),
            Some(&OCELAttributeValue::String("open".into()))
        );
        assert_eq!(
            value_as_of(o1, "status", t(12)),
            Some(&OCELAttributeValue::String("shipped".into()))
        );
        assert_eq!(value_as_of(o1, "status", t(7)), None);
    }

    #[test]
    fn drill_down_rewrites_types_with_earliest_value() {
        let mut ocel = order_ocel();
        drill_down(&mut ocel, "order", "status", false);
        assert_eq!(ocel.objects[0].object_type, "(order,open)");
        assert_eq!(ocel.objects[1].object_type, "(order,null)");
        assert!(ocel.object_type("order").is_none());
        assert!(ocel.object_type("(order,open)").is_some());
        assert!(ocel.object_type("(order,null)").is_some());
    }

    #[test]
    fn history_drill_down_uses_last_known_value_and_skips_unvalued_objects() {
        let mut ocel = order_ocel();
        drill_down(&mut ocel, "order", "status", true);
        assert_eq!(ocel.objects[0].object_type, "(order,shipped)");
        // o2 has no status value at all and keeps its type
        assert_eq!(ocel.objects[1].object_type, "order");
        assert!(ocel.object_type("order").is_some());
    }

    #[test]
    fn roll_up_collapses_drilled_types() {
        let mut ocel = order_ocel();
        drill_down(&mut ocel, "order", "status", false);
        roll_up(&mut ocel, "order");
        assert!(ocel.objects.iter().all(|o| o.object_type == "order"));
        let type_names: Vec<_> = ocel.object_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(type_names, vec!["order"]);
    }

    #[test]
    fn unfold_and_fold_event_type() {
        let mut ocel = order_ocel();
        unfold_event_type(&mut ocel, "place", "order", None);
        assert_eq!(ocel.events[0].event_type, "(place,order)");
        assert!(ocel.event_type("place").is_none());
        assert!(ocel.event_type("(place,order)").is_some());

        fold_event_type(&mut ocel, "place", "order");
        assert_eq!(ocel.events[0].event_type, "place");
        let type_names: Vec<_> = ocel.event_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(type_names, vec!["place"]);
    }

    #[test]
    fn unfold_respects_qualifier_restriction() {
        let mut ocel = order_ocel();
        unfold_event_type(
            &mut ocel,
            "place",
            "order",
            Some(&["payment".to_string()]),
        );
        // The only relationship has qualifier "order", so nothing changes
        assert_eq!(ocel.events[0].event_type, "place");
    }
}
