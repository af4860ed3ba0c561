use super::linked_ocel::LinkedOCEL;
use super::ocel_struct::OCELAttributeValue;
use crate::event_log::constants::{ACTIVITY_NAME, CASE_ID_NAME, TIMESTAMP_KEY};
use crate::event_log::event_log_struct::{Attribute, AttributeValue, Event, EventLog, Trace};

fn convert_attribute_value(value: &OCELAttributeValue) -> Option<AttributeValue> {
    match value {
        OCELAttributeValue::String(s) => Some(AttributeValue::String(s.clone())),
        OCELAttributeValue::Time(t) => Some(AttributeValue::Date(*t)),
        OCELAttributeValue::Integer(i) => Some(AttributeValue::Int(*i)),
        OCELAttributeValue::Float(f) => Some(AttributeValue::Float(*f)),
        OCELAttributeValue::Boolean(b) => Some(AttributeValue::Boolean(*b)),
        OCELAttributeValue::Null => None,
    }
}

///
/// Flatten an [`OCEL`](super::ocel_struct::OCEL) on an object type into a classical [`EventLog`]
///
/// Every object of `object_type` becomes one trace (with the object ID as case ID), made
/// up of all events related to the object, in timestamp order. The event type becomes
/// the activity, event attributes are carried over, and object attributes become trace
/// attributes. Traces are ordered by the timestamp of their first event.
///
pub fn flatten_ocel_on(locel: &LinkedOCEL, object_type: &str) -> EventLog {
    let mut traces: Vec<_> = locel
        .get_obs_of_type(object_type)
        .map(|ob| {
            let ob_val = locel.get_ob(ob);
            // get_e2o_rev yields events in timestamp order already
            let events: Vec<_> = locel
                .get_e2o_rev(ob)
                .map(|(_q, ev)| {
                    let ev_val = locel.get_ev(ev);
                    let mut event = Event {
                        attributes: vec![
                            Attribute::new(
                                ACTIVITY_NAME.to_string(),
                                AttributeValue::String(ev_val.event_type.clone()),
                            ),
                            Attribute::new(
                                TIMESTAMP_KEY.to_string(),
                                AttributeValue::Date(ev_val.time),
                            ),
                        ],
                    };
                    event.attributes.extend(ev_val.attributes.iter().flat_map(|at| {
                        convert_attribute_value(&at.value)
                            .map(|v| Attribute::new(at.name.clone(), v))
                    }));
                    event
                })
                .collect();
            let mut trace = Trace {
                attributes: vec![Attribute::new(
                    CASE_ID_NAME.to_string(),
                    AttributeValue::String(ob_val.id.clone()),
                )],
                events,
            };
            trace
                .attributes
                .extend(ob_val.attributes.iter().flat_map(|at| {
                    convert_attribute_value(&at.value)
                        .map(|v| Attribute::new(at.name.clone(), v))
                }));
            trace
        })
        .collect();
    traces.sort_by_cached_key(|t| {
        t.events
            .first()
            .and_then(|e| e.timestamp().copied())
    });
    EventLog {
        traces,
        ..Default::default()
    }
}
