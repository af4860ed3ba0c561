use std::collections::HashMap;

use super::ocel_struct::{OCELEvent, OCELObject, OCEL};

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
/// An event index, pointing to an event in the context of a given OCEL
pub struct EventIndex(usize);

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
/// An object index, pointing to an object in the context of a given OCEL
pub struct ObjectIndex(usize);

///
/// An [`OCEL`] linked through event and object indices
///
/// Provides convenient access to event-to-object and object-to-object relations, as well
/// as their reverse relations. Events are sorted by timestamp, so event index order
/// corresponds to timestamp order.
///
#[derive(Debug, Clone)]
pub struct LinkedOCEL {
    ocel: OCEL,
    object_ids_to_index: HashMap<String, ObjectIndex>,
    events_per_type: HashMap<String, Vec<EventIndex>>,
    objects_per_type: HashMap<String, Vec<ObjectIndex>>,
    e2o_rel: Vec<Vec<(String, ObjectIndex)>>,
    e2o_rel_rev: Vec<Vec<(String, EventIndex)>>,
    o2o_rel: Vec<Vec<(String, ObjectIndex)>>,
}

impl LinkedOCEL {
    /// Process an [`OCEL`] into a [`LinkedOCEL`], taking ownership of the [`OCEL`]
    pub fn from_ocel(mut ocel: OCEL) -> Self {
        // Sort events so that the index order corresponds to the timestamp order
        ocel.events.sort_by_key(|e| e.time);
        let object_ids_to_index: HashMap<_, _> = ocel
            .objects
            .iter()
            .enumerate()
            .map(|(ob_index, o)| (o.id.clone(), ObjectIndex(ob_index)))
            .collect();

        let mut e2o_rel_rev: Vec<Vec<(String, EventIndex)>> = vec![Vec::new(); ocel.objects.len()];
        let e2o_rel: Vec<Vec<(String, ObjectIndex)>> = ocel
            .events
            .iter()
            .enumerate()
            .map(|(ev_index, e)| {
                e.relationships
                    .iter()
                    .flat_map(|rel| {
                        let ob_index = *object_ids_to_index.get(&rel.object_id)?;
                        e2o_rel_rev[ob_index.0].push((rel.qualifier.clone(), EventIndex(ev_index)));
                        Some((rel.qualifier.clone(), ob_index))
                    })
                    .collect()
            })
            .collect();

        let o2o_rel: Vec<Vec<(String, ObjectIndex)>> = ocel
            .objects
            .iter()
            .map(|o| {
                o.relationships
                    .iter()
                    .flat_map(|rel| {
                        let ob_index = *object_ids_to_index.get(&rel.object_id)?;
                        Some((rel.qualifier.clone(), ob_index))
                    })
                    .collect()
            })
            .collect();

        let mut events_per_type: HashMap<String, Vec<EventIndex>> = ocel
            .event_types
            .iter()
            .map(|et| (et.name.clone(), Vec::new()))
            .collect();
        for (index, e) in ocel.events.iter().enumerate() {
            events_per_type
                .entry(e.event_type.clone())
                .or_default()
                .push(EventIndex(index));
        }

        let mut objects_per_type: HashMap<String, Vec<ObjectIndex>> = ocel
            .object_types
            .iter()
            .map(|ot| (ot.name.clone(), Vec::new()))
            .collect();
        for (index, o) in ocel.objects.iter().enumerate() {
            objects_per_type
                .entry(o.object_type.clone())
                .or_default()
                .push(ObjectIndex(index));
        }

        Self {
            ocel,
            object_ids_to_index,
            events_per_type,
            objects_per_type,
            e2o_rel,
            e2o_rel_rev,
            o2o_rel,
        }
    }

    /// Get the inner [`OCEL`] back
    pub fn into_inner(self) -> OCEL {
        self.ocel
    }

    /// Get an immutable reference to the inner [`OCEL`]
    pub fn get_ocel_ref(&self) -> &OCEL {
        &self.ocel
    }

    /// Get the event behind an [`EventIndex`]
    pub fn get_ev(&self, index: &EventIndex) -> &OCELEvent {
        &self.ocel.events[index.0]
    }

    /// Get the object behind an [`ObjectIndex`]
    pub fn get_ob(&self, index: &ObjectIndex) -> &OCELObject {
        &self.ocel.objects[index.0]
    }

    /// Look up an object index by object ID
    pub fn ob_index_of(&self, object_id: &str) -> Option<ObjectIndex> {
        self.object_ids_to_index.get(object_id).copied()
    }

    /// Get all events of the given event type (in timestamp order)
    pub fn get_evs_of_type(&self, ev_type: &str) -> impl Iterator<Item = &EventIndex> {
        self.events_per_type.get(ev_type).into_iter().flatten()
    }

    /// Get all objects of the given object type
    pub fn get_obs_of_type(&self, ob_type: &str) -> impl Iterator<Item = &ObjectIndex> {
        self.objects_per_type.get(ob_type).into_iter().flatten()
    }

    /// Get all event types with at least one registered event list
    pub fn get_ev_types(&self) -> impl Iterator<Item = &str> {
        self.events_per_type.keys().map(|k| k.as_str())
    }

    /// Get all object types with at least one registered object list
    pub fn get_ob_types(&self) -> impl Iterator<Item = &str> {
        self.objects_per_type.keys().map(|k| k.as_str())
    }

    /// Get all objects related to the given event (through E2O relations)
    pub fn get_e2o(&self, index: &EventIndex) -> impl Iterator<Item = (&str, &ObjectIndex)> {
        self.e2o_rel
            .get(index.0)
            .into_iter()
            .flatten()
            .map(|(q, o)| (q.as_str(), o))
    }

    /// Get all events to which the given object is related (reverse E2O relations, in timestamp order)
    pub fn get_e2o_rev(&self, index: &ObjectIndex) -> impl Iterator<Item = (&str, &EventIndex)> {
        self.e2o_rel_rev
            .get(index.0)
            .into_iter()
            .flatten()
            .map(|(q, e)| (q.as_str(), e))
    }

    /// Get all objects related to the given object (through O2O relations)
    pub fn get_o2o(&self, index: &ObjectIndex) -> impl Iterator<Item = (&str, &ObjectIndex)> {
        self.o2o_rel
            .get(index.0)
            .into_iter()
            .flatten()
            .map(|(q, o)| (q.as_str(), o))
    }
}
