use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::event_log::event_log_struct::{EventLog, EventLogClassifier};

/// Activity in a directly-follows graph
type Activity = String;

///
/// A directly-follows graph of activities
///
/// Contains the set of activities, the set of directly-follows relations, and the start
/// and end activities. Activity occurrences and directly-follows relations are annotated
/// with their frequency.
///
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectlyFollowsGraph<'a> {
    /// Activities with their frequencies
    pub activities: HashMap<Activity, u32>,
    /// Directly-follows relations with their frequencies
    #[serde_as(as = "Vec<(_, _)>")]
    pub directly_follows_relations: HashMap<(Cow<'a, str>, Cow<'a, str>), u32>,
    /// Start activities
    pub start_activities: HashSet<Activity>,
    /// End activities
    pub end_activities: HashSet<Activity>,
}

impl Default for DirectlyFollowsGraph<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DirectlyFollowsGraph<'a> {
    /// Create a new, empty [`DirectlyFollowsGraph`]
    pub fn new() -> Self {
        Self {
            activities: HashMap::new(),
            directly_follows_relations: HashMap::new(),
            start_activities: HashSet::new(),
            end_activities: HashSet::new(),
        }
    }

    /// Construct a [`DirectlyFollowsGraph`] from an [`EventLog`], using the given
    /// [`EventLogClassifier`] to derive the activity names
    pub fn create_from_log(event_log: &EventLog, classifier: &EventLogClassifier) -> Self {
        let mut result = Self::new();
        for trace in &event_log.traces {
            let mut last_activity: Option<String> = None;
            for event in &trace.events {
                let activity = classifier.get_class_identity(event);
                result.add_activity(activity.clone(), 1);
                match last_activity.take() {
                    Some(last) => result.add_df_relation(last.into(), activity.clone().into(), 1),
                    None => result.add_start_activity(activity.clone()),
                }
                last_activity = Some(activity);
            }
            if let Some(last) = last_activity.take() {
                result.add_end_activity(last);
            }
        }
        result
    }

    /// Add an activity with a frequency, accumulating if the activity already exists
    pub fn add_activity(&mut self, activity: Activity, frequency: u32) {
        *self.activities.entry(activity).or_default() += frequency;
    }

    /// Add an activity to the set of start activities
    pub fn add_start_activity(&mut self, activity: Activity) {
        self.start_activities.insert(activity);
    }

    /// Add an activity to the set of end activities
    pub fn add_end_activity(&mut self, activity: Activity) {
        self.end_activities.insert(activity);
    }

    /// Add a directly-follows relation with a frequency, accumulating if it already exists
    pub fn add_df_relation(&mut self, from: Cow<'a, str>, to: Cow<'a, str>, frequency: u32) {
        *self
            .directly_follows_relations
            .entry((from, to))
            .or_default() += frequency;
    }

    /// Whether the activity is contained in the graph
    pub fn contains_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.activities.contains_key(activity.as_ref())
    }

    /// Whether the activity is a start activity
    pub fn is_start_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.start_activities.contains(activity.as_ref())
    }

    /// Whether the activity is an end activity
    pub fn is_end_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.end_activities.contains(activity.as_ref())
    }

    /// Whether the directly-follows relation is contained in the graph
    pub fn contains_df_relation<S: Into<Cow<'a, str>>>(&self, (a, b): (S, S)) -> bool {
        self.directly_follows_relations
            .contains_key(&(a.into(), b.into()))
    }

    /// The frequency of a directly-follows relation (0 if not present)
    pub fn df_frequency<S: Into<Cow<'a, str>>>(&self, (a, b): (S, S)) -> u32 {
        self.directly_follows_relations
            .get(&(a.into(), b.into()))
            .copied()
            .unwrap_or(0)
    }

    /// The activities directly preceding the given activity
    pub fn ingoing_activities<S: Into<Cow<'a, str>>>(&self, activity: S) -> HashSet<&Cow<'a, str>> {
        let a = activity.into();
        self.directly_follows_relations
            .keys()
            .filter_map(|(x, y)| if &a == y { Some(x) } else { None })
            .collect()
    }

    /// The activities directly following the given activity
    pub fn outgoing_activities<S: Into<Cow<'a, str>>>(
        &self,
        activity: S,
    ) -> HashSet<&Cow<'a, str>> {
        let a = activity.into();
        self.directly_follows_relations
            .keys()
            .filter_map(|(x, y)| if &a == x { Some(y) } else { None })
            .collect()
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[cfg(feature = "graphviz-export")]
    /// Export the directly-follows graph as a PNG image at the given path
    ///
    /// Only available with the `graphviz-export` feature.
    pub fn export_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), std::io::Error> {
        super::image_export::export_dfg_image_png(self, path)
    }

    #[cfg(feature = "graphviz-export")]
    /// Export the directly-follows graph as an SVG image at the given path
    ///
    /// Only available with the `graphviz-export` feature.
    pub fn export_svg<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), std::io::Error> {
        super::image_export::export_dfg_image_svg(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::event_log_struct::{Event, Trace};
    use chrono::{Duration, TimeZone, Utc};

    pub(crate) fn log_of(traces: &[&[&str]]) -> EventLog {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        EventLog {
            traces: traces
                .iter()
                .map(|activities| Trace {
                    attributes: Vec::new(),
                    events: activities
                        .iter()
                        .enumerate()
                        .map(|(i, a)| {
                            Event::new_with_time(
                                a.to_string(),
                                base + Duration::minutes(10 * i as i64),
                            )
                        })
                        .collect(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn dfg_from_log_counts_activities_and_relations() {
        let log = log_of(&[&["a", "b", "c"], &["a", "b", "b"]]);
        let dfg = DirectlyFollowsGraph::create_from_log(&log, &EventLogClassifier::default());

        assert_eq!(dfg.activities["a"], 2);
        assert_eq!(dfg.activities["b"], 3);
        assert_eq!(dfg.df_frequency(("a", "b")), 2);
        assert_eq!(dfg.df_frequency(("b", "b")), 1);
        assert_eq!(dfg.df_frequency(("b", "c")), 1);
        assert!(!dfg.contains_df_relation(("c", "a")));

        assert!(dfg.is_start_activity("a"));
        assert!(dfg.is_end_activity("c"));
        assert!(dfg.is_end_activity("b"));
        assert!(!dfg.is_start_activity("b"));
    }

    #[test]
    fn ingoing_and_outgoing_activities() {
        let log = log_of(&[&["a", "b", "c"], &["a", "c"]]);
        let dfg = DirectlyFollowsGraph::create_from_log(&log, &EventLogClassifier::default());
        let outgoing: HashSet<_> = dfg
            .outgoing_activities("a")
            .into_iter()
            .map(|a| a.as_ref())
            .collect();
        assert_eq!(outgoing, vec!["b", "c"].into_iter().collect());
        let ingoing: HashSet<_> = dfg
            .ingoing_activities("c")
            .into_iter()
            .map(|a| a.as_ref())
            .collect();
        assert_eq!(ingoing, vec!["a", "b"].into_iter().collect());
    }

    #[test]
    fn dfg_json_roundtrip() {
        let log = log_of(&[&["a", "b"]]);
        let dfg = DirectlyFollowsGraph::create_from_log(&log, &EventLogClassifier::default());
        let json = dfg.to_json().unwrap();
        let deserialized: DirectlyFollowsGraph<'_> = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.activities, dfg.activities);
        assert_eq!(
            deserialized.directly_follows_relations,
            dfg.directly_follows_relations
        );
    }
}
