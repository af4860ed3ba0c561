//! Trace-level transformations of event logs: artificial boundary events and
//! unfolding of directly-follows activity pairs.

use chrono::Duration;

use super::constants::{BEGIN_ACTIVITY, END_ACTIVITY, LIFECYCLE_KEY};
use super::event_log_struct::{Attribute, EditableAttributes, Event, EventLog};

///
/// Add artificial `BEGIN`/`END` events to every trace of the log
///
/// Events of each trace are first ordered by timestamp. The `BEGIN` event is placed one
/// minute before the first event of the trace, the `END` event one minute after the last.
/// If the neighbouring event carries a `lifecycle:transition` attribute, the artificial
/// event copies it.
///
/// Traces without any timestamped event are left unchanged.
///
pub fn add_boundary_events(log: &mut EventLog) {
    for trace in &mut log.traces {
        trace.sort_events_by_time();
        let first_time = match trace.events.iter().find_map(|e| e.timestamp()) {
            Some(t) => *t,
            None => continue,
        };
        let last_time = match trace.events.iter().rev().find_map(|e| e.timestamp()) {
            Some(t) => *t,
            None => continue,
        };

        let mut begin = Event::new_with_time(
            BEGIN_ACTIVITY.to_string(),
            first_time - Duration::minutes(1),
        );
        let mut end =
            Event::new_with_time(END_ACTIVITY.to_string(), last_time + Duration::minutes(1));

        if let Some(first) = trace.events.first() {
            copy_lifecycle(first, &mut begin);
        }
        if let Some(last) = trace.events.last() {
            copy_lifecycle(last, &mut end);
        }

        trace.events.insert(0, begin);
        trace.events.push(end);
    }
}

fn copy_lifecycle(from: &Event, to: &mut Event) {
    if let Some(lifecycle) = from.attributes.get_by_key(LIFECYCLE_KEY) {
        to.attributes
            .push(Attribute::new(LIFECYCLE_KEY.to_string(), lifecycle.value.clone()));
    }
}

///
/// Rename one side of every directly-follows occurrence of an activity pair
///
/// For every trace (ordered by timestamp), every occurrence of activity `rel.0` directly
/// followed by activity `rel.1` renames the follower event to `new_activity` — or the
/// preceding event instead, if `rename_source` is set. Matching is performed against the
/// original activity labels; renames are applied afterwards.
///
pub fn unfold_activity(
    log: &mut EventLog,
    rel: (&str, &str),
    new_activity: &str,
    rename_source: bool,
) {
    for trace in &mut log.traces {
        trace.sort_events_by_time();
        let matched: Vec<usize> = trace
            .events
            .windows(2)
            .enumerate()
            .filter(|(_, w)| {
                w[0].activity().map(String::as_str) == Some(rel.0)
                    && w[1].activity().map(String::as_str) == Some(rel.1)
            })
            .map(|(i, _)| if rename_source { i } else { i + 1 })
            .collect();
        for i in matched {
            trace.events[i].set_activity(new_activity.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::event_log_struct::Trace;
    use chrono::{TimeZone, Utc};

    fn trace_of(activities: &[&str]) -> Trace {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Trace {
            attributes: Vec::new(),
            events: activities
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    Event::new_with_time(a.to_string(), base + Duration::minutes(10 * i as i64))
                })
                .collect(),
        }
    }

    fn activities_of(trace: &Trace) -> Vec<String> {
        trace
            .events
            .iter()
            .map(|e| e.activity().unwrap().clone())
            .collect()
    }

    #[test]
    fn boundary_events_are_added_with_offset() {
        let mut log = EventLog {
            traces: vec![trace_of(&["a", "b", "c"])],
            ..Default::default()
        };
        add_boundary_events(&mut log);
        let trace = &log.traces[0];
        assert_eq!(activities_of(trace), vec!["BEGIN", "a", "b", "c", "END"]);
        let first = trace.events[1].timestamp().unwrap();
        let begin = trace.events[0].timestamp().unwrap();
        assert_eq!(*first - *begin, Duration::minutes(1));
        let last = trace.events[3].timestamp().unwrap();
        let end = trace.events[4].timestamp().unwrap();
        assert_eq!(*end - *last, Duration::minutes(1));
    }

    #[test]
    fn boundary_events_skip_untimed_traces() {
        let mut log = EventLog {
            traces: vec![Trace {
                attributes: Vec::new(),
                events: vec![Event::new("a".to_string())],
            }],
            ..Default::default()
        };
        add_boundary_events(&mut log);
        assert_eq!(log.traces[0].events.len(), 1);
    }

    #[test]
    fn unfold_renames_only_matching_followers() {
        let mut log = EventLog {
            traces: vec![trace_of(&["add item", "pack item", "add item", "ship"])],
            ..Default::default()
        };
        unfold_activity(&mut log, ("add item", "pack item"), "pack after add", false);
        assert_eq!(
            activities_of(&log.traces[0]),
            vec!["add item", "pack after add", "add item", "ship"]
        );
    }

    #[test]
    fn unfold_can_rename_the_source_event() {
        let mut log = EventLog {
            traces: vec![trace_of(&["a", "b", "a", "b"])],
            ..Default::default()
        };
        unfold_activity(&mut log, ("a", "b"), "a'", true);
        assert_eq!(activities_of(&log.traces[0]), vec!["a'", "b", "a'", "b"]);
    }
}
