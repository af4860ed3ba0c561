use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::constants::{ACTIVITY_NAME, TIMESTAMP_KEY};

///
/// Attribute value of an event, trace or log attribute
///
/// Covers the typed attribute tags of the XES standard.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "content")]
pub enum AttributeValue {
    /// String values
    String(String),
    /// DateTime values
    Date(DateTime<Utc>),
    /// Integer values
    Int(i64),
    /// Float values
    Float(f64),
    /// Boolean values
    Boolean(bool),
    /// IDs (UUIDs)
    ID(Uuid),
    /// Used to represent invalid values (e.g., a date which could not be parsed)
    None,
}

impl AttributeValue {
    /// Try to get the attribute value as a String
    pub fn try_as_string(&self) -> Option<&String> {
        match self {
            AttributeValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the attribute value as a date
    pub fn try_as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            AttributeValue::Date(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the attribute value as an integer
    pub fn try_as_int(&self) -> Option<&i64> {
        match self {
            AttributeValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the attribute value as a float
    pub fn try_as_float(&self) -> Option<&f64> {
        match self {
            AttributeValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the attribute value as a boolean
    pub fn try_as_bool(&self) -> Option<&bool> {
        match self {
            AttributeValue::Boolean(v) => Some(v),
            _ => None,
        }
    }
}

///
/// Attribute made up of key and value
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    /// Attribute key
    pub key: String,
    /// Attribute value
    pub value: AttributeValue,
}

impl Attribute {
    /// Helper to create a new attribute
    pub fn new(key: String, value: AttributeValue) -> Self {
        Self { key, value }
    }
}

///
/// Attributes are [`Vec`]s of [`Attribute`]s
///
/// See the [`EditableAttributes`] trait for convenient functions to add, look up or remove
/// attributes by key.
///
pub type Attributes = Vec<Attribute>;

///
/// Trait to easily add, look up and update attributes
///
pub trait EditableAttributes {
    /// Add a new attribute (with key and value)
    ///
    /// Note: Does _not_ check if an attribute with the same key was already present.
    fn add_to_attributes(&mut self, key: String, value: AttributeValue);
    /// Get an attribute by key
    ///
    /// _Complexity_: linear lookup (i.e., in O(n)).
    fn get_by_key(&self, key: &str) -> Option<&Attribute>;
    /// Get an attribute as mutable by key
    fn get_by_key_mut(&mut self, key: &str) -> Option<&mut Attribute>;
    /// Get an attribute by key, falling back to the provided global attributes
    fn get_by_key_or_global<'a>(
        &'a self,
        key: &str,
        global_attrs: &'a Option<Attributes>,
    ) -> Option<&'a Attribute>;
    /// Remove the attribute with the given key
    ///
    /// Returns `true` if the attribute was present and `false` otherwise.
    fn remove_with_key(&mut self, key: &str) -> bool;
}

impl EditableAttributes for Attributes {
    fn add_to_attributes(&mut self, key: String, value: AttributeValue) {
        self.push(Attribute::new(key, value));
    }

    fn get_by_key(&self, key: &str) -> Option<&Attribute> {
        self.iter().find(|attr| attr.key == key)
    }

    fn get_by_key_mut(&mut self, key: &str) -> Option<&mut Attribute> {
        self.iter_mut().find(|attr| attr.key == key)
    }

    fn get_by_key_or_global<'a>(
        &'a self,
        key: &str,
        global_attrs: &'a Option<Attributes>,
    ) -> Option<&'a Attribute> {
        if let Some(attr) = self.get_by_key(key) {
            return Some(attr);
        }
        if let Some(global_attrs) = global_attrs {
            if let Some(attr) = global_attrs.get_by_key(key) {
                return Some(attr);
            }
        }
        None
    }

    fn remove_with_key(&mut self, key: &str) -> bool {
        if let Some(index) = self.iter().position(|a| a.key == key) {
            self.remove(index);
            return true;
        }
        false
    }
}

///
/// An event consists of multiple (event) attributes ([`Attributes`])
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Event attributes
    pub attributes: Attributes,
}

impl Event {
    /// Create a new event with the provided activity
    ///
    /// Implicitly assumes usage of the concept XES extension (i.e., uses [`ACTIVITY_NAME`] as key)
    pub fn new(activity: String) -> Self {
        Event {
            attributes: vec![Attribute::new(
                ACTIVITY_NAME.to_string(),
                AttributeValue::String(activity),
            )],
        }
    }

    /// Create a new event with the provided activity and timestamp
    pub fn new_with_time(activity: String, time: DateTime<Utc>) -> Self {
        Event {
            attributes: vec![
                Attribute::new(ACTIVITY_NAME.to_string(), AttributeValue::String(activity)),
                Attribute::new(TIMESTAMP_KEY.to_string(), AttributeValue::Date(time)),
            ],
        }
    }

    /// Get the activity name of this event (i.e., the value of [`ACTIVITY_NAME`])
    pub fn activity(&self) -> Option<&String> {
        self.attributes
            .get_by_key(ACTIVITY_NAME)
            .and_then(|a| a.value.try_as_string())
    }

    /// Get the timestamp of this event (i.e., the value of [`TIMESTAMP_KEY`])
    pub fn timestamp(&self) -> Option<&DateTime<Utc>> {
        self.attributes
            .get_by_key(TIMESTAMP_KEY)
            .and_then(|a| a.value.try_as_date())
    }

    /// Overwrite the activity name of this event, adding the attribute if missing
    pub fn set_activity(&mut self, activity: String) {
        match self.attributes.get_by_key_mut(ACTIVITY_NAME) {
            Some(attr) => attr.value = AttributeValue::String(activity),
            None => self
                .attributes
                .add_to_attributes(ACTIVITY_NAME.to_string(), AttributeValue::String(activity)),
        }
    }
}

///
/// A trace consists of a list of events and trace attributes (see also [`Event`] and [`Attributes`])
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trace {
    /// Trace-level attributes
    pub attributes: Attributes,
    /// Events contained in the trace
    pub events: Vec<Event>,
}

impl Trace {
    /// Sort the events of this trace by their timestamp (stable; events without a timestamp first)
    pub fn sort_events_by_time(&mut self) {
        self.events.sort_by_key(|e| e.timestamp().copied());
    }
}

///
/// Event log consisting of a list of [`Trace`]s and log [`Attributes`]
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EventLog {
    /// Top-level attributes
    pub attributes: Attributes,
    /// Traces contained in the log
    pub traces: Vec<Trace>,
    /// XES event classifiers
    pub classifiers: Option<Vec<EventLogClassifier>>,
    /// Global trace attributes
    pub global_trace_attrs: Option<Attributes>,
    /// Global event attributes
    pub global_event_attrs: Option<Attributes>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to get the [`EventLogClassifier`] with the associated name
    pub fn get_classifier_by_name<S>(&self, name: S) -> Option<EventLogClassifier>
    where
        String: PartialEq<S>,
    {
        self.classifiers
            .as_ref()
            .and_then(|classifiers| classifiers.iter().find(|c| c.name == name).cloned())
    }

    /// Get a trace attribute value using a key
    ///
    /// Uses global trace attributes of the event log (if any) as fallback.
    pub fn get_trace_attribute<'a>(&'a self, trace: &'a Trace, key: &str) -> Option<&'a Attribute> {
        trace
            .attributes
            .get_by_key_or_global(key, &self.global_trace_attrs)
    }

    /// Get an event attribute value using a key
    ///
    /// Uses global event attributes of the event log (if any) as fallback.
    pub fn get_event_attribute<'a>(&'a self, event: &'a Event, key: &str) -> Option<&'a Attribute> {
        event
            .attributes
            .get_by_key_or_global(key, &self.global_event_attrs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
/// Event classifier
///
/// Enables classifying events by a set of attributes to consider for the _class identity_.
/// The default classifier uses the activity name only.
pub struct EventLogClassifier {
    /// Name of the classifier
    pub name: String,
    /// List of attribute keys to consider for the _class identity_
    pub keys: Vec<String>,
}

impl EventLogClassifier {
    /// Delimiter for combining the values defined by the classifier to a single class identity string
    pub const DELIMITER: &'static str = "+";

    /// Get the class identity (joined with [`EventLogClassifier::DELIMITER`])
    ///
    /// Missing attributes and attributes with a type different than [`AttributeValue::String`]
    /// are represented by an empty String. With no keys, the activity name is used.
    pub fn get_class_identity(&self, event: &Event) -> String {
        if self.keys.is_empty() {
            return event.activity().cloned().unwrap_or_default();
        }
        let mut ret = String::new();
        let mut first = true;
        for k in &self.keys {
            let s = match event.attributes.get_by_key(k).map(|at| &at.value) {
                Some(AttributeValue::String(s)) => s.clone(),
                _ => String::new(),
            };
            if !first {
                ret.push_str(EventLogClassifier::DELIMITER);
            } else {
                first = false;
            }
            ret.push_str(&s);
        }
        ret
    }
}
