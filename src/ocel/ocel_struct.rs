use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

///
/// Object-centric event log
///
/// Consists of multiple [`OCELEvent`]s and [`OCELObject`]s with corresponding event and
/// object [`OCELType`]s. The serde representation follows the OCEL 2.0 JSON exchange format.
///
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OCEL {
    /// Event types
    #[serde(rename = "eventTypes")]
    pub event_types: Vec<OCELType>,
    /// Object types
    #[serde(rename = "objectTypes")]
    pub object_types: Vec<OCELType>,
    /// Events
    #[serde(default)]
    pub events: Vec<OCELEvent>,
    /// Objects
    #[serde(default)]
    pub objects: Vec<OCELObject>,
}

impl OCEL {
    /// Get the declared event type with the given name
    pub fn event_type(&self, name: &str) -> Option<&OCELType> {
        self.event_types.iter().find(|t| t.name == name)
    }

    /// Get the declared object type with the given name
    pub fn object_type(&self, name: &str) -> Option<&OCELType> {
        self.object_types.iter().find(|t| t.name == name)
    }

    /// Add an event type declaration if it is not declared yet
    pub fn add_event_type_if_missing(&mut self, name: &str) {
        if self.event_type(name).is_none() {
            self.event_types.push(OCELType {
                name: name.to_string(),
                attributes: Vec::new(),
            });
        }
    }

    /// Add an object type declaration if it is not declared yet
    pub fn add_object_type_if_missing(&mut self, name: &str) {
        if self.object_type(name).is_none() {
            self.object_types.push(OCELType {
                name: name.to_string(),
                attributes: Vec::new(),
            });
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// OCEL event/object type
pub struct OCELType {
    /// Name
    pub name: String,
    /// Attributes (defining the _type_ of values)
    #[serde(default)]
    pub attributes: Vec<OCELTypeAttribute>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// OCEL attribute declaration of an event or object type
pub struct OCELTypeAttribute {
    /// Name of the attribute
    pub name: String,
    /// Type of the attribute value
    #[serde(rename = "type")]
    pub value_type: String,
}

impl OCELTypeAttribute {
    /// Helper to create a new attribute declaration
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// OCEL event attribute: a named value
pub struct OCELEventAttribute {
    /// Name of the attribute
    pub name: String,
    /// Value of the attribute
    pub value: OCELAttributeValue,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
/// OCEL event
pub struct OCELEvent {
    /// Event ID
    pub id: String,
    /// Event type (referring back to the `name` of an [`OCELType`])
    #[serde(rename = "type")]
    pub event_type: String,
    /// DateTime when the event occurred
    pub time: DateTime<Utc>,
    /// Event attributes
    #[serde(default)]
    pub attributes: Vec<OCELEventAttribute>,
    /// E2O (event-to-object) relationships
    #[serde(default)]
    pub relationships: Vec<OCELRelationship>,
}

impl OCELEvent {
    /// Helper to create a new event
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        time: DateTime<Utc>,
        attributes: Vec<OCELEventAttribute>,
        relationships: Vec<OCELRelationship>,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            time,
            attributes,
            relationships,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// OCEL relationship (qualified; referring back to an [`OCELObject`])
pub struct OCELRelationship {
    /// ID of the referenced [`OCELObject`]
    #[serde(rename = "objectId")]
    pub object_id: String,
    /// Qualifier of the relationship
    pub qualifier: String,
}

impl OCELRelationship {
    /// Helper to create a new relationship
    pub fn new(object_id: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            qualifier: qualifier.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
/// OCEL object
pub struct OCELObject {
    /// Object ID
    pub id: String,
    /// Object type (referring back to the `name` of an [`OCELType`])
    #[serde(rename = "type")]
    pub object_type: String,
    /// Object attributes (the timestamped attribute-change history of the object)
    #[serde(default)]
    pub attributes: Vec<OCELObjectAttribute>,
    /// O2O (object-to-object) relationships
    #[serde(default)]
    pub relationships: Vec<OCELRelationship>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// OCEL object attribute
///
/// Describing a named value _at a certain point in time_
pub struct OCELObjectAttribute {
    /// Name of the attribute
    pub name: String,
    /// Value of the attribute
    pub value: OCELAttributeValue,
    /// Time of the attribute value
    pub time: DateTime<Utc>,
}

impl OCELObjectAttribute {
    /// Helper to create a new timestamped object attribute
    pub fn new(name: impl Into<String>, value: OCELAttributeValue, time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            value,
            time,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
/// OCEL attribute values
pub enum OCELAttributeValue {
    /// String
    String(String),
    /// DateTime
    Time(DateTime<Utc>),
    /// Integer
    Integer(i64),
    /// Float
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Placeholder for invalid or missing values
    Null,
}

impl std::fmt::Display for OCELAttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OCELAttributeValue::String(s) => write!(f, "{s}"),
            OCELAttributeValue::Time(t) => write!(f, "{}", t.to_rfc3339()),
            OCELAttributeValue::Integer(i) => write!(f, "{i}"),
            OCELAttributeValue::Float(v) => write!(f, "{v}"),
            OCELAttributeValue::Boolean(b) => write!(f, "{b}"),
            OCELAttributeValue::Null => write!(f, "null"),
        }
    }
}

impl OCELAttributeValue {
    /// The OCEL 2.0 type name of this value (as used in type attribute declarations)
    pub fn type_name(&self) -> &'static str {
        match self {
            OCELAttributeValue::String(_) => "string",
            OCELAttributeValue::Time(_) => "time",
            OCELAttributeValue::Integer(_) => "integer",
            OCELAttributeValue::Float(_) => "float",
            OCELAttributeValue::Boolean(_) => "boolean",
            OCELAttributeValue::Null => "string",
        }
    }
}
