use super::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a property: unique per (media package, namespace, name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId {
    pub media_package_id: String,
    pub namespace: String,
    pub name: String,
}

impl PropertyId {
    pub fn new(
        media_package_id: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            media_package_id: media_package_id.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// Typed property value
///
/// Versions are stored as longs; use [`PropertyValue::version`] and
/// [`PropertyValue::as_version`] to move between the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    String(String),
    /// Millisecond precision once persisted
    Date(DateTime<Utc>),
    Long(i64),
    Boolean(bool),
}

impl PropertyValue {
    /// Store a version number as a long value
    ///
    /// Versions beyond `i64::MAX` saturate; no claimable version gets there.
    pub fn version(version: Version) -> Self {
        PropertyValue::Long(version.to_stored().unwrap_or(i64::MAX))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            PropertyValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            PropertyValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_version(&self) -> Option<Version> {
        self.as_long().and_then(|v| Version::from_stored(v).ok())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Long(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropertyValue::Date(value)
    }
}

/// A namespaced fact attached to a media package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(id: PropertyId, value: impl Into<PropertyValue>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}
