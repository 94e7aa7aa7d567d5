//! Live property values.

use crate::{Entity, EntityKey, EntityRef};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A property value as read from (or written to) a live entity.
///
/// Scalars are plain JSON values. Collections hold further values, and
/// entity-valued elements are handles to other live entities, not copies.
#[derive(Clone)]
pub enum Value {
    Scalar(serde_json::Value),
    List(Vec<Value>),
    Entity(EntityRef),
}

impl Value {
    /// The JSON `null` scalar.
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(serde_json::Value::Null)
    }

    /// Returns true for the `null` scalar.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(serde_json::Value::Null))
    }

    pub fn as_scalar(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(|v| v.as_str())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(|v| v.as_i64())
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(|v| v.as_f64())
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(|v| v.as_bool())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Short name of the value's shape, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(serde_json::Value::Null) => "null",
            Self::Scalar(serde_json::Value::Bool(_)) => "bool",
            Self::Scalar(serde_json::Value::Number(_)) => "number",
            Self::Scalar(serde_json::Value::String(_)) => "string",
            Self::Scalar(serde_json::Value::Array(_)) => "array",
            Self::Scalar(serde_json::Value::Object(_)) => "object",
            Self::List(_) => "list",
            Self::Entity(_) => "entity",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Entity(entity) => match entity.try_borrow() {
                Ok(inner) => write!(f, "<{} {}>", inner.entity_type(), EntityKey::of(entity)),
                Err(_) => write!(f, "<entity {} (borrowed)>", EntityKey::of(entity)),
            },
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Into::into)
    }
}

impl<E: Entity> From<Rc<RefCell<E>>> for Value {
    fn from(entity: Rc<RefCell<E>>) -> Self {
        Self::Entity(entity)
    }
}
