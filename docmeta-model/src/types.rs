//! The pluggable type system bound to leaf fields.
//!
//! Types are canonical singletons: a [`TypeRegistry`] owns one instance per
//! name and hands out [`TypeRef`] handles. Two handles are equal only when
//! they point at the same registered instance.

use crate::error::{TypeError, TypeResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Layout used for `date` values in documents, e.g. `20240131T08:15:00.000+0000`.
pub const DATE_FORMAT: &str = "%Y%m%dT%H:%M:%S%.3f%z";

/// Native form of a scalar document value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Date(DateTime<Utc>),
    Binary(Vec<u8>),
}

/// Capability contract every field type implements.
pub trait Type: fmt::Debug + Send + Sync {
    /// Unique name the type is registered under.
    fn name(&self) -> &str;

    /// Whether two values of this type may be compared for equality.
    fn supports_eq(&self) -> bool;

    /// Whether values of this type have an ordering.
    fn supports_ordering(&self) -> bool;

    /// Encodes a native value into the document representation.
    fn to_json(&self, value: &ScalarValue) -> TypeResult<Value>;

    /// Decodes a document node into a native value.
    fn from_json(&self, node: &Value) -> TypeResult<ScalarValue>;

    /// Container types are encoded structurally by the field tree.
    fn is_container(&self) -> bool {
        false
    }
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Boolean,
    Integer,
    Double,
    String,
    Date,
    Binary,
    Uid,
}

impl ScalarType {
    pub const ALL: [ScalarType; 7] = [
        Self::Boolean,
        Self::Integer,
        Self::Double,
        Self::String,
        Self::Date,
        Self::Binary,
        Self::Uid,
    ];

    fn invalid(&self, detail: impl Into<String>) -> TypeError {
        TypeError::InvalidValue {
            type_name: self.name().to_string(),
            detail: detail.into(),
        }
    }
}

impl Type for ScalarType {
    fn name(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::String => "string",
            Self::Date => "date",
            Self::Binary => "binary",
            Self::Uid => "uid",
        }
    }

    fn supports_eq(&self) -> bool {
        true
    }

    fn supports_ordering(&self) -> bool {
        !matches!(self, Self::Boolean | Self::Binary)
    }

    fn to_json(&self, value: &ScalarValue) -> TypeResult<Value> {
        match (self, value) {
            (Self::Boolean, ScalarValue::Bool(b)) => Ok(Value::Bool(*b)),
            (Self::Integer, ScalarValue::Integer(i)) => Ok(Value::from(*i)),
            (Self::Double, ScalarValue::Integer(i)) => Ok(Value::from(*i as f64)),
            (Self::Double, ScalarValue::Double(d)) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .ok_or_else(|| self.invalid(format!("{d} is not a finite number"))),
            (Self::String | Self::Uid, ScalarValue::String(s)) => Ok(Value::String(s.clone())),
            (Self::Date, ScalarValue::Date(d)) => Ok(Value::String(d.format(DATE_FORMAT).to_string())),
            (Self::Binary, ScalarValue::Binary(bytes)) => Ok(Value::String(STANDARD.encode(bytes))),
            (_, other) => Err(self.invalid(format!("cannot encode {other:?}"))),
        }
    }

    fn from_json(&self, node: &Value) -> TypeResult<ScalarValue> {
        match self {
            Self::Boolean => node
                .as_bool()
                .map(ScalarValue::Bool)
                .ok_or_else(|| self.invalid(format!("expected boolean, got {node}"))),
            Self::Integer => match node {
                Value::Number(n) => n.as_i64().map(ScalarValue::Integer),
                Value::String(s) => s.trim().parse().ok().map(ScalarValue::Integer),
                _ => None,
            }
            .ok_or_else(|| self.invalid(format!("expected integer, got {node}"))),
            Self::Double => match node {
                Value::Number(n) => n.as_f64().map(ScalarValue::Double),
                Value::String(s) => s.trim().parse().ok().map(ScalarValue::Double),
                _ => None,
            }
            .ok_or_else(|| self.invalid(format!("expected number, got {node}"))),
            Self::String => match node {
                Value::String(s) => Ok(ScalarValue::String(s.clone())),
                Value::Bool(_) | Value::Number(_) => Ok(ScalarValue::String(node.to_string())),
                _ => Err(self.invalid(format!("expected text, got {node}"))),
            },
            Self::Uid => node
                .as_str()
                .filter(|s| !s.is_empty())
                .map(|s| ScalarValue::String(s.to_string()))
                .ok_or_else(|| self.invalid(format!("expected identifier, got {node}"))),
            Self::Date => {
                let text = node
                    .as_str()
                    .ok_or_else(|| self.invalid(format!("expected date string, got {node}")))?;
                DateTime::parse_from_str(text, DATE_FORMAT)
                    .or_else(|_| DateTime::parse_from_rfc3339(text))
                    .map(|d| ScalarValue::Date(d.with_timezone(&Utc)))
                    .map_err(|e| self.invalid(format!("'{text}': {e}")))
            }
            Self::Binary => {
                let text = node
                    .as_str()
                    .ok_or_else(|| self.invalid(format!("expected base64 string, got {node}")))?;
                STANDARD
                    .decode(text)
                    .map(ScalarValue::Binary)
                    .map_err(|e| self.invalid(e.to_string()))
            }
        }
    }
}

/// Structural kinds with no scalar representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Object,
    Array,
    /// Any other structural kind (e.g. a reference to another entity).
    Other,
}

/// A type whose values are encoded child-by-child by the field tree.
///
/// Containers are never comparable and refuse scalar conversions with
/// [`TypeError::Unsupported`].
#[derive(Debug, Clone)]
pub struct ContainerType {
    name: String,
    kind: ContainerKind,
}

impl ContainerType {
    pub fn new(name: impl Into<String>, kind: ContainerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn object() -> Self {
        Self::new("object", ContainerKind::Object)
    }

    pub fn array() -> Self {
        Self::new("array", ContainerKind::Array)
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    fn unsupported(&self, operation: &'static str) -> TypeError {
        TypeError::Unsupported {
            type_name: self.name.clone(),
            operation,
        }
    }
}

impl Type for ContainerType {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_eq(&self) -> bool {
        false
    }

    fn supports_ordering(&self) -> bool {
        false
    }

    fn to_json(&self, _value: &ScalarValue) -> TypeResult<Value> {
        Err(self.unsupported("to_json"))
    }

    fn from_json(&self, _node: &Value) -> TypeResult<ScalarValue> {
        Err(self.unsupported("from_json"))
    }

    fn is_container(&self) -> bool {
        true
    }
}

/// Shared handle to a registered type. Equality is identity, hashing is by name.
#[derive(Clone)]
pub struct TypeRef(Arc<dyn Type>);

impl TypeRef {
    pub fn as_type(&self) -> &dyn Type {
        self.0.as_ref()
    }
}

impl std::ops::Deref for TypeRef {
    type Target = dyn Type;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name().hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0.name())
    }
}

/// Lookup table of canonical type instances keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeRef>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`ScalarType`] plus the `object` and `array` containers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for scalar in ScalarType::ALL {
            registry.insert(Arc::new(scalar));
        }
        registry.insert(Arc::new(ContainerType::object()));
        registry.insert(Arc::new(ContainerType::array()));
        registry
    }

    /// Registers a new type and returns its canonical handle.
    pub fn register(&mut self, ty: Arc<dyn Type>) -> TypeResult<TypeRef> {
        if self.types.contains_key(ty.name()) {
            return Err(TypeError::AlreadyRegistered(ty.name().to_string()));
        }
        Ok(self.insert(ty))
    }

    fn insert(&mut self, ty: Arc<dyn Type>) -> TypeRef {
        let handle = TypeRef(ty);
        self.types.insert(handle.name().to_string(), handle.clone());
        handle
    }

    pub fn get(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_from_same_registry_are_identical() {
        let registry = TypeRegistry::with_defaults();
        assert_eq!(registry.get("string"), registry.get("string"));
    }

    #[test]
    fn same_name_from_different_registries_differs() {
        let a = TypeRegistry::with_defaults().get("object").unwrap();
        let b = TypeRegistry::with_defaults().get("object").unwrap();
        assert_eq!(a.name(), b.name());
        assert_ne!(a, b);
    }
}
