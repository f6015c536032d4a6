//! Loosely-typed bus values
//!
//! Everything the transport hands us is converted into [`DynamicValue`] at the
//! boundary. The codecs are the only place that inspects these tags.

use std::collections::HashMap;

/// Property map as returned by `GetAll` or carried in `PropertiesChanged`
pub type PropertyMap = HashMap<String, DynamicValue>;

/// Tagged representation of a value received over the bus
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Bool(bool),
    F64(f64),
    I64(i64),
    U64(u64),
    Str(String),
    Array(Vec<DynamicValue>),
    Dict(PropertyMap),
}

impl DynamicValue {
    /// Numeric view of the value, accepting any integer or floating tag
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            Self::I64(v) => Some(*v as f64),
            Self::U64(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&PropertyMap> {
        match self {
            Self::Dict(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the tag, used in type mismatch reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::F64(_) | Self::I64(_) | Self::U64(_) => "numeric",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<i64> for DynamicValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u64> for DynamicValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<PropertyMap> for DynamicValue {
    fn from(v: PropertyMap) -> Self {
        Self::Dict(v)
    }
}
