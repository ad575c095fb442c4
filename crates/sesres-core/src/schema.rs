//! Declarative request schemas
//!
//! Each handler declares the properties it accepts: required keys, kinds,
//! defaults, enumerations and regex patterns. Validation runs before any
//! handler logic, so a malformed request never reaches an external service.
//!
//! CloudFormation delivers every scalar property as a string, so the
//! validator first coerces string values toward the declared kind
//! ("true"/"60" become bool/integer) before type-checking — the same
//! heuristic conversion the request envelope has always required.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::{Map, Value};

/// Declared kind of a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Integer,
    Boolean,
    Object,
}

/// Declaration for a single property
#[derive(Debug)]
pub struct PropertySpec {
    kind: PropertyKind,
    default: Option<Value>,
    pattern: Option<Regex>,
    allowed: Option<Vec<&'static str>>,
}

impl PropertySpec {
    fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            default: None,
            pattern: None,
            allowed: None,
        }
    }

    pub fn string() -> Self {
        Self::new(PropertyKind::String)
    }

    pub fn integer() -> Self {
        Self::new(PropertyKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::new(PropertyKind::Boolean)
    }

    pub fn object() -> Self {
        Self::new(PropertyKind::Object)
    }

    /// Value applied when the property is absent
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Regex the (string) value must match somewhere
    ///
    /// Schemas are static declarations, so a pattern that does not compile
    /// is a programming error.
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(Regex::new(pattern).expect("invalid schema pattern"));
        self
    }

    /// Restrict the (string) value to an enumeration
    pub fn with_allowed(mut self, values: &[&'static str]) -> Self {
        self.allowed = Some(values.to_vec());
        self
    }

    /// Coerce a CloudFormation string value toward the declared kind
    fn coerce(&self, value: &Value) -> Option<Value> {
        let text = value.as_str()?;
        match self.kind {
            PropertyKind::Integer => text.parse::<i64>().ok().map(Value::from),
            PropertyKind::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }

    fn kind_matches(&self, value: &Value) -> bool {
        match self.kind {
            PropertyKind::String => value.is_string(),
            PropertyKind::Integer => value.is_i64() || value.is_u64(),
            PropertyKind::Boolean => value.is_boolean(),
            PropertyKind::Object => value.is_object(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            PropertyKind::String => "string",
            PropertyKind::Integer => "integer",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Object => "object",
        }
    }
}

/// Declarative schema for a handler's request properties
#[derive(Debug, Default)]
pub struct Schema {
    required: Vec<&'static str>,
    properties: Vec<(&'static str, PropertySpec)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, keys: &[&'static str]) -> Self {
        self.required.extend_from_slice(keys);
        self
    }

    pub fn property(mut self, name: &'static str, spec: PropertySpec) -> Self {
        self.properties.push((name, spec));
        self
    }

    /// Validate and normalize the desired properties in place
    ///
    /// Coerces string scalars toward their declared kinds, applies
    /// defaults for absent properties, then checks required keys, kinds,
    /// enumerations and patterns.
    pub fn validate(&self, properties: &mut Map<String, Value>) -> Result<()> {
        self.apply(properties);

        for key in &self.required {
            if !properties.contains_key(*key) {
                return Err(Error::validation(format!(
                    "required property {} is missing",
                    key
                )));
            }
        }

        for (name, spec) in &self.properties {
            let value = match properties.get(*name) {
                Some(value) => value,
                None => continue,
            };
            if !spec.kind_matches(value) {
                return Err(Error::validation(format!(
                    "property {} must be of type {}",
                    name,
                    spec.kind_name()
                )));
            }
            if let Some(allowed) = &spec.allowed {
                let text = value.as_str().unwrap_or_default();
                if !allowed.contains(&text) {
                    return Err(Error::validation(format!(
                        "property {} must be one of {:?}, got {:?}",
                        name, allowed, text
                    )));
                }
            }
            if let Some(pattern) = &spec.pattern {
                let text = value.as_str().unwrap_or_default();
                if !pattern.is_match(text) {
                    return Err(Error::validation(format!(
                        "property {} does not match pattern {}",
                        name,
                        pattern.as_str()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Best-effort coercion and defaulting, without validation errors
    ///
    /// Used on prior properties so the no-op diff compares like with like;
    /// they were validated when originally accepted.
    pub fn normalize(&self, properties: &mut Map<String, Value>) {
        self.apply(properties);
    }

    fn apply(&self, properties: &mut Map<String, Value>) {
        for (name, spec) in &self.properties {
            match properties.get(*name) {
                Some(value) => {
                    if let Some(coerced) = spec.coerce(value) {
                        properties.insert(name.to_string(), coerced);
                    }
                }
                None => {
                    if let Some(default) = &spec.default {
                        properties.insert(name.to_string(), default.clone());
                    }
                }
            }
        }
    }
}
