//! JSON Schema to parameter type mapping.
//!
//! The mapped types describe tool parameters for documentation and
//! signatures only. Nothing here validates argument values.

use serde_json::{Map, Value};

/// Semantic type of a tool parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    String,
    /// Float or integer.
    Number,
    Integer,
    Boolean,
    /// Sequence of the item type.
    Array(Box<ParamType>),
    /// Mapping of string keys to any value.
    Object,
    /// Closed set of literal values.
    Enum(Vec<Value>),
    /// Any one of the alternatives, in schema order.
    Union(Vec<ParamType>),
    Any,
}

impl ParamType {
    /// Map a JSON Schema fragment to a parameter type.
    ///
    /// Unknown or missing types degrade to [`ParamType::Any`].
    #[must_use]
    pub fn from_schema(schema: &Value) -> Self {
        if let Some(alternatives) = schema.get("anyOf").and_then(Value::as_array) {
            return Self::Union(alternatives.iter().map(Self::from_schema).collect());
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("string") => match schema.get("enum").and_then(Value::as_array) {
                Some(values) if !values.is_empty() => Self::Enum(values.clone()),
                _ => Self::String,
            },
            Some("number") => Self::Number,
            Some("integer") => Self::Integer,
            Some("boolean") => Self::Boolean,
            Some("array") => {
                let item = schema.get("items").map_or(Self::Any, Self::from_schema);
                Self::Array(Box::new(item))
            }
            Some("object") => Self::Object,
            _ => Self::Any,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Integer => f.write_str("integer"),
            Self::Boolean => f.write_str("boolean"),
            Self::Array(item) => write!(f, "array<{item}>"),
            Self::Object => f.write_str("object"),
            Self::Any => f.write_str("any"),
            Self::Enum(values) => {
                let literals: Vec<String> = values.iter().map(Value::to_string).collect();
                f.write_str(&literals.join(" | "))
            }
            Self::Union(types) => {
                let parts: Vec<String> = types.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(" | "))
            }
        }
    }
}

/// One parameter derived from a tool's input schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    pub description: Option<String>,
}

/// Derive parameter specs from an input schema.
///
/// Required parameters come first, then optional ones. Each group keeps
/// the property order of the schema.
#[must_use]
pub fn parameters(input_schema: &Value) -> Vec<ParameterSpec> {
    let empty = Map::new();
    let properties = input_schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let required: Vec<&str> = input_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let spec = |(name, schema): (&String, &Value)| ParameterSpec {
        name: name.clone(),
        param_type: ParamType::from_schema(schema),
        required: required.contains(&name.as_str()),
        description: schema
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    let (mut ordered, optional): (Vec<_>, Vec<_>) =
        properties.iter().map(spec).partition(|p| p.required);
    ordered.extend(optional);
    ordered
}
