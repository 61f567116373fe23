//! Classification of untyped stored values into [`ValueNode`]s.
//!
//! Stored documents are plain JSON. Whether an object is a template instance
//! or a plain record is decided at runtime by probing its `_template` field;
//! [`template_tag`] performs that probe and reports a three-way outcome so no
//! caller ever has to inspect an error message to tell "not a template" apart
//! from a malformed object.

use crate::{TEMPLATE_KEY, TYPENAME_KEY};
use serde_json::{Map, Value};

/// A stored value, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    /// `null` in storage. Dropped from enclosing objects when transformed.
    Absent,
    /// String, number or boolean.
    Scalar(Value),
    /// Ordered list of nodes.
    Sequence(Vec<ValueNode>),
    /// An object built from a named template. `_template` and `__typename`
    /// are already stripped from `fields`.
    TemplateInstance {
        template: String,
        fields: Vec<(String, ValueNode)>,
    },
    /// Any other object; keys are kept verbatim.
    PlainRecord { fields: Vec<(String, ValueNode)> },
}

impl ValueNode {
    pub fn is_absent(&self) -> bool {
        matches!(self, ValueNode::Absent)
    }

    /// Template name if this node is a template instance.
    pub fn template(&self) -> Option<&str> {
        match self {
            ValueNode::TemplateInstance { template, .. } => Some(template),
            _ => None,
        }
    }
}

/// Outcome of probing an object for its `_template` tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateTag<'a> {
    /// `_template` is a non-empty string.
    Present(&'a str),
    /// `_template` is missing, `null` or empty: the object is a plain record.
    Missing,
    /// `_template` holds something that is not a string.
    Invalid(&'a Value),
}

/// Probe an object for a template tag.
///
/// A missing, `null` or empty tag counts as missing, matching a "required
/// string" check.
pub fn template_tag(object: &Map<String, Value>) -> TemplateTag<'_> {
    match object.get(TEMPLATE_KEY) {
        None | Some(Value::Null) => TemplateTag::Missing,
        Some(Value::String(name)) if name.is_empty() => TemplateTag::Missing,
        Some(Value::String(name)) => TemplateTag::Present(name),
        Some(other) => TemplateTag::Invalid(other),
    }
}

/// A stored value whose shape matches neither a template instance nor a
/// plain record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("`_template` at `{path}` must be a string, found {found}")]
    InvalidTemplateTag { path: String, found: &'static str },
}

/// Classify a stored value tree.
pub fn classify(value: &Value) -> Result<ValueNode, ShapeError> {
    classify_at(value, "")
}

/// Classify every entry of an object as a plain record, without probing the
/// object itself for a template tag.
pub fn classify_record(
    object: &Map<String, Value>,
) -> Result<Vec<(String, ValueNode)>, ShapeError> {
    classify_entries(object, "", &[])
}

fn classify_at(value: &Value, path: &str) -> Result<ValueNode, ShapeError> {
    match value {
        Value::Null => Ok(ValueNode::Absent),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Ok(ValueNode::Scalar(value.clone()))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| classify_at(item, &format!("{path}/{idx}")))
            .collect::<Result<Vec<_>, _>>()
            .map(ValueNode::Sequence),
        Value::Object(object) => match template_tag(object) {
            TemplateTag::Present(template) => Ok(ValueNode::TemplateInstance {
                template: template.to_string(),
                fields: classify_entries(object, path, &[TEMPLATE_KEY, TYPENAME_KEY])?,
            }),
            TemplateTag::Missing => Ok(ValueNode::PlainRecord {
                fields: classify_entries(object, path, &[])?,
            }),
            TemplateTag::Invalid(found) => Err(ShapeError::InvalidTemplateTag {
                path: pointer(path, TEMPLATE_KEY),
                found: kind(found),
            }),
        },
    }
}

fn classify_entries(
    object: &Map<String, Value>,
    path: &str,
    skip: &[&str],
) -> Result<Vec<(String, ValueNode)>, ShapeError> {
    object
        .iter()
        .filter(|(key, _)| !skip.contains(&key.as_str()))
        .map(|(key, value)| -> Result<_, ShapeError> {
            Ok((key.clone(), classify_at(value, &pointer(path, key))?))
        })
        .collect()
}

/// JSON pointer of `key` under `path`.
fn pointer(path: &str, key: &str) -> String {
    format!("{path}/{}", key.replace('~', "~0").replace('/', "~1"))
}

/// Human name of a JSON value's kind, for diagnostics.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
