//! Rewriting classified value trees into mutation payloads.

use crate::node::{self, classify, ShapeError, ValueNode};
use crate::{COLLECTION_KEY, TEMPLATE_KEY, TYPENAME_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How the top level of a document payload is namespaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadInstructions {
    /// Wrap the payload under the document's `_collection` name.
    pub include_collection: bool,
    /// Wrap the payload under the document's `_template` name.
    pub include_template: bool,
}

impl PayloadInstructions {
    pub fn new(include_collection: bool, include_template: bool) -> Self {
        Self {
            include_collection,
            include_template,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    #[error("document must be an object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("document has no `{key}` to namespace the payload under")]
    MissingKey { key: &'static str },

    #[error("document `{key}` must be a string, found {found}")]
    InvalidKey { key: &'static str, found: &'static str },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Transform a stored document into the payload of an update mutation.
///
/// The reserved keys `_collection`, `_template` and `__typename` are stripped
/// and the remaining fields are rewritten with [`transform_params`]. The
/// result is then optionally wrapped under the template name and, outermost,
/// under the collection name. `defaults` are merged beside the rewritten
/// fields at the level just inside the collection wrapper; a value present in
/// the document always wins over a default.
pub fn transform_document_into_mutation_payload(
    document: &Value,
    instructions: PayloadInstructions,
    defaults: Option<&Map<String, Value>>,
) -> Result<Value, PayloadError> {
    let Value::Object(document) = document else {
        return Err(PayloadError::NotAnObject {
            found: node::kind(document),
        });
    };

    let mut rest = document.clone();
    let collection = rest.remove(COLLECTION_KEY);
    let template = rest.remove(TEMPLATE_KEY);
    rest.remove(TYPENAME_KEY);

    let params = transform_fields(node::classify_record(&rest)?);
    let params = if instructions.include_template {
        let template = reserved_name(template.as_ref(), TEMPLATE_KEY)?;
        single_entry(template, Value::Object(params))
    } else {
        params
    };

    let mut merged = defaults.cloned().unwrap_or_default();
    merged.extend(params.into_iter().filter(|(_, value)| !value.is_null()));

    if instructions.include_collection {
        let collection = reserved_name(collection.as_ref(), COLLECTION_KEY)?;
        Ok(Value::Object(single_entry(collection, Value::Object(merged))))
    } else {
        Ok(Value::Object(merged))
    }
}

/// Rewrite one classified node.
///
/// Template instances become `{ <template>: <fields> }`, plain records keep
/// their keys, sequences keep their length and order. `None` means the node
/// was absent; enclosing objects drop such entries and sequences keep them as
/// `null`.
pub fn transform_params(node: ValueNode) -> Option<Value> {
    match node {
        ValueNode::Absent => None,
        ValueNode::Scalar(value) => Some(value),
        ValueNode::Sequence(items) => Some(Value::Array(
            items
                .into_iter()
                .map(|item| transform_params(item).unwrap_or(Value::Null))
                .collect(),
        )),
        ValueNode::TemplateInstance { template, fields } => Some(Value::Object(single_entry(
            template,
            Value::Object(transform_fields(fields)),
        ))),
        ValueNode::PlainRecord { fields } => Some(Value::Object(transform_fields(fields))),
    }
}

/// Classify and rewrite an untyped value in one step.
pub fn transform_value(value: &Value) -> Result<Option<Value>, ShapeError> {
    Ok(transform_params(classify(value)?))
}

fn transform_fields(fields: Vec<(String, ValueNode)>) -> Map<String, Value> {
    fields
        .into_iter()
        .filter_map(|(key, node)| transform_params(node).map(|value| (key, value)))
        .collect()
}

fn single_entry(key: String, value: Value) -> Map<String, Value> {
    let mut map = Map::with_capacity(1);
    map.insert(key, value);
    map
}

fn reserved_name(value: Option<&Value>, key: &'static str) -> Result<String, PayloadError> {
    match value {
        Some(Value::String(name)) if !name.is_empty() => Ok(name.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => Err(PayloadError::MissingKey { key }),
        Some(other) => Err(PayloadError::InvalidKey {
            key,
            found: node::kind(other),
        }),
    }
}
