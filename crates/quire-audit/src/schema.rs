//! Content schema: collections, their fields and templates.
//!
//! Only the parts the audit passes read are modelled; anything else in a
//! schema document is ignored on load.

use crate::AuditError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// A content schema: the collections a site declares.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl Schema {
    pub fn from_json_str(source: &str) -> Result<Self, AuditError> {
        serde_json::from_str(source).map_err(AuditError::Schema)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| AuditError::SchemaIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

/// A named group of documents sharing a storage format and field schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Content directory, relative to the site root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Declared file format, e.g. `md` or `json`.
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub fields: CollectionFields,
    /// Present when documents pick one of several templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<Template>>,
}

fn default_format() -> String {
    "md".to_string()
}

impl Collection {
    pub fn new(name: &str, format: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            path: None,
            format: format.to_string(),
            fields: CollectionFields::default(),
            templates: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = CollectionFields::Fields(fields);
        self
    }

    pub fn with_templates(mut self, templates: Vec<Template>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn uses_templates(&self) -> bool {
        self.templates.is_some()
    }

    /// Defaults for the top level of a document payload: every non-list
    /// field that declares `ui.defaultValue`.
    ///
    /// Returns `None` when the field list is a reference to an external
    /// template set, since its fields are not known here.
    pub fn top_level_defaults(&self) -> Option<Map<String, Value>> {
        let CollectionFields::Fields(fields) = &self.fields else {
            return None;
        };
        Some(
            fields
                .iter()
                .filter(|field| !field.list)
                .filter_map(|field| {
                    let default = field.ui.as_ref()?.default_value.as_ref()?;
                    Some((field.name.clone(), default.clone()))
                })
                .collect(),
        )
    }
}

/// A collection's fields: either declared inline or a reference to a
/// template set defined elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionFields {
    Fields(Vec<Field>),
    Reference(String),
}

impl Default for CollectionFields {
    fn default() -> Self {
        CollectionFields::Fields(Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub list: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<FieldUi>,
}

impl Field {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: None,
            list: false,
            ui: None,
        }
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.ui = Some(FieldUi {
            default_value: Some(value),
        });
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Template {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            fields: Vec::new(),
        }
    }
}
