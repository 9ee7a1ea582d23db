use serde::Serialize;
use serde_json::Value;

use crate::model::{Code, Feature, Pointer, Settings};

/// The identifying attributes of one unit, read through a [`Pointer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Position of the feature in its collection.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<Code>,
}

/// Extract code, name and parent code from one feature.
///
/// `index` is carried through untouched; use [`extract_properties`] to get
/// positional indices for a whole collection.
pub fn extract_property(pointer: &Pointer, feature: &Feature, index: usize) -> Property {
    Property {
        index,
        code: lookup(feature, pointer.code.as_deref(), index).and_then(Code::from_value),
        name: lookup(feature, pointer.name.as_deref(), index).and_then(name_from_value),
        parent_code: lookup(feature, pointer.parent_code.as_deref(), index)
            .and_then(Code::from_value),
    }
}

/// Extract properties for every feature of a settings' collection, in order.
pub fn extract_properties(settings: &Settings) -> Vec<Property> {
    settings
        .collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| extract_property(&settings.pointer, feature, index))
        .collect()
}

fn lookup<'a>(feature: &'a Feature, field: Option<&str>, index: usize) -> Option<&'a Value> {
    let field = field?;
    let value = feature.properties.get(field)?;
    match value {
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            log::warn!("feature {index}: field '{field}' holds a non-scalar value, ignoring it");
            None
        }
        _ => Some(value),
    }
}

fn name_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
