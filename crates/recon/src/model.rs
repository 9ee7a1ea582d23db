use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ReconError;
use crate::mapping::Mapping;
use crate::summary::LevelSummary;
use crate::validate::LevelDiagnostics;

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

/// A unit code as found in feature properties: either text or a JSON number.
///
/// Text and numbers never compare equal: `Text("11")` and `Number(11)` are
/// different codes. Integral floats are read as integers, so `5.0` and `5`
/// are the same code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Text(String),
    Number(serde_json::Number),
}

impl Code {
    /// Convert a property value. `None` for null and for non-scalar values.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Number(integral(n).unwrap_or_else(|| n.clone()))),
            _ => None,
        }
    }
}

/// `5.0` as `5`. `None` for integers already and for non-integral floats.
fn integral(n: &serde_json::Number) -> Option<serde_json::Number> {
    if !n.is_f64() {
        return None;
    }
    let f = n.as_f64()?;
    if f.fract() != 0.0 || !f.is_finite() {
        return None;
    }
    if f >= 0.0 && f < u64::MAX as f64 {
        Some(serde_json::Number::from(f as u64))
    } else if f < 0.0 && f >= i64::MIN as f64 {
        Some(serde_json::Number::from(f as i64))
    } else {
        None
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Code {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for Code {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

/// Names of the feature-property fields holding a unit's code, name and parent code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pointer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<String>,
}

// ---------------------------------------------------------------------------
// GeoJSON
// ---------------------------------------------------------------------------

/// A GeoJSON feature. Geometry is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl Feature {
    /// A geometry-less feature with the given properties.
    pub fn with_properties(properties: Map<String, Value>) -> Self {
        Self {
            kind: feature_type(),
            properties,
            geometry: Value::Null,
            id: None,
        }
    }
}

/// An ordered GeoJSON feature collection. A feature's position is its index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: collection_type(),
            crs: None,
            features,
        }
    }

    /// Parse a collection from GeoJSON text. `source` is only used in errors.
    pub fn from_json_str(source: &str, text: &str) -> Result<Self, ReconError> {
        serde_json::from_str(text).map_err(|e| ReconError::GeoJsonParse {
            source: source.to_string(),
            message: e.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn feature_type() -> String {
    "Feature".into()
}

fn collection_type() -> String {
    "FeatureCollection".into()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Admin levels + sets
// ---------------------------------------------------------------------------

/// One tier of the hierarchy. Level 0 is the root; level N's parent is N-1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLevel {
    pub key: String,
    pub name: String,
    pub level: u32,
}

/// Binds one admin level of one dataset version to its features and pointer.
#[derive(Debug, Clone)]
pub struct Settings {
    pub admin_level: String,
    pub collection: FeatureCollection,
    pub pointer: Pointer,
}

/// One full version of the boundary hierarchy, e.g. "Old Colombia".
#[derive(Debug, Clone)]
pub struct AdminSet {
    pub title: String,
    pub settings: Vec<Settings>,
}

impl AdminSet {
    pub fn settings_for(&self, level_key: &str) -> Option<&Settings> {
        self.settings.iter().find(|s| s.admin_level == level_key)
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// The fate of one unit at one admin level.
///
/// `from` indexes the old collection, `to` the new one. At least one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLink")]
pub struct Link {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<usize>,
}

#[derive(Deserialize)]
struct RawLink {
    #[serde(default)]
    from: Option<usize>,
    #[serde(default)]
    to: Option<usize>,
}

impl TryFrom<RawLink> for Link {
    type Error = String;

    fn try_from(raw: RawLink) -> Result<Self, Self::Error> {
        if raw.from.is_none() && raw.to.is_none() {
            return Err("link must have 'from', 'to', or both".into());
        }
        Ok(Self {
            from: raw.from,
            to: raw.to,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Linked,
    Added,
    Removed,
}

impl Link {
    pub fn linked(from: usize, to: usize) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// A unit only present in the new collection.
    pub fn added(to: usize) -> Self {
        Self { from: None, to: Some(to) }
    }

    /// A unit only present in the old collection.
    pub fn removed(from: usize) -> Self {
        Self { from: Some(from), to: None }
    }

    pub fn from_index(&self) -> Option<usize> {
        self.from
    }

    pub fn to_index(&self) -> Option<usize> {
        self.to
    }

    pub fn kind(&self) -> LinkKind {
        match (self.from, self.to) {
            (Some(_), Some(_)) => LinkKind::Linked,
            (None, _) => LinkKind::Added,
            (_, None) => LinkKind::Removed,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.kind() == LinkKind::Linked
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A data-quality finding. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub title: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Diagnostic {
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            severity: Severity::Error,
            description: Some(description.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Run input / output
// ---------------------------------------------------------------------------

/// Everything one reconciliation run needs, already loaded.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub project_name: String,
    pub levels: Vec<AdminLevel>,
    pub from: AdminSet,
    pub to: AdminSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub project_name: String,
    pub engine_version: String,
}

/// Validator findings for both sets, keyed by admin level.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SetDiagnostics {
    pub from: LevelDiagnostics,
    pub to: LevelDiagnostics,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub mapping: Mapping,
    pub summary: BTreeMap<String, LevelSummary>,
    pub diagnostics: SetDiagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn code_equality_is_exact() {
        assert_ne!(Code::from("11"), Code::from(11));
        assert_eq!(Code::from_value(&json!("A1")), Some(Code::from("A1")));
        assert_eq!(Code::from_value(&json!(7)), Some(Code::from(7)));
        assert_eq!(Code::from_value(&json!(null)), None);
        assert_eq!(Code::from_value(&json!(true)), None);
    }

    #[test]
    fn parse_collection_with_null_properties() {
        let text = r#"{
            "type": "FeatureCollection",
            "crs": { "type": "name", "properties": { "name": "EPSG:4326" } },
            "features": [
                { "type": "Feature", "properties": null, "geometry": null },
                { "type": "Feature", "id": 4, "properties": { "NAME": "Cali" },
                  "geometry": { "type": "Point", "coordinates": [-76.5, 3.4] } }
            ]
        }"#;
        let fc = FeatureCollection::from_json_str("admin1.geojson", text).unwrap();
        assert_eq!(fc.len(), 2);
        assert!(fc.crs.is_some());
        assert!(fc.features[0].properties.is_empty());
        assert_eq!(fc.features[1].properties["NAME"], json!("Cali"));
        assert_eq!(fc.features[1].id, Some(json!(4)));
    }

    #[test]
    fn parse_collection_error_names_source() {
        let err = FeatureCollection::from_json_str("broken.geojson", "{ not json").unwrap_err();
        assert!(err.to_string().contains("broken.geojson"));
    }

    #[test]
    fn link_serializes_only_present_sides() {
        assert_eq!(serde_json::to_string(&Link::added(3)).unwrap(), r#"{"to":3}"#);
        assert_eq!(serde_json::to_string(&Link::removed(1)).unwrap(), r#"{"from":1}"#);
        assert_eq!(
            serde_json::to_string(&Link::linked(0, 2)).unwrap(),
            r#"{"from":0,"to":2}"#
        );
    }

    #[test]
    fn empty_link_is_rejected() {
        assert!(serde_json::from_str::<Link>("{}").is_err());
        let link: Link = serde_json::from_str(r#"{"to":5}"#).unwrap();
        assert_eq!(link.kind(), LinkKind::Added);
    }

    #[test]
    fn integral_floats_read_as_integers() {
        assert_eq!(Code::from_value(&json!(5.0)), Some(Code::from(5)));
        assert_eq!(Code::from_value(&json!(-12.0)), Some(Code::from(-12)));
        assert_eq!(Code::from_value(&json!(5.0)).unwrap().to_string(), "5");
        assert_ne!(Code::from_value(&json!(5.5)), Some(Code::from(5)));
        assert_ne!(Code::from_value(&json!(5.0)), Some(Code::Text("5".into())));
    }
}
