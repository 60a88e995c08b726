//! metadata::de
//!
//! Flexible deserialization helpers for metadata scalars.
//!
//! # Why
//!
//! Metadata files in the wild are loose about scalar types: a YAML file may
//! give `CurrentVersionCode: 42` (integer), `versionName: 1.0` (float),
//! `Categories: Development` (bare string where a list is expected), or a
//! JSON file may carry `Description` as an array of lines. These helpers
//! coerce such values into the field's declared type instead of rejecting
//! the file outright.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use super::fields::decode_bool;

/// Any scalar value found in a metadata file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Bool(true) => "true".to_string(),
            Scalar::Bool(false) => "false".to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s,
        }
    }
}

/// A scalar or a sequence of scalars.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScalarOrSeq {
    Scalar(Scalar),
    Seq(Vec<Scalar>),
}

/// Deserialize a string field, stringifying numeric and boolean scalars.
/// A null value becomes the empty string.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_string)
        .unwrap_or_default())
}

/// Deserialize an optional string field, stringifying scalars.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

/// Deserialize a list field from either a bare scalar (one-element list)
/// or a sequence. A null value becomes the empty list.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ScalarOrSeq>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ScalarOrSeq::Scalar(s)) => vec![s.into_string()],
        Some(ScalarOrSeq::Seq(items)) => items.into_iter().map(Scalar::into_string).collect(),
    })
}

/// Deserialize the Categories field. An explicit null keeps the
/// uncategorized marker.
pub fn categories<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ScalarOrSeq>::deserialize(deserializer)? {
        None => vec!["None".to_string()],
        Some(ScalarOrSeq::Scalar(s)) => vec![s.into_string()],
        Some(ScalarOrSeq::Seq(items)) => items.into_iter().map(Scalar::into_string).collect(),
    })
}

/// Deserialize a list-typed build flag. Booleans map to the presence
/// marker: `true` becomes `["yes"]`, `false` the empty list.
pub fn flag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ScalarOrSeq>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ScalarOrSeq::Scalar(Scalar::Bool(true))) => vec!["yes".to_string()],
        Some(ScalarOrSeq::Scalar(Scalar::Bool(false))) => Vec::new(),
        Some(ScalarOrSeq::Scalar(s)) => vec![s.into_string()],
        Some(ScalarOrSeq::Seq(items)) => items.into_iter().map(Scalar::into_string).collect(),
    })
}

/// Deserialize a boolean from a real boolean or a yes/no/true/false string.
pub fn bool_flexible<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Scalar::Bool(b)) => Ok(b),
        Some(Scalar::Str(s)) => {
            decode_bool(&s).ok_or_else(|| D::Error::custom(format!("invalid bool '{}'", s)))
        }
        Some(other) => Err(D::Error::custom(format!(
            "invalid bool '{}'",
            other.into_string()
        ))),
    }
}

/// Deserialize a multiline field from a single string or a sequence of
/// lines (joined with newlines).
pub fn multiline<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ScalarOrSeq>::deserialize(deserializer)? {
        None => String::new(),
        Some(ScalarOrSeq::Scalar(s)) => s.into_string(),
        Some(ScalarOrSeq::Seq(lines)) => lines
            .into_iter()
            .map(Scalar::into_string)
            .collect::<Vec<_>>()
            .join("\n"),
    })
}
