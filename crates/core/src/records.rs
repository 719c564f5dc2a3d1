//! Auxiliary records owned by other features and read by the aggregator.
//!
//! These lists are written by code outside the engine, so every field is
//! optional and a field of an unexpected type reads as absent instead of
//! rejecting the record. Missing numbers read as zero.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One quiz attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Correct answers
    #[serde(default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    /// Questions asked
    #[serde(default, deserialize_with = "lenient_number")]
    pub total: Option<f64>,
}

/// A written note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    /// Domain the note belongs to, as stored
    #[serde(default)]
    pub domain: Option<Value>,
    /// Length of the note
    #[serde(default, deserialize_with = "lenient_number")]
    pub word_count: Option<f64>,
}

/// A tracked learning resource (book, course, video...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Related domains, as stored
    #[serde(default)]
    pub domains: Option<Value>,
    /// Difficulty rating
    #[serde(default, deserialize_with = "lenient_number")]
    pub difficulty: Option<f64>,
    /// Progress percentage (0-100)
    #[serde(default, deserialize_with = "lenient_number")]
    pub progress: Option<f64>,
}

/// A tracked hands-on project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Related domains, as stored
    #[serde(default)]
    pub domains: Option<Value>,
    /// Difficulty rating
    #[serde(default, deserialize_with = "lenient_number")]
    pub difficulty: Option<f64>,
    /// Progress percentage (0-100)
    #[serde(default, deserialize_with = "lenient_number")]
    pub progress: Option<f64>,
}

// Any JSON value is accepted; only numbers survive.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}
