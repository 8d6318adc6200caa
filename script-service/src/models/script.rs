//! Generated-script document as stored in MongoDB.

use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// One generated script.
///
/// Everything except `_id`, `title` and `generatedScript` defaults when
/// missing, because explicit upserts create records carrying only those
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub genre: String,

    #[serde(default)]
    pub synopsis: String,

    /// Owner key used to filter listings.
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub generated_script: String,

    /// Set once on insert and never rewritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
}

impl ScriptDocument {
    /// Create a new, not yet persisted, document stamped with the current time.
    pub fn new(
        title: String,
        genre: String,
        synopsis: String,
        email: String,
        generated_script: String,
    ) -> Self {
        Self {
            id: None,
            title,
            genre,
            synopsis,
            email,
            generated_script,
            created_at: Some(BsonDateTime::now()),
        }
    }
}

/// The two fields an edit may replace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScriptEdit {
    pub title: String,
    pub generated_script: String,
}
