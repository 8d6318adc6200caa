use crate::models::ScriptDocument;
use crate::services::InsertOutcome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateScriptRequest {
    pub title: String,
    pub genre: String,
    pub synopsis: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CreateScriptResponse {
    pub result: InsertOutcome,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditScriptParams {
    /// Create the record when the id does not exist yet.
    #[serde(default)]
    pub upsert: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResponse {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: String,
    pub genre: String,
    pub synopsis: String,
    pub email: String,
    pub generated_script: String,
    pub created_at: Option<String>,
}

impl From<ScriptDocument> for ScriptResponse {
    fn from(doc: ScriptDocument) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()),
            title: doc.title,
            genre: doc.genre,
            synopsis: doc.synopsis,
            email: doc.email,
            generated_script: doc.generated_script,
            created_at: doc.created_at.map(|ts| ts.to_chrono().to_rfc3339()),
        }
    }
}
