//! Storage abstraction for generated scripts.
//!
//! Handlers only see [`ScriptStore`], so the MongoDB backend can be swapped
//! for the in-memory one in tests.

use crate::models::{ScriptDocument, ScriptEdit};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Serializer};
use service_core::error::AppError;

/// Result of inserting a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    #[serde(serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string")]
    pub inserted_id: ObjectId,
}

/// Result of an update or explicit upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    #[serde(serialize_with = "serialize_optional_object_id")]
    pub upserted_id: Option<ObjectId>,
}

/// Result of a delete. Deleting an absent id is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

fn serialize_optional_object_id<S>(id: &Option<ObjectId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id {
        Some(id) => serializer.serialize_some(&id.to_hex()),
        None => serializer.serialize_none(),
    }
}

#[async_trait]
pub trait ScriptStore: Send + Sync {
    /// Append a new script. The store assigns the id.
    async fn insert(&self, script: &ScriptDocument) -> Result<InsertOutcome, AppError>;

    /// Every stored script, unfiltered.
    async fn list_all(&self) -> Result<Vec<ScriptDocument>, AppError>;

    /// Scripts whose `email` equals `email` exactly.
    async fn list_by_email(&self, email: &str) -> Result<Vec<ScriptDocument>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ScriptDocument>, AppError>;

    /// Replace `title` and `generatedScript` on an existing record. Never
    /// creates one.
    async fn update_by_id(&self, id: &ObjectId, edit: &ScriptEdit)
        -> Result<UpdateOutcome, AppError>;

    /// Like [`ScriptStore::update_by_id`], but a missing id creates a record
    /// holding only the two edited fields.
    async fn upsert_by_id(&self, id: &ObjectId, edit: &ScriptEdit)
        -> Result<UpdateOutcome, AppError>;

    async fn delete_by_id(&self, id: &ObjectId) -> Result<DeleteOutcome, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_serialize_like_driver_results() {
        let id = ObjectId::new();
        let insert = serde_json::to_value(InsertOutcome {
            acknowledged: true,
            inserted_id: id,
        })
        .unwrap();
        assert_eq!(insert["insertedId"], id.to_hex());

        let update = serde_json::to_value(UpdateOutcome {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        })
        .unwrap();
        assert!(update["upsertedId"].is_null());
        assert_eq!(update["matchedCount"], 0);

        let delete = serde_json::to_value(DeleteOutcome {
            acknowledged: true,
            deleted_count: 0,
        })
        .unwrap();
        assert_eq!(delete["deletedCount"], 0);
    }
}
