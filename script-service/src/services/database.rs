//! MongoDB-backed script store.

use crate::models::{ScriptDocument, ScriptEdit};
use crate::services::store::{DeleteOutcome, InsertOutcome, ScriptStore, UpdateOutcome};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{IndexOptions, UpdateOptions},
    results::UpdateResult,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoScriptStore {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoScriptStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, collection = %collection, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        Ok(Self {
            client,
            db,
            collection: collection.to_string(),
        })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for script-service");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_lookup".to_string())
                    .build(),
            )
            .build();

        self.scripts()
            .create_index(email_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create email index on scripts collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!(collection = %self.collection, "Created index on email");

        Ok(())
    }

    pub fn scripts(&self) -> Collection<ScriptDocument> {
        self.db.collection(&self.collection)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    async fn find_many(&self, filter: Document) -> Result<Vec<ScriptDocument>, AppError> {
        let cursor = self.scripts().find(filter, None).await.map_err(|e| {
            tracing::error!("Failed to query scripts: {}", e);
            AppError::from(e)
        })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect scripts: {}", e);
            AppError::from(e)
        })
    }

    async fn set_fields(
        &self,
        id: &ObjectId,
        edit: &ScriptEdit,
        upsert: bool,
    ) -> Result<UpdateOutcome, AppError> {
        let options = UpdateOptions::builder().upsert(upsert).build();

        let result = self
            .scripts()
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "title": &edit.title,
                        "generatedScript": &edit.generated_script,
                    }
                },
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!(script_id = %id, "Failed to update script: {}", e);
                AppError::from(e)
            })?;

        Ok(update_outcome(result))
    }
}

fn update_outcome(result: UpdateResult) -> UpdateOutcome {
    let upserted_id = result.upserted_id.and_then(|id| id.as_object_id());
    UpdateOutcome {
        acknowledged: true,
        matched_count: result.matched_count,
        modified_count: result.modified_count,
        upserted_count: u64::from(upserted_id.is_some()),
        upserted_id,
    }
}

#[async_trait]
impl ScriptStore for MongoScriptStore {
    async fn insert(&self, script: &ScriptDocument) -> Result<InsertOutcome, AppError> {
        let result = self.scripts().insert_one(script, None).await.map_err(|e| {
            tracing::error!("Failed to insert script: {}", e);
            AppError::from(e)
        })?;

        let inserted_id = result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Inserted id is not an ObjectId: {}",
                result.inserted_id
            ))
        })?;

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn list_all(&self) -> Result<Vec<ScriptDocument>, AppError> {
        self.find_many(doc! {}).await
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<ScriptDocument>, AppError> {
        self.find_many(doc! { "email": email }).await
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ScriptDocument>, AppError> {
        self.scripts()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(script_id = %id, "Failed to find script: {}", e);
                AppError::from(e)
            })
    }

    async fn update_by_id(
        &self,
        id: &ObjectId,
        edit: &ScriptEdit,
    ) -> Result<UpdateOutcome, AppError> {
        self.set_fields(id, edit, false).await
    }

    async fn upsert_by_id(
        &self,
        id: &ObjectId,
        edit: &ScriptEdit,
    ) -> Result<UpdateOutcome, AppError> {
        self.set_fields(id, edit, true).await
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<DeleteOutcome, AppError> {
        let result = self
            .scripts()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(script_id = %id, "Failed to delete script: {}", e);
                AppError::from(e)
            })?;

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
