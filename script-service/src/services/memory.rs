use crate::models::{ScriptDocument, ScriptEdit};
use crate::services::store::{DeleteOutcome, InsertOutcome, ScriptStore, UpdateOutcome};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Process-local [`ScriptStore`] with the same matching rules as the MongoDB
/// backend. Used by tests and local runs without a database.
#[derive(Default)]
pub struct InMemoryScriptStore {
    scripts: Mutex<Vec<ScriptDocument>>,
    queries: AtomicUsize,
}

impl InMemoryScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Snapshot of everything stored.
    pub fn snapshot(&self) -> Vec<ScriptDocument> {
        self.scripts
            .lock()
            .map(|scripts| scripts.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ScriptDocument>>, AppError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.scripts.lock().map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("In-memory store mutex poisoned: {}", e))
        })
    }

    fn set_fields(
        &self,
        id: &ObjectId,
        edit: &ScriptEdit,
        upsert: bool,
    ) -> Result<UpdateOutcome, AppError> {
        let mut scripts = self.lock()?;

        if let Some(script) = scripts.iter_mut().find(|s| s.id.as_ref() == Some(id)) {
            let modified =
                script.title != edit.title || script.generated_script != edit.generated_script;
            script.title = edit.title.clone();
            script.generated_script = edit.generated_script.clone();
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_count: 0,
                upserted_id: None,
            });
        }

        scripts.push(ScriptDocument {
            id: Some(*id),
            title: edit.title.clone(),
            generated_script: edit.generated_script.clone(),
            genre: String::new(),
            synopsis: String::new(),
            email: String::new(),
            created_at: None,
        });

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(*id),
        })
    }
}

#[async_trait]
impl ScriptStore for InMemoryScriptStore {
    async fn insert(&self, script: &ScriptDocument) -> Result<InsertOutcome, AppError> {
        let inserted_id = script.id.unwrap_or_else(ObjectId::new);
        let mut stored = script.clone();
        stored.id = Some(inserted_id);
        self.lock()?.push(stored);

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn list_all(&self) -> Result<Vec<ScriptDocument>, AppError> {
        Ok(self.lock()?.clone())
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<ScriptDocument>, AppError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|s| s.email == email)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ScriptDocument>, AppError> {
        Ok(self
            .lock()?
            .iter()
            .find(|s| s.id.as_ref() == Some(id))
            .cloned())
    }

    async fn update_by_id(
        &self,
        id: &ObjectId,
        edit: &ScriptEdit,
    ) -> Result<UpdateOutcome, AppError> {
        self.set_fields(id, edit, false)
    }

    async fn upsert_by_id(
        &self,
        id: &ObjectId,
        edit: &ScriptEdit,
    ) -> Result<UpdateOutcome, AppError> {
        self.set_fields(id, edit, true)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<DeleteOutcome, AppError> {
        let mut scripts = self.lock()?;
        let before = scripts.len();
        if let Some(pos) = scripts.iter().position(|s| s.id.as_ref() == Some(id)) {
            scripts.remove(pos);
        }

        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: (before - scripts.len()) as u64,
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
