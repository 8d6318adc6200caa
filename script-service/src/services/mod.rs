pub mod database;
pub mod generation;
pub mod memory;
pub mod providers;
pub mod store;
pub mod token;

pub use database::MongoScriptStore;
pub use generation::GenerationClient;
pub use memory::InMemoryScriptStore;
pub use store::{DeleteOutcome, InsertOutcome, ScriptStore, UpdateOutcome};
pub use token::{TokenClaims, TokenService};
