pub mod scripts;
pub mod token;

pub use scripts::{CreateScriptRequest, CreateScriptResponse, EditScriptParams, ScriptResponse};
pub use token::TokenResponse;
