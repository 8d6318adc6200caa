pub mod health;
pub mod scripts;
pub mod token;

pub use health::{health_check, liveness, readiness_check};
pub use scripts::{
    create_script, delete_script, edit_script, get_script, list_scripts, list_scripts_by_email,
};
pub use token::issue_token;
