//! CLI command implementations.

mod config;
mod doctor;
mod generate;
mod init;
mod personas;
mod synthesize;

pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::{run_generate, GenerateOptions};
pub use init::{provision_directories, run_init, Provisioned};
pub use personas::run_personas;
pub use synthesize::run_synthesize;
