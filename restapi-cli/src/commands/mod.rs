// restapi-cli/src/commands/mod.rs
pub mod config;
pub mod object;
pub mod request;
pub mod setup;

pub use config::{handle_config_command, ConfigCommands};
pub use object::{handle_object_command, ObjectCommands};
pub use request::handle_request;
pub use setup::run_setup;
