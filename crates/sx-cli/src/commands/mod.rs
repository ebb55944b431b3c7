//! Command implementations

pub mod config;
pub mod run;

pub use config::{config_init, config_path, config_show, load_client_config};
pub use run::{read_script, run_command, RunOptions, RunStatus};
