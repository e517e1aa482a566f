// src/exec/mod.rs

//! Running the user's reload command.
//!
//! The command runs synchronously on the dispatch context, so two reloads
//! never overlap and a slow command simply delays the next delivery.

pub mod command;

pub use command::{CHANGED_PATH_ENV, run_reload_command, shell_command};
