//! rostergrid
//!
//! Virtualized data-table engine with a terminal front end.
//!
//! Pure Core / Impure Shell: `model`, `state` and `view_state` hold the table
//! semantics and never touch a terminal or the filesystem; `source`, `config`,
//! `logging` and `view` are the shell around them.

pub mod config;
pub mod logging;
pub mod model;
pub mod source;
pub mod state;
pub mod view;
pub mod view_state;

// Re-export main loop integration
pub mod integration;

#[cfg(test)]
mod test_harness;
