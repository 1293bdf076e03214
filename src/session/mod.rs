//! Explicit application state shared by the CLI and HTTP front ends.

pub mod slot;
pub mod state;
