pub mod batch;
pub mod classify;
pub mod completions;
pub mod config;
pub mod extract;
