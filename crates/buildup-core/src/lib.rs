pub mod api;
pub mod config;
pub mod decision;
pub mod download;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod probe;
pub mod template;
