pub mod app;
pub mod catalog;
pub mod config;
pub mod draft_file;
pub mod logging;
pub mod preview;
