pub mod config;
pub mod dashboard;
pub mod data;
pub mod stats;

/// Application name for XDG paths and the window title.
pub const APP_NAME: &str = "tune-stats";
