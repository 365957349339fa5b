//! Terminal viewer for a finished audit report.

pub mod app;
pub mod controller;
pub mod ui;
