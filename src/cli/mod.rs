//! Terminal rendering and command handlers

pub mod calculator;
pub mod compare;
pub mod dashboard;
pub mod grid;
pub mod setup;
pub mod show;
pub mod ui;
