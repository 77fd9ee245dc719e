//! Penguin morphology dashboard: a cached filter-and-aggregate pipeline
//! over the Palmer penguins table, plus the egui front end that renders it.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;
