//! Reusable rendering pieces for the panel screen.

pub mod breaker_cell;
pub mod status;
