pub mod engine;
pub mod totals;
