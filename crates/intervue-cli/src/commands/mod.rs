pub mod config;
pub mod interview;
pub mod questions;
pub mod stats;
