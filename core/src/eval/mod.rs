pub mod config;
pub mod registry;
pub mod runner;
