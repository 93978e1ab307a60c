pub mod builder;
pub mod config;
pub mod delivery;
pub mod engine;
pub mod redistribution;
