// lib.rs
pub mod args;
pub mod cleaner;
pub mod columnar;
pub mod commands;
pub mod config;
pub mod progress;
pub mod records;
pub mod sampler;
pub mod split;
pub mod template;
pub mod utils;
