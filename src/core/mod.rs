// src/core/mod.rs

pub mod bootstrap;
pub mod document;
pub mod exchange;
pub mod paths;
pub mod profile_store;
pub mod settings;
pub mod store;
pub mod strings;
pub mod task_runner;
pub mod task_store;
