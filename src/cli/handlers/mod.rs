// src/cli/handlers/mod.rs

// One module per command, plus the interactive menus and shared helpers.

pub mod commons;
pub mod export;
pub mod import;
pub mod lang;
pub mod list;
pub mod menu;
pub mod profile;
pub mod profiles_menu;
pub mod run;
pub mod tasks_menu;
