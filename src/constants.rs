// src/constants.rs

/// The name of the application directory under the system config dir.
pub const APP_DIR: &str = "setupkit";

/// The name of the settings file (inside the app config dir).
pub const SETTINGS_FILENAME: &str = "config.toml";

/// The name of the task document (inside the data dir).
pub const TASKS_FILENAME: &str = "tasks.json";

/// The name of the profile document (inside the data dir).
pub const PROFILES_FILENAME: &str = "profiles.json";

/// The name of the language document (inside the data dir).
pub const LANGUAGE_FILENAME: &str = "lang.json";

/// The language every lookup eventually falls back to.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Environment variable that overrides the configured language.
pub const LANG_ENV_VAR: &str = "SETUPKIT_LANG";

/// Suffix of the complete (full task objects) export file.
pub const FULL_EXPORT_SUFFIX: &str = "-full";

/// Language document bundled into the binary, used to seed a fresh install.
pub const BUNDLED_LANGUAGE_DOCUMENT: &str = include_str!("../locales/lang.json");
