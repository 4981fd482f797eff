//! # System Interaction Layer
//!
//! The boundary between the application and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: Runs literal command lines through the platform shell with
//!   the terminal's stdio inherited, and finds executables on `PATH`.
//! - **`package_manager`**: Detects the native package manager and builds its
//!   install command for a package identifier.
//! - **`download`**: Fetches files with `curl`/`wget` after a connectivity
//!   probe and runs downloaded installers by file type.

pub mod download;
pub mod executor;
pub mod package_manager;
