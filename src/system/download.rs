//! # Downloads
//!
//! Network transfers are delegated to `curl` (or `wget` when curl is missing).
//! A cheap TCP probe runs first so an offline machine fails fast with
//! [`DownloadError::NetworkUnavailable`] instead of a transfer timeout.

use crate::models::Platform;
use crate::system::executor::{self, ExecutionError};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Network is unavailable (could not reach {probe}).")]
    NetworkUnavailable { probe: String },
    #[error("Neither curl nor wget is installed.")]
    NoDownloader,
    #[error("Download of '{url}' failed.")]
    TransferFailed { url: String },
    #[error("Don't know how to install '{file}' on {platform}.")]
    UnsupportedPackage { file: String, platform: Platform },
    #[error("Installer for '{file}' exited with an error.")]
    InstallFailed { file: String },
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetches files and runs downloaded installers.
pub trait Downloader {
    /// Downloads `url` to `dest`.
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;

    /// Downloads `url` to a scratch directory and runs the matching installer.
    fn download_and_install(&self, url: &str, platform: Platform) -> Result<(), DownloadError>;
}

#[derive(Debug, Clone)]
pub struct SystemDownloader {
    probe: String,
    timeout: Duration,
}

impl SystemDownloader {
    pub fn new(probe: impl Into<String>) -> Self {
        Self {
            probe: probe.into(),
            timeout: Duration::from_secs(3),
        }
    }

    /// Fails with `NetworkUnavailable` if the probe address cannot be reached.
    pub fn check_connectivity(&self) -> Result<(), DownloadError> {
        let unavailable = || DownloadError::NetworkUnavailable {
            probe: self.probe.clone(),
        };
        let addrs = self.probe.to_socket_addrs().map_err(|_| unavailable())?;
        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return Ok(());
            }
        }
        Err(unavailable())
    }
}

impl Downloader for SystemDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        self.check_connectivity()?;
        let dest_str = dest.to_string_lossy();
        let status = if executor::is_executable_in_path("curl") {
            executor::execute_program("curl", &["-fsSL", "-o", &dest_str, url])?
        } else if executor::is_executable_in_path("wget") {
            executor::execute_program("wget", &["-q", "-O", &dest_str, url])?
        } else {
            return Err(DownloadError::NoDownloader);
        };
        if !status.success {
            return Err(DownloadError::TransferFailed {
                url: url.to_string(),
            });
        }
        log::info!("Downloaded '{}' to '{}'", url, dest.display());
        Ok(())
    }

    fn download_and_install(&self, url: &str, platform: Platform) -> Result<(), DownloadError> {
        let scratch = tempfile::tempdir()?;
        let file_path: PathBuf = scratch.path().join(file_name_from_url(url));
        let command = install_command(&file_path, platform)?;
        self.fetch(url, &file_path)?;

        println!("→ {}", command);
        let status = executor::execute_command(&command)?;
        if !status.success {
            return Err(DownloadError::InstallFailed {
                file: file_path.display().to_string(),
            });
        }
        Ok(())
    }
}

/// The last path segment of `url`, without query or fragment.
pub fn file_name_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .unwrap_or("download")
        .to_string()
}

/// Chooses the installer invocation for a downloaded file by its extension.
pub fn install_command(file: &Path, platform: Platform) -> Result<String, DownloadError> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let unsupported = || DownloadError::UnsupportedPackage {
        file: name.clone(),
        platform,
    };

    if platform == Platform::Windows {
        let quoted = format!("\"{}\"", file.display());
        return if name.ends_with(".msi") {
            Ok(format!("msiexec /i {} /qn", quoted))
        } else if name.ends_with(".exe") {
            Ok(quoted)
        } else {
            Err(unsupported())
        };
    }

    let path_str = file.to_string_lossy();
    let quoted = shlex::try_quote(&path_str).map_err(|_| unsupported())?;
    match platform {
        Platform::Linux if name.ends_with(".deb") => Ok(format!("sudo apt install -y {}", quoted)),
        Platform::Linux if name.ends_with(".rpm") => Ok(format!("sudo dnf install -y {}", quoted)),
        Platform::Linux if name.contains(".pkg.tar.") => {
            Ok(format!("sudo pacman -U --noconfirm {}", quoted))
        }
        Platform::Linux if name.ends_with(".appimage") => Ok(format!(
            "chmod +x {q} && mkdir -p \"$HOME/.local/bin\" && cp {q} \"$HOME/.local/bin/\"",
            q = quoted
        )),
        Platform::Macos if name.ends_with(".pkg") => {
            Ok(format!("sudo installer -pkg {} -target /", quoted))
        }
        _ if name.ends_with(".sh") => Ok(format!("sh {}", quoted)),
        _ => Err(unsupported()),
    }
}
