// src/system/package_manager.rs

use crate::models::Platform;
use crate::system::executor;
use std::fmt;
use std::str::FromStr;

/// Native package managers the fallback installer can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Pacman,
    Zypper,
    Winget,
    Brew,
}

impl PackageManager {
    /// Detection order per platform; the first binary found on `PATH` wins.
    pub fn candidates(platform: Platform) -> &'static [Self] {
        match platform {
            Platform::Linux => &[Self::Apt, Self::Dnf, Self::Pacman, Self::Zypper, Self::Brew],
            Platform::Windows => &[Self::Winget],
            Platform::Macos => &[Self::Brew],
        }
    }

    /// Finds the first available package manager for `platform`.
    pub fn detect(platform: Platform) -> Option<Self> {
        let found = Self::candidates(platform)
            .iter()
            .copied()
            .find(|pm| executor::is_executable_in_path(pm.binary()));
        match found {
            Some(pm) => log::debug!("Detected package manager: {}", pm),
            None => log::warn!("No supported package manager found for {}", platform),
        }
        found
    }

    pub fn binary(self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
            Self::Winget => "winget",
            Self::Brew => "brew",
        }
    }

    /// The shell command that installs `package`.
    ///
    /// Package identifiers are quoted for POSIX shells; identifiers that cannot
    /// be quoted safely (e.g. containing NUL) yield `None`.
    pub fn install_command(self, package: &str) -> Option<String> {
        let package = package.trim();
        if package.is_empty() {
            return None;
        }
        let quoted = match self {
            // winget runs under cmd.exe, which does not understand POSIX quoting.
            Self::Winget => {
                if package.chars().any(|c| c.is_whitespace() || "&|<>^\"%".contains(c)) {
                    return None;
                }
                package.to_string()
            }
            _ => shlex::try_quote(package).ok()?.into_owned(),
        };
        Some(match self {
            Self::Apt => format!("sudo apt install -y {}", quoted),
            Self::Dnf => format!("sudo dnf install -y {}", quoted),
            Self::Pacman => format!("sudo pacman -S --noconfirm {}", quoted),
            Self::Zypper => format!("sudo zypper install -y {}", quoted),
            Self::Winget => format!(
                "winget install --accept-package-agreements --accept-source-agreements {}",
                quoted
            ),
            Self::Brew => format!("brew install {}", quoted),
        })
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "apt" | "apt-get" => Ok(Self::Apt),
            "dnf" | "yum" => Ok(Self::Dnf),
            "pacman" => Ok(Self::Pacman),
            "zypper" => Ok(Self::Zypper),
            "winget" => Ok(Self::Winget),
            "brew" | "homebrew" => Ok(Self::Brew),
            other => Err(format!("Unknown package manager '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_commands_per_manager() {
        assert_eq!(
            PackageManager::Apt.install_command("vim").as_deref(),
            Some("sudo apt install -y vim")
        );
        assert_eq!(
            PackageManager::Pacman.install_command("git").as_deref(),
            Some("sudo pacman -S --noconfirm git")
        );
        assert_eq!(
            PackageManager::Brew.install_command("htop").as_deref(),
            Some("brew install htop")
        );
    }

    #[test]
    fn test_package_names_are_quoted_for_posix_shells() {
        let cmd = PackageManager::Apt.install_command("foo; rm -rf /").unwrap();
        let words = shlex::split(&cmd).unwrap();
        assert_eq!(words.len(), 5);
        assert_eq!(words.last().map(String::as_str), Some("foo; rm -rf /"));
    }

    #[test]
    fn test_winget_rejects_shell_metacharacters() {
        assert!(PackageManager::Winget.install_command("Git.Git").is_some());
        assert!(PackageManager::Winget.install_command("a & b").is_none());
        assert!(PackageManager::Apt.install_command("   ").is_none());
    }

    #[test]
    fn test_parse_manager_names() {
        assert_eq!("apt-get".parse::<PackageManager>().unwrap(), PackageManager::Apt);
        assert_eq!("Homebrew".parse::<PackageManager>().unwrap(), PackageManager::Brew);
        assert!("portage".parse::<PackageManager>().is_err());
    }
}
