//! Location of the bundled ffmpeg binary.
//!
//! The binary ships next to the application under
//! `external/<arch>/`, where `<arch>` is `x64` on a 64-bit operating
//! system and `x86` otherwise.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ConverterError;

/// Directory, relative to the install directory, holding per-arch tools.
pub const EXTERNAL_DIR: &str = "external";

/// File name of the ffmpeg binary on this platform.
#[cfg(target_os = "windows")]
pub const FFMPEG_BINARY: &str = "ffmpeg.exe";
#[cfg(not(target_os = "windows"))]
pub const FFMPEG_BINARY: &str = "ffmpeg";

/// Architecture directory for the operating system.
///
/// A 32-bit process on 64-bit Windows runs under WOW64, which sets
/// `PROCESSOR_ARCHITEW6432`; such a process still gets `x64`.
pub fn arch_dir() -> &'static str {
    arch_dir_for(cfg!(target_pointer_width = "64"), running_under_wow64())
}

fn arch_dir_for(pointer_width_64: bool, wow64: bool) -> &'static str {
    if pointer_width_64 || wow64 {
        "x64"
    } else {
        "x86"
    }
}

#[cfg(target_os = "windows")]
fn running_under_wow64() -> bool {
    std::env::var_os("PROCESSOR_ARCHITEW6432").is_some()
}

#[cfg(not(target_os = "windows"))]
fn running_under_wow64() -> bool {
    false
}

/// Resolves and verifies the path of the ffmpeg binary.
pub struct Locator;

impl Locator {
    /// Locates the binary relative to the running executable's directory.
    pub fn locate() -> Result<PathBuf, ConverterError> {
        Self::locate_in(&install_dir()?)
    }

    /// Locates the binary under `install_dir/external/<arch>/`.
    pub fn locate_in(install_dir: &Path) -> Result<PathBuf, ConverterError> {
        let path = Self::expected_path(install_dir);
        Self::verify(path)
    }

    /// Verifies an explicitly configured binary path.
    pub fn with_binary(path: impl Into<PathBuf>) -> Result<PathBuf, ConverterError> {
        Self::verify(path.into())
    }

    /// Path the binary is expected at, without checking it exists.
    pub fn expected_path(install_dir: &Path) -> PathBuf {
        install_dir
            .join(EXTERNAL_DIR)
            .join(arch_dir())
            .join(FFMPEG_BINARY)
    }

    fn verify(path: PathBuf) -> Result<PathBuf, ConverterError> {
        let path = if path.is_relative() {
            std::env::current_dir()?.join(path)
        } else {
            path
        };
        if !path.is_file() {
            return Err(ConverterError::ToolNotFound { path });
        }
        debug!("Using ffmpeg at {:?}", path);
        Ok(path)
    }
}

/// Directory containing the running executable.
pub fn install_dir() -> Result<PathBuf, ConverterError> {
    let exe = std::env::current_exe().map_err(|e| ConverterError::InstallDirUnavailable {
        reason: e.to_string(),
    })?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| ConverterError::InstallDirUnavailable {
            reason: format!("{} has no parent directory", exe.display()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expected_path_layout() {
        let path = Locator::expected_path(Path::new("/opt/app"));
        let expected = Path::new("/opt/app")
            .join("external")
            .join(arch_dir())
            .join(FFMPEG_BINARY);
        assert_eq!(path, expected);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_arch_on_64_bit_build() {
        assert_eq!(arch_dir(), "x64");
    }

    #[test]
    fn test_arch_dir_for_os_width() {
        assert_eq!(arch_dir_for(true, false), "x64");
        // 32-bit process on a 64-bit OS
        assert_eq!(arch_dir_for(false, true), "x64");
        assert_eq!(arch_dir_for(false, false), "x86");
    }

    #[test]
    fn test_locate_in_finds_binary() {
        let dir = TempDir::new().unwrap();
        let bin_dir = dir.path().join(EXTERNAL_DIR).join(arch_dir());
        fs::create_dir_all(&bin_dir).unwrap();
        fs::write(bin_dir.join(FFMPEG_BINARY), b"").unwrap();

        let path = Locator::locate_in(dir.path()).unwrap();
        assert_eq!(path, bin_dir.join(FFMPEG_BINARY));
    }

    #[test]
    fn test_locate_in_missing_binary() {
        let dir = TempDir::new().unwrap();
        let err = Locator::locate_in(dir.path()).unwrap_err();
        match err {
            ConverterError::ToolNotFound { path } => {
                assert_eq!(path, Locator::expected_path(dir.path()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_not_a_binary() {
        let dir = TempDir::new().unwrap();
        let fake = Locator::expected_path(dir.path());
        fs::create_dir_all(&fake).unwrap();
        assert!(Locator::locate_in(dir.path()).is_err());
    }

    #[test]
    fn test_with_binary() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("my-ffmpeg");
        assert!(matches!(
            Locator::with_binary(&bin),
            Err(ConverterError::ToolNotFound { .. })
        ));
        fs::write(&bin, b"").unwrap();
        assert_eq!(Locator::with_binary(&bin).unwrap(), bin);
    }

    #[test]
    fn test_install_dir_exists() {
        let dir = install_dir().unwrap();
        assert!(dir.is_dir());
    }
}
