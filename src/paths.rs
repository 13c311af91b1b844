//! User data directory resolution
//!
//! Every file this crate reads or writes by name lives in a conventional
//! subdirectory of the user's home folder: `sensor_data/` for logs,
//! `webcam_images/` for captures, `models/` and `models/cache/` for
//! classifier files. One parameterized resolver covers all of them.
//!
//! Home lookup order (same on every platform, so Windows and POSIX
//! environments behave identically): `HOME`, `HOMEDRIVE`+`HOMEPATH`,
//! `USERPROFILE`, the platform lookup, and finally the current working
//! directory. Unset variables never raise.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LearnError, Result};

/// Subdirectory holding sensor log files.
pub const SENSOR_DATA_DIR: &str = "sensor_data";
/// Subdirectory holding captured webcam frames.
pub const WEBCAM_IMAGE_DIR: &str = "webcam_images";
/// Subdirectory holding local classifier model files.
pub const MODEL_DIR: &str = "models";
/// Subdirectory holding models downloaded from URLs.
pub const MODEL_CACHE_DIR: &str = "models/cache";

/// Resolve the user's home directory, falling back to the current
/// working directory when nothing else is available.
pub fn home_dir() -> PathBuf {
    resolve_home(|key| env::var(key).ok(), dirs::home_dir())
}

fn resolve_home(get: impl Fn(&str) -> Option<String>, platform: Option<PathBuf>) -> PathBuf {
    if let Some(home) = get("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }
    if let (Some(drive), Some(path)) = (get("HOMEDRIVE"), get("HOMEPATH")) {
        if !drive.is_empty() {
            return PathBuf::from(format!("{drive}{path}"));
        }
    }
    if let Some(profile) = get("USERPROFILE").filter(|v| !v.is_empty()) {
        return PathBuf::from(profile);
    }
    if let Some(dir) = platform {
        return dir;
    }
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Compose `<home>/<subdir>/<filename>[.<extension>]`, creating missing
/// directories. Absolute filenames bypass the convention and are returned
/// as-is, which is how fully qualified model paths are supported.
pub fn user_data_path(subdir: &str, filename: &str, extension: Option<&str>) -> Result<PathBuf> {
    data_path_under(&home_dir(), subdir, filename, extension)
}

fn data_path_under(
    base: &Path,
    subdir: &str,
    filename: &str,
    extension: Option<&str>,
) -> Result<PathBuf> {
    if filename.trim().is_empty() {
        return Err(LearnError::InvalidArgument(
            "filename must be a non-empty string".to_string(),
        ));
    }

    let mut name = filename.to_string();
    if let Some(ext) = extension {
        if Path::new(&name).extension().is_none() {
            name.push('.');
            name.push_str(ext);
        }
    }

    let candidate = PathBuf::from(&name);
    if candidate.is_absolute() {
        return Ok(candidate);
    }

    let dir = base.join(subdir);
    fs::create_dir_all(&dir)?;
    Ok(dir.join(name))
}

/// `<home>/sensor_data/<name>.csv`
pub fn sensor_data_path(filename: &str) -> Result<PathBuf> {
    user_data_path(SENSOR_DATA_DIR, filename, Some("csv"))
}

/// `<home>/webcam_images/<name>`
pub fn webcam_image_path(filename: &str) -> Result<PathBuf> {
    user_data_path(WEBCAM_IMAGE_DIR, filename, None)
}

/// `<home>/models/<name>`
pub fn model_path(filename: &str) -> Result<PathBuf> {
    user_data_path(MODEL_DIR, filename, None)
}

/// `<home>/models/cache/<name>`
pub fn model_cache_path(filename: &str) -> Result<PathBuf> {
    user_data_path(MODEL_CACHE_DIR, filename, None)
}
