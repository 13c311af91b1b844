//! Model source resolution
//!
//! A model reference is either a filesystem path or an HTTP(S) URL,
//! decided once up front. URLs download into `<home>/models/cache/`;
//! a file already in the cache is reused without re-downloading, keyed
//! by filename only. Bare names resolve under `<home>/models/`.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;
use crate::error::{LearnError, Result};
use crate::paths;

/// Where a model comes from. Dispatch happens once, here, instead of
/// being re-derived at every call site.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    Local(PathBuf),
    Url(String),
}

impl ModelSource {
    /// Classify a user-supplied model reference.
    pub fn parse(reference: &str) -> Result<Self> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(LearnError::InvalidArgument(
                "model reference must be a non-empty string".to_string(),
            ));
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(Self::Url(trimmed.to_string()))
        } else {
            Ok(Self::Local(PathBuf::from(trimmed)))
        }
    }

    /// Resolve to a local file, downloading and caching URL sources.
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            Self::Local(path) => {
                let resolved = if path.is_absolute() {
                    path.clone()
                } else {
                    paths::model_path(&path.to_string_lossy())?
                };
                if !resolved.exists() {
                    return Err(LearnError::missing(resolved));
                }
                Ok(resolved)
            }
            Self::Url(url) => {
                let cached = paths::model_cache_path(&filename_from_url(url))?;
                if cached.exists() {
                    // Filename-keyed cache: once downloaded, reused as-is.
                    log::info!("Using cached model {}", cached.display());
                    return Ok(cached);
                }
                download_to(url, &cached)?;
                Ok(cached)
            }
        }
    }
}

/// Destination filename for a URL: the last path segment when it looks
/// like a filename, a generic default otherwise.
pub(crate) fn filename_from_url(raw: &str) -> String {
    let parsed = match url::Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(_) => return constants::DEFAULT_MODEL_FILENAME.to_string(),
    };

    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        .filter(|name| name.contains('.'))
        .unwrap_or_else(|| constants::DEFAULT_MODEL_FILENAME.to_string())
}

/// Blocking download with the configured timeout. The payload lands in a
/// `.part` file first so a failed transfer never poisons the cache.
fn download_to(url: &str, dest: &Path) -> Result<()> {
    log::info!("Downloading model from {url}");

    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(constants::http_timeout_secs()))
        .build();

    let response = agent.get(url).call().map_err(|e| LearnError::Download {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let partial = dest.with_file_name(format!(
        "{}.part",
        dest.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| constants::DEFAULT_MODEL_FILENAME.to_string())
    ));

    let mut file = File::create(&partial)?;
    io::copy(&mut response.into_reader(), &mut file)?;
    fs::rename(&partial, dest)?;

    log::info!("Model cached at {}", dest.display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classifies_urls_and_paths() {
        assert_eq!(
            ModelSource::parse("https://example.org/m/net.onnx").unwrap(),
            ModelSource::Url("https://example.org/m/net.onnx".to_string())
        );
        assert_eq!(
            ModelSource::parse("my_model.onnx").unwrap(),
            ModelSource::Local(PathBuf::from("my_model.onnx"))
        );
        assert!(ModelSource::parse("   ").is_err());
    }

    #[test]
    fn test_filename_from_url_takes_last_segment() {
        assert_eq!(
            filename_from_url("https://example.org/models/v1/net.onnx"),
            "net.onnx"
        );
        assert_eq!(
            filename_from_url("https://example.org/models/net.onnx?raw=true"),
            "net.onnx"
        );
    }

    #[test]
    fn test_filename_from_url_falls_back_to_default() {
        assert_eq!(
            filename_from_url("https://example.org/"),
            constants::DEFAULT_MODEL_FILENAME
        );
        // Last segment without an extension does not look like a filename.
        assert_eq!(
            filename_from_url("https://example.org/models/latest"),
            constants::DEFAULT_MODEL_FILENAME
        );
        assert_eq!(
            filename_from_url("not a url"),
            constants::DEFAULT_MODEL_FILENAME
        );
    }

    #[test]
    fn test_missing_local_model_reports_path() {
        let source = ModelSource::Local(PathBuf::from("/definitely/not/here.onnx"));
        let err = source.resolve().unwrap_err();
        assert!(matches!(err, LearnError::MissingResource { .. }));
    }

    #[test]
    fn test_cached_model_skips_the_network_entirely() {
        crate::testutil::with_temp_home(|home| {
            let cache_dir = home.join("models").join("cache");
            fs::create_dir_all(&cache_dir).unwrap();
            fs::write(cache_dir.join("net.onnx"), b"cached-bytes").unwrap();

            // The host is unreachable, so resolving can only succeed by
            // hitting the cache instead of downloading a second time.
            let source = ModelSource::Url("http://127.0.0.1:9/models/net.onnx".to_string());
            let resolved = source.resolve().unwrap();

            assert_eq!(resolved, cache_dir.join("net.onnx"));
            assert_eq!(fs::read(&resolved).unwrap(), b"cached-bytes");
        });
    }

    #[test]
    fn test_failed_download_does_not_poison_the_cache() {
        crate::testutil::with_temp_home(|home| {
            let source = ModelSource::Url("http://127.0.0.1:9/models/net.onnx".to_string());
            let err = source.resolve().unwrap_err();
            assert!(matches!(err, LearnError::Download { .. }));

            let cache_dir = home.join("models").join("cache");
            assert!(!cache_dir.join("net.onnx").exists());
        });
    }
}
