use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolve a recognizer model by file name, downloading it on first use.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled directory, e.g. a model shipped next to the binary
/// 3. Download from `url` into the cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    resolve_in(&model_cache_dir()?, name, url, bundled_dir, progress)
}

/// Same as [`resolve`] with an explicit cache directory.
pub fn resolve_in(
    cache_dir: &Path,
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        log::debug!("Using cached model {}", cached_path.display());
        return Ok(cached_path);
    }

    if let Some(bundled_path) = bundled_dir.map(|dir| dir.join(name)) {
        if bundled_path.exists() {
            log::debug!("Using bundled model {}", bundled_path.display());
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {name} from {url}");
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Pronunciation Checker/models/`
/// - Linux: `$XDG_CACHE_HOME/Pronunciation Checker/models/` or `~/.cache/...`
/// - Windows: `%LOCALAPPDATA%/Pronunciation Checker/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join("Pronunciation Checker").join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let download_error = |source| ModelResolveError::Download {
        url: url.to_string(),
        source,
    };
    let write_error = |path: &Path, source| ModelResolveError::Write {
        path: path.to_path_buf(),
        source,
    };

    let response = reqwest::blocking::get(url).map_err(download_error)?;
    if !response.status().is_success() {
        return Err(ModelResolveError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(download_error)?;

    // Written under a temporary name so an interrupted download is never
    // mistaken for a cached model.
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(|e| write_error(&temp_path, e))?;

    let mut downloaded: u64 = 0;
    for chunk in bytes.chunks(1024 * 1024) {
        file.write_all(chunk)
            .map_err(|e| write_error(&temp_path, e))?;
        downloaded += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(|e| write_error(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| write_error(dest, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UNREACHABLE_URL: &str = "http://invalid.invalid/model.bin";

    #[test]
    fn test_resolve_in_prefers_cached_file() {
        let tmp = TempDir::new().unwrap();
        let cached = tmp.path().join("ggml-test.bin");
        fs::write(&cached, b"cached model").unwrap();

        let bundled_dir = tmp.path().join("bundled");
        fs::create_dir_all(&bundled_dir).unwrap();
        fs::write(bundled_dir.join("ggml-test.bin"), b"bundled model").unwrap();

        let resolved =
            resolve_in(tmp.path(), "ggml-test.bin", UNREACHABLE_URL, Some(&bundled_dir), None)
                .unwrap();
        assert_eq!(resolved, cached);
    }

    #[test]
    fn test_resolve_in_falls_back_to_bundled_file() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let bundled_dir = tmp.path().join("bundled");
        fs::create_dir_all(&bundled_dir).unwrap();
        let bundled = bundled_dir.join("ggml-test.bin");
        fs::write(&bundled, b"bundled model").unwrap();

        let resolved =
            resolve_in(&cache_dir, "ggml-test.bin", UNREACHABLE_URL, Some(&bundled_dir), None)
                .unwrap();
        assert_eq!(resolved, bundled);
        assert!(!cache_dir.exists(), "cache dir should not be created");
    }

    #[test]
    fn test_resolve_in_download_failure_leaves_no_model() {
        let tmp = TempDir::new().unwrap();
        let result = resolve_in(tmp.path(), "ggml-test.bin", UNREACHABLE_URL, None, None);
        assert!(matches!(result, Err(ModelResolveError::Download { .. })));
        assert!(!tmp.path().join("ggml-test.bin").exists());
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains("Pronunciation Checker"));
        assert!(path.ends_with("models"));
    }
}
