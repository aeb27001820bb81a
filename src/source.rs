//! Video acquisition: turn an identifier (local path or URL) into a local
//! video file, downloading at most once.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot derive a file name from `{0}`")]
    BadIdentifier(String),
}

/// Resolves a video identifier to a local file path. Idempotent: an
/// already-resolved local path is returned unchanged, and an already
/// downloaded file is reused.
pub trait VideoSource {
    fn resolve(&self, identifier: &str) -> Result<PathBuf, SourceError>;
}

/// Downloads videos over HTTP into a target directory, keyed by the
/// sanitized file name so reruns skip the network entirely.
pub struct HttpVideoSource {
    client: Client,
    target_dir: PathBuf,
}

impl HttpVideoSource {
    pub fn new(target_dir: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36")
            .build()?;
        Ok(Self {
            client,
            target_dir: target_dir.into(),
        })
    }

    fn download(&self, url: &str, path: &Path) -> Result<(), SourceError> {
        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        fs::write(path, &bytes)?;
        Ok(())
    }
}

impl VideoSource for HttpVideoSource {
    fn resolve(&self, identifier: &str) -> Result<PathBuf, SourceError> {
        let local = Path::new(identifier);
        if local.is_file() {
            return Ok(local.to_path_buf());
        }

        let name = file_name_for(identifier)
            .ok_or_else(|| SourceError::BadIdentifier(identifier.to_string()))?;
        fs::create_dir_all(&self.target_dir)?;
        let path = self.target_dir.join(format!("{name}.mp4"));

        if path.is_file() {
            info!("found existing file {}, skipping download", path.display());
            return Ok(path);
        }

        info!("downloading {identifier}");
        self.download(identifier, &path)?;
        info!("finished downloading to {}", path.display());
        Ok(path)
    }
}

/// Derive a sanitized file name from a URL's last path segment.
fn file_name_for(url: &str) -> Option<String> {
    let tail = url
        .split(['?', '#'])
        .next()?
        .trim_end_matches('/')
        .rsplit('/')
        .next()?;
    let stem = tail.rsplit_once('.').map_or(tail, |(stem, _)| stem);
    let name = sanitize_title(stem);
    (!name.is_empty()).then_some(name)
}

static NOISE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d+#]+").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

/// Strip the boilerplate lesson channels put into video titles, along
/// with digits and tuning markers, then collapse the leftover whitespace.
pub fn sanitize_title(name: &str) -> String {
    let name = name.replace("TAB", "").replace("- Fingerstyle Lesson", "");
    let name = NOISE_CHARS.replace_all(name.trim(), "");
    MULTI_SPACE.replace_all(&name, " ").trim().to_string()
}
