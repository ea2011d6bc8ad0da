use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, SystemTime};

use thiserror::Error;

use super::loader;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Where the dataset comes from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// A file bundled next to the application.
    Local(PathBuf),
    /// A remote file fetched once into `cache_path`.
    Remote { url: String, cache_path: PathBuf },
}

impl DataSource {
    /// Path the dataset is read from once acquired.
    pub fn local_path(&self) -> &Path {
        match self {
            DataSource::Local(path) => path,
            DataSource::Remote { cache_path, .. } => cache_path,
        }
    }
}

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("download of {url} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {content_type} instead of the data file")]
    UnexpectedContent { url: String, content_type: String },
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0:#}")]
    Load(anyhow::Error),
}

// ---------------------------------------------------------------------------
// Remote download
// ---------------------------------------------------------------------------

/// Rewrite a Google Drive share link into its direct-download form.
/// Links that are not recognised are returned unchanged.
pub fn drive_download_url(link: &str) -> String {
    if !link.contains("drive.google.com") {
        return link.to_string();
    }
    let id = link
        .split_once("/file/d/")
        .and_then(|(_, rest)| rest.split(['/', '?']).next())
        .or_else(|| {
            let (_, query) = link.split_once('?')?;
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("id="))
        })
        .filter(|id| !id.is_empty());

    match id {
        Some(id) => format!("https://drive.google.com/uc?export=download&id={id}"),
        None => link.to_string(),
    }
}

/// Generous limit for a whole survey file over a slow link.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Download `url` into `dest` unless `dest` already exists.
///
/// The body is streamed to a sibling `.part` file and renamed into place, so
/// an interrupted transfer never leaves a truncated dataset at `dest`.
pub fn ensure_downloaded(url: &str, dest: &Path) -> Result<(), AcquireError> {
    if dest.exists() {
        log::debug!("{} already present, skipping download", dest.display());
        return Ok(());
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|source| AcquireError::Download {
            url: url.to_string(),
            source,
        })?;
    download_with(&client, url, dest)
}

fn download_with(
    client: &reqwest::blocking::Client,
    url: &str,
    dest: &Path,
) -> Result<(), AcquireError> {
    let direct = drive_download_url(url);
    log::info!("Downloading dataset from {direct} to {}", dest.display());

    let download_err = |source: reqwest::Error| AcquireError::Download {
        url: direct.clone(),
        source,
    };
    let mut response = client
        .get(&direct)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if content_type.starts_with("text/html") {
        return Err(AcquireError::UnexpectedContent {
            url: direct.clone(),
            content_type,
        });
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let part = dest.with_extension("part");
    match stream_into_place(&mut response, &part, dest) {
        Ok(n) => {
            log::info!("Downloaded {n} bytes");
            Ok(())
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&part) {
                log::debug!("Could not remove {}: {rm}", part.display());
            }
            Err(e)
        }
    }
}

fn stream_into_place(
    response: &mut reqwest::blocking::Response,
    part: &Path,
    dest: &Path,
) -> Result<u64, AcquireError> {
    let mut file = fs::File::create(part).map_err(io_err(part))?;
    let n = response
        .copy_to(&mut file)
        .map_err(|source| AcquireError::Download {
            url: response.url().to_string(),
            source,
        })?;
    file.sync_all().map_err(io_err(part))?;
    fs::rename(part, dest).map_err(io_err(dest))?;
    Ok(n)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> AcquireError {
    let path = path.to_path_buf();
    move |source| AcquireError::Io { path, source }
}

/// Make the source available locally and read it.
pub fn acquire(source: &DataSource) -> Result<Dataset, AcquireError> {
    if let DataSource::Remote { url, cache_path } = source {
        ensure_downloaded(url, cache_path)?;
    }
    loader::load_file(source.local_path()).map_err(AcquireError::Load)
}

// ---------------------------------------------------------------------------
// Process-wide dataset cache
// ---------------------------------------------------------------------------

struct CacheEntry {
    path: PathBuf,
    modified: Option<SystemTime>,
    dataset: Arc<Dataset>,
}

/// Holds the loaded dataset between interactions.
///
/// The entry is filled on first use and reused until the backing file
/// disappears or its modification time changes, a different source is
/// requested, or [`DatasetCache::invalidate`] is called.
#[derive(Default)]
pub struct DatasetCache {
    entry: Mutex<Option<CacheEntry>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The instance shared by the whole process.
    pub fn global() -> &'static DatasetCache {
        static GLOBAL: OnceLock<DatasetCache> = OnceLock::new();
        GLOBAL.get_or_init(DatasetCache::new)
    }

    pub fn get_or_load(&self, source: &DataSource) -> Result<Arc<Dataset>, AcquireError> {
        let mut entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        let path = source.local_path();

        if let Some(cached) = entry.as_ref() {
            if cached.path == path && cached.modified.is_some() && modified_time(path) == cached.modified {
                return Ok(Arc::clone(&cached.dataset));
            }
            log::info!("Cached dataset for {} is stale, reloading", cached.path.display());
        }
        // a failed reload must not leave the stale entry behind
        *entry = None;

        let dataset = Arc::new(acquire(source)?);
        *entry = Some(CacheEntry {
            path: path.to_path_buf(),
            modified: modified_time(path),
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    /// Drop the cached dataset; the next call reloads it.
    pub fn invalidate(&self) {
        let mut entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        *entry = None;
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
