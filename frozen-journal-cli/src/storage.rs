use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// A source of frozen bucket directories to decode.
pub trait BucketSource {
    /// Lists the bucket directories visible through this source, each expected to
    /// contain a `rawdata/journal` or `rawdata/journal.zst`.
    fn buckets(&self) -> Result<Vec<PathBuf>>;
}

/// Finds bucket directories under a local filesystem root: either the root itself,
/// if it already looks like a bucket, or any matching subdirectory beneath it.
pub struct LocalBucketSource {
    root: PathBuf,
}

impl LocalBucketSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BucketSource for LocalBucketSource {
    fn buckets(&self) -> Result<Vec<PathBuf>> {
        if is_bucket_dir(&self.root) {
            return Ok(vec![self.root.clone()]);
        }

        let mut found: Vec<PathBuf> = walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir() && is_bucket_dir(entry.path()))
            .map(|entry| entry.path().to_path_buf())
            .collect();
        found.sort();
        Ok(found)
    }
}

fn is_bucket_dir(dir: &Path) -> bool {
    let rawdata = dir.join("rawdata");
    rawdata.join("journal").is_file() || rawdata.join("journal.zst").is_file()
}

/// A `gs://bucket/prefix` reference to frozen buckets archived in cloud object
/// storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcsPath {
    pub bucket: String,
    pub prefix: String,
}

/// Parses a `gs://bucket/prefix` URI.
pub fn parse_gcs_path(uri: &str) -> Result<GcsPath> {
    let rest = uri
        .strip_prefix("gs://")
        .context("GCS bucket paths must start with gs://")?;
    let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
        bail!("GCS path {uri} is missing a bucket name");
    }
    Ok(GcsPath {
        bucket: bucket.to_owned(),
        prefix: prefix.to_owned(),
    })
}

/// Lists and downloads frozen buckets from Google Cloud Storage.
///
/// Listing and download themselves are out of scope: wiring the trait up to a real
/// client library is left to whatever deployment needs it. This exists so callers
/// can address a `gs://` path uniformly with [`BucketSource`] and get a clear error
/// instead of silently falling through to local filesystem lookup.
pub struct GcsBucketSource {
    path: GcsPath,
}

impl GcsBucketSource {
    pub fn new(path: GcsPath) -> Self {
        Self { path }
    }
}

impl BucketSource for GcsBucketSource {
    fn buckets(&self) -> Result<Vec<PathBuf>> {
        bail!(
            "GCS retrieval for gs://{}/{} is not implemented; download the bucket locally and pass its path instead",
            self.path.bucket,
            self.path.prefix
        )
    }
}
