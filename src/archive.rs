use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info, warn};

use crate::dataset::DatasetKind;
use crate::error::{ArchiveError, Error, Result};
use crate::progress;

const CHUNK_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// ArchiveProvider
// ---------------------------------------------------------------------------

/// Resolves a dataset to a local directory laid out as `<case>/<subcase>/...`.
pub trait ArchiveProvider {
    fn resolve(&self, kind: DatasetKind) -> Result<PathBuf>;
}

/// Downloads dataset archives over HTTP and caches them under `data_dir`:
///
/// ```text
/// <data_dir>/<extract_folder>/<base_folder>
/// ```
///
/// An already extracted dataset is reused without touching the network.
/// Archives are unpacked into `<data_dir>/.<id>.partial` and only the
/// dataset's base folder is moved into place, so a run killed halfway
/// never leaves something that looks like a cached dataset.
#[derive(Debug, Clone)]
pub struct HttpArchiveProvider {
    data_dir: PathBuf,
    cancel: Arc<AtomicBool>,
}

impl Default for HttpArchiveProvider {
    /// `<cwd>/data`
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(cwd.join("data"))
    }
}

impl HttpArchiveProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Shared with every clone of this provider. Setting it makes an
    /// in-flight download or extraction stop with
    /// [`ArchiveError::Interrupted`] after cleaning up.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn extract_dir(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(kind.config().extract_folder)
    }

    /// Where the dataset root lives once extracted.
    pub fn target_path(&self, kind: DatasetKind) -> PathBuf {
        self.extract_dir(kind).join(kind.config().base_folder)
    }

    fn archive_path(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(format!("{}.zip", kind.id()))
    }

    fn staging_dir(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(format!(".{}.partial", kind.id()))
    }

    /// Fetch the archive with `fetch`, extract it and drop the archive.
    /// Any failure triggers a best-effort cleanup before the error is returned.
    fn install<F>(&self, kind: DatasetKind, fetch: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let result = (|| -> Result<PathBuf> {
            let io_err = |source: io::Error| ArchiveError::Io {
                id: kind.id().to_string(),
                source,
            };
            fs::create_dir_all(&self.data_dir).map_err(io_err)?;
            // Left behind by a killed run.
            let staging = self.staging_dir(kind);
            if staging.exists() {
                fs::remove_dir_all(&staging).map_err(io_err)?;
            }
            let archive = self.archive_path(kind);
            fetch(&archive)?;
            self.unpack(kind, &archive)
        })();

        result.map_err(|e| {
            error!("Error when downloading or extracting {kind} data: {e}");
            self.cleanup(kind);
            e
        })
    }

    fn unpack(&self, kind: DatasetKind, archive: &Path) -> Result<PathBuf> {
        let staging = self.staging_dir(kind);
        extract_zip(archive, &staging, kind.id(), &self.cancel)?;
        info!("Extraction complete.");

        fs::remove_file(archive)?;

        let target = self.target_path(kind);
        let extracted = staging.join(kind.config().base_folder);
        if !extracted.is_dir() {
            return Err(Error::MissingBaseFolder(target));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&extracted, &target)?;

        if let Err(e) = fs::remove_dir_all(&staging) {
            warn!("could not remove {}: {e}", staging.display());
        }
        Ok(target)
    }

    /// Remove this dataset's partial archive and staging folder. Folders on
    /// the way from the target up to `data_dir` go only when empty, so a
    /// sibling dataset extracted into the same folder is never touched.
    fn cleanup(&self, kind: DatasetKind) {
        info!("Cleaning up...");
        let archive = self.archive_path(kind);
        if archive.exists() {
            if let Err(e) = fs::remove_file(&archive) {
                warn!("could not remove {}: {e}", archive.display());
            }
        }
        let staging = self.staging_dir(kind);
        if staging.exists() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                warn!("could not remove {}: {e}", staging.display());
            }
        }

        let target = self.target_path(kind);
        for dir in target.ancestors().skip(1) {
            if !dir.starts_with(&self.data_dir) {
                break;
            }
            match fs::remove_dir(dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(_) => break,
            }
        }
        info!("Cleanup complete.");
    }
}

impl ArchiveProvider for HttpArchiveProvider {
    fn resolve(&self, kind: DatasetKind) -> Result<PathBuf> {
        let target = self.target_path(kind);
        if target.exists() {
            info!("Data already exists at {}.", target.display());
            return Ok(target);
        }

        let config = kind.config();
        info!(
            "Downloading {} dataset to {} ...",
            config.id,
            self.data_dir.display()
        );
        self.install(kind, |dest| {
            download(config.url, dest, config.id, &self.cancel)
        })
    }
}

// ---------------------------------------------------------------------------
// Download / extraction helpers
// ---------------------------------------------------------------------------

fn interrupted(id: &str) -> Error {
    ArchiveError::Interrupted(id.to_string()).into()
}

fn download(url: &str, dest: &Path, id: &str, cancel: &AtomicBool) -> Result<()> {
    let response = ureq::get(url).call().map_err(|e| match e {
        ureq::Error::Status(status, _) => ArchiveError::Http {
            url: url.to_string(),
            status,
        },
        other => ArchiveError::Network {
            url: url.to_string(),
            reason: other.to_string(),
        },
    })?;

    let total = response
        .header("Content-Length")
        .and_then(|v| v.parse::<u64>().ok());
    let pb = progress::download_bar(total, format!("Downloading {id}"));

    let io_err = |source: io::Error| -> Error {
        ArchiveError::Io {
            id: id.to_string(),
            source,
        }
        .into()
    };

    let mut reader = pb.wrap_read(response.into_reader());
    let mut writer = BufWriter::new(File::create(dest).map_err(io_err)?);
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        if cancel.load(Ordering::Relaxed) {
            pb.abandon();
            return Err(interrupted(id));
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_err(e)),
        };
        writer.write_all(&buf[..n]).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;
    pb.finish_and_clear();
    Ok(())
}

/// Unpack every entry of `archive` under `dest`, checking `cancel` between
/// entries. Entries escaping `dest` are skipped.
fn extract_zip(archive: &Path, dest: &Path, id: &str, cancel: &AtomicBool) -> Result<()> {
    let extraction = |reason: String| -> Error {
        ArchiveError::Extraction {
            path: archive.to_path_buf(),
            reason,
        }
        .into()
    };
    let file = File::open(archive).map_err(|e| extraction(e.to_string()))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| extraction(e.to_string()))?;

    for i in 0..zip.len() {
        if cancel.load(Ordering::Relaxed) {
            return Err(interrupted(id));
        }
        let mut entry = zip.by_index(i).map_err(|e| extraction(e.to_string()))?;
        let Some(out) = entry.enclosed_name().map(|name| dest.join(name)) else {
            warn!("skipping archive entry outside the extraction folder: {}", entry.name());
            continue;
        };
        let failed = |e: io::Error| extraction(format!("{}: {e}", out.display()));

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(failed)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(failed)?;
        }
        let mut file = File::create(&out).map_err(failed)?;
        io::copy(&mut entry, &mut file).map_err(failed)?;
    }
    Ok(())
}
