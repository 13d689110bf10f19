//! Zip archive mounting and repacking

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::{Result, VfsError};

const ARCHIVE_EXTENSIONS: [&str; 4] = ["ear", "war", "jar", "rar"];
const MANIFEST_DIR: &str = "META-INF";
const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

type Fingerprint = Vec<(PathBuf, u64, Option<SystemTime>)>;

/// True when the file name carries one of the enterprise archive extensions
pub fn is_archive_name(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ARCHIVE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

struct Mount {
    archive: PathBuf,
    staged: PathBuf,
    fingerprint: Fingerprint,
}

/// Mount table for one layout run
pub struct ArchiveVfs {
    staging: TempDir,
    mounts: Vec<Mount>,
}

impl ArchiveVfs {
    pub fn new() -> Result<Self> {
        let staging = tempfile::Builder::new()
            .prefix("skinny-ear-")
            .tempdir()
            .map_err(VfsError::io(&std::env::temp_dir()))?;
        debug!("Archive staging area: {}", staging.path().display());
        Ok(Self {
            staging,
            mounts: Vec::new(),
        })
    }

    /// Returns a directory view of `path`, extracting it first when it is a packed archive
    pub fn resolve(&mut self, path: &Path) -> Result<PathBuf> {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
        if let Some(mount) = self.mounts.iter().find(|mount| mount.archive == path) {
            return Ok(mount.staged.clone());
        }
        if !path.is_file() || !is_archive_name(path) {
            return Err(VfsError::NotAnArchive {
                path: path.display().to_string(),
            });
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| VfsError::Path(format!("Invalid archive name: {}", path.display())))?
            .to_string_lossy();
        let staged = self
            .staging
            .path()
            .join(format!("{}-{}", self.mounts.len(), file_name));

        extract(path, &staged)?;
        let fingerprint = fingerprint(&staged)?;
        debug!("Mounted {} at {}", path.display(), staged.display());

        self.mounts.push(Mount {
            archive: path.to_path_buf(),
            staged: staged.clone(),
            fingerprint,
        });
        Ok(staged)
    }

    pub fn is_mounted(&self, path: &Path) -> bool {
        self.mounts.iter().any(|mount| mount.archive == path)
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.len()
    }

    /// Writes every changed mount back to its archive, innermost first.
    ///
    /// Returns the number of archives rewritten. Unchanged mounts are left
    /// byte-identical.
    pub fn sync(self) -> Result<usize> {
        let mut written = 0;
        for mount in self.mounts.iter().rev() {
            if fingerprint(&mount.staged)? == mount.fingerprint {
                debug!("Unchanged, not repacking: {}", mount.archive.display());
                continue;
            }
            repack(&mount.staged, &mount.archive)?;
            info!("Repacked {}", mount.archive.display());
            written += 1;
        }
        Ok(written)
    }

    /// Drops every mount without writing anything back
    pub fn release(self) {
        debug!("Releasing {} mounts without writing", self.mounts.len());
    }
}

fn extract(src: &Path, dest: &Path) -> Result<()> {
    let file = File::open(src).map_err(VfsError::io(src))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(VfsError::zip(src))?;
    std::fs::create_dir_all(dest).map_err(VfsError::io(dest))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(VfsError::zip(src))?;
        let relative = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                warn!("Skipping file with unsafe path: {}", entry.name());
                continue;
            }
        };
        let dest_path = dest.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&dest_path).map_err(VfsError::io(&dest_path))?;
        } else {
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent).map_err(VfsError::io(parent))?;
            }
            let mut outfile = File::create(&dest_path).map_err(VfsError::io(&dest_path))?;
            std::io::copy(&mut entry, &mut outfile).map_err(VfsError::io(&dest_path))?;
        }
    }

    Ok(())
}

fn repack(staged: &Path, archive: &Path) -> Result<()> {
    let parent = archive
        .parent()
        .ok_or_else(|| VfsError::Path(format!("Archive has no parent: {}", archive.display())))?;
    let mut temp = NamedTempFile::new_in(parent).map_err(VfsError::io(parent))?;

    {
        let mut zip = ZipWriter::new(BufWriter::new(temp.as_file_mut()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, path) in entry_order(staged)? {
            if path.is_dir() {
                zip.add_directory(format!("{name}/"), options)
                    .map_err(VfsError::zip(archive))?;
            } else {
                zip.start_file(name, options).map_err(VfsError::zip(archive))?;
                let mut file = File::open(&path).map_err(VfsError::io(&path))?;
                std::io::copy(&mut file, &mut zip).map_err(VfsError::io(archive))?;
            }
        }

        let mut writer = zip.finish().map_err(VfsError::zip(archive))?;
        writer.flush().map_err(VfsError::io(archive))?;
    }

    temp.persist(archive)
        .map_err(|err| VfsError::io(archive)(err.error))?;
    Ok(())
}

/// Entry names in archive order: the manifest first, then everything else by name
fn entry_order(staged: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(staged).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| VfsError::Walk {
            path: staged.display().to_string(),
            source,
        })?;
        let relative = entry.path().strip_prefix(staged).map_err(|_| VfsError::OutsideTree {
            path: entry.path().display().to_string(),
            root: staged.display().to_string(),
        })?;
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push((name, entry.path().to_path_buf()));
    }

    let rank = |name: &str| match name {
        MANIFEST_DIR => 0,
        MANIFEST_ENTRY => 1,
        _ => 2,
    };
    entries.sort_by_key(|(name, _)| rank(name));
    Ok(entries)
}

fn fingerprint(root: &Path) -> Result<Fingerprint> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| VfsError::Walk {
            path: root.display().to_string(),
            source,
        })?;
        let metadata = entry.metadata().map_err(|source| VfsError::Walk {
            path: entry.path().display().to_string(),
            source,
        })?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        entries.push((relative, metadata.len(), metadata.modified().ok()));
    }
    Ok(entries)
}
