// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The two physical containers behind one read interface.
//!
//! An archive project is a single zip file; opening it reads every entry
//! into memory once. A folder project is a marker file next to a data
//! directory named after the marker's stem (`novel.cal` plus `novel/`);
//! reads go to the filesystem lazily. Entry names are relative paths with
//! `/` separators in both containers.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::StoreError;

pub(crate) enum StorageBackend {
    Archive { entries: BTreeMap<String, Vec<u8>> },
    Folder { root: PathBuf },
}

impl StorageBackend {
    pub(crate) fn open_archive(location: &Path) -> Result<Self, StoreError> {
        let file = fs::File::open(location).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound {
                location: location.to_owned(),
            },
            _ => StoreError::Io {
                path: location.to_owned(),
                source,
            },
        })?;
        let mut archive = ZipArchive::new(file).map_err(|source| StoreError::CorruptArchive {
            location: location.to_owned(),
            source,
        })?;

        let mut entries = BTreeMap::new();
        for index in 0..archive.len() {
            let mut entry =
                archive
                    .by_index(index)
                    .map_err(|source| StoreError::CorruptArchive {
                        location: location.to_owned(),
                        source,
                    })?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().replace('\\', "/");
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut bytes)
                .map_err(|source| StoreError::Io {
                    path: location.to_owned(),
                    source,
                })?;
            entries.insert(name, bytes);
        }
        Ok(Self::Archive { entries })
    }

    pub(crate) fn open_folder(location: &Path) -> Result<Self, StoreError> {
        let root = folder_data_root(location);
        if !root.is_dir() {
            return Err(StoreError::NotFound { location: root });
        }
        Ok(Self::Folder { root })
    }

    pub(crate) fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        match self {
            Self::Archive { entries } => {
                entries
                    .get(name)
                    .cloned()
                    .ok_or_else(|| StoreError::MissingEntry {
                        name: name.to_owned(),
                    })
            }
            Self::Folder { root } => {
                let path = root.join(name);
                fs::read(&path).map_err(|source| match source.kind() {
                    io::ErrorKind::NotFound => StoreError::MissingEntry {
                        name: name.to_owned(),
                    },
                    _ => StoreError::Io { path, source },
                })
            }
        }
    }

    pub(crate) fn read_utf8(&self, name: &str) -> Result<String, StoreError> {
        String::from_utf8(self.read(name)?).map_err(|_| StoreError::MalformedEntry {
            name: name.to_owned(),
            detail: "not valid UTF-8".to_owned(),
        })
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        match self {
            Self::Archive { entries } => entries.contains_key(name),
            Self::Folder { root } => root.join(name).is_file(),
        }
    }

    /// All file entries, sorted. Dotfiles and non-UTF-8 names in a folder
    /// container are skipped, not errors.
    pub(crate) fn entries(&self) -> Result<Vec<String>, StoreError> {
        match self {
            Self::Archive { entries } => Ok(entries.keys().cloned().collect()),
            Self::Folder { root } => {
                let mut out = Vec::new();
                collect_files(root, "", &mut out)?;
                out.sort();
                Ok(out)
            }
        }
    }
}

/// The data directory that goes with a folder project's marker file.
pub(crate) fn folder_data_root(location: &Path) -> PathBuf {
    match location.file_stem() {
        Some(stem) => location.with_file_name(stem),
        None => location.to_owned(),
    }
}

fn collect_files(dir: &Path, prefix: &str, out: &mut Vec<String>) -> Result<(), StoreError> {
    let entries = fs::read_dir(dir).map_err(|source| StoreError::Io {
        path: dir.to_owned(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: dir.to_owned(),
            source,
        })?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            warn!(path = %entry.path().display(), "skipping entry with non-UTF-8 name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let relative = if prefix.is_empty() {
            name.to_owned()
        } else {
            format!("{prefix}/{name}")
        };
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, &relative, out)?;
        } else {
            out.push(relative);
        }
    }
    Ok(())
}

/// Serializes the entries, in order, into a fresh zip and atomically
/// replaces `location` with it.
pub(crate) fn write_archive(
    location: &Path,
    entries: &[(String, Vec<u8>)],
) -> Result<(), StoreError> {
    let mut cursor = io::Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|source| StoreError::Io {
                    path: location.to_owned(),
                    source: io::Error::other(source),
                })?;
            writer.write_all(bytes).map_err(|source| StoreError::Io {
                path: location.to_owned(),
                source,
            })?;
        }
        writer.finish().map_err(|source| StoreError::Io {
            path: location.to_owned(),
            source: io::Error::other(source),
        })?;
    }
    write_atomic(location, &cursor.into_inner()).map_err(|source| StoreError::Io {
        path: location.to_owned(),
        source,
    })
}

/// Writes through a same-directory temp file plus rename, so a crash never
/// leaves a half-written file at `path`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(file_name) = path.file_name() else {
        return Err(io::Error::other("path has no file name"));
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".calliope.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)?;
    file.write_all(contents)?;
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(source);
    }
    Ok(())
}

pub(crate) fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::folder_data_root;

    #[test]
    fn data_root_drops_the_marker_extension() {
        assert_eq!(
            folder_data_root(Path::new("/tmp/novel.cal")),
            Path::new("/tmp/novel")
        );
        assert_eq!(
            folder_data_root(Path::new("drafts/novel.v2.cal")),
            Path::new("drafts/novel.v2")
        );
    }
}
