// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Sniffs what kind of project sits at a path before anything is parsed.
//!
//! A zip file with a `VERSION` entry is a current archive; a zip without
//! one predates version markers and is format 0. A non-zip file is read as
//! a folder project's marker, whose whole content is the version integer.

use std::fs;
use std::io::{self, Read, Seek};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::model::FormatVersion;

use super::StoreError;

/// What [`probe`] learned about a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub version: FormatVersion,
    pub zipped: bool,
}

/// Determines the format generation and container of the project at
/// `location` without loading it.
pub fn probe(location: &Path) -> Result<Probe, StoreError> {
    let metadata = fs::metadata(location).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound {
            location: location.to_owned(),
        },
        _ => StoreError::Io {
            path: location.to_owned(),
            source,
        },
    })?;
    if metadata.is_dir() {
        return Err(StoreError::UnknownFormat {
            location: location.to_owned(),
        });
    }

    let mut file = fs::File::open(location).map_err(|source| StoreError::Io {
        path: location.to_owned(),
        source,
    })?;
    let mut header = [0u8; 4];
    let read = file.read(&mut header).map_err(|source| StoreError::Io {
        path: location.to_owned(),
        source,
    })?;

    let probe = if read >= 4 && header[..2] == *b"PK" {
        file.rewind().map_err(|source| StoreError::Io {
            path: location.to_owned(),
            source,
        })?;
        probe_archive(location, file)?
    } else {
        probe_marker(location)?
    };

    debug!(
        location = %location.display(),
        version = %probe.version,
        zipped = probe.zipped,
        "probed project format"
    );
    Ok(probe)
}

fn probe_archive(location: &Path, file: fs::File) -> Result<Probe, StoreError> {
    let mut archive = ZipArchive::new(file).map_err(|source| StoreError::CorruptArchive {
        location: location.to_owned(),
        source,
    })?;

    let mut text = String::new();
    match archive.by_name("VERSION") {
        Ok(mut entry) => {
            entry
                .read_to_string(&mut text)
                .map_err(|source| StoreError::Io {
                    path: location.to_owned(),
                    source,
                })?;
        }
        Err(zip::result::ZipError::FileNotFound) => {
            // Archives from before version markers existed.
            return Ok(Probe {
                version: FormatVersion::V0,
                zipped: true,
            });
        }
        Err(source) => {
            return Err(StoreError::CorruptArchive {
                location: location.to_owned(),
                source,
            })
        }
    }

    Ok(Probe {
        version: parse_version(location, &text)?,
        zipped: true,
    })
}

fn probe_marker(location: &Path) -> Result<Probe, StoreError> {
    let text = match fs::read_to_string(location) {
        Ok(text) => text,
        Err(source) if source.kind() == io::ErrorKind::InvalidData => {
            return Err(StoreError::UnknownFormat {
                location: location.to_owned(),
            })
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: location.to_owned(),
                source,
            })
        }
    };
    Ok(Probe {
        version: parse_version(location, &text)?,
        zipped: false,
    })
}

fn parse_version(location: &Path, text: &str) -> Result<FormatVersion, StoreError> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|_| StoreError::UnknownFormat {
            location: location.to_owned(),
        })?;
    FormatVersion::from_int(value).ok_or(StoreError::UnsupportedVersion {
        location: location.to_owned(),
        version: value,
    })
}
