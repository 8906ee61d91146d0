// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Loading and saving projects, in either physical container.
//!
//! One path names a whole project: a zip archive, or a marker file next to
//! a directory that holds the same entries as plain files. [`probe`] sniffs
//! the format generation and container, the matching codec translates
//! between bytes and the model, and folder saves run through the
//! incremental writer so an unchanged project touches nothing on disk.

mod backend;
mod codec_v0;
mod codec_v1;
pub(crate) mod incremental;
#[cfg(test)]
mod testutil;
mod version;

pub use version::{probe, Probe};

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::result::ZipError;

use crate::model::{FormatVersion, Project, SaveReport};

/// Everything that can go wrong between a project and its disk form.
///
/// Loads and saves are tolerant where they can be; errors of this type are
/// the fatal cases. Per-entry problems that do not abort the operation end
/// up in [`Project::loading_errors`] or [`Project::saving_errors`] instead.
#[derive(Debug)]
pub enum StoreError {
    /// Nothing exists at the given location.
    NotFound { location: PathBuf },
    /// The file looked like a zip but could not be read as one.
    CorruptArchive { location: PathBuf, source: ZipError },
    /// Neither a readable archive nor a folder project marker.
    UnknownFormat { location: PathBuf },
    /// A marker with a format generation this build does not know.
    UnsupportedVersion { location: PathBuf, version: i64 },
    MissingEntry { name: String },
    MalformedEntry { name: String, detail: String },
    WriteAccessDenied { location: PathBuf },
    /// Saving a project that was never given a location.
    NoLocation,
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { location } => {
                write!(f, "no project at '{}'", location.display())
            }
            Self::CorruptArchive { location, source } => {
                write!(
                    f,
                    "'{}' is not a readable archive: {source}",
                    location.display()
                )
            }
            Self::UnknownFormat { location } => {
                write!(
                    f,
                    "'{}' does not look like a project container",
                    location.display()
                )
            }
            Self::UnsupportedVersion { location, version } => {
                write!(
                    f,
                    "'{}' uses unsupported format version {version}",
                    location.display()
                )
            }
            Self::MissingEntry { name } => write!(f, "missing entry '{name}'"),
            Self::MalformedEntry { name, detail } => {
                write!(f, "entry '{name}' is malformed: {detail}")
            }
            Self::WriteAccessDenied { location } => {
                write!(f, "no write access to '{}'", location.display())
            }
            Self::NoLocation => write!(f, "the project has no location to save to"),
            Self::Io { path, source } => {
                write!(f, "io error on '{}': {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CorruptArchive { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Project {
    /// Opens the project at `location`, whichever container and format
    /// generation it uses.
    ///
    /// Unreadable entries inside an otherwise loadable project do not fail
    /// the load; they are skipped and listed in
    /// [`loading_errors`](Project::loading_errors).
    pub fn load(location: &Path) -> Result<Self, StoreError> {
        let probe = version::probe(location)?;

        let mut project = Project::new();
        project.set_location(Some(location.to_owned()));
        project.set_zipped(probe.zipped);
        project.set_version(probe.version);

        let backend = if probe.zipped {
            backend::StorageBackend::open_archive(location)?
        } else {
            backend::StorageBackend::open_folder(location)?
        };
        match probe.version {
            FormatVersion::V0 => codec_v0::load_into(&mut project, &backend)?,
            FormatVersion::V1 => codec_v1::load_into(&mut project, &backend)?,
        }

        info!(
            location = %location.display(),
            version = %probe.version,
            zipped = probe.zipped,
            problems = project.loading_errors().len(),
            "loaded project"
        );
        Ok(project)
    }

    /// Writes the project back to its location.
    ///
    /// Archive saves rebuild the whole zip. Folder saves are incremental:
    /// unchanged entries are skipped, retitled items become renames, and
    /// entries the project no longer produces are deleted. Non-fatal
    /// problems land in [`saving_errors`](Project::saving_errors).
    pub fn save(&mut self) -> Result<SaveReport, StoreError> {
        self.saving_errors_mut().clear();
        let Some(location) = self.location().map(Path::to_owned) else {
            return Err(StoreError::NoLocation);
        };
        check_write_access(&location)?;

        let report = match self.version() {
            FormatVersion::V0 => {
                // Legacy projects only ever save as a whole archive.
                self.set_zipped(true);
                let plan = codec_v0::encode(self);
                backend::write_archive(&location, &plan.entries)?;
                SaveReport {
                    written: plan.entries.len(),
                    ..SaveReport::default()
                }
            }
            FormatVersion::V1 if self.zipped() => {
                let plan = codec_v1::encode(self);
                backend::write_archive(&location, &plan.entries)?;
                SaveReport {
                    written: plan.entries.len(),
                    ..SaveReport::default()
                }
            }
            FormatVersion::V1 => {
                let plan = codec_v1::encode(self);
                let root = backend::folder_data_root(&location);
                let mut errors = Vec::new();
                let applied = incremental::apply(&root, self.write_cache_mut(), plan, &mut errors);
                self.saving_errors_mut().extend(errors);
                let report = applied?;
                let marker = format!("{}\n", FormatVersion::V1.as_int());
                backend::write_atomic(&location, marker.as_bytes()).map_err(|source| {
                    StoreError::Io {
                        path: location.clone(),
                        source,
                    }
                })?;
                report
            }
        };

        info!(
            location = %location.display(),
            version = %self.version(),
            written = report.written,
            moved = report.moved,
            removed = report.removed,
            "saved project"
        );
        Ok(report)
    }

    /// Points the project at a new destination and container, then saves.
    /// The format generation stays whatever it was.
    pub fn save_as(&mut self, location: &Path, zipped: bool) -> Result<SaveReport, StoreError> {
        self.set_location(Some(location.to_owned()));
        self.set_zipped(zipped);
        self.save()
    }
}

fn check_write_access(location: &Path) -> Result<(), StoreError> {
    match fs::metadata(location) {
        Ok(metadata) if metadata.permissions().readonly() => Err(StoreError::WriteAccessDenied {
            location: location.to_owned(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::testutil::TempDir;
    use super::{probe, StoreError};
    use crate::model::fixtures::sample_project;
    use crate::model::{FormatVersion, Project};

    #[test]
    fn saving_without_a_location_is_an_error() {
        let mut project = Project::new();
        match project.save() {
            Err(StoreError::NoLocation) => {}
            other => panic!("expected NoLocation, got {other:?}"),
        }
    }

    #[test]
    fn legacy_saves_always_produce_an_archive() {
        let tmp = TempDir::new("store");
        let path = tmp.path().join("legacy.cal");
        let mut project = sample_project();
        project.set_version(FormatVersion::V0);
        project.set_location(Some(path.clone()));
        project.set_zipped(false);

        let report = project.save().unwrap();
        assert!(project.zipped());
        assert_eq!(report.written, 7);

        let sniffed = probe(&path).unwrap();
        assert_eq!(sniffed.version, FormatVersion::V0);
        assert!(sniffed.zipped);
    }

    #[test]
    fn hand_built_archives_load_and_resave_identically() {
        let tmp = TempDir::new("store");
        let path = tmp.path().join("novel.cal");
        let file = fs::File::create(&path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, content) in [
            ("VERSION", "1"),
            ("labels.txt", "Urgent: #ff0000\n"),
            ("outline/0-Chapter_1.md", "Title: Chapter 1\n\n\nHello."),
        ] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();

        let project = Project::load(&path).unwrap();
        assert!(project.loading_errors().is_empty());
        assert_eq!(project.labels().len(), 1);
        assert_eq!(project.labels()[0].text(), "Urgent");
        assert_eq!(project.labels()[0].color(), Some("#ff0000"));
        assert_eq!(project.outline().len(), 1);
        let chapter = &project.outline().children()[0];
        assert_eq!(chapter.title(), "Chapter 1");
        assert_eq!(chapter.body(), "Hello.");

        let copy_path = tmp.path().join("copy.cal");
        let mut copy = project.clone();
        copy.save_as(&copy_path, true).unwrap();
        let reloaded = Project::load(&copy_path).unwrap();
        assert!(reloaded.loading_errors().is_empty());
        assert_eq!(reloaded.labels(), project.labels());
        assert_eq!(reloaded.statuses(), project.statuses());
        assert_eq!(reloaded.infos(), project.infos());
        assert_eq!(reloaded.outline(), project.outline());
        assert_eq!(reloaded.settings(), project.settings());
    }

    #[test]
    fn readonly_destination_is_denied() {
        let tmp = TempDir::new("store");
        let path = tmp.path().join("novel.cal");
        fs::write(&path, "1\n").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        let mut project = sample_project();
        project.set_location(Some(path.clone()));
        match project.save() {
            Err(StoreError::WriteAccessDenied { location }) => assert_eq!(location, path),
            other => panic!("expected WriteAccessDenied, got {other:?}"),
        }
    }
}
