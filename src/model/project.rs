// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::store::incremental::WriteCache;

use super::character::Character;
use super::fields::{InfoField, SummaryField};
use super::ids::CharacterId;
use super::outline::OutlineTree;
use super::plot::Plot;
use super::world::WorldTree;

/// On-disk format generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FormatVersion {
    /// The legacy single-zip layout with XML table files.
    V0,
    /// The current layout: one file per document, readable as plain text.
    #[default]
    V1,
}

impl FormatVersion {
    pub fn as_int(self) -> i64 {
        match self {
            Self::V0 => 0,
            Self::V1 => 1,
        }
    }

    pub fn from_int(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::V0),
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_int())
    }
}

/// A named, optionally colored tag. Used for both labels and statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    text: String,
    color: Option<String>,
}

impl Tag {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn with_color(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Some(color.into()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn set_color(&mut self, color: Option<String>) {
        self.color = color;
    }
}

/// What a save actually touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub written: usize,
    pub moved: usize,
    pub removed: usize,
}

impl SaveReport {
    pub fn is_noop(&self) -> bool {
        self.written == 0 && self.moved == 0 && self.removed == 0
    }
}

/// A whole writing project: manuscript outline, characters, plots, world
/// entries, labels and statuses, general info, and the opaque settings
/// blob, plus where and how it lives on disk.
///
/// `loading_errors` and `saving_errors` collect the non-fatal problems of
/// the most recent load/save; both start empty on each run.
#[derive(Debug, Clone, Default)]
pub struct Project {
    location: Option<PathBuf>,
    zipped: bool,
    version: FormatVersion,
    settings: String,
    info: BTreeMap<InfoField, String>,
    summary: BTreeMap<SummaryField, String>,
    labels: Vec<Tag>,
    statuses: Vec<Tag>,
    characters: Vec<Character>,
    plots: Vec<Plot>,
    world: WorldTree,
    outline: OutlineTree,
    loading_errors: Vec<String>,
    saving_errors: Vec<String>,
    write_cache: WriteCache,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Points the project at a different destination. Changing any part of
    /// the destination identity drops the write cache, so the next save
    /// writes everything instead of skipping entries written elsewhere.
    pub fn set_location(&mut self, location: Option<PathBuf>) {
        if self.location != location {
            self.write_cache.clear();
        }
        self.location = location;
    }

    pub fn zipped(&self) -> bool {
        self.zipped
    }

    /// Switches between the archive and folder containers; drops the write
    /// cache when the container changes.
    pub fn set_zipped(&mut self, zipped: bool) {
        if self.zipped != zipped {
            self.write_cache.clear();
        }
        self.zipped = zipped;
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Switches the format generation; drops the write cache when it
    /// changes.
    pub fn set_version(&mut self, version: FormatVersion) {
        if self.version != version {
            self.write_cache.clear();
        }
        self.version = version;
    }

    pub fn settings(&self) -> &str {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: impl Into<String>) {
        self.settings = settings.into();
    }

    pub fn info(&self, field: InfoField) -> Option<&str> {
        self.info.get(&field).map(String::as_str)
    }

    pub fn set_info(&mut self, field: InfoField, value: impl Into<String>) {
        self.info.insert(field, value.into());
    }

    pub fn infos(&self) -> &BTreeMap<InfoField, String> {
        &self.info
    }

    pub fn infos_mut(&mut self) -> &mut BTreeMap<InfoField, String> {
        &mut self.info
    }

    pub fn title(&self) -> &str {
        self.info(InfoField::Title).unwrap_or_default()
    }

    pub fn summary(&self, field: SummaryField) -> Option<&str> {
        self.summary.get(&field).map(String::as_str)
    }

    pub fn set_summary(&mut self, field: SummaryField, value: impl Into<String>) {
        self.summary.insert(field, value.into());
    }

    pub fn summaries(&self) -> &BTreeMap<SummaryField, String> {
        &self.summary
    }

    pub fn summaries_mut(&mut self) -> &mut BTreeMap<SummaryField, String> {
        &mut self.summary
    }

    pub fn labels(&self) -> &[Tag] {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut Vec<Tag> {
        &mut self.labels
    }

    pub fn statuses(&self) -> &[Tag] {
        &self.statuses
    }

    pub fn statuses_mut(&mut self) -> &mut Vec<Tag> {
        &mut self.statuses
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn characters_mut(&mut self) -> &mut Vec<Character> {
        &mut self.characters
    }

    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id() == Some(id))
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn plots_mut(&mut self) -> &mut Vec<Plot> {
        &mut self.plots
    }

    pub fn world(&self) -> &WorldTree {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldTree {
        &mut self.world
    }

    pub fn outline(&self) -> &OutlineTree {
        &self.outline
    }

    pub fn outline_mut(&mut self) -> &mut OutlineTree {
        &mut self.outline
    }

    pub fn loading_errors(&self) -> &[String] {
        &self.loading_errors
    }

    pub(crate) fn loading_errors_mut(&mut self) -> &mut Vec<String> {
        &mut self.loading_errors
    }

    pub fn saving_errors(&self) -> &[String] {
        &self.saving_errors
    }

    pub(crate) fn saving_errors_mut(&mut self) -> &mut Vec<String> {
        &mut self.saving_errors
    }

    #[cfg(test)]
    pub(crate) fn write_cache(&self) -> &WriteCache {
        &self.write_cache
    }

    pub(crate) fn write_cache_mut(&mut self) -> &mut WriteCache {
        &mut self.write_cache
    }
}
