// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A [`Project`] holds the manuscript outline plus characters, plots, world
//! entries, labels/statuses, general info, and the opaque settings blob.
//! Everything here is plain data; reading and writing lives in
//! [`crate::store`].

pub mod character;
pub mod fields;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod outline;
pub mod plot;
pub mod project;
pub mod world;

pub use character::{Character, CharacterInfo};
pub use fields::{
    CharacterField, InfoField, OutlineField, PlotField, StepField, SummaryField, WorldField,
};
pub use ids::{CharacterId, Id, IdError, ItemId, PlotId, StepId, WorldId};
pub use outline::{ItemKind, OutlineItem, OutlineTree, Revision, UnknownParentError, Walk};
pub use plot::{Plot, PlotStep};
pub use project::{FormatVersion, Project, SaveReport, Tag};
pub use world::{WorldItem, WorldTree};
