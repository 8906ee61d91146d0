// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Calliope: versioned storage for writing projects.
//!
//! A project bundles a manuscript outline of folders and documents,
//! characters, plots, world entries, labels and statuses, and an opaque
//! settings blob. On disk it lives in one of two containers (a single zip
//! archive or a folder of plain files) and one of two format generations;
//! [`model::Project::load`] and [`model::Project::save`] move it between
//! memory and disk, saving folder projects incrementally.

pub mod format;
pub mod model;
pub mod store;
