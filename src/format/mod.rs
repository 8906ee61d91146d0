// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text-level codecs shared by the store layer.
//!
//! `metatext` is the native "metadata block plus body" file shape; `xml`
//! covers the structured documents (plots, world, revisions) and the legacy
//! table files.

pub mod metatext;
pub mod xml;
