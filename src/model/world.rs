// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::fields::WorldField;
use super::ids::WorldId;

/// One entry of the world-building tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorldItem {
    id: Option<WorldId>,
    fields: BTreeMap<WorldField, String>,
    children: Vec<WorldItem>,
}

impl WorldItem {
    pub fn new(name: impl Into<String>) -> Self {
        let mut item = Self::default();
        item.set_field(WorldField::Name, name);
        item
    }

    pub fn id(&self) -> Option<&WorldId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Option<WorldId>) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        self.field(WorldField::Name).unwrap_or_default()
    }

    pub fn fields(&self) -> &BTreeMap<WorldField, String> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut BTreeMap<WorldField, String> {
        &mut self.fields
    }

    pub fn field(&self, field: WorldField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set_field(&mut self, field: WorldField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn children(&self) -> &[WorldItem] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<WorldItem> {
        &mut self.children
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(WorldItem::count).sum::<usize>()
    }
}

/// Root of the world-building tree; the root itself is not an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorldTree {
    children: Vec<WorldItem>,
}

impl WorldTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[WorldItem] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<WorldItem> {
        &mut self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Entries in the whole tree.
    pub fn len(&self) -> usize {
        self.children.iter().map(WorldItem::count).sum()
    }
}
