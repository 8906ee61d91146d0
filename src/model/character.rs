// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::fields::CharacterField;
use super::ids::CharacterId;

/// A free-form detail sheet entry: anything beyond the fixed field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterInfo {
    description: String,
    value: String,
}

impl CharacterInfo {
    pub fn new(description: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            value: value.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// One character sheet.
///
/// The fixed fields live in `fields`; everything the author added beyond
/// them is kept, in order, in `infos`. `color` is the icon color shown next
/// to the name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Character {
    id: Option<CharacterId>,
    fields: BTreeMap<CharacterField, String>,
    color: Option<String>,
    infos: Vec<CharacterInfo>,
    last_path: Option<String>,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        let mut character = Self::default();
        character.set_field(CharacterField::Name, name);
        character
    }

    pub fn id(&self) -> Option<&CharacterId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Option<CharacterId>) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        self.field(CharacterField::Name).unwrap_or_default()
    }

    pub fn fields(&self) -> &BTreeMap<CharacterField, String> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut BTreeMap<CharacterField, String> {
        &mut self.fields
    }

    pub fn field(&self, field: CharacterField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set_field(&mut self, field: CharacterField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn set_color(&mut self, color: Option<String>) {
        self.color = color;
    }

    pub fn infos(&self) -> &[CharacterInfo] {
        &self.infos
    }

    pub fn infos_mut(&mut self) -> &mut Vec<CharacterInfo> {
        &mut self.infos
    }

    pub fn push_info(&mut self, description: impl Into<String>, value: impl Into<String>) {
        self.infos.push(CharacterInfo::new(description, value));
    }

    pub fn last_path(&self) -> Option<&str> {
        self.last_path.as_deref()
    }

    pub fn set_last_path(&mut self, path: Option<String>) {
        self.last_path = path;
    }
}
