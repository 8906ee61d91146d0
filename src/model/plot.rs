// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::fields::{PlotField, StepField};
use super::ids::{CharacterId, PlotId, StepId};

/// One resolution step of a plot line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlotStep {
    id: Option<StepId>,
    fields: BTreeMap<StepField, String>,
}

impl PlotStep {
    pub fn new(name: impl Into<String>) -> Self {
        let mut step = Self::default();
        step.set_field(StepField::Name, name);
        step
    }

    pub fn id(&self) -> Option<&StepId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Option<StepId>) {
        self.id = id;
    }

    pub fn fields(&self) -> &BTreeMap<StepField, String> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut BTreeMap<StepField, String> {
        &mut self.fields
    }

    pub fn field(&self, field: StepField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set_field(&mut self, field: StepField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }
}

/// A plot line: fixed fields, the characters it involves, and its steps.
///
/// `character_refs` keeps the author's ordering and is persisted verbatim;
/// whether each id resolves is checked after loading, not here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plot {
    id: Option<PlotId>,
    fields: BTreeMap<PlotField, String>,
    character_refs: Vec<CharacterId>,
    steps: Vec<PlotStep>,
}

impl Plot {
    pub fn new(name: impl Into<String>) -> Self {
        let mut plot = Self::default();
        plot.set_field(PlotField::Name, name);
        plot
    }

    pub fn id(&self) -> Option<&PlotId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Option<PlotId>) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        self.field(PlotField::Name).unwrap_or_default()
    }

    pub fn fields(&self) -> &BTreeMap<PlotField, String> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut BTreeMap<PlotField, String> {
        &mut self.fields
    }

    pub fn field(&self, field: PlotField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set_field(&mut self, field: PlotField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn character_refs(&self) -> &[CharacterId] {
        &self.character_refs
    }

    pub fn character_refs_mut(&mut self) -> &mut Vec<CharacterId> {
        &mut self.character_refs
    }

    pub fn steps(&self) -> &[PlotStep] {
        &self.steps
    }

    pub fn steps_mut(&mut self) -> &mut Vec<PlotStep> {
        &mut self.steps
    }
}
