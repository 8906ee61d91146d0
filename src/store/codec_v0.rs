// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The legacy generation 0 layout, flat XML tables in one archive.
//!
//! ```text
//! flat.xml       row 0 info fields, row 1 summary fields, by column
//! world.xml      one row per entry, child rows nested in the parent row
//! labels.xml     one row per tag, text in cell 0, color on the cell
//! status.xml
//! plots.xml      scalar cells, then nested character and step rows
//! outline.xml    attribute tree of outlineItem elements, body in "Text"
//! settings.txt   opaque application settings
//! ```
//!
//! Every scalar lives in a `<cell col="N">` under a `<row>`. A
//! `characters.xml` table is read when present but never written back;
//! this generation cannot keep character sheets. Saves always rebuild the
//! complete archive and carry no version marker entry.

use tracing::warn;

use crate::format::xml::{parse_xml, write_xml, XmlElement};
use crate::model::fields::{
    CharacterField, InfoField, OutlineField, PlotField, StepField, SummaryField, WorldField,
    TAG_ID, TAG_TEXT, TAG_TITLE, TAG_TYPE,
};
use crate::model::{
    Character, CharacterId, ItemId, ItemKind, OutlineItem, OutlineTree, Plot, PlotId, PlotStep,
    Project, StepId, Tag, WorldId, WorldItem, WorldTree,
};

use super::backend::StorageBackend;
use super::codec_v1::{collect_revisions, revision_elements, verify_plot_refs};
use super::incremental::SavePlan;
use super::StoreError;

const FLAT_ENTRY: &str = "flat.xml";
const WORLD_ENTRY: &str = "world.xml";
const LABELS_ENTRY: &str = "labels.xml";
const STATUS_ENTRY: &str = "status.xml";
const PLOTS_ENTRY: &str = "plots.xml";
const CHARACTERS_ENTRY: &str = "characters.xml";
const OUTLINE_ENTRY: &str = "outline.xml";
const SETTINGS_ENTRY: &str = "settings.txt";

// Scalar columns start at 1; cell 0 always holds the record id.
const ID_CELL: usize = 0;
const PLOT_CHARACTERS_CELL: usize = 5;
const PLOT_STEPS_CELL: usize = 6;

/// Reads a legacy container into `project`. Broken or absent tables are
/// logged and recorded as loading errors; the components they would have
/// filled stay empty.
pub(crate) fn load_into(project: &mut Project, backend: &StorageBackend) -> Result<(), StoreError> {
    if let Some(text) = read_entry(project, backend, FLAT_ENTRY) {
        if let Err(err) = load_flat(project, &text) {
            note_failure(project, FLAT_ENTRY, &err);
        }
    }
    if let Some(text) = read_entry(project, backend, CHARACTERS_ENTRY) {
        if let Err(err) = load_characters(project, &text) {
            note_failure(project, CHARACTERS_ENTRY, &err);
        }
    }
    if let Some(text) = read_entry(project, backend, WORLD_ENTRY) {
        match load_world(&text) {
            Ok(world) => *project.world_mut() = world,
            Err(err) => note_failure(project, WORLD_ENTRY, &err),
        }
    }
    if let Some(text) = read_entry(project, backend, LABELS_ENTRY) {
        match load_tags(LABELS_ENTRY, &text) {
            Ok(tags) => *project.labels_mut() = tags,
            Err(err) => note_failure(project, LABELS_ENTRY, &err),
        }
    }
    if let Some(text) = read_entry(project, backend, STATUS_ENTRY) {
        match load_tags(STATUS_ENTRY, &text) {
            Ok(tags) => *project.statuses_mut() = tags,
            Err(err) => note_failure(project, STATUS_ENTRY, &err),
        }
    }
    if let Some(text) = read_entry(project, backend, PLOTS_ENTRY) {
        match load_plots(&text) {
            Ok(plots) => *project.plots_mut() = plots,
            Err(err) => note_failure(project, PLOTS_ENTRY, &err),
        }
    }
    if let Some(text) = read_entry(project, backend, OUTLINE_ENTRY) {
        if let Err(err) = load_outline(project, &text) {
            note_failure(project, OUTLINE_ENTRY, &err);
        }
    }
    if let Some(text) = read_entry(project, backend, SETTINGS_ENTRY) {
        project.set_settings(text);
    }

    project.outline_mut().check_ids();
    verify_plot_refs(project);
    Ok(())
}

/// Plans a full legacy save. The plan always rewrites every table, never
/// renames, and leaves characters out.
pub(crate) fn encode(project: &mut Project) -> SavePlan {
    project.outline_mut().check_ids();
    if !project.characters().is_empty() {
        warn!(
            count = project.characters().len(),
            "legacy format does not persist characters"
        );
    }

    let mut plan = SavePlan::default();
    plan.entries.push((
        FLAT_ENTRY.to_owned(),
        write_xml(&flat_table(project)).into_bytes(),
    ));
    plan.entries.push((
        WORLD_ENTRY.to_owned(),
        write_xml(&world_table(project.world())).into_bytes(),
    ));
    plan.entries.push((
        LABELS_ENTRY.to_owned(),
        write_xml(&tag_table(project.labels())).into_bytes(),
    ));
    plan.entries.push((
        STATUS_ENTRY.to_owned(),
        write_xml(&tag_table(project.statuses())).into_bytes(),
    ));
    plan.entries.push((
        PLOTS_ENTRY.to_owned(),
        write_xml(&plot_table(project.plots())).into_bytes(),
    ));
    plan.entries.push((
        OUTLINE_ENTRY.to_owned(),
        write_xml(&outline_document(project.outline())).into_bytes(),
    ));
    plan.entries.push((
        SETTINGS_ENTRY.to_owned(),
        project.settings().as_bytes().to_vec(),
    ));
    plan
}

fn read_entry(project: &mut Project, backend: &StorageBackend, name: &str) -> Option<String> {
    match backend.read_utf8(name) {
        Ok(text) => Some(text),
        Err(err) => {
            note_failure(project, name, &err);
            None
        }
    }
}

fn note_failure(project: &mut Project, name: &str, err: &StoreError) {
    warn!(entry = name, error = %err, "skipping unreadable entry");
    project.loading_errors_mut().push(format!("{name}: {err}"));
}

fn parse_table(name: &str, text: &str) -> Result<XmlElement, StoreError> {
    let root = parse_xml(text).map_err(|err| StoreError::MalformedEntry {
        name: name.to_owned(),
        detail: err.to_string(),
    })?;
    if root.name != "table" {
        warn!(entry = name, element = %root.name, "unexpected root element in legacy table");
    }
    Ok(root)
}

fn nested_rows(element: &XmlElement) -> impl Iterator<Item = &XmlElement> + '_ {
    element.children.iter().filter(|child| child.name == "row")
}

/// The `<cell>` children of `row` with a usable `col` attribute, in
/// document order.
fn indexed_cells(row: &XmlElement) -> Vec<(usize, &XmlElement)> {
    let mut cells = Vec::new();
    for child in &row.children {
        if child.name != "cell" {
            continue;
        }
        match child.attr("col").and_then(|raw| raw.parse::<usize>().ok()) {
            Some(index) => cells.push((index, child)),
            None => warn!("cell without a usable col attribute skipped"),
        }
    }
    cells
}

fn load_flat(project: &mut Project, text: &str) -> Result<(), StoreError> {
    let table = parse_table(FLAT_ENTRY, text)?;
    let mut table_rows = nested_rows(&table);
    if let Some(row) = table_rows.next() {
        for (index, cell) in indexed_cells(row) {
            if cell.text.is_empty() {
                continue;
            }
            match InfoField::from_index(index) {
                Some(field) => project.set_info(field, &cell.text),
                None => warn!(col = index, "unknown info column ignored"),
            }
        }
    }
    if let Some(row) = table_rows.next() {
        for (index, cell) in indexed_cells(row) {
            if cell.text.is_empty() {
                continue;
            }
            match SummaryField::from_index(index) {
                Some(field) => project.set_summary(field, &cell.text),
                None => warn!(col = index, "unknown summary column ignored"),
            }
        }
    }
    Ok(())
}

fn load_tags(name: &str, text: &str) -> Result<Vec<Tag>, StoreError> {
    let table = parse_table(name, text)?;
    let mut tags = Vec::new();
    for row in nested_rows(&table) {
        for (index, cell) in indexed_cells(row) {
            if index != 0 {
                warn!(entry = name, col = index, "unknown tag column ignored");
                continue;
            }
            // Legacy files keep an empty placeholder tag in the first row.
            if cell.text.is_empty() {
                continue;
            }
            tags.push(match cell.attr("color") {
                Some(color) => Tag::with_color(&cell.text, color),
                None => Tag::new(&cell.text),
            });
        }
    }
    Ok(tags)
}

fn load_characters(project: &mut Project, text: &str) -> Result<(), StoreError> {
    let table = parse_table(CHARACTERS_ENTRY, text)?;
    for row in nested_rows(&table) {
        let mut character = Character::default();
        for (index, cell) in indexed_cells(row) {
            if index == ID_CELL {
                if !cell.text.is_empty() {
                    match CharacterId::new(&cell.text) {
                        Ok(id) => character.set_id(Some(id)),
                        Err(err) => {
                            warn!(value = %cell.text, error = %err, "ignoring invalid character id")
                        }
                    }
                }
                if let Some(color) = cell.attr("color") {
                    character.set_color(Some(color.to_owned()));
                }
                continue;
            }
            match CharacterField::from_index(index - 1) {
                Some(field) => {
                    if !cell.text.is_empty() {
                        character.set_field(field, &cell.text);
                    }
                }
                None => warn!(col = index, "unknown character column ignored"),
            }
        }
        for info_row in nested_rows(row) {
            let mut description = String::new();
            let mut value = String::new();
            for (index, cell) in indexed_cells(info_row) {
                match index {
                    0 => description = cell.text.clone(),
                    1 => value = cell.text.clone(),
                    _ => warn!(col = index, "unknown detail column ignored"),
                }
            }
            character.push_info(description, value);
        }
        project.characters_mut().push(character);
    }
    Ok(())
}

fn load_plots(text: &str) -> Result<Vec<Plot>, StoreError> {
    let table = parse_table(PLOTS_ENTRY, text)?;
    let mut plots = Vec::new();
    for row in nested_rows(&table) {
        let mut plot = Plot::default();
        for (index, cell) in indexed_cells(row) {
            match index {
                ID_CELL => {
                    if cell.text.is_empty() {
                        continue;
                    }
                    match PlotId::new(&cell.text) {
                        Ok(id) => plot.set_id(Some(id)),
                        Err(err) => {
                            warn!(value = %cell.text, error = %err, "ignoring invalid plot id")
                        }
                    }
                }
                PLOT_CHARACTERS_CELL => {
                    for reference in nested_rows(cell) {
                        for (ref_index, ref_cell) in indexed_cells(reference) {
                            if ref_index != 0 {
                                warn!(col = ref_index, "unknown reference column ignored");
                                continue;
                            }
                            match CharacterId::new(ref_cell.text.trim()) {
                                Ok(id) => plot.character_refs_mut().push(id),
                                Err(err) => {
                                    warn!(value = %ref_cell.text, error = %err, "ignoring invalid character reference")
                                }
                            }
                        }
                    }
                }
                PLOT_STEPS_CELL => {
                    for step_row in nested_rows(cell) {
                        plot.steps_mut().push(parse_step_row(step_row));
                    }
                }
                _ => match PlotField::from_index(index - 1) {
                    Some(field) => {
                        if !cell.text.is_empty() {
                            plot.set_field(field, &cell.text);
                        }
                    }
                    None => warn!(col = index, "unknown plot column ignored"),
                },
            }
        }
        plots.push(plot);
    }
    Ok(plots)
}

fn parse_step_row(row: &XmlElement) -> PlotStep {
    let mut step = PlotStep::default();
    for (index, cell) in indexed_cells(row) {
        if index == ID_CELL {
            if cell.text.is_empty() {
                continue;
            }
            match StepId::new(&cell.text) {
                Ok(id) => step.set_id(Some(id)),
                Err(err) => warn!(value = %cell.text, error = %err, "ignoring invalid step id"),
            }
            continue;
        }
        match StepField::from_index(index - 1) {
            Some(field) => {
                if !cell.text.is_empty() {
                    step.set_field(field, &cell.text);
                }
            }
            None => warn!(col = index, "unknown step column ignored"),
        }
    }
    step
}

fn load_world(text: &str) -> Result<WorldTree, StoreError> {
    let table = parse_table(WORLD_ENTRY, text)?;
    let mut tree = WorldTree::new();
    *tree.children_mut() = nested_rows(&table).map(parse_world_row).collect();
    Ok(tree)
}

fn parse_world_row(row: &XmlElement) -> WorldItem {
    let mut item = WorldItem::default();
    for (index, cell) in indexed_cells(row) {
        if index == ID_CELL {
            if cell.text.is_empty() {
                continue;
            }
            match WorldId::new(&cell.text) {
                Ok(id) => item.set_id(Some(id)),
                Err(err) => warn!(value = %cell.text, error = %err, "ignoring invalid world id"),
            }
            continue;
        }
        match WorldField::from_index(index - 1) {
            Some(field) => {
                if !cell.text.is_empty() {
                    item.set_field(field, &cell.text);
                }
            }
            None => warn!(col = index, "unknown world column ignored"),
        }
    }
    *item.children_mut() = nested_rows(row).map(parse_world_row).collect();
    item
}

fn load_outline(project: &mut Project, text: &str) -> Result<(), StoreError> {
    let root = parse_xml(text).map_err(|err| StoreError::MalformedEntry {
        name: OUTLINE_ENTRY.to_owned(),
        detail: err.to_string(),
    })?;
    if root.name != "root" {
        warn!(element = %root.name, "unexpected root element in outline document");
    }
    let mut items = Vec::new();
    for child in &root.children {
        if child.name == "outlineItem" {
            items.push(parse_outline_element(child));
        } else {
            warn!(element = %child.name, "unexpected element in outline document");
        }
    }
    *project.outline_mut().children_mut() = items;
    Ok(())
}

fn parse_outline_element(element: &XmlElement) -> OutlineItem {
    let mut item = OutlineItem::document("");
    let mut typed = false;
    for (name, value) in &element.attributes {
        match name.as_str() {
            TAG_TITLE => item.set_title(value),
            TAG_ID => match ItemId::new(value) {
                Ok(id) => item.set_id(Some(id)),
                Err(err) => warn!(value = %value, error = %err, "ignoring invalid outline id"),
            },
            TAG_TYPE => match ItemKind::from_token(value) {
                Some(kind) => {
                    item.set_kind(kind);
                    typed = true;
                }
                None => warn!(token = %value, "unknown outline type, keeping document"),
            },
            TAG_TEXT => item.set_body(value),
            _ => match OutlineField::from_tag(name) {
                Some(field) => item.set_attribute(field, value),
                None => warn!(key = %name, "unknown outline attribute ignored"),
            },
        }
    }
    collect_revisions(element, &mut item);

    let mut children = Vec::new();
    for child in &element.children {
        match child.name.as_str() {
            "outlineItem" => children.push(parse_outline_element(child)),
            "revision" => {}
            _ => warn!(element = %child.name, "unexpected element in outline document"),
        }
    }
    // Untyped elements predate the Type attribute; children mean a folder.
    if !typed && !children.is_empty() {
        item.set_kind(ItemKind::Folder);
    }
    *item.children_mut() = children;
    item
}

fn cell(col: usize, text: &str) -> XmlElement {
    let mut cell = XmlElement::new("cell");
    cell.set_attr("col", col.to_string());
    cell.text = text.to_owned();
    cell
}

/// Rows 0 and 1: info and summary fields keyed by their column.
fn flat_table(project: &Project) -> XmlElement {
    let mut table = XmlElement::new("table");
    let mut infos = XmlElement::new("row");
    for (field, value) in project.infos() {
        if value.is_empty() {
            continue;
        }
        infos.children.push(cell(field.index(), value));
    }
    let mut summary = XmlElement::new("row");
    for (field, value) in project.summaries() {
        if value.is_empty() {
            continue;
        }
        summary.children.push(cell(field.index(), value));
    }
    table.children.extend([infos, summary]);
    table
}

fn tag_table(tags: &[Tag]) -> XmlElement {
    let mut table = XmlElement::new("table");
    for tag in tags {
        let mut row = XmlElement::new("row");
        let mut text_cell = cell(0, tag.text());
        if let Some(color) = tag.color() {
            text_cell.set_attr("color", color);
        }
        row.children.push(text_cell);
        table.children.push(row);
    }
    table
}

/// One row per plot: scalar cells, then character references and steps as
/// nested rows inside their own cells.
fn plot_table(plots: &[Plot]) -> XmlElement {
    let mut table = XmlElement::new("table");
    for plot in plots {
        let mut row = XmlElement::new("row");
        if let Some(id) = plot.id() {
            row.children.push(cell(ID_CELL, id.as_str()));
        }
        for (field, value) in plot.fields() {
            if value.is_empty() {
                continue;
            }
            row.children.push(cell(field.index() + 1, value));
        }
        if !plot.character_refs().is_empty() {
            let mut refs = cell(PLOT_CHARACTERS_CELL, "");
            for reference in plot.character_refs() {
                let mut ref_row = XmlElement::new("row");
                ref_row.children.push(cell(0, reference.as_str()));
                refs.children.push(ref_row);
            }
            row.children.push(refs);
        }
        if !plot.steps().is_empty() {
            let mut steps = cell(PLOT_STEPS_CELL, "");
            for step in plot.steps() {
                steps.children.push(step_row(step));
            }
            row.children.push(steps);
        }
        table.children.push(row);
    }
    table
}

fn step_row(step: &PlotStep) -> XmlElement {
    let mut row = XmlElement::new("row");
    if let Some(id) = step.id() {
        row.children.push(cell(ID_CELL, id.as_str()));
    }
    for (field, value) in step.fields() {
        if value.is_empty() {
            continue;
        }
        row.children.push(cell(field.index() + 1, value));
    }
    row
}

fn world_table(world: &WorldTree) -> XmlElement {
    let mut table = XmlElement::new("table");
    for item in world.children() {
        table.children.push(world_row(item));
    }
    table
}

fn world_row(item: &WorldItem) -> XmlElement {
    let mut row = XmlElement::new("row");
    if let Some(id) = item.id() {
        row.children.push(cell(ID_CELL, id.as_str()));
    }
    for (field, value) in item.fields() {
        if value.is_empty() {
            continue;
        }
        row.children.push(cell(field.index() + 1, value));
    }
    for child in item.children() {
        row.children.push(world_row(child));
    }
    row
}

/// The whole outline as one attribute tree, revisions embedded.
fn outline_document(outline: &OutlineTree) -> XmlElement {
    let mut root = XmlElement::new("root");
    for item in outline.children() {
        root.children.push(outline_element(item));
    }
    root
}

fn outline_element(item: &OutlineItem) -> XmlElement {
    let mut element = XmlElement::new("outlineItem");
    element.set_attr(TAG_TITLE, item.title());
    if let Some(id) = item.id() {
        element.set_attr(TAG_ID, id.as_str());
    }
    element.set_attr(TAG_TYPE, item.kind().as_str());
    for (field, value) in item.attributes() {
        if !field.persisted() || (value.is_empty() && !field.forced()) {
            continue;
        }
        element.set_attr(field.tag(), value);
    }
    if !item.body().is_empty() {
        element.set_attr(TAG_TEXT, item.body());
    }
    element.children.extend(revision_elements(item));
    for child in item.children() {
        element.children.push(outline_element(child));
    }
    element
}
