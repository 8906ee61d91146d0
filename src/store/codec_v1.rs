// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The current project layout, one readable file per document.
//!
//! ```text
//! VERSION                   format generation, "1"
//! infos.txt, summary.txt    key/value metadata
//! labels.txt, status.txt    one tag per line, "name: color"
//! characters/<id>-<slug>.txt
//! outline/<idx>-<slug>.md   documents; folders are directories with a
//! outline/<idx>-<slug>/       folder.txt marker inside
//! revisions.xml             history, only written when revisions exist
//! world.opml, plots.xml     structured trees
//! settings.txt              opaque application settings
//! ```
//!
//! Loading is tolerant: a broken entry is logged, pushed onto the project's
//! loading errors, and its component falls back to empty. Saving produces a
//! [`SavePlan`] so the folder writer can skip unchanged entries and turn
//! retitled items into renames.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{error, warn};

use crate::format::metatext::{parse_metatext, push_field};
use crate::format::xml::{parse_xml, write_xml, XmlElement};
use crate::model::fields::{
    CharacterField, InfoField, OutlineField, PlotField, StepField, SummaryField, WorldField,
    TAG_COLOR, TAG_ID, TAG_TITLE, TAG_TYPE,
};
use crate::model::{
    Character, CharacterId, ItemId, ItemKind, OutlineItem, OutlineTree, Plot, PlotId, PlotStep,
    Project, StepId, Tag, WorldId, WorldItem, WorldTree,
};

use super::backend::StorageBackend;
use super::incremental::SavePlan;
use super::StoreError;

pub(crate) const VERSION_ENTRY: &str = "VERSION";
const INFOS_ENTRY: &str = "infos.txt";
const SUMMARY_ENTRY: &str = "summary.txt";
const LABELS_ENTRY: &str = "labels.txt";
const STATUS_ENTRY: &str = "status.txt";
const SETTINGS_ENTRY: &str = "settings.txt";
const PLOTS_ENTRY: &str = "plots.xml";
const WORLD_ENTRY: &str = "world.opml";
const REVISIONS_ENTRY: &str = "revisions.xml";
const CHARACTERS_DIR: &str = "characters";
const OUTLINE_DIR: &str = "outline";
const FOLDER_MARKER: &str = "folder.txt";

const PAD_INFO: usize = 15;
const PAD_SUMMARY: usize = 12;
const PAD_CHARACTER: usize = 20;
const PAD_TAG: usize = 20;

// ---------------------------------------------------------------------------
// loading

pub(crate) fn load_into(project: &mut Project, backend: &StorageBackend) -> Result<(), StoreError> {
    let names = backend.entries()?;

    if backend.contains(VERSION_ENTRY) {
        // Only read to prime the write cache.
        read_entry(project, backend, VERSION_ENTRY);
    }
    if backend.contains(SETTINGS_ENTRY) {
        if let Some(text) = read_entry(project, backend, SETTINGS_ENTRY) {
            project.set_settings(text);
        }
    }
    if backend.contains(INFOS_ENTRY) {
        if let Some(text) = read_entry(project, backend, INFOS_ENTRY) {
            load_infos(project, &text);
        }
    }
    if backend.contains(SUMMARY_ENTRY) {
        if let Some(text) = read_entry(project, backend, SUMMARY_ENTRY) {
            load_summary(project, &text);
        }
    }
    if backend.contains(LABELS_ENTRY) {
        if let Some(text) = read_entry(project, backend, LABELS_ENTRY) {
            *project.labels_mut() = parse_tags(&text);
        }
    }
    if backend.contains(STATUS_ENTRY) {
        if let Some(text) = read_entry(project, backend, STATUS_ENTRY) {
            *project.statuses_mut() = parse_tags(&text);
        }
    }

    let mut character_entries: Vec<String> = names
        .iter()
        .filter(|name| name.strip_prefix(CHARACTERS_DIR).is_some_and(|rest| rest.starts_with('/')))
        .cloned()
        .collect();
    // Character filenames are "<id>-<slug>.txt" without zero padding, so the
    // sorted entry listing interleaves "10-" between "1-" and "2-". Order by
    // the numeric id to restore the authored sequence.
    character_entries.sort_by(|a, b| character_order_key(a).cmp(&character_order_key(b)));
    for name in character_entries {
        if let Some(text) = read_entry(project, backend, &name) {
            let character = parse_character_file(&name, &text);
            project.characters_mut().push(character);
        }
    }

    if backend.contains(WORLD_ENTRY) {
        if let Some(text) = read_entry(project, backend, WORLD_ENTRY) {
            match parse_world(&text) {
                Ok(world) => *project.world_mut() = world,
                Err(err) => note_failure(project, WORLD_ENTRY, &err),
            }
        }
    }
    if backend.contains(PLOTS_ENTRY) {
        if let Some(text) = read_entry(project, backend, PLOTS_ENTRY) {
            match parse_plots(&text) {
                Ok(plots) => *project.plots_mut() = plots,
                Err(err) => note_failure(project, PLOTS_ENTRY, &err),
            }
        }
    }

    let outline_names: Vec<String> = names
        .iter()
        .filter(|name| name.strip_prefix(OUTLINE_DIR).is_some_and(|rest| rest.starts_with('/')))
        .cloned()
        .collect();
    let mut outline_files = Vec::new();
    for name in outline_names {
        if let Some(text) = read_entry(project, backend, &name) {
            outline_files.push((name, text));
        }
    }
    let mut errors = Vec::new();
    *project.outline_mut() = build_outline(&outline_files, &mut errors);
    project.loading_errors_mut().extend(errors);

    if backend.contains(REVISIONS_ENTRY) {
        if let Some(text) = read_entry(project, backend, REVISIONS_ENTRY) {
            overlay_revisions(project, &text);
        }
    }

    project.outline_mut().check_ids();
    verify_plot_refs(project);
    Ok(())
}

/// Reads one entry, priming the write cache with its bytes. A failure is
/// recorded on the project and returns `None`.
fn read_entry(project: &mut Project, backend: &StorageBackend, name: &str) -> Option<String> {
    match backend.read_utf8(name) {
        Ok(text) => {
            project
                .write_cache_mut()
                .record(name, text.as_bytes().to_vec());
            Some(text)
        }
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

fn load_infos(project: &mut Project, text: &str) {
    for (key, value) in parse_metatext(text).fields {
        match InfoField::from_tag(&key) {
            Some(field) => project.set_info(field, value),
            None => warn!(key = %key, "unknown info field ignored"),
        }
    }
}

fn load_summary(project: &mut Project, text: &str) {
    for (key, value) in parse_metatext(text).fields {
        match SummaryField::from_tag(&key) {
            Some(field) => project.set_summary(field, value),
            None => warn!(key = %key, "unknown summary field ignored"),
        }
    }
}

/// One tag per line, the color after the first colon. Lines without a colon
/// are colorless tags.
fn parse_tags(text: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((name, color)) => {
                let color = color.trim();
                if color.is_empty() {
                    tags.push(Tag::new(name));
                } else {
                    tags.push(Tag::with_color(name, color));
                }
            }
            None => tags.push(Tag::new(line)),
        }
    }
    tags
}

/// Numeric id prefix first, non-numeric ids after, full name as tiebreak.
fn character_order_key(name: &str) -> (u64, &str) {
    let stem = name.rsplit('/').next().unwrap_or(name);
    let id = stem
        .split('-')
        .next()
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(u64::MAX);
    (id, name)
}

fn parse_character_file(name: &str, text: &str) -> Character {
    let doc = parse_metatext(text);
    let mut character = Character::default();
    let mut seen_color = false;
    for (key, value) in &doc.fields {
        match key.as_str() {
            TAG_ID => match CharacterId::new(value.clone()) {
                Ok(id) => character.set_id(Some(id)),
                Err(err) => warn!(entry = name, value = %value, error = %err, "ignoring invalid character id"),
            },
            TAG_COLOR if !seen_color => {
                seen_color = true;
                character.set_color(Some(value.clone()));
            }
            _ => {
                if let Some(field) = CharacterField::from_tag(key) {
                    character.set_field(field, value.clone());
                } else {
                    // Anything the fixed table does not know is a detail
                    // sheet entry, including repeated Color lines.
                    character.push_info(key.clone(), value.clone());
                }
            }
        }
    }
    character.set_last_path(Some(name.to_owned()));
    character
}

fn build_outline(files: &[(String, String)], errors: &mut Vec<String>) -> OutlineTree {
    let stripped: Vec<(&str, &str)> = files
        .iter()
        .filter_map(|(name, text)| {
            name.strip_prefix(OUTLINE_DIR)
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| (rest, text.as_str()))
        })
        .collect();

    let mut tree = OutlineTree::new();
    *tree.children_mut() = build_outline_level(stripped, OUTLINE_DIR, errors);
    tree
}

enum Slot<'a> {
    File(&'a str),
    Dir(Vec<(&'a str, &'a str)>),
}

fn build_outline_level(
    files: Vec<(&str, &str)>,
    prefix: &str,
    errors: &mut Vec<String>,
) -> Vec<OutlineItem> {
    let mut slots: BTreeMap<&str, Slot> = BTreeMap::new();
    for (path, content) in files {
        match path.split_once('/') {
            None => {
                if slots.insert(path, Slot::File(content)).is_some() {
                    warn!(entry = path, "conflicting outline entries");
                }
            }
            Some((dir, rest)) => match slots.entry(dir).or_insert_with(|| Slot::Dir(Vec::new())) {
                Slot::Dir(children) => children.push((rest, content)),
                Slot::File(_) => warn!(entry = path, "conflicting outline entries"),
            },
        }
    }

    let mut items = Vec::new();
    for (name, slot) in slots {
        let full = format!("{prefix}/{name}");
        match slot {
            Slot::File(content) => {
                let mut item = parse_outline_document(content);
                item.set_last_path(Some(full));
                items.push(item);
            }
            Slot::Dir(children) => {
                let mut marker = None;
                let mut rest = Vec::new();
                for (path, content) in children {
                    if path == FOLDER_MARKER {
                        marker = Some(content);
                    } else {
                        rest.push((path, content));
                    }
                }
                match marker {
                    Some(content) => {
                        let mut item = parse_outline_document(content);
                        item.set_kind(ItemKind::Folder);
                        item.set_last_path(Some(full.clone()));
                        *item.children_mut() = build_outline_level(rest, &full, errors);
                        items.push(item);
                    }
                    None => {
                        warn!(directory = %full, "outline directory without folder marker skipped");
                        errors.push(format!("{full}: directory has no {FOLDER_MARKER}"));
                    }
                }
            }
        }
    }
    items
}

fn parse_outline_document(src: &str) -> OutlineItem {
    let doc = parse_metatext(src);
    let mut item = OutlineItem::document("");
    for (key, value) in &doc.fields {
        match key.as_str() {
            TAG_TITLE => item.set_title(value.clone()),
            TAG_ID => match ItemId::new(value.clone()) {
                Ok(id) => item.set_id(Some(id)),
                Err(err) => warn!(value = %value, error = %err, "ignoring invalid outline id"),
            },
            TAG_TYPE => match ItemKind::from_token(value) {
                Some(kind) => item.set_kind(kind),
                None => warn!(token = %value, "unknown outline type, keeping document"),
            },
            _ => match OutlineField::from_tag(key) {
                Some(field) => item.set_attribute(field, value.clone()),
                None => warn!(key = %key, "unknown outline field ignored"),
            },
        }
    }
    item.set_body(doc.body);
    item
}

fn overlay_revisions(project: &mut Project, text: &str) {
    let root = match parse_xml(text) {
        Ok(root) => root,
        Err(err) => {
            let err = StoreError::MalformedEntry {
                name: REVISIONS_ENTRY.to_owned(),
                detail: err.to_string(),
            };
            note_failure(project, REVISIONS_ENTRY, &err);
            return;
        }
    };
    let mut errors = Vec::new();
    overlay_item(project.outline_mut(), &root, &mut errors);
    project.loading_errors_mut().extend(errors);
}

fn overlay_item(tree: &mut OutlineTree, element: &XmlElement, errors: &mut Vec<String>) {
    if element.name == "outlineItem" {
        match element.attr(TAG_ID).and_then(|raw| ItemId::new(raw).ok()) {
            Some(id) => match tree.find_mut(&id) {
                Some(item) => collect_revisions(element, item),
                None => {
                    error!(id = %id, "revision history references an item that does not exist");
                    errors.push(format!("{REVISIONS_ENTRY}: no outline item with id '{id}'"));
                }
            },
            None => warn!("outlineItem without a usable ID in revision history"),
        }
    }
    for child in &element.children {
        overlay_item(tree, child, errors);
    }
}

/// Pushes the `<revision>` children of `element` onto `item`.
pub(super) fn collect_revisions(element: &XmlElement, item: &mut OutlineItem) {
    for revision in element.children.iter().filter(|c| c.name == "revision") {
        match revision.attr("timestamp").and_then(|raw| raw.parse::<u64>().ok()) {
            Some(timestamp) => {
                item.push_revision(timestamp, revision.attr("text").unwrap_or_default());
            }
            None => warn!("revision without a usable timestamp skipped"),
        }
    }
}

fn parse_plots(text: &str) -> Result<Vec<Plot>, StoreError> {
    let root = parse_xml(text).map_err(|err| StoreError::MalformedEntry {
        name: PLOTS_ENTRY.to_owned(),
        detail: err.to_string(),
    })?;
    if root.name != "root" {
        warn!(element = %root.name, "unexpected root element in plots document");
    }

    let mut plots = Vec::new();
    for element in &root.children {
        if element.name != "plot" {
            warn!(element = %element.name, "unexpected element in plots document");
            continue;
        }
        let mut plot = Plot::default();
        for (name, value) in &element.attributes {
            match name.as_str() {
                TAG_ID => match PlotId::new(value.clone()) {
                    Ok(id) => plot.set_id(Some(id)),
                    Err(err) => warn!(value = %value, error = %err, "ignoring invalid plot id"),
                },
                "characters" => {
                    for raw in value.split(',') {
                        let raw = raw.trim();
                        if raw.is_empty() {
                            continue;
                        }
                        match CharacterId::new(raw) {
                            Ok(id) => plot.character_refs_mut().push(id),
                            Err(err) => {
                                warn!(value = raw, error = %err, "ignoring invalid character reference")
                            }
                        }
                    }
                }
                _ => match PlotField::from_tag(name) {
                    Some(field) => plot.set_field(field, value.clone()),
                    None => warn!(attribute = %name, "unknown plot attribute ignored"),
                },
            }
        }
        for step_element in &element.children {
            if step_element.name != "step" {
                warn!(element = %step_element.name, "unexpected element in plot");
                continue;
            }
            let mut step = PlotStep::default();
            for (name, value) in &step_element.attributes {
                match name.as_str() {
                    TAG_ID => match StepId::new(value.clone()) {
                        Ok(id) => step.set_id(Some(id)),
                        Err(err) => warn!(value = %value, error = %err, "ignoring invalid step id"),
                    },
                    // The encoder writes every step column even when blank;
                    // skipping empties keeps a sparse step sparse on reload.
                    _ => match StepField::from_tag(name) {
                        Some(field) if !value.is_empty() => {
                            step.set_field(field, value.clone())
                        }
                        Some(_) => {}
                        None => warn!(attribute = %name, "unknown step attribute ignored"),
                    },
                }
            }
            plot.steps_mut().push(step);
        }
        plots.push(plot);
    }
    Ok(plots)
}

fn parse_world(text: &str) -> Result<WorldTree, StoreError> {
    let root = parse_xml(text).map_err(|err| StoreError::MalformedEntry {
        name: WORLD_ENTRY.to_owned(),
        detail: err.to_string(),
    })?;
    if root.name != "opml" {
        warn!(element = %root.name, "unexpected root element in world document");
    }

    let mut tree = WorldTree::new();
    match root.find_child("body") {
        Some(body) => {
            *tree.children_mut() = body.children.iter().filter_map(parse_world_item).collect();
        }
        None => warn!("world document has no body element"),
    }
    Ok(tree)
}

fn parse_world_item(element: &XmlElement) -> Option<WorldItem> {
    if element.name != "outline" {
        warn!(element = %element.name, "unexpected element in world document");
        return None;
    }
    let mut item = WorldItem::default();
    for (name, value) in &element.attributes {
        match name.as_str() {
            TAG_ID => match WorldId::new(value.clone()) {
                Ok(id) => item.set_id(Some(id)),
                Err(err) => warn!(value = %value, error = %err, "ignoring invalid world id"),
            },
            _ => match WorldField::from_tag(name) {
                Some(field) => item.set_field(field, value.clone()),
                None => warn!(attribute = %name, "unknown world attribute ignored"),
            },
        }
    }
    *item.children_mut() = element.children.iter().filter_map(parse_world_item).collect();
    Some(item)
}

pub(super) fn verify_plot_refs(project: &Project) {
    for plot in project.plots() {
        for reference in plot.character_refs() {
            if project.character(reference).is_none() {
                warn!(plot = %plot.name(), character = %reference, "plot references an unknown character");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// saving

/// Turns the project into the full set of entries a save wants on disk,
/// recording renames against where items sat before and updating each
/// item's remembered path.
pub(crate) fn encode(project: &mut Project) -> SavePlan {
    let mut plan = SavePlan::default();
    plan.entries
        .push((VERSION_ENTRY.to_owned(), b"1".to_vec()));
    plan.entries
        .push((INFOS_ENTRY.to_owned(), encode_infos(project).into_bytes()));
    plan.entries.push((
        SUMMARY_ENTRY.to_owned(),
        encode_summary(project).into_bytes(),
    ));
    plan.entries.push((
        STATUS_ENTRY.to_owned(),
        encode_tags(project.statuses()).into_bytes(),
    ));
    plan.entries.push((
        LABELS_ENTRY.to_owned(),
        encode_tags(project.labels()).into_bytes(),
    ));
    plan_characters(project, &mut plan);
    plan_outline(project, &mut plan);
    plan_revisions(project, &mut plan);
    plan.entries.push((
        WORLD_ENTRY.to_owned(),
        write_xml(&world_element(project.world())).into_bytes(),
    ));
    plan.entries.push((
        PLOTS_ENTRY.to_owned(),
        write_xml(&plots_element(project.plots())).into_bytes(),
    ));
    plan.entries.push((
        SETTINGS_ENTRY.to_owned(),
        project.settings().as_bytes().to_vec(),
    ));
    plan
}

fn encode_infos(project: &Project) -> String {
    let mut out = String::new();
    for (field, value) in project.infos() {
        if value.is_empty() {
            continue;
        }
        push_field(&mut out, field.tag(), value, PAD_INFO);
    }
    out
}

fn encode_summary(project: &Project) -> String {
    let mut out = String::new();
    for (field, value) in project.summaries() {
        if value.is_empty() {
            continue;
        }
        push_field(&mut out, field.tag(), value, PAD_SUMMARY);
    }
    out
}

fn encode_tags(tags: &[Tag]) -> String {
    let mut out = String::new();
    for tag in tags {
        out.push_str(tag.text());
        if let Some(color) = tag.color() {
            out.push(':');
            let used = tag.text().chars().count();
            for _ in used..PAD_TAG {
                out.push(' ');
            }
            out.push_str(color);
        }
        out.push('\n');
    }
    out
}

fn plan_characters(project: &mut Project, plan: &mut SavePlan) {
    mint_character_ids(project.characters_mut());
    for character in project.characters_mut().iter_mut() {
        let id = character
            .id()
            .expect("character ids are minted before planning")
            .as_str()
            .to_owned();
        let slug = slug_or(character.name(), "unnamed");
        let path = format!("{CHARACTERS_DIR}/{id}-{slug}.txt");
        let content = encode_character(character, &id);
        if let Some(old) = character.last_path() {
            if old != path {
                plan.moves.push((old.to_owned(), path.clone()));
            }
        }
        character.set_last_path(Some(path.clone()));
        plan.entries.push((path, content.into_bytes()));
    }
}

fn mint_character_ids(characters: &mut [Character]) {
    let mut used: BTreeSet<String> = characters
        .iter()
        .filter_map(|c| c.id().map(|id| id.as_str().to_owned()))
        .collect();
    let mut next: u64 = characters
        .iter()
        .filter_map(|c| c.id().and_then(CharacterId::as_number))
        .max()
        .map_or(1, |max| max.saturating_add(1));
    for character in characters.iter_mut() {
        if character.id().is_some() {
            continue;
        }
        while used.contains(&next.to_string()) {
            next = next.wrapping_add(1);
        }
        let id = CharacterId::new(next.to_string()).expect("numeric ids are never empty");
        used.insert(id.as_str().to_owned());
        character.set_id(Some(id));
        next = next.wrapping_add(1);
    }
}

fn encode_character(character: &Character, id: &str) -> String {
    let mut out = String::new();
    if !character.name().is_empty() {
        push_field(
            &mut out,
            CharacterField::Name.tag(),
            character.name(),
            PAD_CHARACTER,
        );
    }
    push_field(&mut out, TAG_ID, id, PAD_CHARACTER);
    if let Some(color) = character.color() {
        push_field(&mut out, TAG_COLOR, color, PAD_CHARACTER);
    }
    for (field, value) in character.fields() {
        if *field == CharacterField::Name || value.is_empty() {
            continue;
        }
        push_field(&mut out, field.tag(), value, PAD_CHARACTER);
    }
    for info in character.infos() {
        push_field(&mut out, info.description(), info.value(), PAD_CHARACTER);
    }
    out
}

fn plan_outline(project: &mut Project, plan: &mut SavePlan) {
    project.outline_mut().check_ids();
    plan_outline_level(project.outline_mut().children_mut(), OUTLINE_DIR, plan);
}

fn plan_outline_level(items: &mut Vec<OutlineItem>, prefix: &str, plan: &mut SavePlan) {
    let width = items.len().to_string().chars().count();

    // Sibling slugs that collide get the item id appended so filenames
    // stay unique.
    let mut slugs: Vec<String> = items
        .iter()
        .map(|item| slug_or(item.title(), "untitled"))
        .collect();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for slug in &slugs {
        *counts.entry(slug.as_str()).or_default() += 1;
    }
    let duplicated: BTreeSet<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(slug, _)| slug.to_owned())
        .collect();
    for (slug, item) in slugs.iter_mut().zip(items.iter()) {
        if duplicated.contains(slug.as_str()) {
            if let Some(id) = item.id() {
                slug.push('-');
                slug.push_str(id.as_str());
            }
        }
    }

    for (index, item) in items.iter_mut().enumerate() {
        let slug = &slugs[index];
        let base = format!("{prefix}/{index:0width$}-{slug}");
        if item.is_folder() {
            let marker = format!("{base}/{FOLDER_MARKER}");
            if let Some(old) = item.last_path() {
                if old != base {
                    plan.moves.push((old.to_owned(), base.clone()));
                }
            }
            item.set_last_path(Some(base.clone()));
            plan.entries.push((marker, encode_outline_item(item).into_bytes()));
            plan_outline_level(item.children_mut(), &base, plan);
        } else {
            let path = format!("{base}.md");
            if let Some(old) = item.last_path() {
                if old != path {
                    plan.moves.push((old.to_owned(), path.clone()));
                }
            }
            item.set_last_path(Some(path.clone()));
            plan.entries.push((path, encode_outline_item(item).into_bytes()));
        }
    }
}

fn encode_outline_item(item: &OutlineItem) -> String {
    let mut out = String::new();
    push_field(&mut out, TAG_TITLE, item.title(), PAD_INFO);
    if let Some(id) = item.id() {
        push_field(&mut out, TAG_ID, id.as_str(), PAD_INFO);
    }
    push_field(&mut out, TAG_TYPE, item.kind().as_str(), PAD_INFO);
    for (field, value) in item.attributes() {
        if !field.persisted() {
            continue;
        }
        if value.is_empty() && !field.forced() {
            continue;
        }
        push_field(&mut out, field.tag(), value, PAD_INFO);
    }
    out.push('\n');
    out.push('\n');
    out.push_str(item.body());
    out
}

fn plan_revisions(project: &Project, plan: &mut SavePlan) {
    let mut root = XmlElement::new("root");
    for item in project.outline().children() {
        if let Some(element) = revisions_element(item) {
            root.children.push(element);
        }
    }
    if root.children.is_empty() {
        return;
    }
    plan.entries
        .push((REVISIONS_ENTRY.to_owned(), write_xml(&root).into_bytes()));
}

fn revisions_element(item: &OutlineItem) -> Option<XmlElement> {
    let nested: Vec<XmlElement> = item
        .children()
        .iter()
        .filter_map(revisions_element)
        .collect();
    if item.revisions().is_empty() && nested.is_empty() {
        return None;
    }

    let mut element = XmlElement::new("outlineItem");
    if let Some(id) = item.id() {
        element.set_attr(TAG_ID, id.as_str());
    }
    element.children.extend(revision_elements(item));
    element.children.extend(nested);
    Some(element)
}

/// The `<revision>` elements for one item's history.
pub(super) fn revision_elements(item: &OutlineItem) -> Vec<XmlElement> {
    item.revisions()
        .iter()
        .map(|revision| {
            let mut element = XmlElement::new("revision");
            element.set_attr("timestamp", revision.timestamp().to_string());
            element.set_attr("text", revision.text());
            element
        })
        .collect()
}

fn world_element(world: &WorldTree) -> XmlElement {
    let mut root = XmlElement::new("opml");
    root.set_attr("version", "1.0");
    let mut body = XmlElement::new("body");
    for item in world.children() {
        body.children.push(world_item_element(item));
    }
    root.children.push(body);
    root
}

fn world_item_element(item: &WorldItem) -> XmlElement {
    let mut element = XmlElement::new("outline");
    for (field, value) in item.fields() {
        if value.is_empty() {
            continue;
        }
        element.set_attr(field.tag(), value);
    }
    if let Some(id) = item.id() {
        element.set_attr(TAG_ID, id.as_str());
    }
    for child in item.children() {
        element.children.push(world_item_element(child));
    }
    element
}

fn plots_element(plots: &[Plot]) -> XmlElement {
    let mut root = XmlElement::new("root");
    for plot in plots {
        let mut element = XmlElement::new("plot");
        if let Some(id) = plot.id() {
            element.set_attr(TAG_ID, id.as_str());
        }
        for (field, value) in plot.fields() {
            if value.is_empty() {
                continue;
            }
            element.set_attr(field.tag(), value);
        }
        if !plot.character_refs().is_empty() {
            let joined = plot
                .character_refs()
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(",");
            element.set_attr("characters", joined);
        }
        for step in plot.steps() {
            let mut step_element = XmlElement::new("step");
            if let Some(id) = step.id() {
                step_element.set_attr(TAG_ID, id.as_str());
            }
            // Step attributes are written even when empty.
            for field in StepField::ALL {
                step_element.set_attr(field.tag(), step.field(field).unwrap_or_default());
            }
            element.children.push(step_element);
        }
        root.children.push(element);
    }
    root
}

// ---------------------------------------------------------------------------

static SLUG_WHITESPACE: OnceLock<Regex> = OnceLock::new();
static SLUG_NON_WORD: OnceLock<Regex> = OnceLock::new();

/// Whitespace runs become `_`, anything else outside `\w` becomes `-`.
fn slugify(title: &str) -> String {
    let whitespace = SLUG_WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"));
    let non_word = SLUG_NON_WORD.get_or_init(|| Regex::new(r"\W").expect("static pattern"));
    let underscored = whitespace.replace_all(title.trim(), "_");
    non_word.replace_all(&underscored, "-").into_owned()
}

fn slug_or(title: &str, fallback: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        fallback.to_owned()
    } else {
        slug
    }
}
