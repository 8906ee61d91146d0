// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use calliope::format::metatext::MetaText;
use calliope::format::xml::XmlElement;
use calliope::model::Project;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("calliope_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

const WORDS: [&str; 12] = [
    "tide", "lantern", "mudflat", "charter", "keeper", "vessel", "signal", "quay", "saltgrass",
    "beacon", "moorline", "harbour",
];

/// Deterministic prose: `count` words from a fixed ring, sentence breaks
/// every eleven words, paragraph breaks every fifty-five.
pub fn prose(count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(count * 8);
    for i in 0..count {
        if i > 0 {
            if i % 55 == 0 {
                out.push_str(".\n\n");
            } else if i % 11 == 0 {
                out.push_str(". ");
            } else {
                out.push(' ');
            }
        }
        out.push_str(WORDS[i % WORDS.len()]);
    }
    out.push_str(".\n");
    out
}

pub fn checksum_metatext(doc: &MetaText) -> u64 {
    let mut acc = 0u64;
    for (key, value) in &doc.fields {
        acc = acc.wrapping_mul(131).wrapping_add(key.len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(value.len() as u64);
    }
    acc.wrapping_mul(131).wrapping_add(doc.body.len() as u64)
}

pub fn checksum_xml(element: &XmlElement) -> u64 {
    let mut acc = element.name.len() as u64;
    for (key, value) in &element.attributes {
        acc = acc.wrapping_mul(131).wrapping_add(key.len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(value.len() as u64);
    }
    acc = acc.wrapping_mul(131).wrapping_add(element.text.len() as u64);
    for child in &element.children {
        acc = acc.wrapping_mul(131).wrapping_add(checksum_xml(child));
    }
    acc
}

pub fn checksum_project(project: &Project) -> u64 {
    let mut acc = 0u64;
    for (_, value) in project.infos() {
        acc = acc.wrapping_mul(131).wrapping_add(value.len() as u64);
    }
    for (_, value) in project.summaries() {
        acc = acc.wrapping_mul(131).wrapping_add(value.len() as u64);
    }
    acc = acc.wrapping_mul(131).wrapping_add(project.labels().len() as u64);
    acc = acc.wrapping_mul(131).wrapping_add(project.statuses().len() as u64);
    for character in project.characters() {
        acc = acc.wrapping_mul(131).wrapping_add(character.name().len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(character.fields().len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(character.infos().len() as u64);
    }
    for plot in project.plots() {
        acc = acc.wrapping_mul(131).wrapping_add(plot.name().len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(plot.character_refs().len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(plot.steps().len() as u64);
    }
    acc = acc.wrapping_mul(131).wrapping_add(project.world().len() as u64);
    for (item, depth) in project.outline().walk() {
        acc = acc.wrapping_mul(131).wrapping_add(item.title().len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(item.body().len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(depth as u64);
    }
    acc.wrapping_mul(131)
        .wrapping_add(project.settings().len() as u64)
}

pub mod metatext {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DocParams {
        pub fields: usize,
        pub value_words: usize,
        pub body_words: usize,
    }

    impl DocParams {
        pub const fn new(fields: usize, value_words: usize, body_words: usize) -> Self {
            Self {
                fields,
                value_words,
                body_words,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Case {
        SheetSmall,
        SheetWide,
        ChapterLong,
    }

    impl Case {
        pub const fn id(self) -> &'static str {
            match self {
                Self::SheetSmall => "sheet_small",
                Self::SheetWide => "sheet_wide",
                Self::ChapterLong => "chapter_long",
            }
        }

        pub const fn params(self) -> DocParams {
            match self {
                Self::SheetSmall => DocParams::new(8, 6, 0),
                Self::SheetWide => DocParams::new(40, 30, 0),
                Self::ChapterLong => DocParams::new(6, 4, 4000),
            }
        }
    }

    /// Deterministic document: numbered keys, multi-word values (so some
    /// values wrap into continuation lines), optional prose body.
    pub fn document(params: DocParams) -> MetaText {
        let mut doc = MetaText::new();
        for i in 0..params.fields {
            let value = if i % 3 == 2 {
                // Every third value carries an embedded newline.
                format!("{}\n{}", prose(params.value_words), prose(params.value_words))
            } else {
                prose(params.value_words)
            };
            doc.push(format!("Field {i:03}"), value.trim_end().to_owned());
        }
        doc.body = prose(params.body_words);
        doc
    }

    pub fn fixture(case: Case) -> MetaText {
        document(case.params())
    }
}

pub mod xml {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TableParams {
        pub rows: usize,
        pub cells_per_row: usize,
        pub nested_rows_per_cell: usize,
        pub text_words: usize,
    }

    impl TableParams {
        pub const fn new(
            rows: usize,
            cells_per_row: usize,
            nested_rows_per_cell: usize,
            text_words: usize,
        ) -> Self {
            Self {
                rows,
                cells_per_row,
                nested_rows_per_cell,
                text_words,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Case {
        Small,
        MediumNested,
        LargeLongText,
    }

    impl Case {
        pub const fn id(self) -> &'static str {
            match self {
                Self::Small => "small",
                Self::MediumNested => "medium_nested",
                Self::LargeLongText => "large_long_text",
            }
        }

        pub const fn params(self) -> TableParams {
            match self {
                Self::Small => TableParams::new(10, 5, 0, 4),
                Self::MediumNested => TableParams::new(60, 7, 4, 6),
                Self::LargeLongText => TableParams::new(200, 7, 2, 40),
            }
        }
    }

    /// Deterministic table in the legacy wire shape: rows of indexed cells,
    /// every third cell carrying nested rows.
    pub fn table(params: TableParams) -> XmlElement {
        let mut root = XmlElement::new("table");
        for r in 0..params.rows {
            let mut row = XmlElement::new("row");
            for c in 0..params.cells_per_row {
                let mut cell = XmlElement::new("cell");
                cell.set_attr("col", c.to_string());
                if params.nested_rows_per_cell > 0 && c % 3 == 2 {
                    for n in 0..params.nested_rows_per_cell {
                        let mut nested = XmlElement::new("row");
                        let mut inner = XmlElement::new("cell");
                        inner.set_attr("col", "0");
                        inner.text = format!("{r}-{n}");
                        nested.children.push(inner);
                        cell.children.push(nested);
                    }
                } else {
                    cell.text = prose(params.text_words).trim_end().to_owned();
                }
                row.children.push(cell);
            }
            root.children.push(row);
        }
        root
    }

    pub fn fixture(case: Case) -> XmlElement {
        table(case.params())
    }
}

pub mod project {
    use super::*;

    use calliope::model::{
        Character, CharacterField, CharacterId, InfoField, OutlineItem, Plot, PlotField, PlotStep,
        StepField, SummaryField, Tag, WorldField, WorldItem,
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProjectParams {
        pub parts: usize,
        pub chapters_per_part: usize,
        pub scenes_per_chapter: usize,
        pub words_per_scene: usize,
        pub characters: usize,
        pub plots: usize,
        pub world_regions: usize,
        pub places_per_region: usize,
    }

    impl ProjectParams {
        pub const fn new(
            parts: usize,
            chapters_per_part: usize,
            scenes_per_chapter: usize,
            words_per_scene: usize,
            characters: usize,
            plots: usize,
            world_regions: usize,
            places_per_region: usize,
        ) -> Self {
            Self {
                parts,
                chapters_per_part,
                scenes_per_chapter,
                words_per_scene,
                characters,
                plots,
                world_regions,
                places_per_region,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Case {
        Novella,
        Novel,
        Saga,
    }

    impl Case {
        pub const fn id(self) -> &'static str {
            match self {
                Self::Novella => "novella",
                Self::Novel => "novel",
                Self::Saga => "saga",
            }
        }

        pub const fn params(self) -> ProjectParams {
            match self {
                Self::Novella => ProjectParams::new(1, 4, 3, 150, 5, 2, 2, 3),
                Self::Novel => ProjectParams::new(3, 9, 4, 300, 20, 6, 4, 6),
                Self::Saga => ProjectParams::new(6, 12, 6, 450, 60, 15, 8, 10),
            }
        }
    }

    /// Deterministic manuscript generator. Ids are minted by the tree, so
    /// repeated calls produce identical projects.
    pub fn manuscript(params: ProjectParams) -> Project {
        let mut project = Project::new();

        project.set_info(InfoField::Title, "The Moorline Charter");
        project.set_info(InfoField::Author, "R. Quill");
        project.set_info(InfoField::Genre, "Fantasy");
        project.set_summary(SummaryField::Sentence, prose(12).trim_end().to_owned());
        project.set_summary(SummaryField::Paragraph, prose(60));

        for i in 0..4 {
            project
                .labels_mut()
                .push(Tag::with_color(format!("Label {i}"), format!("#{i:02x}{i:02x}40")));
            project.statuses_mut().push(Tag::new(format!("Status {i}")));
        }

        for i in 0..params.characters {
            let mut character = Character::new(format!("Character {i:03}"));
            character.set_color(Some(format!("#2040{:02x}", i % 256)));
            character.set_field(CharacterField::Motivation, prose(10).trim_end().to_owned());
            character.set_field(CharacterField::FullSummary, prose(80));
            character.push_info("Allegiance", format!("House {}", i % 7));
            project.characters_mut().push(character);
        }

        for i in 0..params.plots {
            let mut plot = Plot::new(format!("Plot line {i:02}"));
            plot.set_field(PlotField::Description, prose(40));
            for r in 0..3usize {
                let reference = (i * 3 + r) % params.characters.max(1) + 1;
                plot.character_refs_mut()
                    .push(CharacterId::new(reference.to_string()).expect("numeric id"));
            }
            for s in 0..4 {
                let mut step = PlotStep::new(format!("Step {s}"));
                step.set_field(StepField::Meta, format!("act {}", s + 1));
                step.set_field(StepField::Summary, prose(15).trim_end().to_owned());
                plot.steps_mut().push(step);
            }
            project.plots_mut().push(plot);
        }

        for r in 0..params.world_regions {
            let mut region = WorldItem::new(format!("Region {r:02}"));
            region.set_field(WorldField::Description, prose(30));
            for p in 0..params.places_per_region {
                let mut place = WorldItem::new(format!("Place {r:02}-{p:02}"));
                place.set_field(WorldField::Passion, prose(8).trim_end().to_owned());
                region.children_mut().push(place);
            }
            project.world_mut().children_mut().push(region);
        }

        for part in 0..params.parts {
            let part_id = project
                .outline_mut()
                .append(None, OutlineItem::folder(format!("Part {}", part + 1)))
                .expect("append part");
            for chapter in 0..params.chapters_per_part {
                let chapter_id = project
                    .outline_mut()
                    .append(
                        Some(&part_id),
                        OutlineItem::folder(format!("Chapter {}", chapter + 1)),
                    )
                    .expect("append chapter");
                for scene in 0..params.scenes_per_chapter {
                    let mut item = OutlineItem::document(format!("Scene {}", scene + 1));
                    item.set_body(prose(params.words_per_scene));
                    project
                        .outline_mut()
                        .append(Some(&chapter_id), item)
                        .expect("append scene");
                }
            }
        }

        project.set_settings("{\"fontSize\": 12, \"spellcheck\": true}\n");
        project
    }

    pub fn fixture(case: Case) -> Project {
        manuscript(case.params())
    }
}
