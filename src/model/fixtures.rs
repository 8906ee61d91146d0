// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::character::Character;
use super::fields::{
    CharacterField, InfoField, OutlineField, PlotField, StepField, SummaryField, WorldField,
};
use super::ids::{CharacterId, PlotId, StepId, WorldId};
use super::outline::OutlineItem;
use super::plot::{Plot, PlotStep};
use super::project::{Project, Tag};
use super::world::WorldItem;

fn cid(value: &str) -> CharacterId {
    CharacterId::new(value).expect("character id")
}

/// A filled project touching every component: info and summary fields,
/// colored and colorless tags, two characters (one with extras), one plot
/// with two steps, a nested world tree, and a three-document outline with
/// one revision.
pub(crate) fn sample_project() -> Project {
    let mut project = Project::new();

    project.set_info(InfoField::Title, "The Hollow Crown");
    project.set_info(InfoField::Author, "R. Quill");
    project.set_info(InfoField::Genre, "Fantasy");
    project.set_summary(
        SummaryField::Sentence,
        "A cartographer inherits a map that redraws itself.",
    );
    project.set_summary(
        SummaryField::Paragraph,
        "Mara Voss inherits her uncle's map shop and, with it, a chart\nthat quietly rewrites the coastlines it depicts.",
    );

    project.labels_mut().push(Tag::with_color("Urgent", "#ff0000"));
    project.labels_mut().push(Tag::new("Idea"));
    project.statuses_mut().push(Tag::new("Draft"));
    project
        .statuses_mut()
        .push(Tag::with_color("Final", "#00ff00"));

    let mut mara = Character::new("Mara Voss");
    mara.set_id(Some(cid("1")));
    mara.set_color(Some("#aa3377".to_owned()));
    mara.set_field(CharacterField::Importance, "2");
    mara.set_field(CharacterField::Motivation, "Find the original map");
    mara.set_field(
        CharacterField::PhraseSummary,
        "A cartographer who cannot stop correcting the world",
    );
    mara.push_info("Home", "Port Ilen");
    mara.push_info("Secret", "Reads dead languages");
    project.characters_mut().push(mara);

    let mut brack = Character::new("Brack");
    brack.set_id(Some(cid("4")));
    brack.set_field(CharacterField::Importance, "0");
    project.characters_mut().push(brack);

    let mut plot = Plot::new("The redrawn coast");
    plot.set_id(Some(PlotId::new("1").expect("plot id")));
    plot.set_field(PlotField::Description, "The map erases a coastline overnight.");
    plot.set_field(PlotField::Result, "Mara sails to the missing coast.");
    plot.character_refs_mut().push(cid("1"));
    plot.character_refs_mut().push(cid("4"));
    let mut discovery = PlotStep::new("Discovery");
    discovery.set_id(Some(StepId::new("1").expect("step id")));
    discovery.set_field(
        StepField::Summary,
        "The harbor chart no longer matches the harbor.",
    );
    plot.steps_mut().push(discovery);
    let mut departure = PlotStep::new("Departure");
    departure.set_id(Some(StepId::new("2").expect("step id")));
    plot.steps_mut().push(departure);
    project.plots_mut().push(plot);

    let mut realm = WorldItem::new("Kingdom of Ash");
    realm.set_id(Some(WorldId::new("1").expect("world id")));
    realm.set_field(WorldField::Description, "Volcanic archipelago.");
    let mut port = WorldItem::new("Port Ilen");
    port.set_id(Some(WorldId::new("2").expect("world id")));
    port.set_field(WorldField::Passion, "Trade above all");
    realm.children_mut().push(port);
    project.world_mut().children_mut().push(realm);

    let mut part = OutlineItem::folder("Part One");
    let mut chapter_one = OutlineItem::document("Chapter 1");
    chapter_one.set_body("The map arrived on a Tuesday, rolled in oilcloth.\n");
    chapter_one.set_attribute(OutlineField::Label, "1");
    chapter_one.set_attribute(OutlineField::Status, "2");
    chapter_one.set_attribute(OutlineField::Compile, "2");
    chapter_one.set_attribute(OutlineField::Goal, "2000");
    chapter_one.push_revision(1_700_000_000, "The map arrived on a Tuesday.");
    let mut chapter_two = OutlineItem::document("Chapter 2");
    chapter_two.set_body("Nobody in Port Ilen would buy it back.\n");
    chapter_two.set_attribute(OutlineField::Pov, "1");
    part.children_mut().extend([chapter_one, chapter_two]);

    project.outline_mut().append(None, part).expect("append part");
    project
        .outline_mut()
        .append(None, OutlineItem::document("Epilogue"))
        .expect("append epilogue");

    project.set_settings("{\n  \"fontSize\": 12,\n  \"spellcheck\": true\n}\n");
    project
}
