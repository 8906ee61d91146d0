// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Closed field tables for every persisted collection.
//!
//! Each enum carries a stable string tag (metadata keys and XML attribute
//! names) and, where the legacy positional wire needs one, a stable integer
//! index. Codecs look fields up by tag or explicit index, never by
//! declaration order, so extending a table cannot silently misalign
//! documents written by older builds.

/// Reserved metadata key for entity ids.
pub const TAG_ID: &str = "ID";
/// Reserved metadata key for the outline item title.
pub const TAG_TITLE: &str = "Title";
/// Reserved metadata key for the outline item kind.
pub const TAG_TYPE: &str = "Type";
/// Reserved character metadata key: the first occurrence is the icon color.
pub const TAG_COLOR: &str = "Color";
/// Attribute carrying a document body in tree-XML documents.
pub const TAG_TEXT: &str = "Text";

/// Book-level metadata fields (`infos.txt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InfoField {
    Title,
    Subtitle,
    Serie,
    Volume,
    Genre,
    License,
    Author,
    Email,
}

impl InfoField {
    pub const ALL: [InfoField; 8] = [
        Self::Title,
        Self::Subtitle,
        Self::Serie,
        Self::Volume,
        Self::Genre,
        Self::License,
        Self::Author,
        Self::Email,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Subtitle => "Subtitle",
            Self::Serie => "Serie",
            Self::Volume => "Volume",
            Self::Genre => "Genre",
            Self::License => "License",
            Self::Author => "Author",
            Self::Email => "Email",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.tag() == tag)
    }

    pub fn index(self) -> usize {
        match self {
            Self::Title => 0,
            Self::Subtitle => 1,
            Self::Serie => 2,
            Self::Volume => 3,
            Self::Genre => 4,
            Self::License => 5,
            Self::Author => 6,
            Self::Email => 7,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.index() == index)
    }
}

/// Story summary fields at increasing levels of detail (`summary.txt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SummaryField {
    Situation,
    Sentence,
    Paragraph,
    Page,
    Full,
}

impl SummaryField {
    pub const ALL: [SummaryField; 5] = [
        Self::Situation,
        Self::Sentence,
        Self::Paragraph,
        Self::Page,
        Self::Full,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Situation => "Situation",
            Self::Sentence => "Sentence",
            Self::Paragraph => "Paragraph",
            Self::Page => "Page",
            Self::Full => "Full",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.tag() == tag)
    }

    pub fn index(self) -> usize {
        match self {
            Self::Situation => 0,
            Self::Sentence => 1,
            Self::Paragraph => 2,
            Self::Page => 3,
            Self::Full => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.index() == index)
    }
}

/// Per-item outline attributes beyond title/id/kind.
///
/// `WordCount` and `GoalPercentage` are derived at runtime and never
/// persisted; `Compile` is written even when empty so the flag survives a
/// round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutlineField {
    Pov,
    Label,
    Status,
    Compile,
    Goal,
    SummarySentence,
    SummaryFull,
    WordCount,
    GoalPercentage,
}

impl OutlineField {
    pub const ALL: [OutlineField; 9] = [
        Self::Pov,
        Self::Label,
        Self::Status,
        Self::Compile,
        Self::Goal,
        Self::SummarySentence,
        Self::SummaryFull,
        Self::WordCount,
        Self::GoalPercentage,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Pov => "POV",
            Self::Label => "Label",
            Self::Status => "Status",
            Self::Compile => "Compile",
            Self::Goal => "Goal",
            Self::SummarySentence => "SummarySentence",
            Self::SummaryFull => "SummaryFull",
            Self::WordCount => "WordCount",
            Self::GoalPercentage => "GoalPercentage",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.tag() == tag)
    }

    /// Derived fields are computed from the tree and never written out.
    pub fn persisted(self) -> bool {
        !matches!(self, Self::WordCount | Self::GoalPercentage)
    }

    /// Forced fields are written even when their value is empty.
    pub fn forced(self) -> bool {
        matches!(self, Self::Compile)
    }
}

/// Character sheet fields (`characters/<id>-<slug>.txt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharacterField {
    Name,
    Importance,
    Motivation,
    Goal,
    Conflict,
    Epiphany,
    PhraseSummary,
    ParagraphSummary,
    FullSummary,
    Notes,
}

impl CharacterField {
    pub const ALL: [CharacterField; 10] = [
        Self::Name,
        Self::Importance,
        Self::Motivation,
        Self::Goal,
        Self::Conflict,
        Self::Epiphany,
        Self::PhraseSummary,
        Self::ParagraphSummary,
        Self::FullSummary,
        Self::Notes,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Importance => "Importance",
            Self::Motivation => "Motivation",
            Self::Goal => "Goal",
            Self::Conflict => "Conflict",
            Self::Epiphany => "Epiphany",
            Self::PhraseSummary => "Phrase Summary",
            Self::ParagraphSummary => "Paragraph Summary",
            Self::FullSummary => "Full Summary",
            Self::Notes => "Notes",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.tag() == tag)
    }

    pub fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Importance => 1,
            Self::Motivation => 2,
            Self::Goal => 3,
            Self::Conflict => 4,
            Self::Epiphany => 5,
            Self::PhraseSummary => 6,
            Self::ParagraphSummary => 7,
            Self::FullSummary => 8,
            Self::Notes => 9,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.index() == index)
    }
}

/// Plot attributes; `characters` and `step` children are modeled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlotField {
    Name,
    Description,
    Status,
    Result,
}

impl PlotField {
    pub const ALL: [PlotField; 4] = [
        Self::Name,
        Self::Description,
        Self::Status,
        Self::Result,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Status => "status",
            Self::Result => "result",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.tag() == tag)
    }

    pub fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Description => 1,
            Self::Status => 2,
            Self::Result => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.index() == index)
    }
}

/// Resolution-step fields inside a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepField {
    Name,
    Meta,
    Summary,
}

impl StepField {
    pub const ALL: [StepField; 3] = [Self::Name, Self::Meta, Self::Summary];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Meta => "meta",
            Self::Summary => "summary",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.tag() == tag)
    }

    pub fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Meta => 1,
            Self::Summary => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.index() == index)
    }
}

/// World-building entry fields (`world.opml` outline attributes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorldField {
    Name,
    Description,
    Passion,
    Conflict,
}

impl WorldField {
    pub const ALL: [WorldField; 4] = [
        Self::Name,
        Self::Description,
        Self::Passion,
        Self::Conflict,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Passion => "passion",
            Self::Conflict => "conflict",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.tag() == tag)
    }

    pub fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Description => 1,
            Self::Passion => 2,
            Self::Conflict => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.index() == index)
    }
}
