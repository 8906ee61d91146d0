// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! MetaText parsing/encoding: the "metadata block + blank line + body" format
//! used by outline documents, character sheets, and the info/summary files.
//!
//! Wire shape (lines are `\n`-separated; `\r` is not part of the format):
//! - `key: value` lines introduce metadata; the key starts with a
//!   non-whitespace character and runs to the first `:` (it may contain
//!   spaces, e.g. `Phrase Summary`).
//! - a line indented by at least [`TAB_WIDTH`] spaces continues the previous
//!   value; exactly that width is stripped, so deeper indentation survives.
//! - the first blank line ends the metadata; the body is everything after,
//!   minus one leading blank line that encoding always inserts.
//! - the key literal `None` means the empty key; a `:` inside a key is
//!   written as the sentinel `_.._`.
//!
//! Parsing is tolerant: unknown keys are kept, junk lines in the metadata
//! block are dropped. `parse` inverts `encode` for any field set whose keys
//! do not contain the sentinel and whose values carry no leading whitespace
//! on their first line (the padding column swallows it, as it always has).

/// Continuation indent width, in spaces.
pub const TAB_WIDTH: usize = 4;

const CONTINUATION: &str = "    ";
const NONE_KEY: &str = "None";
const COLON_SENTINEL: &str = "_.._";

/// A decoded MetaText document: ordered fields (duplicates allowed; the
/// character codec relies on key order) plus the free-text body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetaText {
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl MetaText {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }
}

/// Decodes a MetaText document. Total: malformed input degrades to fewer
/// fields or a larger body, never to an error.
pub fn parse_metatext(src: &str) -> MetaText {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut pending: Option<(String, String)> = None;
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;

    for line in src.split('\n') {
        if in_body {
            body_lines.push(line);
            continue;
        }

        if let Some((key, value)) = split_field_line(line) {
            if let Some(field) = pending.take() {
                fields.push(field);
            }
            pending = Some((decode_key(key), value.to_owned()));
        } else if let Some(rest) = line.strip_prefix(CONTINUATION) {
            if let Some((_, value)) = pending.as_mut() {
                value.push('\n');
                value.push_str(rest);
            }
        } else if line.is_empty() {
            if let Some(field) = pending.take() {
                fields.push(field);
            }
            in_body = true;
        }
        // Any other line inside the metadata block is junk and dropped.
    }

    if let Some(field) = pending.take() {
        fields.push(field);
    }

    // Encoding inserts one blank line ahead of the body; strip it back out.
    if body_lines.first() == Some(&"") {
        body_lines.remove(0);
    }

    MetaText {
        fields,
        body: body_lines.join("\n"),
    }
}

/// Encodes fields and body. `pad` is the column the value starts at, counted
/// from the key's first character (callers use a per-document-type width so
/// files align: infos/outline 15, summary 12, characters 20).
pub fn encode_metatext(doc: &MetaText, pad: usize) -> String {
    let mut out = String::new();
    for (key, value) in &doc.fields {
        push_field(&mut out, key, value, pad);
    }
    out.push('\n');
    out.push('\n');
    out.push_str(&doc.body);
    out
}

/// Appends one `key:` + padding + value line set to `out`, re-indenting
/// multi-line values by [`TAB_WIDTH`].
pub fn push_field(out: &mut String, key: &str, value: &str, pad: usize) {
    let key = encode_key(key);
    let width = key.chars().count();
    out.push_str(&key);
    out.push(':');
    for _ in width..pad {
        out.push(' ');
    }

    let mut lines = value.split('\n');
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        out.push_str(CONTINUATION);
        out.push_str(line);
    }
    out.push('\n');
}

fn split_field_line(line: &str) -> Option<(&str, &str)> {
    let first = line.chars().next()?;
    if first.is_whitespace() {
        return None;
    }
    let (key, rest) = line.split_once(':')?;
    if key.is_empty() {
        return None;
    }
    Some((key, rest.trim_start()))
}

fn decode_key(key: &str) -> String {
    if key == NONE_KEY {
        return String::new();
    }
    key.replace(COLON_SENTINEL, ":")
}

fn encode_key(key: &str) -> String {
    if key.is_empty() {
        return NONE_KEY.to_owned();
    }
    key.replace(':', COLON_SENTINEL)
}
