// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Minimal XML element-tree codec for the structured project documents
//! (plots, world, revisions, and the legacy tables).
//!
//! Supported subset: one root element, nested elements, double- or
//! single-quoted attributes, element text, `<?...?>` declarations and
//! `<!-- -->` comments (skipped), named entities (`amp`, `lt`, `gt`, `quot`,
//! `apos`) and numeric character references (`&#10;`, `&#x1F;`). Attribute
//! values round-trip embedded newlines/tabs via numeric references, which is
//! how revision text and multi-line summaries survive living in attributes.
//!
//! An element carries either text or children; mixed content parses but does
//! not keep its exact spacing. Nothing here aims at full XML conformance,
//! only the shapes this crate writes plus tolerance for hand-edited files.

use std::fmt;

/// One element: name, ordered attributes, text, children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the attribute when present, appends otherwise.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// First child with the given element name.
    pub fn find_child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    MissingRoot,
    UnexpectedEof { line: usize },
    UnexpectedChar { line: usize, expected: &'static str },
    MismatchedClose { line: usize, open: String, close: String },
    TrailingContent { line: usize },
    BadEntity { line: usize, entity: String },
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRoot => write!(f, "document has no root element"),
            Self::UnexpectedEof { line } => {
                write!(f, "unexpected end of document at line {line}")
            }
            Self::UnexpectedChar { line, expected } => {
                write!(f, "expected {expected} at line {line}")
            }
            Self::MismatchedClose { line, open, close } => {
                write!(f, "mismatched close tag </{close}> for <{open}> at line {line}")
            }
            Self::TrailingContent { line } => {
                write!(f, "content after root element at line {line}")
            }
            Self::BadEntity { line, entity } => {
                write!(f, "unknown entity '&{entity};' at line {line}")
            }
        }
    }
}

impl std::error::Error for XmlError {}

/// Parses a document and returns its root element.
pub fn parse_xml(src: &str) -> Result<XmlElement, XmlError> {
    let mut cur = Cursor {
        rest: src.strip_prefix('\u{feff}').unwrap_or(src),
        line: 1,
    };

    skip_misc(&mut cur)?;
    if cur.rest.is_empty() {
        return Err(XmlError::MissingRoot);
    }
    let root = parse_element(&mut cur)?;
    skip_misc(&mut cur)?;
    if !cur.rest.is_empty() {
        return Err(XmlError::TrailingContent { line: cur.line });
    }
    Ok(root)
}

/// Serializes a document: declaration plus pretty-printed tree, two-space
/// indent, children each on their own line.
pub fn write_xml(root: &XmlElement) -> String {
    let mut out = String::from("<?xml version='1.0' encoding='UTF-8'?>\n");
    write_element(&mut out, root, 0);
    out
}

struct Cursor<'a> {
    rest: &'a str,
    line: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        if ch == '\n' {
            self.line += 1;
        }
        self.rest = &self.rest[ch.len_utf8()..];
        Some(ch)
    }

    fn eat(&mut self, prefix: &str) -> bool {
        match self.rest.strip_prefix(prefix) {
            Some(rest) => {
                self.line += prefix.matches('\n').count();
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// Consumes up to and including `needle`; false when it never appears.
    fn skip_through(&mut self, needle: &str) -> bool {
        match self.rest.find(needle) {
            Some(idx) => {
                let end = idx + needle.len();
                self.line += self.rest[..end].matches('\n').count();
                self.rest = &self.rest[end..];
                true
            }
            None => false,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|ch| ch.is_whitespace()) {
            self.bump();
        }
    }
}

fn skip_misc(cur: &mut Cursor) -> Result<(), XmlError> {
    loop {
        cur.skip_whitespace();
        if cur.eat("<?") {
            if !cur.skip_through("?>") {
                return Err(XmlError::UnexpectedEof { line: cur.line });
            }
        } else if cur.eat("<!--") {
            if !cur.skip_through("-->") {
                return Err(XmlError::UnexpectedEof { line: cur.line });
            }
        } else {
            return Ok(());
        }
    }
}

fn parse_element(cur: &mut Cursor) -> Result<XmlElement, XmlError> {
    if !cur.eat("<") {
        return Err(XmlError::UnexpectedChar {
            line: cur.line,
            expected: "'<'",
        });
    }
    let name = read_name(cur)?;
    let mut element = XmlElement::new(name);

    // Attribute list, then `/>` or `>`.
    loop {
        cur.skip_whitespace();
        if cur.eat("/>") {
            return Ok(element);
        }
        if cur.eat(">") {
            break;
        }
        let attr_name = read_name(cur)?;
        cur.skip_whitespace();
        if !cur.eat("=") {
            return Err(XmlError::UnexpectedChar {
                line: cur.line,
                expected: "'=' after attribute name",
            });
        }
        cur.skip_whitespace();
        let quote = match cur.bump() {
            Some(ch @ ('"' | '\'')) => ch,
            Some(_) => {
                return Err(XmlError::UnexpectedChar {
                    line: cur.line,
                    expected: "quoted attribute value",
                })
            }
            None => return Err(XmlError::UnexpectedEof { line: cur.line }),
        };
        let value = read_quoted(cur, quote)?;
        element.attributes.push((attr_name, value));
    }

    // Content until the matching close tag.
    let mut text = String::new();
    loop {
        if cur.eat("</") {
            let close = read_name(cur)?;
            cur.skip_whitespace();
            if !cur.eat(">") {
                return Err(XmlError::UnexpectedChar {
                    line: cur.line,
                    expected: "'>' after close tag name",
                });
            }
            if close != element.name {
                return Err(XmlError::MismatchedClose {
                    line: cur.line,
                    open: element.name,
                    close,
                });
            }
            break;
        }
        if cur.eat("<!--") {
            if !cur.skip_through("-->") {
                return Err(XmlError::UnexpectedEof { line: cur.line });
            }
            continue;
        }
        if cur.rest.starts_with('<') {
            element.children.push(parse_element(cur)?);
            continue;
        }
        match cur.bump() {
            Some('&') => text.push(read_entity(cur)?),
            Some(ch) => text.push(ch),
            None => return Err(XmlError::UnexpectedEof { line: cur.line }),
        }
    }

    // Pretty-printed parents only hold indentation between children.
    if !element.children.is_empty() && text.trim().is_empty() {
        text.clear();
    }
    element.text = text;
    Ok(element)
}

fn read_name(cur: &mut Cursor) -> Result<String, XmlError> {
    let mut name = String::new();
    while let Some(ch) = cur.peek() {
        if ch.is_whitespace() || matches!(ch, '<' | '>' | '/' | '=' | '"' | '\'' | '&' | '?') {
            break;
        }
        name.push(ch);
        cur.bump();
    }
    if name.is_empty() {
        return Err(XmlError::UnexpectedChar {
            line: cur.line,
            expected: "a name",
        });
    }
    Ok(name)
}

fn read_quoted(cur: &mut Cursor, quote: char) -> Result<String, XmlError> {
    let mut value = String::new();
    loop {
        match cur.bump() {
            Some(ch) if ch == quote => return Ok(value),
            Some('&') => value.push(read_entity(cur)?),
            Some(ch) => value.push(ch),
            None => return Err(XmlError::UnexpectedEof { line: cur.line }),
        }
    }
}

fn read_entity(cur: &mut Cursor) -> Result<char, XmlError> {
    let mut entity = String::new();
    loop {
        match cur.bump() {
            Some(';') => break,
            Some(ch) => {
                entity.push(ch);
                if entity.len() > 10 {
                    return Err(XmlError::BadEntity {
                        line: cur.line,
                        entity,
                    });
                }
            }
            None => return Err(XmlError::UnexpectedEof { line: cur.line }),
        }
    }

    let decoded = match entity.as_str() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()));
            match code {
                Some(Ok(value)) => char::from_u32(value),
                _ => None,
            }
        }
    };

    decoded.ok_or(XmlError::BadEntity {
        line: cur.line,
        entity,
    })
}

fn write_element(out: &mut String, element: &XmlElement, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(out, value);
        out.push('"');
    }

    if element.children.is_empty() && element.text.is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push('>');
    if element.children.is_empty() {
        escape_text(out, &element.text);
        out.push_str("</");
        out.push_str(&element.name);
        out.push_str(">\n");
        return;
    }

    if !element.text.is_empty() {
        escape_text(out, &element.text);
    }
    out.push('\n');
    for child in &element.children {
        write_element(out, child, depth + 1);
    }
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push_str(">\n");
}

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\t' => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}
