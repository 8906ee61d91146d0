// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The manuscript tree: folders and documents, attributes, bodies, and
//! per-document revision history.
//!
//! Item ids are unique across the whole tree. [`OutlineTree::append`] mints
//! fresh numeric ids for new items; [`OutlineTree::check_ids`] repairs trees
//! that arrive from disk with duplicate or missing ids.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use tracing::warn;

use super::fields::OutlineField;
use super::ids::ItemId;

/// Whether an outline item is a container or a text-bearing leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemKind {
    Folder,
    #[default]
    Document,
}

impl ItemKind {
    /// Token stored in the `Type` field on disk.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Document => "md",
        }
    }

    /// Accepts current tokens plus the text flavors older projects used.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "folder" => Some(Self::Folder),
            "md" | "txt" | "t2t" | "html" => Some(Self::Document),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One historical snapshot of a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    timestamp: u64,
    text: String,
}

impl Revision {
    pub fn new(timestamp: u64, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A node of the manuscript tree.
///
/// `last_path` remembers where the item sat in the container the last time it
/// was read or written; the incremental writer turns a changed path into a
/// rename instead of a delete-plus-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    id: Option<ItemId>,
    title: String,
    kind: ItemKind,
    attributes: BTreeMap<OutlineField, String>,
    body: String,
    revisions: Vec<Revision>,
    last_path: Option<String>,
    children: Vec<OutlineItem>,
}

impl OutlineItem {
    pub fn new(title: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: None,
            title: title.into(),
            kind,
            attributes: BTreeMap::new(),
            body: String::new(),
            revisions: Vec::new(),
            last_path: None,
            children: Vec::new(),
        }
    }

    pub fn document(title: impl Into<String>) -> Self {
        Self::new(title, ItemKind::Document)
    }

    pub fn folder(title: impl Into<String>) -> Self {
        Self::new(title, ItemKind::Folder)
    }

    pub fn id(&self) -> Option<&ItemId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Option<ItemId>) {
        self.id = id;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ItemKind) {
        self.kind = kind;
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn attributes(&self) -> &BTreeMap<OutlineField, String> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut BTreeMap<OutlineField, String> {
        &mut self.attributes
    }

    pub fn attribute(&self, field: OutlineField) -> Option<&str> {
        self.attributes.get(&field).map(String::as_str)
    }

    pub fn set_attribute(&mut self, field: OutlineField, value: impl Into<String>) {
        self.attributes.insert(field, value.into());
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn revisions_mut(&mut self) -> &mut Vec<Revision> {
        &mut self.revisions
    }

    pub fn push_revision(&mut self, timestamp: u64, text: impl Into<String>) {
        self.revisions.push(Revision::new(timestamp, text));
    }

    pub fn last_path(&self) -> Option<&str> {
        self.last_path.as_deref()
    }

    pub fn set_last_path(&mut self, path: Option<String>) {
        self.last_path = path;
    }

    pub fn children(&self) -> &[OutlineItem] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<OutlineItem> {
        &mut self.children
    }

    /// Words in this item's body; folders report the sum of their subtree.
    pub fn word_count(&self) -> usize {
        match self.kind {
            ItemKind::Document => self.body.split_whitespace().count(),
            ItemKind::Folder => self.children.iter().map(OutlineItem::word_count).sum(),
        }
    }
}

/// Raised when [`OutlineTree::append`] is pointed at an id that is not in
/// the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParentError {
    parent: ItemId,
}

impl UnknownParentError {
    pub fn parent(&self) -> &ItemId {
        &self.parent
    }
}

impl fmt::Display for UnknownParentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no outline item with id '{}'", self.parent)
    }
}

impl std::error::Error for UnknownParentError {}

/// Root of the manuscript tree. The root itself is not an item; top-level
/// folders and documents are its children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutlineTree {
    children: Vec<OutlineItem>,
}

impl OutlineTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[OutlineItem] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<OutlineItem> {
        &mut self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Attaches `item` under `parent` (or at the root for `None`), minting
    /// fresh numeric ids for the item and any of its descendants that lack
    /// one or collide with an existing id. Returns the item's id.
    pub fn append(
        &mut self,
        parent: Option<&ItemId>,
        mut item: OutlineItem,
    ) -> Result<ItemId, UnknownParentError> {
        let mut used: BTreeSet<String> = self
            .walk()
            .filter_map(|(node, _)| node.id().map(|id| id.as_str().to_owned()))
            .collect();
        let mut next = self.next_numeric_id();
        mint_subtree_ids(&mut item, &mut used, &mut next);
        let assigned = item
            .id()
            .cloned()
            .expect("minting assigns an id to every node");

        let slot = match parent {
            Some(parent_id) => match self.find_mut(parent_id) {
                Some(node) => node.children_mut(),
                None => {
                    return Err(UnknownParentError {
                        parent: parent_id.clone(),
                    })
                }
            },
            None => &mut self.children,
        };
        slot.push(item);
        Ok(assigned)
    }

    pub fn find(&self, id: &ItemId) -> Option<&OutlineItem> {
        self.walk()
            .map(|(item, _)| item)
            .find(|item| item.id() == Some(id))
    }

    pub fn find_mut(&mut self, id: &ItemId) -> Option<&mut OutlineItem> {
        find_in_mut(&mut self.children, id)
    }

    /// Detaches the item (and its subtree) from the tree.
    pub fn remove(&mut self, id: &ItemId) -> Option<OutlineItem> {
        remove_in(&mut self.children, id)
    }

    /// Depth-first preorder traversal yielding each item with its depth
    /// (top-level items are depth 0).
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![self.children.iter()],
        }
    }

    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// Restores the unique-id invariant after loading from disk: the first
    /// occurrence of an id keeps it, duplicates and id-less items get fresh
    /// numeric ids. Returns how many items were reassigned.
    pub fn check_ids(&mut self) -> usize {
        let mut used = BTreeSet::new();
        let mut next = self.next_numeric_id();
        let mut reassigned = 0;
        for item in &mut self.children {
            check_subtree_ids(item, &mut used, &mut next, &mut reassigned);
        }
        reassigned
    }

    fn next_numeric_id(&self) -> u64 {
        self.walk()
            .filter_map(|(item, _)| item.id().and_then(ItemId::as_number))
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }
}

pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, OutlineItem>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a OutlineItem, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(item) => {
                    let depth = self.stack.len() - 1;
                    self.stack.push(item.children.iter());
                    return Some((item, depth));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

fn mint_id(used: &mut BTreeSet<String>, next: &mut u64) -> ItemId {
    // `used` is finite, so wrapping keeps the scan terminating even when a
    // document carries an id at the top of the u64 range.
    while used.contains(&next.to_string()) {
        *next = next.wrapping_add(1);
    }
    let id = ItemId::new(next.to_string()).expect("numeric ids are never empty");
    used.insert(id.as_str().to_owned());
    *next = next.wrapping_add(1);
    id
}

fn mint_subtree_ids(item: &mut OutlineItem, used: &mut BTreeSet<String>, next: &mut u64) {
    let keep = match item.id() {
        Some(id) => used.insert(id.as_str().to_owned()),
        None => false,
    };
    if !keep {
        item.set_id(Some(mint_id(used, next)));
    }
    for child in item.children_mut() {
        mint_subtree_ids(child, used, next);
    }
}

fn check_subtree_ids(
    item: &mut OutlineItem,
    used: &mut BTreeSet<String>,
    next: &mut u64,
    reassigned: &mut usize,
) {
    let keep = match item.id() {
        Some(id) => used.insert(id.as_str().to_owned()),
        None => false,
    };
    if !keep {
        let old = item.id().cloned();
        let fresh = mint_id(used, next);
        warn!(
            title = %item.title(),
            old_id = ?old.as_ref().map(ItemId::as_str),
            new_id = %fresh,
            "outline item id reassigned"
        );
        item.set_id(Some(fresh));
        *reassigned += 1;
    }
    for child in item.children_mut() {
        check_subtree_ids(child, used, next, reassigned);
    }
}

fn find_in_mut<'a>(items: &'a mut [OutlineItem], id: &ItemId) -> Option<&'a mut OutlineItem> {
    for item in items {
        if item.id() == Some(id) {
            return Some(item);
        }
        if let Some(found) = find_in_mut(&mut item.children, id) {
            return Some(found);
        }
    }
    None
}

fn remove_in(items: &mut Vec<OutlineItem>, id: &ItemId) -> Option<OutlineItem> {
    if let Some(pos) = items.iter().position(|item| item.id() == Some(id)) {
        return Some(items.remove(pos));
    }
    for item in items {
        if let Some(removed) = remove_in(&mut item.children, id) {
            return Some(removed);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{ItemKind, OutlineItem, OutlineTree};
    use crate::model::ids::ItemId;

    fn id(value: &str) -> ItemId {
        ItemId::new(value).expect("item id")
    }

    #[test]
    fn append_assigns_sequential_ids() {
        let mut tree = OutlineTree::new();
        let part = tree.append(None, OutlineItem::folder("Part One")).expect("append");
        let chapter = tree
            .append(Some(&part), OutlineItem::document("Chapter 1"))
            .expect("append");

        assert_eq!(part.as_str(), "1");
        assert_eq!(chapter.as_str(), "2");
        assert_eq!(tree.children()[0].children()[0].title(), "Chapter 1");
    }

    #[test]
    fn append_rejects_unknown_parent() {
        let mut tree = OutlineTree::new();
        let missing = id("99");
        let err = tree
            .append(Some(&missing), OutlineItem::document("Orphan"))
            .expect_err("must fail");
        assert_eq!(err.parent(), &missing);
        assert!(tree.is_empty());
    }

    #[test]
    fn append_mints_ids_for_whole_subtree() {
        let mut scene = OutlineItem::folder("Act");
        scene.children_mut().push(OutlineItem::document("Scene A"));
        scene.children_mut().push(OutlineItem::document("Scene B"));

        let mut tree = OutlineTree::new();
        tree.append(None, scene).expect("append");

        let ids: Vec<_> = tree
            .walk()
            .map(|(item, _)| item.id().expect("minted").as_str().to_owned())
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn walk_is_preorder_with_depth() {
        let mut tree = OutlineTree::new();
        let part = tree.append(None, OutlineItem::folder("Part")).expect("append");
        let chapter = tree
            .append(Some(&part), OutlineItem::folder("Chapter"))
            .expect("append");
        tree.append(Some(&chapter), OutlineItem::document("Scene"))
            .expect("append");
        tree.append(None, OutlineItem::document("Epilogue"))
            .expect("append");

        let seen: Vec<_> = tree
            .walk()
            .map(|(item, depth)| (item.title().to_owned(), depth))
            .collect();
        assert_eq!(
            seen,
            [
                ("Part".to_owned(), 0),
                ("Chapter".to_owned(), 1),
                ("Scene".to_owned(), 2),
                ("Epilogue".to_owned(), 0),
            ]
        );
    }

    #[test]
    fn check_ids_repairs_duplicates_and_gaps() {
        let mut tree = OutlineTree::new();
        let mut first = OutlineItem::document("First");
        first.set_id(Some(id("7")));
        let mut duplicate = OutlineItem::document("Duplicate");
        duplicate.set_id(Some(id("7")));
        let unnumbered = OutlineItem::document("Unnumbered");
        tree.children_mut().extend([first, duplicate, unnumbered]);

        let reassigned = tree.check_ids();

        assert_eq!(reassigned, 2);
        let ids: Vec<_> = tree
            .walk()
            .map(|(item, _)| item.id().expect("repaired").as_str().to_owned())
            .collect();
        assert_eq!(ids, ["7", "8", "9"]);
    }

    #[test]
    fn remove_detaches_subtree() {
        let mut tree = OutlineTree::new();
        let part = tree.append(None, OutlineItem::folder("Part")).expect("append");
        tree.append(Some(&part), OutlineItem::document("Scene"))
            .expect("append");

        let removed = tree.remove(&part).expect("present");
        assert_eq!(removed.children().len(), 1);
        assert!(tree.is_empty());
        assert!(tree.find(&part).is_none());
    }

    #[test]
    fn word_count_sums_folders() {
        let mut part = OutlineItem::folder("Part");
        let mut a = OutlineItem::document("A");
        a.set_body("one two three");
        let mut b = OutlineItem::document("B");
        b.set_body("four  five\n");
        part.children_mut().extend([a, b]);

        assert_eq!(part.word_count(), 5);
    }

    #[test]
    fn legacy_type_tokens_load_as_documents() {
        assert_eq!(ItemKind::from_token("folder"), Some(ItemKind::Folder));
        for token in ["md", "txt", "t2t", "html"] {
            assert_eq!(ItemKind::from_token(token), Some(ItemKind::Document));
        }
        assert_eq!(ItemKind::from_token("docx"), None);
    }
}
