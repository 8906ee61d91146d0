// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Incremental writes for the folder container.
//!
//! The write cache remembers what each entry held the last time it touched
//! disk. A save turns into: apply renames, write entries whose bytes differ
//! from the cache, delete cached entries the project no longer produces,
//! prune directories that ended up empty. Content correctness never depends
//! on a rename landing; a skipped rename just degrades into a fresh write
//! plus a stale delete.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::model::SaveReport;

use super::backend::{rename_overwrite, write_atomic};
use super::StoreError;

/// Entry name to the bytes last written (or read) for it.
#[derive(Debug, Clone, Default)]
pub(crate) struct WriteCache {
    entries: BTreeMap<String, Vec<u8>>,
}

impl WriteCache {
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn record(&mut self, name: &str, bytes: Vec<u8>) {
        self.entries.insert(name.to_owned(), bytes);
    }

    pub(crate) fn matches(&self, name: &str, bytes: &[u8]) -> bool {
        self.entries
            .get(name)
            .is_some_and(|cached| cached.as_slice() == bytes)
    }

    pub(crate) fn forget(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Translates a rename: the exact entry plus everything under it when
    /// the renamed path is a directory.
    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        let prefix = format!("{old}/");
        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.as_str() == old || key.starts_with(&prefix))
            .cloned()
            .collect();
        for key in keys {
            if let Some(bytes) = self.entries.remove(&key) {
                let renamed = if key == old {
                    new.to_owned()
                } else {
                    format!("{new}{}", &key[old.len()..])
                };
                self.entries.insert(renamed, bytes);
            }
        }
    }
}

/// Everything one save wants on disk: ordered entries plus the renames
/// detected against where items sat before.
#[derive(Debug, Default)]
pub(crate) struct SavePlan {
    pub(crate) entries: Vec<(String, Vec<u8>)>,
    pub(crate) moves: Vec<(String, String)>,
}

/// Applies a plan to a folder container rooted at `root`.
///
/// An empty cache means nothing is known about the destination, so it is
/// wiped and rebuilt. Renames and deletes are best effort and report into
/// `saving_errors`; content writes are not, a failed write aborts the save.
pub(crate) fn apply(
    root: &Path,
    cache: &mut WriteCache,
    plan: SavePlan,
    saving_errors: &mut Vec<String>,
) -> Result<SaveReport, StoreError> {
    let mut report = SaveReport::default();
    let fresh = cache.is_empty();

    if fresh && root.exists() {
        fs::remove_dir_all(root).map_err(|source| StoreError::Io {
            path: root.to_owned(),
            source,
        })?;
    }
    fs::create_dir_all(root).map_err(|source| StoreError::Io {
        path: root.to_owned(),
        source,
    })?;

    if !fresh {
        for (old, new) in &plan.moves {
            if old == new {
                continue;
            }
            let from = root.join(old);
            let to = root.join(new);
            if to.exists() {
                // Destination occupied (sibling reorder); the write pass
                // settles content under the new name.
                continue;
            }
            if let Some(parent) = to.parent() {
                if let Err(source) = fs::create_dir_all(parent) {
                    saving_errors.push(format!("could not prepare '{new}': {source}"));
                    continue;
                }
            }
            match rename_overwrite(&from, &to) {
                Ok(()) => {
                    cache.rename(old, new);
                    report.moved += 1;
                }
                Err(source) if source.kind() == io::ErrorKind::NotFound => {
                    // Source already gone; the write pass recreates the entry.
                }
                Err(source) => {
                    saving_errors.push(format!("could not move '{old}' to '{new}': {source}"));
                }
            }
        }
    }

    for (name, bytes) in &plan.entries {
        if cache.matches(name, bytes) {
            continue;
        }
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_owned(),
                source,
            })?;
        }
        write_atomic(&path, bytes).map_err(|source| StoreError::Io { path, source })?;
        cache.record(name, bytes.clone());
        report.written += 1;
    }

    let keep: BTreeSet<&str> = plan.entries.iter().map(|(name, _)| name.as_str()).collect();
    for stale in cache.paths() {
        if keep.contains(stale.as_str()) {
            continue;
        }
        let path = root.join(&stale);
        let removal = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match removal {
            Ok(()) => report.removed += 1,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                saving_errors.push(format!("could not remove stale '{stale}': {source}"))
            }
        }
        cache.forget(&stale);
    }

    prune_empty_dirs(root, saving_errors);

    debug!(
        written = report.written,
        moved = report.moved,
        removed = report.removed,
        "applied folder save"
    );
    Ok(report)
}

/// Removes directories left empty below `root`; `root` itself stays.
fn prune_empty_dirs(dir: &Path, saving_errors: &mut Vec<String>) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            saving_errors.push(format!("could not scan '{}': {source}", dir.display()));
            return false;
        }
    };

    let mut empty = true;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if prune_empty_dirs(&path, saving_errors) {
                if let Err(source) = fs::remove_dir(&path) {
                    saving_errors.push(format!(
                        "could not remove empty '{}': {source}",
                        path.display()
                    ));
                    empty = false;
                }
            } else {
                empty = false;
            }
        } else {
            empty = false;
        }
    }
    empty
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::super::testutil::TempDir;
    use super::{apply, SavePlan, WriteCache};

    fn plan(entries: &[(&str, &str)]) -> SavePlan {
        SavePlan {
            entries: entries
                .iter()
                .map(|(name, text)| ((*name).to_owned(), text.as_bytes().to_vec()))
                .collect(),
            moves: Vec::new(),
        }
    }

    #[test]
    fn fresh_cache_wipes_and_writes_everything() {
        let tmp = TempDir::new("incremental");
        let root = tmp.path().join("novel");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("leftover.txt"), "junk").unwrap();

        let mut cache = WriteCache::default();
        let mut errors = Vec::new();
        let report = apply(
            &root,
            &mut cache,
            plan(&[("VERSION", "1"), ("outline/0-intro.md", "Title: Intro\n")]),
            &mut errors,
        )
        .unwrap();

        assert_eq!(report.written, 2);
        assert!(errors.is_empty());
        assert!(!root.join("leftover.txt").exists());
        assert_eq!(
            fs::read_to_string(root.join("outline/0-intro.md")).unwrap(),
            "Title: Intro\n"
        );
    }

    #[test]
    fn unchanged_plan_touches_nothing() {
        let tmp = TempDir::new("incremental");
        let root = tmp.path().join("novel");
        let mut cache = WriteCache::default();
        let mut errors = Vec::new();

        let entries = [("VERSION", "1"), ("infos.txt", "Title: X\n")];
        apply(&root, &mut cache, plan(&entries), &mut errors).unwrap();
        let report = apply(&root, &mut cache, plan(&entries), &mut errors).unwrap();

        assert!(report.is_noop());
        assert!(errors.is_empty());
    }

    #[test]
    fn renames_move_files_instead_of_rewriting() {
        let tmp = TempDir::new("incremental");
        let root = tmp.path().join("novel");
        let mut cache = WriteCache::default();
        let mut errors = Vec::new();

        apply(
            &root,
            &mut cache,
            plan(&[("outline/0-one.md", "Title: One\n\n\nBody.")]),
            &mut errors,
        )
        .unwrap();

        let mut second = plan(&[("outline/0-two.md", "Title: One\n\n\nBody.")]);
        second.moves.push(("outline/0-one.md".to_owned(), "outline/0-two.md".to_owned()));
        let report = apply(&root, &mut cache, second, &mut errors).unwrap();

        assert_eq!(report.moved, 1);
        assert_eq!(report.written, 0);
        assert!(!root.join("outline/0-one.md").exists());
        assert!(root.join("outline/0-two.md").exists());
        assert!(errors.is_empty());
    }

    #[test]
    fn moves_into_new_directories_create_parents() {
        let tmp = TempDir::new("incremental");
        let root = tmp.path().join("novel");
        let mut cache = WriteCache::default();
        let mut errors = Vec::new();

        apply(&root, &mut cache, plan(&[("a.md", "text")]), &mut errors).unwrap();

        let mut second = plan(&[("part/b.md", "text")]);
        second.moves.push(("a.md".to_owned(), "part/b.md".to_owned()));
        let report = apply(&root, &mut cache, second, &mut errors).unwrap();

        assert_eq!(report.moved, 1);
        assert!(root.join("part/b.md").is_file());
        assert!(errors.is_empty());
    }

    #[test]
    fn missing_move_source_degrades_to_a_write() {
        let tmp = TempDir::new("incremental");
        let root = tmp.path().join("novel");
        let mut cache = WriteCache::default();
        let mut errors = Vec::new();

        apply(&root, &mut cache, plan(&[("keep.txt", "k")]), &mut errors).unwrap();

        let mut second = plan(&[("keep.txt", "k"), ("renamed.md", "body")]);
        second.moves.push(("vanished.md".to_owned(), "renamed.md".to_owned()));
        let report = apply(&root, &mut cache, second, &mut errors).unwrap();

        assert_eq!(report.moved, 0);
        assert_eq!(report.written, 1);
        assert!(root.join("renamed.md").is_file());
        assert!(errors.is_empty());
    }

    #[test]
    fn stale_entries_are_removed_and_empty_dirs_pruned() {
        let tmp = TempDir::new("incremental");
        let root = tmp.path().join("novel");
        let mut cache = WriteCache::default();
        let mut errors = Vec::new();

        apply(
            &root,
            &mut cache,
            plan(&[("infos.txt", "Title: X\n"), ("outline/01-part/0-scene.md", "s")]),
            &mut errors,
        )
        .unwrap();

        let report = apply(&root, &mut cache, plan(&[("infos.txt", "Title: X\n")]), &mut errors)
            .unwrap();

        assert_eq!(report.removed, 1);
        assert!(!root.join("outline").exists());
        assert!(root.join("infos.txt").is_file());
        assert!(errors.is_empty());
    }

    #[test]
    fn cache_rename_translates_nested_entries() {
        let mut cache = WriteCache::default();
        cache.record("outline/01-part/folder.txt", b"Title: Part\n".to_vec());
        cache.record("outline/01-part/0-scene.md", b"s".to_vec());
        cache.record("outline/other.md", b"o".to_vec());

        cache.rename("outline/01-part", "outline/02-part");

        assert!(cache.matches("outline/02-part/folder.txt", b"Title: Part\n"));
        assert!(cache.matches("outline/02-part/0-scene.md", b"s"));
        assert!(cache.matches("outline/other.md", b"o"));
        assert!(!cache.matches("outline/01-part/folder.txt", b"Title: Part\n"));
    }
}
