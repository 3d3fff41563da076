//! File tree of a commit
//!
//! A tree maps blob ids to the file names they were added under. Because the
//! blob id already covers the name, two entries never share an id; the
//! structure additionally keeps every file name unique by evicting the old
//! entry whenever a name is re-inserted.
//!
//! Entries are kept in a `BTreeMap`, so iteration (and therefore the
//! canonical serialization fed to the commit hash) is always sorted by blob id.

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    entries: BTreeMap<ObjectId, String>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `oid` as the content of `name`, replacing any previous entry for `name`
    pub fn insert(&mut self, name: &str, oid: ObjectId) {
        self.remove(name);
        self.entries.insert(oid, name.to_string());
    }

    /// Stop tracking `name`; no-op if it is not tracked
    pub fn remove(&mut self, name: &str) -> Option<ObjectId> {
        let oid = self.blob_for(name)?.clone();
        self.entries.remove(&oid);

        Some(oid)
    }

    pub fn blob_for(&self, name: &str) -> Option<&ObjectId> {
        self.entries
            .iter()
            .find(|(_, file_name)| file_name.as_str() == name)
            .map(|(oid, _)| oid)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blob_for(name).is_some()
    }

    pub fn file_names(&self) -> BTreeSet<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    /// Entries as `(blob id, file name)`, sorted by blob id
    pub fn entries(&self) -> impl Iterator<Item = (&ObjectId, &str)> {
        self.entries.iter().map(|(oid, name)| (oid, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order-independent serialization used when hashing a commit
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.entries
            .iter()
            .flat_map(|(oid, name)| format!("{oid} {name}\n").into_bytes())
            .collect()
    }
}

impl FromIterator<(ObjectId, String)> for FileTree {
    fn from_iter<I: IntoIterator<Item = (ObjectId, String)>>(iter: I) -> Self {
        let mut tree = FileTree::new();
        for (oid, name) in iter {
            tree.insert(&name, oid);
        }
        tree
    }
}
