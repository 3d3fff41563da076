//! Commit object
//!
//! Commits are immutable snapshots of the tracked files at a point in time.
//! They contain:
//! - A commit message and a timestamp
//! - A parent commit id (absent only for the root commit)
//! - A second parent commit id (merge commits only)
//! - The file tree: blob ids mapped to file names
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! timestamp <timestamp>
//! parent <parent-sha>
//! second-parent <second-parent-sha>
//! blob <blob-sha> <file name>
//!
//! <commit message>
//! ```
//!
//! ## Identity
//!
//! The id is the SHA-1 of the non-null fields fed in order: message, timestamp,
//! parent, second parent and, for non-empty trees, the canonical (sorted) tree
//! serialization. The on-disk layout does not take part in the hash, so an id
//! survives any re-serialization.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::FileTree;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Read};

/// Message of the root commit every repository starts from
pub const ROOT_COMMIT_MESSAGE: &str = "initial commit";

/// Environment variable overriding the timestamp of new commits
pub const COMMIT_DATE_ENV: &str = "SPROUT_COMMIT_DATE";

const TIMESTAMP_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

/// Format a timestamp the way it is stored in commits
///
/// # Returns
///
/// String like "Mon Jan 1 12:34:56 2024 +0000"
pub fn readable_timestamp(timestamp: chrono::DateTime<chrono::FixedOffset>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Timestamp for a new commit
///
/// Reads `SPROUT_COMMIT_DATE` (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`) and falls
/// back to the current local time when it is unset or unparsable.
pub fn load_timestamp_from_env() -> String {
    let timestamp = std::env::var(COMMIT_DATE_ENV).ok().and_then(|date_str| {
        chrono::DateTime::parse_from_rfc2822(&date_str)
            .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
            .ok()
    });

    readable_timestamp(timestamp.unwrap_or_else(|| chrono::Local::now().fixed_offset()))
}

/// Slim representation of a commit
///
/// Contains only what graph traversal needs, so merge base search does not
/// have to carry whole trees around.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    /// The commit's object ID
    pub oid: ObjectId,
    /// The commit's parent object IDs, first parent first
    pub parents: Vec<ObjectId>,
}

/// Commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    message: String,
    timestamp: String,
    parent: Option<ObjectId>,
    second_parent: Option<ObjectId>,
    tree: FileTree,
}

impl Commit {
    /// Create a new commit
    ///
    /// # Arguments
    ///
    /// * `message` - Commit message
    /// * `timestamp` - Rendered timestamp (see [`readable_timestamp`])
    /// * `parent` - First parent (None for the root commit)
    /// * `second_parent` - Merged-in commit (merge commits only)
    /// * `tree` - Snapshot of the tracked files
    pub fn new(
        message: String,
        timestamp: String,
        parent: Option<ObjectId>,
        second_parent: Option<ObjectId>,
        tree: FileTree,
    ) -> Self {
        Commit {
            message,
            timestamp,
            parent,
            second_parent,
            tree,
        }
    }

    /// The commit every repository starts with
    ///
    /// All inputs are fixed (epoch timestamp in UTC, empty tree, no parent), so
    /// its id is the same in every repository.
    pub fn root() -> Self {
        let epoch = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH.fixed_offset();

        Commit::new(
            ROOT_COMMIT_MESSAGE.to_string(),
            readable_timestamp(epoch),
            None,
            None,
            FileTree::new(),
        )
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.second_parent.as_ref()
    }

    /// Both parents, first parent first
    pub fn parents(&self) -> Vec<ObjectId> {
        self.parent
            .iter()
            .chain(self.second_parent.iter())
            .cloned()
            .collect()
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }
}

impl Packable for Commit {
    fn serialize_payload(&self) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(self.display()))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;

        // header lines are never empty, so the first blank line ends the header
        let (header, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;
        let mut lines = header.lines();

        let timestamp = lines
            .next()
            .and_then(|line| line.strip_prefix("timestamp "))
            .context("Invalid commit object: missing timestamp line")?
            .to_string();

        let mut parent = None;
        let mut second_parent = None;
        let mut tree = FileTree::new();

        for line in lines {
            if let Some(oid) = line.strip_prefix("parent ") {
                parent = Some(ObjectId::try_parse(oid.to_string())?);
            } else if let Some(oid) = line.strip_prefix("second-parent ") {
                second_parent = Some(ObjectId::try_parse(oid.to_string())?);
            } else if let Some(entry) = line.strip_prefix("blob ") {
                let (oid, name) = entry
                    .split_once(' ')
                    .with_context(|| format!("Invalid commit object: bad blob line {line:?}"))?;
                tree.insert(name, ObjectId::try_parse(oid.to_string())?);
            } else {
                anyhow::bail!("Invalid commit object: unexpected line {line:?}");
            }
        }

        Ok(Commit::new(
            message.to_string(),
            timestamp,
            parent,
            second_parent,
            tree,
        ))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn object_id(&self) -> ObjectId {
        let tree_bytes = self.tree.canonical_bytes();

        let chunks = [
            Some(self.message.as_bytes()),
            Some(self.timestamp.as_bytes()),
            self.parent.as_ref().map(|oid| oid.as_ref().as_bytes()),
            self.second_parent.as_ref().map(|oid| oid.as_ref().as_bytes()),
            (!self.tree.is_empty()).then_some(tree_bytes.as_slice()),
        ];

        ObjectId::digest(chunks.into_iter().flatten())
    }

    fn display(&self) -> String {
        let mut lines = vec![format!("timestamp {}", self.timestamp)];

        if let Some(parent) = &self.parent {
            lines.push(format!("parent {parent}"));
        }
        if let Some(second_parent) = &self.second_parent {
            lines.push(format!("second-parent {second_parent}"));
        }
        for (oid, name) in self.tree.entries() {
            lines.push(format!("blob {oid} {name}"));
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}
