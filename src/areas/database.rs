use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Content-addressed object store
///
/// Objects live in two flat partitions, `blobs/<oid>` and `commits/<oid>`.
/// Each file holds the zlib-compressed `<type> <size>\0<payload>` framing.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn partition_path(&self, object_type: ObjectType) -> PathBuf {
        self.path.join(object_type.partition())
    }

    /// Persist a blob and return its id
    ///
    /// Idempotent: an existing object with the same id is left untouched.
    pub fn store_blob(&self, blob: &Blob) -> anyhow::Result<ObjectId> {
        self.store(blob)
    }

    pub fn store_commit(&self, commit: &Commit) -> anyhow::Result<ObjectId> {
        self.store(commit)
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.object_path(ObjectType::Blob, object_id);
        if !object_path.exists() {
            return Err(RepositoryError::blob_not_found(object_id).into());
        }

        let (object_type, mut object_reader) = self.parse_object_as_bytes(object_path)?;
        if object_type != ObjectType::Blob {
            anyhow::bail!("object {} is a {}, not a blob", object_id, object_type);
        }

        let mut content = Vec::new();
        object_reader.read_to_end(&mut content)?;

        Ok(Bytes::from(content))
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let object_path = self.object_path(ObjectType::Commit, object_id);
        if !object_path.exists() {
            return Err(RepositoryError::commit_not_found(object_id).into());
        }

        let (object_type, object_reader) = self.parse_object_as_bytes(object_path)?;
        if object_type != ObjectType::Commit {
            anyhow::bail!("object {} is a {}, not a commit", object_id, object_type);
        }

        Commit::deserialize(object_reader)
            .with_context(|| format!("Unable to parse commit object {}", object_id))
    }

    pub fn commit_exists(&self, object_id: &ObjectId) -> bool {
        self.object_path(ObjectType::Commit, object_id).is_file()
    }

    /// Every commit id in the store, sorted
    pub fn list_commits(&self) -> anyhow::Result<Vec<ObjectId>> {
        self.find_commits_by_prefix("")
    }

    /// Find all commits whose id starts with the given prefix.
    ///
    /// This method scans the commit partition for every id beginning with the
    /// specified prefix. It is used to resolve abbreviated ids to their full
    /// form; an empty prefix lists every commit.
    ///
    /// # Returns
    ///
    /// A sorted vector of all matching ObjectIds. If no matches are found, returns an
    /// empty vector. If multiple matches are found, all are returned (indicating an
    /// ambiguous prefix).
    pub fn find_commits_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let dir_path = self.partition_path(ObjectType::Commit);
        if !dir_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir_path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name_str = file_name.to_string_lossy();

            // skip in-flight temp files
            if file_name_str.len() != OBJECT_ID_LENGTH {
                continue;
            }

            if let Ok(oid) = ObjectId::try_parse(file_name_str.to_string())
                && oid.starts_with(prefix)
            {
                matches.push(oid);
            }
        }
        matches.sort();

        Ok(matches)
    }

    /// Lightweight view of a commit for graph traversal
    pub fn load_slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<SlimCommit> {
        Ok(SlimCommit {
            oid: object_id.clone(),
            parents: self.load_commit(object_id)?.parents(),
        })
    }

    fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id();
        let object_path = self.object_path(object.object_type(), &object_id);

        // write the object to disk unless it already exists
        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(&object_path, object.serialize()?)?;
            tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");
        }

        Ok(object_id)
    }

    fn object_path(&self, object_type: ObjectType, object_id: &ObjectId) -> PathBuf {
        self.partition_path(object_type).join(object_id.as_ref())
    }

    fn parse_object_as_bytes(
        &self,
        object_path: PathBuf,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_content = self.read_object(object_path)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: &Path, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

/// Memoizing commit loader for graph walks
///
/// Merge base search touches the same commits repeatedly; this keeps each
/// parsed `SlimCommit` around for the lifetime of one operation.
#[derive(Debug, Default)]
pub struct CommitCache {
    commits: RefCell<HashMap<ObjectId, SlimCommit>>,
}

impl CommitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load_slim_commit(
        &self,
        database: &Database,
        oid: &ObjectId,
    ) -> anyhow::Result<SlimCommit> {
        if let Some(commit) = self.commits.borrow().get(oid) {
            return Ok(commit.clone());
        }

        let commit = database.load_slim_commit(oid)?;
        self.commits.borrow_mut().insert(oid.clone(), commit.clone());

        Ok(commit)
    }
}
