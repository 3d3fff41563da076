//! Blob object
//!
//! Blobs store the content of one file. Unlike git, the blob id covers the
//! file name as well as the bytes, so the same content under two names is two
//! distinct blobs.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`
//! Identity: `sha1(name ‖ content)`

use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;

/// File content snapshot, tagged with the name it was added under
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    /// File name the content belongs to
    name: String,
    /// Raw file content
    content: Bytes,
}

impl Blob {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }
}

impl Packable for Blob {
    fn serialize_payload(&self) -> anyhow::Result<Bytes> {
        Ok(self.content.clone())
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn object_id(&self) -> ObjectId {
        ObjectId::digest([self.name.as_bytes(), &self.content[..]])
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).to_string()
    }
}
