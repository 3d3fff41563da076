use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use std::io::BufRead;
use std::io::Write;

pub trait Packable {
    /// Serialize the payload only, without the `<type> <size>\0` header
    fn serialize_payload(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    /// Parse the payload; the header has already been consumed
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn object_id(&self) -> ObjectId;

    fn display(&self) -> String;

    /// Frame the payload as `<type> <size>\0<payload>`
    fn serialize(&self) -> Result<Bytes> {
        let payload = self.serialize_payload()?;

        let mut object_bytes = Vec::with_capacity(payload.len() + 16);
        let header = format!("{} {}\0", self.object_type().as_str(), payload.len());
        object_bytes.write_all(header.as_bytes())?;
        object_bytes.write_all(&payload)?;

        Ok(Bytes::from(object_bytes))
    }
}
