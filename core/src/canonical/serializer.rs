//! `serde::Serializer` that reduces a value to its Merkle structural hash

use super::merkle::{merkleize, mix_in_length, pack, Chunk, ZERO_CHUNK};
use super::CanonicalizationError;
use serde::ser::{self, Impossible, Serialize};

/// Intermediate result of hashing one value.
pub(crate) enum Node {
    /// Little-endian bytes of a basic value, packed by the enclosing collection
    Basic(Vec<u8>),
    /// Root of a composite value
    Composite(Chunk),
}

impl Node {
    pub(crate) fn into_chunk(self) -> Chunk {
        match self {
            Node::Basic(bytes) => {
                let mut chunk = ZERO_CHUNK;
                chunk[..bytes.len()].copy_from_slice(&bytes);
                chunk
            }
            Node::Composite(chunk) => chunk,
        }
    }
}

fn basic(bytes: &[u8]) -> Result<Node, CanonicalizationError> {
    Ok(Node::Basic(bytes.to_vec()))
}

fn byte_list(bytes: &[u8]) -> Node {
    let root = merkleize(pack(bytes));
    Node::Composite(mix_in_length(&root, bytes.len()))
}

pub(crate) struct TreeHasher;

impl ser::Serializer for TreeHasher {
    type Ok = Node;
    type Error = CanonicalizationError;

    type SerializeSeq = CollectionHasher;
    type SerializeTuple = CollectionHasher;
    type SerializeTupleStruct = ContainerHasher;
    type SerializeTupleVariant = Impossible<Node, CanonicalizationError>;
    type SerializeMap = Impossible<Node, CanonicalizationError>;
    type SerializeStruct = ContainerHasher;
    type SerializeStructVariant = Impossible<Node, CanonicalizationError>;

    fn serialize_bool(self, v: bool) -> Result<Node, Self::Error> {
        basic(&[v as u8])
    }

    fn serialize_i8(self, v: i8) -> Result<Node, Self::Error> {
        basic(&v.to_le_bytes())
    }

    fn serialize_i16(self, v: i16) -> Result<Node, Self::Error> {
        basic(&v.to_le_bytes())
    }

    fn serialize_i32(self, v: i32) -> Result<Node, Self::Error> {
        basic(&v.to_le_bytes())
    }

    fn serialize_i64(self, v: i64) -> Result<Node, Self::Error> {
        basic(&v.to_le_bytes())
    }

    fn serialize_i128(self, v: i128) -> Result<Node, Self::Error> {
        basic(&v.to_le_bytes())
    }

    fn serialize_u8(self, v: u8) -> Result<Node, Self::Error> {
        basic(&[v])
    }

    fn serialize_u16(self, v: u16) -> Result<Node, Self::Error> {
        basic(&v.to_le_bytes())
    }

    fn serialize_u32(self, v: u32) -> Result<Node, Self::Error> {
        basic(&v.to_le_bytes())
    }

    fn serialize_u64(self, v: u64) -> Result<Node, Self::Error> {
        basic(&v.to_le_bytes())
    }

    fn serialize_u128(self, v: u128) -> Result<Node, Self::Error> {
        basic(&v.to_le_bytes())
    }

    fn serialize_f32(self, _v: f32) -> Result<Node, Self::Error> {
        Err(CanonicalizationError::Unsupported("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Node, Self::Error> {
        Err(CanonicalizationError::Unsupported("f64"))
    }

    fn serialize_char(self, v: char) -> Result<Node, Self::Error> {
        basic(&(v as u32).to_le_bytes())
    }

    fn serialize_str(self, v: &str) -> Result<Node, Self::Error> {
        Ok(byte_list(v.as_bytes()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node, Self::Error> {
        Ok(byte_list(v))
    }

    fn serialize_none(self) -> Result<Node, Self::Error> {
        Err(CanonicalizationError::Unsupported("option"))
    }

    fn serialize_some<T>(self, _value: &T) -> Result<Node, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        Err(CanonicalizationError::Unsupported("option"))
    }

    fn serialize_unit(self) -> Result<Node, Self::Error> {
        Ok(Node::Composite(ZERO_CHUNK))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node, Self::Error> {
        Ok(Node::Composite(ZERO_CHUNK))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<Node, Self::Error> {
        basic(&variant_index.to_le_bytes())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Node, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Node, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        Err(CanonicalizationError::Unsupported("newtype variant"))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(CollectionHasher::new(len.unwrap_or(0), true))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(CollectionHasher::new(len, false))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(ContainerHasher::new(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(CanonicalizationError::Unsupported("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(CanonicalizationError::Unsupported("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(ContainerHasher::new(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(CanonicalizationError::Unsupported("struct variant"))
    }
}

/// Sequences, tuples and arrays.
///
/// Elements that are all basic are packed into chunks; otherwise each element
/// contributes its own root. Variable-length sequences mix in their length.
pub(crate) struct CollectionHasher {
    nodes: Vec<Node>,
    mix_length: bool,
}

impl CollectionHasher {
    fn new(capacity: usize, mix_length: bool) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            mix_length,
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<(), CanonicalizationError>
    where
        T: ?Sized + Serialize,
    {
        self.nodes.push(value.serialize(TreeHasher)?);
        Ok(())
    }

    fn finish(self) -> Node {
        let length = self.nodes.len();
        let root = match packed_basics(&self.nodes) {
            Some(packed) => merkleize(pack(&packed)),
            None => merkleize(self.nodes.into_iter().map(Node::into_chunk).collect()),
        };

        if self.mix_length {
            Node::Composite(mix_in_length(&root, length))
        } else {
            Node::Composite(root)
        }
    }
}

fn packed_basics(nodes: &[Node]) -> Option<Vec<u8>> {
    let mut packed = Vec::new();
    for node in nodes {
        match node {
            Node::Basic(bytes) => packed.extend_from_slice(bytes),
            Node::Composite(_) => return None,
        }
    }
    Some(packed)
}

impl ser::SerializeSeq for CollectionHasher {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for CollectionHasher {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(self.finish())
    }
}

/// Structs and tuple structs: the Merkle root of their field roots.
pub(crate) struct ContainerHasher {
    fields: Vec<Chunk>,
}

impl ContainerHasher {
    fn new(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<(), CanonicalizationError>
    where
        T: ?Sized + Serialize,
    {
        self.fields.push(value.serialize(TreeHasher)?.into_chunk());
        Ok(())
    }
}

impl ser::SerializeStruct for ContainerHasher {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(Node::Composite(merkleize(self.fields)))
    }
}

impl ser::SerializeTupleStruct for ContainerHasher {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(Node::Composite(merkleize(self.fields)))
    }
}
