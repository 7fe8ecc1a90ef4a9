//! Read-only descriptor snapshots of declared API surfaces.
//!
//! Descriptors arrive already parsed; this module only models them. All
//! types here are plain data: once built they are never mutated, updates are
//! modeled as new events producing new state downstream.

use crate::name::{FilePath, TypeName};
use crate::value::OptionSpec;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Syntax revision of a schema file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntaxVersion {
    Proto2,
    #[default]
    Proto3,
    Unknown,
}

/// Documentation attached to a declaration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Doc {
    #[serde(default)]
    pub leading: String,
    #[serde(default)]
    pub trailing: String,
}

impl Doc {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }
}

/// The full input to one compilation run: the files to generate code for
/// plus the closure of everything they transitively import.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DescriptorSet {
    #[serde(default)]
    pub files_to_generate: Vec<FilePath>,
    pub files: Vec<SchemaFile>,
}

impl DescriptorSet {
    /// Files the run generates code for, in declaration order.
    pub fn generated_files(&self) -> impl Iterator<Item = &SchemaFile> {
        self.files
            .iter()
            .filter(|f| self.files_to_generate.contains(&f.path))
    }
}

/// One parsed schema file with all of its top-level declarations.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchemaFile {
    pub path: FilePath,
    #[serde(default)]
    pub package: SmolStr,
    #[serde(default)]
    pub syntax: SyntaxVersion,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    #[serde(default)]
    pub messages: Vec<MessageType>,
    #[serde(default)]
    pub enums: Vec<EnumType>,
    #[serde(default)]
    pub services: Vec<Service>,
}

/// A message declaration, possibly with nested messages and enums.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageType {
    pub name: TypeName,
    pub file: FilePath,
    #[serde(default)]
    pub ordinal: u32,
    #[serde(default)]
    pub doc: Doc,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub messages: Vec<MessageType>,
    #[serde(default)]
    pub enums: Vec<EnumType>,
}

impl MessageType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Type of a message field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Primitive(PrimitiveType),
    Message(TypeName),
    Enum(TypeName),
}

impl FieldType {
    pub fn as_message(&self) -> Option<&TypeName> {
        match self {
            FieldType::Message(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Str,
    Bytes,
}

/// How many values a field holds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    Single,
    Repeated,
    Map {
        key: PrimitiveType,
    },
}

/// A field of a message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Field {
    pub name: SmolStr,
    pub number: i32,
    /// Zero-based position among the sibling fields.
    #[serde(default)]
    pub ordinal: u32,
    pub ty: FieldType,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub doc: Doc,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

/// An enum declaration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: TypeName,
    pub file: FilePath,
    #[serde(default)]
    pub ordinal: u32,
    #[serde(default)]
    pub doc: Doc,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    #[serde(default)]
    pub constants: Vec<EnumConstant>,
}

/// A constant of an enum.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub name: SmolStr,
    pub number: i32,
    #[serde(default)]
    pub ordinal: u32,
    #[serde(default)]
    pub doc: Doc,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

/// A service declaration with its RPC methods.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Service {
    pub name: TypeName,
    pub file: FilePath,
    #[serde(default)]
    pub doc: Doc,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    #[serde(default)]
    pub rpcs: Vec<Rpc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Rpc {
    pub name: SmolStr,
    pub request: TypeName,
    pub response: TypeName,
    #[serde(default)]
    pub doc: Doc,
}

/// A declaration a render action is applied to.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Message(MessageType),
    Enum(EnumType),
    Service(Service),
}

impl Declaration {
    pub fn name(&self) -> &TypeName {
        match self {
            Declaration::Message(m) => &m.name,
            Declaration::Enum(e) => &e.name,
            Declaration::Service(s) => &s.name,
        }
    }

    pub fn file(&self) -> &FilePath {
        match self {
            Declaration::Message(m) => &m.file,
            Declaration::Enum(e) => &e.file,
            Declaration::Service(s) => &s.file,
        }
    }
}
