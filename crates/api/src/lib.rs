pub mod ast;
pub mod event;
pub mod language;
pub mod name;
pub mod value;

// Re-export commonly used types
pub use ast::{
    Cardinality, Declaration, DescriptorSet, Doc, EnumConstant, EnumType, Field, FieldType,
    MessageType, PrimitiveType, Rpc, SchemaFile, Service, SyntaxVersion,
};
pub use event::{CompilerEvent, EventKind, FileHeader};
pub use language::{CommentSyntax, Language};
pub use name::{FilePath, TypeName, ViewKey};
pub use value::{FieldPath, OptionSpec, OptionValue};
