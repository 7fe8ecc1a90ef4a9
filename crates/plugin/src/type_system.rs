//! The index of all types known to one compilation run.
//!
//! Built once from the full descriptor closure (declared files plus all
//! transitive imports) and read-only afterwards. Lookup misses are expected
//! outcomes, not faults: checking whether a name belongs to an external
//! library is a normal query.

use indexmap::IndexMap;
use stencil_api::{
    DescriptorSet, EnumType, Field, FieldPath, FilePath, MessageType, OptionSpec, OptionValue,
    Service, TypeName,
};
use thiserror::Error;

/// A message or enum declaration found by [`TypeSystem::find_message_or_enum`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeDeclRef<'a> {
    Message(&'a MessageType),
    Enum(&'a EnumType),
}

impl TypeDeclRef<'_> {
    pub fn name(&self) -> &TypeName {
        match self {
            TypeDeclRef::Message(m) => &m.name,
            TypeDeclRef::Enum(e) => &e.name,
        }
    }
}

/// Failure to resolve a field path against a message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("message `{message}` has no field `{field}`")]
    UnknownField { message: String, field: String },
    #[error(
        "field `{field}` of `{message}` is not a message field and cannot be stepped into"
    )]
    NotAMessageField { message: String, field: String },
    #[error("type `{name}` is not known to this type system")]
    UnknownType { name: String },
}

/// An option value after reference resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// The option was a plain literal.
    Literal(OptionValue),
    /// The option referenced a field of the declaring type; the path has one
    /// segment per traversed message level.
    FieldRef { path: FieldPath, field: Field },
}

/// A collection of the types declared across the descriptor closure,
/// partitioned by declaration kind and keyed by qualified name.
#[derive(Debug, Default)]
pub struct TypeSystem {
    messages: IndexMap<String, (MessageType, FilePath)>,
    enums: IndexMap<String, (EnumType, FilePath)>,
    services: IndexMap<String, (Service, FilePath)>,
}

impl TypeSystem {
    /// Indexes every declaration of the given closure, including nested
    /// messages and enums.
    pub fn build(set: &DescriptorSet) -> Self {
        let mut ts = Self::default();
        for file in &set.files {
            for message in &file.messages {
                ts.index_message(message, &file.path);
            }
            for enumeration in &file.enums {
                ts.index_enum(enumeration, &file.path);
            }
            for service in &file.services {
                ts.services.insert(
                    service.name.qualified(),
                    (service.clone(), file.path.clone()),
                );
            }
        }
        ts
    }

    fn index_message(&mut self, message: &MessageType, file: &FilePath) {
        self.messages
            .insert(message.name.qualified(), (message.clone(), file.clone()));
        for nested in &message.messages {
            self.index_message(nested, file);
        }
        for enumeration in &message.enums {
            self.index_enum(enumeration, file);
        }
    }

    fn index_enum(&mut self, enumeration: &EnumType, file: &FilePath) {
        self.enums.insert(
            enumeration.name.qualified(),
            (enumeration.clone(), file.clone()),
        );
    }

    /// Looks up a message type by its qualified name.
    pub fn find_message(&self, name: &TypeName) -> Option<(&MessageType, &FilePath)> {
        self.messages
            .get(&name.qualified())
            .map(|(m, f)| (m, f))
    }

    /// Looks up an enum type by its qualified name.
    pub fn find_enum(&self, name: &TypeName) -> Option<(&EnumType, &FilePath)> {
        self.enums.get(&name.qualified()).map(|(e, f)| (e, f))
    }

    /// Looks up a message or enum type by its qualified name.
    pub fn find_message_or_enum(&self, name: &TypeName) -> Option<(TypeDeclRef<'_>, &FilePath)> {
        self.find_message(name)
            .map(|(m, f)| (TypeDeclRef::Message(m), f))
            .or_else(|| self.find_enum(name).map(|(e, f)| (TypeDeclRef::Enum(e), f)))
    }

    /// Looks up a service by its qualified name.
    pub fn find_service(&self, name: &TypeName) -> Option<&Service> {
        self.services.get(&name.qualified()).map(|(s, _)| s)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Resolves a field path against a message, stepping through nested
    /// message fields segment by segment.
    pub fn resolve_field_path(
        &self,
        path: &FieldPath,
        message: &MessageType,
    ) -> Result<Field, ResolveError> {
        let field = message
            .field(path.root())
            .ok_or_else(|| ResolveError::UnknownField {
                message: message.name.qualified(),
                field: path.root().to_owned(),
            })?;
        let Some(rest) = path.step_into() else {
            return Ok(field.clone());
        };
        let next_name =
            field
                .ty
                .as_message()
                .ok_or_else(|| ResolveError::NotAMessageField {
                    message: message.name.qualified(),
                    field: field.name.to_string(),
                })?;
        let (next_message, _) =
            self.find_message(next_name)
                .ok_or_else(|| ResolveError::UnknownType {
                    name: next_name.qualified(),
                })?;
        self.resolve_field_path(&rest, next_message)
    }

    /// Resolves the value of an option declared on the given message or one
    /// of its fields: literals stay literals, references become the field
    /// they point at.
    pub fn resolve_option(
        &self,
        option: &OptionSpec,
        declaring: &MessageType,
    ) -> Result<ResolvedValue, ResolveError> {
        match &option.value {
            OptionValue::Reference(path) => {
                let field = self.resolve_field_path(path, declaring)?;
                Ok(ResolvedValue::FieldRef {
                    path: path.clone(),
                    field,
                })
            }
            other => Ok(ResolvedValue::Literal(other.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_api::{
        Cardinality, Doc, EnumConstant, FieldType, PrimitiveType, SchemaFile, SyntaxVersion,
    };

    fn field(name: &str, number: i32, ty: FieldType) -> Field {
        Field {
            name: name.into(),
            number,
            ordinal: number as u32 - 1,
            ty,
            cardinality: Cardinality::Single,
            doc: Doc::default(),
            options: Vec::new(),
        }
    }

    fn fixture() -> DescriptorSet {
        let pkg = "acme.orders";
        let order = TypeName::new(pkg, "Order");
        let line_item = order.nested("LineItem");
        let status = TypeName::new(pkg, "Status");
        let file = FilePath::from("acme/orders.proto");
        DescriptorSet {
            files_to_generate: vec![file.clone()],
            files: vec![SchemaFile {
                path: file.clone(),
                package: pkg.into(),
                syntax: SyntaxVersion::Proto3,
                options: Vec::new(),
                messages: vec![MessageType {
                    name: order.clone(),
                    file: file.clone(),
                    ordinal: 0,
                    doc: Doc::default(),
                    options: Vec::new(),
                    fields: vec![
                        field("id", 1, FieldType::Primitive(PrimitiveType::Str)),
                        field("item", 2, FieldType::Message(line_item.clone())),
                        field("status", 3, FieldType::Enum(status.clone())),
                    ],
                    messages: vec![MessageType {
                        name: line_item.clone(),
                        file: file.clone(),
                        ordinal: 0,
                        doc: Doc::default(),
                        options: Vec::new(),
                        fields: vec![field(
                            "quantity",
                            1,
                            FieldType::Primitive(PrimitiveType::Int32),
                        )],
                        messages: Vec::new(),
                        enums: Vec::new(),
                    }],
                    enums: Vec::new(),
                }],
                enums: vec![EnumType {
                    name: status.clone(),
                    file: file.clone(),
                    ordinal: 0,
                    doc: Doc::default(),
                    options: Vec::new(),
                    constants: vec![EnumConstant {
                        name: "NEW".into(),
                        number: 0,
                        ordinal: 0,
                        doc: Doc::default(),
                        options: Vec::new(),
                    }],
                }],
                services: Vec::new(),
            }],
        }
    }

    #[test]
    fn finds_declarations_by_kind() {
        let ts = TypeSystem::build(&fixture());
        let pkg = "acme.orders";
        let (order, file) = ts.find_message(&TypeName::new(pkg, "Order")).unwrap();
        assert_eq!(order.fields.len(), 3);
        assert_eq!(file.as_str(), "acme/orders.proto");

        // A nested message is indexed under its qualified name.
        let nested = TypeName::new(pkg, "Order").nested("LineItem");
        assert!(ts.find_message(&nested).is_some());

        // Partitioned lookup: an enum name is not a message and vice versa.
        assert!(ts.find_message(&TypeName::new(pkg, "Status")).is_none());
        assert!(ts.find_enum(&TypeName::new(pkg, "Order")).is_none());
        assert!(ts.find_enum(&TypeName::new(pkg, "Status")).is_some());
        assert!(ts.find_message_or_enum(&TypeName::new(pkg, "Status")).is_some());
        assert!(ts.find_message(&TypeName::new(pkg, "Missing")).is_none());
    }

    #[test]
    fn resolves_sibling_field_reference() {
        let ts = TypeSystem::build(&fixture());
        let (order, _) = ts.find_message(&TypeName::new("acme.orders", "Order")).unwrap();
        let opt = OptionSpec::new("validate_with", OptionValue::parse("id"));
        let resolved = ts.resolve_option(&opt, order).unwrap();
        let ResolvedValue::FieldRef { path, field } = resolved else {
            panic!("expected a field reference");
        };
        assert_eq!(path.len(), 1);
        assert_eq!(field.name, "id");
    }

    #[test]
    fn resolves_nested_field_reference() {
        let ts = TypeSystem::build(&fixture());
        let (order, _) = ts.find_message(&TypeName::new("acme.orders", "Order")).unwrap();
        let opt = OptionSpec::new("validate_with", OptionValue::parse("item.quantity"));
        let resolved = ts.resolve_option(&opt, order).unwrap();
        let ResolvedValue::FieldRef { path, field } = resolved else {
            panic!("expected a field reference");
        };
        assert_eq!(path.len(), 2);
        assert_eq!(field.name, "quantity");
    }

    #[test]
    fn literal_options_resolve_to_themselves() {
        let ts = TypeSystem::build(&fixture());
        let (order, _) = ts.find_message(&TypeName::new("acme.orders", "Order")).unwrap();
        let opt = OptionSpec::new("max_size", OptionValue::Int(10));
        assert_eq!(
            ts.resolve_option(&opt, order).unwrap(),
            ResolvedValue::Literal(OptionValue::Int(10))
        );
    }

    #[test]
    fn stepping_into_a_scalar_field_fails() {
        let ts = TypeSystem::build(&fixture());
        let (order, _) = ts.find_message(&TypeName::new("acme.orders", "Order")).unwrap();
        let path = FieldPath::parse("id.anything").unwrap();
        let err = ts.resolve_field_path(&path, order).unwrap_err();
        assert!(matches!(err, ResolveError::NotAMessageField { .. }));
    }
}
