//! Translates descriptor trees into the compiler event stream.
//!
//! The walk is a depth-first pre/post traversal: every compound declaration
//! opens with an `Entered` event and closes with the matching `Exited`
//! event, with member events in declaration order in between. The order is
//! deterministic for identical input; re-invoke the producer to regenerate
//! the stream.

use stencil_api::{
    CompilerEvent, DescriptorSet, EnumType, FileHeader, MessageType, SchemaFile, Service,
};
use tracing::debug;

/// Produces the event stream for the files a run generates code for.
pub struct EventProducer<'a> {
    set: &'a DescriptorSet,
}

impl<'a> EventProducer<'a> {
    pub fn new(set: &'a DescriptorSet) -> Self {
        Self { set }
    }

    /// The full, finite event sequence, in traversal order.
    pub fn events(&self) -> Vec<CompilerEvent> {
        let mut out = Vec::new();
        for file in self.set.generated_files() {
            self.file_events(file, &mut out);
        }
        debug!(events = out.len(), "descriptor walk finished");
        out
    }

    fn file_events(&self, file: &SchemaFile, out: &mut Vec<CompilerEvent>) {
        out.push(CompilerEvent::FileEntered {
            file: FileHeader {
                path: file.path.clone(),
                package: file.package.clone(),
                syntax: file.syntax,
            },
        });
        for option in &file.options {
            out.push(CompilerEvent::FileOptionDiscovered {
                file: file.path.clone(),
                option: option.clone(),
            });
        }
        for message in &file.messages {
            self.message_events(message, out);
        }
        for enumeration in &file.enums {
            self.enum_events(enumeration, out);
        }
        for service in &file.services {
            self.service_events(service, out);
        }
        out.push(CompilerEvent::FileExited {
            file: file.path.clone(),
        });
    }

    fn message_events(&self, message: &MessageType, out: &mut Vec<CompilerEvent>) {
        out.push(CompilerEvent::TypeEntered {
            file: message.file.clone(),
            name: message.name.clone(),
            ordinal: message.ordinal,
            doc: message.doc.clone(),
        });
        for option in &message.options {
            out.push(CompilerEvent::TypeOptionDiscovered {
                file: message.file.clone(),
                name: message.name.clone(),
                option: option.clone(),
            });
        }
        for field in &message.fields {
            out.push(CompilerEvent::FieldDiscovered {
                file: message.file.clone(),
                declaring_type: message.name.clone(),
                field: field.clone(),
            });
            for option in &field.options {
                out.push(CompilerEvent::FieldOptionDiscovered {
                    file: message.file.clone(),
                    declaring_type: message.name.clone(),
                    field: field.name.clone(),
                    option: option.clone(),
                });
            }
        }
        for nested in &message.messages {
            self.message_events(nested, out);
        }
        for enumeration in &message.enums {
            self.enum_events(enumeration, out);
        }
        out.push(CompilerEvent::TypeExited {
            file: message.file.clone(),
            name: message.name.clone(),
        });
    }

    fn enum_events(&self, enumeration: &EnumType, out: &mut Vec<CompilerEvent>) {
        out.push(CompilerEvent::EnumEntered {
            file: enumeration.file.clone(),
            name: enumeration.name.clone(),
            ordinal: enumeration.ordinal,
            doc: enumeration.doc.clone(),
        });
        for option in &enumeration.options {
            out.push(CompilerEvent::EnumOptionDiscovered {
                file: enumeration.file.clone(),
                name: enumeration.name.clone(),
                option: option.clone(),
            });
        }
        for constant in &enumeration.constants {
            out.push(CompilerEvent::ConstantEntered {
                file: enumeration.file.clone(),
                declaring_enum: enumeration.name.clone(),
                constant: constant.clone(),
            });
            for option in &constant.options {
                out.push(CompilerEvent::ConstantOptionDiscovered {
                    file: enumeration.file.clone(),
                    declaring_enum: enumeration.name.clone(),
                    constant: constant.name.clone(),
                    option: option.clone(),
                });
            }
            out.push(CompilerEvent::ConstantExited {
                file: enumeration.file.clone(),
                declaring_enum: enumeration.name.clone(),
                constant: constant.name.clone(),
            });
        }
        out.push(CompilerEvent::EnumExited {
            file: enumeration.file.clone(),
            name: enumeration.name.clone(),
        });
    }

    fn service_events(&self, service: &Service, out: &mut Vec<CompilerEvent>) {
        out.push(CompilerEvent::ServiceDiscovered {
            file: service.file.clone(),
            service: service.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_api::{
        Cardinality, Doc, EnumConstant, EventKind, Field, FieldType, FilePath, OptionSpec,
        OptionValue, PrimitiveType, SyntaxVersion, TypeName,
    };

    fn color_file() -> SchemaFile {
        let color = TypeName::new("palette", "Color");
        let constant = |name: &str, number: i32| EnumConstant {
            name: name.into(),
            number,
            ordinal: number as u32,
            doc: Doc::default(),
            options: Vec::new(),
        };
        SchemaFile {
            path: FilePath::from("palette.proto"),
            package: "palette".into(),
            syntax: SyntaxVersion::Proto3,
            options: Vec::new(),
            messages: Vec::new(),
            enums: vec![EnumType {
                name: color,
                file: FilePath::from("palette.proto"),
                ordinal: 0,
                doc: Doc::default(),
                options: Vec::new(),
                constants: vec![constant("RED", 0), constant("GREEN", 1)],
            }],
            services: Vec::new(),
        }
    }

    fn set_of(file: SchemaFile) -> DescriptorSet {
        DescriptorSet {
            files_to_generate: vec![file.path.clone()],
            files: vec![file],
        }
    }

    #[test]
    fn enum_stream_is_bracketed_in_declaration_order() {
        let events = EventProducer::new(&set_of(color_file())).events();
        let kinds: Vec<EventKind> = events.iter().map(CompilerEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::FileEntered,
                EventKind::EnumEntered,
                EventKind::ConstantEntered,
                EventKind::ConstantExited,
                EventKind::ConstantEntered,
                EventKind::ConstantExited,
                EventKind::EnumExited,
                EventKind::FileExited,
            ]
        );
        let CompilerEvent::ConstantEntered { constant, .. } = &events[2] else {
            panic!("expected the first constant");
        };
        assert_eq!(constant.name, "RED");
        let CompilerEvent::ConstantEntered { constant, .. } = &events[4] else {
            panic!("expected the second constant");
        };
        assert_eq!(constant.name, "GREEN");
    }

    #[test]
    fn imported_files_produce_no_events() {
        let mut set = set_of(color_file());
        let mut imported = color_file();
        imported.path = FilePath::from("imported.proto");
        set.files.push(imported);
        let events = EventProducer::new(&set).events();
        assert!(events
            .iter()
            .all(|e| e.file().is_none_or(|f| f.as_str() == "palette.proto")));
    }

    #[test]
    fn nested_declarations_never_interleave() {
        let file = FilePath::from("acme/orders.proto");
        let order = TypeName::new("acme", "Order");
        let nested = order.nested("LineItem");
        let set = set_of(SchemaFile {
            path: file.clone(),
            package: "acme".into(),
            syntax: SyntaxVersion::Proto3,
            options: vec![OptionSpec::new("java_package", OptionValue::parse("\"com.acme\""))],
            messages: vec![MessageType {
                name: order.clone(),
                file: file.clone(),
                ordinal: 0,
                doc: Doc::default(),
                options: Vec::new(),
                fields: vec![Field {
                    name: "id".into(),
                    number: 1,
                    ordinal: 0,
                    ty: FieldType::Primitive(PrimitiveType::Str),
                    cardinality: Cardinality::Single,
                    doc: Doc::default(),
                    options: vec![OptionSpec::new("required", OptionValue::Bool(true))],
                }],
                messages: vec![MessageType {
                    name: nested.clone(),
                    file: file.clone(),
                    ordinal: 0,
                    doc: Doc::default(),
                    options: Vec::new(),
                    fields: Vec::new(),
                    messages: Vec::new(),
                    enums: Vec::new(),
                }],
                enums: Vec::new(),
            }],
            enums: Vec::new(),
            services: Vec::new(),
        });
        let events = EventProducer::new(&set).events();

        // Every Entered has exactly one matching Exited and the open ranges
        // nest like parentheses.
        let mut stack: Vec<String> = Vec::new();
        for event in &events {
            match event {
                CompilerEvent::FileEntered { file } => stack.push(format!("file:{}", file.path)),
                CompilerEvent::TypeEntered { name, .. } => {
                    stack.push(format!("type:{}", name.qualified()));
                }
                CompilerEvent::FileExited { file } => {
                    assert_eq!(stack.pop(), Some(format!("file:{file}")));
                }
                CompilerEvent::TypeExited { name, .. } => {
                    assert_eq!(stack.pop(), Some(format!("type:{}", name.qualified())));
                }
                CompilerEvent::FieldDiscovered { declaring_type, .. } => {
                    assert_eq!(
                        stack.last(),
                        Some(&format!("type:{}", declaring_type.qualified()))
                    );
                }
                _ => {}
            }
        }
        assert!(stack.is_empty(), "unbalanced brackets: {stack:?}");

        // Options come right after their owner enters.
        assert_eq!(events[1].kind(), EventKind::FileOptionDiscovered);
        assert_eq!(events[3].kind(), EventKind::FieldDiscovered);
        assert_eq!(events[4].kind(), EventKind::FieldOptionDiscovered);
    }

    #[test]
    fn two_walks_produce_the_same_stream() {
        let set = set_of(color_file());
        let producer = EventProducer::new(&set);
        assert_eq!(producer.events(), producer.events());
    }
}
