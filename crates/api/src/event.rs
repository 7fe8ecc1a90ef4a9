//! The vocabulary of facts describing a declared API surface.
//!
//! Events are immutable once produced. `Entered`/`Exited` events for a
//! compound declaration nest like parentheses: every `Entered` is eventually
//! followed by exactly one matching `Exited`, and sibling ranges never
//! overlap.

use crate::ast::{Doc, EnumConstant, Field, Service, SyntaxVersion};
use crate::name::{FilePath, TypeName};
use crate::value::OptionSpec;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// File metadata carried by [`CompilerEvent::FileEntered`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub path: FilePath,
    pub package: SmolStr,
    pub syntax: SyntaxVersion,
}

/// One step of traversing or deriving from the descriptor model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum CompilerEvent {
    FileEntered {
        file: FileHeader,
    },
    FileOptionDiscovered {
        file: FilePath,
        option: OptionSpec,
    },
    FileExited {
        file: FilePath,
    },
    TypeEntered {
        file: FilePath,
        name: TypeName,
        ordinal: u32,
        doc: Doc,
    },
    TypeOptionDiscovered {
        file: FilePath,
        name: TypeName,
        option: OptionSpec,
    },
    FieldDiscovered {
        file: FilePath,
        declaring_type: TypeName,
        field: Field,
    },
    FieldOptionDiscovered {
        file: FilePath,
        declaring_type: TypeName,
        field: SmolStr,
        option: OptionSpec,
    },
    TypeExited {
        file: FilePath,
        name: TypeName,
    },
    EnumEntered {
        file: FilePath,
        name: TypeName,
        ordinal: u32,
        doc: Doc,
    },
    EnumOptionDiscovered {
        file: FilePath,
        name: TypeName,
        option: OptionSpec,
    },
    ConstantEntered {
        file: FilePath,
        declaring_enum: TypeName,
        constant: EnumConstant,
    },
    ConstantOptionDiscovered {
        file: FilePath,
        declaring_enum: TypeName,
        constant: SmolStr,
        option: OptionSpec,
    },
    ConstantExited {
        file: FilePath,
        declaring_enum: TypeName,
        constant: SmolStr,
    },
    EnumExited {
        file: FilePath,
        name: TypeName,
    },
    ServiceDiscovered {
        file: FilePath,
        service: Service,
    },
    /// A fact derived by a policy rather than by the descriptor walk.
    Derived {
        kind: SmolStr,
        subject: Option<TypeName>,
        payload: serde_json::Value,
    },
}

/// Field-less discriminant of [`CompilerEvent`], used by policies and views
/// to declare which variants they consume.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    FileEntered,
    FileOptionDiscovered,
    FileExited,
    TypeEntered,
    TypeOptionDiscovered,
    FieldDiscovered,
    FieldOptionDiscovered,
    TypeExited,
    EnumEntered,
    EnumOptionDiscovered,
    ConstantEntered,
    ConstantOptionDiscovered,
    ConstantExited,
    EnumExited,
    ServiceDiscovered,
    Derived,
}

impl CompilerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CompilerEvent::FileEntered { .. } => EventKind::FileEntered,
            CompilerEvent::FileOptionDiscovered { .. } => EventKind::FileOptionDiscovered,
            CompilerEvent::FileExited { .. } => EventKind::FileExited,
            CompilerEvent::TypeEntered { .. } => EventKind::TypeEntered,
            CompilerEvent::TypeOptionDiscovered { .. } => EventKind::TypeOptionDiscovered,
            CompilerEvent::FieldDiscovered { .. } => EventKind::FieldDiscovered,
            CompilerEvent::FieldOptionDiscovered { .. } => EventKind::FieldOptionDiscovered,
            CompilerEvent::TypeExited { .. } => EventKind::TypeExited,
            CompilerEvent::EnumEntered { .. } => EventKind::EnumEntered,
            CompilerEvent::EnumOptionDiscovered { .. } => EventKind::EnumOptionDiscovered,
            CompilerEvent::ConstantEntered { .. } => EventKind::ConstantEntered,
            CompilerEvent::ConstantOptionDiscovered { .. } => EventKind::ConstantOptionDiscovered,
            CompilerEvent::ConstantExited { .. } => EventKind::ConstantExited,
            CompilerEvent::EnumExited { .. } => EventKind::EnumExited,
            CompilerEvent::ServiceDiscovered { .. } => EventKind::ServiceDiscovered,
            CompilerEvent::Derived { .. } => EventKind::Derived,
        }
    }

    /// The file the event concerns, if any.
    pub fn file(&self) -> Option<&FilePath> {
        match self {
            CompilerEvent::FileEntered { file } => Some(&file.path),
            CompilerEvent::FileOptionDiscovered { file, .. }
            | CompilerEvent::FileExited { file }
            | CompilerEvent::TypeEntered { file, .. }
            | CompilerEvent::TypeOptionDiscovered { file, .. }
            | CompilerEvent::FieldDiscovered { file, .. }
            | CompilerEvent::FieldOptionDiscovered { file, .. }
            | CompilerEvent::TypeExited { file, .. }
            | CompilerEvent::EnumEntered { file, .. }
            | CompilerEvent::EnumOptionDiscovered { file, .. }
            | CompilerEvent::ConstantEntered { file, .. }
            | CompilerEvent::ConstantOptionDiscovered { file, .. }
            | CompilerEvent::ConstantExited { file, .. }
            | CompilerEvent::EnumExited { file, .. }
            | CompilerEvent::ServiceDiscovered { file, .. } => Some(file),
            CompilerEvent::Derived { .. } => None,
        }
    }

    /// The type the event concerns, if any.
    pub fn subject_type(&self) -> Option<&TypeName> {
        match self {
            CompilerEvent::TypeEntered { name, .. }
            | CompilerEvent::TypeOptionDiscovered { name, .. }
            | CompilerEvent::TypeExited { name, .. }
            | CompilerEvent::EnumEntered { name, .. }
            | CompilerEvent::EnumOptionDiscovered { name, .. }
            | CompilerEvent::EnumExited { name, .. } => Some(name),
            CompilerEvent::FieldDiscovered { declaring_type, .. }
            | CompilerEvent::FieldOptionDiscovered { declaring_type, .. } => Some(declaring_type),
            CompilerEvent::ConstantEntered { declaring_enum, .. }
            | CompilerEvent::ConstantOptionDiscovered { declaring_enum, .. }
            | CompilerEvent::ConstantExited { declaring_enum, .. } => Some(declaring_enum),
            CompilerEvent::ServiceDiscovered { service, .. } => Some(&service.name),
            CompilerEvent::Derived { subject, .. } => subject.as_ref(),
            _ => None,
        }
    }
}
