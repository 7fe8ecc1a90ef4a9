use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Root-relative path of a schema or source file.
///
/// Used as a map key throughout the pipeline; equality is structural.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FilePath(SmolStr);

impl FilePath {
    pub fn new(path: impl Into<SmolStr>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The part of the file name after the last `.`, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.0.rsplit('/').next()?;
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext)
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FilePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Name of a declared type: the package, the enclosing message names
/// (outermost first), and the simple name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    pub package: SmolStr,
    pub nesting: Vec<SmolStr>,
    pub simple: SmolStr,
}

impl TypeName {
    pub fn new(package: impl Into<SmolStr>, simple: impl Into<SmolStr>) -> Self {
        Self {
            package: package.into(),
            nesting: Vec::new(),
            simple: simple.into(),
        }
    }

    /// Name of a type declared directly inside this one.
    pub fn nested(&self, simple: impl Into<SmolStr>) -> Self {
        let mut nesting = self.nesting.clone();
        nesting.push(self.simple.clone());
        Self {
            package: self.package.clone(),
            nesting,
            simple: simple.into(),
        }
    }

    /// Dot-separated qualified name, e.g. `acme.orders.Order.LineItem`.
    pub fn qualified(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&self.package);
            out.push('.');
        }
        for enclosing in &self.nesting {
            out.push_str(enclosing);
            out.push('.');
        }
        out.push_str(&self.simple);
        out
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// Identity of a view aggregate, derived from an event by the view's
/// routing function.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewKey {
    Type(TypeName),
    File(FilePath),
    Label(SmolStr),
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKey::Type(name) => write!(f, "type:{}", name.qualified()),
            ViewKey::File(path) => write!(f, "file:{path}"),
            ViewKey::Label(label) => write!(f, "label:{label}"),
        }
    }
}
