//! Target languages of generated code.

use crate::name::FilePath;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// How a language writes a one-line comment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentSyntax {
    pub prefix: SmolStr,
    pub suffix: Option<SmolStr>,
}

impl CommentSyntax {
    pub fn line(prefix: impl Into<SmolStr>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: None,
        }
    }

    pub fn block(prefix: impl Into<SmolStr>, suffix: impl Into<SmolStr>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: Some(suffix.into()),
        }
    }
}

/// A programming language targeted by renderers.
///
/// Equality is by name; the extension list decides which files a renderer
/// bound to this language is handed.
#[derive(Serialize, Deserialize, Debug, Clone, Eq)]
pub struct Language {
    name: SmolStr,
    extensions: Vec<SmolStr>,
    comment: CommentSyntax,
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::hash::Hash for Language {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

static JAVA: Lazy<Language> = Lazy::new(|| {
    Language::new("Java", ["java"], CommentSyntax::line("//"))
});
static KOTLIN: Lazy<Language> = Lazy::new(|| {
    Language::new("Kotlin", ["kt", "kts"], CommentSyntax::line("//"))
});
static RUST: Lazy<Language> = Lazy::new(|| {
    Language::new("Rust", ["rs"], CommentSyntax::line("//"))
});
static TYPE_SCRIPT: Lazy<Language> = Lazy::new(|| {
    Language::new("TypeScript", ["ts"], CommentSyntax::line("//"))
});
static ANY: Lazy<Language> = Lazy::new(|| {
    Language::new("any language", [] as [&str; 0], CommentSyntax::line("//"))
});

impl Language {
    pub fn new(
        name: impl Into<SmolStr>,
        extensions: impl IntoIterator<Item = impl Into<SmolStr>>,
        comment: CommentSyntax,
    ) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
            comment,
        }
    }

    pub fn java() -> Language {
        JAVA.clone()
    }

    pub fn kotlin() -> Language {
        KOTLIN.clone()
    }

    pub fn rust() -> Language {
        RUST.clone()
    }

    pub fn type_script() -> Language {
        TYPE_SCRIPT.clone()
    }

    /// A wildcard language matching every file.
    pub fn any() -> Language {
        ANY.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a file with this path is written in this language.
    pub fn matches(&self, path: &FilePath) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match path.extension() {
            Some(ext) => self.extensions.iter().any(|e| e == ext),
            None => false,
        }
    }

    /// Wraps the given text into a comment in this language.
    pub fn comment(&self, text: &str) -> String {
        match &self.comment.suffix {
            Some(suffix) => format!("{} {} {}", self.comment.prefix, text, suffix),
            None => format!("{} {}", self.comment.prefix, text),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_by_extension() {
        let java = Language::java();
        assert!(java.matches(&FilePath::from("com/acme/Order.java")));
        assert!(!java.matches(&FilePath::from("com/acme/order.ts")));
        assert!(!java.matches(&FilePath::from("LICENSE")));
    }

    #[test]
    fn any_matches_everything() {
        assert!(Language::any().matches(&FilePath::from("LICENSE")));
    }

    #[test]
    fn comment_wrapping() {
        assert_eq!(Language::java().comment("marker"), "// marker");
        let c = Language::new("C89", ["c"], CommentSyntax::block("/*", "*/"));
        assert_eq!(c.comment("marker"), "/* marker */");
    }
}
