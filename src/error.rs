use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR KINDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Every way a single component compilation can fail. None are recoverable:
/// the unit is abandoned and no output is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// `export default ...`, `export * from ...`, or a re-export from another module.
    UnsupportedExportShape,
    /// An exported declaration other than a variable or function declaration.
    UnsupportedDeclarationShape,
    /// A destructuring pattern in an exported variable declaration.
    UnsupportedBindingPattern,
    /// A named export with neither a declaration nor specifiers.
    MalformedExport,
    /// A specifier list entry that is not a plain `local as exported` specifier.
    MalformedSpecifier,
    /// Two props share an external name, an accessor key or a backing binding.
    DuplicateProp,
    /// The component name does not turn into a valid class name.
    InvalidComponentName,
    ScriptSyntax,
    TemplateSyntax,
    /// Valid source the tree model has no shape for.
    UnsupportedSyntax,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedExportShape => "LAZY-E001",
            ErrorKind::UnsupportedDeclarationShape => "LAZY-E002",
            ErrorKind::UnsupportedBindingPattern => "LAZY-E003",
            ErrorKind::MalformedExport => "LAZY-E004",
            ErrorKind::MalformedSpecifier => "LAZY-E005",
            ErrorKind::DuplicateProp => "LAZY-E006",
            ErrorKind::InvalidComponentName => "LAZY-E007",
            ErrorKind::ScriptSyntax => "LAZY-E101",
            ErrorKind::TemplateSyntax => "LAZY-E102",
            ErrorKind::UnsupportedSyntax => "LAZY-E103",
        }
    }

    fn guarantee(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedExportShape => {
                "A component is described only by its named exports; default and wildcard exports have no prop mapping."
            }
            ErrorKind::UnsupportedDeclarationShape => {
                "Only exported variables and functions become props."
            }
            ErrorKind::UnsupportedBindingPattern => {
                "Every exported binding maps to exactly one named prop."
            }
            ErrorKind::MalformedExport => "Every named export declares or re-exports something.",
            ErrorKind::MalformedSpecifier => "Re-exports name a local binding and an external name.",
            ErrorKind::DuplicateProp => {
                "Prop external names, accessor keys and backing bindings are unique within a component."
            }
            ErrorKind::InvalidComponentName => "Every component name yields a JavaScript class name.",
            ErrorKind::ScriptSyntax => "The script region is a valid module.",
            ErrorKind::TemplateSyntax => "The template region is well-formed markup.",
            ErrorKind::UnsupportedSyntax => "All accepted syntax has a tree model representation.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code}] {message}")]
pub struct CompilerError {
    pub code: String,
    pub kind: ErrorKind,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub context: Option<String>,
    pub hints: Vec<String>,
}

impl CompilerError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CompilerError {
            code: kind.code().to_string(),
            kind,
            message: message.into(),
            guarantee: kind.guarantee().to_string(),
            file: String::new(),
            context: None,
            hints: Vec::new(),
        }
    }

    /// Short description of the offending node, e.g. `ClassDeclaration`.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn with_file(mut self, file: &str) -> Self {
        if self.file.is_empty() {
            self.file = file.to_string();
        }
        self
    }
}

pub type Result<T, E = CompilerError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_carries_code_and_guarantee() {
        let err = CompilerError::new(ErrorKind::MalformedExport, "empty export")
            .with_context("ExportNamedDeclaration")
            .with_file("card.lazy");

        assert_eq!(err.code, "LAZY-E004");
        assert_eq!(err.kind, ErrorKind::MalformedExport);
        assert!(!err.guarantee.is_empty());
        assert_eq!(err.context.as_deref(), Some("ExportNamedDeclaration"));
        assert_eq!(err.file, "card.lazy");
        assert_eq!(err.to_string(), "[LAZY-E004] empty export");
    }

    #[test]
    fn test_with_file_keeps_first_file() {
        let err = CompilerError::new(ErrorKind::ScriptSyntax, "bad")
            .with_file("a.lazy")
            .with_file("b.lazy");
        assert_eq!(err.file, "a.lazy");
    }
}
