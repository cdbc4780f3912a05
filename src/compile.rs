//! Component compilation entry points.
//!
//! `compile` takes one parsed component (script items and markup elements in a
//! single module body) and returns the custom-element module for it. The
//! input program is consumed, so two compilations never share a subtree.

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crate::boilerplate::synthesize;
use crate::error::{CompilerError, ErrorKind, Result};
use crate::parse::parse_component;
use crate::props::extract_props;
use crate::tree::{ExportNamedDeclaration, ImportDeclaration, Program, ProgramItem};

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Superclass of the generated element class.
    pub base_class: String,
    /// Object whose `define` registers the element.
    pub registry: String,
    /// Emit `export class ...` rather than a bare class declaration.
    pub export_class: bool,
    /// Source path, attached to errors.
    pub file_path: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            base_class: "HTMLElement".to_string(),
            registry: "customElements".to_string(),
            export_class: true,
            file_path: String::new(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Top-level items of a component, bucketed. Source order is kept per bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub imports: Vec<ImportDeclaration>,
    pub exports: Vec<ExportNamedDeclaration>,
    /// Bare statements and markup. Not rendered into the class yet.
    pub fragment: Vec<ProgramItem>,
}

/// Bucket the items of `program`, rejecting default and wildcard exports.
pub fn classify(program: Program) -> Result<Classified> {
    let mut classified = Classified::default();

    for item in program.body {
        match item {
            ProgramItem::ImportDeclaration(import) => classified.imports.push(import),
            ProgramItem::ExportNamedDeclaration(export) => classified.exports.push(export),
            ProgramItem::ExportDefaultDeclaration(_) => {
                return Err(CompilerError::new(
                    ErrorKind::UnsupportedExportShape,
                    "ExportDefaultDeclaration is not supported",
                )
                .with_context("ExportDefaultDeclaration")
                .with_hint("Props are declared with named exports, e.g. `export let title`"));
            }
            ProgramItem::ExportAllDeclaration(_) => {
                return Err(CompilerError::new(
                    ErrorKind::UnsupportedExportShape,
                    "ExportAllDeclaration is not supported",
                )
                .with_context("ExportAllDeclaration"));
            }
            item @ (ProgramItem::Element(_) | ProgramItem::Statement(_)) => {
                classified.fragment.push(item)
            }
        }
    }

    Ok(classified)
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE
// ═══════════════════════════════════════════════════════════════════════════════

/// Compile a parsed component with default options.
pub fn compile(name: &str, program: Program) -> Result<Program> {
    compile_with_options(name, program, &CompileOptions::default())
}

pub fn compile_with_options(
    name: &str,
    program: Program,
    options: &CompileOptions,
) -> Result<Program> {
    let _span = debug_span!("compile", component = name).entered();

    let run = || -> Result<Program> {
        let Classified {
            imports,
            exports,
            fragment,
        } = classify(program)?;
        debug!(
            imports = imports.len(),
            exports = exports.len(),
            fragment = fragment.len(),
            "classified component items"
        );
        if !fragment.is_empty() {
            warn!(
                component = name,
                items = fragment.len(),
                "statements and markup are not rendered into the element yet"
            );
        }

        let props = extract_props(&exports)?;
        synthesize(name, &props, imports, options)
    };

    run().map_err(|e| e.with_file(&options.file_path))
}

/// Split, parse and compile one `.lazy` source text.
pub fn compile_source(name: &str, source: &str, options: &CompileOptions) -> Result<Program> {
    let program = parse_component(source).map_err(|e| e.with_file(&options.file_path))?;
    compile_with_options(name, program, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{
        DefaultExport, Element, ExportAllDeclaration, ExportDefaultDeclaration, Expression,
        Literal, Statement,
    };

    #[test]
    fn test_classify_keeps_order_per_bucket() {
        let first = ProgramItem::Statement(Statement::expression(Expression::identifier("a")));
        let element = ProgramItem::Element(Element {
            tag: "p".to_string(),
            attributes: vec![],
            children: vec![],
        });
        let second = ProgramItem::Statement(Statement::expression(Expression::identifier("b")));
        let program = Program::module(vec![first.clone(), element.clone(), second.clone()]);

        let classified = classify(program).unwrap();
        assert!(classified.imports.is_empty());
        assert!(classified.exports.is_empty());
        assert_eq!(classified.fragment, vec![first, element, second]);
    }

    #[test]
    fn test_default_export_rejected() {
        let program = Program::module(vec![ProgramItem::ExportDefaultDeclaration(
            ExportDefaultDeclaration {
                declaration: DefaultExport::Expression(Expression::identifier("x")),
            },
        )]);
        let err = compile("x-a", program).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedExportShape);
        assert_eq!(err.context.as_deref(), Some("ExportDefaultDeclaration"));
    }

    #[test]
    fn test_export_all_rejected() {
        let program = Program::module(vec![ProgramItem::ExportAllDeclaration(
            ExportAllDeclaration {
                source: Literal::string("./x.js"),
                exported: None,
            },
        )]);
        let err = compile("x-a", program).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedExportShape);
    }

    #[test]
    fn test_errors_carry_file_path() {
        let program = Program::module(vec![ProgramItem::ExportAllDeclaration(
            ExportAllDeclaration {
                source: Literal::string("./x.js"),
                exported: None,
            },
        )]);
        let options = CompileOptions {
            file_path: "src/x-a.lazy".to_string(),
            ..CompileOptions::default()
        };
        let err = compile_with_options("x-a", program, &options).unwrap_err();
        assert_eq!(err.file, "src/x-a.lazy");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: CompileOptions =
            serde_json::from_str(r#"{ "baseClass": "LitElement" }"#).unwrap();
        assert_eq!(options.base_class, "LitElement");
        assert_eq!(options.registry, "customElements");
        assert!(options.export_class);
    }
}
