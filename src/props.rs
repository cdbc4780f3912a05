//! Prop extraction.
//!
//! Every named export of the script region becomes one or more props: the
//! component's externally observable values. Order follows the source, and
//! multi-binding declarations keep their left-to-right binding order.

use serde::Serialize;
use tracing::trace;

use crate::error::{CompilerError, ErrorKind, Result};
use crate::tree::{
    Declaration, ExportClause, ExportNamedDeclaration, Expression, Pattern, VariableKind,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prop {
    /// Name consumers observe and set, e.g. as an attribute.
    pub external_name: String,
    /// Name of the backing binding inside the generated constructor scope.
    pub internal_name: String,
    pub initial_value: Option<Expression>,
    pub constant: bool,
}

/// Turn the named exports of a component script into props.
pub fn extract_props(exports: &[ExportNamedDeclaration]) -> Result<Vec<Prop>> {
    let mut props = Vec::new();

    for export in exports {
        match &export.declaration {
            Some(declaration) => declaration_props(declaration, &mut props)?,
            None if !export.specifiers.is_empty() => specifier_props(export, &mut props)?,
            None => {
                return Err(CompilerError::new(
                    ErrorKind::MalformedExport,
                    "Named export has neither a declaration nor specifiers",
                )
                .with_context("ExportNamedDeclaration"));
            }
        }
    }

    trace!(count = props.len(), "extracted props");
    Ok(props)
}

fn declaration_props(declaration: &Declaration, props: &mut Vec<Prop>) -> Result<()> {
    match declaration {
        Declaration::VariableDeclaration(variables) => {
            let constant = variables.kind == VariableKind::Const;
            for declarator in &variables.declarations {
                let Pattern::Identifier(id) = &declarator.id else {
                    return Err(CompilerError::new(
                        ErrorKind::UnsupportedBindingPattern,
                        "Exported variables must bind a plain identifier",
                    )
                    .with_context(declarator.id.kind())
                    .with_hint("Export each value under its own name, e.g. `export let a, b`"));
                };
                props.push(Prop {
                    external_name: id.name.clone(),
                    internal_name: id.name.clone(),
                    initial_value: declarator.init.clone(),
                    constant,
                });
            }
        }

        Declaration::FunctionDeclaration(function) => {
            let Some(id) = &function.id else {
                return Err(CompilerError::new(
                    ErrorKind::MalformedExport,
                    "Exported function declaration has no name",
                )
                .with_context("FunctionDeclaration"));
            };
            props.push(Prop {
                external_name: id.name.clone(),
                internal_name: id.name.clone(),
                initial_value: Some(Expression::FunctionExpression(function.clone())),
                constant: true,
            });
        }

        Declaration::ClassDeclaration(_) => {
            return Err(CompilerError::new(
                ErrorKind::UnsupportedDeclarationShape,
                format!("Unexpected declaration type: {}", declaration.kind()),
            )
            .with_context(declaration.kind())
            .with_hint("Only `let`, `const`, `var` and `function` exports become props"));
        }
    }

    Ok(())
}

fn specifier_props(export: &ExportNamedDeclaration, props: &mut Vec<Prop>) -> Result<()> {
    if let Some(source) = &export.source {
        return Err(CompilerError::new(
            ErrorKind::UnsupportedExportShape,
            format!(
                "Re-exporting from '{}' is not supported",
                source.as_str().unwrap_or_default()
            ),
        )
        .with_context("ExportNamedDeclaration")
        .with_hint("Import the value first, then export the local binding"));
    }

    for clause in &export.specifiers {
        let ExportClause::ExportSpecifier(specifier) = clause else {
            return Err(CompilerError::new(
                ErrorKind::MalformedSpecifier,
                format!("Unexpected export specifier: {}", clause.kind()),
            )
            .with_context(clause.kind()));
        };

        let (Some(local), Some(exported)) = (specifier.local.name(), specifier.exported.name())
        else {
            return Err(CompilerError::new(
                ErrorKind::MalformedSpecifier,
                "Export specifier names must be identifiers or strings",
            )
            .with_context("ExportSpecifier"));
        };

        props.push(Prop {
            external_name: exported.to_string(),
            internal_name: local.to_string(),
            initial_value: Some(Expression::identifier(local)),
            constant: true,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{
        BlockStatement, Class, ClassBody, ExportSpecifier, ExportedName, Function, Identifier,
        Literal, ModuleExportName, ObjectPattern, VariableDeclaration, VariableDeclarator,
    };

    fn export_variables(kind: VariableKind, names: &[(&str, Option<Expression>)]) -> ExportNamedDeclaration {
        ExportNamedDeclaration::declaration(Declaration::VariableDeclaration(
            VariableDeclaration {
                kind,
                declarations: names
                    .iter()
                    .map(|(name, init)| VariableDeclarator {
                        id: Pattern::identifier(name),
                        init: init.clone(),
                    })
                    .collect(),
            },
        ))
    }

    fn export_specifiers(pairs: &[(&str, &str)]) -> ExportNamedDeclaration {
        ExportNamedDeclaration {
            declaration: None,
            specifiers: pairs
                .iter()
                .map(|(local, exported)| {
                    ExportClause::ExportSpecifier(ExportSpecifier {
                        local: ModuleExportName::identifier(local),
                        exported: ModuleExportName::identifier(exported),
                    })
                })
                .collect(),
            source: None,
        }
    }

    #[test]
    fn test_converts_exports_to_props() {
        let function = Function {
            id: Some(Identifier::new("test")),
            params: vec![],
            body: BlockStatement::default(),
            generator: false,
            is_async: false,
        };
        let exports = vec![
            export_variables(VariableKind::Let, &[("hello", None), ("greetings", None)]),
            export_variables(VariableKind::Const, &[("world", Some(Expression::string("")))]),
            ExportNamedDeclaration::declaration(Declaration::FunctionDeclaration(Box::new(
                function.clone(),
            ))),
            export_specifiers(&[("hello", "x")]),
        ];

        let props = extract_props(&exports).unwrap();

        assert_eq!(
            props,
            vec![
                Prop {
                    external_name: "hello".into(),
                    internal_name: "hello".into(),
                    initial_value: None,
                    constant: false,
                },
                Prop {
                    external_name: "greetings".into(),
                    internal_name: "greetings".into(),
                    initial_value: None,
                    constant: false,
                },
                Prop {
                    external_name: "world".into(),
                    internal_name: "world".into(),
                    initial_value: Some(Expression::string("")),
                    constant: true,
                },
                Prop {
                    external_name: "test".into(),
                    internal_name: "test".into(),
                    initial_value: Some(Expression::FunctionExpression(Box::new(function))),
                    constant: true,
                },
                Prop {
                    external_name: "x".into(),
                    internal_name: "hello".into(),
                    initial_value: Some(Expression::identifier("hello")),
                    constant: true,
                },
            ]
        );
    }

    #[test]
    fn test_var_is_mutable() {
        let props = extract_props(&[export_variables(VariableKind::Var, &[("count", None)])]).unwrap();
        assert!(!props[0].constant);
    }

    #[test]
    fn test_string_export_name() {
        let export = ExportNamedDeclaration {
            declaration: None,
            specifiers: vec![ExportClause::ExportSpecifier(ExportSpecifier {
                local: ModuleExportName::identifier("label"),
                exported: ModuleExportName::Literal(Literal::string("aria-label")),
            })],
            source: None,
        };
        let props = extract_props(&[export]).unwrap();
        assert_eq!(props[0].external_name, "aria-label");
        assert_eq!(props[0].internal_name, "label");
    }

    #[test]
    fn test_rejects_destructuring() {
        let export = ExportNamedDeclaration::declaration(Declaration::VariableDeclaration(
            VariableDeclaration {
                kind: VariableKind::Let,
                declarations: vec![VariableDeclarator {
                    id: Pattern::ObjectPattern(ObjectPattern { properties: vec![] }),
                    init: None,
                }],
            },
        ));
        let err = extract_props(&[export]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedBindingPattern);
        assert_eq!(err.context.as_deref(), Some("ObjectPattern"));
    }

    #[test]
    fn test_rejects_class_export() {
        let export = ExportNamedDeclaration::declaration(Declaration::ClassDeclaration(Box::new(
            Class {
                id: Some(Identifier::new("Widget")),
                super_class: None,
                body: ClassBody::default(),
            },
        )));
        let err = extract_props(&[export]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedDeclarationShape);
    }

    #[test]
    fn test_rejects_empty_export() {
        let export = ExportNamedDeclaration {
            declaration: None,
            specifiers: vec![],
            source: None,
        };
        let err = extract_props(&[export]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedExport);
    }

    #[test]
    fn test_rejects_namespace_specifier() {
        let export = ExportNamedDeclaration {
            declaration: None,
            specifiers: vec![ExportClause::ExportNamespaceSpecifier(ExportedName {
                exported: ModuleExportName::identifier("ns"),
            })],
            source: None,
        };
        let err = extract_props(&[export]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedSpecifier);
    }

    #[test]
    fn test_rejects_reexport_from_module() {
        let mut export = export_specifiers(&[("a", "a")]);
        export.source = Some(Literal::string("./other.js"));
        let err = extract_props(&[export]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedExportShape);
    }
}
