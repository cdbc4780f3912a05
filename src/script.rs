//! Script region parsing.
//!
//! The script region is parsed as a TypeScript module with oxc and lowered
//! into the Tree Model. Type annotations are dropped and type-only
//! declarations are skipped; runtime TypeScript constructs (enums,
//! namespaces, parameter properties) and decorators have no Tree Model shape
//! and are rejected.

use oxc_allocator::Allocator;
use oxc_ast::ast as js;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use std::fmt::Display;
use tracing::debug;

use crate::error::{CompilerError, ErrorKind, Result};
use crate::tree::{
    ArrayExpression, ArrayPattern, ArrowBody, ArrowFunction, AssignmentExpression,
    AssignmentOperator, AssignmentPattern, AssignmentProperty, AwaitExpression, BinaryExpression,
    BinaryOperator, BlockStatement, CallExpression, CatchClause, ChainExpression, Class,
    ClassBody, ClassMember, ConditionalExpression, Declaration, DefaultExport,
    ExportAllDeclaration, ExportClause, ExportDefaultDeclaration, ExportNamedDeclaration,
    ExportSpecifier, Expression, ExpressionStatement, ForInStatement, ForInit, ForLeft,
    ForStatement, Function, Identifier, IfStatement, ImportClause, ImportDeclaration,
    ImportExpression, ImportSpecifier, JumpStatement, LabeledStatement, Literal, LiteralValue,
    LocalSpecifier, LogicalExpression, LogicalOperator, MemberExpression, MetaProperty,
    MethodDefinition, MethodKind, ModuleExportName, NewExpression, ObjectExpression,
    ObjectMember, ObjectPattern, ObjectPatternMember, Pattern, ProgramItem, Property,
    PropertyDefinition, PropertyKind, RegexLiteral, RestElement, ReturnStatement,
    SequenceExpression, SpreadElement, Statement, StaticBlock, SwitchCase, SwitchStatement,
    TaggedTemplateExpression, TemplateElement, TemplateElementValue, TemplateLiteral,
    ThrowStatement, TryStatement, UnaryExpression, UnaryOperator, UpdateExpression,
    UpdateOperator, VariableDeclaration, VariableDeclarator, VariableKind, WhileStatement,
    YieldExpression,
};

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

fn script_source_type() -> SourceType {
    SourceType::default().with_module(true).with_typescript(true)
}

/// Parse a script region into top-level program items, in source order.
pub fn parse_script(text: &str) -> Result<Vec<ProgramItem>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, text, script_source_type()).parse();

    if !ret.errors.is_empty() {
        return Err(syntax_error(&ret.errors));
    }

    let lowering = Lowering { source: text };
    let mut items = Vec::with_capacity(ret.program.body.len());

    for directive in &ret.program.directives {
        items.push(ProgramItem::Statement(lowering.directive(directive)));
    }
    for statement in &ret.program.body {
        if let Some(item) = lowering.item(statement)? {
            items.push(item);
        }
    }

    debug!(items = items.len(), "lowered script region");
    Ok(items)
}

/// Parse a single expression, e.g. the body of a `{...}` binding.
pub fn parse_expression(text: &str) -> Result<Expression> {
    let allocator = Allocator::default();
    let expression = Parser::new(&allocator, text, script_source_type())
        .parse_expression()
        .map_err(|errors| syntax_error(&errors))?;

    let rest = &text[expression.span().end as usize..];
    if !rest.trim().is_empty() {
        return Err(CompilerError::new(
            ErrorKind::ScriptSyntax,
            format!("Unexpected `{}` after expression", rest.trim()),
        )
        .with_context(text.trim()));
    }

    Lowering { source: text }.expression(&expression)
}

fn syntax_error<E: Display>(errors: &[E]) -> CompilerError {
    let first = errors
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown parse error".to_string());

    errors.iter().fold(
        CompilerError::new(
            ErrorKind::ScriptSyntax,
            format!("Failed to parse script: {}", first),
        ),
        |error, diagnostic| error.with_hint(diagnostic.to_string()),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOWERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Converts borrowed oxc nodes into owned Tree Model nodes. `source` is the
/// text the nodes were parsed from; it is only used for error context.
struct Lowering<'s> {
    source: &'s str,
}

impl<'s> Lowering<'s> {
    fn unsupported(&self, what: &str, span: Span) -> CompilerError {
        CompilerError::new(
            ErrorKind::UnsupportedSyntax,
            format!("{} is not supported in component scripts", what),
        )
        .with_context(span.source_text(self.source).to_string())
    }

    fn directive(&self, directive: &js::Directive<'_>) -> Statement {
        Statement::ExpressionStatement(ExpressionStatement {
            expression: Expression::string(&directive.expression.value),
            directive: Some(directive.directive.to_string()),
        })
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Module items
    // ───────────────────────────────────────────────────────────────────────────

    fn item(&self, statement: &js::Statement<'_>) -> Result<Option<ProgramItem>> {
        match statement {
            js::Statement::ImportDeclaration(import) => {
                Ok(self.import(import)?.map(ProgramItem::ImportDeclaration))
            }
            js::Statement::ExportNamedDeclaration(export) => {
                Ok(self.export_named(export)?.map(ProgramItem::ExportNamedDeclaration))
            }
            js::Statement::ExportDefaultDeclaration(export) => {
                Ok(self.export_default(export)?.map(ProgramItem::ExportDefaultDeclaration))
            }
            js::Statement::ExportAllDeclaration(export) => {
                if export.export_kind.is_type() {
                    return Ok(None);
                }
                if let Some(clause) = &export.with_clause {
                    return Err(self.unsupported("Import attributes", clause.span));
                }
                Ok(Some(ProgramItem::ExportAllDeclaration(ExportAllDeclaration {
                    source: Literal::string(&export.source.value),
                    exported: export.exported.as_ref().map(module_export_name),
                })))
            }
            js::Statement::TSExportAssignment(export) => {
                Err(self.unsupported("`export =`", export.span))
            }
            js::Statement::TSNamespaceExportDeclaration(export) => {
                Err(self.unsupported("`export as namespace`", export.span))
            }
            _ => Ok(self.statement(statement)?.map(ProgramItem::Statement)),
        }
    }

    fn import(&self, import: &js::ImportDeclaration<'_>) -> Result<Option<ImportDeclaration>> {
        if import.import_kind.is_type() {
            return Ok(None);
        }
        if import.phase.is_some() {
            return Err(self.unsupported("Import phases", import.span));
        }
        if let Some(clause) = &import.with_clause {
            return Err(self.unsupported("Import attributes", clause.span));
        }

        let mut specifiers = Vec::new();
        let mut type_only = 0;
        for specifier in import.specifiers.iter().flatten() {
            let clause = match specifier {
                js::ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    if s.import_kind.is_type() {
                        type_only += 1;
                        continue;
                    }
                    ImportClause::ImportSpecifier(ImportSpecifier {
                        imported: module_export_name(&s.imported),
                        local: Identifier::new(&s.local.name),
                    })
                }
                js::ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    ImportClause::ImportDefaultSpecifier(LocalSpecifier {
                        local: Identifier::new(&s.local.name),
                    })
                }
                js::ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    ImportClause::ImportNamespaceSpecifier(LocalSpecifier {
                        local: Identifier::new(&s.local.name),
                    })
                }
            };
            specifiers.push(clause);
        }

        // `import { type A } from '...'` is elided entirely.
        if specifiers.is_empty() && type_only > 0 {
            return Ok(None);
        }

        Ok(Some(ImportDeclaration {
            specifiers,
            source: Literal::string(&import.source.value),
        }))
    }

    fn export_named(
        &self,
        export: &js::ExportNamedDeclaration<'_>,
    ) -> Result<Option<ExportNamedDeclaration>> {
        if export.export_kind.is_type() {
            return Ok(None);
        }
        if let Some(clause) = &export.with_clause {
            return Err(self.unsupported("Import attributes", clause.span));
        }

        let declaration = match &export.declaration {
            Some(declaration) => match self.declaration(declaration)? {
                Some(declaration) => Some(declaration),
                None => return Ok(None),
            },
            None => None,
        };

        let specifiers: Vec<ExportClause> = export
            .specifiers
            .iter()
            .filter(|s| !s.export_kind.is_type())
            .map(|s| {
                ExportClause::ExportSpecifier(ExportSpecifier {
                    local: module_export_name(&s.local),
                    exported: module_export_name(&s.exported),
                })
            })
            .collect();

        if declaration.is_none() && specifiers.is_empty() && !export.specifiers.is_empty() {
            return Ok(None);
        }

        Ok(Some(ExportNamedDeclaration {
            declaration,
            specifiers,
            source: export.source.as_ref().map(|s| Literal::string(&s.value)),
        }))
    }

    fn export_default(
        &self,
        export: &js::ExportDefaultDeclaration<'_>,
    ) -> Result<Option<ExportDefaultDeclaration>> {
        let declaration = match &export.declaration {
            js::ExportDefaultDeclarationKind::FunctionDeclaration(function) => {
                if function.is_typescript_syntax() {
                    return Ok(None);
                }
                DefaultExport::FunctionDeclaration(Box::new(self.function(function)?))
            }
            js::ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                if class.declare {
                    return Ok(None);
                }
                DefaultExport::ClassDeclaration(Box::new(self.class(class)?))
            }
            js::ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => return Ok(None),
            other => match other.as_expression() {
                Some(expression) => DefaultExport::Expression(self.expression(expression)?),
                None => return Err(self.unsupported("This default export", export.span)),
            },
        };

        Ok(Some(ExportDefaultDeclaration { declaration }))
    }

    /// `None` for declarations that only exist at the type level.
    fn declaration(&self, declaration: &js::Declaration<'_>) -> Result<Option<Declaration>> {
        let lowered = match declaration {
            js::Declaration::VariableDeclaration(variables) => {
                if variables.declare {
                    return Ok(None);
                }
                Declaration::VariableDeclaration(self.variable_declaration(variables)?)
            }
            js::Declaration::FunctionDeclaration(function) => {
                if function.is_typescript_syntax() {
                    return Ok(None);
                }
                Declaration::FunctionDeclaration(Box::new(self.function(function)?))
            }
            js::Declaration::ClassDeclaration(class) => {
                if class.declare {
                    return Ok(None);
                }
                Declaration::ClassDeclaration(Box::new(self.class(class)?))
            }
            js::Declaration::TSTypeAliasDeclaration(_)
            | js::Declaration::TSInterfaceDeclaration(_)
            | js::Declaration::TSGlobalDeclaration(_) => return Ok(None),
            js::Declaration::TSEnumDeclaration(e) => {
                if e.declare {
                    return Ok(None);
                }
                return Err(self.unsupported("Enums", e.span));
            }
            js::Declaration::TSModuleDeclaration(m) => {
                if m.declare {
                    return Ok(None);
                }
                return Err(self.unsupported("Namespaces", m.span));
            }
            js::Declaration::TSImportEqualsDeclaration(i) => {
                return Err(self.unsupported("`import = require()`", i.span));
            }
        };
        Ok(Some(lowered))
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Statements
    // ───────────────────────────────────────────────────────────────────────────

    fn statements(&self, statements: &[js::Statement<'_>]) -> Result<Vec<Statement>> {
        let mut lowered = Vec::with_capacity(statements.len());
        for statement in statements {
            if let Some(statement) = self.statement(statement)? {
                lowered.push(statement);
            }
        }
        Ok(lowered)
    }

    /// A statement in single-statement position (`if (x) <stmt>`).
    fn body(&self, statement: &js::Statement<'_>) -> Result<Statement> {
        Ok(self.statement(statement)?.unwrap_or(Statement::EmptyStatement))
    }

    fn block(&self, block: &js::BlockStatement<'_>) -> Result<BlockStatement> {
        Ok(BlockStatement::new(self.statements(&block.body)?))
    }

    fn statement(&self, statement: &js::Statement<'_>) -> Result<Option<Statement>> {
        if let Some(declaration) = statement.as_declaration() {
            return Ok(self.declaration(declaration)?.map(|declaration| match declaration {
                Declaration::VariableDeclaration(v) => Statement::VariableDeclaration(v),
                Declaration::FunctionDeclaration(f) => Statement::FunctionDeclaration(f),
                Declaration::ClassDeclaration(c) => Statement::ClassDeclaration(c),
            }));
        }

        let lowered = match statement {
            js::Statement::BlockStatement(block) => Statement::BlockStatement(self.block(block)?),
            js::Statement::BreakStatement(s) => Statement::BreakStatement(JumpStatement {
                label: s.label.as_ref().map(|l| Identifier::new(&l.name)),
            }),
            js::Statement::ContinueStatement(s) => Statement::ContinueStatement(JumpStatement {
                label: s.label.as_ref().map(|l| Identifier::new(&l.name)),
            }),
            js::Statement::DebuggerStatement(_) => Statement::DebuggerStatement,
            js::Statement::DoWhileStatement(s) => Statement::DoWhileStatement(WhileStatement {
                test: self.expression(&s.test)?,
                body: Box::new(self.body(&s.body)?),
            }),
            js::Statement::EmptyStatement(_) => Statement::EmptyStatement,
            js::Statement::ExpressionStatement(s) => {
                Statement::expression(self.expression(&s.expression)?)
            }
            js::Statement::ForInStatement(s) => {
                Statement::ForInStatement(Box::new(ForInStatement {
                    left: self.for_left(&s.left)?,
                    right: self.expression(&s.right)?,
                    body: self.body(&s.body)?,
                    is_await: false,
                }))
            }
            js::Statement::ForOfStatement(s) => {
                Statement::ForOfStatement(Box::new(ForInStatement {
                    left: self.for_left(&s.left)?,
                    right: self.expression(&s.right)?,
                    body: self.body(&s.body)?,
                    is_await: s.r#await,
                }))
            }
            js::Statement::ForStatement(s) => {
                let init = match &s.init {
                    None => None,
                    Some(js::ForStatementInit::VariableDeclaration(v)) => {
                        Some(ForInit::VariableDeclaration(self.variable_declaration(v)?))
                    }
                    Some(init) => match init.as_expression() {
                        Some(expression) => Some(ForInit::Expression(self.expression(expression)?)),
                        None => return Err(self.unsupported("This loop initializer", s.span)),
                    },
                };
                Statement::ForStatement(Box::new(ForStatement {
                    init,
                    test: self.optional_expression(s.test.as_ref())?,
                    update: self.optional_expression(s.update.as_ref())?,
                    body: self.body(&s.body)?,
                }))
            }
            js::Statement::IfStatement(s) => Statement::IfStatement(IfStatement {
                test: self.expression(&s.test)?,
                consequent: Box::new(self.body(&s.consequent)?),
                alternate: match &s.alternate {
                    Some(alternate) => Some(Box::new(self.body(alternate)?)),
                    None => None,
                },
            }),
            js::Statement::LabeledStatement(s) => Statement::LabeledStatement(LabeledStatement {
                label: Identifier::new(&s.label.name),
                body: Box::new(self.body(&s.body)?),
            }),
            js::Statement::ReturnStatement(s) => Statement::ReturnStatement(ReturnStatement {
                argument: self.optional_expression(s.argument.as_ref())?,
            }),
            js::Statement::SwitchStatement(s) => {
                let mut cases = Vec::with_capacity(s.cases.len());
                for case in &s.cases {
                    cases.push(SwitchCase {
                        test: self.optional_expression(case.test.as_ref())?,
                        consequent: self.statements(&case.consequent)?,
                    });
                }
                Statement::SwitchStatement(SwitchStatement {
                    discriminant: self.expression(&s.discriminant)?,
                    cases,
                })
            }
            js::Statement::ThrowStatement(s) => Statement::ThrowStatement(ThrowStatement {
                argument: self.expression(&s.argument)?,
            }),
            js::Statement::TryStatement(s) => {
                let handler = match &s.handler {
                    Some(handler) => Some(CatchClause {
                        param: match &handler.param {
                            Some(param) => Some(self.binding(&param.pattern)?),
                            None => None,
                        },
                        body: self.block(&handler.body)?,
                    }),
                    None => None,
                };
                let finalizer = match &s.finalizer {
                    Some(finalizer) => Some(self.block(finalizer)?),
                    None => None,
                };
                Statement::TryStatement(Box::new(TryStatement {
                    block: self.block(&s.block)?,
                    handler,
                    finalizer,
                }))
            }
            js::Statement::WhileStatement(s) => Statement::WhileStatement(WhileStatement {
                test: self.expression(&s.test)?,
                body: Box::new(self.body(&s.body)?),
            }),
            js::Statement::WithStatement(s) => return Err(self.unsupported("`with`", s.span)),
            other => return Err(self.unsupported("Module declarations", other.span())),
        };

        Ok(Some(lowered))
    }

    fn variable_declaration(
        &self,
        variables: &js::VariableDeclaration<'_>,
    ) -> Result<VariableDeclaration> {
        let kind = match variables.kind {
            js::VariableDeclarationKind::Var => VariableKind::Var,
            js::VariableDeclarationKind::Let => VariableKind::Let,
            js::VariableDeclarationKind::Const => VariableKind::Const,
            js::VariableDeclarationKind::Using | js::VariableDeclarationKind::AwaitUsing => {
                return Err(self.unsupported("`using` declarations", variables.span));
            }
        };

        let mut declarations = Vec::with_capacity(variables.declarations.len());
        for declarator in &variables.declarations {
            declarations.push(VariableDeclarator {
                id: self.binding(&declarator.id)?,
                init: self.optional_expression(declarator.init.as_ref())?,
            });
        }

        Ok(VariableDeclaration { kind, declarations })
    }

    fn for_left(&self, left: &js::ForStatementLeft<'_>) -> Result<ForLeft> {
        match left {
            js::ForStatementLeft::VariableDeclaration(v) => {
                Ok(ForLeft::VariableDeclaration(self.variable_declaration(v)?))
            }
            other => match other.as_assignment_target() {
                Some(target) => Ok(ForLeft::Pattern(self.assignment_target(target)?)),
                None => Err(self.unsupported("This loop binding", other.span())),
            },
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Functions and classes
    // ───────────────────────────────────────────────────────────────────────────

    fn function(&self, function: &js::Function<'_>) -> Result<Function> {
        let body = match &function.body {
            Some(body) => self.function_body(body)?,
            None => BlockStatement::default(),
        };
        Ok(Function {
            id: function.id.as_ref().map(|id| Identifier::new(&id.name)),
            params: self.params(&function.params)?,
            body,
            generator: function.generator,
            is_async: function.r#async,
        })
    }

    fn function_body(&self, body: &js::FunctionBody<'_>) -> Result<BlockStatement> {
        let mut statements: Vec<Statement> =
            body.directives.iter().map(|d| self.directive(d)).collect();
        statements.extend(self.statements(&body.statements)?);
        Ok(BlockStatement::new(statements))
    }

    fn params(&self, params: &js::FormalParameters<'_>) -> Result<Vec<Pattern>> {
        let mut patterns = Vec::with_capacity(params.items.len() + 1);

        for param in &params.items {
            if param.accessibility.is_some() || param.readonly || param.r#override {
                return Err(self.unsupported("Parameter properties", param.span));
            }
            if let Some(decorator) = param.decorators.first() {
                return Err(self.unsupported("Decorators", decorator.span));
            }
            let pattern = self.binding(&param.pattern)?;
            patterns.push(match &param.initializer {
                Some(default) => Pattern::AssignmentPattern(Box::new(AssignmentPattern {
                    left: pattern,
                    right: self.expression(default)?,
                })),
                None => pattern,
            });
        }

        if let Some(rest) = &params.rest {
            patterns.push(Pattern::RestElement(Box::new(RestElement {
                argument: self.binding(&rest.rest.argument)?,
            })));
        }

        Ok(patterns)
    }

    fn class(&self, class: &js::Class<'_>) -> Result<Class> {
        if let Some(decorator) = class.decorators.first() {
            return Err(self.unsupported("Decorators", decorator.span));
        }

        let mut members = Vec::with_capacity(class.body.body.len());
        for element in &class.body.body {
            if element.is_typescript_syntax() {
                continue;
            }
            let member = match element {
                js::ClassElement::MethodDefinition(method) => {
                    if let Some(decorator) = method.decorators.first() {
                        return Err(self.unsupported("Decorators", decorator.span));
                    }
                    ClassMember::MethodDefinition(MethodDefinition {
                        key: self.property_key(&method.key)?,
                        value: self.function(&method.value)?,
                        kind: match method.kind {
                            js::MethodDefinitionKind::Constructor => MethodKind::Constructor,
                            js::MethodDefinitionKind::Method => MethodKind::Method,
                            js::MethodDefinitionKind::Get => MethodKind::Get,
                            js::MethodDefinitionKind::Set => MethodKind::Set,
                        },
                        computed: method.computed,
                        is_static: method.r#static,
                    })
                }
                js::ClassElement::PropertyDefinition(property) => {
                    if property.declare {
                        continue;
                    }
                    if let Some(decorator) = property.decorators.first() {
                        return Err(self.unsupported("Decorators", decorator.span));
                    }
                    ClassMember::PropertyDefinition(PropertyDefinition {
                        key: self.property_key(&property.key)?,
                        value: self.optional_expression(property.value.as_ref())?,
                        computed: property.computed,
                        is_static: property.r#static,
                    })
                }
                js::ClassElement::StaticBlock(block) => ClassMember::StaticBlock(StaticBlock {
                    body: self.statements(&block.body)?,
                }),
                js::ClassElement::AccessorProperty(property) => {
                    return Err(self.unsupported("`accessor` fields", property.span));
                }
                js::ClassElement::TSIndexSignature(_) => continue,
            };
            members.push(member);
        }

        Ok(Class {
            id: class.id.as_ref().map(|id| Identifier::new(&id.name)),
            super_class: self.optional_expression(class.super_class.as_ref())?,
            body: ClassBody { body: members },
        })
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Patterns
    // ───────────────────────────────────────────────────────────────────────────

    fn binding(&self, pattern: &js::BindingPattern<'_>) -> Result<Pattern> {
        match pattern {
            js::BindingPattern::BindingIdentifier(id) => Ok(Pattern::identifier(&id.name)),
            js::BindingPattern::ObjectPattern(object) => {
                let mut properties = Vec::with_capacity(object.properties.len() + 1);
                for property in &object.properties {
                    properties.push(ObjectPatternMember::Property(AssignmentProperty {
                        key: self.property_key(&property.key)?,
                        value: self.binding(&property.value)?,
                        computed: property.computed,
                        shorthand: property.shorthand,
                    }));
                }
                if let Some(rest) = &object.rest {
                    properties.push(ObjectPatternMember::RestElement(RestElement {
                        argument: self.binding(&rest.argument)?,
                    }));
                }
                Ok(Pattern::ObjectPattern(ObjectPattern { properties }))
            }
            js::BindingPattern::ArrayPattern(array) => {
                let mut elements = Vec::with_capacity(array.elements.len() + 1);
                for element in &array.elements {
                    elements.push(match element {
                        Some(element) => Some(self.binding(element)?),
                        None => None,
                    });
                }
                if let Some(rest) = &array.rest {
                    elements.push(Some(Pattern::RestElement(Box::new(RestElement {
                        argument: self.binding(&rest.argument)?,
                    }))));
                }
                Ok(Pattern::ArrayPattern(ArrayPattern { elements }))
            }
            js::BindingPattern::AssignmentPattern(assignment) => {
                Ok(Pattern::AssignmentPattern(Box::new(AssignmentPattern {
                    left: self.binding(&assignment.left)?,
                    right: self.expression(&assignment.right)?,
                })))
            }
        }
    }

    fn assignment_target(&self, target: &js::AssignmentTarget<'_>) -> Result<Pattern> {
        if let Some(simple) = target.as_simple_assignment_target() {
            return self.simple_target(simple);
        }

        match target {
            js::AssignmentTarget::ArrayAssignmentTarget(array) => {
                let mut elements = Vec::with_capacity(array.elements.len() + 1);
                for element in &array.elements {
                    elements.push(match element {
                        Some(element) => Some(self.target_maybe_default(element)?),
                        None => None,
                    });
                }
                if let Some(rest) = &array.rest {
                    elements.push(Some(Pattern::RestElement(Box::new(RestElement {
                        argument: self.assignment_target(&rest.target)?,
                    }))));
                }
                Ok(Pattern::ArrayPattern(ArrayPattern { elements }))
            }
            js::AssignmentTarget::ObjectAssignmentTarget(object) => {
                let mut properties = Vec::with_capacity(object.properties.len() + 1);
                for property in &object.properties {
                    properties.push(ObjectPatternMember::Property(match property {
                        js::AssignmentTargetProperty::AssignmentTargetPropertyIdentifier(p) => {
                            let binding = Pattern::identifier(&p.binding.name);
                            AssignmentProperty {
                                key: Expression::identifier(&p.binding.name),
                                value: match &p.init {
                                    Some(init) => {
                                        Pattern::AssignmentPattern(Box::new(AssignmentPattern {
                                            left: binding,
                                            right: self.expression(init)?,
                                        }))
                                    }
                                    None => binding,
                                },
                                computed: false,
                                shorthand: true,
                            }
                        }
                        js::AssignmentTargetProperty::AssignmentTargetPropertyProperty(p) => {
                            AssignmentProperty {
                                key: self.property_key(&p.name)?,
                                value: self.target_maybe_default(&p.binding)?,
                                computed: p.computed,
                                shorthand: false,
                            }
                        }
                    }));
                }
                if let Some(rest) = &object.rest {
                    properties.push(ObjectPatternMember::RestElement(RestElement {
                        argument: self.assignment_target(&rest.target)?,
                    }));
                }
                Ok(Pattern::ObjectPattern(ObjectPattern { properties }))
            }
            other => Err(self.unsupported("This assignment target", other.span())),
        }
    }

    fn target_maybe_default(
        &self,
        target: &js::AssignmentTargetMaybeDefault<'_>,
    ) -> Result<Pattern> {
        match target {
            js::AssignmentTargetMaybeDefault::AssignmentTargetWithDefault(with_default) => {
                Ok(Pattern::AssignmentPattern(Box::new(AssignmentPattern {
                    left: self.assignment_target(&with_default.binding)?,
                    right: self.expression(&with_default.init)?,
                })))
            }
            other => match other.as_assignment_target() {
                Some(target) => self.assignment_target(target),
                None => Err(self.unsupported("This assignment target", other.span())),
            },
        }
    }

    fn simple_target(&self, target: &js::SimpleAssignmentTarget<'_>) -> Result<Pattern> {
        match target {
            js::SimpleAssignmentTarget::AssignmentTargetIdentifier(id) => {
                Ok(Pattern::identifier(&id.name))
            }
            js::SimpleAssignmentTarget::ComputedMemberExpression(m) => {
                Ok(Pattern::MemberExpression(Box::new(self.computed_member(m)?)))
            }
            js::SimpleAssignmentTarget::StaticMemberExpression(m) => {
                Ok(Pattern::MemberExpression(Box::new(self.static_member(m)?)))
            }
            js::SimpleAssignmentTarget::PrivateFieldExpression(m) => {
                Ok(Pattern::MemberExpression(Box::new(self.private_member(m)?)))
            }
            js::SimpleAssignmentTarget::TSAsExpression(e) => self.expression_target(&e.expression),
            js::SimpleAssignmentTarget::TSSatisfiesExpression(e) => {
                self.expression_target(&e.expression)
            }
            js::SimpleAssignmentTarget::TSNonNullExpression(e) => {
                self.expression_target(&e.expression)
            }
            js::SimpleAssignmentTarget::TSTypeAssertion(e) => {
                self.expression_target(&e.expression)
            }
        }
    }

    /// A type-asserted assignment target, `(x as T) = ...`.
    fn expression_target(&self, expression: &js::Expression<'_>) -> Result<Pattern> {
        match self.expression(expression)? {
            Expression::Identifier(id) => Ok(Pattern::Identifier(id)),
            Expression::MemberExpression(member) => Ok(Pattern::MemberExpression(member)),
            _ => Err(self.unsupported("This assignment target", expression.span())),
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Expressions
    // ───────────────────────────────────────────────────────────────────────────

    fn optional_expression(
        &self,
        expression: Option<&js::Expression<'_>>,
    ) -> Result<Option<Expression>> {
        expression.map(|e| self.expression(e)).transpose()
    }

    fn expressions(&self, expressions: &[js::Expression<'_>]) -> Result<Vec<Expression>> {
        expressions.iter().map(|e| self.expression(e)).collect()
    }

    fn arguments(&self, arguments: &[js::Argument<'_>]) -> Result<Vec<Expression>> {
        let mut lowered = Vec::with_capacity(arguments.len());
        for argument in arguments {
            lowered.push(match argument {
                js::Argument::SpreadElement(spread) => self.spread(spread)?,
                other => match other.as_expression() {
                    Some(expression) => self.expression(expression)?,
                    None => return Err(self.unsupported("This argument", other.span())),
                },
            });
        }
        Ok(lowered)
    }

    fn spread(&self, spread: &js::SpreadElement<'_>) -> Result<Expression> {
        Ok(Expression::SpreadElement(Box::new(SpreadElement {
            argument: self.expression(&spread.argument)?,
        })))
    }

    fn property_key(&self, key: &js::PropertyKey<'_>) -> Result<Expression> {
        match key {
            js::PropertyKey::StaticIdentifier(id) => Ok(Expression::identifier(&id.name)),
            js::PropertyKey::PrivateIdentifier(id) => {
                Ok(Expression::PrivateIdentifier(Identifier::new(&id.name)))
            }
            other => match other.as_expression() {
                Some(expression) => self.expression(expression),
                None => Err(self.unsupported("This property key", other.span())),
            },
        }
    }

    fn template_literal(&self, template: &js::TemplateLiteral<'_>) -> Result<TemplateLiteral> {
        Ok(TemplateLiteral {
            quasis: template
                .quasis
                .iter()
                .map(|quasi| TemplateElement {
                    tail: quasi.tail,
                    value: TemplateElementValue {
                        raw: quasi.value.raw.to_string(),
                        cooked: quasi.value.cooked.as_ref().map(ToString::to_string),
                    },
                })
                .collect(),
            expressions: self.expressions(&template.expressions)?,
        })
    }

    fn computed_member(&self, m: &js::ComputedMemberExpression<'_>) -> Result<MemberExpression> {
        Ok(MemberExpression {
            object: self.expression(&m.object)?,
            property: self.expression(&m.expression)?,
            computed: true,
            optional: m.optional,
        })
    }

    fn static_member(&self, m: &js::StaticMemberExpression<'_>) -> Result<MemberExpression> {
        Ok(MemberExpression {
            object: self.expression(&m.object)?,
            property: Expression::identifier(&m.property.name),
            computed: false,
            optional: m.optional,
        })
    }

    fn private_member(&self, m: &js::PrivateFieldExpression<'_>) -> Result<MemberExpression> {
        Ok(MemberExpression {
            object: self.expression(&m.object)?,
            property: Expression::PrivateIdentifier(Identifier::new(&m.field.name)),
            computed: false,
            optional: m.optional,
        })
    }

    fn call(&self, call: &js::CallExpression<'_>) -> Result<Expression> {
        Ok(Expression::CallExpression(Box::new(CallExpression {
            callee: self.expression(&call.callee)?,
            arguments: self.arguments(&call.arguments)?,
            optional: call.optional,
        })))
    }

    fn expression(&self, expression: &js::Expression<'_>) -> Result<Expression> {
        let lowered = match expression {
            js::Expression::BooleanLiteral(b) => {
                Expression::Literal(Literal::new(LiteralValue::Boolean(b.value)))
            }
            js::Expression::NullLiteral(_) => Expression::Literal(Literal::new(LiteralValue::Null)),
            js::Expression::NumericLiteral(n) => {
                Expression::Literal(Literal::new(LiteralValue::Number(n.value)))
            }
            js::Expression::BigIntLiteral(b) => Expression::Literal(Literal {
                value: LiteralValue::Null,
                regex: None,
                bigint: Some(b.value.to_string()),
            }),
            js::Expression::RegExpLiteral(r) => Expression::Literal(Literal {
                value: LiteralValue::Null,
                regex: Some(RegexLiteral {
                    pattern: r.regex.pattern.text.to_string(),
                    flags: r.regex.flags.to_string(),
                }),
                bigint: None,
            }),
            js::Expression::StringLiteral(s) => Expression::string(&s.value),
            js::Expression::TemplateLiteral(t) => {
                Expression::TemplateLiteral(self.template_literal(t)?)
            }
            js::Expression::Identifier(id) => Expression::identifier(&id.name),
            js::Expression::MetaProperty(m) => Expression::MetaProperty(MetaProperty {
                meta: Identifier::new(&m.meta.name),
                property: Identifier::new(&m.property.name),
            }),
            js::Expression::Super(_) => Expression::Super,
            js::Expression::ThisExpression(_) => Expression::ThisExpression,

            js::Expression::ArrayExpression(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    elements.push(match element {
                        js::ArrayExpressionElement::SpreadElement(spread) => {
                            Some(self.spread(spread)?)
                        }
                        js::ArrayExpressionElement::Elision(_) => None,
                        other => match other.as_expression() {
                            Some(expression) => Some(self.expression(expression)?),
                            None => return Err(self.unsupported("This element", other.span())),
                        },
                    });
                }
                Expression::ArrayExpression(ArrayExpression { elements })
            }
            js::Expression::ObjectExpression(object) => {
                let mut properties = Vec::with_capacity(object.properties.len());
                for property in &object.properties {
                    properties.push(match property {
                        js::ObjectPropertyKind::ObjectProperty(p) => {
                            ObjectMember::Property(Property {
                                key: self.property_key(&p.key)?,
                                value: self.expression(&p.value)?,
                                kind: match p.kind {
                                    js::PropertyKind::Init => PropertyKind::Init,
                                    js::PropertyKind::Get => PropertyKind::Get,
                                    js::PropertyKind::Set => PropertyKind::Set,
                                },
                                method: p.method,
                                computed: p.computed,
                                shorthand: p.shorthand,
                            })
                        }
                        js::ObjectPropertyKind::SpreadProperty(spread) => {
                            ObjectMember::SpreadElement(SpreadElement {
                                argument: self.expression(&spread.argument)?,
                            })
                        }
                    });
                }
                Expression::ObjectExpression(ObjectExpression { properties })
            }

            js::Expression::FunctionExpression(function) => {
                Expression::FunctionExpression(Box::new(self.function(function)?))
            }
            js::Expression::ArrowFunctionExpression(arrow) => {
                let body = if arrow.expression {
                    match arrow.body.statements.first() {
                        Some(js::Statement::ExpressionStatement(s)) => {
                            ArrowBody::Expression(Box::new(self.expression(&s.expression)?))
                        }
                        _ => return Err(self.unsupported("This arrow body", arrow.span)),
                    }
                } else {
                    ArrowBody::BlockStatement(self.function_body(&arrow.body)?)
                };
                Expression::ArrowFunctionExpression(Box::new(ArrowFunction {
                    params: self.params(&arrow.params)?,
                    body,
                    expression: arrow.expression,
                    is_async: arrow.r#async,
                }))
            }
            js::Expression::ClassExpression(class) => {
                Expression::ClassExpression(Box::new(self.class(class)?))
            }
            js::Expression::TaggedTemplateExpression(tagged) => {
                Expression::TaggedTemplateExpression(Box::new(TaggedTemplateExpression {
                    tag: self.expression(&tagged.tag)?,
                    quasi: self.template_literal(&tagged.quasi)?,
                }))
            }

            js::Expression::UnaryExpression(unary) => {
                let operator = UnaryOperator::from_symbol(unary.operator.as_str())
                    .ok_or_else(|| self.unsupported("This operator", unary.span))?;
                Expression::UnaryExpression(Box::new(UnaryExpression {
                    operator,
                    prefix: true,
                    argument: self.expression(&unary.argument)?,
                }))
            }
            js::Expression::UpdateExpression(update) => {
                let operator = UpdateOperator::from_symbol(update.operator.as_str())
                    .ok_or_else(|| self.unsupported("This operator", update.span))?;
                let argument = match self.simple_target(&update.argument)? {
                    Pattern::Identifier(id) => Expression::Identifier(id),
                    Pattern::MemberExpression(member) => Expression::MemberExpression(member),
                    _ => return Err(self.unsupported("This update target", update.span)),
                };
                Expression::UpdateExpression(Box::new(UpdateExpression {
                    operator,
                    prefix: update.prefix,
                    argument,
                }))
            }
            js::Expression::BinaryExpression(binary) => {
                let operator = BinaryOperator::from_symbol(binary.operator.as_str())
                    .ok_or_else(|| self.unsupported("This operator", binary.span))?;
                Expression::BinaryExpression(Box::new(BinaryExpression {
                    operator,
                    left: self.expression(&binary.left)?,
                    right: self.expression(&binary.right)?,
                }))
            }
            js::Expression::PrivateInExpression(private_in) => {
                Expression::BinaryExpression(Box::new(BinaryExpression {
                    operator: BinaryOperator::In,
                    left: Expression::PrivateIdentifier(Identifier::new(&private_in.left.name)),
                    right: self.expression(&private_in.right)?,
                }))
            }
            js::Expression::LogicalExpression(logical) => {
                let operator = LogicalOperator::from_symbol(logical.operator.as_str())
                    .ok_or_else(|| self.unsupported("This operator", logical.span))?;
                Expression::LogicalExpression(Box::new(LogicalExpression {
                    operator,
                    left: self.expression(&logical.left)?,
                    right: self.expression(&logical.right)?,
                }))
            }
            js::Expression::AssignmentExpression(assignment) => {
                let operator = AssignmentOperator::from_symbol(assignment.operator.as_str())
                    .ok_or_else(|| self.unsupported("This operator", assignment.span))?;
                Expression::AssignmentExpression(Box::new(AssignmentExpression {
                    operator,
                    left: self.assignment_target(&assignment.left)?,
                    right: self.expression(&assignment.right)?,
                }))
            }
            js::Expression::ConditionalExpression(conditional) => {
                Expression::ConditionalExpression(Box::new(ConditionalExpression {
                    test: self.expression(&conditional.test)?,
                    consequent: self.expression(&conditional.consequent)?,
                    alternate: self.expression(&conditional.alternate)?,
                }))
            }
            js::Expression::SequenceExpression(sequence) => {
                Expression::SequenceExpression(SequenceExpression {
                    expressions: self.expressions(&sequence.expressions)?,
                })
            }
            js::Expression::ParenthesizedExpression(paren) => self.expression(&paren.expression)?,

            js::Expression::ComputedMemberExpression(m) => {
                Expression::MemberExpression(Box::new(self.computed_member(m)?))
            }
            js::Expression::StaticMemberExpression(m) => {
                Expression::MemberExpression(Box::new(self.static_member(m)?))
            }
            js::Expression::PrivateFieldExpression(m) => {
                Expression::MemberExpression(Box::new(self.private_member(m)?))
            }
            js::Expression::CallExpression(call) => self.call(call)?,
            js::Expression::NewExpression(new) => {
                Expression::NewExpression(Box::new(NewExpression {
                    callee: self.expression(&new.callee)?,
                    arguments: self.arguments(&new.arguments)?,
                }))
            }
            js::Expression::ChainExpression(chain) => {
                let inner = match &chain.expression {
                    js::ChainElement::CallExpression(call) => self.call(call)?,
                    js::ChainElement::TSNonNullExpression(e) => self.expression(&e.expression)?,
                    js::ChainElement::ComputedMemberExpression(m) => {
                        Expression::MemberExpression(Box::new(self.computed_member(m)?))
                    }
                    js::ChainElement::StaticMemberExpression(m) => {
                        Expression::MemberExpression(Box::new(self.static_member(m)?))
                    }
                    js::ChainElement::PrivateFieldExpression(m) => {
                        Expression::MemberExpression(Box::new(self.private_member(m)?))
                    }
                };
                Expression::ChainExpression(Box::new(ChainExpression { expression: inner }))
            }
            js::Expression::ImportExpression(import) => {
                if import.options.is_some() || import.phase.is_some() {
                    return Err(self.unsupported("Import options", import.span));
                }
                Expression::ImportExpression(Box::new(ImportExpression {
                    source: self.expression(&import.source)?,
                }))
            }
            js::Expression::AwaitExpression(a) => {
                Expression::AwaitExpression(Box::new(AwaitExpression {
                    argument: self.expression(&a.argument)?,
                }))
            }
            js::Expression::YieldExpression(y) => {
                Expression::YieldExpression(Box::new(YieldExpression {
                    argument: self.optional_expression(y.argument.as_ref())?,
                    delegate: y.delegate,
                }))
            }

            js::Expression::TSAsExpression(e) => self.expression(&e.expression)?,
            js::Expression::TSSatisfiesExpression(e) => self.expression(&e.expression)?,
            js::Expression::TSTypeAssertion(e) => self.expression(&e.expression)?,
            js::Expression::TSNonNullExpression(e) => self.expression(&e.expression)?,
            js::Expression::TSInstantiationExpression(e) => self.expression(&e.expression)?,

            js::Expression::JSXElement(e) => return Err(self.unsupported("JSX", e.span)),
            js::Expression::JSXFragment(e) => return Err(self.unsupported("JSX", e.span)),
            js::Expression::V8IntrinsicExpression(e) => {
                return Err(self.unsupported("V8 intrinsics", e.span));
            }
        };

        Ok(lowered)
    }
}

fn module_export_name(name: &js::ModuleExportName<'_>) -> ModuleExportName {
    match name {
        js::ModuleExportName::IdentifierName(id) => ModuleExportName::identifier(&id.name),
        js::ModuleExportName::IdentifierReference(id) => ModuleExportName::identifier(&id.name),
        js::ModuleExportName::StringLiteral(s) => ModuleExportName::Literal(Literal::string(&s.value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_statement(source: &str) -> Statement {
        let mut items = parse_script(source).unwrap();
        assert_eq!(items.len(), 1, "expected one item for {:?}", source);
        match items.remove(0) {
            ProgramItem::Statement(statement) => statement,
            other => panic!("expected a statement, got {:?}", other),
        }
    }

    #[test]
    fn test_export_let_with_initializer() {
        let items = parse_script("export let title = 'Hello World!'").unwrap();
        assert_eq!(
            items,
            vec![ProgramItem::ExportNamedDeclaration(
                ExportNamedDeclaration::declaration(Declaration::VariableDeclaration(
                    VariableDeclaration::single(
                        VariableKind::Let,
                        "title",
                        Some(Expression::string("Hello World!")),
                    ),
                ))
            )]
        );
    }

    #[test]
    fn test_items_keep_source_order() {
        let items = parse_script(
            "import { a } from './a.js'\nconsole.log(a)\nexport const b = 1\nexport { a as c }",
        )
        .unwrap();
        let kinds: Vec<&str> = items
            .iter()
            .map(|item| match item {
                ProgramItem::ImportDeclaration(_) => "import",
                ProgramItem::ExportNamedDeclaration(_) => "export",
                ProgramItem::Statement(_) => "statement",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["import", "statement", "export", "export"]);
    }

    #[test]
    fn test_type_annotations_are_dropped() {
        let items = parse_script("export let count: number = 1 as number").unwrap();
        let ProgramItem::ExportNamedDeclaration(export) = &items[0] else {
            panic!("expected a named export");
        };
        let Some(Declaration::VariableDeclaration(variables)) = &export.declaration else {
            panic!("expected a variable declaration");
        };
        assert_eq!(
            variables.declarations[0].init,
            Some(Expression::Literal(Literal::new(LiteralValue::Number(1.0))))
        );
    }

    #[test]
    fn test_type_only_declarations_are_skipped() {
        let items = parse_script(
            "interface Props { title: string }\ntype Id = string\nimport type { X } from './x'\nexport type { Props }\nexport let id: Id",
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], ProgramItem::ExportNamedDeclaration(_)));
    }

    #[test]
    fn test_enums_are_rejected() {
        let err = parse_script("enum Color { Red }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedSyntax);
        assert_eq!(err.context.as_deref(), Some("enum Color { Red }"));
    }

    #[test]
    fn test_syntax_errors() {
        let err = parse_script("export let = ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ScriptSyntax);
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn test_expression_must_consume_input() {
        for text in ["a b", "x)", "a; b"] {
            let err = parse_expression(text).unwrap_err();
            assert_eq!(err.kind, ErrorKind::ScriptSyntax, "{}", text);
        }
        assert_eq!(parse_expression(" a \n").unwrap(), Expression::identifier("a"));
    }

    #[test]
    fn test_function_with_default_and_rest_params() {
        let statement = single_statement("async function load(url, retries = 3, ...rest) { return url }");
        let Statement::FunctionDeclaration(function) = statement else {
            panic!("expected a function declaration");
        };
        assert!(function.is_async);
        assert_eq!(function.id, Some(Identifier::new("load")));
        assert_eq!(function.params.len(), 3);
        assert!(matches!(function.params[1], Pattern::AssignmentPattern(_)));
        assert!(matches!(function.params[2], Pattern::RestElement(_)));
        assert_eq!(
            function.body.body,
            vec![Statement::returns(Expression::identifier("url"))]
        );
    }

    #[test]
    fn test_optional_chain() {
        let expression = parse_expression("user?.name").unwrap();
        assert_eq!(
            expression,
            Expression::ChainExpression(Box::new(ChainExpression {
                expression: Expression::MemberExpression(Box::new(MemberExpression {
                    object: Expression::identifier("user"),
                    property: Expression::identifier("name"),
                    computed: false,
                    optional: true,
                })),
            }))
        );
    }

    #[test]
    fn test_parentheses_are_structural() {
        assert_eq!(
            parse_expression("(a)").unwrap(),
            Expression::identifier("a")
        );
    }

    #[test]
    fn test_arrow_expression_body() {
        let expression = parse_expression("(x) => x + 1").unwrap();
        let Expression::ArrowFunctionExpression(arrow) = expression else {
            panic!("expected an arrow function");
        };
        assert!(arrow.expression);
        assert!(matches!(arrow.body, ArrowBody::Expression(_)));
    }

    #[test]
    fn test_destructuring_assignment() {
        let statement = single_statement("({ a, b: [c = 1] } = value)");
        let Statement::ExpressionStatement(ExpressionStatement { expression, .. }) = statement
        else {
            panic!("expected an expression statement");
        };
        let Expression::AssignmentExpression(assignment) = expression else {
            panic!("expected an assignment");
        };
        let Pattern::ObjectPattern(object) = &assignment.left else {
            panic!("expected an object pattern");
        };
        assert_eq!(object.properties.len(), 2);
    }

    #[test]
    fn test_regex_and_bigint_literals() {
        let Expression::Literal(regex) = parse_expression("/ab+c/gi").unwrap() else {
            panic!("expected a literal");
        };
        assert_eq!(
            regex.regex,
            Some(RegexLiteral {
                pattern: "ab+c".to_string(),
                flags: "gi".to_string(),
            })
        );

        let Expression::Literal(bigint) = parse_expression("10n").unwrap() else {
            panic!("expected a literal");
        };
        assert_eq!(bigint.bigint.as_deref(), Some("10"));
    }

    #[test]
    fn test_use_strict_directive() {
        let statement = single_statement("'use strict'");
        assert_eq!(
            statement,
            Statement::ExpressionStatement(ExpressionStatement {
                expression: Expression::string("use strict"),
                directive: Some("use strict".to_string()),
            })
        );
    }
}
