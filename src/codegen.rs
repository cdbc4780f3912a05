//! Codegen module for the Lazy compiler
//!
//! Prints a Tree Model `Program` as JavaScript source. Parentheses are
//! derived from operator precedence, never stored in the tree, so any
//! well-formed tree prints as code that parses back to the same tree.

use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, ErrorKind, Result};
use crate::tree::{
    ArrowBody, ArrowFunction, BinaryOperator as Bin, BlockStatement, Class, ClassMember, Declaration, DefaultExport,
    ExportClause, Expression, ForInStatement, ForInit, ForLeft, Function, ImportClause, Literal, LiteralValue,
    LogicalOperator, MemberExpression, MethodKind, ModuleExportName, ObjectMember,
    ObjectPatternMember, Pattern, Program, ProgramItem, Property, PropertyDefinition, PropertyKind,
    Statement,
    TemplateLiteral, VariableDeclaration,
};

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmitOptions {
    /// Quote string literals with `'` instead of `"`.
    pub single_quote: bool,
    /// Terminate statements with `;`. When off, statements that would merge
    /// with the previous line get a leading `;`.
    pub semicolons: bool,
    /// Spaces per indentation level.
    pub indent: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            single_quote: true,
            semicolons: false,
            indent: 2,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRECEDENCE
// ═══════════════════════════════════════════════════════════════════════════════

mod precedence {
    pub const SEQUENCE: u8 = 1;
    pub const ASSIGNMENT: u8 = 2;
    pub const CONDITIONAL: u8 = 3;
    pub const COALESCE: u8 = 4;
    pub const LOGICAL_OR: u8 = 4;
    pub const LOGICAL_AND: u8 = 5;
    pub const BITWISE_OR: u8 = 6;
    pub const BITWISE_XOR: u8 = 7;
    pub const BITWISE_AND: u8 = 8;
    pub const EQUALITY: u8 = 9;
    pub const RELATIONAL: u8 = 10;
    pub const SHIFT: u8 = 11;
    pub const ADDITIVE: u8 = 12;
    pub const MULTIPLICATIVE: u8 = 13;
    pub const EXPONENTIAL: u8 = 14;
    pub const PREFIX: u8 = 15;
    pub const POSTFIX: u8 = 16;
    pub const CALL: u8 = 17;
    pub const MEMBER: u8 = 18;
    pub const PRIMARY: u8 = 19;
}

fn binary_precedence(operator: Bin) -> u8 {
    match operator {
        Bin::BitwiseOr => precedence::BITWISE_OR,
        Bin::BitwiseXor => precedence::BITWISE_XOR,
        Bin::BitwiseAnd => precedence::BITWISE_AND,
        Bin::Equal | Bin::NotEqual | Bin::StrictEqual | Bin::StrictNotEqual => {
            precedence::EQUALITY
        }
        Bin::LessThan
        | Bin::LessEqual
        | Bin::GreaterThan
        | Bin::GreaterEqual
        | Bin::In
        | Bin::Instanceof => precedence::RELATIONAL,
        Bin::ShiftLeft | Bin::ShiftRight | Bin::ShiftRightUnsigned => precedence::SHIFT,
        Bin::Add | Bin::Subtract => precedence::ADDITIVE,
        Bin::Multiply | Bin::Divide | Bin::Remainder => precedence::MULTIPLICATIVE,
        Bin::Exponential => precedence::EXPONENTIAL,
    }
}

fn logical_precedence(operator: LogicalOperator) -> u8 {
    match operator {
        LogicalOperator::Coalesce => precedence::COALESCE,
        LogicalOperator::Or => precedence::LOGICAL_OR,
        LogicalOperator::And => precedence::LOGICAL_AND,
    }
}

fn expression_precedence(expression: &Expression) -> u8 {
    match expression {
        Expression::SequenceExpression(_) => precedence::SEQUENCE,
        Expression::AssignmentExpression(_)
        | Expression::ArrowFunctionExpression(_)
        | Expression::YieldExpression(_)
        | Expression::SpreadElement(_) => precedence::ASSIGNMENT,
        Expression::ConditionalExpression(_) => precedence::CONDITIONAL,
        Expression::LogicalExpression(logical) => logical_precedence(logical.operator),
        Expression::BinaryExpression(binary) => binary_precedence(binary.operator),
        Expression::UnaryExpression(_) | Expression::AwaitExpression(_) => precedence::PREFIX,
        Expression::UpdateExpression(update) if update.prefix => precedence::PREFIX,
        Expression::UpdateExpression(_) => precedence::POSTFIX,
        Expression::CallExpression(_)
        | Expression::NewExpression(_)
        | Expression::ChainExpression(_)
        | Expression::ImportExpression(_) => precedence::CALL,
        Expression::MemberExpression(_) | Expression::TaggedTemplateExpression(_) => {
            precedence::MEMBER
        }
        Expression::Literal(Literal {
            value: LiteralValue::Number(n),
            ..
        }) if n.is_sign_negative() => precedence::PREFIX,
        _ => precedence::PRIMARY,
    }
}

/// Whether a call appears in the callee chain, which would bind the
/// arguments of an enclosing `new` to the wrong call.
fn has_call(expression: &Expression) -> bool {
    match expression {
        Expression::CallExpression(_) | Expression::ChainExpression(_) => true,
        Expression::MemberExpression(member) => has_call(&member.object),
        Expression::TaggedTemplateExpression(tagged) => has_call(&tagged.tag),
        _ => false,
    }
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.strip_prefix(keyword).is_some_and(|rest| {
        !rest
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
    })
}

/// Text at statement start that the parser would read as something other
/// than an expression.
fn is_ambiguous_statement_start(text: &str) -> bool {
    text.starts_with('{')
        || starts_with_keyword(text, "function")
        || starts_with_keyword(text, "class")
        || text.starts_with("async function")
        || text.starts_with("let[")
}

/// Whether a class field must be closed with `;` so it does not merge with
/// the member after it: a bare `get`/`set`/`static` field reads as a
/// modifier, and a next member starting with `[`, `*`, `in` or `instanceof`
/// continues the field's expression.
fn field_needs_semicolon(field: &PropertyDefinition, next: Option<&ClassMember>) -> bool {
    let is_modifier_name = |key: &Expression, computed: bool| {
        !computed
            && matches!(key, Expression::Identifier(id) if matches!(id.name.as_str(), "get" | "set" | "static"))
    };
    if field.value.is_none() && !field.is_static && is_modifier_name(&field.key, field.computed) {
        return true;
    }

    let continues = |key: &Expression, computed: bool| {
        computed
            || matches!(key, Expression::Identifier(id) if matches!(id.name.as_str(), "in" | "instanceof"))
    };
    match next {
        Some(ClassMember::MethodDefinition(method)) => {
            !method.is_static
                && (method.value.generator
                    || (method.kind == MethodKind::Method
                        && !method.value.is_async
                        && continues(&method.key, method.computed)))
        }
        Some(ClassMember::PropertyDefinition(property)) => {
            !property.is_static && continues(&property.key, property.computed)
        }
        _ => false,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRING ESCAPING
// ═══════════════════════════════════════════════════════════════════════════════

fn escape_js_string(value: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push(quote);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            c if c == quote => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if (c as u32) < 0x20 => escaped.push_str(&format!("\\x{:02x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped.push(quote);
    escaped
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{}", value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRINTER
// ═══════════════════════════════════════════════════════════════════════════════

struct Printer<'o> {
    options: &'o EmitOptions,
    out: String,
    level: usize,
    /// A statement of the same list precedes the one being printed.
    after_statement: bool,
    /// Inside a `for (init; ...)` head, where a bare `in` ends the init.
    no_in: bool,
}

impl<'o> Printer<'o> {
    fn new(options: &'o EmitOptions) -> Self {
        Printer {
            options,
            out: String::new(),
            level: 0,
            after_statement: false,
            no_in: false,
        }
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.level * self.options.indent {
            self.out.push(' ');
        }
    }

    fn semicolon(&mut self) {
        if self.options.semicolons {
            self.out.push(';');
        }
    }

    fn string(&mut self, value: &str) {
        let quote = if self.options.single_quote { '\'' } else { '"' };
        let escaped = escape_js_string(value, quote);
        self.push(&escaped);
    }

    fn comma_separated<T>(
        &mut self,
        items: &[T],
        mut print: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            print(self, item)?;
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Program and module items
    // ───────────────────────────────────────────────────────────────────────────

    fn program(&mut self, program: &Program) -> Result<()> {
        self.after_statement = false;
        for item in &program.body {
            self.item(item)?;
            self.after_statement = true;
            self.out.push('\n');
        }
        Ok(())
    }

    fn item(&mut self, item: &ProgramItem) -> Result<()> {
        match item {
            ProgramItem::ImportDeclaration(import) => {
                self.push("import ");
                let mut named = Vec::new();
                let mut parts = 0;
                for clause in &import.specifiers {
                    match clause {
                        ImportClause::ImportDefaultSpecifier(s) => {
                            if parts > 0 {
                                self.push(", ");
                            }
                            self.push(&s.local.name);
                            parts += 1;
                        }
                        ImportClause::ImportNamespaceSpecifier(s) => {
                            if parts > 0 {
                                self.push(", ");
                            }
                            self.push("* as ");
                            self.push(&s.local.name);
                            parts += 1;
                        }
                        ImportClause::ImportSpecifier(s) => named.push(s),
                    }
                }
                if !named.is_empty() {
                    if parts > 0 {
                        self.push(", ");
                    }
                    self.push("{ ");
                    self.comma_separated(&named, |p, s| {
                        p.module_export_name(&s.imported);
                        if s.imported.name() != Some(s.local.name.as_str()) {
                            p.push(" as ");
                            p.push(&s.local.name);
                        }
                        Ok(())
                    })?;
                    self.push(" }");
                    parts += 1;
                }
                if parts > 0 {
                    self.push(" from ");
                }
                self.literal(&import.source);
                self.semicolon();
            }

            ProgramItem::ExportNamedDeclaration(export) => {
                self.push("export ");
                if let Some(declaration) = &export.declaration {
                    return self.declaration(declaration);
                }
                if export.specifiers.is_empty() {
                    self.push("{}");
                } else {
                    self.push("{ ");
                    self.comma_separated(&export.specifiers, |p, clause| match clause {
                        ExportClause::ExportSpecifier(s) => {
                            p.module_export_name(&s.local);
                            if s.local.name() != s.exported.name() {
                                p.push(" as ");
                                p.module_export_name(&s.exported);
                            }
                            Ok(())
                        }
                        other => Err(CompilerError::new(
                            ErrorKind::UnsupportedSyntax,
                            format!("{} has no JavaScript form", other.kind()),
                        )
                        .with_context(other.kind())),
                    })?;
                    self.push(" }");
                }
                if let Some(source) = &export.source {
                    self.push(" from ");
                    self.literal(source);
                }
                self.semicolon();
            }

            ProgramItem::ExportDefaultDeclaration(export) => {
                self.push("export default ");
                match &export.declaration {
                    DefaultExport::FunctionDeclaration(function) => {
                        self.function(function)?
                    }
                    DefaultExport::ClassDeclaration(class) => self.class(class)?,
                    DefaultExport::Expression(expression) => {
                        let start = self.out.len();
                        self.expression(expression, precedence::ASSIGNMENT)?;
                        let is_declaration_like = matches!(
                            expression,
                            Expression::FunctionExpression(_) | Expression::ClassExpression(_)
                        );
                        if !is_declaration_like && is_ambiguous_statement_start(&self.out[start..])
                        {
                            self.out.insert(start, '(');
                            self.out.push(')');
                        }
                        self.semicolon();
                    }
                }
            }

            ProgramItem::ExportAllDeclaration(export) => {
                self.push("export *");
                if let Some(exported) = &export.exported {
                    self.push(" as ");
                    self.module_export_name(exported);
                }
                self.push(" from ");
                self.literal(&export.source);
                self.semicolon();
            }

            ProgramItem::Element(element) => {
                return Err(CompilerError::new(
                    ErrorKind::UnsupportedSyntax,
                    "Markup elements have no JavaScript form",
                )
                .with_context(format!("<{}>", element.tag))
                .with_hint("Compile the component before emitting it"));
            }

            ProgramItem::Statement(statement) => self.statement(statement)?,
        }
        Ok(())
    }

    fn module_export_name(&mut self, name: &ModuleExportName) {
        match name {
            ModuleExportName::Identifier(id) => self.push(&id.name),
            ModuleExportName::Literal(literal) => self.literal(literal),
        }
    }

    fn declaration(&mut self, declaration: &Declaration) -> Result<()> {
        match declaration {
            Declaration::VariableDeclaration(variables) => {
                self.variable_declaration(variables)?;
                self.semicolon();
                Ok(())
            }
            Declaration::FunctionDeclaration(function) => self.function(function),
            Declaration::ClassDeclaration(class) => self.class(class),
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Statements
    // ───────────────────────────────────────────────────────────────────────────

    fn block(&mut self, block: &BlockStatement) -> Result<()> {
        self.statements_block(&block.body)
    }

    fn statements_block(&mut self, body: &[Statement]) -> Result<()> {
        if body.is_empty() {
            self.push("{}");
            return Ok(());
        }
        self.push("{");
        self.level += 1;
        self.after_statement = false;
        for statement in body {
            self.newline();
            self.statement(statement)?;
        }
        self.level -= 1;
        self.newline();
        self.push("}");
        Ok(())
    }

    /// The body of `if`/`while`/`for`, after its header.
    fn clause(&mut self, body: &Statement) -> Result<()> {
        match body {
            Statement::BlockStatement(block) => {
                self.push(" ");
                self.block(block)
            }
            Statement::EmptyStatement => {
                self.push(";");
                Ok(())
            }
            other => {
                self.level += 1;
                self.newline();
                self.after_statement = false;
                self.statement(other)?;
                self.level -= 1;
                Ok(())
            }
        }
    }

    fn statement(&mut self, statement: &Statement) -> Result<()> {
        let follows_statement = std::mem::replace(&mut self.after_statement, false);
        self.statement_inner(statement, follows_statement)?;
        self.after_statement = true;
        Ok(())
    }

    fn statement_inner(&mut self, statement: &Statement, follows_statement: bool) -> Result<()> {
        match statement {
            Statement::ExpressionStatement(statement) => {
                let start = self.out.len();
                self.expression(&statement.expression, precedence::SEQUENCE)?;
                if statement.directive.is_none()
                    && is_ambiguous_statement_start(&self.out[start..])
                {
                    self.out.insert(start, '(');
                    self.out.push(')');
                }
                if follows_statement
                    && !self.options.semicolons
                    && self.out[start..].starts_with(['(', '[', '`', '+', '-', '/'])
                {
                    self.out.insert(start, ';');
                }
                self.semicolon();
            }
            Statement::BlockStatement(block) => self.block(block)?,
            Statement::EmptyStatement => self.push(";"),
            Statement::DebuggerStatement => {
                self.push("debugger");
                self.semicolon();
            }
            Statement::ReturnStatement(statement) => {
                self.push("return");
                if let Some(argument) = &statement.argument {
                    self.push(" ");
                    self.expression(argument, precedence::SEQUENCE)?;
                }
                self.semicolon();
            }
            Statement::ThrowStatement(statement) => {
                self.push("throw ");
                self.expression(&statement.argument, precedence::SEQUENCE)?;
                self.semicolon();
            }
            Statement::LabeledStatement(statement) => {
                self.push(&statement.label.name);
                self.push(": ");
                self.after_statement = false;
                self.statement(&statement.body)?;
            }
            Statement::BreakStatement(jump) | Statement::ContinueStatement(jump) => {
                self.push(if matches!(statement, Statement::BreakStatement(_)) {
                    "break"
                } else {
                    "continue"
                });
                if let Some(label) = &jump.label {
                    self.push(" ");
                    self.push(&label.name);
                }
                self.semicolon();
            }
            Statement::IfStatement(statement) => {
                self.push("if (");
                self.expression(&statement.test, precedence::SEQUENCE)?;
                self.push(")");
                match &statement.alternate {
                    None => self.clause(&statement.consequent)?,
                    Some(alternate) => {
                        // A nested `if` without `else` would capture ours.
                        match statement.consequent.as_ref() {
                            Statement::BlockStatement(block) => {
                                self.push(" ");
                                self.block(block)?;
                                self.push(" ");
                            }
                            Statement::IfStatement(nested) if nested.alternate.is_none() => {
                                self.push(" ");
                                self.statements_block(std::slice::from_ref(
                                    statement.consequent.as_ref(),
                                ))?;
                                self.push(" ");
                            }
                            other => {
                                self.clause(other)?;
                                self.newline();
                            }
                        }
                        self.push("else");
                        match alternate.as_ref() {
                            Statement::IfStatement(_) => {
                                self.push(" ");
                                self.after_statement = false;
                                self.statement(alternate)?;
                            }
                            other => self.clause(other)?,
                        }
                    }
                }
            }
            Statement::SwitchStatement(statement) => {
                self.push("switch (");
                self.expression(&statement.discriminant, precedence::SEQUENCE)?;
                self.push(") {");
                self.level += 1;
                for case in &statement.cases {
                    self.newline();
                    match &case.test {
                        Some(test) => {
                            self.push("case ");
                            self.expression(test, precedence::SEQUENCE)?;
                            self.push(":");
                        }
                        None => self.push("default:"),
                    }
                    self.level += 1;
                    self.after_statement = false;
                    for consequent in &case.consequent {
                        self.newline();
                        self.statement(consequent)?;
                    }
                    self.level -= 1;
                }
                self.level -= 1;
                self.newline();
                self.push("}");
            }
            Statement::TryStatement(statement) => {
                self.push("try ");
                self.block(&statement.block)?;
                if let Some(handler) = &statement.handler {
                    self.push(" catch ");
                    if let Some(param) = &handler.param {
                        self.push("(");
                        self.pattern(param)?;
                        self.push(") ");
                    }
                    self.block(&handler.body)?;
                }
                if let Some(finalizer) = &statement.finalizer {
                    self.push(" finally ");
                    self.block(finalizer)?;
                }
            }
            Statement::WhileStatement(statement) => {
                self.push("while (");
                self.expression(&statement.test, precedence::SEQUENCE)?;
                self.push(")");
                self.clause(&statement.body)?;
            }
            Statement::DoWhileStatement(statement) => {
                self.push("do");
                self.clause(&statement.body)?;
                if matches!(statement.body.as_ref(), Statement::BlockStatement(_)) {
                    self.push(" ");
                } else {
                    self.newline();
                }
                self.push("while (");
                self.expression(&statement.test, precedence::SEQUENCE)?;
                self.push(")");
                self.semicolon();
            }
            Statement::ForStatement(statement) => {
                self.push("for (");
                let outer_no_in = std::mem::replace(&mut self.no_in, true);
                let init = match &statement.init {
                    Some(ForInit::VariableDeclaration(variables)) => {
                        self.variable_declaration(variables)
                    }
                    Some(ForInit::Expression(expression)) => {
                        self.expression(expression, precedence::SEQUENCE)
                    }
                    None => Ok(()),
                };
                self.no_in = outer_no_in;
                init?;
                self.push(";");
                if let Some(test) = &statement.test {
                    self.push(" ");
                    self.expression(test, precedence::SEQUENCE)?;
                }
                self.push(";");
                if let Some(update) = &statement.update {
                    self.push(" ");
                    self.expression(update, precedence::SEQUENCE)?;
                }
                self.push(")");
                self.clause(&statement.body)?;
            }
            Statement::ForInStatement(statement) => self.for_in(statement, "in")?,
            Statement::ForOfStatement(statement) => self.for_in(statement, "of")?,
            Statement::VariableDeclaration(variables) => {
                self.variable_declaration(variables)?;
                self.semicolon();
            }
            Statement::FunctionDeclaration(function) => self.function(function)?,
            Statement::ClassDeclaration(class) => self.class(class)?,
        }
        Ok(())
    }

    fn variable_declaration(&mut self, variables: &VariableDeclaration) -> Result<()> {
        self.push(variables.kind.as_str());
        self.push(" ");
        self.comma_separated(&variables.declarations, |p, declarator| {
            p.pattern(&declarator.id)?;
            if let Some(init) = &declarator.init {
                p.push(" = ");
                p.expression(init, precedence::ASSIGNMENT)?;
            }
            Ok(())
        })
    }

    fn for_in(&mut self, statement: &ForInStatement, keyword: &str) -> Result<()> {
        self.push("for ");
        if statement.is_await {
            self.push("await ");
        }
        self.push("(");
        match &statement.left {
            ForLeft::VariableDeclaration(variables) => self.variable_declaration(variables)?,
            ForLeft::Pattern(pattern) => self.pattern(pattern)?,
        }
        self.push(" ");
        self.push(keyword);
        self.push(" ");
        let min = if keyword == "of" {
            precedence::ASSIGNMENT
        } else {
            precedence::SEQUENCE
        };
        self.expression(&statement.right, min)?;
        self.push(")");
        self.clause(&statement.body)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Functions and classes
    // ───────────────────────────────────────────────────────────────────────────

    fn params(&mut self, params: &[Pattern]) -> Result<()> {
        self.push("(");
        self.comma_separated(params, |p, param| p.pattern(param))?;
        self.push(")");
        Ok(())
    }

    fn function(&mut self, function: &Function) -> Result<()> {
        if function.is_async {
            self.push("async ");
        }
        self.push("function");
        if function.generator {
            self.push("*");
        }
        if let Some(id) = &function.id {
            self.push(" ");
            self.push(&id.name);
        }
        self.function_tail(function)
    }

    /// Parameters and body; the part shared by functions and methods.
    fn function_tail(&mut self, function: &Function) -> Result<()> {
        self.params(&function.params)?;
        self.push(" ");
        self.block(&function.body)
    }

    fn method_prefix(&mut self, function: &Function) {
        if function.is_async {
            self.push("async ");
        }
        if function.generator {
            self.push("*");
        }
    }

    fn class(&mut self, class: &Class) -> Result<()> {
        self.push("class");
        if let Some(id) = &class.id {
            self.push(" ");
            self.push(&id.name);
        }
        if let Some(super_class) = &class.super_class {
            self.push(" extends ");
            self.callee(super_class)?;
        }
        self.push(" ");

        let members = &class.body.body;
        if members.is_empty() {
            self.push("{}");
            return Ok(());
        }

        self.push("{");
        self.level += 1;
        for (i, member) in members.iter().enumerate() {
            self.newline();
            self.class_member(member)?;
            if let ClassMember::PropertyDefinition(property) = member {
                if self.options.semicolons || field_needs_semicolon(property, members.get(i + 1))
                {
                    self.push(";");
                }
            }
        }
        self.level -= 1;
        self.newline();
        self.push("}");
        Ok(())
    }

    fn class_member(&mut self, member: &ClassMember) -> Result<()> {
        match member {
            ClassMember::MethodDefinition(method) => {
                if method.is_static {
                    self.push("static ");
                }
                match method.kind {
                    MethodKind::Get => self.push("get "),
                    MethodKind::Set => self.push("set "),
                    MethodKind::Constructor | MethodKind::Method => {}
                }
                self.method_prefix(&method.value);
                self.property_key(&method.key, method.computed)?;
                self.function_tail(&method.value)
            }
            ClassMember::PropertyDefinition(property) => {
                if property.is_static {
                    self.push("static ");
                }
                self.property_key(&property.key, property.computed)?;
                if let Some(value) = &property.value {
                    self.push(" = ");
                    self.expression(value, precedence::ASSIGNMENT)?;
                }
                Ok(())
            }
            ClassMember::StaticBlock(block) => {
                self.push("static ");
                self.statements_block(&block.body)
            }
        }
    }

    fn property_key(&mut self, key: &Expression, computed: bool) -> Result<()> {
        match key {
            Expression::Identifier(id) if !computed => self.push(&id.name),
            Expression::PrivateIdentifier(id) if !computed => {
                self.push("#");
                self.push(&id.name);
            }
            Expression::Literal(literal) if !computed => self.literal(literal),
            other => {
                self.push("[");
                self.expression(other, precedence::ASSIGNMENT)?;
                self.push("]");
            }
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Expressions
    // ───────────────────────────────────────────────────────────────────────────

    /// Print `expression`, parenthesized when it binds looser than `min`.
    fn expression(&mut self, expression: &Expression, min: u8) -> Result<()> {
        let is_bare_in = self.no_in
            && matches!(expression, Expression::BinaryExpression(binary) if binary.operator == Bin::In);
        if is_bare_in || expression_precedence(expression) < min {
            self.push("(");
            self.expression_inner(expression)?;
            self.push(")");
            Ok(())
        } else {
            self.expression_inner(expression)
        }
    }

    /// Callee, tag, heritage and member-object position. An optional chain
    /// there must be closed off so the short-circuit does not extend over it.
    fn callee(&mut self, expression: &Expression) -> Result<()> {
        if let Expression::ChainExpression(_) = expression {
            self.push("(");
            self.expression_inner(expression)?;
            self.push(")");
            Ok(())
        } else {
            self.expression(expression, precedence::CALL)
        }
    }

    fn arguments(&mut self, arguments: &[Expression]) -> Result<()> {
        self.push("(");
        self.comma_separated(arguments, |p, argument| {
            p.expression(argument, precedence::ASSIGNMENT)
        })?;
        self.push(")");
        Ok(())
    }

    fn literal(&mut self, literal: &Literal) {
        if let Some(regex) = &literal.regex {
            self.push("/");
            self.push(&regex.pattern);
            self.push("/");
            self.push(&regex.flags);
            return;
        }
        if let Some(bigint) = &literal.bigint {
            self.push(bigint);
            self.push("n");
            return;
        }
        match &literal.value {
            LiteralValue::Null => self.push("null"),
            LiteralValue::Boolean(true) => self.push("true"),
            LiteralValue::Boolean(false) => self.push("false"),
            LiteralValue::Number(n) => self.push(&format_number(*n)),
            LiteralValue::String(s) => self.string(s),
        }
    }

    fn template(&mut self, template: &TemplateLiteral) -> Result<()> {
        self.push("`");
        for (i, quasi) in template.quasis.iter().enumerate() {
            self.push(&quasi.value.raw);
            if let Some(expression) = template.expressions.get(i) {
                self.push("${");
                self.expression(expression, precedence::SEQUENCE)?;
                self.push("}");
            }
        }
        self.push("`");
        Ok(())
    }

    fn member(&mut self, member: &MemberExpression) -> Result<()> {
        let start = self.out.len();
        self.callee(&member.object)?;
        // `1.toString()` reads the dot as a decimal point.
        if !member.computed
            && matches!(
                member.object,
                Expression::Literal(Literal {
                    value: LiteralValue::Number(_),
                    regex: None,
                    bigint: None,
                })
            )
            && self.out[start..].bytes().all(|b| b.is_ascii_digit())
        {
            self.out.insert(start, '(');
            self.push(")");
        }

        if member.optional {
            self.push("?.");
        }
        if member.computed {
            self.push("[");
            self.expression(&member.property, precedence::SEQUENCE)?;
            self.push("]");
            return Ok(());
        }

        if !member.optional {
            self.push(".");
        }
        match &member.property {
            Expression::Identifier(id) => self.push(&id.name),
            Expression::PrivateIdentifier(id) => {
                self.push("#");
                self.push(&id.name);
            }
            other => {
                return Err(CompilerError::new(
                    ErrorKind::UnsupportedSyntax,
                    "Non-computed member property must be an identifier",
                )
                .with_context(format!("{:?}", other)));
            }
        }
        Ok(())
    }

    fn object_property(&mut self, property: &Property) -> Result<()> {
        match property.kind {
            PropertyKind::Get | PropertyKind::Set => {
                let function = method_function(&property.value)?;
                self.push(if property.kind == PropertyKind::Get {
                    "get "
                } else {
                    "set "
                });
                self.property_key(&property.key, property.computed)?;
                self.function_tail(function)
            }
            PropertyKind::Init if property.method => {
                let function = method_function(&property.value)?;
                self.method_prefix(function);
                self.property_key(&property.key, property.computed)?;
                self.function_tail(function)
            }
            PropertyKind::Init => {
                if property.shorthand && !property.computed {
                    if let (Expression::Identifier(key), Expression::Identifier(value)) =
                        (&property.key, &property.value)
                    {
                        if key == value {
                            self.push(&key.name);
                            return Ok(());
                        }
                    }
                }
                self.property_key(&property.key, property.computed)?;
                self.push(": ");
                self.expression(&property.value, precedence::ASSIGNMENT)
            }
        }
    }

    fn arrow(&mut self, arrow: &ArrowFunction) -> Result<()> {
        if arrow.is_async {
            self.push("async ");
        }
        self.params(&arrow.params)?;
        self.push(" => ");
        match &arrow.body {
            ArrowBody::BlockStatement(block) => self.block(block),
            ArrowBody::Expression(body) => {
                let start = self.out.len();
                self.expression(body, precedence::ASSIGNMENT)?;
                if self.out[start..].starts_with('{') {
                    self.out.insert(start, '(');
                    self.push(")");
                }
                Ok(())
            }
        }
    }

    fn expression_inner(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::Identifier(id) => self.push(&id.name),
            Expression::PrivateIdentifier(id) => {
                self.push("#");
                self.push(&id.name);
            }
            Expression::Literal(literal) => self.literal(literal),
            Expression::ThisExpression => self.push("this"),
            Expression::Super => self.push("super"),

            Expression::ArrayExpression(array) => {
                self.push("[");
                self.comma_separated(&array.elements, |p, element| match element {
                    Some(element) => p.expression(element, precedence::ASSIGNMENT),
                    None => Ok(()),
                })?;
                if let Some(None) = array.elements.last() {
                    self.push(",");
                }
                self.push("]");
            }
            Expression::ObjectExpression(object) => {
                if object.properties.is_empty() {
                    self.push("{}");
                    return Ok(());
                }
                self.push("{");
                self.level += 1;
                let last = object.properties.len() - 1;
                for (i, member) in object.properties.iter().enumerate() {
                    self.newline();
                    match member {
                        ObjectMember::Property(property) => self.object_property(property)?,
                        ObjectMember::SpreadElement(spread) => {
                            self.push("...");
                            self.expression(&spread.argument, precedence::ASSIGNMENT)?;
                        }
                    }
                    if i < last {
                        self.push(",");
                    }
                }
                self.level -= 1;
                self.newline();
                self.push("}");
            }

            Expression::FunctionExpression(function) => self.function(function)?,
            Expression::ArrowFunctionExpression(arrow) => self.arrow(arrow)?,
            Expression::ClassExpression(class) => self.class(class)?,
            Expression::TemplateLiteral(template) => self.template(template)?,
            Expression::TaggedTemplateExpression(tagged) => {
                self.callee(&tagged.tag)?;
                self.template(&tagged.quasi)?;
            }

            Expression::UnaryExpression(unary) => {
                let operator = unary.operator.as_str();
                self.push(operator);
                if operator.chars().all(char::is_alphabetic) {
                    self.push(" ");
                }
                let start = self.out.len();
                self.expression(&unary.argument, precedence::PREFIX)?;
                if (operator == "+" || operator == "-") && self.out[start..].starts_with(operator) {
                    self.out.insert(start, ' ');
                }
            }
            Expression::UpdateExpression(update) => {
                if update.prefix {
                    self.push(update.operator.as_str());
                    self.expression(&update.argument, precedence::PREFIX)?;
                } else {
                    self.expression(&update.argument, precedence::CALL)?;
                    self.push(update.operator.as_str());
                }
            }
            Expression::BinaryExpression(binary) => {
                let p = binary_precedence(binary.operator);
                let (left_min, right_min) = if binary.operator == Bin::Exponential {
                    (precedence::POSTFIX, p)
                } else {
                    (p, p + 1)
                };
                self.expression(&binary.left, left_min)?;
                self.push(" ");
                self.push(binary.operator.as_str());
                self.push(" ");
                self.expression(&binary.right, right_min)?;
            }
            Expression::LogicalExpression(logical) => {
                let p = logical_precedence(logical.operator);
                let is_coalesce = logical.operator == LogicalOperator::Coalesce;
                // `??` cannot be mixed with `||`/`&&` without parentheses.
                let mixed = |operand: &Expression| {
                    matches!(operand, Expression::LogicalExpression(inner)
                        if (inner.operator == LogicalOperator::Coalesce) != is_coalesce)
                };
                let left_min = if mixed(&logical.left) { precedence::PRIMARY } else { p };
                let right_min = if mixed(&logical.right) {
                    precedence::PRIMARY
                } else {
                    p + 1
                };
                self.expression(&logical.left, left_min)?;
                self.push(" ");
                self.push(logical.operator.as_str());
                self.push(" ");
                self.expression(&logical.right, right_min)?;
            }
            Expression::AssignmentExpression(assignment) => {
                self.pattern(&assignment.left)?;
                self.push(" ");
                self.push(assignment.operator.as_str());
                self.push(" ");
                self.expression(&assignment.right, precedence::ASSIGNMENT)?;
            }
            Expression::ConditionalExpression(conditional) => {
                self.expression(&conditional.test, precedence::COALESCE)?;
                self.push(" ? ");
                self.expression(&conditional.consequent, precedence::ASSIGNMENT)?;
                self.push(" : ");
                self.expression(&conditional.alternate, precedence::ASSIGNMENT)?;
            }
            Expression::SequenceExpression(sequence) => {
                self.comma_separated(&sequence.expressions, |p, expression| {
                    p.expression(expression, precedence::ASSIGNMENT)
                })?;
            }

            Expression::MemberExpression(member) => self.member(member)?,
            Expression::CallExpression(call) => {
                self.callee(&call.callee)?;
                if call.optional {
                    self.push("?.");
                }
                self.arguments(&call.arguments)?;
            }
            Expression::NewExpression(new) => {
                self.push("new ");
                if has_call(&new.callee) || expression_precedence(&new.callee) < precedence::MEMBER {
                    self.push("(");
                    self.expression_inner(&new.callee)?;
                    self.push(")");
                } else {
                    self.expression_inner(&new.callee)?;
                }
                self.arguments(&new.arguments)?;
            }
            Expression::ChainExpression(chain) => self.expression_inner(&chain.expression)?,
            Expression::ImportExpression(import) => {
                self.push("import(");
                self.expression(&import.source, precedence::ASSIGNMENT)?;
                self.push(")");
            }
            Expression::MetaProperty(meta) => {
                self.push(&meta.meta.name);
                self.push(".");
                self.push(&meta.property.name);
            }

            Expression::SpreadElement(spread) => {
                self.push("...");
                self.expression(&spread.argument, precedence::ASSIGNMENT)?;
            }
            Expression::AwaitExpression(await_expression) => {
                self.push("await ");
                self.expression(&await_expression.argument, precedence::PREFIX)?;
            }
            Expression::YieldExpression(yield_expression) => {
                self.push("yield");
                if yield_expression.delegate {
                    self.push("*");
                }
                if let Some(argument) = &yield_expression.argument {
                    self.push(" ");
                    self.expression(argument, precedence::ASSIGNMENT)?;
                }
            }
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Patterns
    // ───────────────────────────────────────────────────────────────────────────

    fn pattern(&mut self, pattern: &Pattern) -> Result<()> {
        match pattern {
            Pattern::Identifier(id) => self.push(&id.name),
            Pattern::ObjectPattern(object) => {
                if object.properties.is_empty() {
                    self.push("{}");
                    return Ok(());
                }
                self.push("{ ");
                self.comma_separated(&object.properties, |p, member| match member {
                    ObjectPatternMember::Property(property) => {
                        if property.shorthand && is_shorthand_of(&property.key, &property.value) {
                            return p.pattern(&property.value);
                        }
                        p.property_key(&property.key, property.computed)?;
                        p.push(": ");
                        p.pattern(&property.value)
                    }
                    ObjectPatternMember::RestElement(rest) => {
                        p.push("...");
                        p.pattern(&rest.argument)
                    }
                })?;
                self.push(" }");
            }
            Pattern::ArrayPattern(array) => {
                self.push("[");
                self.comma_separated(&array.elements, |p, element| match element {
                    Some(element) => p.pattern(element),
                    None => Ok(()),
                })?;
                if let Some(None) = array.elements.last() {
                    self.push(",");
                }
                self.push("]");
            }
            Pattern::RestElement(rest) => {
                self.push("...");
                self.pattern(&rest.argument)?;
            }
            Pattern::AssignmentPattern(assignment) => {
                self.pattern(&assignment.left)?;
                self.push(" = ");
                self.expression(&assignment.right, precedence::ASSIGNMENT)?;
            }
            Pattern::MemberExpression(member) => self.member(member)?,
        }
        Ok(())
    }
}

fn method_function(value: &Expression) -> Result<&Function> {
    match value {
        Expression::FunctionExpression(function) => Ok(&**function),
        other => Err(CompilerError::new(
            ErrorKind::UnsupportedSyntax,
            "Object methods and accessors must have a function value",
        )
        .with_context(format!("{:?}", other))),
    }
}

/// `{ a }` and `{ a = 1 }` in a pattern: the key repeats the bound name.
fn is_shorthand_of(key: &Expression, value: &Pattern) -> bool {
    let Expression::Identifier(key) = key else {
        return false;
    };
    match value {
        Pattern::Identifier(id) => id == key,
        Pattern::AssignmentPattern(assignment) => {
            matches!(&assignment.left, Pattern::Identifier(id) if id == key)
        }
        _ => false,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Print a whole program, one top-level item per line.
pub fn emit_program(program: &Program, options: &EmitOptions) -> Result<String> {
    let mut printer = Printer::new(options);
    printer.program(program)?;
    Ok(printer.out)
}

pub fn emit_expression(expression: &Expression, options: &EmitOptions) -> Result<String> {
    let mut printer = Printer::new(options);
    printer.expression(expression, precedence::SEQUENCE)?;
    Ok(printer.out)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use crate::tree::Element;

    fn emit_with(source: &str, options: &EmitOptions) -> String {
        let program = Program::module(parse_script(source).unwrap());
        emit_program(&program, options).unwrap()
    }

    fn emit(source: &str) -> String {
        emit_with(source, &EmitOptions::default())
    }

    #[test]
    fn test_escape_js_string() {
        assert_eq!(escape_js_string("it's\n", '\''), "'it\\'s\\n'");
        assert_eq!(escape_js_string("say \"hi\"", '"'), "\"say \\\"hi\\\"\"");
        assert_eq!(escape_js_string("tab\there", '\''), "'tab\\there'");
    }

    #[test]
    fn test_binary_precedence() {
        assert_eq!(emit("(a + b) * c"), "(a + b) * c\n");
        assert_eq!(emit("a + b * c"), "a + b * c\n");
        assert_eq!(emit("a - (b - c)"), "a - (b - c)\n");
        assert_eq!(emit("x = (-a) ** 2"), "x = (-a) ** 2\n");
        assert_eq!(emit("x = a ** b ** c"), "x = a ** b ** c\n");
    }

    #[test]
    fn test_logical_mixing_keeps_parentheses() {
        assert_eq!(emit("a ?? (b || c)"), "a ?? (b || c)\n");
        assert_eq!(emit("(a || b) && c"), "(a || b) && c\n");
        assert_eq!(emit("a || b && c"), "a || b && c\n");
    }

    #[test]
    fn test_unary_signs_do_not_merge() {
        assert_eq!(emit("x = - -a"), "x = - -a\n");
        assert_eq!(emit("x = typeof a"), "x = typeof a\n");
    }

    #[test]
    fn test_statement_start_ambiguity() {
        assert_eq!(emit("({ a } = b)"), "({ a } = b)\n");
        assert_eq!(emit("x()\n;({ a } = b)"), "x()\n;({ a } = b)\n");
        assert_eq!(emit("f = () => ({})"), "f = () => ({})\n");
        assert_eq!(emit("x()\n;[1, 2].forEach(f)"), "x()\n;[1, 2].forEach(f)\n");
        assert_eq!(
            emit("function f() {\n  (a || b)()\n}"),
            "function f() {\n  (a || b)()\n}\n"
        );
    }

    #[test]
    fn test_clause_body_is_not_guarded() {
        assert_eq!(emit("if (a) (b || c)()"), "if (a)\n  (b || c)()\n");
        assert_eq!(emit("x: (a || b)()"), "x: (a || b)()\n");
    }

    #[test]
    fn test_in_inside_for_init_keeps_parentheses() {
        assert_eq!(
            emit("for (let i = ('x' in y); i; ) {}"),
            "for (let i = ('x' in y); i;) {}\n"
        );
        assert_eq!(emit("for (a = (b in c); ; ) {}"), "for (a = (b in c);;) {}\n");
        assert_eq!(emit("x = 'x' in y"), "x = 'x' in y\n");
    }

    #[test]
    fn test_fields_that_would_merge_get_semicolons() {
        let source = "class A {\n  get;\n  constructor() {}\n  x = 1;\n  [y]() {}\n  static;\n  *z() {}\n}";
        assert_eq!(emit(source), format!("{}\n", source));
        assert_eq!(
            emit("class A {\n  value\n  constructor() {}\n}"),
            "class A {\n  value\n  constructor() {}\n}\n"
        );
    }

    #[test]
    fn test_member_and_new() {
        assert_eq!(emit("x = (1).toString()"), "x = (1).toString()\n");
        assert_eq!(emit("x = new (a())()"), "x = new (a())()\n");
        assert_eq!(emit("x = new a.b()"), "x = new a.b()\n");
        assert_eq!(emit("a?.b(c)"), "a?.b(c)\n");
        assert_eq!(emit("x = (a?.b).c"), "x = (a?.b).c\n");
    }

    #[test]
    fn test_template_literals() {
        assert_eq!(emit("tag`a${b}c`"), "tag`a${b}c`\n");
    }

    #[test]
    fn test_imports() {
        let source = "import a, { b as c, d } from 'x'\nimport * as ns from 'y'\nimport 'z'";
        assert_eq!(emit(source), format!("{}\n", source));
    }

    #[test]
    fn test_if_else_without_blocks() {
        assert_eq!(emit("if (a) b()\nelse c()"), "if (a)\n  b()\nelse\n  c()\n");
    }

    #[test]
    fn test_class_members() {
        let source = "class A extends B {\n  static x = 1\n  #y\n  get z() {\n    return this.#y\n  }\n}";
        assert_eq!(emit(source), format!("{}\n", source));
    }

    #[test]
    fn test_semicolons_and_double_quotes() {
        let options = EmitOptions {
            single_quote: false,
            semicolons: true,
            indent: 4,
        };
        assert_eq!(
            emit_with("let a = 'x'\nif (a) {\n  f(a)\n}", &options),
            "let a = \"x\";\nif (a) {\n    f(a);\n}\n"
        );
    }

    #[test]
    fn test_markup_has_no_javascript_form() {
        let program = Program::module(vec![ProgramItem::Element(Element {
            tag: "div".to_string(),
            attributes: vec![],
            children: vec![],
        })]);
        let err = emit_program(&program, &EmitOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedSyntax);
        assert_eq!(err.context.as_deref(), Some("<div>"));
    }
}
