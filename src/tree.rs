//! Tree Model for the Lazy component compiler.
//!
//! ESTree-shaped program nodes plus the markup extension (`Element`,
//! `Attribute`, `DataBinding`). Every node (de)serializes as ESTree JSON with a
//! `"type"` discriminant, so trees can cross the Node boundary unchanged.
//! Source positions are not modelled; unknown fields are ignored on input.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// NODE TAGGING
// ═══════════════════════════════════════════════════════════════════════════════

/// Node kinds that also appear outside an enclosing enum (function bodies,
/// import sources, labels) and must carry their own `"type"` tag there.
pub trait NodeKind {
    const KIND: &'static str;
}

/// `#[serde(with = "tagged")]` for a single standalone node.
mod tagged {
    use super::NodeKind;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct Tagged<'a, T> {
        #[serde(rename = "type")]
        kind: &'static str,
        #[serde(flatten)]
        node: &'a T,
    }

    pub fn serialize<T, S>(node: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize + NodeKind,
        S: Serializer,
    {
        Tagged {
            kind: T::KIND,
            node,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer)
    }
}

/// `#[serde(with = "tagged_option")]` for an optional standalone node.
mod tagged_option {
    use super::NodeKind;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct Tagged<'a, T> {
        #[serde(rename = "type")]
        kind: &'static str,
        #[serde(flatten)]
        node: &'a T,
    }

    pub fn serialize<T, S>(node: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize + NodeKind,
        S: Serializer,
    {
        match node {
            Some(node) => serializer.serialize_some(&Tagged {
                kind: T::KIND,
                node,
            }),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPERATORS
// ═══════════════════════════════════════════════════════════════════════════════

macro_rules! operators {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $symbol:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $symbol)]
                $variant,
            )*
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $symbol,)*
                }
            }

            pub fn from_symbol(symbol: &str) -> Option<Self> {
                match symbol {
                    $($symbol => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

operators! {
    UnaryOperator {
        Minus => "-",
        Plus => "+",
        Not => "!",
        BitwiseNot => "~",
        Typeof => "typeof",
        Void => "void",
        Delete => "delete",
    }
}

operators! {
    UpdateOperator {
        Increment => "++",
        Decrement => "--",
    }
}

operators! {
    BinaryOperator {
        Equal => "==",
        NotEqual => "!=",
        StrictEqual => "===",
        StrictNotEqual => "!==",
        LessThan => "<",
        LessEqual => "<=",
        GreaterThan => ">",
        GreaterEqual => ">=",
        ShiftLeft => "<<",
        ShiftRight => ">>",
        ShiftRightUnsigned => ">>>",
        Add => "+",
        Subtract => "-",
        Multiply => "*",
        Divide => "/",
        Remainder => "%",
        BitwiseOr => "|",
        BitwiseXor => "^",
        BitwiseAnd => "&",
        In => "in",
        Instanceof => "instanceof",
        Exponential => "**",
    }
}

operators! {
    LogicalOperator {
        Or => "||",
        And => "&&",
        Coalesce => "??",
    }
}

operators! {
    AssignmentOperator {
        Assign => "=",
        AddAssign => "+=",
        SubtractAssign => "-=",
        MultiplyAssign => "*=",
        DivideAssign => "/=",
        RemainderAssign => "%=",
        ShiftLeftAssign => "<<=",
        ShiftRightAssign => ">>=",
        ShiftRightUnsignedAssign => ">>>=",
        BitwiseOrAssign => "|=",
        BitwiseXorAssign => "^=",
        BitwiseAndAssign => "&=",
        ExponentialAssign => "**=",
        OrAssign => "||=",
        AndAssign => "&&=",
        CoalesceAssign => "??=",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROGRAM
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Script,
    #[default]
    Module,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub struct Program {
    #[serde(default)]
    pub source_type: SourceType,
    pub body: Vec<ProgramItem>,
}

impl Program {
    pub fn module(body: Vec<ProgramItem>) -> Self {
        Program {
            source_type: SourceType::Module,
            body,
        }
    }
}

/// One top-level entry of a program body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgramItem {
    ImportDeclaration(ImportDeclaration),
    ExportNamedDeclaration(ExportNamedDeclaration),
    ExportDefaultDeclaration(ExportDefaultDeclaration),
    ExportAllDeclaration(ExportAllDeclaration),
    Element(Element),
    #[serde(untagged)]
    Statement(Statement),
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    ExpressionStatement(ExpressionStatement),
    BlockStatement(BlockStatement),
    EmptyStatement,
    DebuggerStatement,
    ReturnStatement(ReturnStatement),
    LabeledStatement(LabeledStatement),
    BreakStatement(JumpStatement),
    ContinueStatement(JumpStatement),
    IfStatement(IfStatement),
    SwitchStatement(SwitchStatement),
    ThrowStatement(ThrowStatement),
    TryStatement(Box<TryStatement>),
    WhileStatement(WhileStatement),
    DoWhileStatement(WhileStatement),
    ForStatement(Box<ForStatement>),
    ForInStatement(Box<ForInStatement>),
    ForOfStatement(Box<ForInStatement>),
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(Box<Function>),
    ClassDeclaration(Box<Class>),
}

impl Statement {
    pub fn expression(expression: Expression) -> Self {
        Statement::ExpressionStatement(ExpressionStatement {
            expression,
            directive: None,
        })
    }

    pub fn returns(argument: Expression) -> Self {
        Statement::ReturnStatement(ReturnStatement {
            argument: Some(argument),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expression: Expression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockStatement {
    pub body: Vec<Statement>,
}

impl NodeKind for BlockStatement {
    const KIND: &'static str = "BlockStatement";
}

impl BlockStatement {
    pub fn new(body: Vec<Statement>) -> Self {
        BlockStatement { body }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub argument: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledStatement {
    #[serde(with = "tagged")]
    pub label: Identifier,
    pub body: Box<Statement>,
}

/// `break` / `continue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpStatement {
    #[serde(default, with = "tagged_option")]
    pub label: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Box<Statement>,
    pub alternate: Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStatement {
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct SwitchCase {
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowStatement {
    pub argument: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStatement {
    #[serde(with = "tagged")]
    pub block: BlockStatement,
    pub handler: Option<CatchClause>,
    #[serde(default, with = "tagged_option")]
    pub finalizer: Option<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct CatchClause {
    pub param: Option<Pattern>,
    #[serde(with = "tagged")]
    pub body: BlockStatement,
}

/// `while` and `do ... while`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    pub test: Expression,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Statement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForInit {
    VariableDeclaration(VariableDeclaration),
    #[serde(untagged)]
    Expression(Expression),
}

/// `for ... in` and `for ... of`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForInStatement {
    pub left: ForLeft,
    pub right: Expression,
    pub body: Statement,
    #[serde(default, rename = "await", skip_serializing_if = "std::ops::Not::not")]
    pub is_await: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForLeft {
    VariableDeclaration(VariableDeclaration),
    #[serde(untagged)]
    Pattern(Pattern),
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub declarations: Vec<VariableDeclarator>,
}

impl VariableDeclaration {
    /// A single-binding declaration, `kind name = init`.
    pub fn single(kind: VariableKind, name: &str, init: Option<Expression>) -> Self {
        VariableDeclaration {
            kind,
            declarations: vec![VariableDeclarator {
                id: Pattern::Identifier(Identifier::new(name)),
                init,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct VariableDeclarator {
    pub id: Pattern,
    pub init: Option<Expression>,
}

/// Shared shape of function declarations and function expressions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Function {
    #[serde(default, with = "tagged_option")]
    pub id: Option<Identifier>,
    pub params: Vec<Pattern>,
    #[serde(with = "tagged")]
    pub body: BlockStatement,
    #[serde(default)]
    pub generator: bool,
    #[serde(default, rename = "async")]
    pub is_async: bool,
}

impl NodeKind for Function {
    const KIND: &'static str = "FunctionExpression";
}

impl Function {
    pub fn anonymous(params: Vec<Pattern>, body: Vec<Statement>) -> Self {
        Function {
            id: None,
            params,
            body: BlockStatement::new(body),
            generator: false,
            is_async: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(default, with = "tagged_option")]
    pub id: Option<Identifier>,
    pub super_class: Option<Expression>,
    pub body: ClassBody,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct ClassBody {
    pub body: Vec<ClassMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClassMember {
    MethodDefinition(MethodDefinition),
    PropertyDefinition(PropertyDefinition),
    StaticBlock(StaticBlock),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub key: Expression,
    #[serde(with = "tagged")]
    pub value: Function,
    pub kind: MethodKind,
    #[serde(default)]
    pub computed: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl MethodDefinition {
    /// A plain, non-computed method `name(params) { body }`.
    pub fn method(name: &str, params: Vec<Pattern>, body: Vec<Statement>) -> Self {
        MethodDefinition {
            key: Expression::identifier(name),
            value: Function::anonymous(params, body),
            kind: MethodKind::Method,
            computed: false,
            is_static: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub key: Expression,
    pub value: Option<Expression>,
    #[serde(default)]
    pub computed: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticBlock {
    pub body: Vec<Statement>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Identifier(Identifier),
    PrivateIdentifier(Identifier),
    Literal(Literal),
    ThisExpression,
    Super,
    ArrayExpression(ArrayExpression),
    ObjectExpression(ObjectExpression),
    FunctionExpression(Box<Function>),
    ArrowFunctionExpression(Box<ArrowFunction>),
    ClassExpression(Box<Class>),
    TemplateLiteral(TemplateLiteral),
    TaggedTemplateExpression(Box<TaggedTemplateExpression>),
    UnaryExpression(Box<UnaryExpression>),
    UpdateExpression(Box<UpdateExpression>),
    BinaryExpression(Box<BinaryExpression>),
    LogicalExpression(Box<LogicalExpression>),
    AssignmentExpression(Box<AssignmentExpression>),
    ConditionalExpression(Box<ConditionalExpression>),
    MemberExpression(Box<MemberExpression>),
    CallExpression(Box<CallExpression>),
    NewExpression(Box<NewExpression>),
    SequenceExpression(SequenceExpression),
    SpreadElement(Box<SpreadElement>),
    AwaitExpression(Box<AwaitExpression>),
    YieldExpression(Box<YieldExpression>),
    ChainExpression(Box<ChainExpression>),
    ImportExpression(Box<ImportExpression>),
    MetaProperty(MetaProperty),
}

impl Expression {
    pub fn identifier(name: &str) -> Self {
        Expression::Identifier(Identifier::new(name))
    }

    pub fn string(value: &str) -> Self {
        Expression::Literal(Literal::string(value))
    }

    /// Non-computed member access `object.property`.
    pub fn member(object: Expression, property: &str) -> Self {
        Expression::MemberExpression(Box::new(MemberExpression {
            object,
            property: Expression::identifier(property),
            computed: false,
            optional: false,
        }))
    }

    /// Computed member access `object[property]`.
    pub fn index(object: Expression, property: Expression) -> Self {
        Expression::MemberExpression(Box::new(MemberExpression {
            object,
            property,
            computed: true,
            optional: false,
        }))
    }

    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Self {
        Expression::CallExpression(Box::new(CallExpression {
            callee,
            arguments,
            optional: false,
        }))
    }

    pub fn assign(left: Pattern, right: Expression) -> Self {
        Expression::AssignmentExpression(Box::new(AssignmentExpression {
            operator: AssignmentOperator::Assign,
            left,
            right,
        }))
    }

    pub fn array(elements: Vec<Expression>) -> Self {
        Expression::ArrayExpression(ArrayExpression {
            elements: elements.into_iter().map(Some).collect(),
        })
    }

    pub fn object(properties: Vec<Property>) -> Self {
        Expression::ObjectExpression(ObjectExpression {
            properties: properties.into_iter().map(ObjectMember::Property).collect(),
        })
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
}

impl NodeKind for Identifier {
    const KIND: &'static str = "Identifier";
}

impl Identifier {
    pub fn new(name: &str) -> Self {
        Identifier {
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub value: LiteralValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegexLiteral>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bigint: Option<String>,
}

impl NodeKind for Literal {
    const KIND: &'static str = "Literal";
}

impl Literal {
    pub fn new(value: LiteralValue) -> Self {
        Literal {
            value,
            regex: None,
            bigint: None,
        }
    }

    pub fn string(value: &str) -> Self {
        Literal::new(LiteralValue::String(value.to_string()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexLiteral {
    pub pattern: String,
    pub flags: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayExpression {
    /// `None` marks a hole (`[a, , b]`).
    pub elements: Vec<Option<Expression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    Property(Property),
    SpreadElement(SpreadElement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: Expression,
    pub value: Expression,
    pub kind: PropertyKind,
    #[serde(default)]
    pub method: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub shorthand: bool,
}

impl Property {
    /// A plain `key: value` entry.
    pub fn init(key: Expression, value: Expression) -> Self {
        Property {
            key,
            value,
            kind: PropertyKind::Init,
            method: false,
            computed: false,
            shorthand: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowFunction {
    pub params: Vec<Pattern>,
    pub body: ArrowBody,
    /// True when the body is a bare expression.
    pub expression: bool,
    #[serde(default, rename = "async")]
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArrowBody {
    BlockStatement(BlockStatement),
    #[serde(untagged)]
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLiteral {
    pub quasis: Vec<TemplateElement>,
    pub expressions: Vec<Expression>,
}

impl NodeKind for TemplateLiteral {
    const KIND: &'static str = "TemplateLiteral";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct TemplateElement {
    pub tail: bool,
    pub value: TemplateElementValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateElementValue {
    pub raw: String,
    pub cooked: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedTemplateExpression {
    pub tag: Expression,
    #[serde(with = "tagged")]
    pub quasi: TemplateLiteral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    #[serde(default = "default_true")]
    pub prefix: bool,
    pub argument: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpression {
    pub operator: UpdateOperator,
    pub prefix: bool,
    pub argument: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Expression,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalExpression {
    pub operator: LogicalOperator,
    pub left: Expression,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentExpression {
    pub operator: AssignmentOperator,
    pub left: Pattern,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalExpression {
    pub test: Expression,
    pub consequent: Expression,
    pub alternate: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExpression {
    pub object: Expression,
    pub property: Expression,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
    pub callee: Expression,
    pub arguments: Vec<Expression>,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpression {
    pub callee: Expression,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceExpression {
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadElement {
    pub argument: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwaitExpression {
    pub argument: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldExpression {
    pub argument: Option<Expression>,
    #[serde(default)]
    pub delegate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainExpression {
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportExpression {
    pub source: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaProperty {
    #[serde(with = "tagged")]
    pub meta: Identifier,
    #[serde(with = "tagged")]
    pub property: Identifier,
}

fn default_true() -> bool {
    true
}

// ═══════════════════════════════════════════════════════════════════════════════
// PATTERNS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    Identifier(Identifier),
    ObjectPattern(ObjectPattern),
    ArrayPattern(ArrayPattern),
    RestElement(Box<RestElement>),
    AssignmentPattern(Box<AssignmentPattern>),
    MemberExpression(Box<MemberExpression>),
}

impl Pattern {
    pub fn identifier(name: &str) -> Self {
        Pattern::Identifier(Identifier::new(name))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Pattern::Identifier(_) => "Identifier",
            Pattern::ObjectPattern(_) => "ObjectPattern",
            Pattern::ArrayPattern(_) => "ArrayPattern",
            Pattern::RestElement(_) => "RestElement",
            Pattern::AssignmentPattern(_) => "AssignmentPattern",
            Pattern::MemberExpression(_) => "MemberExpression",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPattern {
    pub properties: Vec<ObjectPatternMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectPatternMember {
    Property(AssignmentProperty),
    RestElement(RestElement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentProperty {
    pub key: Expression,
    pub value: Pattern,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub shorthand: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayPattern {
    pub elements: Vec<Option<Pattern>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestElement {
    pub argument: Pattern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentPattern {
    pub left: Pattern,
    pub right: Expression,
}

// ═══════════════════════════════════════════════════════════════════════════════
// MODULE DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    #[serde(default)]
    pub specifiers: Vec<ImportClause>,
    #[serde(with = "tagged")]
    pub source: Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportClause {
    ImportSpecifier(ImportSpecifier),
    ImportDefaultSpecifier(LocalSpecifier),
    ImportNamespaceSpecifier(LocalSpecifier),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub imported: ModuleExportName,
    #[serde(with = "tagged")]
    pub local: Identifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSpecifier {
    #[serde(with = "tagged")]
    pub local: Identifier,
}

/// A name on either side of an `as` in an import/export clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModuleExportName {
    Identifier(Identifier),
    Literal(Literal),
}

impl ModuleExportName {
    pub fn identifier(name: &str) -> Self {
        ModuleExportName::Identifier(Identifier::new(name))
    }

    /// The name as written; `None` for a non-string literal.
    pub fn name(&self) -> Option<&str> {
        match self {
            ModuleExportName::Identifier(id) => Some(&id.name),
            ModuleExportName::Literal(lit) => lit.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNamedDeclaration {
    pub declaration: Option<Declaration>,
    #[serde(default)]
    pub specifiers: Vec<ExportClause>,
    #[serde(default, with = "tagged_option")]
    pub source: Option<Literal>,
}

impl ExportNamedDeclaration {
    pub fn declaration(declaration: Declaration) -> Self {
        ExportNamedDeclaration {
            declaration: Some(declaration),
            specifiers: Vec::new(),
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Declaration {
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(Box<Function>),
    ClassDeclaration(Box<Class>),
}

impl Declaration {
    pub fn kind(&self) -> &'static str {
        match self {
            Declaration::VariableDeclaration(_) => "VariableDeclaration",
            Declaration::FunctionDeclaration(_) => "FunctionDeclaration",
            Declaration::ClassDeclaration(_) => "ClassDeclaration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExportClause {
    ExportSpecifier(ExportSpecifier),
    ExportNamespaceSpecifier(ExportedName),
    ExportDefaultSpecifier(ExportedName),
}

impl ExportClause {
    pub fn kind(&self) -> &'static str {
        match self {
            ExportClause::ExportSpecifier(_) => "ExportSpecifier",
            ExportClause::ExportNamespaceSpecifier(_) => "ExportNamespaceSpecifier",
            ExportClause::ExportDefaultSpecifier(_) => "ExportDefaultSpecifier",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub local: ModuleExportName,
    pub exported: ModuleExportName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedName {
    pub exported: ModuleExportName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDefaultDeclaration {
    pub declaration: DefaultExport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DefaultExport {
    FunctionDeclaration(Box<Function>),
    ClassDeclaration(Box<Class>),
    #[serde(untagged)]
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportAllDeclaration {
    #[serde(with = "tagged")]
    pub source: Literal,
    pub exported: Option<ModuleExportName>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// MARKUP
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub children: Vec<ElementChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub value: Vec<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttributeValue {
    Literal(Literal),
    DataBinding(DataBinding),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementChild {
    Literal(Literal),
    DataBinding(DataBinding),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBinding {
    pub expression: Expression,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_estree_export() {
        let item: ProgramItem = serde_json::from_value(json!({
            "type": "ExportNamedDeclaration",
            "declaration": {
                "type": "VariableDeclaration",
                "declarations": [{
                    "type": "VariableDeclarator",
                    "id": { "type": "Identifier", "name": "title" },
                    "init": { "type": "Literal", "value": "Hello World!" }
                }],
                "kind": "let"
            },
            "specifiers": [],
            "source": null
        }))
        .unwrap();

        let ProgramItem::ExportNamedDeclaration(export) = item else {
            panic!("expected a named export");
        };
        let Some(Declaration::VariableDeclaration(decl)) = export.declaration else {
            panic!("expected a variable declaration");
        };
        assert_eq!(decl.kind, VariableKind::Let);
        assert_eq!(decl.declarations[0].id, Pattern::identifier("title"));
        assert_eq!(
            decl.declarations[0].init,
            Some(Expression::string("Hello World!"))
        );
    }

    #[test]
    fn test_statement_items_fall_through_to_statement() {
        let item: ProgramItem = serde_json::from_value(json!({
            "type": "ExpressionStatement",
            "expression": { "type": "ThisExpression" }
        }))
        .unwrap();
        assert_eq!(
            item,
            ProgramItem::Statement(Statement::expression(Expression::ThisExpression))
        );
    }

    #[test]
    fn test_markup_nodes() {
        let item: ProgramItem = serde_json::from_value(json!({
            "type": "Element",
            "tag": "div",
            "attributes": [{
                "type": "Attribute",
                "name": "aria-level",
                "value": [{ "type": "Literal", "value": 1 }]
            }],
            "children": [{
                "type": "DataBinding",
                "expression": { "type": "Identifier", "name": "title" }
            }]
        }))
        .unwrap();

        let ProgramItem::Element(element) = item else {
            panic!("expected an element");
        };
        assert_eq!(element.tag, "div");
        assert_eq!(
            element.attributes[0].value,
            vec![AttributeValue::Literal(Literal::new(LiteralValue::Number(1.0)))]
        );
        assert_eq!(
            element.children,
            vec![ElementChild::DataBinding(DataBinding {
                expression: Expression::identifier("title")
            })]
        );
    }

    #[test]
    fn test_standalone_nodes_carry_their_tag() {
        let function = Function::anonymous(vec![], vec![]);
        let value = serde_json::to_value(Expression::FunctionExpression(Box::new(function))).unwrap();
        assert_eq!(value["type"], "FunctionExpression");
        assert_eq!(value["body"]["type"], "BlockStatement");
        assert_eq!(value["id"], serde_json::Value::Null);

        let import = ImportDeclaration {
            specifiers: vec![],
            source: Literal::string("./dep.js"),
        };
        let value = serde_json::to_value(ProgramItem::ImportDeclaration(import)).unwrap();
        assert_eq!(value["source"]["type"], "Literal");
        assert_eq!(value["source"]["value"], "./dep.js");
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(BinaryOperator::from_symbol("==="), Some(BinaryOperator::StrictEqual));
        assert_eq!(AssignmentOperator::CoalesceAssign.as_str(), "??=");
        assert_eq!(UnaryOperator::from_symbol("typeof"), Some(UnaryOperator::Typeof));
        assert_eq!(LogicalOperator::from_symbol("=="), None);
    }
}
