//! Abstract Syntax Tree node definitions
//!
//! Every syntactic construct is a [`Node`]: a [`NodeKind`] payload plus its
//! source range and the side-effect flag computed by the fold pass. Children
//! are held in named fields so the visitor can walk them in a fixed order and
//! splice replacements back into the same slot.

use core_types::{SourceRange, Value};
use serde::{Deserialize, Serialize};

use crate::scope::{ScopeId, SymbolId};

fn default_side_effect() -> bool {
    true
}

/// A node of the syntax tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Syntactic kind and children
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Source text spanned by the node
    pub range: SourceRange,
    /// Conservatively true until the fold pass proves otherwise
    #[serde(default = "default_side_effect")]
    pub side_effect: bool,
}

/// Top-level grammar selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceType {
    /// Classic script
    #[default]
    Script,
    /// ES module: implicitly strict, allows import/export
    Module,
}

/// Variable declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    /// var
    Var,
    /// let
    Let,
    /// const
    Const,
}

impl VariableKind {
    /// Keyword spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

/// Object literal property kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// `key: value`, shorthand or method
    Init,
    /// `get key() {}`
    Get,
    /// `set key(v) {}`
    Set,
}

/// Class element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    /// constructor
    Constructor,
    /// Regular method
    Method,
    /// Getter
    Get,
    /// Setter
    Set,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
    /// Modulo
    Mod,
    /// Equality
    Eq,
    /// Inequality
    NotEq,
    /// Strict equality
    StrictEq,
    /// Strict inequality
    StrictNotEq,
    /// Less than
    Lt,
    /// Less than or equal
    LtEq,
    /// Greater than
    Gt,
    /// Greater than or equal
    GtEq,
    /// Bitwise AND
    BitwiseAnd,
    /// Bitwise OR
    BitwiseOr,
    /// Bitwise XOR
    BitwiseXor,
    /// Left shift
    LeftShift,
    /// Right shift
    RightShift,
    /// Unsigned right shift
    UnsignedRightShift,
    /// Instanceof
    Instanceof,
    /// In
    In,
}

impl BinaryOperator {
    /// Source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::StrictEq => "===",
            BinaryOperator::StrictNotEq => "!==",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::Instanceof => "instanceof",
            BinaryOperator::In => "in",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Negate
    Minus,
    /// Plus (type coercion)
    Plus,
    /// Logical NOT
    Not,
    /// Bitwise NOT
    BitwiseNot,
    /// Typeof
    Typeof,
    /// Void
    Void,
    /// Delete
    Delete,
}

impl UnaryOperator {
    /// Source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Not => "!",
            UnaryOperator::BitwiseNot => "~",
            UnaryOperator::Typeof => "typeof",
            UnaryOperator::Void => "void",
            UnaryOperator::Delete => "delete",
        }
    }
}

/// Update operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOperator {
    /// Increment
    Increment,
    /// Decrement
    Decrement,
}

impl UpdateOperator {
    /// Source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOperator::Increment => "++",
            UpdateOperator::Decrement => "--",
        }
    }
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    /// Logical AND
    And,
    /// Logical OR
    Or,
}

impl LogicalOperator {
    /// Source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentOperator {
    /// Simple assignment (=)
    Assign,
    /// Addition assignment (+=)
    AddAssign,
    /// Subtraction assignment (-=)
    SubAssign,
    /// Multiplication assignment (*=)
    MulAssign,
    /// Division assignment (/=)
    DivAssign,
    /// Modulo assignment (%=)
    ModAssign,
    /// Bitwise AND assignment (&=)
    BitAndAssign,
    /// Bitwise OR assignment (|=)
    BitOrAssign,
    /// Bitwise XOR assignment (^=)
    BitXorAssign,
    /// Left shift assignment (<<=)
    LeftShiftAssign,
    /// Right shift assignment (>>=)
    RightShiftAssign,
    /// Unsigned right shift assignment (>>>=)
    UnsignedRightShiftAssign,
}

impl AssignmentOperator {
    /// Source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubAssign => "-=",
            AssignmentOperator::MulAssign => "*=",
            AssignmentOperator::DivAssign => "/=",
            AssignmentOperator::ModAssign => "%=",
            AssignmentOperator::BitAndAssign => "&=",
            AssignmentOperator::BitOrAssign => "|=",
            AssignmentOperator::BitXorAssign => "^=",
            AssignmentOperator::LeftShiftAssign => "<<=",
            AssignmentOperator::RightShiftAssign => ">>=",
            AssignmentOperator::UnsignedRightShiftAssign => ">>>=",
        }
    }
}

/// Shared shape of function declarations, expressions, arrows and methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Binding name, if any
    pub id: Option<Box<Node>>,
    /// Formal parameters (identifiers or patterns)
    pub params: Vec<Node>,
    /// Body statements; a concise arrow body is a single `Return`
    pub body: Vec<Node>,
    /// `function*`
    pub generator: bool,
    /// Arrow with an expression body
    pub expression: bool,
    /// Body is strict mode code
    pub strict: bool,
    /// Scope created by scope analysis
    pub scope: Option<ScopeId>,
}

/// Shared shape of class declarations and expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    /// Binding name, if any
    pub id: Option<Box<Node>>,
    /// `extends` clause
    pub super_class: Option<Box<Node>>,
    /// `MethodDefinition` nodes
    pub body: Vec<Node>,
    /// Scope holding the name of a named class expression
    pub scope: Option<ScopeId>,
}

/// One literal segment of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateElement {
    /// Value with escapes interpreted
    pub cooked: String,
    /// Source spelling
    pub raw: String,
}

/// Node payloads, one variant per syntactic kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Script or module root
    Program {
        /// Top-level statements
        body: Vec<Node>,
        /// Script or module
        source_type: SourceType,
        /// Global scope
        scope: Option<ScopeId>,
    },

    /// `;`
    Empty,
    /// `debugger;`
    Debugger,
    /// A string literal statement inside a directive prologue
    Directive {
        /// Cooked string value
        value: String,
        /// Source spelling including quotes
        raw: String,
    },
    /// Expression statement
    Expression {
        /// The expression
        expression: Box<Node>,
    },
    /// `{ ... }`
    Block {
        /// Statements
        body: Vec<Node>,
    },
    /// If statement
    If {
        /// Condition
        test: Box<Node>,
        /// Then branch
        consequent: Box<Node>,
        /// Else branch
        alternate: Option<Box<Node>>,
    },
    /// `label: body`
    Labeled {
        /// Label name
        label: String,
        /// Labelled statement
        body: Box<Node>,
    },
    /// Break statement
    Break {
        /// Target label
        label: Option<String>,
    },
    /// Continue statement
    Continue {
        /// Target label
        label: Option<String>,
    },
    /// With statement
    With {
        /// Scope object
        object: Box<Node>,
        /// Body
        body: Box<Node>,
        /// Dynamic scope of the body
        scope: Option<ScopeId>,
    },
    /// Switch statement
    Switch {
        /// Switched value
        discriminant: Box<Node>,
        /// `SwitchCase` nodes
        cases: Vec<Node>,
    },
    /// `case test:` or `default:`
    SwitchCase {
        /// None for `default`
        test: Option<Box<Node>>,
        /// Statements
        consequent: Vec<Node>,
    },
    /// Return statement
    Return {
        /// Returned value
        argument: Option<Box<Node>>,
    },
    /// Throw statement
    Throw {
        /// Thrown value
        argument: Box<Node>,
    },
    /// Try statement
    Try {
        /// Protected block
        block: Box<Node>,
        /// `CatchClause`
        handler: Option<Box<Node>>,
        /// Finally block
        finalizer: Option<Box<Node>>,
    },
    /// `catch (param) body`
    CatchClause {
        /// Bound name or pattern
        param: Box<Node>,
        /// Handler block
        body: Box<Node>,
        /// Scope holding the parameter
        scope: Option<ScopeId>,
    },
    /// While loop
    While {
        /// Condition
        test: Box<Node>,
        /// Body
        body: Box<Node>,
    },
    /// Do-while loop
    DoWhile {
        /// Body
        body: Box<Node>,
        /// Condition
        test: Box<Node>,
    },
    /// For loop
    For {
        /// Declaration or expression
        init: Option<Box<Node>>,
        /// Condition
        test: Option<Box<Node>>,
        /// Update expression
        update: Option<Box<Node>>,
        /// Body
        body: Box<Node>,
    },
    /// For-in loop
    ForIn {
        /// Declaration or assignment target
        left: Box<Node>,
        /// Iterated object
        right: Box<Node>,
        /// Body
        body: Box<Node>,
    },
    /// For-of loop
    ForOf {
        /// Declaration or assignment target
        left: Box<Node>,
        /// Iterated value
        right: Box<Node>,
        /// Body
        body: Box<Node>,
    },
    /// `var`/`let`/`const` declaration
    VariableDeclaration {
        /// Declaration kind
        kind: VariableKind,
        /// `VariableDeclarator` nodes
        declarations: Vec<Node>,
    },
    /// `id = init`
    VariableDeclarator {
        /// Bound name or pattern
        id: Box<Node>,
        /// Initializer
        init: Option<Box<Node>>,
    },
    /// Function declaration
    FunctionDeclaration {
        /// Function
        function: Function,
    },
    /// Function expression (also the value of methods and accessors)
    FunctionExpression {
        /// Function
        function: Function,
    },
    /// Arrow function
    ArrowFunction {
        /// Function
        function: Function,
    },
    /// Class declaration
    ClassDeclaration {
        /// Class
        class: Class,
    },
    /// Class expression
    ClassExpression {
        /// Class
        class: Class,
    },
    /// Class element
    MethodDefinition {
        /// Name or computed key
        key: Box<Node>,
        /// `FunctionExpression`
        value: Box<Node>,
        /// Method kind
        kind: MethodKind,
        /// `static`
        is_static: bool,
        /// `[key]`
        computed: bool,
    },

    /// Import declaration
    Import {
        /// Import specifiers
        specifiers: Vec<Node>,
        /// Module specifier
        source: String,
    },
    /// `{ imported as local }`
    ImportSpecifier {
        /// Exported name of the source module
        imported: String,
        /// Local binding
        local: Box<Node>,
    },
    /// `import local from ...`
    ImportDefaultSpecifier {
        /// Local binding
        local: Box<Node>,
    },
    /// `import * as local from ...`
    ImportNamespaceSpecifier {
        /// Local binding
        local: Box<Node>,
    },
    /// `export { ... }`, `export { ... } from`, `export <declaration>`
    ExportNamed {
        /// Exported declaration
        declaration: Option<Box<Node>>,
        /// `ExportSpecifier` nodes
        specifiers: Vec<Node>,
        /// Re-export source
        source: Option<String>,
    },
    /// `local as exported`
    ExportSpecifier {
        /// Local (or re-exported) name
        local: String,
        /// Exported name
        exported: String,
    },
    /// `export default ...`
    ExportDefault {
        /// Expression or declaration
        declaration: Box<Node>,
    },
    /// `export * from ...`
    ExportAll {
        /// Module specifier
        source: String,
    },

    /// Identifier reference or binding
    Identifier {
        /// Name as written (or as renamed)
        name: String,
        /// Resolved symbol, filled in by scope analysis
        symbol: Option<SymbolId>,
    },
    /// Property name that is not a variable reference
    Name {
        /// Name as written
        name: String,
    },
    /// Primitive literal
    Literal {
        /// Value
        value: Value,
    },
    /// Regular expression literal
    RegExp {
        /// Body
        pattern: String,
        /// Flags
        flags: String,
    },
    /// Template literal
    Template {
        /// Literal segments, one more than expressions
        quasis: Vec<TemplateElement>,
        /// Substitutions
        expressions: Vec<Node>,
    },
    /// `` tag`...` ``
    TaggedTemplate {
        /// Tag function
        tag: Box<Node>,
        /// `Template`
        quasi: Box<Node>,
    },
    /// this
    This,
    /// super
    Super,
    /// Array literal; `None` marks a hole
    Array {
        /// Elements
        elements: Vec<Option<Node>>,
    },
    /// Object literal
    Object {
        /// `Property` nodes
        properties: Vec<Node>,
    },
    /// Object literal or object pattern property
    Property {
        /// `Name`, literal, or computed key
        key: Box<Node>,
        /// Value, accessor function or pattern
        value: Box<Node>,
        /// Init, getter or setter
        kind: PropertyKind,
        /// `[key]`
        computed: bool,
        /// `{ a }`
        shorthand: bool,
        /// `{ a() {} }`
        method: bool,
    },
    /// Unary expression
    Unary {
        /// Operator
        operator: UnaryOperator,
        /// Operand
        argument: Box<Node>,
    },
    /// `++x`, `x--`
    Update {
        /// Operator
        operator: UpdateOperator,
        /// Prefix form
        prefix: bool,
        /// Operand
        argument: Box<Node>,
    },
    /// Binary expression
    Binary {
        /// Operator
        operator: BinaryOperator,
        /// Left operand
        left: Box<Node>,
        /// Right operand
        right: Box<Node>,
    },
    /// `&&`, `||`
    Logical {
        /// Operator
        operator: LogicalOperator,
        /// Left operand
        left: Box<Node>,
        /// Right operand
        right: Box<Node>,
    },
    /// Assignment expression
    Assignment {
        /// Operator
        operator: AssignmentOperator,
        /// Identifier, member or pattern
        target: Box<Node>,
        /// Assigned value
        value: Box<Node>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        /// Condition
        test: Box<Node>,
        /// Value when true
        consequent: Box<Node>,
        /// Value when false
        alternate: Box<Node>,
    },
    /// Function call
    Call {
        /// Callee
        callee: Box<Node>,
        /// Arguments
        arguments: Vec<Node>,
    },
    /// `new` expression
    New {
        /// Constructor
        callee: Box<Node>,
        /// Arguments
        arguments: Vec<Node>,
    },
    /// `a.b` or `a[b]`
    Member {
        /// Object
        object: Box<Node>,
        /// `Name` or computed expression
        property: Box<Node>,
        /// `[property]`
        computed: bool,
    },
    /// Comma expression
    Sequence {
        /// Expressions
        expressions: Vec<Node>,
    },
    /// `...argument`
    Spread {
        /// Spread operand
        argument: Box<Node>,
    },
    /// `yield`, `yield*`
    Yield {
        /// Yielded value
        argument: Option<Box<Node>>,
        /// `yield*`
        delegate: bool,
    },
    /// `new.target`
    MetaProperty {
        /// `new`
        meta: String,
        /// `target`
        property: String,
    },
    /// Parenthesized group whose reading (expression or arrow parameters)
    /// is not yet known; never survives parsing
    CoveredFormals {
        /// Group members
        expressions: Vec<Node>,
    },

    /// `[a, , b]` as a binding or assignment target
    ArrayPattern {
        /// Elements; `None` marks a hole
        elements: Vec<Option<Node>>,
    },
    /// `{ a, b: c }` as a binding or assignment target
    ObjectPattern {
        /// `Property` and `RestElement` nodes
        properties: Vec<Node>,
    },
    /// `target = default`
    AssignmentPattern {
        /// Bound target
        target: Box<Node>,
        /// Default value
        default: Box<Node>,
    },
    /// `...argument` in a pattern or parameter list
    RestElement {
        /// Bound target
        argument: Box<Node>,
    },
}

/// Fieldless mirror of [`NodeKind`], used to tell a visitor its parent kind
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Program,
    Empty,
    Debugger,
    Directive,
    Expression,
    Block,
    If,
    Labeled,
    Break,
    Continue,
    With,
    Switch,
    SwitchCase,
    Return,
    Throw,
    Try,
    CatchClause,
    While,
    DoWhile,
    For,
    ForIn,
    ForOf,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    ClassDeclaration,
    ClassExpression,
    MethodDefinition,
    Import,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ExportNamed,
    ExportSpecifier,
    ExportDefault,
    ExportAll,
    Identifier,
    Name,
    Literal,
    RegExp,
    Template,
    TaggedTemplate,
    This,
    Super,
    Array,
    Object,
    Property,
    Unary,
    Update,
    Binary,
    Logical,
    Assignment,
    Conditional,
    Call,
    New,
    Member,
    Sequence,
    Spread,
    Yield,
    MetaProperty,
    CoveredFormals,
    ArrayPattern,
    ObjectPattern,
    AssignmentPattern,
    RestElement,
}

impl NodeKind {
    /// Fieldless kind tag
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Program { .. } => NodeType::Program,
            NodeKind::Empty => NodeType::Empty,
            NodeKind::Debugger => NodeType::Debugger,
            NodeKind::Directive { .. } => NodeType::Directive,
            NodeKind::Expression { .. } => NodeType::Expression,
            NodeKind::Block { .. } => NodeType::Block,
            NodeKind::If { .. } => NodeType::If,
            NodeKind::Labeled { .. } => NodeType::Labeled,
            NodeKind::Break { .. } => NodeType::Break,
            NodeKind::Continue { .. } => NodeType::Continue,
            NodeKind::With { .. } => NodeType::With,
            NodeKind::Switch { .. } => NodeType::Switch,
            NodeKind::SwitchCase { .. } => NodeType::SwitchCase,
            NodeKind::Return { .. } => NodeType::Return,
            NodeKind::Throw { .. } => NodeType::Throw,
            NodeKind::Try { .. } => NodeType::Try,
            NodeKind::CatchClause { .. } => NodeType::CatchClause,
            NodeKind::While { .. } => NodeType::While,
            NodeKind::DoWhile { .. } => NodeType::DoWhile,
            NodeKind::For { .. } => NodeType::For,
            NodeKind::ForIn { .. } => NodeType::ForIn,
            NodeKind::ForOf { .. } => NodeType::ForOf,
            NodeKind::VariableDeclaration { .. } => NodeType::VariableDeclaration,
            NodeKind::VariableDeclarator { .. } => NodeType::VariableDeclarator,
            NodeKind::FunctionDeclaration { .. } => NodeType::FunctionDeclaration,
            NodeKind::FunctionExpression { .. } => NodeType::FunctionExpression,
            NodeKind::ArrowFunction { .. } => NodeType::ArrowFunction,
            NodeKind::ClassDeclaration { .. } => NodeType::ClassDeclaration,
            NodeKind::ClassExpression { .. } => NodeType::ClassExpression,
            NodeKind::MethodDefinition { .. } => NodeType::MethodDefinition,
            NodeKind::Import { .. } => NodeType::Import,
            NodeKind::ImportSpecifier { .. } => NodeType::ImportSpecifier,
            NodeKind::ImportDefaultSpecifier { .. } => NodeType::ImportDefaultSpecifier,
            NodeKind::ImportNamespaceSpecifier { .. } => NodeType::ImportNamespaceSpecifier,
            NodeKind::ExportNamed { .. } => NodeType::ExportNamed,
            NodeKind::ExportSpecifier { .. } => NodeType::ExportSpecifier,
            NodeKind::ExportDefault { .. } => NodeType::ExportDefault,
            NodeKind::ExportAll { .. } => NodeType::ExportAll,
            NodeKind::Identifier { .. } => NodeType::Identifier,
            NodeKind::Name { .. } => NodeType::Name,
            NodeKind::Literal { .. } => NodeType::Literal,
            NodeKind::RegExp { .. } => NodeType::RegExp,
            NodeKind::Template { .. } => NodeType::Template,
            NodeKind::TaggedTemplate { .. } => NodeType::TaggedTemplate,
            NodeKind::This => NodeType::This,
            NodeKind::Super => NodeType::Super,
            NodeKind::Array { .. } => NodeType::Array,
            NodeKind::Object { .. } => NodeType::Object,
            NodeKind::Property { .. } => NodeType::Property,
            NodeKind::Unary { .. } => NodeType::Unary,
            NodeKind::Update { .. } => NodeType::Update,
            NodeKind::Binary { .. } => NodeType::Binary,
            NodeKind::Logical { .. } => NodeType::Logical,
            NodeKind::Assignment { .. } => NodeType::Assignment,
            NodeKind::Conditional { .. } => NodeType::Conditional,
            NodeKind::Call { .. } => NodeType::Call,
            NodeKind::New { .. } => NodeType::New,
            NodeKind::Member { .. } => NodeType::Member,
            NodeKind::Sequence { .. } => NodeType::Sequence,
            NodeKind::Spread { .. } => NodeType::Spread,
            NodeKind::Yield { .. } => NodeType::Yield,
            NodeKind::MetaProperty { .. } => NodeType::MetaProperty,
            NodeKind::CoveredFormals { .. } => NodeType::CoveredFormals,
            NodeKind::ArrayPattern { .. } => NodeType::ArrayPattern,
            NodeKind::ObjectPattern { .. } => NodeType::ObjectPattern,
            NodeKind::AssignmentPattern { .. } => NodeType::AssignmentPattern,
            NodeKind::RestElement { .. } => NodeType::RestElement,
        }
    }
}

impl Node {
    /// Create a node; the side-effect flag starts conservative
    pub fn new(kind: NodeKind, range: SourceRange) -> Self {
        Self {
            kind,
            range,
            side_effect: true,
        }
    }

    /// Empty statement
    pub fn empty(range: SourceRange) -> Self {
        Self::new(NodeKind::Empty, range)
    }

    /// Unresolved identifier
    pub fn identifier(name: impl Into<String>, range: SourceRange) -> Self {
        Self::new(
            NodeKind::Identifier {
                name: name.into(),
                symbol: None,
            },
            range,
        )
    }

    /// Literal; literals never have side effects
    pub fn literal(value: Value, range: SourceRange) -> Self {
        Self {
            kind: NodeKind::Literal { value },
            range,
            side_effect: false,
        }
    }

    /// Expression statement wrapping `expression`
    pub fn expression_statement(expression: Node) -> Self {
        let range = expression.range;
        Self::new(
            NodeKind::Expression {
                expression: Box::new(expression),
            },
            range,
        )
    }

    /// Block statement
    pub fn block(body: Vec<Node>, range: SourceRange) -> Self {
        Self::new(NodeKind::Block { body }, range)
    }

    /// Fieldless kind tag
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Constant value of a literal node
    pub fn as_constant(&self) -> Option<&Value> {
        match &self.kind {
            NodeKind::Literal { value } => Some(value),
            _ => None,
        }
    }

    /// Name of an identifier node
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True for `;`
    pub fn is_empty_statement(&self) -> bool {
        matches!(self.kind, NodeKind::Empty)
    }

    /// True for function declarations, expressions and arrows
    pub fn is_function(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::FunctionDeclaration { .. }
                | NodeKind::FunctionExpression { .. }
                | NodeKind::ArrowFunction { .. }
        )
    }

    /// Function payload of a function node
    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            NodeKind::FunctionDeclaration { function }
            | NodeKind::FunctionExpression { function }
            | NodeKind::ArrowFunction { function } => Some(function),
            _ => None,
        }
    }

    /// Mutable function payload of a function node
    pub fn as_function_mut(&mut self) -> Option<&mut Function> {
        match &mut self.kind {
            NodeKind::FunctionDeclaration { function }
            | NodeKind::FunctionExpression { function }
            | NodeKind::ArrowFunction { function } => Some(function),
            _ => None,
        }
    }

    /// `let`, `const`, class and function declarations: statements that may
    /// not appear as the lone body of `if`/loops and so cannot be unwrapped
    /// from a block
    pub fn is_lexical_declaration(&self) -> bool {
        match &self.kind {
            NodeKind::VariableDeclaration { kind, .. } => *kind != VariableKind::Var,
            NodeKind::ClassDeclaration { .. } | NodeKind::FunctionDeclaration { .. } => true,
            _ => false,
        }
    }

    /// Unconditional control transfer
    pub fn is_abrupt(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Return { .. }
                | NodeKind::Throw { .. }
                | NodeKind::Break { .. }
                | NodeKind::Continue { .. }
        )
    }
}

/// Collect the identifiers bound by a binding target (identifier or pattern)
pub fn bound_names(target: &Node, out: &mut Vec<String>) {
    match &target.kind {
        NodeKind::Identifier { name, .. } => out.push(name.clone()),
        NodeKind::ArrayPattern { elements } => {
            for element in elements.iter().flatten() {
                bound_names(element, out);
            }
        }
        NodeKind::ObjectPattern { properties } => {
            for property in properties {
                bound_names(property, out);
            }
        }
        NodeKind::Property { value, .. } => bound_names(value, out),
        NodeKind::AssignmentPattern { target, .. } => bound_names(target, out),
        NodeKind::RestElement { argument } => bound_names(argument, out),
        _ => {}
    }
}
