//! Minimal-length source printer
//!
//! Every expression is rendered to a [`Fragment`]: its text plus the
//! precedence class of its outermost operator. A parent wraps a child in
//! parentheses only when the child binds looser than the slot requires.
//! Adjacent tokens are joined without whitespace unless they would merge
//! into a different token.

use core_types::{number_to_string, JsError, Value};
use parser::ast::{BinaryOperator, Class, Function, LogicalOperator, MethodKind, Node, NodeKind, PropertyKind};
use parser::unicode::{is_id_continue, is_identifier_name};

/// Precedence classes from tightest to loosest binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Literals, identifiers, parenthesized expressions
    Primary,
    /// `a.b`, `a[b]`, `new a()`
    Member,
    /// Calls and `new` without a member access after it
    LeftHandSide,
    /// `a++`
    Postfix,
    /// Prefix operators
    Unary,
    /// `* / %`
    Multiplicative,
    /// `+ -`
    Additive,
    /// `<< >> >>>`
    Shift,
    /// `< > <= >= in instanceof`
    Relational,
    /// `== != === !==`
    Equality,
    /// `&`
    BitwiseAnd,
    /// `^`
    BitwiseXor,
    /// `|`
    BitwiseOr,
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
    /// `?:`
    Conditional,
    /// Assignment, arrow functions, `yield`
    Assignment,
    /// Comma expression
    Expression,
}

/// Printed expression text with the precedence of its outermost operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Source text
    pub text: String,
    /// Binding strength
    pub precedence: Precedence,
}

impl Fragment {
    fn new(text: impl Into<String>, precedence: Precedence) -> Self {
        Self {
            text: text.into(),
            precedence,
        }
    }

    /// Text, parenthesized if it binds looser than `required` (or as loose,
    /// when `no_same` is set)
    pub fn wrap(self, required: Precedence, no_same: bool) -> String {
        if needs_parens(self.precedence, required, no_same) {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

fn needs_parens(precedence: Precedence, required: Precedence, no_same: bool) -> bool {
    required < precedence || (no_same && required == precedence)
}

/// A printed statement
struct Statement {
    text: String,
    /// The text ends in a `;` that may be dropped before a `}`
    terminated: bool,
}

impl Statement {
    fn open(text: String) -> Self {
        Self {
            text,
            terminated: false,
        }
    }

    fn closed(mut text: String) -> Self {
        text.push(';');
        Self { text, terminated: true }
    }
}

fn is_word_char(c: char) -> bool {
    c == '_' || c == '$' || c == '\\' || c.is_ascii_alphanumeric() || (!c.is_ascii() && is_id_continue(c))
}

/// Append `next` to `out`, separated by a space only where the two would
/// otherwise lex differently
pub fn glue(out: &mut String, next: &str) {
    if let (Some(last), Some(first)) = (out.chars().last(), next.chars().next()) {
        let space = (is_word_char(last) && is_word_char(first))
            || (last == '+' && first == '+')
            || (last == '-' && first == '-')
            || (last == '/' && (first == '/' || first == '*'))
            || (last == '<' && next.starts_with("!--"))
            || (out.ends_with("--") && first == '>');
        if space {
            out.push(' ');
        }
    }
    out.push_str(next);
}

fn braced(text: String) -> String {
    format!("{{{}}}", text)
}

fn concat(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts {
        glue(&mut out, part);
    }
    out
}

/// Drop the droppable `;` of the last statement in a list
fn statement_list(statements: Vec<Statement>) -> String {
    let trailing = statements.last().map(|s| s.terminated).unwrap_or(false);
    let mut out = String::new();
    for statement in statements {
        glue(&mut out, &statement.text);
    }
    if trailing {
        out.pop();
    }
    out
}

/// Candidate spellings of a number
fn number_alternatives(value: f64) -> Vec<Fragment> {
    if value.is_nan() {
        return vec![Fragment::new("0/0", Precedence::Multiplicative)];
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "1/0" } else { "-1/0" };
        return vec![Fragment::new(text, Precedence::Multiplicative)];
    }
    if value == 0.0 {
        return if value.is_sign_negative() {
            vec![Fragment::new("-0", Precedence::Unary)]
        } else {
            vec![Fragment::new("0", Precedence::Primary)]
        };
    }

    let precedence = if value < 0.0 {
        Precedence::Unary
    } else {
        Precedence::Primary
    };
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    let mut alternatives = Vec::new();

    let mut decimal = number_to_string(magnitude).replace("e+", "e");
    if decimal.starts_with("0.") {
        decimal.remove(0);
    }
    alternatives.push(Fragment::new(format!("{}{}", sign, decimal), precedence));

    if magnitude.fract() == 0.0 && magnitude < 9_007_199_254_740_992.0 {
        alternatives.push(Fragment::new(
            format!("{}0x{:X}", sign, magnitude as u64),
            precedence,
        ));
    }

    alternatives.push(Fragment::new(format!("{}{:e}", sign, magnitude), precedence));

    if let Some((numerator, denominator)) = fraction(magnitude) {
        if denominator > 1.0 {
            alternatives.push(Fragment::new(
                format!(
                    "{}{}/{}",
                    sign,
                    number_to_string(numerator),
                    number_to_string(denominator)
                ),
                Precedence::Multiplicative,
            ));
        }
    }
    alternatives
}

/// Continued-fraction approximation, kept only when it is exact
fn fraction(value: f64) -> Option<(f64, f64)> {
    fn expand(number: f64, depth: usize) -> (f64, f64) {
        let integer = number.floor();
        let remainder = number - integer;
        if remainder < 0.0001 || depth > 20 {
            return (integer, 1.0);
        }
        let (numerator, denominator) = expand(1.0 / remainder, depth + 1);
        (integer * numerator + denominator, numerator)
    }
    let (numerator, denominator) = expand(value, 0);
    (numerator / denominator == value).then_some((numerator, denominator))
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Shortest spelling of `value` for a slot requiring `required`
fn pick_number(value: f64, required: Precedence, no_same: bool, member: bool) -> String {
    let mut best: Option<(usize, Fragment)> = None;
    for alternative in number_alternatives(value) {
        let mut cost = alternative.text.len();
        if needs_parens(alternative.precedence, required, no_same) {
            cost += 2;
        } else if member && is_digits(&alternative.text) {
            cost += 1;
        }
        let better = match &best {
            None => true,
            Some((best_cost, best_fragment)) => {
                cost < *best_cost || (cost == *best_cost && alternative.precedence < best_fragment.precedence)
            }
        };
        if better {
            best = Some((cost, alternative));
        }
    }
    match best {
        Some((_, fragment)) => {
            let parens = needs_parens(fragment.precedence, required, no_same);
            let digits = is_digits(&fragment.text);
            let mut text = fragment.wrap(required, no_same);
            if member && !parens && digits {
                text.push('.');
            }
            text
        }
        None => "0".to_string(),
    }
}

fn is_format_char(c: char) -> bool {
    matches!(
        c as u32,
        0xAD | 0x600..=0x605 | 0x61C | 0x6DD | 0x70F | 0x180E | 0x200B..=0x200F | 0x2028..=0x202E
            | 0x2060..=0x2064 | 0x2066..=0x206F | 0xFEFF | 0xFFF9..=0xFFFB
    )
}

/// Quote a string with whichever of `'` or `"` gives the shorter literal
pub fn quote(value: &str) -> String {
    let mut single = String::from("'");
    let mut double = String::from("\"");
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        let escaped: String = match c {
            '\0' => {
                if chars.peek().is_some_and(|next| next.is_ascii_digit()) {
                    "\\x00".to_string()
                } else {
                    "\\0".to_string()
                }
            }
            '"' => {
                single.push('"');
                double.push_str("\\\"");
                continue;
            }
            '\'' => {
                single.push_str("\\'");
                double.push('\'');
                continue;
            }
            '\\' => "\\\\".to_string(),
            '\u{8}' => "\\b".to_string(),
            '\u{c}' => "\\f".to_string(),
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            '\u{b}' => "\\v".to_string(),
            c if c.is_control() || is_format_char(c) => {
                if (c as u32) < 0x100 {
                    format!("\\x{:02X}", c as u32)
                } else {
                    let mut units = [0u16; 2];
                    c.encode_utf16(&mut units)
                        .iter()
                        .map(|unit| format!("\\u{:04X}", unit))
                        .collect()
                }
            }
            c => c.to_string(),
        };
        single.push_str(&escaped);
        double.push_str(&escaped);
    }
    single.push('\'');
    double.push('"');
    if double.len() < single.len() {
        double
    } else {
        single
    }
}

/// Text that must not begin an expression statement
fn starts_ambiguously(text: &str) -> bool {
    let keyword = |word: &str| {
        text.strip_prefix(word)
            .map(|rest| !rest.starts_with(is_word_char))
            .unwrap_or(false)
    };
    text.starts_with('{') || text.starts_with("let[") || keyword("function") || keyword("class")
}

/// True if `node`, printed as an `if` consequent, would capture an `else`
fn ends_with_open_if(node: &Node) -> bool {
    match &node.kind {
        NodeKind::If { alternate: None, .. } => true,
        NodeKind::If {
            alternate: Some(alternate),
            ..
        } => ends_with_open_if(alternate),
        NodeKind::Labeled { body, .. }
        | NodeKind::For { body, .. }
        | NodeKind::ForIn { body, .. }
        | NodeKind::ForOf { body, .. }
        | NodeKind::While { body, .. }
        | NodeKind::With { body, .. } => ends_with_open_if(body),
        _ => false,
    }
}

fn binary_precedence(operator: BinaryOperator) -> Precedence {
    match operator {
        BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => Precedence::Multiplicative,
        BinaryOperator::Add | BinaryOperator::Sub => Precedence::Additive,
        BinaryOperator::LeftShift | BinaryOperator::RightShift | BinaryOperator::UnsignedRightShift => {
            Precedence::Shift
        }
        BinaryOperator::Lt
        | BinaryOperator::Gt
        | BinaryOperator::LtEq
        | BinaryOperator::GtEq
        | BinaryOperator::Instanceof
        | BinaryOperator::In => Precedence::Relational,
        BinaryOperator::Eq | BinaryOperator::NotEq | BinaryOperator::StrictEq | BinaryOperator::StrictNotEq => {
            Precedence::Equality
        }
        BinaryOperator::BitwiseAnd => Precedence::BitwiseAnd,
        BinaryOperator::BitwiseXor => Precedence::BitwiseXor,
        BinaryOperator::BitwiseOr => Precedence::BitwiseOr,
    }
}

/// Key text of a property or class member
fn property_key_text(value: &str) -> String {
    let canonical_number = value
        .parse::<f64>()
        .map(|n| number_to_string(n) == value)
        .unwrap_or(false);
    if is_identifier_name(value) || (canonical_number && !value.starts_with('-')) {
        value.to_string()
    } else {
        quote(value)
    }
}

/// Renders syntax trees as compact source text
#[derive(Debug, Default)]
pub struct Printer {
    /// Inside a `for` head, where a bare `in` would end the initializer
    no_in: bool,
}

impl Printer {
    /// Create a printer
    pub fn new() -> Self {
        Self::default()
    }

    /// Print a program, statement or expression
    pub fn print(&mut self, node: &Node) -> Result<String, JsError> {
        match &node.kind {
            NodeKind::Program { body, .. } => self.statements(body),
            kind if is_statement(kind) => Ok(self.statement(node)?.text),
            _ => self.expression_at(node, Precedence::Expression, false),
        }
    }

    fn statements(&mut self, body: &[Node]) -> Result<String, JsError> {
        let printed = body
            .iter()
            .map(|statement| self.statement(statement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statement_list(printed))
    }

    fn block(&mut self, body: &[Node]) -> Result<String, JsError> {
        Ok(format!("{{{}}}", self.statements(body)?))
    }

    /// A clause that must be a block, such as the parts of a `try`
    fn block_clause(&mut self, node: &Node) -> Result<String, JsError> {
        match &node.kind {
            NodeKind::Block { body } => self.block(body),
            NodeKind::Empty => Ok("{}".to_string()),
            _ => {
                let statement = self.statement(node)?;
                Ok(braced(statement_list(vec![statement])))
            }
        }
    }

    fn statement(&mut self, node: &Node) -> Result<Statement, JsError> {
        let statement = match &node.kind {
            NodeKind::Empty => Statement::open(";".to_string()),
            NodeKind::Debugger => Statement::closed("debugger".to_string()),
            NodeKind::Directive { raw, .. } => Statement::closed(raw.clone()),
            NodeKind::Expression { expression } => {
                let text = self.expression_at(expression, Precedence::Expression, false)?;
                let string_literal = matches!(expression.as_constant(), Some(Value::String(_)));
                if string_literal || starts_ambiguously(&text) {
                    Statement::closed(format!("({})", text))
                } else {
                    Statement::closed(text)
                }
            }
            NodeKind::Block { body } => Statement::open(self.block(body)?),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                let test = self.expression_at(test, Precedence::Expression, false)?;
                let mut text = format!("if({})", test);
                match alternate {
                    None => {
                        let body = self.statement(consequent)?;
                        text.push_str(&body.text);
                        Statement {
                            text,
                            terminated: body.terminated,
                        }
                    }
                    Some(alternate) => {
                        if ends_with_open_if(consequent) {
                            let body = self.statement(consequent)?;
                            text.push_str(&braced(statement_list(vec![body])));
                        } else {
                            text.push_str(&self.statement(consequent)?.text);
                        }
                        glue(&mut text, "else");
                        let otherwise = self.statement(alternate)?;
                        glue(&mut text, &otherwise.text);
                        Statement {
                            text,
                            terminated: otherwise.terminated,
                        }
                    }
                }
            }
            NodeKind::Labeled { label, body } => {
                let body = self.statement(body)?;
                Statement {
                    text: format!("{}:{}", label, body.text),
                    terminated: body.terminated,
                }
            }
            NodeKind::Break { label } => match label {
                Some(label) => Statement::closed(format!("break {}", label)),
                None => Statement::closed("break".to_string()),
            },
            NodeKind::Continue { label } => match label {
                Some(label) => Statement::closed(format!("continue {}", label)),
                None => Statement::closed("continue".to_string()),
            },
            NodeKind::With { object, body, .. } => {
                let object = self.expression_at(object, Precedence::Expression, false)?;
                let body = self.statement(body)?;
                Statement {
                    text: format!("with({}){}", object, body.text),
                    terminated: body.terminated,
                }
            }
            NodeKind::Switch { discriminant, cases } => {
                let discriminant = self.expression_at(discriminant, Precedence::Expression, false)?;
                let mut printed = Vec::new();
                for case in cases {
                    printed.push(self.switch_case(case)?);
                }
                Statement::open(format!("switch({}){{{}}}", discriminant, statement_list(printed)))
            }
            NodeKind::SwitchCase { .. } => self.switch_case(node)?,
            NodeKind::Return { argument } => match argument {
                Some(argument) => {
                    let argument = self.expression_at(argument, Precedence::Expression, false)?;
                    Statement::closed(concat(&["return", argument.as_str()]))
                }
                None => Statement::closed("return".to_string()),
            },
            NodeKind::Throw { argument } => {
                let argument = self.expression_at(argument, Precedence::Expression, false)?;
                Statement::closed(concat(&["throw", argument.as_str()]))
            }
            NodeKind::Try {
                block,
                handler,
                finalizer,
            } => {
                let mut text = format!("try{}", self.block_clause(block)?);
                if let Some(handler) = handler {
                    if let NodeKind::CatchClause { param, body, .. } = &handler.kind {
                        let param = self.expression_at(param, Precedence::Assignment, false)?;
                        text.push_str(&format!("catch({}){}", param, self.block_clause(body)?));
                    }
                }
                if let Some(finalizer) = finalizer {
                    text.push_str(&format!("finally{}", self.block_clause(finalizer)?));
                }
                Statement::open(text)
            }
            NodeKind::While { test, body } => {
                let test = self.expression_at(test, Precedence::Expression, false)?;
                let body = self.statement(body)?;
                Statement {
                    text: format!("while({}){}", test, body.text),
                    terminated: body.terminated,
                }
            }
            NodeKind::DoWhile { body, test } => {
                let body = self.statement(body)?;
                let test = self.expression_at(test, Precedence::Expression, false)?;
                let text = concat(&["do", body.text.as_str(), format!("while({})", test).as_str()]);
                Statement::closed(text)
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    Some(init) => self.for_head(init)?,
                    None => String::new(),
                };
                let test = match test {
                    Some(test) => self.expression_at(test, Precedence::Expression, false)?,
                    None => String::new(),
                };
                let update = match update {
                    Some(update) => self.expression_at(update, Precedence::Expression, false)?,
                    None => String::new(),
                };
                let body = self.statement(body)?;
                Statement {
                    text: format!("for({};{};{}){}", init, test, update, body.text),
                    terminated: body.terminated,
                }
            }
            NodeKind::ForIn { left, right, body } | NodeKind::ForOf { left, right, body } => {
                let of = matches!(node.kind, NodeKind::ForOf { .. });
                let left = self.for_head(left)?;
                let right = if of {
                    self.expression_at(right, Precedence::Assignment, false)?
                } else {
                    self.expression_at(right, Precedence::Expression, false)?
                };
                let body = self.statement(body)?;
                let head = concat(&[left.as_str(), if of { "of" } else { "in" }, right.as_str()]);
                Statement {
                    text: format!("for({}){}", head, body.text),
                    terminated: body.terminated,
                }
            }
            NodeKind::VariableDeclaration { .. } => Statement::closed(self.declaration(node)?),
            NodeKind::FunctionDeclaration { function } => Statement::open(self.function(function, false)?),
            NodeKind::ClassDeclaration { class } => Statement::open(self.class(class)?),
            NodeKind::Import { specifiers, source } => Statement::closed(self.import(specifiers, source)?),
            NodeKind::ExportNamed {
                declaration,
                specifiers,
                source,
            } => match declaration {
                Some(declaration) => {
                    let declaration = self.statement(declaration)?;
                    Statement {
                        text: concat(&["export", declaration.text.as_str()]),
                        terminated: declaration.terminated,
                    }
                }
                None => {
                    let list = specifiers
                        .iter()
                        .filter_map(|specifier| match &specifier.kind {
                            NodeKind::ExportSpecifier { local, exported } if local == exported => Some(local.clone()),
                            NodeKind::ExportSpecifier { local, exported } => Some(format!("{} as {}", local, exported)),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join(",");
                    let mut text = format!("export{{{}}}", list);
                    if let Some(source) = source {
                        text.push_str(&format!("from{}", quote(source)));
                    }
                    Statement::closed(text)
                }
            },
            NodeKind::ExportDefault { declaration } => match &declaration.kind {
                NodeKind::FunctionDeclaration { function } => {
                    let function = self.function(function, false)?;
                    Statement::open(concat(&["export default", function.as_str()]))
                }
                NodeKind::ClassDeclaration { class } => {
                    let class = self.class(class)?;
                    Statement::open(concat(&["export default", class.as_str()]))
                }
                _ => {
                    let mut value = self.expression_at(declaration, Precedence::Assignment, false)?;
                    if starts_ambiguously(&value) {
                        value = format!("({})", value);
                    }
                    Statement::closed(concat(&["export default", value.as_str()]))
                }
            },
            NodeKind::ExportAll { source } => Statement::closed(format!("export*from{}", quote(source))),
            _ => {
                return Err(JsError::internal(format!(
                    "Cannot print {:?} as a statement",
                    node.node_type()
                )))
            }
        };
        Ok(statement)
    }

    fn switch_case(&mut self, node: &Node) -> Result<Statement, JsError> {
        let NodeKind::SwitchCase { test, consequent } = &node.kind else {
            return Err(JsError::internal("Expected a switch case"));
        };
        let mut text = match test {
            Some(test) => {
                let test = self.expression_at(test, Precedence::Expression, false)?;
                concat(&["case", test.as_str(), ":"])
            }
            None => "default:".to_string(),
        };
        let mut terminated = false;
        for statement in consequent {
            let printed = self.statement(statement)?;
            glue(&mut text, &printed.text);
            terminated = printed.terminated;
        }
        Ok(Statement { text, terminated })
    }

    /// Initializer of a `for` statement, without its separator
    fn for_head(&mut self, node: &Node) -> Result<String, JsError> {
        let saved = std::mem::replace(&mut self.no_in, true);
        let result = match node.kind {
            NodeKind::VariableDeclaration { .. } => self.declaration(node),
            _ => self.expression_at(node, Precedence::Expression, false),
        };
        self.no_in = saved;
        result
    }

    /// `var`/`let`/`const` declaration without its semicolon
    fn declaration(&mut self, node: &Node) -> Result<String, JsError> {
        let NodeKind::VariableDeclaration { kind, declarations } = &node.kind else {
            return Err(JsError::internal("Expected a variable declaration"));
        };
        let mut list = Vec::new();
        for declarator in declarations {
            if let NodeKind::VariableDeclarator { id, init } = &declarator.kind {
                let mut text = self.expression_at(id, Precedence::Assignment, false)?;
                if let Some(init) = init {
                    text.push('=');
                    text.push_str(&self.expression_at(init, Precedence::Assignment, false)?);
                }
                list.push(text);
            }
        }
        let list = list.join(",");
        Ok(concat(&[kind.as_str(), list.as_str()]))
    }

    fn import(&mut self, specifiers: &[Node], source: &str) -> Result<String, JsError> {
        let mut parts = Vec::new();
        let mut named = Vec::new();
        for specifier in specifiers {
            match &specifier.kind {
                NodeKind::ImportDefaultSpecifier { local } => {
                    parts.push(self.expression_at(local, Precedence::Primary, false)?);
                }
                NodeKind::ImportNamespaceSpecifier { local } => {
                    let local = self.expression_at(local, Precedence::Primary, false)?;
                    parts.push(format!("*as {}", local));
                }
                NodeKind::ImportSpecifier { imported, local } => {
                    let local = self.expression_at(local, Precedence::Primary, false)?;
                    if *imported == local {
                        named.push(local);
                    } else {
                        named.push(format!("{} as {}", imported, local));
                    }
                }
                _ => {}
            }
        }
        if !named.is_empty() {
            parts.push(format!("{{{}}}", named.join(",")));
        }
        let quoted = quote(source);
        if parts.is_empty() {
            return Ok(format!("import{}", quoted));
        }
        let parts = parts.join(",");
        Ok(concat(&["import", parts.as_str(), "from", quoted.as_str()]))
    }

    fn params(&mut self, params: &[Node]) -> Result<String, JsError> {
        let mut list = Vec::new();
        for param in params {
            list.push(self.expression_at(param, Precedence::Assignment, false)?);
        }
        Ok(list.join(","))
    }

    fn function(&mut self, function: &Function, method: bool) -> Result<String, JsError> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let mut text = String::new();
        if !method {
            text.push_str("function");
            if function.generator {
                text.push('*');
            }
            if let Some(id) = &function.id {
                let id = self.expression_at(id, Precedence::Primary, false)?;
                glue(&mut text, &id);
            }
        }
        let params = self.params(&function.params)?;
        let body = self.statements(&function.body)?;
        self.no_in = saved;
        text.push_str(&format!("({}){{{}}}", params, body));
        Ok(text)
    }

    fn arrow(&mut self, function: &Function) -> Result<String, JsError> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let params = match function.params.as_slice() {
            [single] if single.as_identifier().is_some() => self.expression_at(single, Precedence::Primary, false)?,
            params => format!("({})", self.params(params)?),
        };
        let concise = match function.body.as_slice() {
            [Node {
                kind: NodeKind::Return { argument: Some(value) },
                ..
            }] if function.expression => Some(value),
            _ => None,
        };
        let body = match concise {
            Some(value) => {
                let text = self.expression_at(value, Precedence::Assignment, false)?;
                if text.starts_with('{') {
                    format!("({})", text)
                } else {
                    text
                }
            }
            None => self.block(&function.body)?,
        };
        self.no_in = saved;
        Ok(format!("{}=>{}", params, body))
    }

    fn class(&mut self, class: &Class) -> Result<String, JsError> {
        let mut text = "class".to_string();
        if let Some(id) = &class.id {
            let id = self.expression_at(id, Precedence::Primary, false)?;
            glue(&mut text, &id);
        }
        if let Some(super_class) = &class.super_class {
            let super_class = self.expression_at(super_class, Precedence::LeftHandSide, false)?;
            glue(&mut text, "extends");
            glue(&mut text, &super_class);
        }
        text.push('{');
        for member in &class.body {
            if let NodeKind::MethodDefinition {
                key,
                value,
                kind,
                is_static,
                computed,
            } = &member.kind
            {
                let mut prefix = String::new();
                if *is_static {
                    prefix.push_str("static");
                }
                match kind {
                    MethodKind::Get => glue(&mut prefix, "get"),
                    MethodKind::Set => glue(&mut prefix, "set"),
                    _ => {}
                }
                let method = self.method(key, value, *computed)?;
                glue(&mut prefix, &method);
                text.push_str(&prefix);
            }
        }
        text.push('}');
        Ok(text)
    }

    /// `key(params){body}`, with a `*` for generators
    fn method(&mut self, key: &Node, value: &Node, computed: bool) -> Result<String, JsError> {
        let key = self.property_key(key, computed)?;
        let function = match &value.kind {
            NodeKind::FunctionExpression { function } => function,
            _ => return Err(JsError::internal("Method value is not a function")),
        };
        let star = if function.generator { "*" } else { "" };
        Ok(format!("{}{}{}", star, key, self.function(function, true)?))
    }

    fn property_key(&mut self, key: &Node, computed: bool) -> Result<String, JsError> {
        if computed {
            return Ok(format!("[{}]", self.expression_at(key, Precedence::Assignment, false)?));
        }
        Ok(match &key.kind {
            NodeKind::Name { name } | NodeKind::Identifier { name, .. } => property_key_text(name),
            NodeKind::Literal {
                value: Value::String(value),
            } => property_key_text(value),
            NodeKind::Literal {
                value: Value::Number(value),
            } => pick_number(*value, Precedence::Primary, false, false),
            _ => self.expression_at(key, Precedence::Assignment, false)?,
        })
    }

    fn property(&mut self, node: &Node) -> Result<String, JsError> {
        match &node.kind {
            NodeKind::Property {
                key,
                value,
                kind,
                computed,
                shorthand: _,
                method,
            } => {
                match kind {
                    PropertyKind::Get => {
                        let method = self.method(key, value, *computed)?;
                        return Ok(concat(&["get", method.as_str()]));
                    }
                    PropertyKind::Set => {
                        let method = self.method(key, value, *computed)?;
                        return Ok(concat(&["set", method.as_str()]));
                    }
                    PropertyKind::Init if *method => return self.method(key, value, *computed),
                    PropertyKind::Init => {}
                }
                let key_name = match &key.kind {
                    NodeKind::Name { name } | NodeKind::Identifier { name, .. } if !*computed => Some(name.as_str()),
                    _ => None,
                };
                let bound = match &value.kind {
                    NodeKind::AssignmentPattern { target, .. } => target.as_identifier(),
                    _ => value.as_identifier(),
                };
                if bound.is_some() && bound == key_name {
                    return self.expression_at(value, Precedence::Assignment, false);
                }
                let key = self.property_key(key, *computed)?;
                let value = self.expression_at(value, Precedence::Assignment, false)?;
                Ok(format!("{}:{}", key, value))
            }
            _ => self.expression_at(node, Precedence::Assignment, false),
        }
    }

    fn list(&mut self, elements: &[Option<Node>]) -> Result<String, JsError> {
        let mut text = String::new();
        for (index, element) in elements.iter().enumerate() {
            if index != 0 {
                text.push(',');
            }
            match element {
                Some(element) => text.push_str(&self.expression_at(element, Precedence::Assignment, false)?),
                None if index == elements.len() - 1 => text.push(','),
                None => {}
            }
        }
        Ok(format!("[{}]", text))
    }

    fn arguments(&mut self, arguments: &[Node]) -> Result<String, JsError> {
        let mut list = Vec::new();
        for argument in arguments {
            list.push(self.expression_at(argument, Precedence::Assignment, false)?);
        }
        Ok(format!("({})", list.join(",")))
    }

    /// Print `node` for a slot that requires `required`
    pub fn expression_at(&mut self, node: &Node, required: Precedence, no_same: bool) -> Result<String, JsError> {
        if let NodeKind::Literal {
            value: Value::Number(value),
        } = &node.kind
        {
            return Ok(pick_number(*value, required, no_same, false));
        }
        Ok(self.expression(node)?.wrap(required, no_same))
    }

    /// Print `node` as a fragment
    pub fn expression(&mut self, node: &Node) -> Result<Fragment, JsError> {
        use Precedence::*;
        let fragment = match &node.kind {
            NodeKind::Identifier { name, .. } | NodeKind::Name { name } => Fragment::new(name.clone(), Primary),
            NodeKind::Literal { value } => match value {
                Value::Undefined => Fragment::new("void 0", Unary),
                Value::Null => Fragment::new("null", Primary),
                Value::Boolean(true) => Fragment::new("!0", Unary),
                Value::Boolean(false) => Fragment::new("!1", Unary),
                Value::Number(n) => Fragment::new(pick_number(*n, Expression, false, false), Primary),
                Value::String(s) => Fragment::new(quote(s), Primary),
            },
            NodeKind::RegExp { pattern, flags } => Fragment::new(format!("/{}/{}", pattern, flags), Primary),
            NodeKind::Template { quasis, expressions } => {
                let mut text = String::from("`");
                for (index, quasi) in quasis.iter().enumerate() {
                    text.push_str(&quasi.raw);
                    if let Some(expression) = expressions.get(index) {
                        let saved = std::mem::replace(&mut self.no_in, false);
                        let printed = self.expression_at(expression, Expression, false);
                        self.no_in = saved;
                        text.push_str(&format!("${{{}}}", printed?));
                    }
                }
                text.push('`');
                Fragment::new(text, Primary)
            }
            NodeKind::TaggedTemplate { tag, quasi } => {
                let tag = self.expression_at(tag, LeftHandSide, false)?;
                let quasi = self.expression(quasi)?.text;
                Fragment::new(format!("{}{}", tag, quasi), LeftHandSide)
            }
            NodeKind::This => Fragment::new("this", Primary),
            NodeKind::Super => Fragment::new("super", Primary),
            NodeKind::MetaProperty { meta, property } => Fragment::new(format!("{}.{}", meta, property), Primary),
            NodeKind::Array { elements } | NodeKind::ArrayPattern { elements } => {
                Fragment::new(self.list(elements)?, Primary)
            }
            NodeKind::Object { properties } | NodeKind::ObjectPattern { properties } => {
                let mut list = Vec::new();
                for property in properties {
                    list.push(self.property(property)?);
                }
                Fragment::new(format!("{{{}}}", list.join(",")), Primary)
            }
            NodeKind::Property { .. } => Fragment::new(self.property(node)?, Assignment),
            NodeKind::AssignmentPattern { target, default } => {
                let target = self.expression_at(target, Assignment, true)?;
                let default = self.expression_at(default, Assignment, false)?;
                Fragment::new(format!("{}={}", target, default), Assignment)
            }
            NodeKind::RestElement { argument } | NodeKind::Spread { argument } => {
                let argument = self.expression_at(argument, Assignment, false)?;
                Fragment::new(format!("...{}", argument), Assignment)
            }
            NodeKind::FunctionExpression { function } => Fragment::new(self.function(function, false)?, Primary),
            NodeKind::ArrowFunction { function } => Fragment::new(self.arrow(function)?, Assignment),
            NodeKind::ClassExpression { class } => Fragment::new(self.class(class)?, Primary),
            NodeKind::Unary { operator, argument } => {
                let argument = self.expression_at(argument, Unary, false)?;
                Fragment::new(concat(&[operator.as_str(), argument.as_str()]), Unary)
            }
            NodeKind::Update {
                operator,
                prefix: true,
                argument,
            } => {
                let argument = self.expression_at(argument, Unary, false)?;
                Fragment::new(concat(&[operator.as_str(), argument.as_str()]), Unary)
            }
            NodeKind::Update {
                operator, argument, ..
            } => {
                let argument = self.expression_at(argument, LeftHandSide, false)?;
                Fragment::new(format!("{}{}", argument, operator.as_str()), Postfix)
            }
            NodeKind::Binary { operator, left, right } => {
                let precedence = binary_precedence(*operator);
                let left = self.expression_at(left, precedence, false)?;
                let right = self.expression_at(right, precedence, true)?;
                let mut text = left;
                if matches!(operator, BinaryOperator::In | BinaryOperator::Instanceof) && text.ends_with('/') {
                    text.push(' ');
                }
                glue(&mut text, operator.as_str());
                glue(&mut text, &right);
                let fragment = Fragment::new(text, precedence);
                if *operator == BinaryOperator::In && self.no_in {
                    Fragment::new(format!("({})", fragment.text), Primary)
                } else {
                    fragment
                }
            }
            NodeKind::Logical { operator, left, right } => {
                let precedence = match operator {
                    LogicalOperator::And => LogicalAnd,
                    LogicalOperator::Or => LogicalOr,
                };
                let left = self.expression_at(left, precedence, false)?;
                let right = self.expression_at(right, precedence, true)?;
                Fragment::new(format!("{}{}{}", left, operator.as_str(), right), precedence)
            }
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let test = self.expression_at(test, LogicalOr, false)?;
                let consequent = self.expression_at(consequent, Assignment, false)?;
                let alternate = self.expression_at(alternate, Assignment, false)?;
                Fragment::new(format!("{}?{}:{}", test, consequent, alternate), Conditional)
            }
            NodeKind::Assignment {
                operator,
                target,
                value,
            } => {
                let target = self.expression_at(target, Assignment, true)?;
                let value = self.expression_at(value, Assignment, false)?;
                let mut text = target;
                glue(&mut text, operator.as_str());
                glue(&mut text, &value);
                Fragment::new(text, Assignment)
            }
            NodeKind::Sequence { expressions } => {
                let mut list = Vec::new();
                for expression in expressions {
                    list.push(self.expression_at(expression, Assignment, false)?);
                }
                Fragment::new(list.join(","), Expression)
            }
            NodeKind::Call { callee, arguments } => {
                let callee = self.expression_at(callee, LeftHandSide, false)?;
                let arguments = self.arguments(arguments)?;
                Fragment::new(format!("{}{}", callee, arguments), LeftHandSide)
            }
            NodeKind::New { callee, arguments } => {
                let callee = self.expression_at(callee, Member, false)?;
                let arguments = self.arguments(arguments)?;
                Fragment::new(format!("{}{}", concat(&["new", callee.as_str()]), arguments), LeftHandSide)
            }
            NodeKind::Member {
                object,
                property,
                computed,
            } => {
                let (object_text, precedence) = match &object.kind {
                    NodeKind::Literal {
                        value: Value::Number(value),
                    } => (pick_number(*value, LeftHandSide, false, !*computed), Member),
                    _ => {
                        let fragment = self.expression(object)?;
                        let precedence = if fragment.precedence == LeftHandSide {
                            LeftHandSide
                        } else {
                            Member
                        };
                        (fragment.wrap(LeftHandSide, false), precedence)
                    }
                };
                let text = if *computed {
                    let saved = std::mem::replace(&mut self.no_in, false);
                    let property = self.expression_at(property, Expression, false);
                    self.no_in = saved;
                    format!("{}[{}]", object_text, property?)
                } else {
                    let name = match &property.kind {
                        NodeKind::Name { name } | NodeKind::Identifier { name, .. } => name.clone(),
                        _ => self.expression(property)?.text,
                    };
                    format!("{}.{}", object_text, name)
                };
                Fragment::new(text, precedence)
            }
            NodeKind::Yield { argument, delegate } => {
                let mut text = if *delegate { "yield*" } else { "yield" }.to_string();
                if let Some(argument) = argument {
                    let argument = self.expression_at(argument, Assignment, false)?;
                    glue(&mut text, &argument);
                }
                Fragment::new(text, Assignment)
            }
            NodeKind::CoveredFormals { .. } => {
                return Err(JsError::internal("Unresolved parenthesized group in syntax tree"));
            }
            _ => {
                return Err(JsError::internal(format!(
                    "Cannot print {:?} as an expression",
                    node.node_type()
                )))
            }
        };
        Ok(fragment)
    }
}

fn is_statement(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Empty
            | NodeKind::Debugger
            | NodeKind::Directive { .. }
            | NodeKind::Expression { .. }
            | NodeKind::Block { .. }
            | NodeKind::If { .. }
            | NodeKind::Labeled { .. }
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::With { .. }
            | NodeKind::Switch { .. }
            | NodeKind::SwitchCase { .. }
            | NodeKind::Return { .. }
            | NodeKind::Throw { .. }
            | NodeKind::Try { .. }
            | NodeKind::While { .. }
            | NodeKind::DoWhile { .. }
            | NodeKind::For { .. }
            | NodeKind::ForIn { .. }
            | NodeKind::ForOf { .. }
            | NodeKind::VariableDeclaration { .. }
            | NodeKind::FunctionDeclaration { .. }
            | NodeKind::ClassDeclaration { .. }
            | NodeKind::Import { .. }
            | NodeKind::ExportNamed { .. }
            | NodeKind::ExportDefault { .. }
            | NodeKind::ExportAll { .. }
    )
}

/// Print a program, statement or expression with a fresh [`Printer`]
pub fn print(node: &Node) -> Result<String, JsError> {
    Printer::new().print(node)
}
