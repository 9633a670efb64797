//! Recursive descent parser for JavaScript
//!
//! Each grammar production is one method. Tokens are pulled lazily from the
//! [`Lexer`] into a lookahead queue; backtracking rewinds the lexer to the
//! end of the last consumed token and drops the queue. Strict-mode
//! violations found while strictness is not yet known are collected and
//! either escalated by a later `"use strict"` directive or reported as
//! warnings when parsing finishes.

use std::collections::VecDeque;

use core_types::{Context, JsError, SourceRange, Value};
use tracing::debug;

use crate::ast::*;
use crate::error::*;
use crate::lexer::{
    classify_identifier, Comment, IdentifierClass, Keyword, Lexer, Punctuator, Token, TokenKind,
};

/// Parse a classic script
pub fn parse_script(source: &str) -> Result<Node, JsError> {
    Parser::new(source).parse()
}

/// Parse an ES module
pub fn parse_module(source: &str) -> Result<Node, JsError> {
    Parser::new(source)
        .with_source_type(SourceType::Module)
        .parse()
}

#[derive(Debug, Clone)]
struct Label {
    name: String,
    iteration: bool,
}

/// Parser state that is saved on entry to a function body
struct FunctionContext {
    strict: bool,
    in_function: bool,
    in_generator: bool,
    allow_in: bool,
    iteration_depth: usize,
    switch_depth: usize,
    labels: Vec<Label>,
    label_chain: usize,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    offset: usize,
    violations: usize,
    diagnostics: (usize, usize),
    comments: usize,
    cover_init: Option<SourceRange>,
}

/// JavaScript parser
pub struct Parser {
    lexer: Lexer,
    source_type: SourceType,
    lookahead: VecDeque<Token>,
    /// End offset of the last consumed token
    prev_end: usize,
    strict: bool,
    in_function: bool,
    in_generator: bool,
    /// `in` is a binary operator here (false inside a for-statement head)
    allow_in: bool,
    iteration_depth: usize,
    switch_depth: usize,
    labels: Vec<Label>,
    /// Number of labels directly wrapping the statement being parsed
    label_chain: usize,
    /// First `{ a = 1 }` shorthand that must become a pattern to be valid
    cover_init: Option<SourceRange>,
    violations: Vec<JsError>,
    comments: Vec<Comment>,
}

impl Parser {
    /// Create a parser for a script
    pub fn new(source: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source_type: SourceType::Script,
            lookahead: VecDeque::new(),
            prev_end: 0,
            strict: false,
            in_function: false,
            in_generator: false,
            allow_in: true,
            iteration_depth: 0,
            switch_depth: 0,
            labels: Vec::new(),
            label_chain: 0,
            cover_init: None,
            violations: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Select script or module grammar
    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = source_type;
        self
    }

    /// Use the given diagnostic context
    pub fn with_context(mut self, context: Context) -> Self {
        self.lexer = self.lexer.with_context(context);
        self
    }

    /// Collect source comments while parsing
    pub fn with_comments(mut self, retain: bool) -> Self {
        self.lexer = self.lexer.with_comments(retain);
        self
    }

    /// Diagnostics collected so far
    pub fn context(&self) -> &Context {
        self.lexer.context()
    }

    /// Consume the parser, keeping its diagnostics
    pub fn into_context(self) -> Context {
        self.lexer.into_context()
    }

    /// Comments seen so far (only when retained)
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Parse the whole input into a `Program` node
    pub fn parse(&mut self) -> Result<Node, JsError> {
        if self.source_type == SourceType::Module {
            self.strict = true;
        }
        let mut body = Vec::new();
        let mark = self.violations.len();
        self.parse_directives(&mut body, mark)?;
        while !self.peek()?.is_eof() {
            body.push(self.parse_statement_list_item(true)?);
        }

        let warnings = self.violations.len();
        for violation in self.violations.drain(..) {
            debug!(message = %violation.message, "strict mode violation downgraded to warning");
            self.lexer.context_mut().report_warning(violation);
        }
        debug!(
            statements = body.len(),
            strict = self.strict,
            warnings,
            "parsed program"
        );
        Ok(Node::new(
            NodeKind::Program {
                body,
                source_type: self.source_type,
                scope: None,
            },
            SourceRange::new(0, self.lexer.len()),
        ))
    }

    // ===== token access =====

    fn fill(&mut self, n: usize) -> Result<(), JsError> {
        while self.lookahead.len() <= n {
            let token = self.lexer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<&Token, JsError> {
        self.peek_nth(0)
    }

    fn peek_nth(&mut self, n: usize) -> Result<&Token, JsError> {
        self.fill(n)?;
        self.lookahead
            .get(n)
            .ok_or_else(|| JsError::internal("lookahead buffer underflow"))
    }

    fn next(&mut self) -> Result<Token, JsError> {
        self.fill(0)?;
        let mut token = self
            .lookahead
            .pop_front()
            .ok_or_else(|| JsError::internal("lookahead buffer underflow"))?;
        if !token.is_eof() {
            self.prev_end = token.range.end;
        }
        self.comments.append(&mut token.comments);
        if let Some(message) = token.strict_violation {
            self.strict_violation_at(message, token.range)?;
        }
        Ok(token)
    }

    fn start(&mut self) -> Result<usize, JsError> {
        Ok(self.peek()?.range.start)
    }

    fn finish(&self, kind: NodeKind, start: usize) -> Node {
        Node::new(kind, SourceRange::new(start, self.prev_end.max(start)))
    }

    fn check_punctuator(&mut self, p: Punctuator) -> Result<bool, JsError> {
        Ok(self.peek()?.is_punctuator(p))
    }

    fn eat_punctuator(&mut self, p: Punctuator) -> Result<bool, JsError> {
        if self.check_punctuator(p)? {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_punctuator(&mut self, p: Punctuator) -> Result<Token, JsError> {
        let token = self.next()?;
        if token.is_punctuator(p) {
            return Ok(token);
        }
        Err(self.unexpected_expecting(&token, &format!("'{}'", p.as_str())))
    }

    fn check_keyword(&mut self, k: Keyword) -> Result<bool, JsError> {
        Ok(self.peek()?.is_keyword(k))
    }

    fn eat_keyword(&mut self, k: Keyword) -> Result<bool, JsError> {
        if self.check_keyword(k)? {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_keyword(&mut self, k: Keyword) -> Result<Token, JsError> {
        let token = self.next()?;
        if token.is_keyword(k) {
            return Ok(token);
        }
        Err(self.unexpected_expecting(&token, &format!("'{}'", k.as_str())))
    }

    fn check_contextual(&mut self, name: &str) -> Result<bool, JsError> {
        Ok(self.peek()?.is_contextual(name))
    }

    fn unexpected(&self, token: &Token) -> JsError {
        if token.is_eof() {
            unexpected_eof(token.range)
        } else {
            syntax_error(format!("Unexpected token {}", token.describe()), token.range)
        }
    }

    fn unexpected_expecting(&self, token: &Token, expected: &str) -> JsError {
        if token.is_eof() {
            unexpected_eof(token.range)
        } else {
            unexpected_token(expected, &token.describe(), token.range)
        }
    }

    /// Automatic semicolon insertion
    fn consume_semicolon(&mut self) -> Result<(), JsError> {
        let token = self.peek()?;
        if token.is_punctuator(Punctuator::Semicolon) {
            self.next()?;
            return Ok(());
        }
        if token.is_punctuator(Punctuator::RBrace) || token.is_eof() || token.line_before {
            return Ok(());
        }
        let token = token.clone();
        Err(self.unexpected(&token))
    }

    fn rescan_regexp(&mut self) -> Result<(), JsError> {
        let slash = self
            .lookahead
            .pop_front()
            .ok_or_else(|| JsError::internal("no token to rescan"))?;
        self.lookahead.clear();
        let regexp = self.lexer.rescan_regexp(slash)?;
        self.lookahead.push_front(regexp);
        Ok(())
    }

    fn rescan_template_tail(&mut self) -> Result<(), JsError> {
        let brace = self
            .lookahead
            .pop_front()
            .ok_or_else(|| JsError::internal("no token to rescan"))?;
        if !brace.is_punctuator(Punctuator::RBrace) {
            return Err(self.unexpected_expecting(&brace, "'}'"));
        }
        self.lookahead.clear();
        let tail = self.lexer.rescan_template_tail(brace)?;
        self.lookahead.push_front(tail);
        Ok(())
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            offset: self.prev_end,
            violations: self.violations.len(),
            diagnostics: self.lexer.context().checkpoint(),
            comments: self.comments.len(),
            cover_init: self.cover_init,
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.lookahead.clear();
        self.lexer.reset(checkpoint.offset);
        self.prev_end = checkpoint.offset;
        self.violations.truncate(checkpoint.violations);
        self.lexer.context_mut().rollback(checkpoint.diagnostics);
        self.comments.truncate(checkpoint.comments);
        self.cover_init = checkpoint.cover_init;
    }

    // ===== strict mode =====

    /// Fatal in strict code, otherwise held until strictness is settled
    fn strict_violation_at(&mut self, message: &str, range: SourceRange) -> Result<(), JsError> {
        if self.strict {
            Err(syntax_error(message, range))
        } else {
            self.violations.push(strict_violation(message, range));
            Ok(())
        }
    }

    fn enter_function_context(&mut self, generator: bool) -> FunctionContext {
        let saved = FunctionContext {
            strict: self.strict,
            in_function: self.in_function,
            in_generator: self.in_generator,
            allow_in: self.allow_in,
            iteration_depth: self.iteration_depth,
            switch_depth: self.switch_depth,
            labels: std::mem::take(&mut self.labels),
            label_chain: self.label_chain,
        };
        self.in_function = true;
        self.in_generator = generator;
        self.allow_in = true;
        self.iteration_depth = 0;
        self.switch_depth = 0;
        self.label_chain = 0;
        saved
    }

    fn exit_function_context(&mut self, saved: FunctionContext) {
        self.strict = saved.strict;
        self.in_function = saved.in_function;
        self.in_generator = saved.in_generator;
        self.allow_in = saved.allow_in;
        self.iteration_depth = saved.iteration_depth;
        self.switch_depth = saved.switch_depth;
        self.labels = saved.labels;
        self.label_chain = saved.label_chain;
    }

    /// Parse the directive prologue of a body, switching to strict mode on
    /// `"use strict"`. Violations recorded since `mark` become fatal then.
    fn parse_directives(&mut self, body: &mut Vec<Node>, mark: usize) -> Result<(), JsError> {
        loop {
            let token = self.peek()?;
            let TokenKind::String(value) = &token.kind else {
                return Ok(());
            };
            let value = value.clone();
            let range = token.range;
            let following = self.peek_nth(1)?;
            let ends_statement = following.is_punctuator(Punctuator::Semicolon)
                || following.is_punctuator(Punctuator::RBrace)
                || following.is_eof()
                || (following.line_before && !matches!(following.kind, TokenKind::Punctuator(_)));
            if !ends_statement {
                return Ok(());
            }

            self.next()?;
            let raw = self.lexer.slice(range);
            self.consume_semicolon()?;
            if raw.chars().count() == 12 && raw.get(1..11) == Some("use strict") {
                if let Some(first) = self.violations.get(mark) {
                    return Err(syntax_error(first.message.clone(), first.range.unwrap_or(range)));
                }
                self.strict = true;
            }
            body.push(self.finish(NodeKind::Directive { value, raw }, range.start));
        }
    }

    // ===== identifiers =====

    /// Validate an identifier used as a reference or binding name
    fn check_identifier(&mut self, token: &Token) -> Result<String, JsError> {
        let Some(name) = token.identifier_name() else {
            return Err(self.unexpected(token));
        };
        match classify_identifier(name) {
            IdentifierClass::Name => {}
            IdentifierClass::Keyword(_) => {
                if token.escaped {
                    return Err(syntax_error(
                        "Keyword must not contain escaped characters",
                        token.range,
                    ));
                }
                return Err(self.unexpected(token));
            }
            IdentifierClass::FutureReserved => {
                return Err(syntax_error(
                    format!("Unexpected reserved word '{}'", name),
                    token.range,
                ));
            }
            IdentifierClass::StrictReserved => {
                if name == "yield" && self.in_generator {
                    return Err(syntax_error("Unexpected 'yield' in generator", token.range));
                }
                self.strict_violation_at(
                    &format!("Use of future reserved word '{}' in strict mode", name),
                    token.range,
                )?;
            }
            IdentifierClass::ModuleReserved => {
                if self.source_type == SourceType::Module {
                    return Err(syntax_error(
                        "Unexpected reserved word 'await' in module code",
                        token.range,
                    ));
                }
            }
        }
        Ok(name.to_string())
    }

    /// A binding identifier: also rejects `eval`/`arguments` in strict code
    fn parse_binding_identifier(&mut self) -> Result<Node, JsError> {
        let token = self.next()?;
        let name = self.check_identifier(&token)?;
        self.check_restricted_name(&name, token.range)?;
        Ok(Node::identifier(name, token.range))
    }

    fn check_restricted_name(&mut self, name: &str, range: SourceRange) -> Result<(), JsError> {
        if name == "eval" || name == "arguments" {
            self.strict_violation_at(
                &format!("Unexpected '{}' in strict mode binding or assignment", name),
                range,
            )?;
        }
        Ok(())
    }

    /// Token is an identifier that may start an identifier reference
    fn is_identifier_token(token: &Token) -> bool {
        match token.identifier_name() {
            Some(_) => token.keyword().is_none(),
            None => false,
        }
    }

    /// `let` starting a lexical declaration rather than an identifier
    fn is_let_declaration(&mut self) -> Result<bool, JsError> {
        if !self.check_contextual("let")? {
            return Ok(false);
        }
        let next = self.peek_nth(1)?;
        Ok(next.is_punctuator(Punctuator::LBracket)
            || next.is_punctuator(Punctuator::LBrace)
            || Self::is_identifier_token(next))
    }

    // ===== statements =====

    fn parse_statement_list_item(&mut self, module_item: bool) -> Result<Node, JsError> {
        let token = self.peek()?.clone();
        match token.keyword() {
            Some(Keyword::Function) => self.parse_function_declaration(false),
            Some(Keyword::Class) => self.parse_class(true, false),
            Some(Keyword::Const) => self.parse_lexical_statement(),
            Some(Keyword::Import) => {
                if self.source_type != SourceType::Module || !module_item {
                    return Err(syntax_error(
                        "'import' may only appear at the top level of a module",
                        token.range,
                    ));
                }
                self.parse_import()
            }
            Some(Keyword::Export) => {
                if self.source_type != SourceType::Module || !module_item {
                    return Err(syntax_error(
                        "'export' may only appear at the top level of a module",
                        token.range,
                    ));
                }
                self.parse_export()
            }
            _ if self.is_let_declaration()? => self.parse_lexical_statement(),
            _ => self.parse_statement(),
        }
    }

    fn parse_statement(&mut self) -> Result<Node, JsError> {
        let chain = std::mem::take(&mut self.label_chain);
        let token = self.peek()?.clone();

        if let TokenKind::Punctuator(p) = token.kind {
            match p {
                Punctuator::LBrace => return self.parse_block_statement(),
                Punctuator::Semicolon => {
                    self.next()?;
                    return Ok(self.finish(NodeKind::Empty, token.range.start));
                }
                _ => {}
            }
        }

        match token.keyword() {
            Some(Keyword::Var) => {
                let start = token.range.start;
                let declaration = self.parse_variable_declaration(VariableKind::Var, start)?;
                self.consume_semicolon()?;
                Ok(self.finish(declaration.kind, start))
            }
            Some(Keyword::If) => self.parse_if_statement(),
            Some(Keyword::For) => self.parse_loop(chain, Self::parse_for_statement),
            Some(Keyword::While) => self.parse_loop(chain, Self::parse_while_statement),
            Some(Keyword::Do) => self.parse_loop(chain, Self::parse_do_while_statement),
            Some(Keyword::Continue) => self.parse_continue_statement(),
            Some(Keyword::Break) => self.parse_break_statement(),
            Some(Keyword::Return) => self.parse_return_statement(),
            Some(Keyword::With) => self.parse_with_statement(),
            Some(Keyword::Switch) => self.parse_switch_statement(),
            Some(Keyword::Throw) => self.parse_throw_statement(),
            Some(Keyword::Try) => self.parse_try_statement(),
            Some(Keyword::Debugger) => {
                self.next()?;
                self.consume_semicolon()?;
                Ok(self.finish(NodeKind::Debugger, token.range.start))
            }
            Some(Keyword::Function) => {
                if self.strict {
                    return Err(syntax_error(
                        "In strict mode code, functions can only be declared at top level or inside a block",
                        token.range,
                    ));
                }
                self.parse_function_declaration(false)
            }
            Some(Keyword::Class) => Err(self.unexpected(&token)),
            _ => {
                if Self::is_identifier_token(&token)
                    && self.peek_nth(1)?.is_punctuator(Punctuator::Colon)
                {
                    return self.parse_labeled_statement(chain);
                }
                if self.is_let_declaration()? && self.peek_nth(1)?.is_punctuator(Punctuator::LBracket)
                {
                    return Err(syntax_error(
                        "Lexical declaration cannot appear in a single-statement context",
                        token.range,
                    ));
                }
                self.parse_expression_statement()
            }
        }
    }

    fn parse_loop(
        &mut self,
        chain: usize,
        parse: fn(&mut Self) -> Result<Node, JsError>,
    ) -> Result<Node, JsError> {
        let count = self.labels.len();
        for label in &mut self.labels[count - chain.min(count)..] {
            label.iteration = true;
        }
        self.iteration_depth += 1;
        let result = parse(self);
        self.iteration_depth -= 1;
        result
    }

    fn parse_block_statement(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;
        let body = self.parse_block_body()?;
        Ok(self.finish(NodeKind::Block { body }, start))
    }

    fn parse_block_body(&mut self) -> Result<Vec<Node>, JsError> {
        self.expect_punctuator(Punctuator::LBrace)?;
        let mut body = Vec::new();
        while !self.check_punctuator(Punctuator::RBrace)? {
            if self.peek()?.is_eof() {
                let token = self.peek()?.clone();
                return Err(self.unexpected(&token));
            }
            body.push(self.parse_statement_list_item(false)?);
        }
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(body)
    }

    fn parse_lexical_statement(&mut self) -> Result<Node, JsError> {
        let token = self.next()?;
        let kind = if token.is_keyword(Keyword::Const) {
            VariableKind::Const
        } else {
            VariableKind::Let
        };
        let declaration = self.parse_declarators(kind, token.range.start)?;
        self.consume_semicolon()?;
        Ok(self.finish(declaration.kind, token.range.start))
    }

    /// `var` keyword plus declarators, without the terminating semicolon
    fn parse_variable_declaration(&mut self, kind: VariableKind, start: usize) -> Result<Node, JsError> {
        self.next()?;
        self.parse_declarators(kind, start)
    }

    fn parse_declarators(&mut self, kind: VariableKind, start: usize) -> Result<Node, JsError> {
        let mut declarations = Vec::new();
        loop {
            let declarator_start = self.start()?;
            let id = self.parse_binding_target()?;
            if kind != VariableKind::Var {
                if let Some(name) = id.as_identifier() {
                    if name == "let" {
                        return Err(syntax_error(
                            "let is disallowed as a lexically bound name",
                            id.range,
                        ));
                    }
                }
            }
            let init = if self.eat_punctuator(Punctuator::Assign)? {
                Some(Box::new(self.parse_assignment()?))
            } else {
                None
            };
            declarations.push(self.finish(
                NodeKind::VariableDeclarator {
                    id: Box::new(id),
                    init,
                },
                declarator_start,
            ));
            if !self.eat_punctuator(Punctuator::Comma)? {
                break;
            }
        }
        Ok(self.finish(NodeKind::VariableDeclaration { kind, declarations }, start))
    }

    /// Reject `const` without initializer and destructuring without one,
    /// except where a for-in/of head supplies the value
    fn check_declaration_initializers(declaration: &Node) -> Result<(), JsError> {
        let NodeKind::VariableDeclaration { kind, declarations } = &declaration.kind else {
            return Ok(());
        };
        for declarator in declarations {
            if let NodeKind::VariableDeclarator { id, init: None } = &declarator.kind {
                if *kind == VariableKind::Const {
                    return Err(syntax_error(
                        "Missing initializer in const declaration",
                        declarator.range,
                    ));
                }
                if id.as_identifier().is_none() {
                    return Err(syntax_error(
                        "Missing initializer in destructuring declaration",
                        declarator.range,
                    ));
                }
            }
        }
        Ok(())
    }

    fn parse_expression_statement(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;
        let expression = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(self.finish(
            NodeKind::Expression {
                expression: Box::new(expression),
            },
            start,
        ))
    }

    fn parse_labeled_statement(&mut self, chain: usize) -> Result<Node, JsError> {
        let token = self.next()?;
        let name = self.check_identifier(&token)?;
        self.expect_punctuator(Punctuator::Colon)?;
        if self.labels.iter().any(|label| label.name == name) {
            return Err(syntax_error(
                format!("Label '{}' has already been declared", name),
                token.range,
            ));
        }
        self.labels.push(Label {
            name: name.clone(),
            iteration: false,
        });
        self.label_chain = chain + 1;
        let body = if self.check_keyword(Keyword::Function)? {
            if self.strict {
                let function_token = self.peek()?.clone();
                return Err(syntax_error(
                    "In strict mode code, functions cannot be labelled",
                    function_token.range,
                ));
            }
            self.label_chain = 0;
            self.parse_function_declaration(false)
        } else {
            self.parse_statement()
        };
        self.labels.pop();
        let body = body?;
        Ok(self.finish(
            NodeKind::Labeled {
                label: name,
                body: Box::new(body),
            },
            token.range.start,
        ))
    }

    fn parse_if_statement(&mut self) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::If)?.range.start;
        self.expect_punctuator(Punctuator::LParen)?;
        let test = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        let consequent = self.parse_clause_body()?;
        let alternate = if self.eat_keyword(Keyword::Else)? {
            Some(Box::new(self.parse_clause_body()?))
        } else {
            None
        };
        Ok(self.finish(
            NodeKind::If {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate,
            },
            start,
        ))
    }

    /// Body of `if`/`else`: sloppy code allows a function declaration
    fn parse_clause_body(&mut self) -> Result<Node, JsError> {
        if !self.strict && self.check_keyword(Keyword::Function)? {
            return self.parse_function_declaration(false);
        }
        self.parse_statement()
    }

    fn parse_while_statement(&mut self) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::While)?.range.start;
        self.expect_punctuator(Punctuator::LParen)?;
        let test = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(self.finish(
            NodeKind::While {
                test: Box::new(test),
                body: Box::new(body),
            },
            start,
        ))
    }

    fn parse_do_while_statement(&mut self) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::Do)?.range.start;
        let body = self.parse_loop_body()?;
        self.expect_keyword(Keyword::While)?;
        self.expect_punctuator(Punctuator::LParen)?;
        let test = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        // a semicolon is always inserted after do-while
        self.eat_punctuator(Punctuator::Semicolon)?;
        Ok(self.finish(
            NodeKind::DoWhile {
                body: Box::new(body),
                test: Box::new(test),
            },
            start,
        ))
    }

    fn parse_loop_body(&mut self) -> Result<Node, JsError> {
        if self.check_keyword(Keyword::Function)? {
            let token = self.peek()?.clone();
            return Err(syntax_error(
                "Function declarations are not allowed as loop bodies",
                token.range,
            ));
        }
        self.parse_statement()
    }

    fn parse_for_statement(&mut self) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::For)?.range.start;
        self.expect_punctuator(Punctuator::LParen)?;

        let mut init = None;
        if !self.check_punctuator(Punctuator::Semicolon)? {
            let init_start = self.start()?;
            let saved_allow_in = std::mem::replace(&mut self.allow_in, false);
            let head = if self.check_keyword(Keyword::Var)? {
                self.parse_variable_declaration(VariableKind::Var, init_start)
            } else if self.check_keyword(Keyword::Const)? || self.is_let_declaration()? {
                let token = self.next()?;
                let kind = if token.is_keyword(Keyword::Const) {
                    VariableKind::Const
                } else {
                    VariableKind::Let
                };
                self.parse_declarators(kind, init_start)
            } else {
                let saved_cover = self.cover_init.take();
                let expression = self.parse_expression_cover();
                let pending = std::mem::replace(&mut self.cover_init, saved_cover);
                match expression {
                    Ok(expression) => {
                        let iterating = self.check_keyword(Keyword::In)? || self.check_contextual("of")?;
                        if iterating {
                            self.to_pattern(expression, true)
                        } else if let Some(range) = pending {
                            Err(syntax_error("Invalid shorthand property initializer", range))
                        } else {
                            Ok(expression)
                        }
                    }
                    Err(err) => Err(err),
                }
            };
            self.allow_in = saved_allow_in;
            let head = head?;

            let for_in = self.check_keyword(Keyword::In)?;
            let for_of = !for_in && self.check_contextual("of")?;
            if for_in || for_of {
                Self::check_iteration_head(&head)?;
                self.next()?;
                let right = if for_of {
                    self.parse_assignment()?
                } else {
                    self.parse_expression()?
                };
                self.expect_punctuator(Punctuator::RParen)?;
                let body = self.parse_loop_body()?;
                let (left, right, body) = (Box::new(head), Box::new(right), Box::new(body));
                let kind = if for_in {
                    NodeKind::ForIn { left, right, body }
                } else {
                    NodeKind::ForOf { left, right, body }
                };
                return Ok(self.finish(kind, start));
            }
            Self::check_declaration_initializers(&head)?;
            init = Some(Box::new(head));
        }

        self.expect_punctuator(Punctuator::Semicolon)?;
        let test = if self.check_punctuator(Punctuator::Semicolon)? {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_punctuator(Punctuator::Semicolon)?;
        let update = if self.check_punctuator(Punctuator::RParen)? {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_punctuator(Punctuator::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(self.finish(
            NodeKind::For {
                init,
                test,
                update,
                body: Box::new(body),
            },
            start,
        ))
    }

    /// A for-in/of head declares exactly one binding without initializer
    fn check_iteration_head(head: &Node) -> Result<(), JsError> {
        if let NodeKind::VariableDeclaration { declarations, .. } = &head.kind {
            if declarations.len() != 1 {
                return Err(syntax_error(
                    "Invalid left-hand side in for-in/of loop: must have a single binding",
                    head.range,
                ));
            }
            if let NodeKind::VariableDeclarator { init: Some(init), .. } = &declarations[0].kind {
                return Err(syntax_error(
                    "for-in/of loop variable declaration may not have an initializer",
                    init.range,
                ));
            }
        }
        Ok(())
    }

    fn parse_continue_statement(&mut self) -> Result<Node, JsError> {
        let token = self.expect_keyword(Keyword::Continue)?;
        let label = self.parse_jump_label()?;
        match &label {
            Some(name) => {
                if !self.labels.iter().any(|l| &l.name == name && l.iteration) {
                    return Err(syntax_error(
                        format!("Undefined label '{}'", name),
                        SourceRange::new(token.range.start, self.prev_end),
                    ));
                }
            }
            None => {
                if self.iteration_depth == 0 {
                    return Err(syntax_error("Illegal continue statement", token.range));
                }
            }
        }
        self.consume_semicolon()?;
        Ok(self.finish(NodeKind::Continue { label }, token.range.start))
    }

    fn parse_break_statement(&mut self) -> Result<Node, JsError> {
        let token = self.expect_keyword(Keyword::Break)?;
        let label = self.parse_jump_label()?;
        match &label {
            Some(name) => {
                if !self.labels.iter().any(|l| &l.name == name) {
                    return Err(syntax_error(
                        format!("Undefined label '{}'", name),
                        SourceRange::new(token.range.start, self.prev_end),
                    ));
                }
            }
            None => {
                if self.iteration_depth == 0 && self.switch_depth == 0 {
                    return Err(syntax_error("Illegal break statement", token.range));
                }
            }
        }
        self.consume_semicolon()?;
        Ok(self.finish(NodeKind::Break { label }, token.range.start))
    }

    /// Optional label of `break`/`continue`; a line break ends the statement
    fn parse_jump_label(&mut self) -> Result<Option<String>, JsError> {
        let token = self.peek()?;
        if token.line_before || !Self::is_identifier_token(token) {
            return Ok(None);
        }
        let token = self.next()?;
        Ok(Some(self.check_identifier(&token)?))
    }

    fn parse_return_statement(&mut self) -> Result<Node, JsError> {
        let token = self.expect_keyword(Keyword::Return)?;
        if !self.in_function {
            return Err(syntax_error("Illegal return statement", token.range));
        }
        let next = self.peek()?;
        let argument = if next.line_before
            || next.is_eof()
            || next.is_punctuator(Punctuator::Semicolon)
            || next.is_punctuator(Punctuator::RBrace)
        {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.consume_semicolon()?;
        Ok(self.finish(NodeKind::Return { argument }, token.range.start))
    }

    fn parse_with_statement(&mut self) -> Result<Node, JsError> {
        let token = self.expect_keyword(Keyword::With)?;
        self.strict_violation_at("Strict mode code may not include a with statement", token.range)?;
        self.expect_punctuator(Punctuator::LParen)?;
        let object = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        let body = self.parse_statement()?;
        Ok(self.finish(
            NodeKind::With {
                object: Box::new(object),
                body: Box::new(body),
                scope: None,
            },
            token.range.start,
        ))
    }

    fn parse_switch_statement(&mut self) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::Switch)?.range.start;
        self.expect_punctuator(Punctuator::LParen)?;
        let discriminant = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        self.expect_punctuator(Punctuator::LBrace)?;

        self.switch_depth += 1;
        let mut cases = Vec::new();
        let mut seen_default = false;
        let result = loop {
            if self.eat_punctuator(Punctuator::RBrace)? {
                break Ok(());
            }
            let case_start = self.start()?;
            let token = self.next()?;
            let test = if token.is_keyword(Keyword::Case) {
                Some(Box::new(self.parse_expression()?))
            } else if token.is_keyword(Keyword::Default) {
                if seen_default {
                    break Err(syntax_error(
                        "More than one default clause in switch statement",
                        token.range,
                    ));
                }
                seen_default = true;
                None
            } else {
                break Err(self.unexpected_expecting(&token, "'case' or 'default'"));
            };
            self.expect_punctuator(Punctuator::Colon)?;
            let mut consequent = Vec::new();
            loop {
                let next = self.peek()?;
                if next.is_punctuator(Punctuator::RBrace)
                    || next.is_keyword(Keyword::Case)
                    || next.is_keyword(Keyword::Default)
                    || next.is_eof()
                {
                    break;
                }
                consequent.push(self.parse_statement_list_item(false)?);
            }
            cases.push(self.finish(NodeKind::SwitchCase { test, consequent }, case_start));
        };
        self.switch_depth -= 1;
        result?;

        Ok(self.finish(
            NodeKind::Switch {
                discriminant: Box::new(discriminant),
                cases,
            },
            start,
        ))
    }

    fn parse_throw_statement(&mut self) -> Result<Node, JsError> {
        let token = self.expect_keyword(Keyword::Throw)?;
        if self.peek()?.line_before {
            return Err(syntax_error("Illegal newline after throw", token.range));
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(self.finish(
            NodeKind::Throw {
                argument: Box::new(argument),
            },
            token.range.start,
        ))
    }

    fn parse_try_statement(&mut self) -> Result<Node, JsError> {
        let token = self.expect_keyword(Keyword::Try)?;
        let block = self.parse_block_statement()?;

        let handler = if self.check_keyword(Keyword::Catch)? {
            let catch_start = self.next()?.range.start;
            self.expect_punctuator(Punctuator::LParen)?;
            let param = self.parse_binding_target()?;
            self.expect_punctuator(Punctuator::RParen)?;
            let body = self.parse_block_statement()?;
            Some(Box::new(self.finish(
                NodeKind::CatchClause {
                    param: Box::new(param),
                    body: Box::new(body),
                    scope: None,
                },
                catch_start,
            )))
        } else {
            None
        };

        let finalizer = if self.eat_keyword(Keyword::Finally)? {
            Some(Box::new(self.parse_block_statement()?))
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(syntax_error("Missing catch or finally after try", token.range));
        }
        Ok(self.finish(
            NodeKind::Try {
                block: Box::new(block),
                handler,
                finalizer,
            },
            token.range.start,
        ))
    }

    // ===== functions and classes =====

    fn parse_function_declaration(&mut self, optional_id: bool) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::Function)?.range.start;
        let mark = self.violations.len();
        let generator = self.eat_punctuator(Punctuator::Star)?;
        let id = if optional_id && self.check_punctuator(Punctuator::LParen)? {
            None
        } else {
            Some(self.parse_binding_identifier()?)
        };
        let function = self.parse_function_rest(id, generator, mark)?;
        Ok(self.finish(NodeKind::FunctionDeclaration { function }, start))
    }

    fn parse_function_expression(&mut self) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::Function)?.range.start;
        let mark = self.violations.len();
        let generator = self.eat_punctuator(Punctuator::Star)?;
        let id = if self.check_punctuator(Punctuator::LParen)? {
            None
        } else {
            let saved = std::mem::replace(&mut self.in_generator, generator);
            let id = self.parse_binding_identifier();
            self.in_generator = saved;
            Some(id?)
        };
        let function = self.parse_function_rest(id, generator, mark)?;
        Ok(self.finish(NodeKind::FunctionExpression { function }, start))
    }

    /// Parameters and body of a function whose name was already parsed
    fn parse_function_rest(
        &mut self,
        id: Option<Node>,
        generator: bool,
        mark: usize,
    ) -> Result<Function, JsError> {
        let saved = self.enter_function_context(generator);
        let result = self.parse_function_parts(mark);
        self.exit_function_context(saved);
        let (params, body, strict) = result?;
        let simple = params.iter().all(|p| p.as_identifier().is_some());
        self.validate_params(&params, strict || !simple)?;
        Ok(Function {
            id: id.map(Box::new),
            params,
            body,
            generator,
            expression: false,
            strict,
            scope: None,
        })
    }

    fn parse_function_parts(&mut self, mark: usize) -> Result<(Vec<Node>, Vec<Node>, bool), JsError> {
        let params = self.parse_formal_parameters()?;
        let body = self.parse_function_body(mark)?;
        Ok((params, body, self.strict))
    }

    fn parse_function_body(&mut self, mark: usize) -> Result<Vec<Node>, JsError> {
        self.expect_punctuator(Punctuator::LBrace)?;
        let mut body = Vec::new();
        self.parse_directives(&mut body, mark)?;
        while !self.check_punctuator(Punctuator::RBrace)? {
            if self.peek()?.is_eof() {
                let token = self.peek()?.clone();
                return Err(self.unexpected(&token));
            }
            body.push(self.parse_statement_list_item(false)?);
        }
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(body)
    }

    fn parse_formal_parameters(&mut self) -> Result<Vec<Node>, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let mut params = Vec::new();
        while !self.check_punctuator(Punctuator::RParen)? {
            if self.check_punctuator(Punctuator::Spread)? {
                let start = self.next()?.range.start;
                let argument = self.parse_binding_target()?;
                params.push(self.finish(
                    NodeKind::RestElement {
                        argument: Box::new(argument),
                    },
                    start,
                ));
                break;
            }
            params.push(self.parse_binding_element()?);
            if !self.check_punctuator(Punctuator::RParen)? {
                self.expect_punctuator(Punctuator::Comma)?;
            }
        }
        self.expect_punctuator(Punctuator::RParen)?;
        Ok(params)
    }

    /// Duplicate parameter names are only tolerated in sloppy functions
    /// with simple parameter lists
    fn validate_params(&mut self, params: &[Node], unique: bool) -> Result<(), JsError> {
        let mut bindings = Vec::new();
        for param in params {
            collect_bindings(param, &mut bindings);
        }
        for (i, (name, range)) in bindings.iter().enumerate() {
            if bindings[..i].iter().any(|(other, _)| other == name) {
                let message = format!("Duplicate parameter name '{}' not allowed in this context", name);
                if unique {
                    return Err(syntax_error(message, *range));
                }
                self.violations.push(strict_violation(message, *range));
            }
        }
        Ok(())
    }

    fn parse_method(&mut self, generator: bool, kind: PropertyKind) -> Result<Node, JsError> {
        let start = self.start()?;
        let mark = self.violations.len();
        let saved = self.enter_function_context(generator);
        let result = self.parse_function_parts(mark);
        self.exit_function_context(saved);
        let (params, body, strict) = result?;

        match kind {
            PropertyKind::Get if !params.is_empty() => {
                return Err(syntax_error("Getter must not have any formal parameters", SourceRange::new(start, self.prev_end)));
            }
            PropertyKind::Set
                if params.len() != 1
                    || matches!(params[0].kind, NodeKind::RestElement { .. }) =>
            {
                return Err(syntax_error("Setter must have exactly one formal parameter", SourceRange::new(start, self.prev_end)));
            }
            _ => {}
        }
        self.validate_params(&params, true)?;
        Ok(self.finish(
            NodeKind::FunctionExpression {
                function: Function {
                    id: None,
                    params,
                    body,
                    generator,
                    expression: false,
                    strict,
                    scope: None,
                },
            },
            start,
        ))
    }

    /// Arrow function starting at its parameter list or single parameter
    fn parse_arrow_function(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;
        let mark = self.violations.len();
        let saved = self.enter_function_context(false);
        self.allow_in = saved.allow_in;
        let result = self.parse_arrow_parts(mark);
        self.exit_function_context(saved);
        let (params, body, expression, strict) = result?;
        self.validate_params(&params, true)?;
        Ok(self.finish(
            NodeKind::ArrowFunction {
                function: Function {
                    id: None,
                    params,
                    body,
                    generator: false,
                    expression,
                    strict,
                    scope: None,
                },
            },
            start,
        ))
    }

    #[allow(clippy::type_complexity)]
    fn parse_arrow_parts(&mut self, mark: usize) -> Result<(Vec<Node>, Vec<Node>, bool, bool), JsError> {
        let params = if self.check_punctuator(Punctuator::LParen)? {
            self.parse_formal_parameters()?
        } else {
            vec![self.parse_binding_identifier()?]
        };
        let arrow = self.next()?;
        if !arrow.is_punctuator(Punctuator::Arrow) {
            return Err(self.unexpected_expecting(&arrow, "'=>'"));
        }
        if arrow.line_before {
            return Err(syntax_error("Unexpected line terminator before '=>'", arrow.range));
        }
        if self.check_punctuator(Punctuator::LBrace)? {
            let body = self.parse_function_body(mark)?;
            return Ok((params, body, false, self.strict));
        }
        let expression = self.parse_assignment()?;
        let range = expression.range;
        let body = vec![Node::new(
            NodeKind::Return {
                argument: Some(Box::new(expression)),
            },
            range,
        )];
        Ok((params, body, true, self.strict))
    }

    /// Class declaration or expression; class bodies are always strict
    fn parse_class(&mut self, declaration: bool, optional_id: bool) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::Class)?.range.start;
        let saved_strict = std::mem::replace(&mut self.strict, true);
        let result = self.parse_class_rest(declaration && !optional_id);
        self.strict = saved_strict;
        let class = result?;
        let kind = if declaration {
            NodeKind::ClassDeclaration { class }
        } else {
            NodeKind::ClassExpression { class }
        };
        Ok(self.finish(kind, start))
    }

    fn parse_class_rest(&mut self, id_required: bool) -> Result<Class, JsError> {
        let id = if Self::is_identifier_token(self.peek()?) {
            Some(Box::new(self.parse_binding_identifier()?))
        } else if id_required {
            let token = self.peek()?.clone();
            return Err(self.unexpected_expecting(&token, "class name"));
        } else {
            None
        };
        let super_class = if self.eat_keyword(Keyword::Extends)? {
            Some(Box::new(self.parse_lhs_expression()?))
        } else {
            None
        };

        self.expect_punctuator(Punctuator::LBrace)?;
        let mut body = Vec::new();
        let mut has_constructor = false;
        while !self.eat_punctuator(Punctuator::RBrace)? {
            if self.eat_punctuator(Punctuator::Semicolon)? {
                continue;
            }
            let start = self.start()?;
            let is_static = self.check_contextual("static")?
                && !self.peek_nth(1)?.is_punctuator(Punctuator::LParen);
            if is_static {
                self.next()?;
            }
            let accessor = self.parse_accessor_prefix()?;
            let generator = accessor.is_none() && self.eat_punctuator(Punctuator::Star)?;
            let (key, computed) = self.parse_property_key()?;

            let is_constructor = !is_static && !computed && property_key_name(&key) == Some("constructor");
            let kind = match accessor {
                Some(PropertyKind::Get) => MethodKind::Get,
                Some(PropertyKind::Set) => MethodKind::Set,
                _ if is_constructor => MethodKind::Constructor,
                _ => MethodKind::Method,
            };
            if is_constructor {
                if kind != MethodKind::Constructor || generator {
                    return Err(syntax_error("Class constructor may not be an accessor or generator", key.range));
                }
                if has_constructor {
                    return Err(syntax_error("A class may only have one constructor", key.range));
                }
                has_constructor = true;
            }
            if is_static && !computed && property_key_name(&key) == Some("prototype") {
                return Err(syntax_error("Classes may not have a static property named 'prototype'", key.range));
            }

            let value = self.parse_method(generator, accessor.unwrap_or(PropertyKind::Init))?;
            body.push(self.finish(
                NodeKind::MethodDefinition {
                    key: Box::new(key),
                    value: Box::new(value),
                    kind,
                    is_static,
                    computed,
                },
                start,
            ));
        }
        Ok(Class {
            id,
            super_class,
            body,
            scope: None,
        })
    }

    /// `get`/`set` introducing an accessor, as opposed to a member named so
    fn parse_accessor_prefix(&mut self) -> Result<Option<PropertyKind>, JsError> {
        let kind = if self.check_contextual("get")? {
            PropertyKind::Get
        } else if self.check_contextual("set")? {
            PropertyKind::Set
        } else {
            return Ok(None);
        };
        let next = self.peek_nth(1)?;
        let is_key = match &next.kind {
            TokenKind::Identifier(_) | TokenKind::String(_) | TokenKind::Number(_) => true,
            TokenKind::Punctuator(p) => *p == Punctuator::LBracket,
            _ => false,
        };
        if is_key {
            self.next()?;
            Ok(Some(kind))
        } else {
            Ok(None)
        }
    }

    /// Property name: identifier name, string, number or `[expression]`
    fn parse_property_key(&mut self) -> Result<(Node, bool), JsError> {
        let token = self.next()?;
        match &token.kind {
            TokenKind::Identifier(name) => Ok((
                Node::new(NodeKind::Name { name: name.clone() }, token.range),
                false,
            )),
            TokenKind::String(value) => Ok((
                Node::literal(Value::String(value.clone()), token.range),
                false,
            )),
            TokenKind::Number(value) => Ok((Node::literal(Value::Number(*value), token.range), false)),
            TokenKind::Punctuator(Punctuator::LBracket) => {
                let saved = std::mem::replace(&mut self.allow_in, true);
                let key = self.parse_assignment();
                self.allow_in = saved;
                let key = key?;
                self.expect_punctuator(Punctuator::RBracket)?;
                Ok((key, true))
            }
            _ => Err(self.unexpected_expecting(&token, "property name")),
        }
    }

    // ===== binding patterns =====

    fn parse_binding_target(&mut self) -> Result<Node, JsError> {
        if self.check_punctuator(Punctuator::LBracket)? {
            self.parse_array_binding_pattern()
        } else if self.check_punctuator(Punctuator::LBrace)? {
            self.parse_object_binding_pattern()
        } else {
            self.parse_binding_identifier()
        }
    }

    fn parse_binding_element(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;
        let target = self.parse_binding_target()?;
        self.parse_binding_default(target, start)
    }

    fn parse_binding_default(&mut self, target: Node, start: usize) -> Result<Node, JsError> {
        if !self.eat_punctuator(Punctuator::Assign)? {
            return Ok(target);
        }
        let saved = std::mem::replace(&mut self.allow_in, true);
        let default = self.parse_assignment();
        self.allow_in = saved;
        let default = default?;
        Ok(self.finish(
            NodeKind::AssignmentPattern {
                target: Box::new(target),
                default: Box::new(default),
            },
            start,
        ))
    }

    fn parse_array_binding_pattern(&mut self) -> Result<Node, JsError> {
        let start = self.expect_punctuator(Punctuator::LBracket)?.range.start;
        let mut elements = Vec::new();
        loop {
            if self.eat_punctuator(Punctuator::RBracket)? {
                break;
            }
            if self.eat_punctuator(Punctuator::Comma)? {
                elements.push(None);
                continue;
            }
            if self.check_punctuator(Punctuator::Spread)? {
                let rest_start = self.next()?.range.start;
                let argument = self.parse_binding_target()?;
                elements.push(Some(self.finish(
                    NodeKind::RestElement {
                        argument: Box::new(argument),
                    },
                    rest_start,
                )));
                self.expect_punctuator(Punctuator::RBracket)?;
                break;
            }
            elements.push(Some(self.parse_binding_element()?));
            if !self.check_punctuator(Punctuator::RBracket)? {
                self.expect_punctuator(Punctuator::Comma)?;
            }
        }
        Ok(self.finish(NodeKind::ArrayPattern { elements }, start))
    }

    fn parse_object_binding_pattern(&mut self) -> Result<Node, JsError> {
        let start = self.expect_punctuator(Punctuator::LBrace)?.range.start;
        let mut properties = Vec::new();
        while !self.eat_punctuator(Punctuator::RBrace)? {
            let property_start = self.start()?;
            if self.eat_punctuator(Punctuator::Spread)? {
                let argument = self.parse_binding_identifier()?;
                properties.push(self.finish(
                    NodeKind::RestElement {
                        argument: Box::new(argument),
                    },
                    property_start,
                ));
                self.expect_punctuator(Punctuator::RBrace)?;
                break;
            }

            let key_token = self.peek()?.clone();
            let (key, computed) = self.parse_property_key()?;
            let (value, shorthand) = if self.eat_punctuator(Punctuator::Colon)? {
                (self.parse_binding_element()?, false)
            } else {
                if computed || !matches!(key.kind, NodeKind::Name { .. }) {
                    let token = self.peek()?.clone();
                    return Err(self.unexpected_expecting(&token, "':'"));
                }
                let name = self.check_identifier(&key_token)?;
                self.check_restricted_name(&name, key_token.range)?;
                let target = Node::identifier(name, key_token.range);
                (self.parse_binding_default(target, property_start)?, true)
            };
            properties.push(self.finish(
                NodeKind::Property {
                    key: Box::new(key),
                    value: Box::new(value),
                    kind: PropertyKind::Init,
                    computed,
                    shorthand,
                    method: false,
                },
                property_start,
            ));
            if !self.check_punctuator(Punctuator::RBrace)? {
                self.expect_punctuator(Punctuator::Comma)?;
            }
        }
        Ok(self.finish(NodeKind::ObjectPattern { properties }, start))
    }

    // ===== modules =====

    fn expect_contextual(&mut self, name: &str) -> Result<Token, JsError> {
        let token = self.next()?;
        if token.is_contextual(name) {
            return Ok(token);
        }
        Err(self.unexpected_expecting(&token, &format!("'{}'", name)))
    }

    fn parse_module_specifier(&mut self) -> Result<String, JsError> {
        let token = self.next()?;
        match token.kind {
            TokenKind::String(value) => Ok(value),
            _ => Err(self.unexpected_expecting(&token, "module specifier")),
        }
    }

    /// Any identifier name, including reserved words
    fn parse_identifier_name(&mut self) -> Result<(String, Token), JsError> {
        let token = self.next()?;
        match token.identifier_name() {
            Some(name) => Ok((name.to_string(), token)),
            None => Err(self.unexpected_expecting(&token, "identifier")),
        }
    }

    fn parse_import(&mut self) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::Import)?.range.start;
        let mut specifiers = Vec::new();

        if !matches!(self.peek()?.kind, TokenKind::String(_)) {
            let mut more = true;
            if Self::is_identifier_token(self.peek()?) {
                let local = self.parse_binding_identifier()?;
                let range = local.range;
                specifiers.push(Node::new(
                    NodeKind::ImportDefaultSpecifier {
                        local: Box::new(local),
                    },
                    range,
                ));
                more = self.eat_punctuator(Punctuator::Comma)?;
            }
            if more {
                if self.check_punctuator(Punctuator::Star)? {
                    let namespace_start = self.next()?.range.start;
                    self.expect_contextual("as")?;
                    let local = self.parse_binding_identifier()?;
                    specifiers.push(self.finish(
                        NodeKind::ImportNamespaceSpecifier {
                            local: Box::new(local),
                        },
                        namespace_start,
                    ));
                } else {
                    self.expect_punctuator(Punctuator::LBrace)?;
                    while !self.eat_punctuator(Punctuator::RBrace)? {
                        let specifier_start = self.start()?;
                        let (imported, token) = self.parse_identifier_name()?;
                        let local = if self.check_contextual("as")? {
                            self.next()?;
                            self.parse_binding_identifier()?
                        } else {
                            let name = self.check_identifier(&token)?;
                            self.check_restricted_name(&name, token.range)?;
                            Node::identifier(name, token.range)
                        };
                        specifiers.push(self.finish(
                            NodeKind::ImportSpecifier {
                                imported,
                                local: Box::new(local),
                            },
                            specifier_start,
                        ));
                        if !self.check_punctuator(Punctuator::RBrace)? {
                            self.expect_punctuator(Punctuator::Comma)?;
                        }
                    }
                }
            }
            self.expect_contextual("from")?;
        }

        let source = self.parse_module_specifier()?;
        self.consume_semicolon()?;
        Ok(self.finish(NodeKind::Import { specifiers, source }, start))
    }

    fn parse_export(&mut self) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::Export)?.range.start;

        if self.eat_punctuator(Punctuator::Star)? {
            self.expect_contextual("from")?;
            let source = self.parse_module_specifier()?;
            self.consume_semicolon()?;
            return Ok(self.finish(NodeKind::ExportAll { source }, start));
        }

        if self.eat_keyword(Keyword::Default)? {
            let declaration = if self.check_keyword(Keyword::Function)? {
                self.parse_function_declaration(true)?
            } else if self.check_keyword(Keyword::Class)? {
                self.parse_class(true, true)?
            } else {
                let expression = self.parse_assignment()?;
                self.consume_semicolon()?;
                expression
            };
            return Ok(self.finish(
                NodeKind::ExportDefault {
                    declaration: Box::new(declaration),
                },
                start,
            ));
        }

        if self.eat_punctuator(Punctuator::LBrace)? {
            let mut specifiers = Vec::new();
            let mut locals = Vec::new();
            while !self.eat_punctuator(Punctuator::RBrace)? {
                let specifier_start = self.start()?;
                let (local, token) = self.parse_identifier_name()?;
                let exported = if self.check_contextual("as")? {
                    self.next()?;
                    self.parse_identifier_name()?.0
                } else {
                    local.clone()
                };
                locals.push(token);
                specifiers.push(self.finish(NodeKind::ExportSpecifier { local, exported }, specifier_start));
                if !self.check_punctuator(Punctuator::RBrace)? {
                    self.expect_punctuator(Punctuator::Comma)?;
                }
            }
            let source = if self.check_contextual("from")? {
                self.next()?;
                Some(self.parse_module_specifier()?)
            } else {
                for token in &locals {
                    self.check_identifier(token)?;
                }
                None
            };
            self.consume_semicolon()?;
            return Ok(self.finish(
                NodeKind::ExportNamed {
                    declaration: None,
                    specifiers,
                    source,
                },
                start,
            ));
        }

        let token = self.peek()?.clone();
        let declaration = match token.keyword() {
            Some(Keyword::Var) => {
                let decl_start = token.range.start;
                let declaration = self.parse_variable_declaration(VariableKind::Var, decl_start)?;
                self.consume_semicolon()?;
                self.finish(declaration.kind, decl_start)
            }
            Some(Keyword::Const) => self.parse_lexical_statement()?,
            Some(Keyword::Function) => self.parse_function_declaration(false)?,
            Some(Keyword::Class) => self.parse_class(true, false)?,
            _ if self.is_let_declaration()? => self.parse_lexical_statement()?,
            _ => return Err(self.unexpected(&token)),
        };
        Ok(self.finish(
            NodeKind::ExportNamed {
                declaration: Some(Box::new(declaration)),
                specifiers: Vec::new(),
                source: None,
            },
            start,
        ))
    }

    // ===== expressions =====

    /// Expression in which a pending `{ a = 1 }` cover is an error
    fn parse_expression(&mut self) -> Result<Node, JsError> {
        let saved = self.cover_init.take();
        let expression = self.parse_expression_cover();
        let pending = std::mem::replace(&mut self.cover_init, saved);
        let expression = expression?;
        if let Some(range) = pending {
            return Err(syntax_error("Invalid shorthand property initializer", range));
        }
        Ok(expression)
    }

    fn parse_expression_cover(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;
        let first = self.parse_assignment_cover()?;
        if !self.check_punctuator(Punctuator::Comma)? {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat_punctuator(Punctuator::Comma)? {
            expressions.push(self.parse_assignment_cover()?);
        }
        Ok(self.finish(NodeKind::Sequence { expressions }, start))
    }

    fn parse_assignment(&mut self) -> Result<Node, JsError> {
        let saved = self.cover_init.take();
        let expression = self.parse_assignment_cover();
        let pending = std::mem::replace(&mut self.cover_init, saved);
        let expression = expression?;
        if let Some(range) = pending {
            return Err(syntax_error("Invalid shorthand property initializer", range));
        }
        Ok(expression)
    }

    /// Assignment expression that may still turn out to be a pattern
    fn parse_assignment_cover(&mut self) -> Result<Node, JsError> {
        if self.in_generator && self.check_contextual("yield")? {
            return self.parse_yield();
        }

        let checkpoint = self.checkpoint();
        let token = self.peek()?.clone();
        if Self::is_identifier_token(&token) {
            let next = self.peek_nth(1)?;
            if next.is_punctuator(Punctuator::Arrow) && !next.line_before {
                return self.parse_arrow_function();
            }
        }

        let start = token.range.start;
        let saved_cover = self.cover_init.take();
        let left = self.parse_conditional()?;
        if matches!(left.kind, NodeKind::CoveredFormals { .. }) {
            self.rollback(checkpoint);
            return self.parse_arrow_function();
        }

        let operator = match &self.peek()?.kind {
            TokenKind::Punctuator(p) => assignment_operator(*p),
            _ => None,
        };
        let Some(operator) = operator else {
            self.cover_init = saved_cover.or(self.cover_init);
            return Ok(left);
        };

        let target = if operator == AssignmentOperator::Assign
            && matches!(left.kind, NodeKind::Object { .. } | NodeKind::Array { .. })
        {
            let pattern = self.to_pattern(left, true)?;
            self.cover_init = saved_cover;
            pattern
        } else {
            self.check_simple_target(&left, "Invalid left-hand side in assignment")?;
            self.cover_init = saved_cover.or(self.cover_init);
            left
        };
        self.next()?;
        let value = self.parse_assignment_cover()?;
        Ok(self.finish(
            NodeKind::Assignment {
                operator,
                target: Box::new(target),
                value: Box::new(value),
            },
            start,
        ))
    }

    fn check_simple_target(&mut self, target: &Node, message: &str) -> Result<(), JsError> {
        match &target.kind {
            NodeKind::Identifier { name, .. } => self.check_restricted_name(name, target.range),
            NodeKind::Member { .. } => Ok(()),
            _ => Err(syntax_error(message, target.range)),
        }
    }

    fn parse_yield(&mut self) -> Result<Node, JsError> {
        let start = self.next()?.range.start;
        let token = self.peek()?;
        let (line_before, star, ends) = (
            token.line_before,
            token.is_punctuator(Punctuator::Star),
            ends_yield(token),
        );
        let mut delegate = false;
        let mut argument = None;
        if !line_before {
            if star {
                self.next()?;
                delegate = true;
                argument = Some(Box::new(self.parse_assignment_cover()?));
            } else if !ends {
                argument = Some(Box::new(self.parse_assignment_cover()?));
            }
        }
        Ok(self.finish(NodeKind::Yield { argument, delegate }, start))
    }

    fn parse_conditional(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;
        let test = self.parse_binary(0)?;
        if matches!(test.kind, NodeKind::CoveredFormals { .. })
            || !self.eat_punctuator(Punctuator::Question)?
        {
            return Ok(test);
        }
        let saved = std::mem::replace(&mut self.allow_in, true);
        let consequent = self.parse_assignment_cover();
        self.allow_in = saved;
        let consequent = consequent?;
        self.expect_punctuator(Punctuator::Colon)?;
        let alternate = self.parse_assignment_cover()?;
        Ok(self.finish(
            NodeKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            start,
        ))
    }

    /// Precedence climbing over the binary and logical operators
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Node, JsError> {
        let start = self.start()?;
        let mut left = self.parse_unary()?;
        loop {
            let allow_in = self.allow_in;
            let Some((precedence, operator)) = infix_operator(self.peek()?, allow_in) else {
                break;
            };
            if precedence <= min_precedence {
                break;
            }
            self.next()?;
            let right = Box::new(self.parse_binary(precedence)?);
            let left_operand = Box::new(left);
            let kind = match operator {
                Infix::Binary(operator) => NodeKind::Binary {
                    operator,
                    left: left_operand,
                    right,
                },
                Infix::Logical(operator) => NodeKind::Logical {
                    operator,
                    left: left_operand,
                    right,
                },
            };
            left = self.finish(kind, start);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, JsError> {
        let token = self.peek()?.clone();
        let start = token.range.start;
        let operator = match &token.kind {
            TokenKind::Punctuator(Punctuator::Minus) => Some(UnaryOperator::Minus),
            TokenKind::Punctuator(Punctuator::Plus) => Some(UnaryOperator::Plus),
            TokenKind::Punctuator(Punctuator::Not) => Some(UnaryOperator::Not),
            TokenKind::Punctuator(Punctuator::Tilde) => Some(UnaryOperator::BitwiseNot),
            TokenKind::Punctuator(p @ (Punctuator::PlusPlus | Punctuator::MinusMinus)) => {
                let operator = if *p == Punctuator::PlusPlus {
                    UpdateOperator::Increment
                } else {
                    UpdateOperator::Decrement
                };
                self.next()?;
                let argument = self.parse_unary()?;
                self.check_simple_target(&argument, "Invalid left-hand side expression in prefix operation")?;
                return Ok(self.finish(
                    NodeKind::Update {
                        operator,
                        prefix: true,
                        argument: Box::new(argument),
                    },
                    start,
                ));
            }
            _ => match token.keyword() {
                Some(Keyword::Delete) => Some(UnaryOperator::Delete),
                Some(Keyword::Void) => Some(UnaryOperator::Void),
                Some(Keyword::Typeof) => Some(UnaryOperator::Typeof),
                _ => None,
            },
        };

        let Some(operator) = operator else {
            return self.parse_postfix();
        };
        self.next()?;
        let argument = self.parse_unary()?;
        if operator == UnaryOperator::Delete && argument.as_identifier().is_some() {
            self.strict_violation_at("Delete of an unqualified identifier in strict mode", argument.range)?;
        }
        Ok(self.finish(
            NodeKind::Unary {
                operator,
                argument: Box::new(argument),
            },
            start,
        ))
    }

    fn parse_postfix(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;
        let expression = self.parse_lhs_expression()?;
        let token = self.peek()?;
        if token.line_before {
            return Ok(expression);
        }
        let operator = if token.is_punctuator(Punctuator::PlusPlus) {
            UpdateOperator::Increment
        } else if token.is_punctuator(Punctuator::MinusMinus) {
            UpdateOperator::Decrement
        } else {
            return Ok(expression);
        };
        self.check_simple_target(&expression, "Invalid left-hand side expression in postfix operation")?;
        self.next()?;
        Ok(self.finish(
            NodeKind::Update {
                operator,
                prefix: false,
                argument: Box::new(expression),
            },
            start,
        ))
    }

    /// Member, call and tagged template chains
    fn parse_lhs_expression(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;
        let expression = if self.check_keyword(Keyword::New)? {
            self.parse_new()?
        } else if self.check_keyword(Keyword::Super)? {
            self.parse_super()?
        } else {
            self.parse_primary()?
        };
        self.parse_call_tail(expression, start, true)
    }

    fn parse_call_tail(&mut self, mut expression: Node, start: usize, allow_call: bool) -> Result<Node, JsError> {
        loop {
            if self.eat_punctuator(Punctuator::Dot)? {
                let (name, token) = self.parse_identifier_name()?;
                let property = Node::new(NodeKind::Name { name }, token.range);
                expression = self.finish(
                    NodeKind::Member {
                        object: Box::new(expression),
                        property: Box::new(property),
                        computed: false,
                    },
                    start,
                );
            } else if self.eat_punctuator(Punctuator::LBracket)? {
                let saved = std::mem::replace(&mut self.allow_in, true);
                let property = self.parse_expression();
                self.allow_in = saved;
                let property = property?;
                self.expect_punctuator(Punctuator::RBracket)?;
                expression = self.finish(
                    NodeKind::Member {
                        object: Box::new(expression),
                        property: Box::new(property),
                        computed: true,
                    },
                    start,
                );
            } else if allow_call && self.check_punctuator(Punctuator::LParen)? {
                let arguments = self.parse_arguments()?;
                expression = self.finish(
                    NodeKind::Call {
                        callee: Box::new(expression),
                        arguments,
                    },
                    start,
                );
            } else if matches!(self.peek()?.kind, TokenKind::Template(_)) {
                let quasi = self.parse_template()?;
                expression = self.finish(
                    NodeKind::TaggedTemplate {
                        tag: Box::new(expression),
                        quasi: Box::new(quasi),
                    },
                    start,
                );
            } else {
                return Ok(expression);
            }
        }
    }

    fn parse_new(&mut self) -> Result<Node, JsError> {
        let start = self.expect_keyword(Keyword::New)?.range.start;
        if self.eat_punctuator(Punctuator::Dot)? {
            let (name, token) = self.parse_identifier_name()?;
            if name != "target" || token.escaped {
                return Err(self.unexpected_expecting(&token, "'target'"));
            }
            if !self.in_function {
                return Err(syntax_error(
                    "new.target expression is not allowed here",
                    SourceRange::new(start, token.range.end),
                ));
            }
            return Ok(self.finish(
                NodeKind::MetaProperty {
                    meta: "new".to_string(),
                    property: name,
                },
                start,
            ));
        }

        let callee_start = self.start()?;
        let callee = if self.check_keyword(Keyword::New)? {
            self.parse_new()?
        } else if self.check_keyword(Keyword::Super)? {
            self.parse_super()?
        } else {
            self.parse_primary()?
        };
        let callee = self.parse_call_tail(callee, callee_start, false)?;
        let arguments = if self.check_punctuator(Punctuator::LParen)? {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(self.finish(
            NodeKind::New {
                callee: Box::new(callee),
                arguments,
            },
            start,
        ))
    }

    fn parse_super(&mut self) -> Result<Node, JsError> {
        let token = self.expect_keyword(Keyword::Super)?;
        let next = self.peek()?;
        let usable = next.is_punctuator(Punctuator::Dot)
            || next.is_punctuator(Punctuator::LBracket)
            || next.is_punctuator(Punctuator::LParen);
        if !usable || !self.in_function {
            return Err(syntax_error("'super' keyword unexpected here", token.range));
        }
        Ok(Node::new(NodeKind::Super, token.range))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Node>, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let saved = std::mem::replace(&mut self.allow_in, true);
        let arguments = self.parse_argument_list();
        self.allow_in = saved;
        arguments
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Node>, JsError> {
        let mut arguments = Vec::new();
        while !self.eat_punctuator(Punctuator::RParen)? {
            if self.check_punctuator(Punctuator::Spread)? {
                let start = self.next()?.range.start;
                let argument = self.parse_assignment()?;
                arguments.push(self.finish(
                    NodeKind::Spread {
                        argument: Box::new(argument),
                    },
                    start,
                ));
            } else {
                arguments.push(self.parse_assignment()?);
            }
            if !self.check_punctuator(Punctuator::RParen)? {
                self.expect_punctuator(Punctuator::Comma)?;
            }
        }
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Node, JsError> {
        let token = self.peek()?.clone();
        let range = token.range;
        match &token.kind {
            TokenKind::Identifier(_) => match token.keyword() {
                Some(Keyword::This) => {
                    self.next()?;
                    Ok(Node::new(NodeKind::This, range))
                }
                Some(Keyword::Null) => {
                    self.next()?;
                    Ok(Node::literal(Value::Null, range))
                }
                Some(Keyword::True) => {
                    self.next()?;
                    Ok(Node::literal(Value::Boolean(true), range))
                }
                Some(Keyword::False) => {
                    self.next()?;
                    Ok(Node::literal(Value::Boolean(false), range))
                }
                Some(Keyword::Function) => self.parse_function_expression(),
                Some(Keyword::Class) => self.parse_class(false, true),
                _ => {
                    let token = self.next()?;
                    let name = self.check_identifier(&token)?;
                    Ok(Node::identifier(name, range))
                }
            },
            TokenKind::Number(value) => {
                self.next()?;
                Ok(Node::literal(Value::Number(*value), range))
            }
            TokenKind::String(value) => {
                self.next()?;
                Ok(Node::literal(Value::String(value.clone()), range))
            }
            TokenKind::Template(_) => self.parse_template(),
            TokenKind::Punctuator(Punctuator::LParen) => self.parse_group(),
            TokenKind::Punctuator(Punctuator::LBracket) => self.parse_array_literal(),
            TokenKind::Punctuator(Punctuator::LBrace) => self.parse_object_literal(),
            TokenKind::Punctuator(Punctuator::Slash | Punctuator::SlashEq) => {
                self.rescan_regexp()?;
                let token = self.next()?;
                match token.kind {
                    TokenKind::RegExp { pattern, flags } => {
                        Ok(Node::new(NodeKind::RegExp { pattern, flags }, token.range))
                    }
                    _ => Err(JsError::internal("regular expression rescan produced another token")),
                }
            }
            _ => Err(self.unexpected(&token)),
        }
    }

    fn parse_template(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let token = self.next()?;
            let part = match &token.kind {
                TokenKind::Template(part) => part.clone(),
                _ => return Err(self.unexpected_expecting(&token, "template")),
            };
            quasis.push(TemplateElement {
                cooked: part.cooked,
                raw: part.raw,
            });
            if part.tail {
                break;
            }
            let saved = std::mem::replace(&mut self.allow_in, true);
            let expression = self.parse_expression();
            self.allow_in = saved;
            expressions.push(expression?);
            self.rescan_template_tail()?;
        }
        Ok(self.finish(NodeKind::Template { quasis, expressions }, start))
    }

    /// Parenthesized expression, or the parameter list of an arrow function
    /// when `=>` follows
    fn parse_group(&mut self) -> Result<Node, JsError> {
        let start = self.expect_punctuator(Punctuator::LParen)?.range.start;
        let saved = std::mem::replace(&mut self.allow_in, true);
        let result = self.parse_group_members(start);
        self.allow_in = saved;
        result
    }

    fn parse_group_members(&mut self, start: usize) -> Result<Node, JsError> {
        if self.eat_punctuator(Punctuator::RParen)? {
            if !self.check_punctuator(Punctuator::Arrow)? {
                let token = self.peek()?.clone();
                return Err(self.unexpected_expecting(&token, "'=>'"));
            }
            return Ok(self.finish(NodeKind::CoveredFormals { expressions: Vec::new() }, start));
        }

        let mut expressions = Vec::new();
        let mut formals_only = false;
        loop {
            if self.check_punctuator(Punctuator::Spread)? {
                let rest_start = self.next()?.range.start;
                let argument = self.parse_binding_target()?;
                expressions.push(self.finish(
                    NodeKind::RestElement {
                        argument: Box::new(argument),
                    },
                    rest_start,
                ));
                formals_only = true;
                self.expect_punctuator(Punctuator::RParen)?;
                break;
            }
            expressions.push(self.parse_assignment_cover()?);
            if self.eat_punctuator(Punctuator::Comma)? {
                if self.eat_punctuator(Punctuator::RParen)? {
                    formals_only = true;
                    break;
                }
                continue;
            }
            self.expect_punctuator(Punctuator::RParen)?;
            break;
        }

        if self.check_punctuator(Punctuator::Arrow)? {
            return Ok(self.finish(NodeKind::CoveredFormals { expressions }, start));
        }
        if formals_only {
            let token = self.peek()?.clone();
            return Err(self.unexpected_expecting(&token, "'=>'"));
        }
        if expressions.len() == 1 {
            if let Some(expression) = expressions.pop() {
                return Ok(expression);
            }
        }
        Ok(self.finish(NodeKind::Sequence { expressions }, start))
    }

    fn parse_array_literal(&mut self) -> Result<Node, JsError> {
        let start = self.expect_punctuator(Punctuator::LBracket)?.range.start;
        let saved = std::mem::replace(&mut self.allow_in, true);
        let elements = self.parse_array_elements();
        self.allow_in = saved;
        let elements = elements?;
        Ok(self.finish(NodeKind::Array { elements }, start))
    }

    fn parse_array_elements(&mut self) -> Result<Vec<Option<Node>>, JsError> {
        let mut elements = Vec::new();
        loop {
            if self.eat_punctuator(Punctuator::RBracket)? {
                return Ok(elements);
            }
            if self.eat_punctuator(Punctuator::Comma)? {
                elements.push(None);
                continue;
            }
            let element = if self.check_punctuator(Punctuator::Spread)? {
                let start = self.next()?.range.start;
                let argument = self.parse_assignment_cover()?;
                self.finish(
                    NodeKind::Spread {
                        argument: Box::new(argument),
                    },
                    start,
                )
            } else {
                self.parse_assignment_cover()?
            };
            elements.push(Some(element));
            if !self.check_punctuator(Punctuator::RBracket)? {
                self.expect_punctuator(Punctuator::Comma)?;
            }
        }
    }

    fn parse_object_literal(&mut self) -> Result<Node, JsError> {
        let start = self.expect_punctuator(Punctuator::LBrace)?.range.start;
        let saved = std::mem::replace(&mut self.allow_in, true);
        let properties = self.parse_object_properties();
        self.allow_in = saved;
        let properties = properties?;
        Ok(self.finish(NodeKind::Object { properties }, start))
    }

    fn parse_object_properties(&mut self) -> Result<Vec<Node>, JsError> {
        let mut properties = Vec::new();
        while !self.eat_punctuator(Punctuator::RBrace)? {
            properties.push(self.parse_object_property()?);
            if !self.check_punctuator(Punctuator::RBrace)? {
                self.expect_punctuator(Punctuator::Comma)?;
            }
        }
        Ok(properties)
    }

    fn parse_object_property(&mut self) -> Result<Node, JsError> {
        let start = self.start()?;

        if let Some(kind) = self.parse_accessor_prefix()? {
            let (key, computed) = self.parse_property_key()?;
            let value = self.parse_method(false, kind)?;
            return Ok(self.property(key, value, kind, computed, false, false, start));
        }
        if self.eat_punctuator(Punctuator::Star)? {
            let (key, computed) = self.parse_property_key()?;
            let value = self.parse_method(true, PropertyKind::Init)?;
            return Ok(self.property(key, value, PropertyKind::Init, computed, false, true, start));
        }

        let key_token = self.peek()?.clone();
        let (key, computed) = self.parse_property_key()?;
        if self.eat_punctuator(Punctuator::Colon)? {
            let value = self.parse_assignment_cover()?;
            return Ok(self.property(key, value, PropertyKind::Init, computed, false, false, start));
        }
        if self.check_punctuator(Punctuator::LParen)? {
            let value = self.parse_method(false, PropertyKind::Init)?;
            return Ok(self.property(key, value, PropertyKind::Init, computed, false, true, start));
        }

        if computed || !matches!(key.kind, NodeKind::Name { .. }) {
            let token = self.peek()?.clone();
            return Err(self.unexpected_expecting(&token, "':'"));
        }
        let name = self.check_identifier(&key_token)?;
        let mut value = Node::identifier(name, key_token.range);
        if self.eat_punctuator(Punctuator::Assign)? {
            let default = self.parse_assignment()?;
            value = self.finish(
                NodeKind::AssignmentPattern {
                    target: Box::new(value),
                    default: Box::new(default),
                },
                start,
            );
            if self.cover_init.is_none() {
                self.cover_init = Some(value.range);
            }
        }
        Ok(self.property(key, value, PropertyKind::Init, false, true, false, start))
    }

    #[allow(clippy::too_many_arguments)]
    fn property(
        &self,
        key: Node,
        value: Node,
        kind: PropertyKind,
        computed: bool,
        shorthand: bool,
        method: bool,
        start: usize,
    ) -> Node {
        self.finish(
            NodeKind::Property {
                key: Box::new(key),
                value: Box::new(value),
                kind,
                computed,
                shorthand,
                method,
            },
            start,
        )
    }

    /// Reinterpret an array or object literal as a destructuring target
    fn to_pattern(&mut self, node: Node, allow_member: bool) -> Result<Node, JsError> {
        let range = node.range;
        let kind = match node.kind {
            NodeKind::Identifier { name, symbol } => {
                self.check_restricted_name(&name, range)?;
                NodeKind::Identifier { name, symbol }
            }
            kind @ NodeKind::Member { .. } if allow_member => kind,
            NodeKind::Array { elements } => {
                let count = elements.len();
                let mut patterns = Vec::with_capacity(count);
                for (index, element) in elements.into_iter().enumerate() {
                    let pattern = match element {
                        None => None,
                        Some(Node {
                            kind: NodeKind::Spread { argument },
                            range: spread_range,
                            ..
                        }) => {
                            if index + 1 != count {
                                return Err(syntax_error("Rest element must be last element", spread_range));
                            }
                            let argument = self.to_pattern(*argument, allow_member)?;
                            Some(Node::new(
                                NodeKind::RestElement {
                                    argument: Box::new(argument),
                                },
                                spread_range,
                            ))
                        }
                        Some(element) => Some(self.to_pattern(element, allow_member)?),
                    };
                    patterns.push(pattern);
                }
                NodeKind::ArrayPattern { elements: patterns }
            }
            NodeKind::Object { properties } => {
                let mut patterns = Vec::with_capacity(properties.len());
                for property in properties {
                    let property_range = property.range;
                    match property.kind {
                        NodeKind::Property {
                            key,
                            value,
                            kind: PropertyKind::Init,
                            computed,
                            shorthand,
                            method: false,
                        } => {
                            let value = self.to_pattern(*value, allow_member)?;
                            patterns.push(Node::new(
                                NodeKind::Property {
                                    key,
                                    value: Box::new(value),
                                    kind: PropertyKind::Init,
                                    computed,
                                    shorthand,
                                    method: false,
                                },
                                property_range,
                            ));
                        }
                        _ => {
                            return Err(syntax_error(
                                "Invalid destructuring assignment target",
                                property_range,
                            ))
                        }
                    }
                }
                NodeKind::ObjectPattern { properties: patterns }
            }
            NodeKind::Assignment {
                operator: AssignmentOperator::Assign,
                target,
                value,
            } => NodeKind::AssignmentPattern {
                target,
                default: value,
            },
            NodeKind::AssignmentPattern { target, default } => {
                let target = self.to_pattern(*target, allow_member)?;
                NodeKind::AssignmentPattern {
                    target: Box::new(target),
                    default,
                }
            }
            _ => return Err(syntax_error("Invalid destructuring assignment target", range)),
        };
        Ok(Node::new(kind, range))
    }
}

enum Infix {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

/// Binding power and operator for a token in infix position
fn infix_operator(token: &Token, allow_in: bool) -> Option<(u8, Infix)> {
    if token.is_keyword(Keyword::In) {
        return allow_in.then_some((7, Infix::Binary(BinaryOperator::In)));
    }
    if token.is_keyword(Keyword::Instanceof) {
        return Some((7, Infix::Binary(BinaryOperator::Instanceof)));
    }
    let TokenKind::Punctuator(p) = &token.kind else {
        return None;
    };
    let binary = |precedence: u8, operator: BinaryOperator| Some((precedence, Infix::Binary(operator)));
    match p {
        Punctuator::OrOr => Some((1, Infix::Logical(LogicalOperator::Or))),
        Punctuator::AndAnd => Some((2, Infix::Logical(LogicalOperator::And))),
        Punctuator::Or => binary(3, BinaryOperator::BitwiseOr),
        Punctuator::Xor => binary(4, BinaryOperator::BitwiseXor),
        Punctuator::And => binary(5, BinaryOperator::BitwiseAnd),
        Punctuator::EqEq => binary(6, BinaryOperator::Eq),
        Punctuator::NotEq => binary(6, BinaryOperator::NotEq),
        Punctuator::EqEqEq => binary(6, BinaryOperator::StrictEq),
        Punctuator::NotEqEq => binary(6, BinaryOperator::StrictNotEq),
        Punctuator::Lt => binary(7, BinaryOperator::Lt),
        Punctuator::LtEq => binary(7, BinaryOperator::LtEq),
        Punctuator::Gt => binary(7, BinaryOperator::Gt),
        Punctuator::GtEq => binary(7, BinaryOperator::GtEq),
        Punctuator::LtLt => binary(8, BinaryOperator::LeftShift),
        Punctuator::GtGt => binary(8, BinaryOperator::RightShift),
        Punctuator::GtGtGt => binary(8, BinaryOperator::UnsignedRightShift),
        Punctuator::Plus => binary(9, BinaryOperator::Add),
        Punctuator::Minus => binary(9, BinaryOperator::Sub),
        Punctuator::Star => binary(10, BinaryOperator::Mul),
        Punctuator::Slash => binary(10, BinaryOperator::Div),
        Punctuator::Percent => binary(10, BinaryOperator::Mod),
        _ => None,
    }
}

fn assignment_operator(p: Punctuator) -> Option<AssignmentOperator> {
    Some(match p {
        Punctuator::Assign => AssignmentOperator::Assign,
        Punctuator::PlusEq => AssignmentOperator::AddAssign,
        Punctuator::MinusEq => AssignmentOperator::SubAssign,
        Punctuator::StarEq => AssignmentOperator::MulAssign,
        Punctuator::SlashEq => AssignmentOperator::DivAssign,
        Punctuator::PercentEq => AssignmentOperator::ModAssign,
        Punctuator::AndEq => AssignmentOperator::BitAndAssign,
        Punctuator::OrEq => AssignmentOperator::BitOrAssign,
        Punctuator::XorEq => AssignmentOperator::BitXorAssign,
        Punctuator::LtLtEq => AssignmentOperator::LeftShiftAssign,
        Punctuator::GtGtEq => AssignmentOperator::RightShiftAssign,
        Punctuator::GtGtGtEq => AssignmentOperator::UnsignedRightShiftAssign,
        _ => return None,
    })
}

/// Tokens after which `yield` takes no operand
fn ends_yield(token: &Token) -> bool {
    if token.is_eof() || token.is_keyword(Keyword::In) || token.is_contextual("of") {
        return true;
    }
    matches!(
        token.kind,
        TokenKind::Punctuator(
            Punctuator::RParen
                | Punctuator::RBracket
                | Punctuator::RBrace
                | Punctuator::Comma
                | Punctuator::Semicolon
                | Punctuator::Colon
                | Punctuator::Question
        )
    )
}

/// Static name of a property key, if it has one
fn property_key_name(key: &Node) -> Option<&str> {
    match &key.kind {
        NodeKind::Name { name } => Some(name),
        NodeKind::Literal {
            value: Value::String(value),
        } => Some(value),
        _ => None,
    }
}

/// Bound identifiers of a parameter with their source ranges
fn collect_bindings(node: &Node, out: &mut Vec<(String, SourceRange)>) {
    match &node.kind {
        NodeKind::Identifier { name, .. } => out.push((name.clone(), node.range)),
        NodeKind::ArrayPattern { elements } => {
            for element in elements.iter().flatten() {
                collect_bindings(element, out);
            }
        }
        NodeKind::ObjectPattern { properties } => {
            for property in properties {
                match &property.kind {
                    NodeKind::Property { value, .. } => collect_bindings(value, out),
                    _ => collect_bindings(property, out),
                }
            }
        }
        NodeKind::AssignmentPattern { target, .. } => collect_bindings(target, out),
        NodeKind::RestElement { argument } => collect_bindings(argument, out),
        _ => {}
    }
}
