//! Lexer - converts source text into tokens, one per call
//!
//! The lexer never decides between grammatical interpretations on its own:
//! a `/` is always scanned as a punctuator and a `}` always closes a brace.
//! The parser asks for a regular expression or a template continuation
//! explicitly through [`Lexer::rescan_regexp`] and
//! [`Lexer::rescan_template_tail`] when the grammar calls for one.

use core_types::{Context, JsError, SourceRange};
use serde::{Deserialize, Serialize};

use crate::error::lexical_error;
use crate::unicode::{is_id_continue, is_id_start, is_line_terminator, is_space};

/// Reserved words that are always keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// break keyword
    Break,
    /// case keyword
    Case,
    /// catch keyword
    Catch,
    /// class keyword
    Class,
    /// const keyword
    Const,
    /// continue keyword
    Continue,
    /// debugger keyword
    Debugger,
    /// default keyword
    Default,
    /// delete keyword
    Delete,
    /// do keyword
    Do,
    /// else keyword
    Else,
    /// export keyword
    Export,
    /// extends keyword
    Extends,
    /// finally keyword
    Finally,
    /// for keyword
    For,
    /// function keyword
    Function,
    /// if keyword
    If,
    /// import keyword
    Import,
    /// in keyword
    In,
    /// instanceof keyword
    Instanceof,
    /// new keyword
    New,
    /// return keyword
    Return,
    /// super keyword
    Super,
    /// switch keyword
    Switch,
    /// this keyword
    This,
    /// throw keyword
    Throw,
    /// try keyword
    Try,
    /// typeof keyword
    Typeof,
    /// var keyword
    Var,
    /// void keyword
    Void,
    /// while keyword
    While,
    /// with keyword
    With,
    /// null literal
    Null,
    /// true literal
    True,
    /// false literal
    False,
}

impl Keyword {
    /// Look up a reserved word by its spelling
    pub fn from_name(name: &str) -> Option<Keyword> {
        Some(match name {
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "catch" => Keyword::Catch,
            "class" => Keyword::Class,
            "const" => Keyword::Const,
            "continue" => Keyword::Continue,
            "debugger" => Keyword::Debugger,
            "default" => Keyword::Default,
            "delete" => Keyword::Delete,
            "do" => Keyword::Do,
            "else" => Keyword::Else,
            "export" => Keyword::Export,
            "extends" => Keyword::Extends,
            "finally" => Keyword::Finally,
            "for" => Keyword::For,
            "function" => Keyword::Function,
            "if" => Keyword::If,
            "import" => Keyword::Import,
            "in" => Keyword::In,
            "instanceof" => Keyword::Instanceof,
            "new" => Keyword::New,
            "return" => Keyword::Return,
            "super" => Keyword::Super,
            "switch" => Keyword::Switch,
            "this" => Keyword::This,
            "throw" => Keyword::Throw,
            "try" => Keyword::Try,
            "typeof" => Keyword::Typeof,
            "var" => Keyword::Var,
            "void" => Keyword::Void,
            "while" => Keyword::While,
            "with" => Keyword::With,
            "null" => Keyword::Null,
            "true" => Keyword::True,
            "false" => Keyword::False,
            _ => return None,
        })
    }

    /// Source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Catch => "catch",
            Keyword::Class => "class",
            Keyword::Const => "const",
            Keyword::Continue => "continue",
            Keyword::Debugger => "debugger",
            Keyword::Default => "default",
            Keyword::Delete => "delete",
            Keyword::Do => "do",
            Keyword::Else => "else",
            Keyword::Export => "export",
            Keyword::Extends => "extends",
            Keyword::Finally => "finally",
            Keyword::For => "for",
            Keyword::Function => "function",
            Keyword::If => "if",
            Keyword::Import => "import",
            Keyword::In => "in",
            Keyword::Instanceof => "instanceof",
            Keyword::New => "new",
            Keyword::Return => "return",
            Keyword::Super => "super",
            Keyword::Switch => "switch",
            Keyword::This => "this",
            Keyword::Throw => "throw",
            Keyword::Try => "try",
            Keyword::Typeof => "typeof",
            Keyword::Var => "var",
            Keyword::Void => "void",
            Keyword::While => "while",
            Keyword::With => "with",
            Keyword::Null => "null",
            Keyword::True => "true",
            Keyword::False => "false",
        }
    }
}

/// How an identifier name resolves once keyword resolution is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierClass {
    /// A reserved word
    Keyword(Keyword),
    /// `enum`, reserved in every mode
    FutureReserved,
    /// Reserved only in strict mode code
    StrictReserved,
    /// `await`, reserved only in module code
    ModuleReserved,
    /// A plain identifier
    Name,
}

/// Resolve an identifier name against the reserved word tables.
///
/// The lexer does not apply this itself: a property key or a name after `.`
/// may legally be spelled like a keyword.
pub fn classify_identifier(name: &str) -> IdentifierClass {
    if let Some(keyword) = Keyword::from_name(name) {
        return IdentifierClass::Keyword(keyword);
    }
    match name {
        "enum" => IdentifierClass::FutureReserved,
        "implements" | "interface" | "package" | "private" | "protected" | "public"
        | "static" | "yield" | "let" => IdentifierClass::StrictReserved,
        "await" => IdentifierClass::ModuleReserved,
        _ => IdentifierClass::Name,
    }
}

/// JavaScript punctuators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punctuator {
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ;
    Semicolon,
    /// ,
    Comma,
    /// .
    Dot,
    /// ...
    Spread,
    /// :
    Colon,
    /// ?
    Question,
    /// =
    Assign,
    /// =>
    Arrow,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// ==
    EqEq,
    /// ===
    EqEqEq,
    /// !=
    NotEq,
    /// !==
    NotEqEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// &&
    AndAnd,
    /// ||
    OrOr,
    /// !
    Not,
    /// &
    And,
    /// |
    Or,
    /// ^
    Xor,
    /// ~
    Tilde,
    /// <<
    LtLt,
    /// >>
    GtGt,
    /// >>>
    GtGtGt,
    /// +=
    PlusEq,
    /// -=
    MinusEq,
    /// *=
    StarEq,
    /// /=
    SlashEq,
    /// %=
    PercentEq,
    /// &=
    AndEq,
    /// |=
    OrEq,
    /// ^=
    XorEq,
    /// <<=
    LtLtEq,
    /// >>=
    GtGtEq,
    /// >>>=
    GtGtGtEq,
    /// ++
    PlusPlus,
    /// --
    MinusMinus,
}

impl Punctuator {
    /// Source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Punctuator::LParen => "(",
            Punctuator::RParen => ")",
            Punctuator::LBrace => "{",
            Punctuator::RBrace => "}",
            Punctuator::LBracket => "[",
            Punctuator::RBracket => "]",
            Punctuator::Semicolon => ";",
            Punctuator::Comma => ",",
            Punctuator::Dot => ".",
            Punctuator::Spread => "...",
            Punctuator::Colon => ":",
            Punctuator::Question => "?",
            Punctuator::Assign => "=",
            Punctuator::Arrow => "=>",
            Punctuator::Plus => "+",
            Punctuator::Minus => "-",
            Punctuator::Star => "*",
            Punctuator::Slash => "/",
            Punctuator::Percent => "%",
            Punctuator::EqEq => "==",
            Punctuator::EqEqEq => "===",
            Punctuator::NotEq => "!=",
            Punctuator::NotEqEq => "!==",
            Punctuator::Lt => "<",
            Punctuator::LtEq => "<=",
            Punctuator::Gt => ">",
            Punctuator::GtEq => ">=",
            Punctuator::AndAnd => "&&",
            Punctuator::OrOr => "||",
            Punctuator::Not => "!",
            Punctuator::And => "&",
            Punctuator::Or => "|",
            Punctuator::Xor => "^",
            Punctuator::Tilde => "~",
            Punctuator::LtLt => "<<",
            Punctuator::GtGt => ">>",
            Punctuator::GtGtGt => ">>>",
            Punctuator::PlusEq => "+=",
            Punctuator::MinusEq => "-=",
            Punctuator::StarEq => "*=",
            Punctuator::SlashEq => "/=",
            Punctuator::PercentEq => "%=",
            Punctuator::AndEq => "&=",
            Punctuator::OrEq => "|=",
            Punctuator::XorEq => "^=",
            Punctuator::LtLtEq => "<<=",
            Punctuator::GtGtEq => ">>=",
            Punctuator::GtGtGtEq => ">>>=",
            Punctuator::PlusPlus => "++",
            Punctuator::MinusMinus => "--",
        }
    }
}

/// Kind of a source comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// A comment retained from the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Line or block comment
    pub kind: CommentKind,
    /// Text between the delimiters
    pub text: String,
    /// Range including the delimiters
    pub range: SourceRange,
}

/// One segment of a template literal
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePart {
    /// Value with escapes interpreted
    pub cooked: String,
    /// Source text with line terminators normalized to `\n`
    pub raw: String,
    /// True if the segment ends the template (closing backtick)
    pub tail: bool,
}

/// Token payload
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier name, not yet resolved against the keyword tables
    Identifier(String),
    /// Punctuator/operator
    Punctuator(Punctuator),
    /// Number literal
    Number(f64),
    /// String literal (cooked value)
    String(String),
    /// Template segment, from a backtick or `}` up to `${` or the closing backtick
    Template(TemplatePart),
    /// Regular expression literal
    RegExp {
        /// Body between the slashes
        pattern: String,
        /// Flag characters
        flags: String,
    },
    /// End of input
    EOF,
}

/// A token with its range and layout information
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Payload
    pub kind: TokenKind,
    /// Source range
    pub range: SourceRange,
    /// A line terminator occurred between the previous token and this one
    pub line_before: bool,
    /// Identifier contained `\u` escapes, so it can never act as a keyword
    pub escaped: bool,
    /// Legacy construct that is only legal outside strict mode
    pub strict_violation: Option<&'static str>,
    /// Comments between the previous token and this one
    pub comments: Vec<Comment>,
}

impl Token {
    /// Check for a specific punctuator
    pub fn is_punctuator(&self, p: Punctuator) -> bool {
        matches!(self.kind, TokenKind::Punctuator(x) if x == p)
    }

    /// Keyword resolution: the reserved word this token spells, if any
    pub fn keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Identifier(name) if !self.escaped => Keyword::from_name(name),
            _ => None,
        }
    }

    /// Check for a specific keyword
    pub fn is_keyword(&self, k: Keyword) -> bool {
        self.keyword() == Some(k)
    }

    /// Raw identifier name, including names spelled like keywords
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// True for an unescaped identifier with exactly this spelling
    pub fn is_contextual(&self, name: &str) -> bool {
        !self.escaped && self.identifier_name() == Some(name)
    }

    /// End of input?
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::EOF)
    }

    /// Short human-readable description for error messages
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Identifier(name) => format!("'{}'", name),
            TokenKind::Punctuator(p) => format!("'{}'", p.as_str()),
            TokenKind::Number(_) => "number".to_string(),
            TokenKind::String(_) => "string".to_string(),
            TokenKind::Template(_) => "template".to_string(),
            TokenKind::RegExp { .. } => "regular expression".to_string(),
            TokenKind::EOF => "end of input".to_string(),
        }
    }
}

/// Lexer for JavaScript source code
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line_before: bool,
    retain_comments: bool,
    pending_comments: Vec<Comment>,
    context: Context,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        let mut lexer = Self {
            chars: source.chars().collect(),
            position: 0,
            line_before: false,
            retain_comments: false,
            pending_comments: Vec::new(),
            context: Context::default(),
        };
        lexer.skip_hashbang();
        lexer
    }

    /// Use the given diagnostic context (e.g. a tolerant one)
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Attach comments to the following token instead of dropping them
    pub fn with_comments(mut self, retain: bool) -> Self {
        self.retain_comments = retain;
        self
    }

    /// Diagnostic context
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Mutable diagnostic context
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Consume the lexer, keeping its diagnostics
    pub fn into_context(self) -> Context {
        self.context
    }

    /// Current cursor offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length of the source in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// True for an empty source
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Rewind (or advance) the cursor to a previously recorded offset
    pub fn reset(&mut self, offset: usize) {
        self.position = offset.min(self.chars.len());
        self.pending_comments.clear();
    }

    /// Source text covered by a range
    pub fn slice(&self, range: SourceRange) -> String {
        let end = range.end.min(self.chars.len());
        let start = range.start.min(end);
        self.chars[start..end].iter().collect()
    }

    fn skip_hashbang(&mut self) {
        if self.peek() == Some('#') && self.peek_next() == Some('!') {
            while let Some(c) = self.peek() {
                if is_line_terminator(c) {
                    break;
                }
                self.advance();
            }
        }
    }

    /// Scan the next token.
    ///
    /// An illegal character is reported to the context and skipped; in a
    /// tolerant context scanning then continues with the next character.
    pub fn next_token(&mut self) -> Result<Token, JsError> {
        self.line_before = false;
        loop {
            self.skip_whitespace_and_comments()?;
            let start = self.position;
            let Some(c) = self.peek() else {
                return Ok(self.make_token(TokenKind::EOF, start, false, None));
            };

            if is_id_start(c) || c == '\\' {
                return self.scan_identifier(start);
            }
            if c.is_ascii_digit() || (c == '.' && self.peek_next().is_some_and(|n| n.is_ascii_digit())) {
                return self.scan_number(start);
            }
            if c == '"' || c == '\'' {
                return self.scan_string(start, c);
            }
            if c == '`' {
                self.advance();
                return self.scan_template_part(start);
            }
            if let Some(p) = self.scan_punctuator() {
                return Ok(self.make_token(TokenKind::Punctuator(p), start, false, None));
            }

            self.advance();
            self.context.report_error(lexical_error(
                format!("Unexpected character '{}'", c),
                SourceRange::new(start, self.position),
            ))?;
        }
    }

    /// Re-scan a `/` or `/=` token as a regular expression literal
    pub fn rescan_regexp(&mut self, slash: Token) -> Result<Token, JsError> {
        let start = slash.range.start;
        self.position = start;
        self.advance();

        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.unterminated("regular expression", start));
            };
            if is_line_terminator(c) {
                return Err(self.unterminated("regular expression", start));
            }
            self.advance();
            match c {
                '\\' => {
                    pattern.push(c);
                    match self.peek() {
                        Some(n) if !is_line_terminator(n) => {
                            pattern.push(n);
                            self.advance();
                        }
                        _ => return Err(self.unterminated("regular expression", start)),
                    }
                }
                '[' => {
                    in_class = true;
                    pattern.push(c);
                }
                ']' => {
                    in_class = false;
                    pattern.push(c);
                }
                '/' if !in_class => break,
                _ => pattern.push(c),
            }
        }

        let mut flags = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                return Err(lexical_error(
                    "Invalid regular expression flags",
                    SourceRange::new(start, self.position + 1),
                ));
            }
            if !is_id_continue(c) {
                break;
            }
            flags.push(c);
            self.advance();
        }

        Ok(Token {
            kind: TokenKind::RegExp { pattern, flags },
            range: SourceRange::new(start, self.position),
            line_before: slash.line_before,
            escaped: false,
            strict_violation: None,
            comments: slash.comments,
        })
    }

    /// Continue a template after the `}` that closes a substitution
    pub fn rescan_template_tail(&mut self, right_brace: Token) -> Result<Token, JsError> {
        self.position = right_brace.range.start;
        self.advance();
        let mut token = self.scan_template_part(right_brace.range.start)?;
        token.line_before = right_brace.line_before;
        token.comments = right_brace.comments;
        Ok(token)
    }

    fn make_token(
        &mut self,
        kind: TokenKind,
        start: usize,
        escaped: bool,
        strict_violation: Option<&'static str>,
    ) -> Token {
        Token {
            kind,
            range: SourceRange::new(start, self.position),
            line_before: self.line_before,
            escaped,
            strict_violation,
            comments: std::mem::take(&mut self.pending_comments),
        }
    }

    fn unterminated(&self, what: &str, start: usize) -> JsError {
        lexical_error(
            format!("Unterminated {}", what),
            SourceRange::new(start, self.position),
        )
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), JsError> {
        while let Some(c) = self.peek() {
            if is_space(c) {
                self.advance();
            } else if is_line_terminator(c) {
                self.advance();
                self.line_before = true;
            } else if c == '/' && self.peek_next() == Some('/') {
                let start = self.position;
                self.advance();
                self.advance();
                while let Some(c) = self.peek() {
                    if is_line_terminator(c) {
                        break;
                    }
                    self.advance();
                }
                self.push_comment(CommentKind::Line, start, start + 2, self.position);
            } else if c == '/' && self.peek_next() == Some('*') {
                let start = self.position;
                self.advance();
                self.advance();
                loop {
                    match self.peek() {
                        None => return Err(self.unterminated("comment", start)),
                        Some('*') if self.peek_next() == Some('/') => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        Some(c) => {
                            if is_line_terminator(c) {
                                self.line_before = true;
                            }
                            self.advance();
                        }
                    }
                }
                self.push_comment(CommentKind::Block, start, start + 2, self.position - 2);
            } else {
                break;
            }
        }
        Ok(())
    }

    fn push_comment(&mut self, kind: CommentKind, start: usize, text_start: usize, text_end: usize) {
        if self.retain_comments {
            let text = self.chars[text_start..text_end].iter().collect();
            self.pending_comments.push(Comment {
                kind,
                text,
                range: SourceRange::new(start, self.position),
            });
        }
    }

    fn scan_identifier(&mut self, start: usize) -> Result<Token, JsError> {
        let mut name = String::new();
        let mut escaped = false;
        while let Some(c) = self.peek() {
            let ch = if c == '\\' {
                let escape_start = self.position;
                self.advance();
                if !self.match_char('u') {
                    return Err(lexical_error(
                        "Invalid escape in identifier",
                        SourceRange::new(escape_start, self.position),
                    ));
                }
                let code = self.scan_unicode_escape(escape_start)?;
                escaped = true;
                char::from_u32(code).ok_or_else(|| {
                    lexical_error(
                        "Invalid Unicode escape in identifier",
                        SourceRange::new(escape_start, self.position),
                    )
                })?
            } else {
                c
            };
            let valid = if name.is_empty() {
                is_id_start(ch)
            } else {
                is_id_continue(ch)
            };
            if !valid {
                if c == '\\' {
                    return Err(lexical_error(
                        "Invalid identifier character",
                        SourceRange::new(start, self.position),
                    ));
                }
                break;
            }
            if c != '\\' {
                self.advance();
            }
            name.push(ch);
        }
        Ok(self.make_token(TokenKind::Identifier(name), start, escaped, None))
    }

    /// Scan the digits of `\u` escape; the cursor is just past the `u`
    fn scan_unicode_escape(&mut self, escape_start: usize) -> Result<u32, JsError> {
        let invalid = |lexer: &Self| {
            lexical_error(
                "Invalid Unicode escape sequence",
                SourceRange::new(escape_start, lexer.position),
            )
        };
        if self.match_char('{') {
            let mut value: u32 = 0;
            let mut digits = 0;
            while let Some(d) = self.peek().and_then(|c| c.to_digit(16)) {
                value = value.saturating_mul(16).saturating_add(d);
                digits += 1;
                self.advance();
            }
            if digits == 0 || !self.match_char('}') || value > 0x10FFFF {
                return Err(invalid(self));
            }
            Ok(value)
        } else {
            let mut value = 0;
            for _ in 0..4 {
                match self.peek().and_then(|c| c.to_digit(16)) {
                    Some(d) => {
                        value = value * 16 + d;
                        self.advance();
                    }
                    None => return Err(invalid(self)),
                }
            }
            Ok(value)
        }
    }

    fn scan_number(&mut self, start: usize) -> Result<Token, JsError> {
        let mut violation = None;
        let first = self.peek();
        let radix = if first == Some('0') {
            match self.peek_next() {
                Some('x') | Some('X') => Some(16),
                Some('o') | Some('O') => Some(8),
                Some('b') | Some('B') => Some(2),
                _ => None,
            }
        } else {
            None
        };

        let value = if let Some(radix) = radix {
            self.advance();
            self.advance();
            let mut value = 0.0;
            let mut digits = 0;
            while let Some(d) = self.peek().and_then(|c| c.to_digit(radix)) {
                value = value * radix as f64 + d as f64;
                digits += 1;
                self.advance();
            }
            if digits == 0 {
                return Err(lexical_error(
                    "Missing digits after radix prefix",
                    SourceRange::new(start, self.position),
                ));
            }
            value
        } else if first == Some('0') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            let mut digits = String::new();
            while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                digits.push(c);
                self.advance();
            }
            if digits.chars().all(|c| c < '8') {
                violation = Some("Octal literals are not allowed in strict mode");
                digits
                    .chars()
                    .filter_map(|c| c.to_digit(8))
                    .fold(0.0, |acc, d| acc * 8.0 + d as f64)
            } else {
                violation = Some("Decimals with leading zeros are not allowed in strict mode");
                let mut text = digits;
                self.scan_decimal_tail(&mut text, start)?;
                text.parse::<f64>().unwrap_or(f64::NAN)
            }
        } else {
            let mut text = String::new();
            while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                text.push(c);
                self.advance();
            }
            self.scan_decimal_tail(&mut text, start)?;
            text.parse::<f64>().map_err(|_| {
                lexical_error("Invalid number literal", SourceRange::new(start, self.position))
            })?
        };

        if let Some(c) = self.peek() {
            if is_id_start(c) || c.is_ascii_digit() || c == '\\' {
                return Err(lexical_error(
                    "Identifier starts immediately after numeric literal",
                    SourceRange::new(start, self.position + 1),
                ));
            }
        }
        Ok(self.make_token(TokenKind::Number(value), start, false, violation))
    }

    /// Fraction and exponent after the integer digits
    fn scan_decimal_tail(&mut self, text: &mut String, start: usize) -> Result<(), JsError> {
        if self.peek() == Some('.') {
            self.advance();
            text.push('.');
            while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                text.push(c);
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            text.push('e');
            if let Some(sign) = self.peek().filter(|c| *c == '+' || *c == '-') {
                text.push(sign);
                self.advance();
            }
            let mut digits = 0;
            while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                text.push(c);
                digits += 1;
                self.advance();
            }
            if digits == 0 {
                return Err(lexical_error(
                    "Missing exponent digits",
                    SourceRange::new(start, self.position),
                ));
            }
        }
        if text.starts_with('.') {
            text.insert(0, '0');
        }
        Ok(())
    }

    fn scan_string(&mut self, start: usize, quote: char) -> Result<Token, JsError> {
        self.advance();
        let mut value = String::new();
        let mut violation = None;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.unterminated("string literal", start));
            };
            if c == quote {
                self.advance();
                break;
            }
            if c == '\n' || c == '\r' {
                return Err(self.unterminated("string literal", start));
            }
            self.advance();
            if c == '\\' {
                if let Some(v) = self.scan_escape(&mut value, false)? {
                    violation = Some(v);
                }
            } else {
                value.push(c);
            }
        }
        Ok(self.make_token(TokenKind::String(value), start, false, violation))
    }

    /// Interpret one escape sequence; the cursor is just past the backslash.
    ///
    /// Returns a strict-mode violation message for legacy octal escapes.
    fn scan_escape(
        &mut self,
        out: &mut String,
        in_template: bool,
    ) -> Result<Option<&'static str>, JsError> {
        let escape_start = self.position - 1;
        let Some(c) = self.peek() else {
            return Err(self.unterminated("escape sequence", escape_start));
        };
        self.advance();
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'v' => out.push('\u{000B}'),
            '\r' => {
                self.match_char('\n');
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let hi = self.peek().and_then(|c| c.to_digit(16));
                let lo = self.peek_next().and_then(|c| c.to_digit(16));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        self.advance();
                        self.advance();
                        out.push(char::from_u32(hi * 16 + lo).unwrap_or('\u{FFFD}'));
                    }
                    _ => {
                        return Err(lexical_error(
                            "Invalid hexadecimal escape sequence",
                            SourceRange::new(escape_start, self.position),
                        ))
                    }
                }
            }
            'u' => {
                let code = self.scan_unicode_escape(escape_start)?;
                let ch = if (0xD800..0xDC00).contains(&code) {
                    self.scan_low_surrogate(code)
                } else {
                    char::from_u32(code)
                };
                out.push(ch.unwrap_or('\u{FFFD}'));
            }
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            '0'..='7' => {
                if in_template {
                    return Err(lexical_error(
                        "Octal escape sequences are not allowed in template strings",
                        SourceRange::new(escape_start, self.position),
                    ));
                }
                let mut value = c.to_digit(8).unwrap_or(0);
                let max_digits = if c <= '3' { 3 } else { 2 };
                for _ in 1..max_digits {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.advance();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
                return Ok(Some("Octal escape sequences are not allowed in strict mode"));
            }
            '8' | '9' => {
                if in_template {
                    return Err(lexical_error(
                        "\\8 and \\9 are not allowed in template strings",
                        SourceRange::new(escape_start, self.position),
                    ));
                }
                out.push(c);
                return Ok(Some("\\8 and \\9 are not allowed in strict mode"));
            }
            other => out.push(other),
        }
        Ok(None)
    }

    /// Combine a high surrogate with a directly following `\uDCxx` escape
    fn scan_low_surrogate(&mut self, high: u32) -> Option<char> {
        let save = self.position;
        if self.peek() == Some('\\') && self.peek_next() == Some('u') {
            self.advance();
            self.advance();
            if let Ok(low) = self.scan_unicode_escape(save) {
                if (0xDC00..0xE000).contains(&low) {
                    return char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
                }
            }
        }
        self.position = save;
        None
    }

    /// Scan template characters up to `${` or the closing backtick
    fn scan_template_part(&mut self, start: usize) -> Result<Token, JsError> {
        let mut cooked = String::new();
        let mut raw = String::new();
        let tail;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.unterminated("template literal", start));
            };
            match c {
                '`' => {
                    self.advance();
                    tail = true;
                    break;
                }
                '$' if self.peek_next() == Some('{') => {
                    self.advance();
                    self.advance();
                    tail = false;
                    break;
                }
                '\\' => {
                    let raw_start = self.position;
                    self.advance();
                    self.scan_escape(&mut cooked, true)?;
                    let text: String = self.chars[raw_start..self.position].iter().collect();
                    raw.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
                }
                '\r' => {
                    self.advance();
                    self.match_char('\n');
                    cooked.push('\n');
                    raw.push('\n');
                }
                _ => {
                    self.advance();
                    cooked.push(c);
                    raw.push(c);
                }
            }
        }
        Ok(self.make_token(
            TokenKind::Template(TemplatePart { cooked, raw, tail }),
            start,
            false,
            None,
        ))
    }

    fn scan_punctuator(&mut self) -> Option<Punctuator> {
        let c = self.peek()?;
        self.advance();
        let p = match c {
            '(' => Punctuator::LParen,
            ')' => Punctuator::RParen,
            '{' => Punctuator::LBrace,
            '}' => Punctuator::RBrace,
            '[' => Punctuator::LBracket,
            ']' => Punctuator::RBracket,
            ';' => Punctuator::Semicolon,
            ',' => Punctuator::Comma,
            ':' => Punctuator::Colon,
            '?' => Punctuator::Question,
            '~' => Punctuator::Tilde,
            '.' => {
                if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    Punctuator::Spread
                } else {
                    Punctuator::Dot
                }
            }
            '<' => {
                if self.match_char('<') {
                    if self.match_char('=') {
                        Punctuator::LtLtEq
                    } else {
                        Punctuator::LtLt
                    }
                } else if self.match_char('=') {
                    Punctuator::LtEq
                } else {
                    Punctuator::Lt
                }
            }
            '>' => {
                if self.match_char('>') {
                    if self.match_char('>') {
                        if self.match_char('=') {
                            Punctuator::GtGtGtEq
                        } else {
                            Punctuator::GtGtGt
                        }
                    } else if self.match_char('=') {
                        Punctuator::GtGtEq
                    } else {
                        Punctuator::GtGt
                    }
                } else if self.match_char('=') {
                    Punctuator::GtEq
                } else {
                    Punctuator::Gt
                }
            }
            '=' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Punctuator::EqEqEq
                    } else {
                        Punctuator::EqEq
                    }
                } else if self.match_char('>') {
                    Punctuator::Arrow
                } else {
                    Punctuator::Assign
                }
            }
            '!' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Punctuator::NotEqEq
                    } else {
                        Punctuator::NotEq
                    }
                } else {
                    Punctuator::Not
                }
            }
            '+' => {
                if self.match_char('+') {
                    Punctuator::PlusPlus
                } else if self.match_char('=') {
                    Punctuator::PlusEq
                } else {
                    Punctuator::Plus
                }
            }
            '-' => {
                if self.match_char('-') {
                    Punctuator::MinusMinus
                } else if self.match_char('=') {
                    Punctuator::MinusEq
                } else {
                    Punctuator::Minus
                }
            }
            '*' => self.with_eq(Punctuator::Star, Punctuator::StarEq),
            '/' => self.with_eq(Punctuator::Slash, Punctuator::SlashEq),
            '%' => self.with_eq(Punctuator::Percent, Punctuator::PercentEq),
            '^' => self.with_eq(Punctuator::Xor, Punctuator::XorEq),
            '&' => {
                if self.match_char('&') {
                    Punctuator::AndAnd
                } else {
                    self.with_eq(Punctuator::And, Punctuator::AndEq)
                }
            }
            '|' => {
                if self.match_char('|') {
                    Punctuator::OrOr
                } else {
                    self.with_eq(Punctuator::Or, Punctuator::OrEq)
                }
            }
            _ => {
                self.position -= 1;
                return None;
            }
        };
        Some(p)
    }

    fn with_eq(&mut self, plain: Punctuator, compound: Punctuator) -> Punctuator {
        if self.match_char('=') {
            compound
        } else {
            plain
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        if self.position < self.chars.len() {
            self.position += 1;
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token.is_eof() {
                break;
            }
            out.push(token.kind);
        }
        out
    }

    #[test]
    fn test_lexer_identifiers_are_unresolved() {
        let toks = tokens("if foo");
        assert!(matches!(&toks[0], TokenKind::Identifier(n) if n == "if"));
        assert!(matches!(&toks[1], TokenKind::Identifier(n) if n == "foo"));
    }

    #[test]
    fn test_lexer_keyword_resolution() {
        let mut lexer = Lexer::new("while \\u0077hile");
        let plain = lexer.next_token().unwrap();
        let escaped = lexer.next_token().unwrap();
        assert_eq!(plain.keyword(), Some(Keyword::While));
        assert_eq!(escaped.keyword(), None);
        assert!(escaped.escaped);
        assert_eq!(classify_identifier("yield"), IdentifierClass::StrictReserved);
        assert_eq!(classify_identifier("enum"), IdentifierClass::FutureReserved);
    }

    #[test]
    fn test_lexer_numbers() {
        let toks = tokens("42 3.5 .5 1e3 0x1F 0o17 0b101 017 09");
        let values: Vec<f64> = toks
            .iter()
            .map(|t| match t {
                TokenKind::Number(n) => *n,
                _ => panic!("expected number"),
            })
            .collect();
        assert_eq!(values, vec![42.0, 3.5, 0.5, 1000.0, 31.0, 15.0, 5.0, 15.0, 9.0]);
    }

    #[test]
    fn test_lexer_legacy_octal_flagged() {
        let mut lexer = Lexer::new("017 17");
        assert!(lexer.next_token().unwrap().strict_violation.is_some());
        assert!(lexer.next_token().unwrap().strict_violation.is_none());
    }

    #[test]
    fn test_lexer_number_followed_by_identifier() {
        let mut lexer = Lexer::new("3in");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_lexer_string_escapes() {
        let toks = tokens(r#"'a\nb' "\x41B\u{43}" '\101' "😀""#);
        assert_eq!(toks[0], TokenKind::String("a\nb".to_string()));
        assert_eq!(toks[1], TokenKind::String("ABC".to_string()));
        assert_eq!(toks[2], TokenKind::String("A".to_string()));
        assert_eq!(toks[3], TokenKind::String("\u{1F600}".to_string()));
    }

    #[test]
    fn test_lexer_octal_escape_flagged() {
        let mut lexer = Lexer::new(r"'\07'");
        let token = lexer.next_token().unwrap();
        assert!(token.strict_violation.is_some());
    }

    #[test]
    fn test_lexer_unterminated_string_is_fatal() {
        let mut lexer = Lexer::new("'abc");
        let err = lexer.next_token().unwrap_err();
        assert!(err.is(core_types::ErrorKind::LexicalError));
        let mut lexer = Lexer::new("/* never closed");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_lexer_line_before_flag() {
        let mut lexer = Lexer::new("a\nb /*\n*/ c d");
        assert!(!lexer.next_token().unwrap().line_before);
        assert!(lexer.next_token().unwrap().line_before);
        assert!(lexer.next_token().unwrap().line_before);
        assert!(!lexer.next_token().unwrap().line_before);
    }

    #[test]
    fn test_lexer_punctuators_longest_match() {
        let toks = tokens(">>>= === !== => ... ++ &&");
        let expected = [
            Punctuator::GtGtGtEq,
            Punctuator::EqEqEq,
            Punctuator::NotEqEq,
            Punctuator::Arrow,
            Punctuator::Spread,
            Punctuator::PlusPlus,
            Punctuator::AndAnd,
        ];
        for (tok, p) in toks.iter().zip(expected.iter()) {
            assert_eq!(tok, &TokenKind::Punctuator(*p));
        }
    }

    #[test]
    fn test_lexer_regexp_rescan() {
        let mut lexer = Lexer::new("/[/]a\\/b/gi x");
        let slash = lexer.next_token().unwrap();
        assert!(slash.is_punctuator(Punctuator::Slash));
        let regexp = lexer.rescan_regexp(slash).unwrap();
        match regexp.kind {
            TokenKind::RegExp { pattern, flags } => {
                assert_eq!(pattern, "[/]a\\/b");
                assert_eq!(flags, "gi");
            }
            other => panic!("expected regexp, got {:?}", other),
        }
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Identifier(_)));
    }

    #[test]
    fn test_lexer_template_parts() {
        let mut lexer = Lexer::new("`a${x}b\\n`");
        let head = lexer.next_token().unwrap();
        assert!(matches!(&head.kind, TokenKind::Template(p) if p.cooked == "a" && !p.tail));
        lexer.next_token().unwrap();
        let brace = lexer.next_token().unwrap();
        assert!(brace.is_punctuator(Punctuator::RBrace));
        let tail = lexer.rescan_template_tail(brace).unwrap();
        match tail.kind {
            TokenKind::Template(part) => {
                assert!(part.tail);
                assert_eq!(part.cooked, "b\n");
                assert_eq!(part.raw, "b\\n");
            }
            other => panic!("expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_lexer_tolerant_skips_illegal_character() {
        let mut lexer = Lexer::new("a @ b").with_context(Context::new(true));
        lexer.next_token().unwrap();
        let b = lexer.next_token().unwrap();
        assert!(matches!(&b.kind, TokenKind::Identifier(n) if n == "b"));
        assert_eq!(lexer.context().errors().len(), 1);

        let mut strict = Lexer::new("@");
        assert!(strict.next_token().is_err());
    }

    #[test]
    fn test_lexer_comments_retained() {
        let mut lexer = Lexer::new("// hi\n/* there */ x").with_comments(true);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.comments.len(), 2);
        assert_eq!(token.comments[0].text, " hi");
        assert_eq!(token.comments[1].kind, CommentKind::Block);
    }

    #[test]
    fn test_lexer_reset_backtracks() {
        let mut lexer = Lexer::new("(a, b) => a");
        let open = lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.reset(open.range.start);
        assert!(lexer.next_token().unwrap().is_punctuator(Punctuator::LParen));
    }

    #[test]
    fn test_lexer_hashbang_skipped() {
        let toks = tokens("#!/usr/bin/env node\nx");
        assert_eq!(toks.len(), 1);
    }
}
