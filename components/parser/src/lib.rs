//! JavaScript front end
//!
//! Turns source text into a typed syntax tree and annotates it with scope
//! information for the optimizer.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes source code, including regular expression and
//!   template rescanning driven by the parser
//! - [`Parser`] - Recursive descent parser with automatic semicolon
//!   insertion and deferred strict-mode checks
//! - [`Node`] - Syntax tree node; [`NodeKind`] holds one variant per kind
//! - [`Visitor`] - Enter/leave traversal with in-place node replacement
//! - [`ScopeAnalysis`] - Binds every identifier to a symbol in a [`ScopeTree`]
//!
//! # Example
//!
//! ```
//! use parser::{parse_script, ScopeAnalysis};
//!
//! let mut program = parse_script("var x = 1; function f(y) { return x + y; }").unwrap();
//! let scopes = ScopeAnalysis::analyze(&mut program).unwrap();
//! assert_eq!(scopes.scopes().len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod unicode;
pub mod visitor;

pub use ast::{Node, NodeKind, NodeType, SourceType};
pub use lexer::{Comment, Keyword, Lexer, Punctuator, Token, TokenKind};
pub use parser::{parse_module, parse_script, Parser};
pub use scope::{ScopeAnalysis, ScopeId, ScopeKind, ScopeTree, SymbolId, SymbolKind};
pub use visitor::{apply, traverse, Visitor};
