//! doc-tags: Parser for `@tag` structured documentation comments
//!
//! This crate provides:
//! - Position-tracking lexer for comment bodies
//! - Recursive descent parser producing a tag tree
//! - Cross-reference parsing (`Type#member(args)`)
//! - The warning taxonomy shared by the whole documentation pipeline
//!
//! # Example
//!
//! ```
//! use doc_tags::{parse, TagSet};
//!
//! let parsed = parse("Draws a line. @sample doLine();", &TagSet::default());
//! assert_eq!(parsed.root.content_text(), "Draws a line.");
//! assert_eq!(parsed.root.to_source(), "Draws a line. @sample doLine();");
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod reference;

// Re-export main types for convenient access
pub use ast::{DocNode, Qualification, ReferenceLeaf, TagForm, TagNode, TextLeaf};
pub use diagnostics::{Warning, WarningKind, Warnings};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParsedComment, Parser, TagKind, TagSet, parse, parse_at};
pub use reference::{ParsedReference, parse_reference};
