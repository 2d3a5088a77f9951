//! docmeta-tree: output document tree and writers for docmeta
//!
//! This crate provides:
//! - The category-grouped document tree (`root → category → type → member`)
//! - Serialization to XML and JSON
//!
//! ## Example
//!
//! ```rust
//! use docmeta_tree::{CategoryNode, Document, TypeNode, WriterOptions, document_to_xml};
//!
//! let mut ty = TypeNode::new("Color", "com.acme.ColorImpl");
//! ty.scripting_name = Some("color".to_string());
//! let doc = Document::new(vec![CategoryNode::new("utility", vec![ty])]);
//!
//! let xml = document_to_xml(&doc, &WriterOptions::default()).unwrap();
//! assert!(xml.contains(r#"<object publicName="Color""#));
//! ```

pub mod tree;
pub mod writer;

pub use tree::{
    CategoryNode, Document, MemberDoc, MemberGroup, MemberKind, MemberNode, ParameterNode,
    ReturnNode, TypeNode, TypeRef,
};
pub use writer::{WriteError, WriterOptions, document_to_json, document_to_xml};
