//! Doc comment tree types
//!
//! A parsed comment is a [`TagNode`] with the reserved name
//! [`TagNode::ROOT`]. Its children are the free text of the comment
//! followed by the block tags (`@sample`, `@param`, ...), which in turn
//! hold text, inline tags (`{@see ...}`) and references.

use crate::diagnostics::{WarningKind, Warnings};
use crate::lexer::Span;
use serde::{Deserialize, Serialize};

/// A node in the doc comment tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocNode {
    /// Literal text, whitespace included
    Text(TextLeaf),
    /// A parsed cross-reference (`Type#member(args)`)
    Reference(ReferenceLeaf),
    /// A tag with nested content
    Tag(TagNode),
}

/// Literal text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLeaf {
    pub text: String,
    pub span: Span,
}

/// How much of the owning type a reference spells out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Qualification {
    /// No owning type (`#member` or `member`)
    None,
    /// Owning type without package (`Type#member`)
    SimpleName,
    /// Fully qualified owning type (`pkg.Type#member`)
    FullName,
}

/// A parsed cross-reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceLeaf {
    /// Owning type as written, if any
    pub owner: Option<String>,
    pub member: String,
    /// Parameter types as written; `None` when no parentheses were given
    pub params: Option<Vec<String>>,
    pub qualification: Qualification,
    /// Source text of the reference
    pub raw: String,
    pub span: Span,
}

impl ReferenceLeaf {
    /// The member signature as written (`name` or `name(T1,T2)`)
    pub fn signature(&self) -> String {
        match &self.params {
            Some(params) => format!("{}({})", self.member, params.join(",")),
            None => self.member.clone(),
        }
    }
}

/// Where a tag appears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagForm {
    /// The comment itself
    Root,
    /// `@name ...` running to the next block tag
    Block,
    /// `{@name ...}`; `closed` is false when input ended before the brace
    Inline { closed: bool },
}

/// A tag with nested content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagNode {
    pub name: String,
    pub form: TagForm,
    pub children: Vec<DocNode>,
    pub span: Span,
}

impl TagNode {
    /// Reserved name of the free-text root node
    pub const ROOT: &'static str = "#text";

    pub fn root(children: Vec<DocNode>, span: Span) -> Self {
        Self {
            name: Self::ROOT.to_string(),
            form: TagForm::Root,
            children,
            span,
        }
    }

    pub fn is_root(&self) -> bool {
        self.form == TagForm::Root
    }

    /// Rebuild the exact source text this node was parsed from
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    fn write_source(&self, out: &mut String) {
        match self.form {
            TagForm::Root => {}
            TagForm::Block => {
                out.push('@');
                out.push_str(&self.name);
            }
            TagForm::Inline { .. } => {
                out.push_str("{@");
                out.push_str(&self.name);
            }
        }
        for child in &self.children {
            child.write_source(out);
        }
        if let TagForm::Inline { closed: true } = self.form {
            out.push('}');
        }
    }

    /// Readable text of this node, block tags excluded
    ///
    /// References render as written and inline tags as their trimmed
    /// content. The result is not trimmed.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                DocNode::Text(t) => out.push_str(&t.text),
                DocNode::Reference(r) => out.push_str(&r.raw),
                DocNode::Tag(tag) if tag.form == TagForm::Block => {}
                DocNode::Tag(tag) => out.push_str(tag.plain_text().trim()),
            }
        }
        out
    }

    /// Trimmed readable text
    pub fn content_text(&self) -> String {
        self.plain_text().trim().to_string()
    }

    /// Whether the tag carries nothing but whitespace
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|child| match child {
            DocNode::Text(t) => t.text.trim().is_empty(),
            _ => false,
        })
    }

    /// Direct child tags with the given name, in source order
    pub fn tags<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a TagNode> + use<'a, 'n> {
        self.children.iter().filter_map(move |child| match child {
            DocNode::Tag(tag) if tag.name == name => Some(tag),
            _ => None,
        })
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags(name).next().is_some()
    }

    /// Grab exactly one tag
    ///
    /// Takes the first occurrence. More than one occurrence records a
    /// `MultipleTags` warning; an empty first occurrence records `EmptyTag`
    /// unless `allow_empty` is set.
    pub fn single_tag(
        &self,
        name: &str,
        allow_empty: bool,
        location: &str,
        warnings: &mut Warnings,
    ) -> Option<&TagNode> {
        let mut found = self.tags(name);
        let first = found.next()?;
        let extra = found.count();
        if extra > 0 {
            warnings.add(
                WarningKind::MultipleTags,
                location,
                format!("@{} appears {} times, using the first one", name, extra + 1),
            );
        }
        if !allow_empty && first.is_empty() {
            warnings.add(
                WarningKind::EmptyTag,
                location,
                format!("@{} has no content", name),
            );
        }
        Some(first)
    }

    /// First reference held directly by this tag
    pub fn reference(&self) -> Option<&ReferenceLeaf> {
        self.children.iter().find_map(|child| match child {
            DocNode::Reference(r) => Some(r),
            _ => None,
        })
    }

    /// Merge adjacent text leaves, recursively
    pub fn compress(&mut self) {
        let mut merged: Vec<DocNode> = Vec::with_capacity(self.children.len());
        for child in std::mem::take(&mut self.children) {
            match child {
                DocNode::Text(next) => {
                    if let Some(DocNode::Text(prev)) = merged.last_mut() {
                        prev.text.push_str(&next.text);
                        prev.span = prev.span.merge(next.span);
                    } else {
                        merged.push(DocNode::Text(next));
                    }
                }
                DocNode::Tag(mut tag) => {
                    tag.compress();
                    merged.push(DocNode::Tag(tag));
                }
                other => merged.push(other),
            }
        }
        self.children = merged;
    }
}

impl DocNode {
    pub fn text(text: impl Into<String>, span: Span) -> Self {
        DocNode::Text(TextLeaf {
            text: text.into(),
            span,
        })
    }

    pub fn span(&self) -> Span {
        match self {
            DocNode::Text(t) => t.span,
            DocNode::Reference(r) => r.span,
            DocNode::Tag(t) => t.span,
        }
    }

    /// Rebuild the exact source text of this node
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    fn write_source(&self, out: &mut String) {
        match self {
            DocNode::Text(t) => out.push_str(&t.text),
            DocNode::Reference(r) => out.push_str(&r.raw),
            DocNode::Tag(tag) => tag.write_source(out),
        }
    }
}

#[cfg(feature = "json")]
impl TagNode {
    /// Serialize the tree to a pretty-printed JSON string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> DocNode {
        DocNode::text(s, Span::default())
    }

    fn block(name: &str, children: Vec<DocNode>) -> DocNode {
        DocNode::Tag(TagNode {
            name: name.to_string(),
            form: TagForm::Block,
            children,
            span: Span::default(),
        })
    }

    #[test]
    fn test_compress_merges_adjacent_text() {
        let mut root = TagNode::root(
            vec![text("a"), text(" "), text("b"), block("since", vec![text(" 1"), text(".0")])],
            Span::default(),
        );
        root.compress();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0], text("a b"));
        if let DocNode::Tag(tag) = &root.children[1] {
            assert_eq!(tag.children, vec![text(" 1.0")]);
        } else {
            panic!("expected tag, got {:?}", root.children[1]);
        }
    }

    #[test]
    fn test_plain_text_skips_block_tags() {
        let root = TagNode::root(
            vec![text("Hello. "), block("sample", vec![text(" x();")])],
            Span::default(),
        );
        assert_eq!(root.plain_text(), "Hello. ");
        assert_eq!(root.content_text(), "Hello.");
    }

    #[test]
    fn test_reference_signature() {
        let r = ReferenceLeaf {
            owner: Some("B".to_string()),
            member: "bar".to_string(),
            params: Some(vec!["int".to_string(), "String".to_string()]),
            qualification: Qualification::SimpleName,
            raw: "B#bar(int, String)".to_string(),
            span: Span::default(),
        };
        assert_eq!(r.signature(), "bar(int,String)");
    }

    #[test]
    fn test_single_tag_warnings() {
        let root = TagNode::root(
            vec![block("return", vec![text(" ")]), block("return", vec![text(" x")])],
            Span::default(),
        );
        let mut warnings = Warnings::new();
        let tag = root.single_tag("return", false, "T#m()", &mut warnings);
        assert!(tag.is_some_and(TagNode::is_empty));
        assert_eq!(warnings.count(WarningKind::MultipleTags), 1);
        assert_eq!(warnings.count(WarningKind::EmptyTag), 1);

        let mut warnings = Warnings::new();
        assert!(root.single_tag("sample", false, "T#m()", &mut warnings).is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_found_tag_outlives_the_name() {
        let root = TagNode::root(vec![block("since", vec![text(" 1.0")])], Span::default());
        let mut warnings = Warnings::new();
        let since = {
            let name = String::from("since");
            root.single_tag(&name, false, "T#m()", &mut warnings)
        };
        assert_eq!(since.map(TagNode::content_text).as_deref(), Some("1.0"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_serialize_reference_leaf() {
        let parsed = crate::parser::parse("@sameas com.acme.B#bar(int)", &Default::default());
        let same = parsed.root.tags("sameas").next().unwrap();
        let json = serde_json::to_value(same).unwrap();

        assert_eq!(json["name"], "sameas");
        assert_eq!(json["form"], "block");
        let reference = &json["children"][1]["reference"];
        assert_eq!(reference["owner"], "com.acme.B");
        assert_eq!(reference["member"], "bar");
        assert_eq!(reference["params"], serde_json::json!(["int"]));
        assert_eq!(reference["qualification"], "fullName");
        assert_eq!(reference["raw"], "com.acme.B#bar(int)");

        let back: TagNode = serde_json::from_value(json).unwrap();
        assert_eq!(&back, same);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_to_json_pretty() {
        let root = TagNode::root(vec![text("Hello.")], Span::default());
        let json = root.to_json_pretty().unwrap();
        assert!(json.contains("\"name\": \"#text\""));
        assert!(json.contains("\"text\": \"Hello.\""));
    }
}
