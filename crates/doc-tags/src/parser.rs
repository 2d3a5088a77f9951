//! Doc comment parser
//!
//! Recursive descent parser that turns the token stream of one comment into
//! a [`TagNode`] tree. Parsing never fails: malformed content is kept as
//! text and reported through [`Warnings`].

use crate::ast::{DocNode, ReferenceLeaf, TagForm, TagNode, TextLeaf};
use crate::diagnostics::{WarningKind, Warnings};
use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::reference::{PUNCTUATION, parse_reference};
use std::collections::HashMap;

/// How a recognized tag treats its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Free text
    Text,
    /// Presence is all that matters (`@special`)
    Flag,
    /// `@param [{Type}] name [optional] description`
    Param,
    /// Content starts with a cross-reference; `required` tags warn when it is absent
    Reference { required: bool },
}

/// The tags a parser recognizes
///
/// Unrecognized `@words` stay literal text.
#[derive(Debug, Clone)]
pub struct TagSet {
    tags: HashMap<String, TagKind>,
}

impl TagSet {
    /// A set recognizing no tags at all
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }

    pub fn with(mut self, name: &str, kind: TagKind) -> Self {
        self.insert(name, kind);
        self
    }

    pub fn insert(&mut self, name: &str, kind: TagKind) {
        self.tags.insert(name.to_string(), kind);
    }

    pub fn get(&self, name: &str) -> Option<TagKind> {
        self.tags.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::empty()
            .with("sample", TagKind::Text)
            .with("param", TagKind::Param)
            .with("return", TagKind::Text)
            .with("since", TagKind::Text)
            .with("until", TagKind::Text)
            .with("deprecated", TagKind::Text)
            .with("link", TagKind::Text)
            .with("special", TagKind::Flag)
            .with("see", TagKind::Reference { required: false })
            .with("sameas", TagKind::Reference { required: true })
            .with("sampleas", TagKind::Reference { required: true })
            .with("clonedesc", TagKind::Reference { required: true })
    }
}

/// A parsed comment together with the problems found while parsing it
#[derive(Debug, Clone)]
pub struct ParsedComment {
    pub root: TagNode,
    pub warnings: Warnings,
}

/// Where the content loop is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Comment body or block tag: stops at the next recognized block tag
    Block,
    /// Inline tag: stops at its closing brace
    Inline,
}

/// Doc comment parser
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    tags: &'a TagSet,
    location: String,
    warnings: Warnings,
}

impl<'a> Parser<'a> {
    /// Create a new parser from comment text
    pub fn new(source: &'a str, tags: &'a TagSet) -> Self {
        Self {
            source,
            tokens: Lexer::tokenize(source),
            pos: 0,
            tags,
            location: String::new(),
            warnings: Warnings::new(),
        }
    }

    /// Location reported in warnings (e.g. `pkg.Type#member()`)
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Parse the entire comment
    pub fn parse(mut self) -> ParsedComment {
        let mut children = self.parse_content(Context::Block);

        while let TokenKind::BlockTag(name) = self.peek_kind() {
            let tag = self.parse_tag(name, TagForm::Block);
            children.push(DocNode::Tag(tag));
        }

        let mut root = TagNode::root(children, Span::new(0, self.source.len(), 1, 1));
        root.compress();

        ParsedComment {
            root,
            warnings: self.warnings,
        }
    }

    /// Parse mixed content until the context ends
    fn parse_content(&mut self, context: Context) -> Vec<DocNode> {
        let mut nodes = Vec::new();
        // Plain braces opened inside an inline tag
        let mut depth = 0usize;

        loop {
            let token = self.peek().clone();
            match &token.kind {
                TokenKind::Eof => break,
                TokenKind::BlockTag(name) => {
                    if context == Context::Block && self.tags.contains(name) {
                        break;
                    }
                    nodes.push(self.literal(&token));
                }
                TokenKind::InlineTag(name) if self.tags.contains(name) => {
                    let tag = self.parse_tag(name.clone(), TagForm::Inline { closed: false });
                    nodes.push(DocNode::Tag(tag));
                }
                TokenKind::InlineTag(_) | TokenKind::OpenBrace => {
                    depth += 1;
                    nodes.push(self.literal(&token));
                }
                TokenKind::CloseBrace => {
                    if context == Context::Inline {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    }
                    nodes.push(self.literal(&token));
                }
                TokenKind::Text(_) | TokenKind::Whitespace(_) | TokenKind::Newline => {
                    nodes.push(self.literal(&token));
                }
            }
        }

        nodes
    }

    /// Parse a block or inline tag whose marker is the current token
    fn parse_tag(&mut self, name: String, form: TagForm) -> TagNode {
        let start = self.advance().span;

        let (children, form) = match form {
            TagForm::Inline { .. } => {
                let children = self.parse_content(Context::Inline);
                let closed = self.check_close_brace();
                if closed {
                    self.advance();
                } else {
                    self.warnings.add(
                        WarningKind::Other,
                        &self.location,
                        format!("inline tag {{@{}}} is not closed", name),
                    );
                }
                (children, TagForm::Inline { closed })
            }
            form => (self.parse_content(Context::Block), form),
        };

        let end = self.previous_end().max(start.end);
        let mut tag = TagNode {
            name,
            form,
            children,
            span: Span::new(start.start, end, start.line, start.column),
        };
        tag.compress();
        self.apply_tag_kind(&mut tag);
        tag
    }

    /// Check tag content against the tag's declared kind
    fn apply_tag_kind(&mut self, tag: &mut TagNode) {
        match self.tags.get(&tag.name) {
            Some(TagKind::Param) if tag.is_empty() => {
                self.warnings.add(
                    WarningKind::ParamTagWithoutContent,
                    &self.location,
                    "@param without a parameter name",
                );
            }
            Some(TagKind::Reference { required }) => self.attach_reference(tag, required),
            _ => {}
        }
    }

    /// Split the leading reference of a reference tag into a [`ReferenceLeaf`]
    fn attach_reference(&mut self, tag: &mut TagNode, required: bool) {
        let first = match tag.children.first() {
            Some(DocNode::Text(text)) => text.clone(),
            Some(_) => {
                if required {
                    self.warnings.add(
                        WarningKind::MissingTag,
                        &self.location,
                        format!("@{} must start with a member reference", tag.name),
                    );
                }
                return;
            }
            None => {
                if required {
                    self.warnings.add(
                        WarningKind::EmptyTag,
                        &self.location,
                        format!("@{} needs a member reference", tag.name),
                    );
                }
                return;
            }
        };

        let body = first.text.trim_start();
        let lead = first.text.len() - body.len();

        let Some(parsed) = parse_reference(body) else {
            if required {
                let (kind, message) = if body.trim().is_empty() {
                    (WarningKind::EmptyTag, format!("@{} needs a member reference", tag.name))
                } else {
                    (
                        WarningKind::MissingTag,
                        format!(
                            "@{} expects a member reference, found `{}`",
                            tag.name,
                            body.trim()
                        ),
                    )
                };
                self.warnings.add(kind, &self.location, message);
            }
            return;
        };

        let base = first.span.start;
        let rest = &body[parsed.len..];
        if required {
            let mut ignored = rest.to_string();
            for child in &tag.children[1..] {
                ignored.push_str(&child.to_source());
            }
            let ignored = ignored.trim();
            let ignored = ignored.strip_prefix(PUNCTUATION).unwrap_or(ignored).trim();
            if !ignored.is_empty() {
                self.warnings.add(
                    WarningKind::TooMuchContentForTag,
                    &self.location,
                    format!("@{} takes a single reference, ignoring `{}`", tag.name, ignored),
                );
            }
        }

        let mut replaced = Vec::with_capacity(3);
        if lead > 0 {
            replaced.push(DocNode::Text(TextLeaf {
                text: first.text[..lead].to_string(),
                span: self.span_of(base, base + lead),
            }));
        }
        let ref_start = base + lead;
        replaced.push(DocNode::Reference(ReferenceLeaf {
            owner: parsed.owner,
            member: parsed.member,
            params: parsed.params,
            qualification: parsed.qualification,
            raw: body[..parsed.len].to_string(),
            span: self.span_of(ref_start, ref_start + parsed.len),
        }));
        if !rest.is_empty() {
            let rest_start = ref_start + parsed.len;
            replaced.push(DocNode::Text(TextLeaf {
                text: rest.to_string(),
                span: self.span_of(rest_start, first.span.end),
            }));
        }

        tag.children.splice(0..1, replaced);
    }

    /// Literal text node for a token, taken verbatim from the source
    fn literal(&mut self, token: &Token) -> DocNode {
        self.advance();
        DocNode::text(token.span.slice(self.source), token.span)
    }

    /// Build a span with line/column computed from the source
    fn span_of(&self, start: usize, end: usize) -> Span {
        let before = &self.source[..start];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = self.source[line_start..start].chars().count() + 1;
        Span::new(start, end, line, column)
    }

    // Token navigation

    fn peek(&self) -> &Token {
        // The token stream always ends with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind.clone()
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .map(|i| self.tokens[i].span.end)
            .unwrap_or(0)
    }

    fn check_close_brace(&self) -> bool {
        self.peek().kind == TokenKind::CloseBrace
    }
}

/// Convenience function to parse a comment with a tag set
pub fn parse(source: &str, tags: &TagSet) -> ParsedComment {
    Parser::new(source, tags).parse()
}

/// Parse a comment, attributing warnings to `location`
pub fn parse_at(source: &str, tags: &TagSet, location: &str) -> ParsedComment {
    Parser::new(source, tags).with_location(location).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Qualification;

    fn parse_default(source: &str) -> ParsedComment {
        parse_at(source, &TagSet::default(), "T#m()")
    }

    fn tag<'a>(root: &'a TagNode, name: &str) -> &'a TagNode {
        root.tags(name)
            .next()
            .unwrap_or_else(|| panic!("missing @{} in {:?}", name, root))
    }

    #[test]
    fn test_empty_comment() {
        let parsed = parse_default("");
        assert!(parsed.root.children.is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_text_and_sample() {
        let parsed = parse_default("Draws a line. @sample doLine();");
        let root = &parsed.root;
        assert_eq!(root.content_text(), "Draws a line.");
        assert_eq!(tag(root, "sample").content_text(), "doLine();");
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_block_tag_runs_to_next_block_tag() {
        let parsed = parse_default("x\n@return the value\nover lines\n@since 2.0");
        let root = &parsed.root;
        assert_eq!(tag(root, "return").content_text(), "the value\nover lines");
        assert_eq!(tag(root, "since").content_text(), "2.0");
    }

    #[test]
    fn test_unknown_tags_stay_text() {
        let parsed = parse_default("Use @Override carefully. @sample a();");
        assert_eq!(parsed.root.content_text(), "Use @Override carefully.");
        assert_eq!(parsed.root.children.len(), 2);
    }

    #[test]
    fn test_inline_tag_nested_in_block_tag() {
        let parsed = parse_default("@return a {@see Color#rgb() color} value");
        let ret = tag(&parsed.root, "return");
        assert_eq!(ret.content_text(), "a Color#rgb() color value");
        let inline = ret
            .children
            .iter()
            .find_map(|c| match c {
                DocNode::Tag(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(inline.form, TagForm::Inline { closed: true });
        let r = inline.reference().unwrap();
        assert_eq!(r.owner.as_deref(), Some("Color"));
        assert_eq!(r.qualification, Qualification::SimpleName);
    }

    #[test]
    fn test_block_marker_inside_inline_tag_is_text() {
        let parsed = parse_default("a {@see x @since 1} b");
        assert!(!parsed.root.has_tag("since"));
        assert_eq!(parsed.root.content_text(), "a x @since 1 b");
    }

    #[test]
    fn test_braces_inside_inline_tag() {
        let parsed = parse_default("{@link {a} b} after");
        let inline = match &parsed.root.children[0] {
            DocNode::Tag(t) => t,
            other => panic!("expected inline tag, got {:?}", other),
        };
        assert_eq!(inline.content_text(), "{a} b");
        assert_eq!(parsed.root.to_source(), "{@link {a} b} after");
    }

    #[test]
    fn test_unclosed_inline_tag() {
        let parsed = parse_default("text {@see Foo");
        assert_eq!(parsed.warnings.count(WarningKind::Other), 1);
        assert_eq!(parsed.root.to_source(), "text {@see Foo");
    }

    #[test]
    fn test_sameas_reference() {
        let parsed = parse_default("@sameas B#bar()");
        let same = tag(&parsed.root, "sameas");
        let r = same.reference().unwrap();
        assert_eq!(r.owner.as_deref(), Some("B"));
        assert_eq!(r.member, "bar");
        assert_eq!(r.params, Some(vec![]));
        assert_eq!(r.raw, "B#bar()");
        assert_eq!(r.span, Span::new(8, 15, 1, 9));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_sameas_reference_ending_a_sentence() {
        let parsed = parse_default("@sameas B#bar().");
        assert!(parsed.warnings.is_empty(), "{}", parsed.warnings.report());
        let same = tag(&parsed.root, "sameas");
        assert_eq!(same.reference().unwrap().raw, "B#bar()");
        assert_eq!(parsed.root.to_source(), "@sameas B#bar().");

        let parsed = parse_default("@sameas B#bar(). See also");
        assert_eq!(parsed.warnings.count(WarningKind::TooMuchContentForTag), 1);
    }

    #[test]
    fn test_required_reference_missing() {
        let parsed = parse_default("@sampleas http://x");
        assert_eq!(parsed.warnings.count(WarningKind::MissingTag), 1);
        assert!(tag(&parsed.root, "sampleas").reference().is_none());

        let parsed = parse_default("@clonedesc");
        assert_eq!(parsed.warnings.count(WarningKind::EmptyTag), 1);
    }

    #[test]
    fn test_required_reference_with_extra_content() {
        let parsed = parse_default("@sameas a#b() c#d()");
        assert_eq!(parsed.warnings.count(WarningKind::TooMuchContentForTag), 1);
        let w = parsed.warnings.iter().next().unwrap();
        assert_eq!(w.message, "@sameas takes a single reference, ignoring `c#d()`");
        assert_eq!(
            tag(&parsed.root, "sameas").reference().unwrap().signature(),
            "b()"
        );
    }

    #[test]
    fn test_optional_reference_without_match_is_silent() {
        let parsed = parse_default("@see http://example.com");
        assert!(parsed.warnings.is_empty());
        assert!(tag(&parsed.root, "see").reference().is_none());
    }

    #[test]
    fn test_param_without_content() {
        let parsed = parse_default("@param\n@param x the x");
        assert_eq!(parsed.warnings.count(WarningKind::ParamTagWithoutContent), 1);
        assert_eq!(parsed.root.tags("param").count(), 2);
    }

    #[test]
    fn test_round_trip_preserves_whitespace() {
        let sources = [
            "Draws a line. @sample doLine();",
            "  leading and trailing  \n\n@param  x   the x\r\n@return {@see Foo#bar(int,  String) bar}  ",
            "@sameas   B#bar()   \n",
            "text { not a tag } @ lonely at mail@example.com",
            "@special\n@deprecated use {@link other} instead\t",
        ];
        for source in sources {
            let parsed = parse_default(source);
            assert_eq!(parsed.root.to_source(), source, "round trip of {:?}", source);
        }
    }

    #[test]
    fn test_custom_tag_set() {
        let tags = TagSet::empty().with("note", TagKind::Text);
        let parsed = parse("Body @note remember @sample x", &tags);
        assert_eq!(parsed.root.tags("note").count(), 1);
        assert_eq!(
            tag(&parsed.root, "note").content_text(),
            "remember @sample x"
        );
    }
}
