//! Documentation extraction
//!
//! Turns a parsed comment tree into the flat [`ResolvedDoc`] view plus the
//! redirection references that still have to be followed.

use doc_tags::{ReferenceLeaf, TagNode, Warnings};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub const TAG_SAMPLE: &str = "sample";
pub const TAG_PARAM: &str = "param";
pub const TAG_RETURN: &str = "return";
pub const TAG_SINCE: &str = "since";
pub const TAG_UNTIL: &str = "until";
pub const TAG_DEPRECATED: &str = "deprecated";
pub const TAG_LINK: &str = "link";
pub const TAG_SEE: &str = "see";
pub const TAG_SPECIAL: &str = "special";
pub const TAG_SAME_AS: &str = "sameas";
pub const TAG_SAMPLE_AS: &str = "sampleas";
pub const TAG_CLONE_DESC: &str = "clonedesc";

/// `[{Type}] name [description]` or `[{Type}] [name] [description]`
static RE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\{(?P<type>[^}]*)\}\s*)?(?:\[(?P<optional>[^\]\s]+)\]|(?P<name>[^\s\[{]+))(?:\s+(?P<rest>[\s\S]*))?$")
        .unwrap()
});

/// The documentation of one member, ready for output
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDoc {
    pub text: String,
    pub summary: Option<String>,
    pub sample: Option<String>,
    pub params: Vec<ParamDoc>,
    pub returns: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub special: bool,
    pub links: Vec<String>,
    pub deprecated: Option<String>,
}

/// A documented parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDoc {
    pub name: String,
    pub optional: bool,
    pub description: Option<String>,
    /// Type named in the tag (`@param {String} name`)
    pub type_hint: Option<String>,
}

/// Redirection references found in a comment
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Redirects {
    pub same_as: Option<ReferenceLeaf>,
    pub sample_as: Option<ReferenceLeaf>,
    pub clone_desc: Option<ReferenceLeaf>,
}

impl Redirects {
    pub fn is_empty(&self) -> bool {
        self.same_as.is_none() && self.sample_as.is_none() && self.clone_desc.is_none()
    }
}

/// Documentation before redirections are followed
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDoc {
    pub doc: ResolvedDoc,
    pub redirects: Redirects,
}

/// Extract the documentation view of a comment
///
/// Returns `None` when the comment holds nothing but whitespace.
pub fn extract(root: &TagNode, location: &str, warnings: &mut Warnings) -> Option<ExtractedDoc> {
    if root.is_empty() {
        return None;
    }

    let text = root.content_text();
    let single = |name: &str, allow_empty: bool, warnings: &mut Warnings| {
        root.single_tag(name, allow_empty, location, warnings)
            .map(TagNode::content_text)
    };

    let doc = ResolvedDoc {
        summary: summary(&text),
        sample: single(TAG_SAMPLE, false, warnings),
        params: root
            .tags(TAG_PARAM)
            .filter_map(|tag| parse_param(&tag.content_text()))
            .collect(),
        returns: single(TAG_RETURN, false, warnings),
        since: single(TAG_SINCE, false, warnings),
        until: single(TAG_UNTIL, false, warnings),
        special: root.has_tag(TAG_SPECIAL),
        links: root
            .tags(TAG_LINK)
            .chain(root.tags(TAG_SEE))
            .map(TagNode::content_text)
            .filter(|link| !link.is_empty())
            .collect(),
        deprecated: single(TAG_DEPRECATED, true, warnings),
        text,
    };

    // Reference tags already reported empty content while parsing
    let reference = |name: &str, warnings: &mut Warnings| {
        root.single_tag(name, true, location, warnings)
            .and_then(TagNode::reference)
            .cloned()
    };
    let redirects = Redirects {
        same_as: reference(TAG_SAME_AS, warnings),
        sample_as: reference(TAG_SAMPLE_AS, warnings),
        clone_desc: reference(TAG_CLONE_DESC, warnings),
    };

    Some(ExtractedDoc { doc, redirects })
}

/// Text up to and including the first sentence terminator
///
/// A terminator is `.`, `!` or `?` followed by whitespace or the end of
/// the text. Without one the whole text is the summary.
pub fn summary(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|&(_, next)| next.is_whitespace())
        {
            return Some(text[..i + c.len_utf8()].to_string());
        }
    }
    Some(text.to_string())
}

fn parse_param(content: &str) -> Option<ParamDoc> {
    let caps = RE_PARAM.captures(content)?;
    let (name, mut optional) = match (caps.name("optional"), caps.name("name")) {
        (Some(m), _) => (m.as_str(), true),
        (None, Some(m)) => (m.as_str(), false),
        (None, None) => return None,
    };

    let mut rest = caps.name("rest").map_or("", |m| m.as_str()).trim();
    if let Some(after) = rest.strip_prefix("optional")
        && after.chars().next().is_none_or(char::is_whitespace)
    {
        optional = true;
        rest = after.trim_start();
    }

    Some(ParamDoc {
        name: name.to_string(),
        optional,
        description: (!rest.is_empty()).then(|| rest.to_string()),
        type_hint: caps
            .name("type")
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty()),
    })
}
