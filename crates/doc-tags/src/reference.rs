//! Cross-reference syntax: `[Type#]member[(T1, T2, ...)]`

use crate::ast::Qualification;
use regex::Regex;
use std::sync::LazyLock;

static RE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(?P<owner>[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)?#)?",
        r"(?P<member>[A-Za-z_$][\w$]*)",
        r"(?:\((?P<params>[^()]*)\))?",
    ))
    .unwrap()
});

/// The pieces of a reference found at the start of some text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub owner: Option<String>,
    pub member: String,
    pub params: Option<Vec<String>>,
    pub qualification: Qualification,
    /// Byte length of the reference in the input
    pub len: usize,
}

/// Match a reference at the start of `text`
///
/// The reference must be followed by whitespace or the end of the text,
/// so `http://example.com` is not mistaken for a member called `http`.
/// Sentence punctuation (`.`, `,` or `;`) may sit in between; it is not
/// part of the reference.
pub fn parse_reference(text: &str) -> Option<ParsedReference> {
    let caps = RE_REFERENCE.captures(text)?;
    let len = caps.get(0)?.end();
    if !is_terminated(&text[len..]) {
        return None;
    }

    let owner = caps
        .name("owner")
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty());
    let qualification = match &owner {
        None => Qualification::None,
        Some(o) if o.contains('.') => Qualification::FullName,
        Some(_) => Qualification::SimpleName,
    };
    let params = caps.name("params").map(|m| split_params(m.as_str()));

    Some(ParsedReference {
        owner,
        member: caps["member"].to_string(),
        params,
        qualification,
        len,
    })
}

/// Punctuation allowed right after a reference
pub const PUNCTUATION: [char; 3] = ['.', ',', ';'];

fn is_terminated(rest: &str) -> bool {
    let rest = rest.strip_prefix(PUNCTUATION).unwrap_or(rest);
    rest.chars().next().is_none_or(char::is_whitespace)
}

fn split_params(params: &str) -> Vec<String> {
    params
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
