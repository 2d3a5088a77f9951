//! Output document tree
//!
//! The shape is `root → category → type → {constants|properties|constructors|functions} → member`.

use serde::{Deserialize, Serialize};

/// Root of the generated document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub categories: Vec<CategoryNode>,
}

/// A category and the documented types filed under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    pub types: Vec<TypeNode>,
}

/// A documented type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeNode {
    pub public_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripting_name: Option<String>,
    pub qualified_name: String,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends_component: Option<String>,
    /// Type-level description, when the type itself is documented
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Non-empty member groups, in [`MemberKind::ALL`] order
    pub groups: Vec<MemberGroup>,
}

/// Classification of a documented member
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Constant,
    Property,
    Constructor,
    Function,
}

impl MemberKind {
    /// Output order of member groups
    pub const ALL: [MemberKind; 4] = [
        MemberKind::Constant,
        MemberKind::Property,
        MemberKind::Constructor,
        MemberKind::Function,
    ];

    /// Element name of a single member
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Property => "property",
            Self::Constructor => "constructor",
            Self::Function => "function",
        }
    }

    /// Element name of the group holding members of this kind
    pub fn holder_name(&self) -> &'static str {
        match self {
            Self::Constant => "constants",
            Self::Property => "properties",
            Self::Constructor => "constructors",
            Self::Function => "functions",
        }
    }

    /// Whether a return type block is emitted for this kind
    pub fn shows_return_type(&self) -> bool {
        matches!(self, Self::Property | Self::Function)
    }

    /// Whether an argument types block is emitted for this kind
    pub fn shows_argument_types(&self) -> bool {
        matches!(self, Self::Constructor | Self::Function)
    }
}

/// Members of one kind within a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberGroup {
    pub kind: MemberKind,
    pub members: Vec<MemberNode>,
}

/// A documented member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberNode {
    /// Official name
    pub name: String,
    pub kind: MemberKind,
    pub deprecated: bool,
    /// `None` means the member is undocumented
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<MemberDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ReturnNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument_types: Option<Vec<TypeRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterNode>>,
}

impl MemberNode {
    pub fn is_documented(&self) -> bool {
        self.doc.is_some()
    }
}

/// The documentation block of a member
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDoc {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub special: bool,
}

/// A displayed type together with the binary name it was declared with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    /// Public name shown to readers
    pub name: String,
    /// Binary name of the declared type, for class loading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typecode: Option<String>,
}

/// Return type and its description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnNode {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A documented or declared parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterNode {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeRef>,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// Convenience constructors
impl Document {
    pub fn new(categories: Vec<CategoryNode>) -> Self {
        Self { categories }
    }

    /// Every type in document order
    pub fn types(&self) -> impl Iterator<Item = &TypeNode> {
        self.categories.iter().flat_map(|c| c.types.iter())
    }

    pub fn category(&self, name: &str) -> Option<&CategoryNode> {
        self.categories.iter().find(|c| c.name == name)
    }
}

impl CategoryNode {
    pub fn new(name: impl Into<String>, types: Vec<TypeNode>) -> Self {
        Self {
            name: name.into(),
            types,
        }
    }
}

impl TypeNode {
    pub fn new(public_name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            public_name: public_name.into(),
            scripting_name: None,
            qualified_name: qualified_name.into(),
            deprecated: false,
            extends_component: None,
            description: None,
            groups: vec![],
        }
    }

    pub fn group(&self, kind: MemberKind) -> Option<&MemberGroup> {
        self.groups.iter().find(|g| g.kind == kind)
    }

    pub fn members(&self) -> impl Iterator<Item = &MemberNode> {
        self.groups.iter().flat_map(|g| g.members.iter())
    }

    pub fn member(&self, name: &str) -> Option<&MemberNode> {
        self.members().find(|m| m.name == name)
    }
}

impl MemberNode {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            deprecated: false,
            doc: None,
            return_type: None,
            argument_types: None,
            parameters: None,
        }
    }
}

impl TypeRef {
    pub fn new(name: impl Into<String>, typecode: Option<String>) -> Self {
        Self {
            name: name.into(),
            typecode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let holders: Vec<_> = MemberKind::ALL.iter().map(|k| k.holder_name()).collect();
        assert_eq!(holders, vec!["constants", "properties", "constructors", "functions"]);
        assert!(!MemberKind::Constructor.shows_return_type());
        assert!(!MemberKind::Property.shows_argument_types());
        assert!(MemberKind::Function.shows_return_type() && MemberKind::Function.shows_argument_types());
    }

    #[test]
    fn test_serialize_member() {
        let mut member = MemberNode::new("color", MemberKind::Property);
        member.return_type = Some(ReturnNode {
            type_ref: TypeRef::new("Color", Some("com.acme.ColorImpl".to_string())),
            description: None,
        });
        let json = serde_json::to_string(&member).unwrap();
        assert_eq!(
            json,
            r#"{"name":"color","kind":"property","deprecated":false,"returnType":{"type":{"name":"Color","typecode":"com.acme.ColorImpl"}}}"#
        );
    }

    #[test]
    fn test_lookup_helpers() {
        let mut ty = TypeNode::new("Shape", "com.acme.Shape");
        ty.groups.push(MemberGroup {
            kind: MemberKind::Function,
            members: vec![MemberNode::new("draw", MemberKind::Function)],
        });
        let doc = Document::new(vec![CategoryNode::new("elements", vec![ty])]);

        assert_eq!(doc.types().count(), 1);
        let ty = doc.category("elements").unwrap().types.first().unwrap();
        assert!(ty.group(MemberKind::Constant).is_none());
        assert!(ty.member("draw").is_some_and(|m| !m.is_documented()));
    }
}
