//! Entity model
//!
//! Types and members of one build, with their declaration facts and the
//! parsed documentation attached to them. Members live in an arena owned
//! by [`EntityModel`] and are addressed by [`MemberId`].

use crate::classify::Classification;
use crate::extract::{ExtractedDoc, extract};
use doc_tags::{ParsedComment, TagNode, TagSet, WarningKind, Warnings, parse_at};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Source index integrity failures
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Duplicate type: {0}")]
    DuplicateType(String),

    #[error("Duplicate member {signature} in {owner}")]
    DuplicateMember { owner: String, signature: String },

    #[error("Member declared on unknown type: {0}")]
    UnknownType(String),
}

/// Result type for model construction
pub type Result<T> = std::result::Result<T, ModelError>;

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Protected,
    Public,
}

/// An annotation attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Annotation(Annotation),
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// An annotation with its attributes in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub attributes: IndexMap<String, AnnotationValue>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: AnnotationValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Match by qualified or simple name
    pub fn is(&self, name: &str) -> bool {
        self.name == name || self.name.rsplit('.').next() == Some(name)
    }

    pub fn attribute(&self, key: &str) -> Option<&AnnotationValue> {
        self.attributes.get(key)
    }
}

/// Find an annotation by name in a declaration's annotation list
pub fn find_annotation<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.is(name))
}

/// A declared type name, resolved to qualified, short and binary forms
///
/// Generic arguments are dropped and array dimensions are kept apart, so
/// `java.util.List<String>[]` has qualified name `java.util.List` and one
/// dimension. A missing binary name means the declaration could not be
/// bound to a concrete type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub qualified: String,
    pub short: String,
    pub binary: Option<String>,
    pub dimensions: usize,
}

impl TypeName {
    /// Parse a declared name with an optional binary name
    pub fn parse(declared: &str, binary: Option<&str>) -> Self {
        let (qualified, dimensions) = split_dimensions(declared);
        let binary = binary.map(|b| split_dimensions(b).0);
        Self {
            short: short_name_of(&qualified).to_string(),
            qualified,
            binary,
            dimensions,
        }
    }

    /// A name whose binary form equals its qualified form
    pub fn resolved(declared: &str) -> Self {
        let mut name = Self::parse(declared, None);
        name.binary = Some(name.qualified.clone());
        name
    }

    pub fn unresolved(declared: &str) -> Self {
        Self::parse(declared, None)
    }

    /// Qualified name including array dimensions
    pub fn full_name(&self) -> String {
        format!("{}{}", self.qualified, "[]".repeat(self.dimensions))
    }

    /// Short name including array dimensions
    pub fn short_full_name(&self) -> String {
        format!("{}{}", self.short, "[]".repeat(self.dimensions))
    }

    /// Binary name including array dimensions
    pub fn binary_full_name(&self) -> Option<String> {
        self.binary
            .as_ref()
            .map(|b| format!("{}{}", b, "[]".repeat(self.dimensions)))
    }

    pub fn package(&self) -> Option<&str> {
        self.qualified.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    pub fn is_void(&self) -> bool {
        self.qualified == "void" && self.dimensions == 0
    }

    pub fn is_integral(&self) -> bool {
        self.dimensions == 0
            && matches!(
                self.qualified.as_str(),
                "int" | "long" | "short" | "byte" | "java.lang.Integer" | "java.lang.Long"
            )
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Last `.` or `$` separated segment of a qualified name
pub fn short_name_of(qualified: &str) -> &str {
    qualified
        .rsplit(['.', '$'])
        .next()
        .unwrap_or(qualified)
}

fn split_dimensions(declared: &str) -> (String, usize) {
    // Drop generic arguments
    let mut base = String::with_capacity(declared.len());
    let mut depth = 0usize;
    for c in declared.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && !c.is_whitespace() => base.push(c),
            _ => {}
        }
    }

    let mut dimensions = 0;
    loop {
        let len = if base.ends_with("[]") {
            base.len() - 2
        } else if base.ends_with("...") {
            base.len() - 3
        } else {
            break;
        };
        base.truncate(len);
        dimensions += 1;
    }
    (base, dimensions)
}

/// Index of a type in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(usize);

/// Index of a member in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(usize);

/// A declared type
#[derive(Debug, Clone)]
pub struct TypeEntity {
    pub qualified_name: String,
    pub short_name: String,
    pub binary_name: Option<String>,
    /// Display name override
    pub public_name: Option<String>,
    pub scripting_name: Option<String>,
    pub category: Option<String>,
    pub extends_component: Option<String>,
    pub supertype: Option<String>,
    pub interfaces: Vec<String>,
    pub is_interface: bool,
    pub deprecated: bool,
    /// Part of the public documentation surface
    pub documented: bool,
    pub annotations: Vec<Annotation>,
    pub comment: Option<String>,
    pub doc: Option<TagNode>,
    pub warnings: Warnings,
    members: IndexMap<String, MemberId>,
}

impl TypeEntity {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        Self {
            short_name: short_name_of(&qualified_name).to_string(),
            binary_name: Some(qualified_name.clone()),
            qualified_name,
            public_name: None,
            scripting_name: None,
            category: None,
            extends_component: None,
            supertype: None,
            interfaces: vec![],
            is_interface: false,
            deprecated: false,
            documented: false,
            annotations: vec![],
            comment: None,
            doc: None,
            warnings: Warnings::new(),
            members: IndexMap::new(),
        }
    }

    /// Put the type on the documentation surface under a category
    pub fn documented_in(mut self, category: impl Into<String>) -> Self {
        self.documented = true;
        self.category = Some(category.into());
        self
    }

    pub fn with_public_name(mut self, name: impl Into<String>) -> Self {
        self.public_name = Some(name.into());
        self
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Name shown to readers
    pub fn display_name(&self) -> &str {
        self.public_name.as_deref().unwrap_or(&self.short_name)
    }

    pub fn package(&self) -> Option<&str> {
        self.qualified_name.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Promote the documented annotation into the type's own facts
    ///
    /// The annotation's `publicName`, `category`, `scriptingName` and
    /// `extendsComponent` attributes win over the declared values.
    pub fn apply_documented_annotation(&mut self, annotation: &str) {
        let Some(found) = find_annotation(&self.annotations, annotation).cloned() else {
            return;
        };
        self.documented = true;

        let targets: [(&str, &mut Option<String>); 4] = [
            ("publicName", &mut self.public_name),
            ("category", &mut self.category),
            ("scriptingName", &mut self.scripting_name),
            ("extendsComponent", &mut self.extends_component),
        ];
        for (key, slot) in targets {
            match found.attribute(key) {
                None => {}
                Some(AnnotationValue::String(value)) if value.is_empty() => {}
                Some(AnnotationValue::String(value)) => *slot = Some(value.clone()),
                Some(other) => {
                    self.warnings.add(
                        WarningKind::Other,
                        &self.qualified_name,
                        format!("@{}.{} must be a string, found {:?}", found.name, key, other),
                    );
                }
            }
        }
    }
}

/// Field or method specific facts
#[derive(Debug, Clone, PartialEq)]
pub enum MemberVariant {
    Field,
    Method {
        parameters: Vec<Parameter>,
        varargs: bool,
    },
}

/// A declared method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_name: TypeName,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            name: name.into(),
            type_name,
        }
    }
}

/// A declared field or method
#[derive(Debug, Clone)]
pub struct MemberEntity {
    /// Qualified name of the declaring type
    pub owner: String,
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub deprecated: bool,
    /// Field type or method return type; `None` for constructors
    pub declared_type: Option<TypeName>,
    pub annotations: Vec<Annotation>,
    pub comment: Option<String>,
    pub doc: Option<TagNode>,
    pub warnings: Warnings,
    pub variant: MemberVariant,
    extracted: OnceCell<Option<ExtractedDoc>>,
    classification: OnceCell<Classification>,
}

impl MemberEntity {
    fn new(name: impl Into<String>, declared_type: Option<TypeName>, variant: MemberVariant) -> Self {
        Self {
            owner: String::new(),
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            deprecated: false,
            declared_type,
            annotations: vec![],
            comment: None,
            doc: None,
            warnings: Warnings::new(),
            variant,
            extracted: OnceCell::new(),
            classification: OnceCell::new(),
        }
    }

    /// A public field
    pub fn field(name: impl Into<String>, type_name: TypeName) -> Self {
        Self::new(name, Some(type_name), MemberVariant::Field)
    }

    /// A public, non-static method
    pub fn method(
        name: impl Into<String>,
        return_type: Option<TypeName>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self::new(
            name,
            return_type,
            MemberVariant::Method {
                parameters,
                varargs: false,
            },
        )
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn is_method(&self) -> bool {
        matches!(self.variant, MemberVariant::Method { .. })
    }

    pub fn parameters(&self) -> &[Parameter] {
        match &self.variant {
            MemberVariant::Field => &[],
            MemberVariant::Method { parameters, .. } => parameters,
        }
    }

    /// Key of the member within its type: `name` or `name(T1,T2)`
    pub fn signature(&self) -> String {
        match &self.variant {
            MemberVariant::Field => self.name.clone(),
            MemberVariant::Method { parameters, .. } => {
                let types: Vec<String> = parameters.iter().map(|p| p.type_name.full_name()).collect();
                format!("{}({})", self.name, types.join(","))
            }
        }
    }

    /// `Owner#signature`, unique within a build
    pub fn full_signature(&self) -> String {
        format!("{}#{}", self.owner, self.signature())
    }

    /// Documentation extracted from the parsed comment
    ///
    /// Extraction runs on first access only; its warnings go to `warnings`
    /// on that first access.
    pub fn extracted(&self, warnings: &mut Warnings) -> Option<&ExtractedDoc> {
        self.extracted
            .get_or_init(|| {
                let root = self.doc.as_ref()?;
                extract(root, &self.full_signature(), warnings)
            })
            .as_ref()
    }

    pub(crate) fn classification_cell(&self) -> &OnceCell<Classification> {
        &self.classification
    }
}

/// Where a parsed comment gets attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocTarget {
    Type(TypeId),
    Member(MemberId),
}

/// A raw comment waiting to be parsed
#[derive(Debug, Clone)]
pub struct CommentJob {
    pub target: DocTarget,
    /// Location used for parse warnings
    pub location: String,
    pub text: String,
}

/// All types and members of one build
#[derive(Debug, Clone, Default)]
pub struct EntityModel {
    types: Vec<TypeEntity>,
    by_name: HashMap<String, TypeId>,
    members: Vec<MemberEntity>,
}

impl EntityModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type; qualified names must be unique
    pub fn add_type(&mut self, mut ty: TypeEntity) -> Result<TypeId> {
        if self.by_name.contains_key(&ty.qualified_name) {
            return Err(ModelError::DuplicateType(ty.qualified_name));
        }
        let id = TypeId(self.types.len());
        ty.members.clear();
        self.by_name.insert(ty.qualified_name.clone(), id);
        self.types.push(ty);
        Ok(id)
    }

    /// Add a member to a type; signatures must be unique within the type
    pub fn add_member(&mut self, owner: &str, mut member: MemberEntity) -> Result<MemberId> {
        let type_id = self
            .type_id(owner)
            .ok_or_else(|| ModelError::UnknownType(owner.to_string()))?;
        member.owner = owner.to_string();
        let signature = member.signature();

        let id = MemberId(self.members.len());
        let ty = &mut self.types[type_id.0];
        if ty.members.contains_key(&signature) {
            return Err(ModelError::DuplicateMember {
                owner: owner.to_string(),
                signature,
            });
        }
        ty.members.insert(signature, id);
        self.members.push(member);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_id(&self, qualified_name: &str) -> Option<TypeId> {
        self.by_name.get(qualified_name).copied()
    }

    pub fn get_type(&self, qualified_name: &str) -> Option<&TypeEntity> {
        self.type_id(qualified_name).map(|id| &self.types[id.0])
    }

    pub fn type_entity(&self, id: TypeId) -> &TypeEntity {
        &self.types[id.0]
    }

    pub fn member_id(&self, owner: &str, signature: &str) -> Option<MemberId> {
        self.get_type(owner)?.members.get(signature).copied()
    }

    pub fn get_member(&self, owner: &str, signature: &str) -> Option<&MemberEntity> {
        self.member_id(owner, signature).map(|id| &self.members[id.0])
    }

    pub fn member(&self, id: MemberId) -> &MemberEntity {
        &self.members[id.0]
    }

    /// The type declaring a member
    pub fn owner_of(&self, member: &MemberEntity) -> Option<&TypeEntity> {
        self.get_type(&member.owner)
    }

    /// Types in declaration order
    pub fn types(&self) -> impl Iterator<Item = &TypeEntity> {
        self.types.iter()
    }

    /// Types sorted by display name, then qualified name
    pub fn display_order(&self) -> Vec<&TypeEntity> {
        let mut types: Vec<&TypeEntity> = self.types.iter().collect();
        types.sort_by(|a, b| display_cmp(a, b));
        types
    }

    /// Members of a type in declaration order
    pub fn members_of<'a>(
        &'a self,
        ty: &'a TypeEntity,
    ) -> impl Iterator<Item = (MemberId, &'a MemberEntity)> + 'a {
        ty.members.values().map(|&id| (id, &self.members[id.0]))
    }

    /// Every member, type by type in declaration order
    pub fn member_ids(&self) -> Vec<MemberId> {
        self.types
            .iter()
            .flat_map(|ty| ty.members.values().copied())
            .collect()
    }

    /// Resolve a type name as written in a reference
    ///
    /// Exact qualified names win. A simple name is looked up in
    /// `context_package` first, then by the first type with that short
    /// name in declaration order.
    pub fn resolve_type_name(&self, name: &str, context_package: Option<&str>) -> Option<TypeId> {
        if let Some(id) = self.type_id(name) {
            return Some(id);
        }
        if name.contains('.') {
            return None;
        }
        if let Some(pkg) = context_package
            && let Some(id) = self.type_id(&format!("{pkg}.{name}"))
        {
            return Some(id);
        }
        self.types
            .iter()
            .position(|t| t.short_name == name)
            .map(TypeId)
    }

    /// Raw comments of every type and member, in declaration order
    pub fn comment_jobs(&self) -> Vec<CommentJob> {
        let mut jobs = Vec::new();
        for (index, ty) in self.types.iter().enumerate() {
            if let Some(text) = &ty.comment {
                jobs.push(CommentJob {
                    target: DocTarget::Type(TypeId(index)),
                    location: ty.qualified_name.clone(),
                    text: text.clone(),
                });
            }
            for &id in ty.members.values() {
                let member = &self.members[id.0];
                if let Some(text) = &member.comment {
                    jobs.push(CommentJob {
                        target: DocTarget::Member(id),
                        location: member.full_signature(),
                        text: text.clone(),
                    });
                }
            }
        }
        jobs
    }

    /// Attach a parsed comment and its parse warnings
    pub fn attach(&mut self, target: DocTarget, parsed: ParsedComment) {
        let ParsedComment { root, mut warnings } = parsed;
        match target {
            DocTarget::Type(id) => {
                let ty = &mut self.types[id.0];
                ty.doc = Some(root);
                ty.warnings.append(&mut warnings);
            }
            DocTarget::Member(id) => {
                let member = &mut self.members[id.0];
                member.doc = Some(root);
                member.warnings.append(&mut warnings);
            }
        }
    }

    /// Parse every raw comment in place
    pub fn parse_comments(&mut self, tags: &TagSet) {
        for job in self.comment_jobs() {
            let parsed = parse_at(&job.text, tags, &job.location);
            self.attach(job.target, parsed);
        }
    }

    /// Warnings recorded on types and members while loading and parsing
    pub fn collected_warnings(&self) -> Warnings {
        let mut all = Warnings::new();
        for ty in &self.types {
            all.extend(ty.warnings.iter().cloned());
        }
        for member in &self.members {
            all.extend(member.warnings.iter().cloned());
        }
        all
    }
}

fn display_cmp(a: &TypeEntity, b: &TypeEntity) -> Ordering {
    a.display_name()
        .cmp(b.display_name())
        .then_with(|| a.qualified_name.cmp(&b.qualified_name))
}
