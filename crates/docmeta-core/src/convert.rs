//! Entity model to output document conversion
//!
//! Resolves, classifies and maps every shown member, then assembles the
//! category-grouped [`Document`] together with the warnings of all stages.

use crate::annotations::AnnotationResolver;
use crate::classify::{Classification, MemberClassifier};
use crate::conventions::Conventions;
use crate::extract::ResolvedDoc;
use crate::model::{EntityModel, MemberEntity, MemberId, TypeEntity, TypeName, find_annotation};
use crate::oracle::{PropertyVisibilityOracle, ShowAll};
use crate::resolve::ReferenceResolver;
use crate::type_map::{TypeMapper, TypeMappingCache};
use doc_tags::{WarningKind, Warnings};
use docmeta_tree::{
    CategoryNode, Document, MemberDoc, MemberGroup, MemberKind, MemberNode, ParameterNode,
    ReturnNode, TypeNode, TypeRef,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Options for model to document conversion
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    /// Categories to emit, in this order; all present categories when `None`
    pub categories: Option<Vec<String>>,
    /// Emit deprecated types and members
    pub include_deprecated: bool,
    /// Allow short-name and public-name type matching
    pub partial_type_match: bool,
    /// Map undocumented types onto documented subtypes
    pub infer_undocumented_types: bool,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            categories: None,
            include_deprecated: true,
            partial_type_match: true,
            infer_undocumented_types: true,
        }
    }
}

/// A generated document and everything that went wrong on the way
#[derive(Debug, Clone)]
pub struct Generated {
    pub document: Document,
    pub warnings: Warnings,
}

/// Convert a fully parsed model to a document
pub fn model_to_document(
    model: &EntityModel,
    conventions: &Conventions,
    options: &ConverterOptions,
    cache: &mut TypeMappingCache,
) -> Generated {
    let mut generator = Generator::new(model, conventions, options, cache);
    generator.resolve_all();
    generator.finish()
}

/// Step-wise conversion
///
/// Callers that need to stop early resolve members one at a time with
/// [`resolve`](Self::resolve) and call [`finish`](Self::finish) once done.
/// Members that were never resolved explicitly are resolved on demand.
pub struct Generator<'a> {
    model: &'a EntityModel,
    conventions: &'a Conventions,
    options: &'a ConverterOptions,
    cache: &'a mut TypeMappingCache,
    oracle: &'a dyn PropertyVisibilityOracle,
    resolver: ReferenceResolver<'a>,
}

impl<'a> Generator<'a> {
    pub fn new(
        model: &'a EntityModel,
        conventions: &'a Conventions,
        options: &'a ConverterOptions,
        cache: &'a mut TypeMappingCache,
    ) -> Self {
        Self {
            model,
            conventions,
            options,
            cache,
            oracle: &ShowAll,
            resolver: ReferenceResolver::new(model),
        }
    }

    pub fn with_oracle(mut self, oracle: &'a dyn PropertyVisibilityOracle) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn resolve(&mut self, id: MemberId) {
        self.resolver.resolve(id);
    }

    pub fn resolve_all(&mut self) {
        debug!(members = self.model.member_ids().len(), "resolving redirections");
        self.resolver.resolve_all();
    }

    pub fn resolved_count(&self) -> usize {
        self.resolver.resolved_count()
    }

    pub fn finish(self) -> Generated {
        let mapper = TypeMapper::new(self.model, self.cache, self.options.infer_undocumented_types);
        let mut serializer = DocumentSerializer::new(
            self.model,
            self.conventions,
            self.options,
            self.resolver,
            mapper,
            self.oracle,
        );
        let document = serializer.serialize();

        let mut warnings = self.model.collected_warnings();
        warnings.append(&mut serializer.into_warnings());
        debug!(warnings = warnings.len(), "document generated");
        Generated { document, warnings }
    }
}

/// Assembles the output document
pub struct DocumentSerializer<'a> {
    model: &'a EntityModel,
    conventions: &'a Conventions,
    options: &'a ConverterOptions,
    annotations: AnnotationResolver<'a>,
    classifier: MemberClassifier<'a>,
    mapper: TypeMapper<'a>,
    resolver: ReferenceResolver<'a>,
    warnings: Warnings,
}

impl<'a> DocumentSerializer<'a> {
    pub fn new(
        model: &'a EntityModel,
        conventions: &'a Conventions,
        options: &'a ConverterOptions,
        resolver: ReferenceResolver<'a>,
        mapper: TypeMapper<'a>,
        oracle: &'a dyn PropertyVisibilityOracle,
    ) -> Self {
        Self {
            model,
            conventions,
            options,
            annotations: AnnotationResolver::new(model, conventions),
            classifier: MemberClassifier::new(model, conventions).with_oracle(oracle),
            mapper,
            resolver,
            warnings: Warnings::new(),
        }
    }

    /// Warnings of resolution and serialization
    pub fn into_warnings(self) -> Warnings {
        let mut warnings = self.resolver.into_warnings();
        let mut own = self.warnings;
        warnings.append(&mut own);
        warnings
    }

    pub fn serialize(&mut self) -> Document {
        let model = self.model;
        let ordered: Vec<&TypeEntity> = model
            .display_order()
            .into_iter()
            .filter(|ty| ty.documented)
            .filter(|ty| self.options.include_deprecated || !self.type_deprecated(ty))
            .collect();

        let categories = self.categories(&ordered);
        debug!(categories = categories.len(), types = ordered.len(), "serializing document");

        let mut nodes = Vec::with_capacity(categories.len());
        for category in categories {
            let mut types = Vec::new();
            for &ty in &ordered {
                if self.category_of(ty) == category {
                    types.push(self.convert_type(ty));
                }
            }
            nodes.push(CategoryNode::new(category, types));
        }
        Document::new(nodes)
    }

    fn categories(&self, types: &[&TypeEntity]) -> Vec<String> {
        if let Some(explicit) = &self.options.categories {
            return explicit.clone();
        }
        types
            .iter()
            .map(|ty| self.category_of(ty).to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn category_of<'t>(&'t self, ty: &'t TypeEntity) -> &'t str {
        ty.category
            .as_deref()
            .unwrap_or(&self.conventions.default_category)
    }

    fn type_deprecated(&self, ty: &TypeEntity) -> bool {
        ty.deprecated || find_annotation(&ty.annotations, &self.conventions.deprecated_annotation).is_some()
    }

    fn convert_type(&mut self, ty: &'a TypeEntity) -> TypeNode {
        let model = self.model;
        let mut node = TypeNode::new(ty.display_name(), &ty.qualified_name);
        node.scripting_name = ty.scripting_name.clone();
        node.deprecated = self.type_deprecated(ty);
        node.extends_component = ty.extends_component.clone();
        node.description = ty
            .doc
            .as_ref()
            .map(|doc| doc.content_text())
            .filter(|text| !text.is_empty());

        let mut grouped: Vec<(MemberKind, Vec<(String, MemberNode)>)> =
            MemberKind::ALL.iter().map(|&kind| (kind, Vec::new())).collect();

        for (id, member) in model.members_of(ty) {
            if !self.classifier.should_show(member) {
                continue;
            }
            let classification = self.classifier.classify(member);
            let member_node = self.convert_member(id, member, classification);
            if member_node.deprecated && !self.options.include_deprecated {
                continue;
            }
            let signature = official_signature(&member_node);
            if let Some((_, members)) = grouped.iter_mut().find(|(k, _)| *k == classification.kind) {
                members.push((signature, member_node));
            }
        }

        node.groups = grouped
            .into_iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(kind, mut members)| {
                members.sort_by(|a, b| a.0.cmp(&b.0));
                MemberGroup {
                    kind,
                    members: members.into_iter().map(|(_, m)| m).collect(),
                }
            })
            .collect();
        node
    }

    fn convert_member(
        &mut self,
        id: MemberId,
        member: &'a MemberEntity,
        classification: &Classification,
    ) -> MemberNode {
        let location = member.full_signature();
        let doc = self.resolver.resolve(id).cloned();
        let kind = classification.kind;

        let mut node = MemberNode::new(&classification.official_name, kind);
        node.deprecated = member.deprecated
            || self
                .annotations
                .get_annotation(member, &self.conventions.deprecated_annotation)
                .is_some()
            || doc.as_ref().is_some_and(|d| d.deprecated.is_some());

        if member.is_method() {
            if kind.shows_return_type() {
                node.return_type = member.declared_type.as_ref().map(|ty| ReturnNode {
                    type_ref: self.type_ref(ty, &location),
                    description: doc.as_ref().and_then(|d| d.returns.clone()),
                });
            }
            if kind.shows_argument_types() {
                node.argument_types = Some(
                    member
                        .parameters()
                        .iter()
                        .map(|p| self.type_ref(&p.type_name, &location))
                        .collect(),
                );
            }
            node.parameters = self.parameters(member, doc.as_ref(), &location);
        }

        node.doc = doc.map(member_doc);
        node
    }

    /// Documented parameters, or the declared ones when none are documented
    fn parameters(
        &mut self,
        member: &MemberEntity,
        doc: Option<&ResolvedDoc>,
        location: &str,
    ) -> Option<Vec<ParameterNode>> {
        let declared = member.parameters();
        let documented = doc.map(|d| d.params.as_slice()).unwrap_or_default();

        let params: Vec<ParameterNode> = if documented.is_empty() {
            declared
                .iter()
                .map(|p| ParameterNode {
                    name: p.name.clone(),
                    type_ref: Some(self.type_ref(&p.type_name, location)),
                    optional: false,
                    description: None,
                })
                .collect()
        } else {
            documented
                .iter()
                .map(|p| {
                    let type_ref = match &p.type_hint {
                        Some(hint) => Some(TypeRef::new(hint, None)),
                        None => declared
                            .iter()
                            .find(|d| d.name == p.name)
                            .map(|d| self.type_ref(&d.type_name, location)),
                    };
                    ParameterNode {
                        name: p.name.clone(),
                        type_ref,
                        optional: p.optional,
                        description: p.description.clone(),
                    }
                })
                .collect()
        };

        (!params.is_empty()).then_some(params)
    }

    /// Displayed form of a declared type
    fn type_ref(&mut self, ty: &TypeName, location: &str) -> TypeRef {
        let mapped = self
            .mapper
            .map_type(Some(ty), self.options.partial_type_match)
            .name
            .unwrap_or_else(|| ty.clone());

        let name = match self.model.get_type(&mapped.qualified).filter(|t| t.documented) {
            Some(documented) => format!("{}{}", documented.display_name(), "[]".repeat(mapped.dimensions)),
            None => mapped.short_full_name(),
        };

        let typecode = ty.binary_full_name();
        if typecode.is_none() {
            self.warnings.add(
                WarningKind::UnresolvedBinding,
                location,
                format!("type `{}` could not be resolved", ty.full_name()),
            );
        }
        TypeRef::new(name, typecode)
    }
}

fn member_doc(doc: ResolvedDoc) -> MemberDoc {
    MemberDoc {
        description: doc.text,
        summary: doc.summary,
        sample: doc.sample,
        deprecated_text: doc.deprecated.filter(|text| !text.is_empty()),
        links: doc.links,
        since: doc.since,
        until: doc.until,
        special: doc.special,
    }
}

/// Sort key of a member within its group
fn official_signature(node: &MemberNode) -> String {
    match &node.argument_types {
        Some(types) => {
            let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
            format!("{}({})", node.name, names.join(","))
        }
        None => node.name.clone(),
    }
}
