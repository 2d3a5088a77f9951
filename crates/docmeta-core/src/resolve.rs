//! Redirection resolution
//!
//! `@sameas` replaces a member's documentation with its target's,
//! `@sampleas` borrows only the sample and `@clonedesc` only the
//! description. Targets are resolved before they are copied, so chains
//! work; a member that is reached again while still being resolved closes
//! a cycle, which is reported once and left unresolved.

use crate::extract::{ResolvedDoc, TAG_CLONE_DESC, TAG_SAME_AS, TAG_SAMPLE_AS};
use crate::model::{EntityModel, MemberEntity, MemberId, TypeId, TypeName};
use doc_tags::{ReferenceLeaf, WarningKind, Warnings};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// What resolving one member produced for its caller
#[derive(Debug)]
enum Step {
    Ready(Option<ResolvedDoc>),
    /// The member sits on a cycle closed at the given member
    Cycle(MemberId),
}

/// Why a redirection target could not be used
#[derive(Debug)]
enum Failure {
    /// Already reported as a warning
    Reported,
    Cycle(MemberId),
}

/// Resolves redirections for the members of one model
///
/// Results are memoized per member, so resolving a member twice is free
/// and yields the same documentation.
pub struct ReferenceResolver<'a> {
    model: &'a EntityModel,
    resolved: HashMap<MemberId, Option<ResolvedDoc>>,
    /// Members currently being resolved, innermost last
    stack: Vec<(MemberId, String)>,
    warnings: Warnings,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(model: &'a EntityModel) -> Self {
        Self {
            model,
            resolved: HashMap::new(),
            stack: Vec::new(),
            warnings: Warnings::new(),
        }
    }

    /// Final documentation of a member; `None` means undocumented
    pub fn resolve(&mut self, id: MemberId) -> Option<&ResolvedDoc> {
        self.resolve_step(id);
        self.resolved.get(&id).and_then(Option::as_ref)
    }

    /// Resolve every member of the model in declaration order
    pub fn resolve_all(&mut self) {
        for id in self.model.member_ids() {
            self.resolve_step(id);
        }
    }

    pub fn is_resolved(&self, id: MemberId) -> bool {
        self.resolved.contains_key(&id)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    /// Forget every result, for reuse on an independent build
    pub fn reset(&mut self) {
        self.resolved.clear();
        self.stack.clear();
        self.warnings.clear();
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn into_warnings(self) -> Warnings {
        self.warnings
    }

    fn resolve_step(&mut self, id: MemberId) -> Step {
        if let Some(doc) = self.resolved.get(&id) {
            return Step::Ready(doc.clone());
        }

        let model = self.model;
        let member = model.member(id);
        let signature = member.full_signature();

        if let Some(pos) = self.stack.iter().position(|(m, _)| *m == id) {
            let mut chain: Vec<&str> = self.stack[pos..].iter().map(|(_, s)| s.as_str()).collect();
            chain.push(&signature);
            let message = format!("cyclic redirection {}", chain.join(" -> "));
            self.warnings
                .add(WarningKind::RedirectionProblem, &signature, message);
            return Step::Cycle(id);
        }

        let Some(extracted) = member.extracted(&mut self.warnings) else {
            self.resolved.insert(id, None);
            return Step::Ready(None);
        };
        let redirects = extracted.redirects.clone();
        let mut doc = Some(extracted.doc.clone());
        let mut cycle = None;

        self.stack.push((id, signature.clone()));

        if let Some(target) = &redirects.same_as {
            if redirects.sample_as.is_some() || redirects.clone_desc.is_some() {
                self.warnings.add(
                    WarningKind::RedirectionProblem,
                    &signature,
                    format!("@{TAG_SAMPLE_AS} and @{TAG_CLONE_DESC} are ignored next to @{TAG_SAME_AS}"),
                );
            }
            doc = match self.follow(member, TAG_SAME_AS, target) {
                Ok(target_doc) => Some(target_doc),
                Err(failure) => {
                    cycle = cycle_through(failure, id);
                    None
                }
            };
        } else if let Some(local) = doc.as_mut() {
            if let Some(target) = &redirects.sample_as {
                match self.follow(member, TAG_SAMPLE_AS, target) {
                    Ok(target_doc) => match target_doc.sample {
                        Some(sample) => local.sample = Some(sample),
                        None => {
                            self.warnings.add(
                                WarningKind::RedirectionProblem,
                                &signature,
                                format!("target `{}` of @{TAG_SAMPLE_AS} has no sample", target.raw),
                            );
                        }
                    },
                    Err(failure) => cycle = cycle.or(cycle_through(failure, id)),
                }
            }
            if let Some(target) = &redirects.clone_desc {
                match self.follow(member, TAG_CLONE_DESC, target) {
                    Ok(target_doc) => {
                        local.text = target_doc.text;
                        local.summary = target_doc.summary;
                    }
                    Err(failure) => cycle = cycle.or(cycle_through(failure, id)),
                }
            }
        }

        self.stack.pop();
        self.resolved.insert(id, doc.clone());
        match cycle {
            Some(head) => Step::Cycle(head),
            None => Step::Ready(doc),
        }
    }

    /// Look up and resolve a redirection target
    fn follow(
        &mut self,
        from: &MemberEntity,
        tag: &str,
        reference: &ReferenceLeaf,
    ) -> Result<ResolvedDoc, Failure> {
        let location = from.full_signature();
        let Some(target) = self.find_target(from, reference) else {
            self.warnings.add(
                WarningKind::RedirectionProblem,
                &location,
                format!("target `{}` of @{} was not found", reference.raw, tag),
            );
            return Err(Failure::Reported);
        };

        let target_signature = self.model.member(target).full_signature();
        trace!(from = %location, to = %target_signature, tag, "following redirection");

        match self.resolve_step(target) {
            Step::Ready(Some(doc)) => Ok(doc),
            Step::Ready(None) => {
                self.warnings.add(
                    WarningKind::RedirectionProblem,
                    &location,
                    format!("target `{}` of @{} is not documented", target_signature, tag),
                );
                Err(Failure::Reported)
            }
            Step::Cycle(head) => Err(Failure::Cycle(head)),
        }
    }

    /// The member a reference points at
    ///
    /// A reference without a type points into the member's own type.
    /// Members are searched on the type, then up its supertypes and
    /// interfaces.
    pub fn find_target(&self, from: &MemberEntity, reference: &ReferenceLeaf) -> Option<MemberId> {
        let context_package = from.owner.rsplit_once('.').map(|(pkg, _)| pkg);
        let owner = match &reference.owner {
            None => self.model.type_id(&from.owner)?,
            Some(name) => self.model.resolve_type_name(name, context_package)?,
        };
        let mut visited = HashSet::new();
        self.find_member_in(owner, reference, &mut visited)
    }

    fn find_member_in(
        &self,
        owner: TypeId,
        reference: &ReferenceLeaf,
        visited: &mut HashSet<TypeId>,
    ) -> Option<MemberId> {
        if !visited.insert(owner) {
            return None;
        }
        let ty = self.model.type_entity(owner);
        if let Some((id, _)) = self
            .model
            .members_of(ty)
            .find(|(_, m)| reference_matches(reference, m))
        {
            return Some(id);
        }
        ty.supertype
            .iter()
            .chain(ty.interfaces.iter())
            .filter_map(|name| self.model.type_id(name))
            .find_map(|parent| self.find_member_in(parent, reference, visited))
    }
}

fn cycle_through(failure: Failure, current: MemberId) -> Option<MemberId> {
    match failure {
        // The cycle closes here: report nothing further upward
        Failure::Cycle(head) if head != current => Some(head),
        _ => None,
    }
}

fn reference_matches(reference: &ReferenceLeaf, member: &MemberEntity) -> bool {
    if member.name != reference.member {
        return false;
    }
    match &reference.params {
        None => true,
        Some(written) => {
            member.is_method()
                && member.parameters().len() == written.len()
                && written
                    .iter()
                    .zip(member.parameters())
                    .all(|(w, p)| param_matches(w, &p.type_name))
        }
    }
}

/// A parameter type as written in a reference against a declared one
fn param_matches(written: &str, declared: &TypeName) -> bool {
    let written = TypeName::unresolved(written);
    written.dimensions == declared.dimensions
        && (written.qualified == declared.qualified || written.qualified == declared.short)
}

#[cfg(test)]
mod tests;
