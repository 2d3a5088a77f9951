//! Hierarchical annotation lookup
//!
//! Annotations are looked up on the member first, then on the declaring
//! type for annotations that apply type-wide, then on the same signature
//! up the supertype chain and through implemented interfaces. The walk
//! is structural over the [`EntityModel`], so types outside the model
//! simply end the search.

use crate::conventions::Conventions;
use crate::model::{Annotation, EntityModel, MemberEntity, find_annotation};
use std::collections::HashSet;

/// Annotation lookup over one model
#[derive(Debug, Clone, Copy)]
pub struct AnnotationResolver<'a> {
    model: &'a EntityModel,
    conventions: &'a Conventions,
}

impl<'a> AnnotationResolver<'a> {
    pub fn new(model: &'a EntityModel, conventions: &'a Conventions) -> Self {
        Self { model, conventions }
    }

    /// Find an annotation for a member, inheriting along the type hierarchy
    pub fn get_annotation(&self, member: &'a MemberEntity, name: &str) -> Option<&'a Annotation> {
        if let Some(found) = find_annotation(&member.annotations, name) {
            return Some(found);
        }
        let signature = member.signature();
        let mut visited = HashSet::new();
        self.search_type(&member.owner, &signature, name, &mut visited)
    }

    /// Whether any of the names resolves for the member
    pub fn has_any(&self, member: &'a MemberEntity, names: &[String]) -> bool {
        names.iter().any(|n| self.get_annotation(member, n).is_some())
    }

    fn search_type(
        &self,
        type_name: &str,
        signature: &str,
        name: &str,
        visited: &mut HashSet<String>,
    ) -> Option<&'a Annotation> {
        if !visited.insert(type_name.to_string()) {
            return None;
        }
        let ty = self.model.get_type(type_name)?;

        if let Some(member) = self.model.get_member(type_name, signature) {
            if let Some(found) = find_annotation(&member.annotations, name) {
                return Some(found);
            }
            if self.conventions.is_type_level(name)
                && let Some(found) = find_annotation(&ty.annotations, name)
            {
                return Some(found);
            }
        }

        if let Some(supertype) = &ty.supertype
            && let Some(found) = self.search_type(supertype, signature, name, visited)
        {
            return Some(found);
        }
        ty.interfaces
            .iter()
            .find_map(|iface| self.search_type(iface, signature, name, visited))
    }

    /// Whether a value of type `candidate` can be used where `target` is expected
    ///
    /// Walks the supertype chain of `candidate`; implemented interfaces are
    /// only followed when `target` is itself an interface.
    pub fn is_assignable_from(&self, target: &str, candidate: &str) -> bool {
        if target == candidate {
            return true;
        }
        let target_is_interface = self
            .model
            .get_type(target)
            .is_some_and(|t| t.is_interface);

        let mut visited = HashSet::new();
        let mut pending = vec![candidate];
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(ty) = self.model.get_type(current) else {
                continue;
            };
            if let Some(supertype) = &ty.supertype {
                if supertype == target {
                    return true;
                }
                pending.push(supertype);
            }
            if target_is_interface {
                for iface in &ty.interfaces {
                    if iface == target {
                        return true;
                    }
                    pending.push(iface);
                }
            }
        }
        false
    }
}
