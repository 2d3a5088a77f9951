//! Host-supplied visibility rules
//!
//! Some members pass every naming and annotation check yet must stay out
//! of the documentation because of rules only the surrounding application
//! knows. The engine asks a [`PropertyVisibilityOracle`] about those.

use crate::model::{MemberEntity, TypeEntity};
use docmeta_tree::MemberKind;
use std::collections::HashSet;

/// Decides whether an otherwise visible member is hidden
pub trait PropertyVisibilityOracle {
    fn is_hidden(
        &self,
        owner: &TypeEntity,
        member: &MemberEntity,
        official_name: &str,
        kind: MemberKind,
    ) -> bool;
}

/// Hides nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowAll;

impl PropertyVisibilityOracle for ShowAll {
    fn is_hidden(&self, _: &TypeEntity, _: &MemberEntity, _: &str, _: MemberKind) -> bool {
        false
    }
}

/// Hides members listed as `Type#officialName`
///
/// `Type` may be the qualified, short or public name of the declaring type.
#[derive(Debug, Clone, Default)]
pub struct HiddenMembers {
    entries: HashSet<String>,
}

impl HiddenMembers {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertyVisibilityOracle for HiddenMembers {
    fn is_hidden(
        &self,
        owner: &TypeEntity,
        _member: &MemberEntity,
        official_name: &str,
        _kind: MemberKind,
    ) -> bool {
        [
            owner.qualified_name.as_str(),
            owner.short_name.as_str(),
            owner.display_name(),
        ]
        .iter()
        .any(|ty| self.entries.contains(&format!("{ty}#{official_name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeName;

    #[test]
    fn test_hidden_members() {
        let owner = TypeEntity::new("com.acme.ColorImpl").with_public_name("Color");
        let member = MemberEntity::field("RED", TypeName::resolved("int"));
        let oracle = HiddenMembers::new(["Color#RED", "com.acme.ColorImpl#BLUE"]);

        assert!(oracle.is_hidden(&owner, &member, "RED", MemberKind::Constant));
        assert!(oracle.is_hidden(&owner, &member, "BLUE", MemberKind::Constant));
        assert!(!oracle.is_hidden(&owner, &member, "GREEN", MemberKind::Constant));
        assert!(!ShowAll.is_hidden(&owner, &member, "RED", MemberKind::Constant));
    }
}
