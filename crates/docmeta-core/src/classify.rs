//! Member classification
//!
//! Derives the official name and kind of a member from its naming
//! convention, its (possibly inherited) annotations and getter/setter
//! pairing, and decides whether it is shown at all.

use crate::annotations::AnnotationResolver;
use crate::conventions::Conventions;
use crate::model::{
    EntityModel, MemberEntity, MemberVariant, Parameter, TypeEntity, TypeName, Visibility,
};
use crate::oracle::{PropertyVisibilityOracle, ShowAll};
use docmeta_tree::MemberKind;

/// What part a member plays in the scripting surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Field,
    Constructor,
    Getter,
    /// Never shown; its getter carries the property
    Setter,
    Function,
}

/// Official name and kind of a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub official_name: String,
    pub kind: MemberKind,
    pub role: Role,
    /// Recognized by prefix or annotation
    pub qualified: bool,
}

/// Which naming prefix a method carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Function,
    Getter,
    Setter,
    Member,
}

pub struct MemberClassifier<'a> {
    model: &'a EntityModel,
    conventions: &'a Conventions,
    annotations: AnnotationResolver<'a>,
    oracle: &'a dyn PropertyVisibilityOracle,
}

impl<'a> MemberClassifier<'a> {
    pub fn new(model: &'a EntityModel, conventions: &'a Conventions) -> Self {
        Self {
            model,
            conventions,
            annotations: AnnotationResolver::new(model, conventions),
            oracle: &ShowAll,
        }
    }

    pub fn with_oracle(mut self, oracle: &'a dyn PropertyVisibilityOracle) -> Self {
        self.oracle = oracle;
        self
    }

    /// Classify a member; the result is computed once per member
    pub fn classify(&self, member: &'a MemberEntity) -> &'a Classification {
        member
            .classification_cell()
            .get_or_init(|| self.compute(member))
    }

    /// Whether the member appears in the output at all
    ///
    /// Fields must be public. Methods must be public, non-static,
    /// recognized by prefix or annotation, and not a paired setter. The
    /// visibility oracle gets the last word.
    pub fn should_show(&self, member: &'a MemberEntity) -> bool {
        if member.visibility != Visibility::Public {
            return false;
        }
        let classification = self.classify(member);
        if member.is_method()
            && (member.is_static || !classification.qualified || classification.role == Role::Setter)
        {
            return false;
        }
        let Some(owner) = self.model.owner_of(member) else {
            return false;
        };
        !self.oracle.is_hidden(
            owner,
            member,
            &classification.official_name,
            classification.kind,
        )
    }

    fn compute(&self, member: &'a MemberEntity) -> Classification {
        if let MemberVariant::Field = member.variant {
            return Classification {
                official_name: member.name.clone(),
                kind: MemberKind::Constant,
                role: Role::Field,
                qualified: true,
            };
        }

        let c = self.conventions;
        let owner = self.model.owner_of(member);

        if let Some(rest) = member.name.strip_prefix(c.constructor_prefix.as_str()) {
            let official_name = match (rest.is_empty(), owner) {
                (true, Some(owner)) => owner.display_name().to_string(),
                _ => self.official(rest, member),
            };
            return Classification {
                official_name,
                kind: MemberKind::Constructor,
                role: Role::Constructor,
                qualified: true,
            };
        }

        let (prefix, prefix_text, base) = self.split_prefix(&member.name);
        let annotated = |names: &[String]| self.annotations.has_any(member, names);

        let role = if annotated(&c.property_annotations) {
            Some(Role::Getter)
        } else if annotated(&c.function_annotations) {
            Some(Role::Function)
        } else if annotated(&c.setter_annotations) {
            Some(Role::Setter)
        } else {
            None
        };
        let qualified = role.is_some() || prefix.is_some();

        let role = role.unwrap_or_else(|| match prefix {
            Some(Prefix::Getter) => Role::Getter,
            Some(Prefix::Setter) => Role::Setter,
            Some(Prefix::Function) => Role::Function,
            Some(Prefix::Member) | None => match owner {
                Some(owner) => self.pairing_role(member, owner, prefix_text, base),
                None => Role::Function,
            },
        });

        match role {
            Role::Getter | Role::Setter => Classification {
                official_name: self.property_name(base, member, role),
                kind: MemberKind::Property,
                role,
                qualified,
            },
            _ => Classification {
                official_name: self.official(base, member),
                kind: MemberKind::Function,
                role: Role::Function,
                qualified,
            },
        }
    }

    /// Split a method name into its recognized prefix and the rest
    fn split_prefix<'n>(&self, name: &'n str) -> (Option<Prefix>, &'n str, &'n str) {
        let c = self.conventions;
        let candidates = [
            (Prefix::Function, &c.function_prefix),
            (Prefix::Getter, &c.getter_prefix),
            (Prefix::Setter, &c.setter_prefix),
            (Prefix::Member, &c.member_prefix),
        ];
        for (prefix, text) in candidates {
            if !text.is_empty()
                && let Some(rest) = name.strip_prefix(text.as_str())
                && !rest.is_empty()
            {
                return (Some(prefix), &name[..text.len()], rest);
            }
        }
        (None, "", name)
    }

    /// Getter or setter when its counterpart exists, otherwise a function
    fn pairing_role(&self, member: &MemberEntity, owner: &TypeEntity, prefix: &str, base: &str) -> Role {
        if let Some(property) = getter_style(base)
            && self.has_paired_setter(member, owner, prefix, property)
        {
            return Role::Getter;
        }
        if let Some(property) = base.strip_prefix("set").filter(|p| starts_uppercase(p))
            && self.has_paired_getter(member, owner, prefix, property)
        {
            return Role::Setter;
        }
        Role::Function
    }

    fn has_paired_setter(&self, getter: &MemberEntity, owner: &TypeEntity, prefix: &str, property: &str) -> bool {
        let Some(value) = getter.declared_type.as_ref().filter(|t| !t.is_void()) else {
            return false;
        };
        let setter_name = format!("{prefix}set{property}");
        self.model.members_of(owner).any(|(_, m)| {
            m.is_method() && m.name == setter_name && setter_accepts(getter.parameters(), m.parameters(), value)
        })
    }

    fn has_paired_getter(&self, setter: &MemberEntity, owner: &TypeEntity, prefix: &str, property: &str) -> bool {
        ["get", "is"].iter().any(|g| {
            let getter_name = format!("{prefix}{g}{property}");
            self.model.members_of(owner).any(|(_, m)| {
                m.is_method()
                    && m.name == getter_name
                    && m.declared_type
                        .as_ref()
                        .is_some_and(|value| setter_accepts(m.parameters(), setter.parameters(), value))
            })
        })
    }

    /// `getFoo` becomes `foo`; an integral index parameter gives `foo[index]`
    fn property_name(&self, base: &str, member: &MemberEntity, role: Role) -> String {
        let stripped = match role {
            Role::Setter => base.strip_prefix("set").filter(|p| starts_uppercase(p)),
            _ => getter_style(base),
        };
        let name = match stripped {
            Some(property) => lower_first(property),
            None => base.to_string(),
        };
        let name = if self.conventions.is_keyword(&name) {
            member.name.clone()
        } else {
            name
        };

        match member.parameters() {
            [index] if role == Role::Getter && index.type_name.is_integral() => {
                format!("{}[{}]", name, index.name)
            }
            _ => name,
        }
    }

    /// Stripped name unless that would collide with a keyword
    fn official(&self, stripped: &str, member: &MemberEntity) -> String {
        if stripped.is_empty() || self.conventions.is_keyword(stripped) {
            member.name.clone()
        } else {
            stripped.to_string()
        }
    }
}

/// A setter matching a getter: the getter's parameters plus one value
/// parameter of the getter's type, or of `java.lang.Object`
fn setter_accepts(getter_params: &[Parameter], setter_params: &[Parameter], value: &TypeName) -> bool {
    let Some((last, leading)) = setter_params.split_last() else {
        return false;
    };
    leading.len() == getter_params.len()
        && leading
            .iter()
            .zip(getter_params)
            .all(|(s, g)| s.type_name.full_name() == g.type_name.full_name())
        && (last.type_name.full_name() == value.full_name()
            || (last.type_name.qualified == "java.lang.Object" && last.type_name.dimensions == 0))
}

/// `getFoo` or `isFoo` gives `Foo`
fn getter_style(name: &str) -> Option<&str> {
    ["get", "is"]
        .iter()
        .find_map(|p| name.strip_prefix(p))
        .filter(|rest| starts_uppercase(rest))
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_uppercase)
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, MemberId, TypeEntity};
    use crate::oracle::HiddenMembers;

    fn color() -> TypeName {
        TypeName::resolved("com.acme.Color")
    }

    fn method(name: &str, ret: Option<TypeName>, params: &[(&str, TypeName)]) -> MemberEntity {
        MemberEntity::method(
            name,
            ret,
            params
                .iter()
                .map(|(n, t)| Parameter::new(*n, t.clone()))
                .collect(),
        )
    }

    fn model_with(members: Vec<MemberEntity>) -> (EntityModel, Vec<MemberId>) {
        let mut model = EntityModel::new();
        model
            .add_type(TypeEntity::new("com.acme.Shape").documented_in("elements"))
            .unwrap();
        let ids = members
            .into_iter()
            .map(|m| model.add_member("com.acme.Shape", m).unwrap())
            .collect();
        (model, ids)
    }

    fn classify_all(members: Vec<MemberEntity>) -> Vec<(String, MemberKind, bool)> {
        let (model, ids) = model_with(members);
        let conventions = Conventions::default();
        let classifier = MemberClassifier::new(&model, &conventions);
        ids.into_iter()
            .map(|id| {
                let member = model.member(id);
                let c = classifier.classify(member);
                (c.official_name.clone(), c.kind, classifier.should_show(member))
            })
            .collect()
    }

    #[test]
    fn test_js_getter_setter_pair_is_a_property() {
        let result = classify_all(vec![
            method("js_getColor", Some(color()), &[]),
            method("js_setColor", Some(TypeName::resolved("void")), &[("c", color())]),
        ]);
        assert_eq!(result[0], ("color".to_string(), MemberKind::Property, true));
        assert_eq!(result[1].1, MemberKind::Property);
        assert!(!result[1].2, "paired setter must be suppressed");
    }

    #[test]
    fn test_getter_without_setter_is_a_function() {
        let result = classify_all(vec![method("js_getColor", Some(color()), &[])]);
        assert_eq!(result[0], ("getColor".to_string(), MemberKind::Function, true));
    }

    #[test]
    fn test_setter_of_another_type_does_not_pair() {
        let result = classify_all(vec![
            method("js_getColor", Some(color()), &[]),
            method("js_setColor", None, &[("c", TypeName::resolved("java.lang.String"))]),
        ]);
        assert_eq!(result[0].1, MemberKind::Function);
        assert_eq!(result[1], ("setColor".to_string(), MemberKind::Function, true));
    }

    #[test]
    fn test_object_setter_pairs() {
        let result = classify_all(vec![
            method("js_isVisible", Some(TypeName::resolved("boolean")), &[]),
            method("js_setVisible", None, &[("v", TypeName::resolved("java.lang.Object"))]),
        ]);
        assert_eq!(result[0], ("visible".to_string(), MemberKind::Property, true));
    }

    #[test]
    fn test_unprefixed_pair_is_property_but_hidden() {
        let result = classify_all(vec![
            method("getFoo", Some(color()), &[]),
            method("setFoo", None, &[("f", color())]),
        ]);
        assert_eq!(result[0], ("foo".to_string(), MemberKind::Property, false));
    }

    #[test]
    fn test_property_annotation_without_setter() {
        let result = classify_all(vec![
            method("getFoo", Some(color()), &[]).with_annotation(Annotation::new("JSReadonlyProperty")),
        ]);
        assert_eq!(result[0], ("foo".to_string(), MemberKind::Property, true));
    }

    #[test]
    fn test_function_annotation_beats_pairing() {
        let result = classify_all(vec![
            method("getFoo", Some(color()), &[]).with_annotation(Annotation::new("JSFunction")),
            method("setFoo", None, &[("f", color())]),
        ]);
        assert_eq!(result[0], ("getFoo".to_string(), MemberKind::Function, true));
    }

    #[test]
    fn test_explicit_prefixes() {
        let result = classify_all(vec![
            method("jsConstructor_Shape", None, &[("w", TypeName::resolved("int"))]),
            method("jsConstructor_", None, &[]),
            method("jsFunction_draw", None, &[]),
            method("jsGet_width", Some(TypeName::resolved("int")), &[]),
            method("jsSet_width", None, &[("w", TypeName::resolved("int"))]),
        ]);
        assert_eq!(result[0], ("Shape".to_string(), MemberKind::Constructor, true));
        assert_eq!(result[1], ("Shape".to_string(), MemberKind::Constructor, true));
        assert_eq!(result[2], ("draw".to_string(), MemberKind::Function, true));
        assert_eq!(result[3], ("width".to_string(), MemberKind::Property, true));
        assert!(!result[4].2);
    }

    #[test]
    fn test_keyword_keeps_prefix() {
        let result = classify_all(vec![
            method("js_delete", None, &[]),
            method("jsGet_default", Some(color()), &[]),
        ]);
        assert_eq!(result[0].0, "js_delete");
        assert_eq!(result[1].0, "jsGet_default");
    }

    #[test]
    fn test_indexed_getter() {
        let result = classify_all(vec![
            method("jsGet_item", Some(color()), &[("index", TypeName::resolved("int"))]),
        ]);
        assert_eq!(result[0], ("item[index]".to_string(), MemberKind::Property, true));
    }

    #[test]
    fn test_visibility_rules() {
        let result = classify_all(vec![
            MemberEntity::field("RED", TypeName::resolved("int")).with_static(true),
            MemberEntity::field("secret", TypeName::resolved("int")).with_visibility(Visibility::Private),
            method("js_helper", None, &[]).with_static(true),
            method("js_internal", None, &[]).with_visibility(Visibility::Protected),
            method("plain", None, &[]),
        ]);
        let shown: Vec<bool> = result.iter().map(|r| r.2).collect();
        assert_eq!(shown, vec![true, false, false, false, false]);
        assert_eq!(result[0].1, MemberKind::Constant);
    }

    #[test]
    fn test_oracle_hides_members() {
        let (model, ids) = model_with(vec![method("js_draw", None, &[]), method("js_fill", None, &[])]);
        let conventions = Conventions::default();
        let hidden = HiddenMembers::new(["Shape#fill"]);
        let classifier = MemberClassifier::new(&model, &conventions).with_oracle(&hidden);
        assert!(classifier.should_show(model.member(ids[0])));
        assert!(!classifier.should_show(model.member(ids[1])));
    }
}
