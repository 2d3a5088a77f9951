use super::*;
use crate::model::TypeEntity;
use doc_tags::TagSet;

/// Build a model from `(type, method, comment)` triples; all methods take no arguments
fn model(members: &[(&str, &str, Option<&str>)]) -> EntityModel {
    let mut model = EntityModel::new();
    model.add_type(TypeEntity::new("x.Base")).unwrap();
    model.add_type(TypeEntity::new("x.A")).unwrap();
    model
        .add_type(TypeEntity::new("x.B").extends("x.Base"))
        .unwrap();
    for (owner, name, comment) in members {
        let mut member = MemberEntity::method(*name, None, vec![]);
        member.comment = comment.map(str::to_string);
        model.add_member(owner, member).unwrap();
    }
    model.parse_comments(&TagSet::default());
    model
}

fn id(model: &EntityModel, owner: &str, name: &str) -> MemberId {
    model.member_id(owner, &format!("{name}()")).unwrap()
}

#[test]
fn test_plain_member() {
    let model = model(&[("x.A", "foo", Some("Foo. @sample foo();"))]);
    let mut resolver = ReferenceResolver::new(&model);
    let doc = resolver.resolve(id(&model, "x.A", "foo")).unwrap();
    assert_eq!(doc.text, "Foo.");
    assert_eq!(doc.sample.as_deref(), Some("foo();"));
    assert!(resolver.warnings().is_empty());
}

#[test]
fn test_same_as_substitutes_everything() {
    let model = model(&[
        ("x.A", "foo", Some("Local text. @sample local(); @sameas B#bar()")),
        ("x.B", "bar", Some("Bar text. @sample bar(); @since 2.0")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    let a = resolver.resolve(id(&model, "x.A", "foo")).cloned().unwrap();
    let b = resolver.resolve(id(&model, "x.B", "bar")).cloned().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.text, "Bar text.");
    assert_eq!(a.since.as_deref(), Some("2.0"));
    assert!(resolver.warnings().is_empty());
}

#[test]
fn test_same_as_undocumented_target() {
    let model = model(&[
        ("x.A", "foo", Some("@sameas B#bar()")),
        ("x.B", "bar", None),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    assert!(resolver.resolve(id(&model, "x.A", "foo")).is_none());

    let warnings: Vec<_> = resolver.warnings().iter().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::RedirectionProblem);
    assert_eq!(warnings[0].location, "x.A#foo()");
    assert!(warnings[0].message.contains("B#bar()"));
}

#[test]
fn test_same_as_missing_target() {
    let model = model(&[("x.A", "foo", Some("@sameas B#nothing()"))]);
    let mut resolver = ReferenceResolver::new(&model);
    assert!(resolver.resolve(id(&model, "x.A", "foo")).is_none());
    insta::assert_snapshot!(
        resolver.warnings().report(),
        @"RedirectionProblem - x.A#foo(): target `B#nothing()` of @sameas was not found"
    );
}

#[test]
fn test_self_cycle() {
    let model = model(&[("x.A", "foo", Some("Text. @sameas foo"))]);
    let mut resolver = ReferenceResolver::new(&model);
    assert!(resolver.resolve(id(&model, "x.A", "foo")).is_none());
    insta::assert_snapshot!(
        resolver.warnings().report(),
        @"RedirectionProblem - x.A#foo(): cyclic redirection x.A#foo() -> x.A#foo()"
    );
}

#[test]
fn test_two_member_cycle() {
    let model = model(&[
        ("x.A", "a", Some("@sameas #b()")),
        ("x.A", "b", Some("@sameas A#a()")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    resolver.resolve_all();

    assert!(resolver.resolve(id(&model, "x.A", "a")).is_none());
    assert!(resolver.resolve(id(&model, "x.A", "b")).is_none());
    insta::assert_snapshot!(
        resolver.warnings().report(),
        @"RedirectionProblem - x.A#a(): cyclic redirection x.A#a() -> x.A#b() -> x.A#a()"
    );
}

#[test]
fn test_entering_a_cycle_from_outside() {
    let model = model(&[
        ("x.A", "a", Some("@sameas b")),
        ("x.A", "b", Some("@sameas a")),
        ("x.B", "c", Some("@sameas A#a")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    assert!(resolver.resolve(id(&model, "x.B", "c")).is_none());

    let warnings = resolver.warnings();
    assert_eq!(warnings.count(WarningKind::RedirectionProblem), 2);
    assert_eq!(
        warnings.iter().filter(|w| w.message.starts_with("cyclic")).count(),
        1
    );
}

#[test]
fn test_sample_as_substitutes_only_the_sample() {
    let model = model(&[
        ("x.A", "foo", Some("Local text. @sample local(); @sampleas B#bar()")),
        ("x.B", "bar", Some("Bar text. @sample bar();")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    let doc = resolver.resolve(id(&model, "x.A", "foo")).unwrap();
    assert_eq!(doc.text, "Local text.");
    assert_eq!(doc.sample.as_deref(), Some("bar();"));
}

#[test]
fn test_clone_desc_substitutes_only_the_text() {
    let model = model(&[
        ("x.A", "foo", Some("Local text. @sample local(); @clonedesc B#bar()")),
        ("x.B", "bar", Some("Bar text. More. @sample bar();")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    let doc = resolver.resolve(id(&model, "x.A", "foo")).unwrap();
    assert_eq!(doc.text, "Bar text. More.");
    assert_eq!(doc.summary.as_deref(), Some("Bar text."));
    assert_eq!(doc.sample.as_deref(), Some("local();"));
}

#[test]
fn test_same_as_wins_over_sample_as_and_clone_desc() {
    let model = model(&[
        ("x.A", "foo", Some("Local. @sameas B#bar() @sampleas B#baz() @clonedesc B#baz()")),
        ("x.B", "bar", Some("Bar. @sample bar();")),
        ("x.B", "baz", Some("Baz. @sample baz();")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    let doc = resolver.resolve(id(&model, "x.A", "foo")).unwrap();
    assert_eq!(doc.text, "Bar.");
    assert_eq!(doc.sample.as_deref(), Some("bar();"));
    insta::assert_snapshot!(
        resolver.warnings().report(),
        @"RedirectionProblem - x.A#foo(): @sampleas and @clonedesc are ignored next to @sameas"
    );
}

#[test]
fn test_failed_sample_as_keeps_local_doc() {
    let model = model(&[
        ("x.A", "foo", Some("Local. @sample local(); @sampleas B#gone()")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    let doc = resolver.resolve(id(&model, "x.A", "foo")).unwrap();
    assert_eq!(doc.text, "Local.");
    assert_eq!(doc.sample.as_deref(), Some("local();"));
    assert_eq!(resolver.warnings().count(WarningKind::RedirectionProblem), 1);
}

#[test]
fn test_sample_as_cycle_keeps_local_docs() {
    let model = model(&[
        ("x.A", "a", Some("A. @sample a(); @sampleas b")),
        ("x.A", "b", Some("B. @sample b(); @sampleas a")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    resolver.resolve_all();
    assert_eq!(
        resolver.resolve(id(&model, "x.A", "a")).and_then(|d| d.sample.clone()).as_deref(),
        Some("a();")
    );
    assert_eq!(
        resolver.resolve(id(&model, "x.A", "b")).and_then(|d| d.sample.clone()).as_deref(),
        Some("b();")
    );
    assert_eq!(resolver.warnings().count(WarningKind::RedirectionProblem), 1);
}

#[test]
fn test_chained_redirection() {
    let model = model(&[
        ("x.A", "a", Some("@sameas B#b()")),
        ("x.B", "b", Some("@sameas B#c()")),
        ("x.B", "c", Some("Final. @sample c();")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    let a = resolver.resolve(id(&model, "x.A", "a")).cloned().unwrap();
    let c = resolver.resolve(id(&model, "x.B", "c")).cloned().unwrap();
    assert_eq!(a, c);
}

#[test]
fn test_target_inherited_from_supertype() {
    let model = model(&[
        ("x.Base", "shared", Some("Shared docs.")),
        ("x.A", "foo", Some("@sameas B#shared()")),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    let doc = resolver.resolve(id(&model, "x.A", "foo")).unwrap();
    assert_eq!(doc.text, "Shared docs.");
}

#[test]
fn test_resolution_is_memoized() {
    let model = model(&[
        ("x.A", "foo", Some("@sameas B#bar()")),
        ("x.B", "bar", None),
    ]);
    let mut resolver = ReferenceResolver::new(&model);
    let foo = id(&model, "x.A", "foo");
    resolver.resolve(foo);
    resolver.resolve(foo);
    assert!(resolver.is_resolved(foo));
    assert_eq!(resolver.warnings().len(), 1);

    resolver.reset();
    assert_eq!(resolver.resolved_count(), 0);
    assert!(resolver.warnings().is_empty());
}

#[test]
fn test_parameter_types_in_references() {
    let mut model = EntityModel::new();
    model.add_type(TypeEntity::new("x.A")).unwrap();
    let target = MemberEntity::method(
        "moveTo",
        None,
        vec![
            crate::model::Parameter::new("x", TypeName::resolved("int")),
            crate::model::Parameter::new("names", TypeName::resolved("java.lang.String[]")),
        ],
    )
    .with_comment("Moves.");
    model.add_member("x.A", target).unwrap();
    model
        .add_member(
            "x.A",
            MemberEntity::method("go", None, vec![]).with_comment("@sameas moveTo(int, String[])"),
        )
        .unwrap();
    model.parse_comments(&TagSet::default());

    let mut resolver = ReferenceResolver::new(&model);
    let go = model.member_id("x.A", "go()").unwrap();
    assert_eq!(resolver.resolve(go).map(|d| d.text.as_str()), Some("Moves."));
}
