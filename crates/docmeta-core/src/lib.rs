//! docmeta-core: Documentation metamodel engine
//!
//! This crate turns an [`EntityModel`] of documented types and members into
//! a category-grouped [`docmeta_tree::Document`]:
//! - Annotation lookup through supertypes and interfaces
//! - `@sameas`, `@sampleas` and `@clonedesc` redirection with cycle detection
//! - Implementation to public type mapping with a seeded cache
//! - Member classification by naming convention, annotation and pairing
//!
//! # Example
//!
//! ```
//! use docmeta_core::{
//!     Conventions, ConverterOptions, EntityModel, MemberEntity, TypeEntity, TypeMappingCache,
//!     TypeName, model_to_document,
//! };
//! use doc_tags::TagSet;
//!
//! let mut model = EntityModel::new();
//! model.add_type(TypeEntity::new("com.acme.Canvas").documented_in("elements")).unwrap();
//! model
//!     .add_member(
//!         "com.acme.Canvas",
//!         MemberEntity::method("jsFunction_clear", Some(TypeName::resolved("void")), vec![])
//!             .with_comment("Clears the canvas."),
//!     )
//!     .unwrap();
//! model.parse_comments(&TagSet::default());
//!
//! let generated = model_to_document(
//!     &model,
//!     &Conventions::default(),
//!     &ConverterOptions::default(),
//!     &mut TypeMappingCache::new(),
//! );
//! let canvas = generated.document.types().next().unwrap();
//! assert_eq!(canvas.members().next().unwrap().name, "clear");
//! assert!(generated.warnings.is_empty());
//! ```

pub mod annotations;
pub mod classify;
pub mod conventions;
pub mod convert;
pub mod extract;
pub mod model;
pub mod oracle;
pub mod resolve;
pub mod type_map;

pub use annotations::AnnotationResolver;
pub use classify::{Classification, MemberClassifier, Role};
pub use conventions::Conventions;
pub use convert::{ConverterOptions, DocumentSerializer, Generated, Generator, model_to_document};
pub use extract::{ExtractedDoc, ParamDoc, Redirects, ResolvedDoc};
pub use model::{
    Annotation, AnnotationValue, CommentJob, DocTarget, EntityModel, MemberEntity, MemberId,
    MemberVariant, ModelError, Parameter, TypeEntity, TypeId, TypeName, Visibility,
};
pub use oracle::{HiddenMembers, PropertyVisibilityOracle, ShowAll};
pub use resolve::ReferenceResolver;
pub use type_map::{MappedType, MappingTarget, TypeMapper, TypeMappingCache};
