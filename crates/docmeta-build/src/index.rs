//! Source index input
//!
//! The source index is the JSON hand-off from whatever tool discovered
//! and bound the declarations. It carries resolved type names and raw
//! comments; nothing here parses source code.

use docmeta_core::{
    Annotation, Conventions, EntityModel, MemberEntity, MemberVariant, ModelError, Parameter,
    TypeEntity, TypeName, Visibility,
};
use serde::{Deserialize, Serialize};

/// Every declaration of one build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceIndex {
    #[serde(default)]
    pub types: Vec<TypeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRecord {
    pub qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_name: Option<String>,
    /// Putting a category on a type documents it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub name: String,
    #[serde(default = "public")]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub shape: MemberShape,
}

/// Field or method specific part of a member record, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum MemberShape {
    Field {
        #[serde(rename = "type")]
        type_name: TypeNameRecord,
    },
    Method {
        /// Absent for constructors
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<TypeNameRecord>,
        #[serde(default)]
        parameters: Vec<ParameterRecord>,
        #[serde(default)]
        varargs: bool,
    },
}

/// A type as written at a use site
///
/// A missing `binaryName` means the use could not be bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeNameRecord {
    pub qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: TypeNameRecord,
}

fn public() -> Visibility {
    Visibility::Public
}

impl TypeNameRecord {
    fn to_type_name(&self) -> TypeName {
        TypeName::parse(&self.qualified_name, self.binary_name.as_deref())
    }
}

impl SourceIndex {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn member_count(&self) -> usize {
        self.types.iter().map(|t| t.members.len()).sum()
    }

    /// Build the entity model
    ///
    /// Duplicate type names and duplicate member signatures within a type
    /// are fatal. Comments are attached raw; parsing them is a separate
    /// phase.
    pub fn into_model(self, conventions: &Conventions) -> Result<EntityModel, ModelError> {
        let mut model = EntityModel::new();
        let mut members = Vec::with_capacity(self.types.len());

        for record in self.types {
            let mut ty = TypeEntity::new(&record.qualified_name);
            if let Some(short) = record.short_name {
                ty.short_name = short;
            }
            if record.binary_name.is_some() {
                ty.binary_name = record.binary_name;
            }
            ty.documented = record.category.is_some();
            ty.category = record.category;
            ty.public_name = record.public_name;
            ty.supertype = record.supertype;
            ty.interfaces = record.interfaces;
            ty.is_interface = record.is_interface;
            ty.deprecated = record.deprecated;
            ty.annotations = record.annotations;
            ty.comment = record.comment;
            ty.apply_documented_annotation(&conventions.documented_annotation);

            model.add_type(ty)?;
            members.push((record.qualified_name, record.members));
        }

        // Types first, so members may refer to any type of the index
        for (owner, records) in members {
            for record in records {
                model.add_member(&owner, record.into_member())?;
            }
        }
        Ok(model)
    }
}

impl MemberRecord {
    fn into_member(self) -> MemberEntity {
        let mut member = match self.shape {
            MemberShape::Field { type_name } => MemberEntity::field(self.name, type_name.to_type_name()),
            MemberShape::Method {
                return_type,
                parameters,
                varargs,
            } => {
                let parameters = parameters
                    .iter()
                    .map(|p| Parameter::new(&p.name, p.type_name.to_type_name()))
                    .collect::<Vec<_>>();
                let mut member = MemberEntity::method(
                    self.name,
                    return_type.as_ref().map(TypeNameRecord::to_type_name),
                    vec![],
                );
                member.variant = MemberVariant::Method { parameters, varargs };
                member
            }
        };
        member.visibility = self.visibility;
        member.is_static = self.is_static;
        member.deprecated = self.deprecated;
        member.annotations = self.annotations;
        member.comment = self.comment;
        member
    }
}
