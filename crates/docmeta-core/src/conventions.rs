//! Naming and annotation conventions
//!
//! Every prefix, annotation name and reserved word the classifier relies
//! on lives here so that a build can be pointed at a differently named
//! code base without touching the engine.

use serde::{Deserialize, Serialize};

/// Conventions used to classify members and recognize documented types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Conventions {
    /// Marks a method as a constructor (`jsConstructor_Color`)
    pub constructor_prefix: String,
    /// Marks a method as a function (`jsFunction_draw`)
    pub function_prefix: String,
    /// Marks a method as a property getter (`jsGet_color`)
    pub getter_prefix: String,
    /// Marks a method as a property setter (`jsSet_color`)
    pub setter_prefix: String,
    /// Generic scripting prefix (`js_getColor`, `js_draw`)
    pub member_prefix: String,
    /// Type annotation that puts a type on the documentation surface
    pub documented_annotation: String,
    /// Member annotations that force a property
    pub property_annotations: Vec<String>,
    /// Member annotations that force a function
    pub function_annotations: Vec<String>,
    /// Member annotations that mark a setter
    pub setter_annotations: Vec<String>,
    /// Annotation marking a member or type as deprecated
    pub deprecated_annotation: String,
    /// Annotations a member inherits from its declaring type, on top of
    /// `deprecated_annotation`
    pub type_level_annotations: Vec<String>,
    /// Category for documented types that do not name one
    pub default_category: String,
    /// Names that must never become an official name
    pub keywords: Vec<String>,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            constructor_prefix: "jsConstructor_".to_string(),
            function_prefix: "jsFunction_".to_string(),
            getter_prefix: "jsGet_".to_string(),
            setter_prefix: "jsSet_".to_string(),
            member_prefix: "js_".to_string(),
            documented_annotation: "Documented".to_string(),
            property_annotations: strings(&["JSReadonlyProperty", "JSGetter"]),
            function_annotations: strings(&["JSFunction"]),
            setter_annotations: strings(&["JSSetter"]),
            deprecated_annotation: "Deprecated".to_string(),
            type_level_annotations: Vec::new(),
            default_category: "default".to_string(),
            keywords: strings(JS_KEYWORDS),
        }
    }
}

impl Conventions {
    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords.iter().any(|k| k == name)
    }

    pub fn is_type_level(&self, annotation: &str) -> bool {
        annotation == self.deprecated_annotation
            || self.type_level_annotations.iter().any(|a| a == annotation)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const JS_KEYWORDS: &[&str] = &[
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];
