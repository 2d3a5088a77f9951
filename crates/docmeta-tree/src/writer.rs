//! Document writers
//!
//! Serializes a [`Document`] to XML or JSON. Both writers are pure
//! functions of the tree, so equal trees always produce equal bytes.

use crate::tree::{Document, MemberDoc, MemberGroup, MemberNode, ParameterNode, TypeNode, TypeRef};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

/// Errors raised while writing a document
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("XML write error: {0}")]
    Xml(String),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for writers
pub type Result<T> = std::result::Result<T, WriteError>;

/// Options for the XML writer
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Name of the root element
    pub root_name: String,
    /// Spaces per indentation level
    pub indent: usize,
    /// Emit the `<?xml ...?>` declaration
    pub declaration: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            root_name: "apidoc".to_string(),
            indent: 2,
            declaration: true,
        }
    }
}

/// Serialize a document to XML
pub fn document_to_xml(doc: &Document, options: &WriterOptions) -> Result<String> {
    let mut writer = XmlWriter::new(options);
    writer.write_document(doc)?;
    writer.finish()
}

/// Serialize a document to pretty-printed JSON
pub fn document_to_json(doc: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// XML writer state
struct XmlWriter<'a> {
    options: &'a WriterOptions,
    xml: Writer<Cursor<Vec<u8>>>,
}

impl<'a> XmlWriter<'a> {
    fn new(options: &'a WriterOptions) -> Self {
        Self {
            options,
            xml: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', options.indent),
        }
    }

    fn finish(self) -> Result<String> {
        let mut bytes = self.xml.into_inner().into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }

    fn write_document(&mut self, doc: &Document) -> Result<()> {
        if self.options.declaration {
            self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        let root = self.options.root_name.as_str();
        if doc.categories.is_empty() {
            return self.event(Event::Empty(BytesStart::new(root)));
        }

        self.event(Event::Start(BytesStart::new(root)))?;
        for category in &doc.categories {
            let mut start = BytesStart::new("category");
            start.push_attribute(("name", category.name.as_str()));
            if category.types.is_empty() {
                self.event(Event::Empty(start))?;
                continue;
            }
            self.event(Event::Start(start))?;
            for ty in &category.types {
                self.write_type(ty)?;
            }
            self.end("category")?;
        }
        self.end(root)
    }

    fn write_type(&mut self, ty: &TypeNode) -> Result<()> {
        let mut start = BytesStart::new("object");
        start.push_attribute(("publicName", ty.public_name.as_str()));
        if let Some(scripting_name) = &ty.scripting_name {
            start.push_attribute(("scriptingName", scripting_name.as_str()));
        }
        start.push_attribute(("qualifiedName", ty.qualified_name.as_str()));
        start.push_attribute(("deprecated", flag(ty.deprecated)));
        if let Some(extends) = &ty.extends_component {
            start.push_attribute(("extendsComponent", extends.as_str()));
        }

        if ty.description.is_none() && ty.groups.is_empty() {
            return self.event(Event::Empty(start));
        }

        self.event(Event::Start(start))?;
        if let Some(description) = &ty.description {
            self.text_element("description", description)?;
        }
        for group in &ty.groups {
            self.write_group(group)?;
        }
        self.end("object")
    }

    fn write_group(&mut self, group: &MemberGroup) -> Result<()> {
        let holder = group.kind.holder_name();
        self.event(Event::Start(BytesStart::new(holder)))?;
        for member in &group.members {
            self.write_member(member)?;
        }
        self.end(holder)
    }

    fn write_member(&mut self, member: &MemberNode) -> Result<()> {
        let name = member.kind.as_str();
        let mut start = BytesStart::new(name);
        start.push_attribute(("name", member.name.as_str()));
        start.push_attribute(("deprecated", flag(member.deprecated)));
        match &member.doc {
            Some(doc) if doc.special => start.push_attribute(("special", "true")),
            Some(_) => {}
            None => start.push_attribute(("undocumented", "true")),
        }

        let has_children = member.doc.is_some()
            || member.return_type.is_some()
            || member.argument_types.is_some()
            || member.parameters.is_some();
        if !has_children {
            return self.event(Event::Empty(start));
        }

        self.event(Event::Start(start))?;
        if let Some(doc) = &member.doc {
            self.write_member_doc(doc)?;
        }
        if let Some(ret) = &member.return_type {
            let start = type_start("return", &ret.type_ref);
            match &ret.description {
                Some(description) => {
                    self.event(Event::Start(start))?;
                    self.text_element("description", description)?;
                    self.end("return")?;
                }
                None => self.event(Event::Empty(start))?,
            }
        }
        if let Some(types) = &member.argument_types {
            self.write_argument_types(types)?;
        }
        if let Some(params) = &member.parameters {
            self.write_parameters(params)?;
        }
        self.end(name)
    }

    fn write_member_doc(&mut self, doc: &MemberDoc) -> Result<()> {
        self.text_element("description", &doc.description)?;
        if let Some(summary) = &doc.summary {
            self.text_element("summary", summary)?;
        }
        if let Some(sample) = &doc.sample {
            self.text_element("sample", sample)?;
        }
        if let Some(text) = &doc.deprecated_text {
            self.text_element("deprecated", text)?;
        }
        if !doc.links.is_empty() {
            self.event(Event::Start(BytesStart::new("links")))?;
            for link in &doc.links {
                self.text_element("link", link)?;
            }
            self.end("links")?;
        }
        if let Some(since) = &doc.since {
            self.text_element("since", since)?;
        }
        if let Some(until) = &doc.until {
            self.text_element("until", until)?;
        }
        Ok(())
    }

    fn write_argument_types(&mut self, types: &[TypeRef]) -> Result<()> {
        if types.is_empty() {
            return self.event(Event::Empty(BytesStart::new("argumentsTypes")));
        }
        self.event(Event::Start(BytesStart::new("argumentsTypes")))?;
        for ty in types {
            self.event(Event::Empty(type_start("argumentType", ty)))?;
        }
        self.end("argumentsTypes")
    }

    fn write_parameters(&mut self, params: &[ParameterNode]) -> Result<()> {
        self.event(Event::Start(BytesStart::new("parameters")))?;
        for param in params {
            let mut start = BytesStart::new("parameter");
            start.push_attribute(("name", param.name.as_str()));
            if let Some(ty) = &param.type_ref {
                push_type_attributes(&mut start, ty);
            }
            if param.optional {
                start.push_attribute(("optional", "true"));
            }
            match &param.description {
                Some(description) => {
                    self.event(Event::Start(start))?;
                    self.text_element("description", description)?;
                    self.end("parameter")?;
                }
                None => self.event(Event::Empty(start))?,
            }
        }
        self.end("parameters")
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return self.event(Event::Empty(BytesStart::new(name)));
        }
        self.event(Event::Start(BytesStart::new(name)))?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.xml
            .write_event(event)
            .map_err(|e| WriteError::Xml(format!("{e}")))
    }
}

fn type_start<'a>(name: &'a str, ty: &'a TypeRef) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    push_type_attributes(&mut start, ty);
    start
}

fn push_type_attributes<'a>(start: &mut BytesStart<'a>, ty: &'a TypeRef) {
    start.push_attribute(("type", ty.name.as_str()));
    if let Some(typecode) = &ty.typecode {
        start.push_attribute(("typecode", typecode.as_str()));
    }
}

fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{CategoryNode, MemberKind, ReturnNode};

    fn sample_document() -> Document {
        let mut ty = TypeNode::new("Shape", "com.acme.ShapeImpl");
        ty.scripting_name = Some("shapes".to_string());

        let mut draw = MemberNode::new("draw", MemberKind::Function);
        draw.doc = Some(MemberDoc {
            description: "Draws a line. <fast> & cheap".to_string(),
            summary: Some("Draws a line.".to_string()),
            sample: Some("doLine();".to_string()),
            ..Default::default()
        });
        draw.return_type = Some(ReturnNode {
            type_ref: TypeRef::new("Boolean", Some("boolean".to_string())),
            description: None,
        });
        draw.argument_types = Some(vec![]);

        let hidden = MemberNode::new("width", MemberKind::Property);

        ty.groups = vec![
            MemberGroup {
                kind: MemberKind::Property,
                members: vec![hidden],
            },
            MemberGroup {
                kind: MemberKind::Function,
                members: vec![draw],
            },
        ];
        Document::new(vec![CategoryNode::new("elements", vec![ty])])
    }

    #[test]
    fn test_empty_document() {
        let xml = document_to_xml(&Document::default(), &WriterOptions::default()).unwrap();
        assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<apidoc/>\n");
    }

    #[test]
    fn test_document_structure() {
        let xml = document_to_xml(&sample_document(), &WriterOptions::default()).unwrap();
        assert!(xml.contains(r#"<category name="elements">"#));
        assert!(xml.contains(
            r#"<object publicName="Shape" scriptingName="shapes" qualifiedName="com.acme.ShapeImpl" deprecated="false">"#
        ));
        assert!(xml.contains(r#"<property name="width" deprecated="false" undocumented="true"/>"#));
        assert!(xml.contains(r#"<function name="draw" deprecated="false">"#));
        assert!(xml.contains(r#"<return type="Boolean" typecode="boolean"/>"#));
        assert!(xml.contains("<argumentsTypes/>"));
        assert!(xml.contains("<sample>doLine();</sample>"));

        let properties = xml.find("<properties>").unwrap();
        let functions = xml.find("<functions>").unwrap();
        assert!(properties < functions);
    }

    #[test]
    fn test_deprecated_flag_always_written() {
        let mut document = sample_document();
        document.categories[0].types[0].groups[1].members[0].deprecated = true;
        let xml = document_to_xml(&document, &WriterOptions::default()).unwrap();
        assert!(xml.contains(r#"<function name="draw" deprecated="true">"#));
        assert!(xml.contains(r#"<property name="width" deprecated="false" undocumented="true"/>"#));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = document_to_xml(&sample_document(), &WriterOptions::default()).unwrap();
        assert!(xml.contains("Draws a line. &lt;fast&gt; &amp; cheap"));
    }

    #[test]
    fn test_custom_root_without_declaration() {
        let options = WriterOptions {
            root_name: "docs".to_string(),
            declaration: false,
            ..Default::default()
        };
        let xml = document_to_xml(&sample_document(), &options).unwrap();
        assert!(xml.starts_with("<docs>"));
        assert!(xml.trim_end().ends_with("</docs>"));
    }

    #[test]
    fn test_json_output() {
        let json = document_to_json(&sample_document()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let ty = &value["categories"][0]["types"][0];
        assert_eq!(ty["publicName"], "Shape");
        assert_eq!(ty["groups"][1]["members"][0]["doc"]["sample"], "doLine();");
    }

    #[test]
    fn test_deterministic_output() {
        let a = document_to_xml(&sample_document(), &WriterOptions::default()).unwrap();
        let b = document_to_xml(&sample_document(), &WriterOptions::default()).unwrap();
        assert_eq!(a, b);
    }
}
