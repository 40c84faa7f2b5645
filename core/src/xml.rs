//! Generic XML element tree.
//!
//! # Design
//! AtD answers every action with a small XML document whose shape depends on
//! the action. `parse` turns a body into an `XmlNode` tree without assuming
//! any schema; the typed view in [`crate::types`] is layered on top.
//!
//! Text and CDATA inside an element are concatenated verbatim, surrounding
//! whitespace included. An element whose text is whitespace only (with no
//! CDATA) ends up with empty text, so indentation between child elements
//! never shows up as content.
//!
//! `XmlNode::to_value` renders the tree with the xml2js defaults
//! (`explicitRoot`, `explicitArray`, `trim: false`): the root name wraps the
//! document, children are grouped by name into arrays, attributes sit under
//! `"$"` and text of an element that also has attributes or children sits
//! under `"_"`. A leaf element renders as its text, an empty one as `""`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::XmlError;

/// One element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Render as `{ <root name>: <content> }`.
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(self.name.clone(), self.content_value());
        Value::Object(root)
    }

    fn content_value(&self) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::String(self.text.clone());
        }

        let mut obj = Map::new();
        if !self.attributes.is_empty() {
            let attrs = self
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            obj.insert("$".to_string(), Value::Object(attrs));
        }
        if !self.text.is_empty() {
            obj.insert("_".to_string(), Value::String(self.text.clone()));
        }
        for child in &self.children {
            let slot = obj
                .entry(child.name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = slot {
                items.push(child.content_value());
            }
        }
        Value::Object(obj)
    }
}

/// Element still waiting for its closing tag.
struct Open {
    node: XmlNode,
    cdata: bool,
}

impl Open {
    fn new(node: XmlNode) -> Self {
        Self { node, cdata: false }
    }

    fn close(mut self) -> XmlNode {
        if !self.cdata && self.node.text.trim().is_empty() {
            self.node.text.clear();
        }
        self.node
    }
}

/// Parse a raw response body. Bodies that are not UTF-8 fail with
/// [`XmlError::Encoding`].
pub fn parse_bytes(body: &[u8]) -> Result<XmlNode, XmlError> {
    let body = std::str::from_utf8(body).map_err(|e| XmlError::Encoding(e.to_string()))?;
    parse(body)
}

/// Parse an XML document into its root element.
pub fn parse(body: &str) -> Result<XmlNode, XmlError> {
    let mut reader = Reader::from_str(body);

    let mut stack: Vec<Open> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlError::Syntax(format!("at byte {}: {e}", reader.error_position())))?;

        match event {
            Event::Start(start) => {
                ensure_single_root(&root, &stack)?;
                stack.push(Open::new(open_element(&start)?));
            }
            Event::Empty(start) => {
                ensure_single_root(&root, &stack)?;
                let node = open_element(&start)?;
                attach(node, &mut stack, &mut root);
            }
            Event::End(end) => {
                let open = stack.pop().ok_or_else(|| XmlError::UnbalancedClose {
                    found: String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                })?;
                attach(open.close(), &mut stack, &mut root);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| XmlError::Syntax(e.to_string()))?;
                push_text(&mut stack, &text, false)?;
            }
            Event::CData(cdata) => {
                let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                push_text(&mut stack, &text, true)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed { open: open.node.name });
    }
    root.ok_or(XmlError::Empty)
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlNode, XmlError> {
    let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Syntax(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Syntax(e.to_string()))?;
        node.attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(node)
}

fn ensure_single_root(root: &Option<XmlNode>, stack: &[Open]) -> Result<(), XmlError> {
    if root.is_some() && stack.is_empty() {
        return Err(XmlError::Syntax("multiple root elements".to_string()));
    }
    Ok(())
}

fn attach(node: XmlNode, stack: &mut [Open], root: &mut Option<XmlNode>) {
    match stack.last_mut() {
        Some(parent) => parent.node.children.push(node),
        None => *root = Some(node),
    }
}

fn push_text(stack: &mut [Open], text: &str, cdata: bool) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(open) => {
            open.node.text.push_str(text);
            open.cdata |= cdata;
            Ok(())
        }
        // Whitespace around the root element.
        None if !cdata && text.trim().is_empty() => Ok(()),
        None => Err(XmlError::Syntax(format!("text outside root element: {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RESULTS: &str = r#"<?xml version="1.0"?>
<results>
  <error>
    <string>teh</string>
    <description>Spelling</description>
    <precontext>on</precontext>
    <suggestions>
        <option>the</option>
        <option>ten</option>
    </suggestions>
    <type>spelling</type>
  </error>
</results>"#;

    #[test]
    fn parses_nested_elements() {
        let root = parse(RESULTS).unwrap();
        assert_eq!(root.name, "results");
        let error = root.child("error").unwrap();
        assert_eq!(error.child_text("string"), Some("teh"));
        let options: Vec<&str> = error
            .child("suggestions")
            .unwrap()
            .children_named("option")
            .map(|o| o.text.as_str())
            .collect();
        assert_eq!(options, vec!["the", "ten"]);
    }

    #[test]
    fn renders_nested_object_shape() {
        let root = parse(RESULTS).unwrap();
        assert_eq!(
            root.to_value(),
            json!({
                "results": {
                    "error": [{
                        "string": ["teh"],
                        "description": ["Spelling"],
                        "precontext": ["on"],
                        "suggestions": [{ "option": ["the", "ten"] }],
                        "type": ["spelling"]
                    }]
                }
            })
        );
    }

    #[test]
    fn attributes_and_mixed_text() {
        let root = parse(r#"<a id="1">hi<b/></a>"#).unwrap();
        assert_eq!(root.attribute("id"), Some("1"));
        assert_eq!(
            root.to_value(),
            json!({ "a": { "$": { "id": "1" }, "_": "hi", "b": [""] } })
        );
    }

    #[test]
    fn keeps_spaces_around_child_elements() {
        assert_eq!(parse("<m>on <b/> teh</m>").unwrap().text, "on  teh");
    }

    #[test]
    fn keeps_spaces_before_cdata() {
        assert_eq!(parse("<m>a <![CDATA[b]]></m>").unwrap().text, "a b");
    }

    #[test]
    fn leaf_text_is_not_trimmed() {
        let root = parse("<string> teh </string>").unwrap();
        assert_eq!(root.text, " teh ");
        assert_eq!(root.to_value(), json!({ "string": " teh " }));
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        assert_eq!(parse("<m>\n   </m>").unwrap().to_value(), json!({ "m": "" }));
        assert_eq!(parse("<m><![CDATA[  ]]></m>").unwrap().text, "  ");
    }

    #[test]
    fn non_utf8_body_is_an_encoding_error() {
        assert!(matches!(parse_bytes(b"<m>\xff</m>"), Err(XmlError::Encoding(_))));
        assert_eq!(parse_bytes(b"<m>ok</m>").unwrap().text, "ok");
    }

    #[test]
    fn unescapes_entities_and_cdata() {
        let root = parse("<m>a &amp; b<![CDATA[ <c> ]]></m>").unwrap();
        assert_eq!(root.text, "a & b <c> ");
    }

    #[test]
    fn empty_root_renders_as_empty_string() {
        let root = parse("<results></results>").unwrap();
        assert_eq!(root.to_value(), json!({ "results": "" }));
    }

    #[test]
    fn rejects_mismatched_tags() {
        assert!(matches!(parse("<a><b></a>"), Err(XmlError::Syntax(_))));
    }

    #[test]
    fn rejects_unclosed_document() {
        assert!(parse("<a><b></b>").is_err());
    }

    #[test]
    fn rejects_plain_text() {
        assert!(parse("Internal Server Error").is_err());
    }

    #[test]
    fn rejects_empty_body() {
        assert!(matches!(parse(""), Err(XmlError::Empty)));
    }
}
