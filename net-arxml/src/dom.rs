//! Minimal owned DOM over quick-xml, plus the package navigator.
//!
//! The extractors only ever need three queries: direct children by element
//! name, any-depth descendants by element name (document order), and the
//! trimmed text of a node's first text-bearing child. Attributes are not
//! consulted anywhere in the ARXML subset this crate reads.

use quick_xml::events::Event;
use quick_xml::Reader;

/// One element of the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(name: String) -> Self {
        XmlNode {
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed text content, or `None` when the element carries none.
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    /// Direct children with the given element name, in document order.
    pub fn children<'n>(&self, name: &'n str) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn first_child(&self, name: &str) -> Option<&XmlNode> {
        self.children(name).next()
    }

    /// Text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.first_child(name)?.text()
    }

    /// All descendants with the given element name, pre-order
    /// (document order), excluding the node itself.
    pub fn descendants(&self, name: &str) -> Vec<&XmlNode> {
        fn walk<'a>(node: &'a XmlNode, name: &str, out: &mut Vec<&'a XmlNode>) {
            for child in &node.children {
                if child.name == name {
                    out.push(child);
                }
                walk(child, name, out);
            }
        }
        let mut out = Vec::new();
        walk(self, name, &mut out);
        out
    }

    /// Text of the first descendant with the given name.
    pub fn descendant_text(&self, name: &str) -> Option<&str> {
        self.descendants(name).first().copied()?.text()
    }

    /// SHORT-NAME text, empty when absent.
    pub fn short_name(&self) -> &str {
        self.child_text("SHORT-NAME").unwrap_or("")
    }
}

/// A fully materialized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    children: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse an XML string into an owned element tree. Syntax errors are
    /// the only failure mode; everything downstream is infallible lookup.
    pub fn parse(xml: &str) -> Result<XmlDocument, quick_xml::Error> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut top = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    stack.push(XmlNode::new(name));
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    attach(&mut stack, &mut top, XmlNode::new(name));
                }
                Event::Text(t) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(t) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&t.into_inner()));
                    }
                }
                Event::End(_) => {
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut top, node);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(XmlDocument { children: top })
    }

    /// The document element (AUTOSAR root), if any.
    pub fn root(&self) -> Option<&XmlNode> {
        self.children.first()
    }
}

fn attach(stack: &mut Vec<XmlNode>, top: &mut Vec<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top.push(node),
    }
}

/// Find a named package among the direct children of the root's package
/// list. `None` root or a missing name yields `None`, never an error;
/// extractors turn that into an empty result set.
pub fn find_package<'a>(root: Option<&'a XmlNode>, name: &str) -> Option<&'a XmlNode> {
    let root = root?;
    root.children("AR-PACKAGES")
        .flat_map(|list| list.children("AR-PACKAGE"))
        .find(|pkg| pkg.short_name() == name)
}

/// Last segment of a `/`-separated reference path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Integer leaf convention: absent or unparsable text reads as 0.
pub fn int_text(text: Option<&str>) -> i32 {
    text.and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Strict integer parse, used where an unparsable id must drop the entry.
pub fn int_value(text: &str) -> Option<i32> {
    text.parse().ok()
}

/// Float leaf convention: absent or unparsable text reads as 0.0, and
/// infinite magnitudes clamp to the representable extreme of f64 so that
/// ARXML "INF"/"-INF" limits stay finite.
pub fn float_text(text: Option<&str>) -> f64 {
    match text.and_then(|s| s.parse::<f64>().ok()) {
        Some(v) if v.is_infinite() => {
            if v.is_sign_positive() {
                f64::MAX
            } else {
                -f64::MAX
            }
        }
        Some(v) => v,
        None => 0.0,
    }
}
