//! Minimal namespace-aware element tree over quick-xml events.
//!
//! WordprocessingML is walked structurally (body → paragraph → run, table →
//! row → cell), which is far easier on a small owned tree than on a flat
//! event stream. Elements and attributes are keyed by namespace URI and
//! local name, so documents binding the WordprocessingML namespace to a
//! prefix other than `w` read the same.

use quick_xml::NsReader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

/// Nesting limit, matching libxml2's default. Deeper documents are refused
/// rather than risking the stack while building or dropping the tree.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Namespace URI, `None` when the name is not in any namespace.
    pub namespace: Option<String>,
    /// Local name, without prefix.
    pub name: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

impl Element {
    fn from_start<R>(reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<Self, String> {
        let (resolved, local) = reader.resolve_element(e.name());
        let namespace = match resolved {
            ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                return Err(format!(
                    "undeclared namespace prefix {}",
                    String::from_utf8_lossy(&prefix)
                ));
            }
        };
        let name = String::from_utf8_lossy(local.as_ref()).into_owned();

        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let (resolved, local) = reader.resolve_attribute(attr.key);
            let namespace = match resolved {
                ResolveResult::Bound(ns) => {
                    Some(String::from_utf8_lossy(ns.as_ref()).into_owned())
                }
                ResolveResult::Unbound => None,
                // Attributes are never matched on an unknown prefix.
                ResolveResult::Unknown(_) => continue,
            };
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(|e| e.to_string())?.into_owned();
            attrs.push(Attr {
                namespace,
                name: String::from_utf8_lossy(local.as_ref()).into_owned(),
                value,
            });
        }

        Ok(Self {
            namespace,
            name,
            attrs,
            children: Vec::new(),
        })
    }

    /// True if this element is `name` in namespace `ns`.
    pub fn is(&self, ns: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(ns)
    }

    /// Attribute value by namespace (`None` for unqualified) and local name.
    pub fn attr(&self, ns: Option<&str>, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name && a.namespace.as_deref() == ns)
            .map(|a| a.value.as_str())
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn children_named<'a>(
        &'a self,
        ns: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.is(ns, name))
    }

    pub fn child(&self, ns: &str, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(ns, name))
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// Parse an XML document into its root element.
pub fn parse(xml: &[u8]) -> Result<Element, String> {
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(4096);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(format!(
                        "element nesting too deep (more than {MAX_DEPTH} levels)"
                    ));
                }
                stack.push(Element::from_start(&reader, e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = Element::from_start(&reader, e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                // quick-xml checks that end tags match their start tags.
                let element = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "error at position {}: {}",
                    reader.error_position(),
                    e
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "no root element".to_string())
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err("multiple root elements".to_string()),
    }
    Ok(())
}
