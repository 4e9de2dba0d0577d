//! Vector-image element tree and its textual serialization.
//!
//! Serialization follows XML element-tree conventions: the output method, declaration,
//! default namespace and empty-element style are all caller controlled, but none of them
//! change the drawn content.

use serde::Serialize;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Prefix bound to the SVG namespace when another default namespace is requested.
const SVG_PREFIX: &str = "svg";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Unicode,
    Utf8,
    UsAscii,
    Latin1,
}

impl TextEncoding {
    pub fn parse(name: &str) -> Option<Self> {
        let encoding = match name.trim().to_ascii_lowercase().as_str() {
            "unicode" => Self::Unicode,
            "utf-8" | "utf8" => Self::Utf8,
            "us-ascii" | "ascii" => Self::UsAscii,
            "iso-8859-1" | "latin-1" | "latin1" => Self::Latin1,
            _ => return None,
        };
        Some(encoding)
    }

    fn declared_name(self) -> &'static str {
        match self {
            Self::Unicode | Self::Utf8 => "utf-8",
            Self::UsAscii => "us-ascii",
            Self::Latin1 => "iso-8859-1",
        }
    }

    fn declared_by_default(self) -> bool {
        matches!(self, Self::Latin1)
    }

    /// Highest code point written verbatim; anything above becomes a character reference.
    fn max_char(self) -> Option<u32> {
        match self {
            Self::Unicode | Self::Utf8 => None,
            Self::UsAscii => Some(0x7F),
            Self::Latin1 => Some(0xFF),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMethod {
    Xml,
    Html,
    Text,
}

impl OutputMethod {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "xml" => Some(Self::Xml),
            "html" => Some(Self::Html),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Passthrough options that only affect the textual form of the image.
///
/// `None` means "unset": an unset encoding behaves as `us-ascii` and an unset method as `xml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SerializeOptions {
    pub encoding: Option<TextEncoding>,
    pub method: Option<OutputMethod>,
    pub xml_declaration: Option<bool>,
    pub default_namespace: Option<String>,
    pub short_empty_elements: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            encoding: Some(TextEncoding::Unicode),
            method: None,
            xml_declaration: None,
            default_namespace: None,
            short_empty_elements: true,
        }
    }
}

/// An element in the SVG namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: vec![],
            text: None,
            children: vec![],
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.as_deref().is_none_or(str::is_empty)
    }
}

/// A scalable image document rooted at an `svg` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorImage {
    root: Element,
}

impl VectorImage {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn serialize(&self, options: &SerializeOptions) -> String {
        let method = options.method.unwrap_or(OutputMethod::Xml);
        let encoding = options.encoding.unwrap_or(TextEncoding::UsAscii);
        let mut out = String::new();

        if method == OutputMethod::Text {
            collect_text(&self.root, &mut out);
            return encode_chars(&out, encoding);
        }

        let declare = options
            .xml_declaration
            .unwrap_or_else(|| encoding.declared_by_default());
        if method == OutputMethod::Xml && declare {
            out.push_str(&format!(
                "<?xml version='1.0' encoding='{}'?>\n",
                encoding.declared_name()
            ));
        }

        let writer = Writer {
            prefix: match options.default_namespace.as_deref() {
                Some(ns) if !ns.is_empty() && ns != SVG_NAMESPACE => Some(SVG_PREFIX),
                _ => None,
            },
            short_empty_elements: method == OutputMethod::Xml && options.short_empty_elements,
        };

        let mut namespaces = vec![];
        match writer.prefix {
            None => namespaces.push(("xmlns".to_string(), SVG_NAMESPACE.to_string())),
            Some(prefix) => {
                if let Some(ns) = options.default_namespace.as_deref() {
                    namespaces.push(("xmlns".to_string(), ns.to_string()));
                }
                namespaces.push((format!("xmlns:{prefix}"), SVG_NAMESPACE.to_string()));
            }
        }

        writer.write(&self.root, &namespaces, &mut out);
        encode_chars(&out, encoding)
    }
}

struct Writer {
    prefix: Option<&'static str>,
    short_empty_elements: bool,
}

impl Writer {
    fn tag(&self, name: &str) -> String {
        match self.prefix {
            Some(prefix) => format!("{prefix}:{name}"),
            None => name.to_string(),
        }
    }

    fn write(&self, element: &Element, namespaces: &[(String, String)], out: &mut String) {
        let tag = self.tag(element.name);
        out.push('<');
        out.push_str(&tag);
        for (name, value) in namespaces {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
        }
        for (name, value) in &element.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
        }

        if element.is_empty() {
            if self.short_empty_elements {
                out.push_str(" />");
            } else {
                out.push_str(&format!("></{tag}>"));
            }
            return;
        }

        out.push('>');
        if let Some(text) = &element.text {
            out.push_str(&escape_text(text));
        }
        for child in &element.children {
            self.write(child, &[], out);
        }
        out.push_str(&format!("</{tag}>"));
    }
}

fn collect_text(element: &Element, out: &mut String) {
    if let Some(text) = &element.text {
        out.push_str(text);
    }
    for child in &element.children {
        collect_text(child, out);
    }
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\r', "&#13;")
        .replace('\n', "&#10;")
        .replace('\t', "&#09;")
}

fn encode_chars(value: &str, encoding: TextEncoding) -> String {
    let Some(max) = encoding.max_char() else {
        return value.to_string();
    };
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c as u32 > max {
            out.push_str(&format!("&#{};", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}
