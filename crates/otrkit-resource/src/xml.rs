//! A small owned XML document model for XML-encoded resources.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{DecodeError, Result};

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlNode,
}

/// One element with its attributes and children in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub text: String,
}

impl XmlDocument {
    /// Parse a document from UTF-8 bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)?;
        Self::parse_str(text)
    }

    /// Parse a document from text.
    pub fn parse_str(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(XmlNode::from_start(&e)?),
                Ok(Event::Empty(e)) => {
                    let node = XmlNode::from_start(&e)?;
                    attach(&mut stack, &mut root, node);
                }
                Ok(Event::End(_)) => {
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(node) = stack.last_mut() {
                        let text = e.unescape().map_err(|e| DecodeError::Xml(e.to_string()))?;
                        node.text.push_str(text.trim());
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(DecodeError::Xml(format!("parse error: {e}"))),
            }
        }

        if !stack.is_empty() {
            return Err(DecodeError::Xml("unclosed element".to_string()));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| DecodeError::Xml("no root element".to_string()))
    }

    /// The root element.
    pub fn root(&self) -> &XmlNode {
        &self.root
    }
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        // Only the first top-level element counts.
        None => {
            root.get_or_insert(node);
        }
    }
}

impl XmlNode {
    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let mut node = XmlNode {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            ..Default::default()
        };

        for attr in e.attributes() {
            let attr = attr.map_err(|e| DecodeError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| DecodeError::Xml(e.to_string()))?
                .into_owned();
            node.attributes.push((key, value));
        }
        Ok(node)
    }

    /// Look up an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Look up a required attribute.
    pub fn required(&self, name: &str) -> Result<&str> {
        self.attr(name).ok_or_else(|| DecodeError::MissingAttribute {
            element: self.name.clone(),
            attribute: name.to_string(),
        })
    }

    /// The error for an attribute value that failed to parse.
    pub fn invalid(&self, attribute: &str, value: &str) -> DecodeError {
        DecodeError::InvalidAttribute {
            element: self.name.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    /// Parse a required integer attribute. Accepts decimal, `0x` hex and a
    /// leading minus sign.
    pub fn int<T: TryFrom<i64>>(&self, name: &str) -> Result<T> {
        let value = self.required(name)?;
        parse_int(value)
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| self.invalid(name, value))
    }

    /// Parse an optional integer attribute, falling back to `default`.
    pub fn int_or<T: TryFrom<i64>>(&self, name: &str, default: T) -> Result<T> {
        match self.attr(name) {
            Some(_) => self.int(name),
            None => Ok(default),
        }
    }

    /// Parse a required float attribute.
    pub fn float(&self, name: &str) -> Result<f32> {
        let value = self.required(name)?;
        value.trim().parse().map_err(|_| self.invalid(name, value))
    }

    /// Parse an optional boolean attribute (`true`/`false`/`1`/`0`).
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.attr(name) {
            None => Ok(false),
            Some("true" | "1") => Ok(true),
            Some("false" | "0") => Ok(false),
            Some(other) => Err(self.invalid(name, other)),
        }
    }

    /// Iterate over child elements.
    pub fn children(&self) -> impl Iterator<Item = &XmlNode> + '_ {
        self.children.iter()
    }
}

/// Parse an integer in decimal or `0x` hex, with an optional sign.
pub fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };

    Some(if negative { -magnitude } else { magnitude })
}
