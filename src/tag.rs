use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use xml::{
    name::OwnedName,
    reader::{EventReader, XmlEvent},
};

use crate::error::LoadError;

/// An owned XML element with `prefix:local` names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Character data directly inside this element, whitespace included.
    pub text: String,
}

impl Element {
    pub fn read(path: &Path) -> Result<Element, LoadError> {
        log::debug!("Reading {path:?}");
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Element::parse(BufReader::new(file), path)
    }

    pub fn parse_str(xml: &str) -> Result<Element, LoadError> {
        Element::parse(xml.as_bytes(), Path::new("<memory>"))
    }

    /// Builds the tree of the document's root element. `path` only labels errors.
    pub fn parse<R: Read>(source: R, path: &Path) -> Result<Element, LoadError> {
        let mut stack: Vec<Element> = vec![];
        for event in EventReader::new(source) {
            let event = event.map_err(|source| LoadError::Xml {
                path: path.to_path_buf(),
                source,
            })?;
            match event {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => {
                    let tag = normalize(&name);
                    log::trace!("StartElement '{tag}'");
                    stack.push(Element {
                        tag,
                        attributes: attributes
                            .iter()
                            .map(|a| (normalize(&a.name), a.value.clone()))
                            .collect(),
                        ..Default::default()
                    });
                }
                XmlEvent::EndElement { name } => {
                    log::trace!("EndElement '{}'", normalize(&name));
                    if let Some(element) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(element),
                            None => return Ok(element),
                        }
                    }
                }
                XmlEvent::Characters(content)
                | XmlEvent::Whitespace(content)
                | XmlEvent::CData(content) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&content);
                    }
                }
                _ => continue,
            }
        }
        Err(LoadError::EmptyPart(path.to_path_buf()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Like [`Element::attribute`], for attributes the schema requires.
    pub fn required(&self, name: &'static str) -> Result<&str, LoadError> {
        self.attribute(name)
            .ok_or_else(|| LoadError::MissingAttributes {
                id: self.tag.clone(),
                missing: vec![name],
            })
    }

    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.tag == tag)
    }

    pub fn children_named<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = &'s Element> + 's {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// Follows a path of child tags, taking the first match at each step.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |element, tag| element.child(tag))
    }
}

pub fn normalize(raw: &OwnedName) -> String {
    let mut id = if let Some(prefix) = raw.prefix_ref() {
        prefix.to_string() + ":"
    } else {
        "".to_string()
    };
    id.push_str(&raw.local_name);
    id
}
