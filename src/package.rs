//! Loading a [`Deck`] from an unpacked `.pptx` directory.
//!
//! Parts are followed through their relationships: presentation to masters
//! and slides, slide to layout, layout to master, master to theme. Layouts,
//! masters and themes are loaded once and shared by every part that refers
//! to them.

use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
};

use crate::{
    deck::{Deck, Master, Shape, Slide},
    error::LoadError,
    model::{MasterId, PlaceholderRole, ShapeId, ThemeId},
    ooxml::{self, Relationship},
    style::{Level, StyleRecord},
    tag::Element,
};

const PRESENTATION: &str = "ppt/presentation.xml";

impl Deck {
    /// Loads the package unzipped at `dir`.
    pub fn open(dir: &Path) -> Result<Deck, LoadError> {
        Loader::new(dir).load()
    }
}

/// Placeholders a part offers to the parts that inherit from it.
#[derive(Debug, Clone, Default)]
struct Placeholders {
    master: Option<MasterId>,
    shapes: Vec<ShapeId>,
}

/// How a shape's placeholder finds the placeholder it inherits from.
#[derive(Debug, Clone, Copy)]
enum Inherit<'s> {
    /// master placeholders are the top of the chain
    Nothing,
    /// slide to layout: same `idx`, else same type
    FromLayout(&'s [ShapeId]),
    /// layout to master: the master placeholder of the counterpart type
    FromMaster(&'s [ShapeId]),
}

struct Loader<'p> {
    root: &'p Path,
    deck: Deck,
    themes: HashMap<PathBuf, ThemeId>,
    masters: HashMap<PathBuf, Placeholders>,
    layouts: HashMap<PathBuf, Placeholders>,
}

impl<'p> Loader<'p> {
    fn new(root: &'p Path) -> Self {
        Self {
            root,
            deck: Deck::new(),
            themes: HashMap::new(),
            masters: HashMap::new(),
            layouts: HashMap::new(),
        }
    }

    fn load(mut self) -> Result<Deck, LoadError> {
        let part = self.presentation_part()?;
        let presentation = self.read(&part)?;
        let rels = self.relationships(&part)?;

        let mut first_theme = None;
        let masters = presentation
            .child("p:sldMasterIdLst")
            .map(|list| targets(list, "p:sldMasterId", &part, &rels))
            .unwrap_or_default();
        for master in masters {
            let placeholders = self.master(&master)?;
            if let Some(id) = placeholders.master {
                first_theme = first_theme.or(self.deck.master(id).theme);
            }
        }

        let slides = presentation
            .child("p:sldIdLst")
            .map(|list| targets(list, "p:sldId", &part, &rels))
            .unwrap_or_default();
        for slide in slides {
            self.slide(&slide)?;
        }

        let theme = match rels.values().find(|rel| rel.kind == "theme") {
            Some(rel) => Some(self.theme(&resolve_target(&part, &rel.target))?),
            None => first_theme,
        };
        self.deck.set_default_theme(theme);
        self.deck.set_default_text_style(
            presentation
                .child("p:defaultTextStyle")
                .map(ooxml::level_styles),
        );

        log::info!(
            "Loaded {} slides and {} shapes from {:?}",
            self.deck.slides().len(),
            self.deck.shape_count(),
            self.root
        );
        Ok(self.deck)
    }

    /// The office document named by the package relationships, or the
    /// conventional location when the package has none.
    fn presentation_part(&self) -> Result<PathBuf, LoadError> {
        let package = PathBuf::from("_rels/.rels");
        if !self.root.join(&package).is_file() {
            log::warn!("package has no _rels/.rels, assuming {PRESENTATION}");
            return Ok(PathBuf::from(PRESENTATION));
        }
        let rels = ooxml::relationships(&self.read(&package)?);
        Ok(rels
            .values()
            .find(|rel| rel.kind == "officeDocument")
            .map(|rel| resolve_target(Path::new(""), &rel.target))
            .unwrap_or_else(|| PathBuf::from(PRESENTATION)))
    }

    fn read(&self, part: &Path) -> Result<Element, LoadError> {
        let path = self.root.join(part);
        if !path.is_file() {
            return Err(LoadError::MissingPart(part.to_path_buf()));
        }
        Element::read(&path)
    }

    /// The part's relationships; a part without a `.rels` has none.
    fn relationships(&self, part: &Path) -> Result<HashMap<String, Relationship>, LoadError> {
        let rels = rels_path(part);
        if !self.root.join(&rels).is_file() {
            log::debug!("{part:?} has no relationships");
            return Ok(HashMap::new());
        }
        Ok(ooxml::relationships(&self.read(&rels)?))
    }

    fn theme(&mut self, part: &Path) -> Result<ThemeId, LoadError> {
        if let Some(&id) = self.themes.get(part) {
            return Ok(id);
        }
        let theme = ooxml::theme(&self.read(part)?);
        log::debug!("Theme {:?} from {part:?}", theme.name);
        let id = self.deck.add_theme(theme);
        self.themes.insert(part.to_path_buf(), id);
        Ok(id)
    }

    fn master(&mut self, part: &Path) -> Result<Placeholders, LoadError> {
        if let Some(placeholders) = self.masters.get(part) {
            return Ok(placeholders.clone());
        }
        let element = self.read(part)?;
        let rels = self.relationships(part)?;
        let theme = match related(&rels, "theme", part) {
            Some(theme) => Some(self.theme(&theme)?),
            None => {
                log::warn!("master {part:?} has no theme");
                None
            }
        };
        let styles = element.child("p:txStyles");
        let style = |tag: &str| {
            styles
                .and_then(|styles| styles.child(tag))
                .map(ooxml::level_styles)
        };
        let id = self.deck.add_master(Master {
            name: part_name(part),
            theme,
            color_map: element.child("p:clrMap").map(ooxml::color_map),
            title_style: style("p:titleStyle"),
            body_style: style("p:bodyStyle"),
            other_style: style("p:otherStyle"),
        });

        let mut shapes = vec![];
        if let Some(tree) = shape_tree(&element) {
            add_shapes(&mut self.deck, tree, Some(id), Inherit::Nothing, &mut shapes);
        }
        let placeholders = Placeholders {
            master: Some(id),
            shapes: placeholders_of(&self.deck, shapes),
        };
        self.masters.insert(part.to_path_buf(), placeholders.clone());
        Ok(placeholders)
    }

    fn layout(&mut self, part: &Path) -> Result<Placeholders, LoadError> {
        if let Some(placeholders) = self.layouts.get(part) {
            return Ok(placeholders.clone());
        }
        let element = self.read(part)?;
        let rels = self.relationships(part)?;
        let master = match related(&rels, "slideMaster", part) {
            Some(master) => self.master(&master)?,
            None => {
                log::warn!("layout {part:?} has no slide master");
                Placeholders::default()
            }
        };

        let mut shapes = vec![];
        if let Some(tree) = shape_tree(&element) {
            add_shapes(
                &mut self.deck,
                tree,
                master.master,
                Inherit::FromMaster(&master.shapes),
                &mut shapes,
            );
        }
        let placeholders = Placeholders {
            master: master.master,
            shapes: placeholders_of(&self.deck, shapes),
        };
        self.layouts.insert(part.to_path_buf(), placeholders.clone());
        Ok(placeholders)
    }

    fn slide(&mut self, part: &Path) -> Result<(), LoadError> {
        let element = self.read(part)?;
        let rels = self.relationships(part)?;
        let layout = match related(&rels, "slideLayout", part) {
            Some(layout) => self.layout(&layout)?,
            None => {
                log::warn!("slide {part:?} has no layout");
                Placeholders::default()
            }
        };

        let mut shapes = vec![];
        if let Some(tree) = shape_tree(&element) {
            add_shapes(
                &mut self.deck,
                tree,
                layout.master,
                Inherit::FromLayout(&layout.shapes),
                &mut shapes,
            );
        }
        log::debug!("Slide {part:?} has {} shapes", shapes.len());
        self.deck.add_slide(Slide {
            name: part_name(part),
            shapes,
        });
        Ok(())
    }
}

fn shape_tree(part: &Element) -> Option<&Element> {
    part.find(&["p:cSld", "p:spTree"])
}

/// Walks `p:spTree` or `p:grpSp`, adding every `p:sp` with its text.
fn add_shapes(
    deck: &mut Deck,
    tree: &Element,
    master: Option<MasterId>,
    inherit: Inherit<'_>,
    out: &mut Vec<ShapeId>,
) {
    for child in &tree.children {
        match child.tag.as_str() {
            "p:sp" => out.push(add_shape(deck, child, master, inherit)),
            "p:grpSp" => add_shapes(deck, child, master, inherit, out),
            "p:graphicFrame" => add_table(deck, child, master, out),
            "p:nvGrpSpPr" | "p:grpSpPr" | "p:extLst" => continue,
            other => log::debug!("skipping {other:?}"),
        }
    }
}

fn add_shape(
    deck: &mut Deck,
    element: &Element,
    master: Option<MasterId>,
    inherit: Inherit<'_>,
) -> ShapeId {
    let properties = element.child("p:nvSpPr");
    let name = properties
        .and_then(|properties| properties.child("p:cNvPr"))
        .and_then(|cnv| cnv.attribute("name"))
        .unwrap_or_default()
        .to_string();
    let (placeholder, placeholder_index) = match properties
        .and_then(|properties| properties.find(&["p:nvPr", "p:ph"]))
        .map(ooxml::placeholder)
    {
        Some((role, index)) => (Some(role), index),
        None => (None, None),
    };
    let placeholder_parent =
        placeholder.and_then(|role| placeholder_parent(deck, inherit, role, placeholder_index));
    if placeholder.is_some() && placeholder_parent.is_none() && !matches!(inherit, Inherit::Nothing)
    {
        log::debug!("placeholder {name:?} has no parent placeholder");
    }

    let body = element.child("p:txBody");
    let id = deck.add_shape(Shape {
        name,
        master,
        placeholder,
        placeholder_index,
        placeholder_parent,
        list_style: body
            .and_then(|body| body.child("a:lstStyle"))
            .map(ooxml::level_styles)
            .filter(|table| !table.is_empty()),
        font_reference: element
            .find(&["p:style", "a:fontRef"])
            .and_then(ooxml::color_choice),
    });

    if let Some(body) = body {
        add_text(deck, id, body);
    }
    id
}

/// Each cell of a `p:graphicFrame` table becomes a shape of its own, named
/// after the frame. Tables are never placeholders.
fn add_table(
    deck: &mut Deck,
    frame: &Element,
    master: Option<MasterId>,
    out: &mut Vec<ShapeId>,
) {
    let Some(table) = frame.find(&["a:graphic", "a:graphicData", "a:tbl"]) else {
        log::debug!("skipping graphic frame without a table");
        return;
    };
    let name = frame
        .find(&["p:nvGraphicFramePr", "p:cNvPr"])
        .and_then(|cnv| cnv.attribute("name"))
        .unwrap_or_default();
    for cell in table
        .children_named("a:tr")
        .flat_map(|row| row.children_named("a:tc"))
    {
        let Some(body) = cell.child("a:txBody") else {
            continue;
        };
        let id = deck.add_shape(Shape {
            name: name.to_string(),
            master,
            list_style: body
                .child("a:lstStyle")
                .map(ooxml::level_styles)
                .filter(|table| !table.is_empty()),
            ..Default::default()
        });
        add_text(deck, id, body);
        out.push(id);
    }
}

/// Paragraphs and runs of a `p:txBody` or `a:txBody`.
fn add_text(deck: &mut Deck, id: ShapeId, body: &Element) {
    for paragraph in body.children_named("a:p") {
        let indent = paragraph
            .child("a:pPr")
            .and_then(|properties| properties.attribute("lvl"))
            .and_then(|lvl| lvl.parse::<u8>().ok())
            .unwrap_or(0);
        let paragraph_id = deck.add_paragraph(id, Level::from_indent(indent));
        for run in &paragraph.children {
            if run.tag != "a:r" && run.tag != "a:fld" {
                continue;
            }
            let text = run.child("a:t").map(|t| t.text.as_str()).unwrap_or_default();
            let properties: Option<StyleRecord> = run.child("a:rPr").map(ooxml::run_properties);
            deck.add_run(paragraph_id, text, properties);
        }
    }
}

fn placeholder_parent(
    deck: &Deck,
    inherit: Inherit<'_>,
    role: PlaceholderRole,
    index: Option<u32>,
) -> Option<ShapeId> {
    let find = |candidates: &[ShapeId], wanted: &dyn Fn(&Shape) -> bool| {
        candidates
            .iter()
            .copied()
            .find(|&candidate| wanted(deck.shape(candidate)))
    };
    match inherit {
        Inherit::Nothing => None,
        Inherit::FromLayout(candidates) => index
            .and_then(|index| {
                find(candidates, &|shape: &Shape| {
                    shape.placeholder_index == Some(index)
                })
            })
            .or_else(|| find(candidates, &|shape: &Shape| shape.placeholder == Some(role))),
        Inherit::FromMaster(candidates) => {
            let wanted = role.master_counterpart();
            find(candidates, &|shape: &Shape| shape.placeholder == Some(wanted))
        }
    }
}

fn placeholders_of(deck: &Deck, shapes: Vec<ShapeId>) -> Vec<ShapeId> {
    shapes
        .into_iter()
        .filter(|&shape| deck.shape(shape).placeholder.is_some())
        .collect()
}

/// Targets of the `r:id`s in a `p:sldIdLst` or `p:sldMasterIdLst`, in order.
fn targets(
    list: &Element,
    tag: &str,
    part: &Path,
    rels: &HashMap<String, Relationship>,
) -> Vec<PathBuf> {
    list.children_named(tag)
        .filter_map(|entry| {
            let id = match entry.required("r:id") {
                Ok(id) => id,
                Err(e) => {
                    log::error!("{e}");
                    return None;
                }
            };
            match rels.get(id) {
                Some(rel) => Some(resolve_target(part, &rel.target)),
                None => {
                    log::error!("{tag} relies on a missing relationship {id:?}");
                    None
                }
            }
        })
        .collect()
}

/// The first internal relationship of `kind`.
fn related(rels: &HashMap<String, Relationship>, kind: &str, part: &Path) -> Option<PathBuf> {
    rels.values()
        .find(|rel| rel.kind == kind && !rel.external)
        .map(|rel| resolve_target(part, &rel.target))
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
fn rels_path(part: &Path) -> PathBuf {
    let name = part
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut rels = part.parent().map(Path::to_path_buf).unwrap_or_default();
    rels.push("_rels");
    rels.push(format!("{name}.rels"));
    rels
}

/// Resolves a relationship target against the part that declares it.
/// Absolute targets are relative to the package root.
fn resolve_target(part: &Path, target: &str) -> PathBuf {
    let (base, target) = match target.strip_prefix('/') {
        Some(absolute) => (PathBuf::new(), absolute),
        None => (
            part.parent().map(Path::to_path_buf).unwrap_or_default(),
            target,
        ),
    };
    let mut resolved = PathBuf::new();
    for component in base.join(target).components() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(segment) => resolved.push(segment),
            _ => continue,
        }
    }
    resolved
}

fn part_name(part: &Path) -> String {
    part.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
