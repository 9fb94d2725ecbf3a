//! Pascal VOC XML annotation parser.
//!
//! Only the parts of a VOC document the converter consumes are extracted:
//! `<size>` and each `<object>`'s `<name>`, `<difficult>` and `<bndbox>`.
//! Object fields are kept as raw text and parsed on demand, so that an object
//! the converter filters out never fails the whole document because of a
//! malformed box.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use crate::error::Voc2YoloError;
use crate::geometry::{ImageSize, VocBox};

/// One parsed VOC annotation document.
#[derive(Clone, Debug)]
pub struct VocAnnotation {
    pub size: ImageSize,
    pub objects: Vec<VocObject>,
}

/// One `<object>` element, in document order.
#[derive(Clone, Debug)]
pub struct VocObject {
    name: Option<String>,
    difficult: Option<i64>,
    bndbox: Option<RawBndBox>,
}

#[derive(Clone, Debug)]
struct RawBndBox {
    xmin: Option<String>,
    xmax: Option<String>,
    ymin: Option<String>,
    ymax: Option<String>,
}

impl VocObject {
    /// True when `<difficult>` is present and equal to 1.
    #[inline]
    pub fn is_difficult(&self) -> bool {
        self.difficult == Some(1)
    }

    /// The `<name>` text exactly as written, or `None` if the element is absent.
    ///
    /// An empty `<name/>` yields `Some("")`.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The class label, failing only if the `<name>` element is missing.
    pub fn required_name(&self, path: &Path) -> Result<&str, Voc2YoloError> {
        self.name().ok_or_else(|| parse_error(path, "missing <name> in <object>"))
    }

    /// Parses `<bndbox>` into a [`VocBox`].
    ///
    /// Coordinates are read as `xmin`, `xmax`, `ymin`, `ymax`, in that order.
    pub fn bbox(&self, path: &Path) -> Result<VocBox, Voc2YoloError> {
        let raw = self
            .bndbox
            .as_ref()
            .ok_or_else(|| parse_error(path, "missing <bndbox> in <object>"))?;

        let xmin = parse_coordinate(raw.xmin.as_deref(), "xmin", path)?;
        let xmax = parse_coordinate(raw.xmax.as_deref(), "xmax", path)?;
        let ymin = parse_coordinate(raw.ymin.as_deref(), "ymin", path)?;
        let ymax = parse_coordinate(raw.ymax.as_deref(), "ymax", path)?;

        Ok(VocBox::new(xmin, xmax, ymin, ymax))
    }
}

/// Reads and parses a VOC XML file.
pub fn read_voc_annotation(path: &Path) -> Result<VocAnnotation, Voc2YoloError> {
    let xml = fs::read_to_string(path).map_err(Voc2YoloError::Io)?;
    parse_voc_annotation_str(&xml, path)
}

/// Parses VOC XML from a UTF-8 string. `path` is only used in error messages.
pub fn parse_voc_annotation_str(xml: &str, path: &Path) -> Result<VocAnnotation, Voc2YoloError> {
    let document = roxmltree::Document::parse(xml)
        .map_err(|source| parse_error(path, &source.to_string()))?;

    let annotation = document.root_element();
    if annotation.tag_name().name() != "annotation" {
        return Err(parse_error(path, "missing <annotation> root element"));
    }

    let size = child_element(annotation, "size")
        .ok_or_else(|| parse_error(path, "missing <size> in <annotation>"))?;
    let width = parse_required_u32(size, "width", path)?;
    let height = parse_required_u32(size, "height", path)?;

    let mut objects = Vec::new();
    for object in annotation
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        let difficult = optional_child_text(object, "difficult")
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| {
                    parse_error(
                        path,
                        &format!("invalid <difficult> value '{raw}' in <object>; expected integer"),
                    )
                })
            })
            .transpose()?;

        let bndbox = child_element(object, "bndbox").map(|bndbox| RawBndBox {
            xmin: optional_child_text(bndbox, "xmin"),
            xmax: optional_child_text(bndbox, "xmax"),
            ymin: optional_child_text(bndbox, "ymin"),
            ymax: optional_child_text(bndbox, "ymax"),
        });

        objects.push(VocObject {
            name: child_element(object, "name")
                .map(|name| name.text().unwrap_or_default().to_owned()),
            difficult,
            bndbox,
        });
    }

    Ok(VocAnnotation {
        size: ImageSize::new(width, height),
        objects,
    })
}

/// Parses VOC XML from bytes, discarding the result.
///
/// The input must be valid UTF-8. Used by the fuzz target.
pub fn from_voc_xml_slice(bytes: &[u8]) -> Result<(), Voc2YoloError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| Voc2YoloError::VocXmlParse {
        path: PathBuf::from("<memory>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    parse_voc_annotation_str(xml, Path::new("<memory>"))?;
    Ok(())
}

fn parse_error(path: &Path, message: &str) -> Voc2YoloError {
    Voc2YoloError::VocXmlParse {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn parse_required_u32(node: Node<'_, '_>, tag: &str, path: &Path) -> Result<u32, Voc2YoloError> {
    let raw = optional_child_text(node, tag)
        .ok_or_else(|| parse_error(path, &format!("missing <{tag}> in <size>")))?;
    raw.parse::<u32>().map_err(|_| {
        parse_error(
            path,
            &format!("invalid <{tag}> value '{raw}' in <size>; expected u32"),
        )
    })
}

fn parse_coordinate(raw: Option<&str>, tag: &str, path: &Path) -> Result<f64, Voc2YoloError> {
    let raw = raw.ok_or_else(|| parse_error(path, &format!("missing <{tag}> in <bndbox>")))?;
    raw.parse::<f64>().map_err(|_| {
        parse_error(
            path,
            &format!("invalid <{tag}> value '{raw}' in <bndbox>; expected floating-point number"),
        )
    })
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}
