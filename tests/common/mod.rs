#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// One `<object>` of a generated VOC document.
pub struct ObjectSpec<'a> {
    pub name: &'a str,
    pub difficult: Option<u8>,
    /// `(xmin, xmax, ymin, ymax)`.
    pub bbox: (f64, f64, f64, f64),
}

impl<'a> ObjectSpec<'a> {
    pub fn new(name: &'a str, bbox: (f64, f64, f64, f64)) -> Self {
        Self {
            name,
            difficult: None,
            bbox,
        }
    }

    pub fn difficult(mut self, flag: u8) -> Self {
        self.difficult = Some(flag);
        self
    }
}

/// Renders a VOC annotation document. `<bndbox>` children are written in the
/// conventional xmin, ymin, xmax, ymax document order.
pub fn voc_xml(width: u32, height: u32, objects: &[ObjectSpec<'_>]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<annotation>\n");
    xml.push_str("  <folder>VOC2007</folder>\n");
    xml.push_str(&format!(
        "  <size>\n    <width>{width}</width>\n    <height>{height}</height>\n    <depth>3</depth>\n  </size>\n"
    ));
    for object in objects {
        let (xmin, xmax, ymin, ymax) = object.bbox;
        xml.push_str("  <object>\n");
        xml.push_str(&format!("    <name>{}</name>\n", object.name));
        xml.push_str("    <pose>Unspecified</pose>\n");
        if let Some(flag) = object.difficult {
            xml.push_str(&format!("    <difficult>{flag}</difficult>\n"));
        }
        xml.push_str(&format!(
            "    <bndbox>\n      <xmin>{xmin}</xmin>\n      <ymin>{ymin}</ymin>\n      <xmax>{xmax}</xmax>\n      <ymax>{ymax}</ymax>\n    </bndbox>\n"
        ));
        xml.push_str("  </object>\n");
    }
    xml.push_str("</annotation>\n");
    xml
}

/// Writes a VOC source root with a manifest for `split` and one image and
/// annotation per entry.
pub fn write_voc_source(root: &Path, split: &str, entries: &[(&str, String)]) {
    fs::create_dir_all(root.join("ImageSets")).expect("create image sets dir");
    fs::create_dir_all(root.join("JPEGImages")).expect("create images dir");
    fs::create_dir_all(root.join("Annotations")).expect("create annotations dir");

    let ids: Vec<&str> = entries.iter().map(|(id, _)| *id).collect();
    fs::write(
        root.join("ImageSets").join(format!("{split}.txt")),
        ids.join("\n") + "\n",
    )
    .expect("write manifest");

    for (id, xml) in entries {
        write_bmp(&root.join("JPEGImages").join(format!("{id}.jpg")), 100, 200);
        fs::write(root.join("Annotations").join(format!("{id}.xml")), xml)
            .expect("write annotation");
    }
}

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

/// Writes BMP bytes to `path`. The `.jpg` name is fine: readers sniff the header.
pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// A pipeline config pointing every path into `root`.
pub fn write_config(root: &Path, strict: bool) -> std::path::PathBuf {
    let path = root.join("pipeline.yaml");
    let yaml = format!(
        "output_dir: {root}/dataset\nstrict: {strict}\nsources:\n  - name: VOC2007\n    root: {root}/VOC2007\n  - name: VOC2012\n    root: {root}/VOC2012\ntrain:\n  data: {root}/data.yaml\n  runs_dir: {root}/runs\n",
        root = root.display()
    );
    fs::write(&path, yaml).expect("write config");
    path
}
