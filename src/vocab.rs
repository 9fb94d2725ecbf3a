//! The ordered class vocabulary shared by conversion, preview and training.
//!
//! A class id is the zero-based position of a name in the vocabulary, so the
//! ORDER is part of the label-file contract: reordering invalidates every label
//! file already produced against it. Every consumer receives the same
//! [`ClassVocabulary`] value instead of its own copy of the list.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Voc2YoloError;

/// Bumped whenever [`VOC_CLASSES`] changes in a way that alters class ids.
pub const VOC_CLASSES_VERSION: u32 = 1;

/// The 20 Pascal VOC categories in class-id order.
pub const VOC_CLASSES: [&str; 20] = [
    "aeroplane",
    "bicycle",
    "bird",
    "boat",
    "bottle",
    "bus",
    "car",
    "cat",
    "chair",
    "cow",
    "diningtable",
    "dog",
    "horse",
    "motorbike",
    "person",
    "pottedplant",
    "sheep",
    "sofa",
    "train",
    "tvmonitor",
];

/// An ordered, duplicate-free list of class names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassVocabulary {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ClassVocabulary {
    /// Builds a vocabulary from names in class-id order.
    ///
    /// Empty and duplicate names are rejected: either would make the
    /// name-to-id mapping ambiguous.
    pub fn new<I, S>(names: I) -> Result<Self, Voc2YoloError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());

        for (class_id, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(Voc2YoloError::VocabularyInvalid(format!(
                    "class {class_id} has an empty name"
                )));
            }
            if let Some(first) = index.insert(name.clone(), class_id) {
                return Err(Voc2YoloError::VocabularyInvalid(format!(
                    "duplicate class name '{name}' at positions {first} and {class_id}"
                )));
            }
        }

        Ok(Self { names, index })
    }

    /// The built-in Pascal VOC vocabulary.
    pub fn pascal_voc() -> Self {
        let names: Vec<String> = VOC_CLASSES.iter().map(|s| s.to_string()).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(class_id, name)| (name.clone(), class_id))
            .collect();
        Self { names, index }
    }

    /// Reads a `classes.txt` file: one class name per line, in id order.
    pub fn from_classes_txt(path: &Path) -> Result<Self, Voc2YoloError> {
        let data = fs::read_to_string(path).map_err(Voc2YoloError::Io)?;
        let mut names = Vec::new();

        for (line_idx, line) in data.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Err(Voc2YoloError::ClassesTxtInvalid {
                    path: path.to_path_buf(),
                    message: format!("line {} is empty", line_idx + 1),
                });
            }
            names.push(trimmed.to_string());
        }

        let vocab = Self::new(names).map_err(|err| Voc2YoloError::ClassesTxtInvalid {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        if vocab.is_empty() {
            return Err(Voc2YoloError::ClassesTxtInvalid {
                path: path.to_path_buf(),
                message: "no class names".to_string(),
            });
        }
        Ok(vocab)
    }

    /// Writes the vocabulary as `classes.txt`, one name per line in id order.
    ///
    /// This is the form read by [`from_classes_txt`](Self::from_classes_txt)
    /// and by inference consumers of an exported model.
    pub fn write_classes_txt(&self, path: &Path) -> Result<(), Voc2YoloError> {
        let mut out = String::new();
        for name in &self.names {
            out.push_str(name);
            out.push('\n');
        }
        fs::write(path, out).map_err(Voc2YoloError::Io)
    }

    /// Zero-based class id of `name`, if it is in the vocabulary.
    #[inline]
    pub fn class_id(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Class name for `class_id`, if in range.
    #[inline]
    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    /// [`VOC_CLASSES_VERSION`] when this is the built-in VOC list, `None` for a
    /// custom vocabulary.
    pub fn version(&self) -> Option<u32> {
        self.names
            .iter()
            .map(String::as_str)
            .eq(VOC_CLASSES)
            .then_some(VOC_CLASSES_VERSION)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ClassVocabulary {
    fn default() -> Self {
        Self::pascal_voc()
    }
}
