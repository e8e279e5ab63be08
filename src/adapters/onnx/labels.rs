use anyhow::{bail, Context, Result};
use std::fs;

pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket",
    "bottle", "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana",
    "apple", "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza",
    "donut", "cake", "chair", "couch", "potted plant", "bed", "dining table", "toilet", "tv",
    "laptop", "mouse", "remote", "keyboard", "cell phone", "microwave", "oven", "toaster",
    "sink", "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Tabla id de clase → etiqueta del modelo cargado.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn coco() -> Self {
        Self { labels: COCO_CLASSES.iter().map(|s| s.to_string()).collect() }
    }

    /// Una etiqueta por línea; las líneas vacías se ignoran.
    pub fn parse(text: &str) -> Result<Self> {
        let labels: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if labels.is_empty() {
            bail!("label file has no labels");
        }
        Ok(Self { labels })
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading labels {}", path))?;
        Self::parse(&text)
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coco_ids() {
        let t = LabelTable::coco();
        assert_eq!(t.len(), 80);
        assert_eq!(t.get(0), Some("person"));
        assert_eq!(t.get(16), Some("dog"));
        assert_eq!(t.get(80), None);
    }

    #[test]
    fn parse_skips_blank_lines() {
        let t = LabelTable::parse("background\n\n  cat \ndog\n").unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(1), Some("cat"));
        assert!(LabelTable::parse("\n \n").is_err());
    }
}
