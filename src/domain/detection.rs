use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detection tal como la devuelve el modelo: id de clase y caja en píxeles
/// de la imagen original.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub class_id: usize,
    pub confidence: f32,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RawDetection {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Intersección sobre unión con otra caja.
    pub fn iou(&self, other: &RawDetection) -> f32 {
        let ix1 = self.left.max(other.left);
        let iy1 = self.top.max(other.top);
        let ix2 = self.right.min(other.right);
        let iy2 = self.bottom.min(other.bottom);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// Un objeto detectado, tal como se sirve por HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub class: String,
    pub confidence: f32,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
    pub area: f32,
    pub center: (f32, f32),
}

impl DetectionResult {
    /// Construye el registro servido; ancho, alto, área y centro se derivan
    /// de la caja para que siempre coincidan con ella.
    pub fn from_raw(raw: &RawDetection, class: impl Into<String>) -> Self {
        let width = raw.right - raw.left;
        let height = raw.bottom - raw.top;
        Self {
            class: class.into(),
            confidence: raw.confidence,
            left: raw.left,
            top: raw.top,
            right: raw.right,
            bottom: raw.bottom,
            width,
            height,
            area: width * height,
            center: ((raw.left + raw.right) / 2.0, (raw.top + raw.bottom) / 2.0),
        }
    }
}

/// Resumen estilo "2 person, 1 dog" para los logs.
pub fn summarize_detections(detections: &[DetectionResult]) -> String {
    let mut counts = BTreeMap::new();
    for det in detections {
        *counts.entry(det.class.as_str()).or_insert(0) += 1;
    }
    counts
        .iter()
        .map(|(label, count)| format!("{} {}", count, label))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(left: f32, top: f32, right: f32, bottom: f32) -> RawDetection {
        RawDetection { class_id: 16, confidence: 0.87, left, top, right, bottom }
    }

    #[test]
    fn derived_fields_follow_the_box() {
        let det = DetectionResult::from_raw(&raw(10.0, 20.0, 110.0, 220.0), "dog");
        assert_eq!(det.width, 100.0);
        assert_eq!(det.height, 200.0);
        assert_eq!(det.area, 20000.0);
        assert_eq!(det.center, (60.0, 120.0));
    }

    #[test]
    fn serializes_with_class_key_and_center_pair() {
        let det = DetectionResult::from_raw(&raw(10.0, 20.0, 110.0, 220.0), "dog");
        let v = serde_json::to_value(&det).unwrap();
        assert_eq!(v["class"], "dog");
        assert!(v.get("label").is_none());
        assert_eq!(v["center"][0].as_f64(), Some(60.0));
        assert_eq!(v["center"][1].as_f64(), Some(120.0));
        assert!((v["confidence"].as_f64().unwrap() - 0.87).abs() < 1e-6);
    }

    #[test]
    fn summary_counts_per_class() {
        let dets = vec![
            DetectionResult::from_raw(&raw(0.0, 0.0, 1.0, 1.0), "person"),
            DetectionResult::from_raw(&raw(0.0, 0.0, 1.0, 1.0), "dog"),
            DetectionResult::from_raw(&raw(0.0, 0.0, 1.0, 1.0), "person"),
        ];
        assert_eq!(summarize_detections(&dets), "1 dog, 2 person");
        assert_eq!(summarize_detections(&[]), "");
    }

    #[test]
    fn iou_of_identical_and_disjoint_boxes() {
        let a = raw(0.0, 0.0, 10.0, 10.0);
        let b = raw(20.0, 20.0, 30.0, 30.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_half_overlap() {
        let a = raw(0.0, 0.0, 10.0, 10.0);
        let b = raw(5.0, 0.0, 15.0, 10.0);
        // 50 / 150
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }
}
