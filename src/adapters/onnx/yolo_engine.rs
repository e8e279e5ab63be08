use anyhow::{anyhow, Result};
use image::{imageops::FilterType, RgbImage};
use ndarray::{ArrayViewD, Axis, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Value;
use std::collections::HashMap;
use std::fs;
use tracing::info;

use crate::domain::detection::RawDetection;
use crate::domain::model::YoloParams;

pub struct OnnxYoloEngine {
    session: Session,
    params: YoloParams,
}

impl OnnxYoloEngine {
    pub fn load(path: &str, params: YoloParams) -> Result<Self> {
        let mut builder = Session::builder()?.with_intra_threads(4)?;

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let model_bytes = fs::read(path)?;
        let session = builder.commit_from_memory(&model_bytes)?;
        info!(path, input_size = params.input_size, "ONNX session ready");

        Ok(Self { session, params })
    }

    pub fn infer(&mut self, rgb: &RgbImage) -> Result<Vec<RawDetection>> {
        let imgsz = self.params.input_size as usize;
        let resized = image::imageops::resize(rgb, imgsz as u32, imgsz as u32, FilterType::Triangle);

        // NCHW, 0..1
        let plane = imgsz * imgsz;
        let mut input = vec![0f32; 3 * plane];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let i = y as usize * imgsz + x as usize;
            input[i] = pixel[0] as f32 / 255.0;
            input[plane + i] = pixel[1] as f32 / 255.0;
            input[2 * plane + i] = pixel[2] as f32 / 255.0;
        }

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let input_tensor = Value::from_array((input_shape, input))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
        if dims.len() != 3 || dims[1] <= 4 {
            return Err(anyhow!("unexpected YOLO output shape {:?}", dims));
        }
        let array_view = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;
        let view = array_view.index_axis(Axis(0), 0);

        let candidates = decode_candidates(
            view.shape()[1],
            |row, i| view[[row, i]],
            view.shape()[0] - 4,
            &self.params,
            (rgb.width(), rgb.height()),
        );

        Ok(finalize(candidates, &self.params))
    }
}

/// Convierte la salida YOLO `[4 + clases, candidatos]` en cajas en píxeles
/// de la imagen original, quedándose con la mejor clase de cada candidato si
/// supera el umbral de confianza.
pub fn decode_candidates(
    num_candidates: usize,
    at: impl Fn(usize, usize) -> f32,
    num_classes: usize,
    params: &YoloParams,
    (img_w, img_h): (u32, u32),
) -> Vec<RawDetection> {
    let imgsz = params.input_size as f32;
    let sx = img_w as f32 / imgsz;
    let sy = img_h as f32 / imgsz;
    let (max_x, max_y) = (img_w as f32, img_h as f32);

    let mut detections = Vec::new();
    for i in 0..num_candidates {
        let (class_id, score) = (0..num_classes)
            .map(|c| (c, at(4 + c, i)))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        if score < params.conf_threshold {
            continue;
        }

        let cx = at(0, i);
        let cy = at(1, i);
        let w = at(2, i);
        let h = at(3, i);

        detections.push(RawDetection {
            class_id,
            confidence: score,
            left: ((cx - w / 2.0) * sx).clamp(0.0, max_x),
            top: ((cy - h / 2.0) * sy).clamp(0.0, max_y),
            right: ((cx + w / 2.0) * sx).clamp(0.0, max_x),
            bottom: ((cy + h / 2.0) * sy).clamp(0.0, max_y),
        });
    }
    detections
}

/// NMS por clase y después orden de mayor a menor confianza, limitado a `max_detections`.
pub fn finalize(detections: Vec<RawDetection>, params: &YoloParams) -> Vec<RawDetection> {
    let mut kept = nms(detections, params.iou_threshold);
    kept.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    kept.truncate(params.max_detections);
    kept
}

pub fn nms(detections: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    let mut by_class: HashMap<usize, Vec<RawDetection>> = HashMap::new();
    for det in detections {
        by_class.entry(det.class_id).or_default().push(det);
    }

    let mut out = Vec::new();
    for (_, mut group) in by_class {
        group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let mut suppressed = vec![false; group.len()];
        for i in 0..group.len() {
            if suppressed[i] {
                continue;
            }
            for j in (i + 1)..group.len() {
                if !suppressed[j] && group[i].iou(&group[j]) > iou_threshold {
                    suppressed[j] = true;
                }
            }
        }
        out.extend(
            group
                .into_iter()
                .zip(suppressed)
                .filter(|(_, s)| !s)
                .map(|(d, _)| d),
        );
    }
    out
}
