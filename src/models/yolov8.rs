// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// YOLOv8 检测模型实现
// 包含: 模型加载、预处理、推理、后处理

use anyhow::{anyhow, Result};
use image::{DynamicImage, GenericImageView, RgbaImage};
use ndarray::{s, Array, Axis, IxDyn};
use tracing::debug;

use crate::detection::types::{BBox, Detection, Frame};
use crate::detection::Detector;
use crate::{non_max_suppression, OrtBackend, OrtConfig, OrtEP};

/// YOLOv8 模型配置
#[derive(Debug, Clone)]
pub struct YOLOv8Config {
    pub model: String,
    pub ep: OrtEP,
    pub inf_size: u32,
    pub conf: f32,
    pub iou: f32,
}

/// YOLOv8 检测模型
pub struct YOLOv8 {
    engine: OrtBackend,
    height: u32,
    width: u32,
    conf: f32,
    iou: f32,
}

impl YOLOv8 {
    /// 从配置创建 YOLOv8 模型
    pub fn new(config: YOLOv8Config) -> Result<Self> {
        let engine = OrtBackend::build(OrtConfig {
            f: config.model,
            ep: config.ep,
            image_size: (config.inf_size, config.inf_size),
        })?;

        Ok(Self {
            height: engine.height(),
            width: engine.width(),
            engine,
            conf: config.conf,
            iou: config.iou,
        })
    }

    fn scale_wh(&self, w0: f32, h0: f32, w1: f32, h1: f32) -> (f32, f32, f32) {
        let r = (w1 / w0).min(h1 / h0);
        (r, (w0 * r).round(), (h0 * r).round())
    }

    /// 等比缩放到推理尺寸, 左上角对齐, 其余填充 144/255
    pub fn preprocess(&self, x: &DynamicImage) -> Array<f32, IxDyn> {
        let mut ys = Array::ones((1, 3, self.height as usize, self.width as usize)).into_dyn();
        ys.fill(144.0 / 255.0);

        let (w0, h0) = x.dimensions();
        let (_, w_new, h_new) =
            self.scale_wh(w0 as f32, h0 as f32, self.width as f32, self.height as f32);
        let img = x.resize_exact(
            w_new as u32,
            h_new as u32,
            image::imageops::FilterType::Triangle,
        );

        for (x, y, rgb) in img.pixels() {
            let x = x as usize;
            let y = y as usize;
            let [r, g, b, _] = rgb.0;
            ys[[0, 0, y, x]] = (r as f32) / 255.0;
            ys[[0, 1, y, x]] = (g as f32) / 255.0;
            ys[[0, 2, y, x]] = (b as f32) / 255.0;
        }

        ys
    }

    pub fn run(&mut self, x: &DynamicImage) -> Result<Vec<Detection>> {
        let t_pre = std::time::Instant::now();
        let xs = self.preprocess(x);
        let t_run = std::time::Instant::now();
        let ys = self.engine.run(xs)?;
        let t_post = std::time::Instant::now();
        let detections = self.postprocess(&ys, x.width() as f32, x.height() as f32)?;
        debug!(
            pre = ?(t_run - t_pre),
            inference = ?(t_post - t_run),
            post = ?t_post.elapsed(),
            count = detections.len(),
            "YOLOv8 推理完成"
        );
        Ok(detections)
    }

    /// 后处理: 原始输出 → 检测列表 (像素坐标)
    pub fn postprocess(
        &self,
        preds: &Array<f32, IxDyn>,
        width_original: f32,
        height_original: f32,
    ) -> Result<Vec<Detection>> {
        decode_predictions(
            preds,
            self.engine.names(),
            (self.width, self.height),
            (width_original, height_original),
            self.conf,
            self.iou,
        )
    }

    pub fn summary(&self) {
        tracing::info!(
            "\nSummary:\n\
            > EP: {:?}\n\
            > Height: {}, Width: {}\n\
            > nc: {}, conf: {}, iou: {}",
            self.engine.ep(),
            self.height,
            self.width,
            self.engine.names().len(),
            self.conf,
            self.iou,
        );
    }
}

impl Detector for YOLOv8 {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.rgba_data.to_vec())
            .ok_or_else(|| {
                anyhow!(
                    "RGBA buffer of {} bytes does not match {}x{}",
                    frame.rgba_data.len(),
                    frame.width,
                    frame.height
                )
            })?;
        self.run(&DynamicImage::ImageRgba8(rgba))
    }
}

/// 解码 YOLOv8 输出 `[1, 4 + nc, N]`
///
/// * `input`    - 推理尺寸 (width, height)
/// * `original` - 原图尺寸 (width, height), 用于坐标还原
pub fn decode_predictions(
    preds: &Array<f32, IxDyn>,
    names: &[String],
    input: (u32, u32),
    original: (f32, f32),
    conf: f32,
    iou: f32,
) -> Result<Vec<Detection>> {
    const CXYWH_OFFSET: usize = 4;

    if preds.ndim() != 3 || preds.shape()[1] <= CXYWH_OFFSET {
        return Err(anyhow!("unexpected YOLOv8 output shape {:?}", preds.shape()));
    }
    let nc = preds.shape()[1] - CXYWH_OFFSET;
    let (width_original, height_original) = original;
    let ratio = (input.0 as f32 / width_original).min(input.1 as f32 / height_original);

    let mut data: Vec<Detection> = Vec::new();
    let anchor = preds.index_axis(Axis(0), 0);
    for pred in anchor.axis_iter(Axis(1)) {
        let bbox = pred.slice(s![0..CXYWH_OFFSET]);
        let clss = pred.slice(s![CXYWH_OFFSET..CXYWH_OFFSET + nc]);

        let Some((id, &confidence)) = clss
            .into_iter()
            .enumerate()
            .reduce(|max, x| if x.1 > max.1 { x } else { max })
        else {
            continue;
        };

        if confidence < conf {
            continue;
        }

        let y_bbox = BBox::from_cxcywh(
            bbox[0] / ratio,
            bbox[1] / ratio,
            bbox[2] / ratio,
            bbox[3] / ratio,
        )
        .clamp(width_original, height_original);

        let label = names
            .get(id)
            .cloned()
            .unwrap_or_else(|| format!("class{}", id));
        data.push(Detection::new(y_bbox, label, confidence));
    }

    non_max_suppression(&mut data, iou);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["person".to_string(), "elephant".to_string()]
    }

    /// 构造 `[1, 6, N]` 输出: 每列为 (cx, cy, w, h, p_person, p_elephant)
    fn preds(columns: &[[f32; 6]]) -> Array<f32, IxDyn> {
        let mut ys = Array::zeros((1, 6, columns.len())).into_dyn();
        for (n, col) in columns.iter().enumerate() {
            for (c, v) in col.iter().enumerate() {
                ys[[0, c, n]] = *v;
            }
        }
        ys
    }

    #[test]
    fn decodes_and_rescales_to_original_frame() {
        // 1280x720 → 640x640: ratio = 0.5
        let ys = preds(&[[100., 100., 160., 80., 0.1, 0.9]]);
        let dets =
            decode_predictions(&ys, &names(), (640, 640), (1280., 720.), 0.25, 0.45).unwrap();

        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label, "elephant");
        assert_eq!(dets[0].bbox, BBox::new(40., 120., 360., 280.));
        assert_eq!(dets[0].bbox.width_px(), 320);
    }

    #[test]
    fn drops_low_confidence_and_overlapping_boxes() {
        let ys = preds(&[
            [100., 100., 50., 50., 0.0, 0.8],
            [102., 101., 50., 50., 0.0, 0.7], // 与第一个重叠, NMS 去除
            [400., 400., 50., 50., 0.1, 0.2], // 低于置信度阈值
            [300., 300., 40., 40., 0.6, 0.1],
        ]);
        let dets =
            decode_predictions(&ys, &names(), (640, 640), (640., 640.), 0.25, 0.45).unwrap();

        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].confidence, 0.8);
        assert_eq!(dets[1].label, "person");
    }

    #[test]
    fn elephant_under_person_box_still_raises_danger() {
        use crate::alert::{AlertLevel, ZoneClassifier};

        // 同一位置: person 0.70, elephant 0.65, 宽 320
        let ys = preds(&[
            [300., 300., 320., 200., 0.70, 0.0],
            [300., 300., 320., 200., 0.0, 0.65],
        ]);
        let dets =
            decode_predictions(&ys, &names(), (640, 640), (640., 640.), 0.25, 0.7).unwrap();

        assert_eq!(dets.len(), 2);
        assert_eq!(
            ZoneClassifier::default().classify(&dets),
            AlertLevel::Danger
        );
    }

    #[test]
    fn rejects_unexpected_shapes() {
        let ys = Array::zeros((1, 3)).into_dyn();
        assert!(decode_predictions(&ys, &names(), (640, 640), (640., 640.), 0.25, 0.45).is_err());
    }
}
