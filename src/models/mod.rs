// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 模型实现
///
/// ## 完整模型实现 (Full Model Implementation)
/// - **YOLOv8**: 模型加载 (new) → 预处理 (preprocess) → 推理 (run) → 后处理 (postprocess)
///   - 实现 `detection::Detector`, 供帧循环调用
///   - 文件: `yolov8.rs`
///
/// ## 使用示例
/// ```no_run
/// use elephant_sentinel::models::{YOLOv8, YOLOv8Config};
/// use elephant_sentinel::OrtEP;
///
/// let model = YOLOv8::new(YOLOv8Config {
///     model: "models/yolov8n.onnx".to_string(),
///     ep: OrtEP::CPU,
///     inf_size: 640,
///     conf: 0.25,
///     iou: 0.7,
/// })?;
/// model.summary();
/// # Ok::<(), anyhow::Error>(())
/// ```
pub mod yolov8; // YOLOv8 完整模型

pub use yolov8::{decode_predictions, YOLOv8, YOLOv8Config};
