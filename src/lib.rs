// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod alert; // 区域分级、状态机与告警分发
pub mod config; // 命令行参数与凭据
pub mod detection; // 检测数据结构与检测接口
pub mod error;
pub mod input; // 视频输入系统
pub mod models; // 检测模型实现
pub mod monitor; // 帧循环
pub mod notify; // 告警通道
pub mod ort_backend;
pub mod renderer; // macroquad 监控窗口

pub use crate::config::Args;
pub use crate::detection::{BBox, Detection, Detector, Frame};
pub use crate::error::{NotifyError, SentinelError, SentinelResult};
pub use crate::models::{YOLOv8, YOLOv8Config};
pub use crate::monitor::{FrameReport, Monitor};
pub use crate::ort_backend::{OrtBackend, OrtConfig, OrtEP};

/// 贪心 NMS (按类别), 结果按置信度降序
///
/// 不同类别的框即使重叠也都保留
pub fn non_max_suppression(xs: &mut Vec<Detection>, iou_threshold: f32) {
    xs.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut current_index = 0;
    for index in 0..xs.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            if xs[prev_index].label == xs[index].label
                && xs[prev_index].bbox.iou(&xs[index].bbox) > iou_threshold
            {
                drop = true;
                break;
            }
        }
        if !drop {
            xs.swap(current_index, index);
            current_index += 1;
        }
    }
    xs.truncate(current_index);
}

/// 本地时间, 用于告警消息
pub fn gen_time_string() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
