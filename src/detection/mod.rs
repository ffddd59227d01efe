// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 检测系统 (Detection System)
///
/// - types:    检测框 / 帧 / 检测结果
/// - Detector: 帧 → 检测列表 (由 models 中的具体模型实现)
pub mod types;

use anyhow::Result;

pub use types::{BBox, Detection, Frame};

/// 目标检测接口
///
/// 同步调用, 耗时可能较长. 失败时由帧循环记录并按"无检测"处理.
pub trait Detector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        (**self).detect(frame)
    }
}
