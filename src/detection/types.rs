// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 检测系统数据结构定义
/// Data structures for the fence-line detection system
use std::sync::Arc;

// ========== 公共常量 ==========

/// YOLOv8推理输入尺寸
pub const INF_SIZE: u32 = 640;

/// COCO 80类名称 (模型元数据缺失时使用)
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "stop sign", "parking meter", "bench",
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe", "backpack", "umbrella", "handbag", "tie", "suitcase", "frisbee",
    "skis", "snowboard", "sports ball", "kite", "baseball bat", "baseball glove",
    "skateboard", "surfboard", "tennis racket", "bottle", "wine glass", "cup",
    "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
    "toothbrush",
];

// ========== 数据结构 ==========

/// 检测框 (像素坐标, 左上角 + 右下角)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 由中心点和宽高构建 (YOLO输出格式)
    pub fn from_cxcywh(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.,
            y1: cy - h / 2.,
            x2: cx + w / 2.,
            y2: cy + h / 2.,
        }
    }

    /// 整像素宽度: 先把坐标截断为整数, 再相减
    pub fn width_px(&self) -> i32 {
        self.x2 as i32 - self.x1 as i32
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.) * self.height().max(0.)
    }

    pub fn intersection_area(&self, another: &BBox) -> f32 {
        let l = self.x1.max(another.x1);
        let r = self.x2.min(another.x2);
        let t = self.y1.max(another.y1);
        let b = self.y2.min(another.y2);
        (r - l).max(0.) * (b - t).max(0.)
    }

    pub fn iou(&self, another: &BBox) -> f32 {
        let inter = self.intersection_area(another);
        let union = self.area() + another.area() - inter;
        if union <= 0. {
            0.
        } else {
            inter / union
        }
    }

    /// 裁剪到图像范围内
    pub fn clamp(&self, width: f32, height: f32) -> Self {
        Self {
            x1: self.x1.clamp(0., width),
            y1: self.y1.clamp(0., height),
            x2: self.x2.clamp(0., width),
            y2: self.y2.clamp(0., height),
        }
    }
}

/// 单个检测结果 (每帧重新生成, 不持久化)
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BBox,
    pub label: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BBox, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            label: label.into(),
            confidence,
        }
    }
}

/// 已解码帧 (解码线程 → 帧循环)
#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba_data: Arc<Vec<u8>>, // 使用Arc共享数据,避免复制
    pub width: u32,
    pub height: u32,
    pub index: u64, // 帧序号
}

impl Frame {
    pub fn new(rgba_data: Vec<u8>, width: u32, height: u32, index: u64) -> Self {
        Self {
            rgba_data: Arc::new(rgba_data),
            width,
            height,
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_px_truncates_each_coordinate() {
        // 10.7 → 10, 160.2 → 160
        let bbox = BBox::new(10.7, 0., 160.2, 50.);
        assert_eq!(bbox.width_px(), 150);
        assert!(bbox.width() < 150.);
    }

    #[test]
    fn iou_of_identical_and_disjoint_boxes() {
        let a = BBox::new(0., 0., 10., 10.);
        let b = BBox::new(20., 20., 30., 30.);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn from_cxcywh_round_trips_width() {
        let bbox = BBox::from_cxcywh(100., 100., 40., 20.);
        assert_eq!(bbox, BBox::new(80., 90., 120., 110.));
    }

    #[test]
    fn elephant_is_a_coco_class() {
        assert_eq!(COCO_CLASSES[20], "elephant");
    }
}
