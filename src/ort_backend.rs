// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! ONNX Runtime 推理后端
//!
//! 负责: 会话构建 (CPU/CUDA) → 张量推理 → 读取模型元数据中的类别名

use anyhow::{anyhow, Result};
use ndarray::{Array, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use regex::Regex;
use tracing::{info, warn};

use crate::detection::types::COCO_CLASSES;

/// YOLOv8 导出模型的输出张量名
const OUTPUT_NAME: &str = "output0";

/// 执行设备 (Execution Provider)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrtEP {
    CPU,
    CUDA(i32),
}

#[derive(Debug, Clone)]
pub struct OrtConfig {
    pub f: String,
    pub ep: OrtEP,
    pub image_size: (u32, u32), // (height, width)
}

pub struct OrtBackend {
    session: Session,
    ep: OrtEP,
    height: u32,
    width: u32,
    names: Vec<String>,
}

impl OrtBackend {
    pub fn build(config: OrtConfig) -> Result<Self> {
        let mut builder =
            Session::builder()?.with_optimization_level(GraphOptimizationLevel::Level3)?;
        if let OrtEP::CUDA(device_id) = config.ep {
            builder = builder.with_execution_providers([CUDAExecutionProvider::default()
                .with_device_id(device_id)
                .build()])?;
        }
        let session = builder.commit_from_file(&config.f)?;

        // 类别名: 优先读取模型元数据, 否则回退到COCO
        let names = session
            .metadata()
            .ok()
            .and_then(|m| m.custom("names").ok().flatten())
            .map(|raw| parse_names(&raw))
            .filter(|names| !names.is_empty())
            .unwrap_or_else(|| {
                warn!("⚠️ 模型元数据中没有类别名, 使用COCO默认类别");
                COCO_CLASSES.iter().map(|s| s.to_string()).collect()
            });

        let (height, width) = config.image_size;
        info!(
            model = %config.f,
            ep = ?config.ep,
            nc = names.len(),
            "✅ ONNX会话构建成功 {}x{}",
            width,
            height
        );

        Ok(Self {
            session,
            ep: config.ep,
            height,
            width,
            names,
        })
    }

    /// 执行推理: NCHW 输入 → 原始输出张量
    pub fn run(&mut self, xs: Array<f32, IxDyn>) -> Result<Array<f32, IxDyn>> {
        let shape = xs.shape().to_vec();
        let data = xs.into_raw_vec_and_offset().0;
        let input = Tensor::from_array((shape, data.into_boxed_slice()))?;

        let outputs = self.session.run(ort::inputs![input])?;
        let output = outputs
            .get(OUTPUT_NAME)
            .ok_or_else(|| anyhow!("missing {} tensor", OUTPUT_NAME))?;
        let (shape, data) = output.try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();

        Ok(Array::from_shape_vec(IxDyn(&dims), data.to_vec())?)
    }

    pub fn ep(&self) -> OrtEP {
        self.ep
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// 解析 ultralytics 导出时写入的 `names` 元数据
///
/// 格式形如 `{0: 'person', 1: 'bicycle', ...}`
pub fn parse_names(raw: &str) -> Vec<String> {
    let re = match Regex::new(r#"(['"])([-()\w '"]+?)(['"])"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    re.captures_iter(raw)
        .filter_map(|c| c.get(2).map(|m| m.as_str().to_string()))
        .collect()
}
