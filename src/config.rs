// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 命令行参数与凭据加载

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{info, warn};

use crate::detection::types::INF_SIZE;
use crate::input::InputSource;
use crate::models::YOLOv8Config;
use crate::OrtEP;

/// 围栏大象监控参数
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "围栏大象监控 - Elephant proximity alert", long_about = None)]
pub struct Args {
    /// 摄像头索引
    #[arg(short, long, default_value_t = 0)]
    pub camera: usize,

    /// 摄像头设备名 (Windows DirectShow)
    #[arg(long)]
    pub device_name: Option<String>,

    /// 视频文件或流地址, 设置后忽略摄像头
    #[arg(short, long)]
    pub source: Option<String>,

    /// ONNX 检测模型
    #[arg(short, long, default_value = "models/yolov8n.onnx")]
    pub model: PathBuf,

    /// 警告音文件
    #[arg(long, default_value = "sounds/alert.mp3")]
    pub sound: PathBuf,

    /// 区域阈值配置 (JSON)
    #[arg(long, default_value = "zones.json")]
    pub zones: PathBuf,

    /// 凭据文件 (dotenv)
    #[arg(long, default_value = "credentials.env")]
    pub credentials: PathBuf,

    /// 不打开窗口, 运行到视频流结束
    #[arg(long)]
    pub headless: bool,

    /// 使用 CUDA 推理
    #[arg(long)]
    pub cuda: bool,

    /// CUDA 设备号
    #[arg(long, default_value_t = 0)]
    pub device_id: i32,

    /// 检测置信度下限
    #[arg(long, default_value_t = 0.25)]
    pub conf: f32,

    /// NMS IoU 阈值
    #[arg(long, default_value_t = 0.7)]
    pub iou: f32,

    /// 推理尺寸
    #[arg(long, default_value_t = INF_SIZE)]
    pub inf_size: u32,

    /// 列出视频设备后退出
    #[arg(long)]
    pub list_devices: bool,
}

impl Args {
    pub fn input_source(&self) -> InputSource {
        match &self.source {
            Some(url) => InputSource::Url(url.clone()),
            None => InputSource::Camera {
                index: self.camera,
                name: self.device_name.clone(),
            },
        }
    }

    pub fn ep(&self) -> OrtEP {
        if self.cuda {
            OrtEP::CUDA(self.device_id)
        } else {
            OrtEP::CPU
        }
    }

    pub fn detector_config(&self) -> YOLOv8Config {
        YOLOv8Config {
            model: self.model.to_string_lossy().into_owned(),
            ep: self.ep(),
            inf_size: self.inf_size,
            conf: self.conf,
            iou: self.iou,
        }
    }
}

/// 把凭据文件加载进环境变量, 文件不存在不算错误
pub fn load_credentials(path: &Path) -> bool {
    match dotenvy::from_filename(path) {
        Ok(_) => {
            info!("🔑 凭据已从 {} 加载", path.display());
            true
        }
        Err(e) if e.not_found() => {
            info!("📝 未找到凭据文件 {}, 仅使用环境变量", path.display());
            false
        }
        Err(e) => {
            warn!("⚠️ 凭据文件读取失败: {}", e);
            false
        }
    }
}
