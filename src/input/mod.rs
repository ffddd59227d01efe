// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 视频输入 (Video Input)
///
/// FFmpeg 在调度线程上解码, 解码滤镜把 RGBA 帧投递到有界通道,
/// 帧循环通过 `FrameSource::next_frame` 阻塞读取.
/// - camera:        输入源打开 (重试) 与生命周期
/// - decode_filter: 帧拷贝、统计与投递
pub mod camera;
pub mod decode_filter;

use std::fmt;

use tracing::{info, warn};

use crate::detection::Frame;

pub use camera::FfmpegSource;
pub use decode_filter::{DecodeFilter, FrameSender};

/// 顺序帧源, `None` 表示流结束
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Option<Frame> {
        (**self).next_frame()
    }
}

/// 输入源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// 本地摄像头: 索引 + 设备名 (Windows dshow 需要设备名)
    Camera { index: usize, name: Option<String> },
    /// 任意 FFmpeg 可读的文件或URL
    Url(String),
}

impl InputSource {
    /// 实时源在通道满时丢帧, 文件源阻塞等待
    pub fn is_live(&self) -> bool {
        matches!(self, InputSource::Camera { .. })
    }

    /// (FFmpeg输入地址, 输入格式)
    pub fn ffmpeg_input(&self) -> (String, Option<&'static str>) {
        match self {
            InputSource::Camera { index, name } => camera_input(*index, name.as_deref()),
            InputSource::Url(url) => (url.clone(), None),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Camera { index, name: Some(name) } => {
                write!(f, "camera #{} ({})", index, name)
            }
            InputSource::Camera { index, name: None } => write!(f, "camera #{}", index),
            InputSource::Url(url) => f.write_str(url),
        }
    }
}

/// 按平台格式化摄像头地址
#[cfg(target_os = "windows")]
fn camera_input(index: usize, name: Option<&str>) -> (String, Option<&'static str>) {
    let name = name
        .map(str::to_string)
        .or_else(|| get_video_devices().into_iter().find(|d| d.index == index).map(|d| d.name))
        .unwrap_or_else(|| index.to_string());
    (format!("video={}", name), Some("dshow"))
}

#[cfg(target_os = "macos")]
fn camera_input(index: usize, _name: Option<&str>) -> (String, Option<&'static str>) {
    (index.to_string(), Some("avfoundation"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn camera_input(index: usize, _name: Option<&str>) -> (String, Option<&'static str>) {
    (format!("/dev/video{}", index), Some("v4l2"))
}

/// 视频设备信息
#[derive(Debug, Clone)]
pub struct VideoDevice {
    pub name: String,
    pub index: usize,
}

/// 获取可用的视频设备列表
pub fn get_video_devices() -> Vec<VideoDevice> {
    match ez_ffmpeg::device::get_input_video_devices() {
        Ok(devices) => {
            info!("✅ 找到 {} 个视频设备", devices.len());
            devices
                .into_iter()
                .enumerate()
                .map(|(index, name)| VideoDevice { name, index })
                .collect()
        }
        Err(e) => {
            warn!("⚠️ 获取设备列表失败: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cameras_are_live() {
        assert!(InputSource::Camera { index: 0, name: None }.is_live());
        assert!(!InputSource::Url("herd.mp4".to_string()).is_live());
    }

    #[test]
    fn url_passes_through_without_format() {
        let source = InputSource::Url("rtsp://10.0.0.2/stream".to_string());
        assert_eq!(source.ffmpeg_input(), ("rtsp://10.0.0.2/stream".to_string(), None));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_camera_uses_v4l2_device_node() {
        let source = InputSource::Camera { index: 2, name: None };
        assert_eq!(source.ffmpeg_input(), ("/dev/video2".to_string(), Some("v4l2")));
        assert_eq!(source.to_string(), "camera #2");
    }
}
