// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! FFmpeg解码滤镜: RGBA帧 → 帧通道
//!
//! 输出滤镜链已转为 `format=rgba`, 这里只按 linesize 去掉行填充后打包.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Sender, TrySendError};
use ez_ffmpeg::filter::frame_filter::FrameFilter;
use ez_ffmpeg::filter::frame_filter_context::FrameFilterContext;
use ez_ffmpeg::{AVMediaType, Frame as AVFrame};
use tracing::{debug, info, warn};

use crate::detection::Frame;

/// 单边最大分辨率, 超出视为异常帧
const MAX_SIDE: u32 = 8192;

/// 帧投递: 实时源满则丢帧, 文件源阻塞
#[derive(Clone)]
pub struct FrameSender {
    tx: Sender<Frame>,
    live: bool,
}

/// 投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Dropped,
    Disconnected,
}

impl FrameSender {
    pub fn new(tx: Sender<Frame>, live: bool) -> Self {
        Self { tx, live }
    }

    pub fn deliver(&self, frame: Frame) -> Delivery {
        if self.live {
            match self.tx.try_send(frame) {
                Ok(()) => Delivery::Sent,
                Err(TrySendError::Full(_)) => Delivery::Dropped,
                Err(TrySendError::Disconnected(_)) => Delivery::Disconnected,
            }
        } else {
            match self.tx.send(frame) {
                Ok(()) => Delivery::Sent,
                Err(_) => Delivery::Disconnected,
            }
        }
    }
}

/// 去掉行填充: `stride` 字节一行 → 紧凑的 `width * 4` 字节一行
pub fn pack_rgba_rows(plane: &[u8], stride: usize, width: usize, height: usize) -> Option<Vec<u8>> {
    let row = width * 4;
    if stride < row || plane.len() < stride * (height.saturating_sub(1)) + row {
        return None;
    }
    if stride == row {
        return Some(plane[..row * height].to_vec());
    }
    let mut packed = Vec::with_capacity(row * height);
    for y in 0..height {
        let start = y * stride;
        packed.extend_from_slice(&plane[start..start + row]);
    }
    Some(packed)
}

#[derive(Clone)]
pub struct DecodeFilter {
    sender: FrameSender,
    stop: Arc<AtomicBool>,
    index: u64,
    count: usize,          // 本秒投递帧数
    dropped_frames: usize, // 丢弃的帧数
    total_frames: usize,   // 总帧数
    last: Instant,
}

impl DecodeFilter {
    pub fn new(sender: FrameSender, stop: Arc<AtomicBool>) -> Self {
        Self {
            sender,
            stop,
            index: 0,
            count: 0,
            dropped_frames: 0,
            total_frames: 0,
            last: Instant::now(),
        }
    }

    fn report(&mut self) {
        let elapsed = self.last.elapsed().as_secs_f64();
        if elapsed < 1.0 {
            return;
        }
        let fps = self.count as f64 / elapsed;
        let drop_rate = self.dropped_frames as f64 / self.total_frames.max(1) as f64 * 100.0;
        info!(
            "📺 解码统计: 实际{:.1}fps | 总帧{} | 丢弃{} ({:.1}%)",
            fps, self.total_frames, self.dropped_frames, drop_rate
        );
        self.last = Instant::now();
        self.count = 0;
    }

    /// 读取 AVFrame 的首个平面
    fn extract(&self, frame: &AVFrame) -> Option<(Vec<u8>, u32, u32)> {
        // SAFETY: 帧在本次回调内有效, 只读访问
        unsafe {
            if frame.as_ptr().is_null() || frame.is_empty() || frame.is_corrupt() {
                return None;
            }
            let raw = &*frame.as_ptr();
            let (w, h) = (raw.width, raw.height);
            if w <= 0 || h <= 0 || w as u32 > MAX_SIDE || h as u32 > MAX_SIDE {
                return None;
            }
            let stride = raw.linesize[0];
            let data = raw.data[0];
            if data.is_null() || stride <= 0 {
                return None;
            }
            let (w, h, stride) = (w as usize, h as usize, stride as usize);
            let plane = std::slice::from_raw_parts(data, stride * (h - 1) + w * 4);
            pack_rgba_rows(plane, stride, w, h).map(|rgba| (rgba, w as u32, h as u32))
        }
    }
}

impl FrameFilter for DecodeFilter {
    fn media_type(&self) -> AVMediaType {
        AVMediaType::AVMEDIA_TYPE_VIDEO
    }

    fn init(&mut self, _ctx: &FrameFilterContext) -> Result<(), String> {
        info!("✅ 解码线程启动");
        Ok(())
    }

    fn filter_frame(
        &mut self,
        frame: AVFrame,
        _ctx: &FrameFilterContext,
    ) -> Result<Option<AVFrame>, String> {
        if self.stop.load(Ordering::Relaxed) {
            info!("🛑 收到停止信号, 停止解码");
            return Err("stopped".to_string());
        }

        self.total_frames += 1;
        let Some((rgba, width, height)) = self.extract(&frame) else {
            self.dropped_frames += 1;
            if self.total_frames <= 10 {
                warn!("⚠️ 丢弃帧 #{}: 空帧/损坏帧", self.total_frames);
            }
            return Ok(None);
        };

        let decoded = Frame::new(rgba, width, height, self.index);
        self.index += 1;
        match self.sender.deliver(decoded) {
            Delivery::Sent => self.count += 1,
            Delivery::Dropped => self.dropped_frames += 1,
            Delivery::Disconnected => {
                debug!("帧通道已关闭");
                return Err("frame channel closed".to_string());
            }
        }
        self.report();

        Ok(Some(frame))
    }

    fn uninit(&mut self, _ctx: &FrameFilterContext) {
        info!("✅ 解码线程退出");
    }
}
