// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! FFmpeg 输入源: 摄像头 (DirectShow/AVFoundation/V4L2) 或文件/URL
//!
//! 解码在独立线程上构建并运行, 打开结果通过通道回传给调用方.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use ez_ffmpeg::core::context::null_output::create_null_output;
use ez_ffmpeg::filter::frame_pipeline_builder::FramePipelineBuilder;
use ez_ffmpeg::{AVMediaType, FfmpegContext, Input};
use tracing::{error, info, warn};

use super::decode_filter::{DecodeFilter, FrameSender};
use super::{FrameSource, InputSource};
use crate::detection::Frame;
use crate::error::{SentinelError, SentinelResult};

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// 实时源只保留最新的少量帧
const LIVE_CAPACITY: usize = 2;
const FILE_CAPACITY: usize = 8;

pub struct FfmpegSource {
    rx: Receiver<Frame>,
    stop: Arc<AtomicBool>,
}

impl FfmpegSource {
    /// 打开输入源, 失败时重试 3 次 (间隔 1 秒)
    pub fn open(source: &InputSource) -> SentinelResult<Self> {
        let live = source.is_live();
        let (tx, rx) = bounded(if live { LIVE_CAPACITY } else { FILE_CAPACITY });
        let (opened_tx, opened_rx) = bounded::<Result<(), String>>(1);
        let stop = Arc::new(AtomicBool::new(false));

        let filter = DecodeFilter::new(FrameSender::new(tx, live), stop.clone());
        let (url, format) = source.ffmpeg_input();
        info!("🔗 输入地址: {} (格式: {})", url, format.unwrap_or("auto"));

        thread::Builder::new()
            .name("decoder".to_string())
            .spawn(move || {
                let ctx = match build_context(&url, format, filter) {
                    Ok(ctx) => ctx,
                    Err(e) => {
                        let _ = opened_tx.send(Err(e));
                        return;
                    }
                };
                let sch = match ctx.start() {
                    Ok(sch) => sch,
                    Err(e) => {
                        let _ = opened_tx.send(Err(format!("启动失败: {}", e)));
                        return;
                    }
                };
                let _ = opened_tx.send(Ok(()));
                if let Err(e) = sch.wait() {
                    warn!("⚠️ 解码结束: {}", e);
                }
                info!("📹 解码循环结束");
            })?;

        match opened_rx.recv() {
            Ok(Ok(())) => {
                info!("✅ 输入源打开成功: {}", source);
                Ok(Self { rx, stop })
            }
            Ok(Err(e)) => Err(SentinelError::CameraUnavailable(format!("{}: {}", source, e))),
            Err(_) => Err(SentinelError::CameraUnavailable(format!(
                "{}: decoder thread exited",
                source
            ))),
        }
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn build_context(
    url: &str,
    format: Option<&str>,
    filter: DecodeFilter,
) -> Result<FfmpegContext, String> {
    let mut attempt = 0;
    loop {
        attempt += 1;

        let pipe: FramePipelineBuilder = AVMediaType::AVMEDIA_TYPE_VIDEO.into();
        let pipe = pipe.filter("decode", Box::new(filter.clone()));
        let out = create_null_output().add_frame_pipeline(pipe);

        let mut input = Input::new(url);
        if let Some(format) = format {
            input = input.set_format(format);
        }

        match FfmpegContext::builder()
            .input(input)
            .filter_descs(["format=rgba"].into())
            .output(out)
            .build()
        {
            Ok(ctx) => return Ok(ctx),
            Err(e) if attempt >= MAX_RETRIES => {
                error!("❌ 输入源打开失败 (重试{}次): {}", MAX_RETRIES, e);
                return Err(e.to_string());
            }
            Err(e) => {
                warn!(
                    "⚠️ 输入源忙或无法打开, 1秒后重试... ({}/{}): {}",
                    attempt, MAX_RETRIES, e
                );
                thread::sleep(RETRY_DELAY);
            }
        }
    }
}

impl FrameSource for FfmpegSource {
    fn next_frame(&mut self) -> Option<Frame> {
        self.rx.recv().ok()
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.stop();
    }
}
