// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 帧循环 (Frame Loop)
//!
//! 单线程顺序执行: 取帧 → 检测 → 分级 → 状态机 → 投递告警.
//! 告警等级只在这里读写.

use tracing::{error, info};

use crate::alert::{AlertLevel, AlertSink, AlertStateMachine, ZoneClassifier};
use crate::detection::{Detection, Detector, Frame};
use crate::input::FrameSource;

/// 单帧处理结果 (供渲染)
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame: Frame,
    pub detections: Vec<Detection>,
    pub level: AlertLevel,
}

pub struct Monitor {
    source: Box<dyn FrameSource>,
    detector: Box<dyn Detector>,
    classifier: ZoneClassifier,
    machine: AlertStateMachine,
    alerts: Box<dyn AlertSink>,
    frames: u64,
}

impl Monitor {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn Detector>,
        classifier: ZoneClassifier,
        alerts: Box<dyn AlertSink>,
    ) -> Self {
        Self {
            source,
            detector,
            classifier,
            machine: AlertStateMachine::new(),
            alerts,
            frames: 0,
        }
    }

    pub fn classifier(&self) -> &ZoneClassifier {
        &self.classifier
    }

    pub fn current_level(&self) -> AlertLevel {
        self.machine.current_level()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// 处理下一帧, 流结束时返回 `None`
    pub fn step(&mut self) -> Option<FrameReport> {
        let frame = self.source.next_frame()?;
        self.frames += 1;

        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                error!("❌ 第{}帧检测失败: {:#}", frame.index, e);
                Vec::new()
            }
        };

        let level = self.classifier.classify(&detections);
        if let Some(escalation) = self.machine.observe(level) {
            self.alerts.dispatch(escalation);
        }

        Some(FrameReport {
            frame,
            detections,
            level,
        })
    }

    /// 无窗口运行直到流结束
    pub fn run_headless(&mut self) {
        info!("🚀 无界面模式运行");
        while self.step().is_some() {}
        info!("🏁 视频流结束, 共处理 {} 帧", self.frames);
    }
}
