// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 告警系统 (Alert System)
///
/// - zone:       检测列表 → 单帧告警等级
/// - machine:    等级变化 → 进入更高等级时产生 Escalation
/// - dispatcher: Escalation → 告警工作线程 → 各通知通道
pub mod dispatcher;
pub mod machine;
pub mod zone;

use std::fmt;

pub use dispatcher::{AlertSink, Dispatcher, Responder};
pub use machine::AlertStateMachine;
pub use zone::{ZoneClassifier, ZoneConfig};

/// 告警等级, 按严重程度全序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertLevel {
    #[default]
    Safe = 0,
    Warning = 1,
    Danger = 2,
}

impl AlertLevel {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlertLevel::Safe => "SAFE",
            AlertLevel::Warning => "WARNING",
            AlertLevel::Danger => "DANGER",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 进入更高告警区域 (状态机 → 告警分发)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    EnteredWarning,
    EnteredDanger,
}
