// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 告警状态机
//!
//! 只关心"进入"更严重的区域: 每帧把新等级与上一帧保存的等级比较,
//! 然后无条件覆盖. 没有去抖, 没有冷却.

use super::{AlertLevel, Escalation};

#[derive(Debug, Default)]
pub struct AlertStateMachine {
    level: AlertLevel,
}

impl AlertStateMachine {
    pub fn new() -> Self {
        Self {
            level: AlertLevel::Safe,
        }
    }

    pub fn current_level(&self) -> AlertLevel {
        self.level
    }

    /// 输入本帧等级, 返回是否进入了更高区域
    pub fn observe(&mut self, new_level: AlertLevel) -> Option<Escalation> {
        let escalation = transition(self.level, new_level);
        self.level = new_level;
        escalation
    }
}

fn transition(previous: AlertLevel, new_level: AlertLevel) -> Option<Escalation> {
    match new_level {
        AlertLevel::Warning if previous < AlertLevel::Warning => Some(Escalation::EnteredWarning),
        AlertLevel::Danger if previous < AlertLevel::Danger => Some(Escalation::EnteredDanger),
        _ => None,
    }
}
