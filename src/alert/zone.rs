// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 区域分级 - 通过JSON文件调整阈值

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::AlertLevel;
use crate::detection::Detection;

/// 区域分级参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub label: String,        // 目标类别
    pub min_confidence: f32,  // 置信度下限 (严格大于)
    pub warning_width: i32,   // 检测框宽度 >= 此值进入警告区
    pub danger_width: i32,    // 检测框宽度 >= 此值进入危险区
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            label: "elephant".to_string(),
            min_confidence: 0.5,
            warning_width: 150,
            danger_width: 300,
        }
    }
}

impl ZoneConfig {
    /// 从JSON文件加载配置
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    info!("✅ 区域配置已从 {} 加载", path.display());
                    config
                }
                Err(e) => {
                    warn!("⚠️ 区域配置解析失败: {}, 使用默认值", e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("📝 区域配置文件不存在,创建默认配置...");
                let config = Self::default();
                config.save(path);
                config
            }
        }
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    warn!("❌ 保存区域配置失败: {}", e);
                } else {
                    info!("💾 区域配置已保存到 {}", path.display());
                }
            }
            Err(e) => warn!("❌ 序列化区域配置失败: {}", e),
        }
    }
}

/// 单帧分级: 取所有合格检测中最严重的等级
#[derive(Clone, Debug, Default)]
pub struct ZoneClassifier {
    config: ZoneConfig,
}

impl ZoneClassifier {
    pub fn new(config: ZoneConfig) -> Self {
        Self { config }
    }

    /// 类别完全匹配且置信度严格大于下限
    pub fn qualifies(&self, detection: &Detection) -> bool {
        detection.label == self.config.label && detection.confidence > self.config.min_confidence
    }

    pub fn level_for_width(&self, size: i32) -> AlertLevel {
        if size >= self.config.danger_width {
            AlertLevel::Danger
        } else if size >= self.config.warning_width {
            AlertLevel::Warning
        } else {
            AlertLevel::Safe
        }
    }

    pub fn classify(&self, detections: &[Detection]) -> AlertLevel {
        detections
            .iter()
            .filter(|d| self.qualifies(d))
            .map(|d| self.level_for_width(d.bbox.width_px()))
            .max()
            .unwrap_or(AlertLevel::Safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BBox;

    fn det(label: &str, confidence: f32, width: f32) -> Detection {
        Detection::new(BBox::new(100., 50., 100. + width, 250.), label, confidence)
    }

    #[test]
    fn empty_frame_is_safe() {
        let zones = ZoneClassifier::default();
        assert_eq!(zones.classify(&[]), AlertLevel::Safe);
    }

    #[test]
    fn non_elephants_never_count() {
        let zones = ZoneClassifier::default();
        assert_eq!(zones.classify(&[det("dog", 0.99, 500.)]), AlertLevel::Safe);
        assert_eq!(zones.classify(&[det("Elephant", 0.99, 500.)]), AlertLevel::Safe);
    }

    #[test]
    fn confidence_must_be_strictly_above_half() {
        let zones = ZoneClassifier::default();
        assert_eq!(zones.classify(&[det("elephant", 0.5, 400.)]), AlertLevel::Safe);
        assert_eq!(
            zones.classify(&[det("elephant", 0.50001, 310.)]),
            AlertLevel::Danger
        );
    }

    #[test]
    fn width_thresholds_are_half_open() {
        let zones = ZoneClassifier::default();
        assert_eq!(zones.level_for_width(0), AlertLevel::Safe);
        assert_eq!(zones.level_for_width(149), AlertLevel::Safe);
        assert_eq!(zones.level_for_width(150), AlertLevel::Warning);
        assert_eq!(zones.level_for_width(299), AlertLevel::Warning);
        assert_eq!(zones.level_for_width(300), AlertLevel::Danger);
    }

    #[test]
    fn most_severe_detection_wins() {
        let zones = ZoneClassifier::default();
        let many_small: Vec<_> = (0..10).map(|_| det("elephant", 0.9, 100.)).collect();
        assert_eq!(zones.classify(&many_small), AlertLevel::Safe);

        let mut mixed = many_small.clone();
        mixed.push(det("elephant", 0.9, 200.));
        assert_eq!(zones.classify(&mixed), AlertLevel::Warning);

        mixed.push(det("elephant", 0.9, 320.));
        mixed.push(det("elephant", 0.9, 120.));
        assert_eq!(zones.classify(&mixed), AlertLevel::Danger);
    }

    #[test]
    fn low_confidence_giant_does_not_mask_real_warning() {
        let zones = ZoneClassifier::default();
        let dets = [det("elephant", 0.3, 600.), det("elephant", 0.7, 180.)];
        assert_eq!(zones.classify(&dets), AlertLevel::Warning);
    }

    #[test]
    fn growing_width_never_lowers_the_level() {
        let zones = ZoneClassifier::default();
        let mut last = AlertLevel::Safe;
        for width in (0..600).step_by(10) {
            let level = zones.classify(&[det("elephant", 0.9, width as f32)]);
            assert!(level >= last);
            last = level;
        }
        assert_eq!(last, AlertLevel::Danger);
    }

    #[test]
    fn load_creates_default_file_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.json");

        let config = ZoneConfig::load(&path);

        assert_eq!(config, ZoneConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.json");
        fs::write(&path, r#"{ "danger_width": 400 }"#).unwrap();

        let config = ZoneConfig::load(&path);

        assert_eq!(config.danger_width, 400);
        assert_eq!(config.warning_width, 150);
        assert_eq!(config.label, "elephant");
    }

    #[test]
    fn load_falls_back_on_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zones.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(ZoneConfig::load(&path), ZoneConfig::default());
    }
}
