// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 监控窗口渲染 (macroquad)
//!
//! 视频帧纹理 + 合格大象的红色检测框 + 左上角区域横幅

use std::time::Instant;

use macroquad::prelude::*;
use tracing::debug;

use crate::alert::{AlertLevel, ZoneClassifier};
use crate::detection::BBox;
use crate::monitor::FrameReport;

pub const WINDOW_TITLE: &str = "Elephant Detection";

const BOX_COLOR: Color = RED;

pub fn level_color(level: AlertLevel) -> Color {
    match level {
        AlertLevel::Safe => GREEN,
        AlertLevel::Warning => ORANGE,
        AlertLevel::Danger => RED,
    }
}

/// 需要绘制的检测框及标签 (只画合格的大象)
pub fn overlay_boxes(report: &FrameReport, classifier: &ZoneClassifier) -> Vec<(BBox, String)> {
    report
        .detections
        .iter()
        .filter(|d| classifier.qualifies(d))
        .map(|d| (d.bbox.clone(), format!("Elephant {:.2}", d.confidence)))
        .collect()
}

pub struct Renderer {
    texture: Option<Texture2D>,
    last: Option<FrameReport>,
    render_count: u64,
    render_last: Instant,
    render_fps: f64,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            texture: None,
            last: None,
            render_count: 0,
            render_last: Instant::now(),
            render_fps: 0.0,
        }
    }

    pub fn update(&mut self, report: FrameReport) {
        let frame = &report.frame;
        // 只在分辨率变化时重建纹理, 否则更新像素数据
        let needs_rebuild = match &self.texture {
            Some(tex) => tex.width() != frame.width as f32 || tex.height() != frame.height as f32,
            None => true,
        };

        if needs_rebuild {
            let texture =
                Texture2D::from_rgba8(frame.width as u16, frame.height as u16, &frame.rgba_data);
            texture.set_filter(FilterMode::Linear);
            self.texture = Some(texture);
        } else if let Some(tex) = &self.texture {
            tex.update(&Image {
                bytes: frame.rgba_data.to_vec(),
                width: frame.width as u16,
                height: frame.height as u16,
            });
        }
        self.last = Some(report);
    }

    pub fn draw(&mut self, classifier: &ZoneClassifier) {
        clear_background(BLACK);

        if let (Some(texture), Some(report)) = (&self.texture, &self.last) {
            let scale_x = screen_width() / texture.width();
            let scale_y = screen_height() / texture.height();

            draw_texture_ex(
                texture,
                0.0,
                0.0,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(screen_width(), screen_height())),
                    ..Default::default()
                },
            );

            for (bbox, label) in overlay_boxes(report, classifier) {
                let x1 = bbox.x1 * scale_x;
                let y1 = bbox.y1 * scale_y;
                let x2 = bbox.x2 * scale_x;
                let y2 = bbox.y2 * scale_y;
                draw_rectangle_lines(x1, y1, x2 - x1, y2 - y1, 3.0, BOX_COLOR);
                draw_text(&label, x1, (y1 - 8.0).max(16.0), 24.0, BOX_COLOR);
            }

            let banner = format!("{}  |  {:.0} fps", report.level, self.render_fps);
            draw_rectangle(0.0, 0.0, 260.0, 40.0, Color::new(0.0, 0.0, 0.0, 0.6));
            draw_text(&banner, 12.0, 28.0, 28.0, level_color(report.level));
        }

        self.render_count += 1;
        let elapsed = self.render_last.elapsed().as_secs_f64();
        if elapsed >= 1.0 {
            self.render_fps = self.render_count as f64 / elapsed;
            debug!("🖥️ 渲染 {:.1} fps", self.render_fps);
            self.render_count = 0;
            self.render_last = Instant::now();
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{Detection, Frame};

    #[test]
    fn only_qualifying_elephants_are_boxed() {
        let report = FrameReport {
            frame: Frame::new(vec![0; 4], 1, 1, 0),
            detections: vec![
                Detection::new(BBox::new(0., 0., 320., 100.), "elephant", 0.876),
                Detection::new(BBox::new(0., 0., 320., 100.), "elephant", 0.5),
                Detection::new(BBox::new(0., 0., 320., 100.), "dog", 0.99),
            ],
            level: AlertLevel::Danger,
        };
        let boxes = overlay_boxes(&report, &ZoneClassifier::default());
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].1, "Elephant 0.88");
    }

    #[test]
    fn banner_colors_follow_severity() {
        assert_eq!(level_color(AlertLevel::Safe), GREEN);
        assert_eq!(level_color(AlertLevel::Warning), ORANGE);
        assert_eq!(level_color(AlertLevel::Danger), RED);
    }
}
