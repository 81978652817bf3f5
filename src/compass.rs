// compass.rs — 指南针叠层：指针 = 相机朝向，扇形 = 水平视场角

use egui::{Align2, Color32, FontId, Pos2, Shape, Stroke, Vec2};

const SIZE: f32 = 128.0;

pub fn show(ctx: &egui::Context, yaw_degrees: f64, horizontal_fov_degrees: f64) {
    egui::Window::new("compass")
        .title_bar(false)
        .resizable(false)
        .anchor(Align2::RIGHT_BOTTOM, [-12.0, -40.0])
        .show(ctx, |ui| {
            draw(ui, yaw_degrees as f32, horizontal_fov_degrees as f32);
        });
}

/// Point on the dial for a bearing in degrees (0 = north, clockwise).
fn on_dial(center: Pos2, radius: f32, bearing_degrees: f32) -> Pos2 {
    let t = bearing_degrees.to_radians();
    center + Vec2::new(t.sin(), -t.cos()) * radius
}

fn draw(ui: &mut egui::Ui, yaw: f32, hfov: f32) {
    let (response, painter) = ui.allocate_painter(Vec2::splat(SIZE), egui::Sense::hover());
    let center = response.rect.center();
    let radius = SIZE * 0.42;

    // FoV 扇形 (保持凸多边形)
    let half = hfov.clamp(1.0, 179.0) / 2.0;
    let steps = 24;
    let mut wedge = Vec::with_capacity(steps + 2);
    wedge.push(center);
    for i in 0..=steps {
        let b = yaw - half + (2.0 * half) * (i as f32 / steps as f32);
        wedge.push(on_dial(center, radius, b));
    }
    painter.add(Shape::convex_polygon(
        wedge,
        Color32::from_rgba_unmultiplied(255, 200, 60, 60),
        Stroke::NONE,
    ));

    painter.circle_stroke(center, radius, Stroke::new(1.5, Color32::GRAY));
    for (label, bearing) in [("N", 0.0), ("E", 90.0), ("S", 180.0), ("W", 270.0)] {
        let color = if label == "N" { Color32::LIGHT_RED } else { Color32::LIGHT_GRAY };
        painter.text(
            on_dial(center, radius + 9.0, bearing),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(11.0),
            color,
        );
    }

    painter.line_segment(
        [center, on_dial(center, radius * 0.9, yaw)],
        Stroke::new(2.5, Color32::from_rgb(255, 200, 60)),
    );
    painter.circle_filled(center, 3.0, Color32::WHITE);
}
