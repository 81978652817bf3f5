// main.rs — 桌面宿主：winit 事件循环 + egui 菜单/状态栏 + 方向融合引擎
//
// 鼠标模拟触摸，SwayingSource 模拟手持设备的姿态传感器

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 在 Release 模式下隐藏控制台窗口

mod compass;
mod input;
mod renderer;

use input::PointerTracker;
use renderer::Renderer;

use panorama_fusion::panorama::classify_image;
use panorama_fusion::{
    ControlMethod, FusionObserver, InputEvent, MotionFeed, MovementReport, OrientationFusionEngine, PanoramaError,
    ProjectionMode, ScreenOrientation, SwayingSource, ViewSize, ViewerConfig,
};

use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

type Classified = Result<(PathBuf, ProjectionMode, (u32, u32)), PanoramaError>;

struct LogObserver;

impl FusionObserver for LogObserver {
    fn orientation_changed(&mut self, report: &MovementReport) {
        log::debug!(
            "yaw {:.1}° fov {:.3} rad (pitch {:.1}°, roll {:.1}°)",
            report.yaw_degrees,
            report.fov_radians,
            report.pitch_degrees,
            report.roll_degrees
        );
    }

    fn tapped(&mut self, world_angle_degrees: f64) {
        log::info!("tap -> {world_angle_degrees:.1}°");
    }
}

/// UI 状态（不属于引擎的部分）
struct HostState {
    is_fullscreen: bool,
    show_fps: bool,
    is_loading: bool,
    image: Option<(PathBuf, (u32, u32))>,
    last_tap: Option<f64>,
    feed_failed: bool,
}

#[derive(Default)]
struct UiActions {
    open_image: Option<PathBuf>,
    control_method: Option<ControlMethod>,
    reset: bool,
    toggle_fullscreen: bool,
    exit: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), PanoramaError> {
    let config = ViewerConfig::resolve()?;
    log::info!("control method: {}", config.control_method);

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Panorama Viewer")
        .with_inner_size(LogicalSize::new(1280, 720))
        .build(&event_loop)
        .map_err(|e| PanoramaError::Viewer(format!("create window: {e}")))?;

    let mut renderer = pollster::block_on(Renderer::new(&window))?;

    // 没有图片时按球面全景处理
    let mut engine = OrientationFusionEngine::from_config(&config, ProjectionMode::Spherical);
    engine.set_observer(Box::new(LogObserver));
    engine.set_view_size(view_size(renderer.size));

    let motion_interval = config.motion_interval();
    let mut feed: Option<MotionFeed> = None;
    sync_motion_feed(&engine, &mut feed, motion_interval);

    let mut tracker = PointerTracker::default();
    let mut host = HostState {
        is_fullscreen: false,
        show_fps: false,
        is_loading: false,
        image: None,
        last_tap: None,
        feed_failed: false,
    };

    // FPS 计算
    let mut last_frame_time = Instant::now();
    let mut frame_count = 0;
    let mut fps = 0.0;

    // 后台读取图片尺寸
    let (tx, rx): (Sender<Classified>, Receiver<Classified>) = channel();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Ok(result) = rx.try_recv() {
            host.is_loading = false;
            match result {
                Ok((path, mode, dims)) => {
                    engine.set_projection(mode);
                    renderer.set_projection(mode);
                    window.set_title(&format!("Panorama Viewer — {}", display_name(&path)));
                    host.image = Some((path, dims));
                }
                Err(e) => log::error!("{e}"),
            }
        }

        match event {
            Event::WindowEvent { event, .. } => {
                // 先让 egui 处理事件
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                let mut pending: Vec<InputEvent> = Vec::new();

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        if new_size.width > 0 && new_size.height > 0 {
                            engine.set_view_size(view_size(new_size));
                        }
                    }

                    // 键盘快捷键
                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            let mut actions = UiActions::default();
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::M) => actions.control_method = Some(ControlMethod::Motion),
                                Some(VirtualKeyCode::T) => actions.control_method = Some(ControlMethod::Touch),
                                Some(VirtualKeyCode::B) => actions.control_method = Some(ControlMethod::Both),
                                Some(VirtualKeyCode::R) => actions.reset = true,
                                Some(VirtualKeyCode::O) => actions.open_image = pick_image(),
                                Some(VirtualKeyCode::F11) => actions.toggle_fullscreen = true,
                                _ => {}
                            }
                            apply_actions(actions, &mut engine, &mut feed, motion_interval, &mut host, &window, &tx, control_flow);
                        }
                    }

                    // 鼠标 → 触摸手势
                    WindowEvent::MouseInput { state, button, .. } => {
                        pending = tracker.on_button(button, state);
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        pending = tracker.on_cursor_moved(position, f64::from(renderer.size.width));
                    }

                    WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                        pending = tracker.cancel();
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        pending = tracker.on_wheel(delta);
                    }

                    WindowEvent::DroppedFile(path) => {
                        host.is_loading = true;
                        start_classify(path, tx.clone());
                    }

                    _ => {}
                }

                for ev in pending {
                    match ev {
                        InputEvent::Tap(tap) => host.last_tap = Some(engine.handle_tap(tap)),
                        other => engine.handle(other),
                    }
                }
            }

            Event::RedrawRequested(_) => {
                // FPS 统计
                frame_count += 1;
                let now = Instant::now();
                if now.duration_since(last_frame_time).as_secs_f32() >= 1.0 {
                    fps = frame_count as f32 / now.duration_since(last_frame_time).as_secs_f32();
                    frame_count = 0;
                    last_frame_time = now;
                }

                // 传感器样本在这里（渲染线程）被消费
                if let Some(f) = feed.as_mut() {
                    engine.pump_motion(f);
                    if !f.is_running() && !host.feed_failed {
                        host.feed_failed = f.failure().is_some();
                    }
                }

                let mut actions = UiActions::default();
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    draw_ui(ctx, &mut engine, &mut host, &mut actions, fps, feed.is_some());
                });
                apply_actions(actions, &mut engine, &mut feed, motion_interval, &mut host, &window, &tx, control_flow);

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::warn!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn view_size(size: winit::dpi::PhysicalSize<u32>) -> ViewSize {
    ViewSize::new(f64::from(size.width.max(1)), f64::from(size.height.max(1)))
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 只有控制方式包含 motion 时才运行传感器线程
fn sync_motion_feed(engine: &OrientationFusionEngine, feed: &mut Option<MotionFeed>, interval: Duration) {
    let wants_motion = engine.input_mode().accepts_motion();
    match (wants_motion, feed.is_some()) {
        (true, false) => match MotionFeed::start(SwayingSource::new(ScreenOrientation::Portrait), interval) {
            Ok(f) => *feed = Some(f),
            Err(e) => log::error!("{e}"),
        },
        (false, true) => {
            // Drop joins the worker.
            *feed = None;
            log::debug!("motion feed stopped");
        }
        _ => {}
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_actions(
    actions: UiActions,
    engine: &mut OrientationFusionEngine,
    feed: &mut Option<MotionFeed>,
    motion_interval: Duration,
    host: &mut HostState,
    window: &Window,
    tx: &Sender<Classified>,
    control_flow: &mut ControlFlow,
) {
    if let Some(method) = actions.control_method {
        if method != engine.control_method() {
            engine.set_control_method(method);
            host.feed_failed = false;
            sync_motion_feed(engine, feed, motion_interval);
        }
    }
    if actions.reset {
        engine.reset_camera_angles();
    }
    if actions.toggle_fullscreen {
        host.is_fullscreen = !host.is_fullscreen;
        if host.is_fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        } else {
            window.set_fullscreen(None);
        }
    }
    if let Some(path) = actions.open_image {
        host.is_loading = true;
        start_classify(path, tx.clone());
    }
    if actions.exit {
        *control_flow = ControlFlow::Exit;
    }
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Images", &IMAGE_EXTENSIONS)
        .pick_file()
}

fn start_classify(path: PathBuf, tx: Sender<Classified>) {
    thread::spawn(move || {
        log::info!("reading panorama header: {path:?}");
        let result = classify_image(&path).map(|(mode, dims)| (path, mode, dims));
        if tx.send(result).is_err() {
            log::error!("failed to hand image info back to the main thread");
        }
    });
}

fn draw_ui(
    ctx: &egui::Context,
    engine: &mut OrientationFusionEngine,
    host: &mut HostState,
    actions: &mut UiActions,
    fps: f32,
    feed_active: bool,
) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            // File
            ui.menu_button("File", |ui| {
                if ui.button("Open panorama…").clicked() {
                    ui.close_menu();
                    actions.open_image = pick_image();
                }
                if ui.button("Exit").clicked() {
                    actions.exit = true;
                }
            });

            // View
            ui.menu_button("View", |ui| {
                if ui.button("Reset camera").clicked() {
                    actions.reset = true;
                    ui.close_menu();
                }

                if ui
                    .button(if host.is_fullscreen { "Exit fullscreen" } else { "Fullscreen" })
                    .clicked()
                {
                    actions.toggle_fullscreen = true;
                    ui.close_menu();
                }

                ui.separator();
                ui.menu_button("Control method", |ui| {
                    let mut method = engine.control_method();
                    for m in ControlMethod::ALL {
                        if ui.radio_value(&mut method, m, m.as_str()).clicked() {
                            actions.control_method = Some(m);
                            ui.close_menu();
                        }
                    }
                });

                ui.separator();
                ui.menu_button("Pan speed", |ui| {
                    let mut speed = engine.settings().pan_speed;
                    let vertical_enabled = engine.projection().allows_vertical();
                    let mut changed = ui
                        .add(egui::Slider::new(&mut speed.x, 0.05..=3.0).text("horizontal"))
                        .changed();
                    changed |= ui
                        .add_enabled(
                            vertical_enabled,
                            egui::Slider::new(&mut speed.y, 0.05..=3.0).text("vertical"),
                        )
                        .changed();
                    if ui.button("Reset 0.4").clicked() {
                        speed = panorama_fusion::PanSpeed::default();
                        changed = true;
                    }
                    if changed {
                        engine.set_pan_speed(speed);
                    }
                });

                ui.separator();
                if ui.checkbox(&mut host.show_fps, "Show FPS").clicked() {
                    ui.close_menu();
                }
            });
        });
    });

    let report = engine.current_report();

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if host.is_loading {
                ui.label(egui::RichText::new("Reading image…").color(egui::Color32::YELLOW));
                ui.label("|");
            }

            ui.label(format!("Mode: {:?}", engine.projection()));
            if let Some((path, (w, h))) = &host.image {
                ui.label(format!("({} {w}x{h})", display_name(path)));
            }
            ui.label("|");
            ui.label(format!("Control: {}", engine.control_method()));
            if feed_active && engine.is_motion_paused() {
                ui.label(egui::RichText::new("motion paused").color(egui::Color32::LIGHT_BLUE));
            }
            if host.feed_failed {
                ui.label(egui::RichText::new("sensor stopped").color(egui::Color32::LIGHT_RED));
            }
            ui.label("|");
            ui.label(format!(
                "FOV: {:.1}° (H {:.1}°)",
                engine.fov().degrees(),
                engine.horizontal_fov_degrees()
            ));
            ui.label("|");
            ui.label(format!("Yaw: {:.1}°", report.yaw_degrees));
            ui.label("|");
            ui.label(format!("Pitch: {:.1}°", report.pitch_degrees));
            ui.label("|");
            ui.label(format!("Roll: {:.1}°", report.roll_degrees));

            if let Some(angle) = host.last_tap {
                ui.label("|");
                ui.label(format!("Tap: {angle:.1}°"));
            }

            if host.show_fps {
                ui.label("|");
                ui.label(egui::RichText::new(format!("FPS: {:.1}", fps)).color(egui::Color32::GREEN));
            }
        });
    });

    compass::show(ctx, report.yaw_degrees, engine.horizontal_fov_degrees());
}
