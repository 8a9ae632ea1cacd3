//! Corner-pin studio: one warp object on a pannable, zoomable canvas.
//!
//! `cornerpin-studio [image | record.json]`
//!
//! Drag the green handles to pin corners. `P` toggles perspective mode, `R`
//! resets the quad, `S` logs the JSON record, `Esc` quits. Middle-drag pans,
//! the wheel zooms. `CORNERPIN_CONFIG` may point at a JSON `WarpConfig`;
//! `CORNERPIN_LOW_POWER` selects the low-power adapter.

use std::path::Path;

use anyhow::{Context, Result};

use cornerpin_engine::coords::Vec2;
use cornerpin_engine::core::{App, AppControl, FrameCtx};
use cornerpin_engine::device::GpuInit;
use cornerpin_engine::input::{ButtonState, InputEvent, Key, MouseButton};
use cornerpin_engine::logging::{LoggingConfig, init_logging};
use cornerpin_engine::render::shapes::OverlayRenderer;
use cornerpin_engine::scene::DrawList;
use cornerpin_engine::window::{CursorIcon, Runtime, WindowSpec};
use cornerpin_warp::render::{ProgramCache, WarpSurface};
use cornerpin_warp::{
    CornerControls, CursorHint, FileLoader, PendingWarp, SourceImage, View, WarpConfig, WarpObject, WarpOptions,
    WarpRecord, Warpable, from_json, to_json,
};

const CONFIG_ENV: &str = "CORNERPIN_CONFIG";
const LOW_POWER_ENV: &str = "CORNERPIN_LOW_POWER";

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = load_config()?;
    let studio = match std::env::args_os().nth(1) {
        Some(arg) => Studio::open(config, Path::new(&arg))?,
        None => Studio::demo(config)?,
    };

    let gpu_init = match std::env::var_os(LOW_POWER_ENV) {
        Some(_) => GpuInit::low_power(),
        None => GpuInit::default(),
    };

    Runtime::run(WindowSpec::titled("cornerpin studio"), gpu_init, studio)
}

fn load_config() -> Result<WarpConfig> {
    let Some(path) = std::env::var_os(CONFIG_ENV) else {
        return Ok(WarpConfig::default());
    };
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {CONFIG_ENV}={}", Path::new(&path).display()))?;
    let config = serde_json::from_str(&json).context("parsing warp config")?;
    log::info!("warp config loaded from {}", Path::new(&path).display());
    Ok(config)
}

struct Studio {
    config: WarpConfig,

    pending: Option<PendingWarp>,
    object: Option<WarpObject>,

    view: View,
    view_fitted: bool,
    controls: CornerControls,
    pan_from: Option<Vec2>,
    cursor: CursorHint,

    programs: ProgramCache,
    surface: WarpSurface,
    overlay: OverlayRenderer,
    draw_list: DrawList,
}

impl Studio {
    fn empty(config: WarpConfig) -> Self {
        Self {
            controls: CornerControls::new(config.hit_radius),
            config,
            pending: None,
            object: None,
            view: View::default(),
            view_fitted: false,
            pan_from: None,
            cursor: CursorHint::Default,
            programs: ProgramCache::new(),
            surface: WarpSurface::new(),
            overlay: OverlayRenderer::new(),
            draw_list: DrawList::new(),
        }
    }

    /// Generated checkerboard, available immediately.
    fn demo(config: WarpConfig) -> Result<Self> {
        let options = WarpOptions { resolution: config.resolution, ..WarpOptions::default() };
        let object = WarpObject::new(SourceImage::checkerboard(640, 480, 40), options)?;

        let mut studio = Self::empty(config);
        studio.object = Some(object);
        Ok(studio)
    }

    /// Image file, or a saved record whose `src` resolves next to it.
    fn open(config: WarpConfig, path: &Path) -> Result<Self> {
        let is_record = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let pending = if is_record {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            let record = from_json(&json).with_context(|| format!("parsing {}", path.display()))?;
            let loader = FileLoader::new(path.parent().unwrap_or(Path::new(".")));
            WarpObject::from_record(record, &loader)?
        } else {
            let mut record = WarpRecord::for_source(path.to_string_lossy());
            record.resolution = Some(config.resolution);
            WarpObject::from_record(record, &FileLoader::default())?
        };

        let mut studio = Self::empty(config);
        studio.pending = Some(pending);
        Ok(studio)
    }

    fn poll_pending(&mut self, ctx: &mut FrameCtx<'_, '_>) {
        let Some(pending) = self.pending.as_mut() else { return };
        match pending.poll() {
            None => ctx.runtime.request_redraw(),
            Some(outcome) => {
                self.pending = None;
                // Failures were already reported by the load task.
                if let Ok(object) = outcome {
                    ctx.window.set_title(&format!("cornerpin studio - {}", object.image().src()));
                    self.object = Some(object);
                    self.view_fitted = false;
                }
            }
        }
    }

    /// Centers the object and zooms out until it fits.
    fn fit_view(&mut self, window: (f32, f32)) {
        let Some(object) = self.object.as_ref() else { return };
        let placement = object.placement();
        let size = placement.scaled_size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }

        let zoom = (window.0 * 0.8 / size.x).min(window.1 * 0.8 / size.y).min(1.0);
        let origin = Vec2::new(placement.left, placement.top) * zoom;
        let centered = (Vec2::new(window.0, window.1) - size * zoom) / 2.0;

        self.view = View { zoom, pan: centered - origin };
        self.view_fitted = true;
    }

    fn handle_event(&mut self, event: &InputEvent, pointer: Option<Vec2>) -> AppControl {
        match *event {
            InputEvent::PointerButton { button, state, x, y } => {
                let at = Vec2::new(x, y);
                match (button, state) {
                    (MouseButton::Left, ButtonState::Pressed) => {
                        if let Some(object) = self.object.as_ref() {
                            self.controls.pointer_down(object, &self.view, at);
                        }
                    }
                    (MouseButton::Left, ButtonState::Released) => {
                        self.controls.pointer_up();
                    }
                    (MouseButton::Middle, ButtonState::Pressed) => self.pan_from = Some(at),
                    (MouseButton::Middle, ButtonState::Released) => self.pan_from = None,
                    _ => {}
                }
            }
            InputEvent::PointerMoved { x, y } => {
                let at = Vec2::new(x, y);
                if let Some(from) = self.pan_from.replace(at) {
                    self.view.pan = self.view.pan + (at - from);
                } else if let Some(object) = self.object.as_mut() {
                    self.controls.pointer_move(object, &self.view, at);
                }
            }
            InputEvent::Wheel(delta) => {
                if let Some(at) = pointer {
                    self.view.zoom_about(at, 1.1f32.powf(delta.lines_y()));
                }
            }
            InputEvent::PointerLeft => self.pan_from = None,
            InputEvent::Focused(false) => {
                self.controls.pointer_up();
                self.pan_from = None;
            }
            InputEvent::Key { key, state: ButtonState::Pressed, repeat: false } => return self.handle_key(key),
            _ => {}
        }
        AppControl::Continue
    }

    fn handle_key(&mut self, key: Key) -> AppControl {
        if key == Key::Escape {
            return AppControl::Exit;
        }
        let Some(object) = self.object.as_mut() else { return AppControl::Continue };

        match key {
            Key::Char('p') => {
                let on = !object.perspective_mode();
                object.set_perspective_mode(on);
                self.controls.reset();
                log::info!("perspective mode {}", if on { "on" } else { "off" });
            }
            Key::Char('r') => {
                object.reset_to_initial();
                self.controls.reset();
                log::info!("corners reset");
            }
            Key::Char('s') => match to_json(object) {
                Ok(json) => log::info!("warp record:\n{json}"),
                Err(e) => log::error!("could not serialize warp object: {e}"),
            },
            _ => {}
        }
        AppControl::Continue
    }
}

impl App for Studio {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.poll_pending(ctx);

        if !self.view_fitted {
            self.fit_view(ctx.window.logical_size());
        }

        let pointer = ctx.input.pointer();
        for event in &ctx.input_frame.events {
            if self.handle_event(event, pointer) == AppControl::Exit {
                return AppControl::Exit;
            }
        }

        let cursor = self.object.as_ref().map_or(CursorHint::Default, |o| self.controls.cursor(o));
        if cursor != self.cursor {
            ctx.window.set_cursor(match cursor {
                CursorHint::Cell => CursorIcon::Cell,
                CursorHint::Default => CursorIcon::Default,
            });
            self.cursor = cursor;
        }

        self.draw_list.clear();
        if let Some(object) = self.object.as_ref() {
            self.controls.push_overlay(object, &self.view, &self.config, &mut self.draw_list);
        }

        // The redraw request is consumed only by a frame that actually drew.
        ctx.render(self.config.clear_color(), |rctx, target| {
            if let Some(object) = self.object.as_mut() {
                self.surface.draw(rctx, target, &mut self.programs, object, &self.view);
                object.take_redraw();
            }
            self.overlay.render(rctx, target, &mut self.draw_list);
        })
    }
}
