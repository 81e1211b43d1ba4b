// The window loop: read input, turn it into scene actions, poll the
// background, redraw when dirty, present.

use std::path::Path;
use std::time::{Duration, Instant};

use minifb::Key;

use crate::catalog::{Catalog, STRIP_HEIGHT};
use crate::compositor::Compositor;
use crate::config::Config;
use crate::draw::{Drawer, InputFrame, draw_text_5x7, fill_rect, text_width_5x7};
use crate::error::Error;
use crate::export::export_png;
use crate::gamma::GammaLut;
use crate::overlay::SCALE_STEP;
use crate::scene::{Action, Scene, Variant};
use crate::source::{SourceManager, SourceMode};
use crate::types::FrameBuffer;

const ROTATE_STEP_DEG: f32 = 5.0;
const OPACITY_STEP: f32 = 0.05;
const SKEW_STEP: f32 = 0.05;

const STATUS_TTL: Duration = Duration::from_secs(4);
const HUD_TEXT: u32 = 0x00_FF_FF_FF;
const HUD_ERROR: u32 = 0x00_FF_50_50;
const HUD_OK: u32 = 0x00_70_FF_70;

/// What one loop iteration's input asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Scene(Action),
    AddTattoo(usize),
    SetMode(SourceMode),
    OpenPhoto,
    Export,
}

/// Remembers last frame's button and position so we can emit edges.
#[derive(Debug, Default)]
pub struct PointerState {
    was_down: bool,
    last: Option<(f32, f32)>,
}

/// Turn raw window input into commands. `surface_height` separates the
/// drawing surface (above) from the thumbnail strip (below).
pub fn translate_input(
    input: &InputFrame,
    pointer: &mut PointerState,
    surface_height: usize,
    catalog: &Catalog,
) -> Vec<Command> {
    let mut out = Vec::new();
    let on_surface = |y: f32| y < surface_height as f32;

    if let Some((x, y)) = input.mouse {
        match (pointer.was_down, input.left_down) {
            (false, true) if on_surface(y) => out.push(Command::Scene(Action::PointerDown { x, y })),
            (false, true) => {
                if let Some(i) = catalog.thumbnail_at(x, y, surface_height) {
                    out.push(Command::AddTattoo(i));
                }
            }
            (true, true) if pointer.last != Some((x, y)) => {
                out.push(Command::Scene(Action::PointerMove { x, y }))
            }
            (true, false) => out.push(Command::Scene(Action::PointerUp)),
            _ => {}
        }
        if input.wheel != 0.0 && on_surface(y) {
            out.push(Command::Scene(Action::Wheel { delta: input.wheel }));
        }
    } else if pointer.was_down && !input.left_down {
        out.push(Command::Scene(Action::PointerUp));
    }
    pointer.was_down = input.left_down;
    pointer.last = input.mouse;

    for key in &input.keys {
        let cmd = match key {
            Key::Key1 => Command::AddTattoo(0),
            Key::Key2 => Command::AddTattoo(1),
            Key::Key3 => Command::AddTattoo(2),
            Key::Key4 => Command::AddTattoo(3),
            Key::Key5 => Command::AddTattoo(4),
            Key::Key6 => Command::AddTattoo(5),
            Key::Key7 => Command::AddTattoo(6),
            Key::Key8 => Command::AddTattoo(7),
            Key::Key9 => Command::AddTattoo(8),
            Key::C => Command::SetMode(SourceMode::Camera),
            Key::P | Key::O => Command::OpenPhoto,
            Key::S => Command::Export,
            Key::Tab => Command::Scene(Action::SelectNext),
            Key::Delete | Key::Backspace => Command::Scene(Action::DeleteSelected),
            Key::Equal | Key::NumPadPlus => Command::Scene(Action::ScaleBy(SCALE_STEP)),
            Key::Minus | Key::NumPadMinus => Command::Scene(Action::ScaleBy(-SCALE_STEP)),
            Key::LeftBracket => Command::Scene(Action::RotateBy(-ROTATE_STEP_DEG)),
            Key::RightBracket => Command::Scene(Action::RotateBy(ROTATE_STEP_DEG)),
            Key::Comma => Command::Scene(Action::OpacityBy(-OPACITY_STEP)),
            Key::Period => Command::Scene(Action::OpacityBy(OPACITY_STEP)),
            Key::K => Command::Scene(Action::SkewBy(-SKEW_STEP)),
            Key::L => Command::Scene(Action::SkewBy(SKEW_STEP)),
            _ => continue,
        };
        out.push(cmd);
    }
    out
}

/// Top HUD line: background, editor, and the selected tattoo's values.
pub fn hud_line(scene: &Scene, mode: SourceMode, has_background: bool) -> String {
    let source = match (mode, has_background) {
        (SourceMode::Camera, true) => "CAMERA",
        (SourceMode::Camera, false) => "CAMERA (NO SIGNAL)",
        (SourceMode::Photo, true) => "PHOTO",
        (SourceMode::Photo, false) => "PHOTO (P: OPEN)",
    };
    let editor = match scene.variant {
        Variant::Simple => "SIMPLE",
        Variant::Studio => "STUDIO",
    };
    let mut line = format!("{source} | {editor} | {} TATTOO(S)", scene.overlays.len());
    let focused = match scene.variant {
        Variant::Simple => scene.overlays.first(),
        Variant::Studio => scene.selected_overlay(),
    };
    if let Some(o) = focused {
        line.push_str(&format!(" | SCALE {:.2}", (o.scale_x + o.scale_y) / 2.0));
        if scene.variant == Variant::Studio {
            line.push_str(&format!(
                " ROT {:.0} OPACITY {:.0}%",
                o.rotation,
                o.opacity * 100.0
            ));
        }
    }
    line
}

/// The configured tattoo directory, or the built-in set when none is given.
/// A directory that can't be read falls back to the built-in set, and the
/// error is handed back for the HUD.
pub fn load_catalog(dir: Option<&Path>, strip_width: usize, lut: &GammaLut) -> (Catalog, Option<Error>) {
    let (mut catalog, err) = match dir.map(|d| Catalog::load_dir(d, lut)) {
        Some(Ok(catalog)) => (catalog, None),
        Some(Err(e)) => (Catalog::bundled(lut).unwrap_or_default(), Some(e)),
        None => match Catalog::bundled(lut) {
            Ok(catalog) => (catalog, None),
            Err(e) => (Catalog::default(), Some(e)),
        },
    };
    if catalog.is_empty() {
        log::warn!("no tattoos to show");
    }
    catalog.fit_to_width(strip_width);
    (catalog, err)
}

struct Status {
    text: String,
    color: u32,
    until: Instant,
}

pub struct App {
    cfg: Config,
    scene: Scene,
    sources: SourceManager,
    catalog: Catalog,
    compositor: Compositor,
    drawer: Drawer,
    /// Surface on top, thumbnail strip below; this is what the window shows.
    screen: FrameBuffer,
    pointer: PointerState,
    status: Option<Status>,
    chrome_dirty: bool,
}

impl App {
    pub fn new(cfg: Config, photo: Option<&Path>) -> Result<Self, Error> {
        let size = cfg.surface.size();
        let (w, h) = (size.width as usize, size.height as usize);

        let compositor = Compositor::new(size);
        let (catalog, catalog_err) = load_catalog(cfg.assets.tattoo_dir.as_deref(), w, compositor.lut());

        let drawer = Drawer::new("Tattoo Try-On", w, h + STRIP_HEIGHT)?;

        let mut app = Self {
            scene: Scene::new(cfg.editor.variant, size),
            sources: SourceManager::with_camera_config(cfg.camera.clone()),
            catalog,
            compositor,
            drawer,
            screen: FrameBuffer::new(w, h + STRIP_HEIGHT),
            pointer: PointerState::default(),
            status: None,
            chrome_dirty: true,
            cfg,
        };

        if let Some(e) = catalog_err {
            app.report_error(e);
        }
        match photo {
            Some(path) => {
                if let Err(e) = app.sources.load_photo(path) {
                    app.report_error(e);
                }
            }
            None => {
                app.sources.set_mode(app.cfg.editor.mode);
            }
        }
        Ok(app)
    }

    pub fn run(&mut self) -> Result<(), Error> {
        while self.drawer.is_open() && !self.drawer.esc_pressed() {
            let input = self.drawer.input();
            let surface_h = self.cfg.surface.height as usize;
            for cmd in translate_input(&input, &mut self.pointer, surface_h, &self.catalog) {
                self.handle(cmd);
            }

            // Blocks for the next frame in camera mode.
            if self.sources.poll() {
                self.compositor.mark_dirty();
            }

            if self.status.as_ref().is_some_and(|s| Instant::now() >= s.until) {
                self.status = None;
                self.chrome_dirty = true;
            }

            let redrawn = self
                .compositor
                .redraw_if_dirty(&self.scene, self.sources.background(), &self.catalog);
            if redrawn || self.chrome_dirty {
                self.compose_screen();
                self.drawer.present(&self.screen)?;
            } else {
                self.drawer.poll();
            }
        }
        Ok(())
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Scene(action) => self.dispatch(action),
            Command::AddTattoo(i) => {
                if let Some(t) = self.catalog.get(i) {
                    let (width, height) = t.image.dimensions();
                    log::debug!("adding tattoo {} ({})", i, t.name);
                    self.dispatch(Action::AddOverlay { tattoo: i, width, height });
                }
            }
            Command::SetMode(mode) => {
                if self.sources.set_mode(mode) {
                    self.compositor.mark_dirty();
                }
            }
            Command::OpenPhoto => {
                self.sources.set_mode(SourceMode::Photo);
                self.compositor.mark_dirty();
                // The dialog is modal; a stale pointer-down must not turn into a drag.
                self.dispatch(Action::PointerUp);
                match self.sources.pick_photo() {
                    Ok(true) => self.report_ok("PHOTO LOADED".to_string()),
                    Ok(false) => {}
                    Err(e) => self.report_error(e),
                }
            }
            Command::Export => {
                let out = self
                    .compositor
                    .render_for_export(&self.scene, self.sources.background(), &self.catalog);
                match export_png(&out, &self.cfg.export.output_dir) {
                    Ok(path) => self.report_ok(format!("SAVED {}", path.display())),
                    Err(e) => self.report_error(e),
                }
            }
        }
    }

    fn dispatch(&mut self, action: Action) {
        let next = self.scene.reduce(action);
        if next != self.scene {
            self.scene = next;
            self.compositor.mark_dirty();
        }
    }

    fn report_ok(&mut self, text: String) {
        self.set_status(text, HUD_OK);
    }

    fn report_error(&mut self, e: Error) {
        log::error!("{e}");
        self.set_status(format!("ERROR: {e}"), HUD_ERROR);
    }

    fn set_status(&mut self, text: String, color: u32) {
        self.status = Some(Status { text, color, until: Instant::now() + STATUS_TTL });
        self.chrome_dirty = true;
    }

    fn compose_screen(&mut self) {
        let surface = self.compositor.surface();
        self.screen.blit(surface, 0, 0);

        let active: Vec<usize> = match self.scene.variant {
            Variant::Simple => self.scene.overlays.first().map(|o| o.tattoo).into_iter().collect(),
            Variant::Studio => self.scene.selected_overlay().map(|o| o.tattoo).into_iter().collect(),
        };
        self.catalog.draw_strip(&mut self.screen, surface.height, &active);

        let hud = hud_line(&self.scene, self.sources.mode(), self.sources.background().is_some());
        draw_text_5x7(&mut self.screen, 8, 8, &hud, HUD_TEXT);

        if let Some(status) = &self.status {
            let w = text_width_5x7(&status.text) + 6;
            fill_rect(&mut self.screen, 5, 19, w, 12, 0x00_00_00_00);
            draw_text_5x7(&mut self.screen, 8, 21, &status.text, status.color);
        }
        self.chrome_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Tattoo;
    use crate::types::Size;
    use image::{Rgba, RgbaImage};

    fn catalog() -> Catalog {
        let lut = GammaLut::new();
        Catalog::from_tattoos(vec![
            Tattoo::new("a", RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])), &lut),
            Tattoo::new("b", RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])), &lut),
        ])
    }

    fn frame(mouse: (f32, f32), left_down: bool) -> InputFrame {
        InputFrame { mouse: Some(mouse), left_down, ..Default::default() }
    }

    #[test]
    fn test_press_move_release_become_pointer_actions() {
        let cat = catalog();
        let mut p = PointerState::default();
        assert_eq!(
            translate_input(&frame((10.0, 20.0), true), &mut p, 480, &cat),
            vec![Command::Scene(Action::PointerDown { x: 10.0, y: 20.0 })]
        );
        // holding still emits nothing
        assert!(translate_input(&frame((10.0, 20.0), true), &mut p, 480, &cat).is_empty());
        assert_eq!(
            translate_input(&frame((15.0, 22.0), true), &mut p, 480, &cat),
            vec![Command::Scene(Action::PointerMove { x: 15.0, y: 22.0 })]
        );
        assert_eq!(
            translate_input(&frame((15.0, 22.0), false), &mut p, 480, &cat),
            vec![Command::Scene(Action::PointerUp)]
        );
    }

    #[test]
    fn test_click_in_strip_adds_tattoo() {
        let cat = catalog();
        let mut p = PointerState::default();
        let cmds = translate_input(&frame((100.0, 500.0), true), &mut p, 480, &cat);
        assert_eq!(cmds, vec![Command::AddTattoo(1)]);
    }

    #[test]
    fn test_wheel_only_over_surface() {
        let cat = catalog();
        let mut p = PointerState::default();
        let over = InputFrame { mouse: Some((5.0, 5.0)), wheel: -3.0, ..Default::default() };
        assert_eq!(
            translate_input(&over, &mut p, 480, &cat),
            vec![Command::Scene(Action::Wheel { delta: -3.0 })]
        );
        let below = InputFrame { mouse: Some((5.0, 520.0)), wheel: 1.0, ..Default::default() };
        assert!(translate_input(&below, &mut p, 480, &cat).is_empty());
    }

    #[test]
    fn test_keys_map_to_commands() {
        let cat = catalog();
        let mut p = PointerState::default();
        let input = InputFrame {
            keys: vec![Key::Key3, Key::S, Key::Delete, Key::RightBracket, Key::F12],
            ..Default::default()
        };
        assert_eq!(
            translate_input(&input, &mut p, 480, &cat),
            vec![
                Command::AddTattoo(2),
                Command::Export,
                Command::Scene(Action::DeleteSelected),
                Command::Scene(Action::RotateBy(ROTATE_STEP_DEG)),
            ]
        );
    }

    #[test]
    fn test_hud_line_reports_missing_camera_and_selection() {
        let size = Size { width: 640, height: 480 };
        let scene = Scene::new(Variant::Studio, size)
            .reduce(Action::AddOverlay { tattoo: 0, width: 100, height: 100 });
        let line = hud_line(&scene, SourceMode::Camera, false);
        assert!(line.starts_with("CAMERA (NO SIGNAL) | STUDIO | 1 TATTOO(S)"));
        assert!(line.contains("SCALE 1.00"));
        assert!(line.contains("OPACITY 80%"));
    }

    #[test]
    fn test_catalog_defaults_to_built_in_art() {
        let (cat, err) = load_catalog(None, 640, &GammaLut::new());
        assert!(err.is_none());
        assert_eq!(cat.len(), 4);
    }

    #[test]
    fn test_unreadable_tattoo_dir_falls_back_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let (cat, err) = load_catalog(Some(&missing), 640, &GammaLut::new());
        assert_eq!(cat.len(), 4);
        assert!(matches!(err, Some(Error::Assets(_))));
    }
}
