// The editor's view-model: everything the compositor needs to draw a frame,
// and the actions that move it from one state to the next.
//
// `Scene::reduce` never mutates in place; the app swaps in the returned scene
// and compares old and new to decide whether the surface must be redrawn.

use serde::{Deserialize, Serialize};

use crate::overlay::{
    self, Handle, Overlay, SCALE_STEP, SKEW_LIMIT, clamp_opacity, clamp_scale,
};
use crate::transform::Point;
use crate::types::Size;

/// Which editor the window runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// One tattoo, drag to move, wheel to scale.
    Simple,
    /// Many tattoos with selection, handles and per-tattoo adjustments.
    #[default]
    Studio,
}

/// Where a simple-variant tattoo lands the first time it's picked.
const SIMPLE_START: (f32, f32) = (250.0, 150.0);
const SIMPLE_START_SCALE: f32 = 0.6;
const STUDIO_START_OPACITY: f32 = 0.8;

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Gesture {
    #[default]
    Idle,
    /// Moving overlay `index`; the pointer stays `offset` away from its origin.
    Drag { index: usize, offset_x: f32, offset_y: f32 },
    Resize { index: usize, anchor: overlay::Anchor },
    Rotate { index: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// A thumbnail was picked; `width`/`height` are the tattoo's natural size.
    AddOverlay { tattoo: usize, width: u32, height: u32 },
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Positive = zoom in. Only the sign matters.
    Wheel { delta: f32 },
    Select(Option<usize>),
    SelectNext,
    ScaleBy(f32),
    SetScale(f32),
    RotateBy(f32),
    SetRotation(f32),
    OpacityBy(f32),
    SetOpacity(f32),
    SkewBy(f32),
    DeleteSelected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub variant: Variant,
    pub selected: Option<usize>,
    pub surface: Size,
    /// Paint order: later entries draw on top and win hit tests.
    pub overlays: Vec<Overlay>,
    #[serde(skip)]
    pub gesture: Gesture,
}

impl Scene {
    pub fn new(variant: Variant, surface: Size) -> Self {
        Self { variant, surface, overlays: Vec::new(), selected: None, gesture: Gesture::Idle }
    }

    pub fn reduce(&self, action: Action) -> Scene {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    pub fn selected_overlay(&self) -> Option<&Overlay> {
        self.selected.and_then(|i| self.overlays.get(i))
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// The overlay that wheel/keyboard edits apply to.
    fn target(&self) -> Option<usize> {
        match self.variant {
            Variant::Simple => (!self.overlays.is_empty()).then_some(0),
            Variant::Studio => self.selected.filter(|&i| i < self.overlays.len()),
        }
    }

    fn clamp_to_surface(&self, x: f32, y: f32) -> Point {
        Point::new(
            x.clamp(0.0, self.surface.width as f32),
            y.clamp(0.0, self.surface.height as f32),
        )
    }

    fn edit_target(&mut self, f: impl FnOnce(&Overlay) -> Overlay) {
        if let Some(i) = self.target() {
            self.overlays[i] = f(&self.overlays[i]);
        }
    }

    fn apply(&mut self, action: Action) {
        let studio = self.variant == Variant::Studio;
        match action {
            Action::AddOverlay { tattoo, width, height } => self.add_overlay(tattoo, width, height),
            Action::PointerDown { x, y } => {
                let p = self.clamp_to_surface(x, y);
                self.pointer_down(p);
            }
            Action::PointerMove { x, y } => {
                let p = self.clamp_to_surface(x, y);
                self.pointer_move(p);
            }
            Action::PointerUp => {
                if self.is_dragging() {
                    log::debug!("gesture ended: {:?}", self.gesture);
                }
                self.gesture = Gesture::Idle;
            }
            Action::Wheel { delta } => {
                let step = if delta > 0.0 {
                    SCALE_STEP
                } else if delta < 0.0 {
                    -SCALE_STEP
                } else {
                    return;
                };
                self.edit_target(|o| scale_by(o, step));
            }
            Action::ScaleBy(step) => self.edit_target(|o| scale_by(o, step)),
            Action::SetScale(v) => self.edit_target(|o| o.clone().with_scale(v)),
            Action::Select(sel) if studio => {
                self.selected = sel.filter(|&i| i < self.overlays.len());
                self.gesture = Gesture::Idle;
            }
            Action::SelectNext if studio => {
                self.selected = match (self.overlays.len(), self.selected) {
                    (0, _) => None,
                    (n, Some(i)) => Some((i + 1) % n),
                    (_, None) => Some(0),
                };
                self.gesture = Gesture::Idle;
            }
            Action::RotateBy(deg) if studio => {
                self.edit_target(|o| o.with_rotation_about_center(o.rotation + deg))
            }
            Action::SetRotation(deg) if studio => {
                self.edit_target(|o| o.with_rotation_about_center(deg))
            }
            Action::OpacityBy(d) if studio => {
                self.edit_target(|o| Overlay { opacity: clamp_opacity(o.opacity + d), ..o.clone() })
            }
            Action::SetOpacity(v) if studio => {
                self.edit_target(|o| Overlay { opacity: clamp_opacity(v), ..o.clone() })
            }
            Action::SkewBy(d) if studio => self.edit_target(|o| Overlay {
                skew_x: (o.skew_x + d).clamp(-SKEW_LIMIT, SKEW_LIMIT),
                ..o.clone()
            }),
            Action::DeleteSelected if studio => {
                if let Some(i) = self.target() {
                    self.overlays.remove(i);
                    self.selected = None;
                    self.gesture = Gesture::Idle;
                }
            }
            // The simple editor has no selection or per-tattoo sliders.
            _ => {}
        }
    }

    fn add_overlay(&mut self, tattoo: usize, width: u32, height: u32) {
        match self.variant {
            Variant::Simple => match self.overlays.first_mut() {
                // Swapping artwork keeps where the user put it.
                Some(o) => {
                    o.tattoo = tattoo;
                    o.width = width;
                    o.height = height;
                }
                None => self.overlays.push(
                    Overlay::new(tattoo, width, height, SIMPLE_START.0, SIMPLE_START.1)
                        .with_scale(SIMPLE_START_SCALE),
                ),
            },
            Variant::Studio => {
                // Fit into half the surface, centred.
                let (sw, sh) = (self.surface.width as f32, self.surface.height as f32);
                let fit = (0.5 * sw / width.max(1) as f32).min(0.5 * sh / height.max(1) as f32);
                let scale = clamp_scale(fit.min(1.0));
                let x = (sw - width as f32 * scale) / 2.0;
                let y = (sh - height as f32 * scale) / 2.0;
                self.overlays.push(
                    Overlay::new(tattoo, width, height, x, y)
                        .with_scale(scale)
                        .with_opacity(STUDIO_START_OPACITY),
                );
                self.selected = Some(self.overlays.len() - 1);
            }
        }
        self.gesture = Gesture::Idle;
    }

    fn pointer_down(&mut self, p: Point) {
        match self.variant {
            Variant::Simple => {
                if let Some(o) = self.overlays.first()
                    && o.contains_axis_aligned(p)
                {
                    self.gesture = Gesture::Drag { index: 0, offset_x: p.x - o.x, offset_y: p.y - o.y };
                }
            }
            Variant::Studio => {
                if let Some(i) = self.selected
                    && let Some(handle) = self.overlays.get(i).and_then(|o| o.hit_handle(p))
                {
                    self.gesture = match handle {
                        Handle::Resize(anchor) => Gesture::Resize { index: i, anchor },
                        Handle::Rotate => Gesture::Rotate { index: i },
                    };
                    log::debug!("gesture started: {:?}", self.gesture);
                    return;
                }
                match self.overlays.iter().rposition(|o| o.contains(p)) {
                    Some(i) => {
                        let o = &self.overlays[i];
                        self.selected = Some(i);
                        self.gesture = Gesture::Drag { index: i, offset_x: p.x - o.x, offset_y: p.y - o.y };
                        log::debug!("selected overlay {i}, dragging");
                    }
                    None => {
                        self.selected = None;
                        self.gesture = Gesture::Idle;
                    }
                }
            }
        }
    }

    fn pointer_move(&mut self, p: Point) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Drag { index, offset_x, offset_y } => {
                if let Some(o) = self.overlays.get_mut(index) {
                    o.x = p.x - offset_x;
                    o.y = p.y - offset_y;
                }
            }
            Gesture::Resize { index, anchor } => {
                // A rejected resize leaves the previous box in place.
                if let Some(resized) = self.overlays.get(index).and_then(|o| o.resized(anchor, p)) {
                    self.overlays[index] = resized;
                }
            }
            Gesture::Rotate { index } => {
                if let Some(o) = self.overlays.get(index) {
                    self.overlays[index] = o.rotated_towards(p);
                }
            }
        }
    }
}

fn scale_by(o: &Overlay, step: f32) -> Overlay {
    Overlay {
        scale_x: clamp_scale(o.scale_x + step),
        scale_y: clamp_scale(o.scale_y + step),
        ..o.clone()
    }
}
