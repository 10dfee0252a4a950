use super::animation::{Animation, Progress};
use super::geometry::Geometry;
use super::scene::Scene;

use iced_core::{Point, Size};
use provider::MonthSlice;
use std::sync::Arc;
use std::time::Instant;

/// Identifies which draw a pointer event was resolved against.
///
/// Every draw hands out a new binding, events carrying an older one are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HoverBinding(u64);

impl HoverBinding {
    fn next(self) -> Self {
        HoverBinding(self.0.wrapping_add(1))
    }
}

/// Last drawn dataset plus reveal and hover state for the temperature chart.
#[derive(Debug, Default)]
pub struct ChartRenderer {
    slice: Option<Arc<MonthSlice>>,
    animation: Animation,
    progress: Progress,
    binding: HoverBinding,
    hover: Option<usize>,
    geometry: Option<Geometry>,
    revision: u64,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `slice`, cancelling any reveal in flight and invalidating hover state.
    pub fn draw(&mut self, slice: Arc<MonthSlice>, animate: bool, now: Instant) {
        self.animation.cancel();
        self.rebind();

        self.progress = if animate {
            self.animation.start(now)
        } else {
            Progress::COMPLETE
        };
        self.slice = Some(slice);
        self.geometry = None;
        self.touch();
    }

    /// Repaints the last dataset without animation, e.g. after the surface was resized.
    pub fn redraw(&mut self) -> bool {
        match self.slice.clone() {
            Some(slice) => {
                self.draw(slice, false, Instant::now());
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.animation.cancel();
        self.rebind();
        self.slice = None;
        self.geometry = None;
        self.progress = Progress::COMPLETE;
        self.touch();
    }

    /// Advances a running reveal. Returns `true` when a repaint is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.animation.tick(now) {
            Some(progress) => {
                self.progress = progress;
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    pub fn binding(&self) -> HoverBinding {
        self.binding
    }

    pub fn slice(&self) -> Option<&Arc<MonthSlice>> {
        self.slice.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn progress(&self) -> Progress {
        self.progress
    }

    #[cfg(test)]
    pub(crate) fn hovered(&self) -> Option<usize> {
        self.hover
    }

    /// Bumped whenever the painted output would change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pointer_moved(&mut self, binding: HoverBinding, size: Size, position: Point) -> bool {
        if binding != self.binding || self.is_animating() {
            return false;
        }

        let index = self
            .geometry_for(size)
            .and_then(|geometry| geometry.index_at(position.x));

        self.set_hover(index)
    }

    pub fn pointer_left(&mut self, binding: HoverBinding) -> bool {
        if binding != self.binding || self.is_animating() {
            return false;
        }
        self.set_hover(None)
    }

    pub fn scene(&self, size: Size) -> Option<Scene> {
        let slice = self.slice.as_deref()?;

        let geometry = match self.geometry {
            Some(geometry) if geometry.size() == size => geometry,
            _ => Geometry::new(size, slice)?,
        };

        Some(Scene::build(geometry, slice, self.progress, self.hover))
    }

    fn geometry_for(&mut self, size: Size) -> Option<Geometry> {
        if let Some(geometry) = self.geometry.filter(|g| g.size() == size) {
            return Some(geometry);
        }

        let geometry = Geometry::new(size, self.slice.as_deref()?)?;
        self.geometry = Some(geometry);
        Some(geometry)
    }

    fn set_hover(&mut self, index: Option<usize>) -> bool {
        if self.hover == index {
            return false;
        }
        self.hover = index;
        self.touch();
        true
    }

    fn rebind(&mut self) {
        self.binding = self.binding.next();
        self.hover = None;
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
