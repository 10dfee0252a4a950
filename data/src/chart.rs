pub mod animation;
pub mod geometry;
pub mod navigation;
pub mod renderer;
pub mod scene;

pub use animation::{Animation, Progress};
pub use geometry::{CHART_HEIGHT, Geometry, Padding};
pub use navigation::{Direction, FullLoadRequest, Navigator, SliceRequest};
pub use renderer::{ChartRenderer, HoverBinding};
pub use scene::{Scene, Tone};
