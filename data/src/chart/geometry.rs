use iced_core::{Point, Rectangle, Size};
use provider::MonthSlice;

/// Logical height of the chart surface. Width follows the container.
pub const CHART_HEIGHT: f32 = 180.0;

pub const PILL_HEIGHT: f32 = 18.0;
pub const PILL_RADIUS: f32 = 4.0;
pub const PILL_GAP: f32 = 8.0;
pub const PILL_PADDING: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

pub const PADDING: Padding = Padding {
    top: 20.0,
    right: 8.0,
    bottom: 28.0,
    left: 32.0,
};

/// Maps sample indices and temperatures onto a surface of a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    size: Size,
    padding: Padding,
    samples: usize,
    min: f32,
    max: f32,
}

impl Geometry {
    /// `None` when the slice has no values or the surface is too narrow to plot on.
    pub fn new(size: Size, slice: &MonthSlice) -> Option<Self> {
        let (lo, hi) = slice.value_range()?;

        let geometry = Geometry {
            size,
            padding: PADDING,
            samples: slice.len(),
            min: (lo - 2.0).floor(),
            max: (hi + 2.0).ceil(),
        };

        (geometry.plot_width() > 0.0 && geometry.plot_height() > 0.0).then_some(geometry)
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn domain(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn plot_width(&self) -> f32 {
        self.size.width - self.padding.left - self.padding.right
    }

    pub fn plot_height(&self) -> f32 {
        self.size.height - self.padding.top - self.padding.bottom
    }

    pub fn plot_right(&self) -> f32 {
        self.size.width - self.padding.right
    }

    pub fn plot_bottom(&self) -> f32 {
        self.size.height - self.padding.bottom
    }

    pub fn x_pos(&self, index: usize) -> f32 {
        if self.samples < 2 {
            return self.padding.left;
        }
        self.padding.left + (index as f32 / (self.samples - 1) as f32) * self.plot_width()
    }

    pub fn y_pos(&self, value: f32) -> f32 {
        let ratio = (value - self.min) / (self.max - self.min);
        self.padding.top + self.plot_height() - ratio * self.plot_height()
    }

    pub fn point(&self, index: usize, value: f32) -> Point {
        Point::new(self.x_pos(index), self.y_pos(value))
    }

    /// Nearest sample under a horizontal position, `None` outside the plotting range.
    pub fn index_at(&self, x: f32) -> Option<usize> {
        if self.samples == 0 || x < self.padding.left || x > self.plot_right() {
            return None;
        }

        let frac = (x - self.padding.left) / self.plot_width();
        let idx = (frac * (self.samples - 1) as f32).round();

        Some((idx.max(0.0) as usize).min(self.samples - 1))
    }

    /// Points for the non-missing values among `indices`, tagged with their index.
    pub fn points(
        &self,
        values: &[Option<f32>],
        indices: impl IntoIterator<Item = usize>,
    ) -> Vec<(usize, Point)> {
        indices
            .into_iter()
            .filter_map(|i| {
                values
                    .get(i)
                    .copied()
                    .flatten()
                    .map(|v| (i, self.point(i, v)))
            })
            .collect()
    }

    /// Pill to the right of `anchor_x`, flipped left when it would cross the right padding.
    pub fn pill_rect(&self, anchor_x: f32, center_y: f32, text_width: f32) -> Rectangle {
        let width = text_width + 2.0 * PILL_PADDING;

        let mut x = anchor_x + PILL_GAP;
        if x + width > self.plot_right() {
            x = anchor_x - PILL_GAP - width;
        }

        Rectangle {
            x,
            y: center_y - PILL_HEIGHT / 2.0,
            width,
            height: PILL_HEIGHT,
        }
    }
}

pub fn path_length(points: &[(usize, Point)]) -> f32 {
    points
        .windows(2)
        .map(|pair| pair[0].1.distance(pair[1].1))
        .sum()
}

/// The visible part of a polyline during a reveal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealedLine {
    pub vertices: Vec<Point>,
    pub markers: Vec<(usize, Point)>,
}

/// Cuts a polyline at `fraction` of its total length.
///
/// The last vertex may sit partway along a segment. Markers are kept only
/// where the cumulative length up to that point is within the revealed length.
pub fn reveal(points: &[(usize, Point)], fraction: f32) -> RevealedLine {
    let Some(&(first_idx, first)) = points.first() else {
        return RevealedLine::default();
    };

    let target = path_length(points) * fraction.clamp(0.0, 1.0);

    let mut vertices = vec![first];
    let mut markers = vec![(first_idx, first)];
    let mut drawn = 0.0;
    let mut cut = false;

    for pair in points.windows(2) {
        let (from, (idx, to)) = (pair[0].1, pair[1]);
        let segment = from.distance(to);

        if !cut {
            if drawn + segment <= target {
                vertices.push(to);
            } else {
                if target > drawn {
                    let ratio = (target - drawn) / segment;
                    vertices.push(Point::new(
                        from.x + (to.x - from.x) * ratio,
                        from.y + (to.y - from.y) * ratio,
                    ));
                }
                cut = true;
            }
        }

        drawn += segment;
        if drawn <= target {
            markers.push((idx, to));
        }
    }

    RevealedLine { vertices, markers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn slice(values: Vec<Option<f32>>) -> MonthSlice {
        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let dates = start.iter_days().take(values.len()).collect();
        let reference = vec![None; values.len()];
        MonthSlice::new(dates, values, reference, None, 0.0).unwrap()
    }

    fn geometry(samples: usize, width: f32) -> Geometry {
        let values = (0..samples).map(|i| Some(i as f32)).collect();
        Geometry::new(Size::new(width, CHART_HEIGHT), &slice(values)).unwrap()
    }

    #[test]
    fn domain_pads_and_rounds() {
        let g = Geometry::new(
            Size::new(300.0, CHART_HEIGHT),
            &slice(vec![Some(10.4), None, Some(15.2)]),
        )
        .unwrap();
        assert_eq!(g.domain(), (8.0, 18.0));
        assert_eq!(g.y_pos(8.0), g.plot_bottom());
        assert_eq!(g.y_pos(18.0), PADDING.top);
    }

    #[test]
    fn empty_values_have_no_geometry() {
        assert!(Geometry::new(Size::new(300.0, CHART_HEIGHT), &slice(vec![None, None])).is_none());
    }

    #[test]
    fn hover_index_at_boundaries() {
        let g = geometry(30, 330.0);
        assert_eq!(g.plot_width(), 290.0);

        assert_eq!(g.index_at(32.0), Some(0));
        assert_eq!(g.index_at(322.0), Some(29));
        assert_eq!(g.index_at(32.0 + 145.0), Some(15));
        assert_eq!(g.index_at(31.9), None);
        assert_eq!(g.index_at(322.1), None);
    }

    #[test]
    fn single_sample_sits_on_left_edge() {
        let g = geometry(1, 200.0);
        assert_eq!(g.x_pos(0), PADDING.left);
        assert_eq!(g.index_at(150.0), Some(0));
    }

    #[test]
    fn partial_reveal_matches_eased_length() {
        let points = vec![
            (0, Point::new(0.0, 0.0)),
            (1, Point::new(30.0, 40.0)),
            (2, Point::new(60.0, 0.0)),
        ];
        assert_eq!(path_length(&points), 100.0);

        let half = reveal(&points, 0.5);
        assert_eq!(half.vertices.len(), 2);
        assert!(half.vertices[1].distance(Point::new(30.0, 40.0)) < 1e-4);
        assert_eq!(half.markers.len(), 2);

        let quarter = reveal(&points, 0.25);
        let drawn: f32 = quarter
            .vertices
            .windows(2)
            .map(|p| p[0].distance(p[1]))
            .sum();
        assert!((drawn - 25.0).abs() < 1e-4);
        assert_eq!(quarter.markers, vec![(0, Point::new(0.0, 0.0))]);

        let full = reveal(&points, 1.0);
        assert_eq!(full.vertices.len(), 3);
        assert_eq!(full.markers.len(), 3);
    }

    #[test]
    fn pill_flips_near_right_edge() {
        let g = geometry(10, 300.0);
        let right = g.pill_rect(100.0, 50.0, 20.0);
        assert_eq!(right.x, 108.0);
        assert_eq!(right.width, 28.0);
        assert_eq!(right.y, 41.0);

        let flipped = g.pill_rect(280.0, 50.0, 20.0);
        assert_eq!(flipped.x, 280.0 - 8.0 - 28.0);
    }
}
