use serde::{Deserialize, Serialize};

use crate::geometry::{approximate_polygon, arc_length, bounding_rect, ContourMoments};
use crate::types::{Contour, HierarchyLink, Point2D, Rect};

/// A contour together with the measurements the classifier and the distance
/// estimator work from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquareCandidate {
    /// Position of the contour in the detection order of its frame.
    pub index: usize,
    pub contour: Contour,
    pub link: HierarchyLink,
    /// Polygon area in px².
    pub area: f64,
    /// Closed arc length in px.
    pub perimeter: f64,
    /// Douglas–Peucker simplification of the contour.
    pub polygon: Vec<Point2D>,
    /// Bounding box of `polygon`.
    pub bounding_box: Rect,
    /// `bounding_box.w / bounding_box.h`.
    pub aspect_ratio: f64,
    /// [`Point2D::UNDEFINED`] when the contour has no area.
    pub centroid: Point2D,
}

impl SquareCandidate {
    /// Measure a contour; `epsilon_ratio` scales the simplification tolerance
    /// with the perimeter.
    pub fn measure(
        index: usize,
        contour: Contour,
        link: HierarchyLink,
        epsilon_ratio: f64,
    ) -> Self {
        let moments = ContourMoments::of(&contour.points);
        let perimeter = arc_length(&contour.points, true);
        let polygon = approximate_polygon(&contour.points, epsilon_ratio * perimeter);
        let bounding_box = bounding_rect(&polygon);
        Self {
            index,
            link,
            area: moments.area(),
            perimeter,
            aspect_ratio: bounding_box.aspect_ratio(),
            bounding_box,
            polygon,
            centroid: moments.centroid(),
            contour,
        }
    }

    /// Number of vertices left after simplification.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.polygon.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::traced_square;
    use approx::assert_relative_eq;

    #[test]
    fn measures_a_traced_square() {
        let contour = Contour::new(traced_square(100, 50, 61));
        let c = SquareCandidate::measure(3, contour, HierarchyLink::default(), 0.1);

        assert_eq!(c.index, 3);
        assert_relative_eq!(c.area, 3600.0, epsilon = 1e-9);
        assert_relative_eq!(c.perimeter, 240.0, epsilon = 1e-9);
        assert_eq!(c.vertex_count(), 4);
        assert_eq!(
            c.bounding_box,
            Rect {
                x: 100,
                y: 50,
                w: 61,
                h: 61
            }
        );
        assert_relative_eq!(c.aspect_ratio, 1.0);
        assert_eq!(c.centroid, Point2D::new(130, 80));
    }

    #[test]
    fn flat_contour_has_undefined_centroid() {
        let contour = Contour::new(vec![
            Point2D::new(0, 10),
            Point2D::new(20, 10),
            Point2D::new(40, 10),
        ]);
        let c = SquareCandidate::measure(0, contour, HierarchyLink::default(), 0.1);
        assert_eq!(c.area, 0.0);
        assert!(!c.centroid.is_defined());
    }
}
