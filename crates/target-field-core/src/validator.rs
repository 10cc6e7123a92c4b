//! Square plausibility gates for traced contours.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::candidate::SquareCandidate;
use crate::params::ShapeParams;
use crate::types::{Contour, HierarchyLink};

/// Why a contour did not become a square candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum RejectReason {
    TooFewPoints { points: usize },
    HasSiblings,
    /// Outside the image-area band.
    AreaOutOfRange { area: f64, min: f64, max: f64 },
    NotQuadrilateral { vertices: usize },
    AspectRatio { ratio: f64 },
    /// Area inconsistent with the bounding box (L-shapes, spirals).
    IrregularArea { area: f64, min: f64, max: f64 },
}

/// Applies [`ShapeParams`] to contours of one image size at a time.
#[derive(Clone, Debug)]
pub struct ShapeValidator {
    params: ShapeParams,
}

impl ShapeValidator {
    pub fn new(params: ShapeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ShapeParams {
        &self.params
    }

    /// Measure `contour` and run every gate in order; the first failing gate
    /// decides the rejection reason.
    pub fn validate(
        &self,
        index: usize,
        contour: &Contour,
        link: HierarchyLink,
        image_width: u32,
        image_height: u32,
    ) -> Result<SquareCandidate, RejectReason> {
        let p = &self.params;
        if contour.len() < 3 {
            return Err(RejectReason::TooFewPoints {
                points: contour.len(),
            });
        }
        if p.reject_siblings && link.has_siblings() {
            return Err(RejectReason::HasSiblings);
        }

        let candidate = SquareCandidate::measure(index, contour.clone(), link, p.epsilon_ratio);

        let image_area = image_width as f64 * image_height as f64;
        let (min, max) = (p.min_area_ratio * image_area, p.max_area_ratio * image_area);
        if !strictly_between(candidate.area, min, max) {
            return Err(RejectReason::AreaOutOfRange {
                area: candidate.area,
                min,
                max,
            });
        }

        if p.require_quadrilateral && candidate.vertex_count() != 4 {
            return Err(RejectReason::NotQuadrilateral {
                vertices: candidate.vertex_count(),
            });
        }

        if !strictly_between(candidate.aspect_ratio, p.min_xy_ratio, p.max_xy_ratio) {
            return Err(RejectReason::AspectRatio {
                ratio: candidate.aspect_ratio,
            });
        }

        let w = candidate.bounding_box.w as f64;
        let h = candidate.bounding_box.h as f64;
        let min = w * p.min_xy_ratio * h * p.min_xy_ratio;
        let max = w * p.max_xy_ratio * h * p.max_xy_ratio;
        if !strictly_between(candidate.area, min, max) {
            return Err(RejectReason::IrregularArea {
                area: candidate.area,
                min,
                max,
            });
        }

        Ok(candidate)
    }

    /// Validate a whole frame, keeping detection order.
    pub fn collect_candidates(
        &self,
        contours: &[Contour],
        hierarchy: &[HierarchyLink],
        image_width: u32,
        image_height: u32,
    ) -> Vec<SquareCandidate> {
        contours
            .iter()
            .zip(hierarchy)
            .enumerate()
            .filter_map(|(idx, (contour, &link))| {
                match self.validate(idx, contour, link, image_width, image_height) {
                    Ok(candidate) => Some(candidate),
                    Err(reason) => {
                        trace!("contour {idx} rejected: {reason:?}");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Predicate form of [`ShapeValidator::validate`].
pub fn is_square_candidate(
    contour: &Contour,
    link: HierarchyLink,
    image_width: u32,
    image_height: u32,
    params: &ShapeParams,
) -> bool {
    ShapeValidator::new(params.clone())
        .validate(0, contour, link, image_width, image_height)
        .is_ok()
}

#[inline]
fn strictly_between(v: f64, lo: f64, hi: f64) -> bool {
    lo < v && v < hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::traced_square;
    use crate::types::Point2D;

    const W: u32 = 400;
    const H: u32 = 400;

    fn square(side: i32) -> Contour {
        Contour::new(traced_square(50, 50, side))
    }

    fn only_child() -> HierarchyLink {
        HierarchyLink {
            parent: Some(0),
            ..HierarchyLink::default()
        }
    }

    #[test]
    fn accepts_a_plain_square() {
        let v = ShapeValidator::new(ShapeParams::default());
        let c = v.validate(2, &square(101), only_child(), W, H).expect("square");
        assert_eq!(c.index, 2);
        assert!(is_square_candidate(
            &square(101),
            only_child(),
            W,
            H,
            &ShapeParams::default()
        ));
    }

    #[test]
    fn accepts_a_square_traced_from_mid_edge() {
        let v = ShapeValidator::new(ShapeParams::default());
        let base = traced_square(50, 50, 101);
        for offset in [1, 25, 50, 99, 150, 275, 399] {
            let mut pts = base.clone();
            pts.rotate_left(offset);
            let c = v
                .validate(0, &Contour::new(pts), only_child(), W, H)
                .unwrap_or_else(|r| panic!("offset {offset}: {r:?}"));
            assert_eq!(c.vertex_count(), 4);
        }
    }

    #[test]
    fn sibling_gate_is_a_toggle() {
        let link = HierarchyLink {
            next: Some(5),
            ..only_child()
        };
        let strict = ShapeValidator::new(ShapeParams::default());
        assert_eq!(
            strict.validate(0, &square(101), link, W, H),
            Err(RejectReason::HasSiblings)
        );

        let lax = ShapeValidator::new(ShapeParams {
            reject_siblings: false,
            ..ShapeParams::default()
        });
        assert!(lax.validate(0, &square(101), link, W, H).is_ok());
    }

    #[test]
    fn rejects_tiny_and_huge_areas() {
        let v = ShapeValidator::new(ShapeParams::default());
        // 0.5% of 400x400 is 800 px²; a 20 px square encloses 361.
        assert!(matches!(
            v.validate(0, &square(20), only_child(), W, H),
            Err(RejectReason::AreaOutOfRange { .. })
        ));
        let huge = Contour::new(traced_square(0, 0, 400));
        assert!(matches!(
            v.validate(0, &huge, only_child(), W, H),
            Err(RejectReason::AreaOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_elongated_rectangles() {
        let rect = Contour::new(vec![
            Point2D::new(0, 0),
            Point2D::new(150, 0),
            Point2D::new(150, 80),
            Point2D::new(0, 80),
        ]);
        let v = ShapeValidator::new(ShapeParams::default());
        assert!(matches!(
            v.validate(0, &rect, only_child(), W, H),
            Err(RejectReason::AspectRatio { .. })
        ));
    }

    #[test]
    fn quadrilateral_requirement_is_a_toggle() {
        // regular-ish octagon: survives simplification with 8 vertices
        let octagon = Contour::new(vec![
            Point2D::new(40, 0),
            Point2D::new(80, 0),
            Point2D::new(120, 40),
            Point2D::new(120, 80),
            Point2D::new(80, 120),
            Point2D::new(40, 120),
            Point2D::new(0, 80),
            Point2D::new(0, 40),
        ]);
        let strict = ShapeValidator::new(ShapeParams {
            epsilon_ratio: 0.01,
            ..ShapeParams::default()
        });
        assert_eq!(
            strict.validate(0, &octagon, only_child(), W, H),
            Err(RejectReason::NotQuadrilateral { vertices: 8 })
        );

        let lax = ShapeValidator::new(ShapeParams {
            epsilon_ratio: 0.01,
            require_quadrilateral: false,
            ..ShapeParams::default()
        });
        assert!(lax.validate(0, &octagon, only_child(), W, H).is_ok());
    }

    #[test]
    fn rejects_l_shapes_by_area_against_bounding_box() {
        // thin L: bounding box 121x121, enclosed area far below 0.5625 of it
        let l_shape = Contour::new(vec![
            Point2D::new(0, 0),
            Point2D::new(20, 0),
            Point2D::new(20, 100),
            Point2D::new(120, 100),
            Point2D::new(120, 120),
            Point2D::new(0, 120),
        ]);
        let v = ShapeValidator::new(ShapeParams {
            require_quadrilateral: false,
            epsilon_ratio: 0.01,
            ..ShapeParams::default()
        });
        assert!(matches!(
            v.validate(0, &l_shape, only_child(), W, H),
            Err(RejectReason::IrregularArea { .. })
        ));
    }

    #[test]
    fn collect_keeps_detection_order() {
        let contours = vec![square(101), square(20), square(61)];
        let links = vec![only_child(); 3];
        let v = ShapeValidator::new(ShapeParams::default());
        let kept: Vec<usize> = v
            .collect_candidates(&contours, &links, W, H)
            .iter()
            .map(|c| c.index)
            .collect();
        assert_eq!(kept, vec![0, 2]);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let v = ShapeValidator::new(ShapeParams::default());
        let two = Contour::new(vec![Point2D::new(0, 0), Point2D::new(1, 1)]);
        assert_eq!(
            v.validate(0, &two, only_child(), W, H),
            Err(RejectReason::TooFewPoints { points: 2 })
        );
    }
}
