use serde::{Deserialize, Serialize};

/// Integer pixel coordinate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point2D {
    pub x: i32,
    pub y: i32,
}

impl Point2D {
    /// Sentinel used for the centroid of a zero-area shape.
    pub const UNDEFINED: Point2D = Point2D { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_defined(self) -> bool {
        self != Self::UNDEFINED
    }
}

impl From<(i32, i32)> for Point2D {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned integer rectangle. `w` and `h` count pixels inclusively.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Width over height, `0.0` for an empty rectangle.
    pub fn aspect_ratio(&self) -> f64 {
        if self.h == 0 {
            return 0.0;
        }
        self.w as f64 / self.h as f64
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const RED: RgbColor = RgbColor::new(255, 0, 0);
    pub const GREEN: RgbColor = RgbColor::new(0, 255, 0);
    pub const BLUE: RgbColor = RgbColor::new(0, 0, 255);
    pub const YELLOW: RgbColor = RgbColor::new(255, 255, 0);
    pub const ORANGE: RgbColor = RgbColor::new(255, 165, 0);
    pub const PURPLE: RgbColor = RgbColor::new(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Closed outline of a connected foreground region, in tracing order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point2D>,
}

impl Contour {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<Point2D> for Contour {
    fn from_iter<I: IntoIterator<Item = Point2D>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Nesting relation of one contour to the others of the same frame.
///
/// Indices refer to positions in the contour list the link was built for.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HierarchyLink {
    pub next: Option<usize>,
    pub previous: Option<usize>,
    pub first_child: Option<usize>,
    pub parent: Option<usize>,
}

impl HierarchyLink {
    /// Convert an OpenCV hierarchy row `[next, previous, first_child, parent]`
    /// where `-1` marks an absent relation.
    pub fn from_opencv(row: [i32; 4]) -> Self {
        let idx = |v: i32| usize::try_from(v).ok();
        Self {
            next: idx(row[0]),
            previous: idx(row[1]),
            first_child: idx(row[2]),
            parent: idx(row[3]),
        }
    }

    /// Inverse of [`HierarchyLink::from_opencv`].
    pub fn to_opencv(self) -> [i32; 4] {
        let raw = |v: Option<usize>| v.map_or(-1, |i| i as i32);
        [
            raw(self.next),
            raw(self.previous),
            raw(self.first_child),
            raw(self.parent),
        ]
    }

    /// Build full links from a parent-only relation.
    ///
    /// Children keep their detection order; contours without a parent are
    /// siblings of each other, as in a tree-mode contour retrieval.
    pub fn from_parents(parents: &[Option<usize>]) -> Vec<HierarchyLink> {
        let mut links = vec![HierarchyLink::default(); parents.len()];
        // last seen child per parent slot; slot `parents.len()` is the root level
        let mut last_child: Vec<Option<usize>> = vec![None; parents.len() + 1];

        for (idx, &parent) in parents.iter().enumerate() {
            let parent = parent.filter(|&p| p < parents.len() && p != idx);
            links[idx].parent = parent;
            let slot = parent.unwrap_or(parents.len());

            match last_child[slot] {
                Some(prev) => {
                    links[prev].next = Some(idx);
                    links[idx].previous = Some(prev);
                }
                None => {
                    if let Some(p) = parent {
                        links[p].first_child = Some(idx);
                    }
                }
            }
            last_child[slot] = Some(idx);
        }

        links
    }

    #[inline]
    pub fn has_siblings(&self) -> bool {
        self.next.is_some() || self.previous.is_some()
    }

    #[inline]
    pub fn has_child(&self) -> bool {
        self.first_child.is_some()
    }

    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}
