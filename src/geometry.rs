//! Circle fitting and tolerance tests over 2D gesture samples.
//!
//! Everything here is a pure function of its inputs, so recognizers for different devices can
//! share it freely. Functions that cannot produce a circle return `None` or `false` rather than
//! failing: for a gesture in progress that simply means "not a circle yet".
//!
//! Distances are compared squared wherever possible.

use circle_gesture_config::FitMethod;
use glam::DVec2;
use serde::Serialize;

/// Fewest samples that can describe a circle.
pub const MIN_POINTS: usize = 3;

/// Magnitude of the circumcircle determinant below which three points count as collinear.
const COLLINEAR_EPSILON: f64 = 1e-9;

/// Slack, in squared-distance units, for a sample to count as lying on the radial circle.
const ON_CIRCLE_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    /// Reachable envelope of a normalized two-axis stick.
    pub const UNIT: Self = Self {
        center: DVec2::ZERO,
        radius: 1.,
    };

    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// How wide the tolerance band around a fitted circle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandWidth {
    /// `radius * (100 - accuracy) / 100` on each side of the circle.
    Standard,
    /// Band of `radius * 2 * (100 - accuracy) / 100`, split evenly between the two sides.
    ///
    /// Older formulation kept so existing configurations keep their meaning. It yields the same
    /// per-side offset as [`BandWidth::Standard`]; prefer that one.
    Legacy,
}

impl BandWidth {
    /// Band width for the given fit method, or `None` when the method is not band-tested.
    pub fn for_method(method: FitMethod) -> Option<Self> {
        match method {
            FitMethod::Diameter | FitMethod::ThreePoint => Some(Self::Standard),
            FitMethod::LegacyDiameter => Some(Self::Legacy),
            FitMethod::RadialDevice => None,
        }
    }

    /// Distance from the fitted circle to either edge of the band.
    pub fn offset(self, radius: f64, accuracy_percent: f64) -> f64 {
        match self {
            BandWidth::Standard => radius * (100. - accuracy_percent) / 100.,
            BandWidth::Legacy => {
                let band = radius * 2. * (100. - accuracy_percent) / 100.;
                band / 2.
            }
        }
    }
}

/// Annulus between two concentric circles.
///
/// Membership is closed: samples exactly on either edge are inside the band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceBand {
    pub center: DVec2,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl ToleranceBand {
    pub fn new(circle: Circle, offset: f64) -> Self {
        let offset = offset.max(0.);
        Self {
            center: circle.center,
            inner_radius: (circle.radius - offset).max(0.),
            outer_radius: circle.radius + offset,
        }
    }

    pub fn contains(&self, point: DVec2) -> bool {
        let dist_sq = point.distance_squared(self.center);
        dist_sq <= self.outer_radius * self.outer_radius
            && dist_sq >= self.inner_radius * self.inner_radius
    }
}

/// Finds the two points furthest apart.
///
/// Scans every unordered pair, `i` ascending then `j` ascending, and keeps the first pair with
/// the largest distance. Returns `None` for fewer than two points.
pub fn find_furthest_pair(points: &[DVec2]) -> Option<(DVec2, DVec2)> {
    let mut best: Option<(DVec2, DVec2, f64)> = None;

    for (i, &p) in points.iter().enumerate() {
        for &q in &points[i + 1..] {
            let dist_sq = p.distance_squared(q);
            if best.map_or(true, |(_, _, longest)| dist_sq > longest) {
                best = Some((p, q, dist_sq));
            }
        }
    }

    best.map(|(p, q, _)| (p, q))
}

/// Fits a circle whose diameter is the furthest pair of points.
///
/// When all points coincide this is a zero-radius circle at that point.
pub fn fit_circle_by_diameter(points: &[DVec2]) -> Option<Circle> {
    let (p, q) = find_furthest_pair(points)?;
    Some(Circle::new((p + q) / 2., p.distance(q) / 2.))
}

/// Fits the circle through the points at indices `0`, `n / 3` and `2 * (n / 3)`.
///
/// Returns `None` for fewer than three points or when the chosen points are collinear.
pub fn fit_circle_by_three_points(points: &[DVec2]) -> Option<Circle> {
    if points.len() < MIN_POINTS {
        return None;
    }

    let third = points.len() / 3;
    circumcircle(points[0], points[third], points[2 * third])
}

/// Circle passing through all three points, or `None` if they are (nearly) collinear.
pub fn circumcircle(a: DVec2, b: DVec2, c: DVec2) -> Option<Circle> {
    // Solve relative to `a` to keep precision far from the origin.
    let ab = b - a;
    let ac = c - a;

    let d = 2. * ab.perp_dot(ac);
    if d.abs() <= COLLINEAR_EPSILON {
        return None;
    }

    let ab_sq = ab.length_squared();
    let ac_sq = ac.length_squared();
    let offset = DVec2::new(
        (ac.y * ab_sq - ab.y * ac_sq) / d,
        (ab.x * ac_sq - ac.x * ab_sq) / d,
    );
    if !offset.is_finite() {
        return None;
    }

    Some(Circle::new(a + offset, offset.length()))
}

/// The circle a radial device's samples are measured against.
///
/// This is not fitted over samples: a normalized stick pushed all the way traces the unit
/// circle.
pub fn fit_circle_for_radial_device() -> Circle {
    Circle::UNIT
}

/// Fits a candidate circle with the given method.
pub fn fit_circle(method: FitMethod, points: &[DVec2]) -> Option<Circle> {
    match method {
        FitMethod::Diameter | FitMethod::LegacyDiameter => fit_circle_by_diameter(points),
        FitMethod::ThreePoint => fit_circle_by_three_points(points),
        FitMethod::RadialDevice => Some(fit_circle_for_radial_device()),
    }
}

/// Tolerance offset of a fitted circle for the given method.
///
/// Radial devices use the standard offset as their centroid cap.
pub fn tolerance_offset(method: FitMethod, radius: f64, accuracy_percent: f64) -> f64 {
    BandWidth::for_method(method)
        .unwrap_or(BandWidth::Standard)
        .offset(radius, accuracy_percent)
}

/// Checks that every point lies within the tolerance band around `circle`.
///
/// Stops at the first point outside the band. Returns `false` for fewer than
/// [`MIN_POINTS`] points.
pub fn is_within_tolerance_band(
    points: &[DVec2],
    circle: Circle,
    accuracy_percent: f64,
    band_width: BandWidth,
) -> bool {
    if points.len() < MIN_POINTS {
        return false;
    }

    let band = ToleranceBand::new(circle, band_width.offset(circle.radius, accuracy_percent));
    points.iter().all(|&p| band.contains(p))
}

/// Checks that the points sweep around `circle` rather than graze one arc of it.
///
/// At least `accuracy_percent` of the points must lie on the circle, and the centroid of
/// those on-circle points must be within the tolerance offset of the circle's center.
pub fn is_evenly_distributed_on_radial_circle(
    points: &[DVec2],
    circle: Circle,
    accuracy_percent: f64,
) -> bool {
    if points.is_empty() {
        return false;
    }

    let radius_sq = circle.radius * circle.radius;
    let mut on_circle = 0;
    let mut sum = DVec2::ZERO;
    for &p in points {
        if (p.distance_squared(circle.center) - radius_sq).abs() < ON_CIRCLE_EPSILON {
            on_circle += 1;
            sum += p;
        }
    }

    if on_circle == 0 {
        return false;
    }

    let on_circle_percent = on_circle as f64 * 100. / points.len() as f64;
    if on_circle_percent < accuracy_percent {
        return false;
    }

    let centroid = sum / on_circle as f64;
    let cap = BandWidth::Standard.offset(circle.radius, accuracy_percent);
    centroid.distance_squared(circle.center) <= cap * cap
}

/// Collects every point outside the tolerance band around `circle`.
///
/// Diagnostic counterpart of [`is_within_tolerance_band`]; it never short-circuits.
pub fn incorrect_points(
    points: &[DVec2],
    circle: Circle,
    accuracy_percent: f64,
    band_width: BandWidth,
) -> Vec<DVec2> {
    let band = ToleranceBand::new(circle, band_width.offset(circle.radius, accuracy_percent));
    points.iter().copied().filter(|&p| !band.contains(p)).collect()
}

/// Whether the path returned within `offset` of where it started.
pub fn is_closed(points: &[DVec2], offset: f64) -> bool {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return false;
    };

    first.distance_squared(*last) <= offset * offset
}

/// Decides whether the points form a circle under the given fit method.
///
/// A cheap closure test runs first: a path that never came back near its start is rejected
/// before the per-point test.
pub fn is_circle(points: &[DVec2], method: FitMethod, accuracy_percent: f64) -> bool {
    if points.len() < MIN_POINTS {
        return false;
    }

    let Some(circle) = fit_circle(method, points) else {
        return false;
    };

    // All points coinciding is a held pointer, not a circle.
    if circle.radius.is_nan() || circle.radius <= 0. {
        return false;
    }

    let offset = tolerance_offset(method, circle.radius, accuracy_percent);
    if !is_closed(points, offset) {
        return false;
    }

    match BandWidth::for_method(method) {
        Some(band_width) => is_within_tolerance_band(points, circle, accuracy_percent, band_width),
        None => is_evenly_distributed_on_radial_circle(points, circle, accuracy_percent),
    }
}
