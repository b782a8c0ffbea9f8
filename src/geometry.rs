use ultraviolet::DVec2;

/// Direction used to split two circles whose centers coincide exactly.
pub const TIE_BREAK: DVec2 = DVec2 { x: 1.0, y: 0.0 };

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    (b - a).mag()
}

/// Unit vector pointing from `from` towards `to`.
/// Falls back to [`TIE_BREAK`] when the two points coincide.
pub fn direction(from: DVec2, to: DVec2) -> DVec2 {
    let d = to - from;
    let norm = d.mag();
    if norm == 0.0 {
        return TIE_BREAK;
    }
    d / norm
}

/// Returns true when two circles interpenetrate.
/// Circles that exactly touch are not overlapping.
#[inline]
pub fn overlaps(p1: DVec2, r1: f64, p2: DVec2, r2: f64) -> bool {
    distance(p1, p2) < r1 + r2
}

/// Pushes two overlapping circles apart along the line between their centers
/// until they just touch, splitting the correction equally between both.
/// Non-overlapping circles are returned unchanged.
pub fn separate(p1: DVec2, r1: f64, p2: DVec2, r2: f64) -> (DVec2, DVec2) {
    let d = distance(p1, p2);
    let min_distance = r1 + r2;

    if d >= min_distance {
        return (p1, p2);
    }

    let unit = direction(p1, p2);
    // Negative while overlapping, so p1 moves away from p2 and vice versa.
    let half = unit * ((d - min_distance) * 0.5);

    (p1 + half, p2 - half)
}

/// Point-in-circle test used for picking bodies under the cursor.
/// Points on the rim count as inside.
#[inline]
pub fn contains_point(center: DVec2, radius: f64, point: DVec2) -> bool {
    distance(center, point) <= radius
}
