//! Pixel-space → normalized-space transforms for sprite quads.
//!
//! Two normalized spaces are produced:
//! - texture space: `[0, 1]`, origin top-left, +Y down (sampler coordinates)
//! - clip space: `[-1, 1]`, origin center, +Y up (vertex positions)
//!
//! Destination quads are rotated/scaled in pixel space first and normalized
//! afterwards; source quads are normalized directly and never rotated.

use super::{Rect, Size, Vec2};

/// Four corners of a rectangle, triangulated as `(0, 1, 2)` and `(2, 3, 0)`.
pub type Quad = [Vec2; 4];

/// Index order used to draw a [`Quad`] as two triangles.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Normalizes a pixel rect living inside `container` into four corner points.
///
/// - `cartesian == false`: texture space. Corners are emitted bottom-left,
///   bottom-right, top-right, top-left (reversed) to pair with rotated
///   destination quads.
/// - `cartesian == true`: clip space. Corners are emitted top-left, top-right,
///   bottom-right, bottom-left.
pub fn normalize_rect(rect: Rect, container: Size, cartesian: bool) -> Quad {
    let (cw, ch) = container.to_f32();

    let (nx, ny, nw, nh) = if cartesian {
        (
            2.0 * (rect.x() / cw) - 1.0,
            1.0 - 2.0 * (rect.y() / ch),
            2.0 * (rect.width() / cw),
            -2.0 * (rect.height() / ch),
        )
    } else {
        (
            rect.x() / cw,
            rect.y() / ch,
            rect.width() / cw,
            rect.height() / ch,
        )
    };

    let top_left = Vec2::new(nx, ny);
    let top_right = Vec2::new(nx + nw, ny);
    let bottom_right = Vec2::new(nx + nw, ny + nh);
    let bottom_left = Vec2::new(nx, ny + nh);

    if cartesian {
        [top_left, top_right, bottom_right, bottom_left]
    } else {
        [bottom_left, bottom_right, top_right, top_left]
    }
}

/// Normalizes a single pixel-space point inside `container`.
///
/// Same formulas as [`normalize_rect`]: `[0, 1]` texture space, or `[-1, 1]`
/// clip space with the Y axis flipped when `cartesian` is set.
#[inline]
pub fn normalize_point(point: Vec2, container: Size, cartesian: bool) -> Vec2 {
    let (cw, ch) = container.to_f32();
    if cartesian {
        Vec2::new(2.0 * (point.x / cw) - 1.0, 1.0 - 2.0 * (point.y / ch))
    } else {
        Vec2::new(point.x / cw, point.y / ch)
    }
}

/// Inverse of [`normalize_point`]: maps a normalized point back to pixels.
#[inline]
pub fn denormalize_point(point: Vec2, container: Size, cartesian: bool) -> Vec2 {
    let (cw, ch) = container.to_f32();
    if cartesian {
        Vec2::new((point.x + 1.0) * 0.5 * cw, (1.0 - point.y) * 0.5 * ch)
    } else {
        Vec2::new(point.x * cw, point.y * ch)
    }
}

/// Rotates `rect` by `angle` degrees around its center and scales it by `scale`.
///
/// Returns absolute pixel-space corners. After rotation slots `0↔3` and `1↔2`
/// are swapped, so the result is ordered bottom-left, bottom-right, top-right,
/// top-left (relative to the unrotated rect). That ordering pairs index-wise
/// with the texture-space quad from [`normalize_rect`] and keeps both
/// triangles of [`QUAD_INDICES`] on the same winding for any angle.
pub fn rotate_scale_rect(rect: Rect, scale: f32, angle: f32) -> Quad {
    let pivot = rect.center();
    let local = rect.centered_on(Vec2::zero());

    let mut points = local
        .corners()
        .map(|corner| corner.rotated(angle) * scale + pivot);

    points.swap(0, 3);
    points.swap(1, 2);
    points
}

/// Signed area of triangle `(a, b, c)`; positive when counter-clockwise in a
/// y-up space.
#[inline]
pub fn triangle_signed_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross(c - a) * 0.5
}

/// Signed areas of the two triangles [`QUAD_INDICES`] cuts `quad` into.
pub fn quad_triangle_areas(quad: &Quad) -> [f32; 2] {
    let [i0, i1, i2, j0, j1, j2] = QUAD_INDICES.map(|i| i as usize);
    [
        triangle_signed_area(quad[i0], quad[i1], quad[i2]),
        triangle_signed_area(quad[j0], quad[j1], quad[j2]),
    ]
}

/// Shoelace area of the quad polygon (signed).
pub fn signed_area(quad: &Quad) -> f32 {
    let mut acc = 0.0;
    for i in 0..4 {
        acc += quad[i].cross(quad[(i + 1) % 4]);
    }
    acc * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn assert_quad_eq(got: Quad, want: Quad) {
        for (g, w) in got.iter().zip(want.iter()) {
            assert!(g.approx_eq(*w, EPS), "got {got:?}, want {want:?}");
        }
    }

    // ── normalize_rect ────────────────────────────────────────────────────

    #[test]
    fn texture_space_corners_are_reversed() {
        let q = normalize_rect(Rect::new(0.0, 0.0, 400.0, 200.0), Size::new(800, 400), false);
        assert_quad_eq(
            q,
            [
                Vec2::new(0.0, 0.5),
                Vec2::new(0.5, 0.5),
                Vec2::new(0.5, 0.0),
                Vec2::new(0.0, 0.0),
            ],
        );
    }

    #[test]
    fn clip_space_full_rect_spans_unit_square() {
        let q = normalize_rect(Rect::new(0.0, 0.0, 800.0, 400.0), Size::new(800, 400), true);
        assert_quad_eq(
            q,
            [
                Vec2::new(-1.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(-1.0, -1.0),
            ],
        );
    }

    #[test]
    fn clip_space_matches_point_normalization() {
        let rect = Rect::new(37.0, 12.0, 90.0, 51.0);
        let size = Size::new(640, 480);
        let q = normalize_rect(rect, size, true);
        for (corner, got) in rect.corners().iter().zip(q.iter()) {
            assert!(got.approx_eq(normalize_point(*corner, size, true), EPS));
        }
    }

    // ── normalize_point ───────────────────────────────────────────────────

    #[test]
    fn point_center_maps_to_clip_origin() {
        let p = normalize_point(Vec2::new(500.0, 400.0), Size::new(1000, 800), true);
        assert!(p.approx_eq(Vec2::zero(), EPS));
    }

    #[test]
    fn point_top_left_maps_to_clip_top_left() {
        let p = normalize_point(Vec2::zero(), Size::new(1000, 800), true);
        assert!(p.approx_eq(Vec2::new(-1.0, 1.0), EPS));
    }

    #[test]
    fn round_trip_recovers_point() {
        let sizes = [Size::new(1000, 800), Size::new(33, 7), Size::new(1, 4096)];
        for size in sizes {
            let (w, h) = size.to_f32();
            for fx in [0.1_f32, 0.25, 0.5, 0.77, 0.99] {
                for fy in [0.01_f32, 0.3, 0.5, 0.66, 0.9] {
                    let p = Vec2::new(w * fx, h * fy);
                    for cartesian in [true, false] {
                        let back = denormalize_point(normalize_point(p, size, cartesian), size, cartesian);
                        let tol = EPS * w.max(h);
                        assert!(back.approx_eq(p, tol), "{p:?} -> {back:?} ({size:?})");
                    }
                }
            }
        }
    }

    // ── rotate_scale_rect ─────────────────────────────────────────────────

    #[test]
    fn identity_transform_reproduces_corners() {
        for rect in [
            Rect::new(0.0, 0.0, 800.0, 400.0),
            Rect::new(-35.0, 120.5, 17.0, 3.0),
            Rect::new(1000.0, 2000.0, 64.0, 64.0),
        ] {
            let q = rotate_scale_rect(rect, 1.0, 0.0);
            assert_eq!(
                q,
                [rect.bottom_left(), rect.bottom_right(), rect.top_right(), rect.top_left()]
            );
        }
    }

    #[test]
    fn scale_grows_around_center() {
        let rect = Rect::new(10.0, 10.0, 20.0, 10.0);
        let q = rotate_scale_rect(rect, 2.0, 0.0);
        assert_quad_eq(
            q,
            [
                Vec2::new(0.0, 25.0),
                Vec2::new(40.0, 25.0),
                Vec2::new(40.0, 5.0),
                Vec2::new(0.0, 5.0),
            ],
        );
    }

    #[test]
    fn quarter_turn_swaps_extent() {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        let q = rotate_scale_rect(rect, 1.0, 90.0);
        let xs = q.map(|p| p.x);
        let ys = q.map(|p| p.y);
        let span = |v: [f32; 4]| {
            v.iter().cloned().fold(f32::MIN, f32::max) - v.iter().cloned().fold(f32::MAX, f32::min)
        };
        assert!((span(xs) - 20.0).abs() < EPS);
        assert!((span(ys) - 40.0).abs() < EPS);
    }

    #[test]
    fn winding_is_consistent_for_all_angles() {
        let rect = Rect::new(120.0, 80.0, 300.0, 150.0);
        let target = Size::new(1000, 800);
        for angle in [0.0_f32, 45.0, 90.0, 180.0, 271.0] {
            for scale in [0.5_f32, 1.0, 3.0] {
                let pixel = rotate_scale_rect(rect, scale, angle);
                let [a, b] = quad_triangle_areas(&pixel);
                // y-down pixel space: clockwise on screen, negative signed area.
                assert!(a < 0.0 && b < 0.0, "angle {angle}: {a} {b}");

                let expected = rect.width() * rect.height() * scale * scale;
                assert!(((a + b).abs() - expected).abs() < expected * 1e-4);
                assert!((signed_area(&pixel) - (a + b)).abs() < expected * 1e-4);

                let clip = pixel.map(|p| normalize_point(p, target, true));
                let [ca, cb] = quad_triangle_areas(&clip);
                assert!(ca > 0.0 && cb > 0.0, "angle {angle}: clip {ca} {cb}");
            }
        }
    }

    #[test]
    fn source_and_destination_quads_pair_up() {
        // Vertex i of the destination and vertex i of the source refer to the
        // same corner of the sprite when no rotation is applied.
        let rect = Rect::new(0.0, 0.0, 64.0, 32.0);
        let size = Size::new(64, 32);
        let dst = rotate_scale_rect(rect, 1.0, 0.0).map(|p| normalize_point(p, size, false));
        let src = normalize_rect(rect, size, false);
        assert_quad_eq(dst, src);
    }

    #[test]
    fn degenerate_rect_has_zero_area() {
        let q = rotate_scale_rect(Rect::new(0.0, 0.0, 0.0, 0.0), 1.0, 45.0);
        assert_eq!(signed_area(&q), 0.0);
        assert_eq!(quad_triangle_areas(&q), [0.0, 0.0]);
    }
}
