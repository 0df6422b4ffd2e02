// src/cv/geometry.rs

use super::{Point, PointF};

/// Convex hull by Andrew's monotone chain, counter-clockwise order.
/// Degenerate inputs (under three distinct points) come back as-is.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Point, a: Point, b: Point) -> i64 {
        (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
    }

    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Corners of the minimum-area rectangle enclosing a convex polygon,
/// found by sweeping each hull edge as a candidate orientation. Collapses
/// gracefully for degenerate hulls (point or segment).
pub fn min_area_rect(hull: &[Point]) -> [PointF; 4] {
    match hull.len() {
        0 => return [PointF::new(0.0, 0.0); 4],
        1 => {
            let p = PointF::new(hull[0].x as f32, hull[0].y as f32);
            return [p, p, p, p];
        }
        2 => {
            let a = PointF::new(hull[0].x as f32, hull[0].y as f32);
            let b = PointF::new(hull[1].x as f32, hull[1].y as f32);
            return [a, b, b, a];
        }
        _ => {}
    }

    let mut best_area = f64::MAX;
    let mut best: [PointF; 4] = [PointF::new(0.0, 0.0); 4];

    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let ex = (b.x - a.x) as f64;
        let ey = (b.y - a.y) as f64;
        let len = (ex * ex + ey * ey).sqrt();
        if len < 1e-9 {
            continue;
        }
        // Unit axes: u along the edge, v perpendicular.
        let (ux, uy) = (ex / len, ey / len);
        let (vx, vy) = (-uy, ux);

        let mut min_u = f64::MAX;
        let mut max_u = f64::MIN;
        let mut min_v = f64::MAX;
        let mut max_v = f64::MIN;
        for &p in hull {
            let u = p.x as f64 * ux + p.y as f64 * uy;
            let v = p.x as f64 * vx + p.y as f64 * vy;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if area < best_area {
            best_area = area;
            let corner = |u: f64, v: f64| {
                PointF::new((u * ux + v * vx) as f32, (u * uy + v * vy) as f32)
            };
            best = [
                corner(min_u, min_v),
                corner(max_u, min_v),
                corner(max_u, max_v),
                corner(min_u, max_v),
            ];
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hull_of_square_keeps_corners() {
        let points = vec![
            Point::new(0, 0),
            Point::new(4, 0),
            Point::new(4, 4),
            Point::new(0, 4),
            Point::new(2, 2),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point::new(2, 2)));
    }

    #[test]
    fn min_rect_of_axis_aligned_square() {
        let hull = convex_hull(&[
            Point::new(10, 10),
            Point::new(20, 10),
            Point::new(20, 30),
            Point::new(10, 30),
        ]);
        let rect = min_area_rect(&hull);
        let xs: Vec<f32> = rect.iter().map(|p| p.x).collect();
        let ys: Vec<f32> = rect.iter().map(|p| p.y).collect();
        assert!(xs.iter().all(|&x| (x - 10.0).abs() < 1e-3 || (x - 20.0).abs() < 1e-3));
        assert!(ys.iter().all(|&y| (y - 10.0).abs() < 1e-3 || (y - 30.0).abs() < 1e-3));
    }

    #[test]
    fn min_rect_of_rotated_segment_follows_orientation() {
        // 45-degree bar: the min-area rect should be far smaller than the
        // axis-aligned bounding box.
        let points: Vec<Point> = (0..20)
            .flat_map(|i| {
                vec![
                    Point::new(i, i),
                    Point::new(i + 1, i),
                    Point::new(i, i + 1),
                ]
            })
            .collect();
        let hull = convex_hull(&points);
        let rect = min_area_rect(&hull);
        let w = ((rect[1].x - rect[0].x).powi(2) + (rect[1].y - rect[0].y).powi(2)).sqrt();
        let h = ((rect[3].x - rect[0].x).powi(2) + (rect[3].y - rect[0].y).powi(2)).sqrt();
        assert!(w.min(h) < 3.0, "short side was {}", w.min(h));
        assert!(w.max(h) > 20.0, "long side was {}", w.max(h));
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        assert_eq!(min_area_rect(&[])[0], PointF::new(0.0, 0.0));
        let single = min_area_rect(&[Point::new(3, 4)]);
        assert_eq!(single[2], PointF::new(3.0, 4.0));
        let pair = min_area_rect(&[Point::new(0, 0), Point::new(5, 0)]);
        assert_eq!(pair[1], PointF::new(5.0, 0.0));
    }
}
