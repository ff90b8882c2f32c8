use skiff_geometry::*;
use std::f64::consts::PI;

#[test]
fn world_planes_intersect_in_the_y_axis() {
    let line = intersect::plane_plane(&Plane::xy(), &Plane::yz()).unwrap();
    assert!(line.start().to_vec().magnitude() < 1.0e-9);
    let dir = line.direction().normalize();
    assert!(dir.cross(Vector3::unit_y()).magnitude() < 1.0e-9);
}

#[test]
fn oblique_plane_pair() {
    let a = Plane::try_new(
        Point3::new(0.0, 0.0, 1.0),
        Vector3::new(1.0, 0.0, 0.5),
        Vector3::unit_y(),
    )
    .unwrap();
    let b = Plane::xy();
    let line = intersect::plane_plane(&a, &b).unwrap();
    for i in -3..=3 {
        let pt = line.point_at(i as f64);
        assert!(a.signed_distance(pt).abs() < 1.0e-9);
        assert!(b.signed_distance(pt).abs() < 1.0e-9);
    }
}

#[test]
fn skew_lines_closest_pair() {
    let l0 = Line::try_new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)).unwrap();
    let l1 = Line::try_new(Point3::new(1.0, -1.0, 3.0), Point3::new(1.0, 1.0, 3.0)).unwrap();
    let closest = intersect::line_line(&l0, &l1).unwrap();
    assert_near!(closest.point_a, Point3::new(1.0, 0.0, 0.0));
    assert_near!(closest.point_b, Point3::new(1.0, 0.0, 3.0));
    f64::assert_near(&closest.param_a, &0.5);
    f64::assert_near(&closest.param_b, &0.5);
}

#[test]
fn circle_against_line_and_plane() {
    let plane = Plane::try_new(
        Point3::new(0.0, 0.0, 2.0),
        Vector3::unit_x(),
        Vector3::unit_y(),
    )
    .unwrap();
    let circle = Circle::try_new(plane, 3.0).unwrap();

    let secant = Line::try_new(Point3::new(-5.0, 1.0, 2.0), Point3::new(5.0, 1.0, 2.0)).unwrap();
    let hits = intersect::line_circle(&secant, &circle);
    assert_eq!(hits.len(), 2);
    for hit in &hits {
        assert!((hit.point_a.distance(circle.center()) - 3.0).abs() < 1.0e-9);
        assert_near!(hit.point_a, circle.point_at(hit.param_b));
    }

    let crossing = intersect::plane_circle(&Plane::yz(), &circle);
    assert_eq!(crossing.len(), 2);
    for pt in crossing {
        assert!(pt.x.abs() < 1.0e-9);
        assert!((pt.distance(circle.center()) - 3.0).abs() < 1.0e-9);
    }
}

#[test]
fn nurbs_circle_against_plane() {
    let circle = Circle::try_new(Plane::xy(), 2.0).unwrap();
    let curve = circle.to_nurbs();
    let tilted = Plane::try_new(
        Point3::new(0.0, 1.0, 0.0),
        Vector3::unit_x(),
        Vector3::unit_z(),
    )
    .unwrap();
    let hits = intersect::curve_plane(&curve, &tilted, TOLERANCE);
    assert_eq!(hits.len(), 2);
    for hit in hits {
        assert!((hit.point.y - 1.0).abs() < 1.0e-6);
        assert!((hit.point.distance(circle.center()) - 2.0).abs() < 1.0e-6);
        assert_near!(curve.point_at(hit.parameter), hit.point);
    }
}

#[test]
fn transversal_curve_pair() {
    let parabola = NurbsCurve::from_points(
        &[
            Point3::new(-2.0, -2.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
            Point3::new(2.0, -2.0, 0.0),
        ],
        2,
    )
    .unwrap();
    let wave = NurbsCurve::from_points(
        &[
            Point3::new(-2.0, 0.0, 0.0),
            Point3::new(-1.0, 0.2, 0.0),
            Point3::new(1.0, -0.2, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ],
        3,
    )
    .unwrap();
    let hits = intersect::curve_curve(&parabola, &wave, TOLERANCE);
    assert_eq!(hits.len(), 2);
    for hit in hits {
        assert!(hit.point_a.distance(hit.point_b) < TOLERANCE);
        assert_near!(parabola.point_at(hit.param_a), hit.point_a);
        assert_near!(wave.point_at(hit.param_b), hit.point_b);
    }
}

#[test]
fn curve_line_against_an_interpolated_curve() {
    let curve = fitting::interpolate(
        &[
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, -1.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
        ],
        3,
    )
    .unwrap();
    let line = Line::try_new(Point3::new(-1.0, 0.0, 0.0), Point3::new(4.0, 0.0, 0.0)).unwrap();
    let hits = intersect::curve_line(&curve, &line, TOLERANCE);
    assert_eq!(hits.len(), 3);
    for hit in hits {
        assert!(hit.point_a.y.abs() < 1.0e-6);
    }
}

#[test]
fn self_intersection_of_a_loop() {
    let curve = NurbsCurve::from_points(
        &[
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(-2.0, 2.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ],
        3,
    )
    .unwrap();
    let hits = intersect::curve_self(&curve, TOLERANCE);
    assert_eq!(hits.len(), 1);
    let hit = hits[0];
    assert!(hit.point_a.distance(hit.point_b) < TOLERANCE);
    assert!(hit.point_a.x.abs() < 1.0e-6);
    assert!((hit.param_b - hit.param_a).abs() > 0.1);

    // a convex curve has no self-intersection
    let convex = NurbsCurve::from_points(
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ],
        3,
    )
    .unwrap();
    assert!(intersect::curve_self(&convex, TOLERANCE).is_empty());
}

#[test]
fn full_turn_arc_against_line() {
    let arc = Arc::try_new(Plane::xy(), 1.0, 2.0 * PI).unwrap();
    let curve = arc.to_nurbs();
    // a vertical line, so that the hits stay away from the seam point
    let line = Line::try_new(Point3::new(0.0, -3.0, 0.0), Point3::new(0.0, 3.0, 0.0)).unwrap();
    let hits = intersect::curve_line(&curve, &line, TOLERANCE);
    assert_eq!(hits.len(), 2);
    for hit in hits {
        assert!(hit.point_a.x.abs() < 1.0e-6);
        assert!((hit.point_a.y.abs() - 1.0).abs() < 1.0e-6);
    }
}
