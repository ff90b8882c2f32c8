use skiff_geometry::*;
use std::f64::consts::PI;

#[test]
fn closest_point_on_a_line() {
    let line = Line::try_new(Point3::new(0.0, 0.0, 0.0), Point3::new(30.0, 45.0, 0.0)).unwrap();
    let query = Point3::new(10.0, 20.0, 0.0);

    let expected = Point3::new(12.307692307692308, 18.461538461538463, 0.0);
    let closest = line.closest_point(query);
    assert!(closest.distance(expected) < 1.0e-9);
    assert!((closest.distance(query) - 2.7735009811261456).abs() < 1.0e-9);

    // the NURBS reduction must agree
    let curve = line.to_nurbs();
    let closest = curve.closest_point(query).unwrap();
    assert!(closest.distance(expected) < 1.0e-9);
}

#[test]
fn closest_point_on_a_rational_circle() {
    let circle = Circle::try_new(Plane::xy(), 4.0).unwrap();
    let curve = circle.to_nurbs();
    for i in 0..12 {
        let theta = 2.0 * PI * i as f64 / 12.0;
        let query = Point3::new(7.0 * theta.cos(), 7.0 * theta.sin(), 2.0);
        let closest = curve.closest_point(query).unwrap();
        let expected = Point3::new(4.0 * theta.cos(), 4.0 * theta.sin(), 0.0);
        assert!(closest.distance(expected) < 1.0e-6, "theta = {theta}");
    }
}

#[test]
fn length_and_its_inverse_are_mutually_consistent() {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 3.0, 0.0),
        Point3::new(3.0, -1.0, 1.0),
        Point3::new(5.0, 2.0, 0.0),
        Point3::new(7.0, 0.0, 2.0),
    ];
    let curve = NurbsCurve::from_points(&points, 3).unwrap();
    let total = curve.length();
    for i in 0..=20 {
        let s = total * i as f64 / 20.0;
        let t = curve.parameter_at_length(s).unwrap();
        assert!((curve.length_at(t) - s).abs() < 1.0e-9, "s = {s}");
    }
}

#[test]
fn length_of_the_arc_reduction_matches_the_closed_form() {
    let arc = Arc::try_new(Plane::zx(), 5.0, 1.25).unwrap();
    let curve = arc.to_nurbs();
    assert!((curve.length() - 5.0 * 1.25).abs() < 1.0e-9);
    let half = curve.parameter_at_length(5.0 * 1.25 / 2.0).unwrap();
    // the halfway point in arc length bisects the sweep
    assert_near!(curve.point_at(half), arc.point_at(1.25 / 2.0));
}

#[test]
fn surface_closest_parameter_recovers_the_foot_point() {
    let sections = [
        NurbsCurve::from_points(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.5, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            2,
        )
        .unwrap(),
        NurbsCurve::from_points(
            &[
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.5, 1.0),
                Point3::new(2.0, 0.0, 1.0),
            ],
            2,
        )
        .unwrap(),
    ];
    let surface = NurbsSurface::ruled(&sections[0], &sections[1]);
    let (u, v) = surface.closest_parameter(surface.point_at(0.3, 0.7)).unwrap();
    assert_near!(surface.point_at(u, v), surface.point_at(0.3, 0.7));
}
