use skiff_geometry::*;
use std::f64::consts::PI;

#[test]
fn circle_circumference_by_quadrature() {
    let circle = Circle::try_new(Plane::xy(), 23.0).unwrap();
    let curve = circle.to_nurbs();
    assert!((curve.length() - 2.0 * PI * 23.0).abs() < 1.0e-6);
    f64::assert_near(&circle.circumference(), &(2.0 * PI * 23.0));
}

#[test]
fn circle_stays_on_its_plane() {
    let plane = Plane::try_new(
        Point3::new(3.0, -1.0, 2.0),
        Vector3::new(1.0, 2.0, 0.5),
        Vector3::new(-1.0, 0.3, 1.0),
    )
    .unwrap();
    let circle = Circle::try_new(plane, 7.5).unwrap();
    let curve = circle.to_nurbs();
    for i in 0..=128 {
        let t = i as f64 / 128.0;
        let pt = curve.point_at(t);
        assert!(plane.signed_distance(pt).abs() < 1.0e-6);
        assert!((pt.distance(circle.center()) - 7.5).abs() < 1.0e-6);
    }
}

#[test]
fn three_point_arc_metrics() {
    let a = Point3::new(74.264416, 36.39316, -1.884313);
    let b = Point3::new(97.679126, 13.940616, 3.812853);
    let c = Point3::new(100.92443, 30.599893, -0.585116);
    let arc = Arc::from_three_points(a, b, c).unwrap();

    assert!((arc.length() - 71.333203).abs() < 1.0e-6);
    assert!((arc.radius() - 16.47719).abs() < 1.0e-5);
    assert!((arc.sweep().to_degrees() - 248.045414).abs() < 1.0e-4);

    // starts at the first point, passes through the second, ends at the third
    assert_near!(arc.point_at(0.0), a);
    assert_near!(arc.point_at(arc.sweep()), c);
    let nurbs = arc.to_nurbs();
    let closest = nurbs.closest_point(b).unwrap();
    assert!(closest.distance(b) < 1.0e-6);

    // the reduction preserves the metric
    assert!((nurbs.length() - arc.length()).abs() < 1.0e-6);
}

#[test]
fn arc_from_start_end_tangent_is_tangent_at_start() {
    let arc = Arc::from_start_end_tangent(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
        Vector3::unit_x(),
    )
    .unwrap();
    assert_near!(arc.point_at(0.0), Point3::new(0.0, 0.0, 0.0));
    assert_near!(arc.point_at(arc.sweep()), Point3::new(2.0, 2.0, 0.0));
    let start_der = arc.derivative_at(0.0);
    assert!(start_der.cross(Vector3::unit_x()).magnitude().so_small());
    f64::assert_near(&arc.radius(), &2.0);
}

#[test]
fn polyline_to_nurbs_interpolates_the_vertices_at_the_knots() {
    let polyline = Polyline::try_new(vec![
        Point3::new(5.0, 10.0, 0.0),
        Point3::new(10.0, 10.0, 0.0),
        Point3::new(10.0, 20.0, 1.0),
        Point3::new(5.0, 25.0, 2.0),
        Point3::new(0.0, 20.0, 1.0),
    ])
    .unwrap();
    let curve = polyline.to_nurbs();
    let knot_vec = curve.knot_vec();
    for i in 1..=polyline.vertices().len() {
        assert_near!(curve.point_at(knot_vec[i]), polyline.vertices()[i - 1]);
    }
    f64::assert_near2(&curve.length(), &polyline.length());
}

#[test]
fn polygon_requires_coplanar_vertices() {
    let planar = Polygon::try_new(vec![
        Point3::new(0.0, 0.0, 5.0),
        Point3::new(4.0, 0.0, 5.0),
        Point3::new(4.0, 3.0, 5.0),
        Point3::new(0.0, 3.0, 5.0),
    ]);
    assert!(planar.is_ok());

    let skewed = Polygon::try_new(vec![
        Point3::new(0.0, 0.0, 5.0),
        Point3::new(4.0, 0.0, 5.0),
        Point3::new(4.0, 3.0, 5.1),
        Point3::new(0.0, 3.0, 5.0),
    ]);
    assert_eq!(skewed, Err(errors::Error::NonPlanar));
}

#[test]
fn inversions_and_rigid_motions() {
    let line = Line::try_new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)).unwrap();
    let reversed = line.reversed();
    assert_near!(reversed.start(), line.end());
    assert_near!(reversed.end(), line.start());

    let polyline = Polyline::try_new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
    ])
    .unwrap()
    .reversed();
    assert_near!(polyline.vertices()[0], Point3::new(1.0, 1.0, 0.0));

    let flipped = Plane::xy().reversed();
    assert_near!(flipped.normal(), -Vector3::unit_z());

    let mat = Matrix4::from_translation(Vector3::new(0.0, 0.0, 4.0));
    let circle = Circle::try_new(Plane::xy(), 2.0).unwrap().transformed(mat);
    assert_near!(circle.center(), Point3::new(0.0, 0.0, 4.0));
    f64::assert_near(&circle.radius(), &2.0);

    let polygon = Polygon::try_new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ])
    .unwrap()
    .transformed(mat);
    assert_near!(polygon.vertices()[0], Point3::new(0.0, 0.0, 4.0));
    assert!(polygon.plane().signed_distance(Point3::new(0.5, 0.2, 4.0)).so_small());

    let moved_line = line.transformed(mat);
    assert_near!(moved_line.start(), Point3::new(0.0, 0.0, 4.0));
}

#[test]
fn transforms_are_consistent_between_primitives_and_reductions() {
    let arc = Arc::from_three_points(
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
    )
    .unwrap();
    let mat = Matrix4::from_translation(Vector3::new(2.0, 0.0, -1.0));
    let moved_arc = arc.transformed(mat);
    let moved_curve = arc.to_nurbs().transformed(mat);
    assert_near!(moved_arc.center(), Point3::new(2.0, 0.0, -1.0));
    assert_near!(moved_curve.start_point(), moved_arc.point_at(0.0));
    assert_near!(moved_curve.end_point(), moved_arc.point_at(moved_arc.sweep()));
}
