use proptest::prelude::*;
use skiff_geometry::*;

fn wavy_curve() -> NurbsCurve {
    let knot_vec = KnotVec::try_from(vec![
        0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 5.0, 5.0,
    ])
    .unwrap();
    let control_points = vec![
        Vector4::new(0.0, 0.0, 0.0, 1.0),
        Vector4::new(2.0, 2.0, 0.0, 2.0),
        Vector4::new(2.0, -1.0, 1.0, 1.0),
        Vector4::new(3.0, 0.0, 3.0, 3.0),
        Vector4::new(4.0, 1.0, -1.0, 1.0),
        Vector4::new(10.0, 2.0, 2.0, 2.0),
        Vector4::new(6.0, -1.0, 0.0, 1.0),
        Vector4::new(7.0, 0.0, 1.0, 1.0),
    ];
    NurbsCurve::new(knot_vec, control_points)
}

#[test]
fn point_at_half_on_a_quadratic_bezier() {
    let knot_vec = KnotVec::try_from(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
    let control_points = vec![
        Vector4::new(-10.0, 15.0, 5.0, 1.0),
        Vector4::new(10.0, 5.0, 5.0, 1.0),
        Vector4::new(20.0, 0.0, 0.0, 1.0),
    ];
    let curve = NurbsCurve::new(knot_vec, control_points);
    // the de Boor evaluation equals the Bernstein combination of the
    // control points
    let expected = Point3::new(
        0.25 * -10.0 + 0.5 * 10.0 + 0.25 * 20.0,
        0.25 * 15.0 + 0.5 * 5.0,
        0.25 * 5.0 + 0.5 * 5.0,
    );
    assert!(curve.point_at(0.5).distance(expected) < 1.0e-9);
    // endpoints interpolate
    assert_near!(curve.start_point(), Point3::new(-10.0, 15.0, 5.0));
    assert_near!(curve.end_point(), Point3::new(20.0, 0.0, 0.0));
}

#[test]
fn refinement_on_a_uniform_polygonal_curve() {
    let points: Vec<Point3> = (0..8).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
    let knot_vec = KnotVec::try_from(vec![
        0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 5.0, 5.0,
    ])
    .unwrap();
    let control_points = points.iter().map(|p| Vector4::from_point(*p)).collect();
    let curve = NurbsCurve::new(knot_vec, control_points);
    let mut refined = curve.clone();
    refined.try_refine_knots(&[0.3, 0.3, 0.3]).unwrap();
    assert!(curve.point_at(2.5).distance(refined.point_at(2.5)) < 1.0e-6);
    assert!(refined.near2_as_curve(&curve));
}

proptest! {
    #[test]
    fn basis_functions_are_a_partition_of_unity(
        t in 0f64..=1.0,
        degree in 1usize..=5,
        division in 1usize..=8,
    ) {
        let knot_vec = KnotVec::uniform_knot(degree, division);
        let span = knot_vec.span(degree, t);
        let sum: f64 = knot_vec.basis_functions(degree, span, t).iter().sum();
        prop_assert!((sum - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn knot_refinement_preserves_shape(
        t in 0f64..=1.0,
        x in 0.05f64..=0.95,
        pts in prop::array::uniform8(prop::array::uniform3(-10f64..=10.0)),
        weights in prop::array::uniform8(0.5f64..=4.0),
    ) {
        let knot_vec = KnotVec::uniform_knot(3, 5);
        let control_points = pts
            .iter()
            .zip(weights)
            .map(|(p, w)| Vector4::new(p[0] * w, p[1] * w, p[2] * w, w))
            .collect();
        let curve = NurbsCurve::new(knot_vec, control_points);
        let mut refined = curve.clone();
        refined.try_refine_knots(&[x, x, 0.5]).unwrap();
        prop_assert!(curve.point_at(t).distance(refined.point_at(t)) < 1.0e-9);
    }

    #[test]
    fn degree_elevation_preserves_shape(
        t in 0f64..=1.0,
        pts in prop::array::uniform6(prop::array::uniform3(-10f64..=10.0)),
    ) {
        let points: Vec<Point3> = pts.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect();
        let curve = NurbsCurve::from_points(&points, 2).unwrap();
        let mut elevated = curve.clone();
        elevated.elevate_degree();
        prop_assert_eq!(elevated.degree(), 3);
        prop_assert_near!(curve.point_at(t), elevated.point_at(t));
        prop_assert!(curve.point_at(t).distance(elevated.point_at(t)) < 1.0e-9);
    }
}

#[test]
fn reverse_is_an_involution() {
    let curve = wavy_curve();
    let mut twice = curve.clone();
    twice.reverse();
    twice.reverse();
    assert_eq!(curve.knot_vec(), twice.knot_vec());
    curve
        .control_points()
        .iter()
        .zip(twice.control_points())
        .for_each(|(a, b)| assert_near!(a, b));
    // a single reversal swaps the endpoints and keeps the trace
    let reversed = curve.reversed();
    assert_near!(reversed.start_point(), curve.end_point());
    assert_near!(reversed.end_point(), curve.start_point());
}

#[test]
fn split_halves_meet_at_the_split_point() {
    let curve = wavy_curve();
    for t in [0.7, 2.0, 3.3, 4.9] {
        let (front, back) = curve.try_split(t).unwrap();
        assert_near!(front.end_point(), curve.point_at(t));
        assert_near!(back.start_point(), curve.point_at(t));
        assert_near!(front.end_point(), back.start_point());
        // both halves reproduce the original on their domains
        let mid = front.domain().mid();
        assert_near!(front.point_at(mid), curve.point_at(mid));
        let mid = back.domain().mid();
        assert_near!(back.point_at(mid), curve.point_at(mid));
    }
}

#[test]
fn bezier_decomposition_round_trip() {
    let curve = wavy_curve();
    let beziers = curve.bezier_decomposition();
    for bezier in &beziers {
        let Interval { t0, t1 } = bezier.domain();
        for i in 0..=20 {
            let t = t0 + (t1 - t0) * i as f64 / 20.0;
            assert!(bezier.point_at(t).distance(curve.point_at(t)) < 1.0e-10);
        }
    }
}

#[test]
fn degree_elevation_and_reduction_round_trip() {
    let curve = wavy_curve();
    let mut elevated = curve.clone();
    elevated.elevate_degree();
    assert_eq!(elevated.degree(), 4);
    assert!(elevated.near2_as_curve(&curve));
    elevated.reduce_degree(1.0e-6);
    assert_eq!(elevated.degree(), 3);
    assert!(elevated.near2_as_curve(&curve));
}

#[test]
fn close_then_clamp_preserves_the_loop() {
    let points: Vec<Point3> = (0..6)
        .map(|i| {
            let theta = std::f64::consts::PI * i as f64 / 3.0;
            Point3::new(theta.cos(), theta.sin(), 0.0)
        })
        .collect();
    let mut curve = NurbsCurve::from_points(&points, 2).unwrap();
    curve.close();
    assert!(curve.is_periodic());
    // a closed curve evaluates to the same point at both domain ends
    let Interval { t0, t1 } = curve.domain();
    assert_near!(curve.point_at(t0), curve.point_at(t1));

    let mut clamped = curve.clone();
    clamped.clamp_ends();
    assert!(clamped.is_clamped());
    for i in 0..=32 {
        let t = t0 + (t1 - t0) * i as f64 / 32.0;
        assert_near!(clamped.point_at(t), curve.point_at(t));
    }
}

#[test]
fn join_of_three_curves() {
    let a = Line::try_new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0))
        .unwrap()
        .to_nurbs();
    let b = NurbsCurve::from_points(
        &[
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ],
        2,
    )
    .unwrap();
    let c = Line::try_new(Point3::new(3.0, 0.0, 0.0), Point3::new(3.0, -2.0, 0.0))
        .unwrap()
        .to_nurbs();
    let joined = NurbsCurve::join(&[a.clone(), b.clone(), c.clone()]).unwrap();
    assert_near!(joined.start_point(), a.start_point());
    assert_near!(joined.end_point(), c.end_point());
    // all input degrees were elevated to the maximum
    assert_eq!(joined.degree(), 2);
    f64::assert_near(
        &joined.length(),
        &(a.length() + b.length() + c.length()),
    );

    // mismatched endpoints are rejected
    let gap = Line::try_new(Point3::new(9.0, 9.0, 9.0), Point3::new(9.0, 9.0, 0.0))
        .unwrap()
        .to_nurbs();
    assert_eq!(
        NurbsCurve::join(&[a.clone(), gap]),
        Err(errors::Error::NotAdjacent),
    );
    assert_eq!(
        NurbsCurve::join(&[a]),
        Err(errors::Error::InvalidPointCount { required: 2, found: 1 }),
    );
}

#[test]
fn bounding_box_of_a_rational_curve() {
    let w = f64::sqrt(0.5);
    let quarter = NurbsCurve::new(
        KnotVec::bezier_knot(2),
        vec![
            Vector4::new(1.0, 0.0, 0.0, 1.0),
            Vector4::new(w, w, 0.0, w),
            Vector4::new(0.0, 1.0, 0.0, 1.0),
        ],
    );
    let bdd = quarter.bounding_box();
    assert!(bdd.min().distance(Point3::new(0.0, 0.0, 0.0)) < 1.0e-3);
    assert!(bdd.max().distance(Point3::new(1.0, 1.0, 0.0)) < 1.0e-3);
}
