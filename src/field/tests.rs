use approx::assert_relative_eq;
use nalgebra::{Point2, Vector2};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{basis::RadialKernel, control_point::ControlPoint, domain::Domain, error::WarpError};

use super::*;

fn unit_domain() -> Domain<f64> {
    Domain::try_new(-1.0, 1.0, 4).unwrap()
}

fn kernels() -> Vec<RadialKernel<f64>> {
    vec![
        RadialKernel::gaussian(),
        RadialKernel::inverse_multiquadric(),
        RadialKernel::ThinPlate,
    ]
}

fn scattered() -> Vec<ControlPoint<f64>> {
    vec![
        ControlPoint::committed(Point2::new(-0.5, -0.5), Point2::new(-0.4, -0.55)),
        ControlPoint::committed(Point2::new(0.5, -0.4), Point2::new(0.55, -0.3)),
        ControlPoint::committed(Point2::new(0.1, 0.6), Point2::new(0.0, 0.7)),
        ControlPoint::committed(Point2::new(-0.6, 0.4), Point2::new(-0.6, 0.2)),
    ]
}

fn single() -> Vec<ControlPoint<f64>> {
    vec![ControlPoint::committed(
        Point2::new(0.0, 0.0),
        Point2::new(0.5, 0.0),
    )]
}

#[test]
fn lattice_reproduces_single_point() {
    let solver = LatticeSolver::new(unit_domain(), DEFAULT_KNOT_COUNT).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..50 {
        let begin = Point2::new(rng.random_range(-0.9..0.9), rng.random_range(-0.9..0.9));
        let end = Point2::new(rng.random_range(-0.9..0.9), rng.random_range(-0.9..0.9));
        let lattice = solver.solve(&[ControlPoint::committed(begin, end)]).unwrap();
        assert_relative_eq!(lattice.evaluate(&begin), end, epsilon = 1e-12);
    }
}

#[test]
fn lattice_reproduces_point_on_upper_edge() {
    let solver = LatticeSolver::new(unit_domain(), 4).unwrap();
    let begin = Point2::new(1.0, 1.0);
    let end = Point2::new(0.8, 0.9);
    let lattice = solver.solve(&[ControlPoint::committed(begin, end)]).unwrap();
    assert_relative_eq!(lattice.evaluate(&begin), end, epsilon = 1e-12);
}

#[test]
fn lattice_single_point_leaves_corners() {
    let lattice = LatticeSolver::new(unit_domain(), DEFAULT_KNOT_COUNT)
        .unwrap()
        .solve(&single())
        .unwrap();

    assert_relative_eq!(
        lattice.evaluate(&Point2::origin()),
        Point2::new(0.5, 0.0),
        epsilon = 1e-12
    );
    for corner in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
        let p = Point2::new(corner.0, corner.1);
        assert_eq!(lattice.evaluate(&p), p);
    }
}

#[test]
fn lattice_has_local_support() {
    let domain = unit_domain();
    let lattice = LatticeSolver::new(domain, DEFAULT_KNOT_COUNT)
        .unwrap()
        .solve(&single())
        .unwrap();
    // outside the 4x4 knot support of the source
    let far = Point2::new(0.8, 0.8);
    assert_eq!(lattice.evaluate(&far), far);
    assert!(lattice.displacement(&Point2::new(0.1, 0.1)).x > 0.0);
}

#[test]
fn lattice_knots_around_source() {
    let mut lattice = Lattice::new(unit_domain(), 8).unwrap();
    lattice
        .accumulate(&ControlPoint::committed(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.3),
        ))
        .unwrap();

    // source sits on knot (5, 5), the three knots around it per axis receive weight
    assert!(lattice.knot(5, 5).y > 0.0);
    assert!(lattice.knot(4, 6).y > 0.0);
    assert_eq!(*lattice.knot(7, 5), Vector2::zeros());
    assert_eq!(*lattice.knot(3, 5), Vector2::zeros());
    let touched = lattice
        .knots()
        .iter()
        .filter(|k| **k != Vector2::zeros())
        .count();
    assert_eq!(touched, 9);

    lattice.reset();
    assert!(lattice.knots().iter().all(|k| *k == Vector2::zeros()));
}

#[test]
fn lattice_rejects_points_outside() {
    let solver = LatticeSolver::new(unit_domain(), 8).unwrap();
    let outside_begin = ControlPoint::committed(Point2::new(1.2, 0.0), Point2::new(0.0, 0.0));
    assert!(matches!(
        solver.solve(&[outside_begin]),
        Err(WarpError::OutOfDomain { .. })
    ));
    let outside_end = ControlPoint::committed(Point2::new(0.0, 0.0), Point2::new(0.0, -1.5));
    assert!(matches!(
        solver.solve(&[outside_end]),
        Err(WarpError::OutOfDomain { .. })
    ));

    let lattice = solver.solve(&single()).unwrap();
    let p = Point2::new(3.0, -2.0);
    assert_eq!(lattice.evaluate(&p), p);
}

#[test]
fn lattice_requires_knots() {
    assert_eq!(
        LatticeSolver::new(unit_domain(), 0).unwrap_err(),
        WarpError::InvalidKnotCount
    );
    assert_eq!(
        Lattice::new(unit_domain(), 0).unwrap_err(),
        WarpError::InvalidKnotCount
    );
}

#[test]
fn lattice_accumulate_requires_commit() {
    let mut lattice = Lattice::new(unit_domain(), 8).unwrap();
    let pending = ControlPoint::new(Point2::new(0.0, 0.0));
    assert_eq!(
        lattice.accumulate(&pending).unwrap_err(),
        WarpError::UncommittedControlPoint
    );
}

#[test]
fn zero_control_points_is_identity_for_lattice() {
    let lattice = LatticeSolver::new(unit_domain(), 8)
        .unwrap()
        .solve(&[])
        .unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..20 {
        let p = Point2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
        assert_eq!(lattice.evaluate(&p), p);
    }
}

#[test]
fn radial_interpolates_control_points() {
    let cps = scattered();
    for kernel in kernels() {
        let field = RadialSolver::new(kernel).solve(&cps).unwrap();
        assert_eq!(field.centres().len(), cps.len());
        for cp in cps.iter() {
            assert_relative_eq!(
                field.evaluate(cp.begin()),
                *cp.end().unwrap(),
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn radial_requires_committed_points() {
    let pending = vec![ControlPoint::new(Point2::new(0.1, 0.1))];
    for kernel in kernels() {
        let solver = RadialSolver::new(kernel);
        assert_eq!(solver.solve(&[]).unwrap_err(), WarpError::NoControlPoints);
        assert_eq!(
            solver.solve(&pending).unwrap_err(),
            WarpError::NoControlPoints
        );
    }
}

#[test]
fn radial_skips_pending_points() {
    let mut cps = scattered();
    cps.push(ControlPoint::new(Point2::new(0.3, 0.3)));
    for kernel in kernels() {
        let solver = RadialSolver::new(kernel);
        assert_eq!(solver.solve(&cps).unwrap(), solver.solve(&scattered()).unwrap());
    }
}

#[test]
fn radial_duplicate_sources_are_singular() {
    let cps = vec![
        ControlPoint::committed(Point2::new(0.2, 0.2), Point2::new(0.3, 0.2)),
        ControlPoint::committed(Point2::new(0.2, 0.2), Point2::new(0.1, 0.2)),
    ];
    for kernel in kernels() {
        let err = RadialSolver::new(kernel).solve(&cps).unwrap_err();
        assert!(matches!(err, WarpError::SingularSystem(_)));
        assert!(err.is_degenerate_solve());
    }
}

#[test]
fn radial_singular_tolerance() {
    let solver = RadialSolver::new(RadialKernel::gaussian()).with_singular_tolerance(2.0);
    assert!(matches!(
        solver.solve(&scattered()),
        Err(WarpError::SingularSystem(_))
    ));
}

#[test]
fn radial_degenerate_points_do_not_contribute() {
    let mut cps = scattered();
    cps.push(ControlPoint::committed(
        Point2::new(0.7, 0.7),
        Point2::new(0.7, 0.7),
    ));
    for kernel in kernels() {
        let solver = RadialSolver::new(kernel);
        assert_eq!(solver.solve(&cps).unwrap(), solver.solve(&scattered()).unwrap());
    }

    let only = vec![ControlPoint::committed(
        Point2::new(0.1, 0.1),
        Point2::new(0.1, 0.1),
    )];
    let field = RadialSolver::default().solve(&only).unwrap();
    assert!(field.centres().is_empty());
    let p = Point2::new(0.4, -0.2);
    assert_eq!(field.evaluate(&p), p);
}

#[test]
fn kernel_matrix_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(9);
    let centres = (0..20)
        .map(|_| Point2::new(rng.random_range(-0.95..0.95), rng.random_range(-0.95..0.95)))
        .collect::<Vec<_>>();
    for kernel in kernels() {
        let a = kernel_matrix(&kernel, &centres);
        assert_eq!(a, a.transpose());
        for i in 0..centres.len() {
            assert_eq!(a[(i, i)], kernel.self_value(&centres[i]));
        }
    }
}

#[test]
fn single_point_scenario() {
    let cps = single();
    let origin = Point2::origin();
    let corner = Point2::new(1.0, 1.0);
    let target = Point2::new(0.5, 0.0);

    let gaussian = RadialSolver::new(RadialKernel::gaussian()).solve(&cps).unwrap();
    assert_relative_eq!(gaussian.evaluate(&origin), target, epsilon = 1e-12);
    assert_relative_eq!(
        gaussian.displacement(&corner),
        Vector2::new(0.5 * (-20.0_f64).exp(), 0.0),
        epsilon = 1e-15
    );

    let imq = RadialSolver::new(RadialKernel::inverse_multiquadric())
        .solve(&cps)
        .unwrap();
    assert_relative_eq!(imq.evaluate(&origin), target, epsilon = 1e-12);
    // 0.5 / sqrt(1 + 2 * 10)
    assert_relative_eq!(
        imq.displacement(&corner).x,
        0.5 / 21.0_f64.sqrt(),
        epsilon = 1e-12
    );

    let tps = RadialSolver::new(RadialKernel::ThinPlate).solve(&cps).unwrap();
    assert_relative_eq!(tps.evaluate(&origin), target, epsilon = 1e-12);
    // the Green's function of the origin vanishes on the unit circle
    for p in [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)] {
        let p = Point2::new(p.0, p.1);
        assert_relative_eq!(tps.evaluate(&p), p, epsilon = 1e-12);
    }
    // unit weight times G((1, 1), 0) = 2 (-1/4 + ln(2) / 2)
    assert_relative_eq!(
        tps.displacement(&corner),
        Vector2::new(2.0_f64.ln() - 0.5, 0.0),
        epsilon = 1e-12
    );
}

#[test]
fn radial_fields_are_continuous_at_centres() {
    let cps = scattered();
    for kernel in kernels() {
        let field = RadialSolver::new(kernel).solve(&cps).unwrap();
        for cp in cps.iter() {
            let at = field.displacement(cp.begin());
            for offset in [
                Vector2::new(1e-6, 0.0),
                Vector2::new(0.0, -1e-6),
                Vector2::new(-7e-7, 7e-7),
            ] {
                let near = field.displacement(&(cp.begin() + offset));
                assert!(
                    (near - at).norm() < 1e-4,
                    "{:?} jumps by {} next to {}",
                    kernel,
                    (near - at).norm(),
                    cp
                );
            }
        }
    }
}

#[test]
fn radial_fields_move_points_next_to_a_source() {
    let cps = vec![ControlPoint::committed(
        Point2::new(0.01, 0.0),
        Point2::new(0.51, 0.0),
    )];
    let origin = Point2::origin();
    for kernel in kernels() {
        let field = RadialSolver::new(kernel).solve(&cps).unwrap();
        assert_relative_eq!(field.evaluate(cps[0].begin()), Point2::new(0.51, 0.0), epsilon = 1e-12);
        let d = field.displacement(&origin);
        assert_relative_eq!(d, Vector2::new(0.5, 0.0), epsilon = 2e-3);
    }
}

#[test]
fn opposite_points_cancel_at_centre() {
    let cps = vec![
        ControlPoint::committed(Point2::new(-0.5, 0.0), Point2::new(-0.6, 0.0)),
        ControlPoint::committed(Point2::new(0.5, 0.0), Point2::new(0.6, 0.0)),
    ];
    let origin = Point2::origin();

    let lattice = LatticeSolver::new(unit_domain(), 8)
        .unwrap()
        .solve(&cps)
        .unwrap();
    assert_relative_eq!(lattice.evaluate(&origin), origin, epsilon = 1e-12);

    for kernel in kernels() {
        let field = RadialSolver::new(kernel).solve(&cps).unwrap();
        assert_relative_eq!(field.evaluate(&origin), origin, epsilon = 1e-12);
        let w = field.weights();
        assert_relative_eq!(w[0], -w[1], epsilon = 1e-12);
    }
}

#[test]
fn solving_is_deterministic() {
    let cps = scattered();
    let solver = LatticeSolver::new(unit_domain(), 8).unwrap();
    assert_eq!(
        solver.solve(&cps).unwrap().knots(),
        solver.solve(&cps).unwrap().knots()
    );
    for kernel in kernels() {
        let solver = RadialSolver::new(kernel);
        assert_eq!(solver.solve(&cps).unwrap(), solver.solve(&cps).unwrap());
    }
}

#[test]
fn boxed_fields() {
    let fields: Vec<Box<dyn WarpField<f64>>> = vec![
        Box::new(IdentityField),
        Box::new(RadialSolver::default().solve(&single()).unwrap()),
        Box::new(
            LatticeSolver::new(unit_domain(), 8)
                .unwrap()
                .solve(&single())
                .unwrap(),
        ),
    ];
    let p = Point2::new(0.0, 0.0);
    assert_eq!(fields[0].evaluate(&p), p);
    for field in fields.iter().skip(1) {
        assert_relative_eq!(field.evaluate(&p), Point2::new(0.5, 0.0), epsilon = 1e-12);
    }
}
