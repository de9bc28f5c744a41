//! Integration tests for the full RHS pipeline.
//!
//! These cover the headline properties of the scheme:
//! - Lake-at-rest well-balancing over smooth topography
//! - Positivity and NaN-freedom with dry cells in the domain
//! - Dam-break flux direction and CFL bound
//! - Periodic (grid-wrap) halo exchange end to end

use swe2d::{
    compute_rhs, BcType, BoundaryConfig, GhostCellUpdater, Grid, GridWrapExchange, Parameters,
    Runtime, State, TopographySource, Topography,
};

const G: f64 = 9.81;

fn build_runtime(
    bcs: &BoundaryConfig,
    grid: &Grid,
    topo: &Topography,
    params: &Parameters,
) -> Runtime {
    let updater = GhostCellUpdater::new(bcs, grid, topo, params).unwrap();
    Runtime::new(updater)
        .with_source(Box::new(TopographySource))
        .with_dt_cap(1.0)
}

/// Flat surface over a smooth bump, zero velocity: the flux divergence
/// and the bed-slope source must cancel for every interior cell.
#[test]
fn lake_at_rest_is_well_balanced() {
    let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), 16, 16).unwrap();
    let topo = Topography::from_function(&grid, |x, y| {
        0.5 * (-((x - 0.5).powi(2) + (y - 0.5).powi(2)) / 0.01).exp()
    })
    .unwrap();
    let params = Parameters::default();
    let bcs = BoundaryConfig::uniform(BcType::Outflow);
    let runtime = build_runtime(&bcs, &grid, &topo, &params);

    let mut state = State::new(&grid);
    state.set_from_functions(&grid, |_, _| 1.0, |_, _| 0.0, |_, _| 0.0);

    let max_dt = compute_rhs(&mut state, &grid, &topo, &runtime, &params).unwrap();

    assert!(
        state.s.max_abs() < 1e-10,
        "lake at rest must stay at rest, max |S| = {:.3e}",
        state.s.max_abs()
    );
    assert!(max_dt.is_finite() && max_dt > 0.0);
}

/// A domain with a dry region next to wet cells must produce a finite
/// RHS and time step, and non-negative face depths.
#[test]
fn dry_cells_do_not_produce_nan() {
    let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), 10, 10).unwrap();
    let topo = Topography::flat(&grid, 0.0);
    let params = Parameters::default();
    let bcs = BoundaryConfig::uniform(BcType::Outflow);
    let runtime = build_runtime(&bcs, &grid, &topo, &params);

    let mut state = State::new(&grid);
    // Wet pool on the left, bone-dry bed (h = 0, u = v = 0) on the
    // right.
    state.set_from_functions(
        &grid,
        |x, _| if x < 0.5 { 0.8 } else { 0.0 },
        |_, _| 0.0,
        |_, _| 0.0,
    );

    let max_dt = compute_rhs(&mut state, &grid, &topo, &runtime, &params).unwrap();

    assert!(!state.s.has_non_finite(), "RHS must be finite");
    assert!(max_dt.is_finite() && max_dt > 0.0, "max_dt = {max_dt}");
    for side in [
        &state.face_x.minus,
        &state.face_x.plus,
        &state.face_y.minus,
        &state.face_y.plus,
    ] {
        assert!(side.h.iter().all(|h| *h >= 0.0), "negative face depth");
    }
}

/// Classic dam break over a flat bed (1-D along x): one RHS call must
/// move mass from the high side to the low side and respect the CFL
/// bound for the fastest wave.
#[test]
fn dam_break_divergence_and_cfl() {
    let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), 10, 10).unwrap();
    assert!((grid.dx - 0.1).abs() < 1e-14 && (grid.dy - 0.1).abs() < 1e-14);
    let topo = Topography::flat(&grid, 0.0);
    let params = Parameters::default();
    let bcs = BoundaryConfig::uniform(BcType::Outflow);
    let runtime = build_runtime(&bcs, &grid, &topo, &params);

    let mut state = State::new(&grid);
    state.set_from_functions(
        &grid,
        |x, _| if x < 0.5 { 1.0 } else { 0.1 },
        |_, _| 0.0,
        |_, _| 0.0,
    );

    let max_dt = compute_rhs(&mut state, &grid, &topo, &runtime, &params).unwrap();

    // The interface sits between columns 4 and 5; mass leaves the last
    // high cell and arrives in the first low cell, in every row.
    for j in 0..10 {
        assert!(
            state.s.w[[j, 4]] < 0.0,
            "high side should lose mass, S_w = {}",
            state.s.w[[j, 4]]
        );
        assert!(
            state.s.w[[j, 5]] > 0.0,
            "low side should gain mass, S_w = {}",
            state.s.w[[j, 5]]
        );
        // The pressure gradient drives a positive x-discharge tendency
        // at the interface.
        assert!(state.s.hu[[j, 5]] > 0.0);
    }

    // Fastest signal comes from the deep side: |a| <= sqrt(g * 1.0).
    let bound = 0.25 * grid.dx / (G * 1.0_f64).sqrt();
    assert!(max_dt <= bound, "max_dt {max_dt} exceeds CFL bound {bound}");
    assert!(max_dt > 0.0);
}

/// Uniform flow on a doubly-periodic domain is translation invariant:
/// the RHS must vanish and ghost data must come from the grid wrap.
#[test]
fn periodic_uniform_flow_has_zero_rhs() {
    let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), 8, 8).unwrap();
    let topo = Topography::flat(&grid, 0.0);
    let params = Parameters::default();
    let bcs = BoundaryConfig::uniform(BcType::Periodic);
    let updater = GhostCellUpdater::new(&bcs, &grid, &topo, &params).unwrap();
    let runtime = Runtime::new(updater)
        .with_halo(Box::new(GridWrapExchange::from_config(&bcs)))
        .with_dt_cap(1.0);

    let mut state = State::new(&grid);
    state.set_from_functions(&grid, |_, _| 1.0, |_, _| 0.3, |_, _| -0.1);

    let max_dt = compute_rhs(&mut state, &grid, &topo, &runtime, &params).unwrap();

    assert!(
        state.s.max_abs() < 1e-12,
        "uniform periodic flow must have zero RHS, got {:.3e}",
        state.s.max_abs()
    );
    let expected = params.cfl * grid.dx / (0.3 + (G * 1.0_f64).sqrt());
    assert!((max_dt - expected).abs() < 1e-12);
}

/// A sloshing initial condition conserves mass: the divergence part of
/// `S_w` integrates to zero when no water crosses the boundary.
#[test]
fn interior_mass_is_conserved_with_periodic_wrap() {
    let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), 16, 16).unwrap();
    let topo = Topography::flat(&grid, 0.0);
    let params = Parameters::default();
    let bcs = BoundaryConfig::uniform(BcType::Periodic);
    let updater = GhostCellUpdater::new(&bcs, &grid, &topo, &params).unwrap();
    let runtime = Runtime::new(updater)
        .with_halo(Box::new(GridWrapExchange::from_config(&bcs)))
        .with_dt_cap(1.0);

    let mut state = State::new(&grid);
    state.set_from_functions(
        &grid,
        |x, y| {
            1.0 + 0.2
                * (2.0 * std::f64::consts::PI * x).sin()
                * (2.0 * std::f64::consts::PI * y).cos()
        },
        |_, _| 0.0,
        |_, _| 0.0,
    );

    compute_rhs(&mut state, &grid, &topo, &runtime, &params).unwrap();

    let total: f64 = state.s.w.iter().sum();
    assert!(
        total.abs() * grid.dx * grid.dy < 1e-12,
        "d(mass)/dt = {:.3e}",
        total * grid.dx * grid.dy
    );
}
