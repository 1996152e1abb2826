//! Force-parity checks: every container/traversal/layout combination must
//! reproduce the reference forces of the direct-sum container within a
//! relative tolerance. Accumulation order differs between schedules, so
//! comparisons are never bit-exact.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tuna::real::Real;
use tuna::{
    ContainerOpt, DataLayoutOpt, IterBehavior, LennardJones, Newton3Opt, Particle, TraversalOpt,
    Tuna, TunaConfig,
};

/// Jittered grid positions: dense enough to be interesting, with a
/// guaranteed minimum separation so no pair force explodes.
fn jittered_grid(per_axis: usize, seed: u64) -> Vec<[Real; 3]> {
    let spacing = 0.3;
    let jitter = 0.1;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::new();
    for z in 0..per_axis {
        for y in 0..per_axis {
            for x in 0..per_axis {
                out.push([
                    0.15 + spacing * x as Real + rng.gen_range(-jitter..jitter),
                    0.15 + spacing * y as Real + rng.gen_range(-jitter..jitter),
                    0.15 + spacing * z as Real + rng.gen_range(-jitter..jitter),
                ]);
            }
        }
    }
    out
}

fn run_forces(
    container: ContainerOpt,
    traversal: TraversalOpt,
    layout: DataLayoutOpt,
    newton3: Newton3Opt,
    positions: &[[Real; 3]],
) -> HashMap<u64, [Real; 3]> {
    let mut tuna = Tuna::new(TunaConfig {
        box_min: [0.0; 3],
        box_max: [3.0; 3],
        cutoff: 1.0,
        verlet_skin: 0.2,
        num_samples: 1,
        allowed_containers: vec![container],
        allowed_traversals: vec![traversal],
        allowed_data_layouts: vec![layout],
        allowed_newton3: vec![newton3],
        ..Default::default()
    })
    .unwrap();
    for (id, &pos) in positions.iter().enumerate() {
        tuna.add_particle(Particle::new(id as u64, pos, [0.0; 3])).unwrap();
    }
    let lj = LennardJones::new(1.0, 1.0, 1.0);
    tuna.iterate_pairwise(&lj).unwrap();
    tuna.iter(IterBehavior::OwnedOnly)
        .map(|p| (p.id, p.force))
        .collect()
}

fn assert_forces_match(
    reference: &HashMap<u64, [Real; 3]>,
    other: &HashMap<u64, [Real; 3]>,
    rel_tol: Real,
) {
    assert_eq!(reference.len(), other.len());
    let scale = reference
        .values()
        .flat_map(|f| f.iter().map(|v| v.abs()))
        .fold(1.0 as Real, Real::max);
    for (id, fa) in reference {
        let fb = other.get(id).expect("particle missing");
        for k in 0..3 {
            let diff = (fa[k] - fb[k]).abs();
            assert!(
                diff <= rel_tol * scale,
                "particle {} axis {}: {} vs {} (diff {:e}, scale {:e})",
                id,
                k,
                fa[k],
                fb[k],
                diff,
                scale
            );
        }
    }
}

fn reference(positions: &[[Real; 3]]) -> HashMap<u64, [Real; 3]> {
    run_forces(
        ContainerOpt::DirectSum,
        TraversalOpt::DirectSum,
        DataLayoutOpt::Aos,
        Newton3Opt::Disabled,
        positions,
    )
}

#[test]
fn linked_cells_matches_direct_sum() {
    let positions = jittered_grid(10, 42);
    let base = reference(&positions);
    for &traversal in &[TraversalOpt::C08, TraversalOpt::C18, TraversalOpt::Sliced] {
        for &newton3 in Newton3Opt::all() {
            let f = run_forces(
                ContainerOpt::LinkedCells,
                traversal,
                DataLayoutOpt::Aos,
                newton3,
                &positions,
            );
            assert_forces_match(&base, &f, 1.5e-12);
        }
    }
}

#[test]
fn c01_matches_direct_sum() {
    let positions = jittered_grid(8, 43);
    let base = reference(&positions);
    let f = run_forces(
        ContainerOpt::LinkedCells,
        TraversalOpt::C01,
        DataLayoutOpt::Aos,
        Newton3Opt::Disabled,
        &positions,
    );
    assert_forces_match(&base, &f, 1.5e-12);
}

#[test]
fn soa_matches_aos() {
    let positions = jittered_grid(8, 44);
    let aos = run_forces(
        ContainerOpt::LinkedCells,
        TraversalOpt::C08,
        DataLayoutOpt::Aos,
        Newton3Opt::Enabled,
        &positions,
    );
    let soa = run_forces(
        ContainerOpt::LinkedCells,
        TraversalOpt::C08,
        DataLayoutOpt::Soa,
        Newton3Opt::Enabled,
        &positions,
    );
    assert_forces_match(&aos, &soa, 1.5e-12);
}

#[test]
fn verlet_lists_match_direct_sum() {
    let positions = jittered_grid(8, 45);
    let base = reference(&positions);
    for &layout in &[DataLayoutOpt::Aos, DataLayoutOpt::Soa] {
        for &newton3 in Newton3Opt::all() {
            let f = run_forces(
                ContainerOpt::VerletLists,
                TraversalOpt::Verlet,
                layout,
                newton3,
                &positions,
            );
            assert_forces_match(&base, &f, 1.5e-12);
        }
    }
}

#[test]
fn verlet_clusters_match_direct_sum() {
    // 500 particles, cluster size 32
    let mut positions = jittered_grid(8, 46);
    positions.truncate(500);
    let base = reference(&positions);
    for &newton3 in Newton3Opt::all() {
        let f = run_forces(
            ContainerOpt::VerletClusterLists,
            TraversalOpt::Verlet,
            DataLayoutOpt::Aos,
            newton3,
            &positions,
        );
        assert_forces_match(&base, &f, 1e-12);
    }
}

#[test]
fn sliced_parallel_matches_single_threaded_c08() {
    let positions = jittered_grid(10, 47);
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| {
            run_forces(
                ContainerOpt::LinkedCells,
                TraversalOpt::C08,
                DataLayoutOpt::Aos,
                Newton3Opt::Enabled,
                &positions,
            )
        });
    let sliced = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| {
            run_forces(
                ContainerOpt::LinkedCells,
                TraversalOpt::Sliced,
                DataLayoutOpt::Aos,
                Newton3Opt::Enabled,
                &positions,
            )
        });
    assert_forces_match(&single, &sliced, 1.5e-12);
}

// -- end of file --
