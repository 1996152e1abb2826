//! End-to-end scenarios through the public entry points.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tuna::real::Real;
use tuna::{
    ContainerOpt, DataLayoutOpt, IterBehavior, LennardJones, Newton3Opt, Particle, TraversalOpt,
    Tuna, TunaConfig,
};

fn base_config() -> TunaConfig {
    TunaConfig {
        box_min: [0.0; 3],
        box_max: [10.0; 3],
        cutoff: 1.0,
        verlet_skin: 0.2,
        num_samples: 1,
        allowed_containers: vec![ContainerOpt::LinkedCells],
        allowed_traversals: vec![TraversalOpt::C08],
        allowed_data_layouts: vec![DataLayoutOpt::Aos],
        allowed_newton3: vec![Newton3Opt::Enabled],
        ..Default::default()
    }
}

fn random_positions(n: usize, lo: Real, hi: Real, seed: u64) -> Vec<[Real; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            [
                rng.gen_range(lo..hi),
                rng.gen_range(lo..hi),
                rng.gen_range(lo..hi),
            ]
        })
        .collect()
}

/// Eight particles on the corners of a unit cube, Lennard-Jones with
/// epsilon = sigma = 1 and a cutoff covering every pair: all particles see
/// the same environment, so the force magnitudes agree and the total
/// force vanishes.
#[test]
fn unit_cube_of_lj_particles() {
    let mut tuna = Tuna::new(TunaConfig {
        box_min: [0.0; 3],
        box_max: [4.0; 3],
        cutoff: 3.0,
        verlet_skin: 0.2,
        allowed_containers: vec![ContainerOpt::DirectSum],
        allowed_traversals: vec![TraversalOpt::DirectSum],
        allowed_data_layouts: vec![DataLayoutOpt::Aos],
        allowed_newton3: vec![Newton3Opt::Enabled],
        ..Default::default()
    })
    .unwrap();

    let mut id = 0;
    for x in 0..2 {
        for y in 0..2 {
            for z in 0..2 {
                let pos = [1.0 + x as Real, 1.0 + y as Real, 1.0 + z as Real];
                tuna.add_particle(Particle::new(id, pos, [0.0; 3])).unwrap();
                id += 1;
            }
        }
    }

    let lj = LennardJones::new(3.0, 1.0, 1.0);
    tuna.iterate_pairwise(&lj).unwrap();

    let forces: Vec<[Real; 3]> = tuna.iter(IterBehavior::OwnedOnly).map(|p| p.force).collect();
    assert_eq!(forces.len(), 8);

    let mut total = [0.0 as Real; 3];
    for f in &forces {
        for k in 0..3 {
            total[k] += f[k];
        }
    }
    for k in 0..3 {
        assert!(total[k].abs() < 1e-10, "net force {:?}", total);
    }

    let norms: Vec<Real> = forces
        .iter()
        .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
        .collect();
    assert!(norms[0] > 0.0);
    for n in &norms {
        assert!((n - norms[0]).abs() < 1e-10 * norms[0]);
    }
}

/// Scenario: particles pushed over the lower x face leave the container
/// and are handed back; the remaining owned set stays inside the box.
#[test]
fn halo_round_trip() {
    let mut tuna = Tuna::new(base_config()).unwrap();
    let positions = random_positions(1000, 0.0, 10.0, 123);
    for (id, &pos) in positions.iter().enumerate() {
        tuna.add_particle(Particle::new(id as u64, pos, [0.0; 3])).unwrap();
    }

    let to_move = positions.iter().filter(|p| p[0] < 0.5).count();
    assert!(to_move > 0);
    for p in tuna.iter_mut(IterBehavior::OwnedOnly) {
        if p.pos[0] < 0.5 {
            p.pos[0] = -0.25;
        }
    }

    let leavers = tuna.update_container();
    assert_eq!(leavers.len(), to_move);
    for p in &leavers {
        assert!(p.pos[0] < 0.0);
    }
    assert!(tuna.iter(IterBehavior::OwnedOnly).all(|p| p.pos[0] >= 0.0));
    assert_eq!(tuna.num_particles(), 1000 - to_move);
}

/// Scenario: two allowed configurations, three samples each. After six
/// traversals the selection is stable, stays fixed over the tuning
/// interval, and then reevaluates.
#[test]
fn tuner_settles_then_retunes() {
    let mut cfg = base_config();
    cfg.allowed_traversals = vec![TraversalOpt::C08, TraversalOpt::Sliced];
    cfg.num_samples = 3;
    cfg.tuning_interval = 100;
    let mut tuna = Tuna::new(cfg).unwrap();
    for (id, &pos) in random_positions(200, 0.0, 10.0, 7).iter().enumerate() {
        tuna.add_particle(Particle::new(id as u64, pos, [0.0; 3])).unwrap();
    }

    let lj = LennardJones::new(1.0, 1.0, 1.0);
    for _ in 0..6 {
        assert!(tuna.is_tuning());
        tuna.iterate_pairwise(&lj).unwrap();
    }
    assert!(!tuna.is_tuning());
    let chosen = tuna.current_configuration();

    for _ in 0..100 {
        tuna.iterate_pairwise(&lj).unwrap();
        assert_eq!(tuna.current_configuration(), chosen);
    }
    tuna.iterate_pairwise(&lj).unwrap();
    assert!(tuna.is_tuning());
}

/// Every non-dummy particle appears exactly once, whatever the container.
#[test]
fn iterator_completeness() {
    for &container in ContainerOpt::all() {
        let mut cfg = base_config();
        cfg.allowed_containers = vec![container];
        cfg.allowed_traversals = TraversalOpt::all().to_vec();
        let mut tuna = Tuna::new(cfg).unwrap();

        for (id, &pos) in random_positions(300, 0.0, 10.0, 31).iter().enumerate() {
            tuna.add_particle(Particle::new(id as u64, pos, [0.0; 3])).unwrap();
        }
        for i in 0..50u64 {
            let pos = [-0.5, 0.02 * i as Real * 9.0 + 0.1, 5.0];
            tuna.add_halo_particle(Particle::new(1000 + i, pos, [0.0; 3])).unwrap();
        }

        // run once so cluster containers build their dummy padding
        let lj = LennardJones::new(1.0, 1.0, 1.0);
        tuna.iterate_pairwise(&lj).unwrap();

        let ids: Vec<u64> = tuna.iter(IterBehavior::HaloAndOwned).map(|p| p.id).collect();
        let unique: HashSet<u64> = ids.iter().cloned().collect();
        assert_eq!(ids.len(), 350, "container {}", container);
        assert_eq!(unique.len(), 350, "container {}", container);
        assert_eq!(tuna.iter(IterBehavior::OwnedOnly).count(), 300);
        assert_eq!(tuna.iter(IterBehavior::HaloOnly).count(), 50);

        // region iterator: superset within the queried box
        let lo = [2.0, 2.0, 2.0];
        let hi = [5.0, 5.0, 5.0];
        let in_region: HashSet<u64> = tuna
            .region_iter(lo, hi, IterBehavior::OwnedOnly)
            .map(|p| p.id)
            .collect();
        for p in tuna.iter(IterBehavior::OwnedOnly) {
            let inside = (0..3).all(|k| p.pos[k] >= lo[k] && p.pos[k] < hi[k]);
            if inside {
                assert!(in_region.contains(&p.id), "container {}", container);
            }
        }
    }
}

/// Adding a particle and flushing it out again leaves every other force
/// untouched up to accumulation rounding.
#[test]
fn add_then_remove_is_a_no_op() {
    let positions = random_positions(100, 1.0, 9.0, 77);
    let lj = LennardJones::new(1.0, 1.0, 1.0);

    let run = |with_extra: bool| -> Vec<(u64, [Real; 3])> {
        let mut tuna = Tuna::new(base_config()).unwrap();
        for (id, &pos) in positions.iter().enumerate() {
            tuna.add_particle(Particle::new(id as u64, pos, [0.0; 3])).unwrap();
        }
        if with_extra {
            tuna.add_particle(Particle::new(999, [5.0, 5.0, 5.0], [0.0; 3])).unwrap();
            for p in tuna.iter_mut(IterBehavior::OwnedOnly) {
                if p.id == 999 {
                    p.pos = [-1.0, 5.0, 5.0];
                }
            }
            let leavers = tuna.update_container();
            assert_eq!(leavers.len(), 1);
        }
        tuna.iterate_pairwise(&lj).unwrap();
        let mut out: Vec<_> = tuna
            .iter(IterBehavior::OwnedOnly)
            .map(|p| (p.id, p.force))
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    };

    let without = run(false);
    let with = run(true);
    assert_eq!(without.len(), with.len());
    for ((ida, fa), (idb, fb)) in without.iter().zip(with.iter()) {
        assert_eq!(ida, idb);
        for k in 0..3 {
            let scale = fa[k].abs().max(1.0);
            assert!((fa[k] - fb[k]).abs() <= 1e-10 * scale);
        }
    }
}

/// Insertion order does not matter for a commutative force accumulator.
#[test]
fn insertion_order_is_irrelevant() {
    let positions = random_positions(150, 1.0, 9.0, 55);
    let lj = LennardJones::new(1.0, 1.0, 1.0);

    let run = |order: &[usize]| -> Vec<(u64, [Real; 3])> {
        let mut tuna = Tuna::new(base_config()).unwrap();
        for &i in order {
            tuna.add_particle(Particle::new(i as u64, positions[i], [0.0; 3]))
                .unwrap();
        }
        tuna.iterate_pairwise(&lj).unwrap();
        let mut out: Vec<_> = tuna
            .iter(IterBehavior::OwnedOnly)
            .map(|p| (p.id, p.force))
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    };

    let forward: Vec<usize> = (0..positions.len()).collect();
    let mut shuffled = forward.clone();
    // deterministic shuffle
    let mut rng = StdRng::seed_from_u64(5);
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }

    let a = run(&forward);
    let b = run(&shuffled);
    for ((ida, fa), (idb, fb)) in a.iter().zip(b.iter()) {
        assert_eq!(ida, idb);
        for k in 0..3 {
            let scale = fa[k].abs().max(1.0);
            assert!((fa[k] - fb[k]).abs() <= 1e-10 * scale);
        }
    }
}

/// Global potential energy through the functor, including the
/// postprocessing gate.
#[test]
fn potential_energy_through_the_facade() {
    let mut tuna = Tuna::new(base_config()).unwrap();
    tuna.add_particle(Particle::new(0, [4.0, 5.0, 5.0], [0.0; 3])).unwrap();
    tuna.add_particle(Particle::new(1, [4.9, 5.0, 5.0], [0.0; 3])).unwrap();

    let lj = LennardJones::with_globals(1.0, 1.0, 1.0);
    assert!(lj.upot().is_err());
    tuna.iterate_pairwise(&lj).unwrap();

    // r = 0.9: u = 4 ((1/r)^12 - (1/r)^6)
    let sr6 = (1.0 as Real / 0.9 as Real).powi(6);
    let expected = 4.0 * (sr6 * sr6 - sr6);
    let got = lj.upot().unwrap();
    assert!(
        (got - expected).abs() < 1e-12 * expected.abs(),
        "upot {} vs {}",
        got,
        expected
    );
}

// -- end of file --
