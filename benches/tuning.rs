#![cfg_attr(feature = "nightly", feature(test))]

#[cfg(all(feature = "nightly", test))]
mod bench {
    extern crate test;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use test::Bencher;
    use tuna::real::Real;
    use tuna::{
        ContainerOpt, DataLayoutOpt, LennardJones, Newton3Opt, Particle, TraversalOpt, Tuna,
        TunaConfig,
    };

    const N: usize = 4096;

    fn init(container: ContainerOpt, traversal: TraversalOpt, layout: DataLayoutOpt) -> Tuna {
        let mut rng = StdRng::seed_from_u64(0);
        let mut tuna = Tuna::new(TunaConfig {
            box_min: [0.0; 3],
            box_max: [8.0; 3],
            cutoff: 1.0,
            verlet_skin: 0.2,
            num_samples: 1,
            allowed_containers: vec![container],
            allowed_traversals: vec![traversal],
            allowed_data_layouts: vec![layout],
            allowed_newton3: vec![Newton3Opt::Enabled],
            ..Default::default()
        })
        .unwrap();
        for id in 0..N {
            let pos = [
                rng.gen_range(0.0..8.0) as Real,
                rng.gen_range(0.0..8.0) as Real,
                rng.gen_range(0.0..8.0) as Real,
            ];
            tuna.add_particle(Particle::new(id as u64, pos, [0.0; 3])).unwrap();
        }
        tuna
    }

    #[bench]
    fn linked_cells_c08_aos(b: &mut Bencher) {
        let mut tuna = init(ContainerOpt::LinkedCells, TraversalOpt::C08, DataLayoutOpt::Aos);
        let lj = LennardJones::new(1.0, 1.0, 1.0);
        b.iter(|| tuna.iterate_pairwise(&lj).unwrap());
    }

    #[bench]
    fn linked_cells_c08_soa(b: &mut Bencher) {
        let mut tuna = init(ContainerOpt::LinkedCells, TraversalOpt::C08, DataLayoutOpt::Soa);
        let lj = LennardJones::new(1.0, 1.0, 1.0);
        b.iter(|| tuna.iterate_pairwise(&lj).unwrap());
    }

    #[bench]
    fn linked_cells_sliced_aos(b: &mut Bencher) {
        let mut tuna = init(ContainerOpt::LinkedCells, TraversalOpt::Sliced, DataLayoutOpt::Aos);
        let lj = LennardJones::new(1.0, 1.0, 1.0);
        b.iter(|| tuna.iterate_pairwise(&lj).unwrap());
    }

    #[bench]
    fn verlet_lists_soa(b: &mut Bencher) {
        let mut tuna = init(ContainerOpt::VerletLists, TraversalOpt::Verlet, DataLayoutOpt::Soa);
        let lj = LennardJones::new(1.0, 1.0, 1.0);
        b.iter(|| tuna.iterate_pairwise(&lj).unwrap());
    }
}

// -- end of file --
