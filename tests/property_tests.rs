//! Property-based tests for aco-design
//!
//! Uses proptest to verify invariants of construction, scoring, pheromone
//! maintenance and weight adaptation.

use aco_design::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn random_problem(seed: u64, classes: usize, attributes: usize, methods: usize) -> DesignProblem {
    let mut rng = StdRng::seed_from_u64(seed);
    DesignProblem::random(ProblemKind::Test, classes, attributes, methods, 0.3, &mut rng).unwrap()
}

fn scored_colony(seed: u64, ants: usize) -> Vec<Path> {
    let problem = random_problem(seed, 3, 6, 6);
    let graph = DesignGraph::new(&problem);
    let table = PheromoneTable::new(graph.number_of_elements(), 1.0, ClampPolicy::Unbounded).unwrap();
    let alpha = AlphaTable::from_pheromone(&table, 1.5);
    let ant = Ant::new(&graph, &alpha, 3, false, 50);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut colony: Vec<Path> = construct_colony(&ant, ants, &mut rng)
        .into_iter()
        .map(|o| o.path)
        .collect();
    evaluate_colony(&mut colony, &problem).unwrap();
    colony
}

proptest! {
    // ==================== Construction Properties ====================

    #[test]
    fn path_places_every_element_once(
        seed in any::<u64>(),
        classes in 1usize..6,
        attributes in 1usize..10,
        methods in 1usize..10,
        constraint_handling in any::<bool>()
    ) {
        prop_assume!(classes <= attributes + methods);
        let problem = random_problem(seed, classes, attributes, methods);
        let graph = DesignGraph::new(&problem);
        let table = PheromoneTable::new(graph.number_of_elements(), 1.0, ClampPolicy::mmas()).unwrap();
        let alpha = AlphaTable::from_pheromone(&table, 1.5);
        let ant = Ant::new(&graph, &alpha, classes, constraint_handling, 50);

        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = ant.construct(&mut rng);

        prop_assert!(outcome.attempts >= 1 && outcome.attempts <= 50);
        prop_assert_eq!(outcome.path.number_of_classes(), classes);
        prop_assert_eq!(outcome.path.number_of_elements(), attributes + methods);
        prop_assert!(outcome.path.is_permutation_of(attributes + methods));
    }

    // ==================== Fitness Properties ====================

    #[test]
    fn metrics_stay_in_range(seed in any::<u64>()) {
        for path in scored_colony(seed, 10) {
            let fitness = path.fitness();
            prop_assert!((0.0..=1.0).contains(&fitness.cbo));
            prop_assert!(fitness.elegance_nac >= 0.0);
            prop_assert!(fitness.elegance_atmr >= 0.0);
            prop_assert!((0.0..=1.0).contains(&fitness.cohesion));
        }
    }

    #[test]
    fn ideal_partition_has_zero_cbo(sizes in prop::collection::vec((1usize..4, 1usize..4), 1..6)) {
        let problem = DesignProblem::from_partition(ProblemKind::Test, &sizes).unwrap();
        let attributes = problem.number_of_attributes();

        let mut next_attribute = 0;
        let mut next_method = attributes;
        let classes: Vec<Vec<Vertex>> = sizes
            .iter()
            .map(|&(a, m)| {
                let mut class: Vec<Vertex> = (next_attribute..next_attribute + a).map(Vertex::Attribute).collect();
                class.extend((next_method..next_method + m).map(Vertex::Method));
                next_attribute += a;
                next_method += m;
                class
            })
            .collect();

        let fitness = evaluate_design(&Path::from_classes(classes), &problem).unwrap();
        prop_assert!(fitness.cbo.abs() < 1e-12);
    }

    // ==================== Pheromone Properties ====================

    #[test]
    fn uniform_evaporation_is_scalar_multiply(
        size in 1usize..8,
        initial in 0.1f64..10.0,
        rho in 0.0f64..0.99
    ) {
        let mut table = PheromoneTable::new(size, initial, ClampPolicy::Unbounded).unwrap();
        let before = table.to_rows();
        evaporate(&mut table, rho, false);

        for (i, row) in before.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                prop_assert!((table.get(i, j) - value * (1.0 - rho)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn mmas_deposit_stays_within_bounds(
        seed in any::<u64>(),
        initial in 0.5f64..3.5,
        mu in 0.5f64..4.0
    ) {
        let colony = scored_colony(seed, 6);
        let config = AcoConfig { mu, ..AcoConfig::mmas() };
        let updater = PheromoneUpdater::new(&config, ProblemKind::Test);
        let mut table = PheromoneTable::new(12, initial, ClampPolicy::mmas()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..20 {
            updater.update(&mut table, &colony, &[], &Weights::cbo_only(), &mut rng);
        }
        prop_assert!(table.min() >= 0.5 - 1e-12);
        prop_assert!(table.max() <= 3.5 + 1e-12);
    }

    // ==================== Weight Properties ====================

    #[test]
    fn adapted_weights_sum_to_one(
        cbo in -100.0f64..100.0,
        nac in -100.0f64..100.0,
        atmr in -100.0f64..100.0
    ) {
        match Weights::from_coefficients([cbo, nac, atmr]) {
            WeightAdaptation::Updated(weights) => {
                prop_assert!(weights.is_normalised());
                prop_assert!(weights.check_sum());
            }
            WeightAdaptation::Reset => prop_assert!(cbo == 0.0 || nac == 0.0 || atmr == 0.0),
            WeightAdaptation::Unchanged => prop_assert!(false, "finite coefficients must adapt"),
        }
    }

    // ==================== Pareto Properties ====================

    #[test]
    fn domination_counts_match_pairwise_dominance(
        vectors in prop::collection::vec((0.0f64..1.0, 0.0f64..5.0, 0.0f64..5.0), 1..20)
    ) {
        let mut colony: Vec<Path> = vectors
            .iter()
            .map(|&(cbo, nac, atmr)| {
                let mut path = Path::new(PathRole::Design);
                path.set_fitness(PathFitness {
                    cbo,
                    elegance_nac: nac,
                    elegance_atmr: atmr,
                    ..PathFitness::default()
                });
                path
            })
            .collect();
        calculate_domination_counts(&mut colony);

        let objectives: Vec<[f64; 3]> = colony.iter().map(Path::objectives).collect();
        let dominating_pairs = objectives
            .iter()
            .flat_map(|a| objectives.iter().map(move |b| dominates(a, b)))
            .filter(|&d| d)
            .count();
        let total: usize = colony.iter().map(Path::domination_count).sum();
        prop_assert_eq!(total, dominating_pairs);

        prop_assert!(!paths_with_domination_count(&colony, 0).is_empty());
    }
}
