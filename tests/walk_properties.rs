use hashbrown::HashMap;
use proptest::prelude::*;
use rand::prelude::*;
use rand_xorshift::XorShiftRng;

use rambler::{
    generate_walks, partition_num, AliasTable, EdgeType, Graph, GraphBuilder, RejectionSampler,
    TransitionModel, WalkConfig, WalkStrategy, CSR,
};

// 99.9% critical values of the chi-square distribution, indexed by degrees of freedom - 1
const CHI2_CRITICAL: [f64; 10] = [
    10.83, 13.82, 16.27, 18.47, 20.52, 22.46, 24.32, 26.12, 27.88, 29.59,
];

fn chi_square(counts: &[usize], probs: &[f32]) -> f64 {
    let total = counts.iter().sum::<usize>() as f64;
    counts.iter().zip(probs.iter())
        .filter(|(_, p)| **p > 0.)
        .map(|(c, p)| {
            let expected = total * *p as f64;
            (*c as f64 - expected).powi(2) / expected
        })
        .sum()
}

fn assert_fits(counts: &[usize], probs: &[f32]) {
    let bins = probs.iter().filter(|p| **p > 0.).count();
    let stat = chi_square(counts, probs);
    assert!(stat < CHI2_CRITICAL[bins - 2], "chi2={} counts={:?} probs={:?}", stat, counts, probs);
}

fn undirected(edges: &[(usize, usize, f32)]) -> CSR {
    let edges = edges.iter()
        .flat_map(|(f, t, w)| vec![(*f, *t, *w), (*t, *f, *w)])
        .collect();
    CSR::construct_from_edges(edges)
}

fn complete_graph(k: usize) -> CSR {
    let mut edges = Vec::new();
    for f in 0..k {
        for t in 0..k {
            if f != t {
                edges.push((f, t, 1.));
            }
        }
    }
    CSR::construct_from_edges(edges)
}

#[test]
fn alias_table_converges() {
    let distributions: Vec<Vec<f32>> = vec![
        vec![0.125; 8],
        vec![0.9, 0.05, 0.03, 0.02],
        vec![0.9999, 0.0001],
        vec![0.05, 0.15, 0.3, 0.1, 0.4],
    ];

    for (i, probs) in distributions.iter().enumerate() {
        let table = AliasTable::new(probs).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(100 + i as u64);
        let mut counts = vec![0usize; probs.len()];
        for _ in 0..200_000 {
            counts[table.sample(&mut rng)] += 1;
        }
        assert_fits(&counts, probs);
    }
}

#[test]
fn alias_table_edge_cases() {
    let table = AliasTable::new(&[1.]).unwrap();
    let mut rng = XorShiftRng::seed_from_u64(1);
    assert!((0..1000).all(|_| table.sample(&mut rng) == 0));

    assert!(AliasTable::new(&[0.3, 0.3]).is_err());
    assert!(AliasTable::new(&[0.6, 0.6]).is_err());
}

#[test]
fn deepwalk_uniform_on_complete_graph() {
    let k = 6;
    let graph = complete_graph(k);
    let strategy = WalkStrategy::deepwalk();
    let mut rng = XorShiftRng::seed_from_u64(7);
    let mut counts = vec![0usize; k];
    for _ in 0..60_000 {
        let walk = strategy.walk(&graph, 0, 4, &mut rng).unwrap();
        assert_eq!(walk.len(), 4);
        walk.windows(2).for_each(|w| assert_ne!(w[0], w[1]));
        counts[walk[1]] += 1;
    }
    assert_eq!(counts[0], 0);
    let mut probs = vec![1. / (k - 1) as f32; k];
    probs[0] = 0.;
    assert_fits(&counts, &probs);
}

fn second_step_counts(strategy: &WalkStrategy, graph: &CSR, prev: usize, cur: usize, seed: u64) -> Vec<usize> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut counts = vec![0usize; graph.len()];
    let mut found = 0;
    while found < 40_000 {
        let walk = strategy.walk(graph, prev, 3, &mut rng).unwrap();
        if walk.len() == 3 && walk[1] == cur {
            counts[walk[2]] += 1;
            found += 1;
        }
    }
    counts
}

#[test]
fn unbiased_node2vec_matches_deepwalk() {
    // A square 0-1-2-3 with the diagonal 1-3 and a tail 3-4
    let graph = undirected(&[(0, 1, 1.), (1, 2, 1.), (2, 3, 1.), (3, 0, 1.), (1, 3, 1.), (3, 4, 1.)]);
    let exact = WalkStrategy::Node2VecExact(TransitionModel::second_order(&graph, 1., 1.).unwrap());
    let deepwalk = WalkStrategy::deepwalk();

    let deg = graph.degree(3) as f32;
    let mut probs = vec![0f32; graph.len()];
    graph.get_edges(3).0.iter().for_each(|n| probs[*n] = 1. / deg);

    assert_fits(&second_step_counts(&exact, &graph, 1, 3, 21), &probs);
    assert_fits(&second_step_counts(&deepwalk, &graph, 1, 3, 22), &probs);
}

#[test]
fn rejection_sampling_matches_exact_tables() {
    // Directed graph, so "neighbor of the previous node" is direction sensitive
    let edges = vec![
        (0, 1, 1.), (1, 0, 1.), (1, 2, 2.), (1, 3, 1.), (1, 4, 0.5),
        (0, 2, 1.), (3, 0, 1.), (2, 1, 1.), (4, 1, 3.), (1, 1, 1.),
    ];
    let graph = CSR::construct_from_edges(edges);

    for (p, q) in [(0.2, 1.5), (3., 0.3), (0.5, 0.5), (1., 4.)] {
        let exact = TransitionModel::second_order(&graph, p, q).unwrap();
        let expected: Vec<f32> = {
            let mut probs = vec![0f32; graph.len()];
            exact.second_step_distribution(&graph, 0, 1).into_iter()
                .for_each(|(n, prob)| probs[n] = prob);
            probs
        };

        let sampler = RejectionSampler::new(TransitionModel::first_order(&graph).unwrap(), p, q);
        let mut rng = XorShiftRng::seed_from_u64(31);
        let mut counts = vec![0usize; graph.len()];
        for _ in 0..100_000 {
            let next = sampler.sample(&graph, 0, 1, &mut rng).unwrap().unwrap();
            counts[next] += 1;
        }
        assert_fits(&counts, &expected);
    }
}

#[test]
fn isolated_node_walks_have_length_one() {
    let mut builder = GraphBuilder::new(EdgeType::Undirected);
    builder.add_edge("a", "b", None).unwrap();
    builder.add_node("lonely");
    let graph = builder.build();

    let config = WalkConfig { p: 2., q: 0.5, num_walks: 4, walk_length: 10, ..WalkConfig::default() };
    let walks = graph.generate_walks(&config).unwrap();
    assert_eq!(walks.len(), 12);
    let lonely: Vec<_> = walks.iter().filter(|w| w[0] == "lonely").collect();
    assert_eq!(lonely.len(), 4);
    assert!(lonely.iter().all(|w| w.len() == 1));
}

#[test]
fn zero_weight_graph_walks_stop_immediately() {
    let mut builder = GraphBuilder::new(EdgeType::Undirected);
    builder.add_edge("x", "y", Some(0.)).unwrap();
    let graph = builder.build();

    let config = WalkConfig { walk_length: 4, num_walks: 3, ..WalkConfig::default() };
    let walks = graph.generate_walks(&config).unwrap();
    assert_eq!(walks.len(), 6);
    assert!(walks.iter().all(|w| w.len() == 1), "{:?}", walks);
}

#[test]
fn weighted_path_scenario() {
    let mut builder = GraphBuilder::new(EdgeType::Undirected);
    builder.add_edge("A", "B", Some(2.)).unwrap();
    builder.add_edge("B", "C", Some(1.)).unwrap();
    let graph = builder.build();

    let runs = 3000;
    let mut to_a = 0;
    for seed in 0..runs {
        let config = WalkConfig { walk_length: 3, num_walks: 1, workers: 1, seed, ..WalkConfig::default() };
        let walks = graph.generate_walks(&config).unwrap();
        assert_eq!(walks.len(), 3);

        let mut starts: Vec<_> = walks.iter().map(|w| w[0]).collect();
        starts.sort();
        assert_eq!(starts, vec!["A", "B", "C"]);

        for walk in walks.iter() {
            assert_eq!(walk.len(), 3);
            match walk[0] {
                "A" => assert_eq!(walk[1], "B"),
                "B" => if walk[1] == "A" { to_a += 1 },
                _ => {}
            }
        }
    }
    let emp = to_a as f32 / runs as f32;
    assert!((emp - 2. / 3.).abs() < 0.03, "emp={}", emp);
}

#[test]
fn integer_node_identifiers() {
    let mut builder = GraphBuilder::new(EdgeType::Directed);
    builder.add_edge(10u64, 20u64, Some(1.)).unwrap();
    builder.add_edge(20u64, 30u64, Some(1.)).unwrap();
    let graph = builder.build();
    let config = WalkConfig { walk_length: 5, num_walks: 2, workers: 2, ..WalkConfig::default() };
    let walks = graph.generate_walks(&config).unwrap();
    assert_eq!(walks.len(), 6);
    assert!(walks.iter().filter(|w| w[0] == 10).all(|w| w == &vec![10, 20, 30]));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn partition_covers_total(total in 0usize..500, workers in 1usize..32) {
        let shares = partition_num(total, workers);
        prop_assert_eq!(shares.len(), workers);
        prop_assert_eq!(shares.iter().sum::<usize>(), total);
        let max = *shares.iter().max().unwrap();
        let min = *shares.iter().min().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert!(shares.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn corpus_size_independent_of_workers(
        edges in proptest::collection::vec((0usize..12, 0usize..12, 0.1f32..5.), 1..40),
        num_walks in 1usize..5,
        workers in 1usize..6,
        rejection in any::<bool>(),
    ) {
        let graph = CSR::construct_from_edges(edges);
        let config = WalkConfig {
            p: 0.5,
            q: 2.,
            use_rejection_sampling: rejection,
            walk_length: 6,
            num_walks,
            workers,
            ..WalkConfig::default()
        };
        let walks = generate_walks(&graph, &config).unwrap();
        prop_assert_eq!(walks.len(), num_walks * graph.len());

        let mut starts = HashMap::new();
        walks.iter().for_each(|w| *starts.entry(w[0]).or_insert(0usize) += 1);
        prop_assert!((0..graph.len()).all(|n| starts.get(&n) == Some(&num_walks)));

        for walk in walks.iter() {
            prop_assert!(!walk.is_empty() && walk.len() <= 6);
            prop_assert!(walk.windows(2).all(|w| graph.has_edge(w[0], w[1])));
            if walk.len() < 6 {
                prop_assert_eq!(graph.degree(walk[walk.len() - 1]), 0);
            }
        }
    }
}
