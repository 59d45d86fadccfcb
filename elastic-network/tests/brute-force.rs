use std::collections::BTreeMap;

use approx::assert_relative_eq;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use elastic_network::{ElasticNetwork, Error, NetworkParameters};

/// Compute all pairs closer than `cutoff` by checking every pair of particles.
/// Positive `lengths` are periodic axes.
fn all_pairs(positions: &[Vec<f64>], lengths: &[f64], cutoff: f64) -> BTreeMap<(usize, usize), f64> {
    let mut pairs = BTreeMap::new();
    for i in 0..positions.len() {
        for j in 0..i {
            let mut distance2 = 0.0;
            for (axis, &length) in lengths.iter().enumerate() {
                let mut delta = positions[j][axis] - positions[i][axis];
                if length > 0.0 {
                    delta -= f64::round(delta / length) * length;
                }
                distance2 += delta * delta;
            }

            let distance = f64::sqrt(distance2);
            if distance <= cutoff {
                pairs.insert((i, j), distance);
            }
        }
    }
    return pairs;
}

fn random_positions(rng: &mut StdRng, n_particles: usize, extents: &[f64]) -> Vec<Vec<f64>> {
    (0..n_particles).map(|_| {
        extents.iter().map(|&extent| rng.gen_range(-0.5 * extent..0.5 * extent)).collect()
    }).collect()
}

fn check_against_brute_force(positions: &[Vec<f64>], lengths: &[f64], cutoff: f64) {
    let network = ElasticNetwork::new(NetworkParameters {
        cutoff: cutoff,
        spring_constant: 4.2,
        box_lengths: lengths.to_vec(),
        dimension: lengths.len(),
        offset: 0,
        parallel: false,
    }).unwrap();

    let rows = positions.iter().map(|p| Ok::<_, Error>(p.clone()));
    let bonds = network.bonds(positions.len(), rows).unwrap();

    let expected = all_pairs(positions, lengths, cutoff);

    let mut found = BTreeMap::new();
    for bond in &bonds {
        assert!(bond.first > bond.second);
        assert!(bond.distance <= cutoff);
        assert_eq!(bond.spring_constant, 4.2);

        let previous = found.insert((bond.first, bond.second), bond.distance);
        assert!(previous.is_none(), "pair {:?} found twice", (bond.first, bond.second));
    }

    assert_eq!(
        found.keys().collect::<Vec<_>>(),
        expected.keys().collect::<Vec<_>>(),
        "lengths = {:?}, cutoff = {}", lengths, cutoff
    );

    for (pair, distance) in &found {
        assert_relative_eq!(*distance, expected[pair], max_relative = 1e-12);
    }
}

#[test]
fn periodic() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for lengths in [vec![7.0], vec![6.0, 9.0], vec![5.0, 6.0, 7.0]] {
        for cutoff in [0.5, 1.0, 1.6] {
            let positions = random_positions(&mut rng, 150, &lengths);
            check_against_brute_force(&positions, &lengths, cutoff);
        }
    }
}

#[test]
fn open() {
    let mut rng = StdRng::seed_from_u64(42);
    for extents in [vec![10.0], vec![6.0, 3.0], vec![4.0, 5.0, 6.0]] {
        let lengths = vec![-1.0; extents.len()];
        for cutoff in [0.3, 1.0, 2.5] {
            let positions = random_positions(&mut rng, 150, &extents);
            check_against_brute_force(&positions, &lengths, cutoff);
        }
    }
}

#[test]
fn mixed() {
    let mut rng = StdRng::seed_from_u64(1234);
    for lengths in [vec![5.0, -1.0], vec![-1.0, 6.0], vec![5.0, -1.0, 4.0], vec![-1.0, 6.0, -1.0]] {
        let extents = lengths.iter().map(|&l| if l > 0.0 { l } else { 8.0 }).collect::<Vec<_>>();
        for cutoff in [0.7, 1.3] {
            let positions = random_positions(&mut rng, 200, &extents);
            check_against_brute_force(&positions, &lengths, cutoff);
        }
    }
}

#[test]
fn small_periodic_boxes() {
    // exactly three cells along each axis
    let mut rng = StdRng::seed_from_u64(7);
    let lengths = vec![3.0, 3.0, 3.0];
    let positions = random_positions(&mut rng, 100, &lengths);
    check_against_brute_force(&positions, &lengths, 1.0);
}

#[test]
fn positions_outside_periodic_box() {
    // positions between 0 and L instead of -L/2 and L/2
    let mut rng = StdRng::seed_from_u64(99);
    let lengths = vec![6.0, 8.0];
    let positions = (0..150).map(|_| {
        vec![rng.gen_range(0.0..6.0), rng.gen_range(0.0..8.0)]
    }).collect::<Vec<_>>();
    check_against_brute_force(&positions, &lengths, 1.2);
}

#[test]
fn pairs_at_cutoff_on_cell_boundaries() {
    // box lengths are exact multiples of the cutoff, and one particle of each
    // pair sits on a cell boundary
    let mut rng = StdRng::seed_from_u64(0xb0b);
    for _ in 0..200 {
        let cutoff = rng.gen_range(0.1..5.0);
        for k in 3..12 {
            let length = k as f64 * cutoff;
            for m in 0..k {
                let x = -0.5 * length + m as f64 * cutoff;
                let far = -0.5 * length + 0.5 * cutoff;

                // periodic, including a copy of the pair across the boundary
                let positions = vec![vec![x], vec![x + cutoff], vec![x + cutoff - length]];
                check_against_brute_force(&positions, &[length], cutoff);

                let positions = vec![vec![x], vec![x + cutoff], vec![far]];
                check_against_brute_force(&positions, &[-1.0], cutoff);
            }
        }
    }

    // the same in three dimensions, along the diagonal of the cells
    for k in 3..8 {
        let cutoff = 1.1;
        let length = k as f64 * cutoff;
        let mut positions = Vec::new();
        for m in 0..k {
            let x = -0.5 * length + m as f64 * cutoff;
            positions.push(vec![x, x, 0.0]);
            positions.push(vec![x + cutoff, x, 0.0]);
            positions.push(vec![x, x + cutoff, 0.0]);
        }
        check_against_brute_force(&positions, &[length, length, length], cutoff);
        check_against_brute_force(&positions, &[-1.0, -1.0, -1.0], cutoff);
    }
}

#[test]
fn clustered() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut positions = Vec::new();
    for center in [[-3.0, -3.0, 0.0], [2.0, 2.5, 1.0]] {
        for _ in 0..80 {
            positions.push(vec![
                center[0] + rng.gen_range(-0.5..0.5),
                center[1] + rng.gen_range(-0.5..0.5),
                center[2] + rng.gen_range(-0.5..0.5),
            ]);
        }
    }

    check_against_brute_force(&positions, &[-1.0, -1.0, -1.0], 0.4);
    check_against_brute_force(&positions, &[10.0, 10.0, -1.0], 0.4);
}
