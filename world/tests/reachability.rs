use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tactics_grid_core::{MapCoord, MapError, MovementBudget, PathError, TileDescriptor};
use tactics_grid_world::{
    self as world, query, AdjacencyRule, MapLayout, MapSource, Topology, World,
};

struct Fixture {
    layout: MapLayout,
}

impl MapSource for Fixture {
    fn resolve(&self, _name: &str) -> Result<MapLayout, MapError> {
        Ok(self.layout.clone())
    }
}

fn load_grid(columns: i32, rows: i32, blocked: &[MapCoord], topology: Topology) -> World {
    let tiles = (0..rows)
        .flat_map(|y| (0..columns).map(move |x| MapCoord::new(x, y)))
        .map(|coord| TileDescriptor::new(coord, !blocked.contains(&coord)))
        .collect();
    let fixture = Fixture {
        layout: MapLayout::new(topology, tiles),
    };

    let mut world = World::new();
    let mut events = Vec::new();
    world::load(&mut world, &fixture, "fixture", &mut events).expect("fixture loads");
    world
}

fn random_world(seed: u64, columns: i32, rows: i32, density: f64) -> World {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut blocked = Vec::new();
    for y in 0..rows {
        for x in 0..columns {
            if rng.gen_bool(density) {
                blocked.push(MapCoord::new(x, y));
            }
        }
    }
    load_grid(columns, rows, &blocked, Topology::Orthogonal)
}

/// Exact distances by relaxing every edge until nothing improves.
fn relaxed_distances(world: &World, from: MapCoord) -> HashMap<MapCoord, u32> {
    let grid = query::grid(world);
    let topology = query::topology(world);
    let mut distances = HashMap::new();
    if !grid.is_passable(from) {
        return distances;
    }
    let _ = distances.insert(from, 0_u32);

    loop {
        let mut changed = false;
        let tiles: Vec<MapCoord> = grid
            .iter()
            .filter(|tile| tile.is_passable())
            .map(|tile| tile.coord())
            .collect();
        for cell in tiles {
            let Some(&distance) = distances.get(&cell) else {
                continue;
            };
            for neighbor in topology.neighbors(cell) {
                if !grid.is_passable(neighbor) {
                    continue;
                }
                let candidate = distance + 1;
                if distances.get(&neighbor).map_or(true, |known| candidate < *known) {
                    let _ = distances.insert(neighbor, candidate);
                    changed = true;
                }
            }
        }
        if !changed {
            return distances;
        }
    }
}

#[test]
fn open_grid_scenario_reaches_twelve_tiles() {
    let world = load_grid(5, 5, &[], Topology::Orthogonal);
    let origin = MapCoord::new(2, 2);

    let reachable = query::reachable(&world, origin, MovementBudget::new(2));

    assert_eq!(reachable.len(), 12);
    for (cell, cost) in reachable.iter() {
        assert_eq!(cost, cell.manhattan_distance(origin));
        assert!(cost == 1 || cost == 2);
    }

    let path = query::path(&world, origin, MapCoord::new(2, 4), MovementBudget::new(2))
        .expect("straight path");
    assert_eq!(path.steps(), &[MapCoord::new(2, 3), MapCoord::new(2, 4)]);
}

#[test]
fn blocked_column_pushes_destination_out_of_budget() {
    let world = load_grid(5, 5, &[MapCoord::new(2, 3)], Topology::Orthogonal);
    let origin = MapCoord::new(2, 2);
    let destination = MapCoord::new(2, 4);
    let budget = MovementBudget::new(3);

    let reachable = query::reachable(&world, origin, budget);
    assert!(!reachable.contains(destination));
    assert!(!reachable.contains(MapCoord::new(2, 3)));

    assert_eq!(
        query::path(&world, origin, destination, budget),
        Err(PathError::Unreachable {
            from: origin,
            to: destination,
            budget,
        })
    );

    let detour = query::reachable(&world, origin, MovementBudget::new(4));
    assert_eq!(detour.cost(destination), Some(4));
}

#[test]
fn reachable_costs_match_relaxed_distances() {
    for seed in 0..24_u64 {
        let world = random_world(seed, 9, 7, 0.25);
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
        let origin = MapCoord::new(rng.gen_range(0..9), rng.gen_range(0..7));
        let budget = MovementBudget::new(rng.gen_range(0..8));

        let reachable = query::reachable(&world, origin, budget);
        let exact = relaxed_distances(&world, origin);

        for (cell, cost) in reachable.iter() {
            assert!(query::grid(&world).is_passable(cell));
            assert_eq!(exact.get(&cell), Some(&cost), "seed {seed}: cost of {cell}");
        }

        for (cell, distance) in &exact {
            let expected = *distance >= 1 && *distance <= budget.get();
            assert_eq!(
                reachable.contains(*cell),
                expected,
                "seed {seed}: membership of {cell} at distance {distance}"
            );
        }
    }
}

#[test]
fn larger_budgets_only_add_tiles() {
    for seed in 0..16_u64 {
        let world = random_world(seed, 8, 8, 0.3);
        let origin = MapCoord::new(4, 4);

        for budget in 0..6 {
            let smaller = query::reachable(&world, origin, MovementBudget::new(budget));
            let larger = query::reachable(&world, origin, MovementBudget::new(budget + 1));
            for (cell, cost) in smaller.iter() {
                assert_eq!(larger.cost(cell), Some(cost), "seed {seed}, budget {budget}");
            }
        }
    }
}

#[test]
fn every_reachable_destination_has_a_valid_path() {
    for seed in 0..16_u64 {
        let world = random_world(seed, 8, 6, 0.2);
        let topology = query::topology(&world);
        let origin = MapCoord::new(3, 3);
        let budget = MovementBudget::new(5);
        let reachable = query::reachable(&world, origin, budget);

        for (destination, cost) in reachable.iter() {
            let path = query::trace_path(&world, &reachable, origin, destination, budget)
                .unwrap_or_else(|error| panic!("seed {seed}: {error}"));

            assert_eq!(path.len(), cost as usize);
            assert_eq!(path.destination(), Some(destination));

            let mut previous = origin;
            for &step in path.steps() {
                assert!(topology.is_adjacent(previous, step));
                assert!(query::grid(&world).is_passable(step));
                previous = step;
            }
        }
    }
}

#[test]
fn destinations_outside_the_set_are_rejected() {
    for seed in 0..8_u64 {
        let world = random_world(seed, 7, 7, 0.3);
        let origin = MapCoord::new(0, 0);
        let budget = MovementBudget::new(3);
        let reachable = query::reachable(&world, origin, budget);

        for tile in query::tiles(&world) {
            let destination = tile.coord();
            if destination == origin || reachable.contains(destination) {
                continue;
            }
            assert!(matches!(
                query::path(&world, origin, destination, budget),
                Err(PathError::Unreachable { .. })
            ));
        }
    }
}

#[test]
fn hex_paths_are_adjacent_under_hex_rules() {
    let world = load_grid(6, 6, &[MapCoord::new(2, 3), MapCoord::new(3, 3)], Topology::HexOddRow);
    let origin = MapCoord::new(2, 1);
    let destination = MapCoord::new(3, 5);
    let budget = MovementBudget::new(8);

    let path = query::path(&world, origin, destination, budget).expect("hex path");
    let expected = query::reachable(&world, origin, budget)
        .cost(destination)
        .expect("destination reachable");

    assert_eq!(path.len(), expected as usize);
    let mut previous = origin;
    for &step in path.steps() {
        assert!(Topology::HexOddRow.is_adjacent(previous, step));
        previous = step;
    }
}
