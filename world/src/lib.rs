#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for the tactics engine.
//!
//! The world owns the grid index, the active topology and the actors standing
//! on the map. Maps enter through [`load`], every other mutation flows through
//! [`apply`], and read access goes through the [`query`] module. Executing
//! [`Command::StepActor`] makes the world the default stepped-motion driver:
//! the step completes immediately and is acknowledged with
//! [`Event::ActorStepped`].

pub mod adjacency;
pub mod grid;
pub mod path;
pub mod reachability;
pub mod source;

use tactics_grid_core::{
    ActorId, Command, Event, MapCoord, MapError, MovementBudget, SpawnError, StepError,
};
use tracing::{debug, info, warn};

pub use adjacency::{AdjacencyRule, Neighbors, Topology};
pub use grid::{GridIndex, Tile};
pub use path::{reconstruct_path, trace_path};
pub use reachability::compute_reachable;
pub use source::{MapLayout, MapSource};

/// Represents the authoritative grid world.
#[derive(Debug, Default)]
pub struct World {
    map_name: Option<String>,
    topology: Topology,
    grid: GridIndex,
    actors: Vec<Actor>,
}

impl World {
    /// Creates an empty world with no map loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn actor_index(&self, actor: ActorId) -> Option<usize> {
        self.actors.iter().position(|entry| entry.id == actor)
    }

    fn occupant(&self, cell: MapCoord) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|entry| entry.cell == cell)
            .map(|entry| entry.id)
    }

    fn spawn_actor(
        &mut self,
        actor: ActorId,
        cell: MapCoord,
        budget: MovementBudget,
    ) -> Result<(), SpawnError> {
        if self.actor_index(actor).is_some() {
            return Err(SpawnError::DuplicateActor);
        }

        let Some(tile) = self.grid.lookup(cell) else {
            return Err(SpawnError::OffMap);
        };
        if !tile.is_passable() {
            return Err(SpawnError::Impassable);
        }
        if self.occupant(cell).is_some() {
            return Err(SpawnError::Occupied);
        }

        self.actors.push(Actor {
            id: actor,
            cell,
            budget,
        });
        Ok(())
    }

    fn step_actor(&mut self, actor: ActorId, to: MapCoord) -> Result<MapCoord, StepError> {
        let index = self.actor_index(actor).ok_or(StepError::UnknownActor)?;
        let from = self.actors[index].cell;

        let Some(tile) = self.grid.lookup(to) else {
            return Err(StepError::OffMap);
        };
        if !self.topology.is_adjacent(from, to) {
            return Err(StepError::NotAdjacent);
        }
        if !tile.is_passable() {
            return Err(StepError::Impassable);
        }
        if self.occupant(to).is_some() {
            return Err(StepError::Occupied);
        }

        self.actors[index].cell = to;
        Ok(from)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Actor {
    id: ActorId,
    cell: MapCoord,
    budget: MovementBudget,
}

/// Replaces the loaded map with the one `source` resolves for `name`.
///
/// The source is resolved before anything is touched, so a failed load
/// leaves the previous map, actors and topology intact. A successful load
/// drops every actor and invalidates any reachable set or path computed
/// against the previous map.
///
/// # Errors
///
/// Propagates the [`MapError`] reported by the source.
pub fn load<S>(
    world: &mut World,
    source: &S,
    name: &str,
    out_events: &mut Vec<Event>,
) -> Result<(), MapError>
where
    S: MapSource + ?Sized,
{
    let layout = source.resolve(name).map_err(|error| {
        warn!(map = name, %error, "map_load_failed");
        error
    })?;

    world.grid = GridIndex::from_descriptors(layout.tiles);
    world.topology = layout.topology;
    world.actors.clear();
    world.map_name = Some(name.to_owned());

    info!(
        map = name,
        tiles = world.grid.len(),
        topology = world.topology.name(),
        "map_loaded"
    );
    out_events.push(Event::MapLoaded {
        name: name.to_owned(),
        tiles: world.grid.len(),
    });
    Ok(())
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnActor {
            actor,
            cell,
            budget,
        } => match world.spawn_actor(actor, cell, budget) {
            Ok(()) => {
                debug!(actor = %actor, cell = %cell, budget = budget.get(), "actor_spawned");
                out_events.push(Event::ActorSpawned { actor, cell });
            }
            Err(reason) => {
                warn!(actor = %actor, cell = %cell, ?reason, "actor_spawn_rejected");
                out_events.push(Event::ActorSpawnRejected {
                    actor,
                    cell,
                    reason,
                });
            }
        },
        Command::StepActor { actor, to } => match world.step_actor(actor, to) {
            Ok(from) => {
                debug!(actor = %actor, from = %from, to = %to, "actor_stepped");
                out_events.push(Event::ActorStepped { actor, from, to });
            }
            Err(reason) => {
                warn!(actor = %actor, to = %to, ?reason, "step_rejected");
                out_events.push(Event::StepRejected { actor, to, reason });
            }
        },
        Command::SetPassable { cell, passable } => {
            if world.grid.set_passable(cell, passable) {
                debug!(cell = %cell, passable, "passability_changed");
                out_events.push(Event::PassabilityChanged { cell, passable });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tactics_grid_core::{
        ActorId, ActorSnapshot, MapBounds, MapCoord, MovementBudget, Path, PathError,
        ReachableSet,
    };

    use super::{GridIndex, Tile, Topology, World};

    /// Identifier of the loaded map, if any.
    #[must_use]
    pub fn map_name(world: &World) -> Option<&str> {
        world.map_name.as_deref()
    }

    /// Adjacency rule selected by the loaded map.
    #[must_use]
    pub fn topology(world: &World) -> Topology {
        world.topology
    }

    /// Provides read-only access to the grid index.
    #[must_use]
    pub fn grid(world: &World) -> &GridIndex {
        &world.grid
    }

    /// Tile registered at the coordinate; `None` marks the map edge or a gap.
    #[must_use]
    pub fn lookup(world: &World, cell: MapCoord) -> Option<&Tile> {
        world.grid.lookup(cell)
    }

    /// Iterator over every registered tile in unspecified order.
    pub fn tiles(world: &World) -> impl Iterator<Item = &Tile> {
        world.grid.iter()
    }

    /// Smallest rectangle containing every registered tile.
    #[must_use]
    pub fn bounds(world: &World) -> Option<MapBounds> {
        world.grid.bounds()
    }

    /// Captures the actor with the provided identifier.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<ActorSnapshot> {
        world
            .actors
            .iter()
            .find(|entry| entry.id == actor)
            .map(|entry| ActorSnapshot {
                id: entry.id,
                cell: entry.cell,
                budget: entry.budget,
            })
    }

    /// Captures every actor in identifier order.
    #[must_use]
    pub fn actors(world: &World) -> Vec<ActorSnapshot> {
        let mut snapshots: Vec<ActorSnapshot> = world
            .actors
            .iter()
            .map(|entry| ActorSnapshot {
                id: entry.id,
                cell: entry.cell,
                budget: entry.budget,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Actor standing on the tile, if any.
    #[must_use]
    pub fn actor_at(world: &World, cell: MapCoord) -> Option<ActorId> {
        world.occupant(cell)
    }

    /// Tiles reachable from `from` within `budget` on the loaded map.
    #[must_use]
    pub fn reachable(world: &World, from: MapCoord, budget: MovementBudget) -> ReachableSet {
        super::compute_reachable(&world.grid, &world.topology, from, budget)
    }

    /// Reconstructs a path from `from` to `to` with freshly computed labels.
    ///
    /// # Errors
    ///
    /// See [`super::reconstruct_path`].
    pub fn path(
        world: &World,
        from: MapCoord,
        to: MapCoord,
        budget: MovementBudget,
    ) -> Result<Path, PathError> {
        super::reconstruct_path(&world.grid, &world.topology, from, to, budget)
    }

    /// Reconstructs a path against labels produced by an earlier [`reachable`] call.
    ///
    /// # Errors
    ///
    /// See [`super::trace_path`].
    pub fn trace_path(
        world: &World,
        labels: &ReachableSet,
        from: MapCoord,
        to: MapCoord,
        budget: MovementBudget,
    ) -> Result<Path, PathError> {
        super::trace_path(&world.grid, &world.topology, labels, from, to, budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_grid_core::TileDescriptor;

    struct SingleMap {
        name: &'static str,
        layout: MapLayout,
    }

    impl MapSource for SingleMap {
        fn resolve(&self, name: &str) -> Result<MapLayout, MapError> {
            if name == self.name {
                Ok(self.layout.clone())
            } else {
                Err(MapError::NotFound {
                    name: name.to_owned(),
                })
            }
        }
    }

    fn strip(name: &'static str, length: i32) -> SingleMap {
        SingleMap {
            name,
            layout: MapLayout::new(
                Topology::Orthogonal,
                (0..length)
                    .map(|x| TileDescriptor::new(MapCoord::new(x, 0), x != 2))
                    .collect(),
            ),
        }
    }

    fn loaded_world() -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        load(&mut world, &strip("strip", 4), "strip", &mut events).expect("load");
        world
    }

    #[test]
    fn load_emits_map_loaded() {
        let mut world = World::new();
        let mut events = Vec::new();

        load(&mut world, &strip("strip", 4), "strip", &mut events).expect("load");

        assert_eq!(
            events,
            vec![Event::MapLoaded {
                name: "strip".to_owned(),
                tiles: 4
            }]
        );
        assert_eq!(query::map_name(&world), Some("strip"));
        assert!(query::lookup(&world, MapCoord::new(3, 0)).is_some());
        assert!(query::lookup(&world, MapCoord::new(4, 0)).is_none());
    }

    #[test]
    fn failed_load_keeps_previous_map() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnActor {
                actor: ActorId::new(1),
                cell: MapCoord::new(0, 0),
                budget: MovementBudget::new(2),
            },
            &mut events,
        );
        events.clear();

        let result = load(&mut world, &strip("strip", 4), "missing", &mut events);

        assert_eq!(
            result,
            Err(MapError::NotFound {
                name: "missing".to_owned()
            })
        );
        assert!(events.is_empty());
        assert_eq!(query::map_name(&world), Some("strip"));
        assert_eq!(query::grid(&world).len(), 4);
        assert!(query::actor(&world, ActorId::new(1)).is_some());
    }

    #[test]
    fn reload_drops_actors() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnActor {
                actor: ActorId::new(1),
                cell: MapCoord::new(0, 0),
                budget: MovementBudget::new(2),
            },
            &mut events,
        );

        load(&mut world, &strip("strip", 6), "strip", &mut events).expect("reload");

        assert!(query::actors(&world).is_empty());
        assert_eq!(query::grid(&world).len(), 6);
    }

    #[test]
    fn spawn_rejects_invalid_tiles() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        let cases = [
            (ActorId::new(1), MapCoord::new(0, 0), None),
            (ActorId::new(1), MapCoord::new(1, 0), Some(SpawnError::DuplicateActor)),
            (ActorId::new(2), MapCoord::new(0, 0), Some(SpawnError::Occupied)),
            (ActorId::new(3), MapCoord::new(2, 0), Some(SpawnError::Impassable)),
            (ActorId::new(4), MapCoord::new(9, 0), Some(SpawnError::OffMap)),
        ];

        for (actor, cell, expected) in cases {
            events.clear();
            apply(
                &mut world,
                Command::SpawnActor {
                    actor,
                    cell,
                    budget: MovementBudget::new(1),
                },
                &mut events,
            );

            let expected_event = match expected {
                None => Event::ActorSpawned { actor, cell },
                Some(reason) => Event::ActorSpawnRejected {
                    actor,
                    cell,
                    reason,
                },
            };
            assert_eq!(events, vec![expected_event]);
        }
    }

    #[test]
    fn step_moves_actor_onto_adjacent_tile() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        let actor = ActorId::new(1);
        apply(
            &mut world,
            Command::SpawnActor {
                actor,
                cell: MapCoord::new(0, 0),
                budget: MovementBudget::new(3),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::StepActor {
                actor,
                to: MapCoord::new(1, 0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ActorStepped {
                actor,
                from: MapCoord::new(0, 0),
                to: MapCoord::new(1, 0),
            }]
        );
        assert_eq!(
            query::actor(&world, actor).map(|snapshot| snapshot.cell),
            Some(MapCoord::new(1, 0))
        );
        assert_eq!(query::actor_at(&world, MapCoord::new(1, 0)), Some(actor));
    }

    #[test]
    fn step_rejections_leave_actor_in_place() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        let actor = ActorId::new(1);
        apply(
            &mut world,
            Command::SpawnActor {
                actor,
                cell: MapCoord::new(1, 0),
                budget: MovementBudget::new(3),
            },
            &mut events,
        );

        let cases = [
            (actor, MapCoord::new(3, 0), StepError::NotAdjacent),
            (actor, MapCoord::new(2, 0), StepError::Impassable),
            (actor, MapCoord::new(1, 1), StepError::OffMap),
            (ActorId::new(9), MapCoord::new(0, 0), StepError::UnknownActor),
        ];
        for (who, to, reason) in cases {
            events.clear();
            apply(&mut world, Command::StepActor { actor: who, to }, &mut events);
            assert_eq!(
                events,
                vec![Event::StepRejected {
                    actor: who,
                    to,
                    reason
                }]
            );
        }

        assert_eq!(
            query::actor(&world, actor).map(|snapshot| snapshot.cell),
            Some(MapCoord::new(1, 0))
        );
    }

    #[test]
    fn set_passable_only_reports_changes() {
        let mut world = loaded_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetPassable {
                cell: MapCoord::new(2, 0),
                passable: true,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetPassable {
                cell: MapCoord::new(2, 0),
                passable: true,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PassabilityChanged {
                cell: MapCoord::new(2, 0),
                passable: true,
            }]
        );
        assert_eq!(
            query::reachable(&world, MapCoord::new(0, 0), MovementBudget::new(3)).len(),
            3
        );
    }
}
