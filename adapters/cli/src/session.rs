use anyhow::{bail, Context, Result};
use serde::Serialize;
use tactics_grid_core::{ActorId, Command, Event, MapCoord, TileDescriptor};
use tactics_grid_rendering::{AsciiFrame, HighlightLayer};
use tactics_grid_system_movement::{MoveOutcome, Movement, SelectOutcome};
use tactics_grid_world::{self as world, query, MapSource, Topology, World};

/// World, movement system and highlight layer wired together for one map.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    movement: Movement,
    highlights: HighlightLayer,
}

impl Session {
    /// Loads `name` from `source` and places the actors described by `spawns`.
    pub(crate) fn start<S>(source: &S, name: &str, spawns: Vec<Command>) -> Result<Self>
    where
        S: MapSource + ?Sized,
    {
        let mut world = World::new();
        let mut events = Vec::new();
        world::load(&mut world, source, name, &mut events)
            .with_context(|| format!("failed to load map `{name}`"))?;
        for command in spawns {
            world::apply(&mut world, command, &mut events);
        }
        for event in &events {
            if let Event::ActorSpawnRejected {
                actor,
                cell,
                reason,
            } = event
            {
                bail!("actor {actor} cannot start at {cell}: {reason:?}");
            }
        }

        Ok(Self {
            world,
            movement: Movement::default(),
            highlights: HighlightLayer::new(),
        })
    }

    /// Selects `actor` and returns the number of tiles it can reach.
    pub(crate) fn select(&mut self, actor: ActorId) -> Result<usize> {
        let snapshot = query::actor(&self.world, actor)
            .with_context(|| format!("actor {actor} is not on the map"))?;
        match self
            .movement
            .select(&self.world, snapshot, &mut self.highlights)
        {
            SelectOutcome::Selected { reachable } => Ok(reachable),
            outcome => bail!("actor {actor} could not be selected ({outcome:?})"),
        }
    }

    /// Moves the selected actor to `destination`, reporting every completed step.
    ///
    /// Steps are driven one at a time: each command is applied to the world and
    /// the resulting events are fed back to the movement system, which issues
    /// the next step.
    pub(crate) fn walk<F>(&mut self, destination: MapCoord, mut on_step: F) -> Result<usize>
    where
        F: FnMut(&Self, MapCoord) -> Result<()>,
    {
        let mut commands = Vec::new();
        let outcome = self
            .movement
            .request_move(&self.world, destination, &mut self.highlights, &mut commands)
            .with_context(|| format!("no path to {destination}"))?;
        let MoveOutcome::Started { steps } = outcome else {
            bail!("{destination} is not within the selected actor's reach");
        };

        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.movement
                .handle(&events, &mut self.highlights, &mut commands);

            for event in &events {
                match event {
                    Event::ActorStepped { to, .. } => on_step(self, *to)?,
                    Event::StepRejected { actor, to, reason } => {
                        bail!("actor {actor} could not step to {to}: {reason:?}")
                    }
                    _ => {}
                }
            }
        }
        Ok(steps)
    }

    pub(crate) fn map_name(&self) -> &str {
        query::map_name(&self.world).unwrap_or_default()
    }

    pub(crate) fn actor_cell(&self, actor: ActorId) -> Option<MapCoord> {
        query::actor(&self.world, actor).map(|snapshot| snapshot.cell)
    }

    /// Current map drawn with actors and highlights, if the map has tiles.
    pub(crate) fn frame(&self) -> Option<AsciiFrame> {
        let bounds = query::bounds(&self.world)?;
        let tiles = query::tiles(&self.world)
            .map(|tile| TileDescriptor::new(tile.coord(), tile.is_passable()));
        Some(AsciiFrame::compose(
            bounds,
            tiles,
            &query::actors(&self.world),
            &self.highlights,
            query::topology(&self.world) == Topology::HexOddRow,
        ))
    }

    /// Serializable snapshot of the current frame.
    pub(crate) fn report(&self) -> FrameReport {
        FrameReport {
            map: self.map_name().to_owned(),
            actors: query::actors(&self.world)
                .into_iter()
                .map(|actor| ActorReport {
                    id: actor.id.get(),
                    cell: actor.cell,
                    budget: actor.budget.get(),
                })
                .collect(),
            highlights: self
                .highlights
                .iter()
                .map(|(cell, cost)| HighlightReport { cell, cost })
                .collect(),
            rows: self
                .frame()
                .map(|frame| frame.rows().to_vec())
                .unwrap_or_default(),
        }
    }
}

/// JSON shape of a rendered frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct FrameReport {
    map: String,
    actors: Vec<ActorReport>,
    highlights: Vec<HighlightReport>,
    rows: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
struct ActorReport {
    id: u32,
    cell: MapCoord,
    budget: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
struct HighlightReport {
    cell: MapCoord,
    cost: u32,
}
