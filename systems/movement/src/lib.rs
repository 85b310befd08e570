#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selection and move state machine that gates reachability and path queries.
//!
//! The machine never moves actors itself. Once a path is accepted it emits a
//! single [`Command::StepActor`] and suspends until the matching
//! [`Event::ActorStepped`] comes back through [`Movement::handle`]; only then
//! is the next step issued, so steps never overlap.

use std::collections::VecDeque;

use tactics_grid_core::{
    ActorId, ActorSnapshot, Command, Event, HighlightSink, MapCoord, PathError, ReachableSet,
    SelectionPhase,
};
use tactics_grid_world::{query, World};
use tracing::{debug, info, warn};

/// Result of a selection request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The actor was selected and its reachable tiles highlighted.
    Selected {
        /// Number of reachable tiles, excluding the origin.
        reachable: usize,
    },
    /// A selection was already active and has been cleared.
    Cleared,
    /// A move is in flight, so the request was ignored.
    Ignored,
}

/// Result of a move request that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A path was accepted and its first step dispatched.
    Started {
        /// Number of steps the actor will take.
        steps: usize,
    },
    /// Nothing is selected, a move is in flight, or the tile is not highlighted.
    Ignored,
}

/// Pure system that owns the single active selection and the move in flight.
#[derive(Debug, Default)]
pub struct Movement {
    state: State,
    highlighted: Vec<MapCoord>,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Selected {
        actor: ActorSnapshot,
        reachable: ReachableSet,
    },
    Moving {
        actor: ActorId,
        awaiting: MapCoord,
        remaining: VecDeque<MapCoord>,
        cancel_requested: bool,
    },
}

impl Movement {
    /// Current phase of the machine.
    #[must_use]
    pub fn phase(&self) -> SelectionPhase {
        match self.state {
            State::Idle => SelectionPhase::Idle,
            State::Selected { .. } => SelectionPhase::Selected,
            State::Moving { .. } => SelectionPhase::Moving,
        }
    }

    /// Actor that is selected or moving, if any.
    #[must_use]
    pub fn active_actor(&self) -> Option<ActorId> {
        match &self.state {
            State::Idle => None,
            State::Selected { actor, .. } => Some(actor.id),
            State::Moving { actor, .. } => Some(*actor),
        }
    }

    /// Reachable set exposed while an actor is selected.
    #[must_use]
    pub fn reachable(&self) -> Option<&ReachableSet> {
        match &self.state {
            State::Selected { reachable, .. } => Some(reachable),
            _ => None,
        }
    }

    /// Tiles currently highlighted through the sink.
    #[must_use]
    pub fn highlighted(&self) -> &[MapCoord] {
        &self.highlighted
    }

    /// Toggles the selection.
    ///
    /// From `Idle` the actor becomes selected: its reachable tiles are
    /// computed and highlighted, the origin with cost zero. Repeating the
    /// request while `Selected` clears the selection instead of replacing the
    /// actor. Requests while `Moving` are ignored.
    pub fn select<S>(&mut self, world: &World, actor: ActorSnapshot, sink: &mut S) -> SelectOutcome
    where
        S: HighlightSink + ?Sized,
    {
        match self.state {
            State::Moving { .. } => {
                debug!(actor = %actor.id, "select_ignored_while_moving");
                SelectOutcome::Ignored
            }
            State::Selected { .. } => {
                self.reset(sink);
                debug!(actor = %actor.id, "selection_cleared");
                SelectOutcome::Cleared
            }
            State::Idle => {
                let reachable = query::reachable(world, actor.cell, actor.budget);
                if query::lookup(world, actor.cell).is_some() {
                    self.light(sink, actor.cell, 0);
                }
                for (cell, cost) in reachable.iter() {
                    self.light(sink, cell, cost);
                }

                let count = reachable.len();
                info!(
                    actor = %actor.id,
                    cell = %actor.cell,
                    budget = actor.budget.get(),
                    reachable = count,
                    "actor_selected"
                );
                self.state = State::Selected { actor, reachable };
                SelectOutcome::Selected { reachable: count }
            }
        }
    }

    /// Starts moving the selected actor towards a highlighted tile.
    ///
    /// Tiles outside the reachable set, including the actor's own tile, are
    /// ignored. On success the highlights are cleared and the first
    /// [`Command::StepActor`] is pushed onto `out`.
    ///
    /// # Errors
    ///
    /// Returns the [`PathError`] raised by path reconstruction. The selection
    /// is dropped and the machine returns to `Idle` before the error surfaces.
    pub fn request_move<S>(
        &mut self,
        world: &World,
        destination: MapCoord,
        sink: &mut S,
        out: &mut Vec<Command>,
    ) -> Result<MoveOutcome, PathError>
    where
        S: HighlightSink + ?Sized,
    {
        let State::Selected { actor, reachable } = &self.state else {
            debug!(to = %destination, phase = ?self.phase(), "move_ignored");
            return Ok(MoveOutcome::Ignored);
        };
        if !reachable.contains(destination) {
            debug!(to = %destination, "move_outside_reachable_set");
            return Ok(MoveOutcome::Ignored);
        }

        let actor = *actor;
        let path = query::trace_path(world, reachable, actor.cell, destination, actor.budget);
        self.reset(sink);

        let path = path.map_err(|error| {
            warn!(actor = %actor.id, %error, "path_reconstruction_failed");
            error
        })?;

        let mut remaining: VecDeque<MapCoord> = path.into_steps().into();
        let Some(first) = remaining.pop_front() else {
            return Err(PathError::ZeroLength { cell: actor.cell });
        };

        let steps = remaining.len() + 1;
        info!(actor = %actor.id, to = %destination, steps, "move_started");
        out.push(Command::StepActor {
            actor: actor.id,
            to: first,
        });
        self.state = State::Moving {
            actor: actor.id,
            awaiting: first,
            remaining,
            cancel_requested: false,
        };
        Ok(MoveOutcome::Started { steps })
    }

    /// Asks the move in flight to stop after the step currently under way.
    ///
    /// Returns `false` when no move is in flight.
    pub fn cancel(&mut self) -> bool {
        match &mut self.state {
            State::Moving {
                cancel_requested, ..
            } => {
                *cancel_requested = true;
                true
            }
            _ => false,
        }
    }

    /// Consumes world events and emits the next step command when one completes.
    pub fn handle<S>(&mut self, events: &[Event], sink: &mut S, out: &mut Vec<Command>)
    where
        S: HighlightSink + ?Sized,
    {
        for event in events {
            match event {
                Event::MapLoaded { name, .. } => {
                    if self.phase() != SelectionPhase::Idle {
                        debug!(map = %name, "selection_invalidated_by_load");
                    }
                    self.reset(sink);
                }
                Event::PassabilityChanged { cell, .. } => {
                    if matches!(self.state, State::Selected { .. }) {
                        debug!(cell = %cell, "selection_invalidated_by_passability");
                        self.reset(sink);
                    }
                }
                Event::ActorStepped { actor, to, .. } => self.step_completed(*actor, *to, sink, out),
                Event::StepRejected { actor, to, reason } => {
                    if self.is_awaiting(*actor, *to) {
                        warn!(actor = %actor, to = %to, ?reason, "move_aborted");
                        self.reset(sink);
                    }
                }
                Event::ActorSpawned { .. } | Event::ActorSpawnRejected { .. } => {}
            }
        }
    }

    fn step_completed<S>(&mut self, actor: ActorId, to: MapCoord, sink: &mut S, out: &mut Vec<Command>)
    where
        S: HighlightSink + ?Sized,
    {
        if !self.is_awaiting(actor, to) {
            return;
        }

        let State::Moving {
            awaiting,
            remaining,
            cancel_requested,
            ..
        } = &mut self.state
        else {
            return;
        };

        if *cancel_requested {
            info!(actor = %actor, at = %to, discarded = remaining.len(), "move_cancelled");
            self.reset(sink);
            return;
        }

        match remaining.pop_front() {
            Some(next) => {
                *awaiting = next;
                out.push(Command::StepActor { actor, to: next });
            }
            None => {
                info!(actor = %actor, at = %to, "move_finished");
                self.reset(sink);
            }
        }
    }

    fn is_awaiting(&self, actor: ActorId, to: MapCoord) -> bool {
        matches!(
            self.state,
            State::Moving { actor: moving, awaiting, .. } if moving == actor && awaiting == to
        )
    }

    fn light<S>(&mut self, sink: &mut S, cell: MapCoord, cost: u32)
    where
        S: HighlightSink + ?Sized,
    {
        sink.highlight(cell, cost);
        self.highlighted.push(cell);
    }

    fn reset<S>(&mut self, sink: &mut S)
    where
        S: HighlightSink + ?Sized,
    {
        for cell in self.highlighted.drain(..) {
            sink.reset(cell);
        }
        self.state = State::Idle;
    }
}
