//! # Phase State Machine
//!
//! Tracks which pipeline work is in flight.
//!
//! ## Phases
//!
//! - **Unloaded**: the sort context has not acknowledged the snapshot yet
//! - **Idle**: nothing sort-side in flight
//! - **Sorting**: a sort pass is running
//! - **MergePending**: sort finished, waiting for the sim to go idle
//! - **Merging**: the merge batch is with the sort context
//! - **Loading**: the sim context is adopting the merged subset
//!
//! Simulation runs alongside the sort-side phases and is tracked by a
//! separate flag. A simulate step never starts while a merge is pending,
//! running or loading, so the sim never works on a subset older than the
//! latest merge.
//!
//! ```text
//! Unloaded ─SnapshotLoaded→ Idle ─tick→ Sorting ─SortDone→ MergePending
//!                            ↑                               │ (sim idle)
//!                            └─SimLoaded─ Loading ←MergeDone─ Merging
//! ```

use thiserror::Error;

/// Sort-side phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Snapshot not yet acknowledged.
    #[default]
    Unloaded,
    /// Ready for the next sort.
    Idle,
    /// Sort pass in flight.
    Sorting,
    /// Sort done, merge deferred until the sim is idle.
    MergePending,
    /// Merge batch in flight.
    Merging,
    /// Merged subset in flight to the sim.
    Loading,
}

impl Phase {
    /// Whether a merge is pending, running or loading.
    #[inline]
    #[must_use]
    pub const fn is_merging(self) -> bool {
        matches!(self, Self::MergePending | Self::Merging | Self::Loading)
    }
}

/// Completion reported by a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Sort context holds the snapshot.
    SnapshotLoaded,
    /// Sort pass finished.
    SortDone,
    /// Simulate step finished.
    SimulateDone,
    /// Merge finished; a fresh array is available.
    MergeDone,
    /// Sim context adopted the merged subset.
    SimLoaded,
}

/// Work the coordinator must dispatch after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Send the merge batch to the sort context.
    Merge,
    /// Send the merged near subset to the sim context.
    Load,
}

/// Work to dispatch on a frame tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickDirectives {
    /// Start a sort pass.
    pub sort: bool,
    /// Start a simulate step.
    pub simulate: bool,
}

/// A signal arrived that the current phase does not allow.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("unexpected {signal:?} while {phase:?} (simulating: {simulating})")]
pub struct PhaseError {
    /// The offending signal.
    pub signal: Signal,
    /// Phase when it arrived.
    pub phase: Phase,
    /// Whether a simulate step was in flight.
    pub simulating: bool,
}

/// The coordinator's phase bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Choreography {
    phase: Phase,
    simulating: bool,
}

impl Choreography {
    /// Starts Unloaded with nothing in flight.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Unloaded,
            simulating: false,
        }
    }

    /// Current sort-side phase.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a simulate step is in flight.
    #[inline]
    #[must_use]
    pub const fn is_simulating(&self) -> bool {
        self.simulating
    }

    /// Whether a sort pass is in flight.
    #[inline]
    #[must_use]
    pub fn is_sorting(&self) -> bool {
        self.phase == Phase::Sorting
    }

    /// Whether a merge is pending, running or loading.
    #[inline]
    #[must_use]
    pub const fn is_merging(&self) -> bool {
        self.phase.is_merging()
    }

    /// Decides what to dispatch this frame and marks it in flight.
    pub fn tick(&mut self) -> TickDirectives {
        if self.phase == Phase::Unloaded {
            return TickDirectives::default();
        }

        let mut directives = TickDirectives::default();
        if self.phase == Phase::Idle {
            self.phase = Phase::Sorting;
            directives.sort = true;
        }
        if !self.simulating && !self.phase.is_merging() {
            self.simulating = true;
            directives.simulate = true;
        }
        directives
    }

    /// Applies a worker completion.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] when the signal is not valid in the current
    /// phase. The state is left unchanged.
    pub fn advance(&mut self, signal: Signal) -> Result<Option<Directive>, PhaseError> {
        let error = PhaseError {
            signal,
            phase: self.phase,
            simulating: self.simulating,
        };

        match (signal, self.phase) {
            (Signal::SnapshotLoaded, Phase::Unloaded) => {
                self.phase = Phase::Idle;
                Ok(None)
            }
            (Signal::SortDone, Phase::Sorting) => {
                if self.simulating {
                    self.phase = Phase::MergePending;
                    Ok(None)
                } else {
                    self.phase = Phase::Merging;
                    Ok(Some(Directive::Merge))
                }
            }
            (Signal::SimulateDone, phase) if self.simulating => {
                self.simulating = false;
                if phase == Phase::MergePending {
                    self.phase = Phase::Merging;
                    Ok(Some(Directive::Merge))
                } else {
                    Ok(None)
                }
            }
            (Signal::MergeDone, Phase::Merging) => {
                self.phase = Phase::Loading;
                Ok(Some(Directive::Load))
            }
            (Signal::SimLoaded, Phase::Loading) => {
                self.phase = Phase::Idle;
                Ok(None)
            }
            _ => Err(error),
        }
    }
}
