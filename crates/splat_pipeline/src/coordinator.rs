//! # Coordinator
//!
//! The main context. Each call to [`Coordinator::frame`]:
//!
//! ```text
//! 1. Drain worker completions and advance the phase machine
//! 2. Steer the player against the render snapshot
//! 3. Target, select, collect or build
//! 4. Dispatch this tick's sort and simulate requests
//! 5. Hand the renderer its next upload slice
//! ```
//!
//! It never blocks on a worker. Completions that are not ready yet are
//! picked up on a later frame.

use std::ops::Range;
use std::time::Instant;

use splat_core::{
    free_boundary, merge_updates, Material, Record, RecordStore, RecordUpdate, UpdateKind, Vec3,
};
use splat_sim::{
    find_target, generate_selection, max_distance_index, DistanceSorter, PlayerController,
    SelectionBuffer,
};

use crate::config::PipelineConfig;
use crate::edits::{self, EditQueue};
use crate::error::{PipelineError, PipelineResult};
use crate::frame::{FrameInput, FrameOutput};
use crate::phase::{Choreography, Directive, Signal};
use crate::protocol::{MergedSnapshot, SimRequest, SimResponse, SortRequest, SortResponse};
use crate::stats::PipelineStats;
use crate::workers::{SimContext, SortContext, WorkerLink};

/// Initial world handed to [`Coordinator::start`].
#[derive(Clone, Debug, Default)]
pub struct Ingest {
    /// Every record, Free slots included. Exactly one must be the player.
    pub records: Vec<Record>,
    /// First ID not used by `records`.
    pub next_id: u32,
}

/// Owns the render snapshot and drives both workers.
pub struct Coordinator {
    config: PipelineConfig,
    controller: PlayerController,
    choreography: Choreography,
    snapshot: RecordStore,
    player: Record,
    player_index: usize,
    edits: EditQueue,
    simulated: Vec<Record>,
    selection: SelectionBuffer,
    near: Range<usize>,
    eye: Vec3,
    sim_time: f32,
    upload_cursor: usize,
    frame: u64,
    stats: PipelineStats,
    sort: WorkerLink<SortRequest, SortResponse>,
    sim: WorkerLink<SimRequest, SimResponse>,
}

impl Coordinator {
    /// Validates the world, spawns both workers and hands the sort context
    /// its copy of the snapshot.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config, an empty world, a world without exactly
    /// one player, duplicate IDs, or a worker that cannot be spawned.
    pub fn start(ingest: Ingest, config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let Ingest { mut records, next_id } = ingest;
        if records.is_empty() {
            return Err(PipelineError::EmptyIngest);
        }

        let players = records
            .iter()
            .filter(|r| !r.is_free() && r.material() == Material::Player)
            .count();
        let player = match players {
            0 => return Err(PipelineError::MissingPlayer),
            1 => records
                .iter()
                .copied()
                .find(|r| !r.is_free() && r.material() == Material::Player)
                .ok_or(PipelineError::MissingPlayer)?,
            count => return Err(PipelineError::MultiplePlayers { count }),
        };

        let controller = PlayerController::new(config.player);
        let eye = controller.eye(&player);
        let sorted = DistanceSorter::new(config.sort).sort(&mut records, eye);
        let snapshot = RecordStore::ingest(sorted, next_id)?;
        let player_index = snapshot
            .find_by_id(player.id())
            .ok_or(PipelineError::MissingPlayer)?;
        let near = 0..max_distance_index(snapshot.records(), config.simulation.candidate_distance());

        let sort = WorkerLink::spawn(
            "sort",
            SortContext::new(config.sort, config.simulation.candidate_distance()),
            config.channel_capacity,
        )?;
        let sim = WorkerLink::spawn("sim", SimContext::new(config.simulation), config.channel_capacity)?;
        sort.send(SortRequest::Snapshot(snapshot.records().to_vec()))?;

        tracing::info!(
            records = snapshot.len(),
            free_index = snapshot.free_index(),
            next_id = snapshot.next_id().0,
            "coordinator started"
        );

        Ok(Self {
            selection: SelectionBuffer::with_capacity(config.max_selected),
            config,
            controller,
            choreography: Choreography::new(),
            snapshot,
            player,
            player_index,
            edits: EditQueue::new(),
            simulated: Vec::new(),
            near,
            eye,
            sim_time: 0.0,
            upload_cursor: 0,
            frame: 0,
            stats: PipelineStats::default(),
            sort,
            sim,
        })
    }

    /// Runs one frame.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::WorkerDisconnected`] if a worker is gone and
    /// [`PipelineError::Protocol`] if a completion arrives out of order.
    /// A build on a full pool is not an error; it is reported in
    /// [`FrameOutput::rejected`].
    pub fn frame(&mut self, input: &FrameInput) -> PipelineResult<FrameOutput<'_>> {
        let started = Instant::now();
        self.frame += 1;
        let dt = if input.delta_time.is_finite() {
            input.delta_time.clamp(0.0, self.config.max_delta_time)
        } else {
            0.0
        };

        self.drain()?;

        let collisions = self.controller.step(
            &mut self.player,
            self.snapshot.records(),
            input.desired_velocity,
            input.play_mode,
            dt,
            &self.config.simulation,
        );
        self.write_player();
        self.edits.set_player_motion(&self.player);
        self.eye = self.controller.eye(&self.player);

        let params = &self.config.simulation;
        let mut target = find_target(self.eye, input.look, self.snapshot.records(), params);
        generate_selection(
            target,
            self.snapshot.records(),
            input.selection_radius,
            &mut self.selection,
            params,
        );

        let mut rejected = None;
        if input.collect {
            let released = edits::collect(&mut self.snapshot, &self.selection)?;
            self.stats.collected += released.len() as u64;
            self.edits.extend(released);
        } else if input.build {
            if let Some(index) = target {
                let anchor = self.snapshot.records()[index];
                match edits::build(&mut self.snapshot, &anchor, input.look, self.eye) {
                    Ok((activation, update)) => {
                        tracing::debug!(id = %activation.id, index = activation.index, "built record");
                        self.shift_past(activation.index);
                        target = Some(shifted(index, activation.index));
                        self.stats.built += 1;
                        self.edits.extend([update]);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "build rejected");
                        self.stats.rejected_builds += 1;
                        rejected = Some(error);
                    }
                }
            }
        }

        self.sim_time += dt;
        let directives = self.choreography.tick();
        if directives.sort {
            self.sort.send(SortRequest::Sort { eye: self.eye })?;
        }
        if directives.simulate {
            let step = self.sim_time.min(self.config.max_delta_time);
            self.sim_time = 0.0;
            self.sim.send(SimRequest::Simulate { dt: step })?;
        }

        let len = self.snapshot.len();
        let start = self.upload_cursor.min(len);
        let end = (start + self.config.upload_batch).min(len);
        self.upload_cursor = end;

        self.stats.record_frame(started.elapsed());

        let target_id = target.map(|index| self.snapshot.records()[index].id());
        Ok(FrameOutput {
            frame: self.frame,
            eye: self.eye,
            records: self.snapshot.records(),
            upload: start..end,
            near: self.near.clone(),
            selected: self.selection.records(),
            target,
            target_id,
            rejected,
            collisions,
        })
    }

    /// Render snapshot.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        self.snapshot.records()
    }

    /// Authoritative player record.
    #[must_use]
    pub const fn player(&self) -> &Record {
        &self.player
    }

    /// Current eye position.
    #[must_use]
    pub const fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Phase bookkeeping.
    #[must_use]
    pub const fn choreography(&self) -> &Choreography {
        &self.choreography
    }

    /// Accumulated statistics.
    #[must_use]
    pub const fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Edits waiting for the next merge batch.
    #[must_use]
    pub fn pending_edits(&self) -> usize {
        self.edits.len()
    }

    /// Stops both workers and returns the final statistics.
    ///
    /// In-flight work is abandoned; dropping the coordinator does the same.
    pub fn shutdown(self) -> PipelineStats {
        tracing::info!(frames = self.frame, "coordinator shutting down");
        self.stats
    }

    // =========================================================================
    // COMPLETIONS
    // =========================================================================

    fn drain(&mut self) -> PipelineResult<()> {
        while let Some(response) = self.sort.poll()? {
            self.on_sort(response)?;
        }
        while let Some(response) = self.sim.poll()? {
            self.on_sim(response)?;
        }
        Ok(())
    }

    fn on_sort(&mut self, response: SortResponse) -> PipelineResult<()> {
        match response {
            SortResponse::SnapshotLoaded { len } => {
                self.choreography.advance(Signal::SnapshotLoaded)?;
                tracing::info!(records = len, "sort context loaded snapshot");
            }
            SortResponse::Sorted { eye } => {
                self.stats.sorts += 1;
                tracing::debug!(eye = ?eye, "sort pass done");
                if self.choreography.advance(Signal::SortDone)? == Some(Directive::Merge) {
                    self.dispatch_merge()?;
                }
            }
            SortResponse::Merged(merged) => {
                let eye = merged.eye;
                self.adopt(merged)?;
                if self.choreography.advance(Signal::MergeDone)? == Some(Directive::Load) {
                    let records = self.snapshot.records()[self.near.clone()].to_vec();
                    self.sim.send(SimRequest::Merge { records, eye })?;
                }
            }
        }
        Ok(())
    }

    fn on_sim(&mut self, response: SimResponse) -> PipelineResult<()> {
        match response {
            SimResponse::Merged { len } => {
                tracing::debug!(records = len, "sim context loaded subset");
                self.choreography.advance(Signal::SimLoaded)?;
            }
            SimResponse::Simulated { records, collisions } => {
                self.stats.simulations += 1;
                self.stats.sim_collisions += u64::from(collisions);

                let motions: Vec<RecordUpdate> = records.iter().map(RecordUpdate::motion_of).collect();
                merge_updates(self.snapshot.records_mut(), &motions, self.eye);
                self.simulated = records;

                if self.choreography.advance(Signal::SimulateDone)? == Some(Directive::Merge) {
                    self.dispatch_merge()?;
                }
            }
        }
        Ok(())
    }

    fn dispatch_merge(&mut self) -> PipelineResult<()> {
        let simulated = std::mem::take(&mut self.simulated);
        let batch = self.edits.take_batch(&simulated);
        tracing::debug!(updates = batch.len(), "dispatching merge");
        self.sort.send(SortRequest::Merge(batch))
    }

    /// Takes the merged array as the new snapshot. Edits made while the
    /// merge was in flight are replayed on top so none of them flicker back.
    fn adopt(&mut self, merged: MergedSnapshot) -> PipelineResult<()> {
        let MergedSnapshot {
            mut records,
            eye,
            max_distance_index,
            free_index,
            stats,
        } = merged;

        let replay = self.edits.pending();
        let free_index = if replay.is_empty() {
            free_index
        } else {
            merge_updates(&mut records, replay, eye);
            free_boundary(&records)
        };
        self.snapshot.replace_records(records, free_index)?;
        self.near = 0..max_distance_index;

        // Replayed builds sit in the slot they claimed; move them into
        // distance order like a fresh build.
        for update in replay {
            if let UpdateKind::Claim(built) = update.kind {
                if let Some(index) = self.snapshot.find_by_id(built.id()) {
                    let place = self.snapshot.settle(index);
                    if place < self.near.end {
                        self.near.end = (self.near.end + 1).min(self.snapshot.len());
                    }
                }
            }
        }

        self.player_index = self
            .snapshot
            .find_by_id(self.player.id())
            .ok_or(PipelineError::MissingPlayer)?;
        self.write_player();

        self.upload_cursor = 0;
        self.stats.merges += 1;
        self.stats.merge_totals += stats;
        Ok(())
    }

    fn write_player(&mut self) {
        if let Some(slot) = self.snapshot.records_mut().get_mut(self.player_index) {
            *slot = self.player;
        }
    }

    /// Keeps indices into the snapshot valid after a built record settled
    /// at `at`, pushing everything from there on one slot back.
    fn shift_past(&mut self, at: usize) {
        self.player_index = shifted(self.player_index, at);
        if at < self.near.end {
            self.near.end = (self.near.end + 1).min(self.snapshot.len());
        }
        self.upload_cursor = self.upload_cursor.min(at);
    }
}

/// Where `index` ends up after a record is inserted at `at`.
#[inline]
const fn shifted(index: usize, at: usize) -> usize {
    if index >= at {
        index + 1
    } else {
        index
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("frame", &self.frame)
            .field("phase", &self.choreography.phase())
            .field("simulating", &self.choreography.is_simulating())
            .field("records", &self.snapshot.len())
            .field("free_index", &self.snapshot.free_index())
            .field("pending_edits", &self.edits.len())
            .finish_non_exhaustive()
    }
}
