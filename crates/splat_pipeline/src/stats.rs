//! Pipeline counters and frame timing.

use std::time::Duration;

use splat_core::MergeStats;

/// Frame budget for a 60 Hz loop.
const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_667);

/// Counters accumulated by the coordinator.
#[derive(Clone, Debug)]
pub struct PipelineStats {
    /// Frames run.
    pub frames: u64,
    /// Sort passes completed.
    pub sorts: u64,
    /// Simulate steps completed.
    pub simulations: u64,
    /// Merges completed.
    pub merges: u64,
    /// Updates applied, orphaned and rejected across all merges.
    pub merge_totals: MergeStats,
    /// Records collected.
    pub collected: u64,
    /// Blocks built.
    pub built: u64,
    /// Builds refused.
    pub rejected_builds: u64,
    /// Collisions reported by the sim.
    pub sim_collisions: u64,
    /// Shortest frame.
    pub min_frame_us: u64,
    /// Longest frame.
    pub max_frame_us: u64,
    /// Sum of frame times.
    pub total_frame_us: u64,
    /// Frames over the 60 Hz budget.
    pub frames_over_budget: u64,
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self {
            frames: 0,
            sorts: 0,
            simulations: 0,
            merges: 0,
            merge_totals: MergeStats::default(),
            collected: 0,
            built: 0,
            rejected_builds: 0,
            sim_collisions: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            total_frame_us: 0,
            frames_over_budget: 0,
        }
    }
}

impl PipelineStats {
    /// Records the main-context time of one frame.
    pub fn record_frame(&mut self, elapsed: Duration) {
        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.frames += 1;
        self.total_frame_us = self.total_frame_us.saturating_add(us);
        self.min_frame_us = self.min_frame_us.min(us);
        self.max_frame_us = self.max_frame_us.max(us);
        if elapsed > TARGET_FRAME_TIME {
            self.frames_over_budget += 1;
        }
    }

    /// Average main-context frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        (self.total_frame_us as f64 / self.frames as f64) / 1000.0
    }

    /// Prints a summary of the statistics.
    pub fn print_summary(&self) {
        let min_ms = if self.frames == 0 { 0.0 } else { self.min_frame_us as f64 / 1000.0 };
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    PIPELINE STATISTICS SUMMARY                   ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ MAIN CONTEXT ───────────────────────────────────────────────────┐");
        println!("│ Frames:             {}", self.frames);
        println!("│ Average Frame:      {:.3} ms", self.avg_frame_ms());
        println!("│ Min Frame:          {min_ms:.3} ms");
        println!("│ Max Frame:          {:.3} ms", self.max_frame_us as f64 / 1000.0);
        println!("│ Over Budget:        {}", self.frames_over_budget);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!("┌─ WORKERS ────────────────────────────────────────────────────────┐");
        println!("│ Sorts:              {}", self.sorts);
        println!("│ Simulations:        {}", self.simulations);
        println!("│ Merges:             {}", self.merges);
        println!("│ Sim Collisions:     {}", self.sim_collisions);
        println!(
            "│ Merge Updates:      {} applied, {} orphaned, {} rejected",
            self.merge_totals.applied, self.merge_totals.orphaned, self.merge_totals.rejected
        );
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!("┌─ EDITS ──────────────────────────────────────────────────────────┐");
        println!("│ Collected:          {}", self.collected);
        println!("│ Built:              {}", self.built);
        println!("│ Rejected Builds:    {}", self.rejected_builds);
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}
