//! # Headless Run
//!
//! Drives a generated world through the full pipeline with a scripted
//! player and a stand-in render thread, then prints the statistics.
//!
//! Usage: `headless_run [config.toml] [frames]`

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use splat_core::{Record, RenderExchange, Vec3};
use splat_pipeline::population::{self, WorldShape};
use splat_pipeline::{Coordinator, FrameInput, PipelineConfig, PipelineError, PipelineResult};
use splat_sim::PlayMode;

const DEFAULT_FRAMES: u64 = 600;
const FRAME_TIME: Duration = Duration::from_millis(4);

/// What the render thread saw.
#[derive(Debug, Default)]
struct RenderTally {
    frames: u64,
    uploaded: usize,
    words: usize,
    latest: u64,
}

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match PipelineConfig::from_toml_file(&path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("✗ {path}: {error}");
                return ExitCode::FAILURE;
            }
        },
        None => PipelineConfig::default(),
    };
    let frames = args
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                    SPLAT PIPELINE HEADLESS RUN                   ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    match run(config, frames) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("✗ pipeline failed: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: PipelineConfig, frames: u64) -> PipelineResult<()> {
    let shape = WorldShape::default();
    let world = population::generate(&shape)?;
    println!("World: {} records, {} free slots", world.records.len(), shape.free_slots);

    let mut coordinator = Coordinator::start(world, config)?;
    let exchange = RenderExchange::shared();
    let running = Arc::new(AtomicBool::new(true));

    let renderer = {
        let exchange = Arc::clone(&exchange);
        let running = Arc::clone(&running);
        std::thread::Builder::new()
            .name("splat-render".into())
            .spawn(move || {
                let mut tally = RenderTally::default();
                while running.load(Ordering::Acquire) {
                    match exchange.take() {
                        Some(frame) => {
                            tally.frames += 1;
                            let batch = frame.records.get(frame.upload.clone()).unwrap_or_default();
                            tally.uploaded += batch.len();
                            tally.words += Record::as_words(batch).len();
                            tally.latest = frame.frame;
                        }
                        None => std::thread::sleep(Duration::from_millis(1)),
                    }
                }
                tally
            })
            .map_err(|source| PipelineError::Spawn { name: "render", source })?
    };

    let started = Instant::now();
    let mut rejected = 0u64;
    for n in 0..frames {
        let angle = n as f32 * 0.01;
        let input = FrameInput {
            desired_velocity: Vec3::new(angle.cos(), 0.0, angle.sin()) * 2.0,
            look: Vec3::new(angle.cos(), -0.4, angle.sin()).normalize(),
            delta_time: FRAME_TIME.as_secs_f32(),
            play_mode: PlayMode::Normal,
            collect: n % 120 == 60,
            build: n % 90 == 45,
            selection_radius: 1.0,
        };

        let output = coordinator.frame(&input)?;
        if output.rejected.is_some() {
            rejected += 1;
        }
        exchange.publish(output.to_render_frame());
        std::thread::sleep(FRAME_TIME);
    }
    let elapsed = started.elapsed();

    running.store(false, Ordering::Release);
    let tally = renderer.join().unwrap_or_default();

    let player = *coordinator.player();
    let stats = coordinator.shutdown();
    stats.print_summary();
    println!("┌─ RENDER THREAD ──────────────────────────────────────────────────┐");
    println!("│ Frames Taken:       {}", tally.frames);
    println!("│ Latest Frame:       {}", tally.latest);
    println!("│ Records Uploaded:   {}", tally.uploaded);
    println!("│ Words Uploaded:     {}", tally.words);
    println!("│ Exchange Gen:       {}", exchange.generation());
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
    println!("Ran {frames} frames in {:.2}s", elapsed.as_secs_f64());
    println!("Player ended at {:?}", player.position);
    println!("Rejected builds seen by caller: {rejected}");
    Ok(())
}
