//! Concurrent resolution of a block grid into placement events.
//!
//! Every non-air cell becomes a job on a shared queue. A fixed pool of worker
//! threads resolves jobs independently and sends one [`SceneEvent`] per job to
//! the thread that owns the scene, in completion order.

use crate::error::{ResolveError, Result};
use crate::model::{ModelResolver, ResolvedMesh};
use crate::placement::{place, Transform};
use crate::schematic::{BlockGrid, PaletteMisses};
use crate::types::{BlockDescriptor, BlockPosition};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A resolved block ready to add to the scene.
#[derive(Debug, Clone)]
pub struct PlacementEvent {
    pub position: BlockPosition,
    pub block: Arc<BlockDescriptor>,
    pub mesh: Arc<ResolvedMesh>,
    pub transform: Transform,
}

/// A block that produced no model.
#[derive(Debug, Clone)]
pub struct SkippedBlock {
    pub position: BlockPosition,
    pub block: Arc<BlockDescriptor>,
    pub reason: ResolveError,
}

#[derive(Debug, Clone)]
pub enum SceneEvent {
    Placed(PlacementEvent),
    Skipped(SkippedBlock),
}

type Job = (BlockPosition, Arc<BlockDescriptor>);

/// A running render pass.
///
/// Iterating blocks until the next event arrives and ends once every job has
/// reported. [`RenderPass::try_next`] polls without blocking.
pub struct RenderPass {
    events: Receiver<SceneEvent>,
    workers: Vec<JoinHandle<()>>,
    total: usize,
}

/// Queue every non-air cell of `grid` and start `workers` resolver threads.
pub fn start(grid: Arc<BlockGrid>, resolver: Arc<ModelResolver>, workers: usize) -> Result<RenderPass> {
    let (job_tx, job_rx) = unbounded::<Job>();
    let (event_tx, event_rx) = unbounded::<SceneEvent>();

    let mut total = 0;
    for (position, block) in grid.iter_blocks() {
        // The receiver is still held here, so this cannot fail.
        let _ = job_tx.send((position, Arc::clone(block)));
        total += 1;
    }
    drop(job_tx);

    let workers = workers.max(1).min(total.max(1));
    log::info!(
        "Resolving {} blocks of a {}x{}x{} structure on {} workers",
        total,
        grid.width(),
        grid.height(),
        grid.length(),
        workers
    );

    let mut handles = Vec::with_capacity(workers);
    for i in 0..workers {
        let jobs = job_rx.clone();
        let events = event_tx.clone();
        let resolver = Arc::clone(&resolver);
        let handle = thread::Builder::new()
            .name(format!("schematic-resolve-{}", i))
            .spawn(move || resolve_worker(jobs, events, resolver))?;
        handles.push(handle);
    }

    Ok(RenderPass {
        events: event_rx,
        workers: handles,
        total,
    })
}

fn resolve_worker(jobs: Receiver<Job>, events: Sender<SceneEvent>, resolver: Arc<ModelResolver>) {
    while let Ok((position, block)) = jobs.recv() {
        let event = match resolver.resolve(&block) {
            Ok(mesh) => SceneEvent::Placed(PlacementEvent {
                position,
                transform: place(position, &block.properties),
                block,
                mesh,
            }),
            Err(reason) => SceneEvent::Skipped(SkippedBlock {
                position,
                block,
                reason,
            }),
        };
        if events.send(event).is_err() {
            // Pass abandoned by its consumer.
            break;
        }
    }
}

impl RenderPass {
    /// Number of jobs queued, i.e. events this pass will produce.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Next event if one is ready.
    pub fn try_next(&self) -> Option<SceneEvent> {
        self.events.try_recv().ok()
    }

    /// All workers have exited and every event has been taken.
    pub fn is_complete(&self) -> bool {
        // Workers first: once they have exited nothing else can be queued.
        self.workers.iter().all(JoinHandle::is_finished) && self.events.is_empty()
    }

    /// Wait for the worker threads to exit.
    pub fn join(self) {
        for handle in self.workers {
            if handle.join().is_err() {
                log::error!("A resolver worker panicked");
            }
        }
    }
}

impl Iterator for RenderPass {
    type Item = SceneEvent;

    fn next(&mut self) -> Option<SceneEvent> {
        self.events.recv().ok()
    }
}

/// End-of-pass summary of what was placed and what was not.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    pub placed: usize,
    pub skipped: Vec<SkippedBlock>,
    pub palette_misses: PaletteMisses,
    /// Faces drawn blank because their texture failed, over all placed blocks.
    pub blank_faces: usize,
}

impl RenderReport {
    pub fn record(&mut self, event: &SceneEvent) {
        match event {
            SceneEvent::Placed(placement) => {
                self.placed += 1;
                self.blank_faces += placement.mesh.texture_issues.len();
            }
            SceneEvent::Skipped(skipped) => self.skipped.push(skipped.clone()),
        }
    }

    /// Skipped blocks grouped by block name and reason, with counts.
    pub fn skipped_by_reason(&self) -> BTreeMap<(String, String), usize> {
        let mut grouped = BTreeMap::new();
        for skipped in &self.skipped {
            *grouped
                .entry((skipped.block.name.clone(), skipped.reason.to_string()))
                .or_insert(0) += 1;
        }
        grouped
    }

    /// Log the pass outcome once.
    pub fn log_summary(&self) {
        log::info!(
            "Placed {} blocks, skipped {}, {} blank faces",
            self.placed,
            self.skipped.len(),
            self.blank_faces
        );
        for ((block, reason), count) in self.skipped_by_reason() {
            log::warn!("Skipped {} x{}: {}", block, count, reason);
        }
        if !self.palette_misses.is_empty() {
            log::warn!(
                "{} voxels had no palette entry and were left empty",
                self.palette_misses.count
            );
        }
    }
}
