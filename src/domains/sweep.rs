//! Work-stealing parameter sweeps.
//!
//! Each case is an independent simulation with its own configuration, so
//! cases never share mutable state. Durations vary a lot (collision-heavy
//! inelastic runs take far more steps than free swings), which is the
//! straggler problem work stealing levels out (Heijunka).
//!
//! Results come back in case order regardless of which worker ran them.

use crossbeam_deque::{Injector, Steal, Stealer, Worker};
use log::debug;

use crate::config::SimConfig;
use crate::engine::trajectory::Trajectory;
use crate::engine::Simulator;
use crate::error::RunFailure;

/// One case of a sweep.
#[derive(Debug, Clone)]
pub struct SweepCase {
    /// Position in the sweep.
    pub index: usize,
    /// Human-readable label (e.g. `"e=0.50"`).
    pub label: String,
    /// Full configuration of this run.
    pub config: SimConfig,
}

/// Result of one sweep case.
#[derive(Debug)]
pub struct SweepOutcome {
    /// Position in the sweep.
    pub index: usize,
    /// Label of the case.
    pub label: String,
    /// Trajectory, or the failure with its partial trajectory.
    pub result: Result<Trajectory, RunFailure>,
}

impl SweepOutcome {
    /// Number of collisions, counting the partial trajectory of a failed run.
    #[must_use]
    pub fn collision_count(&self) -> usize {
        match &self.result {
            Ok(trajectory) => trajectory.collisions().len(),
            Err(failure) => failure.partial.collisions().len(),
        }
    }

    /// Whether the run reached its end time.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Work-stealing scheduler for independent simulations.
#[derive(Debug)]
pub struct ParameterSweep {
    /// Number of worker threads.
    num_workers: usize,
}

impl Default for ParameterSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSweep {
    /// Create with default number of workers (number of CPUs).
    #[must_use]
    pub fn new() -> Self {
        Self {
            num_workers: std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(4),
        }
    }

    /// Create with specified number of workers (at least one).
    #[must_use]
    pub fn with_workers(num_workers: usize) -> Self {
        Self {
            num_workers: num_workers.max(1),
        }
    }

    /// Get number of workers.
    #[must_use]
    pub const fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Run every case to completion (or failure).
    #[must_use]
    pub fn run(&self, cases: Vec<SweepCase>) -> Vec<SweepOutcome> {
        debug!(
            "sweeping {} cases on {} workers",
            cases.len(),
            self.num_workers
        );
        self.execute(cases, |case| {
            let result = Simulator::from_config(&case.config)
                .map_err(|e| {
                    RunFailure::new(e, Trajectory::new(case.config.physics.arm_lengths()))
                })
                .and_then(|mut sim| {
                    let run = &case.config.run;
                    sim.run(run.t0, run.t_end, run.sample_count)
                });
            SweepOutcome {
                index: case.index,
                label: case.label,
                result,
            }
        })
    }

    /// Execute tasks with work stealing.
    ///
    /// Tasks are distributed across workers, and idle workers steal tasks
    /// from busy workers to maintain load balance. Results are returned in
    /// task order.
    pub fn execute<T, F, R>(&self, tasks: Vec<T>, run_task: F) -> Vec<R>
    where
        T: Send,
        F: Fn(T) -> R + Sync,
        R: Send,
    {
        let n_tasks = tasks.len();

        // Global work queue
        let injector: Injector<(usize, T)> = Injector::new();

        // Per-worker local queues
        let workers: Vec<Worker<(usize, T)>> = (0..self.num_workers)
            .map(|_| Worker::new_fifo())
            .collect();

        // Stealers for cross-worker theft
        let stealers: Vec<Stealer<(usize, T)>> = workers.iter().map(Worker::stealer).collect();

        for task in tasks.into_iter().enumerate() {
            injector.push(task);
        }

        let results: std::sync::Mutex<Vec<(usize, R)>> =
            std::sync::Mutex::new(Vec::with_capacity(n_tasks));

        std::thread::scope(|s| {
            for (worker_id, worker) in workers.into_iter().enumerate() {
                let injector = &injector;
                let stealers = &stealers;
                let results = &results;
                let run_task = &run_task;

                s.spawn(move || loop {
                    let task = worker
                        .pop()
                        .or_else(|| steal_from(|| injector.steal_batch_and_pop(&worker)))
                        .or_else(|| {
                            // Round-robin over the other workers
                            (1..stealers.len()).find_map(|i| {
                                let victim = &stealers[(worker_id + i) % stealers.len()];
                                steal_from(|| victim.steal())
                            })
                        });

                    let Some((index, task)) = task else {
                        break;
                    };
                    let result = run_task(task);
                    if let Ok(mut guard) = results.lock() {
                        guard.push((index, result));
                    }
                });
            }
        });

        let mut indexed = results.into_inner().unwrap_or_default();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, r)| r).collect()
    }
}

fn steal_from<T>(mut attempt: impl FnMut() -> Steal<T>) -> Option<T> {
    loop {
        match attempt() {
            Steal::Success(task) => return Some(task),
            Steal::Empty => return None,
            Steal::Retry => {}
        }
    }
}

/// One case per restitution coefficient, all other settings from `base`.
#[must_use]
pub fn restitution_sweep(base: &SimConfig, values: &[f64]) -> Vec<SweepCase> {
    values
        .iter()
        .enumerate()
        .map(|(index, &e)| {
            let mut config = base.clone();
            config.physics.restitution = e;
            SweepCase {
                index,
                label: format!("e={e:.2}"),
                config,
            }
        })
        .collect()
}

/// One case per drive angular frequency, all other settings from `base`.
#[must_use]
pub fn drive_frequency_sweep(base: &SimConfig, frequencies: &[f64]) -> Vec<SweepCase> {
    frequencies
        .iter()
        .enumerate()
        .map(|(index, &w)| {
            let mut config = base.clone();
            config.physics.drive.angular_frequency = w;
            SweepCase {
                index,
                label: format!("omega={w:.3}"),
                config,
            }
        })
        .collect()
}
