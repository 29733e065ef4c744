//! Bounded worker pool over scoped threads.
//!
//! Jobs go out on a bounded channel, results come back on an unbounded one
//! and are handed to the caller on the calling thread. Workers never touch
//! caller state.

use crossbeam_channel::{bounded, unbounded};

use crate::constants::QUEUE_DEPTH_PER_WORKER;

/// Run `work` over `jobs` on `workers` threads, feeding each result to
/// `on_result` on the calling thread. Returns once every job has finished.
pub(crate) fn run_pool<J, R, W, F>(workers: usize, jobs: Vec<J>, work: W, mut on_result: F)
where
    J: Send,
    R: Send,
    W: Fn(J) -> R + Sync,
    F: FnMut(R),
{
    if jobs.is_empty() {
        return;
    }
    let workers = workers.clamp(1, jobs.len());
    let (job_tx, job_rx) = bounded::<J>(workers * QUEUE_DEPTH_PER_WORKER);
    let (result_tx, result_rx) = unbounded::<R>();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let work = &work;
            scope.spawn(move || {
                for job in job_rx {
                    if result_tx.send(work(job)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(job_rx);
        drop(result_tx);

        for job in jobs {
            // Only fails if every worker is gone, which means one panicked;
            // the scope re-raises that panic on exit.
            if job_tx.send(job).is_err() {
                break;
            }
        }
        drop(job_tx);

        for result in result_rx {
            on_result(result);
        }
    });
}
