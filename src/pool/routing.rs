//! Routing policies selectable per pool.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use super::Router;
use crate::config::RouterKind;
use crate::worker::WorkerHandle;

/// Build the router for a configured policy.
pub fn router_for(kind: RouterKind) -> Box<dyn Router> {
    match kind {
        RouterKind::RoundRobin => Box::new(RoundRobin::default()),
        RouterKind::Random => Box::new(RandomRouter),
        RouterKind::SmallestMailbox => Box::new(SmallestMailbox),
    }
}

/// Successive requests go to successive workers, wrapping around.
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: AtomicUsize,
}

impl Router for RoundRobin {
    fn next_worker<'a>(&self, workers: &'a [WorkerHandle]) -> &'a WorkerHandle {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % workers.len();
        &workers[index]
    }

    fn kind(&self) -> RouterKind {
        RouterKind::RoundRobin
    }
}

#[derive(Debug, Default)]
pub struct RandomRouter;

impl Router for RandomRouter {
    fn next_worker<'a>(&self, workers: &'a [WorkerHandle]) -> &'a WorkerHandle {
        let index = rand::rng().random_range(0..workers.len());
        &workers[index]
    }

    fn kind(&self) -> RouterKind {
        RouterKind::Random
    }
}

/// Prefers the worker with the fewest queued requests; ties go to the
/// lowest index.
#[derive(Debug, Default)]
pub struct SmallestMailbox;

impl Router for SmallestMailbox {
    fn next_worker<'a>(&self, workers: &'a [WorkerHandle]) -> &'a WorkerHandle {
        workers
            .iter()
            .min_by_key(|worker| worker.pending())
            .unwrap_or(&workers[0])
    }

    fn kind(&self) -> RouterKind {
        RouterKind::SmallestMailbox
    }
}
