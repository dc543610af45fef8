//! Clock / scheduler abstraction: "run once after a delay" and "run every
//! interval", both cancellable. Everything is single-threaded; callbacks are
//! never invoked from inside a scheduling call.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Shortest repeat interval a [`Scheduler`] has to honour. Browsers clamp
/// shorter `setInterval` delays, and [`ManualScheduler`] does the same.
pub const MIN_INTERVAL_MS: f64 = 1.0;

pub trait Scheduler {
    fn run_once(&self, delay_ms: f64, task: Box<dyn FnOnce()>) -> TimerId;
    /// Intervals below [`MIN_INTERVAL_MS`] may be raised to it.
    fn run_every(&self, interval_ms: f64, task: Box<dyn FnMut()>) -> TimerId;
    /// Stop a pending or repeating timer. Unknown or finished ids are ignored.
    fn cancel(&self, id: TimerId);
}

enum Task {
    Once(Box<dyn FnOnce()>),
    Every { interval_ms: f64, task: Box<dyn FnMut()> },
}

struct Pending {
    id: TimerId,
    due_ms: f64,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Queue {
    pending: Vec<Pending>,
    /// Repeating timers cancelled while their callback was running.
    cancelled: HashSet<TimerId>,
    running: Option<TimerId>,
}

/// Virtual-time scheduler. Time only moves through [`ManualScheduler::advance`];
/// due callbacks run ordered by due time, then by registration order.
#[derive(Default)]
pub struct ManualScheduler {
    now_ms: Cell<f64>,
    next_id: Cell<u64>,
    next_seq: Cell<u64>,
    queue: RefCell<Queue>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now_ms.get()
    }

    /// Number of timers still waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Move the clock forward by `ms`, firing everything that falls due on the way.
    pub fn advance(&self, ms: f64) {
        let target = self.now_ms.get() + ms.max(0.0);
        while let Some(next) = self.pop_due(target) {
            self.now_ms.set(next.due_ms);
            match next.task {
                Task::Once(task) => task(),
                Task::Every { interval_ms, mut task } => {
                    self.queue.borrow_mut().running = Some(next.id);
                    task();
                    let mut q = self.queue.borrow_mut();
                    q.running = None;
                    if !q.cancelled.remove(&next.id) {
                        let seq = self.bump_seq();
                        q.pending.push(Pending {
                            id: next.id,
                            due_ms: next.due_ms + interval_ms,
                            seq,
                            task: Task::Every { interval_ms, task },
                        });
                    }
                }
            }
        }
        self.now_ms.set(target);
    }

    fn pop_due(&self, target: f64) -> Option<Pending> {
        let mut q = self.queue.borrow_mut();
        let idx = q
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= target)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(idx, _)| idx)?;
        Some(q.pending.swap_remove(idx))
    }

    fn bump_seq(&self) -> u64 {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        seq
    }

    fn push(&self, due_ms: f64, task: Task) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let seq = self.bump_seq();
        self.queue.borrow_mut().pending.push(Pending { id, due_ms, seq, task });
        id
    }
}

impl Scheduler for ManualScheduler {
    fn run_once(&self, delay_ms: f64, task: Box<dyn FnOnce()>) -> TimerId {
        self.push(self.now() + delay_ms.max(0.0), Task::Once(task))
    }

    fn run_every(&self, interval_ms: f64, task: Box<dyn FnMut()>) -> TimerId {
        let interval_ms = interval_ms.max(MIN_INTERVAL_MS);
        self.push(self.now() + interval_ms, Task::Every { interval_ms, task })
    }

    fn cancel(&self, id: TimerId) {
        let mut q = self.queue.borrow_mut();
        q.pending.retain(|p| p.id != id);
        if q.running == Some(id) {
            q.cancelled.insert(id);
        }
    }
}
