use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

/// Frame phases, run in declaration order once per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Read inputs (scroll offsets) and mutate DOM.
    Sync,
    /// Measure the result of `Sync`.
    Measure,
    /// Late DOM placement that depends on the host having rendered.
    Layout,
    /// Callbacks and other side effects.
    Affect,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Sync, Phase::Measure, Phase::Layout, Phase::Affect];

    fn slot(self) -> usize {
        self as usize
    }
}

/// A cancellation capability shared by every job an owner schedules.
///
/// Cancelling a token also cancels all of its descendants.
#[derive(Clone, Default)]
pub struct Token {
    inner: Rc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    cancelled: Cell<bool>,
    parent: Option<Token>,
}

impl Token {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            inner: Rc::new(TokenInner {
                cancelled: Cell::new(false),
                parent: Some(self.clone()),
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.get() {
            return true;
        }
        self.inner
            .parent
            .as_ref()
            .is_some_and(|parent| parent.is_cancelled())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

pub type Job = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobId(u64);

/// The scheduling primitive the radar depends on.
pub trait Scheduler {
    /// Enqueues `job` into `phase`. The job is dropped without running if `token` is cancelled
    /// by the time its phase is flushed.
    fn schedule(&self, phase: Phase, job: Job, token: &Token) -> JobId;

    /// Drops a queued job. No-op if it already ran.
    fn forget(&self, id: JobId);
}

struct Queued {
    id: JobId,
    job: Job,
    token: Token,
}

#[derive(Default)]
struct Queues {
    phases: [VecDeque<Queued>; 4],
    next_id: u64,
    frames: u64,
}

/// A cooperative multi-queue scheduler driven by the host's frame callback.
///
/// `run_frame` flushes [`Phase::ALL`] in order. A job scheduled into the running phase or a later
/// one runs in the same frame; a job scheduled into an earlier phase waits for the next frame.
#[derive(Clone, Default)]
pub struct FrameScheduler {
    inner: Rc<RefCell<Queues>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame and returns how many jobs ran.
    pub fn run_frame(&self) -> usize {
        let mut ran = 0usize;
        for phase in Phase::ALL {
            loop {
                // The borrow must end before the job runs: jobs schedule more jobs.
                let next = self.inner.borrow_mut().phases[phase.slot()].pop_front();
                let Some(queued) = next else {
                    break;
                };
                if queued.token.is_cancelled() {
                    rtrace!(phase = ?phase, id = queued.id.0, "dropping cancelled job");
                    continue;
                }
                (queued.job)();
                ran += 1;
            }
        }
        self.inner.borrow_mut().frames += 1;
        ran
    }

    /// Runs frames until nothing live is queued, up to `max_frames`. Returns frames run.
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.has_pending() {
            self.run_frame();
            frames += 1;
        }
        frames
    }

    pub fn has_pending(&self) -> bool {
        self.inner
            .borrow()
            .phases
            .iter()
            .flatten()
            .any(|q| !q.token.is_cancelled())
    }

    pub fn pending(&self, phase: Phase) -> usize {
        self.inner.borrow().phases[phase.slot()].len()
    }

    /// Number of completed frames.
    pub fn frames(&self) -> u64 {
        self.inner.borrow().frames
    }
}

impl Scheduler for FrameScheduler {
    fn schedule(&self, phase: Phase, job: Job, token: &Token) -> JobId {
        let mut inner = self.inner.borrow_mut();
        let id = JobId(inner.next_id);
        inner.next_id += 1;
        inner.phases[phase.slot()].push_back(Queued {
            id,
            job,
            token: token.clone(),
        });
        id
    }

    fn forget(&self, id: JobId) {
        let mut inner = self.inner.borrow_mut();
        for queue in inner.phases.iter_mut() {
            queue.retain(|q| q.id != id);
        }
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FrameScheduler")
            .field("sync", &inner.phases[0].len())
            .field("measure", &inner.phases[1].len())
            .field("layout", &inner.phases[2].len())
            .field("affect", &inner.phases[3].len())
            .field("frames", &inner.frames)
            .finish()
    }
}
