//! Background execution of one job at a time

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crate::error::{AcquireError, AcquireResult};
use crate::job::pipelines::{AcquireContext, run_job};
use crate::job::types::{EventSink, Job, JobEvent, JobState};

/// Starts jobs on a worker thread and refuses a second one while the first
/// is still running. Results come back over the returned channel.
pub struct JobRunner {
    ctx: Arc<AcquireContext>,
    task: Option<JoinHandle<()>>,
}

impl JobRunner {
    pub fn new(ctx: AcquireContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            task: None,
        }
    }

    pub fn state(&mut self) -> JobState {
        self.reap();
        if self.task.is_some() {
            JobState::Running
        } else {
            JobState::Idle
        }
    }

    /// Start `job` in the background, or fail with `Busy`.
    ///
    /// The last event on the channel is always `JobEvent::Finished`.
    pub fn start(&mut self, job: Job) -> AcquireResult<Receiver<JobEvent>> {
        self.reap();
        if self.task.is_some() {
            tracing::warn!("rejected job for {}: another job is running", job.app_id);
            return Err(AcquireError::Busy);
        }

        let (tx, rx) = mpsc::channel();
        let ctx = Arc::clone(&self.ctx);
        let handle = thread::Builder::new()
            .name(format!("job-{}", job.app_id))
            .spawn(move || {
                let events = EventSink::new(tx);
                let report = run_job(&job, &ctx, &events);
                events.send(JobEvent::Finished(report));
            })
            .map_err(AcquireError::Spawn)?;

        self.task = Some(handle);
        Ok(rx)
    }

    /// Drop the handle of a finished job
    fn reap(&mut self) {
        if let Some(handle) = self.task.take() {
            if handle.is_finished() {
                if handle.join().is_err() {
                    tracing::error!("job thread panicked");
                }
            } else {
                self.task = Some(handle);
            }
        }
    }
}
