use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use crate::config::Source;
use crate::error::AcquireError;

/// One acquisition request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub app_id: String,
    pub source: Source,
}

impl Job {
    pub fn new(app_id: impl Into<String>, source: Source) -> Self {
        Self {
            app_id: app_id.into().trim().to_string(),
            source,
        }
    }
}

/// Lifecycle of a job: `Idle -> Running -> {Succeeded, Failed}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Outcome of copying `<appid>.lua` into Steam
#[derive(Debug, Default)]
pub enum PostInstall {
    #[default]
    Skipped,
    Installed(PathBuf),
    Failed(AcquireError),
}

#[derive(Debug)]
pub struct JobReport {
    pub job: Job,
    pub state: JobState,
    pub failure: Option<AcquireError>,
    /// Directory the retained files were moved into
    pub target_dir: Option<PathBuf>,
    pub retained: usize,
    pub post_install: PostInstall,
}

impl JobReport {
    pub(crate) fn new(job: Job) -> Self {
        Self {
            job,
            state: JobState::Running,
            failure: None,
            target_dir: None,
            retained: 0,
            post_install: PostInstall::Skipped,
        }
    }

    pub(crate) fn fail(mut self, error: AcquireError) -> Self {
        self.state = JobState::Failed;
        self.failure = Some(error);
        self
    }

    pub fn succeeded(&self) -> bool {
        self.state == JobState::Succeeded
    }
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.state, &self.failure) {
            (JobState::Failed, Some(e)) => write!(f, "{} failed: {}", self.job.app_id, e),
            (JobState::Succeeded, _) => {
                write!(f, "{} done", self.job.app_id)?;
                if let Some(dir) = &self.target_dir {
                    write!(f, ", {} file(s) in {}", self.retained, dir.display())?;
                }
                match &self.post_install {
                    PostInstall::Skipped => Ok(()),
                    PostInstall::Installed(path) => write!(f, ", installed {}", path.display()),
                    PostInstall::Failed(e) => write!(f, " (install skipped: {})", e),
                }
            }
            (state, _) => write!(f, "{} {:?}", self.job.app_id, state),
        }
    }
}

/// Message from a running job to whoever started it
#[derive(Debug)]
pub enum JobEvent {
    Log(String),
    GameInfo {
        name: Option<String>,
        header_image: Option<String>,
        folder: String,
    },
    Finished(JobReport),
}

/// Sending half of a job's event channel.
///
/// Every log line also goes to tracing, so the log file has it even when
/// nobody is listening.
#[derive(Clone)]
pub struct EventSink {
    tx: Option<Sender<JobEvent>>,
}

impl EventSink {
    pub fn new(tx: Sender<JobEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Sink that only logs
    #[cfg(test)]
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.send(JobEvent::Log(message));
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.send(JobEvent::Log(message));
    }

    pub fn send(&self, event: JobEvent) {
        if let Some(tx) = &self.tx {
            // Receiver may have gone away, the job still runs to completion
            let _ = tx.send(event);
        }
    }
}
