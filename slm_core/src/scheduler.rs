use dashmap::DashMap;
use std::time::Duration;
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::triggers::Trigger;

/// How often an active license reports the installed version.
pub const VERSION_REPORT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Named periodic tasks.
pub trait Scheduler: Send + Sync {
    fn is_scheduled(&self, task: &str) -> bool;

    /// Starts firing `task` every `interval`, replacing a task of the same name.
    fn schedule_recurring(&self, task: &str, interval: Duration);

    fn clear(&self, task: &str);
}

/// Runs every task as a tokio timer which pushes [`Trigger::Scheduled`] into the trigger
/// channel. The first tick comes one full interval after scheduling.
pub struct TaskScheduler {
    tasks: DashMap<String, JoinHandle<()>>,
    triggers: UnboundedSender<Trigger>,
}

impl TaskScheduler {
    #[must_use]
    pub fn new(triggers: UnboundedSender<Trigger>) -> Self {
        Self {
            tasks: DashMap::new(),
            triggers,
        }
    }
}

impl Scheduler for TaskScheduler {
    fn is_scheduled(&self, task: &str) -> bool {
        self.tasks
            .get(task)
            .is_some_and(|handle| !handle.is_finished())
    }

    fn schedule_recurring(&self, task: &str, interval: Duration) {
        let name = task.to_string();
        let triggers = self.triggers.clone();
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + interval, interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                tracing::debug!(task = %name, "scheduled task fired");
                if triggers.send(Trigger::Scheduled(name.clone())).is_err() {
                    break;
                }
            }
        });

        if let Some(previous) = self.tasks.insert(task.to_string(), handle) {
            previous.abort();
        }
    }

    fn clear(&self, task: &str) {
        if let Some((_, handle)) = self.tasks.remove(task) {
            handle.abort();
        }
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        for task in self.tasks.iter() {
            task.value().abort();
        }
    }
}
