use async_trait::async_trait;
use hyper::StatusCode;
use serde_json::Value;
use slm_client::{Error, Response, Transport};
use slm_database::{DatabaseError, ErrorKind, MemoryStore, OptionStore};
use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use crate::{scheduler::Scheduler, settings::ClientSettings};

pub fn settings() -> ClientSettings {
    ClientSettings {
        server_url: "https://slm.example.org/".into(),
        secret_key: "s3cret".into(),
        registered_domain: "example.com".into(),
        item_reference: "plugin-a".into(),
        version: "1.2.3".into(),
        plugin_basename: "plugin-a/plugin-a.php".into(),
        option_prefix: "test_plugin".into(),
    }
}

pub enum Reply {
    Body(&'static str),
    Unreachable,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Get(String),
    Post(String, String),
}

/// Answers requests from a script, in order, and records them.
pub struct FakeTransport {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn replying(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn reply(&self, call: Call, timeout: Duration) -> Result<Response, Error> {
        self.calls.lock().unwrap().push(call);
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Body(body)) => Ok(Response::new(StatusCode::OK, body)),
            Some(Reply::Unreachable) => Err(Error::Timeout(timeout)),
            None => panic!("no reply scripted for this request"),
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, Error> {
        self.reply(Call::Get(url.to_string()), timeout)
    }

    async fn post(
        &self,
        url: &str,
        form: Vec<u8>,
        timeout: Duration,
    ) -> Result<Response, Error> {
        let form = String::from_utf8(form).unwrap();
        self.reply(Call::Post(url.to_string(), form), timeout)
    }
}

#[derive(Default)]
pub struct RecordingScheduler {
    scheduled: Mutex<HashSet<String>>,
    schedule_calls: AtomicUsize,
}

impl RecordingScheduler {
    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }
}

impl Scheduler for RecordingScheduler {
    fn is_scheduled(&self, task: &str) -> bool {
        self.scheduled.lock().unwrap().contains(task)
    }

    fn schedule_recurring(&self, task: &str, _interval: Duration) {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        self.scheduled.lock().unwrap().insert(task.to_string());
    }

    fn clear(&self, task: &str) {
        self.scheduled.lock().unwrap().remove(task);
    }
}

/// Options in memory, where reads or writes of chosen names fail as if the database went
/// away.
#[derive(Default)]
pub struct FailingStore {
    options: MemoryStore,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
}

impl FailingStore {
    pub fn fail_reads(&self, name: &str) {
        self.failing_reads.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_writes(&self, name: &str) {
        self.failing_writes.lock().unwrap().insert(name.to_string());
    }

    fn check(failing: &Mutex<HashSet<String>>, name: &str) -> Result<(), DatabaseError> {
        if failing.lock().unwrap().contains(name) {
            Err(DatabaseError::from_parts(
                ErrorKind::Postgres,
                Some("connection closed".into()),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl OptionStore for FailingStore {
    async fn get(&self, name: &str) -> Result<Option<Value>, DatabaseError> {
        Self::check(&self.failing_reads, name)?;
        self.options.get(name).await
    }

    async fn set(&self, name: &str, value: Value) -> Result<(), DatabaseError> {
        Self::check(&self.failing_writes, name)?;
        self.options.set(name, value).await
    }

    async fn delete(&self, name: &str) -> Result<(), DatabaseError> {
        Self::check(&self.failing_writes, name)?;
        self.options.delete(name).await
    }
}
