use crate::cluster::ClusterConfig;
use crate::driver::{Connector, DriverError, DriverResult, ResultSet, Session};
use manipulate_core::{Batch, Statement};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// One request received by a [`MemorySession`]
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `Session::query`
    Query(Statement),
    /// `Session::execute`
    Execute(Statement),
    /// `Session::execute_batch`
    Batch(Batch),
}

#[derive(Default)]
struct State {
    requests: Vec<Request>,
    results: VecDeque<ResultSet>,
    failures: VecDeque<DriverError>,
    fail_always: Option<DriverError>,
}

impl State {
    fn outcome(&mut self) -> DriverResult<()> {
        if let Some(e) = self.failures.pop_front() {
            return Err(e);
        }
        match &self.fail_always {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// In-memory session that records requests instead of sending them
///
/// Every request is recorded, including failed ones. Queries return queued
/// result sets in order, then empty ones.
#[derive(Default)]
pub struct MemorySession {
    state: Mutex<State>,
}

impl MemorySession {
    /// Create a session where every request succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next query
    pub fn push_result(&self, result: ResultSet) {
        self.state.lock().results.push_back(result);
    }

    /// Fail the next request (of any kind) with `error`; calls stack
    pub fn fail_next(&self, error: DriverError) {
        self.state.lock().failures.push_back(error);
    }

    /// Fail every request with `error` until [`MemorySession::heal`]
    pub fn fail_always(&self, error: DriverError) {
        self.state.lock().fail_always = Some(error);
    }

    /// Stop failing requests
    pub fn heal(&self) {
        let mut state = self.state.lock();
        state.failures.clear();
        state.fail_always = None;
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Batches received, in order
    pub fn batches(&self) -> Vec<Batch> {
        self.state
            .lock()
            .requests
            .iter()
            .filter_map(|r| match r {
                Request::Batch(b) => Some(b.clone()),
                _ => None,
            })
            .collect()
    }

    /// Single statements received (queries and executes), in order
    pub fn statements(&self) -> Vec<Statement> {
        self.state
            .lock()
            .requests
            .iter()
            .filter_map(|r| match r {
                Request::Query(s) | Request::Execute(s) => Some(s.clone()),
                Request::Batch(_) => None,
            })
            .collect()
    }

    /// Forget every recorded request
    pub fn clear(&self) {
        self.state.lock().requests.clear();
    }
}

impl Session for MemorySession {
    fn query(&self, statement: &Statement) -> DriverResult<ResultSet> {
        let mut state = self.state.lock();
        state.requests.push(Request::Query(statement.clone()));
        state.outcome()?;
        Ok(state.results.pop_front().unwrap_or_default())
    }

    fn execute(&self, statement: &Statement) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.requests.push(Request::Execute(statement.clone()));
        state.outcome()
    }

    fn execute_batch(&self, batch: &Batch) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.requests.push(Request::Batch(batch.clone()));
        state.outcome()
    }
}

/// Connector returning a fixed session, or refusing every connection
pub struct MemoryConnector {
    session: Option<Arc<MemorySession>>,
    refusal: String,
    last_config: Mutex<Option<ClusterConfig>>,
}

impl MemoryConnector {
    /// Connector that always hands out `session`
    pub fn new(session: Arc<MemorySession>) -> Self {
        MemoryConnector {
            session: Some(session),
            refusal: String::new(),
            last_config: Mutex::new(None),
        }
    }

    /// Connector that fails every connection with `NoHosts(reason)`
    pub fn refusing(reason: impl Into<String>) -> Self {
        MemoryConnector {
            session: None,
            refusal: reason.into(),
            last_config: Mutex::new(None),
        }
    }

    /// Configuration of the most recent connection attempt
    pub fn last_config(&self) -> Option<ClusterConfig> {
        self.last_config.lock().clone()
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, config: &ClusterConfig) -> DriverResult<Arc<dyn Session>> {
        *self.last_config.lock() = Some(config.clone());
        match &self.session {
            Some(session) => Ok(session.clone() as Arc<dyn Session>),
            None => Err(DriverError::NoHosts(self.refusal.clone())),
        }
    }
}
