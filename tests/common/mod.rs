#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sql_orm_adapter::{
    ConnectionConfig, Connector, EngineError, PostgresAdapter, ResultData, Session, Value,
};

type Reply = Result<ResultData, EngineError>;

/// Build a result with a row description.
pub fn rows(columns: &[&str], values: Vec<Vec<Value>>) -> ResultData {
    ResultData::from_values(columns.iter().map(|c| (*c).to_string()).collect(), values)
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// Session answering statements from a script of `(fragment, reply)` pairs.
///
/// The first fragment contained in the SQL wins; unmatched statements get an
/// empty result with no row description, like DDL.
pub struct MockSession {
    script: Vec<(String, Reply)>,
    log: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl MockSession {
    pub fn new(script: Vec<(String, Reply)>) -> Self {
        Self {
            script,
            log: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Session for MockSession {
    async fn query(&self, sql: &str) -> Result<ResultData, EngineError> {
        self.log.lock().unwrap().push(sql.to_string());
        self.script
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map_or_else(|| Ok(ResultData::empty()), |(_, reply)| reply.clone())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Connector handing out scripted sessions and counting handshakes.
#[derive(Default)]
pub struct MockConnector {
    script: Vec<(String, Reply)>,
    delay: Duration,
    failure: Option<EngineError>,
    connects: AtomicUsize,
    sessions: Mutex<Vec<Arc<MockSession>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, fragment: &str, reply: Reply) -> Self {
        self.script.push((fragment.to_string(), reply));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, err: EngineError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn session(&self, index: usize) -> Arc<MockSession> {
        self.sessions.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _config: &ConnectionConfig) -> Result<Arc<dyn Session>, EngineError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let session = Arc::new(MockSession::new(self.script.clone()));
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }
}

pub fn adapter_with(connector: &Arc<MockConnector>) -> PostgresAdapter {
    PostgresAdapter::new(ConnectionConfig::new("test_db")).with_connector(connector.clone())
}
