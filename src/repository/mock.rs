use super::transport::{Transport, TransportError};
use crate::model::{Name, Response};
use hostwalk_proto::buffer::ReaderError;
use hostwalk_proto::packet::QueryType;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Mutex;

/// Scripted outcome for one (server, name, type) slot.
#[derive(Clone, Debug)]
pub enum Script {
    Reply(Response),
    Timeout,
    /// The server answered with bytes that do not decode.
    Garbage,
}

/// In-memory stand-in for the UDP transport. Unscripted slots behave like a
/// dead server unless a fallback script is installed. Every call is
/// journaled so tests can assert on attempt counts and ordering.
#[derive(Default)]
pub struct MockTransport {
    scripts: HashMap<(Ipv4Addr, Name, QueryType), Script>,
    fallback: Option<Script>,
    journal: Mutex<Vec<(Ipv4Addr, Name, QueryType)>>,
}

impl MockTransport {
    pub fn with_reply(
        self,
        server: Ipv4Addr,
        name: &str,
        qtype: QueryType,
        response: Response,
    ) -> Self {
        self.with_script(server, name, qtype, Script::Reply(response))
    }

    pub fn with_script(
        mut self,
        server: Ipv4Addr,
        name: &str,
        qtype: QueryType,
        script: Script,
    ) -> Self {
        self.scripts
            .insert((server, Name::new(name), qtype), script);
        self
    }

    pub fn with_fallback(mut self, script: Script) -> Self {
        self.fallback = Some(script);
        self
    }

    pub fn journal(&self) -> Vec<(Ipv4Addr, Name, QueryType)> {
        self.journal.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.journal.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn query(
        &self,
        server: Ipv4Addr,
        name: &Name,
        qtype: QueryType,
    ) -> Result<Response, TransportError> {
        self.journal
            .lock()
            .unwrap()
            .push((server, name.clone(), qtype));

        let script = self
            .scripts
            .get(&(server, name.clone(), qtype))
            .or(self.fallback.as_ref());
        match script {
            Some(Script::Reply(response)) => Ok(response.clone()),
            Some(Script::Garbage) => Err(TransportError::Decode(ReaderError::EndOfBuffer)),
            Some(Script::Timeout) | None => Err(TransportError::Timeout),
        }
    }
}
