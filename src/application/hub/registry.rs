//! Connection registry owned by the hub loop.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::foundation::ConnectionId;
use crate::domain::hub::Topic;
use crate::ports::ConnectionSink;

use super::client_record::{ClientRecord, ConnectionSlot};

/// Point-in-time registry counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    /// Registered connections.
    pub connections: usize,
    /// Sum of every connection's subscribed topics.
    pub subscriptions: usize,
    /// Distinct topics with at least one subscriber.
    pub topics: usize,
}

/// Mapping from connection to its record.
///
/// A record exists exactly while its connection is registered. Not
/// synchronized: it is owned and mutated by a single task.
#[derive(Default)]
pub struct Registry {
    clients: HashMap<ConnectionId, ClientRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh record. Returns the record it replaced, if any.
    pub fn register(
        &mut self,
        connection: ConnectionId,
        sink: Box<dyn ConnectionSink>,
    ) -> Option<ClientRecord> {
        self.clients.insert(connection, ClientRecord::new(sink))
    }

    /// Remove a record. Unknown connections yield `None`.
    pub fn unregister(&mut self, connection: &ConnectionId) -> Option<ClientRecord> {
        self.clients.remove(connection)
    }

    pub fn get(&self, connection: &ConnectionId) -> Option<&ClientRecord> {
        self.clients.get(connection)
    }

    pub fn get_mut(&mut self, connection: &ConnectionId) -> Option<&mut ClientRecord> {
        self.clients.get_mut(connection)
    }

    /// Write sides of every connection subscribed to `topic`.
    pub fn subscribers<'a>(
        &'a self,
        topic: &'a Topic,
    ) -> impl Iterator<Item = (ConnectionId, Arc<Mutex<ConnectionSlot>>)> + 'a {
        self.clients
            .iter()
            .filter(move |(_, record)| record.is_subscribed(topic))
            .map(|(connection, record)| (*connection, record.slot()))
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn stats(&self) -> HubStats {
        let mut topics = HashSet::new();
        let mut subscriptions = 0;
        for record in self.clients.values() {
            subscriptions += record.subscription_count();
            topics.extend(record.subscribed_topics());
        }

        HubStats {
            connections: self.clients.len(),
            subscriptions,
            topics: topics.len(),
        }
    }
}
