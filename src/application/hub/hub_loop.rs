//! The hub loop: single owner of the registry.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::hub::{BroadcastFrame, Topic};

use super::command::Command;
use super::dispatch::{self, Delivery};
use super::handle::HubHandle;
use super::registry::Registry;

/// Start the hub loop on the current runtime.
///
/// Returns the handle collaborators submit through and the loop's task.
/// The loop ends once every clone of the handle has been dropped.
pub fn spawn_hub(mailbox_capacity: usize) -> (HubHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(mailbox_capacity);
    let hub_loop = HubLoop::new(rx, tx.downgrade());
    let task = tokio::spawn(hub_loop.run());
    (HubHandle::new(tx), task)
}

/// Serialized control loop over the registry.
///
/// Processes one command at a time and never awaits anything except its
/// mailbox. All connection I/O runs in spawned dispatch tasks, which hold a
/// weak sender so they can report failures without keeping the hub alive.
pub struct HubLoop {
    registry: Registry,
    mailbox: mpsc::Receiver<Command>,
    feedback: mpsc::WeakSender<Command>,
}

impl HubLoop {
    pub fn new(mailbox: mpsc::Receiver<Command>, feedback: mpsc::WeakSender<Command>) -> Self {
        Self {
            registry: Registry::new(),
            mailbox,
            feedback,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Hub loop started");

        while let Some(command) = self.mailbox.recv().await {
            tracing::trace!(command = command.kind(), "Hub command received");
            self.handle(command);
        }

        tracing::info!(
            connections = self.registry.len(),
            "Hub mailbox closed, hub loop stopped"
        );
    }

    /// Apply one command. Synchronous on purpose: nothing here may wait on a connection.
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Register { connection, sink } => {
                if self.registry.register(connection, sink).is_some() {
                    tracing::info!(connection_id = %connection, "Client re-registered, state reset");
                } else {
                    tracing::info!(connection_id = %connection, "Client connected");
                }
            }

            Command::Unregister(connection) => match self.registry.unregister(&connection) {
                Some(record) => {
                    tokio::spawn(dispatch::release(connection, record.slot()));
                    tracing::info!(connection_id = %connection, "Connection unregistered");
                }
                None => {
                    tracing::trace!(connection_id = %connection, "Unregister for unknown connection ignored");
                }
            },

            Command::Subscribe { connection, topic } => {
                if let Some(record) = self.registry.get_mut(&connection) {
                    record.subscribe(topic.clone());
                    tracing::debug!(connection_id = %connection, topic = %topic, "Subscribed to topic");
                }
            }

            Command::Unsubscribe { connection, topic } => {
                if let Some(record) = self.registry.get_mut(&connection) {
                    record.unsubscribe(&topic);
                    tracing::debug!(connection_id = %connection, topic = %topic, "Unsubscribed from topic");
                }
            }

            Command::Echo { connection, text } => {
                if let Some(record) = self.registry.get(&connection) {
                    tokio::spawn(dispatch::dispatch(
                        connection,
                        record.slot(),
                        Delivery::Echo(text),
                        self.feedback.clone(),
                    ));
                }
            }

            Command::Broadcast { topic, message } => self.broadcast(topic, message),

            Command::Touch(connection) => {
                if let Some(record) = self.registry.get(&connection) {
                    tokio::spawn(dispatch::touch(record.slot()));
                }
            }

            Command::Stats(reply) => {
                // The requester may have given up; nothing to do then.
                let _ = reply.send(self.registry.stats());
            }
        }
    }

    fn broadcast(&self, topic: Topic, message: String) {
        let frame = BroadcastFrame::new(topic, message);
        let payload: Arc<str> = match frame.encode() {
            Ok(json) => Arc::from(json),
            Err(e) => {
                tracing::error!(topic = %frame.topic, error = %e, "Couldn't encode broadcast");
                return;
            }
        };

        let mut recipients = 0usize;
        for (connection, slot) in self.registry.subscribers(&frame.topic) {
            tokio::spawn(dispatch::dispatch(
                connection,
                slot,
                Delivery::Broadcast(Arc::clone(&payload)),
                self.feedback.clone(),
            ));
            recipients += 1;
        }

        tracing::debug!(topic = %frame.topic, recipients, "Broadcast dispatched");
    }
}
