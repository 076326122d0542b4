//! The pub/sub connection hub.
//!
//! # Architecture
//!
//! ```text
//!  ConnectionReader (one per connection)      BroadcastMessageHandler
//!            │ subscribe / unsubscribe / echo         │ broadcast
//!            ▼                                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    mailbox (mpsc::Sender<Command>)           │
//! └─────────────────────────────────────────────────────────────┘
//!            │ one command at a time
//!            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ HubLoop - sole owner of the Registry                         │
//! │   conn-a → ClientRecord { topics, Arc<Mutex<ConnectionSlot>> }│
//! │   conn-b → ClientRecord { topics, Arc<Mutex<ConnectionSlot>> }│
//! └─────────────────────────────────────────────────────────────┘
//!            │ tokio::spawn per connection per message
//!            ▼
//!   dispatch task: lock slot → write → on failure mark closing,
//!                  close, send Unregister back into the mailbox
//! ```
//!
//! The loop never awaits anything but its mailbox, so one stuck connection
//! only ever stalls its own dispatch tasks.

mod client_record;
mod command;
mod dispatch;
mod handle;
mod hub_loop;
mod reader;
mod registry;

pub use client_record::{ClientRecord, ConnectionSlot};
pub use command::Command;
pub use handle::{HubError, HubHandle};
pub use hub_loop::{spawn_hub, HubLoop};
pub use reader::{ConnectionReader, ReaderExit};
pub use registry::{HubStats, Registry};
