//! Topic Hub - realtime topic-based pub/sub for WebSocket clients
//!
//! Clients open a websocket, subscribe to topics, and receive every message
//! broadcast to those topics. A single hub loop owns the connection registry;
//! writes to clients run in their own tasks so a slow client never stalls
//! the others.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
