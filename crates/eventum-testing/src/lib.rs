//! Eventum Testing - deterministic RNG helpers and demonstration models
//!
//! The demonstration models validate the kernel end to end; they are not
//! part of it. The M/M/1 queueing system mirrors the classic single-server
//! queue with exponential arrivals and service.

pub mod mm1;
pub mod rng;

pub use mm1::{PacketQueue, QueueingSystem, Server, Sink, Source};
pub use rng::SimRng;
