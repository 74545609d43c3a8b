//! Eventum Core - discrete-event simulation kernel and model plumbing
//!
//! This crate provides the DES kernel (a priority-ordered event queue keyed
//! by simulated time plus the scheduler that consumes it) and the minimal
//! abstractions a simulation model needs to plug into it: a simulator
//! context facade, a hierarchical model base with named children, and named
//! connections that turn message sends into scheduled events.
//!
//! Execution is single-threaded and cooperative: handlers run to completion
//! on the dispatch thread, and independent runs share nothing.

pub mod children;
pub mod connection;
pub mod error;
pub mod event;
pub mod id;
pub mod kernel;
pub mod logger;
pub mod model;
pub mod params;
pub mod queue;
pub mod registry;
pub mod sim;
pub mod stop;
pub mod time;

pub use children::{ChildSlot, Children};
pub use connection::{Connection, Connections, Delay};
pub use error::{SimError, SimResult};
pub use event::{Event, Handler, HandlerFn};
pub use id::{EventId, IdGenerator};
pub use kernel::Kernel;
pub use logger::{LogLevel, LogRecord, LogSink, Logger, MemorySink, StdoutSink};
pub use model::{as_model, Message, Model, ModelBase, ModelExt, ModelRef, WeakModel};
pub use params::Params;
pub use queue::EventQueue;
pub use registry::{HandlerRegistry, NamedHandler};
pub use sim::{simulate, simulate_with, SetupFn, SimulationBuilder, Simulator, WeakSim};
pub use stop::StopCondition;
pub use time::SimTime;
