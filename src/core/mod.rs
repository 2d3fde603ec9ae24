//! Core simulation components: the deterministic generator, the
//! epidemic samplers, the contact network model, the event queue and
//! the two simulators.

pub mod network;
pub mod oracle;
pub mod queue;
pub mod rng;
pub mod sampling;
pub mod sim;

pub use network::{Contact, ContactList, Link, Network, Node};
pub use oracle::ReferenceSimulation;
pub use queue::EventQueue;
pub use rng::Pcg32;
pub use sampling::{RecoverySampler, SkipTable};
pub use sim::{Params, Simulation};
