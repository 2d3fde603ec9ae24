//! Event-driven SIR outbreak simulation on temporal contact networks.
//!
//! A temporal contact network is a fixed population in which pairs of
//! nodes meet at discrete, time-stamped contact events. An infection
//! crosses a contact with per-contact probability `beta`, and infected
//! nodes recover after an exponentially distributed duration governed
//! by the recovery rate `nu`. The crate runs many independent outbreak
//! trials from random sources and reports one outbreak size per trial.
//!
//! Two simulators expose the same statistic:
//!
//! - [`core::Simulation`] is the production engine. It replaces
//!   per-contact Bernoulli trials with a precomputed geometric
//!   skip-ahead table, finds each neighbor's transmitting contact by
//!   binary search, and drives the outbreak with an indexed min-heap.
//!   Per-trial cost scales with the outbreak, not the contact list.
//! - [`core::ReferenceSimulation`] scans the flat time-ordered contact
//!   list with one Bernoulli draw per relevant contact. It exists to
//!   cross-check the engine's output distribution and as a baseline.
//!
//! # Example
//!
//! ```no_run
//! use temporal_sir::core::{ContactList, Network, Params, Simulation};
//!
//! # fn main() -> temporal_sir::error::Result<()> {
//! let list = ContactList::from_path("contacts.txt")?;
//! let network = Network::from_contact_list(&list);
//! let mut sim = Simulation::new(network, Params::new(0.3, 2.0)?, Some(42))?;
//! let sizes = sim.run(10_000);
//! let mean = sizes.iter().map(|&s| f64::from(s)).sum::<f64>() / sizes.len() as f64;
//! println!("mean outbreak size: {mean:.2}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;

pub use crate::core::{ContactList, Network, Params, ReferenceSimulation, Simulation};
pub use crate::error::{Error, Result};
