//! The event-driven outbreak engine.
//!
//! One [`Simulation`] owns a network view, a generator stream, the
//! skip-ahead table and the event queue, and runs any number of
//! independent SIR trials over them. Per trial it seeds one random
//! source and then processes infection events in time order until the
//! queue drains; the outbreak size is the number of nodes infected.

use tracing::{debug, info};

use crate::core::network::Network;
use crate::core::queue::EventQueue;
use crate::core::rng::Pcg32;
use crate::core::sampling::{RecoverySampler, SkipTable};
use crate::error::{Error, Result};

/// Epidemic parameters.
///
/// `beta` is the per-contact transmission probability; any value of 1
/// or more means every contact transmits. `nu` is the recovery rate,
/// expressed in units of the observation duration.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    pub beta: f64,
    pub nu: f64,
}

impl Params {
    /// Validate the parameter ranges.
    ///
    /// Errors: `InvalidParam` unless both values are finite and
    /// positive.
    pub fn new(beta: f64, nu: f64) -> Result<Self> {
        if !beta.is_finite() || beta <= 0.0 {
            return Err(Error::InvalidParam("beta must be finite and > 0".into()));
        }
        if !nu.is_finite() || nu <= 0.0 {
            return Err(Error::InvalidParam("nu must be finite and > 0".into()));
        }
        Ok(Self { beta, nu })
    }
}

/// Outcome of searching one neighbor's contact sequence for the
/// contact that would pass the infection on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactSearch {
    /// Every contact with this neighbor lies in the past.
    Exhausted,
    /// The geometric skip ran past the last contact; no transmission
    /// through this neighbor in this trial.
    Skipped,
    /// Transmission happens at this contact time.
    At(u32),
}

/// Locate the contact through which infection would pass, given one
/// neighbor's ascending contact times and the current time.
///
/// A single 16-bit draw against the skip table replaces a chain of
/// per-contact Bernoulli trials: the table directly samples how many
/// future contacts fail before one succeeds. An empty sequence counts
/// as exhausted.
fn contagious_contact(times: &[u32], now: u32, rng: &mut Pcg32, skip: &SkipTable) -> ContactSearch {
    match times.last() {
        None => return ContactSearch::Exhausted,
        Some(&last) if last <= now => return ContactSearch::Exhausted,
        Some(_) => {}
    }
    // First index strictly after `now`; in range because the guard
    // above saw a future contact.
    let first_future = times.partition_point(|&t| t <= now);
    let index = first_future + skip.skip(rng.draw16());
    match times.get(index) {
        Some(&t) => ContactSearch::At(t),
        None => ContactSearch::Skipped,
    }
}

/// Event-driven SIR simulation over one temporal contact network.
#[derive(Debug)]
pub struct Simulation {
    network: Network,
    params: Params,
    rng: Pcg32,
    skip: SkipTable,
    recovery: RecoverySampler,
    queue: EventQueue,
    /// Nodes infected in the current trial, in processing order.
    infected: Vec<u32>,
}

impl Simulation {
    /// Create a simulation context.
    ///
    /// `seed` fixes the generator state for reproducible runs; `None`
    /// seeds from process entropy.
    pub fn new(network: Network, params: Params, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(s) => Pcg32::new(s),
            None => Pcg32::from_entropy(),
        };
        let skip = SkipTable::new(params.beta)?;
        let recovery = RecoverySampler::new(params.nu, network.duration())?;
        let population = network.population() as usize;
        Ok(Self {
            network,
            params,
            rng,
            skip,
            recovery,
            queue: EventQueue::new(population),
            infected: Vec::with_capacity(population),
        })
    }

    /// The network this context simulates over.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Current epidemic parameters.
    pub fn params(&self) -> Params {
        self.params
    }

    /// Change the transmission probability, rebuilding the skip table.
    pub fn set_beta(&mut self, beta: f64) -> Result<()> {
        self.params = Params::new(beta, self.params.nu)?;
        self.skip = SkipTable::new(beta)?;
        debug!(beta, "rebuilt the skip table");
        Ok(())
    }

    /// Run one outbreak trial and return its size.
    pub fn run_trial(&mut self) -> u32 {
        self.infected.clear();

        // Seed one random source at a random exposure time.
        let source = self.rng.draw32_bounded(self.network.population());
        let start = self.rng.draw32_bounded(self.network.duration());
        self.queue.schedule(source, start);

        while !self.queue.is_empty() {
            self.step();
        }

        // Per-trial cleanup touches only the nodes this trial reached,
        // not the whole population.
        for &node in &self.infected {
            self.queue.reset(node);
        }
        self.infected.len() as u32
    }

    /// Run `trials` independent outbreaks; one size per trial, in
    /// trial order.
    pub fn run(&mut self, trials: usize) -> Vec<u32> {
        info!(
            trials,
            population = self.network.population(),
            "running outbreak trials"
        );
        (0..trials).map(|_| self.run_trial()).collect()
    }

    /// Process the next infection event: infect the minimum-time node
    /// and scan its neighbors for onward transmissions.
    fn step(&mut self) {
        let Some((me, now)) = self.queue.pop_min() else {
            return;
        };

        let duration = self.recovery.sample(&mut self.rng);
        if duration > 0 {
            // Recovery instant; contacts after it cannot transmit.
            let until = now.saturating_add(duration);

            for link in &self.network.node(me).links {
                let you = link.other;
                // Infected neighbors are settled for this trial and
                // cost no randomness. A queued neighbor is still
                // susceptible: it has not transitioned yet and may be
                // reached earlier through this path.
                if self.queue.is_infected(you) {
                    continue;
                }
                match contagious_contact(&link.times, now, &mut self.rng, &self.skip) {
                    // Links are ordered by last contact time, so no
                    // later link can hold a future contact either.
                    ContactSearch::Exhausted => break,
                    ContactSearch::Skipped => continue,
                    ContactSearch::At(t) => {
                        let earlier = self.queue.infection_time(you).map_or(true, |cur| t < cur);
                        if t <= until && earlier {
                            self.queue.schedule(you, t);
                        }
                    }
                }
            }
        }

        self.infected.push(me);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::network::{Contact, ContactList};

    fn skip_table(beta: f64) -> SkipTable {
        SkipTable::new(beta).expect("valid beta")
    }

    #[test]
    fn params_are_validated() {
        assert!(Params::new(0.5, 1.0).is_ok());
        assert!(Params::new(2.0, 1.0).is_ok());
        assert!(Params::new(0.0, 1.0).is_err());
        assert!(Params::new(0.5, 0.0).is_err());
        assert!(Params::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn all_past_contacts_exhaust_the_search() {
        let mut rng = Pcg32::new(1);
        let table = skip_table(0.5);
        let r = contagious_contact(&[1, 2, 3], 3, &mut rng, &table);
        assert_eq!(r, ContactSearch::Exhausted);
        let r = contagious_contact(&[], 0, &mut rng, &table);
        assert_eq!(r, ContactSearch::Exhausted);
    }

    #[test]
    fn guaranteed_transmission_hits_the_first_future_contact() {
        let mut rng = Pcg32::new(2);
        let table = skip_table(1.0);
        for now in [0u32, 4, 5, 9] {
            let r = contagious_contact(&[5, 10, 20], now, &mut rng, &table);
            let expected = if now < 5 { 5 } else { 10 };
            assert_eq!(r, ContactSearch::At(expected), "wrong contact for now {now}");
        }
    }

    #[test]
    fn hits_are_always_future_contacts_from_the_sequence() {
        let mut rng = Pcg32::new(3);
        let times = [2u32, 4, 8, 16, 32, 64];
        for beta in [0.05, 0.5, 0.95] {
            let table = skip_table(beta);
            for _ in 0..500 {
                match contagious_contact(&times, 3, &mut rng, &table) {
                    ContactSearch::At(t) => {
                        assert!(times.contains(&t), "hit {t} is not a contact");
                        assert!(t > 3, "hit {t} is not in the future");
                    }
                    ContactSearch::Skipped => {}
                    ContactSearch::Exhausted => panic!("future contacts exist"),
                }
            }
        }
    }

    #[test]
    fn vanishing_beta_rarely_transmits() {
        let mut rng = Pcg32::new(4);
        let table = skip_table(1e-9);
        let times = [1u32, 2, 3];
        let hits = (0..1000)
            .filter(|_| {
                matches!(
                    contagious_contact(&times, 0, &mut rng, &table),
                    ContactSearch::At(_)
                )
            })
            .count();
        // The top table entry is an immediate success for any beta, so
        // a stray hit is possible; anything beyond that means the skip
        // counts are wrong.
        assert!(hits <= 2, "beta 1e-9 transmitted {hits} times in 1000 tries");
    }

    #[test]
    fn outbreak_sizes_stay_within_the_population() -> Result<()> {
        let contacts = vec![
            Contact { left: 0, right: 1, time: 10 },
            Contact { left: 1, right: 2, time: 20 },
            Contact { left: 2, right: 3, time: 30 },
            Contact { left: 0, right: 3, time: 40 },
        ];
        let list = ContactList::new(4, 50, contacts)?;
        let network = Network::from_contact_list(&list);
        let mut sim = Simulation::new(network, Params::new(0.7, 1.0)?, Some(99))?;
        for size in sim.run(500) {
            assert!((1..=4).contains(&size), "outbreak size {size} out of bounds");
        }
        Ok(())
    }

    #[test]
    fn set_beta_rejects_bad_values_and_keeps_running() -> Result<()> {
        let list = ContactList::new(2, 10, vec![Contact { left: 0, right: 1, time: 5 }])?;
        let network = Network::from_contact_list(&list);
        let mut sim = Simulation::new(network, Params::new(0.5, 1.0)?, Some(3))?;
        assert!(sim.set_beta(-1.0).is_err());
        sim.set_beta(1.0)?;
        assert_eq!(sim.params().beta, 1.0);
        let size = sim.run_trial();
        assert!((1..=2).contains(&size));
        Ok(())
    }
}
