//! Contact-scanning reference simulator.
//!
//! A structurally different implementation kept to cross-check the
//! event-driven engine. It walks the flat time-ordered contact list
//! and tests every contact between an infectious and a susceptible
//! node with one genuine Bernoulli draw, so each trial costs time
//! linear in the contacts scanned. Individual trials will not match
//! the engine's, but the outbreak-size distributions must agree; the
//! cross-validation tests hold the two simulators to that.

use crate::core::network::{Contact, ContactList};
use crate::core::rng::Pcg32;
use crate::core::sampling::RecoverySampler;
use crate::core::sim::Params;
use crate::error::Result;

/// SIR simulator over a single globally time-sorted contact list.
#[derive(Debug)]
pub struct ReferenceSimulation {
    contacts: Vec<Contact>,
    population: u32,
    duration: u32,
    /// A 32-bit draw below this value transmits; `beta` scaled to the
    /// full 32-bit range (saturated for beta of 1 or more).
    threshold: u32,
    recovery: RecoverySampler,
    rng: Pcg32,
    /// Recovery instant per node; `None` while susceptible.
    recovered_at: Vec<Option<u32>>,
}

impl ReferenceSimulation {
    /// Create a reference context over a contact list.
    ///
    /// `seed` fixes the generator state for reproducible runs; `None`
    /// seeds from process entropy.
    pub fn new(list: ContactList, params: Params, seed: Option<u64>) -> Result<Self> {
        let params = Params::new(params.beta, params.nu)?;
        let rng = match seed {
            Some(s) => Pcg32::new(s),
            None => Pcg32::from_entropy(),
        };
        let recovery = RecoverySampler::new(params.nu, list.duration())?;
        let threshold = (params.beta * f64::from(u32::MAX)) as u32;
        let population = list.population();
        let duration = list.duration();
        Ok(Self {
            contacts: list.into_contacts(),
            population,
            duration,
            threshold,
            recovery,
            rng,
            recovered_at: vec![None; population as usize],
        })
    }

    /// Run one outbreak trial and return its size.
    pub fn run_trial(&mut self) -> u32 {
        // Full-population reset; this simulator does not track which
        // nodes a trial touched.
        for slot in &mut self.recovered_at {
            *slot = None;
        }

        let source = self.rng.draw32_bounded(self.population);
        let start = self.rng.draw32_bounded(self.duration);
        let recovery = self.recovery.sample(&mut self.rng);
        let mut horizon = start.saturating_add(recovery);
        self.recovered_at[source as usize] = Some(horizon);
        let mut size = 1u32;

        // Scan from the first contact after the exposure time; stop
        // once the scan passes the latest recovery seen so far.
        let begin = self.contacts.partition_point(|c| c.time <= start);
        for i in begin..self.contacts.len() {
            let c = self.contacts[i];
            if c.time > horizon {
                break;
            }
            if self.is_infectious(c.left, c.time) && self.is_susceptible(c.right) {
                self.try_transmit(c.right, c.time, &mut horizon, &mut size);
            } else if self.is_susceptible(c.left) && self.is_infectious(c.right, c.time) {
                self.try_transmit(c.left, c.time, &mut horizon, &mut size);
            }
        }
        size
    }

    /// Run `trials` independent outbreaks; one size per trial, in
    /// trial order.
    pub fn run(&mut self, trials: usize) -> Vec<u32> {
        (0..trials).map(|_| self.run_trial()).collect()
    }

    #[inline]
    fn is_susceptible(&self, node: u32) -> bool {
        self.recovered_at[node as usize].is_none()
    }

    #[inline]
    fn is_infectious(&self, node: u32, now: u32) -> bool {
        self.recovered_at[node as usize].is_some_and(|r| r > now)
    }

    /// One Bernoulli trial for a directed infectious-susceptible
    /// contact at `now`.
    fn try_transmit(&mut self, target: u32, now: u32, horizon: &mut u32, size: &mut u32) {
        if self.rng.draw32() < self.threshold {
            *size += 1;
            let recovery = now.saturating_add(self.recovery.sample(&mut self.rng));
            self.recovered_at[target as usize] = Some(recovery);
            if recovery > *horizon {
                *horizon = recovery;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbreak_sizes_stay_within_the_population() -> Result<()> {
        let contacts = vec![
            Contact { left: 0, right: 1, time: 5 },
            Contact { left: 1, right: 2, time: 10 },
            Contact { left: 0, right: 2, time: 15 },
        ];
        let list = ContactList::new(3, 20, contacts)?;
        let mut sim = ReferenceSimulation::new(list, Params::new(0.8, 1.0)?, Some(17))?;
        for size in sim.run(500) {
            assert!((1..=3).contains(&size), "outbreak size {size} out of bounds");
        }
        Ok(())
    }

    #[test]
    fn no_contacts_means_an_outbreak_of_one() -> Result<()> {
        let list = ContactList::new(4, 100, Vec::new())?;
        let mut sim = ReferenceSimulation::new(list, Params::new(0.5, 1.0)?, Some(23))?;
        for size in sim.run(100) {
            assert_eq!(size, 1);
        }
        Ok(())
    }

    #[test]
    fn guaranteed_transmission_reaches_the_other_node() -> Result<()> {
        // One contact at the end of the window; with beta 1 and a
        // vanishing recovery rate the source is still infectious for
        // every possible exposure time.
        let list = ContactList::new(2, 100, vec![Contact { left: 0, right: 1, time: 100 }])?;
        let mut sim = ReferenceSimulation::new(list, Params::new(1.0, 1e-9)?, Some(31))?;
        for (trial, size) in sim.run(300).into_iter().enumerate() {
            assert_eq!(size, 2, "trial {trial} failed to transmit");
        }
        Ok(())
    }
}
