//! Temporal contact network representation and loading.
//!
//! The exchange format is whitespace-separated text: a header of
//! `population contact-count duration` followed by one
//! `left right time` triple per contact, ascending in time. The flat
//! [`ContactList`] is what gets parsed and what the reference
//! simulator consumes; the event-driven engine works on the per-node
//! [`Network`] view built from it.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// One undirected time-stamped contact between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub left: u32,
    pub right: u32,
    pub time: u32,
}

/// A whole recording: population size, observation duration and the
/// time-ascending contact list.
#[derive(Debug, Clone)]
pub struct ContactList {
    population: u32,
    duration: u32,
    contacts: Vec<Contact>,
}

impl ContactList {
    /// Assemble and validate a contact list.
    ///
    /// Errors: `MalformedNetwork` if the population or duration is
    /// zero, any contact references a node outside the population or
    /// is a self-loop, the times are not ascending, or the last
    /// contact falls outside the stated duration.
    pub fn new(population: u32, duration: u32, contacts: Vec<Contact>) -> Result<Self> {
        if population == 0 {
            return Err(Error::MalformedNetwork("population must be > 0".into()));
        }
        if duration == 0 {
            return Err(Error::MalformedNetwork("duration must be > 0".into()));
        }
        let mut prev = 0u32;
        for (i, c) in contacts.iter().enumerate() {
            if c.left >= population || c.right >= population {
                return Err(Error::MalformedNetwork(format!(
                    "contact {i} references a node outside the population of {population}"
                )));
            }
            if c.left == c.right {
                return Err(Error::MalformedNetwork(format!(
                    "contact {i} is a self-loop on node {}",
                    c.left
                )));
            }
            if c.time < prev {
                return Err(Error::MalformedNetwork(format!(
                    "contact {i} breaks the ascending time order"
                )));
            }
            prev = c.time;
        }
        if prev > duration {
            return Err(Error::MalformedNetwork(format!(
                "last contact at {prev} falls outside the stated duration {duration}"
            )));
        }
        Ok(Self {
            population,
            duration,
            contacts,
        })
    }

    /// Parse the text exchange format from a buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut numbers: Vec<u32> = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            for token in line.split_whitespace() {
                let value = token.parse::<u32>().map_err(|_| {
                    Error::MalformedNetwork(format!(
                        "line {}: expected an unsigned integer, got {token:?}",
                        lineno + 1
                    ))
                })?;
                numbers.push(value);
            }
        }
        if numbers.len() < 3 {
            return Err(Error::MalformedNetwork(
                "missing population/contact-count/duration header".into(),
            ));
        }
        let (population, count, duration) = (numbers[0], numbers[1], numbers[2]);
        let body = &numbers[3..];
        if body.len() != count as usize * 3 {
            return Err(Error::MalformedNetwork(format!(
                "header promises {count} contacts but the body holds {} values",
                body.len()
            )));
        }
        let contacts = body
            .chunks_exact(3)
            .map(|triple| Contact {
                left: triple[0],
                right: triple[1],
                time: triple[2],
            })
            .collect();
        Self::new(population, duration, contacts)
    }

    /// Parse the text exchange format from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Number of nodes.
    pub fn population(&self) -> u32 {
        self.population
    }

    /// Observation duration in time-stamp units.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// The time-ascending contacts.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Consume the list, keeping only the contact vector.
    pub fn into_contacts(self) -> Vec<Contact> {
        self.contacts
    }
}

/// One neighbor relation: the other endpoint and the ascending
/// timestamps of every contact with it.
#[derive(Debug, Clone)]
pub struct Link {
    pub other: u32,
    pub times: Vec<u32>,
}

/// Per-node adjacency.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub links: Vec<Link>,
}

/// The per-node view of a contact recording, immutable once built and
/// shared read-only across all trials.
///
/// Each node's links are ordered by non-increasing last contact time.
/// The outbreak scan depends on this: once one link has no future
/// contacts left, none of the following links can have one either, so
/// the scan may stop. The ordering is established here, not assumed of
/// the input.
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    duration: u32,
}

impl Network {
    /// Build the adjacency view from a flat contact list.
    pub fn from_contact_list(list: &ContactList) -> Self {
        // Group timestamps per unordered pair. The input is
        // time-ascending, so each pair's sequence comes out ascending
        // as well.
        let mut pairs: HashMap<(u32, u32), Vec<u32>> = HashMap::new();
        for c in list.contacts() {
            let key = if c.left < c.right {
                (c.left, c.right)
            } else {
                (c.right, c.left)
            };
            pairs.entry(key).or_default().push(c.time);
        }

        let mut nodes = vec![Node::default(); list.population() as usize];
        for ((a, b), times) in pairs {
            nodes[a as usize].links.push(Link {
                other: b,
                times: times.clone(),
            });
            nodes[b as usize].links.push(Link { other: a, times });
        }
        for node in &mut nodes {
            // Latest-ending link first; neighbor id breaks ties so the
            // layout is deterministic across runs.
            node.links
                .sort_unstable_by_key(|l| (Reverse(l.times.last().copied().unwrap_or(0)), l.other));
        }

        Self {
            nodes,
            duration: list.duration(),
        }
    }

    /// Number of nodes.
    pub fn population(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// Observation duration in time-stamp units.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Access one node's adjacency.
    #[inline]
    pub fn node(&self, id: u32) -> &Node {
        &self.nodes[id as usize]
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}
