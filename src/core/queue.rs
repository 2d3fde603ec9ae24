//! Outbreak event scheduling.
//!
//! A dense, 1-indexed binary min-heap of node ids keyed by scheduled
//! infection time. The per-node bookkeeping (heap slot, per-trial
//! infection status) lives inside the queue, so callers schedule,
//! reschedule and pop by node id without ever seeing array mechanics.

/// Per-trial status of one node.
#[derive(Debug, Clone, Copy)]
enum Status {
    /// Never scheduled in this trial.
    Susceptible,
    /// Listed for infection; `slot` is the current heap position.
    Queued { slot: usize },
    /// Popped from the heap; infected for the rest of the trial.
    /// `time` keeps the committed infection time.
    Infected { time: u32 },
}

/// One live heap slot.
#[derive(Debug, Clone, Copy)]
struct Entry {
    node: u32,
    time: u32,
}

/// Indexed min-heap driving an outbreak forward in event order.
///
/// Each node appears at most once. Rescheduling is decrease-key only:
/// a node's time can move earlier, never later, so the only heap
/// relation a reschedule can violate is the one with the parent and a
/// sift-up alone restores the invariant.
#[derive(Debug)]
pub struct EventQueue {
    /// Slot 0 is unused; live entries occupy `1..=len`.
    heap: Vec<Entry>,
    len: usize,
    status: Vec<Status>,
}

impl EventQueue {
    /// Create an empty queue for a population of `population` nodes.
    pub fn new(population: usize) -> Self {
        Self {
            heap: vec![Entry { node: 0, time: 0 }; population + 1],
            len: 0,
            status: vec![Status::Susceptible; population],
        }
    }

    /// Number of queued nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no infection event is pending.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True while `node` is listed for a future infection.
    pub fn contains(&self, node: u32) -> bool {
        matches!(self.status[node as usize], Status::Queued { .. })
    }

    /// True once `node` has been popped in this trial.
    pub fn is_infected(&self, node: u32) -> bool {
        matches!(self.status[node as usize], Status::Infected { .. })
    }

    /// The node's committed infection time, if it has one. Queued
    /// nodes report their scheduled time, infected nodes the time they
    /// were infected at; susceptible nodes report `None`.
    pub fn infection_time(&self, node: u32) -> Option<u32> {
        match self.status[node as usize] {
            Status::Susceptible => None,
            Status::Queued { slot } => Some(self.heap[slot].time),
            Status::Infected { time } => Some(time),
        }
    }

    /// Schedule `node` for infection at `time`, or move an already
    /// queued node to an earlier time.
    ///
    /// Precondition: `node` is not infected in this trial, and if it
    /// is queued, `time` is strictly earlier than its current time.
    pub fn schedule(&mut self, node: u32, time: u32) {
        match self.status[node as usize] {
            Status::Susceptible => {
                self.len += 1;
                self.heap[self.len] = Entry { node, time };
                self.status[node as usize] = Status::Queued { slot: self.len };
                self.sift_up(self.len);
            }
            Status::Queued { slot } => {
                debug_assert!(
                    time < self.heap[slot].time,
                    "reschedule must move node {node} earlier"
                );
                self.heap[slot].time = time;
                self.sift_up(slot);
            }
            Status::Infected { .. } => {
                debug_assert!(false, "scheduled node {node} is already infected");
            }
        }
    }

    /// Remove and return the minimum-time entry, marking its node
    /// infected at that time.
    pub fn pop_min(&mut self) -> Option<(u32, u32)> {
        if self.len == 0 {
            return None;
        }
        let Entry { node, time } = self.heap[1];
        self.status[node as usize] = Status::Infected { time };

        self.heap[1] = self.heap[self.len];
        self.len -= 1;
        if self.len > 0 {
            self.status[self.heap[1].node as usize] = Status::Queued { slot: 1 };
            self.sift_down(1);
        }
        Some((node, time))
    }

    /// Forget `node`'s transient trial state. The driver calls this for
    /// every node an ended trial touched; skipping it would silently
    /// corrupt the next trial.
    pub fn reset(&mut self, node: u32) {
        debug_assert!(
            !self.contains(node),
            "reset of node {node} while it is still queued"
        );
        self.status[node as usize] = Status::Susceptible;
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.status[self.heap[a].node as usize] = Status::Queued { slot: a };
        self.status[self.heap[b].node as usize] = Status::Queued { slot: b };
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 1 {
            let parent = slot >> 1;
            if self.heap[parent].time <= self.heap[slot].time {
                break;
            }
            self.swap_slots(parent, slot);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let mut child = slot << 1;
            if child > self.len {
                break;
            }
            if child + 1 <= self.len && self.heap[child + 1].time < self.heap[child].time {
                child += 1;
            }
            if self.heap[slot].time <= self.heap[child].time {
                break;
            }
            self.swap_slots(slot, child);
            slot = child;
        }
    }

    /// Walk every live slot and check the heap and bookkeeping
    /// invariants.
    #[cfg(test)]
    fn assert_invariants(&self) {
        for slot in 2..=self.len {
            assert!(
                self.heap[slot >> 1].time <= self.heap[slot].time,
                "heap order violated at slot {slot}"
            );
        }
        for slot in 1..=self.len {
            let node = self.heap[slot].node;
            assert!(
                matches!(self.status[node as usize], Status::Queued { slot: s } if s == slot),
                "node {node} does not know its slot {slot}"
            );
        }
        let queued = self
            .status
            .iter()
            .filter(|s| matches!(s, Status::Queued { .. }))
            .count();
        assert_eq!(queued, self.len, "queued-node count disagrees with len");
    }
}
