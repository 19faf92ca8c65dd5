// Particle bank.
//
// Secondaries produced during a collision are queued here and transported
// after the current particle. The bank is FIFO; callers that need a
// particular processing order (e.g. by history number before a batch) sort
// or merge with an explicit comparator.

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::particle::ParticleState;

#[derive(Clone, Debug, Default)]
pub struct ParticleBank {
    queue: VecDeque<ParticleState>,
}

impl ParticleBank {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn push(&mut self, particle: ParticleState) {
        self.queue.push_back(particle);
    }

    /// The particle at the front of the queue.
    pub fn top(&self) -> Option<&ParticleState> {
        self.queue.front()
    }

    /// Remove and return the front particle.
    pub fn pop(&mut self) -> Option<ParticleState> {
        self.queue.pop_front()
    }

    /// Stable sort under a caller comparator.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&ParticleState, &ParticleState) -> Ordering,
    {
        self.queue.make_contiguous().sort_by(&mut compare);
    }

    pub fn is_sorted_by<F>(&self, mut compare: F) -> bool
    where
        F: FnMut(&ParticleState, &ParticleState) -> Ordering,
    {
        self.queue
            .iter()
            .zip(self.queue.iter().skip(1))
            .all(|(a, b)| compare(a, b) != Ordering::Greater)
    }

    /// Merge another sorted bank into this sorted bank, preserving order.
    /// `other` is left empty. Both banks must already be sorted under the
    /// comparator.
    pub fn merge<F>(&mut self, other: &mut ParticleBank, mut compare: F)
    where
        F: FnMut(&ParticleState, &ParticleState) -> Ordering,
    {
        debug_assert!(self.is_sorted_by(&mut compare));
        debug_assert!(other.is_sorted_by(&mut compare));

        let mut merged = VecDeque::with_capacity(self.queue.len() + other.queue.len());
        loop {
            match (self.queue.front(), other.queue.front()) {
                (Some(a), Some(b)) => {
                    // Stable: ties keep the element already in this bank
                    if compare(b, a) == Ordering::Less {
                        merged.push_back(other.queue.pop_front().unwrap());
                    } else {
                        merged.push_back(self.queue.pop_front().unwrap());
                    }
                }
                (Some(_), None) => merged.push_back(self.queue.pop_front().unwrap()),
                (None, Some(_)) => merged.push_back(other.queue.pop_front().unwrap()),
                (None, None) => break,
            }
        }
        self.queue = merged;
    }

    /// Append the whole contents of another bank, leaving it empty.
    pub fn splice(&mut self, other: &mut ParticleBank) {
        self.queue.append(&mut other.queue);
    }
}
