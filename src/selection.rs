//! The set of candidates the user picked for route generation.

use crate::model::{DeliveryCandidate, OrderId};

/// Candidates keyed by order id, kept in the order they were selected.
///
/// Toggling is pure XOR on membership: duplicates are impossible and
/// toggling the same candidate twice restores the previous set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    entries: Vec<DeliveryCandidate>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the candidate if absent, removes it if present. Returns
    /// whether the candidate is selected afterwards.
    pub fn toggle(&mut self, candidate: DeliveryCandidate) -> bool {
        match self.position(candidate.order_id()) {
            Some(index) => {
                self.entries.remove(index);
                false
            }
            None => {
                self.entries.push(candidate);
                true
            }
        }
    }

    /// Builder-style [`toggle`](Self::toggle).
    pub fn with_toggled(mut self, candidate: DeliveryCandidate) -> Self {
        self.toggle(candidate);
        self
    }

    /// Replaces the stored value of an already selected order. Membership
    /// never changes; returns false when the order is not selected.
    pub fn refresh(&mut self, candidate: DeliveryCandidate) -> bool {
        match self.position(candidate.order_id()) {
            Some(index) => {
                self.entries[index] = candidate;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.position(order_id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeliveryCandidate> {
        self.entries.iter()
    }

    /// Selected candidates in selection order.
    pub fn candidates(&self) -> &[DeliveryCandidate] {
        &self.entries
    }

    pub fn order_ids(&self) -> impl Iterator<Item = &OrderId> {
        self.entries.iter().map(DeliveryCandidate::order_id)
    }

    fn position(&self, order_id: &OrderId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.order_id() == order_id)
    }
}
