//! Channel edges: one transit slot plus a FIFO overflow queue.

use std::collections::VecDeque;

use crate::{
    error::NetworkError,
    ids::{ClientId, OfficeId},
};

/// Where a client landed when entering a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitEntry {
    /// The slot was empty; the client is now the occupant.
    Occupant,
    /// The slot was taken; the client joined the overflow queue.
    Queued {
        /// Zero-based position in the queue.
        position: usize,
    },
}

/// An undirected edge between exactly two offices.
///
/// Carries at most one client in transit plus an unbounded FIFO queue of
/// clients waiting for the slot. Invariant: if the slot is empty, the
/// queue is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    endpoints: (OfficeId, OfficeId),
    slot: Option<ClientId>,
    queue: VecDeque<ClientId>,
}

impl Channel {
    /// The caller (`Network::connect`) has already rejected self-edges and
    /// duplicate pairs.
    pub(crate) fn new(a: OfficeId, b: OfficeId) -> Self {
        debug_assert_ne!(a, b);
        Self { endpoints: (a, b), slot: None, queue: VecDeque::new() }
    }

    /// The two endpoint offices, in registration order.
    pub fn endpoints(&self) -> (OfficeId, OfficeId) {
        self.endpoints
    }

    /// Whether the given office is one of the two endpoints.
    pub fn connects(&self, office: OfficeId) -> bool {
        self.endpoints.0 == office || self.endpoints.1 == office
    }

    /// The endpoint that is not `office`.
    ///
    /// Passing an office that is not an endpoint is a contract violation
    /// and returns `StateViolation` rather than a wrong endpoint.
    pub fn other_endpoint(&self, office: OfficeId) -> Result<OfficeId, NetworkError> {
        if self.endpoints.0 == office {
            Ok(self.endpoints.1)
        } else if self.endpoints.1 == office {
            Ok(self.endpoints.0)
        } else {
            Err(NetworkError::StateViolation {
                reason: format!("{office} is not an endpoint of this channel"),
            })
        }
    }

    /// The client currently occupying the transit slot, if any.
    pub fn occupant(&self) -> Option<ClientId> {
        self.slot
    }

    /// Clients waiting for the slot, in arrival order.
    pub fn queue(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.queue.iter().copied()
    }

    /// Number of clients waiting behind the occupant.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the channel carries no client at all.
    pub fn is_idle(&self) -> bool {
        self.slot.is_none() && self.queue.is_empty()
    }

    /// Enter the channel: occupy the slot if it is empty, otherwise join
    /// the back of the queue. Arrival order is preserved; there is no
    /// priority or reordering.
    pub(crate) fn enter(&mut self, client: ClientId) -> TransitEntry {
        if self.slot.is_none() {
            self.slot = Some(client);
            TransitEntry::Occupant
        } else {
            self.queue.push_back(client);
            TransitEntry::Queued { position: self.queue.len() - 1 }
        }
    }

    /// Release the occupant and promote the queue head, if any.
    ///
    /// Returns the released client and the newly promoted occupant.
    /// Releasing an empty slot is a contract violation.
    pub(crate) fn release(&mut self) -> Result<(ClientId, Option<ClientId>), NetworkError> {
        let released = self.slot.take().ok_or_else(|| NetworkError::StateViolation {
            reason: "released a channel with an empty slot".to_string(),
        })?;
        self.slot = self.queue.pop_front();
        Ok((released, self.slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> Channel {
        Channel::new(OfficeId(0), OfficeId(1))
    }

    #[test]
    fn other_endpoint_both_directions() {
        let channel = channel();
        assert_eq!(channel.other_endpoint(OfficeId(0)), Ok(OfficeId(1)));
        assert_eq!(channel.other_endpoint(OfficeId(1)), Ok(OfficeId(0)));
    }

    #[test]
    fn other_endpoint_rejects_non_member() {
        let channel = channel();
        let result = channel.other_endpoint(OfficeId(7));
        assert!(matches!(result, Err(NetworkError::StateViolation { .. })));
    }

    #[test]
    fn first_entrant_occupies_slot() {
        let mut channel = channel();
        assert_eq!(channel.enter(ClientId(1)), TransitEntry::Occupant);
        assert_eq!(channel.occupant(), Some(ClientId(1)));
        assert_eq!(channel.queue_len(), 0);
    }

    #[test]
    fn later_entrants_queue_in_arrival_order() {
        let mut channel = channel();
        channel.enter(ClientId(1));
        assert_eq!(channel.enter(ClientId(2)), TransitEntry::Queued { position: 0 });
        assert_eq!(channel.enter(ClientId(3)), TransitEntry::Queued { position: 1 });

        let queued: Vec<_> = channel.queue().collect();
        assert_eq!(queued, vec![ClientId(2), ClientId(3)]);
    }

    #[test]
    fn release_promotes_queue_head() {
        let mut channel = channel();
        channel.enter(ClientId(1));
        channel.enter(ClientId(2));
        channel.enter(ClientId(3));

        let (released, promoted) = channel.release().expect("slot occupied");
        assert_eq!(released, ClientId(1));
        assert_eq!(promoted, Some(ClientId(2)));
        assert_eq!(channel.occupant(), Some(ClientId(2)));

        let (released, promoted) = channel.release().expect("slot occupied");
        assert_eq!(released, ClientId(2));
        assert_eq!(promoted, Some(ClientId(3)));

        let (released, promoted) = channel.release().expect("slot occupied");
        assert_eq!(released, ClientId(3));
        assert_eq!(promoted, None);
        assert!(channel.is_idle());
    }

    #[test]
    fn release_on_empty_slot_is_violation() {
        let mut channel = channel();
        let result = channel.release();
        assert!(matches!(result, Err(NetworkError::StateViolation { .. })));
    }

    #[test]
    fn empty_slot_implies_empty_queue() {
        let mut channel = channel();
        channel.enter(ClientId(1));
        channel.enter(ClientId(2));

        while channel.occupant().is_some() {
            channel.release().expect("slot occupied");
        }
        assert_eq!(channel.queue_len(), 0);
    }
}
