//! Office nodes: bounded active set, FIFO waitlist, neighbor map.

use std::collections::{HashMap, VecDeque};

use crate::ids::{ChannelId, ClientId, ProfessionalId};

/// Maximum concurrent active clients per office.
pub const OFFICE_CAPACITY: usize = 10;

/// A node representing one provider's intake point.
///
/// The office owns its active set and waitlist; cross-entity effects
/// (client state, the global location index) are coordinated by
/// [`Network`](crate::Network). An office never appears in its own
/// neighbor map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Office {
    professional: ProfessionalId,
    active: Vec<ClientId>,
    waitlist: VecDeque<ClientId>,
    neighbors: HashMap<ProfessionalId, ChannelId>,
}

impl Office {
    pub(crate) fn new(professional: ProfessionalId) -> Self {
        Self {
            professional,
            active: Vec::new(),
            waitlist: VecDeque::new(),
            neighbors: HashMap::new(),
        }
    }

    /// The professional owning this office.
    pub fn professional(&self) -> ProfessionalId {
        self.professional
    }

    /// Clients holding an active seat, in admission order.
    pub fn active_clients(&self) -> &[ClientId] {
        &self.active
    }

    /// Clients awaiting a capacity slot, in arrival order.
    pub fn waitlist(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.waitlist.iter().copied()
    }

    /// Whether a seat is available.
    pub fn has_capacity(&self) -> bool {
        self.active.len() < OFFICE_CAPACITY
    }

    /// Whether the client holds an active seat here.
    pub fn is_active(&self, client: ClientId) -> bool {
        self.active.contains(&client)
    }

    /// Whether the client is on the waitlist.
    pub fn is_waitlisted(&self, client: ClientId) -> bool {
        self.waitlist.contains(&client)
    }

    /// Channel leading to the given neighboring professional's office.
    pub fn neighbor(&self, professional: ProfessionalId) -> Option<ChannelId> {
        self.neighbors.get(&professional).copied()
    }

    /// Neighboring professionals and the channels reaching them.
    pub fn neighbors(&self) -> impl Iterator<Item = (ProfessionalId, ChannelId)> + '_ {
        self.neighbors.iter().map(|(&p, &c)| (p, c))
    }

    pub(crate) fn link_neighbor(&mut self, professional: ProfessionalId, channel: ChannelId) {
        debug_assert_ne!(professional, self.professional);
        self.neighbors.insert(professional, channel);
    }

    /// Append a client to the waitlist. The caller has already checked the
    /// client is neither waitlisted nor active here.
    pub(crate) fn admit_to_waitlist(&mut self, client: ClientId) {
        debug_assert!(!self.is_waitlisted(client) && !self.is_active(client));
        self.waitlist.push_back(client);
    }

    /// Admit a client to the active set, dropping any waitlist entry.
    ///
    /// Returns false without mutating anything if the office is full.
    pub(crate) fn admit(&mut self, client: ClientId) -> bool {
        if !self.has_capacity() {
            return false;
        }
        self.waitlist.retain(|&c| c != client);
        self.active.push(client);
        true
    }

    /// Drop a waitlisted client without admitting it. Returns false if the
    /// client was not on the waitlist.
    pub(crate) fn decline(&mut self, client: ClientId) -> bool {
        let before = self.waitlist.len();
        self.waitlist.retain(|&c| c != client);
        self.waitlist.len() < before
    }

    /// Remove a client from the active set, freeing its seat. Returns false
    /// if the client held no seat here.
    pub(crate) fn discharge(&mut self, client: ClientId) -> bool {
        let before = self.active.len();
        self.active.retain(|&c| c != client);
        self.active.len() < before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office() -> Office {
        Office::new(ProfessionalId(0))
    }

    #[test]
    fn admit_fills_up_to_capacity() {
        let mut office = office();
        for i in 0..OFFICE_CAPACITY {
            assert!(office.admit(ClientId(i as u64)), "seat {i} should be free");
        }
        assert!(!office.has_capacity());
        assert!(!office.admit(ClientId(99)));
        assert_eq!(office.active_clients().len(), OFFICE_CAPACITY);
    }

    #[test]
    fn admit_removes_waitlist_entry() {
        let mut office = office();
        office.admit_to_waitlist(ClientId(1));
        office.admit_to_waitlist(ClientId(2));

        assert!(office.admit(ClientId(1)));
        assert!(!office.is_waitlisted(ClientId(1)));
        assert!(office.is_waitlisted(ClientId(2)));
        assert!(office.is_active(ClientId(1)));
    }

    #[test]
    fn admit_at_capacity_leaves_waitlist_untouched() {
        let mut office = office();
        for i in 0..OFFICE_CAPACITY {
            office.admit(ClientId(i as u64));
        }
        office.admit_to_waitlist(ClientId(50));

        assert!(!office.admit(ClientId(50)));
        assert!(office.is_waitlisted(ClientId(50)));
        assert!(!office.is_active(ClientId(50)));
    }

    #[test]
    fn decline_drops_only_the_target() {
        let mut office = office();
        office.admit_to_waitlist(ClientId(1));
        office.admit_to_waitlist(ClientId(2));

        assert!(office.decline(ClientId(1)));
        assert!(!office.decline(ClientId(1)));
        assert!(office.is_waitlisted(ClientId(2)));
    }

    #[test]
    fn discharge_frees_a_seat() {
        let mut office = office();
        office.admit(ClientId(1));
        assert!(office.discharge(ClientId(1)));
        assert!(!office.discharge(ClientId(1)));
        assert!(office.has_capacity());
        assert!(office.active_clients().is_empty());
    }

    #[test]
    fn waitlist_preserves_arrival_order() {
        let mut office = office();
        office.admit_to_waitlist(ClientId(3));
        office.admit_to_waitlist(ClientId(1));
        office.admit_to_waitlist(ClientId(2));

        let order: Vec<_> = office.waitlist().collect();
        assert_eq!(order, vec![ClientId(3), ClientId(1), ClientId(2)]);
    }
}
