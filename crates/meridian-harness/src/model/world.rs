//! Model world: the reference network the real implementation is
//! checked against.
//!
//! Offices are plain vectors, channels a map keyed by the normalized
//! office pair. Every operation validates in the same order as the real
//! network so error results line up exactly.

use std::collections::HashMap;

use meridian_core::OFFICE_CAPACITY;

use super::operation::{
    ModelClientId, ModelOfficeId, Operation, OperationError, OperationResult,
};

/// Where a model client currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Registered but placed nowhere.
    Unassigned,
    /// On an office's waitlist.
    Waitlisted(ModelOfficeId),
    /// Holding an active seat at an office.
    Active(ModelOfficeId),
    /// Parked or queued on a channel; the origin seat is still held.
    InTransit {
        /// Office whose seat the client still holds.
        origin: ModelOfficeId,
    },
}

#[derive(Debug, Clone)]
struct ModelClient {
    state: ModelState,
    destination: Option<ModelOfficeId>,
}

#[derive(Debug, Clone, Default)]
struct ModelChannel {
    slot: Option<ModelClientId>,
    queue: Vec<ModelClientId>,
}

/// Observable state for oracle comparison.
///
/// The subset of world state the real implementation can be asked to
/// reproduce: seat assignments, waitlists, channel occupancy, and each
/// client's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Per-office active clients, sorted.
    pub active: Vec<Vec<ModelClientId>>,
    /// Per-office waitlists, in FIFO order.
    pub waitlists: Vec<Vec<ModelClientId>>,
    /// Per-channel occupant and queue, keyed by normalized office pair.
    pub channels: Vec<((ModelOfficeId, ModelOfficeId), Option<ModelClientId>, Vec<ModelClientId>)>,
    /// Per-client state and pending destination, in registration order.
    pub clients: Vec<(ModelState, Option<ModelOfficeId>)>,
}

/// The reference network: a fully connected mesh of offices.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    num_offices: ModelOfficeId,
    active: Vec<Vec<ModelClientId>>,
    waitlists: Vec<Vec<ModelClientId>>,
    channels: HashMap<(ModelOfficeId, ModelOfficeId), ModelChannel>,
    clients: Vec<ModelClient>,
}

impl ModelWorld {
    /// Create a world with `num_offices` offices, all pairwise connected.
    pub fn new(num_offices: ModelOfficeId) -> Self {
        let mut channels = HashMap::new();
        for a in 0..num_offices {
            for b in (a + 1)..num_offices {
                channels.insert((a, b), ModelChannel::default());
            }
        }
        Self {
            num_offices,
            active: vec![Vec::new(); num_offices as usize],
            waitlists: vec![Vec::new(); num_offices as usize],
            channels,
            clients: Vec::new(),
        }
    }

    /// Number of registered clients.
    pub fn num_clients(&self) -> usize {
        self.clients.len()
    }

    /// Apply an operation and return the result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::Register => self.apply_register(),
            Operation::Waitlist { client, office } => self.apply_waitlist(client, office),
            Operation::Admit { client, office } => self.apply_admit(client, office),
            Operation::Decline { client, office } => self.apply_decline(client, office),
            Operation::Remove { client } => self.apply_remove(client),
            Operation::SetDestination { client, office } => {
                self.apply_set_destination(client, office)
            },
            Operation::Move { client } => self.apply_move(client),
            Operation::Release { a, b } => self.apply_release(a, b),
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let mut active = self.active.clone();
        for office in &mut active {
            office.sort_unstable();
        }

        let mut channels: Vec<_> = self
            .channels
            .iter()
            .map(|(&pair, channel)| (pair, channel.slot, channel.queue.clone()))
            .collect();
        channels.sort_unstable_by_key(|&(pair, _, _)| pair);

        ObservableState {
            active,
            waitlists: self.waitlists.clone(),
            channels,
            clients: self.clients.iter().map(|c| (c.state, c.destination)).collect(),
        }
    }

    fn apply_register(&mut self) -> OperationResult {
        self.clients.push(ModelClient { state: ModelState::Unassigned, destination: None });
        OperationResult::Ok
    }

    fn apply_waitlist(&mut self, client: ModelClientId, office: ModelOfficeId) -> OperationResult {
        if office >= self.num_offices {
            return OperationResult::Error(OperationError::UnknownOffice);
        }
        let Some(entry) = self.clients.get(client as usize) else {
            return OperationResult::Error(OperationError::UnknownClient);
        };
        if entry.state != ModelState::Unassigned {
            return OperationResult::Error(OperationError::InvalidState);
        }

        self.waitlists[office as usize].push(client);
        self.clients[client as usize].state = ModelState::Waitlisted(office);
        OperationResult::Ok
    }

    fn apply_admit(&mut self, client: ModelClientId, office: ModelOfficeId) -> OperationResult {
        if office >= self.num_offices {
            return OperationResult::Error(OperationError::UnknownOffice);
        }
        let Some(entry) = self.clients.get(client as usize) else {
            return OperationResult::Error(OperationError::UnknownClient);
        };
        match entry.state {
            ModelState::Unassigned => {},
            ModelState::Waitlisted(at) if at == office => {},
            _ => return OperationResult::Error(OperationError::InvalidState),
        }

        if self.active[office as usize].len() >= OFFICE_CAPACITY {
            return OperationResult::Error(OperationError::OfficeFull);
        }
        self.waitlists[office as usize].retain(|&c| c != client);
        self.active[office as usize].push(client);
        self.clients[client as usize].state = ModelState::Active(office);
        OperationResult::Ok
    }

    fn apply_decline(&mut self, client: ModelClientId, office: ModelOfficeId) -> OperationResult {
        if office >= self.num_offices {
            return OperationResult::Error(OperationError::UnknownOffice);
        }
        let Some(entry) = self.clients.get(client as usize) else {
            return OperationResult::Error(OperationError::UnknownClient);
        };
        if entry.state != ModelState::Waitlisted(office) {
            return OperationResult::Error(OperationError::InvalidState);
        }

        self.waitlists[office as usize].retain(|&c| c != client);
        self.clients[client as usize].state = ModelState::Unassigned;
        OperationResult::Ok
    }

    fn apply_remove(&mut self, client: ModelClientId) -> OperationResult {
        let Some(entry) = self.clients.get(client as usize) else {
            return OperationResult::Error(OperationError::UnknownClient);
        };
        let ModelState::Active(office) = entry.state else {
            return OperationResult::Error(OperationError::InvalidState);
        };

        self.active[office as usize].retain(|&c| c != client);
        let entry = &mut self.clients[client as usize];
        entry.state = ModelState::Unassigned;
        entry.destination = None;
        OperationResult::Ok
    }

    fn apply_set_destination(
        &mut self,
        client: ModelClientId,
        office: ModelOfficeId,
    ) -> OperationResult {
        if office >= self.num_offices {
            return OperationResult::Error(OperationError::UnknownOffice);
        }
        let Some(entry) = self.clients.get_mut(client as usize) else {
            return OperationResult::Error(OperationError::UnknownClient);
        };
        entry.destination = Some(office);
        OperationResult::Ok
    }

    fn apply_move(&mut self, client: ModelClientId) -> OperationResult {
        let Some(entry) = self.clients.get(client as usize) else {
            return OperationResult::Error(OperationError::UnknownClient);
        };
        let ModelState::Active(origin) = entry.state else {
            return OperationResult::Error(OperationError::InvalidState);
        };
        let Some(destination) = entry.destination else {
            return OperationResult::Error(OperationError::InvalidState);
        };
        if origin == destination {
            return OperationResult::Error(OperationError::NoChannel);
        }

        let pair = normalize(origin, destination);
        let Some(channel) = self.channels.get(&pair) else {
            return OperationResult::Error(OperationError::NoChannel);
        };

        if channel.slot.is_none() && self.active[destination as usize].len() < OFFICE_CAPACITY {
            self.active[origin as usize].retain(|&c| c != client);
            self.active[destination as usize].push(client);
            let entry = &mut self.clients[client as usize];
            entry.state = ModelState::Active(destination);
            entry.destination = None;
            return OperationResult::Transferred;
        }

        // Occupied-or-full: the client enters the channel, keeping its
        // origin seat and its destination until release completes.
        let Some(channel) = self.channels.get_mut(&pair) else {
            return OperationResult::Error(OperationError::NoChannel);
        };
        self.clients[client as usize].state = ModelState::InTransit { origin };
        if channel.slot.is_none() {
            channel.slot = Some(client);
            OperationResult::Parked
        } else {
            channel.queue.push(client);
            OperationResult::Queued { position: channel.queue.len() - 1 }
        }
    }

    fn apply_release(&mut self, a: ModelOfficeId, b: ModelOfficeId) -> OperationResult {
        if a >= self.num_offices || b >= self.num_offices {
            return OperationResult::Error(OperationError::UnknownOffice);
        }
        let pair = normalize(a, b);
        let Some(channel) = self.channels.get(&pair) else {
            return OperationResult::Error(OperationError::NoChannel);
        };
        let Some(occupant) = channel.slot else {
            return OperationResult::Error(OperationError::InvalidState);
        };
        // Destination is re-read at release time: a destination update made
        // while the client sat in the channel redirects the transfer.
        let Some(destination) = self.clients[occupant as usize].destination else {
            return OperationResult::Error(OperationError::InvalidState);
        };
        let ModelState::InTransit { origin } = self.clients[occupant as usize].state else {
            return OperationResult::Error(OperationError::InvalidState);
        };

        if self.active[destination as usize].len() >= OFFICE_CAPACITY {
            return OperationResult::Error(OperationError::OfficeFull);
        }

        let promoted = {
            // Checked above.
            let Some(channel) = self.channels.get_mut(&pair) else {
                return OperationResult::Error(OperationError::NoChannel);
            };
            channel.slot = if channel.queue.is_empty() {
                None
            } else {
                Some(channel.queue.remove(0))
            };
            channel.slot.is_some()
        };

        self.active[origin as usize].retain(|&c| c != occupant);
        self.active[destination as usize].push(occupant);
        let entry = &mut self.clients[occupant as usize];
        entry.state = ModelState::Active(destination);
        entry.destination = None;
        OperationResult::Released { promoted }
    }
}

fn normalize(a: ModelOfficeId, b: ModelOfficeId) -> (ModelOfficeId, ModelOfficeId) {
    if a <= b { (a, b) } else { (b, a) }
}
