//! The network aggregate and its movement algorithm.
//!
//! ## Responsibilities
//!
//! - Topology: register offices, connect them pairwise, build the fully
//!   connected mesh from a roster
//! - Admission: waitlist, admit, decline, and remove clients under the
//!   per-office capacity limit
//! - Movement: decide per request between direct transfer, occupying a
//!   channel slot, and FIFO queueing behind another client
//!
//! ## Design
//!
//! All entities live in flat, id-keyed tables; relationships are stored as
//! ids, not references. Every public operation is synchronous and atomic:
//! it either fully applies or returns an error and mutates nothing. The
//! aggregate is mutated through `&mut self` only — concurrent callers must
//! serialize behind a single exclusive lock.

use std::collections::HashMap;

use crate::{
    channel::{Channel, TransitEntry},
    client::{Client, ClientProfile, ClientState},
    error::{NetworkError, Participant},
    ids::{ChannelId, ClientId, OfficeId, ProfessionalId},
    office::Office,
    professional::Professional,
};

/// How a movement request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The channel was free and the destination had capacity: the client
    /// transferred directly, creating no channel occupancy.
    Transferred,
    /// The destination was full: the client occupies the channel slot
    /// awaiting a capacity opening.
    Parked,
    /// The slot was taken: the client joined the channel's FIFO queue.
    Queued {
        /// Zero-based position in the queue.
        position: usize,
    },
}

/// Result of completing a transfer through [`Network::release_channel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// The client whose transfer completed.
    pub transferred: ClientId,
    /// The queued client promoted to occupant, if the queue was non-empty.
    pub promoted: Option<ClientId>,
}

/// The aggregate owning all offices, channels, and clients, plus the
/// global client-location index.
#[derive(Debug, Clone, Default)]
pub struct Network {
    professionals: HashMap<ProfessionalId, Professional>,
    offices: HashMap<OfficeId, Office>,
    channels: HashMap<ChannelId, Channel>,
    clients: HashMap<ClientId, Client>,
    office_by_professional: HashMap<ProfessionalId, OfficeId>,
    client_location: HashMap<ClientId, OfficeId>,
    next_office: u32,
    next_channel: u32,
    next_client: u64,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from an ordered, deduplicated roster: every
    /// professional gets an office and every pair of offices a channel.
    pub fn from_roster<I>(roster: I) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = Professional>,
    {
        let mut network = Self::new();
        let mut registered: Vec<ProfessionalId> = Vec::new();

        for professional in roster {
            let id = professional.id;
            network.add_office(professional)?;
            for &other in &registered {
                network.connect(id, other)?;
            }
            registered.push(id);
        }

        tracing::info!(
            offices = network.offices.len(),
            channels = network.channels.len(),
            "built fully connected mesh from roster"
        );
        Ok(network)
    }

    // --- topology -------------------------------------------------------

    /// Register a professional and create their office.
    pub fn add_office(&mut self, professional: Professional) -> Result<OfficeId, NetworkError> {
        let professional_id = professional.id;
        if self.office_by_professional.contains_key(&professional_id) {
            return Err(NetworkError::DuplicateOffice(professional_id));
        }

        let office_id = OfficeId(self.next_office);
        self.next_office += 1;

        self.professionals.insert(professional_id, professional);
        self.offices.insert(office_id, Office::new(professional_id));
        self.office_by_professional.insert(professional_id, office_id);

        tracing::debug!(%professional_id, %office_id, "office registered");
        Ok(office_id)
    }

    /// Create a channel between the offices owned by `p1` and `p2`,
    /// registering it in both offices' neighbor maps.
    pub fn connect(
        &mut self,
        p1: ProfessionalId,
        p2: ProfessionalId,
    ) -> Result<ChannelId, NetworkError> {
        if p1 == p2 {
            return Err(NetworkError::InvalidTopology {
                reason: format!("cannot connect {p1} to itself"),
            });
        }
        let a = self.office_of(p1)?;
        let b = self.office_of(p2)?;

        if self.office(a)?.neighbor(p2).is_some() {
            return Err(NetworkError::DuplicateEdge { a, b });
        }

        let channel_id = ChannelId(self.next_channel);
        self.next_channel += 1;
        self.channels.insert(channel_id, Channel::new(a, b));
        self.office_mut(a)?.link_neighbor(p2, channel_id);
        self.office_mut(b)?.link_neighbor(p1, channel_id);

        tracing::debug!(%channel_id, office_a = %a, office_b = %b, "offices connected");
        Ok(channel_id)
    }

    // --- admission ------------------------------------------------------

    /// Register a new client, initially unassigned.
    pub fn register_client(&mut self, profile: ClientProfile) -> ClientId {
        let client_id = ClientId(self.next_client);
        self.next_client += 1;
        self.clients.insert(client_id, Client::new(client_id, profile));
        client_id
    }

    /// Append an unassigned client to an office's waitlist.
    pub fn waitlist_client(
        &mut self,
        client_id: ClientId,
        professional: ProfessionalId,
    ) -> Result<(), NetworkError> {
        let office_id = self.office_of(professional)?;
        let state = self.client(client_id)?.state();
        if state != ClientState::Unassigned {
            tracing::warn!(%client_id, ?state, "waitlist refused: placement pending");
            return Err(NetworkError::StateViolation {
                reason: format!("{client_id} already has a pending or active placement"),
            });
        }

        self.office_mut(office_id)?.admit_to_waitlist(client_id);
        self.client_mut(client_id)?.set_state(ClientState::Waitlisted(office_id));
        tracing::debug!(%client_id, %office_id, "client waitlisted");
        Ok(())
    }

    /// Admit a client to an office's active set.
    ///
    /// A full office yields `CapacityExceeded` and mutates nothing — a
    /// recoverable business outcome, not a bug.
    pub fn admit_client(
        &mut self,
        client_id: ClientId,
        professional: ProfessionalId,
    ) -> Result<(), NetworkError> {
        let office_id = self.office_of(professional)?;
        match self.client(client_id)?.state() {
            ClientState::Unassigned => {},
            ClientState::Waitlisted(at) if at == office_id => {},
            state => {
                tracing::warn!(%client_id, %office_id, ?state, "admission refused: invalid state");
                return Err(NetworkError::StateViolation {
                    reason: format!("{client_id} cannot be admitted from state {state:?}"),
                });
            },
        }

        if !self.office_mut(office_id)?.admit(client_id) {
            tracing::debug!(%client_id, %office_id, "admission refused: office full");
            return Err(NetworkError::CapacityExceeded { office: office_id });
        }
        self.client_location.insert(client_id, office_id);
        self.client_mut(client_id)?.set_state(ClientState::Active(office_id));
        tracing::debug!(%client_id, %office_id, "client admitted");
        Ok(())
    }

    /// Decline a waitlisted client: drop the waitlist entry and clear the
    /// diagnosis without assigning the client anywhere.
    pub fn decline_client(
        &mut self,
        client_id: ClientId,
        professional: ProfessionalId,
    ) -> Result<(), NetworkError> {
        let office_id = self.office_of(professional)?;
        if self.client(client_id)?.state() != ClientState::Waitlisted(office_id) {
            tracing::warn!(%client_id, %office_id, "decline refused: client not waitlisted here");
            return Err(NetworkError::StateViolation {
                reason: format!("{client_id} is not waitlisted at {office_id}"),
            });
        }

        self.office_mut(office_id)?.decline(client_id);
        let client = self.client_mut(client_id)?;
        client.set_state(ClientState::Unassigned);
        client.set_diagnosis(None);
        tracing::debug!(%client_id, %office_id, "client declined");
        Ok(())
    }

    /// Remove an active client from the network, freeing its seat and
    /// deleting the global index entry.
    pub fn remove_client(&mut self, client_id: ClientId) -> Result<(), NetworkError> {
        let office_id = match self.client(client_id)?.state() {
            ClientState::Active(office) => office,
            state => {
                tracing::warn!(%client_id, ?state, "removal refused: client not active");
                return Err(NetworkError::StateViolation {
                    reason: format!("{client_id} cannot be removed from state {state:?}"),
                });
            },
        };

        self.office_mut(office_id)?.discharge(client_id);
        self.client_location.remove(&client_id);
        let client = self.client_mut(client_id)?;
        client.set_state(ClientState::Unassigned);
        client.set_destination(None);
        tracing::debug!(%client_id, %office_id, "client removed");
        Ok(())
    }

    /// Record a diagnosis for a client.
    pub fn set_diagnosis(
        &mut self,
        client_id: ClientId,
        diagnosis: impl Into<String>,
    ) -> Result<(), NetworkError> {
        self.client_mut(client_id)?.set_diagnosis(Some(diagnosis.into()));
        Ok(())
    }

    // --- movement -------------------------------------------------------

    /// Set the destination office for a client's next move.
    pub fn set_destination(
        &mut self,
        client_id: ClientId,
        professional: ProfessionalId,
    ) -> Result<(), NetworkError> {
        let office_id = self.office_of(professional)?;
        self.client_mut(client_id)?.set_destination(Some(office_id));
        Ok(())
    }

    /// Move a client toward its destination office.
    ///
    /// Requires the client to be active with a destination set. The channel
    /// between the current and destination offices must exist — its absence
    /// is a topology error, not a capacity condition. Decision order:
    ///
    /// 1. slot empty and destination has capacity → direct transfer;
    /// 2. slot empty, destination full → the client enters the channel and
    ///    parks as occupant until capacity opens;
    /// 3. slot occupied → the client joins the FIFO queue.
    ///
    /// Cases 2 and 3 share one entry path; a parked or queued client keeps
    /// its origin seat until [`Self::release_channel`] completes the move.
    pub fn move_client(&mut self, client_id: ClientId) -> Result<MoveOutcome, NetworkError> {
        let client = self.client(client_id)?;
        let origin = match client.state() {
            ClientState::Active(office) => office,
            state => {
                tracing::warn!(%client_id, ?state, "move refused: client not active");
                return Err(NetworkError::StateViolation {
                    reason: format!("{client_id} cannot move from state {state:?}"),
                });
            },
        };
        let destination = client.destination().ok_or_else(|| {
            tracing::warn!(%client_id, "move refused: no destination set");
            NetworkError::StateViolation {
                reason: format!("{client_id} has no destination set"),
            }
        })?;

        let destination_professional = self.office(destination)?.professional();
        let channel_id = self.office(origin)?.neighbor(destination_professional).ok_or_else(
            || {
                tracing::warn!(%client_id, %origin, %destination, "move refused: no channel");
                NetworkError::InvalidTopology {
                    reason: format!("no channel between {origin} and {destination}"),
                }
            },
        )?;

        let slot_empty = self.channel(channel_id)?.occupant().is_none();
        if slot_empty && self.office(destination)?.has_capacity() {
            self.office_mut(origin)?.discharge(client_id);
            self.office_mut(destination)?.admit(client_id);
            self.client_location.insert(client_id, destination);
            let client = self.client_mut(client_id)?;
            client.set_state(ClientState::Active(destination));
            client.set_destination(None);
            tracing::debug!(%client_id, %origin, %destination, "client transferred directly");
            return Ok(MoveOutcome::Transferred);
        }

        let entry = self.channel_mut(channel_id)?.enter(client_id);
        self.client_mut(client_id)?.set_state(ClientState::InTransit(channel_id));
        match entry {
            TransitEntry::Occupant => {
                tracing::debug!(%client_id, %channel_id, "client parked awaiting capacity");
                Ok(MoveOutcome::Parked)
            },
            TransitEntry::Queued { position } => {
                tracing::debug!(%client_id, %channel_id, position, "client queued on channel");
                Ok(MoveOutcome::Queued { position })
            },
        }
    }

    /// Complete the channel occupant's transfer and promote the queue head.
    ///
    /// The destination must have a free seat; a full destination yields
    /// `CapacityExceeded` and leaves the channel untouched so the driver
    /// can retry after freeing one. Releasing an idle channel is a
    /// contract violation.
    pub fn release_channel(
        &mut self,
        channel_id: ChannelId,
    ) -> Result<ReleaseOutcome, NetworkError> {
        let occupant = self.channel(channel_id)?.occupant().ok_or_else(|| {
            tracing::warn!(%channel_id, "release refused: channel has no occupant");
            NetworkError::StateViolation {
                reason: format!("{channel_id} has no occupant to release"),
            }
        })?;
        let destination =
            self.client(occupant)?.destination().ok_or_else(|| NetworkError::StateViolation {
                reason: format!("occupant {occupant} has no destination"),
            })?;
        let origin = self.client_location.get(&occupant).copied().ok_or_else(|| {
            NetworkError::StateViolation {
                reason: format!("occupant {occupant} holds no origin seat"),
            }
        })?;

        if !self.office(destination)?.has_capacity() {
            return Err(NetworkError::CapacityExceeded { office: destination });
        }

        let (released, promoted) = self.channel_mut(channel_id)?.release()?;
        debug_assert_eq!(released, occupant);

        self.office_mut(origin)?.discharge(released);
        self.office_mut(destination)?.admit(released);
        self.client_location.insert(released, destination);
        let client = self.client_mut(released)?;
        client.set_state(ClientState::Active(destination));
        client.set_destination(None);

        tracing::debug!(
            %released, %origin, %destination, promoted = ?promoted,
            "channel released, transfer completed"
        );
        Ok(ReleaseOutcome { transferred: released, promoted })
    }

    // --- lookups --------------------------------------------------------

    /// The channel between two professionals' offices, if one exists.
    pub fn channel_between(
        &self,
        p1: ProfessionalId,
        p2: ProfessionalId,
    ) -> Result<Option<ChannelId>, NetworkError> {
        let office = self.office(self.office_of(p1)?)?;
        self.office_of(p2)?;
        Ok(office.neighbor(p2))
    }

    /// The office a client currently holds a seat at, per the global index.
    pub fn client_location(&self, client_id: ClientId) -> Option<OfficeId> {
        self.client_location.get(&client_id).copied()
    }

    /// The office owned by a professional.
    pub fn office_of(&self, professional: ProfessionalId) -> Result<OfficeId, NetworkError> {
        self.office_by_professional
            .get(&professional)
            .copied()
            .ok_or(NetworkError::UnknownParticipant(Participant::Professional(professional)))
    }

    /// Look up an office.
    pub fn office(&self, office_id: OfficeId) -> Result<&Office, NetworkError> {
        self.offices
            .get(&office_id)
            .ok_or(NetworkError::UnknownParticipant(Participant::Office(office_id)))
    }

    /// Look up a channel.
    pub fn channel(&self, channel_id: ChannelId) -> Result<&Channel, NetworkError> {
        self.channels
            .get(&channel_id)
            .ok_or(NetworkError::UnknownParticipant(Participant::Channel(channel_id)))
    }

    /// Look up a client.
    pub fn client(&self, client_id: ClientId) -> Result<&Client, NetworkError> {
        self.clients
            .get(&client_id)
            .ok_or(NetworkError::UnknownParticipant(Participant::Client(client_id)))
    }

    /// Look up a professional.
    pub fn professional(
        &self,
        professional: ProfessionalId,
    ) -> Result<&Professional, NetworkError> {
        self.professionals
            .get(&professional)
            .ok_or(NetworkError::UnknownParticipant(Participant::Professional(professional)))
    }

    /// All offices with their ids.
    pub fn offices(&self) -> impl Iterator<Item = (OfficeId, &Office)> {
        self.offices.iter().map(|(&id, office)| (id, office))
    }

    /// All channels with their ids.
    pub fn channels(&self) -> impl Iterator<Item = (ChannelId, &Channel)> {
        self.channels.iter().map(|(&id, channel)| (id, channel))
    }

    /// All clients with their ids.
    pub fn clients(&self) -> impl Iterator<Item = (ClientId, &Client)> {
        self.clients.iter().map(|(&id, client)| (id, client))
    }

    /// Number of registered offices.
    pub fn office_count(&self) -> usize {
        self.offices.len()
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn office_mut(&mut self, office_id: OfficeId) -> Result<&mut Office, NetworkError> {
        self.offices
            .get_mut(&office_id)
            .ok_or(NetworkError::UnknownParticipant(Participant::Office(office_id)))
    }

    fn channel_mut(&mut self, channel_id: ChannelId) -> Result<&mut Channel, NetworkError> {
        self.channels
            .get_mut(&channel_id)
            .ok_or(NetworkError::UnknownParticipant(Participant::Channel(channel_id)))
    }

    fn client_mut(&mut self, client_id: ClientId) -> Result<&mut Client, NetworkError> {
        self.clients
            .get_mut(&client_id)
            .ok_or(NetworkError::UnknownParticipant(Participant::Client(client_id)))
    }
}
