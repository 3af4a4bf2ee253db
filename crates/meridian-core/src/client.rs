//! Client records and the client state machine.

use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, ClientId, OfficeId};

/// Demographic record carried by a client.
///
/// This is the data the record cipher protects when persisted; the routing
/// core never inspects it beyond passing it through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    /// Full name.
    pub name: String,
    /// Jurisdiction of residence.
    pub jurisdiction: String,
    /// Date of birth (MM/DD/YY).
    pub date_of_birth: String,
    /// Preferred language.
    pub language: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
}

/// Where a client currently sits in the network.
///
/// Transitions: `Unassigned` → `Waitlisted` → `Active` → `InTransit` →
/// `Active` at the new office. Removal returns a client to `Unassigned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Not attached to any office.
    Unassigned,
    /// Waiting for a capacity slot at an office.
    Waitlisted(OfficeId),
    /// Holding an active seat at an office.
    Active(OfficeId),
    /// Occupying or queued on a channel, seat at the origin office still
    /// held until the transfer completes.
    InTransit(ChannelId),
}

/// A client routed through the network toward a destination office.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    id: ClientId,
    profile: ClientProfile,
    diagnosis: Option<String>,
    destination: Option<OfficeId>,
    state: ClientState,
}

impl Client {
    pub(crate) fn new(id: ClientId, profile: ClientProfile) -> Self {
        Self { id, profile, diagnosis: None, destination: None, state: ClientState::Unassigned }
    }

    /// Client identifier.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Demographic record.
    pub fn profile(&self) -> &ClientProfile {
        &self.profile
    }

    /// Current diagnosis, if one has been recorded.
    pub fn diagnosis(&self) -> Option<&str> {
        self.diagnosis.as_deref()
    }

    /// Destination office of a pending move, if any.
    pub fn destination(&self) -> Option<OfficeId> {
        self.destination
    }

    /// Current position in the client state machine.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Office the client holds an active seat at, if any.
    pub fn current_office(&self) -> Option<OfficeId> {
        match self.state {
            ClientState::Active(office) => Some(office),
            _ => None,
        }
    }

    pub(crate) fn set_state(&mut self, state: ClientState) {
        self.state = state;
    }

    pub(crate) fn set_destination(&mut self, destination: Option<OfficeId>) {
        self.destination = destination;
    }

    pub(crate) fn set_diagnosis(&mut self, diagnosis: Option<String>) {
        self.diagnosis = diagnosis;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ClientProfile {
        ClientProfile {
            name: "Ada Quinn".to_string(),
            jurisdiction: "ON".to_string(),
            date_of_birth: "04/12/91".to_string(),
            language: "English".to_string(),
            email: "ada.quinn@example.com".to_string(),
            phone: "555-0101".to_string(),
        }
    }

    #[test]
    fn new_client_is_unassigned() {
        let client = Client::new(ClientId(1), profile());
        assert_eq!(client.state(), ClientState::Unassigned);
        assert_eq!(client.destination(), None);
        assert_eq!(client.diagnosis(), None);
        assert_eq!(client.current_office(), None);
    }

    #[test]
    fn current_office_only_when_active() {
        let mut client = Client::new(ClientId(1), profile());

        client.set_state(ClientState::Active(OfficeId(4)));
        assert_eq!(client.current_office(), Some(OfficeId(4)));

        client.set_state(ClientState::InTransit(ChannelId(0)));
        assert_eq!(client.current_office(), None);
    }
}
