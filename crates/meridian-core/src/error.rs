//! Network error types.

use std::fmt;

use thiserror::Error;

use crate::ids::{ChannelId, ClientId, OfficeId, ProfessionalId};

/// A participant referenced by a failing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    /// A professional id.
    Professional(ProfessionalId),
    /// An office id.
    Office(OfficeId),
    /// A channel id.
    Channel(ChannelId),
    /// A client id.
    Client(ClientId),
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Professional(id) => write!(f, "{id}"),
            Self::Office(id) => write!(f, "{id}"),
            Self::Channel(id) => write!(f, "{id}"),
            Self::Client(id) => write!(f, "{id}"),
        }
    }
}

/// Errors from network operations.
///
/// Every operation either fully applies or returns one of these and leaves
/// the network untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Office admission attempted at the active-client limit.
    #[error("{office} is at capacity")]
    CapacityExceeded {
        /// The office that has no spare seat.
        office: OfficeId,
    },

    /// A channel already connects the two offices.
    #[error("{a} and {b} are already connected")]
    DuplicateEdge {
        /// One endpoint of the existing channel.
        a: OfficeId,
        /// The other endpoint.
        b: OfficeId,
    },

    /// The professional already owns an office.
    #[error("{0} already owns an office")]
    DuplicateOffice(ProfessionalId),

    /// Operation referenced an unregistered professional, office, channel,
    /// or client.
    #[error("unknown participant: {0}")]
    UnknownParticipant(Participant),

    /// Self-connection, or a move requested with no channel between the
    /// current and destination offices.
    #[error("invalid topology: {reason}")]
    InvalidTopology {
        /// Description of the topology fault.
        reason: String,
    },

    /// Operation called against a state that violates its precondition,
    /// e.g. releasing an empty channel slot.
    #[error("state violation: {reason}")]
    StateViolation {
        /// Description of the violated precondition.
        reason: String,
    },
}

impl NetworkError {
    /// Returns true if this error is fatal (a caller bug).
    ///
    /// Capacity and duplicate-edge conditions are legitimate business
    /// outcomes the caller is expected to handle. Everything else is a
    /// precondition violation.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::CapacityExceeded { .. }
            | Self::DuplicateEdge { .. }
            | Self::DuplicateOffice(_) => false,

            Self::UnknownParticipant(_)
            | Self::InvalidTopology { .. }
            | Self::StateViolation { .. } => true,
        }
    }
}
