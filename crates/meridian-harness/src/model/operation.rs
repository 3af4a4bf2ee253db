//! Operations for model-based testing.
//!
//! Operations represent all externally visible actions on the network.
//! They are generated randomly by proptest (or a fuzzer via `Arbitrary`)
//! and applied to both the model and the real implementation.

use arbitrary::Arbitrary;

/// Model client identifier: index into the registration order.
pub type ModelClientId = u8;

/// Model office identifier (u8 keeps the test space manageable).
pub type ModelOfficeId = u8;

/// Operations that can be applied to the network.
///
/// Ids are small integers so random sequences collide on the same
/// clients and offices often enough to exercise capacity and queueing.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Register a new client, initially unassigned.
    Register,

    /// Put an unassigned client on an office's waitlist.
    Waitlist {
        /// Client to waitlist.
        client: ModelClientId,
        /// Target office.
        office: ModelOfficeId,
    },

    /// Admit a client to an office's active set.
    Admit {
        /// Client to admit.
        client: ModelClientId,
        /// Admitting office.
        office: ModelOfficeId,
    },

    /// Decline a waitlisted client.
    Decline {
        /// Client to decline.
        client: ModelClientId,
        /// Office declining the client.
        office: ModelOfficeId,
    },

    /// Remove an active client from the network.
    Remove {
        /// Client to remove.
        client: ModelClientId,
    },

    /// Set the destination for a client's next move.
    SetDestination {
        /// Client whose destination is set.
        client: ModelClientId,
        /// Destination office.
        office: ModelOfficeId,
    },

    /// Move a client toward its destination.
    Move {
        /// Client to move.
        client: ModelClientId,
    },

    /// Release the channel between two offices, completing the occupant's
    /// transfer.
    Release {
        /// One endpoint.
        a: ModelOfficeId,
        /// The other endpoint.
        b: ModelOfficeId,
    },
}

/// Result of applying an operation.
///
/// Carries enough detail to compare model and real behavior, including
/// which movement branch was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded with no further detail.
    Ok,

    /// Move resolved as a direct transfer.
    Transferred,

    /// Move parked the client in the channel slot.
    Parked,

    /// Move queued the client behind the occupant.
    Queued {
        /// Zero-based queue position.
        position: usize,
    },

    /// Release completed a transfer.
    Released {
        /// Whether a queued client was promoted to occupant.
        promoted: bool,
    },

    /// Operation failed with an expected error.
    Error(OperationError),
}

/// Expected errors, collapsed to the granularity both sides can agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Client id not registered.
    UnknownClient,

    /// Office id out of range.
    UnknownOffice,

    /// The target office's active set is full.
    OfficeFull,

    /// The client's state does not permit the operation.
    InvalidState,

    /// No channel exists between the two offices.
    NoChannel,
}

impl OperationResult {
    /// Check if the operation succeeded.
    pub fn is_ok(&self) -> bool {
        !matches!(self, OperationResult::Error(_))
    }

    /// Check if the operation failed.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}
