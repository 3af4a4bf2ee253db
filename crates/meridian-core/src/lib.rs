//! Meridian routing network core.
//!
//! Models a network of provider offices connected pairwise by
//! capacity-limited channels, through which clients are routed toward a
//! chosen destination office.
//!
//! ## Architecture
//!
//! ```text
//! meridian-core
//!   ├─ Network       (aggregate: id-keyed tables + movement algorithm)
//!   ├─ Office        (bounded active set, FIFO waitlist, neighbor map)
//!   ├─ Channel       (single transit slot + FIFO overflow queue)
//!   ├─ Client        (state machine: Unassigned → Waitlisted → Active →
//!   │                 InTransit → Active)
//!   └─ RosterStore   (roster loading / record persistence boundary)
//! ```
//!
//! ## Invariants
//!
//! - Every office holds at most [`OFFICE_CAPACITY`] active clients
//! - A channel with an empty slot has an empty queue
//! - Every entry in the global location index points at an office whose
//!   active set contains that client
//! - Operations are atomic: they fully apply or mutate nothing

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod channel;
mod client;
mod error;
mod ids;
mod network;
mod office;
mod professional;
mod store;

pub use channel::{Channel, TransitEntry};
pub use client::{Client, ClientProfile, ClientState};
pub use error::{NetworkError, Participant};
pub use ids::{ChannelId, ClientId, OfficeId, ProfessionalId};
pub use network::{MoveOutcome, Network, ReleaseOutcome};
pub use office::{OFFICE_CAPACITY, Office};
pub use professional::Professional;
pub use store::{MemoryStore, RosterStore, StoreError};
