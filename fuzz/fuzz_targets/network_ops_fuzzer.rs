//! Fuzz target for the [`Network`] aggregate
//!
//! Exercise the admission and movement state machine with arbitrary
//! operation sequences
//!
//! # Strategy
//!
//! - Operation sequences: Arbitrary interleavings of waitlist, admit,
//!   move, and release over a small office mesh
//! - Id collisions: Small id spaces so operations hit the same clients,
//!   offices, and channels often
//! - Invalid targets: Unregistered clients and out-of-range offices mixed
//!   into every sequence
//!
//! # Invariants
//!
//! - No office ever holds more than `OFFICE_CAPACITY` active clients
//! - Every neighbor-map entry points at a channel listing the office
//!   among its endpoints
//! - A channel with an empty slot has an empty queue
//! - Every location index entry points at an office whose active set
//!   contains that client
//! - An active or in-transit client holds exactly one seat
//! - NEVER panic on a recoverable error

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use meridian_core::{
    ClientId, ClientProfile, ClientState, Network, OFFICE_CAPACITY, Professional, ProfessionalId,
};
use meridian_harness::Operation;

/// Fuzz input: mesh size plus an operation sequence.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Number of offices (clamped to 1..=6).
    num_offices: u8,
    /// Operations to apply.
    ops: Vec<Operation>,
}

fuzz_target!(|input: FuzzInput| {
    let num_offices = input.num_offices % 6 + 1;
    let roster: Vec<Professional> = (0..num_offices)
        .map(|i| {
            Professional::new(
                ProfessionalId(u32::from(i)),
                format!("Professional {i}"),
                "PhD",
                "Clinical",
                "CA",
            )
        })
        .collect();
    let Ok(mut network) = Network::from_roster(roster) else {
        unreachable!("sequential roster ids cannot collide");
    };

    let mut clients: Vec<ClientId> = Vec::new();

    for op in &input.ops {
        match *op {
            Operation::Register => {
                let id = network.register_client(ClientProfile {
                    name: format!("Client {}", clients.len()),
                    jurisdiction: "CA".to_string(),
                    date_of_birth: "01/01/90".to_string(),
                    language: "English".to_string(),
                    email: "c@example.com".to_string(),
                    phone: "555-0100".to_string(),
                });
                clients.push(id);
            },
            Operation::Waitlist { client, office } => {
                let _ = network.waitlist_client(client_id(&clients, client), professional(office));
            },
            Operation::Admit { client, office } => {
                let _ = network.admit_client(client_id(&clients, client), professional(office));
            },
            Operation::Decline { client, office } => {
                let _ = network.decline_client(client_id(&clients, client), professional(office));
            },
            Operation::Remove { client } => {
                let _ = network.remove_client(client_id(&clients, client));
            },
            Operation::SetDestination { client, office } => {
                let _ = network.set_destination(client_id(&clients, client), professional(office));
            },
            Operation::Move { client } => {
                let _ = network.move_client(client_id(&clients, client));
            },
            Operation::Release { a, b } => {
                if let Ok(Some(channel)) =
                    network.channel_between(professional(a), professional(b))
                {
                    let _ = network.release_channel(channel);
                }
            },
        }

        check_invariants(&network, &clients);
    }
});

/// Map a fuzz index to a registered id; out-of-range indices map to an
/// id the network never issued, so the lookup itself is under test too.
fn client_id(clients: &[ClientId], index: u8) -> ClientId {
    clients.get(index as usize).copied().unwrap_or(ClientId(u64::MAX))
}

fn professional(office: u8) -> ProfessionalId {
    ProfessionalId(u32::from(office))
}

fn check_invariants(network: &Network, clients: &[ClientId]) {
    for (office_id, office) in network.offices() {
        assert!(
            office.active_clients().len() <= OFFICE_CAPACITY,
            "office {office_id} over capacity"
        );

        for (neighbor, channel_id) in office.neighbors() {
            let Ok(channel) = network.channel(channel_id) else {
                panic!("office {office_id} maps {neighbor} to a missing channel");
            };
            assert!(
                channel.connects(office_id),
                "channel {channel_id} does not list {office_id} among its endpoints"
            );
        }
    }

    for (channel_id, channel) in network.channels() {
        if channel.occupant().is_none() {
            assert_eq!(
                channel.queue_len(),
                0,
                "channel {channel_id} has a queue but no occupant"
            );
        }
    }

    for &client_id in clients {
        let Ok(client) = network.client(client_id) else {
            panic!("registered client {client_id} disappeared");
        };

        let seats: Vec<_> = network
            .offices()
            .filter(|(_, office)| office.is_active(client_id))
            .map(|(id, _)| id)
            .collect();

        match client.state() {
            ClientState::Active(office) => {
                assert_eq!(seats, vec![office], "seat does not match state for {client_id}");
                assert_eq!(network.client_location(client_id), Some(office));
            },
            ClientState::InTransit(_) => {
                let location = network.client_location(client_id);
                assert_eq!(seats.len(), 1, "in-transit {client_id} must hold its origin seat");
                assert_eq!(location, Some(seats[0]));
            },
            ClientState::Unassigned | ClientState::Waitlisted(_) => {
                assert!(seats.is_empty(), "{client_id} holds a seat without being active");
                assert_eq!(network.client_location(client_id), None);
            },
        }
    }
}
