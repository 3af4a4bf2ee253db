//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the
//! real network behaves identically to the reference model.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelWorld     RealWorld       Compare
//!      (reference)    (Network)       Results
//! ```

use std::collections::HashMap;

use meridian_core::{
    Client, ClientId, ClientProfile, ClientState, MoveOutcome, Network, NetworkError, OfficeId,
    Participant, Professional, ProfessionalId,
};
use meridian_harness::{
    ModelClientId, ModelOfficeId, ModelState, ModelWorld, ObservableState, Operation,
    OperationError, OperationResult,
};
use proptest::prelude::*;

/// Real system wrapper that mirrors ModelWorld's interface.
struct RealWorld {
    network: Network,
    /// Professional ids in office order (office index == roster index).
    professionals: Vec<ProfessionalId>,
    /// Real client ids in registration order.
    clients: Vec<ClientId>,
    /// Reverse maps from real ids to model indices.
    office_index: HashMap<OfficeId, ModelOfficeId>,
    client_index: HashMap<ClientId, ModelClientId>,
}

impl RealWorld {
    fn new(num_offices: ModelOfficeId) -> Self {
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
        let professionals: Vec<ProfessionalId> = roster.iter().map(|p| p.id).collect();
        let network = Network::from_roster(roster).expect("roster is valid");

        let office_index = professionals
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let office = network.office_of(p).expect("registered above");
                (office, i as ModelOfficeId)
            })
            .collect();

        Self { network, professionals, clients: Vec::new(), office_index, client_index: HashMap::new() }
    }

    fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::Register => {
                let id = self.network.register_client(profile(self.clients.len()));
                self.client_index.insert(id, self.clients.len() as ModelClientId);
                self.clients.push(id);
                OperationResult::Ok
            },
            Operation::Waitlist { client, office } => {
                map_unit(self.network.waitlist_client(self.client_id(client), professional(office)))
            },
            Operation::Admit { client, office } => {
                map_unit(self.network.admit_client(self.client_id(client), professional(office)))
            },
            Operation::Decline { client, office } => {
                map_unit(self.network.decline_client(self.client_id(client), professional(office)))
            },
            Operation::Remove { client } => {
                map_unit(self.network.remove_client(self.client_id(client)))
            },
            Operation::SetDestination { client, office } => {
                map_unit(self.network.set_destination(self.client_id(client), professional(office)))
            },
            Operation::Move { client } => {
                match self.network.move_client(self.client_id(client)) {
                    Ok(MoveOutcome::Transferred) => OperationResult::Transferred,
                    Ok(MoveOutcome::Parked) => OperationResult::Parked,
                    Ok(MoveOutcome::Queued { position }) => OperationResult::Queued { position },
                    Err(e) => OperationResult::Error(map_error(&e)),
                }
            },
            Operation::Release { a, b } => self.apply_release(a, b),
        }
    }

    fn apply_release(&mut self, a: ModelOfficeId, b: ModelOfficeId) -> OperationResult {
        let channel = match self.network.channel_between(professional(a), professional(b)) {
            Ok(Some(channel)) => channel,
            Ok(None) => return OperationResult::Error(OperationError::NoChannel),
            Err(e) => return OperationResult::Error(map_error(&e)),
        };
        match self.network.release_channel(channel) {
            Ok(outcome) => OperationResult::Released { promoted: outcome.promoted.is_some() },
            Err(e) => OperationResult::Error(map_error(&e)),
        }
    }

    /// Map a model client index to its real id; out-of-range indices map
    /// to an id the network has never issued.
    fn client_id(&self, client: ModelClientId) -> ClientId {
        self.clients.get(client as usize).copied().unwrap_or(ClientId(u64::MAX))
    }

    /// Observable state in model terms, for direct comparison.
    fn observable_state(&self) -> ObservableState {
        let num_offices = self.professionals.len();
        let mut active = vec![Vec::new(); num_offices];
        let mut waitlists = vec![Vec::new(); num_offices];

        for (&professional, index) in self.professionals.iter().zip(0..) {
            let office_id = self.network.office_of(professional).expect("registered");
            let office = self.network.office(office_id).expect("registered");
            active[index] = office
                .active_clients()
                .iter()
                .map(|id| self.model_client(*id))
                .collect::<Vec<_>>();
            active[index].sort_unstable();
            waitlists[index] = office.waitlist().map(|id| self.model_client(id)).collect();
        }

        let mut channels = Vec::new();
        for a in 0..num_offices {
            for b in (a + 1)..num_offices {
                let channel_id = self
                    .network
                    .channel_between(professional(a as ModelOfficeId), professional(b as ModelOfficeId))
                    .expect("offices registered")
                    .expect("mesh is fully connected");
                let channel = self.network.channel(channel_id).expect("registered");
                channels.push((
                    (a as ModelOfficeId, b as ModelOfficeId),
                    channel.occupant().map(|id| self.model_client(id)),
                    channel.queue().map(|id| self.model_client(id)).collect(),
                ));
            }
        }

        let clients = self
            .clients
            .iter()
            .map(|&id| {
                let client = self.network.client(id).expect("registered");
                (self.model_state(client), client.destination().map(|o| self.model_office(o)))
            })
            .collect();

        ObservableState { active, waitlists, channels, clients }
    }

    fn model_state(&self, client: &Client) -> ModelState {
        match client.state() {
            ClientState::Unassigned => ModelState::Unassigned,
            ClientState::Waitlisted(office) => ModelState::Waitlisted(self.model_office(office)),
            ClientState::Active(office) => ModelState::Active(self.model_office(office)),
            ClientState::InTransit(_) => {
                let origin = self
                    .network
                    .client_location(client.id())
                    .expect("in-transit client holds its origin seat");
                ModelState::InTransit { origin: self.model_office(origin) }
            },
        }
    }

    fn model_office(&self, office: OfficeId) -> ModelOfficeId {
        *self.office_index.get(&office).expect("office belongs to this network")
    }

    fn model_client(&self, client: ClientId) -> ModelClientId {
        *self.client_index.get(&client).expect("client registered through the wrapper")
    }
}

fn professional(office: ModelOfficeId) -> ProfessionalId {
    ProfessionalId(u32::from(office))
}

fn profile(n: usize) -> ClientProfile {
    ClientProfile {
        name: format!("Client {n}"),
        jurisdiction: "CA".to_string(),
        date_of_birth: "01/01/90".to_string(),
        language: "English".to_string(),
        email: format!("client{n}@example.com"),
        phone: "555-0100".to_string(),
    }
}

fn map_unit(result: Result<(), NetworkError>) -> OperationResult {
    match result {
        Ok(()) => OperationResult::Ok,
        Err(e) => OperationResult::Error(map_error(&e)),
    }
}

fn map_error(error: &NetworkError) -> OperationError {
    match error {
        NetworkError::UnknownParticipant(Participant::Client(_)) => OperationError::UnknownClient,
        NetworkError::UnknownParticipant(_) => OperationError::UnknownOffice,
        NetworkError::CapacityExceeded { .. } => OperationError::OfficeFull,
        NetworkError::InvalidTopology { .. } => OperationError::NoChannel,
        NetworkError::StateViolation { .. }
        | NetworkError::DuplicateEdge { .. }
        | NetworkError::DuplicateOffice(_) => OperationError::InvalidState,
    }
}

/// Strategy for generating operations over small id spaces.
fn operation_strategy(num_offices: ModelOfficeId, num_clients: u8) -> impl Strategy<Value = Operation> {
    let client = 0..num_clients;
    let office = 0..num_offices;

    prop_oneof![
        // Weight towards the movement operations
        2 => Just(Operation::Register),
        3 => (client.clone(), office.clone())
            .prop_map(|(client, office)| Operation::Waitlist { client, office }),
        4 => (client.clone(), office.clone())
            .prop_map(|(client, office)| Operation::Admit { client, office }),
        1 => (client.clone(), office.clone())
            .prop_map(|(client, office)| Operation::Decline { client, office }),
        1 => client.clone().prop_map(|client| Operation::Remove { client }),
        4 => (client.clone(), office.clone())
            .prop_map(|(client, office)| Operation::SetDestination { client, office }),
        5 => client.clone().prop_map(|client| Operation::Move { client }),
        3 => (office.clone(), office.clone()).prop_map(|(a, b)| Operation::Release { a, b }),
    ]
}

proptest! {
    /// Core model-based test: random operation sequences produce identical
    /// results and identical observable state on both sides.
    #[test]
    fn prop_model_matches_real(
        num_offices in 2..5u8,
        ops in prop::collection::vec(operation_strategy(4, 24), 0..80)
    ) {
        let mut model = ModelWorld::new(num_offices);
        let mut real = RealWorld::new(num_offices);

        for (i, op) in ops.iter().enumerate() {
            let op = clamp_office(op.clone(), num_offices);

            let model_result = model.apply(&op);
            let real_result = real.apply(&op);
            prop_assert_eq!(
                &model_result, &real_result,
                "divergence at operation {}: {:?}", i, op
            );
        }

        prop_assert_eq!(model.observable_state(), real.observable_state());
    }

    /// Capacity invariant: no office ever exceeds its seat limit, no
    /// matter the operation sequence.
    #[test]
    fn prop_capacity_never_exceeded(
        ops in prop::collection::vec(operation_strategy(3, 40), 0..120)
    ) {
        let mut real = RealWorld::new(3);
        for op in &ops {
            let _ = real.apply(op);
        }

        for office in real.observable_state().active {
            prop_assert!(office.len() <= meridian_core::OFFICE_CAPACITY);
        }
    }

    /// Channel invariant: an empty slot implies an empty queue.
    #[test]
    fn prop_empty_slot_implies_empty_queue(
        ops in prop::collection::vec(operation_strategy(4, 24), 0..120)
    ) {
        let mut real = RealWorld::new(4);
        for op in &ops {
            let _ = real.apply(op);
        }

        for (pair, slot, queue) in real.observable_state().channels {
            if slot.is_none() {
                prop_assert!(queue.is_empty(), "channel {:?} has a queue but no occupant", pair);
            }
        }
    }

    /// Location invariant: every active or in-transit client holds exactly
    /// one seat, and it is where its state says it is.
    #[test]
    fn prop_seats_match_client_state(
        ops in prop::collection::vec(operation_strategy(3, 24), 0..120)
    ) {
        let mut real = RealWorld::new(3);
        for op in &ops {
            let _ = real.apply(op);
        }

        let state = real.observable_state();
        for (client, (client_state, _)) in state.clients.iter().enumerate() {
            let client = client as u8;
            let seats = state.active.iter().filter(|office| office.contains(&client)).count();
            match client_state {
                ModelState::Active(office) | ModelState::InTransit { origin: office } => {
                    prop_assert_eq!(seats, 1);
                    prop_assert!(state.active[*office as usize].contains(&client));
                },
                ModelState::Unassigned | ModelState::Waitlisted(_) => {
                    prop_assert_eq!(seats, 0);
                },
            }
        }
    }
}

/// Clamp office ids to the configured mesh size.
fn clamp_office(op: Operation, num_offices: ModelOfficeId) -> Operation {
    match op {
        Operation::Waitlist { client, office } => {
            Operation::Waitlist { client, office: office % num_offices }
        },
        Operation::Admit { client, office } => {
            Operation::Admit { client, office: office % num_offices }
        },
        Operation::Decline { client, office } => {
            Operation::Decline { client, office: office % num_offices }
        },
        Operation::SetDestination { client, office } => {
            Operation::SetDestination { client, office: office % num_offices }
        },
        Operation::Release { a, b } => {
            Operation::Release { a: a % num_offices, b: b % num_offices }
        },
        other => other,
    }
}

mod smoke_tests {
    use super::*;

    /// Full movement cycle checked against both implementations at once.
    #[test]
    fn model_and_real_agree_on_a_full_cycle() {
        let mut model = ModelWorld::new(2);
        let mut real = RealWorld::new(2);

        let script = [
            Operation::Register,
            Operation::Register,
            Operation::Waitlist { client: 0, office: 0 },
            Operation::Admit { client: 0, office: 0 },
            Operation::SetDestination { client: 0, office: 1 },
            Operation::Move { client: 0 },
            Operation::Remove { client: 0 },
            Operation::Move { client: 0 },
            Operation::Release { a: 0, b: 1 },
        ];
        for op in &script {
            assert_eq!(model.apply(op), real.apply(op), "diverged on {op:?}");
        }
        assert_eq!(model.observable_state(), real.observable_state());
    }

    /// Parking happens when the destination is full, queueing when the
    /// slot is taken.
    #[test]
    fn park_then_queue_sequence() {
        let mut model = ModelWorld::new(2);
        let mut real = RealWorld::new(2);

        let mut script = Vec::new();
        // 12 clients: fill office 1, then route two more from office 0.
        for _ in 0..12 {
            script.push(Operation::Register);
        }
        for client in 0..10 {
            script.push(Operation::Admit { client, office: 1 });
        }
        for client in 10..12 {
            script.push(Operation::Admit { client, office: 0 });
            script.push(Operation::SetDestination { client, office: 1 });
            script.push(Operation::Move { client });
        }

        for op in &script {
            assert_eq!(model.apply(op), real.apply(op), "diverged on {op:?}");
        }

        let last_move = model.apply(&Operation::Move { client: 11 });
        assert_eq!(last_move, OperationResult::Error(OperationError::InvalidState));

        // Free a seat at office 1, then release the channel.
        let ops = [Operation::Remove { client: 0 }, Operation::Release { a: 0, b: 1 }];
        let _ = real.apply(&Operation::Move { client: 11 });
        for op in &ops {
            assert_eq!(model.apply(op), real.apply(op), "diverged on {op:?}");
        }
        assert_eq!(model.observable_state(), real.observable_state());
    }
}
