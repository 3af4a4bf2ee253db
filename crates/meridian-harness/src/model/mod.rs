//! Reference model for model-based testing.
//!
//! The model is a simplified network that captures the required behavior
//! of movement and admission without the id tables and index bookkeeping
//! of the real implementation. It serves as the oracle against which the
//! real network is verified.
//!
//! # Design Principles
//!
//! - Simplicity: the model should be obviously correct
//! - Behavior not implementation: captures WHAT, not HOW
//! - Deterministic: same operation sequence, same observable state

pub mod operation;
mod world;

pub use operation::{
    ModelClientId, ModelOfficeId, Operation, OperationError, OperationResult,
};
pub use world::{ModelState, ModelWorld, ObservableState};
