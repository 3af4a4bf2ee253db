//! Test harness for the routing network.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference network for model-based
//! testing. Operations are applied to both the model and the real
//! implementation, and their results and observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;

pub use model::{
    ModelClientId, ModelOfficeId, ModelState, ModelWorld, ObservableState, Operation,
    OperationError, OperationResult,
};
