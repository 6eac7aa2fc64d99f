//! stc-models: concrete plants for the simulation controller.
//!
//! - `JetEngine`: two-state compressor surge model (Moore-Greitzer form)
//! - `RigidBody`: three-state rigid body driven by two torques
//!
//! Each model implements `PlantModel`. The control and trigger laws are also
//! available as associated functions so they can be handed to a
//! `Controller` that is mutably borrowing the model.

pub mod jet_engine;
pub mod rigid_body;

pub use jet_engine::JetEngine;
pub use rigid_body::RigidBody;
