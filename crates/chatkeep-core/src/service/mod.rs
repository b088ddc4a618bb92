//! Business logic services (use cases).
//!
//! Services orchestrate repository calls and business rules. They depend on
//! traits (ports) -- never on concrete infrastructure implementations.

pub mod auth;
pub mod clock;
pub mod credential;
pub mod session;
pub mod settings;
pub mod token;
