//! Lead assignment: single, bulk and the admin reassignment-request fallback

pub mod coordinator;
pub mod state;

pub use coordinator::{AssignError, AssignmentCoordinator};
pub use state::{AssignEvent, AssignState, AssignmentMachine, TransitionError};
