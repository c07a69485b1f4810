//! Session and app-lock core for the Moodlog client.
//!
//! This crate provides:
//! - An explicit lock state machine whose states project onto the
//!   `isAuthenticated` / `appPasswordSet` / `appPasswordVerified` flags
//! - `SessionManager`, the single owner of session mutation
//! - Route selection for the UI layer
//! - An inactivity monitor that re-locks the app password gate

mod error;
mod inactivity;
mod lock_fsm;
pub mod messages;
mod route;
mod session;
pub mod validation;

pub use error::{AuthError, AuthResult};
pub use inactivity::InactivityMonitor;
pub use lock_fsm::lock_machine;
pub use lock_fsm::{LockMachine, LockMachineInput, LockMachineState, LockState};
pub use route::Route;
pub use session::{SessionManager, SessionSnapshot, INACTIVITY_THRESHOLD};
