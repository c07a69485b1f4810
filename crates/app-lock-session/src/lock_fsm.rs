//! App-lock state machine using rust-fsm.
//!
//! The three session flags are a projection of a single state, so
//! `verified => set => authenticated` cannot be broken by a transition.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │    SignedOut    │ (initial)            auth  set   verified
//! └────────┬────────┘                      false  -     -
//!          │ SessionRestored / LoginSucceeded
//!          ▼
//! ┌─────────────────────┐
//! │ AwaitingAppPassword │                  true  false  false
//! └────────┬────────────┘
//!          │ PasswordStatusSet        AppPasswordCreated
//!          ▼                          ──────────────────► Unlocked
//! ┌─────────────────┐
//! │     Locked      │                      true  true   false
//! └────────┬────────┘
//!          │ PasswordVerified    ▲
//!          ▼                     │ Lock / PasswordStatusSet / PasswordRejected
//! ┌─────────────────┐            │
//! │    Unlocked     │ ───────────┘          true  true   true
//! └─────────────────┘
//!
//! NoSession / LoggedOut lead back to SignedOut from every state.
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub lock_machine(SignedOut)

    SignedOut => {
        SessionRestored => AwaitingAppPassword,
        LoginSucceeded => AwaitingAppPassword,
        NoSession => SignedOut,
        LoggedOut => SignedOut,
        Lock => SignedOut
    },
    AwaitingAppPassword => {
        SessionRestored => AwaitingAppPassword,
        LoginSucceeded => AwaitingAppPassword,
        NoSession => SignedOut,
        LoggedOut => SignedOut,
        PasswordStatusSet => Locked,
        PasswordStatusUnset => AwaitingAppPassword,
        StatusCheckFailed => AwaitingAppPassword,
        AppPasswordCreated => Unlocked,
        // The backend only confirms a password that exists
        PasswordVerified => Unlocked,
        PasswordRejected => AwaitingAppPassword,
        Lock => AwaitingAppPassword
    },
    Locked => {
        SessionRestored => AwaitingAppPassword,
        LoginSucceeded => AwaitingAppPassword,
        NoSession => SignedOut,
        LoggedOut => SignedOut,
        PasswordStatusSet => Locked,
        PasswordStatusUnset => AwaitingAppPassword,
        StatusCheckFailed => AwaitingAppPassword,
        AppPasswordCreated => Unlocked,
        PasswordVerified => Unlocked,
        PasswordRejected => Locked,
        Lock => Locked
    },
    Unlocked => {
        SessionRestored => AwaitingAppPassword,
        LoginSucceeded => AwaitingAppPassword,
        NoSession => SignedOut,
        LoggedOut => SignedOut,
        // A fresh status check always re-locks
        PasswordStatusSet => Locked,
        PasswordStatusUnset => AwaitingAppPassword,
        StatusCheckFailed => AwaitingAppPassword,
        AppPasswordCreated => Unlocked,
        PasswordVerified => Unlocked,
        PasswordRejected => Locked,
        Lock => Locked
    }
}

pub use lock_machine::Input as LockMachineInput;
pub use lock_machine::State as LockMachineState;
pub use lock_machine::StateMachine as LockMachine;

/// Public view of the lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    /// No session token.
    SignedOut,
    /// Signed in, no app password configured (or its status is unknown).
    AwaitingAppPassword,
    /// Signed in with an app password that has not been entered.
    Locked,
    /// Signed in and the app password was entered.
    Unlocked,
}

impl LockState {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, LockState::SignedOut)
    }

    pub fn app_password_set(&self) -> bool {
        matches!(self, LockState::Locked | LockState::Unlocked)
    }

    pub fn app_password_verified(&self) -> bool {
        matches!(self, LockState::Unlocked)
    }
}

impl From<&LockMachineState> for LockState {
    fn from(state: &LockMachineState) -> Self {
        match state {
            LockMachineState::SignedOut => LockState::SignedOut,
            LockMachineState::AwaitingAppPassword => LockState::AwaitingAppPassword,
            LockMachineState::Locked => LockState::Locked,
            LockMachineState::Unlocked => LockState::Unlocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_INPUTS: [LockMachineInput; 11] = [
        LockMachineInput::SessionRestored,
        LockMachineInput::LoginSucceeded,
        LockMachineInput::NoSession,
        LockMachineInput::LoggedOut,
        LockMachineInput::PasswordStatusSet,
        LockMachineInput::PasswordStatusUnset,
        LockMachineInput::StatusCheckFailed,
        LockMachineInput::AppPasswordCreated,
        LockMachineInput::PasswordVerified,
        LockMachineInput::PasswordRejected,
        LockMachineInput::Lock,
    ];

    fn machine_in(inputs: &[LockMachineInput]) -> LockMachine {
        let mut machine = LockMachine::new();
        for input in inputs {
            machine.consume(input).unwrap();
        }
        machine
    }

    fn assert_flag_chain(state: LockState) {
        if state.app_password_verified() {
            assert!(state.app_password_set(), "{:?}", state);
        }
        if state.app_password_set() {
            assert!(state.is_authenticated(), "{:?}", state);
        }
    }

    #[test]
    fn test_initial_state_is_signed_out() {
        let machine = LockMachine::new();
        assert_eq!(*machine.state(), LockMachineState::SignedOut);
        assert_eq!(LockState::from(machine.state()), LockState::SignedOut);
    }

    #[test]
    fn test_login_without_app_password() {
        let mut machine = LockMachine::new();

        machine.consume(&LockMachineInput::LoginSucceeded).unwrap();
        assert_eq!(*machine.state(), LockMachineState::AwaitingAppPassword);

        machine
            .consume(&LockMachineInput::PasswordStatusUnset)
            .unwrap();
        assert_eq!(*machine.state(), LockMachineState::AwaitingAppPassword);

        machine
            .consume(&LockMachineInput::AppPasswordCreated)
            .unwrap();
        assert_eq!(*machine.state(), LockMachineState::Unlocked);
    }

    #[test]
    fn test_restored_session_with_app_password_is_locked() {
        let mut machine = machine_in(&[LockMachineInput::SessionRestored]);

        machine.consume(&LockMachineInput::PasswordStatusSet).unwrap();
        assert_eq!(*machine.state(), LockMachineState::Locked);

        machine.consume(&LockMachineInput::PasswordRejected).unwrap();
        assert_eq!(*machine.state(), LockMachineState::Locked);

        machine.consume(&LockMachineInput::PasswordVerified).unwrap();
        assert_eq!(*machine.state(), LockMachineState::Unlocked);
    }

    #[test]
    fn test_status_check_relocks_unlocked_session() {
        let mut machine = machine_in(&[
            LockMachineInput::LoginSucceeded,
            LockMachineInput::AppPasswordCreated,
        ]);
        assert_eq!(*machine.state(), LockMachineState::Unlocked);

        machine.consume(&LockMachineInput::PasswordStatusSet).unwrap();
        assert_eq!(*machine.state(), LockMachineState::Locked);
    }

    #[test]
    fn test_lock_only_clears_verification() {
        let mut machine = machine_in(&[
            LockMachineInput::LoginSucceeded,
            LockMachineInput::AppPasswordCreated,
        ]);
        machine.consume(&LockMachineInput::Lock).unwrap();
        assert_eq!(*machine.state(), LockMachineState::Locked);

        // Locking again, or while signed out, is a no-op.
        machine.consume(&LockMachineInput::Lock).unwrap();
        assert_eq!(*machine.state(), LockMachineState::Locked);

        let mut signed_out = LockMachine::new();
        signed_out.consume(&LockMachineInput::Lock).unwrap();
        assert_eq!(*signed_out.state(), LockMachineState::SignedOut);
    }

    #[test]
    fn test_failed_status_check_clears_set_flag() {
        let mut machine = machine_in(&[
            LockMachineInput::SessionRestored,
            LockMachineInput::PasswordStatusSet,
        ]);
        machine.consume(&LockMachineInput::StatusCheckFailed).unwrap();
        assert_eq!(*machine.state(), LockMachineState::AwaitingAppPassword);
    }

    #[test]
    fn test_logout_from_every_state() {
        let paths: [&[LockMachineInput]; 4] = [
            &[],
            &[LockMachineInput::LoginSucceeded],
            &[
                LockMachineInput::LoginSucceeded,
                LockMachineInput::PasswordStatusSet,
            ],
            &[
                LockMachineInput::LoginSucceeded,
                LockMachineInput::AppPasswordCreated,
            ],
        ];
        for path in paths {
            let mut machine = machine_in(path);
            machine.consume(&LockMachineInput::LoggedOut).unwrap();
            assert_eq!(*machine.state(), LockMachineState::SignedOut);
        }
    }

    #[test]
    fn test_signed_out_rejects_app_password_inputs() {
        let mut machine = LockMachine::new();

        assert!(machine
            .consume(&LockMachineInput::AppPasswordCreated)
            .is_err());
        assert!(machine.consume(&LockMachineInput::PasswordVerified).is_err());
        assert!(machine.consume(&LockMachineInput::PasswordStatusSet).is_err());
        assert_eq!(*machine.state(), LockMachineState::SignedOut);
    }

    #[test]
    fn test_every_reachable_state_keeps_flag_chain() {
        let mut frontier = vec![LockMachine::new()];
        let mut seen = Vec::new();

        while let Some(machine) = frontier.pop() {
            let state = LockState::from(machine.state());
            if seen.contains(&state) {
                continue;
            }
            seen.push(state);
            assert_flag_chain(state);

            for input in &ALL_INPUTS {
                let mut next = LockMachine::from_state(machine.state().clone());
                if next.consume(input).is_ok() {
                    frontier.push(next);
                }
            }
        }

        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_lock_state_projection() {
        assert!(!LockState::SignedOut.is_authenticated());
        assert!(LockState::AwaitingAppPassword.is_authenticated());
        assert!(!LockState::AwaitingAppPassword.app_password_set());
        assert!(LockState::Locked.app_password_set());
        assert!(!LockState::Locked.app_password_verified());
        assert!(LockState::Unlocked.app_password_verified());
    }
}
