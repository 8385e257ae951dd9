//! Transition table of the request workflow.
//!
//! ```text
//! New -> Approved -> Completed -> Accepted
//!  |        |
//!  |        +------> Failure
//!  +-> Rejected
//!  +-> Failure
//! ```
//!
//! `Accepted`, `Rejected` and `Failure` are absorbing. Revoking an issued certificate
//! keeps the state of its request.

use strum::{Display, IntoStaticStr};

use crate::model::certificate_request::{CertificateRequest, CertificateRequestState};
use crate::service::error::{ConflictError, ServiceError};
use crate::service::permission::Role;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum WorkflowAction {
    Approve,
    Reject,
    Finish,
    Accept,
    /// The cryptographic operation of an approval failed
    Fail,
    Revoke,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransitionError {
    InvalidTransition,
    /// Key material already handed over
    Gone,
}

impl WorkflowAction {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::Approve | Self::Reject | Self::Fail => &[Role::Approver],
            Self::Finish => &[Role::Writer, Role::Manager],
            Self::Accept => &[Role::Writer],
            Self::Revoke => &[Role::Manager],
        }
    }

    /// State after the action. `Finish` outside of `Approved`/`Completed` keeps the state,
    /// the caller only gets the current status.
    pub fn next_state(
        &self,
        state: CertificateRequestState,
    ) -> Result<CertificateRequestState, TransitionError> {
        use CertificateRequestState as State;

        match (self, state) {
            (Self::Approve, State::New) => Ok(State::Approved),
            (Self::Reject, State::New) => Ok(State::Rejected),
            (Self::Fail, State::New | State::Approved) => Ok(State::Failure),
            (Self::Finish, State::Approved | State::Completed) => Ok(State::Completed),
            (Self::Finish, State::Accepted) => Err(TransitionError::Gone),
            (Self::Finish, state) => Ok(state),
            (Self::Accept, State::Completed) => Ok(State::Accepted),
            (Self::Revoke, state @ (State::Approved | State::Completed | State::Accepted)) => {
                Ok(state)
            }
            _ => Err(TransitionError::InvalidTransition),
        }
    }
}

pub(crate) fn transition(
    action: WorkflowAction,
    request: &CertificateRequest,
) -> Result<CertificateRequestState, ServiceError> {
    action.next_state(request.state).map_err(|err| match err {
        TransitionError::Gone => ServiceError::Gone(request.id),
        TransitionError::InvalidTransition => ConflictError::InvalidTransition {
            state: request.state,
            action: action.into(),
        }
        .into(),
    })
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;
    use crate::model::certificate_request::CertificateRequestState as State;

    const ALL_STATES: [State; 6] = [
        State::New,
        State::Approved,
        State::Rejected,
        State::Completed,
        State::Accepted,
        State::Failure,
    ];

    #[rstest]
    #[case(WorkflowAction::Approve, State::New, Ok(State::Approved))]
    #[case(WorkflowAction::Approve, State::Approved, Err(TransitionError::InvalidTransition))]
    #[case(WorkflowAction::Approve, State::Completed, Err(TransitionError::InvalidTransition))]
    #[case(WorkflowAction::Approve, State::Rejected, Err(TransitionError::InvalidTransition))]
    #[case(WorkflowAction::Reject, State::New, Ok(State::Rejected))]
    #[case(WorkflowAction::Reject, State::Approved, Err(TransitionError::InvalidTransition))]
    #[case(WorkflowAction::Fail, State::New, Ok(State::Failure))]
    #[case(WorkflowAction::Fail, State::Approved, Ok(State::Failure))]
    #[case(WorkflowAction::Fail, State::Completed, Err(TransitionError::InvalidTransition))]
    #[case(WorkflowAction::Finish, State::New, Ok(State::New))]
    #[case(WorkflowAction::Finish, State::Approved, Ok(State::Completed))]
    #[case(WorkflowAction::Finish, State::Completed, Ok(State::Completed))]
    #[case(WorkflowAction::Finish, State::Accepted, Err(TransitionError::Gone))]
    #[case(WorkflowAction::Finish, State::Rejected, Ok(State::Rejected))]
    #[case(WorkflowAction::Finish, State::Failure, Ok(State::Failure))]
    #[case(WorkflowAction::Accept, State::Completed, Ok(State::Accepted))]
    #[case(WorkflowAction::Accept, State::Approved, Err(TransitionError::InvalidTransition))]
    #[case(WorkflowAction::Accept, State::Accepted, Err(TransitionError::InvalidTransition))]
    #[case(WorkflowAction::Revoke, State::Approved, Ok(State::Approved))]
    #[case(WorkflowAction::Revoke, State::Completed, Ok(State::Completed))]
    #[case(WorkflowAction::Revoke, State::Accepted, Ok(State::Accepted))]
    #[case(WorkflowAction::Revoke, State::New, Err(TransitionError::InvalidTransition))]
    #[case(WorkflowAction::Revoke, State::Rejected, Err(TransitionError::InvalidTransition))]
    #[case(WorkflowAction::Revoke, State::Failure, Err(TransitionError::InvalidTransition))]
    fn test_transition_table(
        #[case] action: WorkflowAction,
        #[case] state: State,
        #[case] expected: Result<State, TransitionError>,
    ) {
        assert_eq!(action.next_state(state), expected);
    }

    #[test]
    fn test_absorbing_states_have_no_outgoing_transitions() {
        let actions = [
            WorkflowAction::Approve,
            WorkflowAction::Reject,
            WorkflowAction::Finish,
            WorkflowAction::Accept,
            WorkflowAction::Fail,
            WorkflowAction::Revoke,
        ];

        for state in ALL_STATES.into_iter().filter(State::is_absorbing) {
            for action in actions {
                if let Ok(next) = action.next_state(state) {
                    assert_eq!(next, state, "{action} left absorbing state {state}");
                }
            }
        }
    }

    #[rstest]
    #[case(WorkflowAction::Approve, Role::Approver, true)]
    #[case(WorkflowAction::Approve, Role::Writer, false)]
    #[case(WorkflowAction::Approve, Role::Manager, false)]
    #[case(WorkflowAction::Reject, Role::Approver, true)]
    #[case(WorkflowAction::Reject, Role::Manager, false)]
    #[case(WorkflowAction::Accept, Role::Writer, true)]
    #[case(WorkflowAction::Accept, Role::Approver, false)]
    #[case(WorkflowAction::Accept, Role::Manager, false)]
    #[case(WorkflowAction::Finish, Role::Writer, true)]
    #[case(WorkflowAction::Finish, Role::Manager, true)]
    #[case(WorkflowAction::Finish, Role::Approver, false)]
    #[case(WorkflowAction::Revoke, Role::Manager, true)]
    #[case(WorkflowAction::Revoke, Role::Approver, false)]
    #[case(WorkflowAction::Revoke, Role::Writer, false)]
    fn test_role_matrix(#[case] action: WorkflowAction, #[case] role: Role, #[case] allowed: bool) {
        assert_eq!(action.allowed_roles().contains(&role), allowed);
    }

    #[test]
    fn test_invalid_transition_error() {
        let mut request = crate::service::test_utilities::dummy_request(
            shared_types::TrustGroupId::new_v4(),
            crate::model::certificate_request::CertificateRequestType::SigningRequest,
            State::Rejected,
        );

        assert!(matches!(
            transition(WorkflowAction::Approve, &request),
            Err(ServiceError::Conflict(ConflictError::InvalidTransition {
                state: State::Rejected,
                action: "approve",
            }))
        ));

        request.state = State::Accepted;
        assert!(matches!(
            transition(WorkflowAction::Finish, &request),
            Err(ServiceError::Gone(id)) if id == request.id
        ));
    }
}
