//! Reservation lifecycle state machine.
//!
//! Pure transition table: given the current status, the operator action and
//! a capture-gate snapshot, it either yields the outcome to persist or the
//! rejection to surface. Persistence happens elsewhere, inside a
//! transaction holding the reservation row lock.

use super::capture::GateStatus;
use super::error::ReservationError;
use crate::db::ReservationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    /// Operator confirms a guest-submitted pre-arrival reservation.
    Confirm,
    /// Operator records a guarantee (deposit, card on file) on a confirmed stay.
    Guarantee,
    CheckIn { override_capture: bool },
    CheckOut,
    Cancel,
    MarkNoShow,
}

impl ReservationAction {
    pub fn verb(self) -> &'static str {
        match self {
            ReservationAction::Confirm => "confirm",
            ReservationAction::Guarantee => "guarantee",
            ReservationAction::CheckIn { .. } => "check in",
            ReservationAction::CheckOut => "check out",
            ReservationAction::Cancel => "cancel",
            ReservationAction::MarkNoShow => "mark as no-show",
        }
    }
}

/// Whether staff may bypass an unsatisfied capture gate at check-in.
/// Configurable policy, not a hard rule; an exercised override is always
/// recorded as its own activity event.
#[derive(Debug, Clone, Copy)]
pub struct TransitionPolicy {
    pub allow_capture_override: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    None,
    CheckedIn,
    CheckedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub new_status: ReservationStatus,
    pub stamp: Stamp,
    pub event_code: &'static str,
    pub capture_overridden: bool,
}

pub fn apply(
    current: ReservationStatus,
    action: ReservationAction,
    gate: &GateStatus,
    policy: &TransitionPolicy,
) -> Result<TransitionOutcome, ReservationError> {
    use ReservationStatus::*;

    let invalid = || ReservationError::InvalidTransition {
        from: current,
        action: action.verb(),
    };

    // Cancelled and no-show are terminal: nothing may originate from them.
    if current.is_terminal() {
        return Err(invalid());
    }

    match action {
        ReservationAction::Confirm => match current {
            PendingConfirmation => Ok(TransitionOutcome {
                new_status: Confirmed,
                stamp: Stamp::None,
                event_code: "confirmed",
                capture_overridden: false,
            }),
            _ => Err(invalid()),
        },

        ReservationAction::Guarantee => match current {
            Confirmed => Ok(TransitionOutcome {
                new_status: Guaranteed,
                stamp: Stamp::None,
                event_code: "guaranteed",
                capture_overridden: false,
            }),
            _ => Err(invalid()),
        },

        ReservationAction::CheckIn { override_capture } => match current {
            Tentative | Confirmed | Guaranteed => {
                let overridden = if gate.satisfied {
                    false
                } else if override_capture && policy.allow_capture_override {
                    true
                } else {
                    return Err(ReservationError::CaptureIncomplete {
                        captured: gate.captured_count,
                        expected: gate.expected_guests,
                    });
                };
                Ok(TransitionOutcome {
                    new_status: InHouse,
                    stamp: Stamp::CheckedIn,
                    event_code: "checked_in",
                    capture_overridden: overridden,
                })
            }
            // Repeated check-in is rejected, never silently absorbed.
            _ => Err(invalid()),
        },

        // Check-out completes the stay with a timestamp and an event; the
        // status field keeps reading in_house.
        ReservationAction::CheckOut => match current {
            InHouse => Ok(TransitionOutcome {
                new_status: InHouse,
                stamp: Stamp::CheckedOut,
                event_code: "checked_out",
                capture_overridden: false,
            }),
            _ => Err(invalid()),
        },

        ReservationAction::Cancel => match current {
            PendingConfirmation | Tentative | Confirmed | Guaranteed => Ok(TransitionOutcome {
                new_status: Cancelled,
                stamp: Stamp::None,
                event_code: "cancelled",
                capture_overridden: false,
            }),
            _ => Err(invalid()),
        },

        ReservationAction::MarkNoShow => match current {
            Tentative | Confirmed | Guaranteed => Ok(TransitionOutcome {
                new_status: NoShow,
                stamp: Stamp::None,
                event_code: "no_show",
                capture_overridden: false,
            }),
            _ => Err(invalid()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationStatus::*;

    fn satisfied_gate() -> GateStatus {
        GateStatus {
            expected_guests: 1,
            captured_count: 1,
            satisfied: true,
        }
    }

    fn unsatisfied_gate(captured: i64, expected: i64) -> GateStatus {
        GateStatus {
            expected_guests: expected,
            captured_count: captured,
            satisfied: false,
        }
    }

    fn policy(allow: bool) -> TransitionPolicy {
        TransitionPolicy {
            allow_capture_override: allow,
        }
    }

    const ALL_ACTIONS: [ReservationAction; 6] = [
        ReservationAction::Confirm,
        ReservationAction::Guarantee,
        ReservationAction::CheckIn {
            override_capture: false,
        },
        ReservationAction::CheckOut,
        ReservationAction::Cancel,
        ReservationAction::MarkNoShow,
    ];

    #[test]
    fn terminal_states_admit_no_transitions() {
        for terminal in [Cancelled, NoShow] {
            for action in ALL_ACTIONS {
                let result = apply(terminal, action, &satisfied_gate(), &policy(true));
                assert!(
                    matches!(result, Err(ReservationError::InvalidTransition { .. })),
                    "{terminal:?} must reject {action:?}"
                );
            }
        }
    }

    #[test]
    fn confirm_only_from_pending_confirmation() {
        let outcome = apply(
            PendingConfirmation,
            ReservationAction::Confirm,
            &satisfied_gate(),
            &policy(false),
        )
        .unwrap();
        assert_eq!(outcome.new_status, Confirmed);
        assert_eq!(outcome.event_code, "confirmed");

        for from in [Tentative, Confirmed, Guaranteed, InHouse] {
            assert!(apply(from, ReservationAction::Confirm, &satisfied_gate(), &policy(false)).is_err());
        }
    }

    #[test]
    fn check_in_requires_satisfied_gate() {
        let gate = unsatisfied_gate(2, 3);
        let err = apply(
            Confirmed,
            ReservationAction::CheckIn {
                override_capture: false,
            },
            &gate,
            &policy(true),
        )
        .unwrap_err();
        match err {
            ReservationError::CaptureIncomplete { captured, expected } => {
                assert_eq!((captured, expected), (2, 3));
            }
            other => panic!("expected CaptureIncomplete, got {other:?}"),
        }
    }

    #[test]
    fn check_in_succeeds_from_each_pre_arrival_status() {
        for from in [Tentative, Confirmed, Guaranteed] {
            let outcome = apply(
                from,
                ReservationAction::CheckIn {
                    override_capture: false,
                },
                &satisfied_gate(),
                &policy(false),
            )
            .unwrap();
            assert_eq!(outcome.new_status, InHouse);
            assert_eq!(outcome.stamp, Stamp::CheckedIn);
            assert!(!outcome.capture_overridden);
        }
    }

    #[test]
    fn override_is_policy_gated_and_recorded() {
        let gate = unsatisfied_gate(0, 2);
        let action = ReservationAction::CheckIn {
            override_capture: true,
        };

        // Policy forbids the override: still a capture failure.
        assert!(matches!(
            apply(Confirmed, action, &gate, &policy(false)),
            Err(ReservationError::CaptureIncomplete { .. })
        ));

        // Policy permits it: check-in proceeds but the override is flagged.
        let outcome = apply(Confirmed, action, &gate, &policy(true)).unwrap();
        assert_eq!(outcome.new_status, InHouse);
        assert!(outcome.capture_overridden);
    }

    #[test]
    fn repeated_check_in_is_rejected_not_silent() {
        let result = apply(
            InHouse,
            ReservationAction::CheckIn {
                override_capture: false,
            },
            &satisfied_gate(),
            &policy(true),
        );
        assert!(matches!(
            result,
            Err(ReservationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn check_out_keeps_status_in_house() {
        let outcome = apply(
            InHouse,
            ReservationAction::CheckOut,
            &satisfied_gate(),
            &policy(false),
        )
        .unwrap();
        assert_eq!(outcome.new_status, InHouse);
        assert_eq!(outcome.stamp, Stamp::CheckedOut);
    }

    #[test]
    fn cancel_allowed_from_every_pre_arrival_status() {
        for from in [PendingConfirmation, Tentative, Confirmed, Guaranteed] {
            let outcome =
                apply(from, ReservationAction::Cancel, &satisfied_gate(), &policy(false)).unwrap();
            assert_eq!(outcome.new_status, Cancelled);
        }
        assert!(apply(InHouse, ReservationAction::Cancel, &satisfied_gate(), &policy(false)).is_err());
    }

    #[test]
    fn no_show_transition_is_idempotent_at_the_table_level() {
        let outcome = apply(
            Confirmed,
            ReservationAction::MarkNoShow,
            &satisfied_gate(),
            &policy(false),
        )
        .unwrap();
        assert_eq!(outcome.new_status, NoShow);

        // A second sweep finds the reservation already terminal and must not
        // double-transition it.
        assert!(apply(
            NoShow,
            ReservationAction::MarkNoShow,
            &satisfied_gate(),
            &policy(false)
        )
        .is_err());
    }
}
