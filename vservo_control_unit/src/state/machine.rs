//! Session phase transitions.
//!
//! AwaitingLaunch → Stabilizing → Tracking → Terminated, with Terminate
//! accepted from every live phase. Terminated is absorbing and keeps the
//! first termination reason.

use vservo_common::tracker::state::{Phase, TerminationReason};

/// Result of a phase transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new phase.
    Ok(Phase),
    /// Transition rejected, reason.
    Rejected(&'static str),
}

/// Supervisor event that can trigger a phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// Launch key seen and takeoff succeeded.
    Launch,
    /// Stabilize time elapsed.
    Stabilized,
    /// Session must end.
    Terminate(TerminationReason),
}

/// Current phase plus, once terminated, why.
#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    phase: Phase,
    reason: Option<TerminationReason>,
}

impl PhaseMachine {
    pub const fn new() -> Self {
        Self {
            phase: Phase::AwaitingLaunch,
            reason: None,
        }
    }

    #[inline]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub const fn reason(&self) -> Option<TerminationReason> {
        self.reason
    }

    #[inline]
    pub const fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated)
    }

    pub fn handle_event(&mut self, event: PhaseEvent) -> TransitionResult {
        use Phase::*;
        use PhaseEvent::*;

        let next = match (self.phase, event) {
            (AwaitingLaunch, Launch) => Stabilizing,
            (Stabilizing, Stabilized) => Tracking,
            (AwaitingLaunch | Stabilizing | Tracking, Terminate(reason)) => {
                self.reason = Some(reason);
                Terminated
            }
            _ => {
                return TransitionResult::Rejected(invalid_transition_reason(self.phase, event));
            }
        };

        self.phase = next;
        TransitionResult::Ok(next)
    }
}

fn invalid_transition_reason(phase: Phase, event: PhaseEvent) -> &'static str {
    use Phase::*;
    use PhaseEvent::*;
    match (phase, event) {
        (Terminated, _) => "Terminated: session already ended",
        (AwaitingLaunch, _) => "AwaitingLaunch: only Launch or Terminate allowed",
        (Stabilizing, _) => "Stabilizing: only Stabilized or Terminate allowed",
        (Tracking, Launch) => "Tracking: already airborne",
        (Tracking, _) => "Tracking: only Terminate allowed",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
