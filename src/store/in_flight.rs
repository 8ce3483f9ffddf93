//! Per-action in-flight tracking.
//!
//! A second call of an action that is still running is refused instead of
//! reaching the backend twice.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::derivation::AttendanceAction;
use crate::error::AttendanceError;

/// The set of actions currently running.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    actions: Mutex<HashSet<AttendanceAction>>,
}

impl InFlight {
    /// Marks `action` as running, or fails when it already is.
    ///
    /// The mark is cleared when the returned guard drops, including when the
    /// caller's future is dropped mid-request.
    pub(crate) fn begin(&self, action: AttendanceAction) -> Result<InFlightGuard<'_>, AttendanceError> {
        let mut actions = self
            .actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !actions.insert(action) {
            return Err(AttendanceError::ActionInProgress {
                action: action.to_string(),
            });
        }

        Ok(InFlightGuard {
            owner: self,
            action,
        })
    }

    pub(crate) fn contains(&self, action: AttendanceAction) -> bool {
        self.actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&action)
    }

    pub(crate) fn snapshot(&self) -> Vec<AttendanceAction> {
        self.actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .copied()
            .collect()
    }
}

/// Clears its action from the in-flight set on drop.
#[derive(Debug)]
pub(crate) struct InFlightGuard<'a> {
    owner: &'a InFlight,
    action: AttendanceAction,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_refused_while_guard_lives() {
        let in_flight = InFlight::default();

        let guard = in_flight.begin(AttendanceAction::StartBreak).unwrap();
        assert!(in_flight.contains(AttendanceAction::StartBreak));

        match in_flight.begin(AttendanceAction::StartBreak) {
            Err(AttendanceError::ActionInProgress { action }) => assert_eq!(action, "break-in"),
            other => panic!("Expected ActionInProgress, got {:?}", other),
        }

        drop(guard);
        assert!(!in_flight.contains(AttendanceAction::StartBreak));
        assert!(in_flight.begin(AttendanceAction::StartBreak).is_ok());
    }

    #[test]
    fn test_different_actions_do_not_block_each_other() {
        let in_flight = InFlight::default();
        let _clock_in = in_flight.begin(AttendanceAction::ClockIn).unwrap();
        let _break_in = in_flight.begin(AttendanceAction::StartBreak).unwrap();

        let mut running = in_flight.snapshot();
        running.sort_by_key(|a| a.to_string());
        assert_eq!(
            running,
            vec![AttendanceAction::StartBreak, AttendanceAction::ClockIn]
        );
    }
}
