// Session play state shared by the input path and the periodic tasks.

use crate::domain::{GameOutcome, PlayState};
use tokio::sync::watch;

/// Paused/Playing toggle with a terminal Finished state.
///
/// Readers observe changes through [`PlayStateMachine::subscribe`]; every write goes
/// through this type so transitions stay legal.
#[derive(Debug, Clone)]
pub struct PlayStateMachine {
    tx: watch::Sender<PlayState>,
}

impl Default for PlayStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayStateMachine {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PlayState::Paused);
        Self { tx }
    }

    pub fn current(&self) -> PlayState {
        *self.tx.borrow()
    }

    pub fn is_playing(&self) -> bool {
        self.current().is_playing()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayState> {
        self.tx.subscribe()
    }

    /// Flips Paused and Playing. Returns the new state, or `None` once finished.
    pub fn toggle(&self) -> Option<PlayState> {
        self.transition(|state| match state {
            PlayState::Paused => Some(PlayState::Playing),
            PlayState::Playing => Some(PlayState::Paused),
            PlayState::Finished(_) => None,
        })
    }

    /// Pauses a running session. No-op unless currently playing.
    pub fn force_pause(&self) -> bool {
        self.transition(|state| state.is_playing().then_some(PlayState::Paused))
            .is_some()
    }

    /// Ends the session. Only the first outcome sticks.
    pub fn finish(&self, outcome: GameOutcome) -> bool {
        self.transition(|state| (!state.is_finished()).then_some(PlayState::Finished(outcome)))
            .is_some()
    }

    fn transition(&self, next: impl FnOnce(PlayState) -> Option<PlayState>) -> Option<PlayState> {
        let mut applied = None;
        // send_if_modified stores the value even with no live receivers.
        self.tx.send_if_modified(|state| match next(*state) {
            Some(updated) => {
                *state = updated;
                applied = Some(updated);
                true
            }
            None => false,
        });
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_created_then_state_is_paused() {
        let machine = PlayStateMachine::new();
        assert_eq!(machine.current(), PlayState::Paused);
        assert!(!machine.is_playing());
    }

    #[test]
    fn when_toggled_twice_then_state_returns_to_paused() {
        let machine = PlayStateMachine::new();

        assert_eq!(machine.toggle(), Some(PlayState::Playing));
        assert_eq!(machine.toggle(), Some(PlayState::Paused));
    }

    #[test]
    fn when_force_pausing_a_paused_session_then_nothing_changes() {
        let machine = PlayStateMachine::new();
        let rx = machine.subscribe();

        assert!(!machine.force_pause());
        assert!(!rx.has_changed().unwrap_or(true));
    }

    #[test]
    fn when_finished_then_toggle_is_refused_and_outcome_is_kept() {
        let machine = PlayStateMachine::new();
        machine.toggle();

        assert!(machine.finish(GameOutcome::Lost));
        assert!(!machine.finish(GameOutcome::Won));
        assert_eq!(machine.toggle(), None);
        assert!(!machine.force_pause());
        assert_eq!(machine.current(), PlayState::Finished(GameOutcome::Lost));
    }

    #[tokio::test]
    async fn when_state_changes_then_subscribers_are_notified() {
        let machine = PlayStateMachine::new();
        let mut rx = machine.subscribe();

        machine.toggle();

        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow_and_update(), PlayState::Playing);
    }
}
