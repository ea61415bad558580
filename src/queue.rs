//! Serialized action queue.
//!
//! Moves a [`GameState`] into its own tokio task. Any number of
//! [`GameHandle`]s can submit actions; the task applies them one at a time
//! in arrival order and answers each over a oneshot channel.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::GameError;
use crate::game::{Action, ActionOutcome, GameState};

const QUEUE_DEPTH: usize = 32;

struct Request {
    action: Action,
    reply: oneshot::Sender<Result<ActionOutcome, GameError>>,
}

/// Cloneable sender side of the game queue
#[derive(Debug, Clone)]
pub struct GameHandle {
    tx: mpsc::Sender<Request>,
}

impl GameHandle {
    /// Submit an action and wait for its outcome
    pub async fn send(&self, action: Action) -> Result<ActionOutcome, GameError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request { action, reply })
            .await
            .map_err(|_| GameError::Closed)?;
        rx.await.map_err(|_| GameError::Closed)?
    }
}

/// Start the game task. It runs until every handle is dropped, then
/// yields the final state.
pub fn spawn_game(state: GameState) -> (GameHandle, JoinHandle<GameState>) {
    let (tx, mut rx) = mpsc::channel::<Request>(QUEUE_DEPTH);

    let task = tokio::spawn(async move {
        let mut state = state;
        let mut processed = 0usize;

        while let Some(Request { action, reply }) = rx.recv().await {
            debug!("Applying {:?}", action);
            let result = state.apply(action);
            processed += 1;
            if reply.send(result).is_err() {
                debug!("Caller dropped before the reply was sent");
            }
        }

        info!("Game queue closed after {} actions", processed);
        state
    });

    (GameHandle { tx }, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::DialogueOutcome;
    use crate::player::Direction;
    use crate::testing;

    #[tokio::test]
    async fn test_actions_apply_in_order() {
        let (handle, task) = spawn_game(testing::game());

        handle
            .send(Action::Teleport {
                x: 9,
                y: 4,
                facing: Some(Direction::North),
            })
            .await
            .unwrap();
        let outcome = handle.send(Action::Talk).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Talk(DialogueOutcome::Advanced { stage: 1, .. })));

        drop(handle);
        let state = task.await.unwrap();
        assert_eq!(state.quest_stage("orb_quest"), 1);
    }

    #[tokio::test]
    async fn test_concurrent_talks_advance_once() {
        let (handle, task) = spawn_game(testing::game());
        handle
            .send(Action::Teleport {
                x: 9,
                y: 4,
                facing: Some(Direction::North),
            })
            .await
            .unwrap();

        let mut senders = Vec::new();
        for _ in 0..8 {
            let handle = handle.clone();
            senders.push(tokio::spawn(async move { handle.send(Action::Talk).await }));
        }

        let mut advanced = 0;
        for sender in senders {
            if let ActionOutcome::Talk(DialogueOutcome::Advanced { .. }) = sender.await.unwrap().unwrap() {
                advanced += 1;
            }
        }
        assert_eq!(advanced, 1);

        drop(handle);
        assert_eq!(task.await.unwrap().quest_stage("orb_quest"), 1);
    }

    #[tokio::test]
    async fn test_errors_come_back_to_caller() {
        let (handle, _task) = spawn_game(testing::game());
        let err = handle
            .send(Action::Teleport {
                x: -1,
                y: 0,
                facing: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::OutOfBounds { .. }));
    }
}
