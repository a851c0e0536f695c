//! Tests for running games on tasks, driven by tokio's paused clock.

use std::time::Duration;
use tictactoe_bot::{
    BotConfig, CancelReason, Command, Dispatch, FirstMover, GameId, GameRegistry, GameRunner,
    InputEvent, LifecycleController, LifecycleState, PresentationRequest, RegistryError, Timing,
};
use tictactoe_core::{Cell, Coord, Mark};
use tokio::sync::mpsc;

fn registry() -> (GameRegistry, mpsc::UnboundedReceiver<Dispatch>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (GameRegistry::new(BotConfig::default(), tx), rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Dispatch>) -> Dispatch {
    rx.recv().await.expect("dispatch channel open")
}

#[tokio::test(start_paused = true)]
async fn test_invitation_expires_after_window() {
    let (registry, mut rx) = registry();
    let game_id = registry.start_duel("ann".into(), "bob".into()).unwrap();

    let invitation = next(&mut rx).await;
    assert_eq!(invitation.game_id, game_id);
    assert!(matches!(invitation.request, PresentationRequest::Invitation { .. }));

    tokio::time::advance(Duration::from_secs(29)).await;
    assert!(rx.try_recv().is_err());

    tokio::time::advance(Duration::from_secs(2)).await;
    let cancelled = next(&mut rx).await;
    assert_eq!(
        cancelled.request,
        PresentationRequest::Cancelled {
            challenger: "ann".into(),
            challenged: "bob".into(),
            reason: CancelReason::TimedOut,
        }
    );

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(registry.reap(), 1);
    assert_eq!(
        registry.submit(game_id, InputEvent::accept("bob")),
        Err(RegistryError::UnknownGame(game_id))
    );
}

/// Submits an event that may race the game's own expiry.
fn submit_late(registry: &GameRegistry, game_id: GameId, event: InputEvent) {
    let result = registry.submit(game_id, event);
    assert!(
        matches!(result, Ok(()) | Err(RegistryError::GameEnded(_))),
        "unexpected submit result {result:?}"
    );
}

/// Asserts the game published nothing beyond what was already received.
async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<Dispatch>) {
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(rx.try_recv().is_err());
}

/// Starts a duel that bob has accepted, consuming the opening dispatches.
async fn accepted_duel(
    registry: &GameRegistry,
    rx: &mut mpsc::UnboundedReceiver<Dispatch>,
) -> GameId {
    let game_id = registry.start_duel("ann".into(), "bob".into()).unwrap();
    next(rx).await;
    registry.submit(game_id, InputEvent::accept("bob")).unwrap();
    assert!(matches!(next(rx).await.request, PresentationRequest::Render(_)));
    game_id
}

#[tokio::test(start_paused = true)]
async fn test_accept_after_window_is_discarded() {
    let (registry, mut rx) = registry();
    let game_id = registry.start_duel("ann".into(), "bob".into()).unwrap();
    next(&mut rx).await;

    tokio::time::advance(Duration::from_secs(31)).await;
    submit_late(&registry, game_id, InputEvent::accept("bob"));

    assert_eq!(
        next(&mut rx).await.request,
        PresentationRequest::Cancelled {
            challenger: "ann".into(),
            challenged: "bob".into(),
            reason: CancelReason::TimedOut,
        }
    );
    assert_quiet(&mut rx).await;
}

#[tokio::test(start_paused = true)]
async fn test_votes_after_rematch_window_lock_the_board() {
    let (registry, mut rx) = registry();
    let game_id = accepted_duel(&registry, &mut rx).await;
    for (actor, row, col) in [("bob", 0, 0), ("ann", 1, 1), ("bob", 0, 1), ("ann", 2, 2)] {
        registry
            .submit(game_id, InputEvent::move_attempt(actor, row, col))
            .unwrap();
        next(&mut rx).await;
    }
    registry
        .submit(game_id, InputEvent::move_attempt("bob", 0, 2))
        .unwrap();
    assert!(matches!(
        next(&mut rx).await.request,
        PresentationRequest::TerminalRender { .. }
    ));

    tokio::time::advance(Duration::from_secs(15)).await;
    submit_late(&registry, game_id, InputEvent::rematch_vote("bob"));
    submit_late(&registry, game_id, InputEvent::rematch_vote("ann"));

    assert!(matches!(next(&mut rx).await.request, PresentationRequest::Locked(_)));
    assert_quiet(&mut rx).await;
}

#[tokio::test(start_paused = true)]
async fn test_move_after_round_window_is_discarded() {
    let (registry, mut rx) = registry();
    let game_id = accepted_duel(&registry, &mut rx).await;
    registry
        .submit(game_id, InputEvent::move_attempt("bob", 0, 0))
        .unwrap();
    next(&mut rx).await;

    tokio::time::advance(Duration::from_secs(121)).await;
    submit_late(&registry, game_id, InputEvent::move_attempt("ann", 1, 1));

    match next(&mut rx).await.request {
        PresentationRequest::Locked(view) => {
            assert_eq!(view.board().count(Mark::Naught), 0);
            assert!(!*view.controls_enabled());
        }
        other => panic!("expected a locked render, got {other:?}"),
    }
    assert_quiet(&mut rx).await;
}

#[tokio::test(start_paused = true)]
async fn test_duel_plays_to_rematch_and_locks() {
    let (registry, mut rx) = registry();
    let game_id = registry.start_duel("ann".into(), "bob".into()).unwrap();
    next(&mut rx).await;

    registry.submit(game_id, InputEvent::accept("bob")).unwrap();
    assert!(matches!(next(&mut rx).await.request, PresentationRequest::Render(_)));

    for (actor, row, col) in [("bob", 0, 0), ("ann", 1, 1), ("bob", 0, 1), ("ann", 2, 2)] {
        registry
            .submit(game_id, InputEvent::move_attempt(actor, row, col))
            .unwrap();
        assert!(matches!(next(&mut rx).await.request, PresentationRequest::Render(_)));
    }
    registry
        .submit(game_id, InputEvent::move_attempt("bob", 0, 2))
        .unwrap();
    assert!(matches!(
        next(&mut rx).await.request,
        PresentationRequest::TerminalRender { .. }
    ));

    tokio::time::advance(Duration::from_secs(11)).await;
    match next(&mut rx).await.request {
        PresentationRequest::Locked(view) => {
            assert_eq!(view.outcome().winner(), Some(Mark::Cross));
        }
        other => panic!("expected a locked render, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_bot_game_replies_and_reports_rejections() {
    let (registry, mut rx) = registry();
    let game_id = registry.start_bot("ann".into(), None).unwrap();
    assert!(matches!(next(&mut rx).await.request, PresentationRequest::Render(_)));

    registry
        .submit(game_id, InputEvent::move_attempt("ann", 0, 0))
        .unwrap();
    next(&mut rx).await;
    match next(&mut rx).await.request {
        PresentationRequest::Render(view) => {
            let centre = Coord::new(1, 1).unwrap();
            assert_eq!(view.board().get(centre), Cell::Occupied(Mark::Naught));
        }
        other => panic!("expected the computer's reply, got {other:?}"),
    }

    registry
        .submit(game_id, InputEvent::move_attempt("ann", 1, 1))
        .unwrap();
    assert!(matches!(
        next(&mut rx).await.request,
        PresentationRequest::MoveRejected { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_computer_first_override() {
    let (registry, mut rx) = registry();
    registry
        .start_bot("ann".into(), Some(FirstMover::Computer))
        .unwrap();

    match next(&mut rx).await.request {
        PresentationRequest::Render(view) => assert_eq!(view.board().count(Mark::Cross), 1),
        other => panic!("expected an opening render, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_abort_and_shutdown_dispose_games() {
    let (registry, mut rx) = registry();
    let first = registry.start_bot("ann".into(), None).unwrap();
    let second = registry.start_duel("ann".into(), "bob".into()).unwrap();
    next(&mut rx).await;
    next(&mut rx).await;
    assert_eq!(registry.active_games(), vec![first, second]);

    registry.abort(first).unwrap();
    assert_eq!(registry.abort(first), Err(RegistryError::UnknownGame(first)));
    assert_eq!(registry.active_games(), vec![second]);

    registry.shutdown().await;
    assert!(registry.active_games().is_empty());

    // Disposed games never fire their timers.
    tokio::time::advance(Duration::from_secs(300)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_self_challenge_is_refused() {
    let (registry, _rx) = registry();
    assert!(matches!(
        registry.start_duel("ann".into(), "ann".into()),
        Err(RegistryError::Lifecycle(_))
    ));
    assert!(registry.active_games().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_runner_stops_on_shutdown_command() {
    let controller =
        LifecycleController::duel(GameId(7), "ann".into(), "bob".into(), Timing::default())
            .unwrap();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (dispatch_tx, mut dispatch_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(GameRunner::new(controller, command_rx, dispatch_tx).run());

    command_tx.send(Command::Shutdown).unwrap();
    let state = task.await.unwrap().unwrap();

    assert_eq!(state, LifecycleState::Ended);
    assert!(matches!(
        dispatch_rx.recv().await.unwrap().request,
        PresentationRequest::Invitation { .. }
    ));
    assert!(dispatch_rx.recv().await.is_none());
}
