mod common;

use common::{lead, Call, ScriptedGateway};
use leadboard_core::{
    BoardController, LeadBoard, LeadStatus, Notice, TransitionOrigin, TransitionOutcome,
};

fn controller_with(leads: Vec<leadboard_core::Lead>) -> BoardController<ScriptedGateway> {
    BoardController::with_board(ScriptedGateway::new(), LeadBoard::from_leads(leads))
}

#[tokio::test]
async fn failed_persist_rolls_back_to_original_board() {
    let r1 = lead("R1", LeadStatus::New);
    let mut controller = controller_with(vec![r1.clone()]);
    let before = controller.board().clone();

    let pending = controller
        .begin_transition(r1.id, LeadStatus::Contacted)
        .unwrap();
    assert!(controller.board().column(LeadStatus::New).is_empty());
    assert_eq!(controller.board().column(LeadStatus::Contacted)[0].id, r1.id);
    assert!(controller.board().column(LeadStatus::Won).is_empty());

    let outcome = controller.settle_transition(
        pending,
        Err(leadboard_core::GatewayError::new("server said no")),
    );

    assert!(matches!(outcome, TransitionOutcome::RolledBack { .. }));
    assert_eq!(controller.board(), &before);
    assert!(controller.undo_entry().is_none());
    assert_eq!(
        controller.drain_notices(),
        vec![Notice::MoveFailed {
            lead_id: r1.id,
            message: "server said no".to_string(),
        }]
    );
}

#[tokio::test]
async fn rollback_restores_position_inside_column() {
    let a = lead("A", LeadStatus::New);
    let b = lead("B", LeadStatus::New);
    let c = lead("C", LeadStatus::New);
    let mut controller = controller_with(vec![a, b.clone(), c]);
    let before = controller.board().clone();
    controller.gateway().fail_next_status("timeout");

    controller.request_transition(b.id, LeadStatus::Won).await;

    assert_eq!(controller.board(), &before);
}

#[tokio::test]
async fn same_bucket_drop_is_silent_noop() {
    let r1 = lead("R1", LeadStatus::Contacted);
    let mut controller = controller_with(vec![r1.clone()]);
    let before = controller.board().clone();

    let outcome = controller
        .request_transition(r1.id, LeadStatus::Contacted)
        .await;

    assert_eq!(outcome, TransitionOutcome::Skipped);
    assert_eq!(controller.board(), &before);
    assert!(controller.gateway().calls().is_empty());
    assert!(controller.drain_notices().is_empty());
}

#[tokio::test]
async fn unknown_lead_is_silent_noop() {
    let mut controller = controller_with(vec![lead("R1", LeadStatus::New)]);

    let outcome = controller
        .request_transition(uuid::Uuid::new_v4(), LeadStatus::Won)
        .await;

    assert_eq!(outcome, TransitionOutcome::Skipped);
    assert!(controller.gateway().calls().is_empty());
}

#[tokio::test]
async fn confirmed_move_persists_and_offers_undo() {
    let r1 = lead("R1", LeadStatus::New);
    let mut controller = controller_with(vec![r1.clone()]);

    let outcome = controller
        .request_transition(r1.id, LeadStatus::OfferSent)
        .await;

    assert_eq!(
        outcome,
        TransitionOutcome::Confirmed {
            lead_id: r1.id,
            from: LeadStatus::New,
            to: LeadStatus::OfferSent,
            origin: TransitionOrigin::User,
        }
    );
    assert_eq!(
        controller.gateway().calls(),
        vec![Call::UpdateStatus(r1.id, LeadStatus::OfferSent)]
    );
    let entry = controller.undo_entry().unwrap();
    assert_eq!(entry.lead_id, r1.id);
    assert_eq!(entry.previous_status, LeadStatus::New);
    assert_eq!(
        controller.drain_notices(),
        vec![Notice::Moved {
            lead_id: r1.id,
            from: LeadStatus::New,
            to: LeadStatus::OfferSent,
        }]
    );
}

#[tokio::test]
async fn undo_restores_board_and_second_undo_is_noop() {
    let a = lead("A", LeadStatus::New);
    let b = lead("B", LeadStatus::New);
    let c = lead("C", LeadStatus::Contacted);
    let mut controller = controller_with(vec![a.clone(), b, c]);
    let before = controller.board().clone();

    controller.request_transition(a.id, LeadStatus::Contacted).await;
    let undo = controller.undo_last().await;

    assert!(matches!(
        undo,
        TransitionOutcome::Confirmed {
            origin: TransitionOrigin::Undo,
            to: LeadStatus::New,
            ..
        }
    ));
    assert_eq!(controller.board(), &before);
    assert!(controller.undo_entry().is_none());

    let calls_before = controller.gateway().status_calls();
    assert_eq!(controller.undo_last().await, TransitionOutcome::Skipped);
    assert_eq!(controller.board(), &before);
    assert_eq!(controller.gateway().status_calls(), calls_before);
}

#[tokio::test]
async fn only_latest_move_is_undoable() {
    let r1 = lead("R1", LeadStatus::New);
    let mut controller = controller_with(vec![r1.clone()]);

    controller.request_transition(r1.id, LeadStatus::Contacted).await;
    controller.request_transition(r1.id, LeadStatus::OfferSent).await;
    controller.undo_last().await;

    assert_eq!(
        controller.board().locate(r1.id),
        Some((LeadStatus::Contacted, 0))
    );
    assert_eq!(controller.undo_last().await, TransitionOutcome::Skipped);
    assert_eq!(
        controller.board().locate(r1.id),
        Some((LeadStatus::Contacted, 0))
    );
}

#[tokio::test]
async fn failed_undo_rolls_back_and_consumes_entry() {
    let r1 = lead("R1", LeadStatus::New);
    let mut controller = controller_with(vec![r1.clone()]);

    controller.request_transition(r1.id, LeadStatus::Won).await;
    controller.drain_notices();
    controller.gateway().fail_next_status("offline");

    let outcome = controller.undo_last().await;

    assert!(matches!(
        outcome,
        TransitionOutcome::RolledBack {
            origin: TransitionOrigin::Undo,
            ..
        }
    ));
    assert_eq!(controller.board().locate(r1.id), Some((LeadStatus::Won, 0)));
    assert!(controller.undo_entry().is_none());
    assert!(matches!(
        controller.drain_notices().as_slice(),
        [Notice::UndoFailed { .. }]
    ));
}

#[tokio::test]
async fn lead_count_is_conserved_across_transitions() {
    let leads = (0..6)
        .map(|i| lead(&format!("L{i}"), LeadStatus::ALL[i % 3]))
        .collect::<Vec<_>>();
    let mut controller = controller_with(leads.clone());
    controller.gateway().fail_next_status("flaky");

    let targets = [
        LeadStatus::Won,
        LeadStatus::Lost,
        LeadStatus::New,
        LeadStatus::OfferSent,
        LeadStatus::Won,
        LeadStatus::Contacted,
    ];
    for (lead, target) in leads.iter().zip(targets) {
        controller.request_transition(lead.id, target).await;
        assert_eq!(controller.board().len(), leads.len());
    }
    controller.undo_last().await;
    assert_eq!(controller.board().len(), leads.len());

    for lead in &leads {
        let (status, _) = controller.board().locate(lead.id).unwrap();
        assert_eq!(controller.board().get(lead.id).unwrap().status, status);
    }
}

#[tokio::test]
async fn interleaved_moves_of_one_lead_follow_last_response() {
    let r1 = lead("R1", LeadStatus::New);
    let mut controller = controller_with(vec![r1.clone()]);

    let first = controller
        .begin_transition(r1.id, LeadStatus::Contacted)
        .unwrap();
    let second = controller.begin_transition(r1.id, LeadStatus::Won).unwrap();
    assert_eq!(second.from(), LeadStatus::Contacted);

    controller.settle_transition(second, Ok(()));
    let outcome =
        controller.settle_transition(first, Err(leadboard_core::GatewayError::new("late")));

    // The stale rollback finds the lead outside its target column and leaves it.
    assert!(matches!(outcome, TransitionOutcome::RolledBack { .. }));
    assert_eq!(controller.board().locate(r1.id), Some((LeadStatus::Won, 0)));
    assert_eq!(controller.board().len(), 1);
}

#[tokio::test]
async fn moves_of_different_leads_settle_independently() {
    let a = lead("A", LeadStatus::New);
    let b = lead("B", LeadStatus::New);
    let mut controller = controller_with(vec![a.clone(), b.clone()]);

    let move_a = controller.begin_transition(a.id, LeadStatus::Won).unwrap();
    let move_b = controller.begin_transition(b.id, LeadStatus::Lost).unwrap();

    controller.settle_transition(move_a, Err(leadboard_core::GatewayError::new("nope")));
    controller.settle_transition(move_b, Ok(()));

    assert_eq!(controller.board().locate(a.id), Some((LeadStatus::New, 0)));
    assert_eq!(controller.board().locate(b.id), Some((LeadStatus::Lost, 0)));
    assert_eq!(controller.undo_entry().map(|entry| entry.lead_id), Some(b.id));
}

#[tokio::test]
async fn unsettled_transition_keeps_optimistic_state() {
    let r1 = lead("R1", LeadStatus::New);
    let mut controller = controller_with(vec![r1.clone()]);

    let pending = controller.begin_transition(r1.id, LeadStatus::Lost).unwrap();
    drop(pending);

    assert_eq!(controller.board().locate(r1.id), Some((LeadStatus::Lost, 0)));
    assert!(controller.undo_entry().is_none());
    assert!(controller.drain_notices().is_empty());
}

#[tokio::test]
async fn open_detail_follows_optimistic_move_and_rollback() {
    let r1 = lead("R1", LeadStatus::New);
    let mut controller = controller_with(vec![r1.clone()]);
    assert!(controller.open_detail(r1.id).is_open());

    let pending = controller.begin_transition(r1.id, LeadStatus::Won).unwrap();
    assert_eq!(controller.detail().unwrap().status, LeadStatus::Won);

    controller.settle_transition(pending, Err(leadboard_core::GatewayError::new("down")));
    assert_eq!(controller.detail().unwrap().status, LeadStatus::New);
}
