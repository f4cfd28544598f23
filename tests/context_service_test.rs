//! Tests for ContextService: ordering and receiver selection

mod common;

use std::sync::Arc;

use formtree::application::services::ContextService;
use formtree::domain::order::orders;
use formtree::domain::{
    Context, ContextId, Direction, Document, MoveOutcome, Receiver, ReceiverId,
};

use common::{Call, RecordingStore};

fn receivers() -> Vec<Receiver> {
    ["r1", "r2", "r3"]
        .iter()
        .map(|r| Receiver {
            id: ReceiverId::new(*r),
            name: r.to_uppercase(),
        })
        .collect()
}

fn contexts(n: usize) -> Vec<Context> {
    (0..n)
        .map(|i| Context {
            id: ContextId::new(format!("c{}", i)),
            name: format!("Context {}", i),
            presentation_order: i as u32,
            questionnaire_id: "default".into(),
            ..Context::default()
        })
        .collect()
}

fn service(n: usize) -> (ContextService, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::new(Document::default()));
    let service = ContextService::new(store.clone(), "default", contexts(n), receivers());
    (service, store)
}

fn cid(s: &str) -> ContextId {
    ContextId::new(s)
}

fn rid(s: &str) -> ReceiverId {
    ReceiverId::new(s)
}

#[test]
fn given_three_contexts_when_moving_last_down_then_no_request_and_order_unchanged() {
    // Arrange
    let (mut service, store) = service(3);

    // Act
    let outcome = service.move_down(&cid("c2")).unwrap();

    // Assert
    assert_eq!(outcome, MoveOutcome::Unchanged);
    assert_eq!(orders(service.contexts()), vec![0, 1, 2]);
    assert!(store.calls().is_empty());
}

#[test]
fn given_three_contexts_when_moving_first_down_then_single_order_request() {
    let (mut service, store) = service(3);

    service.move_down(&cid("c0")).unwrap();

    let requests = store.order_calls();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].args.ids, vec!["c1", "c0", "c2"]);
}

#[test]
fn given_contexts_when_adding_then_appended_on_default_questionnaire() {
    // Arrange
    let (mut service, store) = service(2);

    // Act
    let id = service.add_context("Whistleblowing").unwrap();

    // Assert
    let context = service.context(&id).unwrap();
    assert_eq!(context.presentation_order, 2);
    assert_eq!(context.questionnaire_id, "default");
    assert!(matches!(&store.calls()[0], Call::CreateContext(_)));
}

#[test]
fn given_missing_additional_questionnaire_when_saving_then_sent_as_empty() {
    let (mut service, store) = service(1);

    service.save_context(&cid("c0")).unwrap();

    let Call::UpdateContext(saved) = &store.calls()[0] else {
        panic!("expected update");
    };
    assert_eq!(saved.additional_questionnaire_id, Some(String::new()));
}

#[test]
fn given_middle_context_when_deleting_then_rest_renumbered() {
    let (mut service, store) = service(3);

    service.delete_context(&cid("c1")).unwrap();

    assert_eq!(orders(service.contexts()), vec![0, 1]);
    assert_eq!(store.calls(), vec![Call::DeleteContext(cid("c1"))]);
    assert!(service.delete_context(&cid("c1")).is_err());
}

#[test]
fn given_receiver_when_toggling_twice_then_selected_then_removed() {
    let (mut service, _store) = service(1);

    assert!(service.toggle_receiver(&cid("c0"), &rid("r2")).unwrap());
    assert_eq!(service.context(&cid("c0")).unwrap().receivers, vec![rid("r2")]);

    assert!(!service.toggle_receiver(&cid("c0"), &rid("r2")).unwrap());
    assert!(service.context(&cid("c0")).unwrap().receivers.is_empty());
}

#[test]
fn given_unknown_receiver_when_toggling_then_error() {
    let (mut service, _store) = service(1);

    assert!(service.toggle_receiver(&cid("c0"), &rid("ghost")).is_err());
}

#[test]
fn given_selected_receivers_when_listing_unselected_then_rest_in_order() {
    // Arrange
    let (mut service, _store) = service(1);
    service.add_receiver(&cid("c0"), &rid("r3")).unwrap();
    service.add_receiver(&cid("c0"), &rid("r1")).unwrap();
    service.add_receiver(&cid("c0"), &rid("r1")).unwrap();

    // Act
    let unselected: Vec<&str> = service
        .unselected_receivers(&cid("c0"))
        .unwrap()
        .into_iter()
        .map(|r| r.id.as_str())
        .collect();

    // Assert
    assert_eq!(unselected, vec!["r2"]);
    assert_eq!(
        service.context(&cid("c0")).unwrap().receivers,
        vec![rid("r3"), rid("r1")]
    );
}

#[test]
fn given_selected_receivers_when_moving_then_swapped_without_request() {
    let (mut service, store) = service(1);
    service.add_receiver(&cid("c0"), &rid("r1")).unwrap();
    service.add_receiver(&cid("c0"), &rid("r2")).unwrap();

    let outcome = service.move_receiver(&cid("c0"), 1, Direction::Up).unwrap();

    assert_eq!(outcome, MoveOutcome::Moved);
    assert_eq!(
        service.context(&cid("c0")).unwrap().receivers,
        vec![rid("r2"), rid("r1")]
    );
    assert_eq!(
        service.move_receiver(&cid("c0"), 0, Direction::Up).unwrap(),
        MoveOutcome::Unchanged
    );
    assert!(store.calls().is_empty());
}
