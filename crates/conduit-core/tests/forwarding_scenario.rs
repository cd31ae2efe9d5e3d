use std::sync::Arc;

use conduit_core::app::ResetOutcome;
use conduit_core::error::RunError;
use conduit_core::{ChatForwarding, ChatMessage, ChatRole, DispatchError, Message, Run, TurnToken};

fn forwarding_run() -> Run {
    let mut run = Run::new();
    run.bind(Arc::new(ChatForwarding::executor("forward").unwrap()))
        .unwrap();
    run
}

#[tokio::test]
async fn forwards_each_registered_shape_once() {
    let mut run = forwarding_run();

    run.dispatch("forward", Message::new("hello".to_string()))
        .await
        .unwrap();
    let out = run.take_outgoing();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].source.as_str(), "forward");
    assert_eq!(
        out[0].message.downcast_ref::<ChatMessage>(),
        Some(&ChatMessage::new(ChatRole::User, "hello"))
    );

    let original = ChatMessage::assistant("already built");
    run.dispatch("forward", Message::new(original.clone()))
        .await
        .unwrap();
    let out = run.take_outgoing();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].message.downcast_ref::<ChatMessage>(), Some(&original));

    let token = TurnToken::new(Some(false));
    run.dispatch("forward", Message::new(token.clone()))
        .await
        .unwrap();
    let out = run.take_outgoing();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].message.downcast_ref::<TurnToken>(), Some(&token));
}

#[tokio::test]
async fn integer_is_unroutable_and_sends_nothing() {
    let mut run = forwarding_run();

    let err = run.dispatch("forward", Message::new(7_i64)).await.unwrap_err();
    assert!(matches!(
        err,
        RunError::Dispatch(DispatchError::Unroutable { .. })
    ));
    assert!(run.take_outgoing().is_empty());
}

#[tokio::test]
async fn list_is_forwarded_as_one_message() {
    let mut run = forwarding_run();
    let batch = vec![ChatMessage::user("a"), ChatMessage::user("b")];

    run.dispatch("forward", Message::new(batch.clone()))
        .await
        .unwrap();
    let out = run.take_outgoing();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].message.downcast_ref::<Vec<ChatMessage>>(), Some(&batch));
}

#[tokio::test]
async fn one_instance_serves_two_runs_and_resets() {
    let executor = Arc::new(ChatForwarding::executor("forward").unwrap());
    let mut run_a = Run::new();
    let mut run_b = Run::new();
    run_a.bind(Arc::clone(&executor)).unwrap();
    run_b.bind(Arc::clone(&executor)).unwrap();

    let (a, b) = tokio::join!(
        run_a.dispatch("forward", Message::new("from a".to_string())),
        run_b.dispatch("forward", Message::new("from b".to_string())),
    );
    a.unwrap();
    b.unwrap();

    let a_out = run_a.take_outgoing();
    let b_out = run_b.take_outgoing();
    assert_eq!(a_out.len(), 1);
    assert_eq!(b_out.len(), 1);
    assert_eq!(a_out[0].message.downcast_ref::<ChatMessage>().unwrap().text, "from a");
    assert_eq!(b_out[0].message.downcast_ref::<ChatMessage>().unwrap().text, "from b");

    assert_eq!(run_a.reset_executor("forward").await.unwrap(), ResetOutcome::Reset);
    assert_eq!(run_a.reset_executor("forward").await.unwrap(), ResetOutcome::Reset);
}
