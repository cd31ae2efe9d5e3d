//! ChatForwarding - 受け取ったチャット系メッセージをそのまま下流へ流す executor
//!
//! 入力を並列の処理経路に分岐させたいときに使います。
//! run の状態を持たないので共有可能で、reset は何もしません。

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::app::context::DispatchContext;
use crate::app::executor::{Executor, ExecutorOptions, Resettable};
use crate::domain::{ChatMessage, Message, TurnToken};
use crate::error::{BuildError, HandlerError, ResetError};
use crate::typed::RouteBuilder;

pub struct ChatForwarding;

impl ChatForwarding {
    /// 共有可能・reset 可能な forwarding executor を作る
    ///
    /// | 入力               | 送信                          |
    /// |--------------------|-------------------------------|
    /// | `String`           | `ChatMessage { role: User }`  |
    /// | `ChatMessage`      | そのまま                      |
    /// | `Vec<ChatMessage>` | そのまま（リストのまま）      |
    /// | `TurnToken`        | そのまま                      |
    pub fn executor(id: impl Into<String>) -> Result<Executor, BuildError> {
        let routes = Self::configure_routes(RouteBuilder::new()).build()?;
        let executor = Executor::new(id, ExecutorOptions::shareable(), routes)?;
        Ok(executor.with_reset(Arc::new(ChatForwarding)))
    }

    fn configure_routes(builder: RouteBuilder) -> RouteBuilder {
        builder
            .add_handler::<String, _>(
                |text: String, ctx: DispatchContext, cancel: CancellationToken| async move {
                    forward(ChatMessage::user(text), ctx, cancel).await
                },
            )
            .add_handler::<ChatMessage, _>(forward::<ChatMessage>)
            .add_handler::<Vec<ChatMessage>, _>(forward::<Vec<ChatMessage>>)
            .add_handler::<TurnToken, _>(forward::<TurnToken>)
    }
}

async fn forward<T: std::any::Any + Send + Sync>(
    message: T,
    ctx: DispatchContext,
    cancel: CancellationToken,
) -> Result<(), HandlerError> {
    ctx.send_message(Message::new(message), &cancel).await?;
    Ok(())
}

#[async_trait]
impl Resettable for ChatForwarding {
    async fn reset(&self, _cancel: &CancellationToken) -> Result<(), ResetError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::context::testing::context_pair;
    use crate::app::executor::ResetOutcome;
    use crate::domain::{ChatRole, MessageType};
    use crate::error::DispatchError;
    use rstest::rstest;

    #[test]
    fn forwarding_executor_is_shareable_and_resettable() {
        let executor = ChatForwarding::executor("forward").unwrap();
        assert!(executor.is_shareable());
        assert!(executor.supports_reset());
        assert_eq!(
            executor.routes().message_types(),
            vec![
                MessageType::of::<String>(),
                MessageType::of::<ChatMessage>(),
                MessageType::of::<Vec<ChatMessage>>(),
                MessageType::of::<TurnToken>(),
            ]
        );
    }

    #[tokio::test]
    async fn string_becomes_user_message() {
        let executor = ChatForwarding::executor("forward").unwrap();
        let (ctx, mut rx) = context_pair("forward");

        executor
            .dispatch(Message::new("hello".to_string()), ctx, CancellationToken::new())
            .await
            .unwrap();

        let out = rx.try_recv().unwrap();
        let message = out.message.downcast::<ChatMessage>().unwrap();
        assert_eq!(message.role, ChatRole::User);
        assert_eq!(message.text, "hello");
        assert!(rx.try_recv().is_err());
    }

    #[rstest]
    #[case::chat_message(
        Message::new(ChatMessage::assistant("hi")),
        MessageType::of::<ChatMessage>()
    )]
    #[case::chat_list(
        Message::new(vec![ChatMessage::user("a"), ChatMessage::assistant("b")]),
        MessageType::of::<Vec<ChatMessage>>()
    )]
    #[case::turn_token(Message::new(TurnToken::new(Some(true))), MessageType::of::<TurnToken>())]
    #[tokio::test]
    async fn forwards_unchanged(#[case] input: Message, #[case] expected: MessageType) {
        let executor = ChatForwarding::executor("forward").unwrap();
        let (ctx, mut rx) = context_pair("forward");

        executor
            .dispatch(input, ctx, CancellationToken::new())
            .await
            .unwrap();

        let out = rx.try_recv().unwrap();
        assert_eq!(out.message.message_type(), expected);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregistered_type_sends_nothing() {
        let executor = ChatForwarding::executor("forward").unwrap();
        let (ctx, mut rx) = context_pair("forward");

        let err = executor
            .dispatch(Message::new(42_i32), ctx, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Unroutable { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let executor = ChatForwarding::executor("forward").unwrap();
        let cancel = CancellationToken::new();
        assert_eq!(executor.reset(&cancel).await.unwrap(), ResetOutcome::Reset);
        assert_eq!(executor.reset(&cancel).await.unwrap(), ResetOutcome::Reset);
    }

    #[tokio::test]
    async fn reset_succeeds_after_cancellation() {
        let executor = ChatForwarding::executor("forward").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(executor.reset(&cancel).await.unwrap(), ResetOutcome::Reset);
    }
}
