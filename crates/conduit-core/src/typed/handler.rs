//! Handler trait - メッセージ型ごとの Handler 定義
//!
//! # 学習ポイント
//! - ジェネリック trait (Handler<T>)
//! - Object-safe trait (DynHandler)
//! - Type erasure パターン (TypedHandler<T, H> → DynHandler)
//! - クロージャへの blanket impl

use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::app::context::DispatchContext;
use crate::domain::{Message, MessageType};
use crate::error::HandlerError;

/// Handler は型 `T` のメッセージを処理する
///
/// # 使用例
/// ```ignore
/// struct Echo;
///
/// #[async_trait]
/// impl Handler<String> for Echo {
///     async fn handle(
///         &self,
///         message: String,
///         ctx: DispatchContext,
///         cancel: CancellationToken,
///     ) -> Result<(), HandlerError> {
///         ctx.send_message(Message::new(message), &cancel).await?;
///         Ok(())
///     }
/// }
/// ```
///
/// `Fn(T, DispatchContext, CancellationToken) -> impl Future` なクロージャも
/// そのまま Handler として使えます。
#[async_trait]
pub trait Handler<T: Any + Send + Sync>: Send + Sync {
    async fn handle(
        &self,
        message: T,
        ctx: DispatchContext,
        cancel: CancellationToken,
    ) -> Result<(), HandlerError>;
}

#[async_trait]
impl<T, F, Fut> Handler<T> for F
where
    T: Any + Send + Sync,
    F: Fn(T, DispatchContext, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(
        &self,
        message: T,
        ctx: DispatchContext,
        cancel: CancellationToken,
    ) -> Result<(), HandlerError> {
        (self)(message, ctx, cancel).await
    }
}

/// DynHandler は object-safe な Handler の抽象化
///
/// RouteTable に `Arc<dyn DynHandler>` として格納されます。
#[async_trait]
pub trait DynHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        message: Message,
        ctx: DispatchContext,
        cancel: CancellationToken,
    ) -> Result<(), HandlerError>;

    fn message_type(&self) -> MessageType;
}

pub struct TypedHandler<T, H> {
    handler: H,
    _marker: PhantomData<fn(T)>,
}

impl<T, H> TypedHandler<T, H>
where
    T: Any + Send + Sync,
    H: Handler<T>,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, H> DynHandler for TypedHandler<T, H>
where
    T: Any + Send + Sync,
    H: Handler<T>,
{
    async fn handle_dyn(
        &self,
        message: Message,
        ctx: DispatchContext,
        cancel: CancellationToken,
    ) -> Result<(), HandlerError> {
        // Executor は完全一致でルーティングするので、ここでの不一致はルート表の破損
        let message = message.downcast::<T>().map_err(|m| {
            HandlerError::msg(format!(
                "route for {} received {}",
                MessageType::of::<T>(),
                m.message_type()
            ))
        })?;
        self.handler.handle(message, ctx, cancel).await
    }

    fn message_type(&self) -> MessageType {
        MessageType::of::<T>()
    }
}
