//! conduit-core
//!
//! ワークフローの executor コア: 型キーによるメッセージ振り分け、
//! run 間で共有できる executor、run 境界での reset。
//!
//! # モジュール構成
//! - **domain**: ID、MessageType / Message、チャット境界型
//! - **typed**: `Handler<T>`、`DynHandler`、RouteBuilder / RouteTable
//! - **app**: Executor、DispatchContext、RunStateArena、Run
//! - **impls**: ChatForwarding
//! - **error**: エラー型
//! - **observability**: tracing の初期化

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod typed;

pub use app::{DispatchContext, Executor, ExecutorOptions, OutgoingMessage, Run};
pub use domain::{ChatMessage, ChatRole, ExecutorId, Message, MessageType, RunId, TurnToken};
pub use error::{BuildError, DispatchError, HandlerError, ResetError, SendError};
pub use impls::ChatForwarding;
pub use typed::{Handler, RouteBuilder, RouteTable};

pub use tokio_util::sync::CancellationToken;
