use thiserror::Error;

use crate::domain::{ExecutorId, MessageType};

/// Boxed error returned by handler bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 構築時のエラー（executor を作れない）
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("executor id must not be empty")]
    EmptyExecutorId,

    #[error("duplicate route for message type {message_type}")]
    DuplicateRoute { message_type: MessageType },

    #[error("route table is empty; an executor needs at least one handler")]
    EmptyRouteTable,
}

/// DispatchContext::send_message のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("send cancelled")]
    Cancelled,

    #[error("run outbox is closed")]
    Closed,
}

/// Handler が返すエラー
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler observed cancellation")]
    Cancelled,

    #[error(transparent)]
    Send(#[from] SendError),

    #[error("handler failed: {0}")]
    Failed(#[source] BoxError),
}

impl HandlerError {
    pub fn failed(err: impl Into<BoxError>) -> Self {
        Self::Failed(err.into())
    }

    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Failed(message.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Send(SendError::Cancelled))
    }
}

/// Executor::dispatch のエラー
///
/// どのエラーも scheduler に返すだけで、executor 側ではリトライしない。
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("executor {executor_id} has no route for message type {actual_type}")]
    Unroutable {
        executor_id: ExecutorId,
        actual_type: MessageType,
    },

    #[error("handler on executor {executor_id} failed")]
    Handler {
        executor_id: ExecutorId,
        #[source]
        cause: HandlerError,
    },

    #[error("dispatch on executor {executor_id} was cancelled")]
    Cancelled { executor_id: ExecutorId },
}

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("reset cancelled")]
    Cancelled,

    #[error("reset failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("executor {executor_id} is not shareable and is already bound to another run")]
    AlreadyBound { executor_id: ExecutorId },
}

/// Run ホストのエラー
#[derive(Debug, Error)]
pub enum RunError {
    #[error("no executor bound with id {0}")]
    UnknownExecutor(String),

    #[error("executor {0} is already bound to this run")]
    DuplicateBinding(ExecutorId),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("reset of executor {executor_id} failed")]
    Reset {
        executor_id: ExecutorId,
        #[source]
        cause: ResetError,
    },
}
