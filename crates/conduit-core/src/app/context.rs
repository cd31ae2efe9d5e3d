//! DispatchContext - 1 回の dispatch に渡されるハンドル
//!
//! scheduler（ここでは `Run`）が dispatch ごとに新しく作り、executor は保持しません。
//! Handler はこれを通して下流へ送信し、キャンセルを観測し、run の状態に触れます。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::state::StateScope;
use crate::domain::{ExecutorId, Message, RunId};
use crate::error::SendError;

/// run の outbox に積まれる送信済みメッセージ
#[derive(Debug)]
pub struct OutgoingMessage {
    pub source: ExecutorId,
    pub message: Message,
}

#[derive(Clone)]
pub struct DispatchContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    run_id: RunId,
    executor_id: ExecutorId,
    outbox: mpsc::UnboundedSender<OutgoingMessage>,
    run_cancel: CancellationToken,
    state: StateScope,
}

impl DispatchContext {
    pub fn new(
        run_id: RunId,
        executor_id: ExecutorId,
        outbox: mpsc::UnboundedSender<OutgoingMessage>,
        run_cancel: CancellationToken,
        state: StateScope,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                run_id,
                executor_id,
                outbox,
                run_cancel,
                state,
            }),
        }
    }

    /// 下流への送信をキューに積む
    ///
    /// 1 回の dispatch 内では呼び出し順がそのまま outbox の順序になります。
    pub async fn send_message(
        &self,
        message: Message,
        cancel: &CancellationToken,
    ) -> Result<(), SendError> {
        if cancel.is_cancelled() || self.is_cancelled() {
            return Err(SendError::Cancelled);
        }
        let message_type = message.message_type();
        self.inner
            .outbox
            .send(OutgoingMessage {
                source: self.inner.executor_id.clone(),
                message,
            })
            .map_err(|_| SendError::Closed)?;
        tracing::debug!(
            run_id = %self.inner.run_id,
            executor_id = %self.inner.executor_id,
            %message_type,
            "message queued"
        );
        Ok(())
    }

    pub fn run_id(&self) -> RunId {
        self.inner.run_id
    }

    pub fn executor_id(&self) -> &ExecutorId {
        &self.inner.executor_id
    }

    /// run 全体のキャンセルトークン
    pub fn cancellation(&self) -> &CancellationToken {
        &self.inner.run_cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.run_cancel.is_cancelled()
    }

    /// この run・この executor に閉じた状態
    pub fn state(&self) -> &StateScope {
        &self.inner.state
    }
}

impl std::fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("run_id", &self.inner.run_id)
            .field("executor_id", &self.inner.executor_id)
            .finish_non_exhaustive()
    }
}
