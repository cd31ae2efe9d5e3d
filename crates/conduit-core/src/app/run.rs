//! Run - プロセス内の最小 run ホスト
//!
//! グラフを歩く scheduler ではありません。1 つの run が所有するものをまとめるだけです:
//! - RunId
//! - outbox（送信順を保つ mpsc）
//! - RunStateArena（run スコープの状態）
//! - キャンセルトークン
//! - executor のバインド
//!
//! dispatch ごとに新しい DispatchContext を作って executor に渡します。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::context::{DispatchContext, OutgoingMessage};
use super::executor::{Executor, ExecutorBinding, ResetOutcome};
use super::state::RunStateArena;
use crate::domain::{ExecutorId, Message, RunId};
use crate::error::RunError;

pub struct Run {
    id: RunId,
    cancel: CancellationToken,
    state: RunStateArena,
    outbox_tx: mpsc::UnboundedSender<OutgoingMessage>,
    outbox_rx: mpsc::UnboundedReceiver<OutgoingMessage>,
    bindings: HashMap<ExecutorId, ExecutorBinding>,
}

impl Run {
    pub fn new() -> Self {
        Self::with_id(RunId::generate())
    }

    pub fn with_id(id: RunId) -> Self {
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        Self {
            id,
            cancel: CancellationToken::new(),
            state: RunStateArena::new(),
            outbox_tx,
            outbox_rx,
            bindings: HashMap::new(),
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn state(&self) -> &RunStateArena {
        &self.state
    }

    /// executor をこの run にバインドする
    ///
    /// 非共有 executor が別の run で使用中なら `RunError::Bind`。
    pub fn bind(&mut self, executor: Arc<Executor>) -> Result<(), RunError> {
        let id = executor.id().clone();
        if self.bindings.contains_key(&id) {
            return Err(RunError::DuplicateBinding(id));
        }
        let binding = executor.bind()?;
        tracing::debug!(run_id = %self.id, executor_id = %id, "executor bound");
        self.bindings.insert(id, binding);
        Ok(())
    }

    pub fn executor(&self, executor_id: &str) -> Option<&Arc<Executor>> {
        self.bindings.get(executor_id).map(ExecutorBinding::executor)
    }

    /// メッセージを executor に届ける
    pub async fn dispatch(&self, executor_id: &str, message: Message) -> Result<(), RunError> {
        let executor = self
            .executor(executor_id)
            .ok_or_else(|| RunError::UnknownExecutor(executor_id.to_string()))?;

        let ctx = DispatchContext::new(
            self.id,
            executor.id().clone(),
            self.outbox_tx.clone(),
            self.cancel.clone(),
            self.state.scope(executor.id().clone()),
        );
        executor
            .dispatch(message, ctx, self.cancel.child_token())
            .await?;
        Ok(())
    }

    /// outbox に溜まった送信を送信順に取り出す
    pub fn take_outgoing(&mut self) -> Vec<OutgoingMessage> {
        let mut out = Vec::new();
        while let Ok(message) = self.outbox_rx.try_recv() {
            out.push(message);
        }
        out
    }

    /// run 境界での reset
    ///
    /// executor の reset 能力を呼び、この run が持つその executor の状態を消します。
    /// 状態は reset が失敗しても消え、失敗は `RunError::Reset` で返ります。
    pub async fn reset_executor(&self, executor_id: &str) -> Result<ResetOutcome, RunError> {
        let executor = self
            .executor(executor_id)
            .ok_or_else(|| RunError::UnknownExecutor(executor_id.to_string()))?;

        let result = executor.reset(&self.cancel).await;
        // run が持つ状態は reset 能力の成否に関係なく捨てる
        self.state.clear_executor(executor.id()).await;
        result.map_err(|cause| RunError::Reset {
            executor_id: executor.id().clone(),
            cause,
        })
    }

    pub fn cancel(&self) {
        tracing::info!(run_id = %self.id, "run cancelled");
        self.cancel.cancel();
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl Default for Run {
    fn default() -> Self {
        Self::new()
    }
}
