//! Executor - ルート表を持ち、メッセージを Handler に振り分ける
//!
//! # 学習ポイント
//! - 不変な設定（id, RouteTable, options）だけを持つ → `Arc<Executor>` で run 間共有
//! - reset 能力は構築時に `Option<Arc<dyn Resettable>>` として決まる（都度の型判定なし）
//! - 非共有 executor の排他は `AtomicBool` + RAII ガード
//!
//! # dispatch の流れ
//! 1. `Message` の `MessageType` で RouteTable を完全一致検索
//! 2. 見つからなければ `DispatchError::Unroutable`（握りつぶさない）
//! 3. 見つかれば Handler を実行し、エラーはそのまま `DispatchError::Handler` で返す

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::context::DispatchContext;
use crate::domain::{ExecutorId, Message, MessageType};
use crate::error::{BindError, BuildError, DispatchError, ResetError};
use crate::typed::RouteTable;

/// ExecutorOptions は executor の構築時設定
///
/// JSON などから読み込めるよう serde で定義しています。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorOptions {
    /// true なら同じインスタンスを複数の run に同時にバインドできる
    pub shareable: bool,
}

impl ExecutorOptions {
    pub fn shareable() -> Self {
        Self { shareable: true }
    }
}

/// Resettable は run 境界で状態を消す能力
///
/// 冪等であること: 状態がなくても常に成功する。
/// キャンセルを見るかどうかは実装が決める（Executor 側では見ない）。
#[async_trait]
pub trait Resettable: Send + Sync {
    async fn reset(&self, cancel: &CancellationToken) -> Result<(), ResetError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset,
    NotSupported,
}

/// executor が受け付けるメッセージ型の記述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDescriptor {
    pub executor_id: ExecutorId,
    pub accepts: Vec<String>,
    pub shareable: bool,
    pub resettable: bool,
}

pub struct Executor {
    id: ExecutorId,
    routes: Arc<RouteTable>,
    options: ExecutorOptions,
    reset: Option<Arc<dyn Resettable>>,
    bound: AtomicBool,
}

impl Executor {
    pub fn new(
        id: impl Into<String>,
        options: ExecutorOptions,
        routes: RouteTable,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            id: ExecutorId::new(id)?,
            routes: Arc::new(routes),
            options,
            reset: None,
            bound: AtomicBool::new(false),
        })
    }

    /// reset 能力を付ける
    pub fn with_reset(mut self, reset: Arc<dyn Resettable>) -> Self {
        self.reset = Some(reset);
        self
    }

    pub fn id(&self) -> &ExecutorId {
        &self.id
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    pub fn is_shareable(&self) -> bool {
        self.options.shareable
    }

    pub fn supports_reset(&self) -> bool {
        self.reset.is_some()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn accepts(&self, message_type: MessageType) -> bool {
        self.routes.contains(message_type)
    }

    pub fn describe_protocol(&self) -> ProtocolDescriptor {
        ProtocolDescriptor {
            executor_id: self.id.clone(),
            accepts: self
                .routes
                .message_types()
                .iter()
                .map(|t| t.name().to_string())
                .collect(),
            shareable: self.is_shareable(),
            resettable: self.supports_reset(),
        }
    }

    /// メッセージを登録済み Handler に振り分ける
    ///
    /// 送信されたメッセージは戻り値ではなく context の outbox に積まれます。
    #[tracing::instrument(
        name = "executor.dispatch",
        skip_all,
        fields(
            executor_id = %self.id,
            run_id = %ctx.run_id(),
            message_type = %message.message_type(),
        )
    )]
    pub async fn dispatch(
        &self,
        message: Message,
        ctx: DispatchContext,
        cancel: CancellationToken,
    ) -> Result<(), DispatchError> {
        let actual_type = message.message_type();
        let Some(route) = self.routes.get(actual_type) else {
            tracing::warn!("no route for message type");
            return Err(DispatchError::Unroutable {
                executor_id: self.id.clone(),
                actual_type,
            });
        };

        tracing::debug!("invoking handler");
        match route.handler().handle_dyn(message, ctx, cancel).await {
            Ok(()) => Ok(()),
            Err(cause) if cause.is_cancelled() => {
                tracing::debug!("handler cancelled");
                Err(DispatchError::Cancelled {
                    executor_id: self.id.clone(),
                })
            }
            Err(cause) => Err(DispatchError::Handler {
                executor_id: self.id.clone(),
                cause,
            }),
        }
    }

    /// reset 能力があれば実行する
    #[tracing::instrument(name = "executor.reset", skip_all, fields(executor_id = %self.id))]
    pub async fn reset(&self, cancel: &CancellationToken) -> Result<ResetOutcome, ResetError> {
        let Some(reset) = &self.reset else {
            return Ok(ResetOutcome::NotSupported);
        };
        reset.reset(cancel).await?;
        tracing::debug!("executor reset");
        Ok(ResetOutcome::Reset)
    }

    /// run へのバインドを取得する
    ///
    /// 共有可能なら何度でも成功。非共有なら同時に 1 つの run だけ。
    /// ガードを drop するとバインドは解放されます。
    pub fn bind(self: &Arc<Self>) -> Result<ExecutorBinding, BindError> {
        if !self.is_shareable()
            && self
                .bound
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return Err(BindError::AlreadyBound {
                executor_id: self.id.clone(),
            });
        }
        Ok(ExecutorBinding {
            executor: Arc::clone(self),
        })
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("id", &self.id)
            .field("routes", &self.routes)
            .field("options", &self.options)
            .field("resettable", &self.supports_reset())
            .finish()
    }
}

/// run に結び付いた executor のハンドル
pub struct ExecutorBinding {
    executor: Arc<Executor>,
}

impl ExecutorBinding {
    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }
}

impl Drop for ExecutorBinding {
    fn drop(&mut self) {
        if !self.executor.is_shareable() {
            self.executor.bound.store(false, Ordering::Release);
        }
    }
}
