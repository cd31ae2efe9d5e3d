//! RunStateArena - run ごとの状態置き場
//!
//! # 学習ポイント
//! - 状態は executor ではなく run が所有する（共有 executor でも run 間で漏れない）
//! - `(ExecutorId, 値の型)` をキーにした型消去ストレージ
//! - tokio::sync::Mutex はロック中に await しない前提で短く持つ

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ExecutorId, MessageType};

type Slot = Box<dyn Any + Send + Sync>;

/// RunStateArena は 1 つの run が所有する状態ストア
///
/// `Clone` は同じストアへのハンドルを複製するだけです。
#[derive(Clone, Default)]
pub struct RunStateArena {
    slots: Arc<Mutex<HashMap<ExecutorId, HashMap<MessageType, Slot>>>>,
}

impl RunStateArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// executor 専用のスコープを作る
    pub fn scope(&self, executor_id: ExecutorId) -> StateScope {
        StateScope {
            arena: self.clone(),
            executor_id,
        }
    }

    /// executor の状態をすべて捨てる（reset 用）
    pub async fn clear_executor(&self, executor_id: &ExecutorId) {
        self.slots.lock().await.remove(executor_id);
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.values().all(HashMap::is_empty)
    }
}

/// StateScope は `(run, executor)` に閉じた状態へのアクセス
///
/// 値は型ごとに 1 つ。別の型は別のスロットです。
#[derive(Clone)]
pub struct StateScope {
    arena: RunStateArena,
    executor_id: ExecutorId,
}

impl StateScope {
    pub fn executor_id(&self) -> &ExecutorId {
        &self.executor_id
    }

    pub async fn get<T: Any + Clone + Send + Sync>(&self) -> Option<T> {
        let slots = self.arena.slots.lock().await;
        slots
            .get(&self.executor_id)?
            .get(&MessageType::of::<T>())?
            .downcast_ref::<T>()
            .cloned()
    }

    /// 値を保存し、以前の値を返す
    pub async fn insert<T: Any + Send + Sync>(&self, value: T) -> Option<T> {
        let mut slots = self.arena.slots.lock().await;
        slots
            .entry(self.executor_id.clone())
            .or_default()
            .insert(MessageType::of::<T>(), Box::new(value))
            .and_then(|prev| prev.downcast::<T>().ok())
            .map(|prev| *prev)
    }

    pub async fn remove<T: Any + Send + Sync>(&self) -> Option<T> {
        let mut slots = self.arena.slots.lock().await;
        slots
            .get_mut(&self.executor_id)?
            .remove(&MessageType::of::<T>())
            .and_then(|prev| prev.downcast::<T>().ok())
            .map(|prev| *prev)
    }

    /// 値をその場で更新する。なければ `T::default()` から始める
    pub async fn update<T, R>(&self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Any + Default + Send + Sync,
    {
        let mut slots = self.arena.slots.lock().await;
        let slot = slots
            .entry(self.executor_id.clone())
            .or_default()
            .entry(MessageType::of::<T>())
            .or_insert_with(|| Box::new(T::default()) as Slot);
        match slot.downcast_mut::<T>() {
            Some(value) => f(value),
            None => {
                // キーは TypeId なので型は必ず一致する
                let mut fresh = T::default();
                let out = f(&mut fresh);
                *slot = Box::new(fresh);
                out
            }
        }
    }

    pub async fn clear(&self) {
        self.arena.clear_executor(&self.executor_id).await;
    }
}
