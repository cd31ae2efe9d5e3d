//! MessageType / Message - 型キーと型消去されたメッセージ
//!
//! # 学習ポイント
//! - `TypeId` による比較可能な型キー（文字列ではない）
//! - `Box<dyn Any + Send + Sync>` による type erasure
//! - `downcast` 失敗時に元の値を返す（所有権を失わない）
//!
//! `Vec<ChatMessage>` と `ChatMessage` は別の `TypeId` を持つので、
//! ジェネリックな形も別キーとして区別されます。

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// MessageType はルートを識別する型キー
///
/// 等価性とハッシュは `TypeId` のみで決まります。`name` は表示用です。
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// 型名（`std::any::type_name` の結果。表示・ログ用で安定性は保証しない）
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Message は executor 間を流れる型消去されたペイロード
pub struct Message {
    message_type: MessageType,
    payload: Box<dyn Any + Send + Sync>,
}

impl Message {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            message_type: MessageType::of::<T>(),
            payload: Box::new(value),
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn is<T: Any>(&self) -> bool {
        self.message_type.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// 型が一致すれば値を取り出す。一致しなければ Message をそのまま返す
    pub fn downcast<T: Any>(self) -> Result<T, Message> {
        let Message {
            message_type,
            payload,
        } = self;
        match payload.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(payload) => Err(Message {
                message_type,
                payload,
            }),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("message_type", &self.message_type)
            .finish_non_exhaustive()
    }
}
