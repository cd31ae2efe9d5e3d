//! Domain identifiers (strongly-typed IDs).
//!
//! # ULID ベースの ID
//! Run は実行ごとに新しい ID を持つため、調整なしで生成できる ULID を使います。
//! `Id<T>` は Phantom type パターンで、マーカー型ごとに別の型になります。
//!
//! ExecutorId はグラフ構築時に人が付ける名前なので、ULID ではなく文字列です。

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

use crate::error::BuildError;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"run-" など）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData で、実行時にはメモリを消費しません。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// 新しい ID を生成
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Run のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Run {}

impl IdMarker for Run {
    fn prefix() -> &'static str {
        "run-"
    }
}

/// Identifier of one workflow run (the unit that owns outbox and run state).
pub type RunId = Id<Run>;

/// ExecutorId はワークフローグラフ内で executor を識別する名前
///
/// - 空文字列は不可（`ExecutorId::new` で検証）
/// - 前後の空白は削らず、渡された文字列をそのまま保持する
/// - グラフ内での一意性はグラフビルダー側の責務
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutorId(String);

impl ExecutorId {
    pub fn new(value: impl Into<String>) -> Result<Self, BuildError> {
        let value = value.into();
        if value.is_empty() {
            return Err(BuildError::EmptyExecutorId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExecutorId {
    type Error = BuildError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExecutorId> for String {
    fn from(id: ExecutorId) -> Self {
        id.0
    }
}

impl Borrow<str> for ExecutorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ExecutorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_has_prefix() {
        let ulid = Ulid::new();
        let run = RunId::from_ulid(ulid);
        assert_eq!(run.as_ulid(), ulid);
        assert!(run.to_string().starts_with("run-"));
    }

    #[test]
    fn generated_run_ids_are_unique() {
        let a = RunId::generate();
        let b = RunId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<RunId>(), size_of::<Ulid>());
    }

    #[test]
    fn executor_id_rejects_empty() {
        assert!(matches!(ExecutorId::new(""), Err(BuildError::EmptyExecutorId)));
        assert_eq!(ExecutorId::new("forward").unwrap().as_str(), "forward");
    }

    #[test]
    fn executor_id_keeps_value_verbatim() {
        assert_eq!(ExecutorId::new(" forward ").unwrap().as_str(), " forward ");
        assert_eq!(ExecutorId::new("   ").unwrap().as_str(), "   ");
    }

    #[test]
    fn executor_id_deserialize_validates() {
        let ok: ExecutorId = serde_json::from_str("\"splitter\"").unwrap();
        assert_eq!(ok.to_string(), "splitter");

        let err = serde_json::from_str::<ExecutorId>("\"\"");
        assert!(err.is_err());
    }
}
