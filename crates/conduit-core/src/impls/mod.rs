//! Impls - 具体的な executor 実装
//!
//! # 含まれる実装
//! - **ChatForwarding**: チャット系メッセージをそのまま下流へ流す（共有可能・reset 可能）

pub mod forwarding;

pub use self::forwarding::ChatForwarding;
