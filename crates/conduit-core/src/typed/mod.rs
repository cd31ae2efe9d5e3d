//! Typed - 型付き Handler とルート表
//!
//! メッセージ型と Handler の対応を型で表し、実行時は `TypeId` の完全一致で引きます。
//!
//! # 二層構造
//! - **表層（Typed）**: `Handler<T>` trait - 型安全
//! - **内部（Dyn）**: `DynHandler` trait - object-safe, type erasure

pub mod handler;
pub mod route;

pub use self::handler::{DynHandler, Handler, TypedHandler};
pub use self::route::{Route, RouteBuilder, RouteTable};
