//! App - executor コアと run ホスト
//!
//! # 主要コンポーネント
//! - **Executor**: ルート表による dispatch、共有可否、reset 能力
//! - **DispatchContext**: dispatch ごとの送信・キャンセル・状態へのハンドル
//! - **RunStateArena**: run が所有する状態
//! - **Run**: 上記を束ねる最小のプロセス内ホスト

pub mod context;
pub mod executor;
pub mod run;
pub mod state;

pub use self::context::{DispatchContext, OutgoingMessage};
pub use self::executor::{
    Executor, ExecutorBinding, ExecutorOptions, ProtocolDescriptor, ResetOutcome, Resettable,
};
pub use self::run::Run;
pub use self::state::{RunStateArena, StateScope};
