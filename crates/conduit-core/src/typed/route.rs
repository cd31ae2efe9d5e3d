//! RouteBuilder / RouteTable - Handler の登録と凍結
//!
//! # 学習ポイント
//! - `Vec` + `HashMap<MessageType, usize>` で登録順と O(1) 検索を両立
//! - Builder は可変、build 後の RouteTable は不変（ロック不要で共有できる）
//! - 重複登録は build() でまとめて報告（fluent chain を崩さない）

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{DynHandler, Handler, TypedHandler};
use crate::domain::MessageType;
use crate::error::BuildError;

/// Route は (MessageType, Handler) の組
#[derive(Clone)]
pub struct Route {
    message_type: MessageType,
    handler: Arc<dyn DynHandler>,
}

impl Route {
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn handler(&self) -> &Arc<dyn DynHandler> {
        &self.handler
    }
}

/// RouteBuilder は Handler を蓄積して RouteTable を作る
///
/// # 使用例
/// ```ignore
/// let routes = RouteBuilder::new()
///     .add_handler::<String, _>(StringHandler)
///     .add_handler::<TurnToken, _>(TurnHandler)
///     .build()?;
/// ```
#[derive(Default)]
pub struct RouteBuilder {
    routes: Vec<Route>,
    index: HashMap<MessageType, usize>,
    duplicate: Option<MessageType>,
}

impl RouteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 型 `T` 完全一致の Handler を登録
    ///
    /// 同じ `T` を二度登録すると、最初の登録を残して build() が
    /// `BuildError::DuplicateRoute` を返します。
    pub fn add_handler<T, H>(mut self, handler: H) -> Self
    where
        T: Any + Send + Sync,
        H: Handler<T> + 'static,
    {
        let message_type = MessageType::of::<T>();
        if self.index.contains_key(&message_type) {
            self.duplicate.get_or_insert(message_type);
            return self;
        }
        self.index.insert(message_type, self.routes.len());
        self.routes.push(Route {
            message_type,
            handler: Arc::new(TypedHandler::<T, H>::new(handler)),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn build(self) -> Result<RouteTable, BuildError> {
        if let Some(message_type) = self.duplicate {
            return Err(BuildError::DuplicateRoute { message_type });
        }
        if self.routes.is_empty() {
            return Err(BuildError::EmptyRouteTable);
        }
        Ok(RouteTable {
            routes: self.routes,
            index: self.index,
        })
    }
}

/// RouteTable は凍結されたルート表
///
/// 構築後は変更できないので、複数の dispatch から同期なしで読めます。
pub struct RouteTable {
    routes: Vec<Route>,
    index: HashMap<MessageType, usize>,
}

impl RouteTable {
    pub fn get(&self, message_type: MessageType) -> Option<&Route> {
        self.index.get(&message_type).map(|&i| &self.routes[i])
    }

    pub fn contains(&self, message_type: MessageType) -> bool {
        self.index.contains_key(&message_type)
    }

    /// 登録順の MessageType 一覧
    pub fn message_types(&self) -> Vec<MessageType> {
        self.routes.iter().map(Route::message_type).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.message_types()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::context::DispatchContext;
    use crate::error::HandlerError;
    use rstest::rstest;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug)]
    struct Alpha;
    #[derive(Debug)]
    struct Beta;

    async fn noop<T>(
        _m: T,
        _ctx: DispatchContext,
        _c: CancellationToken,
    ) -> Result<(), HandlerError> {
        Ok(())
    }

    #[test]
    fn build_keeps_registration_order() {
        let table = RouteBuilder::new()
            .add_handler::<Beta, _>(noop::<Beta>)
            .add_handler::<Alpha, _>(noop::<Alpha>)
            .add_handler::<Vec<Alpha>, _>(noop::<Vec<Alpha>>)
            .build()
            .unwrap();

        assert_eq!(
            table.message_types(),
            vec![
                MessageType::of::<Beta>(),
                MessageType::of::<Alpha>(),
                MessageType::of::<Vec<Alpha>>(),
            ]
        );
        assert!(table.contains(MessageType::of::<Vec<Alpha>>()));
        assert!(!table.contains(MessageType::of::<Vec<Beta>>()));
    }

    #[test]
    fn get_returns_route_for_exact_type() {
        let table = RouteBuilder::new()
            .add_handler::<Alpha, _>(noop::<Alpha>)
            .build()
            .unwrap();

        let route = table.get(MessageType::of::<Alpha>()).unwrap();
        assert_eq!(route.message_type(), MessageType::of::<Alpha>());
        assert_eq!(route.handler().message_type(), MessageType::of::<Alpha>());
        assert!(table.get(MessageType::of::<Beta>()).is_none());
    }

    #[test]
    fn empty_builder_fails() {
        let result = RouteBuilder::new().build();
        assert!(matches!(result, Err(BuildError::EmptyRouteTable)));
    }

    #[rstest]
    #[case::adjacent(true)]
    #[case::separated(false)]
    fn duplicate_registration_fails(#[case] adjacent: bool) {
        let builder = RouteBuilder::new().add_handler::<Alpha, _>(noop::<Alpha>);
        let builder = if adjacent {
            builder
                .add_handler::<Alpha, _>(noop::<Alpha>)
                .add_handler::<Beta, _>(noop::<Beta>)
        } else {
            builder
                .add_handler::<Beta, _>(noop::<Beta>)
                .add_handler::<Alpha, _>(noop::<Alpha>)
        };

        let result = builder.build();
        assert!(matches!(
            result,
            Err(BuildError::DuplicateRoute { message_type })
                if message_type == MessageType::of::<Alpha>()
        ));
    }

    #[test]
    fn duplicate_is_reported_even_with_other_routes_first() {
        let result = RouteBuilder::new()
            .add_handler::<Beta, _>(noop::<Beta>)
            .add_handler::<Beta, _>(noop::<Beta>)
            .build();
        assert!(matches!(result, Err(BuildError::DuplicateRoute { .. })));
    }
}
