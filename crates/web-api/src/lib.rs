//! Web API 层。
//!
//! 提供 Axum 路由，将网关转发的 HTTP 请求委托给应用层的用例服务。
//! 调用方身份由网关认证后通过 `x-user-id` 头传入。

mod auth;
mod error;
mod routes;
mod state;

pub use auth::AuthUser;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
