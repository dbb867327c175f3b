//! 调用方身份提取
//!
//! 认证在网关完成（令牌签发与校验不在本子系统内）；
//! 网关把已认证的用户ID放入 `x-user-id` 头转发给内部服务。

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// 已认证的调用方用户ID
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing x-user-id header"))?;

        let user_id = header
            .parse::<Uuid>()
            .map_err(|_| ApiError::unauthorized("invalid x-user-id header"))?;

        Ok(AuthUser(user_id))
    }
}
