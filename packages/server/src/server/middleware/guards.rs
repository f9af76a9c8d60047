//! Axum extractors for the authorization chain.
//!
//! Handlers declare the requirement in their signature and receive the
//! member as an argument:
//!
//! ```rust,ignore
//! async fn handler(Permitted { member, .. }: Permitted<CanWriteDishes>) { ... }
//! ```

use std::marker::PhantomData;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::common::auth::{
    require_activated, require_authenticated, require_permission, Identity, RequiredCapability,
};
use crate::domains::member::Member;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::resolve_identity;

/// Reads the identity stored by the `authenticate` middleware; resolves it from
/// the headers only when that layer is absent.
#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }
        Ok(resolve_identity(&parts.headers, &state.deps.token_authority()).await?)
    }
}

/// Any authenticated member, activated or not.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Member);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        Ok(Authenticated(require_authenticated(identity)?))
    }
}

/// An authenticated, activated member.
#[derive(Debug, Clone)]
pub struct Activated(pub Member);

#[async_trait]
impl FromRequestParts<AppState> for Activated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        Ok(Activated(require_activated(identity)?))
    }
}

/// An activated member holding capability `C`.
pub struct Permitted<C> {
    pub member: Member,
    _capability: PhantomData<fn() -> C>,
}

#[async_trait]
impl<C: RequiredCapability> FromRequestParts<AppState> for Permitted<C> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        let member =
            require_permission(identity, C::CAPABILITY, state.deps.permissions.as_ref()).await?;
        Ok(Permitted {
            member,
            _capability: PhantomData,
        })
    }
}
