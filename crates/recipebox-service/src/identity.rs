//! Resolving the calling tenant from an inbound request.

use async_trait::async_trait;
use recipebox_core::TenantId;

use crate::error::ServiceError;

/// Extracts the tenant on whose behalf a request acts.
///
/// The request type is left to the transport layer. Implementations fail
/// with [`ServiceError::Unauthenticated`] when no tenant can be established.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    type Request: Send + Sync;

    async fn require_tenant_id(&self, request: &Self::Request) -> Result<TenantId, ServiceError>;
}

/// Authenticated session state as left behind by an upstream login layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub tenant_id: Option<TenantId>,
}

impl Session {
    pub fn authenticated(tenant_id: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Resolver reading the tenant straight out of a [`Session`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionResolver;

#[async_trait]
impl IdentityResolver for SessionResolver {
    type Request = Session;

    async fn require_tenant_id(&self, request: &Session) -> Result<TenantId, ServiceError> {
        request
            .tenant_id
            .clone()
            .ok_or(ServiceError::Unauthenticated)
    }
}
