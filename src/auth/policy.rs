//! Ownership policy for post and comment mutations

use crate::{
    auth::middleware::{AuthContext, Principal},
    error::AppError,
    models::{Comment, Post, Role},
};
use std::future::Future;
use uuid::Uuid;

/// A resource with an immutable creator
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Post {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Post,
    Comment,
}

impl ResourceKind {
    fn not_found(self) -> AppError {
        match self {
            ResourceKind::Post => AppError::not_found("Post not found"),
            ResourceKind::Comment => AppError::not_found("Comment not found"),
        }
    }

    fn not_owner(self) -> AppError {
        match self {
            ResourceKind::Post => AppError::forbidden("Only the author can modify this post"),
            ResourceKind::Comment => AppError::forbidden("Only the author can modify this comment"),
        }
    }
}

/// Compare the resource owner with the caller
pub fn ensure_owner<R: Owned>(
    principal: &Principal,
    resource: &R,
    kind: ResourceKind,
) -> Result<(), AppError> {
    match principal.role {
        // ADMIN carries no override today; one would be its own arm here.
        Role::User | Role::Admin => {
            if resource.owner_id() == principal.account_id {
                Ok(())
            } else {
                tracing::warn!(
                    account_id = %principal.account_id,
                    owner_id = %resource.owner_id(),
                    resource = ?kind,
                    "Ownership check failed"
                );
                Err(kind.not_owner())
            }
        }
    }
}

/// Principal check, then load, then ownership. `load` is not polled unless a
/// principal is present.
pub async fn authorize_owner<R, F>(
    auth: &AuthContext,
    kind: ResourceKind,
    load: F,
) -> Result<(Principal, R), AppError>
where
    R: Owned,
    F: Future<Output = Result<Option<R>, AppError>>,
{
    let principal = auth.principal()?.clone();
    let resource = load.await?.ok_or_else(|| kind.not_found())?;
    ensure_owner(&principal, &resource, kind)?;
    Ok((principal, resource))
}
