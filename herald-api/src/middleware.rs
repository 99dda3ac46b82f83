//! Identity middleware and extractor.
//!
//! Authentication is the fronting gateway's job; by the time a request
//! reaches Herald it carries the verified subscriber id and role in
//! `X-Herald-Subscriber` and `X-Herald-Role`. The middleware turns
//! those into an [`AuthenticatedSubscriber`] request extension, and the
//! [`Auth`] extractor hands it to handlers.

use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use herald_core::types::SubscriberId;
use herald_engine::Actor;

use crate::error::ErrorResponse;

/// Header carrying the verified subscriber id.
pub const SUBSCRIBER_HEADER: &str = "x-herald-subscriber";

/// Header carrying the verified role.
pub const ROLE_HEADER: &str = "x-herald-role";

/// Gateway-verified role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A regular subscriber.
    Subscriber,
    /// An administrator (admin panel collaborator).
    Admin,
    /// The trade/strategy engine service identity.
    Service,
}

impl Role {
    /// Returns true for the administrator role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true for identities allowed to append events.
    #[must_use]
    pub const fn may_ingest(&self) -> bool {
        matches!(self, Self::Admin | Self::Service)
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "subscriber" => Some(Self::Subscriber),
            "admin" => Some(Self::Admin),
            "service" => Some(Self::Service),
            _ => None,
        }
    }
}

/// Authenticated identity extracted from the gateway headers.
#[derive(Debug, Clone)]
pub struct AuthenticatedSubscriber {
    /// Subscriber id.
    pub id: SubscriberId,
    /// Verified role.
    pub role: Role,
}

impl AuthenticatedSubscriber {
    /// Converts into the engine's registry actor.
    #[must_use]
    pub fn actor(&self) -> Actor {
        if self.role.is_admin() {
            Actor::admin(self.id.clone())
        } else {
            Actor::subscriber(self.id.clone())
        }
    }
}

/// Identity middleware: validates the gateway headers and stores the
/// identity in request extensions.
pub async fn identity_middleware(mut request: Request<Body>, next: Next) -> Response {
    let subscriber = request
        .headers()
        .get(SUBSCRIBER_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(SubscriberId::new);

    let id = match subscriber {
        Some(Ok(id)) => id,
        Some(Err(e)) => return unauthorized_response(&e.to_string()),
        None => return unauthorized_response("Missing X-Herald-Subscriber header"),
    };

    let role = match request
        .headers()
        .get(ROLE_HEADER)
        .and_then(|h| h.to_str().ok())
    {
        None => Role::Subscriber,
        Some(value) => match Role::parse(value) {
            Some(role) => role,
            None => return unauthorized_response(&format!("Unknown role: {value}")),
        },
    };

    request
        .extensions_mut()
        .insert(AuthenticatedSubscriber { id, role });
    next.run(request).await
}

/// Creates an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        status: "error",
        code: "UNAUTHORIZED",
        message: message.to_string(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Extractor for the authenticated identity.
#[derive(Debug, Clone)]
pub struct Auth(pub AuthenticatedSubscriber);

impl<S> axum::extract::FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSubscriber>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| unauthorized_response("Not authenticated"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("subscriber"), Some(Role::Subscriber));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("service"), Some(Role::Service));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Service.is_admin());
        assert!(Role::Service.may_ingest());
        assert!(Role::Admin.may_ingest());
        assert!(!Role::Subscriber.may_ingest());
    }

    #[test]
    fn test_actor_conversion() {
        let user = AuthenticatedSubscriber {
            id: SubscriberId::new_unchecked("ops@x.com"),
            role: Role::Admin,
        };
        assert!(user.actor().admin);

        let user = AuthenticatedSubscriber {
            id: SubscriberId::new_unchecked("trader@x.com"),
            role: Role::Subscriber,
        };
        assert!(!user.actor().admin);
    }
}
