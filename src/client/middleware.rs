// File: ./src/client/middleware.rs
//! Tower middleware that attaches the stored bearer token to every request.
use crate::session::SharedSession;
use http::{HeaderValue, Request};
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

#[derive(Clone, Debug)]
pub struct BearerAuthLayer {
    session: SharedSession,
}

impl BearerAuthLayer {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService {
            inner,
            session: self.session.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BearerAuthService<S> {
    inner: S,
    session: SharedSession,
}

impl<S, ReqBody> Service<Request<ReqBody>> for BearerAuthService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // Read at call time: a login or logout after the client was built
        // must show up on the very next request.
        match self.session.get() {
            Some(token) => {
                if let Ok(mut val) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                    val.set_sensitive(true);
                    req.headers_mut().insert(http::header::AUTHORIZATION, val);
                } else {
                    log::warn!("Stored token is not a valid header value; sending unauthenticated");
                }
            }
            None => {
                req.headers_mut().remove(http::header::AUTHORIZATION);
            }
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, SessionStore};
    use std::convert::Infallible;
    use std::sync::Arc;
    use tower::{ServiceBuilder, ServiceExt, service_fn};

    async fn echo_auth(req: Request<String>) -> Result<Option<String>, Infallible> {
        Ok(req
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }

    #[tokio::test]
    async fn adds_header_only_when_token_present() {
        let session = Arc::new(MemorySessionStore::new());
        let svc = ServiceBuilder::new()
            .layer(BearerAuthLayer::new(session.clone()))
            .service(service_fn(echo_auth));

        let seen = svc.clone().oneshot(Request::new(String::new())).await.unwrap();
        assert_eq!(seen, None);

        session.set("abc123").unwrap();
        let seen = svc.clone().oneshot(Request::new(String::new())).await.unwrap();
        assert_eq!(seen.as_deref(), Some("Bearer abc123"));

        session.clear().unwrap();
        let seen = svc.oneshot(Request::new(String::new())).await.unwrap();
        assert_eq!(seen, None);
    }
}
