// File: ./src/client/auth.rs
// Central reaction to 401 responses: drop the session and tell the app.
use crate::session::SharedSession;
use http::{Request, Response, StatusCode};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower_service::Service;

/// Callback fired after a 401 has cleared the session.
///
/// The composition root wires this to navigation (the TUI turns it into a
/// "go to login" event). It may fire several times when concurrent requests
/// all fail, so whatever it triggers has to be idempotent.
#[derive(Clone)]
pub struct UnauthorizedHook(Arc<dyn Fn() + Send + Sync>);

impl UnauthorizedHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn fire(&self) {
        (self.0)()
    }
}

impl fmt::Debug for UnauthorizedHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnauthorizedHook")
    }
}

impl Default for UnauthorizedHook {
    fn default() -> Self {
        Self::noop()
    }
}

#[derive(Clone, Debug)]
pub struct UnauthorizedLayer {
    session: SharedSession,
    hook: UnauthorizedHook,
}

impl UnauthorizedLayer {
    pub fn new(session: SharedSession, hook: UnauthorizedHook) -> Self {
        Self { session, hook }
    }
}

impl<S> tower_layer::Layer<S> for UnauthorizedLayer {
    type Service = UnauthorizedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UnauthorizedService {
            inner,
            session: self.session.clone(),
            hook: self.hook.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct UnauthorizedService<S> {
    inner: S,
    session: SharedSession,
    hook: UnauthorizedHook,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for UnauthorizedService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let path = req.uri().path().to_string();
        let session = self.session.clone();
        let hook = self.hook.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let response = fut.await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                log::warn!("401 from {}; clearing session", path);
                if let Err(e) = session.clear() {
                    log::error!("Failed to clear session after 401: {:#}", e);
                }
                hook.fire();
            }

            Ok(response)
        })
    }
}
