// File: ./src/router.rs
//! Screen routing with session gates.
//!
//! Every navigation asks the session store directly whether a token is
//! present. Nothing caches the answer, so a login or logout is visible to
//! the very next navigation.
use crate::session::SharedSession;
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Route {
    #[strum(to_string = "Login")]
    Login,
    #[strum(to_string = "Register")]
    Register,
    #[strum(to_string = "Task Dashboard")]
    Dashboard,
    #[strum(to_string = "Profile")]
    Profile,
    #[strum(to_string = "Not Found")]
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Only without a token (login, register).
    Public,
    /// Only with a token; rendered with navigation chrome.
    Protected,
    /// Always reachable.
    Open,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Dashboard,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/profile" => Route::Profile,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/",
            Route::Profile => "/profile",
            Route::NotFound => "/404",
        }
    }

    pub fn gate(&self) -> Gate {
        match self {
            Route::Login | Route::Register => Gate::Public,
            Route::Dashboard | Route::Profile => Gate::Protected,
            Route::NotFound => Gate::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render { chrome: bool },
    Redirect(Route),
}

/// The gate decision for one navigation.
pub fn decide(route: Route, has_session: bool) -> Decision {
    match (route.gate(), has_session) {
        (Gate::Protected, false) => Decision::Redirect(Route::Login),
        (Gate::Protected, true) => Decision::Render { chrome: true },
        (Gate::Public, true) => Decision::Redirect(Route::Dashboard),
        (Gate::Public, false) | (Gate::Open, _) => Decision::Render { chrome: false },
    }
}

/// Where a navigation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    /// The route originally asked for, when the gate sent us elsewhere.
    pub redirected_from: Option<Route>,
    pub chrome: bool,
}

#[derive(Debug)]
pub struct Router {
    session: SharedSession,
    current: Resolution,
}

impl Router {
    /// Starts at `/`, which lands on the dashboard or the login screen.
    pub fn new(session: SharedSession) -> Self {
        let mut router = Self {
            session,
            current: Resolution {
                route: Route::Login,
                redirected_from: None,
                chrome: false,
            },
        };
        router.go(Route::Dashboard);
        router
    }

    pub fn current(&self) -> Route {
        self.current.route
    }

    pub fn resolution(&self) -> Resolution {
        self.current
    }

    pub fn navigate(&mut self, path: &str) -> Resolution {
        self.go(Route::parse(path))
    }

    pub fn go(&mut self, requested: Route) -> Resolution {
        let has_session = self.session.is_authenticated();
        let resolution = match decide(requested, has_session) {
            Decision::Render { chrome } => Resolution {
                route: requested,
                redirected_from: None,
                chrome,
            },
            Decision::Redirect(target) => {
                // Redirect targets always pass their own gate for the same
                // session state, so one hop is enough.
                let chrome = matches!(
                    decide(target, has_session),
                    Decision::Render { chrome: true }
                );
                log::debug!("Route {} redirected to {}", requested.path(), target.path());
                Resolution {
                    route: target,
                    redirected_from: Some(requested),
                    chrome,
                }
            }
        };
        self.current = resolution;
        resolution
    }

    /// Target of the unauthorized hook. Returns whether the screen changed.
    pub fn force_login(&mut self) -> bool {
        if self.current.route == Route::Login {
            return false;
        }
        self.go(Route::Login);
        true
    }
}
