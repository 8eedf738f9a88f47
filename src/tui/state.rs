// Manages the application state for the TUI.
use crate::board::TaskBoard;
use crate::model::Task;
use crate::profile::ProfileState;
use crate::router::{Gate, Resolution, Route, Router};
use crate::session::SharedSession;
use crate::tui::action::Action;
use crate::tui::form::Form;
use ratatui::widgets::ListState;

/// Dialogs drawn on top of the dashboard.
#[derive(Debug, Clone)]
pub enum Overlay {
    None,
    AddTask(Form),
    EditTask { id: String, form: Form },
    ConfirmDelete { id: String, title: String },
}

pub struct AppState {
    pub router: Router,
    pub board: TaskBoard,
    pub profile: ProfileState,

    // Screen forms
    pub login_form: Form,
    pub register_form: Form,
    /// `Some` while the profile editor is open.
    pub profile_form: Option<Form>,
    pub overlay: Overlay,

    // UI State
    pub list_state: ListState,
    pub message: String,
    /// A submit is in flight; further submits are ignored.
    pub busy: bool,
    pub show_full_help: bool,
}

impl AppState {
    pub fn new(session: SharedSession, page_size: u32) -> Self {
        Self {
            router: Router::new(session),
            board: TaskBoard::new(page_size),
            profile: ProfileState::default(),
            login_form: Form::login(),
            register_form: Form::register(),
            profile_form: None,
            overlay: Overlay::None,
            list_state: ListState::default(),
            message: String::new(),
            busy: false,
            show_full_help: false,
        }
    }

    pub fn route(&self) -> Route {
        self.router.current()
    }

    /// Mount effect for whichever screen the router started on.
    pub fn start(&mut self) -> Option<Action> {
        let resolution = self.router.resolution();
        self.on_enter(resolution)
    }

    /// Navigates through the gates. Returns the fetch the landing screen needs, if any.
    pub fn go(&mut self, route: Route) -> Option<Action> {
        let resolution = self.router.go(route);
        self.on_enter(resolution)
    }

    pub fn navigate(&mut self, path: &str) -> Option<Action> {
        let resolution = self.router.navigate(path);
        self.on_enter(resolution)
    }

    fn on_enter(&mut self, resolution: Resolution) -> Option<Action> {
        self.overlay = Overlay::None;
        self.busy = false;
        match resolution.route {
            Route::Dashboard => {
                self.list_state.select(None);
                Some(Action::LoadPage(self.board.load_first()))
            }
            Route::Profile => {
                self.profile = ProfileState::default();
                self.profile_form = None;
                self.profile.begin_load();
                Some(Action::LoadProfile)
            }
            Route::Login => {
                self.login_form = Form::login();
                None
            }
            Route::Register => {
                self.register_form = Form::register();
                None
            }
            Route::NotFound => None,
        }
    }

    /// Drops everything fetched under the previous session.
    pub fn clear_session_data(&mut self) {
        self.board.reset();
        self.profile = ProfileState::default();
        self.profile_form = None;
        self.overlay = Overlay::None;
        self.list_state.select(None);
        self.busy = false;
    }

    /// Reaction to the client's 401 hook. On a public screen the 401 was a
    /// rejected sign-in or sign-up, and the status line is left to its error.
    pub fn session_expired(&mut self) {
        let was_protected = self.route().gate() == Gate::Protected;
        self.clear_session_data();
        if self.router.force_login() {
            self.login_form = Form::login();
        }
        if was_protected {
            self.message = "Session expired. Please log in again.".to_string();
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.list_state
            .selected()
            .and_then(|i| self.board.tasks().get(i))
    }

    /// Keeps the selection inside the current page after it was replaced.
    pub fn clamp_selection(&mut self) {
        let len = self.board.tasks().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    // --- NAVIGATION ---
    pub fn next(&mut self) {
        let len = self.board.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.board.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskPage;
    use crate::session::{MemorySessionStore, SessionStore};
    use std::sync::Arc;

    fn signed_in() -> AppState {
        AppState::new(Arc::new(MemorySessionStore::with_token("tok")), 10)
    }

    fn loaded(state: &mut AppState, n: usize) {
        let Some(Action::LoadPage(req)) = state.start() else {
            panic!("dashboard should fetch on mount");
        };
        let items = (0..n)
            .map(|i| Task {
                id: i.to_string(),
                title: format!("t{}", i),
                description: None,
                completed: false,
            })
            .collect();
        state.board.finish_load(
            req.seq,
            Ok(TaskPage {
                items,
                current_page: 1,
                total_pages: 1,
            }),
        );
        state.clamp_selection();
    }

    #[test]
    fn anonymous_start_lands_on_login_without_fetch() {
        let mut state = AppState::new(MemorySessionStore::shared(), 10);
        assert_eq!(state.route(), Route::Login);
        assert!(state.start().is_none());
    }

    #[test]
    fn dashboard_mount_fetches_first_page() {
        let mut state = signed_in();
        assert_eq!(state.route(), Route::Dashboard);
        match state.start() {
            Some(Action::LoadPage(req)) => assert_eq!((req.page, req.limit), (1, 10)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn profile_mount_requests_profile() {
        let mut state = signed_in();
        assert!(matches!(state.go(Route::Profile), Some(Action::LoadProfile)));
        assert!(state.profile.user().is_none());
    }

    #[test]
    fn session_expiry_clears_data_and_shows_login() {
        let session = Arc::new(MemorySessionStore::with_token("tok"));
        let mut state = AppState::new(session.clone(), 10);
        loaded(&mut state, 3);
        assert_eq!(state.selected_task().map(|t| t.id.as_str()), Some("0"));

        session.clear().unwrap();
        state.session_expired();
        assert_eq!(state.route(), Route::Login);
        assert!(state.board.tasks().is_empty());
        assert!(state.selected_task().is_none());
    }

    #[test]
    fn list_navigation_wraps() {
        let mut state = signed_in();
        loaded(&mut state, 3);
        state.previous();
        assert_eq!(state.list_state.selected(), Some(2));
        state.next();
        assert_eq!(state.list_state.selected(), Some(0));
    }

    #[test]
    fn navigation_on_empty_list_is_safe() {
        let mut state = signed_in();
        loaded(&mut state, 0);
        state.next();
        state.previous();
        assert!(state.selected_task().is_none());
    }
}
