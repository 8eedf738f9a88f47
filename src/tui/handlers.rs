// File: src/tui/handlers.rs
// Handles keyboard input and network events for the TUI.
use crate::model::{Credentials, NewTask, Registration, TaskUpdate};
use crate::router::Route;
use crate::tui::action::{Action, AppEvent};
use crate::tui::form::Form;
use crate::tui::state::{AppState, Overlay};
use crate::validation::{
    validate_login, validate_new_task, validate_registration, validate_task_update,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_app_event(state: &mut AppState, event: AppEvent) -> Option<Action> {
    match event {
        AppEvent::Error(s) => {
            state.message = format!("Error: {}", s);
            state.busy = false;
            None
        }
        AppEvent::LoggedIn => {
            state.message = "Logged in successfully".to_string();
            state.go(Route::Dashboard)
        }
        AppEvent::Registered => {
            state.message = "Registration successful! Please login.".to_string();
            state.go(Route::Login)
        }
        AppEvent::PageLoaded { seq, result } => {
            let failed = matches!(&result, Err(e) if !e.is_unauthorized());
            if state.board.finish_load(seq, result) {
                state.clamp_selection();
                if failed {
                    state.message = "Error: Failed to fetch tasks".to_string();
                }
            }
            None
        }
        AppEvent::TaskCreated(task) => {
            state.busy = false;
            state.overlay = Overlay::None;
            state.message = "Task added successfully".to_string();
            let follow_up = state.board.task_created(task);
            state.clamp_selection();
            follow_up.map(Action::LoadPage)
        }
        AppEvent::TaskUpdated => {
            state.busy = false;
            state.overlay = Overlay::None;
            state.message = "Task updated successfully".to_string();
            Some(Action::LoadPage(state.board.task_updated()))
        }
        AppEvent::TaskDeleted => {
            state.busy = false;
            state.overlay = Overlay::None;
            state.message = "Task deleted successfully".to_string();
            Some(Action::LoadPage(state.board.task_deleted()))
        }
        AppEvent::ProfileLoaded(result) => {
            state.profile.finish_load(result);
            None
        }
        AppEvent::ProfileUpdated(submitted, echoed) => {
            state.busy = false;
            state.profile.apply_update(&submitted, &echoed);
            state.profile_form = None;
            state.message = "Profile updated successfully".to_string();
            None
        }
        AppEvent::SessionExpired => {
            state.session_expired();
            None
        }
        AppEvent::LoggedOut => {
            state.clear_session_data();
            state.message = "Logged out".to_string();
            state.go(Route::Login)
        }
    }
}

enum FormInput {
    Submit,
    Cancel,
    Edited,
}

fn edit_form(form: &mut Form, key: KeyEvent) -> FormInput {
    match key.code {
        KeyCode::Enter => return FormInput::Submit,
        KeyCode::Esc => return FormInput::Cancel,
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.previous_field(),
        KeyCode::Backspace => form.delete_char(),
        KeyCode::Left => form.move_cursor_left(),
        KeyCode::Right => form.move_cursor_right(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => form.enter_char(c),
        _ => {}
    }
    FormInput::Edited
}

pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match state.route() {
        Route::Login => handle_login_keys(key, state),
        Route::Register => handle_register_keys(key, state),
        Route::Dashboard => handle_dashboard_keys(key, state),
        Route::Profile => handle_profile_keys(key, state),
        Route::NotFound => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => {
                state.show_full_help = !state.show_full_help;
                None
            }
            _ => state.go(Route::Dashboard),
        },
    }
}

fn handle_login_keys(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
        return state.go(Route::Register);
    }
    match edit_form(&mut state.login_form, key) {
        FormInput::Cancel => Some(Action::Quit),
        FormInput::Edited => None,
        FormInput::Submit => {
            if state.busy {
                return None;
            }
            let form = &mut state.login_form;
            let credentials = Credentials {
                email: form.value("email").trim().to_string(),
                password: form.value("password").to_string(),
            };
            match validate_login(&credentials) {
                Ok(()) => {
                    form.errors = Default::default();
                    state.busy = true;
                    state.message = "Logging in...".to_string();
                    Some(Action::Login(credentials))
                }
                Err(errors) => {
                    form.errors = errors;
                    None
                }
            }
        }
    }
}

fn handle_register_keys(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('l') {
        return state.go(Route::Login);
    }
    match edit_form(&mut state.register_form, key) {
        FormInput::Cancel => state.go(Route::Login),
        FormInput::Edited => None,
        FormInput::Submit => {
            if state.busy {
                return None;
            }
            let form = &mut state.register_form;
            let registration = Registration {
                name: form.value("name").trim().to_string(),
                email: form.value("email").trim().to_string(),
                password: form.value("password").to_string(),
            };
            match validate_registration(&registration, form.value("confirm_password")) {
                Ok(()) => {
                    form.errors = Default::default();
                    state.busy = true;
                    state.message = "Creating account...".to_string();
                    Some(Action::Register(registration))
                }
                Err(errors) => {
                    form.errors = errors;
                    None
                }
            }
        }
    }
}

fn handle_dashboard_keys(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    // Dialogs take all input while open.
    match &mut state.overlay {
        Overlay::None => {}
        Overlay::AddTask(form) => {
            return match edit_form(form, key) {
                FormInput::Cancel => {
                    state.overlay = Overlay::None;
                    None
                }
                FormInput::Edited => None,
                FormInput::Submit if state.busy => None,
                FormInput::Submit => {
                    let task = NewTask {
                        title: form.value("title").trim().to_string(),
                        description: form.value("description").trim().to_string(),
                    };
                    match validate_new_task(&task) {
                        Ok(()) => {
                            state.busy = true;
                            Some(Action::CreateTask(task))
                        }
                        Err(errors) => {
                            form.errors = errors;
                            None
                        }
                    }
                }
            };
        }
        Overlay::EditTask { id, form } => {
            return match edit_form(form, key) {
                FormInput::Cancel => {
                    state.overlay = Overlay::None;
                    None
                }
                FormInput::Edited => None,
                FormInput::Submit if state.busy => None,
                FormInput::Submit => {
                    let update = TaskUpdate {
                        title: form.value("title").trim().to_string(),
                        description: form.value("description").trim().to_string(),
                        completed: form.checked("completed"),
                    };
                    match validate_task_update(&update) {
                        Ok(()) => {
                            let id = id.clone();
                            state.busy = true;
                            Some(Action::UpdateTask(id, update))
                        }
                        Err(errors) => {
                            form.errors = errors;
                            None
                        }
                    }
                }
            };
        }
        Overlay::ConfirmDelete { id, .. } => {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Enter if !state.busy => {
                    let id = id.clone();
                    state.busy = true;
                    Some(Action::DeleteTask(id))
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    state.overlay = Overlay::None;
                    None
                }
                _ => None,
            };
        }
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => {
            state.show_full_help = !state.show_full_help;
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.next();
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.previous();
            None
        }
        KeyCode::Char('a') => {
            state.overlay = Overlay::AddTask(Form::new_task());
            None
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            let task = state.selected_task()?;
            state.overlay = Overlay::EditTask {
                id: task.id.clone(),
                form: Form::edit_task(task),
            };
            None
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            let task = state.selected_task()?;
            state.overlay = Overlay::ConfirmDelete {
                id: task.id.clone(),
                title: task.title.clone(),
            };
            None
        }
        KeyCode::Char(' ') => {
            if state.busy {
                return None;
            }
            let task = state.selected_task()?;
            let update = TaskUpdate {
                completed: !task.completed,
                ..task.to_update()
            };
            let id = task.id.clone();
            state.busy = true;
            Some(Action::UpdateTask(id, update))
        }
        KeyCode::Right | KeyCode::Char('n') => state.board.next_page().map(Action::LoadPage),
        KeyCode::Left | KeyCode::Char('p') => state.board.previous_page().map(Action::LoadPage),
        KeyCode::Char('r') => Some(Action::LoadPage(state.board.refresh())),
        KeyCode::Char('P') => state.go(Route::Profile),
        KeyCode::Char('L') => Some(Action::Logout),
        _ => None,
    }
}

fn handle_profile_keys(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    if let Some(form) = &mut state.profile_form {
        return match edit_form(form, key) {
            FormInput::Cancel => {
                state.profile.cancel_edit();
                state.profile_form = None;
                None
            }
            FormInput::Edited => None,
            FormInput::Submit if state.busy => None,
            FormInput::Submit => {
                if let Some(draft) = state.profile.draft_mut() {
                    draft.name = form.value("name").to_string();
                    draft.email = form.value("email").to_string();
                    draft.password = form.value("password").to_string();
                }
                match state.profile.submit() {
                    Some(Ok(update)) => {
                        form.errors = Default::default();
                        state.busy = true;
                        Some(Action::UpdateProfile(update))
                    }
                    Some(Err(errors)) => {
                        form.errors = errors;
                        None
                    }
                    None => None,
                }
            }
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => {
            state.show_full_help = !state.show_full_help;
            None
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if state.profile.begin_edit()
                && let Some(draft) = state.profile.draft()
            {
                state.profile_form = Some(Form::profile(draft));
            }
            None
        }
        KeyCode::Char('r') => state.go(Route::Profile),
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('D') => state.go(Route::Dashboard),
        KeyCode::Char('L') => Some(Action::Logout),
        _ => None,
    }
}
