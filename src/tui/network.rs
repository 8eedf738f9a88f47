// Runs API calls off the UI thread and reports back as AppEvents.
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::tui::action::{Action, AppEvent};
use tokio::sync::mpsc::{Receiver, Sender};

async fn report_always(event_tx: &Sender<AppEvent>, err: &ApiError, fallback: &str) {
    log::warn!("{}: {}", fallback, err);
    let _ = event_tx.send(AppEvent::Error(err.message_or(fallback))).await;
}

/// A 401 already produced `SessionExpired` through the client hook,
/// so it is not reported a second time as an error toast.
async fn report(event_tx: &Sender<AppEvent>, err: &ApiError, fallback: &str) {
    if !err.is_unauthorized() {
        report_always(event_tx, err, fallback).await;
    }
}

pub async fn run_network_actor(
    api: ApiClient,
    mut action_rx: Receiver<Action>,
    event_tx: Sender<AppEvent>,
) {
    log::info!("Network actor started against {}", api.base_url());

    while let Some(action) = action_rx.recv().await {
        match action {
            Action::Quit => break,

            Action::Login(credentials) => match api.sign_in(&credentials).await {
                Ok(()) => {
                    let _ = event_tx.send(AppEvent::LoggedIn).await;
                }
                // A 401 here means bad credentials.
                Err(e) => report_always(&event_tx, &e, "Login failed").await,
            },

            Action::Register(registration) => match api.register(&registration).await {
                Ok(()) => {
                    let _ = event_tx.send(AppEvent::Registered).await;
                }
                Err(e) => report_always(&event_tx, &e, "Registration failed").await,
            },

            // Page fetches run concurrently; the board's ticket decides which one wins.
            Action::LoadPage(req) => {
                let api = api.clone();
                let tx = event_tx.clone();
                tokio::spawn(async move {
                    let result = api.list_tasks(req.page, req.limit).await;
                    let _ = tx
                        .send(AppEvent::PageLoaded {
                            seq: req.seq,
                            result,
                        })
                        .await;
                });
            }

            Action::CreateTask(task) => match api.create_task(&task).await {
                Ok(created) => {
                    let _ = event_tx.send(AppEvent::TaskCreated(created)).await;
                }
                // The add form never showed server messages.
                Err(e) if e.is_unauthorized() => {}
                Err(e) => {
                    log::warn!("Failed to add task: {}", e);
                    let _ = event_tx
                        .send(AppEvent::Error("Failed to add task".to_string()))
                        .await;
                }
            },

            Action::UpdateTask(id, update) => match api.update_task(&id, &update).await {
                Ok(_) => {
                    let _ = event_tx.send(AppEvent::TaskUpdated).await;
                }
                Err(e) if e.is_unauthorized() => {}
                Err(e) => {
                    log::warn!("Failed to update task {}: {}", id, e);
                    let _ = event_tx
                        .send(AppEvent::Error("Failed to update task".to_string()))
                        .await;
                }
            },

            Action::DeleteTask(id) => match api.delete_task(&id).await {
                Ok(()) => {
                    let _ = event_tx.send(AppEvent::TaskDeleted).await;
                }
                Err(e) if e.is_unauthorized() => {}
                Err(e) => {
                    log::warn!("Failed to delete task {}: {}", id, e);
                    let _ = event_tx
                        .send(AppEvent::Error("Failed to delete task".to_string()))
                        .await;
                }
            },

            Action::LoadProfile => {
                let result = api.get_profile().await;
                let _ = event_tx.send(AppEvent::ProfileLoaded(result)).await;
            }

            Action::UpdateProfile(update) => match api.update_profile(&update).await {
                Ok(echoed) => {
                    let _ = event_tx.send(AppEvent::ProfileUpdated(update, echoed)).await;
                }
                Err(e) => report(&event_tx, &e, "Failed to update profile").await,
            },

            Action::Logout => {
                if let Err(e) = api.sign_out() {
                    log::error!("Could not clear session: {}", e);
                }
                let _ = event_tx.send(AppEvent::LoggedOut).await;
            }
        }
    }

    log::info!("Network actor stopped");
}
