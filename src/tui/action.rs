// Messages between the UI loop and the network actor.
use crate::board::PageRequest;
use crate::error::ApiError;
use crate::model::{
    Credentials, NewTask, ProfileFields, ProfileUpdate, Registration, Task, TaskPage, TaskUpdate,
    UserProfile,
};

#[derive(Debug)]
pub enum Action {
    Login(Credentials),
    Register(Registration),
    LoadPage(PageRequest),
    CreateTask(NewTask),
    UpdateTask(String, TaskUpdate),
    DeleteTask(String),
    LoadProfile,
    UpdateProfile(ProfileUpdate),
    Logout,
    Quit,
}

#[derive(Debug)]
pub enum AppEvent {
    LoggedIn,
    Registered,
    PageLoaded {
        seq: u64,
        result: Result<TaskPage, ApiError>,
    },
    TaskCreated(Task),
    TaskUpdated,
    TaskDeleted,
    ProfileLoaded(Result<UserProfile, ApiError>),
    /// What was sent, and what the server echoed back.
    ProfileUpdated(ProfileUpdate, ProfileFields),
    /// Fired by the client's 401 hook.
    SessionExpired,
    LoggedOut,
    Error(String),
}
