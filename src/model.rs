// File: ./src/model.rs
// Wire and view types exchanged with the task API.
use serde::{Deserialize, Serialize};

/// A task as owned by the server. The client only ever holds a cached page of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    // MongoDB-backed servers send `_id`; others send `id`.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Pre-fills an edit form the way the edit dialog expects it.
    pub fn to_update(&self) -> TaskUpdate {
        TaskUpdate {
            title: self.title.clone(),
            description: self.description_text().to_string(),
            completed: self.completed,
        }
    }
}

/// One page of tasks as returned by `GET /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    #[serde(rename = "tasks", default)]
    pub items: Vec<Task>,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

/// Body of `PUT /tasks/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    pub title: String,
    pub description: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`. The confirmation field never leaves the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Read copy of `GET /users/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl UserProfile {
    /// Overlays whichever fields are present.
    pub fn merge(&mut self, fields: &ProfileFields) {
        if let Some(name) = &fields.name {
            self.name = name.clone();
        }
        if let Some(email) = &fields.email {
            self.email = email.clone();
        }
    }
}

/// Body of `PUT /users/me`. Absent fields are left out of the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProfileUpdate {
    /// The readable part of the update; the password is write-only.
    pub fn visible_fields(&self) -> ProfileFields {
        ProfileFields {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Fields echoed back by `PUT /users/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
