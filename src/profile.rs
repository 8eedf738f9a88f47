// File: ./src/profile.rs
// Profile screen state: the server's read copy plus an edit draft.
use crate::board::LoadState;
use crate::error::ApiError;
use crate::model::{ProfileFields, ProfileUpdate, UserProfile};
use crate::validation::{ValidationErrors, validate_profile_update};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
    /// Empty means "keep the current password".
    pub password: String,
}

impl ProfileDraft {
    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            name: Some(self.name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    user: Option<UserProfile>,
    draft: Option<ProfileDraft>,
    state: LoadState,
}

impl ProfileState {
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn draft(&self) -> Option<&ProfileDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ProfileDraft> {
        self.draft.as_mut()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    pub fn finish_load(&mut self, result: Result<UserProfile, ApiError>) {
        match result {
            Ok(user) => {
                self.user = Some(user);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                self.state = LoadState::Errored(e.message_or("Failed to load profile"));
            }
        }
    }

    /// Opens the editor pre-filled from the read copy. No-op before the profile has loaded.
    pub fn begin_edit(&mut self) -> bool {
        let Some(user) = &self.user else {
            return false;
        };
        self.draft = Some(ProfileDraft {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
        });
        true
    }

    pub fn cancel_edit(&mut self) {
        self.draft = None;
    }

    /// Validates the draft and returns the request body to send.
    pub fn submit(&self) -> Option<Result<ProfileUpdate, ValidationErrors>> {
        let draft = self.draft.as_ref()?;
        let update = draft.to_update();
        Some(validate_profile_update(&update).map(|_| update))
    }

    /// Merges what was submitted, then whatever the server echoed back, and closes the editor.
    pub fn apply_update(&mut self, submitted: &ProfileUpdate, echoed: &ProfileFields) {
        let user = self.user.get_or_insert_with(UserProfile::default);
        user.merge(&submitted.visible_fields());
        user.merge(echoed);
        self.draft = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> ProfileState {
        let mut p = ProfileState::default();
        p.begin_load();
        p.finish_load(Ok(UserProfile {
            name: "Ann".into(),
            email: "ann@example.com".into(),
        }));
        p
    }

    #[test]
    fn cannot_edit_before_load() {
        let mut p = ProfileState::default();
        assert!(!p.begin_edit());
        assert!(p.submit().is_none());
    }

    #[test]
    fn blank_password_is_not_sent() {
        let mut p = loaded();
        assert!(p.begin_edit());
        let update = p.submit().unwrap().unwrap();
        assert_eq!(update.password, None);
        assert_eq!(update.name.as_deref(), Some("Ann"));
    }

    #[test]
    fn apply_update_merges_and_closes_editor() {
        let mut p = loaded();
        p.begin_edit();
        let draft = p.draft_mut().unwrap();
        draft.name = "Annie".into();
        draft.password = "secret1".into();
        let update = p.submit().unwrap().unwrap();
        p.apply_update(&update, &ProfileFields::default());

        assert!(!p.is_editing());
        assert_eq!(p.user().unwrap().name, "Annie");
        assert_eq!(p.user().unwrap().email, "ann@example.com");
    }

    #[test]
    fn load_error_keeps_server_message() {
        let mut p = ProfileState::default();
        p.finish_load(Err(ApiError::Rejected {
            status: 404,
            message: Some("User not found".into()),
        }));
        assert_eq!(p.state(), &LoadState::Errored("User not found".into()));

        p.finish_load(Err(ApiError::Network("refused".into())));
        assert_eq!(p.state(), &LoadState::Errored("Failed to load profile".into()));
    }
}
