// Minimal single-line form widget state: text, secret and checkbox fields.
use crate::model::Task;
use crate::profile::ProfileDraft;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Rendered as bullets.
    Secret,
    Checkbox,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub checked: bool,
    pub cursor: usize,
}

impl Field {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            value: String::new(),
            checked: false,
            cursor: 0,
        }
    }

    fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.cursor = self.value.chars().count();
        self
    }

    /// What the view shows for this field.
    pub fn display(&self) -> String {
        match self.kind {
            FieldKind::Text => self.value.clone(),
            FieldKind::Secret => "•".repeat(self.value.chars().count()),
            FieldKind::Checkbox => {
                if self.checked {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    pub title: &'static str,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub errors: ValidationErrors,
}

impl Form {
    fn new(title: &'static str, fields: Vec<Field>) -> Self {
        Self {
            title,
            fields,
            focus: 0,
            errors: ValidationErrors::default(),
        }
    }

    pub fn login() -> Self {
        Self::new(
            "Login",
            vec![
                Field::new("email", "Email", FieldKind::Text),
                Field::new("password", "Password", FieldKind::Secret),
            ],
        )
    }

    pub fn register() -> Self {
        Self::new(
            "Register",
            vec![
                Field::new("name", "Name", FieldKind::Text),
                Field::new("email", "Email", FieldKind::Text),
                Field::new("password", "Password", FieldKind::Secret),
                Field::new("confirm_password", "Confirm Password", FieldKind::Secret),
            ],
        )
    }

    pub fn new_task() -> Self {
        Self::new(
            "Add New Task",
            vec![
                Field::new("title", "Title", FieldKind::Text),
                Field::new("description", "Description", FieldKind::Text),
            ],
        )
    }

    pub fn edit_task(task: &Task) -> Self {
        let mut completed = Field::new("completed", "Completed", FieldKind::Checkbox);
        completed.checked = task.completed;
        Self::new(
            "Edit Task",
            vec![
                Field::new("title", "Title", FieldKind::Text).with_value(&task.title),
                Field::new("description", "Description", FieldKind::Text)
                    .with_value(task.description_text()),
                completed,
            ],
        )
    }

    pub fn profile(draft: &ProfileDraft) -> Self {
        Self::new(
            "Edit Profile",
            vec![
                Field::new("name", "Name", FieldKind::Text).with_value(&draft.name),
                Field::new("email", "Email", FieldKind::Text).with_value(&draft.email),
                Field::new("password", "New Password (optional)", FieldKind::Secret),
            ],
        )
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn checked(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key && f.checked)
    }

    pub fn error_for(&self, key: &str) -> Option<&'static str> {
        self.errors.get(key)
    }

    pub fn focused(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    // --- INPUT HELPERS ---
    pub fn enter_char(&mut self, c: char) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        if field.kind == FieldKind::Checkbox {
            if c == ' ' {
                field.checked = !field.checked;
            }
            return;
        }
        let byte_index = field
            .value
            .char_indices()
            .map(|(i, _)| i)
            .nth(field.cursor)
            .unwrap_or(field.value.len());
        field.value.insert(byte_index, c);
        field.cursor += 1;
    }

    pub fn delete_char(&mut self) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        if field.cursor == 0 || field.kind == FieldKind::Checkbox {
            return;
        }
        let before = field.value.chars().take(field.cursor - 1);
        let after = field.value.chars().skip(field.cursor);
        field.value = before.chain(after).collect();
        field.cursor -= 1;
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.cursor = field.cursor.saturating_sub(1);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.cursor = (field.cursor + 1).min(field.value.chars().count());
        }
    }

    /// Clears secrets, keeps the rest. Used after a failed submit.
    pub fn clear_secrets(&mut self) {
        for field in &mut self.fields {
            if field.kind == FieldKind::Secret {
                field.value.clear();
                field.cursor = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_respects_cursor_and_utf8() {
        let mut form = Form::new_task();
        for c in "héllo".chars() {
            form.enter_char(c);
        }
        form.move_cursor_left();
        form.move_cursor_left();
        form.delete_char();
        assert_eq!(form.value("title"), "hélo");

        for _ in 0..10 {
            form.move_cursor_right();
        }
        assert_eq!(form.fields[0].cursor, 4);
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = Form::login();
        form.previous_field();
        assert_eq!(form.focused().map(|f| f.key), Some("password"));
        form.next_field();
        assert_eq!(form.focused().map(|f| f.key), Some("email"));
    }

    #[test]
    fn checkbox_toggles_on_space_only() {
        let task = Task {
            id: "1".into(),
            title: "T".into(),
            description: None,
            completed: false,
        };
        let mut form = Form::edit_task(&task);
        form.focus = 2;
        form.enter_char('x');
        assert!(!form.checked("completed"));
        form.enter_char(' ');
        assert!(form.checked("completed"));
        assert_eq!(form.value("title"), "T");
    }

    #[test]
    fn secrets_are_masked_and_cleared() {
        let mut form = Form::login();
        form.focus = 1;
        form.enter_char('a');
        form.enter_char('b');
        assert_eq!(form.fields[1].display(), "••");
        form.clear_secrets();
        assert_eq!(form.value("password"), "");
    }
}
