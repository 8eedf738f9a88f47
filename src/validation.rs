// File: ./src/validation.rs
//! Client-side form checks. A form with errors never reaches the network.
use crate::model::{Credentials, NewTask, ProfileUpdate, Registration, TaskUpdate};
use std::fmt;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Errors for one form, in field order. At most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: &'static str) {
        if self.get(field).is_none() {
            self.0.push(FieldError { field, message });
        }
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msgs: Vec<&str> = self.0.iter().map(|e| e.message).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Loose `local@domain.tld` check; the server has the final word.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.ends_with('.'),
        None => false,
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Invalid email");
    }
}

pub fn validate_login(c: &Credentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, &c.email);
    if c.password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}

pub fn validate_registration(r: &Registration, confirm_password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if r.name.trim().is_empty() {
        errors.add("name", "Name is required");
    }
    check_email(&mut errors, &r.email);
    if r.password.is_empty() {
        errors.add("password", "Password is required");
    } else if r.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 6 characters");
    }
    if confirm_password.is_empty() {
        errors.add("confirm_password", "Confirm Password is required");
    } else if confirm_password != r.password {
        errors.add("confirm_password", "Passwords must match");
    }
    errors.into_result()
}

pub fn validate_new_task(t: &NewTask) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if t.title.trim().is_empty() {
        errors.add("title", "Title is required");
    }
    errors.into_result()
}

pub fn validate_task_update(t: &TaskUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if t.title.trim().is_empty() {
        errors.add("title", "Title is required");
    }
    errors.into_result()
}

/// Name and email are required on the edit form; the password only when changing it.
pub fn validate_profile_update(p: &ProfileUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    match p.name.as_deref() {
        Some(name) if !name.trim().is_empty() => {}
        _ => errors.add("name", "Name is required"),
    }
    check_email(&mut errors, p.email.as_deref().unwrap_or(""));
    if let Some(pw) = &p.password
        && pw.chars().count() < MIN_PASSWORD_LEN
    {
        errors.add("password", "Password must be at least 6 characters");
    }
    errors.into_result()
}
