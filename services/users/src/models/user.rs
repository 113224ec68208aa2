//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::ValidatedUser;

/// User entity
///
/// `password` holds the one-way hash once the record went through
/// [`before_save`](crate::password::before_save). While `password_modified`
/// is set it holds a plaintext that has not been hashed yet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub watch_history: Vec<Uuid>,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    #[sqlx(skip)]
    pub(crate) password_modified: bool,
}

impl User {
    /// Build a fresh record from validated registration input
    ///
    /// The password is marked as modified so the first save hashes it.
    pub fn new(validated: ValidatedUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: validated.username,
            email: validated.email,
            full_name: validated.full_name,
            avatar: validated.avatar,
            cover_image: validated.cover_image,
            watch_history: Vec::new(),
            password: validated.password,
            refresh_token: None,
            created_at: now,
            updated_at: now,
            password_modified: true,
        }
    }

    /// Replace the password with a new plaintext, to be hashed on save
    pub fn set_password(&mut self, plaintext: impl Into<String>) {
        self.password = plaintext.into();
        self.password_modified = true;
    }

    /// Whether the password changed since the record was last saved
    pub fn is_password_modified(&self) -> bool {
        self.password_modified
    }

    /// Copy the fields present in a profile edit onto the record
    ///
    /// An empty `cover_image` clears the cover; a new password is marked
    /// for hashing on the next save.
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(full_name) = update.full_name {
            self.full_name = full_name;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
        if let Some(cover_image) = update.cover_image {
            self.cover_image = Some(cover_image).filter(|c| !c.is_empty());
        }
        if let Some(password) = update.password {
            self.set_password(password);
        }
    }

    /// Append a watched video, keeping the viewing order
    pub fn push_watch_history(&mut self, video_id: Uuid) {
        self.watch_history.push(video_id);
    }
}

/// New user registration payload, before normalization and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub password: String,
}

/// Profile edit payload
///
/// `None` leaves a field unchanged. `cover_image: Some("")` removes the cover.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub password: Option<String>,
}

/// User login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username_or_email: String,
    pub password: String,
}
