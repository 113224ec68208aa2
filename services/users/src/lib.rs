//! User accounts for the Vidtube backend
//!
//! Validation of registration and profile input, password hashing on save,
//! password checks and access/refresh token issuance, plus a PostgreSQL
//! repository for the `users` table.

pub mod error;
pub mod jwt;
pub mod models;
pub mod password;
pub mod repositories;
pub mod validation;

pub use error::{PasswordError, RepositoryError, Rule, TokenError, ValidationError};
pub use jwt::{
    AccessClaims, RefreshClaims, TokenConfig, TokenPair, decode_access_token,
    decode_refresh_token, generate_access_token, generate_refresh_token, issue_token_pair,
};
pub use models::{LoginCredentials, NewUser, UpdateUser, User};
pub use password::{before_save, hash_password, is_password_correct};
pub use repositories::UserRepository;
pub use validation::{ValidatedUser, validate, validate_update};
