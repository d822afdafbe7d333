//! Credential lookups used by the access gate.
//!
//! [`CredentialStore`] is the seam the gate depends on; [`SeaOrmCredentialStore`]
//! is the database implementation over the `users` and `user_details` tables.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use password_hash::{PasswordHash, SaltString};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use thiserror::Error;

use crate::entity::{user, user_detail};
use crate::principal::{Principal, PrincipalId, Role};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential store unavailable: {0}")]
    Database(#[from] DbErr),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored role for '{login}' is invalid: {role}")]
    InvalidRole { login: String, role: String },
}

/// Lookup contract consumed by [`crate::AccessGate`].
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, CredentialError>;

    /// Returns the principal only when `password` matches the stored hash.
    async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<Principal>, CredentialError>;
}

/// Input for [`SeaOrmCredentialStore::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub firstname: String,
    pub surname: String,
    pub email: String,
    pub login: String,
    pub password: String,
    /// `None` falls back to [`Role::default_for_login`].
    pub role: Option<Role>,
}

#[derive(Debug, Clone)]
pub struct SeaOrmCredentialStore {
    conn: DatabaseConnection,
}

impl SeaOrmCredentialStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates a user and its credential row in one transaction.
    pub async fn register(&self, account: NewAccount) -> Result<Principal, CredentialError> {
        let role = account
            .role
            .unwrap_or_else(|| Role::default_for_login(&account.login));
        let password_hash = hash_password(&account.password)?;

        let txn = self.conn.begin().await?;
        let person = user::ActiveModel {
            firstname: Set(account.firstname),
            surname: Set(account.surname),
            email: Set(account.email),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let detail = user_detail::ActiveModel {
            login: Set(account.login),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            user_id: Set(person.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(login = %detail.login, role = %role, "account registered");
        build_principal(detail, person)
    }

    /// Every account, ordered by login.
    pub async fn list(&self) -> Result<Vec<Principal>, CredentialError> {
        use sea_orm::QueryOrder;

        let rows = user_detail::Entity::find()
            .find_also_related(user::Entity)
            .order_by_asc(user_detail::Column::Login)
            .all(&self.conn)
            .await?;

        let mut principals = Vec::with_capacity(rows.len());
        for (detail, person) in rows {
            if let Some(principal) = principal_from(detail, person)? {
                principals.push(principal);
            }
        }
        Ok(principals)
    }
}

#[async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, CredentialError> {
        let Some((detail, person)) = user_detail::Entity::find_by_id(id.get())
            .find_also_related(user::Entity)
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };
        principal_from(detail, person)
    }

    async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<Principal>, CredentialError> {
        let Some((detail, person)) = user_detail::Entity::find()
            .filter(user_detail::Column::Login.eq(login))
            .find_also_related(user::Entity)
            .one(&self.conn)
            .await?
        else {
            tracing::debug!(login, "unknown login");
            return Ok(None);
        };

        if !verify_password(&detail.password_hash, password) {
            tracing::debug!(login, "password mismatch");
            return Ok(None);
        }
        principal_from(detail, person)
    }
}

// A credential row whose user row is gone does not authenticate.
fn principal_from(
    detail: user_detail::Model,
    person: Option<user::Model>,
) -> Result<Option<Principal>, CredentialError> {
    let Some(person) = person else {
        tracing::warn!(login = %detail.login, "credential row without user");
        return Ok(None);
    };
    build_principal(detail, person).map(Some)
}

fn build_principal(
    detail: user_detail::Model,
    person: user::Model,
) -> Result<Principal, CredentialError> {
    let role = detail
        .role
        .parse::<Role>()
        .map_err(|_| CredentialError::InvalidRole {
            login: detail.login.clone(),
            role: detail.role.clone(),
        })?;

    Ok(Principal {
        id: PrincipalId::new(detail.id),
        user_id: person.id,
        display_name: person.display_name(),
        login: detail.login,
        role,
    })
}

pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| CredentialError::Hash(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// An unparsable stored hash never verifies.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
