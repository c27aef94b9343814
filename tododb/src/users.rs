//! Accounts: registration, password login and Google sign-in.

use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr};

use crate::connection::TodoDb;
use crate::contract::Credentials;
use crate::entity::user;
use crate::error::{Result, TodoError};
use crate::google::ExternalIdentity;
use crate::password::{hash_password, verify_against_dummy, verify_password};

#[derive(Clone)]
pub struct UserStore {
    db: TodoDb,
}

impl UserStore {
    pub fn new(db: TodoDb) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: i32) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(self.db.inner()).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.inner())
            .await?;
        Ok(found)
    }

    /// Create a password account. The username is trimmed and must be unused.
    pub async fn register(&self, credentials: &Credentials) -> Result<user::Model> {
        let username = credentials.username.trim();
        if username.is_empty() {
            return Err(TodoError::validation("username is required"));
        }
        if credentials.password.is_empty() {
            return Err(TodoError::validation("password is required"));
        }
        if self.find_by_username(username).await?.is_some() {
            return Err(username_taken());
        }

        let new_user = user::ActiveModel {
            username: Set(Some(username.to_string())),
            password_hash: Set(Some(hash_password(&credentials.password)?)),
            ..Default::default()
        };

        // The unique index still decides when two registrations race.
        let created = new_user.insert(self.db.inner()).await.map_err(|e| {
            if is_unique_violation(&e) {
                username_taken()
            } else {
                TodoError::Database(e)
            }
        })?;

        log::info!("Registered user {}", created.id);
        Ok(created)
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames, accounts without a password and wrong passwords all
    /// produce [`TodoError::InvalidCredentials`], and all of them pay for one
    /// argon2 verification.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<user::Model> {
        let username = credentials.username.trim();
        if username.is_empty() || credentials.password.is_empty() {
            return Err(TodoError::InvalidCredentials);
        }

        let Some(user) = self.find_by_username(username).await? else {
            verify_against_dummy(&credentials.password)?;
            log::debug!("Login failed: no such user");
            return Err(TodoError::InvalidCredentials);
        };
        let Some(hash) = user.password_hash.as_deref() else {
            verify_against_dummy(&credentials.password)?;
            log::debug!("Login failed: user {} has no password", user.id);
            return Err(TodoError::InvalidCredentials);
        };

        if !verify_password(&credentials.password, hash)? {
            log::debug!("Login failed: wrong password for user {}", user.id);
            return Err(TodoError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Resolve an externally verified identity to a local account.
    ///
    /// Looks up by email first, then by Google id. An email match without a
    /// Google id gets this one linked. Otherwise a password-less account is
    /// provisioned.
    pub async fn sign_in_with_google(&self, identity: &ExternalIdentity) -> Result<user::Model> {
        if identity.subject.is_empty() {
            return Err(TodoError::Identity("missing subject".to_string()));
        }
        let conn = self.db.inner();

        if let Some(email) = identity.email.as_deref() {
            let by_email = user::Entity::find()
                .filter(user::Column::Email.eq(email))
                .one(conn)
                .await?;

            if let Some(existing) = by_email {
                let linked_google_id = existing.google_id.clone();
                match linked_google_id.as_deref() {
                    None => {
                        let id = existing.id;
                        let mut active: user::ActiveModel = existing.into();
                        active.google_id = Set(Some(identity.subject.clone()));
                        let linked = active.update(conn).await?;
                        log::info!("Linked Google account to user {id}");
                        return Ok(linked);
                    }
                    Some(google_id) if google_id == identity.subject => return Ok(existing),
                    // Same email, different Google account: fall through to the id lookup.
                    Some(_) => {}
                }
            }
        }

        if let Some(existing) = self.find_by_google_id(&identity.subject).await? {
            return Ok(existing);
        }

        self.provision_google_user(identity).await
    }

    async fn find_by_google_id(&self, subject: &str) -> Result<Option<user::Model>> {
        let found = user::Entity::find()
            .filter(user::Column::GoogleId.eq(subject))
            .one(self.db.inner())
            .await?;
        Ok(found)
    }

    async fn provision_google_user(&self, identity: &ExternalIdentity) -> Result<user::Model> {
        let new_user = user::ActiveModel {
            google_id: Set(Some(identity.subject.clone())),
            email: Set(identity.email.clone()),
            ..Default::default()
        };

        match new_user.insert(self.db.inner()).await {
            Ok(created) => {
                log::info!("Provisioned user {} from Google sign-in", created.id);
                Ok(created)
            }
            // A concurrent first sign-in with the same subject won the insert.
            Err(e) if is_unique_violation(&e) => self
                .find_by_google_id(&identity.subject)
                .await?
                .ok_or(TodoError::Database(e)),
            Err(e) => Err(TodoError::Database(e)),
        }
    }
}

fn username_taken() -> TodoError {
    TodoError::Conflict("username already exists".to_string())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
