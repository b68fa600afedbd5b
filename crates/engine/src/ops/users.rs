use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, User, users, util::normalize_required_text};

use super::Engine;

impl Engine {
    /// Registers a user. The email is stored lower-cased and must be unique.
    pub async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> ResultEngine<User> {
        let email = normalize_required_text(email, "email")?.to_lowercase();
        let display_name = normalize_required_text(display_name, "display name")?;
        let db = self.db().await?;

        if users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(db)
            .await?
            .is_some()
        {
            return Err(EngineError::ExistingKey(email));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash: password_hash.to_string(),
            display_name,
            created_at: Utc::now(),
        };
        users::ActiveModel::from(&user).insert(db).await?;
        tracing::info!(user_id = %user.id, "user created");

        Ok(user)
    }

    /// Looks a user up by id.
    pub async fn user(&self, user_id: &str) -> ResultEngine<Option<User>> {
        Ok(users::Entity::find_by_id(user_id.to_string())
            .one(self.db().await?)
            .await?
            .map(User::from))
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db().await?)
            .await?
            .map(User::from))
    }

    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(self.db().await?)
            .await?
            .into_iter()
            .map(User::from)
            .collect())
    }
}
