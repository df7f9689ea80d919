//! Patron management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::User,
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn register(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        phone: &str,
        address: &str,
    ) -> AppResult<User> {
        self.repository
            .users
            .create(email, first_name, last_name, phone, address)
            .await
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.repository.users.get_by_id(user_id).await
    }

    /// Patron lookup where absence is an error for the caller's flow.
    pub async fn require_user(&self, user_id: Uuid) -> AppResult<User> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))
    }
}
