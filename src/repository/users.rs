//! Patron repository

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::user::User,
    store::{views::USERS_BY_ID, Store, Value},
};

#[derive(Clone)]
pub struct UsersRepository {
    store: Arc<dyn Store>,
}

impl UsersRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Register a patron: generated id, current registration timestamp,
    /// both borrow counters at zero. Email uniqueness is not enforced.
    pub async fn create(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        phone: &str,
        address: &str,
    ) -> AppResult<User> {
        let user = User {
            user_id: Uuid::new_v4(),
            email: email.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            phone: phone.to_owned(),
            address: address.to_owned(),
            registration_date: Utc::now(),
            total_borrows: 0,
            active_borrows: 0,
        };

        self.store
            .upsert(
                &USERS_BY_ID,
                &[Value::Uuid(user.user_id)],
                &[
                    ("email", Value::text(user.email.as_str())),
                    ("first_name", Value::text(user.first_name.as_str())),
                    ("last_name", Value::text(user.last_name.as_str())),
                    ("phone", Value::text(user.phone.as_str())),
                    ("address", Value::text(user.address.as_str())),
                    ("registration_date", Value::Timestamp(user.registration_date)),
                    ("total_borrows", Value::Int(0)),
                    ("active_borrows", Value::Int(0)),
                ],
            )
            .await?;

        tracing::info!(user_id = %user.user_id, "user registered");
        Ok(user)
    }

    /// Point read; an absent id is `None`, not a fault.
    pub async fn get_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = self.store.get(&USERS_BY_ID, &[Value::Uuid(user_id)]).await?;
        Ok(row.as_ref().map(User::from_row).transpose()?)
    }
}
