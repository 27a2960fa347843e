//! In-memory stores.
//!
//! Used by the test suites and for running the API without a database.
//! Each store enforces the same uniqueness and not-found rules as its
//! `PostgreSQL` counterpart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use stockroom_core::{Email, ItemId, UserId};

use super::RepositoryError;
use super::store::{CredentialStore, ItemStore, TokenBlacklist};
use crate::models::item::{Item, ItemFields};
use crate::models::user::{NewUser, User};

/// In-memory [`CredentialStore`].
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<Vec<(User, String)>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|(user, _)| user.id == id)
            .map(|(user, _)| user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|(user, _)| &user.email == email).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|(user, _)| user.username.as_str() == username)
            .cloned())
    }

    async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.iter().any(|(user, _)| user.username == new.username) {
            return Err(RepositoryError::Conflict("username".to_owned()));
        }
        if users.iter().any(|(user, _)| user.email == new.email) {
            return Err(RepositoryError::Conflict("email".to_owned()));
        }

        let next_id = users
            .iter()
            .map(|(user, _)| user.id.into_inner())
            .max()
            .unwrap_or(0)
            + 1;
        let user = User {
            id: UserId::new(next_id),
            username: new.username.clone(),
            email: new.email.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            date_joined: Utc::now(),
        };
        users.push((user.clone(), new.password_hash.clone()));
        Ok(user)
    }
}

/// In-memory [`ItemStore`]. Keeps items in insertion order.
#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<Item>>,
}

impl MemoryItemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        Ok(self.items.read().await.clone())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.iter().any(|item| item.name == name))
    }

    async fn create(&self, fields: &ItemFields) -> Result<Item, RepositoryError> {
        let mut items = self.items.write().await;
        if items.iter().any(|item| item.name == fields.name) {
            return Err(RepositoryError::Conflict("name".to_owned()));
        }

        let now = Utc::now();
        let item = Item {
            id: ItemId::generate(),
            name: fields.name.clone(),
            description: fields.description.clone(),
            quantity: fields.quantity,
            price: fields.price,
            created_at: now,
            updated_at: now,
        };
        items.push(item.clone());
        Ok(item)
    }

    async fn update(&self, id: ItemId, fields: &ItemFields) -> Result<Item, RepositoryError> {
        let mut items = self.items.write().await;
        if items
            .iter()
            .any(|item| item.id != id && item.name == fields.name)
        {
            return Err(RepositoryError::Conflict("name".to_owned()));
        }

        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(RepositoryError::NotFound)?;
        item.name.clone_from(&fields.name);
        item.description.clone_from(&fields.description);
        item.quantity = fields.quantity;
        item.price = fields.price;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, id: ItemId) -> Result<(), RepositoryError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// In-memory [`TokenBlacklist`].
#[derive(Default)]
pub struct MemoryTokenBlacklist {
    revoked: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryTokenBlacklist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenBlacklist for MemoryTokenBlacklist {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.revoked
            .write()
            .await
            .entry(jti.to_owned())
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, RepositoryError> {
        Ok(self.revoked.read().await.contains_key(jti))
    }

    async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let now = Utc::now();
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at >= now);
        Ok((before - revoked.len()) as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;
    use stockroom_core::{Price, Quantity, Username};

    use super::*;

    fn fields(name: &str) -> ItemFields {
        ItemFields {
            name: name.to_owned(),
            description: String::new(),
            quantity: Quantity::new(1).unwrap(),
            price: Price::new(Decimal::ONE).unwrap(),
        }
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: Username::parse(username).unwrap(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[tokio::test]
    async fn test_item_names_are_unique() {
        let store = MemoryItemStore::new();
        let first = store.create(&fields("Widget")).await.unwrap();
        let second = store.create(&fields("Gadget")).await.unwrap();

        assert!(matches!(
            store.create(&fields("Widget")).await,
            Err(RepositoryError::Conflict(field)) if field == "name"
        ));
        assert!(matches!(
            store.update(second.id, &fields("Widget")).await,
            Err(RepositoryError::Conflict(_))
        ));
        // Keeping its own name is not a conflict.
        assert!(store.update(first.id, &fields("Widget")).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_items() {
        let store = MemoryItemStore::new();
        let id = ItemId::generate();
        assert!(store.get(id).await.unwrap().is_none());
        assert!(matches!(
            store.update(id, &fields("x")).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            store.delete(id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryItemStore::new();
        for name in ["a", "b", "c"] {
            store.create(&fields(name)).await.unwrap();
        }
        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_credentials_reject_duplicates() {
        let store = MemoryCredentialStore::new();
        let user = store
            .create(&new_user("keeper", "keeper@depot.io"))
            .await
            .unwrap();
        assert_eq!(user.id, UserId::new(1));

        assert!(matches!(
            store.create(&new_user("keeper", "other@depot.io")).await,
            Err(RepositoryError::Conflict(field)) if field == "username"
        ));
        assert!(matches!(
            store.create(&new_user("other", "keeper@depot.io")).await,
            Err(RepositoryError::Conflict(field)) if field == "email"
        ));

        let (found, hash) = store.find_by_username("keeper").await.unwrap().unwrap();
        assert_eq!(found, user);
        assert_eq!(hash, "hash");
    }

    #[tokio::test]
    async fn test_blacklist_purges_only_expired() {
        let blacklist = MemoryTokenBlacklist::new();
        blacklist
            .revoke("old", Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        blacklist
            .revoke("live", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(blacklist.purge_expired().await.unwrap(), 1);
        assert!(!blacklist.is_revoked("old").await.unwrap());
        assert!(blacklist.is_revoked("live").await.unwrap());
    }
}
