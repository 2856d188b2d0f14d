//! Who is acting, and what they may manage.
//!
//! Sign-in is handled by an external provider; by the time a request reaches
//! the service the caller's id and role are already known. This module only
//! decides whether that caller may touch a given restaurant.

use crate::{
    entities::{Restaurant, restaurant},
    errors::{Error, Result},
};
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Platform role assigned by the auth provider.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator (dashboard)
    Admin,
    /// Restaurant owner (portal)
    Owner,
    /// Regular visitor
    Customer,
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            "customer" | "user" | "" => Ok(Self::Customer),
            other => Err(Error::Forbidden {
                message: format!("unknown role '{other}'"),
            }),
        }
    }
}

/// The signed-in caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    /// Auth-provider user id
    pub user_id: String,
    /// Display name, if the provider supplied one
    pub name: Option<String>,
    /// Role
    pub role: Role,
}

impl Actor {
    /// Builds an actor with no display name.
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            role,
        }
    }

    /// Whether this actor is a platform administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Dashboard operations are admin-only.
pub fn ensure_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        warn!(user_id = %actor.user_id, "non-admin attempted a dashboard operation");
        Err(Error::Forbidden {
            message: "administrator role required".to_string(),
        })
    }
}

/// Loads a restaurant the actor may manage through the portal: its owner or
/// any administrator.
pub async fn ensure_can_manage(
    db: &DatabaseConnection,
    actor: &Actor,
    restaurant_id: i64,
) -> Result<restaurant::Model> {
    let restaurant = Restaurant::find_by_id(restaurant_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("restaurant", restaurant_id))?;

    if actor.is_admin() || restaurant.owner_id == actor.user_id {
        Ok(restaurant)
    } else {
        warn!(
            user_id = %actor.user_id,
            restaurant_id,
            "user attempted to manage a restaurant they do not own"
        );
        Err(Error::Forbidden {
            message: format!("user does not own restaurant {restaurant_id}"),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("owner".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!("".parse::<Role>().unwrap(), Role::Customer);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_ensure_admin() {
        assert!(ensure_admin(&Actor::new("a", Role::Admin)).is_ok());
        assert!(matches!(
            ensure_admin(&Actor::new("o", Role::Owner)),
            Err(Error::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_ensure_can_manage() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;

        let owner = Actor::new(TEST_OWNER_ID, Role::Owner);
        assert_eq!(
            ensure_can_manage(&db, &owner, restaurant.id).await?.id,
            restaurant.id
        );

        let admin = Actor::new("someone-else", Role::Admin);
        assert!(ensure_can_manage(&db, &admin, restaurant.id).await.is_ok());

        let stranger = Actor::new("someone-else", Role::Owner);
        assert!(matches!(
            ensure_can_manage(&db, &stranger, restaurant.id).await,
            Err(Error::Forbidden { .. })
        ));

        assert!(matches!(
            ensure_can_manage(&db, &owner, 999).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
