//! Household repository for household and member database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{households, members};

/// Error types for household operations.
#[derive(Debug, thiserror::Error)]
pub enum HouseholdError {
    /// Household not found.
    #[error("Household not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl HouseholdError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "HOUSEHOLD_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }
}

/// Household repository for tenant and member CRUD.
#[derive(Debug, Clone)]
pub struct HouseholdRepository {
    db: DatabaseConnection,
}

impl HouseholdRepository {
    /// Creates a new household repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a household.
    pub async fn create(&self, name: &str) -> Result<households::Model, HouseholdError> {
        let household = households::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().into()),
        };
        Ok(household.insert(&self.db).await?)
    }

    /// Finds a household by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<households::Model>, HouseholdError> {
        Ok(households::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Adds a member to a household.
    ///
    /// # Errors
    ///
    /// Returns [`HouseholdError::NotFound`] if the household does not exist.
    pub async fn add_member(
        &self,
        household_id: Uuid,
        name: &str,
    ) -> Result<members::Model, HouseholdError> {
        households::Entity::find_by_id(household_id)
            .one(&self.db)
            .await?
            .ok_or(HouseholdError::NotFound(household_id))?;

        let member = members::ActiveModel {
            id: Set(Uuid::new_v4()),
            household_id: Set(household_id),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().into()),
        };
        Ok(member.insert(&self.db).await?)
    }

    /// Lists a household's members, oldest first.
    pub async fn list_members(
        &self,
        household_id: Uuid,
    ) -> Result<Vec<members::Model>, HouseholdError> {
        Ok(members::Entity::find()
            .filter(members::Column::HouseholdId.eq(household_id))
            .order_by_asc(members::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}
