use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A movie in the agency's catalog.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Movie {
    /// Unique identifier, assigned on creation
    pub id: i64,
    /// Movie title
    pub title: String,
    /// Genre label
    pub genre: String,
    /// Rating on the agency's scale
    pub rating: f64,
    /// Free-form description
    pub description: String,
}

/// An actor on the agency's roster.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Actor {
    /// Unique identifier, assigned on creation
    pub id: i64,
    /// Full name
    pub name: String,
    /// Year of birth
    pub year_of_birth: i32,
    /// Gender
    pub gender: String,
    /// Nationality
    pub nationality: String,
    /// Short biography
    pub bio: String,
}

/// Response body for successful deletions.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Deleted {
    pub success: bool,
    /// Identifier of the removed entity
    pub deleted: i64,
}
