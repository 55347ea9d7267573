use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A group of products, owned by the catalog store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: u64,

    /// Display name, unique across the catalog
    pub name: String,

    /// Optional long-form description
    pub description: Option<String>,
}

impl Category {
    /// Create a new category
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Product row as persisted by the catalog store.
///
/// The category is held by reference; stores join it into a
/// [`CanonicalProduct`] when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Unique identifier
    pub id: u64,

    /// Product name
    pub name: String,

    /// Product description
    pub description: Option<String>,

    /// Exact price, never negative
    pub price: Decimal,

    /// Image reference
    pub image_url: Option<String>,

    /// Owning category
    pub category_id: u64,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Create a new product row
    pub fn new(id: u64, name: impl Into<String>, price: Decimal, category_id: u64) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            price,
            image_url: None,
            category_id,
            created_at: Utc::now(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the image reference
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Join this row with its (possibly missing) category
    pub fn into_canonical(self, category: Option<Category>) -> CanonicalProduct {
        CanonicalProduct {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            category,
            created_at: self.created_at,
        }
    }
}

/// Authoritative product as read from the catalog, with its category loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    /// Unique identifier
    pub id: u64,

    /// Product name
    pub name: String,

    /// Product description
    pub description: Option<String>,

    /// Exact price, never negative
    pub price: Decimal,

    /// Image reference
    pub image_url: Option<String>,

    /// Loaded category relation. Mandatory in the catalog; `None` only when
    /// the stored reference points nowhere.
    pub category: Option<Category>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
