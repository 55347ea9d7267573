//! Search document structures and catalog projection

use crate::models::CanonicalProduct;
use crate::search::error::{SearchError, SearchResult};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tantivy::schema::*;
use tantivy::TantivyDocument;

/// Denormalized product as stored in the search index.
///
/// Regenerated from the catalog on every sync and never edited in place.
/// `category_name` is a copy taken at projection time and goes stale if the
/// category is renamed before the next sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDocument {
    /// String form of the catalog product id
    pub id: String,

    /// Product name
    pub name: String,

    /// Product description
    pub description: Option<String>,

    /// Exact price
    pub price: Decimal,

    /// Flattened category name
    pub category_name: String,

    /// Image reference, stored but not searchable
    pub image_url: Option<String>,
}

/// Field handles of the product schema
#[derive(Debug, Clone, Copy)]
pub struct ProductFields {
    pub id: Field,
    pub name: Field,
    pub description: Field,
    pub category_name: Field,
    /// Numeric copy of the price used for range filtering
    pub price: Field,
    /// Exact decimal text of the price
    pub price_exact: Field,
    pub image_url: Field,
}

impl ProductFields {
    /// Resolve all product fields, failing if the schema is not a product schema
    pub fn from_schema(schema: &Schema) -> SearchResult<Self> {
        let field = |name: &str| {
            schema.get_field(name).map_err(|e| {
                SearchError::IndexInitFailed(format!("Schema is missing field '{}': {}", name, e))
            })
        };

        Ok(Self {
            id: field("id")?,
            name: field("name")?,
            description: field("description")?,
            category_name: field("category_name")?,
            price: field("price")?,
            price_exact: field("price_exact")?,
            image_url: field("image_url")?,
        })
    }
}

/// Build the search schema for products
pub fn build_product_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    // ID - stored, indexed as a single token for upserts
    schema_builder.add_text_field("id", STRING | STORED);

    // Searchable text fields
    schema_builder.add_text_field("name", TEXT | STORED);
    schema_builder.add_text_field("description", TEXT | STORED);
    schema_builder.add_text_field("category_name", TEXT | STORED);

    // Price - f64 fast field for range filters, exact text for round-trips
    schema_builder.add_f64_field("price", INDEXED | FAST);
    schema_builder.add_text_field("price_exact", STORED);

    schema_builder.add_text_field("image_url", STORED);

    schema_builder.build()
}

impl ProductDocument {
    /// Convert to a Tantivy document
    pub fn to_tantivy_doc(&self, fields: &ProductFields) -> TantivyDocument {
        let mut doc = TantivyDocument::new();

        doc.add_text(fields.id, &self.id);
        doc.add_text(fields.name, &self.name);
        if let Some(ref description) = self.description {
            doc.add_text(fields.description, description);
        }
        doc.add_text(fields.category_name, &self.category_name);
        doc.add_f64(fields.price, self.price.to_f64().unwrap_or(f64::MAX));
        doc.add_text(fields.price_exact, self.price.to_string());
        if let Some(ref image_url) = self.image_url {
            doc.add_text(fields.image_url, image_url);
        }

        doc
    }

    /// Rebuild a document from its stored fields
    pub fn from_tantivy_doc(doc: &TantivyDocument, fields: &ProductFields) -> SearchResult<Self> {
        let text = |field: Field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        let id = text(fields.id).ok_or_else(|| {
            SearchError::IndexUnavailable("Stored document has no id".to_string())
        })?;

        let price = text(fields.price_exact)
            .and_then(|exact| Decimal::from_str(&exact).ok())
            .or_else(|| {
                doc.get_first(fields.price)
                    .and_then(|v| v.as_f64())
                    .and_then(Decimal::from_f64)
            })
            .ok_or_else(|| {
                SearchError::IndexUnavailable(format!("Stored document {} has no price", id))
            })?;

        Ok(Self {
            name: text(fields.name).unwrap_or_default(),
            description: text(fields.description),
            price,
            category_name: text(fields.category_name).unwrap_or_default(),
            image_url: text(fields.image_url),
            id,
        })
    }
}

/// Maps canonical catalog products onto index documents
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogProjector;

impl CatalogProjector {
    pub fn new() -> Self {
        Self
    }

    /// Project a product, reading the category name as it is right now.
    ///
    /// A product without a category breaks the catalog's foreign-key
    /// invariant and is reported as [`SearchError::DataIntegrity`].
    pub fn project(&self, product: &CanonicalProduct) -> SearchResult<ProductDocument> {
        let category = product
            .category
            .as_ref()
            .ok_or(SearchError::DataIntegrity {
                product_id: product.id,
            })?;

        Ok(ProductDocument {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category_name: category.name.clone(),
            image_url: product.image_url.clone(),
        })
    }
}

impl TryFrom<&CanonicalProduct> for ProductDocument {
    type Error = SearchError;

    fn try_from(product: &CanonicalProduct) -> SearchResult<Self> {
        CatalogProjector.project(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ProductRecord};

    fn sample_product() -> CanonicalProduct {
        ProductRecord::new(7, "Galaxy M14", Decimal::new(1249950, 2), 3)
            .with_description("5G smartphone")
            .with_image_url("https://cdn.example.com/m14.png")
            .into_canonical(Some(Category::new(3, "Phones")))
    }

    #[test]
    fn test_product_to_document() {
        let doc = CatalogProjector::new().project(&sample_product()).unwrap();

        assert_eq!(doc.id, "7");
        assert_eq!(doc.name, "Galaxy M14");
        assert_eq!(doc.description.as_deref(), Some("5G smartphone"));
        assert_eq!(doc.price, Decimal::new(1249950, 2));
        assert_eq!(doc.category_name, "Phones");
        assert_eq!(doc.image_url.as_deref(), Some("https://cdn.example.com/m14.png"));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let product = sample_product();
        let projector = CatalogProjector::new();
        assert_eq!(
            projector.project(&product).unwrap(),
            projector.project(&product).unwrap()
        );
    }

    #[test]
    fn test_projection_reads_current_category_name() {
        let mut product = sample_product();
        product.category = Some(Category::new(3, "Mobiles"));

        let doc = ProductDocument::try_from(&product).unwrap();
        assert_eq!(doc.category_name, "Mobiles");
    }

    #[test]
    fn test_missing_category_is_integrity_error() {
        let mut product = sample_product();
        product.category = None;

        let err = CatalogProjector::new().project(&product).unwrap_err();
        assert!(matches!(err, SearchError::DataIntegrity { product_id: 7 }));
    }

    #[test]
    fn test_tantivy_round_trip_keeps_exact_price() {
        let schema = build_product_schema();
        let fields = ProductFields::from_schema(&schema).unwrap();
        let doc = CatalogProjector::new().project(&sample_product()).unwrap();

        let restored = ProductDocument::from_tantivy_doc(&doc.to_tantivy_doc(&fields), &fields)
            .unwrap();
        assert_eq!(restored, doc);
        assert_eq!(restored.price.to_string(), "12499.50");
    }

    #[test]
    fn test_schema_building() {
        let schema = build_product_schema();
        assert!(ProductFields::from_schema(&schema).is_ok());
        assert!(schema.get_field("category_name").is_ok());
        assert!(schema.get_field("price").is_ok());
    }
}
