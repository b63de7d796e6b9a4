//! Product data model

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product validation failed: {0} is required")]
    MissingField(&'static str),

    #[error("Failed to read product data from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid product data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A skincare product as described by the source data file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub concentration: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub skin_type: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub key_ingredients: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub how_to_use: String,
    #[serde(default)]
    pub side_effects: Option<String>,
    #[serde(default)]
    pub price: String,
}

/// Key facts pulled out of a product for prompt building
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFacts<'a> {
    pub product_name: &'a str,
    pub main_ingredient: &'a str,
    pub all_ingredients: &'a [String],
    pub concentration: &'a str,
    pub target_skin_types: &'a [String],
    pub primary_benefit: &'a str,
    pub all_benefits: &'a [String],
    pub usage_instructions: &'a str,
    pub safety_info: &'a str,
    pub pricing: &'a str,
}

impl Product {
    /// Parse and validate a product from a JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProductError> {
        let product: Product = serde_json::from_value(value)?;
        product.validate()?;
        Ok(product)
    }

    /// Read, parse and validate a product JSON file
    pub async fn from_file(path: &Path) -> Result<Self, ProductError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ProductError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_value(serde_json::from_str(&content)?)
    }

    /// Check every required field is present and non-empty
    pub fn validate(&self) -> Result<(), ProductError> {
        let required: [(&'static str, bool); 7] = [
            ("name", self.name.trim().is_empty()),
            ("concentration", self.concentration.trim().is_empty()),
            ("skinType", self.skin_type.is_empty()),
            ("keyIngredients", self.key_ingredients.is_empty()),
            ("benefits", self.benefits.is_empty()),
            ("howToUse", self.how_to_use.trim().is_empty()),
            ("price", self.price.trim().is_empty()),
        ];

        match required.iter().find(|(_, missing)| *missing) {
            Some((field, _)) => Err(ProductError::MissingField(*field)),
            None => Ok(()),
        }
    }

    pub fn facts(&self) -> ProductFacts<'_> {
        ProductFacts {
            product_name: &self.name,
            main_ingredient: self.key_ingredients.first().map_or("", String::as_str),
            all_ingredients: &self.key_ingredients,
            concentration: &self.concentration,
            target_skin_types: &self.skin_type,
            primary_benefit: self.benefits.first().map_or("", String::as_str),
            all_benefits: &self.benefits,
            usage_instructions: &self.how_to_use,
            safety_info: self.side_effects.as_deref().unwrap_or(""),
            pricing: &self.price,
        }
    }
}

/// Accept either a single string or a list of strings
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
