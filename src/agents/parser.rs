//! Data parser agent - loads and validates the product record

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use super::DATA_PARSER;
use crate::content::Product;
use crate::core::Task;

/// Reads product data from a file path, or accepts it inline as an object
#[derive(Debug, Default)]
pub struct DataParserAgent {
    dependencies: Vec<String>,
}

impl DataParserAgent {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Task for DataParserAgent {
    fn name(&self) -> &str {
        DATA_PARSER
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let product = match input {
            Value::String(path) => {
                log::debug!("Reading product data from: {}", path);
                Product::from_file(Path::new(&path)).await?
            }
            object @ Value::Object(_) => Product::from_value(object)?,
            Value::Null => anyhow::bail!("{}: Input cannot be null", DATA_PARSER),
            _ => anyhow::bail!(
                "{}: Input must be a file path (string) or product data object",
                DATA_PARSER
            ),
        };

        log::info!("Parsed product: {}", product.name);
        Ok(serde_json::to_value(product)?)
    }
}
