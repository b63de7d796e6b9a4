//! Content agents - the tasks that make up the page generation pipeline

mod comparison;
mod faq;
mod parser;
mod questions;

pub use comparison::ComparisonAgent;
pub use faq::{ContentGenerationAgent, FaqItem};
pub use parser::DataParserAgent;
pub use questions::{Question, QuestionGenerationAgent};

pub const DATA_PARSER: &str = "DataParserAgent";
pub const QUESTION_GENERATION: &str = "QuestionGenerationAgent";
pub const CONTENT_GENERATION: &str = "ContentGenerationAgent";
pub const COMPARISON: &str = "ComparisonAgent";

use anyhow::Result;
use serde_json::Value;

use crate::content::Product;

/// Decode a product passed between agents, rejecting `null`
fn product_input(agent: &str, input: Value) -> Result<Product> {
    if input.is_null() {
        anyhow::bail!("{}: Input cannot be null", agent);
    }
    Product::from_value(input).map_err(|e| anyhow::anyhow!("{}: {}", agent, e))
}
