//! Question generation agent - categorized user questions about the product

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use super::{product_input, DATA_PARSER, QUESTION_GENERATION};
use crate::content::Product;
use crate::core::Task;
use crate::llm::LlmClient;

/// A user question and the category it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub category: String,
}

#[derive(Deserialize)]
struct QuestionsResponse {
    #[serde(default)]
    questions: Vec<Question>,
}

pub struct QuestionGenerationAgent {
    llm: Arc<dyn LlmClient>,
    categories: Vec<String>,
    min_questions: usize,
    dependencies: Vec<String>,
}

impl QuestionGenerationAgent {
    pub fn new(llm: Arc<dyn LlmClient>, categories: Vec<String>, min_questions: usize) -> Self {
        Self {
            llm,
            categories,
            min_questions,
            dependencies: vec![DATA_PARSER.to_string()],
        }
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are an expert content strategist specializing in skincare products.
Your task is to generate realistic, diverse user questions about products.

CATEGORIES: {}

REQUIREMENTS:
1. Generate at least {} questions total
2. Distribute questions across all categories
3. Questions should be natural and user-focused
4. Cover different aspects: ingredients, usage, benefits, safety, pricing, comparisons
5. Be specific to the product details provided

OUTPUT FORMAT (JSON):
{{
  \"questions\": [
    {{ \"question\": \"question text here\", \"category\": \"category name\" }}
  ]
}}",
            self.categories.join(", "),
            self.min_questions
        )
    }

    fn user_prompt(&self, product: &Product) -> String {
        let facts = product.facts();
        format!(
            "Generate user questions for this product:

PRODUCT: {}
CONCENTRATION: {}
INGREDIENTS: {}
BENEFITS: {}
SKIN TYPES: {}
USAGE: {}
SIDE EFFECTS: {}
PRICE: {}

Generate at least {} diverse, realistic questions users might ask about this product.",
            facts.product_name,
            facts.concentration,
            facts.all_ingredients.join(", "),
            facts.all_benefits.join(", "),
            facts.target_skin_types.join(", "),
            facts.usage_instructions,
            facts.safety_info,
            facts.pricing,
            self.min_questions
        )
    }
}

#[async_trait]
impl Task for QuestionGenerationAgent {
    fn name(&self) -> &str {
        QUESTION_GENERATION
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let product = product_input(QUESTION_GENERATION, input)?;

        let response = self
            .llm
            .complete_json(&self.system_prompt(), &self.user_prompt(&product))
            .await?;
        let QuestionsResponse { questions } =
            serde_json::from_value(response).context("Malformed questions response")?;

        if questions.len() < self.min_questions {
            anyhow::bail!(
                "Failed to generate minimum {} questions (got {})",
                self.min_questions,
                questions.len()
            );
        }

        let categories: HashSet<&str> = questions.iter().map(|q| q.category.as_str()).collect();
        log::info!(
            "Generated {} questions across {} categories",
            questions.len(),
            categories.len()
        );

        Ok(serde_json::to_value(questions)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::llm::MockLlm;
    use serde_json::json;

    fn agent(min_questions: usize) -> QuestionGenerationAgent {
        QuestionGenerationAgent::new(
            Arc::new(MockLlm::new()),
            AppConfig::default().question_categories,
            min_questions,
        )
    }

    fn product() -> Value {
        serde_json::to_value(crate::content::product::tests::glowboost()).unwrap()
    }

    #[tokio::test]
    async fn test_generates_questions() {
        let output = agent(15).execute(product()).await.unwrap();
        let questions: Vec<Question> = serde_json::from_value(output).unwrap();
        assert_eq!(questions.len(), 18);
        assert_eq!(questions[0].category, "Informational");
    }

    #[tokio::test]
    async fn test_too_few_questions_fails() {
        let err = agent(20).execute(product()).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to generate minimum 20 questions"));
    }

    #[tokio::test]
    async fn test_requires_product() {
        assert!(agent(15).execute(Value::Null).await.is_err());
        assert!(agent(15).execute(json!({"name": "x"})).await.is_err());
    }
}
