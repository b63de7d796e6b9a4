//! Content generation agent - FAQ answers plus supporting page sections

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{product_input, Question, CONTENT_GENERATION, QUESTION_GENERATION};
use crate::content::{blocks, Product};
use crate::core::Task;
use crate::llm::LlmClient;

/// One answered FAQ entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    pub id: usize,
    pub question: String,
    pub answer: String,
    pub category: String,
}

#[derive(Deserialize)]
struct Answer {
    question: String,
    answer: String,
}

#[derive(Deserialize)]
struct AnswersResponse {
    #[serde(default)]
    faqs: Vec<Answer>,
}

/// Expects `{ "product": .., "questions": [..] }` as input
pub struct ContentGenerationAgent {
    llm: Arc<dyn LlmClient>,
    faq_items: usize,
    dependencies: Vec<String>,
}

impl ContentGenerationAgent {
    pub fn new(llm: Arc<dyn LlmClient>, faq_items: usize) -> Self {
        Self {
            llm,
            faq_items,
            dependencies: vec![QUESTION_GENERATION.to_string()],
        }
    }

    /// The first `faq_items` questions in generation order
    pub fn select_questions(&self, questions: &[Question]) -> Vec<Question> {
        questions.iter().take(self.faq_items).cloned().collect()
    }

    fn system_prompt(&self) -> &'static str {
        "You are an expert skincare consultant providing helpful, accurate answers.

GUIDELINES:
1. Answer based ONLY on the product information provided
2. Be concise but informative (2-3 sentences per answer)
3. Use a friendly, professional tone
4. Do not invent facts or ingredients not mentioned
5. If safety concerns exist, mention them appropriately

OUTPUT FORMAT (JSON):
{
  \"faqs\": [
    { \"question\": \"question text\", \"answer\": \"detailed answer\" }
  ]
}"
    }

    fn user_prompt(&self, product: &Product, questions: &[Question]) -> String {
        let facts = product.facts();
        let numbered = questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {}", i + 1, q.question))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "PRODUCT INFORMATION:
Name: {}
Ingredients: {}
Concentration: {}
Benefits: {}
Skin Types: {}
Usage: {}
Side Effects: {}
Price: {}

QUESTIONS TO ANSWER:
{}

Provide comprehensive, accurate answers based on the product information.",
            facts.product_name,
            facts.all_ingredients.join(", "),
            facts.concentration,
            facts.all_benefits.join(", "),
            facts.target_skin_types.join(", "),
            facts.usage_instructions,
            facts.safety_info,
            facts.pricing,
            numbered
        )
    }

    async fn answer(&self, product: &Product, questions: &[Question]) -> Result<Vec<FaqItem>> {
        let response = self
            .llm
            .complete_json(self.system_prompt(), &self.user_prompt(product, questions))
            .await?;
        let AnswersResponse { faqs } =
            serde_json::from_value(response).context("Malformed FAQ response")?;

        Ok(faqs
            .into_iter()
            .enumerate()
            .map(|(i, faq)| FaqItem {
                id: i + 1,
                question: faq.question,
                answer: faq.answer,
                category: questions
                    .get(i)
                    .map_or_else(|| "General".to_string(), |q| q.category.clone()),
            })
            .collect())
    }
}

#[async_trait]
impl Task for ContentGenerationAgent {
    fn name(&self) -> &str {
        CONTENT_GENERATION
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn execute(&self, mut input: Value) -> Result<Value> {
        if input.is_null() {
            anyhow::bail!("{}: Input cannot be null", CONTENT_GENERATION);
        }
        let (product, questions) = match input.as_object_mut() {
            Some(fields) => (
                fields.remove("product").unwrap_or_default(),
                fields.remove("questions").unwrap_or_default(),
            ),
            None => (Value::Null, Value::Null),
        };
        if product.is_null() || questions.is_null() {
            anyhow::bail!(
                "{}: Input must contain product and questions",
                CONTENT_GENERATION
            );
        }

        let product = product_input(CONTENT_GENERATION, product)?;
        let questions: Vec<Question> = serde_json::from_value(questions)
            .with_context(|| format!("{}: Questions must be an array", CONTENT_GENERATION))?;
        if questions.is_empty() {
            anyhow::bail!("{}: Questions must be a non-empty array", CONTENT_GENERATION);
        }

        let selected = self.select_questions(&questions);
        let faqs = self.answer(&product, &selected).await?;
        log::info!("Generated {} FAQ items", faqs.len());

        Ok(json!({
            "faqs": faqs,
            "additionalContent": {
                "benefits": blocks::benefits(&product),
                "usage": blocks::usage(&product),
                "safety": blocks::safety(&product),
            },
        }))
    }
}
