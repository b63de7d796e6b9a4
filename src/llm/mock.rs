//! Offline backend answering with canned responses chosen by prompt content

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{LlmClient, JSON_INSTRUCTION};

/// Offline client returning canned responses
#[derive(Debug, Default)]
pub struct MockLlm {
    calls: AtomicUsize,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completions served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn mock_json(system_prompt: &str, user_prompt: &str) -> Value {
        if user_prompt.contains("Generate user questions") || user_prompt.contains("QUESTIONS TO ANSWER") {
            if system_prompt.contains("questions about products") {
                return mock_questions();
            }
            return mock_faqs();
        }

        if user_prompt.contains("Create a fictional competing product") {
            return json!({
                "product": {
                    "name": "RadiantGlow Advanced C Serum",
                    "concentration": "15% Vitamin C",
                    "skinType": ["All Skin Types", "Combination"],
                    "keyIngredients": ["Vitamin C", "Niacinamide", "Ferulic Acid"],
                    "benefits": ["Brightening", "Anti-aging", "Even skin tone"],
                    "howToUse": "Apply 3-4 drops morning and evening after cleansing",
                    "sideEffects": "May cause slight redness for very sensitive skin",
                    "price": "₹899"
                }
            });
        }

        json!({})
    }

    fn mock_text(user_prompt: &str) -> String {
        if user_prompt.contains("recommendation") {
            return "GlowBoost Vitamin C Serum offers excellent value for those seeking brightening benefits at ₹699, while competitors may offer additional ingredients at a higher price point. Choose based on your specific skin concerns and budget.".to_string();
        }
        "This is a mock response for testing purposes.".to_string()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _temperature: Option<f32>,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if system_prompt.contains(JSON_INSTRUCTION) {
            Ok(Self::mock_json(system_prompt, user_prompt).to_string())
        } else {
            Ok(Self::mock_text(user_prompt))
        }
    }
}

fn mock_questions() -> Value {
    let questions = [
        ("What is GlowBoost Vitamin C Serum?", "Informational"),
        ("What concentration of Vitamin C does this serum contain?", "Informational"),
        ("What are the key ingredients in this product?", "Ingredients"),
        ("Are there any side effects I should know about?", "Safety"),
        ("Is this serum suitable for sensitive skin?", "Safety"),
        ("Can I use this serum during pregnancy?", "Safety"),
        ("How do I apply GlowBoost Vitamin C Serum?", "Usage"),
        ("When should I use this in my skincare routine?", "Usage"),
        ("Can I use this with retinol or other actives?", "Usage"),
        ("Where can I purchase GlowBoost Vitamin C Serum?", "Purchase"),
        ("What is the price of this product?", "Purchase"),
        ("Is there a money-back guarantee?", "Purchase"),
        ("How does this compare to other Vitamin C serums?", "Comparison"),
        ("What makes GlowBoost different from competitors?", "Comparison"),
        ("Is 10% Vitamin C concentration effective?", "Comparison"),
        ("Why is hyaluronic acid included in the formula?", "Ingredients"),
        ("Is the Vitamin C in this serum stable?", "Ingredients"),
        ("Are there any parabens or sulfates in this product?", "Ingredients"),
    ];

    json!({
        "questions": questions
            .iter()
            .map(|(question, category)| json!({"question": question, "category": category}))
            .collect::<Vec<_>>()
    })
}

fn mock_faqs() -> Value {
    json!({
        "faqs": [
            {
                "question": "What is GlowBoost Vitamin C Serum?",
                "answer": "GlowBoost Vitamin C Serum is a premium skincare product formulated with 10% Vitamin C and Hyaluronic Acid, specifically designed for oily and combination skin types. It targets brightening and helps fade dark spots for a more radiant complexion."
            },
            {
                "question": "Are there any side effects I should know about?",
                "answer": "Most users tolerate this serum well. However, those with sensitive skin may experience mild tingling upon initial application. This is normal and typically subsides as your skin adjusts. If irritation persists, discontinue use and consult a dermatologist."
            },
            {
                "question": "How do I apply GlowBoost Vitamin C Serum?",
                "answer": "Apply 2-3 drops of the serum in the morning after cleansing your face. Gently massage into skin and allow it to absorb before applying sunscreen. Consistent daily use is key for best results."
            },
            {
                "question": "What is the price of this product?",
                "answer": "GlowBoost Vitamin C Serum is priced at ₹699, offering excellent value for a high-quality Vitamin C serum with proven ingredients like Hyaluronic Acid."
            },
            {
                "question": "Why is hyaluronic acid included in the formula?",
                "answer": "Hyaluronic Acid is included to provide deep hydration and plumping effects, complementing the brightening benefits of Vitamin C. It helps maintain skin moisture while the Vitamin C works to improve skin tone and texture."
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_routes_by_prompt() {
        let llm = MockLlm::new();

        let questions = llm
            .complete_json("Write questions about products", "Generate user questions for this product")
            .await
            .unwrap();
        assert_eq!(questions["questions"].as_array().map(Vec::len), Some(18));

        let faqs = llm
            .complete_json("You are a consultant", "QUESTIONS TO ANSWER:\n1. Why?")
            .await
            .unwrap();
        assert_eq!(faqs["faqs"].as_array().map(Vec::len), Some(5));

        let competitor = llm
            .complete_json("You are a specialist", "Create a fictional competing product")
            .await
            .unwrap();
        assert_eq!(competitor["product"]["price"], "₹899");

        let text = llm
            .complete("You are an expert", "Compare and give a recommendation")
            .await
            .unwrap();
        assert!(text.starts_with("GlowBoost"));
        assert_eq!(llm.calls(), 4);
    }
}
