//! Comparison agent - invents a competing product and compares the two

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{product_input, COMPARISON, DATA_PARSER};
use crate::content::{blocks, Product};
use crate::core::Task;
use crate::llm::LlmClient;

const COMPETITOR_PROMPT: &str = "You are a product data specialist. Create a realistic fictional competing skincare product.

REQUIREMENTS:
1. The product should be similar but not identical to the reference
2. Use different brand name and product name
3. Vary the concentration slightly
4. Include some overlapping and some different ingredients
5. Provide realistic benefits
6. Set a different price point (higher or lower)
7. Target similar or overlapping skin types
8. Include realistic side effects or \"None known\"

OUTPUT FORMAT (JSON):
{
  \"product\": {
    \"name\": \"product name\",
    \"concentration\": \"percentage or strength\",
    \"skinType\": [\"type1\", \"type2\"],
    \"keyIngredients\": [\"ingredient1\", \"ingredient2\"],
    \"benefits\": [\"benefit1\", \"benefit2\"],
    \"howToUse\": \"usage instructions\",
    \"sideEffects\": \"side effects or None known\",
    \"price\": \"₹XXX\"
  }
}";

const RECOMMENDATION_PROMPT: &str = "You are a skincare expert providing product recommendations.
Analyze both products and provide a balanced recommendation based on ingredients, price, and benefits.
Be objective and highlight which product might be better for different use cases.
Keep the recommendation to 2-3 sentences.";

pub struct ComparisonAgent {
    llm: Arc<dyn LlmClient>,
    dependencies: Vec<String>,
}

impl ComparisonAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            dependencies: vec![DATA_PARSER.to_string()],
        }
    }

    async fn fictional_competitor(&self, reference: &Product) -> Result<Product> {
        let prompt = format!(
            "Create a fictional competing product similar to this reference:

REFERENCE PRODUCT:
Name: {}
Concentration: {}
Ingredients: {}
Benefits: {}
Skin Types: {}
Usage: {}
Price: {}

Create a realistic competitor with similar characteristics but unique details.",
            reference.name,
            reference.concentration,
            reference.key_ingredients.join(", "),
            reference.benefits.join(", "),
            reference.skin_type.join(", "),
            reference.how_to_use,
            reference.price
        );

        let mut response = self.llm.complete_json(COMPETITOR_PROMPT, &prompt).await?;
        let product = response
            .get_mut("product")
            .map(Value::take)
            .unwrap_or_default();
        Product::from_value(product).context("Generated competitor is not a valid product")
    }

    async fn recommendation(&self, a: &Product, b: &Product) -> Result<String> {
        let describe = |label: &str, p: &Product| {
            format!(
                "{}: {}\n- Price: {}\n- Ingredients: {}\n- Benefits: {}\n- Skin Types: {}",
                label,
                p.name,
                p.price,
                p.key_ingredients.join(", "),
                p.benefits.join(", "),
                p.skin_type.join(", ")
            )
        };
        let prompt = format!(
            "Compare these products and provide a recommendation:\n\n{}\n\n{}",
            describe("PRODUCT A", a),
            describe("PRODUCT B", b)
        );

        self.llm.complete(RECOMMENDATION_PROMPT, &prompt).await
    }
}

#[async_trait]
impl Task for ComparisonAgent {
    fn name(&self) -> &str {
        COMPARISON
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let product_a = product_input(COMPARISON, input)?;
        let product_b = self.fictional_competitor(&product_a).await?;

        let ingredients = blocks::compare_ingredients(&product_a, &product_b);
        let price = blocks::compare_prices(&product_a, &product_b);
        let recommendation = self.recommendation(&product_a, &product_b).await?;

        log::info!("Created comparison: {} vs {}", product_a.name, product_b.name);

        Ok(json!({
            "productA": product_a,
            "productB": product_b,
            "comparison": {
                "ingredients": ingredients,
                "price": price,
            },
            "recommendation": recommendation,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::product::tests::glowboost;
    use crate::llm::MockLlm;

    #[tokio::test]
    async fn test_compares_against_competitor() {
        let llm = Arc::new(MockLlm::new());
        let agent = ComparisonAgent::new(llm.clone());

        let output = agent
            .execute(serde_json::to_value(glowboost()).unwrap())
            .await
            .unwrap();

        assert_eq!(output["productB"]["name"], "RadiantGlow Advanced C Serum");
        assert_eq!(output["comparison"]["ingredients"]["common"], json!(["Vitamin C"]));
        assert_eq!(output["comparison"]["price"]["difference"], "₹200");
        assert!(output["recommendation"]
            .as_str()
            .unwrap()
            .starts_with("GlowBoost"));
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_competitor_fails() {
        struct EmptyLlm;

        #[async_trait]
        impl LlmClient for EmptyLlm {
            async fn chat(&self, _: &str, _: &str, _: Option<f32>) -> Result<String> {
                Ok("{}".to_string())
            }
        }

        let agent = ComparisonAgent::new(Arc::new(EmptyLlm));
        let err = agent
            .execute(serde_json::to_value(glowboost()).unwrap())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Generated competitor is not a valid product"
        );
    }
}
