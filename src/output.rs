//! Page output - formats pipeline results and writes them as JSON files

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::agents::{Question, COMPARISON, CONTENT_GENERATION, DATA_PARSER, QUESTION_GENERATION};
use crate::content::{blocks, Product};

/// Writes generated pages into one output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialize `data` as pretty JSON into `filename`
    pub fn write_json<T: Serialize>(&self, filename: &str, data: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.dir.join(filename);
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Written: {}", path.display());
        Ok(path)
    }

    /// Every generated question, also grouped by category
    pub fn write_all_questions(&self, questions: &[Question]) -> Result<PathBuf> {
        let mut categories: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for q in questions {
            categories
                .entry(q.category.as_str())
                .or_default()
                .push(q.question.as_str());
        }

        self.write_json(
            "all_questions.json",
            &json!({
                "title": "All Generated Questions",
                "totalQuestions": questions.len(),
                "categories": categories,
                "questions": questions,
                "generatedAt": timestamp(),
            }),
        )
    }

    pub fn write_faq_page(&self, faq: &Value, product_name: &str) -> Result<PathBuf> {
        let faqs = faq.get("faqs").cloned().unwrap_or_else(|| json!([]));
        let total = faqs.as_array().map_or(0, Vec::len);

        self.write_json(
            "faq.json",
            &json!({
                "pageTitle": "Frequently Asked Questions",
                "productName": product_name,
                "introduction": format!("Common questions about {}", product_name),
                "faqs": faqs,
                "totalQuestions": total,
                "generatedAt": timestamp(),
            }),
        )
    }

    /// Product page assembled from every content block
    pub fn write_product_page(&self, product: &Product) -> Result<PathBuf> {
        let facts = product.facts();

        self.write_json(
            "product_page.json",
            &json!({
                "pageTitle": product.name,
                "productName": product.name,
                "tagline": format!("{} {} Serum", product.concentration, facts.main_ingredient),
                "overview": {
                    "description": format!(
                        "{} is a premium skincare solution formulated for {} skin types.",
                        product.name,
                        product.skin_type.join(" and ")
                    ),
                    "concentration": product.concentration,
                    "price": product.price,
                },
                "benefits": blocks::benefits(product),
                "ingredients": blocks::ingredients(product),
                "usage": blocks::usage(product),
                "skinType": blocks::skin_type(product),
                "safety": blocks::safety(product),
                "generatedAt": timestamp(),
            }),
        )
    }

    pub fn write_comparison_page(&self, comparison: &Value) -> Result<PathBuf> {
        let name = |key: &str| comparison[key]["name"].as_str().unwrap_or("").to_string();

        self.write_json(
            "comparison_page.json",
            &json!({
                "pageTitle": format!("{} vs {}", name("productA"), name("productB")),
                "productA": comparison["productA"],
                "productB": comparison["productB"],
                "comparison": comparison["comparison"],
                "recommendation": comparison["recommendation"],
                "generatedAt": timestamp(),
            }),
        )
    }

    /// Write all four pages from a completed run's results
    pub fn write_all(&self, results: &Map<String, Value>) -> Result<Vec<PathBuf>> {
        let product = Product::from_value(required(results, DATA_PARSER)?.clone())?;
        let questions: Vec<Question> =
            serde_json::from_value(required(results, QUESTION_GENERATION)?.clone())
                .context("Malformed question list")?;

        Ok(vec![
            self.write_all_questions(&questions)?,
            self.write_faq_page(required(results, CONTENT_GENERATION)?, &product.name)?,
            self.write_product_page(&product)?,
            self.write_comparison_page(required(results, COMPARISON)?)?,
        ])
    }
}

fn required<'a>(results: &'a Map<String, Value>, task: &str) -> Result<&'a Value> {
    results
        .get(task)
        .with_context(|| format!("No result from {}", task))
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}
