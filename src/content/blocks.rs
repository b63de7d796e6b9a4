//! Content blocks - pure transformations from product data to page sections

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::Product;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenefitItem {
    pub id: usize,
    pub benefit: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenefitsBlock {
    pub title: String,
    pub benefits: Vec<BenefitItem>,
    pub summary: String,
}

pub fn benefits(product: &Product) -> BenefitsBlock {
    BenefitsBlock {
        title: "Key Benefits".to_string(),
        benefits: product
            .benefits
            .iter()
            .enumerate()
            .map(|(i, benefit)| BenefitItem {
                id: i + 1,
                benefit: benefit.clone(),
                description: format!(
                    "{} delivers {} through its specialized formula.",
                    product.name,
                    benefit.to_lowercase()
                ),
            })
            .collect(),
        summary: format!(
            "Experience {} with regular use.",
            product.benefits.join(", ").to_lowercase()
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageBlock {
    pub title: String,
    pub instructions: String,
    pub steps: Vec<String>,
    pub frequency: String,
    pub timing: String,
}

pub fn usage(product: &Product) -> UsageBlock {
    let lower = product.how_to_use.to_lowercase();

    let frequency = if lower.contains("morning") {
        "Daily (Morning)"
    } else if lower.contains("night") {
        "Daily (Night)"
    } else if lower.contains("twice") {
        "Twice Daily"
    } else {
        "As directed"
    };

    let timing = if lower.contains("morning") {
        "Morning"
    } else if lower.contains("night") || lower.contains("evening") {
        "Night"
    } else {
        "Anytime"
    };

    UsageBlock {
        title: "How to Use".to_string(),
        instructions: product.how_to_use.clone(),
        steps: vec![
            "Cleanse your face".to_string(),
            product.how_to_use.clone(),
            "Follow with moisturizer if needed".to_string(),
        ],
        frequency: frequency.to_string(),
        timing: timing.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyBlock {
    pub title: String,
    pub side_effects: String,
    pub precautions: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn safety(product: &Product) -> SafetyBlock {
    let side_effects = product.side_effects.as_deref().filter(|s| !s.is_empty());

    let mut precautions = vec![
        "For external use only".to_string(),
        "Avoid contact with eyes".to_string(),
    ];
    if side_effects.is_some_and(|s| s.to_lowercase().contains("sensitive")) {
        precautions.push("Perform a patch test before first use".to_string());
    }
    if product
        .key_ingredients
        .iter()
        .any(|i| i.to_lowercase().contains("vitamin c"))
    {
        precautions.push("Store in a cool, dark place to maintain potency".to_string());
    }

    let warnings = match side_effects {
        Some(_) => vec![
            "Discontinue use if irritation persists".to_string(),
            "Consult a dermatologist if you have concerns".to_string(),
        ],
        None => Vec::new(),
    };

    SafetyBlock {
        title: "Safety Information".to_string(),
        side_effects: side_effects
            .unwrap_or("No known side effects for most users.")
            .to_string(),
        precautions,
        warnings,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainIngredient {
    pub name: String,
    pub concentration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientItem {
    pub name: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientsBlock {
    pub title: String,
    pub main_ingredient: MainIngredient,
    pub all_ingredients: Vec<IngredientItem>,
}

fn ingredient_purpose(ingredient: &str) -> &'static str {
    match ingredient.to_lowercase().as_str() {
        "vitamin c" => "Brightening and antioxidant protection",
        "hyaluronic acid" => "Deep hydration and plumping",
        "niacinamide" => "Pore refining and skin barrier support",
        "retinol" => "Anti-aging and skin renewal",
        _ => "Supports overall skin health",
    }
}

pub fn ingredients(product: &Product) -> IngredientsBlock {
    IngredientsBlock {
        title: "Key Ingredients".to_string(),
        main_ingredient: MainIngredient {
            name: product.facts().main_ingredient.to_string(),
            concentration: product.concentration.clone(),
        },
        all_ingredients: product
            .key_ingredients
            .iter()
            .map(|name| IngredientItem {
                name: name.clone(),
                purpose: ingredient_purpose(name).to_string(),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinTypeBlock {
    pub title: String,
    pub target_skin_types: Vec<String>,
    pub recommendation: String,
    pub additional_info: String,
}

pub fn skin_type(product: &Product) -> SkinTypeBlock {
    let additional_info = product
        .skin_type
        .iter()
        .map(|t| match t.as_str() {
            "Oily" => "Helps control excess sebum without clogging pores",
            "Combination" => "Balances different skin zones effectively",
            "Dry" => "Provides intensive hydration and nourishment",
            "Sensitive" => "Gentle formula minimizes irritation risk",
            _ => "Suitable for daily use",
        })
        .collect::<Vec<_>>()
        .join(". ");

    SkinTypeBlock {
        title: "Suitable For".to_string(),
        target_skin_types: product.skin_type.clone(),
        recommendation: format!(
            "Specially formulated for {} skin types.",
            product.skin_type.join(" and ")
        ),
        additional_info,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientComparison {
    pub common: Vec<String>,
    pub unique_to_product_a: Vec<String>,
    pub unique_to_product_b: Vec<String>,
    pub analysis: String,
}

pub fn compare_ingredients(a: &Product, b: &Product) -> IngredientComparison {
    let common: Vec<String> = a
        .key_ingredients
        .iter()
        .filter(|i| b.key_ingredients.contains(i))
        .cloned()
        .collect();
    let unique_to_a: Vec<String> = a
        .key_ingredients
        .iter()
        .filter(|i| !b.key_ingredients.contains(i))
        .cloned()
        .collect();
    let unique_to_b: Vec<String> = b
        .key_ingredients
        .iter()
        .filter(|i| !a.key_ingredients.contains(i))
        .cloned()
        .collect();

    let mut analysis = String::new();
    if !common.is_empty() {
        analysis.push_str(&format!(
            "Both products share {}, providing similar core benefits. ",
            common.join(", ")
        ));
    }
    if !unique_to_a.is_empty() {
        analysis.push_str(&format!(
            "Product A uniquely contains {}. ",
            unique_to_a.join(", ")
        ));
    }
    if !unique_to_b.is_empty() {
        analysis.push_str(&format!(
            "Product B uniquely contains {}.",
            unique_to_b.join(", ")
        ));
    }

    IngredientComparison {
        common,
        unique_to_product_a: unique_to_a,
        unique_to_product_b: unique_to_b,
        analysis,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedProduct {
    pub name: String,
    pub price: String,
    pub numeric_price: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparison {
    pub product_a: PricedProduct,
    pub product_b: PricedProduct,
    pub difference: String,
    pub analysis: String,
    pub value_proposition: String,
}

/// First run of digits in a price string ("₹699" -> 699), or 0
pub fn parse_price(price: &str) -> u64 {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("valid regex"));
    re.find(price)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

pub fn compare_prices(a: &Product, b: &Product) -> PriceComparison {
    let price_a = parse_price(&a.price);
    let price_b = parse_price(&b.price);
    let difference = price_a.abs_diff(price_b);
    let (cheaper, pricier) = if price_a < price_b { (a, b) } else { (b, a) };

    let value_proposition = if difference < 100 {
        "Both products are similarly priced, making the choice dependent on specific ingredient preferences.".to_string()
    } else {
        format!(
            "{} offers better value for budget-conscious consumers, while {} may justify the premium through specialized ingredients or formulation.",
            cheaper.name, pricier.name
        )
    };

    PriceComparison {
        product_a: PricedProduct {
            name: a.name.clone(),
            price: a.price.clone(),
            numeric_price: price_a,
        },
        product_b: PricedProduct {
            name: b.name.clone(),
            price: b.price.clone(),
            numeric_price: price_b,
        },
        difference: format!("₹{}", difference),
        analysis: format!("{} is more affordable by ₹{}.", cheaper.name, difference),
        value_proposition,
    }
}
