//! Standard content pipeline wiring
//!
//! ```text
//! DataParserAgent ──> QuestionGenerationAgent ──> ContentGenerationAgent
//!        └──────────> ComparisonAgent
//! ```

use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use crate::agents::{
    ComparisonAgent, ContentGenerationAgent, DataParserAgent, QuestionGenerationAgent, DATA_PARSER,
    QUESTION_GENERATION,
};
use crate::config::Config;
use crate::core::{resolver, Coordinator};
use crate::llm::LlmClient;

/// Context key holding the product data file path
pub const PRODUCT_DATA_PATH: &str = "productDataPath";

/// Register the four content agents with their input shapes
pub fn register(coordinator: &mut Coordinator, config: &Config, llm: Arc<dyn LlmClient>) {
    coordinator.register_task_with_resolver(
        Arc::new(DataParserAgent::new()),
        resolver(|_, ctx| ctx.context_value(PRODUCT_DATA_PATH)),
    );
    coordinator.register_task_with_resolver(
        Arc::new(QuestionGenerationAgent::new(
            llm.clone(),
            config.app.question_categories.clone(),
            config.app.total_questions_target,
        )),
        resolver(|_, ctx| ctx.result(DATA_PARSER)),
    );
    coordinator.register_task_with_resolver(
        Arc::new(ContentGenerationAgent::new(
            llm.clone(),
            config.app.min_faq_items,
        )),
        resolver(|_, ctx| {
            json!({
                "product": ctx.result(DATA_PARSER),
                "questions": ctx.result(QUESTION_GENERATION),
            })
        }),
    );
    coordinator.register_task_with_resolver(
        Arc::new(ComparisonAgent::new(llm)),
        resolver(|_, ctx| ctx.result(DATA_PARSER)),
    );
}

/// Coordinator with the content agents registered and the product path set
pub fn build(config: &Config, llm: Arc<dyn LlmClient>, product_path: &Path) -> Coordinator {
    let mut coordinator = Coordinator::new();
    register(&mut coordinator, config, llm);
    coordinator.set_context_value(PRODUCT_DATA_PATH, product_path.display().to_string());
    coordinator
}
