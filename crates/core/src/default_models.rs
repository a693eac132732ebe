//! Built-in model catalog used to seed and restore provider files.

use indexmap::IndexMap;

use crate::model::{Model, CREATED_BY_SYSTEM};

struct DefaultModel {
    name: &'static str,
    description: &'static str,
    recommended_for: &'static [&'static str],
    is_default: bool,
    context_window: u64,
}

const OPENAI: &[DefaultModel] = &[
    DefaultModel {
        name: "gpt-4o",
        description: "OpenAI's latest and most capable multimodal model.",
        recommended_for: &["general", "chat", "analysis", "code generation"],
        is_default: true,
        context_window: 128_000,
    },
    DefaultModel {
        name: "gpt-4-turbo",
        description: "GPT-4 Turbo with a 128k context window.",
        recommended_for: &["general", "chat", "complex analysis"],
        is_default: false,
        context_window: 128_000,
    },
    DefaultModel {
        name: "gpt-3.5-turbo",
        description: "Fast, low-cost model for general tasks.",
        recommended_for: &["quick chat", "summarization", "translation"],
        is_default: false,
        context_window: 16_385,
    },
];

const ANTHROPIC: &[DefaultModel] = &[
    DefaultModel {
        name: "claude-3-opus-20240229",
        description: "Anthropic's most powerful model for complex tasks.",
        recommended_for: &["research", "development", "high-level analysis"],
        is_default: true,
        context_window: 200_000,
    },
    DefaultModel {
        name: "claude-3-sonnet-20240229",
        description: "Balance of intelligence and speed for enterprise workloads.",
        recommended_for: &["data processing", "recommendations", "code generation"],
        is_default: false,
        context_window: 200_000,
    },
    DefaultModel {
        name: "claude-3-haiku-20240307",
        description: "Fastest, most compact model for near-instant responses.",
        recommended_for: &["customer interaction", "content moderation", "cost-saving tasks"],
        is_default: false,
        context_window: 200_000,
    },
];

const GOOGLE: &[DefaultModel] = &[
    DefaultModel {
        name: "gemini-1.5-pro-latest",
        description: "Next-generation mid-size multimodal model for a wide range of tasks.",
        recommended_for: &["general", "chat", "multimodal"],
        is_default: true,
        context_window: 1_048_576,
    },
    DefaultModel {
        name: "gemini-1.0-pro",
        description: "First-generation model optimized for natural language tasks.",
        recommended_for: &["chat", "text"],
        is_default: false,
        context_window: 32_768,
    },
];

const OPENROUTER: &[DefaultModel] = &[DefaultModel {
    name: "openrouter-default",
    description: "Generic model via OpenRouter (replace or add specific ones).",
    recommended_for: &["general", "experimental"],
    is_default: true,
    context_window: 32_000,
}];

const OLLAMA: &[DefaultModel] = &[DefaultModel {
    name: "ollama-default",
    description: "Generic model via Ollama (configure the real model name).",
    recommended_for: &["local", "experimental"],
    is_default: true,
    context_window: 8_000,
}];

const DEEPSEEK: &[DefaultModel] = &[DefaultModel {
    name: "deepseek-coder",
    description: "DeepSeek model specialized in coding.",
    recommended_for: &["code generation", "code assistance"],
    is_default: true,
    context_window: 16_000,
}];

const OPENAI_COMPATIBLE: &[DefaultModel] = &[DefaultModel {
    name: "openai-compatible-default",
    description: "Generic model for OpenAI-compatible endpoints.",
    recommended_for: &["general", "custom llm"],
    is_default: true,
    context_window: 8_000,
}];

const FIREWORKS: &[DefaultModel] = &[DefaultModel {
    name: "fireworks-default",
    description: "Generic model via Fireworks AI.",
    recommended_for: &["experimental", "fast inference"],
    is_default: true,
    context_window: 32_000,
}];

const CATALOG: &[(&str, &[DefaultModel])] = &[
    ("OpenAI", OPENAI),
    ("Anthropic", ANTHROPIC),
    ("Google", GOOGLE),
    ("openrouter", OPENROUTER),
    ("ollama", OLLAMA),
    ("deepseek", DEEPSEEK),
    ("openai-compatible", OPENAI_COMPATIBLE),
    ("fireworks", FIREWORKS),
];

impl DefaultModel {
    fn to_model(&self, provider: &str) -> Model {
        Model {
            description: self.description.to_string(),
            recommended_for: self.recommended_for.iter().map(ToString::to_string).collect(),
            is_default: self.is_default,
            context_window: Some(self.context_window),
            created_by: CREATED_BY_SYSTEM.to_string(),
            ..Model::new(self.name, provider)
        }
    }
}

/// Providers that have built-in defaults, in catalog order.
pub fn default_providers() -> Vec<&'static str> {
    CATALOG.iter().map(|(provider, _)| *provider).collect()
}

/// Fresh default models for `provider`, or None if it isn't in the catalog.
pub fn default_models_for(provider: &str) -> Option<Vec<Model>> {
    CATALOG
        .iter()
        .find(|(name, _)| *name == provider)
        .map(|(name, models)| models.iter().map(|m| m.to_model(name)).collect())
}

/// The whole catalog, keyed by provider.
pub fn default_catalog() -> IndexMap<String, Vec<Model>> {
    CATALOG
        .iter()
        .map(|(provider, models)| {
            (
                (*provider).to_string(),
                models.iter().map(|m| m.to_model(provider)).collect(),
            )
        })
        .collect()
}
