use crate::providers::ChatProvider;

/// Groq chat-completion adapter. Groq exposes an OpenAI-compatible endpoint,
/// so only the URL differs from the OpenAI adapter.
pub struct GroqProvider;

impl ChatProvider for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn endpoint(&self) -> &'static str {
        "https://api.groq.com/openai/v1/chat/completions"
    }
}
