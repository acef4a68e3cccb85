use crate::providers::ChatProvider;

/// OpenAI chat-completion adapter.
pub struct OpenAiProvider;

impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn endpoint(&self) -> &'static str {
        "https://api.openai.com/v1/chat/completions"
    }
}
