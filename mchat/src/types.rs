//! Loop policy and turn outcomes.

use mcommon::GenerationOptions;
use mprovider::{ModelResponse, StopReason, TokenUsage};

pub const DEFAULT_MAX_ROUNDS: u32 = 5;
pub const DEFAULT_CONTINUATION_PROMPT: &str = "Please continue.";
pub const FALLBACK_ANSWER: &str = "Unable to generate a response.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatPolicy {
    max_rounds: u32,
    pub continuation_prompt: String,
    pub options: GenerationOptions,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            continuation_prompt: DEFAULT_CONTINUATION_PROMPT.to_string(),
            options: GenerationOptions::default(),
        }
    }
}

impl ChatPolicy {
    /// Zero is raised to one; every turn makes at least one model call.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn with_continuation_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.continuation_prompt = prompt.into();
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }
}

/// Result of one orchestration run.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// The model reached `end_turn` or `stop_sequence`.
    Completed {
        response: ModelResponse,
        rounds: u32,
        usage: TokenUsage,
    },
    /// Every round was spent on tool use or continuations.
    Exhausted { rounds: u32, usage: TokenUsage },
}

impl LoopOutcome {
    pub fn rounds(&self) -> u32 {
        match self {
            Self::Completed { rounds, .. } | Self::Exhausted { rounds, .. } => *rounds,
        }
    }

    /// Token usage summed over every model call of the run.
    pub fn usage(&self) -> TokenUsage {
        match self {
            Self::Completed { usage, .. } | Self::Exhausted { usage, .. } => *usage,
        }
    }

    pub fn response(&self) -> Option<&ModelResponse> {
        match self {
            Self::Completed { response, .. } => Some(response),
            Self::Exhausted { .. } => None,
        }
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.response().map(|response| &response.stop_reason)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    pub fn into_answer(self) -> Answer {
        Answer::from(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    /// The final response carried no text block.
    Empty,
    /// The round budget ran out before a final response.
    Exhausted,
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Empty | Self::Exhausted => None,
        }
    }

    pub fn text_or_fallback(&self) -> &str {
        self.as_text().unwrap_or(FALLBACK_ANSWER)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

impl From<LoopOutcome> for Answer {
    fn from(value: LoopOutcome) -> Self {
        match value {
            LoopOutcome::Completed { response, .. } => response
                .first_text()
                .map(|text| Self::Text(text.to_string()))
                .unwrap_or(Self::Empty),
            LoopOutcome::Exhausted { .. } => Self::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use mprovider::{Message, ProviderId, Role};

    use super::*;

    fn completed(message: Message) -> LoopOutcome {
        LoopOutcome::Completed {
            response: ModelResponse {
                provider: ProviderId::Bedrock,
                model: "model".to_string(),
                message,
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            },
            rounds: 1,
            usage: TokenUsage::default(),
        }
    }

    #[test]
    fn policy_clamps_round_budget_to_one() {
        assert_eq!(ChatPolicy::default().max_rounds(), 5);
        assert_eq!(ChatPolicy::default().with_max_rounds(0).max_rounds(), 1);
        assert_eq!(ChatPolicy::default().with_max_rounds(8).max_rounds(), 8);
    }

    #[test]
    fn answer_takes_first_text_block() {
        let answer = completed(Message::assistant_text("Done.")).into_answer();
        assert_eq!(answer, Answer::Text("Done.".to_string()));
        assert_eq!(answer.text_or_fallback(), "Done.");
    }

    #[test]
    fn empty_and_exhausted_answers_are_distinct_but_share_fallback() {
        let empty = completed(Message::new(Role::Assistant, Vec::new())).into_answer();
        let exhausted = LoopOutcome::Exhausted {
            rounds: 5,
            usage: TokenUsage::default(),
        }
        .into_answer();

        assert_eq!(empty, Answer::Empty);
        assert!(exhausted.is_exhausted());
        assert_ne!(empty, exhausted);
        assert_eq!(empty.text_or_fallback(), FALLBACK_ANSWER);
        assert_eq!(exhausted.text_or_fallback(), FALLBACK_ANSWER);
    }
}
