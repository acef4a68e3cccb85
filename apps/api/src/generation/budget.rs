/// Context-size policy for multi-week prompts.
///
/// Multi-week plan generation calls the model once per lesson slot, so every
/// truncation constant that bounds prompt length lives here instead of being
/// scattered across the context builders.
#[derive(Debug, Clone, Copy)]
pub struct ContextBudget {
    /// Anti-repetition: how many forbidden names are listed literally before
    /// collapsing the rest into a count.
    pub max_forbidden_names: usize,
    /// Progression: how many of the most recent prior lessons are summarized.
    pub recent_lessons: usize,
    /// Progression: how many exercise names are listed per summarized lesson.
    pub names_per_recent_lesson: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            max_forbidden_names: 20,
            recent_lessons: 3,
            names_per_recent_lesson: 3,
        }
    }
}
