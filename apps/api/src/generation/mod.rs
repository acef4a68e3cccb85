pub mod activity;
pub mod budget;
pub mod context;
pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod processor;
pub mod prompt_builder;
pub mod prompts;

/// Whether the request is one standalone lesson or one slot of a multi-week
/// plan. Multi-week prompts run once per lesson slot, so their context is
/// condensed to bound cost and latency; single-lesson prompts can afford the
/// fuller, more defensive variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    SingleLesson,
    MultiWeek,
}
