use serde_json::Value;

use crate::state::PersistedState;

/// What a host expects from embeddable question-like content.
pub trait QuestionContract {
    /// Whether the user made a persistable edit since the last reset.
    fn answer_given(&self) -> bool;

    /// Restore the initial parameters and re-derive the content.
    fn reset_task(&mut self);

    /// State to persist, or `None` when there is nothing to store.
    fn current_state(&self) -> Option<PersistedState>;

    /// xAPI data for reporting.
    fn xapi_data(&self) -> Option<Value>;
}
