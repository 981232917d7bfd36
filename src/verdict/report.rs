/// Result aggregation: fold the worker's outcome token and the request's
/// metadata into the final record. Pure and total, no other logic.
use crate::config::types::{EvalResult, ExecutionRequest, Outcome};

pub fn finalize(outcome: Outcome, request: &ExecutionRequest) -> EvalResult {
    EvalResult {
        passed: outcome.is_passed(),
        completion_id: request.completion_id,
        task_id: request.task_id.clone(),
        outcome,
    }
}
