//! Advisory description analysis.
//!
//! Sends a from-scratch job's free-text description to a chat-completion
//! capability and records the response on the job as an annotation. The
//! response is informational only and never influences model selection.

use kiln_models::{ChatMessage, CompletionClient, CompletionError};
use kiln_training::TrainingRequest;
use tracing::debug;

const ADVISOR_TEMPERATURE: f32 = 0.7;

/// Builds the analysis prompt from the request's description and context.
#[must_use]
pub fn analysis_prompt(request: &TrainingRequest) -> String {
    format!(
        "Analyze this model description and suggest the best configuration:\n\n\
         Description: {}\n\n\
         Task Type: {}\n\
         Training Mode: {}\n\n\
         Provide recommendations for:\n\
         1. Best base model to use\n\
         2. Optimal hyperparameters\n\
         3. Dataset suggestions\n\
         4. Training strategy\n\n\
         Respond in JSON format.",
        request.model_description.as_deref().unwrap_or_default(),
        request.task_type,
        request.training_mode.as_str(),
    )
}

/// Runs the advisory analysis and returns the model's free-text response.
///
/// Callers swallow the error path: analysis failures are logged on the job
/// and the pipeline proceeds.
pub async fn analyze_description(
    client: &CompletionClient,
    model: &str,
    request: &TrainingRequest,
) -> Result<String, CompletionError> {
    debug!(model_id = %request.model_id, "Requesting advisory analysis");
    let messages = [ChatMessage::user(analysis_prompt(request))];
    client.chat_completion(model, &messages, Some(ADVISOR_TEMPERATURE)).await
}
