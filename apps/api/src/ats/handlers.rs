//! Axum route handlers for the ATS API.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::ats::controller::{Intent, Interaction, Outcome};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InteractResponse {
    pub interaction_id: Uuid,
    pub intent: Option<Intent>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// POST /api/v1/ats/interact
///
/// Multipart form: `resume` (PDF), `job_description`, `query`, and one flag
/// per action (`analyze`, `improve_skills`, `missing_keywords`,
/// `percentage_match`, `answer_query`) or an `action` field naming one.
pub async fn handle_interact(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<InteractResponse>, AppError> {
    let interaction = parse_interaction(multipart).await?;
    let interaction_id = Uuid::new_v4();
    let intent = interaction.triggers.first();

    let span = info_span!("interaction", id = %interaction_id, intent = ?intent);
    let outcome = state
        .controller
        .handle(interaction)
        .instrument(span)
        .await;

    Ok(Json(InteractResponse {
        interaction_id,
        intent,
        outcome,
    }))
}

/// Reads the form into an `Interaction`. Unknown fields are ignored.
async fn parse_interaction(mut multipart: Multipart) -> Result<Interaction, AppError> {
    let mut interaction = Interaction::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or("upload.pdf").to_string();
                let data = field.bytes().await?;
                info!("Received resume '{filename}' ({} bytes)", data.len());
                interaction.resume_pdf = Some(data);
            }
            "job_description" => interaction.job_description = field.text().await?,
            "query" => interaction.query = field.text().await?,
            "action" => {
                let value = field.text().await?;
                let intent = Intent::from_field_name(value.trim()).ok_or_else(|| {
                    AppError::Validation(format!("unknown action '{}'", value.trim()))
                })?;
                interaction.triggers.set(intent);
            }
            other => {
                if let Some(intent) = Intent::from_field_name(other) {
                    if is_pressed(&field.text().await?) {
                        interaction.triggers.set(intent);
                    }
                }
            }
        }
    }

    Ok(interaction)
}

/// A submitted trigger field counts as pressed unless its value explicitly
/// says otherwise. A `<button name="analyze">` without a value sends `analyze=`.
fn is_pressed(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "off" | "no"
    )
}
