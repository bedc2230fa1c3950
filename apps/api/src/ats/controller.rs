//! Interaction Controller: resolves which action fired, validates its inputs,
//! and runs extraction → normalization → generation for it.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ats::prompts::{
    ANALYSIS_TEMPLATE, IMPROVEMENT_TEMPLATE, KEYWORD_GAP_TEMPLATE, MATCH_PERCENTAGE_TEMPLATE,
    QUERY_TEMPLATE,
};
use crate::llm_client::{respond, TextGenerator};
use crate::resume::extract::{ExtractError, PageExtractor};
use crate::resume::normalize::normalize;
use crate::resume::ResumeError;

pub const UPLOAD_ADVISORY: &str = "Please upload a PDF file to proceed.";

/// The five user actions, declared in trigger priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Analyze,
    ImproveSkills,
    MissingKeywords,
    PercentageMatch,
    AnswerQuery,
}

impl Intent {
    /// Priority order: when several triggers are set, the earliest wins.
    pub const ALL: [Intent; 5] = [
        Intent::Analyze,
        Intent::ImproveSkills,
        Intent::MissingKeywords,
        Intent::PercentageMatch,
        Intent::AnswerQuery,
    ];

    /// Form field name of the trigger.
    pub fn field_name(self) -> &'static str {
        match self {
            Intent::Analyze => "analyze",
            Intent::ImproveSkills => "improve_skills",
            Intent::MissingKeywords => "missing_keywords",
            Intent::PercentageMatch => "percentage_match",
            Intent::AnswerQuery => "answer_query",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.field_name() == name)
    }

    pub fn template(self) -> &'static str {
        match self {
            Intent::Analyze => ANALYSIS_TEMPLATE,
            Intent::ImproveSkills => IMPROVEMENT_TEMPLATE,
            Intent::MissingKeywords => KEYWORD_GAP_TEMPLATE,
            Intent::PercentageMatch => MATCH_PERCENTAGE_TEMPLATE,
            Intent::AnswerQuery => QUERY_TEMPLATE,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Intent::Analyze => "Analysis Result",
            Intent::ImproveSkills => "Improvement Suggestions",
            Intent::MissingKeywords => "Missing Keywords",
            Intent::PercentageMatch => "Match Percentage & Recommendations",
            Intent::AnswerQuery => "Response",
        }
    }

    /// Picks the secondary prompt input, or the validation message when a
    /// required one is blank.
    fn secondary<'a>(
        self,
        job_description: &'a str,
        query: &'a str,
    ) -> Result<Option<&'a str>, &'static str> {
        match self {
            Intent::Analyze => Ok(None),
            Intent::ImproveSkills => Ok(Some(job_description)),
            Intent::MissingKeywords if job_description.trim().is_empty() => {
                Err("Please provide a job description to identify missing keywords.")
            }
            Intent::PercentageMatch if job_description.trim().is_empty() => {
                Err("Please provide a job description to calculate the match percentage.")
            }
            Intent::MissingKeywords | Intent::PercentageMatch => Ok(Some(job_description)),
            Intent::AnswerQuery if query.trim().is_empty() => {
                Err("Please enter a query to proceed.")
            }
            Intent::AnswerQuery => Ok(Some(query)),
        }
    }
}

/// One flag per action button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triggers {
    pub analyze: bool,
    pub improve_skills: bool,
    pub missing_keywords: bool,
    pub percentage_match: bool,
    pub answer_query: bool,
}

impl Triggers {
    pub fn set(&mut self, intent: Intent) {
        *self.flag_mut(intent) = true;
    }

    pub fn is_set(&self, intent: Intent) -> bool {
        match intent {
            Intent::Analyze => self.analyze,
            Intent::ImproveSkills => self.improve_skills,
            Intent::MissingKeywords => self.missing_keywords,
            Intent::PercentageMatch => self.percentage_match,
            Intent::AnswerQuery => self.answer_query,
        }
    }

    /// The highest-priority trigger that is set.
    pub fn first(&self) -> Option<Intent> {
        Intent::ALL.into_iter().find(|&i| self.is_set(i))
    }

    fn flag_mut(&mut self, intent: Intent) -> &mut bool {
        match intent {
            Intent::Analyze => &mut self.analyze,
            Intent::ImproveSkills => &mut self.improve_skills,
            Intent::MissingKeywords => &mut self.missing_keywords,
            Intent::PercentageMatch => &mut self.percentage_match,
            Intent::AnswerQuery => &mut self.answer_query,
        }
    }
}

/// Everything the display layer submits for one interaction cycle.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub resume_pdf: Option<Bytes>,
    pub job_description: String,
    pub query: String,
    pub triggers: Triggers,
}

/// What the display layer should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Result { heading: String, body: String },
    Error { message: String },
    Warning { message: String },
    Idle,
}

impl Outcome {
    fn error(message: impl Into<String>) -> Self {
        Outcome::Error {
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct Controller {
    extractor: Arc<dyn PageExtractor>,
    generator: Arc<dyn TextGenerator>,
}

impl Controller {
    pub fn new(extractor: Arc<dyn PageExtractor>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            extractor,
            generator,
        }
    }

    pub async fn handle(&self, interaction: Interaction) -> Outcome {
        let Some(intent) = interaction.triggers.first() else {
            debug!("No trigger set");
            return Outcome::Idle;
        };

        let Some(pdf) = interaction.resume_pdf.filter(|b| !b.is_empty()) else {
            info!("{intent:?} requested without an uploaded file");
            return Outcome::Warning {
                message: UPLOAD_ADVISORY.to_string(),
            };
        };

        let resume_text = match self.load_resume(pdf).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Resume ingestion failed: {e}");
                return Outcome::error(e.to_string());
            }
        };

        let secondary = match intent.secondary(&interaction.job_description, &interaction.query) {
            Ok(secondary) => secondary,
            Err(message) => {
                info!("{intent:?} rejected: {message}");
                return Outcome::error(message);
            }
        };

        info!(
            "Running {intent:?} (resume: {} chars, secondary: {} chars)",
            resume_text.len(),
            secondary.map_or(0, str::len)
        );
        let body = respond(
            self.generator.as_ref(),
            intent.template(),
            &resume_text,
            secondary,
        )
        .await;

        Outcome::Result {
            heading: intent.heading().to_string(),
            body,
        }
    }

    /// Extracts pages on the blocking pool, then normalizes them.
    async fn load_resume(&self, pdf: Bytes) -> Result<String, ResumeError> {
        let extractor = Arc::clone(&self.extractor);
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&pdf))
            .await
            .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))??;

        debug!("Extracted {} page(s)", pages.len());
        Ok(normalize(&pages)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::llm_client::tests::StubGenerator;
    use crate::llm_client::GenerationError;
    use crate::resume::extract::tests::StubExtractor;

    fn controller(extractor: &Arc<StubExtractor>, generator: &Arc<StubGenerator>) -> Controller {
        Controller::new(extractor.clone(), generator.clone())
    }

    fn interaction(intent: Intent, jd: &str, query: &str) -> Interaction {
        let mut triggers = Triggers::default();
        triggers.set(intent);
        Interaction {
            resume_pdf: Some(Bytes::from_static(b"%PDF-1.4 stub")),
            job_description: jd.to_string(),
            query: query.to_string(),
            triggers,
        }
    }

    #[test]
    fn test_field_names_round_trip() {
        for intent in Intent::ALL {
            assert_eq!(Intent::from_field_name(intent.field_name()), Some(intent));
        }
        assert_eq!(Intent::from_field_name("submit"), None);
    }

    #[test]
    fn test_first_trigger_respects_priority() {
        let mut triggers = Triggers::default();
        assert_eq!(triggers.first(), None);
        triggers.set(Intent::AnswerQuery);
        triggers.set(Intent::MissingKeywords);
        assert_eq!(triggers.first(), Some(Intent::MissingKeywords));
        triggers.set(Intent::Analyze);
        assert_eq!(triggers.first(), Some(Intent::Analyze));
    }

    #[test]
    fn test_outcome_serializes_with_kind_tag() {
        let outcome = Outcome::Result {
            heading: "Response".into(),
            body: "ok".into(),
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"kind": "result", "heading": "Response", "body": "ok"})
        );
        assert_eq!(
            serde_json::to_value(Outcome::Idle).unwrap(),
            serde_json::json!({"kind": "idle"})
        );
    }

    #[tokio::test]
    async fn test_no_trigger_is_idle() {
        let extractor = StubExtractor::pages(&["Resume"]);
        let generator = Arc::new(StubGenerator::replying("unused"));
        let outcome = controller(&extractor, &generator)
            .handle(Interaction {
                resume_pdf: Some(Bytes::from_static(b"pdf")),
                ..Default::default()
            })
            .await;
        assert_eq!(outcome, Outcome::Idle);
        assert_eq!(extractor.call_count(), 0);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_every_trigger_without_upload_warns() {
        for intent in Intent::ALL {
            let extractor = StubExtractor::pages(&["Resume"]);
            let generator = Arc::new(StubGenerator::replying("unused"));
            let mut input = interaction(intent, "jd", "query");
            input.resume_pdf = None;

            let outcome = controller(&extractor, &generator).handle(input).await;
            assert_eq!(
                outcome,
                Outcome::Warning {
                    message: UPLOAD_ADVISORY.to_string()
                }
            );
            assert_eq!(extractor.call_count(), 0);
            assert_eq!(generator.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_empty_upload_counts_as_missing() {
        let extractor = StubExtractor::pages(&["Resume"]);
        let generator = Arc::new(StubGenerator::replying("unused"));
        let mut input = interaction(Intent::Analyze, "", "");
        input.resume_pdf = Some(Bytes::new());

        let outcome = controller(&extractor, &generator).handle(input).await;
        assert!(matches!(outcome, Outcome::Warning { .. }));
        assert_eq!(extractor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_uses_normalized_resume() {
        let extractor = StubExtractor::pages(&["JaneDoe\nSkillsRust5Years"]);
        let generator = Arc::new(StubGenerator::replying("  Solid profile. "));
        let outcome = controller(&extractor, &generator)
            .handle(interaction(Intent::Analyze, "ignored jd", ""))
            .await;

        assert_eq!(
            outcome,
            Outcome::Result {
                heading: "Analysis Result".into(),
                body: "  Solid profile. ".into(),
            }
        );
        assert_eq!(generator.call_count(), 1);
        assert_eq!(
            generator.last_prompt().unwrap(),
            "Analyze the resume in Jane Doe Skills Rust 5 Years and provide strengths & weaknesses and keep it to the point.."
        );
    }

    #[tokio::test]
    async fn test_improve_skills_allows_blank_jd() {
        let extractor = StubExtractor::pages(&["Resume"]);
        let generator = Arc::new(StubGenerator::replying("Learn Kubernetes."));
        let outcome = controller(&extractor, &generator)
            .handle(interaction(Intent::ImproveSkills, "", ""))
            .await;

        assert_eq!(
            outcome,
            Outcome::Result {
                heading: "Improvement Suggestions".into(),
                body: "Learn Kubernetes.".into(),
            }
        );
        assert!(generator
            .last_prompt()
            .unwrap()
            .contains("based on  if provided"));
    }

    #[tokio::test]
    async fn test_jd_required_actions_reject_blank_jd() {
        let cases = [
            (
                Intent::MissingKeywords,
                "Please provide a job description to identify missing keywords.",
            ),
            (
                Intent::PercentageMatch,
                "Please provide a job description to calculate the match percentage.",
            ),
        ];
        for (intent, message) in cases {
            let extractor = StubExtractor::pages(&["Resume"]);
            let generator = Arc::new(StubGenerator::replying("unused"));
            let outcome = controller(&extractor, &generator)
                .handle(interaction(intent, "  \n ", "query"))
                .await;
            assert_eq!(outcome, Outcome::error(message));
            assert_eq!(generator.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_percentage_match_with_jd() {
        let extractor = StubExtractor::pages(&["Resume"]);
        let generator = Arc::new(StubGenerator::replying("72%"));
        let outcome = controller(&extractor, &generator)
            .handle(interaction(Intent::PercentageMatch, "Senior Rust role", ""))
            .await;

        assert_eq!(
            outcome,
            Outcome::Result {
                heading: "Match Percentage & Recommendations".into(),
                body: "72%".into(),
            }
        );
        assert_eq!(
            generator.last_prompt().unwrap(),
            "Calculate a match percentage for the resume Resume against the job description Senior Rust role and list missing keywords and keep it to the point."
        );
    }

    #[tokio::test]
    async fn test_answer_query_requires_query() {
        let extractor = StubExtractor::pages(&["Resume"]);
        let generator = Arc::new(StubGenerator::replying("unused"));
        let outcome = controller(&extractor, &generator)
            .handle(interaction(Intent::AnswerQuery, "jd present", " "))
            .await;
        assert_eq!(outcome, Outcome::error("Please enter a query to proceed."));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_answer_query_sends_query_verbatim() {
        let extractor = StubExtractor::pages(&["Resume"]);
        let generator = Arc::new(StubGenerator::replying("Yes."));
        let outcome = controller(&extractor, &generator)
            .handle(interaction(Intent::AnswerQuery, "jd", "Am I a fit for SRE?"))
            .await;
        assert_eq!(
            outcome,
            Outcome::Result {
                heading: "Response".into(),
                body: "Yes.".into(),
            }
        );
        assert_eq!(generator.last_prompt().unwrap(), "Am I a fit for SRE?");
    }

    #[tokio::test]
    async fn test_only_highest_priority_trigger_runs() {
        let extractor = StubExtractor::pages(&["Resume"]);
        let generator = Arc::new(StubGenerator::replying("done"));
        let mut input = interaction(Intent::AnswerQuery, "", "question");
        input.triggers.set(Intent::MissingKeywords);

        // MissingKeywords outranks AnswerQuery and fails validation on the blank JD.
        let outcome = controller(&extractor, &generator).handle(input).await;
        assert_eq!(
            outcome,
            Outcome::error("Please provide a job description to identify missing keywords.")
        );
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_is_reported() {
        let extractor = StubExtractor::failing("invalid xref table");
        let generator = Arc::new(StubGenerator::replying("unused"));
        let outcome = controller(&extractor, &generator)
            .handle(interaction(Intent::Analyze, "", ""))
            .await;
        assert_eq!(
            outcome,
            Outcome::error("Error processing PDF: invalid xref table")
        );
        assert_eq!(extractor.call_count(), 1);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_image_only_pdf_reports_no_text() {
        let extractor = StubExtractor::pages(&["", "  \n"]);
        let generator = Arc::new(StubGenerator::replying("unused"));
        let outcome = controller(&extractor, &generator)
            .handle(interaction(Intent::Analyze, "", ""))
            .await;
        assert_eq!(outcome, Outcome::error("Error: No text found in PDF."));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_is_shown_under_heading() {
        let extractor = StubExtractor::pages(&["Resume"]);
        let generator = Arc::new(StubGenerator::with_result(Err(GenerationError::Api(
            "403 PERMISSION_DENIED: API key expired".into(),
        ))));
        let outcome = controller(&extractor, &generator)
            .handle(interaction(Intent::MissingKeywords, "Go developer", ""))
            .await;
        assert_eq!(
            outcome,
            Outcome::Result {
                heading: "Missing Keywords".into(),
                body: "Error calling Gemini API: 403 PERMISSION_DENIED: API key expired".into(),
            }
        );
    }
}
