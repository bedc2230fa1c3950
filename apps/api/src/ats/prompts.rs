// All prompt templates for the ATS actions.
// Markers: `{text}` is the normalized résumé, `{jd}` the job description
// (or the user's query for the pass-through template).

/// "Tell me about the resume". No `{jd}` marker.
pub const ANALYSIS_TEMPLATE: &str = "Analyze the resume in {text} and provide strengths & weaknesses and keep it to the point..";

/// "How can I improve my skills". The job description is optional here.
pub const IMPROVEMENT_TEMPLATE: &str = "Analyze the resume in {text} and suggest skill improvements based on {jd} if provided, otherwise general suggestions and keep it to the point..";

pub const KEYWORD_GAP_TEMPLATE: &str = "Given the resume {text} and job description {jd}, identify keywords present in the job description but missing from the resume and keep it to the point..";

pub const MATCH_PERCENTAGE_TEMPLATE: &str = "Calculate a match percentage for the resume {text} against the job description {jd} and list missing keywords and keep it to the point.";

/// "Answer my query": the query itself is the whole prompt.
pub const QUERY_TEMPLATE: &str = "{jd}";

/// Fills `{text}` then `{jd}` markers. Literal replacement, no escaping;
/// missing markers are simply not substituted.
pub fn compose(template: &str, resume_text: &str, secondary: Option<&str>) -> String {
    template
        .replace("{text}", resume_text)
        .replace("{jd}", secondary.unwrap_or(""))
}
