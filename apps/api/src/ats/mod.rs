// Smart ATS: résumé analysis actions backed by Gemini.
// All LLM calls go through llm_client; all PDF access goes through resume::extract.

pub mod controller;
pub mod handlers;
pub mod prompts;
