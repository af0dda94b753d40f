//! Newsroom synthesis: merge three raw transcripts into a fact-checked bilingual article.
//!
//! The system instruction fixes editorial voice and verification discipline; the user prompt
//! carries the three transcripts as labelled blocks in fixed order (1, 2, 3).

/// System instruction for the article-generation model.
pub const NEWSROOM_SYSTEM: &str = r#"You are an elite AI Investigative Journalist, Chief Editor, and Fact-Checker for a top-tier international news agency.
Your goal is to synthesize raw transcripts into a piece of Pulitzer-grade journalism.

ROLE & RESPONSIBILITIES:
1. MERGE & ANALYZE: Read the provided transcripts. Identify distinct, newsworthy topics.
2. RIGOROUS FACT-CHECKING (CRITICAL):
   - You MUST use Google Search to verify every factual claim, statistic, and quote.
   - Categorize claims as "Verified", "Partially Verified", or "Unverified".
   - PRIORITIZE verified facts. Use cautious language ("allegedly", "reports suggest") for partially verified info.
   - DO NOT present unverified claims as facts.
3. WRITING STYLE (Human-Centric):
   - Write in a confident, professional newsroom voice (BBC/Reuters style).
   - NO "In this blog post" or "Here is a summary". Dive straight into the story.
   - Use phrasing like "According to reports...", "Official data indicates...".
   - Vary sentence structure. Avoid repetitive patterns.
4. URDU TRANSLATION:
   - Rewrite the final article in professional, journalistic Urdu (Nasta'liq style context).
   - NOT a literal translation. Adapt for flow and cultural nuance.

OUTPUT FORMAT:
Return ONLY a valid JSON object matching the requested schema. Do not wrap in markdown code blocks."#;

/// Placeholders in [`NEWSROOM_USER_TEMPLATE`], in script order.
pub const SCRIPT_PLACEHOLDERS: [&str; 3] = ["{script_1}", "{script_2}", "{script_3}"];

/// User prompt template: each placeholder is replaced with one raw transcript.
pub const NEWSROOM_USER_TEMPLATE: &str = r#"PROCESS THESE 3 SOURCE SCRIPTS:

--- SCRIPT 1 ---
{script_1}

--- SCRIPT 2 ---
{script_2}

--- SCRIPT 3 ---
{script_3}

EXECUTE THE FACT-CHECKING JOURNALISM PIPELINE.
1. Identify main topics.
2. Fact check all claims using Google Search.
3. Write the authenticated blog post.
4. Generate Urdu version.
5. Generate Assets (SEO, Images)."#;

/// Build the user prompt from the three transcripts.
///
/// Substitution runs left to right over the template's literal text, so a transcript that
/// itself contains `{script_2}` is never re-expanded.
pub fn newsroom_user_prompt(scripts: [&str; 3]) -> String {
    let mut out = String::with_capacity(
        NEWSROOM_USER_TEMPLATE.len() + scripts.iter().map(|s| s.len()).sum::<usize>(),
    );
    let mut rest = NEWSROOM_USER_TEMPLATE;
    for (placeholder, script) in SCRIPT_PLACEHOLDERS.iter().zip(scripts) {
        match rest.find(placeholder) {
            Some(at) => {
                out.push_str(&rest[..at]);
                out.push_str(script);
                rest = &rest[at + placeholder.len()..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}
