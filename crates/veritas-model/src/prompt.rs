//! The credibility prompt.

use veritas_core::record::Language;

/// Build the prompt sent to the model for `news_text`, asking for the
/// reason to be written in `language`.
pub fn build_prompt(news_text: &str, language: Language) -> String {
  format!(
    r#"
You are a multilingual fake news detection expert. Analyze the following news text and provide your assessment.

If the news is not in {language}, first translate it to {language}.

Respond strictly in this JSON format (use {language} for the reason):

{{
  "verdict": "Fake" or "Real" or "Uncertain",
  "reason": "Short explanation in {language}",
  "credibility_score": 0-100
}}

News text to analyze:
"""
{news_text}
"""
"#
  )
}
