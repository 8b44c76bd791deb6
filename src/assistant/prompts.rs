use crate::core::types::truncate_chars;

/// Characters of each document sent along with a comparison request.
pub const COMPARISON_CONTEXT_CHARS: usize = 8000;
pub const SUMMARY_CONTEXT_CHARS: usize = 15000;
pub const SUGGESTION_CONTEXT_CHARS: usize = 8000;
pub const EXPLAIN_CONTEXT_CHARS: usize = 3000;

const ASSISTANT_SYSTEM: &str = "You are a helpful assistant that answers questions using the provided document \
context. If the answer is not contained in the context, say so.";

pub fn comparison_prompt(
    text_a: &str,
    text_b: &str,
    filename_a: &str,
    filename_b: &str,
    change_count: usize,
) -> String {
    let mut text = String::new();
    text.push_str("Compare these two documents and analyze the differences:\n\n");
    text.push_str(&format!("Document 1 ({filename_a}):\n"));
    text.push_str(truncate_chars(text_a, COMPARISON_CONTEXT_CHARS));
    text.push_str(&format!("\n\nDocument 2 ({filename_b}):\n"));
    text.push_str(truncate_chars(text_b, COMPARISON_CONTEXT_CHARS));
    text.push_str(&format!(
        "\n\nI detected {change_count} differences. Please provide:\n"
    ));
    text.push_str("1. **Summary of Key Differences:** What are the main changes between these documents?\n");
    text.push_str("2. **What was Added, Removed, or Changed:** Provide specific details about the differences.\n\n");
    text.push_str("Be specific and focus on the actual content changes, not just formatting.");
    text
}

pub fn ask_prompt(question: &str, context: &str) -> String {
    format!("{ASSISTANT_SYSTEM}\n\nDocument contents:\n{context}\n\nQuestion: {question}")
}

pub fn summary_prompt(text: &str) -> String {
    format!(
        "Provide a concise summary in 5 bullet points of the following document:\n{}",
        truncate_chars(text, SUMMARY_CONTEXT_CHARS)
    )
}

pub fn suggestions_prompt(text: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Based on the following document, generate 3 smart, specific questions that users might want to ask. ");
    prompt.push_str("Focus on deadlines, risks, key decisions, requirements, or important details. ");
    prompt.push_str("Return only the questions, one per line:\n\n");
    prompt.push_str(truncate_chars(text, SUGGESTION_CONTEXT_CHARS));
    prompt
}

pub fn explain_prompt(selection: &str, context: Option<&str>) -> String {
    let mut prompt = String::new();
    prompt.push_str("Explain the following text in simple, clear terms. If it's technical, break it down for easy understanding:");
    prompt.push_str("\n\nText to explain: ");
    prompt.push_str(selection);
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("\n\nDocument context: ");
        prompt.push_str(truncate_chars(context, EXPLAIN_CONTEXT_CHARS));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_prompt_truncates_each_document() {
        let a = "a".repeat(COMPARISON_CONTEXT_CHARS + 500);
        let b = "b".repeat(10);
        let prompt = comparison_prompt(&a, &b, "one.txt", "two.txt", 7);
        assert!(prompt.contains(&"a".repeat(COMPARISON_CONTEXT_CHARS)));
        assert!(!prompt.contains(&"a".repeat(COMPARISON_CONTEXT_CHARS + 1)));
        assert!(prompt.contains("Document 1 (one.txt)"));
        assert!(prompt.contains("Document 2 (two.txt)"));
        assert!(prompt.contains("I detected 7 differences"));
    }

    #[test]
    fn explain_prompt_skips_blank_context() {
        assert!(!explain_prompt("term", Some("  ")).contains("Document context"));
        assert!(explain_prompt("term", Some("ctx")).contains("Document context: ctx"));
    }
}
