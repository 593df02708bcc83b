//! Prompt text for paper analysis.

/// Instruction prompt opening every analysis request.
pub const ANALYSIS_PROMPT: &str = r"You are a professional academic research assistant. Using my local knowledge base (my earlier paper summaries and notes) as background, analyze the newly imported paper in depth.

Structure the report strictly as follows:

1. **Summary**: concisely state the problem the new paper addresses, its method and its conclusions.
2. **Relevance to the knowledge base**:
   - Which specific documents or concepts in my knowledge base does the new paper connect to? Cite file names or concepts from the knowledge base explicitly.
   - Does it support, contradict or extend any of my earlier notes?
3. **Novelty and differences**:
   - Compared with what I already know, what is the paper's main contribution?
   - Which methods or perspectives does it use that I have not recorded before?
4. **Research implications**:
   - Given my knowledge base, what could this paper mean for my research direction?

If the new paper is entirely unrelated to my knowledge base, say so directly.
";

/// Header introducing the inline notes block.
pub const KNOWLEDGE_BASE_HEADER: &str = "The following is my local knowledge-base text summary:";

/// Marker placed immediately before the target paper.
pub const TARGET_MARKER: &str = "The following is the newly imported paper:";

/// Join inline notes under the knowledge-base header.
#[must_use]
pub fn format_knowledge_block<'a>(notes: impl IntoIterator<Item = &'a str>) -> String {
    let body: Vec<&str> = notes.into_iter().collect();
    format!("{KNOWLEDGE_BASE_HEADER}\n{}", body.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_sections_in_order() {
        let sections = [
            "1. **Summary**",
            "2. **Relevance to the knowledge base**",
            "3. **Novelty and differences**",
            "4. **Research implications**",
        ];
        let positions: Vec<usize> = sections
            .iter()
            .map(|s| ANALYSIS_PROMPT.find(s).expect("section present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_knowledge_block_joins_with_newlines() {
        let block = format_knowledge_block(["--- reference: a.md ---\nA\n", "--- reference: b.txt ---\nB\n"]);
        assert_eq!(
            block,
            format!(
                "{KNOWLEDGE_BASE_HEADER}\n--- reference: a.md ---\nA\n\n--- reference: b.txt ---\nB\n"
            )
        );
    }
}
