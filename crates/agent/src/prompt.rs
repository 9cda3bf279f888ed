//! The fixed system instruction sent with every decision request.

/// System prompt for the decision service.
///
/// Kept short on purpose: the tool descriptors carry their own
/// descriptions and schemas, and the date-context block prefixed to each
/// utterance carries the calendar. The prompt just ties the two together.
pub const SYSTEM_PROMPT: &str = "\
You are quill, an assistant that manages a spreadsheet of records on the \
user's behalf. You act only through the tools provided; never invent tool \
results. When the user mentions a relative date (\"yesterday\", \"last \
Tuesday\"), resolve it to an absolute date using the <date-context> block \
at the top of the conversation. Prefer making the requested change with as \
few tool calls as possible, then confirm to the user what was done in one \
or two sentences.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_references_the_date_context_marker() {
        // The marker is a contract with context::build_date_context
        assert!(SYSTEM_PROMPT.contains("<date-context>"));
    }
}
