//! Decides whether a search should fall back to AI generation.

/// Phrases that mark a query as a request for something new rather than a lookup.
const GENERATION_PHRASES: &[&str] = &[
    "recipe for",
    "how to make",
    "how do i",
    "generate",
    "create",
    "new",
];

/// Returns true when the search results are too thin to be useful, or when the
/// query itself reads like a generation request.
pub fn should_suggest_llm<T>(results: &[T], query: &str) -> bool {
    if results.len() < 2 {
        return true;
    }

    let query = query.to_lowercase();
    GENERATION_PHRASES
        .iter()
        .any(|phrase| query.contains(phrase))
}
