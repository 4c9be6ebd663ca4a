//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! User input is ALWAYS passed via `.bind()` parameters, never interpolated.

/// Filter expression keeping recipes whose average rating is at least `$min`.
///
/// Recipes with no ratings have no average and are excluded.
///
/// # Why raw SQL?
/// A grouped `HAVING AVG(...)` subselect inside `IN` doesn't box cleanly.
#[macro_export]
macro_rules! min_average_rating {
    ($min:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(
            "recipes.id IN (SELECT ratings.recipe_id FROM ratings \
             GROUP BY ratings.recipe_id HAVING AVG(ratings.score) >= ",
        )
        .bind::<diesel::sql_types::Double, _>($min)
        .sql(")")
    };
}

/// Escape `%`, `_` and `\` so `text` matches literally inside a LIKE pattern.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
