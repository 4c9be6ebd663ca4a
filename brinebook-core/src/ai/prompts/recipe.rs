//! Prompts for generating a new recipe and for revising an existing one.
//!
//! Both share a system prompt that pins the JSON schema the parser expects.

pub const GENERATE_PROMPT_NAME: &str = "generate_recipe";
pub const REVISE_PROMPT_NAME: &str = "revise_recipe";

/// Render the system prompt shared by generation and revision.
pub fn render_recipe_system_prompt() -> String {
    r#"You are a professional chef who writes restaurant-quality recipes for ambitious home cooks. Emphasize technique, layered seasoning, timing and temperature control, and presentation. Instructions must be clear enough to follow at home.

IMPORTANT RULES:
- Return ONLY valid JSON matching the schema below. No other text.
- prep_time and cook_time are whole minutes.

JSON Schema:
{
  "title": "string",
  "description": "string - what makes this dish restaurant-quality",
  "ingredients": [
    {"name": "string", "amount": "string", "unit": "string or null", "notes": "string or null"}
  ],
  "instructions": "string - detailed steps with technique tips",
  "prep_time": "integer",
  "cook_time": "integer",
  "equipment": ["string"],
  "plating_notes": "string",
  "suggested_tags": ["string"]
}"#
    .to_string()
}

/// Render the user message asking for a new recipe.
pub fn render_generate_prompt(prompt: &str, style: &str, servings: i32) -> String {
    format!(
        "Generate a {style} recipe for: {prompt}\n\n\
         Servings: {servings}\n\n\
         Focus on:\n\
         - Restaurant-quality ingredients and techniques\n\
         - Proper seasoning layers\n\
         - Temperature control and timing\n\
         - Professional plating\n\
         - Equipment recommendations\n\n\
         Return ONLY valid JSON following the schema.",
        style = style,
        prompt = prompt,
        servings = servings
    )
}

/// Render the user message asking for a revision of `recipe_json` that
/// addresses `notes`.
pub fn render_revise_prompt(recipe_json: &str, notes: &str) -> String {
    format!(
        "Revise this recipe based on the following feedback.\n\n\
         Current recipe:\n{recipe_json}\n\n\
         Feedback:\n{notes}\n\n\
         Return the complete improved recipe. Return ONLY valid JSON following the schema.",
        recipe_json = recipe_json,
        notes = notes
    )
}
