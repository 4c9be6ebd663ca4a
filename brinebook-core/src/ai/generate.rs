//! Recipe generation and revision.
//!
//! The model's reply is treated as untrusted input: every field is optional
//! and checked individually, so a reply with missing or mistyped fields still
//! yields a well-formed recipe. A reply that is not a JSON object is an error.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ai::prompts::recipe::{
    render_generate_prompt, render_recipe_system_prompt, render_revise_prompt,
    GENERATE_PROMPT_NAME, REVISE_PROMPT_NAME,
};
use crate::ai::{AiClient, AiError, ChatRequest};
use crate::types::{ingredients_from_value, GeneratedRecipe, Ingredient};

const TEMPERATURE: f32 = 0.7;
const UNTITLED: &str = "Untitled Recipe";

/// Parameters for generating a brand-new recipe.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub style: &'a str,
    pub servings: i32,
}

/// The parts of a stored recipe sent to the model for revision.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionSource {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Option<String>,
    pub equipment: Vec<String>,
    pub plating_notes: Option<String>,
}

/// Generate a recipe from a free-text prompt.
pub async fn generate_recipe(
    ai_client: &dyn AiClient,
    request: &GenerationRequest<'_>,
) -> Result<GeneratedRecipe, AiError> {
    let user_prompt = render_generate_prompt(request.prompt, request.style, request.servings);
    complete_recipe(ai_client, GENERATE_PROMPT_NAME, user_prompt).await
}

/// Produce an improved version of `source` that addresses `notes`.
pub async fn revise_recipe(
    ai_client: &dyn AiClient,
    source: &RevisionSource,
    notes: &str,
) -> Result<GeneratedRecipe, AiError> {
    let recipe_json = serde_json::to_string_pretty(source)
        .map_err(|e| AiError::ParseError(format!("Failed to serialize recipe: {}", e)))?;
    let user_prompt = render_revise_prompt(&recipe_json, notes);
    complete_recipe(ai_client, REVISE_PROMPT_NAME, user_prompt).await
}

async fn complete_recipe(
    ai_client: &dyn AiClient,
    prompt_name: &str,
    user_prompt: String,
) -> Result<GeneratedRecipe, AiError> {
    let request =
        ChatRequest::json(render_recipe_system_prompt(), user_prompt).with_temperature(TEMPERATURE);

    let response = ai_client.complete(prompt_name, request).await?;
    parse_generated_recipe(&response.content)
}

/// Parse the model's JSON reply into a [`GeneratedRecipe`], filling defaults
/// for anything missing.
pub fn parse_generated_recipe(content: &str) -> Result<GeneratedRecipe, AiError> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|e| AiError::ParseError(format!("Response is not valid JSON: {}", e)))?;

    let Value::Object(map) = value else {
        return Err(AiError::ParseError(
            "Response is not a JSON object".to_string(),
        ));
    };

    let ingredients = ingredients_from_value(map.get("ingredients"));

    Ok(GeneratedRecipe {
        title: string_field(&map, "title")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        description: string_field(&map, "description").unwrap_or_default(),
        ingredients,
        instructions: string_field(&map, "instructions").unwrap_or_default(),
        prep_time: minutes_field(&map, "prep_time"),
        cook_time: minutes_field(&map, "cook_time"),
        equipment: string_list_field(&map, "equipment"),
        plating_notes: string_field(&map, "plating_notes"),
        suggested_tags: string_list_field(&map, "suggested_tags"),
    })
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn minutes_field(map: &Map<String, Value>, key: &str) -> Option<i32> {
    match map.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .and_then(|m| i32::try_from(m).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_list_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeAiClient;

    const FULL_RESPONSE: &str = r#"{
        "title": "Pan-Seared Duck Breast",
        "description": "Crisp skin, rosy center",
        "ingredients": [
            {"name": "duck breast", "amount": "2", "unit": "pieces", "notes": "scored"},
            "flaky salt"
        ],
        "instructions": "Start skin-side down in a cold pan.",
        "prep_time": 15,
        "cook_time": "20",
        "equipment": ["cast-iron skillet"],
        "plating_notes": "Slice on the bias",
        "suggested_tags": ["french", "fine-dining"]
    }"#;

    #[test]
    fn test_parse_full_response() {
        let recipe = parse_generated_recipe(FULL_RESPONSE).unwrap();
        assert_eq!(recipe.title, "Pan-Seared Duck Breast");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].unit.as_deref(), Some("pieces"));
        assert_eq!(recipe.prep_time, Some(15));
        assert_eq!(recipe.cook_time, Some(20));
        assert_eq!(recipe.equipment, vec!["cast-iron skillet"]);
        assert_eq!(recipe.suggested_tags, vec!["french", "fine-dining"]);
    }

    #[test]
    fn test_parse_coerces_non_object_ingredient_and_drops_null() {
        let recipe = parse_generated_recipe(FULL_RESPONSE).unwrap();
        let salt = &recipe.ingredients[1];
        assert_eq!(salt.name, "flaky salt");
        assert_eq!(salt.amount, "");
        assert!(salt.unit.is_none());

        let recipe = parse_generated_recipe(r#"{"ingredients": [42, null]}"#).unwrap();
        assert_eq!(recipe.ingredients.len(), 1);
        assert_eq!(recipe.ingredients[0].name, "42");
    }

    #[test]
    fn test_parse_defaults() {
        let recipe = parse_generated_recipe("{}").unwrap();
        assert_eq!(recipe.title, "Untitled Recipe");
        assert_eq!(recipe.description, "");
        assert_eq!(recipe.instructions, "");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.equipment.is_empty());
        assert!(recipe.suggested_tags.is_empty());
        assert!(recipe.prep_time.is_none());
        assert!(recipe.plating_notes.is_none());
    }

    #[test]
    fn test_parse_ignores_mistyped_fields() {
        let recipe = parse_generated_recipe(
            r#"{"title": 7, "ingredients": "eggs", "prep_time": "soon", "equipment": "wok"}"#,
        )
        .unwrap();
        assert_eq!(recipe.title, "Untitled Recipe");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.prep_time.is_none());
        assert!(recipe.equipment.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_generated_recipe("Sure! Here is your recipe: ...").unwrap_err();
        assert!(matches!(err, AiError::ParseError(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_generated_recipe("[1, 2, 3]").is_err());
        assert!(parse_generated_recipe("\"pasta\"").is_err());
    }

    #[tokio::test]
    async fn test_generate_recipe_uses_json_mode() {
        let client = FakeAiClient::with_response("duck", FULL_RESPONSE);
        let request = GenerationRequest {
            prompt: "duck breast",
            style: "restaurant-style",
            servings: 2,
        };

        let recipe = generate_recipe(&client, &request).await.unwrap();
        assert_eq!(recipe.title, "Pan-Seared Duck Breast");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        let (prompt_name, sent) = &requests[0];
        assert_eq!(prompt_name, GENERATE_PROMPT_NAME);
        assert!(sent.json_response);
        assert_eq!(sent.messages.len(), 2);
        assert!(sent.messages[1].content.contains("Servings: 2"));
    }

    #[tokio::test]
    async fn test_generate_recipe_malformed_response_fails() {
        let client = FakeAiClient::new().with_default_response("not json at all");
        let request = GenerationRequest {
            prompt: "salmon",
            style: "restaurant-style",
            servings: 4,
        };
        assert!(generate_recipe(&client, &request).await.is_err());
    }

    #[tokio::test]
    async fn test_generate_recipe_upstream_failure() {
        let client = FakeAiClient::new();
        let request = GenerationRequest {
            prompt: "salmon",
            style: "restaurant-style",
            servings: 4,
        };
        assert!(matches!(
            generate_recipe(&client, &request).await,
            Err(AiError::RequestFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_revise_recipe_sends_current_recipe() {
        let client = FakeAiClient::new().with_default_response(FULL_RESPONSE);
        let source = RevisionSource {
            title: "Duck".to_string(),
            description: None,
            ingredients: vec![],
            instructions: Some("Sear it".to_string()),
            equipment: vec!["skillet".to_string()],
            plating_notes: None,
        };

        let recipe = revise_recipe(&client, &source, "crispier skin")
            .await
            .unwrap();
        assert_eq!(recipe.cook_time, Some(20));

        let requests = client.requests();
        let (prompt_name, sent) = &requests[0];
        assert_eq!(prompt_name, REVISE_PROMPT_NAME);
        assert!(sent.messages[1].content.contains("\"title\": \"Duck\""));
        assert!(sent.messages[1].content.contains("crispier skin"));
    }
}
