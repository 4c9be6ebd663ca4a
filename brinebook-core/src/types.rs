use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Where a recipe came from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    Llm,
    #[default]
    Manual,
    Web,
}

impl RecipeSource {
    pub const ALL: &'static [RecipeSource] =
        &[RecipeSource::Llm, RecipeSource::Manual, RecipeSource::Web];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeSource::Llm => "llm",
            RecipeSource::Manual => "manual",
            RecipeSource::Web => "web",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "llm" => Some(RecipeSource::Llm),
            "manual" => Some(RecipeSource::Manual),
            "web" => Some(RecipeSource::Web),
            _ => None,
        }
    }
}

/// Category of a tag in the shared vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    Cuisine,
    Protein,
    Style,
    Difficulty,
    Equipment,
    Occasion,
    Status,
}

impl TagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagType::Cuisine => "cuisine",
            TagType::Protein => "protein",
            TagType::Style => "style",
            TagType::Difficulty => "difficulty",
            TagType::Equipment => "equipment",
            TagType::Occasion => "occasion",
            TagType::Status => "status",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cuisine" => Some(TagType::Cuisine),
            "protein" => Some(TagType::Protein),
            "style" => Some(TagType::Style),
            "difficulty" => Some(TagType::Difficulty),
            "equipment" => Some(TagType::Equipment),
            "occasion" => Some(TagType::Occasion),
            "status" => Some(TagType::Status),
            _ => None,
        }
    }
}

// Ingredient structure for JSON storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Ingredient {
    /// Build an ingredient from an arbitrary JSON value.
    ///
    /// Objects are read field by field, tolerating numbers where strings are
    /// expected. `null` yields nothing; any other value becomes an ingredient
    /// named after it.
    pub fn from_value(value: &Value) -> Option<Self> {
        let ingredient = match value {
            Value::Null => return None,
            Value::Object(map) => Ingredient {
                name: map.get("name").and_then(text).unwrap_or_default(),
                amount: map.get("amount").and_then(text).unwrap_or_default(),
                unit: map.get("unit").and_then(text),
                notes: map.get("notes").and_then(text),
            },
            Value::String(s) => Ingredient {
                name: s.clone(),
                amount: String::new(),
                unit: None,
                notes: None,
            },
            other => Ingredient {
                name: other.to_string(),
                amount: String::new(),
                unit: None,
                notes: None,
            },
        };
        Some(ingredient)
    }
}

/// Deserialize a stored ingredient list. Missing or non-array values yield an
/// empty list; `null` entries are skipped.
pub fn ingredients_from_value(value: Option<&Value>) -> Vec<Ingredient> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Ingredient::from_value).collect(),
        _ => Vec::new(),
    }
}

/// Text content of a scalar JSON value; `null` and containers yield `None`.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A recipe produced or revised by the language model. Not persisted until
/// the user saves it as a regular recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    /// Minutes
    pub prep_time: Option<i32>,
    /// Minutes
    pub cook_time: Option<i32>,
    pub equipment: Vec<String>,
    pub plating_notes: Option<String>,
    pub suggested_tags: Vec<String>,
}
