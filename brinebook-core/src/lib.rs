pub mod ai;
pub mod suggest;
pub mod types;

pub use suggest::should_suggest_llm;
pub use types::{ingredients_from_value, GeneratedRecipe, Ingredient, RecipeSource, TagType};
