//! AI prompt templates.

pub mod recipe;

pub use recipe::{
    render_generate_prompt, render_recipe_system_prompt, render_revise_prompt,
    GENERATE_PROMPT_NAME, REVISE_PROMPT_NAME,
};
