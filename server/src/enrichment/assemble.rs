use brinebook_core::{ingredients_from_value, RecipeSource};

use super::{RecipeResponse, TagResponse};
use crate::models::{Photo, Recipe, Tag};

/// Project a recipe row plus its joined rows into the response view.
///
/// `photos` and `scores` must belong to `recipe`; their order does not matter.
pub fn assemble(
    recipe: Recipe,
    tags: Vec<Tag>,
    photos: &[Photo],
    scores: &[f64],
) -> RecipeResponse {
    let hero_photo = resolve_hero_photo(recipe.hero_photo.as_deref(), photos);
    let (avg_rating, rating_count) = rating_summary(scores);

    let mut seen = Vec::with_capacity(tags.len());
    let tags = tags
        .into_iter()
        .filter(|tag| {
            if seen.contains(&tag.id) {
                false
            } else {
                seen.push(tag.id);
                true
            }
        })
        .map(TagResponse::from)
        .collect();

    RecipeResponse {
        id: recipe.id,
        user_id: recipe.user_id,
        title: recipe.title,
        description: recipe.description,
        source: RecipeSource::from_str(&recipe.source).unwrap_or_default(),
        base_prompt: recipe.base_prompt,
        llm_response: recipe.llm_response,
        instructions: recipe.instructions,
        ingredients: ingredients_from_value(Some(&recipe.ingredients)),
        servings: recipe.servings,
        prep_time: recipe.prep_time,
        cook_time: recipe.cook_time,
        equipment: recipe.equipment.into_iter().flatten().collect(),
        plating_notes: recipe.plating_notes,
        hero_photo,
        is_public: recipe.is_public,
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
        tags,
        avg_rating,
        rating_count,
    }
}

/// Direct field, then the earliest flagged photo, then the earliest photo.
pub fn resolve_hero_photo(direct: Option<&str>, photos: &[Photo]) -> Option<String> {
    if let Some(url) = direct.filter(|url| !url.is_empty()) {
        return Some(url.to_string());
    }

    let mut ordered: Vec<&Photo> = photos.iter().collect();
    ordered.sort_by_key(|p| (p.created_at, p.id));

    ordered
        .iter()
        .find(|p| p.is_hero)
        .or_else(|| ordered.first())
        .map(|p| p.url.clone())
}

pub fn rating_summary(scores: &[f64]) -> (Option<f64>, i64) {
    if scores.is_empty() {
        return (None, 0);
    }
    let total: f64 = scores.iter().sum();
    (Some(total / scores.len() as f64), scores.len() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    fn base_time() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn recipe() -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Braised Short Ribs".to_string(),
            description: None,
            source: "llm".to_string(),
            base_prompt: Some("short ribs".to_string()),
            llm_response: None,
            instructions: Some("Braise low and slow.".to_string()),
            ingredients: serde_json::json!([
                {"name": "short ribs", "amount": "2", "unit": "lb"},
                {"name": "red wine", "amount": "1", "unit": "cup", "notes": "dry"}
            ]),
            servings: 4,
            prep_time: Some(20),
            cook_time: Some(180),
            equipment: vec![Some("dutch oven".to_string()), None],
            plating_notes: None,
            hero_photo: None,
            is_public: false,
            created_at: base_time(),
            updated_at: base_time(),
        }
    }

    fn photo(url: &str, is_hero: bool, minutes: i64) -> Photo {
        Photo {
            id: Uuid::new_v4(),
            recipe_id: Uuid::nil(),
            user_id: Uuid::nil(),
            url: url.to_string(),
            caption: None,
            is_hero,
            created_at: base_time() + Duration::minutes(minutes),
        }
    }

    fn tag(name: &str) -> Tag {
        Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            tag_type: Some("cuisine".to_string()),
            created_at: base_time(),
        }
    }

    #[test]
    fn test_hero_prefers_direct_field() {
        let photos = vec![photo("a.jpg", true, 0)];
        assert_eq!(
            resolve_hero_photo(Some("direct.jpg"), &photos).as_deref(),
            Some("direct.jpg")
        );
    }

    #[test]
    fn test_hero_uses_flagged_photo() {
        let photos = vec![photo("first.jpg", false, 0), photo("hero.jpg", true, 5)];
        assert_eq!(resolve_hero_photo(None, &photos).as_deref(), Some("hero.jpg"));
        assert_eq!(
            resolve_hero_photo(Some(""), &photos).as_deref(),
            Some("hero.jpg")
        );
    }

    #[test]
    fn test_hero_falls_back_to_earliest_photo() {
        let photos = vec![photo("later.jpg", false, 10), photo("earliest.jpg", false, 1)];
        assert_eq!(
            resolve_hero_photo(None, &photos).as_deref(),
            Some("earliest.jpg")
        );
    }

    #[test]
    fn test_hero_absent_without_photos() {
        assert_eq!(resolve_hero_photo(None, &[]), None);
    }

    #[test]
    fn test_rating_summary() {
        assert_eq!(rating_summary(&[]), (None, 0));
        assert_eq!(rating_summary(&[4.0]), (Some(4.0), 1));
        assert_eq!(rating_summary(&[3.0, 4.0, 5.0]), (Some(4.0), 3));
    }

    #[test]
    fn test_assemble() {
        let italian = tag("italian");
        let tags = vec![italian.clone(), tag("beef"), italian];
        let photos = vec![photo("plated.jpg", false, 0)];

        let view = assemble(recipe(), tags, &photos, &[5.0, 4.0]);

        assert_eq!(view.source, RecipeSource::Llm);
        assert_eq!(view.ingredients.len(), 2);
        assert_eq!(view.ingredients[1].notes.as_deref(), Some("dry"));
        assert_eq!(view.equipment, vec!["dutch oven"]);
        assert_eq!(view.tags.len(), 2);
        assert_eq!(view.tags[0].tag_type.as_deref(), Some("cuisine"));
        assert_eq!(view.hero_photo.as_deref(), Some("plated.jpg"));
        assert_eq!(view.avg_rating, Some(4.5));
        assert_eq!(view.rating_count, 2);
    }

    #[test]
    fn test_assemble_tolerates_bad_ingredients() {
        let mut row = recipe();
        row.ingredients = serde_json::json!({"not": "a list"});
        let view = assemble(row, vec![], &[], &[]);
        assert!(view.ingredients.is_empty());
        assert!(view.hero_photo.is_none());
        assert!(view.avg_rating.is_none());
        assert_eq!(view.rating_count, 0);
    }
}
