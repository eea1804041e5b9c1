//! Recipe aggregate: write-side draft validation and the read-side view.
//!
//! The write and read shapes differ deliberately. A [`RecipeDraft`] carries
//! tag ids and quantified ingredient references; the [`RecipeView`] resolves
//! those into full tag and ingredient representations plus the author's
//! profile. Requester-dependent flags (`is_favorited`, `is_in_shopping_cart`,
//! `is_subscribed`) are annotated by the inbound adapter, not stored here.

use std::collections::HashSet;
use std::fmt;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tag::Tag;
use super::user::User;

/// Maximum length for recipe names.
pub const RECIPE_NAME_MAX: usize = 200;

/// Validation errors raised while checking a [`RecipeDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    EmptyName,
    NameTooLong { max: usize },
    EmptyText,
    CookingTimeTooShort,
    EmptyImage,
    InvalidImage,
    NoIngredients,
    DuplicateIngredient { ingredient_id: i32 },
    NonPositiveAmount { ingredient_id: i32 },
    NoTags,
    DuplicateTag { tag_id: i32 },
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "recipe name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "recipe name must be at most {max} characters")
            }
            Self::EmptyText => write!(f, "recipe text must not be empty"),
            Self::CookingTimeTooShort => write!(f, "cooking time must be at least 1 minute"),
            Self::EmptyImage => write!(f, "recipe image must not be empty"),
            Self::InvalidImage => write!(f, "recipe image must be a base64 data URL"),
            Self::NoIngredients => write!(f, "a recipe needs at least one ingredient"),
            Self::DuplicateIngredient { ingredient_id } => {
                write!(f, "ingredient {ingredient_id} is listed more than once")
            }
            Self::NonPositiveAmount { ingredient_id } => {
                write!(f, "amount for ingredient {ingredient_id} must be at least 1")
            }
            Self::NoTags => write!(f, "a recipe needs at least one tag"),
            Self::DuplicateTag { tag_id } => {
                write!(f, "tag {tag_id} is listed more than once")
            }
        }
    }
}

impl std::error::Error for RecipeValidationError {}

/// One quantified ingredient reference on the write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientAmount {
    /// Referenced ingredient id.
    pub id: i32,
    /// Quantity in the ingredient's measurement unit; must be >= 1.
    pub amount: i32,
}

/// Base64 data-URL image payload, stored verbatim.
///
/// Decoding and serving the binary is the image collaborator's concern; the
/// domain only checks the payload shape so garbage is rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct ImageData(String);

impl ImageData {
    /// Validate and wrap a `data:image/...;base64,...` payload.
    pub fn new(image: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let image = image.into();
        if image.is_empty() {
            return Err(RecipeValidationError::EmptyImage);
        }
        let Some(rest) = image.strip_prefix("data:image/") else {
            return Err(RecipeValidationError::InvalidImage);
        };
        let Some((_, payload)) = rest.split_once(";base64,") else {
            return Err(RecipeValidationError::InvalidImage);
        };
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|_| RecipeValidationError::InvalidImage)?;
        Ok(Self(image))
    }
}

impl AsRef<str> for ImageData {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ImageData> for String {
    fn from(value: ImageData) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageData {
    type Error = RecipeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated recipe write payload.
///
/// ## Invariants
/// - at least one ingredient line, no duplicate ingredient ids;
/// - every amount >= 1;
/// - at least one tag, no duplicate tag ids;
/// - cooking time >= 1 minute.
///
/// Referential checks (do the tags and ingredients exist?) are the inbound
/// adapter's job; the draft only guards shape invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: ImageData,
    pub tag_ids: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
}

impl RecipeDraft {
    /// Validate field and collection invariants, returning the draft.
    pub fn try_from_parts(
        name: &str,
        text: &str,
        cooking_time: i32,
        image: ImageData,
        tag_ids: Vec<i32>,
        ingredients: Vec<IngredientAmount>,
    ) -> Result<Self, RecipeValidationError> {
        if name.trim().is_empty() {
            return Err(RecipeValidationError::EmptyName);
        }
        if name.chars().count() > RECIPE_NAME_MAX {
            return Err(RecipeValidationError::NameTooLong {
                max: RECIPE_NAME_MAX,
            });
        }
        if text.trim().is_empty() {
            return Err(RecipeValidationError::EmptyText);
        }
        if cooking_time < 1 {
            return Err(RecipeValidationError::CookingTimeTooShort);
        }

        if ingredients.is_empty() {
            return Err(RecipeValidationError::NoIngredients);
        }
        let mut seen_ingredients = HashSet::with_capacity(ingredients.len());
        for line in &ingredients {
            if !seen_ingredients.insert(line.id) {
                return Err(RecipeValidationError::DuplicateIngredient {
                    ingredient_id: line.id,
                });
            }
            if line.amount < 1 {
                return Err(RecipeValidationError::NonPositiveAmount {
                    ingredient_id: line.id,
                });
            }
        }

        if tag_ids.is_empty() {
            return Err(RecipeValidationError::NoTags);
        }
        let mut seen_tags = HashSet::with_capacity(tag_ids.len());
        for tag_id in &tag_ids {
            if !seen_tags.insert(*tag_id) {
                return Err(RecipeValidationError::DuplicateTag { tag_id: *tag_id });
            }
        }

        Ok(Self {
            name: name.to_owned(),
            text: text.to_owned(),
            cooking_time,
            image,
            tag_ids,
            ingredients,
        })
    }
}

/// One resolved ingredient line on the read path.
///
/// The amount is copied from the line at read time, never re-derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientLine {
    /// Referenced ingredient id.
    pub id: i32,
    /// Ingredient name at the time of the read.
    pub name: String,
    /// Measurement unit of the referenced ingredient.
    pub measurement_unit: String,
    /// Quantity stored on the line.
    pub amount: i32,
}

/// Full read representation of a recipe, minus requester-dependent flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    pub id: i32,
    pub author: User,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<IngredientLine>,
    pub created_at: DateTime<Utc>,
}

/// Filters accepted by the recipe list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeListFilter {
    /// Only recipes by this author.
    pub author: Option<super::user::UserId>,
    /// Only recipes carrying at least one of these tag slugs.
    pub tag_slugs: Vec<String>,
    /// Only recipes favorited by this user.
    pub favorited_by: Option<super::user::UserId>,
    /// Only recipes in this user's shopping cart.
    pub in_cart_of: Option<super::user::UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn image() -> ImageData {
        // Single transparent pixel; payload shape is all that matters here.
        ImageData::new("data:image/png;base64,iVBORw0KGgo=").expect("valid image")
    }

    fn lines(pairs: &[(i32, i32)]) -> Vec<IngredientAmount> {
        pairs
            .iter()
            .map(|&(id, amount)| IngredientAmount { id, amount })
            .collect()
    }

    #[rstest]
    fn accepts_a_well_formed_draft() {
        let draft = RecipeDraft::try_from_parts(
            "Pancakes",
            "Mix and fry.",
            15,
            image(),
            vec![1, 2],
            lines(&[(1, 200), (2, 100)]),
        )
        .expect("valid draft");
        assert_eq!(draft.ingredients.len(), 2);
    }

    #[rstest]
    fn rejects_an_empty_ingredient_list() {
        let result =
            RecipeDraft::try_from_parts("Pancakes", "Mix.", 15, image(), vec![1], lines(&[]));
        assert_eq!(result, Err(RecipeValidationError::NoIngredients));
    }

    #[rstest]
    fn rejects_duplicate_ingredient_ids() {
        let result = RecipeDraft::try_from_parts(
            "Pancakes",
            "Mix.",
            15,
            image(),
            vec![1],
            lines(&[(7, 100), (7, 50)]),
        );
        assert_eq!(
            result,
            Err(RecipeValidationError::DuplicateIngredient { ingredient_id: 7 })
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn rejects_non_positive_amounts(#[case] amount: i32) {
        let result = RecipeDraft::try_from_parts(
            "Pancakes",
            "Mix.",
            15,
            image(),
            vec![1],
            lines(&[(7, amount)]),
        );
        assert_eq!(
            result,
            Err(RecipeValidationError::NonPositiveAmount { ingredient_id: 7 })
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    fn rejects_short_cooking_times(#[case] cooking_time: i32) {
        let result = RecipeDraft::try_from_parts(
            "Pancakes",
            "Mix.",
            cooking_time,
            image(),
            vec![1],
            lines(&[(1, 10)]),
        );
        assert_eq!(result, Err(RecipeValidationError::CookingTimeTooShort));
    }

    #[rstest]
    fn rejects_duplicate_tags() {
        let result = RecipeDraft::try_from_parts(
            "Pancakes",
            "Mix.",
            15,
            image(),
            vec![3, 3],
            lines(&[(1, 10)]),
        );
        assert_eq!(result, Err(RecipeValidationError::DuplicateTag { tag_id: 3 }));
    }

    #[rstest]
    #[case("data:image/png;base64,iVBORw0KGgo=", true)]
    #[case("data:image/jpeg;base64,/9j/4AAQ", true)]
    #[case("data:text/plain;base64,aGk=", false)]
    #[case("data:image/png;base64,not*base64!", false)]
    #[case("plain string", false)]
    #[case("", false)]
    fn image_payload_validation(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(ImageData::new(input).is_ok(), ok, "input: {input:?}");
    }
}
