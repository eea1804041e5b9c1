//! Tag data model.
//!
//! Tags label recipes for filtering. Name, colour, and slug are each
//! globally unique; the colour is a `#RRGGBB` hex triplet.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum length for tag names and slugs.
pub const TAG_NAME_MAX: usize = 200;

/// Validation errors returned by the tag value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    EmptyName,
    NameTooLong { max: usize },
    InvalidColor,
    EmptySlug,
    SlugTooLong { max: usize },
    SlugInvalidCharacters,
}

impl fmt::Display for TagValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "tag name must not be empty"),
            Self::NameTooLong { max } => write!(f, "tag name must be at most {max} characters"),
            Self::InvalidColor => write!(f, "tag colour must be a #RRGGBB hex triplet"),
            Self::EmptySlug => write!(f, "tag slug must not be empty"),
            Self::SlugTooLong { max } => write!(f, "tag slug must be at most {max} characters"),
            Self::SlugInvalidCharacters => write!(
                f,
                "tag slug may only contain lowercase letters, digits, hyphens, and underscores",
            ),
        }
    }
}

impl std::error::Error for TagValidationError {}

static COLOR_RE: OnceLock<Regex> = OnceLock::new();
static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn color_regex() -> &'static Regex {
    COLOR_RE.get_or_init(|| {
        Regex::new(r"^#[0-9a-fA-F]{6}$")
            .unwrap_or_else(|error| panic!("colour regex failed to compile: {error}"))
    })
}

fn slug_regex() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9_-]+$")
            .unwrap_or_else(|error| panic!("slug regex failed to compile: {error}"))
    })
}

/// Hex colour used to render the tag, e.g. `#49B64E`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Validate and construct a [`HexColor`].
    pub fn new(color: impl Into<String>) -> Result<Self, TagValidationError> {
        let color = color.into();
        if !color_regex().is_match(&color) {
            return Err(TagValidationError::InvalidColor);
        }
        Ok(Self(color))
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = TagValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// URL-safe identifier used in tag filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate and construct a [`Slug`].
    pub fn new(slug: impl Into<String>) -> Result<Self, TagValidationError> {
        let slug = slug.into();
        if slug.is_empty() {
            return Err(TagValidationError::EmptySlug);
        }
        if slug.chars().count() > TAG_NAME_MAX {
            return Err(TagValidationError::SlugTooLong { max: TAG_NAME_MAX });
        }
        if !slug_regex().is_match(&slug) {
            return Err(TagValidationError::SlugInvalidCharacters);
        }
        Ok(Self(slug))
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = TagValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A recipe label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    /// Stable identifier.
    pub id: i32,
    /// Unique display name.
    pub name: String,
    /// Unique render colour.
    pub color: HexColor,
    /// Unique URL-safe identifier.
    pub slug: Slug,
}

impl Tag {
    /// Validate tag fields and assemble the entity.
    pub fn try_from_parts(
        id: i32,
        name: &str,
        color: &str,
        slug: &str,
    ) -> Result<Self, TagValidationError> {
        if name.trim().is_empty() {
            return Err(TagValidationError::EmptyName);
        }
        if name.chars().count() > TAG_NAME_MAX {
            return Err(TagValidationError::NameTooLong { max: TAG_NAME_MAX });
        }
        Ok(Self {
            id,
            name: name.to_owned(),
            color: HexColor::new(color)?,
            slug: Slug::new(slug)?,
        })
    }
}
