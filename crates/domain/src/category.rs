//! Listing categories.

use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// A listing category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL-friendly slug derived from the name.
    pub slug: String,
}

impl Category {
    /// Creates a category with a fresh ID and a slug derived from the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            id: generate_id(),
            name,
            slug,
        }
    }
}

/// Converts a display name into a lowercase, dash-separated slug.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Home & Garden"), "home-garden");
        assert_eq!(slugify("Cars"), "cars");
        assert_eq!(slugify("  Spaces  "), "spaces");
    }

    #[test]
    fn test_new_category_has_slug() {
        let cat = Category::new("Video Games");
        assert_eq!(cat.slug, "video-games");
        assert!(!cat.id.is_empty());
    }
}
