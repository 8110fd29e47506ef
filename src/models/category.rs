// src/models/category.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::serde_utils::double_option;

/// Ícones simbólicos aceitos pelo frontend.
pub const CATEGORY_ICONS: &[&str] = &[
    "building",
    "briefcase",
    "factory",
    "store",
    "truck",
    "wrench",
    "leaf",
    "laptop",
    "heart",
    "utensils",
    "graduation-cap",
    "shopping-cart",
    "globe",
    "tag",
];

fn validate_icon(icon: &str) -> Result<(), ValidationError> {
    if CATEGORY_ICONS.contains(&icon) {
        return Ok(());
    }
    let mut err = ValidationError::new("unknown_icon");
    err.message = Some(format!("Ícone '{}' não existe.", icon).into());
    Err(err)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[schema(example = 3)]
    pub id: i32,

    #[schema(example = "Construcción")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = "building")]
    pub icon: Option<String>,

    pub icon_url: Option<String>,

    // COALESCE(icon_url, icon): a URL customizada vence o ícone simbólico
    pub effective_icon: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Construcción")]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_icon"))]
    #[schema(example = "building")]
    pub icon: Option<String>,

    #[validate(url(message = "invalid_url"))]
    pub icon_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub icon: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub icon_url: Option<Option<String>>,
}

impl CategoryPatch {
    pub fn apply_to(self, current: &Category) -> CategoryPayload {
        CategoryPayload {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            icon: self.icon.unwrap_or_else(|| current.icon.clone()),
            icon_url: self.icon_url.unwrap_or_else(|| current.icon_url.clone()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPage {
    pub categories: Vec<Category>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(icon: Option<&str>, icon_url: Option<&str>) -> CategoryPayload {
        CategoryPayload {
            name: "Tecnología".into(),
            description: None,
            icon: icon.map(str::to_string),
            icon_url: icon_url.map(str::to_string),
        }
    }

    #[test]
    fn icon_must_belong_to_the_fixed_set() {
        assert!(payload(Some("laptop"), None).validate().is_ok());
        let errors = payload(Some("unicorn"), None).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("icon"));
    }

    #[test]
    fn icon_url_must_be_a_url() {
        assert!(payload(None, Some("https://cdn.example.com/i.png")).validate().is_ok());
        assert!(payload(None, Some("not a url")).validate().is_err());
    }

    #[test]
    fn patch_can_clear_the_icon() {
        let current = Category {
            id: 1,
            name: "Tecnología".into(),
            description: Some("Software".into()),
            icon: Some("laptop".into()),
            icon_url: None,
            effective_icon: Some("laptop".into()),
            created_at: Utc::now(),
        };
        let patch: CategoryPatch = serde_json::from_str(r#"{"icon": null}"#).unwrap();
        let merged = patch.apply_to(&current);

        assert_eq!(merged.icon, None);
        assert_eq!(merged.description.as_deref(), Some("Software"));
        assert_eq!(merged.name, "Tecnología");
    }
}
