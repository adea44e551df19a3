use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::api::PageRequest;
use crate::database::models::Profile;
use crate::database::{Database, Entity};
use crate::error::{ApiError, FieldErrors};
use crate::filter::FilterData;
use crate::media::{ImageUpload, MediaStorage};

/// Collects field-level validation failures for one payload
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, "This field is required.");
        }
        value
    }

    pub fn text(&mut self, field: &str, value: &str, allow_blank: bool, max_length: Option<usize>) {
        if !allow_blank && value.trim().is_empty() {
            self.add(field, "This field may not be blank.");
        }
        if let Some(max) = max_length {
            if value.chars().count() > max {
                self.add(field, format!("Ensure this field has no more than {} characters.", max));
            }
        }
    }

    pub fn choice(&mut self, field: &str, value: &str, choices: &[&str]) {
        if !choices.contains(&value) {
            self.add(field, format!("\"{}\" is not a valid choice.", value));
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => {
                let message = self.errors.values().next().cloned().unwrap_or_default();
                Err(ApiError::validation_error(message, Some(self.errors)))
            }
            _ => Err(ApiError::validation_error("Invalid input.", Some(self.errors))),
        }
    }
}

/// Distinguish an absent field (`None`) from an explicit null (`Some(None)`)
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Reference to a row that does not exist
pub fn invalid_pk(field: &str, id: i64) -> ApiError {
    ApiError::field(field, format!("Invalid pk \"{}\" - object does not exist.", id))
}

/// Validate and persist an uploaded image, returning its location
pub async fn store_image(media: &MediaStorage, upload: Option<&ImageUpload>) -> Result<Option<String>, ApiError> {
    match upload {
        Some(upload) => Ok(Some(media.store(upload).await?)),
        None => Ok(None),
    }
}

/// Keep only allowed ordering keys from `?ordering=-created_at,name`
pub fn ordering(requested: Option<&str>, allowed: &[&str]) -> Option<String> {
    let keys: Vec<&str> = requested?
        .split(',')
        .map(str::trim)
        .filter(|key| allowed.contains(&key.trim_start_matches('-')))
        .collect();
    (!keys.is_empty()).then(|| keys.join(","))
}

/// Owner of a profile, used to resolve `?owner__profile=` style filters
pub async fn profile_owner(db: &Database, profile_id: i64) -> Result<Option<i64>, ApiError> {
    Ok(db.repo::<Profile>().get(profile_id).await?.map(|p| p.owner_id))
}

/// `{column: {"$in": ids}}`; an empty list matches nothing
pub fn any_of(column: &str, ids: impl IntoIterator<Item = i64>) -> Value {
    let ids: Vec<i64> = ids.into_iter().collect();
    json!({ column: { "$in": ids } })
}

/// Substring pattern for `$ilike`, with LIKE metacharacters in the term taken literally
pub fn contains(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Count and fetch one page of rows matching all conditions
pub async fn fetch_page<E: Entity>(
    db: &Database,
    conditions: Vec<Value>,
    order: Option<String>,
    page: PageRequest,
) -> Result<(i64, Vec<E>), ApiError> {
    let mut filter = FilterData::new();
    if !conditions.is_empty() {
        filter = filter.with_where(json!({ "$and": conditions }));
    }
    if let Some(order) = order {
        filter = filter.with_order(order);
    }

    let repo = db.repo::<E>();
    let count = repo.count(filter.clone()).await?;
    let rows = repo.select_any(filter.with_page(page.limit(), page.offset())).await?;
    Ok((count, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_drops_unknown_keys() {
        assert_eq!(ordering(Some("-price, secret,name"), &["price", "name"]), Some("-price,name".to_string()));
        assert_eq!(ordering(Some("likes_count"), &["created_at"]), None);
        assert_eq!(ordering(None, &["created_at"]), None);
    }

    #[test]
    fn search_terms_are_taken_literally() {
        assert_eq!(contains(" sea "), "%sea%");
        assert_eq!(contains("50%"), "%50\\%%");
        assert_eq!(contains("a_b\\c"), "%a\\_b\\\\c%");
    }

    #[test]
    fn validator_reports_every_field() {
        let mut v = Validator::new();
        let title: Option<String> = v.require("title", None);
        assert!(title.is_none());
        v.choice("image_filter", "sepia", &["normal"]);
        let err = v.finish().unwrap_err().to_json();
        assert_eq!(err["detail"], "Invalid input.");
        assert_eq!(err["field_errors"]["title"], "This field is required.");
        assert_eq!(err["field_errors"]["image_filter"], "\"sepia\" is not a valid choice.");
    }

    #[test]
    fn single_error_becomes_the_detail() {
        let mut v = Validator::new();
        v.text("content", "   ", false, None);
        assert_eq!(v.finish().unwrap_err().to_json()["detail"], "This field may not be blank.");
    }
}
