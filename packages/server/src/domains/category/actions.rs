//! Category actions - list with filtering, create, read, update, delete

use tracing::info;

use crate::common::filters::{Filters, ListParams, Page, SortSafelist};
use crate::common::validation::ValidationErrors;
use crate::common::CategoryId;
use crate::domains::category::models::{Category, NewCategory, MAX_CATEGORY_NAME_BYTES};
use crate::kernel::{ServerDeps, StoreError};

/// Sortable columns for `GET /categories`; `id` ascending when unspecified.
pub static CATEGORY_SORT_SAFELIST: SortSafelist =
    SortSafelist::new(&["id", "name", "-id", "-name"], "id");

/// Query string of the list endpoint.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub list: ListParams,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("category not found")]
    NotFound,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CategoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => CategoryError::NotFound,
            other => CategoryError::Store(other),
        }
    }
}

fn validate_name(name: &str) -> Result<(), ValidationErrors> {
    let mut v = ValidationErrors::new();
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(
        name.len() <= MAX_CATEGORY_NAME_BYTES,
        "name",
        "must not be more than 100 bytes long",
    );
    v.into_result()
}

pub async fn list_categories(
    query: &CategoryQuery,
    deps: &ServerDeps,
) -> Result<Page<Category>, CategoryError> {
    let filters = Filters::parse(&query.list, &CATEGORY_SORT_SAFELIST)?;
    Ok(deps.categories.list(query.name.trim(), &filters).await?)
}

pub async fn create_category(
    input: NewCategory,
    deps: &ServerDeps,
) -> Result<Category, CategoryError> {
    let input = NewCategory {
        name: input.name.trim().to_string(),
        description: input.description,
    };

    validate_name(&input.name)?;

    let category = deps.categories.insert(input).await?;
    info!(category_id = %category.id, "category created");
    Ok(category)
}

pub async fn get_category(id: CategoryId, deps: &ServerDeps) -> Result<Category, CategoryError> {
    Ok(deps.categories.find(id).await?)
}

pub async fn update_category(
    id: CategoryId,
    changes: CategoryChanges,
    deps: &ServerDeps,
) -> Result<Category, CategoryError> {
    let mut category = deps.categories.find(id).await?;
    if let Some(name) = changes.name {
        category.name = name.trim().to_string();
    }
    if let Some(description) = changes.description {
        category.description = description;
    }
    validate_name(&category.name)?;

    deps.categories.update(&mut category).await?;
    info!(category_id = %category.id, "category updated");
    Ok(category)
}

pub async fn delete_category(id: CategoryId, deps: &ServerDeps) -> Result<(), CategoryError> {
    deps.categories.delete(id).await?;
    info!(category_id = %id, "category deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestDependencies;

    async fn seed(test: &TestDependencies, names: &[&str]) {
        for name in names {
            create_category(
                NewCategory {
                    name: name.to_string(),
                    description: format!("{} dishes", name),
                },
                &test.deps,
            )
            .await
            .unwrap();
        }
    }

    fn query(name: &str, page: &str, page_size: &str, sort: &str) -> CategoryQuery {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        CategoryQuery {
            name: name.into(),
            list: ListParams {
                page: opt(page),
                page_size: opt(page_size),
                sort: opt(sort),
            },
        }
    }

    #[tokio::test]
    async fn test_list_sorted_descending_by_name() {
        let test = TestDependencies::new();
        seed(&test, &["Soups", "Desserts", "Salads"]).await;

        let page = list_categories(&query("", "", "", "-name"), &test.deps)
            .await
            .unwrap();
        let names: Vec<_> = page.records.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Soups", "Salads", "Desserts"]);
        assert_eq!(page.metadata.total_records, 3);
    }

    #[tokio::test]
    async fn test_name_filter_is_case_insensitive_substring() {
        let test = TestDependencies::new();
        seed(&test, &["Soups", "Desserts", "Salads"]).await;

        let page = list_categories(&query("SA", "", "", ""), &test.deps)
            .await
            .unwrap();
        let names: Vec<_> = page.records.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Salads"]);
    }

    #[tokio::test]
    async fn test_last_partial_page() {
        let test = TestDependencies::new();
        let names: Vec<String> = (1..=45).map(|i| format!("Category {:02}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        seed(&test, &refs).await;

        let page = list_categories(&query("", "3", "20", ""), &test.deps)
            .await
            .unwrap();
        assert_eq!(page.records.len(), 5);
        assert_eq!(page.metadata.last_page, 3);
        assert_eq!(page.metadata.current_page, 3);
        assert_eq!(page.records[0].name, "Category 41");
    }

    #[tokio::test]
    async fn test_unknown_sort_rejected() {
        let test = TestDependencies::new();
        let err = list_categories(&query("", "", "", "price"), &test.deps)
            .await
            .unwrap_err();
        match err {
            CategoryError::Validation(v) => assert_eq!(v.get("sort"), Some("invalid sort value")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_result_has_zero_metadata() {
        let test = TestDependencies::new();
        let page = list_categories(&query("nothing", "", "", ""), &test.deps)
            .await
            .unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.metadata.total_records, 0);
        assert_eq!(page.metadata.last_page, 0);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let test = TestDependencies::new();
        let err = create_category(
            NewCategory {
                name: "   ".into(),
                description: String::new(),
            },
            &test.deps,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CategoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_renames_and_keeps_description() {
        let test = TestDependencies::new();
        seed(&test, &["Soups"]).await;
        let soups = list_categories(&query("", "", "", ""), &test.deps)
            .await
            .unwrap()
            .records
            .remove(0);

        let updated = update_category(
            soups.id,
            CategoryChanges {
                name: Some(" Broths ".into()),
                description: None,
            },
            &test.deps,
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Broths");
        assert_eq!(updated.description, "Soups dishes");
        assert_eq!(get_category(soups.id, &test.deps).await.unwrap(), updated);

        let err = update_category(
            soups.id,
            CategoryChanges {
                name: Some(String::new()),
                description: None,
            },
            &test.deps,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CategoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_then_lookup_is_not_found() {
        let test = TestDependencies::new();
        seed(&test, &["Soups"]).await;
        let id = list_categories(&query("", "", "", ""), &test.deps)
            .await
            .unwrap()
            .records[0]
            .id;

        delete_category(id, &test.deps).await.unwrap();
        assert!(matches!(
            get_category(id, &test.deps).await,
            Err(CategoryError::NotFound)
        ));
        assert!(matches!(
            delete_category(id, &test.deps).await,
            Err(CategoryError::NotFound)
        ));
    }
}
