//! Category domain - the first consumer of the shared list engine

pub mod actions;
pub mod models;

pub use actions::{
    create_category, delete_category, get_category, list_categories, update_category,
    CategoryChanges, CategoryError, CategoryQuery, CATEGORY_SORT_SAFELIST,
};
pub use models::{Category, NewCategory};
