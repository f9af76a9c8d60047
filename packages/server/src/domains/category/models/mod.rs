pub mod category;

pub use category::{Category, NewCategory, MAX_CATEGORY_NAME_BYTES};
