//! Typed ID definitions for domain entities.
//!
//! ```rust
//! use server_core::common::{CategoryId, DishId, MemberId};
//!
//! let member_id = MemberId::new(1);
//! let category_id = CategoryId::new(1);
//! let dish_id = DishId::new(1);
//! // let wrong: CategoryId = member_id; // compile error
//! # let _ = (member_id, category_id, dish_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Member entities (registered accounts).
pub struct Member;

/// Marker type for Category entities (menu categories).
pub struct Category;

/// Marker type for Dish entities (menu items).
pub struct Dish;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Member entities.
pub type MemberId = Id<Member>;

/// Typed ID for Category entities.
pub type CategoryId = Id<Category>;

/// Typed ID for Dish entities.
pub type DishId = Id<Dish>;
