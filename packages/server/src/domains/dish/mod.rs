//! Dish domain - the menu, gated by the `dishes:*` permissions

pub mod actions;
pub mod models;

pub use actions::{
    create_dish, delete_dish, get_dish, list_dishes, update_dish, DishError, DishInput, DishQuery,
    DISH_SORT_SAFELIST,
};
pub use models::{Dish, DishFilter, NewDish};
