pub mod dish;

pub use dish::{Dish, DishFilter, NewDish, MAX_DISH_DESCRIPTION_BYTES, MAX_DISH_NAME_BYTES};
