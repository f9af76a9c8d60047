// HTTP routes
pub mod categories;
pub mod dishes;
pub mod health;
pub mod members;
pub mod tokens;

pub use categories::*;
pub use dishes::*;
pub use health::*;
pub use members::*;
pub use tokens::*;
