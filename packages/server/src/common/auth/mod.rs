//! Authorization for the dishes API
//!
//! Handlers never look identity up from ambient state. The middleware layer
//! resolves an [`Identity`] and the guards narrow it:
//!
//! ```rust,ignore
//! let member = require_permission(identity, Capability::DishesWrite, &*deps.permissions).await?;
//! ```

mod capability;
mod errors;
mod guards;
mod identity;

pub use capability::{CanReadDishes, CanWriteDishes, Capability, Permissions, RequiredCapability};
pub use errors::AuthError;
pub use guards::{require_activated, require_authenticated, require_permission};
pub use identity::Identity;
