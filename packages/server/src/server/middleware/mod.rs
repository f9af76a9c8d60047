// HTTP middleware and request guards
pub mod authenticate;
pub mod guards;

pub use authenticate::*;
pub use guards::*;
