use std::fmt;

/// Capabilities a member can be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Browse dishes, categories and the rest of the catalogue
    DishesRead,

    /// Create and change catalogue entries
    DishesWrite,
}

impl Capability {
    /// Code stored in the `permissions` table.
    pub const fn code(&self) -> &'static str {
        match self {
            Capability::DishesRead => "dishes:read",
            Capability::DishesWrite => "dishes:write",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Permission codes granted to one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions(Vec<String>);

impl Permissions {
    pub fn new(codes: Vec<String>) -> Self {
        Self(codes)
    }

    pub fn include(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Permissions {
    fn from(codes: Vec<String>) -> Self {
        Self(codes)
    }
}

/// Type-level capability, used to parameterize the `Permitted` extractor.
pub trait RequiredCapability: Send + Sync + 'static {
    const CAPABILITY: Capability;
}

pub struct CanReadDishes;

impl RequiredCapability for CanReadDishes {
    const CAPABILITY: Capability = Capability::DishesRead;
}

pub struct CanWriteDishes;

impl RequiredCapability for CanWriteDishes {
    const CAPABILITY: Capability = Capability::DishesWrite;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Capability::DishesRead.code(), "dishes:read");
        assert_eq!(CanWriteDishes::CAPABILITY.to_string(), "dishes:write");
    }

    #[test]
    fn test_include_is_exact() {
        let permissions = Permissions::from(vec!["dishes:read".to_string()]);
        assert!(permissions.include("dishes:read"));
        assert!(!permissions.include("dishes"));
        assert!(!permissions.include("dishes:write"));
        assert!(!Permissions::default().include("dishes:read"));
    }
}
