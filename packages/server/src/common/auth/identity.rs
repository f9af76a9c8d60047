use crate::domains::member::Member;

/// Who is making the request.
///
/// Resolved once per request from the `Authorization` header and handed to
/// handlers explicitly. `Anonymous` fails every guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated(Member),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn member(&self) -> Option<&Member> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(member) => Some(member),
        }
    }
}
