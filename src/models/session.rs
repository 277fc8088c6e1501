use serde::{Deserialize, Serialize};

/// Profile claims returned by the identity provider's userinfo endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderProfile {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// The signed-in caller. `id` is the provider's stable subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl From<ProviderProfile> for Identity {
    fn from(profile: ProviderProfile) -> Self {
        Self {
            id: profile.sub,
            email: profile.email,
            name: profile.name,
            image: profile.picture,
        }
    }
}

/// Stored user record, keyed by email
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Outcome of resolving the caller of one request
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(identity) => Some(identity.id.as_str()),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(identity) => Some(identity),
        }
    }
}
