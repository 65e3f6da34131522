//! Authenticated identity as resolved by the external identity provider.

/// The profile the identity provider hands us for the current request.
///
/// Services take `Option<&Identity>`; `None` means the request carried no
/// resolvable identity. Only `subject_id` is used outside of directory
/// sync, which consumes the profile fields to provision a new user.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Opaque subject identifier, unique per account at the provider.
    pub subject_id: String,
    /// Provider-side username, if the provider has one.
    pub username: Option<String>,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}
