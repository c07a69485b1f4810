//! Storage key constants.

/// Keys persisted in the secure store. The layout is unversioned.
pub struct StorageKeys;

impl StorageKeys {
    /// Opaque bearer token issued by login/register
    pub const USER_TOKEN: &'static str = "userToken";

    /// Identifier of the signed-in user
    pub const USER_ID: &'static str = "userId";
}
