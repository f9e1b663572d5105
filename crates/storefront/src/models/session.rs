//! Session keys.
//!
//! Every piece of per-user UI state lives in the session under one of
//! these keys: the signed-in backend user, the cart, the last search, the
//! car-selection wizard and the notice queue.

/// Session keys for storefront state.
pub mod keys {
    /// The backend [`User`](crate::api::User) returned at sign-in.
    pub const CURRENT_USER: &str = "current_user";

    /// The cart, as a JSON array of lines.
    pub const CART: &str = "cart";

    /// Search form values and the last result page.
    pub const SEARCH: &str = "search";

    /// Car-selection wizard progress.
    pub const WIZARD: &str = "wizard";

    /// Notices waiting to be shown.
    pub const NOTICES: &str = "notices";
}
