//! The Mini-App's named views.
//!
//! Navigation is plain assignment: every page is reachable from the home
//! menu, every page links back home, and there is no history stack. The only
//! guarded page is the admin console.

use crate::api::User;

/// A top-level view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Search,
    CarSelection,
    Cart,
    Orders,
    Admin,
}

impl Page {
    /// All pages, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Home,
        Self::Search,
        Self::CarSelection,
        Self::Cart,
        Self::Orders,
        Self::Admin,
    ];

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Search => "search",
            Self::CarSelection => "car-selection",
            Self::Cart => "cart",
            Self::Orders => "orders",
            Self::Admin => "admin",
        }
    }

    /// Resolve an identifier; unknown ids land on the home page.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|page| page.id() == id)
            .unwrap_or(Self::Home)
    }

    /// URL path of the page.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Search => "/search",
            Self::CarSelection => "/car-selection",
            Self::Cart => "/cart",
            Self::Orders => "/orders",
            Self::Admin => "/admin",
        }
    }

    /// Page heading.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Home => "Шины и диски",
            Self::Search => "Поиск",
            Self::CarSelection => "Подбор по авто",
            Self::Cart => "Корзина",
            Self::Orders => "Мои заказы",
            Self::Admin => "Админ-панель",
        }
    }

    /// One-line description on the home menu.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Home => "",
            Self::Search => "Шины и диски по размерам",
            Self::CarSelection => "Марка, модель, год и модификация",
            Self::Cart => "Оформление заказа",
            Self::Orders => "История и статусы заказов",
            Self::Admin => "Заказы, пользователи, наценка",
        }
    }

    /// Whether `user` may open the page.
    #[must_use]
    pub fn is_visible_to(&self, user: Option<&User>) -> bool {
        match self {
            Self::Admin => user.is_some_and(|u| u.is_admin),
            _ => true,
        }
    }

    /// Entries of the home menu for `user`.
    #[must_use]
    pub fn menu(user: Option<&User>) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|page| *page != Self::Home && page.is_visible_to(user))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheelhouse_core::TelegramId;

    fn user(is_admin: bool) -> User {
        User {
            telegram_id: TelegramId::from("42"),
            username: None,
            first_name: Some("Анна".to_string()),
            last_name: None,
            is_admin,
            is_blocked: false,
            created_at: None,
        }
    }

    #[test]
    fn test_ids_round_trip() {
        for page in Page::ALL {
            assert_eq!(Page::from_id(page.id()), page);
        }
    }

    #[test]
    fn test_unknown_id_resolves_home() {
        assert_eq!(Page::from_id("checkout"), Page::Home);
        assert_eq!(Page::from_id(""), Page::Home);
    }

    #[test]
    fn test_admin_hidden_from_customers() {
        let customer = user(false);
        let menu = Page::menu(Some(&customer));
        assert!(!menu.contains(&Page::Admin));
        assert!(!menu.contains(&Page::Home));
        assert_eq!(menu.len(), 4);

        assert!(!Page::menu(None).contains(&Page::Admin));
        assert!(Page::menu(Some(&user(true))).contains(&Page::Admin));
    }
}
