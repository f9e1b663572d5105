//! Admin console.
//!
//! Every route requires [`RequireAdmin`]. The console is one page with tabs;
//! each action posts, queues a notice with the outcome and redirects back to
//! the tab it came from. Moderation rules live in the backend; this module
//! only forwards the admin's decisions.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use wheelhouse_core::{ActivityType, OrderId, OrderStatus, TelegramId};

use crate::api::{ActivityFilter, ActivityLog, AdminStats, ApiError, User};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::navigation::Page;
use crate::routes::views::{Layout, OrderView, order_views};
use crate::state::AppState;
use crate::telegram::{Notice, push_notice};

/// Number of activity log rows requested.
const ACTIVITY_LIMIT: u32 = 100;

// =============================================================================
// Tabs
// =============================================================================

/// A console tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Pending,
    All,
    Users,
    Activity,
    Settings,
    Stats,
}

impl AdminTab {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::All,
        Self::Users,
        Self::Activity,
        Self::Settings,
        Self::Stats,
    ];

    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::All => "all",
            Self::Users => "users",
            Self::Activity => "activity",
            Self::Settings => "settings",
            Self::Stats => "stats",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Ожидают",
            Self::All => "Все заказы",
            Self::Users => "Пользователи",
            Self::Activity => "Активность",
            Self::Settings => "Наценка",
            Self::Stats => "Статистика",
        }
    }

    /// Unknown ids open the pending orders.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|tab| tab.id() == id)
            .unwrap_or(Self::Pending)
    }

    fn path(self) -> String {
        format!("{}?tab={}", Page::Admin.path(), self.id())
    }
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Query string of the console page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminQuery {
    pub tab: String,
    /// Status filter on the all-orders tab.
    pub status: String,
    /// Activity filters.
    pub user: String,
    pub activity_type: String,
}

/// Hidden `tab` field carried by order action forms.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReturnForm {
    pub tab: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmForm {
    pub tab: String,
    pub comment: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RejectForm {
    pub tab: String,
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    pub tab: String,
    pub status: String,
    pub comment: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MarkupForm {
    pub markup_percentage: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub message: String,
}

// =============================================================================
// View Types
// =============================================================================

/// Tab link.
#[derive(Clone)]
pub struct TabLink {
    pub id: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// A `<select>` option with an owned value.
#[derive(Clone)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// A user row.
#[derive(Clone)]
pub struct UserRow {
    pub telegram_id: String,
    pub name: String,
    pub username: Option<String>,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub created_at: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            telegram_id: user.telegram_id.to_string(),
            name: user.full_name(),
            username: user.username.clone().filter(|u| !u.is_empty()),
            is_admin: user.is_admin,
            is_blocked: user.is_blocked,
            created_at: filters::format_datetime(user.created_at),
        }
    }
}

/// An activity log row.
#[derive(Clone)]
pub struct ActivityRow {
    pub user: String,
    pub kind: String,
    pub params: Option<String>,
    pub result_count: Option<u64>,
    pub timestamp: String,
}

impl From<&ActivityLog> for ActivityRow {
    fn from(log: &ActivityLog) -> Self {
        let user = match log.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => format!("@{username} ({})", log.telegram_id),
            None => log.telegram_id.to_string(),
        };
        Self {
            user,
            kind: log.activity_type.label().to_string(),
            params: log.params_summary(),
            result_count: log.result_count,
            timestamp: filters::format_datetime(log.timestamp),
        }
    }
}

/// Stats tab figures.
#[derive(Clone)]
pub struct StatsView {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub confirmed_orders: u64,
    pub completed_orders: u64,
    pub cancelled_orders: u64,
    pub total_users: u64,
    pub total_revenue: String,
}

impl From<&AdminStats> for StatsView {
    fn from(stats: &AdminStats) -> Self {
        Self {
            total_orders: stats.total_orders,
            pending_orders: stats.pending_orders,
            confirmed_orders: stats.confirmed_orders,
            completed_orders: stats.completed_orders,
            cancelled_orders: stats.cancelled_orders,
            total_users: stats.total_users,
            total_revenue: stats.total_revenue.display_rounded(),
        }
    }
}

/// Console page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub layout: Layout,
    pub tab: &'static str,
    pub tabs: Vec<TabLink>,
    pub failed: bool,
    pub orders: Vec<OrderView>,
    pub status_filter: Vec<FilterOption>,
    pub transitions: Vec<FilterOption>,
    pub users: Vec<UserRow>,
    pub activity: Vec<ActivityRow>,
    pub activity_total: u64,
    pub activity_types: Vec<FilterOption>,
    pub activity_user: String,
    pub markup: Option<String>,
    pub stats: Option<StatsView>,
}

impl AdminTemplate {
    fn new(layout: Layout, tab: AdminTab) -> Self {
        Self {
            layout,
            tab: tab.id(),
            tabs: AdminTab::ALL
                .into_iter()
                .map(|t| TabLink {
                    id: t.id(),
                    label: t.label(),
                    active: t == tab,
                })
                .collect(),
            failed: false,
            orders: Vec::new(),
            status_filter: Vec::new(),
            transitions: OrderStatus::ADMIN_TRANSITIONS
                .iter()
                .map(|s| FilterOption {
                    value: s.as_str().to_string(),
                    label: s.label().to_string(),
                    selected: false,
                })
                .collect(),
            users: Vec::new(),
            activity: Vec::new(),
            activity_total: 0,
            activity_types: Vec::new(),
            activity_user: String::new(),
            markup: None,
            stats: None,
        }
    }
}

// =============================================================================
// Page
// =============================================================================

/// Display a console tab.
#[instrument(skip(state, session, admin), fields(admin = %admin.telegram_id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<AdminQuery>,
) -> impl IntoResponse {
    let tab = AdminTab::from_id(&query.tab);
    let api = state.api();
    let me = admin.telegram_id.clone();
    let layout = Layout::new(&state, &session, Page::Admin, Some(admin)).await;
    let mut page = AdminTemplate::new(layout, tab);

    let loaded: Result<(), ApiError> = match tab {
        AdminTab::Pending => api
            .pending_orders(&me)
            .await
            .map(|orders| page.orders = order_views(&orders)),
        AdminTab::All => {
            let status = non_blank(&query.status).map(|s| OrderStatus::from(s.to_string()));
            page.status_filter = all_statuses()
                .into_iter()
                .map(|s| FilterOption {
                    selected: status.as_ref() == Some(&s),
                    value: s.as_str().to_string(),
                    label: s.label().to_string(),
                })
                .collect();
            api.all_orders(&me, status.as_ref())
                .await
                .map(|orders| page.orders = order_views(&orders))
        }
        AdminTab::Users => api
            .users(&me)
            .await
            .map(|users| page.users = users.iter().map(UserRow::from).collect()),
        AdminTab::Activity => {
            let filter = ActivityFilter {
                user_telegram_id: non_blank(&query.user).map(str::to_string),
                activity_type: non_blank(&query.activity_type).map(str::to_string),
                limit: Some(ACTIVITY_LIMIT),
            };
            page.activity_user = query.user.trim().to_string();
            page.activity_types = ActivityType::FILTERABLE
                .iter()
                .map(|t| FilterOption {
                    value: t.as_str().to_string(),
                    label: t.label().to_string(),
                    selected: filter.activity_type.as_deref() == Some(t.as_str()),
                })
                .collect();
            api.activity(&me, &filter).await.map(|activity| {
                page.activity_total = activity.total;
                page.activity = activity.logs.iter().map(ActivityRow::from).collect();
            })
        }
        AdminTab::Settings => api
            .markup(&me)
            .await
            .map(|settings| page.markup = Some(settings.markup_percentage.to_string())),
        AdminTab::Stats => api
            .stats(&me)
            .await
            .map(|stats| page.stats = Some(StatsView::from(&stats))),
    };

    if let Err(e) = loaded {
        tracing::error!(error = %e, tab = tab.id(), "Admin data request failed");
        page.failed = true;
        page.layout
            .notices
            .push(Notice::error(error_text("Ошибка загрузки данных", &e)));
    }

    page
}

// =============================================================================
// Order Actions
// =============================================================================

/// Confirm a pending order with an optional comment.
#[instrument(skip(state, session, admin, form), fields(admin = %admin.telegram_id))]
pub async fn confirm_order(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Redirect {
    let comment = non_blank(&form.comment).map(str::to_string);
    let result = state
        .api()
        .confirm_order(&admin.telegram_id, &OrderId::from(order_id), comment)
        .await;
    report(&session, result, |_| "Заказ подтвержден".to_string()).await;
    back(&form.tab)
}

/// Reject a pending order; a reason is required.
#[instrument(skip(state, session, admin, form), fields(admin = %admin.telegram_id))]
pub async fn reject_order(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<String>,
    Form(form): Form<RejectForm>,
) -> Redirect {
    let Some(reason) = non_blank(&form.reason) else {
        push_notice(&session, Notice::error("Укажите причину отклонения")).await;
        return back(&form.tab);
    };
    let result = state
        .api()
        .reject_order(&admin.telegram_id, &OrderId::from(order_id), reason)
        .await;
    report(&session, result, |_| "Заказ отклонен".to_string()).await;
    back(&form.tab)
}

/// Move a confirmed order to another status.
#[instrument(skip(state, session, admin, form), fields(admin = %admin.telegram_id))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let status = OrderStatus::from(form.status.trim().to_string());
    if !OrderStatus::ADMIN_TRANSITIONS.contains(&status) {
        push_notice(&session, Notice::error("Неизвестный статус")).await;
        return back(&form.tab);
    }
    let result = state
        .api()
        .update_order_status(
            &admin.telegram_id,
            &OrderId::from(order_id),
            &status,
            non_blank(&form.comment),
        )
        .await;
    report(&session, result, |order| {
        format!("Статус обновлен: {}", order.status.label())
    })
    .await;
    back(&form.tab)
}

/// Hide an order from the lists.
#[instrument(skip(state, session, admin, form), fields(admin = %admin.telegram_id))]
pub async fn hide_order(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<String>,
    Form(form): Form<ReturnForm>,
) -> Redirect {
    let result = state
        .api()
        .hide_order(&admin.telegram_id, &OrderId::from(order_id))
        .await;
    report(&session, result, |()| "Заказ скрыт".to_string()).await;
    back(&form.tab)
}

// =============================================================================
// Settings, Users, Logs
// =============================================================================

/// Set the store markup percentage.
#[instrument(skip(state, session, admin, form), fields(admin = %admin.telegram_id))]
pub async fn set_markup(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<MarkupForm>,
) -> Redirect {
    let Some(markup) = parse_markup(&form.markup_percentage) else {
        push_notice(&session, Notice::error("Введите наценку от 0 до 1000 %")).await;
        return back(AdminTab::Settings.id());
    };
    let result = state.api().set_markup(&admin.telegram_id, markup).await;
    report(&session, result, |settings| {
        format!("Наценка обновлена: {}%", settings.markup_percentage)
    })
    .await;
    back(AdminTab::Settings.id())
}

/// Block a user.
#[instrument(skip(state, session, admin), fields(admin = %admin.telegram_id))]
pub async fn block_user(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> Redirect {
    let result = state
        .api()
        .block_user(&admin.telegram_id, &TelegramId::from(user_id))
        .await;
    report(&session, result, |()| "Пользователь заблокирован".to_string()).await;
    back(AdminTab::Users.id())
}

/// Unblock a user.
#[instrument(skip(state, session, admin), fields(admin = %admin.telegram_id))]
pub async fn unblock_user(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> Redirect {
    let result = state
        .api()
        .unblock_user(&admin.telegram_id, &TelegramId::from(user_id))
        .await;
    report(&session, result, |()| "Пользователь разблокирован".to_string()).await;
    back(AdminTab::Users.id())
}

/// Send a bot message to a user.
#[instrument(skip(state, session, admin, form), fields(admin = %admin.telegram_id))]
pub async fn message_user(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Redirect {
    let Some(message) = non_blank(&form.message) else {
        push_notice(&session, Notice::error("Введите текст сообщения")).await;
        return back(AdminTab::Users.id());
    };
    let result = state
        .api()
        .message_user(&admin.telegram_id, &TelegramId::from(user_id), message)
        .await;
    report(&session, result, |()| "Сообщение отправлено".to_string()).await;
    back(AdminTab::Users.id())
}

/// Delete all activity logs.
#[instrument(skip(state, session, admin), fields(admin = %admin.telegram_id))]
pub async fn reset_activity(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Redirect {
    let result = state.api().reset_activity(&admin.telegram_id).await;
    report(&session, result, |deleted| {
        format!("Логи активности очищены (удалено: {deleted})")
    })
    .await;
    back(AdminTab::Activity.id())
}

/// Reset the statistics counters.
#[instrument(skip(state, session, admin), fields(admin = %admin.telegram_id))]
pub async fn reset_stats(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Redirect {
    let result = state.api().reset_stats(&admin.telegram_id).await;
    report(&session, result, |deleted| {
        format!("Статистика сброшена (удалено: {deleted})")
    })
    .await;
    back(AdminTab::Stats.id())
}

// =============================================================================
// Helpers
// =============================================================================

/// Queue the notice for an action outcome.
async fn report<T>(
    session: &Session,
    result: Result<T, ApiError>,
    success: impl FnOnce(T) -> String,
) {
    let notice = match result {
        Ok(value) => Notice::success(success(value)),
        Err(e) => {
            tracing::error!(error = %e, "Admin action failed");
            Notice::error(error_text("Ошибка", &e))
        }
    };
    push_notice(session, notice).await;
}

fn error_text(prefix: &str, error: &ApiError) -> String {
    match error.detail() {
        Some(detail) => format!("{prefix}: {detail}"),
        None => prefix.to_string(),
    }
}

fn back(tab: &str) -> Redirect {
    Redirect::to(&AdminTab::from_id(tab).path())
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Percentage between 0 and 1000, accepting a comma separator.
fn parse_markup(raw: &str) -> Option<f64> {
    non_blank(raw)?
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|m| m.is_finite() && (0.0..=1000.0).contains(m))
}

fn all_statuses() -> Vec<OrderStatus> {
    let mut statuses = vec![OrderStatus::PendingConfirmation, OrderStatus::Confirmed];
    statuses.extend(OrderStatus::ADMIN_TRANSITIONS);
    statuses
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tab_ids() {
        for tab in AdminTab::ALL {
            assert_eq!(AdminTab::from_id(tab.id()), tab);
        }
        assert_eq!(AdminTab::from_id("nope"), AdminTab::Pending);
        assert_eq!(AdminTab::Users.path(), "/admin?tab=users");
    }

    #[test]
    fn test_parse_markup() {
        assert_eq!(parse_markup("15"), Some(15.0));
        assert_eq!(parse_markup(" 12,5 "), Some(12.5));
        assert_eq!(parse_markup("-1"), None);
        assert_eq!(parse_markup("abc"), None);
        assert_eq!(parse_markup(""), None);
    }

    #[test]
    fn test_status_filter_lists_every_status() {
        let statuses = all_statuses();
        assert_eq!(statuses.len(), 8);
        assert_eq!(statuses[0], OrderStatus::PendingConfirmation);
    }
}
