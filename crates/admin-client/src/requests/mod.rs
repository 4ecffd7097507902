//! Typed dashboard requests
//!
//! Each variant renders to exactly the frame the dashboard sends. Listing
//! requests carry `filters`; mutations carry `data`.

mod audit;

pub use audit::AuditEntry;

use crate::protocol::{message_types, OutboundMessage};
use serde_json::{json, Map, Value};

/// Free-form listing filters, sent as the `filters` object
pub type Filters = Map<String, Value>;

/// Notification addressed to one user
#[derive(Debug, Clone, PartialEq)]
pub struct UserNotification {
    pub user_id: Value,
    pub title: String,
    pub message: String,
    /// Notification category (`info`, `warning`, ...)
    pub kind: String,
}

/// Notification sent to every user matching the filter
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastNotification {
    pub title: String,
    pub message: String,
    pub kind: String,
    pub active_only: bool,
}

/// Porter request status change
///
/// Unset optional fields are sent as explicit `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct PorterStatusUpdate {
    pub request_id: Value,
    pub status: String,
    pub estimated_cost: Option<f64>,
    pub admin_notes: Option<String>,
}

/// Shop open/closed toggle
#[derive(Debug, Clone, PartialEq)]
pub struct ShopStatusUpdate {
    pub is_open: bool,
    pub reason: Option<String>,
    pub reopen_time: Option<String>,
}

impl ShopStatusUpdate {
    #[must_use]
    pub fn open() -> Self {
        Self {
            is_open: true,
            reason: None,
            reopen_time: None,
        }
    }

    #[must_use]
    pub fn closed(reason: impl Into<String>) -> Self {
        Self {
            is_open: false,
            reason: Some(reason.into()),
            reopen_time: None,
        }
    }
}

/// A request the admin dashboard can send
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    GetProducts,
    DeleteProduct { id: Value },

    GetOrders { filters: Filters },
    UpdateOrderStatus { order_id: Value, status: String },
    GetDeliveryRequestsForOrder { order_id: Value },
    AssignDeliveryPartner { order_id: Value, delivery_partner_id: Value },

    GetUsers { filters: Filters },
    UpdateUserRole { user_id: Value, role: String },
    UpdateUserStatus { user_id: Value, status: String },

    GetNotifications { filters: Filters },
    GetNotificationStats,
    SendNotificationToUser(UserNotification),
    SendNotificationToAll(BroadcastNotification),
    DeleteNotification { notification_id: Value },

    GetPorterRequests { filters: Filters },
    GetPorterStats { filters: Filters },
    UpdatePorterRequestStatus(PorterStatusUpdate),

    GetShopStatus,
    UpdateShopStatus(ShopStatusUpdate),

    GetAnalytics { filters: Filters },

    AuditLog(AuditEntry),
}

impl Request {
    /// Wire `type` of this request
    #[must_use]
    pub const fn message_type(&self) -> &'static str {
        match self {
            Self::GetProducts => message_types::GET_PRODUCTS,
            Self::DeleteProduct { .. } => message_types::DELETE_PRODUCT,
            Self::GetOrders { .. } => message_types::GET_ORDERS,
            Self::UpdateOrderStatus { .. } => message_types::UPDATE_ORDER_STATUS,
            Self::GetDeliveryRequestsForOrder { .. } => {
                message_types::GET_DELIVERY_REQUESTS_FOR_ORDER
            }
            Self::AssignDeliveryPartner { .. } => message_types::ASSIGN_DELIVERY_PARTNER,
            Self::GetUsers { .. } => message_types::GET_USERS,
            Self::UpdateUserRole { .. } => message_types::UPDATE_USER_ROLE,
            Self::UpdateUserStatus { .. } => message_types::UPDATE_USER_STATUS,
            Self::GetNotifications { .. } => message_types::GET_NOTIFICATIONS,
            Self::GetNotificationStats => message_types::GET_NOTIFICATION_STATS,
            Self::SendNotificationToUser(_) => message_types::SEND_NOTIFICATION_TO_USER,
            Self::SendNotificationToAll(_) => message_types::SEND_NOTIFICATION_TO_ALL,
            Self::DeleteNotification { .. } => message_types::DELETE_NOTIFICATION,
            Self::GetPorterRequests { .. } => message_types::GET_PORTER_REQUESTS,
            Self::GetPorterStats { .. } => message_types::GET_PORTER_STATS,
            Self::UpdatePorterRequestStatus(_) => message_types::UPDATE_PORTER_REQUEST_STATUS,
            Self::GetShopStatus => message_types::GET_SHOP_STATUS,
            Self::UpdateShopStatus(_) => message_types::UPDATE_SHOP_STATUS,
            Self::GetAnalytics { .. } => message_types::GET_ANALYTICS,
            Self::AuditLog(_) => message_types::AUDIT_LOG,
        }
    }

    /// Build the outbound message
    #[must_use]
    pub fn into_message(self) -> OutboundMessage {
        let message = OutboundMessage::new(self.message_type());

        match self {
            Self::GetProducts | Self::GetNotificationStats | Self::GetShopStatus => message,

            Self::GetOrders { filters }
            | Self::GetUsers { filters }
            | Self::GetNotifications { filters }
            | Self::GetPorterRequests { filters }
            | Self::GetPorterStats { filters }
            | Self::GetAnalytics { filters } => message.with_filters(Value::Object(filters)),

            Self::DeleteProduct { id } => message.with_data(json!({ "id": id })),
            Self::UpdateOrderStatus { order_id, status } => {
                message.with_data(json!({ "order_id": order_id, "status": status }))
            }
            Self::GetDeliveryRequestsForOrder { order_id } => {
                message.with_data(json!({ "order_id": order_id }))
            }
            Self::AssignDeliveryPartner {
                order_id,
                delivery_partner_id,
            } => message.with_data(json!({
                "order_id": order_id,
                "delivery_partner_id": delivery_partner_id,
            })),
            Self::UpdateUserRole { user_id, role } => {
                message.with_data(json!({ "user_id": user_id, "role": role }))
            }
            Self::UpdateUserStatus { user_id, status } => {
                message.with_data(json!({ "user_id": user_id, "status": status }))
            }
            Self::SendNotificationToUser(n) => message.with_data(json!({
                "user_id": n.user_id,
                "title": n.title,
                "message": n.message,
                "type": n.kind,
            })),
            Self::SendNotificationToAll(n) => message.with_data(json!({
                "title": n.title,
                "message": n.message,
                "type": n.kind,
                "user_filter": { "active_only": n.active_only },
            })),
            Self::DeleteNotification { notification_id } => {
                message.with_data(json!({ "notification_id": notification_id }))
            }
            Self::UpdatePorterRequestStatus(update) => message.with_data(json!({
                "request_id": update.request_id,
                "status": update.status,
                "estimated_cost": update.estimated_cost,
                "admin_notes": update.admin_notes,
            })),
            Self::UpdateShopStatus(update) => message.with_data(json!({
                "is_open": update.is_open,
                "reason": update.reason,
                "reopen_time": update.reopen_time,
            })),
            Self::AuditLog(entry) => message.with_data(entry.to_value()),
        }
    }
}

impl From<Request> for OutboundMessage {
    fn from(request: Request) -> Self {
        request.into_message()
    }
}
