//! Reserved message type strings
//!
//! Every frame carries one of these (or a server-defined type) in its `type` field.

/// Wildcard handler key; sees every inbound message
pub const WILDCARD: &str = "*";

// === Outbound ===

pub const AUTHENTICATE: &str = "authenticate";
pub const SUBSCRIBE: &str = "subscribe";
pub const AUDIT_LOG: &str = "audit_log";

pub const GET_PRODUCTS: &str = "get_products";
pub const DELETE_PRODUCT: &str = "delete_product";

pub const GET_ORDERS: &str = "get_orders";
pub const UPDATE_ORDER_STATUS: &str = "update_order_status";
pub const GET_DELIVERY_REQUESTS_FOR_ORDER: &str = "get_delivery_requests_for_order";
pub const ASSIGN_DELIVERY_PARTNER: &str = "assign_delivery_partner";

pub const GET_USERS: &str = "get_users";
pub const UPDATE_USER_ROLE: &str = "update_user_role";
pub const UPDATE_USER_STATUS: &str = "update_user_status";

pub const GET_NOTIFICATIONS: &str = "get_notifications";
pub const GET_NOTIFICATION_STATS: &str = "get_notification_stats";
pub const SEND_NOTIFICATION_TO_USER: &str = "send_notification_to_user";
pub const SEND_NOTIFICATION_TO_ALL: &str = "send_notification_to_all";
pub const DELETE_NOTIFICATION: &str = "delete_notification";

pub const GET_PORTER_REQUESTS: &str = "get_porter_requests";
pub const GET_PORTER_STATS: &str = "get_porter_stats";
pub const UPDATE_PORTER_REQUEST_STATUS: &str = "update_porter_request_status";

pub const GET_SHOP_STATUS: &str = "get_shop_status";
pub const UPDATE_SHOP_STATUS: &str = "update_shop_status";

pub const GET_ANALYTICS: &str = "get_analytics";

// === Inbound ===

pub const AUTH_SUCCESS: &str = "auth_success";
pub const ERROR: &str = "error";

pub const PRODUCTS_DATA: &str = "products_data";
pub const PRODUCT_CREATED: &str = "product_created";
pub const PRODUCT_UPDATED: &str = "product_updated";
pub const PRODUCT_DELETED: &str = "product_deleted";

pub const ORDERS_DATA: &str = "orders_data";
pub const ORDER_UPDATED: &str = "order_updated";
pub const ORDER_ASSIGNED: &str = "order_assigned";
pub const DELIVERY_REQUESTS_DATA: &str = "delivery_requests_data";

pub const USERS_DATA: &str = "users_data";
pub const USER_UPDATED: &str = "user_updated";
pub const USER_STATUS_UPDATED: &str = "user_status_updated";

pub const NOTIFICATIONS_DATA: &str = "notifications_data";
pub const NOTIFICATION_STATS: &str = "notification_stats";
pub const NOTIFICATION_SENT: &str = "notification_sent";
pub const NOTIFICATION_BROADCAST_SENT: &str = "notification_broadcast_sent";
pub const NOTIFICATION_DELETED: &str = "notification_deleted";

pub const PORTER_REQUESTS_DATA: &str = "porter_requests_data";
pub const PORTER_STATS_DATA: &str = "porter_stats_data";
pub const PORTER_REQUEST_UPDATED: &str = "porter_request_updated";

pub const SHOP_STATUS: &str = "shop_status";
pub const SHOP_STATUS_UPDATED: &str = "shop_status_updated";
/// Unsolicited broadcast when another admin toggles the shop
pub const SHOP_STATUS_CHANGED: &str = "shop_status_changed";
