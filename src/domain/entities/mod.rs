pub mod gateway_method;
pub mod invoice_status;
pub mod notification_kind;
pub mod tenant;
