//! Inner payloads carried in the `msg` field of the four asynchronous callbacks.
use serde::{Deserialize, Serialize};

use crate::callback::{CallbackKind, CallbackMessage};

pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Payment result notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotification {
    #[serde(default)]
    pub appid: String,
    /// The developer-side order number (`out_order_no` at order creation).
    pub cp_orderno: String,
    #[serde(default)]
    pub cp_extra: String,
    /// Payment channel. 1: WeChat, 2: Alipay, 10: Douyin pay.
    #[serde(default)]
    pub way: String,
    #[serde(default)]
    pub payment_order_no: String,
    #[serde(default)]
    pub channel_no: String,
    /// Amount in cents
    #[serde(default)]
    pub total_amount: i64,
    #[serde(default)]
    pub extra: String,
    /// SUCCESS, TIMEOUT or FAIL
    pub status: String,
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub seller_uid: String,
    #[serde(default)]
    pub paid_at: i64,
    #[serde(default)]
    pub order_id: String,
}

impl PaymentNotification {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

impl CallbackMessage for PaymentNotification {
    const KIND: CallbackKind = CallbackKind::Payment;
}

/// Refund result notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundNotification {
    #[serde(default)]
    pub appid: String,
    /// The developer-side refund number (`out_refund_no`).
    pub cp_refundno: String,
    #[serde(default)]
    pub cp_extra: String,
    /// SUCCESS or FAIL
    pub status: String,
    #[serde(default)]
    pub refund_amount: i64,
    #[serde(default)]
    pub is_all_settled: bool,
    #[serde(default)]
    pub refunded_at: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub refund_no: String,
}

impl RefundNotification {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

impl CallbackMessage for RefundNotification {
    const KIND: CallbackKind = CallbackKind::Refund;
}

/// Settlement result notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleNotification {
    #[serde(default)]
    pub app_id: String,
    /// The developer-side settlement number (`out_settle_no`).
    pub cp_settle_no: String,
    #[serde(default)]
    pub cp_extra: String,
    pub status: String,
    #[serde(default)]
    pub rake: i64,
    #[serde(default)]
    pub commission: i64,
    #[serde(default)]
    pub settle_detail: String,
    #[serde(default)]
    pub settled_at: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub channel_settle_id: String,
    #[serde(default)]
    pub settle_amount: i64,
    #[serde(default)]
    pub settle_no: String,
    #[serde(default)]
    pub out_order_no: String,
    #[serde(default)]
    pub is_auto_settle: bool,
}

impl SettleNotification {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

impl CallbackMessage for SettleNotification {
    const KIND: CallbackKind = CallbackKind::Settle;
}

/// Merchant withdrawal result notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawNotification {
    /// SUCCESS, FAIL, PROCESSING or REEXCHANGE. A REEXCHANGE means the bank bounced an earlier successful withdrawal
    /// and the funds were returned to the merchant balance.
    pub status: String,
    #[serde(default)]
    pub extra: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub withdraw_at: i64,
    #[serde(default)]
    pub order_id: String,
    pub out_order_id: String,
    #[serde(default)]
    pub ch_order_id: String,
}

impl WithdrawNotification {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    pub fn is_bounced(&self) -> bool {
        self.status == "REEXCHANGE"
    }
}

impl CallbackMessage for WithdrawNotification {
    const KIND: CallbackKind = CallbackKind::Withdraw;
}
