//! Request and response carriers for the guaranteed-payment ("ecpay") endpoints.
//!
//! Each request type lists its signable fields with [`signable_request!`](crate::signable_request). `app_id`,
//! `thirdparty_id` and `sign` are never listed; the signer ignores them anyway.
use serde::{Deserialize, Serialize};

use crate::{signable_request, OpenApiError};

pub const CREATE_ORDER_PATH: &str = "/api/apps/ecpay/v1/create_order";
pub const QUERY_ORDER_PATH: &str = "/api/apps/ecpay/v1/query_order";
pub const CREATE_REFUND_PATH: &str = "/api/apps/ecpay/v1/create_refund";
pub const QUERY_REFUND_PATH: &str = "/api/apps/ecpay/v1/query_refund";
pub const SETTLE_PATH: &str = "/api/apps/ecpay/v1/settle";
pub const QUERY_SETTLE_PATH: &str = "/api/apps/ecpay/v1/query_settle";
pub const UNSETTLE_AMOUNT_PATH: &str = "/api/apps/ecpay/v1/unsettle_amount";
pub const CREATE_RETURN_PATH: &str = "/api/apps/ecpay/v1/create_return";
pub const QUERY_RETURN_PATH: &str = "/api/apps/ecpay/v1/query_return";
pub const QUERY_MERCHANT_BALANCE_PATH: &str = "/api/apps/ecpay/saas/query_merchant_balance";
pub const MERCHANT_WITHDRAW_PATH: &str = "/api/apps/ecpay/saas/merchant_withdraw";
pub const QUERY_WITHDRAW_ORDER_PATH: &str = "/api/apps/ecpay/saas/query_withdraw_order";

/// Every ecpay response reports success as `err_no == 0`.
pub trait PlatformResponse: Sized {
    fn error_code(&self) -> i64;

    fn error_message(&self) -> &str;

    fn into_result(self) -> Result<Self, OpenApiError> {
        match self.error_code() {
            0 => Ok(self),
            code => Err(OpenApiError::PlatformError { code, message: self.error_message().to_string() }),
        }
    }
}

#[macro_export]
macro_rules! platform_response {
    ($($name:ident),+ $(,)?) => {
        $(
            impl $crate::ecpay::PlatformResponse for $name {
                fn error_code(&self) -> i64 {
                    self.err_no
                }

                fn error_message(&self) -> &str {
                    &self.err_tips
                }
            }
        )+
    };
}

/// Settlement channel for merchant balance and withdrawal calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawChannel {
    #[serde(rename = "alipay")]
    Alipay,
    #[serde(rename = "wx")]
    WeChat,
    #[serde(rename = "hz")]
    DouyinPay,
    #[serde(rename = "yeepay")]
    YeePay,
}

//--------------------------------------------   Orders   ------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrderParams {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    pub out_order_no: String,
    /// In cents, 1 to 10,000,000,000
    pub total_amount: i64,
    pub subject: String,
    pub body: String,
    /// Order lifetime in seconds, 300 to 172,800
    pub valid_time: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp_extra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_uid: Option<String>,
    /// 1 suppresses the Douyin message sent to the user after payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_msg: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_order_info: Option<ExpandOrderInfo>,
    /// Comma separated payment methods to hide from the cashier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_pay_way: Option<String>,
}

signable_request!(CreateOrderParams => [
    "out_order_no",
    "total_amount",
    "subject",
    "body",
    "valid_time",
    "cp_extra",
    "notify_url",
    "store_uid",
    "disable_msg",
    "msg_page",
    "expand_order_info",
    "limit_pay_way",
]);

impl CreateOrderParams {
    pub fn new(out_order_no: &str, total_amount: i64, subject: &str, body: &str, valid_time: i64) -> Self {
        Self {
            out_order_no: out_order_no.to_string(),
            total_amount,
            subject: subject.to_string(),
            body: body.to_string(),
            valid_time,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandOrderInfo {
    pub original_delivery_fee: i64,
    pub actual_delivery_fee: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrderResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub data: CreateOrderData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrderData {
    pub order_id: String,
    pub order_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOrderParams {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    pub out_order_no: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
}

signable_request!(QueryOrderParams => ["out_order_no"]);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOrderResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub out_order_no: String,
    pub order_id: String,
    pub payment_info: PaymentInfo,
    pub cps_info: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentInfo {
    pub total_fee: i64,
    /// SUCCESS, TIMEOUT, PROCESSING or FAIL
    pub order_status: String,
    /// "yyyy-MM-dd hh:mm:ss"
    pub pay_time: String,
    pub way: i64,
    pub channel_no: String,
    pub seller_uid: String,
    pub item_id: String,
    pub cps_info: String,
}

//--------------------------------------------   Refunds   -----------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRefundParams {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    pub out_order_no: String,
    pub out_refund_no: String,
    pub reason: String,
    pub refund_amount: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp_extra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_msg: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_page: Option<String>,
}

signable_request!(CreateRefundParams => [
    "out_order_no",
    "out_refund_no",
    "reason",
    "refund_amount",
    "cp_extra",
    "notify_url",
    "disable_msg",
    "msg_page",
]);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateRefundResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub refund_no: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRefundParams {
    pub out_refund_no: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
}

signable_request!(QueryRefundParams => ["out_refund_no"]);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRefundResponse {
    pub err_no: i64,
    pub err_tips: String,
    #[serde(rename = "refundInfo")]
    pub refund_info: RefundInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefundInfo {
    pub refund_no: String,
    pub refund_amount: i64,
    pub refund_status: String,
    pub refunded_at: i64,
    pub is_all_settled: bool,
    pub cp_extra: String,
    pub msg: String,
}

//--------------------------------------------   Settlement   --------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettleParams {
    pub out_settle_no: String,
    pub out_order_no: String,
    pub settle_desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp_extra: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    /// JSON array of [`SettleParamsItem`], carried as text. See [`SettleParams::with_settle_items`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,
}

signable_request!(SettleParams => [
    "out_settle_no",
    "out_order_no",
    "settle_desc",
    "notify_url",
    "cp_extra",
    "settle_params",
    "finish",
]);

impl SettleParams {
    pub fn new(out_settle_no: &str, out_order_no: &str, settle_desc: &str) -> Self {
        Self {
            out_settle_no: out_settle_no.to_string(),
            out_order_no: out_order_no.to_string(),
            settle_desc: settle_desc.to_string(),
            ..Default::default()
        }
    }

    /// Stores the profit-sharing recipients as the JSON text the platform expects. An empty list clears the field.
    pub fn with_settle_items(mut self, items: &[SettleParamsItem]) -> Result<Self, OpenApiError> {
        self.settle_params = if items.is_empty() {
            None
        } else {
            let text = serde_json::to_string(items).map_err(|e| OpenApiError::SerializationError(e.to_string()))?;
            Some(text)
        };
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleParamsItem {
    pub merchant_uid: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub settle_no: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySettleParams {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    pub out_settle_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
}

signable_request!(QuerySettleParams => ["out_settle_no"]);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettleResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub settle_info: SettleInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleInfo {
    pub settle_no: String,
    pub settle_amount: i64,
    pub settle_status: String,
    pub settle_detail: String,
    pub settled_at: i64,
    pub rake: i64,
    pub commission: i64,
    pub cp_extra: String,
    pub msg: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnsettleAmountParams {
    pub out_order_no: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_item_order_no: Option<String>,
}

signable_request!(UnsettleAmountParams => ["out_order_no", "out_item_order_no"]);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsettleAmountResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub data: UnsettleAmountData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsettleAmountData {
    pub out_order_no: String,
    pub unsettle_amount: i64,
    pub detail: UnsettleAmountDetail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsettleAmountDetail {
    pub pay_info: PayAmount,
    pub refund_info: Vec<RefundAmount>,
    pub payment_rake: i64,
    pub life_rake: i64,
    pub commission: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayAmount {
    pub out_order_no: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefundAmount {
    pub out_refund_no: String,
    pub amount: i64,
}

//--------------------------------------------   Settlement returns   ------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateReturnParams {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_settle_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_no: Option<String>,
    pub out_return_no: String,
    pub merchant_uid: String,
    pub return_amount: i64,
    pub return_desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp_extra: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
}

signable_request!(CreateReturnParams => [
    "out_settle_no",
    "settle_no",
    "out_return_no",
    "merchant_uid",
    "return_amount",
    "return_desc",
    "cp_extra",
]);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub return_info: ReturnInfo,
}

pub type CreateReturnResponse = ReturnResponse;
pub type QueryReturnResponse = ReturnResponse;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnInfo {
    pub app_id: String,
    pub thirdparty_id: String,
    pub settle_no: String,
    pub out_settle_no: String,
    pub out_return_no: String,
    pub merchant_uid: String,
    pub return_amount: i64,
    pub return_status: String,
    pub return_no: String,
    pub fail_reason: String,
    pub finish_time: i64,
    pub cp_extra: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryReturnParams {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_return_no: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
}

signable_request!(QueryReturnParams => ["return_no", "out_return_no"]);

//--------------------------------------------   Merchant balance & withdrawals   ------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMerchantBalanceParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    pub merchant_uid: String,
    pub channel_type: WithdrawChannel,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_entity: Option<i64>,
}

signable_request!(QueryMerchantBalanceParams => ["merchant_uid", "channel_type", "merchant_entity"]);

impl QueryMerchantBalanceParams {
    pub fn new(merchant_uid: &str, channel_type: WithdrawChannel) -> Self {
        Self {
            thirdparty_id: None,
            app_id: String::default(),
            merchant_uid: merchant_uid.to_string(),
            channel_type,
            sign: String::default(),
            merchant_entity: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryMerchantBalanceResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub account_info: AccountInfo,
    pub settle_info: SettleAccountInfo,
    pub merchant_entity: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountInfo {
    pub online_balance: i64,
    /// The platform misspells this field.
    #[serde(rename = "withdrawable_balacne")]
    pub withdrawable_balance: i64,
    pub freeze_balance: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleAccountInfo {
    pub settle_type: i64,
    pub settle_account: String,
    pub bankcard_no: String,
    pub bank_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantWithdrawParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    pub merchant_uid: String,
    pub channel_type: WithdrawChannel,
    pub withdraw_amount: i64,
    pub out_order_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
    /// Notification URL for the withdrawal result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp_extra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_entity: Option<i64>,
}

signable_request!(MerchantWithdrawParams => [
    "merchant_uid",
    "channel_type",
    "withdraw_amount",
    "out_order_id",
    "callback",
    "cp_extra",
    "merchant_entity",
]);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantWithdrawResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub order_id: String,
    pub merchant_entity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryWithdrawOrderParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirdparty_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    pub merchant_uid: String,
    pub channel_type: WithdrawChannel,
    pub out_order_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sign: String,
}

signable_request!(QueryWithdrawOrderParams => ["merchant_uid", "channel_type", "out_order_id"]);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryWithdrawOrderResponse {
    pub err_no: i64,
    pub err_tips: String,
    /// SUCCESS, FAIL, PROCESSING or REEXCHANGE
    pub status: String,
    #[serde(rename = "statusMsg")]
    pub status_msg: String,
}

platform_response!(
    CreateOrderResponse,
    QueryOrderResponse,
    CreateRefundResponse,
    QueryRefundResponse,
    SettleResponse,
    QuerySettleResponse,
    UnsettleAmountResponse,
    ReturnResponse,
    QueryMerchantBalanceResponse,
    MerchantWithdrawResponse,
    QueryWithdrawOrderResponse,
);
