use dpg_common::Secret;
use serde::{Deserialize, Serialize};

use crate::ecpay::PlatformResponse;

pub const CODE2SESSION_PATH: &str = "/api/apps/v2/jscode2session";
/// Order push only exists on the production host.
pub const ORDER_PUSH_URL: &str = "https://developer.toutiao.com/api/apps/order/v2/push";

//--------------------------------------------   Login   -------------------------------------------------------------

#[derive(Clone, Default, Serialize)]
pub struct Code2SessionParams {
    pub appid: String,
    /// Revealed only while the request body is being built.
    pub secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymous_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Code2SessionResponse {
    pub err_no: i64,
    pub err_tips: String,
    pub data: Code2SessionData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Code2SessionData {
    pub session_key: Secret<String>,
    pub openid: String,
    pub anonymous_openid: String,
    pub unionid: String,
}

crate::platform_response!(Code2SessionResponse);

//--------------------------------------------   Order push   --------------------------------------------------------

/// The order-push body. `access_token` is filled in by the client from its token provider.
#[derive(Clone, Default, Serialize)]
pub struct OrderPushParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_shop_id: Option<String>,
    /// Always "douyin" at present
    pub app_name: String,
    pub open_id: String,
    /// 0: unpaid, 1: paid, 2: cancelled, 4: redeemed, 5: refunding, 6: refunded, 8: refund failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<i64>,
    /// 0 for regular mini-app orders, 9101 for group-buy vouchers, 9001 for scenic tickets
    pub order_type: i64,
    /// Millisecond timestamp
    pub update_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    /// An [`OrderDetail`] as JSON text
    pub order_detail: String,
}

impl OrderPushParams {
    pub fn new(
        open_id: &str,
        order_type: i64,
        update_time: i64,
        detail: &OrderDetail,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            app_name: "douyin".to_string(),
            open_id: open_id.to_string(),
            order_type,
            update_time,
            order_detail: serde_json::to_string(detail)?,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    /// The `out_order_no` used at order creation
    pub order_id: String,
    /// Millisecond timestamp
    pub create_time: i64,
    pub status: String,
    pub amount: i64,
    /// In cents
    pub total_price: i64,
    pub detail_url: String,
    pub item_list: Vec<OrderItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_code: String,
    pub img: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Total for this line, in cents
    pub price: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderPushResponse {
    pub err_code: i64,
    pub err_msg: String,
    pub body: String,
}

impl PlatformResponse for OrderPushResponse {
    fn error_code(&self) -> i64 {
        self.err_code
    }

    fn error_message(&self) -> &str {
        &self.err_msg
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn session_key_is_masked() {
        let json =
            r#"{"err_no":0,"err_tips":"success","data":{"session_key":"c2VjcmV0","openid":"o1","unionid":"u1"}}"#;
        let response: Code2SessionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.session_key.reveal(), "c2VjcmV0");
        assert_eq!(response.data.openid, "o1");
        assert!(!format!("{response:?}").contains("c2VjcmV0"));
    }

    #[test]
    fn order_detail_travels_as_text() {
        let detail = OrderDetail {
            order_id: "54bb46ba".into(),
            create_time: 1648453349123,
            status: "已支付".into(),
            amount: 2,
            total_price: 8800,
            detail_url: "pages/order/detail".into(),
            item_list: vec![OrderItem {
                item_code: "test_item_code".into(),
                img: "https://example.com/item.png".into(),
                title: "好日子".into(),
                sub_title: None,
                amount: Some(2),
                price: 4400,
            }],
        };
        let params = OrderPushParams::new("d33432323423", 0, 1643189272388, &detail).unwrap();
        assert_eq!(params.app_name, "douyin");
        let round_trip: OrderDetail = serde_json::from_str(&params.order_detail).unwrap();
        assert_eq!(round_trip, detail);
        let wire = serde_json::to_value(&params).unwrap();
        assert!(wire.get("access_token").is_none());
        assert!(wire.get("client_key").is_none());
        assert_eq!(wire["order_type"], 0);
    }

    #[test]
    fn order_push_errors() {
        let response: OrderPushResponse = serde_json::from_str(r#"{"err_code":10,"err_msg":"bad","body":""}"#).unwrap();
        assert!(response.into_result().is_err());
    }
}
