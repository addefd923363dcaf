use dpg_common::Secret;
use log::*;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    data_objects::{
        Code2SessionParams,
        Code2SessionResponse,
        OrderPushParams,
        OrderPushResponse,
        CODE2SESSION_PATH,
        ORDER_PUSH_URL,
    },
    ecpay::*,
    session::{decrypt_user_profile, UserProfile},
    signer::{RequestSigner, SignableRequest},
    transport::{AccessTokenProvider, HttpTransport, ReqwestTransport, StaticAccessToken},
    OpenApiConfig,
    OpenApiError,
};

/// A thin client for the open platform. Every ecpay call is signed with the configured salt and stamped with the
/// configured app id before it reaches the transport.
#[derive(Clone)]
pub struct OpenApi<T, P> {
    config: OpenApiConfig,
    signer: RequestSigner,
    transport: T,
    tokens: P,
}

impl OpenApi<ReqwestTransport, StaticAccessToken> {
    pub fn with_reqwest(config: OpenApiConfig, access_token: Secret<String>) -> Result<Self, OpenApiError> {
        let transport = ReqwestTransport::new()?;
        Self::new(config, transport, StaticAccessToken::new(access_token))
    }
}

impl<T, P> OpenApi<T, P>
where
    T: HttpTransport,
    P: AccessTokenProvider,
{
    /// Fails if the configuration cannot sign requests.
    pub fn new(config: OpenApiConfig, transport: T, tokens: P) -> Result<Self, OpenApiError> {
        let signer = config.request_signer()?;
        if config.app_id.trim().is_empty() {
            warn!("🪛️ No app id has been configured. The platform will reject signed requests.");
        }
        Ok(Self { config, signer, transport, tokens })
    }

    pub fn config(&self) -> &OpenApiConfig {
        &self.config
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Posts `body` to `url` and parses the response. No signing takes place.
    pub async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, OpenApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| OpenApiError::SerializationError(e.to_string()))?;
        let response = self.transport.post_json(url, &body).await?;
        serde_json::from_slice::<R>(&response).map_err(|e| {
            warn!("📡️ Unexpected response from {url}. {e}");
            OpenApiError::ParseError(e.to_string())
        })
    }

    /// Stamps the app id on `request`, signs it and posts it to the ecpay endpoint at `path`. A non-zero `err_no`
    /// in the response is returned as [`OpenApiError::PlatformError`].
    pub async fn signed_post<Q, R>(&self, path: &str, mut request: Q) -> Result<R, OpenApiError>
    where
        Q: SignableRequest,
        R: DeserializeOwned + PlatformResponse,
    {
        request.set_app_id(&self.config.app_id);
        self.signer.sign_request(&mut request)?;
        let url = self.config.api_url(path);
        debug!("📡️ Sending signed request to {path}");
        let response = self.post_json::<Q, R>(&url, &request).await?;
        response.into_result().map_err(|e| {
            warn!("📡️ {path} failed. {e}");
            e
        })
    }

    pub async fn create_order(&self, params: CreateOrderParams) -> Result<CreateOrderResponse, OpenApiError> {
        let out_order_no = params.out_order_no.clone();
        let response = self.signed_post::<_, CreateOrderResponse>(CREATE_ORDER_PATH, params).await?;
        info!("📡️ Created order {out_order_no}. Platform order id: {}", response.data.order_id);
        Ok(response)
    }

    pub async fn query_order(
        &self,
        out_order_no: &str,
        thirdparty_id: Option<&str>,
    ) -> Result<QueryOrderResponse, OpenApiError> {
        let params = QueryOrderParams {
            out_order_no: out_order_no.to_string(),
            thirdparty_id: thirdparty_id.map(String::from),
            ..Default::default()
        };
        self.signed_post(QUERY_ORDER_PATH, params).await
    }

    pub async fn create_refund(&self, params: CreateRefundParams) -> Result<CreateRefundResponse, OpenApiError> {
        let out_refund_no = params.out_refund_no.clone();
        let response = self.signed_post::<_, CreateRefundResponse>(CREATE_REFUND_PATH, params).await?;
        info!("📡️ Requested refund {out_refund_no}. Platform refund number: {}", response.refund_no);
        Ok(response)
    }

    pub async fn query_refund(
        &self,
        out_refund_no: &str,
        thirdparty_id: Option<&str>,
    ) -> Result<QueryRefundResponse, OpenApiError> {
        let params = QueryRefundParams {
            out_refund_no: out_refund_no.to_string(),
            thirdparty_id: thirdparty_id.map(String::from),
            ..Default::default()
        };
        self.signed_post(QUERY_REFUND_PATH, params).await
    }

    /// Settles an order, sharing the proceeds with `items` (if any).
    pub async fn settle(
        &self,
        params: SettleParams,
        items: &[SettleParamsItem],
    ) -> Result<SettleResponse, OpenApiError> {
        let params = params.with_settle_items(items)?;
        let out_settle_no = params.out_settle_no.clone();
        let response = self.signed_post::<_, SettleResponse>(SETTLE_PATH, params).await?;
        info!("📡️ Requested settlement {out_settle_no}. Platform settlement number: {}", response.settle_no);
        Ok(response)
    }

    pub async fn query_settle(
        &self,
        out_settle_no: &str,
        thirdparty_id: Option<&str>,
    ) -> Result<QuerySettleResponse, OpenApiError> {
        let params = QuerySettleParams {
            out_settle_no: out_settle_no.to_string(),
            thirdparty_id: thirdparty_id.map(String::from),
            ..Default::default()
        };
        self.signed_post(QUERY_SETTLE_PATH, params).await
    }

    pub async fn unsettle_amount(
        &self,
        out_order_no: &str,
        thirdparty_id: Option<&str>,
        out_item_order_no: Option<&str>,
    ) -> Result<UnsettleAmountResponse, OpenApiError> {
        let params = UnsettleAmountParams {
            out_order_no: out_order_no.to_string(),
            thirdparty_id: thirdparty_id.map(String::from),
            out_item_order_no: out_item_order_no.map(String::from),
            ..Default::default()
        };
        self.signed_post(UNSETTLE_AMOUNT_PATH, params).await
    }

    pub async fn create_return(&self, params: CreateReturnParams) -> Result<CreateReturnResponse, OpenApiError> {
        self.signed_post(CREATE_RETURN_PATH, params).await
    }

    /// Look up a settlement return by the platform's `return_no`, the developer's `out_return_no`, or both.
    pub async fn query_return(
        &self,
        return_no: Option<&str>,
        out_return_no: Option<&str>,
        thirdparty_id: Option<&str>,
    ) -> Result<QueryReturnResponse, OpenApiError> {
        let params = QueryReturnParams {
            return_no: return_no.map(String::from),
            out_return_no: out_return_no.map(String::from),
            thirdparty_id: thirdparty_id.map(String::from),
            ..Default::default()
        };
        self.signed_post(QUERY_RETURN_PATH, params).await
    }

    pub async fn query_merchant_balance(
        &self,
        params: QueryMerchantBalanceParams,
    ) -> Result<QueryMerchantBalanceResponse, OpenApiError> {
        self.signed_post(QUERY_MERCHANT_BALANCE_PATH, params).await
    }

    pub async fn merchant_withdraw(
        &self,
        params: MerchantWithdrawParams,
    ) -> Result<MerchantWithdrawResponse, OpenApiError> {
        let out_order_id = params.out_order_id.clone();
        let amount = params.withdraw_amount;
        let response = self.signed_post::<_, MerchantWithdrawResponse>(MERCHANT_WITHDRAW_PATH, params).await?;
        info!("📡️ Requested withdrawal {out_order_id} of {amount}. Platform order id: {}", response.order_id);
        Ok(response)
    }

    pub async fn query_withdraw_order(
        &self,
        params: QueryWithdrawOrderParams,
    ) -> Result<QueryWithdrawOrderResponse, OpenApiError> {
        self.signed_post(QUERY_WITHDRAW_ORDER_PATH, params).await
    }

    /// Exchanges a login code (or anonymous code) for the user's openid and session key.
    pub async fn code2session(
        &self,
        code: Option<&str>,
        anonymous_code: Option<&str>,
    ) -> Result<Code2SessionResponse, OpenApiError> {
        if self.config.app_secret.is_blank() {
            return Err(OpenApiError::ConfigurationError("The app secret is not set".into()));
        }
        let params = Code2SessionParams {
            appid: self.config.app_id.clone(),
            secret: self.config.app_secret.reveal().clone(),
            anonymous_code: anonymous_code.map(String::from),
            code: code.map(String::from),
        };
        let url = self.config.api_url(CODE2SESSION_PATH);
        let response = self.post_json::<_, Code2SessionResponse>(&url, &params).await?.into_result()?;
        debug!("📡️ Login exchange succeeded for openid {}", response.data.openid);
        Ok(response)
    }

    /// Pushes an order to the user's Douyin order centre. The access token comes from the token provider.
    pub async fn push_order(&self, mut params: OrderPushParams) -> Result<OrderPushResponse, OpenApiError> {
        let token = self.tokens.access_token().await?;
        params.access_token = token.reveal().clone();
        let response = self.post_json::<_, OrderPushResponse>(ORDER_PUSH_URL, &params).await?;
        match response.into_result() {
            Ok(response) => Ok(response),
            Err(OpenApiError::PlatformError { code, message }) => {
                warn!("📡️ Order push failed. {code}: {message}");
                Err(OpenApiError::PlatformError { code, message })
            },
            Err(e) => Err(e),
        }
    }

    /// Decrypts a user profile. A profile whose watermark names a different app is still returned, but logged.
    pub fn decrypt_user_profile(
        &self,
        encrypted_data: &str,
        session_key: &str,
        iv: &str,
    ) -> Result<UserProfile, OpenApiError> {
        let profile = decrypt_user_profile(encrypted_data, session_key, iv)?;
        if !profile.watermark.is_for_app(&self.config.app_id) {
            warn!(
                "🔐️ Decrypted a user profile watermarked for app {}, but this client is configured for {}",
                profile.watermark.appid, self.config.app_id
            );
        }
        Ok(profile)
    }

    /// Exposed so callers can sign ad-hoc bundles with the same salt, e.g. for endpoints without a typed request.
    pub fn sign_bundle(&self, bundle: &Value) -> Result<String, OpenApiError> {
        self.signer.sign_bundle(bundle)
    }
}
