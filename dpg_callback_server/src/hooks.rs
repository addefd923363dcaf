//! Callback hooks
//!
//! A hook is an async closure that receives a verified, decoded callback. Each callback kind has at most one hook.
//! Hooks run inside the request handler, so the acknowledgement is only sent once the hook has finished. A hook that
//! returns an error makes the server answer with a non-2xx status, and the platform will deliver the callback again.
use std::sync::Arc;

use douyin_openapi::{
    callback::CallbackMessage,
    DecodedCallback,
    PaymentNotification,
    RefundNotification,
    SettleNotification,
    WithdrawNotification,
};
use futures::future::BoxFuture;

pub type HookResult = Result<(), String>;
pub type Handler<E> = Arc<dyn Fn(E) -> BoxFuture<'static, HookResult> + Send + Sync>;

#[derive(Default, Clone)]
pub struct CallbackHooks {
    pub on_payment: Option<Handler<DecodedCallback<PaymentNotification>>>,
    pub on_refund: Option<Handler<DecodedCallback<RefundNotification>>>,
    pub on_settle: Option<Handler<DecodedCallback<SettleNotification>>>,
    pub on_withdraw: Option<Handler<DecodedCallback<WithdrawNotification>>>,
}

impl CallbackHooks {
    pub fn on_payment<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DecodedCallback<PaymentNotification>) -> BoxFuture<'static, HookResult>) + Send + Sync + 'static {
        self.on_payment = Some(Arc::new(f));
        self
    }

    pub fn on_refund<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DecodedCallback<RefundNotification>) -> BoxFuture<'static, HookResult>) + Send + Sync + 'static {
        self.on_refund = Some(Arc::new(f));
        self
    }

    pub fn on_settle<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DecodedCallback<SettleNotification>) -> BoxFuture<'static, HookResult>) + Send + Sync + 'static {
        self.on_settle = Some(Arc::new(f));
        self
    }

    pub fn on_withdraw<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DecodedCallback<WithdrawNotification>) -> BoxFuture<'static, HookResult>) + Send + Sync + 'static {
        self.on_withdraw = Some(Arc::new(f));
        self
    }
}

/// Ties a callback payload type to its slot in [`CallbackHooks`].
pub trait HookedMessage: CallbackMessage + Sized {
    fn hook(hooks: &CallbackHooks) -> Option<&Handler<DecodedCallback<Self>>>;
}

impl HookedMessage for PaymentNotification {
    fn hook(hooks: &CallbackHooks) -> Option<&Handler<DecodedCallback<Self>>> {
        hooks.on_payment.as_ref()
    }
}

impl HookedMessage for RefundNotification {
    fn hook(hooks: &CallbackHooks) -> Option<&Handler<DecodedCallback<Self>>> {
        hooks.on_refund.as_ref()
    }
}

impl HookedMessage for SettleNotification {
    fn hook(hooks: &CallbackHooks) -> Option<&Handler<DecodedCallback<Self>>> {
        hooks.on_settle.as_ref()
    }
}

impl HookedMessage for WithdrawNotification {
    fn hook(hooks: &CallbackHooks) -> Option<&Handler<DecodedCallback<Self>>> {
        hooks.on_withdraw.as_ref()
    }
}
