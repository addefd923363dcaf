use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The body the platform expects in reply to a callback. Anything other than `err_no == 0` makes it retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAck {
    pub err_no: i64,
    pub err_tips: String,
}

impl CallbackAck {
    pub fn success() -> Self {
        Self { err_no: 0, err_tips: "success".into() }
    }

    pub fn failure<S: Display>(err_no: i64, message: S) -> Self {
        Self { err_no, err_tips: message.to_string() }
    }
}
