//! # DPG callback server
//! Receives the asynchronous callbacks sent by the Douyin open platform. It is responsible for:
//! Verifying the `msg_signature` of every callback against the configured token.
//! Decoding the callback payload and handing it to the registered [hooks](hooks/index.html).
//! Acknowledging the platform so that it stops retrying.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/callback/payment`, `/callback/refund`, `/callback/settle`, `/callback/withdraw`: one route per callback kind.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod hooks;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
