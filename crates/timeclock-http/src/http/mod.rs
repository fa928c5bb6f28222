//! HTTP transport for the timeclock API.

pub(crate) mod client;
pub(crate) mod endpoints;

pub(crate) use client::ApiClient;
