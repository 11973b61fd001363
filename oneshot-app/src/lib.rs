//! 一次性 compute dispatch
//!
//! [`config::DispatchConfig`] 描述这次 dispatch，[`app::OneShotApp::run`] 执行它。

pub mod app;
pub mod config;
