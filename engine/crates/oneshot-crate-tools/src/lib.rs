//! oneshot 工具集
//!
//! - 日志初始化：所有输出都写到 stderr，也就是诊断流
//! - 基于工作区根目录的路径管理

pub mod init_log;
pub mod resource;
