//! 实习评价客户端核心
//!
//! 指导教师与企业导师对实习学生进行九项量表评价的客户端逻辑：
//! 评分模型、表单流程、列表筛选与响应归一化。
//!
//! # 架构
//! - `client`: 后端 REST API 访问层
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `models`: 数据模型定义
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `utils`: 工具函数

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod runtime;
pub mod services;
pub mod utils;
