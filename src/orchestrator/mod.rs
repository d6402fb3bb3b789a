//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是终端界面，负责输入解析、命令分发和渲染，是整个系统的"前台"。
//!
//! ## 模块划分
//!
//! ### `app` - 交互应用
//! - 持有配置、会话（`Session`）和学习流程（`StudyFlow`）
//! - 按配置构造后端（可替换的工厂）
//! - 交互主循环，Ctrl-C 取消正在进行的请求
//!
//! ### `command` - 命令解析
//! - 一行输入 → `Command`
//!
//! ### `render` - 渲染
//! - 纯函数，会话和结果 → 文本
//!
//! ## 层次关系
//!
//! ```text
//! app (一次交互会话)
//!     ↓
//! workflow::StudyFlow (单次操作：超时、闸门、校验)
//!     ↓
//! services::TutoringBackend (能力层：导入 / 出题 / 计划 / 问答)
//!     ↓
//! services::LlmService (基础设施：OpenAI 兼容接口)
//! ```

pub mod app;
pub mod command;
pub mod render;

// 重新导出主要类型
pub use app::{cancellable, App, BackendFactory, CancelFuture, CancelSignal, Step};
pub use command::Command;
