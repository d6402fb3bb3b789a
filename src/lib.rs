//! # EduGenius
//!
//! 把一本教材变成游戏化的家教：出题、学习计划、快速问答
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `services::llm_service` - OpenAI 兼容接口的唯一调用点，负责错误归类
//! - `models::loaders` - 读取文档、提取文字
//!
//! ### ② 业务能力层（Services）
//! - `services::backend` - `TutoringBackend` 契约：导入 / 出题 / 计划 / 问答
//! - `services::tutor_backend` - 基于 LLM 的默认实现 `OpenAiTutor`
//!
//! ### ③ 流程层（Workflow）
//! - `workflow::session_ctx` - 会话上下文（经验值、当前题目、作答闸门、后端句柄）
//! - `workflow::study_flow` - 单次操作的流程（超时、导入闸门、题目校验）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator::app` - 终端交互主循环
//! - `orchestrator::command` / `orchestrator::render` - 输入解析与渲染
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, BackendError};
pub use models::{Difficulty, Quiz};
pub use orchestrator::App;
pub use services::{OpenAiTutor, TutoringBackend};
pub use workflow::{AnswerOutcome, QuizResult, Session, StudyFlow};
