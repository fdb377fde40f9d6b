//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`logger`] - 日志初始化
//! - [`time`] - 日期解析与时间戳转换
//! - [`validation`] - 输入校验辅助函数

pub mod logger;
pub mod time;
pub mod validation;

use axum::Json;
use serde::Serialize;
use shared::ApiResponse;

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success_with_message(message, data))
}
