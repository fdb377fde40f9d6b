//! 时间工具函数
//!
//! 所有日期→时间戳转换统一在 API handler / service 边界完成，
//! 业务逻辑与 repository 层只接收 `i64` Unix millis。折扣与促销的
//! 有效期判断始终以参数形式传入 "now"，便于测试构造过去/未来窗口。

use chrono::{DateTime, Utc};
use shared::{AppError, AppResult};

/// 当前时间的 Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 解析 RFC3339 日期时间字符串 (如 "2026-08-01T00:00:00Z") → Unix millis
pub fn parse_rfc3339(field: &str, value: &str) -> AppResult<i64> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| AppError::validation(format!("Invalid {field}: expected RFC3339 date-time")))
}

/// Unix millis → RFC3339 字符串 (响应展示用)
pub fn millis_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}
