//! Pricing Module
//!
//! 折扣计算与派生价格一致性引擎：
//! - [`calculator`] - 纯函数价格计算 (折扣折算、组合价、促销价)
//! - [`window`] - 折扣有效期窗口判定 (Pending / Active / Expired)
//! - [`engine`] - 读取实时状态并写回派生字段的重算引擎
//!
//! 所有有效期判定都以显式传入的 `now` (Unix millis) 为准，
//! 业务逻辑内部不读取挂钟时间。

pub mod calculator;
pub mod engine;
pub mod window;

pub use calculator::{
    PriceLine, apply_discount, apply_sale_discount, calculate_composite_price,
    calculate_final_price, revert_sale_discount, selling_price,
};
pub use engine::RepricingEngine;
pub use window::{DiscountState, is_active_at, state_at};
