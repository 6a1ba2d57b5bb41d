use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub trading: TradingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub data_dir: String,
}

/// # Summary
/// 交易规则配置：交易时段窗口与对账轮询周期。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// 股票类标的允许下单的每日交易窗口
    pub window: TradingWindow,
    /// 是否向行情源请求盘前盘后数据
    pub extended_hours: bool,
    /// 对账队列的排空轮询周期（秒）
    pub drain_interval_secs: u64,
}

/// # Summary
/// 每日固定的 UTC 交易时段区间。
/// 原始系统按 America/New_York 的 09:30–16:00 换算；这里直接持有
/// 换算后的 UTC 时刻，边界两端均为闭区间。
///
/// # Invariants
/// - `open` 必须早于 `close`（不支持跨零点的时段）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TradingWindow {
    // 开盘时刻 (UTC)
    pub open: NaiveTime,
    // 收盘时刻 (UTC)
    pub close: NaiveTime,
}

impl TradingWindow {
    /// 判断给定的 UTC 时刻是否落在交易窗口内（闭区间）
    pub fn contains(&self, t: NaiveTime) -> bool {
        t >= self.open && t <= self.close
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                data_dir: "data".to_string(),
            },
            trading: TradingConfig {
                window: TradingWindow {
                    // 13:30–20:00 UTC，即美东常规时段 09:30–16:00 (EDT)
                    open: NaiveTime::from_hms_opt(13, 30, 0).unwrap_or(NaiveTime::MIN),
                    close: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
                },
                extended_hours: false,
                drain_interval_secs: 60,
            },
        }
    }
}
