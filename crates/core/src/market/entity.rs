use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 标的资产类别。决定订单评估时是否需要执行交易时段校验：
/// 交易所挂牌品种（股票/ETF）只在盘中接受订单，加密货币等连续交易。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetType {
    /// 股票
    Equity,
    /// 交易所交易基金
    Etf,
    /// 加密货币（7x24 连续交易）
    Crypto,
    /// 其他或未知品种
    Other,
}

impl AssetType {
    /// 是否受交易所开闭市时段约束
    pub fn is_exchange_bound(&self) -> bool {
        matches!(self, AssetType::Equity | AssetType::Etf)
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 对齐 Yahoo v8 chart 的 instrumentType 取值
        match s.to_uppercase().as_str() {
            "EQUITY" => Ok(AssetType::Equity),
            "ETF" => Ok(AssetType::Etf),
            "CRYPTOCURRENCY" | "CRYPTO" => Ok(AssetType::Crypto),
            _ => Ok(AssetType::Other),
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetType::Equity => write!(f, "EQUITY"),
            AssetType::Etf => write!(f, "ETF"),
            AssetType::Crypto => write!(f, "CRYPTOCURRENCY"),
            AssetType::Other => write!(f, "OTHER"),
        }
    }
}

/// # Summary
/// 带时间戳的单点价格。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    // 成交/收盘价格
    pub price: Decimal,
    // 该价格对应的行情时间 (UTC)
    pub at: DateTime<Utc>,
}

/// # Summary
/// 行情源对单个标的返回的报价快照。
///
/// # Invariants
/// - `latest` 为 `None` 是（且仅是）无效代码的判定信号；
///   行情源对未知代码必须返回空快照而不是报错。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// 最新盘中价格及其行情时间
    pub latest: Option<PricePoint>,
    /// 上一交易日收盘价及其行情时间
    pub previous_close: Option<PricePoint>,
    /// 资产类别
    pub asset_type: AssetType,
}

impl QuoteSnapshot {
    /// 未知代码的空快照
    pub fn unknown() -> Self {
        Self {
            latest: None,
            previous_close: None,
            asset_type: AssetType::Other,
        }
    }
}
