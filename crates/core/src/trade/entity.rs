use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::str::FromStr;

/// # Summary
/// 订单的交易方向定义。方向与 `Order.shares`（恒为正的股数）分离持有，
/// 由二者共同决定台账上的带符号变动量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// 买入
    Buy,
    /// 卖出
    Sell,
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(TransactionType::Buy),
            "SELL" => Ok(TransactionType::Sell),
            _ => Err(format!("Unknown TransactionType: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "BUY"),
            TransactionType::Sell => write!(f, "SELL"),
        }
    }
}

/// # Summary
/// 订单种类。当前系统只存在市价单。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    /// 市价单
    Market,
}

/// # Summary
/// 订单评估后的生命周期状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// 已按最新价成交
    Filled,
    /// 行情源查无此代码
    RejectedInvalidTicker,
    /// 闭市（不在交易窗口内，或行情数据还停留在前一交易日）
    RejectedMarketClosed,
    /// 行情尚未覆盖下单分钟，进入对账队列等待重试
    PendingReconciliation,
}

impl OrderStatus {
    /// 是否为终态（成交或拒绝），终态订单不再重试
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::PendingReconciliation)
    }
}

/// # Summary
/// 不可变的订单值对象，由评估器一次性构造。
///
/// # Invariants
/// - `shares` 恒为正数量级，方向由伴随的 `TransactionType` 表达。
/// - `fill_price` 仅在 `status == Filled` 时非零。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// 订单种类
    pub kind: OrderKind,
    /// 标的代码
    pub ticker: String,
    /// 请求的股数（正数量级）
    pub shares: i64,
    /// 成交价格，未成交时为零
    pub fill_price: Decimal,
    /// 订单提交时间 (UTC)
    pub submitted_at: DateTime<Utc>,
    /// 评估结果状态
    pub status: OrderStatus,
}

/// # Summary
/// 持仓的一层 FIFO 成本批次。
///
/// # Invariants
/// - `shares` 带符号：正为多头层，负为空头层。
/// - 除反手瞬间外，同一标的的所有批次符号一致。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// 本批次的带符号股数
    pub shares: i64,
    /// 本批次的单股入场价
    pub price: Decimal,
}

/// # Summary
/// 账户每日净值历史中的一个点。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// 当日收盘账户总值（现金 + 持仓市值）
    pub value: Decimal,
    /// 相对建户资金的累计收益率（百分比）
    pub return_pct: Decimal,
}

/// # Summary
/// 账户聚合根。只有台账引擎（成交落账）和日终结算（历史追加）
/// 可以改写它；持久化层按整体文档读写。
///
/// # Invariants
/// - 任意标的满足 `sum(lots[ticker].shares) == positions[ticker]`。
/// - 净持仓为零的标的不出现在 `positions` 和 `lots` 中。
/// - 买单成交不允许把 `cash` 打成负数（台账引擎前置校验）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// 可用现金
    pub cash: Decimal,
    /// 标的 -> 带符号净持仓股数（lots 求和的缓存）
    pub positions: HashMap<String, i64>,
    /// 标的 -> 按入场先后排列的成本批次（队首最旧）
    pub lots: HashMap<String, VecDeque<Lot>>,
    /// 按日期排序的净值历史，建户时落第一个点
    pub history: BTreeMap<NaiveDate, HistoryPoint>,
}

impl Account {
    /// # Logic
    /// 以初始资金开立新账户，持仓为空，历史以建户日的起始净值落点。
    pub fn new(starting_cash: Decimal, today: NaiveDate) -> Self {
        let mut history = BTreeMap::new();
        history.insert(
            today,
            HistoryPoint {
                value: starting_cash,
                return_pct: Decimal::ZERO,
            },
        );
        Self {
            cash: starting_cash,
            positions: HashMap::new(),
            lots: HashMap::new(),
            history,
        }
    }

    /// 某标的的批次股数合计（用于校验与成本核算）
    pub fn lot_sum(&self, ticker: &str) -> i64 {
        self.lots
            .get(ticker)
            .map(|lots| lots.iter().map(|l| l.shares).sum())
            .unwrap_or(0)
    }
}

/// # Summary
/// 一次下单请求的对外结果。命令层负责把它格式化成用户文案，
/// 核心引擎自身从不产出展示字符串。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderOutcome {
    /// 按该价格全量成交
    Filled { fill_price: Decimal },
    /// 已挂入对账队列，等待行情追上后重试
    Pending,
    /// 标的代码无效
    RejectedInvalidTicker,
    /// 闭市拒绝
    RejectedMarketClosed,
    /// 买入金额超过可用现金
    RejectedInsufficientFunds,
}

/// # Summary
/// 对账队列中的一条待重试记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationEntry {
    /// 归属账户名
    pub account: String,
    /// 交易方向
    pub transaction: TransactionType,
    /// 原始订单（保留最初的提交时间，重试不改写）
    pub order: Order,
}

/// # Summary
/// 队列内待重试订单的只读摘要，供命令层展示。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSummary {
    pub account: String,
    pub transaction: TransactionType,
    pub kind: OrderKind,
    pub ticker: String,
    pub shares: i64,
}

/// # Summary
/// 单个持仓的估值报告行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub ticker: String,
    /// 带符号净持仓
    pub shares: i64,
    /// 最新市价
    pub price: Decimal,
    /// FIFO 批次加权的持仓成本
    pub cost_basis: Decimal,
    /// 按最新价折算的持仓市值
    pub market_value: Decimal,
    /// 浮动盈亏（市值 - 成本）
    pub unrealized_pnl: Decimal,
    /// 相对昨收的当日盈亏
    pub day_pnl: Decimal,
    /// 当日涨跌幅（百分比）
    pub day_change_pct: Decimal,
}

/// # Summary
/// 账户整体估值报告：现金、投入市值、总值与当日变动。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountReport {
    pub account: String,
    pub cash: Decimal,
    /// 全部持仓按市价折算的合计
    pub invested: Decimal,
    /// 现金 + 持仓市值
    pub account_value: Decimal,
    /// 相对最近一条历史净值的变动
    pub day_pnl: Decimal,
    /// 相对最近一条历史净值的变动率（百分比）
    pub day_change_pct: Decimal,
    pub positions: Vec<PositionReport>,
}

/// # Summary
/// 一轮对账排空中单条记录的终态报告。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrainReport {
    /// 发起请求的账户名
    pub account: String,
    /// 交易方向
    pub transaction: TransactionType,
    /// 重试后的订单（携带最终状态与成交价）
    pub order: Order,
    /// 路由给命令层的结果
    pub outcome: OrderOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_account_seeds_creation_day_history() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let account = Account::new(dec!(1000), day);

        assert_eq!(account.cash, dec!(1000));
        assert!(account.positions.is_empty());
        assert!(account.lots.is_empty());
        assert_eq!(
            account.history.get(&day),
            Some(&HistoryPoint {
                value: dec!(1000),
                return_pct: Decimal::ZERO,
            })
        );
    }

    #[test]
    fn test_lot_sum_nets_signed_layers() {
        let mut account = Account::new(dec!(0), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        account.lots.insert(
            "AAPL".to_string(),
            VecDeque::from([
                Lot { shares: 100, price: dec!(10) },
                Lot { shares: 50, price: dec!(12) },
            ]),
        );

        assert_eq!(account.lot_sum("AAPL"), 150);
        assert_eq!(account.lot_sum("GHOST"), 0);
    }

    #[test]
    fn test_pending_is_the_only_non_terminal_status() {
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::RejectedInvalidTicker.is_terminal());
        assert!(OrderStatus::RejectedMarketClosed.is_terminal());
        assert!(!OrderStatus::PendingReconciliation.is_terminal());
    }
}
