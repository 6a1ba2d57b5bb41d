use super::entity::{
    AccountReport, DrainReport, OrderOutcome, PendingSummary, TransactionType,
};
use crate::market::error::MarketError;
use crate::store::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// # Summary
/// 交易执行环节中可能发生的错误。
/// 注意区分：正常的业务拒绝（闭市、资金不足等）走 `OrderOutcome`，
/// 这里只承载真正的故障与前置条件失败。
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("账户不存在: {0}")]
    AccountNotFound(String),
    #[error("账户已存在: {0}")]
    AccountAlreadyExists(String),
    #[error("可用资金不足. 需要: {required}, 实际: {actual}")]
    InsufficientFunds { required: Decimal, actual: Decimal },
    #[error("行情源故障: {0}")]
    Market(#[from] MarketError),
    #[error("持久化故障: {0}")]
    Store(#[from] StoreError),
    #[error("内部系统错误: {0}")]
    InternalError(String),
}

/// # Summary
/// 纸面交易核心的对外端口。命令层（外部协作者）通过它下单、
/// 管理账户和查询估值；调度器通过 `drain_once` 驱动对账重试。
///
/// # Invariants
/// - 此接口必须是异步且线程安全的 (`Send + Sync`)。
/// - 实现必须保证同一时刻只有一条指令在做“读取-改写-保存”，
///   见系统的单排空循环约束。
#[async_trait]
pub trait TradePort: Send + Sync {
    /// # Summary
    /// 提交一笔市价单。
    ///
    /// # Logic
    /// 1. 校验账户存在。
    /// 2. 交由评估器按行情与交易时段分类。
    /// 3. 成交则落账并持久化；待对账则入队；拒绝则原样上报。
    ///
    /// # Arguments
    /// * `account`: 账户名。
    /// * `transaction`: 买卖方向。
    /// * `ticker`: 标的代码。
    /// * `shares`: 股数（正数量级）。
    /// * `now`: 提交时刻。
    ///
    /// # Returns
    /// 返回订单结果；账户不存在或基础设施故障返回 `TradeError`。
    async fn submit_order(
        &self,
        account: &str,
        transaction: TransactionType,
        ticker: &str,
        shares: i64,
        now: DateTime<Utc>,
    ) -> Result<OrderOutcome, TradeError>;

    /// # Summary
    /// 执行一轮对账排空：按入队顺序重评估所有挂起订单。
    ///
    /// # Logic
    /// 1. 取出全部队列条目（FIFO）。
    /// 2. 逐条用原始提交时间重评估；仍挂起的留队不上报。
    /// 3. 终态条目出队，作为报告一次性返回给调度上下文。
    ///
    /// # Arguments
    /// * `now`: 本轮排空的调度时刻。
    async fn drain_once(&self, now: DateTime<Utc>) -> Result<Vec<DrainReport>, TradeError>;

    /// 以初始资金开立账户，并落建户日净值点
    async fn create_account(
        &self,
        name: &str,
        starting_cash: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), TradeError>;

    /// 删除账户，同时清除其在对账队列中的挂起条目
    async fn delete_account(&self, name: &str) -> Result<(), TradeError>;

    /// 列出全部账户名
    async fn list_accounts(&self) -> Result<Vec<String>, TradeError>;

    /// 对账队列当前内容的只读摘要
    async fn pending_orders(&self) -> Vec<PendingSummary>;

    /// # Summary
    /// 按最新行情对单个账户做整体估值。
    ///
    /// # Arguments
    /// * `name`: 账户名。
    async fn account_report(&self, name: &str) -> Result<AccountReport, TradeError>;

    /// # Summary
    /// 日终结算：为每个账户落（或重算）当日净值历史点。
    ///
    /// # Arguments
    /// * `now`: 结算时刻，取其 UTC 日期作为历史键。
    async fn record_daily_history(&self, now: DateTime<Utc>) -> Result<(), TradeError>;
}
