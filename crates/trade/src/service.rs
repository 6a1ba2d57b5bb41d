use crate::evaluator::OrderEvaluator;
use crate::ledger::{self, FillOutcome};
use crate::performance;
use crate::reconcile::ReconciliationQueue;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mogi_core::config::TradingConfig;
use mogi_core::market::port::PriceOracle;
use mogi_core::store::port::AccountStore;
use mogi_core::trade::entity::{
    Account, AccountReport, DrainReport, Order, OrderOutcome, OrderStatus, PendingSummary,
    ReconciliationEntry, TransactionType,
};
use mogi_core::trade::port::{TradeError, TradePort};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// # Summary
/// `TradeService` 是纸面交易核心的入口调度者，实现了 `TradePort`。
/// 组合订单评估器、FIFO 台账引擎与对账队列，对接账户持久化端口。
///
/// # Invariants
/// - 对账队列挂在一把 `tokio::sync::Mutex` 后面，排空整轮持锁，
///   提交与排空互斥，保证同一账户的“读取-改写-保存”彼此串行，
///   不会出现旧内存余额覆盖新落盘余额的丢失更新。
pub struct TradeService {
    store: Arc<dyn AccountStore>,
    oracle: Arc<dyn PriceOracle>,
    evaluator: OrderEvaluator,
    queue: Mutex<ReconciliationQueue>,
    extended_hours: bool,
}

impl TradeService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        oracle: Arc<dyn PriceOracle>,
        trading: TradingConfig,
    ) -> Self {
        let evaluator =
            OrderEvaluator::new(oracle.clone(), trading.window, trading.extended_hours);
        Self {
            store,
            oracle,
            evaluator,
            queue: Mutex::new(ReconciliationQueue::new()),
            extended_hours: trading.extended_hours,
        }
    }

    /// # Logic
    /// 把一笔已评估为成交的订单落到指定账户并整集合写回。
    /// 资金不足时不写任何东西，按结果上报。
    async fn settle_fill(
        &self,
        account_name: &str,
        transaction: TransactionType,
        order: &Order,
    ) -> Result<OrderOutcome, TradeError> {
        let mut accounts = self.store.load_all().await?;
        let Some(account) = accounts.get_mut(account_name) else {
            return Err(TradeError::AccountNotFound(account_name.to_string()));
        };

        match ledger::apply_fill(account, transaction, order) {
            FillOutcome::RejectedInsufficientFunds => Ok(OrderOutcome::RejectedInsufficientFunds),
            FillOutcome::Filled => {
                self.store.save_all(&accounts).await?;
                info!(
                    "成交落账: {} {} {} 股 {} @ {}",
                    account_name, transaction, order.shares, order.ticker, order.fill_price
                );
                Ok(OrderOutcome::Filled {
                    fill_price: order.fill_price,
                })
            }
        }
    }
}

#[async_trait]
impl TradePort for TradeService {
    /// # Logic
    /// 1. 校验账户存在。
    /// 2. 评估器按行情与时段分类。
    /// 3. 终态拒绝原样上报；待对账入队；成交则落账并持久化。
    async fn submit_order(
        &self,
        account: &str,
        transaction: TransactionType,
        ticker: &str,
        shares: i64,
        now: DateTime<Utc>,
    ) -> Result<OrderOutcome, TradeError> {
        let accounts = self.store.load_all().await?;
        if !accounts.contains_key(account) {
            return Err(TradeError::AccountNotFound(account.to_string()));
        }

        let order = self.evaluator.evaluate(ticker, shares, now).await?;
        match order.status {
            OrderStatus::RejectedInvalidTicker => Ok(OrderOutcome::RejectedInvalidTicker),
            OrderStatus::RejectedMarketClosed => Ok(OrderOutcome::RejectedMarketClosed),
            OrderStatus::PendingReconciliation => {
                let mut queue = self.queue.lock().await;
                queue.push(ReconciliationEntry {
                    account: account.to_string(),
                    transaction,
                    order,
                });
                info!("订单挂起待对账: {} {} {}", account, transaction, ticker);
                Ok(OrderOutcome::Pending)
            }
            OrderStatus::Filled => self.settle_fill(account, transaction, &order).await,
        }
    }

    /// # Logic
    /// 整轮持有队列锁（单排空循环纪律）。按 FIFO 逐条：
    /// - 用条目的**原始提交时间**重评估——订单的优先级是它的
    ///   原始意图时刻，不是重试时刻。
    /// - 仍挂起的留队，不上报；终态的出队并一次性报告。
    /// - 每笔成交先完成整集合写回，再评估下一条，避免同账户
    ///   共享现金时的丢失更新竞争。
    /// - 行情或持久化故障的条目留到下一轮，订单不丢。
    async fn drain_once(&self, now: DateTime<Utc>) -> Result<Vec<DrainReport>, TradeError> {
        let mut queue = self.queue.lock().await;
        let entries = queue.take_all();
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        info!("对账排空开始: {} 条挂起 @ {}", entries.len(), now);

        let mut reports = Vec::new();
        for entry in entries {
            let evaluated = self
                .evaluator
                .evaluate(&entry.order.ticker, entry.order.shares, entry.order.submitted_at)
                .await;
            let order = match evaluated {
                Ok(order) => order,
                Err(e) => {
                    warn!("对账重评估故障，留队下一轮: {}: {}", entry.order.ticker, e);
                    queue.push(entry);
                    continue;
                }
            };

            let outcome = match order.status {
                OrderStatus::PendingReconciliation => {
                    queue.push(ReconciliationEntry { order, ..entry });
                    continue;
                }
                OrderStatus::RejectedInvalidTicker => OrderOutcome::RejectedInvalidTicker,
                OrderStatus::RejectedMarketClosed => OrderOutcome::RejectedMarketClosed,
                OrderStatus::Filled => {
                    match self.settle_fill(&entry.account, entry.transaction, &order).await {
                        Ok(outcome) => outcome,
                        Err(TradeError::AccountNotFound(name)) => {
                            // 账户在挂起期间被绕过本服务删除：条目只能丢弃
                            warn!("挂起订单的账户已不存在，丢弃: {}", name);
                            continue;
                        }
                        Err(e) => {
                            warn!("对账落账故障，留队下一轮: {}: {}", entry.account, e);
                            queue.push(ReconciliationEntry { order, ..entry });
                            continue;
                        }
                    }
                }
            };

            reports.push(DrainReport {
                account: entry.account,
                transaction: entry.transaction,
                order,
                outcome,
            });
        }

        Ok(reports)
    }

    async fn create_account(
        &self,
        name: &str,
        starting_cash: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), TradeError> {
        let mut accounts = self.store.load_all().await?;
        if accounts.contains_key(name) {
            return Err(TradeError::AccountAlreadyExists(name.to_string()));
        }
        accounts.insert(
            name.to_string(),
            Account::new(starting_cash, now.date_naive()),
        );
        self.store.save_all(&accounts).await?;
        info!("开户: {} 初始资金 {}", name, starting_cash);
        Ok(())
    }

    async fn delete_account(&self, name: &str) -> Result<(), TradeError> {
        let mut accounts = self.store.load_all().await?;
        if accounts.remove(name).is_none() {
            return Err(TradeError::AccountNotFound(name.to_string()));
        }
        self.store.save_all(&accounts).await?;

        // 不留孤儿：该账户的挂起条目一并清除
        let purged = self.queue.lock().await.purge_account(name);
        if purged > 0 {
            info!("删除账户 {} 时清除 {} 条挂起订单", name, purged);
        } else {
            info!("删除账户: {}", name);
        }
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<String>, TradeError> {
        let accounts = self.store.load_all().await?;
        let mut names: Vec<String> = accounts.into_keys().collect();
        names.sort();
        Ok(names)
    }

    async fn pending_orders(&self) -> Vec<PendingSummary> {
        self.queue.lock().await.summaries()
    }

    async fn account_report(&self, name: &str) -> Result<AccountReport, TradeError> {
        let accounts = self.store.load_all().await?;
        let Some(account) = accounts.get(name) else {
            return Err(TradeError::AccountNotFound(name.to_string()));
        };
        performance::account_report(name, account, self.oracle.as_ref(), self.extended_hours).await
    }

    /// # Logic
    /// 对每个账户按最新行情估值，落（或重算）当日历史净值点。
    /// 历史仅追加，唯一允许的改写是当日点在日终被重算。
    async fn record_daily_history(&self, now: DateTime<Utc>) -> Result<(), TradeError> {
        let mut accounts = self.store.load_all().await?;
        let today = now.date_naive();

        let names: Vec<String> = accounts.keys().cloned().collect();
        for name in names {
            let Some(account) = accounts.get(&name) else {
                continue;
            };
            let point =
                performance::daily_point(account, self.oracle.as_ref(), self.extended_hours)
                    .await?;
            if let Some(account) = accounts.get_mut(&name) {
                account.history.insert(today, point);
            }
        }

        self.store.save_all(&accounts).await?;
        info!("日终净值结算完成: {} 个账户 @ {}", accounts.len(), today);
        Ok(())
    }
}
