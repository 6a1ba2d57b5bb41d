use chrono::{DateTime, Utc};
use mogi_core::config::TradingWindow;
use mogi_core::market::port::PriceOracle;
use mogi_core::trade::entity::{Order, OrderKind, OrderStatus};
use mogi_core::trade::port::TradeError;
use rust_decimal::Decimal;
use std::sync::Arc;

/// # Summary
/// 订单评估器。对一笔市价单请求做纯粹的分类判定：
/// 立即成交、终态拒绝、或挂入对账队列等待行情追上。
/// 除行情查询外无任何副作用；给定相同的行情响应，结果确定。
/// 对账重试正是依赖这一点：同一订单在行情变化后可以得到不同结论。
pub struct OrderEvaluator {
    oracle: Arc<dyn PriceOracle>,
    /// 股票类标的的每日 UTC 交易窗口
    window: TradingWindow,
    /// 是否向行情源请求盘前盘后数据
    extended_hours: bool,
}

impl OrderEvaluator {
    pub fn new(oracle: Arc<dyn PriceOracle>, window: TradingWindow, extended_hours: bool) -> Self {
        Self {
            oracle,
            window,
            extended_hours,
        }
    }

    /// # Summary
    /// 评估一笔市价单，产出带终态或挂起状态的不可变订单。
    ///
    /// # Logic
    /// 1. 查询行情快照；无最新价即判定代码无效。
    /// 2. 最新行情的 UTC 日期与下单日期不一致，说明行情还停留在
    ///    前一交易日（当日尚无数据），按闭市拒绝。
    /// 3. 交易所挂牌品种在交易窗口之外下单，按闭市拒绝；
    ///    加密货币等连续交易品种跳过此检查。
    /// 4. 双方时间戳截断到分钟后，下单分钟晚于最新行情分钟，
    ///    说明行情尚未覆盖“现在”，挂入对账等待重试。
    ///    分钟级截断容忍一分钟内的行情延迟，避免无谓的对账循环。
    /// 5. 否则按最新价成交。
    ///
    /// # Arguments
    /// * `ticker`: 标的代码。
    /// * `shares`: 股数（正数量级）。
    /// * `submitted_at`: 订单提交时间；对账重试时传原始提交时间。
    ///
    /// # Returns
    /// 返回评估后的订单；行情基础设施故障返回 `TradeError`。
    pub async fn evaluate(
        &self,
        ticker: &str,
        shares: i64,
        submitted_at: DateTime<Utc>,
    ) -> Result<Order, TradeError> {
        let quote = self
            .oracle
            .get_asset_info(ticker, self.extended_hours)
            .await?;

        let order = |status: OrderStatus, fill_price: Decimal| Order {
            kind: OrderKind::Market,
            ticker: ticker.to_string(),
            shares,
            fill_price,
            submitted_at,
            status,
        };

        let Some(latest) = quote.latest else {
            return Ok(order(OrderStatus::RejectedInvalidTicker, Decimal::ZERO));
        };

        if latest.at.date_naive() != submitted_at.date_naive() {
            return Ok(order(OrderStatus::RejectedMarketClosed, Decimal::ZERO));
        }

        if quote.asset_type.is_exchange_bound() && !self.window.contains(submitted_at.time()) {
            return Ok(order(OrderStatus::RejectedMarketClosed, Decimal::ZERO));
        }

        // 分钟级截断比较：丢弃秒与亚秒
        let order_minute = submitted_at.timestamp().div_euclid(60);
        let quote_minute = latest.at.timestamp().div_euclid(60);
        if order_minute > quote_minute {
            return Ok(order(OrderStatus::PendingReconciliation, Decimal::ZERO));
        }

        Ok(order(OrderStatus::Filled, latest.price))
    }
}
