use mogi_core::market::port::PriceOracle;
use mogi_core::trade::entity::{Account, AccountReport, HistoryPoint, PositionReport};
use mogi_core::trade::port::TradeError;
use rust_decimal::Decimal;
use tracing::warn;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// # Summary
/// 按最新行情为账户的每个持仓生成估值行。
///
/// # Logic
/// 1. 逐标的汇总批次：净股数与总成本，求加权成本价。
/// 2. 查询最新价与昨收价；昨收缺失时退化为最新价（当日盈亏记零）。
/// 3. 折算市值、浮动盈亏与当日变动。
///
/// # Arguments
/// * `account`: 待估值账户。
/// * `oracle`: 行情端口。
/// * `extended_hours`: 是否包含盘前盘后行情。
pub async fn position_reports(
    account: &Account,
    oracle: &dyn PriceOracle,
    extended_hours: bool,
) -> Result<Vec<PositionReport>, TradeError> {
    let mut tickers: Vec<&String> = account.lots.keys().collect();
    tickers.sort();

    let mut reports = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let shares = account.lot_sum(ticker);
        if shares == 0 {
            continue;
        }
        let total_cost: Decimal = account
            .lots
            .get(ticker)
            .map(|lots| lots.iter().map(|l| Decimal::from(l.shares) * l.price).sum())
            .unwrap_or(Decimal::ZERO);
        let cost_basis = total_cost / Decimal::from(shares);

        let quote = oracle.get_asset_info(ticker, extended_hours).await?;
        let price = match quote.latest {
            Some(p) => p.price,
            None => {
                // 持仓标的突然查不到行情：按成本价估值，不中断整单报告
                warn!("估值缺失行情: {}，退化为成本价", ticker);
                cost_basis
            }
        };
        let prev_price = quote.previous_close.map(|p| p.price).unwrap_or(price);

        let market_value = price * Decimal::from(shares);
        let prev_value = prev_price * Decimal::from(shares);
        let day_pnl = market_value - prev_value;
        let day_change_pct = if prev_value.is_zero() {
            Decimal::ZERO
        } else {
            day_pnl / prev_value * HUNDRED
        };

        reports.push(PositionReport {
            ticker: ticker.clone(),
            shares,
            price,
            cost_basis,
            market_value,
            unrealized_pnl: market_value - total_cost,
            day_pnl,
            day_change_pct,
        });
    }
    Ok(reports)
}

/// # Summary
/// 账户整体估值报告：现金、投入市值、总值与相对最近历史净值的变动。
pub async fn account_report(
    name: &str,
    account: &Account,
    oracle: &dyn PriceOracle,
    extended_hours: bool,
) -> Result<AccountReport, TradeError> {
    let positions = position_reports(account, oracle, extended_hours).await?;
    let invested: Decimal = positions.iter().map(|p| p.market_value).sum();
    let account_value = account.cash + invested;

    // 当日变动相对最近一条历史净值（通常是昨日日终）
    let previous_value = account
        .history
        .values()
        .next_back()
        .map(|h| h.value)
        .unwrap_or(account_value);
    let day_pnl = account_value - previous_value;
    let day_change_pct = if previous_value.is_zero() {
        Decimal::ZERO
    } else {
        day_pnl / previous_value * HUNDRED
    };

    Ok(AccountReport {
        account: name.to_string(),
        cash: account.cash,
        invested,
        account_value,
        day_pnl,
        day_change_pct,
        positions,
    })
}

/// # Summary
/// 计算账户当日的历史净值点：总值与相对建户资金的累计收益率。
pub async fn daily_point(
    account: &Account,
    oracle: &dyn PriceOracle,
    extended_hours: bool,
) -> Result<HistoryPoint, TradeError> {
    let positions = position_reports(account, oracle, extended_hours).await?;
    let invested: Decimal = positions.iter().map(|p| p.market_value).sum();
    let value = account.cash + invested;

    let initial = account
        .history
        .values()
        .next()
        .map(|h| h.value)
        .unwrap_or(value);
    let return_pct = if initial.is_zero() {
        Decimal::ZERO
    } else {
        (value - initial) / initial * HUNDRED
    };

    Ok(HistoryPoint { value, return_pct })
}
