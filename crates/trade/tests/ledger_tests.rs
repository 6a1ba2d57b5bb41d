use chrono::{TimeZone, Utc};
use mogi_core::trade::entity::{Account, Lot, Order, OrderKind, OrderStatus, TransactionType};
use mogi_trade::ledger::{FillOutcome, apply_fill};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;

fn filled_order(ticker: &str, shares: i64, fill_price: Decimal) -> Order {
    Order {
        kind: OrderKind::Market,
        ticker: ticker.to_string(),
        shares,
        fill_price,
        submitted_at: Utc.with_ymd_and_hms(2025, 6, 2, 14, 30, 0).unwrap(),
        status: OrderStatus::Filled,
    }
}

/// 不变量：任意标的的批次求和等于缓存的净持仓，零持仓不留痕
fn assert_lots_consistent(account: &Account) {
    for (ticker, position) in &account.positions {
        assert_eq!(
            account.lot_sum(ticker),
            *position,
            "lot sum mismatch for {}",
            ticker
        );
        assert_ne!(*position, 0, "zero position should be removed: {}", ticker);
    }
    for ticker in account.lots.keys() {
        assert!(
            account.positions.contains_key(ticker),
            "lots without position: {}",
            ticker
        );
    }
}

#[test]
fn test_buy_rejected_when_cash_insufficient() {
    let mut account = Account::new(dec!(100), Utc::now().date_naive());
    let order = filled_order("AAPL", 10, dec!(50)); // 需要 500

    let outcome = apply_fill(&mut account, TransactionType::Buy, &order);

    assert_eq!(outcome, FillOutcome::RejectedInsufficientFunds);
    // 全有或全无：账户完全不动
    assert_eq!(account.cash, dec!(100));
    assert!(account.positions.is_empty());
    assert!(account.lots.is_empty());
}

#[test]
fn test_buy_opens_new_position() {
    let mut account = Account::new(dec!(1000), Utc::now().date_naive());
    let order = filled_order("AAPL", 10, dec!(50));

    let outcome = apply_fill(&mut account, TransactionType::Buy, &order);

    assert_eq!(outcome, FillOutcome::Filled);
    assert_eq!(account.cash, dec!(500));
    assert_eq!(account.positions.get("AAPL"), Some(&10));
    assert_eq!(
        account.lots.get("AAPL"),
        Some(&VecDeque::from([Lot {
            shares: 10,
            price: dec!(50)
        }]))
    );
    assert_lots_consistent(&account);
}

#[test]
fn test_same_direction_buy_appends_lot() {
    let mut account = Account::new(dec!(10000), Utc::now().date_naive());
    apply_fill(&mut account, TransactionType::Buy, &filled_order("AAPL", 100, dec!(10)));
    apply_fill(&mut account, TransactionType::Buy, &filled_order("AAPL", 50, dec!(12)));

    assert_eq!(account.positions.get("AAPL"), Some(&150));
    assert_eq!(
        account.lots.get("AAPL"),
        Some(&VecDeque::from([
            Lot { shares: 100, price: dec!(10) },
            Lot { shares: 50, price: dec!(12) },
        ]))
    );
    assert_lots_consistent(&account);
}

#[test]
fn test_fifo_sell_consumes_oldest_lot_first() {
    // 给定 [{100@10},{50@12}]，卖出 120 股 @15：
    // $10 批次吃光，$12 批次吃掉 20，剩 [{30@12}]，净持仓 30
    let mut account = Account::new(dec!(10000), Utc::now().date_naive());
    apply_fill(&mut account, TransactionType::Buy, &filled_order("AAPL", 100, dec!(10)));
    apply_fill(&mut account, TransactionType::Buy, &filled_order("AAPL", 50, dec!(12)));
    let cash_before = account.cash;

    let outcome = apply_fill(&mut account, TransactionType::Sell, &filled_order("AAPL", 120, dec!(15)));

    assert_eq!(outcome, FillOutcome::Filled);
    assert_eq!(account.positions.get("AAPL"), Some(&30));
    assert_eq!(
        account.lots.get("AAPL"),
        Some(&VecDeque::from([Lot { shares: 30, price: dec!(12) }]))
    );
    assert_eq!(account.cash, cash_before + dec!(1800)); // 120 * 15
    assert_lots_consistent(&account);
}

#[test]
fn test_flip_collapses_cost_basis() {
    // 多头 [{50@10}]，卖出 80 股 @20：反手，剩 [{-30@20}]，净持仓 -30
    let mut account = Account::new(dec!(10000), Utc::now().date_naive());
    apply_fill(&mut account, TransactionType::Buy, &filled_order("AAPL", 50, dec!(10)));

    let outcome = apply_fill(&mut account, TransactionType::Sell, &filled_order("AAPL", 80, dec!(20)));

    assert_eq!(outcome, FillOutcome::Filled);
    assert_eq!(account.positions.get("AAPL"), Some(&-30));
    assert_eq!(
        account.lots.get("AAPL"),
        Some(&VecDeque::from([Lot { shares: -30, price: dec!(20) }]))
    );
    assert_lots_consistent(&account);
}

#[test]
fn test_exact_close_removes_ticker_entirely() {
    let mut account = Account::new(dec!(10000), Utc::now().date_naive());
    apply_fill(&mut account, TransactionType::Buy, &filled_order("AAPL", 100, dec!(10)));
    apply_fill(&mut account, TransactionType::Sell, &filled_order("AAPL", 100, dec!(11)));

    assert!(!account.positions.contains_key("AAPL"));
    assert!(!account.lots.contains_key("AAPL"));
    assert_eq!(account.cash, dec!(10000) - dec!(1000) + dec!(1100));
}

#[test]
fn test_short_open_and_partial_cover() {
    // 空头不受现金前置校验约束，且买入回补同样从最旧批次吸收
    let mut account = Account::new(dec!(0), Utc::now().date_naive());
    apply_fill(&mut account, TransactionType::Sell, &filled_order("TSLA", 100, dec!(10)));
    apply_fill(&mut account, TransactionType::Sell, &filled_order("TSLA", 50, dec!(12)));
    assert_eq!(account.positions.get("TSLA"), Some(&-150));
    assert_eq!(account.cash, dec!(1600));

    // 回补 120 股：-100 批次吃光，-50 批次剩 -30
    let outcome = apply_fill(&mut account, TransactionType::Buy, &filled_order("TSLA", 120, dec!(11)));

    assert_eq!(outcome, FillOutcome::Filled);
    assert_eq!(account.positions.get("TSLA"), Some(&-30));
    assert_eq!(
        account.lots.get("TSLA"),
        Some(&VecDeque::from([Lot { shares: -30, price: dec!(12) }]))
    );
    assert_eq!(account.cash, dec!(1600) - dec!(1320));
    assert_lots_consistent(&account);
}

#[test]
fn test_sell_of_long_never_cash_blocked() {
    // 现金见底也能卖出多头持仓（资金校验只针对买入，是刻意的领域策略）
    let mut account = Account::new(dec!(1000), Utc::now().date_naive());
    apply_fill(&mut account, TransactionType::Buy, &filled_order("AAPL", 10, dec!(100)));
    assert_eq!(account.cash, dec!(0));

    let outcome = apply_fill(&mut account, TransactionType::Sell, &filled_order("AAPL", 10, dec!(90)));

    assert_eq!(outcome, FillOutcome::Filled);
    assert_eq!(account.cash, dec!(900));
    assert!(!account.positions.contains_key("AAPL"));
}

#[test]
fn test_partial_front_lot_decremented_in_place() {
    // 卖出量小于队首批次：仅原地扣减，队列长度不变
    let mut account = Account::new(dec!(10000), Utc::now().date_naive());
    apply_fill(&mut account, TransactionType::Buy, &filled_order("AAPL", 100, dec!(10)));
    apply_fill(&mut account, TransactionType::Buy, &filled_order("AAPL", 50, dec!(12)));

    apply_fill(&mut account, TransactionType::Sell, &filled_order("AAPL", 40, dec!(15)));

    assert_eq!(account.positions.get("AAPL"), Some(&110));
    assert_eq!(
        account.lots.get("AAPL"),
        Some(&VecDeque::from([
            Lot { shares: 60, price: dec!(10) },
            Lot { shares: 50, price: dec!(12) },
        ]))
    );
    assert_lots_consistent(&account);
}
