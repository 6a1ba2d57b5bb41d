use mogi_core::trade::entity::{Account, Lot, Order, TransactionType};
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// # Summary
/// 落账结果。资金不足是唯一依赖台账自身状态（而非行情）的拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// 已全量落账
    Filled,
    /// 买入金额超过可用现金，账户保持原样
    RejectedInsufficientFunds,
}

/// # Summary
/// 把一笔已成交订单落到账户上：扣减/入账现金，并按 FIFO 规则
/// 更新该标的的成本批次列表。全有或全无，不存在部分成交；
/// 拒绝时账户不发生任何变化。本函数不做 I/O，持久化由调用方负责。
///
/// # Logic
/// 1. 带符号成交量 = 买入取 +shares，卖出取 -shares；
///    总金额 = 带符号量 × 成交价（卖出金额为负，即现金增加）。
/// 2. 买入且现金不足则拒绝，账户不动。
/// 3. 扣减现金后按“现有净持仓符号 vs 成交方向”分情形维护批次：
///    - 无持仓：新建单批次列表。
///    - 同向加仓（多头买入/空头卖出）：追加新批次，净持仓放大。
///    - 反向恰好平光：整体移除该标的的持仓与批次。
///    - 反向减仓未变号：从队首（最旧）逐批吸收成交量，
///      队首批次剩余量大于待吸收量时原地扣减并停止，
///      否则弹出并继续——最早建仓的股份最先被平掉（FIFO 成本释放）。
///    - 反向穿越零点（反手）：旧批次全部作废，以剩余带符号量
///      按本次成交价建立单一新批次（反向新仓的全新成本基础）。
/// 4. `positions[ticker]` 与批次求和在同一步内保持相等。
///
/// # Invariants
/// - 调用方保证 `order.status == Filled` 且 `fill_price` 有效。
pub fn apply_fill(account: &mut Account, transaction: TransactionType, order: &Order) -> FillOutcome {
    let signed_qty = match transaction {
        TransactionType::Buy => order.shares,
        TransactionType::Sell => -order.shares,
    };
    let total_cost = Decimal::from(signed_qty) * order.fill_price;

    if transaction == TransactionType::Buy && account.cash < total_cost {
        return FillOutcome::RejectedInsufficientFunds;
    }

    account.cash -= total_cost;

    let ticker = order.ticker.as_str();
    let new_lot = Lot {
        shares: signed_qty,
        price: order.fill_price,
    };

    // positions 中从不保存零持仓，缺席即无持仓
    let existing = account.positions.get(ticker).copied().unwrap_or(0);
    if existing == 0 {
        account.positions.insert(ticker.to_string(), signed_qty);
        account
            .lots
            .insert(ticker.to_string(), VecDeque::from([new_lot]));
        return FillOutcome::Filled;
    }

    let updated = existing + signed_qty;
    let same_direction = (existing > 0) == (signed_qty > 0);

    if same_direction {
        account.positions.insert(ticker.to_string(), updated);
        if let Some(lots) = account.lots.get_mut(ticker) {
            lots.push_back(new_lot);
        }
    } else if updated == 0 {
        // 恰好平光，标的整体出账
        account.positions.remove(ticker);
        account.lots.remove(ticker);
    } else if (updated > 0) == (existing > 0) {
        // 减仓未变号：从最旧批次开始吸收
        account.positions.insert(ticker.to_string(), updated);
        if let Some(lots) = account.lots.get_mut(ticker) {
            let mut remaining = signed_qty;
            while remaining != 0 {
                let Some(front) = lots.front_mut() else {
                    break;
                };
                if front.shares.abs() > remaining.abs() {
                    front.shares += remaining;
                    remaining = 0;
                } else {
                    remaining += front.shares;
                    lots.pop_front();
                }
            }
        }
    } else {
        // 反手：剩余量以本次成交价开反向新仓
        account.positions.insert(ticker.to_string(), updated);
        account.lots.insert(
            ticker.to_string(),
            VecDeque::from([Lot {
                shares: updated,
                price: order.fill_price,
            }]),
        );
    }

    FillOutcome::Filled
}
