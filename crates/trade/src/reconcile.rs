use mogi_core::trade::entity::{PendingSummary, ReconciliationEntry};
use std::collections::VecDeque;

/// # Summary
/// 对账队列：提交时行情尚未就绪（价格滞后于下单分钟）的订单
/// 在此排队，由调度器周期性排空重试。显式对象而非全局状态，
/// 由进程入口构造后以句柄注入提交路径与排空任务。
///
/// # Invariants
/// - 插入顺序即重试顺序：同一轮排空内旧请求先于新请求处理，
///   当多笔挂起买单竞争同一账户的现金时，先到者优先。
/// - 条目没有超时与撤销概念，只在重试出终态或账户删除时离队。
#[derive(Debug, Default)]
pub struct ReconciliationQueue {
    entries: VecDeque<ReconciliationEntry>,
}

impl ReconciliationQueue {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// 入队一条挂起记录（排到队尾）
    pub fn push(&mut self, entry: ReconciliationEntry) {
        self.entries.push_back(entry);
    }

    /// # Logic
    /// 一次性取出全部条目供排空重试，保持 FIFO 顺序；
    /// 仍需挂起的条目由调用方重新 `push` 回来。
    pub fn take_all(&mut self) -> Vec<ReconciliationEntry> {
        self.entries.drain(..).collect()
    }

    /// 清除指定账户的全部挂起条目（账户删除时调用），返回清除数量
    pub fn purge_account(&mut self, account: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.account != account);
        before - self.entries.len()
    }

    /// 队列内容的只读摘要，供命令层展示
    pub fn summaries(&self) -> Vec<PendingSummary> {
        self.entries
            .iter()
            .map(|e| PendingSummary {
                account: e.account.clone(),
                transaction: e.transaction,
                kind: e.order.kind,
                ticker: e.order.ticker.clone(),
                shares: e.order.shares,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
