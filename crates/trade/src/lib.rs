//! # Summary
//! 纸面交易核心引擎：订单评估（成交/拒绝/待对账分类）、
//! FIFO 批次台账落账、对账队列重试，以及组合它们的 TradeService。

pub mod evaluator;
pub mod ledger;
pub mod performance;
pub mod reconcile;
pub mod service;
