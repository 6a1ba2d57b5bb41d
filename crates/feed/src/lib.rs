//! # Summary
//! 行情基础设施适配层：Yahoo Finance 实现的价格预言机端口。

pub mod yahoo;
