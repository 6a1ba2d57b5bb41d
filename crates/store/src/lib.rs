//! # Summary
//! 账户持久化适配层：内存实现（测试/嵌入用）与 db.json
//! 单文档整集合替换实现（线上形态）。

pub mod config;
pub mod json;
pub mod memory;
