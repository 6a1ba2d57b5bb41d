//! # Summary
//! mogi 系统的领域核心：实体、端口 (Port) 契约、错误与全局配置。
//! 本 crate 不做任何 I/O，所有外设（行情源、持久化、命令层）
//! 通过 trait 注入到上层实现中。

pub mod common;
pub mod config;
pub mod market;
pub mod store;
pub mod trade;
