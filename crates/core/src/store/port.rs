use super::error::StoreError;
use crate::trade::entity::Account;
use async_trait::async_trait;
use std::collections::HashMap;

/// # Summary
/// 账户持久化端口：账户名 -> 账户文档的键值仓储。
/// 语义为整集合替换，不要求部分更新契约；实现可以在内部自行优化。
///
/// # Invariants
/// - 账户文档布局（cash/positions/lots/history）即事实上的持久化
///   模式，必须经 load/save 精确往返。
/// - 调用方以“全量读取 -> 改写一户 -> 全量保存”为原子单元，
///   由单排空循环纪律而非存储锁来保证互斥。
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// # Summary
    /// 读取全部账户。
    ///
    /// # Returns
    /// 账户名到账户文档的映射；空存储返回空映射。
    async fn load_all(&self) -> Result<HashMap<String, Account>, StoreError>;

    /// # Summary
    /// 整集合替换式写回全部账户。
    ///
    /// # Arguments
    /// * `accounts`: 当前的完整账户集合。
    async fn save_all(&self, accounts: &HashMap<String, Account>) -> Result<(), StoreError>;
}
