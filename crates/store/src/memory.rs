use async_trait::async_trait;
use mogi_core::store::error::StoreError;
use mogi_core::store::port::AccountStore;
use mogi_core::trade::entity::Account;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// # Summary
/// 基于内存的账户仓储实现，克隆进克隆出。
/// 作为 `AccountStore` 的适配器，供测试与一次性模拟环境使用。
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn load_all(&self) -> Result<HashMap<String, Account>, StoreError> {
        Ok(self.accounts.read().await.clone())
    }

    async fn save_all(&self, accounts: &HashMap<String, Account>) -> Result<(), StoreError> {
        *self.accounts.write().await = accounts.clone();
        Ok(())
    }
}
