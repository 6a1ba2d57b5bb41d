use async_trait::async_trait;
use mogi_core::store::error::StoreError;
use mogi_core::store::port::AccountStore;
use mogi_core::trade::entity::Account;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::info;

/// 默认账户集合文档文件名
const DEFAULT_DB_FILE: &str = "db.json";

/// # Summary
/// 单文件 JSON 账户仓储：整个账户集合序列化为一份 `db.json`，
/// 读写均为全量替换。账户文档布局（cash/positions/lots/history）
/// 即持久化模式本身，必须逐字节往返。
///
/// # Invariants
/// - 写入走临时文件 + rename，文件内容要么是旧版本要么是新版本。
/// - 文件级互斥由内部 `Mutex` 保证；跨进程互斥不在契约内。
pub struct JsonAccountStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl JsonAccountStore {
    /// # Logic
    /// 1. 取配置的数据根目录并确保其存在。
    /// 2. 文档落在 `<root>/db.json`。
    pub fn new() -> Result<Self, StoreError> {
        let root = crate::config::get_root_dir();
        std::fs::create_dir_all(&root)
            .map_err(|e| StoreError::InitError(format!("Failed to create data dir: {}", e)))?;
        Ok(Self::with_path(root.join(DEFAULT_DB_FILE)))
    }

    /// 指定文档路径创建实例（测试用）
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            io_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl AccountStore for JsonAccountStore {
    /// # Logic
    /// 文件尚不存在视为空存储，返回空映射。
    async fn load_all(&self) -> Result<HashMap<String, Account>, StoreError> {
        let _guard = self.io_lock.lock().await;
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HashMap::new());
            }
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// # Logic
    /// 先写临时文件再原子 rename，避免半截文档。
    async fn save_all(&self, accounts: &HashMap<String, Account>) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let bytes = serde_json::to_vec_pretty(accounts)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        info!("账户集合已落盘: {} 户 -> {}", accounts.len(), self.path.display());
        Ok(())
    }
}
