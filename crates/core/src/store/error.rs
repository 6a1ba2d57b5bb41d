use thiserror::Error;

/// # Summary
/// 存储层错误枚举，处理文件读写与序列化失败等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 底层文件 I/O 失败
    #[error("I/O error: {0}")]
    Io(String),
    /// 账户文档序列化/反序列化失败
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// 初始化存储失败
    #[error("Initialization error: {0}")]
    InitError(String),
    /// 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}
