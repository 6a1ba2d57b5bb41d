use crate::market::entity::QuoteSnapshot;
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// 行情预言机端口（Port）。订单评估器通过它获取标的的最新价、
/// 昨收价与资产类别，是核心引擎对外部行情世界的唯一窄接口。
///
/// # Invariants
/// - 实现必须是 `Send + Sync` 的，可被多任务共享。
/// - 对无法识别的代码返回 `Ok` 且 `latest == None`，而不是 `Err`；
///   `Err` 只保留给网络/解析这类基础设施故障。
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// # Summary
    /// 查询单个标的的报价快照。
    ///
    /// # Logic
    /// 1. 向底层数据源请求最新盘中行情与昨收数据。
    /// 2. 汇总为 `QuoteSnapshot` 返回。
    ///
    /// # Arguments
    /// * `ticker`: 标的代码。
    /// * `extended_hours`: 是否包含盘前盘后行情。
    ///
    /// # Returns
    /// 成功返回报价快照，基础设施故障返回 `MarketError`。
    async fn get_asset_info(
        &self,
        ticker: &str,
        extended_hours: bool,
    ) -> Result<QuoteSnapshot, MarketError>;
}
