use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mogi_core::common::time::{RealTimeProvider, TimeProvider};
use mogi_core::config::AppConfig;
use mogi_core::trade::port::TradePort;
use mogi_feed::yahoo::YahooOracle;
use mogi_store::json::JsonAccountStore;
use mogi_trade::service::TradeService;
use tracing::{info, warn};

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 实例化行情预言机、账户仓储与交易服务，挂起对账排空定时任务。
///
/// # Logic
/// 1. 初始化全局日志。
/// 2. 读取配置（数据目录可被 MOGI_DATA_DIR 覆盖）。
/// 3. 实例化基础设施层（Feed、Store）。
/// 4. 构造交易服务并注入端口抽象。
/// 5. 启动每分钟一轮的对账排空循环。
/// 6. 挂起等待外部信号退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    tracing_subscriber::fmt::init();
    info!("Mogi paper-trading ledger starting...");

    // 2. 配置
    let config = AppConfig::default();
    let data_dir = std::env::var("MOGI_DATA_DIR")
        .unwrap_or_else(|_| config.database.data_dir.clone());
    mogi_store::config::set_root_dir(PathBuf::from(data_dir));

    // 3. 基础设施层
    let oracle = Arc::new(YahooOracle::new()?);
    let store = Arc::new(JsonAccountStore::new()?);

    // 4. 交易服务（命令层作为外部协作者经 TradePort 接入）
    let service = Arc::new(TradeService::new(store, oracle, config.trading.clone()));

    // 5. 对账排空循环：单循环在飞，一轮完整结束才开始下一轮
    let drainer: Arc<dyn TradePort> = service.clone();
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let drain_interval = Duration::from_secs(config.trading.drain_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(drain_interval);
        loop {
            ticker.tick().await;
            match drainer.drain_once(clock.now()).await {
                Ok(reports) => {
                    for report in reports {
                        info!(
                            "对账出队: {} {} {} 股 {} -> {:?}",
                            report.account,
                            report.transaction,
                            report.order.shares,
                            report.order.ticker,
                            report.outcome
                        );
                    }
                }
                Err(e) => warn!("对账排空失败: {}", e),
            }
        }
    });

    info!("TradeService initialized. Waiting for signals...");

    // 6. 挂起主线程，等待外部退出信号
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting...");

    Ok(())
}
