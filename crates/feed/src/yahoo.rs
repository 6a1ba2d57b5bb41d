use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mogi_core::market::entity::{AssetType, PricePoint, QuoteSnapshot};
use mogi_core::market::error::MarketError;
use mogi_core::market::port::PriceOracle;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// # Summary
/// Yahoo Finance 行情预言机实现。
/// 以一次 v8 chart 请求（1 分钟线，5 日窗口）同时取得最新盘中价、
/// 上一交易日收盘价与资产类别。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯。
/// - 未知代码返回空快照 (`latest == None`)，不是错误。
#[derive(Clone)]
pub struct YahooOracle {
    /// 内部使用的 HTTP 客户端
    client: Client,
}

impl YahooOracle {
    /// # Summary
    /// 创建一个新的 YahooOracle 实例。
    ///
    /// # Logic
    /// 1. 配置 10 秒超时。
    /// 2. 设置伪装浏览器 Header (User-Agent) 以减少被拦截风险。
    /// 3. 初始化 reqwest 客户端。
    pub fn new() -> Result<Self, MarketError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .parse()
                .map_err(|_| MarketError::Unknown("Invalid UA header".into()))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;

        Ok(Self { client })
    }
}

/// Yahoo v8 chart 接口响应顶层结构
#[derive(Deserialize, Debug)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooChartError>,
}

/// Yahoo API 错误详情
#[derive(Deserialize, Debug)]
struct YahooChartError {
    description: String,
}

#[derive(Deserialize, Debug)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

/// chart 元信息：资产类别与昨收
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    instrument_type: Option<String>,
    chart_previous_close: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

/// Yahoo API 原始报价数据（稀疏序列，缺口为 null）
#[derive(Deserialize, Debug)]
struct YahooQuote {
    close: Vec<Option<f64>>,
}

#[async_trait]
impl PriceOracle for YahooOracle {
    /// # Summary
    /// 查询单个标的的报价快照。
    ///
    /// # Logic
    /// 1. 请求 1 分钟线、5 日窗口的 chart 数据（可选含盘前盘后）。
    /// 2. 最新价取序列中最后一个非空收盘 bar 及其时间戳。
    /// 3. 昨收价取最新 bar 所在 UTC 日期之前的最后一个 bar；
    ///    序列只覆盖单日时退化为 meta 的 chartPreviousClose。
    /// 4. 资产类别取 meta 的 instrumentType。
    /// 5. Yahoo 报错或查无结果视为未知代码，返回空快照。
    ///
    /// # Arguments
    /// * `ticker`: 标的代码。
    /// * `extended_hours`: 是否包含盘前盘后行情。
    ///
    /// # Returns
    /// 成功返回报价快照，网络/解析故障返回 `MarketError`。
    async fn get_asset_info(
        &self,
        ticker: &str,
        extended_hours: bool,
    ) -> Result<QuoteSnapshot, MarketError> {
        let url = format!("https://query1.finance.yahoo.com/v8/finance/chart/{}", ticker);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("interval", "1m"),
                ("range", "5d"),
                ("includePrePost", if extended_hours { "true" } else { "false" }),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        // Yahoo 对未知代码返回 404 + error body，一律按未知代码处理
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(QuoteSnapshot::unknown());
        }
        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let json: YahooResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        if let Some(err) = json.chart.error {
            debug!("Yahoo 返回错误，按未知代码处理: {}: {}", ticker, err.description);
            return Ok(QuoteSnapshot::unknown());
        }

        let Some(result) = json.chart.result.and_then(|mut v| v.pop()) else {
            return Ok(QuoteSnapshot::unknown());
        };

        let asset_type = result
            .meta
            .instrument_type
            .as_deref()
            .and_then(|s| AssetType::from_str(s).ok())
            .unwrap_or(AssetType::Other);

        // 稀疏序列压平为 (时间, 价格) 点列
        let timestamps = result.timestamp.unwrap_or_default();
        let closes = result
            .indicators
            .quote
            .first()
            .map(|q| q.close.as_slice())
            .unwrap_or(&[]);

        let mut points: Vec<PricePoint> = Vec::new();
        for (i, &ts) in timestamps.iter().enumerate() {
            let close = closes.get(i).copied().flatten();
            let at = Utc.timestamp_opt(ts, 0).single();
            if let (Some(c), Some(at)) = (close, at)
                && let Some(price) = Decimal::from_f64_retain(c)
            {
                points.push(PricePoint { price, at });
            }
        }

        let Some(latest) = points.last().copied() else {
            return Ok(QuoteSnapshot::unknown());
        };

        let previous_close = previous_session_close(&points, latest.at)
            .or_else(|| fallback_previous_close(&result.meta, &points));

        Ok(QuoteSnapshot {
            latest: Some(latest),
            previous_close,
            asset_type,
        })
    }
}

/// 最新 bar 所在 UTC 日期之前的最后一个 bar，即上一交易日收盘
fn previous_session_close(points: &[PricePoint], latest_at: DateTime<Utc>) -> Option<PricePoint> {
    let latest_date = latest_at.date_naive();
    points
        .iter()
        .rev()
        .find(|p| p.at.date_naive() < latest_date)
        .copied()
}

/// 序列只覆盖单日时，用 meta 的 chartPreviousClose 兜底，
/// 时间戳取序列首个 bar（当日开盘附近）
fn fallback_previous_close(meta: &YahooMeta, points: &[PricePoint]) -> Option<PricePoint> {
    let price = meta.chart_previous_close.and_then(Decimal::from_f64_retain)?;
    let at = points.first()?.at;
    Some(PricePoint { price, at })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn point(price: Decimal, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> PricePoint {
        PricePoint {
            price,
            at: Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap(),
        }
    }

    #[test]
    fn test_previous_session_close_picks_last_bar_of_prior_day() {
        let points = vec![
            point(dec!(48), 2025, 5, 30, 19, 58),
            point(dec!(49), 2025, 5, 30, 19, 59),
            point(dec!(50), 2025, 6, 2, 13, 30),
            point(dec!(51), 2025, 6, 2, 13, 31),
        ];
        let latest = points[3];

        let prev = previous_session_close(&points, latest.at).unwrap();

        assert_eq!(prev.price, dec!(49));
        assert_eq!(
            prev.at.date_naive(),
            chrono::NaiveDate::from_ymd_opt(2025, 5, 30).unwrap()
        );
    }

    #[test]
    fn test_previous_session_close_absent_for_single_day_series() {
        let points = vec![
            point(dec!(50), 2025, 6, 2, 13, 30),
            point(dec!(51), 2025, 6, 2, 13, 31),
        ];

        assert!(previous_session_close(&points, points[1].at).is_none());
    }

    #[test]
    fn test_fallback_uses_meta_chart_previous_close() {
        let meta = YahooMeta {
            instrument_type: Some("EQUITY".to_string()),
            chart_previous_close: Some(49.5),
        };
        let points = vec![point(dec!(50), 2025, 6, 2, 13, 30)];

        let prev = fallback_previous_close(&meta, &points).unwrap();

        assert_eq!(prev.price, dec!(49.5));
        assert_eq!(prev.at, points[0].at);
    }
}
