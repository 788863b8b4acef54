//! Yahoo Finance daily-chart adapter.
//!
//! Real mode calls the v8 chart endpoint with explicit `period1`/`period2`
//! bounds. Mock mode (any transport that reports `is_mock`) serves
//! deterministic synthetic bars so the whole pipeline runs offline.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::OffsetDateTime;

use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::provider::{HistoryProvider, HistoryRequest, ProviderError};
use crate::{DailyBar, MarketDate, PriceHistory, TickerSymbol};

const CHART_TIMEOUT_MS: u64 = 10_000;
const RETRY_DELAY_MS: u64 = 250;

/// Yahoo chart adapter supporting both real API calls and mock mode.
#[derive(Clone)]
pub struct YahooHistoryProvider {
    http_client: Arc<dyn HttpClient>,
    use_real_api: bool,
}

impl Default for YahooHistoryProvider {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            use_real_api: false,
        }
    }
}

impl YahooHistoryProvider {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
        }
    }

    fn chart_endpoint(req: &HistoryRequest) -> Result<String, ProviderError> {
        // period2 is exclusive upstream; push it one day past the inclusive end.
        let period1 = req.start.unix_midnight();
        let period2 = req.end.offset_days(1)?.unix_midnight();

        Ok(format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            urlencoding::encode(req.symbol.as_str()),
            period1,
            period2,
        ))
    }

    async fn fetch_real(&self, req: &HistoryRequest) -> Result<PriceHistory, ProviderError> {
        let endpoint = Self::chart_endpoint(req)?;

        let request = HttpRequest::get(&endpoint)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(CHART_TIMEOUT_MS);

        let mut response = self
            .http_client
            .execute(request.clone())
            .await
            .map_err(|e| ProviderError::unavailable(format!("yahoo transport error: {e}")))?;

        // One retry after a short pause on throttling or upstream hiccups.
        if response.status == 429 || response.status >= 500 {
            tokio::time::sleep(std::time::Duration::from_millis(RETRY_DELAY_MS)).await;
            response = self.http_client.execute(request).await.map_err(|e| {
                ProviderError::unavailable(format!("yahoo transport error on retry: {e}"))
            })?;
        }

        if response.status == 429 {
            return Err(ProviderError::rate_limited(
                "yahoo rate limited the chart request",
            ));
        }

        if !response.is_success() {
            return Err(ProviderError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        parse_chart_body(&response.body, req)
    }

    fn fetch_fixture(&self, req: &HistoryRequest) -> Result<PriceHistory, ProviderError> {
        let seed = symbol_seed(&req.symbol);
        let mut bars = Vec::new();
        let mut day = req.start;
        let mut index: u64 = 0;

        while day <= req.end {
            if day.is_business_day() {
                let base = 90.0 + ((seed + index) % 350) as f64 / 10.0;
                let bar = DailyBar::new(
                    day,
                    Some(base),
                    Some(base + 1.20),
                    Some(base - 0.80),
                    base + 0.30,
                    Some(20_000 + index * 25),
                )?;
                bars.push(bar);
                index += 1;
            }
            day = day.offset_days(1)?;
        }

        Ok(PriceHistory::new(req.symbol.clone(), bars)?)
    }
}

impl HistoryProvider for YahooHistoryProvider {
    fn fetch_daily<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real(&req).await
            } else {
                self.fetch_fixture(&req)
            }
        })
    }
}

fn parse_chart_body(body: &str, req: &HistoryRequest) -> Result<PriceHistory, ProviderError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart_response.chart.error {
        return Err(ProviderError::unavailable(format!(
            "yahoo chart API error: {} ({})",
            error.description, error.code
        )));
    }

    let Some(result) = chart_response
        .chart
        .result
        .and_then(|mut results| (!results.is_empty()).then(|| results.remove(0)))
    else {
        return Err(ProviderError::unavailable("no chart data in response"));
    };

    // A present result with no timestamps is how the upstream renders an
    // empty range; callers treat it as insufficient data, not a fault.
    let Some(timestamps) = result.timestamp else {
        return Ok(PriceHistory::empty(req.symbol.clone()));
    };

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::internal("no quote data in chart response"))?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts_value) in timestamps.iter().enumerate() {
        let ts = OffsetDateTime::from_unix_timestamp(ts_value)
            .map_err(|e| ProviderError::internal(format!("invalid timestamp: {e}")))?;
        let date = MarketDate::from_date(ts.date());

        if date < req.start || date > req.end {
            continue;
        }

        // Rows with no close are upstream gaps; skip them.
        let Some(Some(close)) = quote.close.get(i) else {
            continue;
        };

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let volume = quote
            .volume
            .get(i)
            .copied()
            .flatten()
            .and_then(|v| u64::try_from(v).ok());

        bars.push(DailyBar::new(date, open, high, low, *close, volume)?);
    }

    Ok(PriceHistory::new(req.symbol.clone(), bars)?)
}

fn symbol_seed(symbol: &TickerSymbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}
