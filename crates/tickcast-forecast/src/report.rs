//! Forecast report assembly.
//!
//! The response layer receives a fully-shaped report: ticker, metadata, and
//! one record per predicted date. Classification defaults to `backtest`
//! whenever any record carries an actual observation, `forecast` otherwise.

use serde::Serialize;

use tickcast_core::{MarketDate, TickerSymbol};

/// Which request shape produced this report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    SingleDay,
    BetweenDates,
}

/// Backtest when predictions can be compared to observed prices, forecast
/// when no ground truth exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Backtest,
    Forecast,
}

/// One predicted date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub date: MarketDate,
    pub prediction: f64,
    pub actual: Option<f64>,
    /// `prediction - actual`, rounded to 2 decimals; absent without an
    /// actual.
    pub diff: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub model_version: String,
    pub period: PeriodKind,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: ReportKind,
}

/// Assembled forecast response payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub ticker: TickerSymbol,
    pub metadata: ReportMetadata,
    pub data: Vec<PredictionRecord>,
}

/// Step-wise report assembler.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    ticker: TickerSymbol,
    model_version: String,
    period: PeriodKind,
    kind_override: Option<ReportKind>,
    records: Vec<PredictionRecord>,
}

impl ReportBuilder {
    pub fn new(
        ticker: TickerSymbol,
        model_version: impl Into<String>,
        period: PeriodKind,
    ) -> Self {
        Self {
            ticker,
            model_version: model_version.into(),
            period,
            kind_override: None,
            records: Vec::new(),
        }
    }

    /// Force the classification instead of deriving it from the records.
    pub fn with_kind(mut self, kind: ReportKind) -> Self {
        self.kind_override = Some(kind);
        self
    }

    pub fn push(&mut self, date: MarketDate, prediction: f64, actual: Option<f64>) {
        let prediction = round2(prediction);
        let actual = actual.map(round2);
        let diff = actual.map(|observed| round2(prediction - observed));

        self.records.push(PredictionRecord {
            date,
            prediction,
            actual,
            diff,
        });
    }

    /// Add one record per date; `actuals` may be shorter than `dates`.
    pub fn push_batch(
        &mut self,
        dates: &[MarketDate],
        predictions: &[f64],
        actuals: &[Option<f64>],
    ) {
        for (i, (date, prediction)) in dates.iter().zip(predictions.iter()).enumerate() {
            let actual = actuals.get(i).copied().flatten();
            self.push(*date, *prediction, actual);
        }
    }

    pub fn build(self) -> ForecastReport {
        let kind = self.kind_override.unwrap_or_else(|| {
            if self.records.iter().any(|record| record.actual.is_some()) {
                ReportKind::Backtest
            } else {
                ReportKind::Forecast
            }
        });

        ForecastReport {
            ticker: self.ticker,
            metadata: ReportMetadata {
                model_version: self.model_version,
                period: self.period,
                count: self.records.len(),
                kind,
            },
            data: self.records,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn builder() -> ReportBuilder {
        ReportBuilder::new(
            TickerSymbol::parse("ITUB4.SA").expect("valid"),
            "lstm-1.3",
            PeriodKind::SingleDay,
        )
    }

    #[test]
    fn rounds_and_diffs_against_actuals() {
        let mut report = builder();
        report.push(
            MarketDate::from_date(date!(2025 - 06 - 02)),
            31.4159,
            Some(30.001),
        );

        let built = report.build();
        let record = &built.data[0];
        assert_eq!(record.prediction, 31.42);
        assert_eq!(record.actual, Some(30.0));
        assert_eq!(record.diff, Some(1.42));
    }

    #[test]
    fn classifies_backtest_when_any_actual_exists() {
        let mut report = builder();
        report.push(MarketDate::from_date(date!(2025 - 06 - 02)), 10.0, None);
        report.push(
            MarketDate::from_date(date!(2025 - 06 - 03)),
            11.0,
            Some(10.9),
        );

        let built = report.build();
        assert_eq!(built.metadata.kind, ReportKind::Backtest);
        assert_eq!(built.metadata.count, 2);
    }

    #[test]
    fn classifies_forecast_without_actuals() {
        let mut report = builder();
        report.push(MarketDate::from_date(date!(2025 - 06 - 02)), 10.0, None);

        assert_eq!(report.build().metadata.kind, ReportKind::Forecast);
    }

    #[test]
    fn kind_override_wins() {
        let mut report = builder().with_kind(ReportKind::Forecast);
        report.push(
            MarketDate::from_date(date!(2025 - 06 - 02)),
            10.0,
            Some(9.9),
        );

        assert_eq!(report.build().metadata.kind, ReportKind::Forecast);
    }

    #[test]
    fn batch_push_tolerates_missing_actual_tail() {
        let mut report = ReportBuilder::new(
            TickerSymbol::parse("AAPL").expect("valid"),
            "lstm-1.3",
            PeriodKind::BetweenDates,
        );
        let dates = [
            MarketDate::from_date(date!(2025 - 06 - 02)),
            MarketDate::from_date(date!(2025 - 06 - 03)),
        ];
        report.push_batch(&dates, &[10.0, 11.0], &[Some(9.9)]);

        let built = report.build();
        assert_eq!(built.data.len(), 2);
        assert_eq!(built.data[0].actual, Some(9.9));
        assert_eq!(built.data[1].actual, None);
        assert!(serde_json::to_string(&built)
            .expect("serializes")
            .contains("\"type\":\"backtest\""));
    }
}
