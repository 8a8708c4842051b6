//! Boundary traits for the external data-acquisition and model-rebuild
//! collaborators.
//!
//! The core consumes these as fallible asynchronous calls with no latency
//! bound and no ordering guarantee between overlapping calls for different
//! `k` values. Implementations own wire concerns entirely: whatever column
//! spellings or payload shapes the upstream service speaks are normalized
//! into the canonical [`Table`] / [`RegimeSeries`] schema before handover.

use crate::error::LensError;
use crate::regime::RegimeSeries;
use crate::table::Table;
use async_trait::async_trait;

/// Source of the factor [`Table`].
#[async_trait]
pub trait FactorSource {
    /// Fetch the full factor history as one canonical snapshot.
    async fn fetch_factor_table(&self) -> Result<Table, LensError>;
}

/// Source of [`RegimeSeries`] data and the out-of-process model rebuild.
#[async_trait]
pub trait RegimeSource {
    /// Fetch the regime series computed for model order `k`.
    async fn fetch_regime_series(&self, k: u32) -> Result<RegimeSeries, LensError>;

    /// Re-run the classification model for `k` out of process.
    async fn rebuild_regime_model(&self, k: u32) -> Result<(), LensError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::correlation::correlate;
    use indexmap::IndexMap;
    use smol_str::SmolStr;

    /// Canonical-schema source with the table fixed at construction, as a
    /// test stand-in for the real acquisition collaborator.
    struct FixedSource {
        table: Table,
    }

    #[async_trait]
    impl FactorSource for FixedSource {
        async fn fetch_factor_table(&self) -> Result<Table, LensError> {
            if self.table.is_empty() {
                return Err(LensError::NoData);
            }
            Ok(self.table.clone())
        }
    }

    #[tokio::test]
    async fn test_fetched_table_feeds_correlation() {
        let mut columns = IndexMap::new();
        columns.insert(
            SmolStr::new("btc_price"),
            vec![Some(42_000.0), Some(43_000.0), Some(41_000.0)],
        );
        columns.insert(SmolStr::new("funding"), vec![Some(0.01), Some(0.02), Some(0.03)]);
        columns.insert(SmolStr::new("basis"), vec![Some(0.2), Some(0.1), Some(0.3)]);
        let dates = vec![
            "2023-01-01".parse().unwrap(),
            "2023-01-02".parse().unwrap(),
            "2023-01-03".parse().unwrap(),
        ];
        let source = FixedSource {
            table: Table::new(dates, columns).unwrap(),
        };

        let table = source.fetch_factor_table().await.unwrap();
        let factors = table.factor_columns();
        assert_eq!(factors.len(), 2);

        let matrix = correlate(&table, &factors).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.get(0, 0), Some(1.0));
    }

    #[tokio::test]
    async fn test_empty_source_reports_no_data() {
        let source = FixedSource {
            table: Table::default(),
        };
        let result = source.fetch_factor_table().await;
        assert!(matches!(result, Err(LensError::NoData)));
    }
}
