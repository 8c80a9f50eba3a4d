// * Operations: logging and metrics

pub mod telemetry;

// * Re-exports for convenient access
pub use telemetry::{
    get_metrics_string, init_tracing, init_tracing_pretty, init_tracing_with_level,
    record_document_fetched, record_roster_rows_skipped, record_rows_rejected,
    record_suspicious_play, record_table_extracted,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_metrics() {
        record_table_extracted();
        record_rows_rejected(2);

        let metrics = get_metrics_string();
        assert!(!metrics.is_empty());
    }
}
