//! # Integration Test Flows
//!
//! Read → select → coalesce → delete → re-read, and read → export, through
//! `LogDataService` over a capped in-memory store.
//!
//! ## Properties Exercised
//!
//! 1. **Batched reads**: a capped store yields the same table as an uncapped one
//! 2. **Ordering**: numeric and chronological comparison, never lexical
//! 3. **Coalescing**: position adjacency, both directions, duplicate index values
//! 4. **Export**: ascending by the first column regardless of log direction

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    use wx_log_data::{
        full_window, CurveInfo, CurveValue, Direction, ExportOptions, ExportScope, IndexRange,
        IndexType, IndexValue, InMemoryLogStore, IndexWindow, LogDataApi, LogDataConfig,
        LogDataError, LogDataService, LogDataTable, LogFixture, LogHeader,
    };

    use crate::fixtures::{depth_log, reference};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn service_over(
        fixture: LogFixture,
        cap: usize,
    ) -> (Arc<InMemoryLogStore>, LogDataService<InMemoryLogStore>) {
        let store = Arc::new(InMemoryLogStore::new().with_max_rows_per_call(cap));
        store.insert_log(fixture);
        let service = LogDataService::new(store.clone(), LogDataConfig::for_testing())
            .expect("valid config");
        (store, service)
    }

    async fn read_full(
        service: &LogDataService<InMemoryLogStore>,
        log: &LogHeader,
        curves: &[&str],
    ) -> LogDataTable {
        let curves: Vec<String> = curves.iter().map(|c| c.to_string()).collect();
        service
            .read(log, &curves, &full_window(log).unwrap(), true, &CancellationToken::new())
            .await
            .expect("read succeeds")
            .completed()
            .expect("not cancelled")
    }

    fn ids(table: &LogDataTable) -> Vec<String> {
        table.rows().iter().map(|r| r.id().to_string()).collect()
    }

    // =============================================================================
    // BATCHED READS
    // =============================================================================

    #[tokio::test]
    async fn test_capped_read_equivalence() {
        let depths = [0.0, 1.0, 2.0, 3.0, 4.0];
        let (capped_store, capped) = service_over(depth_log("L-1", Direction::Increasing, &depths), 2);
        let (_, uncapped) = service_over(depth_log("L-1", Direction::Increasing, &depths), 1_000);

        let log = capped.get_log(&reference("L-1")).await.unwrap();
        let from_capped = read_full(&capped, &log, &["GR"]).await;
        let calls = capped_store.data_calls();
        let from_uncapped = read_full(&uncapped, &log, &["GR"]).await;

        assert_eq!(calls, 3);
        assert_eq!(from_capped, from_uncapped);
        assert_eq!(ids(&from_capped), vec!["0", "1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_numeric_order_across_batches() {
        let depths = [2.0, 9.0, 10.0, 100.0];
        let (store, service) = service_over(depth_log("L-1", Direction::Increasing, &depths), 1);
        let log = service.get_log(&reference("L-1")).await.unwrap();

        let table = read_full(&service, &log, &["GR"]).await;
        assert_eq!(ids(&table), vec!["2", "9", "10", "100"]);
        assert_eq!(store.data_calls(), 4);
    }

    #[tokio::test]
    async fn test_index_curve_first_everywhere() {
        let (_, service) = service_over(depth_log("L-1", Direction::Increasing, &[0.0, 1.0]), 10);
        let log = service.get_log(&reference("L-1")).await.unwrap();
        let curves: Vec<&str> = log.curves.iter().map(|c| c.mnemonic.as_str()).collect();
        assert_eq!(curves, vec!["DEPTH", "GR", "RHOB"]);

        let table = read_full(&service, &log, &["RHOB", "GR"]).await;
        let columns: Vec<&str> = table
            .curve_specifications()
            .iter()
            .map(|s| s.mnemonic.as_str())
            .collect();
        assert_eq!(columns[0], "DEPTH");
        assert_eq!(columns.len(), 3);
    }

    #[tokio::test]
    async fn test_chronological_order_with_mixed_offsets() {
        let header = LogHeader {
            reference: reference("T-1"),
            name: "mixed offsets".into(),
            index_type: IndexType::DateTime,
            direction: Direction::Increasing,
            index_curve: Some("TIME".into()),
            start_index: Some(IndexValue::parse("2024-01-01T08:00:00Z", IndexType::DateTime).unwrap()),
            end_index: Some(IndexValue::parse("2024-01-01T09:00:00Z", IndexType::DateTime).unwrap()),
            object_growing: false,
            curves: vec![CurveInfo::new("TIME", "datetime")],
        };
        // 10:30+02:00 is 08:30Z: chronologically second, lexically last
        let stamps = ["2024-01-01T08:00:00Z", "2024-01-01T10:30:00+02:00", "2024-01-01T09:00:00Z"];
        let fixture = LogFixture {
            header,
            mnemonics: vec!["TIME".into()],
            units: vec!["datetime".into()],
            rows: stamps.iter().map(|s| vec![CurveValue::from(*s)]).collect(),
        };
        let (_, service) = service_over(fixture, 1);
        let log = service.get_log(&reference("T-1")).await.unwrap();

        let table = read_full(&service, &log, &[]).await;
        assert_eq!(table.len(), 3);
        assert_eq!(table.row(1).unwrap().id(), "2024-01-01T10:30:00+02:00");
    }

    #[tokio::test]
    async fn test_contract_violation_surfaces() {
        let store = Arc::new(
            InMemoryLogStore::new()
                .with_max_rows_per_call(4)
                .with_reversed_rows(),
        );
        store.insert_log(depth_log("L-1", Direction::Increasing, &[0.0, 1.0, 2.0]));
        let service = LogDataService::new(store, LogDataConfig::for_testing()).unwrap();
        let log = service.get_log(&reference("L-1")).await.unwrap();

        let result = service
            .read(&log, &[], &full_window(&log).unwrap(), true, &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(LogDataError::StoreContractViolation { .. })));
    }

    // =============================================================================
    // SELECTION, COALESCING AND DELETE
    // =============================================================================

    #[tokio::test]
    async fn test_decreasing_log_delete_flow() {
        let depths: Vec<f64> = (0..=10).rev().map(f64::from).collect();
        let (store, service) = service_over(depth_log("L-1", Direction::Decreasing, &depths), 3);
        let log = service.get_log(&reference("L-1")).await.unwrap();
        let table = read_full(&service, &log, &["GR", "RHOB"]).await;
        assert_eq!(table.first_id(), Some("10"));

        let ranges = service
            .delete_selected(&log, &["GR".to_string()], &table, &[8, 1, 7, 0, 2])
            .await
            .unwrap();
        assert_eq!(ranges, vec![IndexRange::new("10", "8"), IndexRange::new("3", "2")]);
        assert_eq!(store.deletes().len(), 1);

        let reread = read_full(&service, &log, &["GR", "RHOB"]).await;
        for (position, row) in reread.rows().iter().enumerate() {
            let deleted = [0, 1, 2, 7, 8].contains(&position);
            assert_eq!(row.get("GR") == Some(&CurveValue::Null), deleted, "row {position}");
            assert_eq!(row.get("RHOB"), Some(&CurveValue::Number(2.3)));
        }
    }

    #[tokio::test]
    async fn test_duplicate_index_values_coalesce_by_position() {
        let (_, service) = service_over(
            depth_log("L-1", Direction::Increasing, &[0.0, 1.0, 1.0, 2.0, 3.0]),
            10,
        );
        let log = service.get_log(&reference("L-1")).await.unwrap();
        let table = read_full(&service, &log, &["GR"]).await;
        assert_eq!(table.len(), 5);

        assert_eq!(service.coalesce(&log, &table, &[1, 2]).unwrap(), vec![IndexRange::new("1", "1")]);
        assert_eq!(
            service.coalesce(&log, &table, &[0, 2]).unwrap(),
            vec![IndexRange::point("0"), IndexRange::point("1")]
        );
    }

    #[tokio::test]
    async fn test_repeated_index_at_batch_boundary() {
        let (store, service) = service_over(
            depth_log("L-1", Direction::Increasing, &[0.0, 1.0, 1.0, 1.0, 2.0]),
            3,
        );
        let log = service.get_log(&reference("L-1")).await.unwrap();
        let table = read_full(&service, &log, &["GR"]).await;

        // the batch ends on 1; its third repeat is behind the exclusive resume
        assert_eq!(ids(&table), vec!["0", "1", "1", "2"]);

        // range deletes still reach the unseen row
        let ranges = service
            .delete_selected(&log, &["GR".to_string()], &table, &[1, 2])
            .await
            .unwrap();
        assert_eq!(ranges, vec![IndexRange::new("1", "1")]);
        let stored = store.log(&reference("L-1")).unwrap();
        let nulled = stored.rows.iter().filter(|row| row[0] == CurveValue::Null).count();
        assert_eq!(nulled, 3);
    }

    #[tokio::test]
    async fn test_invalid_selection_sends_nothing() {
        let (store, service) = service_over(depth_log("L-1", Direction::Increasing, &[0.0, 1.0]), 10);
        let log = service.get_log(&reference("L-1")).await.unwrap();
        let table = read_full(&service, &log, &["GR"]).await;

        let result = service
            .delete_selected(&log, &["GR".to_string()], &table, &[0, 0])
            .await;
        assert!(matches!(result, Err(LogDataError::InvalidSelection(_))));
        assert!(store.deletes().is_empty());
    }

    // =============================================================================
    // EXPORT
    // =============================================================================

    #[tokio::test]
    async fn test_export_decreasing_log_ascending() {
        let depths: Vec<f64> = (0..=5).rev().map(f64::from).collect();
        let (_, service) = service_over(depth_log("L-1", Direction::Decreasing, &depths), 2);
        let log = service.get_log(&reference("L-1")).await.unwrap();
        let window = IndexWindow::new(IndexValue::Depth(4.0), IndexValue::Depth(2.0));
        let table = service
            .read(&log, &["GR".to_string()], &window, true, &CancellationToken::new())
            .await
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(ids(&table), vec!["4", "3", "2"]);

        let interval = service
            .export(&log, &table, &ExportScope::IntervalOfData, &ExportOptions::default(), &CancellationToken::new())
            .await
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(interval.render(), "DEPTH[m],GR[gAPI]\n2,4\n3,6\n4,8");

        let all = service
            .export(&log, &table, &ExportScope::All, &ExportOptions::default(), &CancellationToken::new())
            .await
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(all.lines.first().map(String::as_str), Some("0,0"));
        assert_eq!(all.lines.len(), 6);
    }

    #[tokio::test]
    async fn test_export_custom_separator_and_line_end() {
        let (_, service) = service_over(depth_log("L-1", Direction::Increasing, &[5.0, 6.0]), 10);
        let log = service.get_log(&reference("L-1")).await.unwrap();
        let table = read_full(&service, &log, &["GR"]).await;
        let options = ExportOptions {
            separator: "\t".into(),
            new_line: "\r\n".into(),
        };

        let doc = service
            .export(&log, &table, &ExportScope::SelectedIndexValues(vec![1]), &options, &CancellationToken::new())
            .await
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(doc.render(), "DEPTH[m]\tGR[gAPI]\r\n6\t12");
    }
}
