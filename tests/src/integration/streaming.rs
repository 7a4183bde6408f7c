//! # Streaming Flows
//!
//! Growing logs followed by `LogDataService::start_streaming`, on Tokio's
//! paused clock so refresh delays and the auto-stop deadline run instantly.

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta, Utc};
    use std::sync::Arc;
    use std::time::Duration;

    use wx_log_data::{
        Direction, IndexValue, InMemoryLogStore, LogDataApi, LogDataConfig, LogDataService,
        StreamState,
    };

    use crate::fixtures::{depth_log, reference, time_log, time_row};

    fn start() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    fn service(store: &Arc<InMemoryLogStore>) -> LogDataService<InMemoryLogStore> {
        LogDataService::new(store.clone(), LogDataConfig::default()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_growing_time_log_stream() {
        let store = Arc::new(InMemoryLogStore::new().with_max_rows_per_call(8));
        // one sample per minute, 00:00 to 00:29
        store.insert_log(time_log("T-1", start(), 60, 30));
        let service = service(&store);
        let log = service.get_log(&reference("T-1")).await.unwrap();

        let session = service
            .start_streaming(&log, &["ROP".to_string()], Some(Duration::from_secs(5)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // first window opens 20 minutes before the end, start exclusive
        let table = session.table();
        assert_eq!(table.len(), 20);
        assert_eq!(table.first_id(), Some("2024-01-01T00:10:00Z"));
        assert_eq!(table.curve_specifications()[0].mnemonic, "TIME");

        let appended: Vec<_> = (30..33)
            .map(|minute| time_row(&(start() + TimeDelta::minutes(minute))))
            .collect();
        store.push_rows(&reference("T-1"), appended).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let table = session.table();
        assert_eq!(table.len(), 23);
        let mut ids: Vec<&str> = table.rows().iter().map(|r| r.id()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 23);
        assert_eq!(
            session.max_index(),
            Some(IndexValue::DateTime(start() + TimeDelta::minutes(32)))
        );
        assert_eq!(
            session.min_index(),
            Some(IndexValue::DateTime(start() + TimeDelta::minutes(10)))
        );

        service.stop_streaming();
        assert_eq!(session.wait().await, StreamState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_auto_stops_after_five_minutes() {
        let store = Arc::new(InMemoryLogStore::new());
        store.insert_log(depth_log("L-1", Direction::Increasing, &[0.0, 1.0, 2.0]));
        let service = service(&store);
        let log = service.get_log(&reference("L-1")).await.unwrap();

        let session = service.start_streaming(&log, &["GR".to_string()], None).await.unwrap();
        assert_eq!(session.wait().await, StreamState::AutoStopped);
        assert_eq!(
            session.notification().as_deref(),
            Some("The log data stream was automatically stopped after 5 minutes to reduce the load on the server.")
        );
        let refresh = session.refresh_state();
        assert!(!refresh.auto_refresh_enabled);
        assert_eq!(refresh.elapsed_since_start, Duration::from_secs(300));

        let calls = store.data_calls();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(store.data_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop_opens_new_session() {
        let store = Arc::new(InMemoryLogStore::new());
        store.insert_log(depth_log("L-1", Direction::Decreasing, &[3.0, 2.0, 1.0]));
        let service = service(&store);
        let log = service.get_log(&reference("L-1")).await.unwrap();

        let first = service.start_streaming(&log, &[], None).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        // decreasing: first window starts 20 units above the end, so all rows arrive
        assert_eq!(first.table().len(), 3);
        service.stop_streaming();
        first.wait().await;

        let second = service.start_streaming(&log, &[], None).await.unwrap();
        assert_ne!(first.id(), second.id());
        assert!(second.is_active());
        service.stop_streaming();
        assert_eq!(second.wait().await, StreamState::Stopped);
    }
}
