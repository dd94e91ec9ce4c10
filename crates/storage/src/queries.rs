//! Observation Queries
//!
//! The fixed query shapes the API serves. Each returns plain rows, never
//! pooled handles.

use crate::pool::Session;
use crate::{Observation, ObservationDate, PrecipitationReading, StorageError, TemperatureStats};
use tracing::debug;

fn record_query(query: &'static str) {
    metrics::counter!("store_queries_total", "query" => query).increment(1);
}

impl Session {
    /// Most recent `date` in the measurement table, `None` when it is empty
    pub async fn latest_observation_date(&mut self) -> Result<Option<ObservationDate>, StorageError> {
        record_query("latest_observation_date");

        let latest: Option<String> = sqlx::query_scalar("SELECT MAX(date) FROM measurement")
            .fetch_one(self.conn())
            .await?;

        debug!("Latest observation date: {:?}", latest);

        latest
            .map(|raw| {
                ObservationDate::parse(&raw).map_err(|_| {
                    StorageError::StoreUnavailable(format!("malformed date {:?} in measurement", raw))
                })
            })
            .transpose()
    }

    /// Every measurement strictly after `cutoff`, in storage order
    pub async fn precipitation_since(
        &mut self,
        cutoff: ObservationDate,
    ) -> Result<Vec<PrecipitationReading>, StorageError> {
        record_query("precipitation_since");

        let rows: Vec<(String, Option<f64>)> =
            sqlx::query_as("SELECT date, prcp FROM measurement WHERE date > ? ORDER BY id")
                .bind(cutoff.to_string())
                .fetch_all(self.conn())
                .await?;

        debug!("{} precipitation rows after {}", rows.len(), cutoff);

        Ok(rows
            .into_iter()
            .map(|(date, prcp)| PrecipitationReading { date, prcp })
            .collect())
    }

    /// Station identifiers in the order the store returns them
    pub async fn all_station_ids(&mut self) -> Result<Vec<String>, StorageError> {
        record_query("all_station_ids");

        let ids: Vec<String> = sqlx::query_scalar("SELECT station FROM station")
            .fetch_all(self.conn())
            .await?;

        debug!("{} stations", ids.len());
        Ok(ids)
    }

    /// All measurements reported by one station, in storage order
    pub async fn observations_for_station(
        &mut self,
        station: &str,
    ) -> Result<Vec<Observation>, StorageError> {
        record_query("observations_for_station");

        let rows: Vec<(String, String, Option<f64>, f64)> = sqlx::query_as(
            "SELECT station, date, prcp, tobs FROM measurement WHERE station = ? ORDER BY id",
        )
        .bind(station)
        .fetch_all(self.conn())
        .await?;

        debug!("{} observations for station {}", rows.len(), station);

        Ok(rows
            .into_iter()
            .map(|(station, date, prcp, tobs)| Observation { station, date, prcp, tobs })
            .collect())
    }

    /// Min, max and mean of `tobs` for dates in `[start, end]`
    pub async fn temperature_stats(
        &mut self,
        start: ObservationDate,
        end: ObservationDate,
    ) -> Result<TemperatureStats, StorageError> {
        record_query("temperature_stats");

        let (min, max, avg): (Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT MIN(tobs), MAX(tobs), AVG(tobs) FROM measurement WHERE date BETWEEN ? AND ?",
        )
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_one(self.conn())
        .await?;

        // Floating-point AVG can drift just past the extremes on equal values
        let avg = match (min, max, avg) {
            (Some(lo), Some(hi), Some(mean)) => Some(mean.clamp(lo, hi)),
            (_, _, mean) => mean,
        };

        debug!("Temperature stats {}..={}: {:?} {:?} {:?}", start, end, min, max, avg);
        Ok(TemperatureStats { min, max, avg })
    }

    /// Station with the most measurement rows; ties go to the lowest id
    pub async fn most_active_station(&mut self) -> Result<Option<String>, StorageError> {
        record_query("most_active_station");

        let station: Option<String> = sqlx::query_scalar(
            "SELECT station FROM measurement GROUP BY station ORDER BY COUNT(*) DESC, station ASC LIMIT 1",
        )
        .fetch_optional(self.conn())
        .await?;

        debug!("Most active station: {:?}", station);
        Ok(station)
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::observation;
    use crate::{ObservationDate, Session, Store};
    use proptest::prelude::*;

    fn date(s: &str) -> ObservationDate {
        ObservationDate::parse(s).unwrap()
    }

    async fn seeded(session: &mut Session) {
        for station in ["USC00519397", "USC00513117", "USC00519281"] {
            session.insert_station(station).await.unwrap();
        }

        let rows = [
            observation("USC00519397", "2016-08-22", Some(0.4), 78.0),
            observation("USC00519397", "2016-08-23", Some(0.0), 81.0),
            observation("USC00519281", "2016-08-23", Some(1.79), 77.0),
            observation("USC00519281", "2016-08-24", None, 77.0),
            observation("USC00513117", "2017-01-01", Some(0.5), 70.0),
            observation("USC00519281", "2017-08-18", Some(0.06), 79.0),
            observation("USC00519281", "2017-08-23", Some(0.0), 81.0),
        ];
        for row in &rows {
            session.insert_measurement(row).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_latest_observation_date() {
        let store = Store::in_memory().await.unwrap();
        let mut session = store.session().await.unwrap();

        assert_eq!(session.latest_observation_date().await.unwrap(), None);

        seeded(&mut session).await;
        assert_eq!(session.latest_observation_date().await.unwrap(), Some(date("2017-08-23")));
    }

    #[tokio::test]
    async fn test_precipitation_since_is_strictly_after_cutoff() {
        let store = Store::in_memory().await.unwrap();
        let mut session = store.session().await.unwrap();
        seeded(&mut session).await;

        let cutoff = date("2016-08-23");
        let rows = session.precipitation_since(cutoff).await.unwrap();

        assert!(rows.iter().all(|r| r.date.as_str() > "2016-08-23"));
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2016-08-24", "2017-01-01", "2017-08-18", "2017-08-23"]);
        assert_eq!(rows[0].prcp, None);
    }

    #[tokio::test]
    async fn test_station_ids_are_distinct() {
        let store = Store::in_memory().await.unwrap();
        let mut session = store.session().await.unwrap();

        assert!(session.all_station_ids().await.unwrap().is_empty());

        seeded(&mut session).await;
        let mut ids = session.all_station_ids().await.unwrap();
        assert_eq!(ids.len(), 3);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_observations_for_station_in_storage_order() {
        let store = Store::in_memory().await.unwrap();
        let mut session = store.session().await.unwrap();
        seeded(&mut session).await;

        let rows = session.observations_for_station("USC00519281").await.unwrap();
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2016-08-23", "2016-08-24", "2017-08-18", "2017-08-23"]);
        assert!(rows.iter().all(|r| r.station == "USC00519281"));

        assert!(session.observations_for_station("NOPE").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_temperature_stats_inclusive_range() {
        let store = Store::in_memory().await.unwrap();
        let mut session = store.session().await.unwrap();
        seeded(&mut session).await;

        let single = session
            .temperature_stats(date("2017-01-01"), date("2017-01-01"))
            .await
            .unwrap();
        assert_eq!((single.min, single.max, single.avg), (Some(70.0), Some(70.0), Some(70.0)));

        let span = session
            .temperature_stats(date("2016-08-23"), date("2016-08-24"))
            .await
            .unwrap();
        assert_eq!(span.min, Some(77.0));
        assert_eq!(span.max, Some(81.0));
        assert!((span.avg.unwrap() - 235.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_temperature_stats_empty_range() {
        let store = Store::in_memory().await.unwrap();
        let mut session = store.session().await.unwrap();
        seeded(&mut session).await;

        let stats = session
            .temperature_stats(date("2000-01-01"), date("2000-12-31"))
            .await
            .unwrap();
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn test_most_active_station() {
        let store = Store::in_memory().await.unwrap();
        let mut session = store.session().await.unwrap();

        assert_eq!(session.most_active_station().await.unwrap(), None);

        seeded(&mut session).await;
        assert_eq!(session.most_active_station().await.unwrap().as_deref(), Some("USC00519281"));
    }

    #[tokio::test]
    async fn test_temperature_stats_repeated_fractional_values() {
        let store = Store::in_memory().await.unwrap();
        let mut session = store.session().await.unwrap();

        for (day, value) in [("2017-02-01", 0.1), ("2017-02-02", 0.2), ("2017-02-03", 0.7)] {
            for _ in 0..3 {
                session
                    .insert_measurement(&observation("X", day, None, value))
                    .await
                    .unwrap();
            }

            let stats = session.temperature_stats(date(day), date(day)).await.unwrap();
            assert_eq!(stats.min, Some(value));
            assert_eq!(stats.max, Some(value));
            assert_eq!(stats.avg, Some(value));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_stats_are_ordered(temps in proptest::collection::vec(-30.0f64..120.0, 1..20)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let stats = runtime.block_on(async {
                let store = Store::in_memory().await.unwrap();
                let mut session = store.session().await.unwrap();
                for (i, t) in temps.iter().enumerate() {
                    let day = format!("2017-01-{:02}", i + 1);
                    session
                        .insert_measurement(&observation("X", &day, None, *t))
                        .await
                        .unwrap();
                }
                session
                    .temperature_stats(date("2017-01-01"), date("2017-01-31"))
                    .await
                    .unwrap()
            });

            let (min, max, avg) = (stats.min.unwrap(), stats.max.unwrap(), stats.avg.unwrap());
            prop_assert!(min <= avg && avg <= max);
            prop_assert_eq!(min, temps.iter().cloned().fold(f64::INFINITY, f64::min));
            prop_assert_eq!(max, temps.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
        }
    }
}
