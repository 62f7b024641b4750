//! Integration tests for st-output.

#[cfg(test)]
mod helpers {
    use st_core::{NodeId, TrafficConfig};
    use st_network::StreetGraph;
    use st_trips::Trips;

    /// 3 × 3 grid with two-way 100 m streets; 9 nodes, 24 streets.
    pub fn grid() -> StreetGraph {
        let mut g = StreetGraph::new();
        let id = |r: i64, c: i64| NodeId(r * 3 + c + 1);
        for r in 0..3 {
            for c in 0..3 {
                g.add_node(id(r, c), 10.0 + c as f64 * 0.001, 53.0 + r as f64 * 0.001).unwrap();
            }
        }
        for r in 0..3 {
            for c in 0..3 {
                if c < 2 {
                    g.add_street(id(r, c), id(r, c + 1), 100.0, 50.0, 1.0).unwrap();
                    g.add_street(id(r, c + 1), id(r, c), 100.0, 50.0, 1.0).unwrap();
                }
                if r < 2 {
                    g.add_street(id(r, c), id(r + 1, c), 100.0, 50.0, 1.0).unwrap();
                    g.add_street(id(r + 1, c), id(r, c), 100.0, 50.0, 1.0).unwrap();
                }
            }
        }
        g
    }

    /// Every node to every other node.
    pub fn all_pairs() -> Trips {
        (1..=9)
            .flat_map(|o| (1..=9).filter(move |g| *g != o).map(move |g| (NodeId(o), NodeId(g))))
            .collect()
    }

    pub fn config() -> TrafficConfig {
        TrafficConfig {
            jam_tolerance:              Some(0.3),
            max_simulation_steps:       5,
            steps_between_construction: 2,
            output_interval_steps:      2,
            ..TrafficConfig::default()
        }
    }
}

// ── CSV writer ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{NodeRow, StepSummaryRow, TrafficLoadRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        for f in ["nodes.csv", "street_snapshots.csv", "traffic_load.csv", "step_summaries.csv"] {
            assert!(dir.path().join(f).exists(), "{f} missing");
        }
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tmp();
        let nested = dir.path().join("run").join("1");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join("nodes.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(dir.path().join("nodes.csv")), ["node", "lon", "lat"]);
        assert_eq!(
            headers(dir.path().join("street_snapshots.csv")),
            ["step", "street", "origin", "destination", "length", "max_speed", "lanes"]
        );
        assert_eq!(
            headers(dir.path().join("traffic_load.csv")),
            ["step", "street", "load", "ideal_speed", "actual_speed"]
        );
        assert_eq!(
            headers(dir.path().join("step_summaries.csv")),
            [
                "step",
                "origins_processed",
                "trips_assigned",
                "trips_unreachable",
                "trips_skipped",
                "total_load",
                "load_saved",
            ]
        );
    }

    #[test]
    fn csv_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_nodes(&[NodeRow { node: -7, lon: 10.5, lat: 53.25 }]).unwrap();
        w.write_load(&[
            TrafficLoadRow { step: 2, street: 0, load: 4, ideal_speed: 50.0, actual_speed: 22.5 },
            TrafficLoadRow { step: 2, street: 5, load: 1, ideal_speed: 30.0, actual_speed: 30.0 },
        ])
        .unwrap();
        w.write_step_summary(&StepSummaryRow {
            step:              2,
            origins_processed: 3,
            trips_assigned:    4,
            trips_unreachable: 1,
            trips_skipped:     0,
            total_load:        5,
            load_saved:        true,
        })
        .unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("nodes.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "-7");
        assert_eq!(&rows[0][2], "53.25");

        let mut rdr = csv::Reader::from_path(dir.path().join("traffic_load.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!((&rows[1][0], &rows[1][1], &rows[1][2]), ("2", "5", "1"));
        assert_eq!(&rows[0][4], "22.5");

        let mut rdr = csv::Reader::from_path(dir.path().join("step_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][5], "5");
        assert_eq!(&rows[0][6], "true");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap(); // second call should not panic
    }

    #[test]
    fn csv_empty_batches_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_load(&[]).unwrap();
        w.write_streets(&[]).unwrap();
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use std::collections::BTreeSet;

    use tempfile::TempDir;

    use st_core::StreetId;
    use st_network::Street;
    use st_sim::{Simulator, SpeedModel, TrafficLoad};

    use super::helpers;
    use crate::observer::{load_rows, snapshot_rows};
    use crate::row::{NodeRow, StepSummaryRow, StreetSnapshotRow, TrafficLoadRow};
    use crate::writer::OutputWriter;
    use crate::{CsvWriter, OutputError, OutputResult, SimOutputObserver};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn load_rows_skip_zero() {
        let mut load = TrafficLoad::new(4);
        load.add(StreetId(2), 7).unwrap();
        let g = helpers::grid();
        let streets: Vec<Street> = g.streets().cloned().collect();
        let model = SpeedModel::default();

        let rows = load_rows(9, &load, &streets, &model);
        assert_eq!(rows.len(), 1);
        let row = rows[0];
        assert_eq!((row.step, row.street, row.load), (9, 2, 7));
        // 100 m / 50 km/h / 1 lane: free flow reaches the limit.
        assert_eq!(row.ideal_speed, 50.0);
        assert_eq!(row.actual_speed, model.driving_speed(100.0, 50.0, 7, 1.0));
        assert!(row.actual_speed < row.ideal_speed);

        // A load on a street the network does not have is not reported.
        assert!(load_rows(9, &load, &streets[..2], &model).is_empty());
    }

    #[test]
    fn snapshot_covers_every_street() {
        let g = helpers::grid();
        let rows = snapshot_rows(0, &g);
        assert_eq!(rows.len(), 24);
        assert!(rows.iter().enumerate().all(|(i, r)| r.street == i as u32));
        assert_eq!(rows[0].origin, 1);
        assert_eq!(rows[0].destination, 2);
    }

    #[test]
    fn integration_csv() {
        let config = helpers::config();
        let mut sim = Simulator::new(helpers::grid(), helpers::all_pairs(), config.clone()).unwrap();

        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer, &config);
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = csv::Reader::from_path(dir.path().join("nodes.csv")).unwrap();
        assert_eq!(rdr.records().count(), 9);

        // Snapshot at start (0) and after the constructions before steps 3 and 5.
        let mut rdr = csv::Reader::from_path(dir.path().join("street_snapshots.csv")).unwrap();
        let snaps: Vec<StreetSnapshotRow> = rdr.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(snaps.len(), 3 * 24);
        let steps: BTreeSet<u64> = snaps.iter().map(|r| r.step).collect();
        assert_eq!(steps.into_iter().collect::<Vec<_>>(), vec![0, 3, 5]);

        // output_interval = 2 → loads of steps 2 and 4 only.
        let mut rdr = csv::Reader::from_path(dir.path().join("traffic_load.csv")).unwrap();
        let loads: Vec<TrafficLoadRow> = rdr.deserialize().map(|r| r.unwrap()).collect();
        let steps: BTreeSet<u64> = loads.iter().map(|r| r.step).collect();
        assert_eq!(steps.into_iter().collect::<Vec<_>>(), vec![2, 4]);
        assert!(loads.iter().all(|r| r.load > 0));
        assert!(loads.iter().all(|r| r.actual_speed <= r.ideal_speed));

        // Step 4 ran on the snapshot labelled 3.
        let model = SpeedModel::new(&config);
        for r in loads.iter().filter(|r| r.step == 4) {
            let s = snaps.iter().find(|s| s.step == 3 && s.street == r.street).unwrap();
            assert_eq!(r.ideal_speed, model.driving_speed(s.length, s.max_speed, 0, s.lanes));
            assert_eq!(r.actual_speed, model.driving_speed(s.length, s.max_speed, r.load, s.lanes));
        }

        let mut rdr = csv::Reader::from_path(dir.path().join("step_summaries.csv")).unwrap();
        let summaries: Vec<StepSummaryRow> = rdr.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(summaries.len(), 5);
        assert!(summaries.iter().all(|s| s.trips_assigned == 72));
        let saved: Vec<u64> = summaries.iter().filter(|s| s.load_saved).map(|s| s.step).collect();
        assert_eq!(saved, vec![2, 4]);
    }

    /// Writer whose load writes always fail.
    struct FailingLoad {
        calls: usize,
    }

    impl OutputWriter for FailingLoad {
        fn write_nodes(&mut self, _rows: &[NodeRow]) -> OutputResult<()> {
            Ok(())
        }
        fn write_streets(&mut self, _rows: &[StreetSnapshotRow]) -> OutputResult<()> {
            Ok(())
        }
        fn write_load(&mut self, _rows: &[TrafficLoadRow]) -> OutputResult<()> {
            self.calls += 1;
            Err(OutputError::Format(format!("load write {} failed", self.calls)))
        }
        fn write_step_summary(&mut self, _row: &StepSummaryRow) -> OutputResult<()> {
            Ok(())
        }
        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn first_error_kept() {
        let config = helpers::config();
        let mut sim = Simulator::new(helpers::grid(), helpers::all_pairs(), config.clone()).unwrap();
        let mut obs = SimOutputObserver::new(FailingLoad { calls: 0 }, &config);
        sim.run(&mut obs).unwrap();

        match obs.take_error() {
            Some(OutputError::Format(msg)) => assert_eq!(msg, "load write 1 failed"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().calls, 2);
    }
}

// ── Checkpoint reading ────────────────────────────────────────────────────────

#[cfg(test)]
mod reader_tests {
    use tempfile::TempDir;

    use st_core::NodeId;
    use st_sim::{NoopObserver, Simulator};

    use super::helpers;
    use crate::row::{NodeRow, StepSummaryRow, StreetSnapshotRow, TrafficLoadRow};
    use crate::writer::OutputWriter;
    use crate::{CsvWriter, OutputError, SimOutputObserver, read_network, read_traffic_load};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn street_row(step: u64, street: u32, origin: i64, destination: i64, max_speed: f64) -> StreetSnapshotRow {
        StreetSnapshotRow { step, street, origin, destination, length: 50.0, max_speed, lanes: 1.0 }
    }

    fn summary_row(step: u64, total_load: u64, load_saved: bool) -> StepSummaryRow {
        StepSummaryRow {
            step,
            origins_processed: 1,
            trips_assigned:    1,
            trips_unreachable: 0,
            trips_skipped:     0,
            total_load,
            load_saved,
        }
    }

    fn two_node_dir() -> TempDir {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_nodes(&[
            NodeRow { node: 1, lon: 0.0, lat: 0.0 },
            NodeRow { node: 2, lon: 0.0, lat: 0.001 },
        ])
        .unwrap();
        w.write_streets(&[street_row(0, 0, 1, 2, 50.0), street_row(0, 1, 2, 1, 50.0)]).unwrap();
        w.write_streets(&[street_row(3, 0, 1, 2, 30.0), street_row(3, 1, 2, 1, 70.0)]).unwrap();
        w.write_step_summary(&summary_row(1, 6, false)).unwrap();
        w.write_step_summary(&summary_row(2, 6, true)).unwrap();
        w.write_step_summary(&summary_row(3, 0, true)).unwrap();
        w.write_load(&[TrafficLoadRow { step: 2, street: 1, load: 6, ideal_speed: 50.0, actual_speed: 9.0 }])
            .unwrap();
        w.finish().unwrap();
        dir
    }

    #[test]
    fn picks_latest_snapshot_at_or_before_step() {
        let dir = two_node_dir();

        let g = read_network(dir.path(), 2).unwrap();
        assert_eq!(g.street_count(), 2);
        assert_eq!(g.streets().map(|s| s.max_speed_kmh).collect::<Vec<_>>(), vec![50.0, 50.0]);

        let g = read_network(dir.path(), 3).unwrap();
        assert_eq!(g.streets().map(|s| s.max_speed_kmh).collect::<Vec<_>>(), vec![30.0, 70.0]);
        assert_eq!(g.street_index_of(NodeId(2), NodeId(1)).map(|s| s.0), Some(1));
        assert_eq!(g.node(NodeId(2)).unwrap().pos.lat, 0.001);
    }

    #[test]
    fn missing_snapshot_errors() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_nodes(&[NodeRow { node: 1, lon: 0.0, lat: 0.0 }, NodeRow { node: 2, lon: 1.0, lat: 0.0 }])
            .unwrap();
        w.write_streets(&[street_row(4, 0, 1, 2, 50.0)]).unwrap();
        w.finish().unwrap();

        assert!(matches!(read_network(dir.path(), 3), Err(OutputError::MissingSnapshot(3))));
        assert!(read_network(dir.path(), 4).is_ok());
    }

    #[test]
    fn traffic_load_read_back() {
        let dir = two_node_dir();
        assert_eq!(read_traffic_load(dir.path(), 2, 2).unwrap(), vec![0, 6]);
        // Saved with no traffic at all.
        assert_eq!(read_traffic_load(dir.path(), 3, 2).unwrap(), vec![0, 0]);
        assert!(matches!(read_traffic_load(dir.path(), 2, 1), Err(OutputError::Format(_))));
    }

    #[test]
    fn unsaved_load_is_an_error() {
        let dir = two_node_dir();
        // Step 1 ran but its load was not written; step 9 never ran.
        assert!(matches!(read_traffic_load(dir.path(), 1, 2), Err(OutputError::MissingLoad(1))));
        assert!(matches!(read_traffic_load(dir.path(), 9, 2), Err(OutputError::MissingLoad(9))));
    }

    #[test]
    fn resume_refuses_step_between_output_intervals() {
        let config = helpers::config();
        let dir = tmp();
        let mut sim = Simulator::new(helpers::grid(), helpers::all_pairs(), config.clone()).unwrap();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap(), &config);
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());

        // Loads are saved every second step; step 3 cannot be restored.
        let graph = read_network(dir.path(), 3).unwrap();
        let result = read_traffic_load(dir.path(), 3, graph.street_count());
        assert!(matches!(result, Err(OutputError::MissingLoad(3))));
    }

    #[test]
    fn missing_files_error() {
        let dir = tmp();
        assert!(matches!(read_network(dir.path(), 0), Err(OutputError::Io(_))));
    }

    #[test]
    fn resumed_run_matches_uninterrupted_run() {
        let config = helpers::config();

        let dir = tmp();
        let mut straight = Simulator::new(helpers::grid(), helpers::all_pairs(), config.clone()).unwrap();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap(), &config);
        straight.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());

        // Continue after step 4: construction before step 5 is re-applied.
        let graph = read_network(dir.path(), 4).unwrap();
        let load = read_traffic_load(dir.path(), 4, graph.street_count()).unwrap();
        let mut resumed = Simulator::resume(graph, helpers::all_pairs(), config, 4, load).unwrap();
        resumed.run(&mut NoopObserver).unwrap();

        assert_eq!(resumed.step_count(), 5);
        assert_eq!(resumed.load(), straight.load());
        let speeds = |s: &Simulator| s.graph().streets().map(|st| st.max_speed_kmh).collect::<Vec<_>>();
        assert_eq!(speeds(&resumed), speeds(&straight));
    }
}
