//! Unit tests for st-trips.

#[cfg(test)]
mod table {
    use st_core::NodeId;
    use crate::Trips;

    #[test]
    fn empty_table() {
        let t = Trips::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert_eq!(t.origins().count(), 0);
        assert!(t.goals(NodeId(1)).is_empty());
    }

    #[test]
    fn groups_goals_by_origin() {
        let mut t = Trips::new();
        t.push(NodeId(5), NodeId(9));
        t.push(NodeId(2), NodeId(7));
        t.push(NodeId(5), NodeId(9));
        t.push(NodeId(5), NodeId(3));

        assert_eq!(t.len(), 4);
        assert_eq!(t.origin_count(), 2);
        assert_eq!(t.goals(NodeId(5)), &[NodeId(9), NodeId(9), NodeId(3)]);
        assert_eq!(t.goals(NodeId(2)), &[NodeId(7)]);
    }

    #[test]
    fn origins_iterate_ascending() {
        let t: Trips = [(NodeId(30), NodeId(1)), (NodeId(-4), NodeId(1)), (NodeId(7), NodeId(1))]
            .into_iter()
            .collect();
        let origins: Vec<NodeId> = t.origins().collect();
        assert_eq!(origins, vec![NodeId(-4), NodeId(7), NodeId(30)]);
        let from_iter: Vec<NodeId> = t.iter().map(|(o, _)| o).collect();
        assert_eq!(from_iter, origins);
    }
}

#[cfg(test)]
mod generate {
    use st_core::{NodeId, SimRng};
    use crate::{TripError, generate_trips};

    fn ids(v: &[i64]) -> Vec<NodeId> {
        v.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn one_trip_per_resident() {
        let mut rng = SimRng::new(1);
        let trips = generate_trips(50, &ids(&[1, 2, 3]), &ids(&[10, 11]), &mut rng).unwrap();
        assert_eq!(trips.len(), 50);
        let total: usize = trips.iter().map(|(_, g)| g.len()).sum();
        assert_eq!(total, 50);
    }

    #[test]
    fn draws_only_from_candidates() {
        let origins = ids(&[1, 2, 3]);
        let goals = ids(&[10, 11]);
        let mut rng = SimRng::new(2);
        let trips = generate_trips(200, &origins, &goals, &mut rng).unwrap();
        for (origin, gs) in trips.iter() {
            assert!(origins.contains(&origin));
            assert!(gs.iter().all(|g| goals.contains(g)));
        }
        // 200 draws over 3 origins hit every one of them.
        assert_eq!(trips.origin_count(), 3);
    }

    #[test]
    fn same_seed_same_table() {
        let origins = ids(&[1, 2, 3, 4, 5]);
        let goals = ids(&[6, 7, 8]);
        let a = generate_trips(40, &origins, &goals, &mut SimRng::new(9)).unwrap();
        let b = generate_trips(40, &origins, &goals, &mut SimRng::new(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_candidates_error() {
        let mut rng = SimRng::new(0);
        assert!(matches!(
            generate_trips(5, &[], &ids(&[1]), &mut rng),
            Err(TripError::NoCandidates("origin"))
        ));
        assert!(matches!(
            generate_trips(5, &ids(&[1]), &[], &mut rng),
            Err(TripError::NoCandidates("goal"))
        ));
        // Nothing to draw, nothing to fail.
        assert!(generate_trips(0, &[], &[], &mut rng).unwrap().is_empty());
    }
}
