// ABOUTME: Integration tests for graph construction and deployment order.
// ABOUTME: Cycles, read-edge checks, conditional inclusion and ordering properties.

mod support;

use proptest::prelude::*;
use stackline::deploy::ProvisioningUnit;
use stackline::diagnostics::WarningKind;
use stackline::facts::Fact;
use stackline::graph::{Edge, GraphBuilder, GraphError, build_graph, topological_order};
use support::{StubUnit, unit_id};

fn edge(dependent: &str, dependency: &str) -> Edge {
    Edge::new(unit_id(dependent), unit_id(dependency))
}

fn ids(units: Vec<&dyn ProvisioningUnit>) -> Vec<String> {
    units.into_iter().map(|u| u.id().to_string()).collect()
}

mod cycles {
    use super::*;

    #[test]
    fn two_unit_cycle_is_rejected() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("a"))
            .add(StubUnit::new("b"))
            .edges([edge("a", "b"), edge("b", "a")])
            .build()
            .unwrap_err();
        match err {
            GraphError::CycleDetected { units } => {
                let names: Vec<&str> = units.iter().map(|u| u.as_str()).collect();
                assert_eq!(names, ["a", "b"]);
            }
            other => panic!("expected a cycle, got {other}"),
        }
    }

    #[test]
    fn self_edge_is_a_cycle() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("a"))
            .edge(edge("a", "a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected { .. }));
    }

    #[test]
    fn units_waiting_behind_a_cycle_are_not_named() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("a"))
            .add(StubUnit::new("b"))
            .add(StubUnit::new("w"))
            .edges([edge("a", "b"), edge("b", "a"), edge("w", "a")])
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "dependency cycle among units: a, b");
    }

    #[test]
    fn cycle_names_only_trapped_units() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("root"))
            .add(StubUnit::new("x"))
            .add(StubUnit::new("y"))
            .add(StubUnit::new("z"))
            .edges([edge("x", "root"), edge("y", "x"), edge("z", "y"), edge("x", "z")])
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "dependency cycle among units: x, y, z"
        );
    }
}

mod reads {
    use super::*;

    #[test]
    fn deferred_read_without_direct_edge_fails_at_build() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("network").writes(Fact::VpcId))
            .add(StubUnit::new("middle"))
            .add(StubUnit::new("storage").deferred(Fact::VpcId))
            .edges([edge("middle", "network"), edge("storage", "middle")])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::DeferredWithoutEdge { fact: Fact::VpcId, .. }
        ));
    }

    #[test]
    fn eager_read_without_any_path_fails_at_build() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("network").writes(Fact::VpcId))
            .add(StubUnit::new("cluster").eager(Fact::VpcId))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::EagerWithoutEdge { .. }));
    }

    #[test]
    fn eager_read_through_another_unit_is_a_warning() {
        let graph = GraphBuilder::new()
            .add(StubUnit::new("network").writes(Fact::VpcId).writes(Fact::VpcCidrBlock))
            .add(StubUnit::new("cluster").writes(Fact::ClusterName))
            .add(
                StubUnit::new("database")
                    .eager(Fact::ClusterName)
                    .eager(Fact::VpcId)
                    .eager(Fact::VpcCidrBlock),
            )
            .edges([edge("cluster", "network"), edge("database", "cluster")])
            .build()
            .unwrap();

        let diag = graph.diagnostics();
        assert_eq!(diag.count(WarningKind::ImplicitOrdering), 1);
        let message = &diag.warnings()[0].message;
        assert!(message.contains("database"));
        assert!(message.contains("Vpc/Id"));
        assert!(message.contains("Vpc/CidrBlock"));
    }

    #[test]
    fn read_with_no_producer_fails() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("cache").eager(Fact::ClusterName))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingProducer { .. }));
    }

    #[test]
    fn two_producers_of_one_fact_fail() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("a").writes(Fact::RedisHost))
            .add(StubUnit::new("b").writes(Fact::RedisHost))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateProducer { .. }));
    }

    #[test]
    fn producer_lookup() {
        let graph = GraphBuilder::new()
            .add(StubUnit::new("network").writes(Fact::VpcId))
            .build()
            .unwrap();
        assert_eq!(graph.producer(Fact::VpcId).map(|u| u.as_str()), Some("network"));
        assert!(graph.producer(Fact::RedisHost).is_none());
    }
}

mod inclusion {
    use super::*;

    fn with_switch(flag: bool, conditional_edge: bool) -> Result<Vec<String>, GraphError> {
        let dependency = if conditional_edge {
            Edge::when(flag, unit_id("database"), unit_id("managed"))
        } else {
            edge("database", "managed")
        };
        let graph = GraphBuilder::new()
            .add(StubUnit::new("network"))
            .include_if(flag, StubUnit::new("managed"), [edge("managed", "network")])
            .add(StubUnit::new("database"))
            .edges([edge("database", "network"), dependency])
            .build()?;
        Ok(ids(graph.order()))
    }

    #[test]
    fn switched_on_unit_is_ordered() {
        assert_eq!(
            with_switch(true, true).unwrap(),
            ["network", "managed", "database"]
        );
    }

    #[test]
    fn switched_off_unit_drops_its_conditional_edges() {
        assert_eq!(with_switch(false, true).unwrap(), ["network", "database"]);
    }

    #[test]
    fn unconditional_edge_to_switched_off_unit_fails() {
        let err = with_switch(false, false).unwrap_err();
        assert!(matches!(err, GraphError::ExcludedDependency { .. }));
    }

    #[test]
    fn edge_to_undeclared_unit_fails() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("a"))
            .edge(edge("a", "ghost"))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownUnit { .. }));
    }

    #[test]
    fn duplicate_unit_fails() {
        let err = GraphBuilder::new()
            .add(StubUnit::new("a"))
            .add(StubUnit::new("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateUnit { .. }));
    }
}

mod ordering {
    use super::*;

    #[test]
    fn ties_follow_declaration_order() {
        let graph = build_graph(
            vec![
                Box::new(StubUnit::new("c")),
                Box::new(StubUnit::new("a")),
                Box::new(StubUnit::new("b")),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(ids(topological_order(&graph)), ["c", "a", "b"]);
    }

    #[test]
    fn dependency_declared_later_still_goes_first() {
        let graph = build_graph(
            vec![
                Box::new(StubUnit::new("app")),
                Box::new(StubUnit::new("db")),
            ],
            vec![edge("app", "db")],
        )
        .unwrap();
        assert_eq!(ids(topological_order(&graph)), ["db", "app"]);
    }

    /// Random DAG: node `i` may only depend on nodes declared before it.
    fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (2usize..10).prop_flat_map(|n| {
            let pairs = proptest::collection::vec((0..n, 0..n), 0..(n * 2));
            (Just(n), pairs).prop_map(|(n, pairs)| {
                let edges = pairs
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| (a.max(b), a.min(b)))
                    .collect();
                (n, edges)
            })
        })
    }

    proptest! {
        #[test]
        fn every_unit_follows_its_dependencies((n, pairs) in dag()) {
            // Reverse declaration so order is not trivially the input order.
            let units: Vec<Box<dyn ProvisioningUnit>> = (0..n)
                .rev()
                .map(|i| Box::new(StubUnit::new(&format!("u{i}"))) as Box<dyn ProvisioningUnit>)
                .collect();
            let edges = pairs
                .iter()
                .map(|(a, b)| edge(&format!("u{a}"), &format!("u{b}")))
                .collect();

            let graph = build_graph(units, edges).unwrap();
            let order = ids(topological_order(&graph));
            prop_assert_eq!(order.len(), n);

            let position = |name: String| order.iter().position(|o| *o == name).unwrap();
            for (a, b) in &pairs {
                let dependency = position(format!("u{b}"));
                let dependent = position(format!("u{a}"));
                prop_assert!(dependency < dependent);
            }
        }

        #[test]
        fn order_is_reproducible((n, pairs) in dag()) {
            let build = || {
                let units: Vec<Box<dyn ProvisioningUnit>> = (0..n)
                    .map(|i| Box::new(StubUnit::new(&format!("u{i}"))) as Box<dyn ProvisioningUnit>)
                    .collect();
                let edges = pairs
                    .iter()
                    .map(|(a, b)| edge(&format!("u{a}"), &format!("u{b}")))
                    .collect();
                ids(topological_order(&build_graph(units, edges).unwrap()))
            };
            prop_assert_eq!(build(), build());
        }
    }
}
