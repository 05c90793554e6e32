//! Dependency-graph validation: acyclicity and registry coverage.
//!
//! The validator classifies already-parsed data. It never fails on input;
//! every problem it finds becomes a [`Violation`], and all violations of one
//! run are returned together.

use crate::config::ValidatorConfig;
use crate::error::ConfigError;
use crate::graph::{Edge, EdgeRow, Graph};
use crate::identifier::IdentifierRule;
use crate::registry::Registry;
use crate::report::{CheckReport, DigestBuilder, Finding};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const GRAPH_CHECK_KIND: &str = "claimcheck.graph.check.v1";

pub const FAILURE_CLASS_CYCLE: &str = "graph.cycle";
pub const FAILURE_CLASS_UNDECLARED_NODE: &str = "graph.node.undeclared";
pub const FAILURE_CLASS_MALFORMED_IDENTIFIER: &str = "graph.identifier.malformed";
pub const FAILURE_CLASS_UNKNOWN_REFERENCE: &str = "graph.reference.unknown";
pub const FAILURE_CLASS_MISSING_REFERENCE: &str = "graph.reference.missing";
pub const FAILURE_CLASS_UNCOVERED_CLAIM: &str = "graph.claim.uncovered";

/// Which end of an edge a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Source,
    Target,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Source => "source",
            Endpoint::Target => "target",
        }
    }
}

/// A single graph-validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Kahn's algorithm could not retire these nodes.
    Cycle { unresolved: Vec<String> },
    UndeclaredNode { node: String },
    MalformedIdentifier {
        row: Option<usize>,
        edge: Edge,
        endpoint: Endpoint,
    },
    UnknownReference { row: usize, reference: String },
    MissingReference { row: usize },
    /// Registry entry never mentioned by the graph.
    UncoveredClaim { id: String },
}

impl Violation {
    pub fn class(&self) -> &'static str {
        match self {
            Violation::Cycle { .. } => FAILURE_CLASS_CYCLE,
            Violation::UndeclaredNode { .. } => FAILURE_CLASS_UNDECLARED_NODE,
            Violation::MalformedIdentifier { .. } => FAILURE_CLASS_MALFORMED_IDENTIFIER,
            Violation::UnknownReference { .. } => FAILURE_CLASS_UNKNOWN_REFERENCE,
            Violation::MissingReference { .. } => FAILURE_CLASS_MISSING_REFERENCE,
            Violation::UncoveredClaim { .. } => FAILURE_CLASS_UNCOVERED_CLAIM,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Violation::Cycle { .. } => "graph".to_string(),
            Violation::UndeclaredNode { node } => node.clone(),
            Violation::MalformedIdentifier { edge, endpoint, .. } => match endpoint {
                Endpoint::Source => edge.source.clone(),
                Endpoint::Target => edge.target.clone(),
            },
            Violation::UnknownReference { reference, .. } => reference.clone(),
            Violation::MissingReference { row } => format!("row {row}"),
            Violation::UncoveredClaim { id } => id.clone(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Violation::Cycle { unresolved } => format!(
                "cycle detected; {} node(s) never reached in-degree zero: {}",
                unresolved.len(),
                unresolved.join(", ")
            ),
            Violation::UndeclaredNode { node } => {
                format!("node not declared in claims registry: {node}")
            }
            Violation::MalformedIdentifier {
                row,
                edge,
                endpoint,
            } => {
                let value = match endpoint {
                    Endpoint::Source => &edge.source,
                    Endpoint::Target => &edge.target,
                };
                let location = match row {
                    Some(row) => format!("row {row}: "),
                    None => String::new(),
                };
                format!(
                    "{location}edge {} -> {}: {} {value:?} does not match identifier format",
                    edge.source,
                    edge.target,
                    endpoint.as_str()
                )
            }
            Violation::UnknownReference { row, reference } => {
                format!("row {row}: reference {reference:?} not declared in claims registry")
            }
            Violation::MissingReference { row } => format!("row {row}: reference is empty"),
            Violation::UncoveredClaim { id } => {
                format!("registered claim does not appear in graph: {id}")
            }
        }
    }

    pub fn finding(&self) -> Finding {
        Finding::new(self.subject(), self.class(), self.message())
    }
}

/// Result of the Kahn pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcyclicityReport {
    pub node_count: usize,
    /// Retirement order; a topological order when the graph is acyclic.
    pub visited: Vec<String>,
    /// Sorted nodes never retired. Non-empty exactly when a cycle exists.
    pub unresolved: Vec<String>,
}

impl AcyclicityReport {
    pub fn acyclic(&self) -> bool {
        self.visited.len() == self.node_count
    }
}

/// Kahn's algorithm over the deduplicated edge set.
///
/// Among several ready nodes the lexicographically smallest is retired first,
/// so `visited` is stable across runs.
pub fn check_acyclic(graph: &Graph) -> AcyclicityReport {
    let adjacency = graph.adjacency();
    let mut in_degree: BTreeMap<&str, usize> = graph.nodes().map(|node| (node, 0)).collect();
    for edge in graph.edges() {
        *in_degree.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(&node, _)| node)
        .collect();
    let mut visited: Vec<String> = Vec::with_capacity(in_degree.len());

    while let Some(node) = ready.pop_first() {
        visited.push(node.to_string());
        for &successor in adjacency.get(node).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(successor)
                && *degree > 0
            {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(successor);
                }
            }
        }
    }

    let retired: BTreeSet<&str> = visited.iter().map(String::as_str).collect();
    let unresolved = graph
        .nodes()
        .filter(|node| !retired.contains(node))
        .map(str::to_string)
        .collect();

    AcyclicityReport {
        node_count: in_degree.len(),
        visited,
        unresolved,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub row_count: usize,
    pub registry_count: usize,
    pub violation_count: usize,
    pub acyclic: bool,
    pub strict: bool,
}

/// Full outcome of [`GraphValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReport {
    #[serde(flatten)]
    pub check: CheckReport,
    pub summary: GraphSummary,
    pub topological_order: Vec<String>,
    pub input_digest: String,
    #[serde(skip)]
    pub violations: Vec<Violation>,
}

impl GraphReport {
    pub fn accepted(&self) -> bool {
        self.check.accepted()
    }
}

/// Validates claim dependency graphs against a registry.
#[derive(Debug, Clone)]
pub struct GraphValidator {
    rule: IdentifierRule,
    strict: bool,
    require_full_coverage: bool,
}

impl Default for GraphValidator {
    fn default() -> Self {
        Self {
            rule: IdentifierRule::default(),
            strict: false,
            require_full_coverage: false,
        }
    }
}

impl GraphValidator {
    pub fn new(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            rule: config.identifier_rule()?,
            strict: config.strict,
            require_full_coverage: config.require_full_coverage,
        })
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn identifier_rule(&self) -> &IdentifierRule {
        &self.rule
    }

    pub fn check_acyclic(&self, graph: &Graph) -> AcyclicityReport {
        check_acyclic(graph)
    }

    /// Registry-coverage findings, in a fixed order: undeclared nodes (sorted),
    /// identifier-format findings (edge order), reference findings (row order),
    /// then uncovered claims (sorted).
    ///
    /// Format checks run only when `strict`; they walk `rows` when the graph
    /// came from a table, otherwise the graph's own edges.
    pub fn check_coverage(
        &self,
        graph: &Graph,
        registry: &Registry,
        rows: &[EdgeRow],
        strict: bool,
    ) -> Vec<Violation> {
        let mut violations: Vec<Violation> = graph
            .nodes()
            .filter(|node| !registry.contains(node))
            .map(|node| Violation::UndeclaredNode {
                node: node.to_string(),
            })
            .collect();

        if strict {
            if rows.is_empty() {
                for edge in graph.edges() {
                    self.check_edge_format(None, edge, &mut violations);
                }
            } else {
                for row in rows {
                    self.check_edge_format(Some(row.row), &row.edge(), &mut violations);
                }
            }
        }

        for row in rows {
            match row.reference.as_deref() {
                None => {}
                Some("") => violations.push(Violation::MissingReference { row: row.row }),
                Some(reference) if !registry.contains(reference) => {
                    violations.push(Violation::UnknownReference {
                        row: row.row,
                        reference: reference.to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        if self.require_full_coverage {
            let referenced: BTreeSet<&str> = rows
                .iter()
                .filter_map(|row| row.reference.as_deref())
                .collect();
            violations.extend(
                registry
                    .iter()
                    .filter(|id| !graph.contains_node(id) && !referenced.contains(id))
                    .map(|id| Violation::UncoveredClaim { id: id.to_string() }),
            );
        }

        violations
    }

    fn check_edge_format(&self, row: Option<usize>, edge: &Edge, out: &mut Vec<Violation>) {
        for endpoint in [Endpoint::Source, Endpoint::Target] {
            let value = match endpoint {
                Endpoint::Source => &edge.source,
                Endpoint::Target => &edge.target,
            };
            if !self.rule.matches(value) {
                out.push(Violation::MalformedIdentifier {
                    row,
                    edge: edge.clone(),
                    endpoint,
                });
            }
        }
    }

    /// Run both checks and assemble one report.
    pub fn validate(&self, graph: &Graph, registry: &Registry, rows: &[EdgeRow]) -> GraphReport {
        let acyclicity = self.check_acyclic(graph);
        let mut violations = Vec::new();
        if !acyclicity.acyclic() {
            violations.push(Violation::Cycle {
                unresolved: acyclicity.unresolved.clone(),
            });
        }
        violations.extend(self.check_coverage(graph, registry, rows, self.strict));

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            acyclic = acyclicity.acyclic(),
            violations = violations.len(),
            "graph validated"
        );

        let errors = violations.iter().map(Violation::finding).collect::<Vec<_>>();
        let summary = GraphSummary {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            row_count: rows.len(),
            registry_count: registry.len(),
            violation_count: violations.len(),
            acyclic: acyclicity.acyclic(),
            strict: self.strict,
        };
        let topological_order = if acyclicity.acyclic() {
            acyclicity.visited
        } else {
            Vec::new()
        };

        GraphReport {
            check: CheckReport::new(GRAPH_CHECK_KIND, errors, Vec::new()),
            summary,
            topological_order,
            input_digest: input_digest(graph, registry, rows, self.strict),
            violations,
        }
    }
}

/// Digest of everything that determines a validation outcome.
pub fn input_digest(graph: &Graph, registry: &Registry, rows: &[EdgeRow], strict: bool) -> String {
    let mut builder = DigestBuilder::new().field("strict", if strict { "true" } else { "false" });
    for node in graph.nodes() {
        builder = builder.field("node", node);
    }
    for edge in graph.edges() {
        builder = builder.field("edge", &format!("{}\u{0}{}", edge.source, edge.target));
    }
    for row in rows {
        builder = builder.field(
            "row",
            &format!(
                "{}\u{0}{}\u{0}{}\u{0}{}",
                row.row,
                row.from,
                row.to,
                row.reference.as_deref().unwrap_or("\u{1}")
            ),
        );
    }
    for id in registry.iter() {
        builder = builder.field("registry", id);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> Graph {
        Graph::from_edges(edges.iter().map(|(s, t)| Edge::new(*s, *t)))
    }

    fn row(n: usize, from: &str, to: &str, reference: Option<&str>) -> EdgeRow {
        EdgeRow {
            row: n,
            from: from.to_string(),
            to: to.to_string(),
            reference: reference.map(str::to_string),
        }
    }

    #[test]
    fn chain_is_acyclic_and_visits_every_node() {
        let g = graph(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let report = check_acyclic(&g);
        assert!(report.acyclic());
        assert_eq!(report.visited.len(), g.node_count());
        assert_eq!(report.visited, vec!["A", "B", "C", "D"]);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn triangle_is_cyclic() {
        let g = graph(&[("A", "B"), ("B", "C"), ("C", "A")]);
        let report = check_acyclic(&g);
        assert!(!report.acyclic());
        assert_eq!(report.unresolved, vec!["A", "B", "C"]);
    }

    #[test]
    fn empty_graph_is_acyclic() {
        let report = check_acyclic(&Graph::new());
        assert!(report.acyclic());
        assert_eq!(report.node_count, 0);
    }

    #[test]
    fn self_loop_is_cyclic() {
        let report = check_acyclic(&graph(&[("A", "A")]));
        assert!(!report.acyclic());
        assert_eq!(report.unresolved, vec!["A"]);
    }

    #[test]
    fn duplicate_edges_do_not_fake_a_cycle() {
        let mut g = graph(&[("A", "B")]);
        g.add_edge(Edge::new("A", "B"));
        let report = check_acyclic(&g);
        assert!(report.acyclic());
        assert_eq!(report.visited, vec!["A", "B"]);
    }

    #[test]
    fn cycle_downstream_nodes_stay_unresolved() {
        let g = graph(&[("Root", "A"), ("A", "B"), ("B", "A"), ("B", "Leaf")]);
        let report = check_acyclic(&g);
        assert_eq!(report.visited, vec!["Root"]);
        assert_eq!(report.unresolved, vec!["A", "B", "Leaf"]);
    }

    #[test]
    fn undeclared_node_reported_once() {
        let g = graph(&[("A", "B"), ("B", "C")]);
        let registry = Registry::from_ids(["A", "B"]);
        let violations = GraphValidator::default().check_coverage(&g, &registry, &[], false);
        assert_eq!(
            violations,
            vec![Violation::UndeclaredNode {
                node: "C".to_string()
            }]
        );
    }

    #[test]
    fn strict_format_ignores_registry_membership() {
        let g = graph(&[("foo", "Psi.Budget")]);
        let registry = Registry::from_ids(["foo", "Psi.Budget"]);
        let validator = GraphValidator::default();

        assert!(validator.check_coverage(&g, &registry, &[], false).is_empty());
        let strict = validator.check_coverage(&g, &registry, &[], true);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].class(), FAILURE_CLASS_MALFORMED_IDENTIFIER);
        assert_eq!(strict[0].subject(), "foo");
    }

    #[test]
    fn strict_format_is_reported_per_row() {
        let rows = vec![
            row(1, "bad", "Psi.A", None),
            row(2, "bad", "Psi.B", None),
        ];
        let g = Graph::from_edges(rows.iter().map(EdgeRow::edge));
        let registry = Registry::from_ids(["bad", "Psi.A", "Psi.B"]);
        let violations = GraphValidator::default().check_coverage(&g, &registry, &rows, true);
        assert_eq!(violations.len(), 2);
        assert!(
            violations
                .iter()
                .all(|v| v.class() == FAILURE_CLASS_MALFORMED_IDENTIFIER)
        );
    }

    #[test]
    fn references_are_checked_independently_of_endpoints() {
        let rows = vec![
            row(1, "Psi.A", "Psi.B", Some("Psi.A")),
            row(2, "Psi.A", "Psi.B", Some("Lk.Missing")),
            row(3, "Psi.B", "Psi.C", Some("")),
        ];
        let g = Graph::from_edges(rows.iter().map(EdgeRow::edge));
        let registry = Registry::from_ids(["Psi.A", "Psi.B", "Psi.C"]);
        let violations = GraphValidator::default().check_coverage(&g, &registry, &rows, true);
        assert_eq!(
            violations,
            vec![
                Violation::UnknownReference {
                    row: 2,
                    reference: "Lk.Missing".to_string()
                },
                Violation::MissingReference { row: 3 },
            ]
        );
    }

    #[test]
    fn full_coverage_reports_unused_registry_entries() {
        let config = ValidatorConfig {
            require_full_coverage: true,
            ..ValidatorConfig::default()
        };
        let validator = GraphValidator::new(&config).expect("validator should build");
        let g = graph(&[("A", "B")]);
        let registry = Registry::from_ids(["A", "B", "Z"]);
        let violations = validator.check_coverage(&g, &registry, &[], false);
        assert_eq!(
            violations,
            vec![Violation::UncoveredClaim {
                id: "Z".to_string()
            }]
        );
    }

    #[test]
    fn validate_collects_cycle_and_coverage_together() {
        let g = graph(&[("A", "B"), ("B", "A"), ("B", "C")]);
        let registry = Registry::from_ids(["A", "B"]);
        let report = GraphValidator::default().validate(&g, &registry, &[]);
        assert!(!report.accepted());
        assert_eq!(
            report.check.failure_classes,
            vec![FAILURE_CLASS_CYCLE, FAILURE_CLASS_UNDECLARED_NODE]
        );
        assert_eq!(report.summary.violation_count, 2);
        assert!(!report.summary.acyclic);
        assert!(report.topological_order.is_empty());
    }

    #[test]
    fn validate_is_idempotent() {
        let g = graph(&[("A", "B"), ("B", "C")]);
        let registry = Registry::from_ids(["A", "B"]);
        let validator = GraphValidator::default();
        let first = validator.validate(&g, &registry, &[]);
        let second = validator.validate(&g, &registry, &[]);
        assert_eq!(first, second);
        assert_eq!(first.input_digest, second.input_digest);
    }

    #[test]
    fn accepted_report_carries_topological_order() {
        let g = graph(&[("B", "C"), ("A", "B")]);
        let registry = Registry::from_ids(["A", "B", "C"]);
        let report = GraphValidator::default().validate(&g, &registry, &[]);
        assert!(report.accepted());
        assert_eq!(report.topological_order, vec!["A", "B", "C"]);
    }

    #[test]
    fn violation_messages_render() {
        let rendered = [
            Violation::Cycle {
                unresolved: vec!["A".to_string(), "B".to_string()],
            },
            Violation::UndeclaredNode {
                node: "C".to_string(),
            },
            Violation::MalformedIdentifier {
                row: Some(4),
                edge: Edge::new("foo", "Psi.A"),
                endpoint: Endpoint::Source,
            },
        ]
        .iter()
        .map(Violation::message)
        .collect::<Vec<_>>()
        .join("\n");
        insta::assert_snapshot!(rendered, @r#"
        cycle detected; 2 node(s) never reached in-degree zero: A, B
        node not declared in claims registry: C
        row 4: edge foo -> Psi.A: source "foo" does not match identifier format
        "#);
    }
}
