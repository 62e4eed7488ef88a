//! Canonical token reordering: build a [`NormalizationGraph`] over a token
//! stream, then topologically walk it back into a flat stream.

pub mod graph;

pub use graph::{EdgeLabel, EdgeType, NormalizationGraph, TokenLine};

use crate::error::SimilarityError;
use crate::token::Token;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

/// Reorder `tokens` into a canonical form: lines are emitted in a
/// topological walk of their [`NormalizationGraph`] (smallest original line
/// number breaks ties among ready lines), with `VAR_REVERSE_FLOW`-only
/// predecessors treated as non-blocking. Tokens keep their original
/// intra-line order.
///
/// Errors if the graph's hard-edge subgraph (everything but
/// `VAR_REVERSE_FLOW`) contains a cycle, a contract violation by whatever
/// produced the semantics annotation, not something this walk can resolve.
pub fn normalize(tokens: &[Token]) -> Result<Vec<Token>, SimilarityError> {
    let ng = NormalizationGraph::build(tokens);
    let order = topological_order(&ng)?;
    let mut out = Vec::with_capacity(tokens.len());
    for idx in order {
        out.extend(ng.line(idx).tokens.iter().cloned());
    }
    Ok(out)
}

fn topological_order(ng: &NormalizationGraph) -> Result<Vec<NodeIndex>, SimilarityError> {
    let n = ng.node_count();
    let mut hard_indegree = vec![0usize; n];
    for edge in ng.graph.edge_references() {
        if edge.weight().has_any_hard_type() {
            hard_indegree[edge.target().index()] += 1;
        }
    }

    let mut emitted = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for _ in 0..n {
        let mut chosen: Option<NodeIndex> = None;
        let mut chosen_line = u32::MAX;
        for i in 0..n {
            if emitted[i] || hard_indegree[i] != 0 {
                continue;
            }
            let idx = NodeIndex::new(i);
            let line = ng.line(idx).line;
            if line < chosen_line {
                chosen_line = line;
                chosen = Some(idx);
            }
        }

        let Some(chosen) = chosen else {
            let stuck = n - order.len();
            return Err(SimilarityError::NormalizationCycle(format!(
                "{stuck} of {n} lines still blocked by hard edges with no ready node left"
            )));
        };

        emitted[chosen.index()] = true;
        order.push(chosen);
        for edge in ng.graph.edges(chosen) {
            if edge.weight().has_any_hard_type() {
                hard_indegree[edge.target().index()] -= 1;
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Semantics;
    use smallvec::SmallVec;

    fn token(line: u32, kind: u32, semantics: Semantics) -> Token {
        Token::new(kind, line, 0, 1).with_semantics(semantics)
    }

    fn plain(line: u32, kind: u32) -> Token {
        token(line, kind, Semantics::default())
    }

    #[test]
    fn no_semantics_leaves_order_unchanged() {
        let tokens = vec![plain(1, 10), plain(2, 20), plain(3, 30)];
        let out = normalize(&tokens).unwrap();
        let kinds: Vec<u32> = out.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![10, 20, 30]);
    }

    #[test]
    fn reorders_to_satisfy_a_read_after_write_edge() {
        let v = crate::token::VariableId(1);
        // Source order is read-then-write; the VAR_FLOW edge the graph
        // builds from the write's perspective only fires write -> read, so
        // this input has no dependency forcing a read before its write -
        // use an explicit write-then-read-out-of-position case instead.
        let write = token(
            1,
            1,
            Semantics {
                writes: SmallVec::from_slice(&[v]),
                ..Default::default()
            },
        );
        let unrelated = plain(2, 2);
        let read = token(
            3,
            3,
            Semantics {
                reads: SmallVec::from_slice(&[v]),
                ..Default::default()
            },
        );
        let tokens = vec![unrelated.clone(), write.clone(), read.clone()];
        let out = normalize(&tokens).unwrap();
        let kinds: Vec<u32> = out.iter().map(|t| t.kind).collect();
        // write (kind 1) must precede read (kind 3); unrelated (kind 2) has
        // no constraint and the tie-break (smallest original line) puts it
        // first since it's ready immediately.
        let write_pos = kinds.iter().position(|k| *k == 1).unwrap();
        let read_pos = kinds.iter().position(|k| *k == 3).unwrap();
        assert!(write_pos < read_pos);
        assert_eq!(kinds[0], 2);
    }

    #[test]
    fn var_reverse_flow_only_predecessor_does_not_block_readiness() {
        let v = crate::token::VariableId(5);
        let enter_block_read = token(
            1,
            1,
            Semantics {
                reads: SmallVec::from_slice(&[v]),
                bidirectional_block_depth_change: 1,
                ..Default::default()
            },
        );
        let write_in_block = token(
            2,
            2,
            Semantics {
                writes: SmallVec::from_slice(&[v]),
                ..Default::default()
            },
        );
        // write_in_block's only incoming edge is VAR_REVERSE_FLOW from
        // enter_block_read; it must still be ready as soon as its line
        // number is reachable, i.e. right after enter_block_read.
        let tokens = vec![enter_block_read, write_in_block];
        let out = normalize(&tokens).unwrap();
        let kinds: Vec<u32> = out.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![1, 2]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let v = crate::token::VariableId(2);
        let write = token(
            1,
            1,
            Semantics {
                writes: SmallVec::from_slice(&[v]),
                ..Default::default()
            },
        );
        let unrelated = plain(2, 9);
        let read = token(
            3,
            3,
            Semantics {
                reads: SmallVec::from_slice(&[v]),
                ..Default::default()
            },
        );
        let tokens = vec![unrelated, write, read];
        let once = normalize(&tokens).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn detects_cycle_in_hard_edges_instead_of_deadlocking() {
        // normalize()'s own builder only ever adds edges from
        // already-seen nodes, so it can't produce a cycle from consistent
        // input; exercise the walk directly against a hand-built graph
        // with a mutual VAR_ORDER dependency instead.
        use petgraph::graph::DiGraph;

        let mut g = DiGraph::new();
        let a = g.add_node(TokenLine {
            line: 1,
            tokens: vec![plain(1, 1)],
            semantics: Semantics::default(),
        });
        let b = g.add_node(TokenLine {
            line: 2,
            tokens: vec![plain(2, 2)],
            semantics: Semantics::default(),
        });
        let mut label = EdgeLabel::default();
        label.record(EdgeType::VarOrder, None);
        g.add_edge(a, b, label.clone());
        g.add_edge(b, a, label);

        let ng = NormalizationGraph { graph: g };
        let err = topological_order(&ng).unwrap_err();
        assert!(matches!(err, SimilarityError::NormalizationCycle(_)));
    }

    #[test]
    fn var_reverse_flow_cycle_is_not_a_hard_cycle() {
        // A mutual dependency made entirely of VAR_REVERSE_FLOW edges
        // carries no hard precedence at all, so it must not be reported
        // as a cycle.
        use petgraph::graph::DiGraph;

        let mut g = DiGraph::new();
        let a = g.add_node(TokenLine {
            line: 1,
            tokens: vec![plain(1, 1)],
            semantics: Semantics::default(),
        });
        let b = g.add_node(TokenLine {
            line: 2,
            tokens: vec![plain(2, 2)],
            semantics: Semantics::default(),
        });
        let mut label = EdgeLabel::default();
        label.record(EdgeType::VarReverseFlow, None);
        g.add_edge(a, b, label.clone());
        g.add_edge(b, a, label);

        let ng = NormalizationGraph { graph: g };
        let order = topological_order(&ng).unwrap();
        assert_eq!(order.len(), 2);
    }
}
