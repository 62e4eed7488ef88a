//! Builds the directed graph of positional and dataflow constraints a
//! [`crate::normalize::Normalizer`] topologically walks.

use crate::token::{Semantics, Token, VariableId};
use fxhash::FxHashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use smallvec::SmallVec;
use std::collections::HashSet;

/// The five relations an edge between two [`TokenLine`]s can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    PositionFull,
    PositionPartial,
    VarFlow,
    VarReverseFlow,
    VarOrder,
}

/// A consecutive run of tokens sharing one source line, with semantics
/// merged by union/sum/disjunction.
#[derive(Debug, Clone)]
pub struct TokenLine {
    /// Original source line number; the normalizer's tie-break key.
    pub line: u32,
    pub tokens: Vec<Token>,
    pub semantics: Semantics,
}

impl TokenLine {
    fn from_run(tokens: Vec<Token>) -> Self {
        let line = tokens[0].line;
        let mut merged = Semantics::default();
        for t in &tokens {
            for r in &t.semantics.reads {
                if !merged.reads.contains(r) {
                    merged.reads.push(*r);
                }
            }
            for w in &t.semantics.writes {
                if !merged.writes.contains(w) {
                    merged.writes.push(*w);
                }
            }
            merged.bidirectional_block_depth_change += t.semantics.bidirectional_block_depth_change;
            merged.has_full_position_significance |= t.semantics.has_full_position_significance;
            merged.has_partial_position_significance |= t.semantics.has_partial_position_significance;
        }
        TokenLine {
            line,
            tokens,
            semantics: merged,
        }
    }
}

/// One logical edge between two `TokenLine`s: the set of [`EdgeType`]s it
/// carries, each with its optional causing [`VariableId`].
#[derive(Debug, Clone, Default)]
pub struct EdgeLabel {
    entries: SmallVec<[(EdgeType, Option<VariableId>); 4]>,
}

impl EdgeLabel {
    pub(crate) fn record(&mut self, ty: EdgeType, causing: Option<VariableId>) {
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == ty) {
            entry.1 = causing;
        } else {
            self.entries.push((ty, causing));
        }
    }

    pub fn has(&self, ty: EdgeType) -> bool {
        self.entries.iter().any(|(t, _)| *t == ty)
    }

    pub fn causing(&self, ty: EdgeType) -> Option<VariableId> {
        self.entries.iter().find(|(t, _)| *t == ty).and_then(|(_, v)| *v)
    }

    pub fn types(&self) -> impl Iterator<Item = EdgeType> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Every edge type on this label except [`EdgeType::VarReverseFlow`].
    pub fn has_any_hard_type(&self) -> bool {
        self.entries.iter().any(|(t, _)| *t != EdgeType::VarReverseFlow)
    }
}

/// The graph built by [`NormalizationGraph::build`]: one node per
/// [`TokenLine`], edges per the positional/dataflow rules below.
pub struct NormalizationGraph {
    pub(crate) graph: DiGraph<TokenLine, EdgeLabel>,
}

impl NormalizationGraph {
    pub fn build(tokens: &[Token]) -> Self {
        let lines = group_into_lines(tokens);
        let mut graph = DiGraph::with_capacity(lines.len(), lines.len());
        let node_ids: Vec<NodeIndex> = lines.into_iter().map(|l| graph.add_node(l)).collect();

        let mut depth: i32 = 0;
        let mut in_block: HashSet<usize> = HashSet::new();
        let mut pending_full: Vec<usize> = Vec::new();
        let mut last_full: Option<usize> = None;
        let mut last_partial: Option<usize> = None;
        let mut reads_of: FxHashMap<VariableId, Vec<usize>> = FxHashMap::default();
        let mut writes_of: FxHashMap<VariableId, Vec<usize>> = FxHashMap::default();

        let add_edge = |graph: &mut DiGraph<TokenLine, EdgeLabel>,
                         from: usize,
                         to: usize,
                         ty: EdgeType,
                         causing: Option<VariableId>| {
            let (a, b) = (node_ids[from], node_ids[to]);
            let existing: Option<EdgeIndex> = graph.find_edge(a, b);
            match existing {
                Some(e) => graph[e].record(ty, causing),
                None => {
                    let mut label = EdgeLabel::default();
                    label.record(ty, causing);
                    graph.add_edge(a, b, label);
                }
            }
        };

        for i in 0..node_ids.len() {
            let semantics = graph[node_ids[i]].semantics.clone();

            depth += semantics.bidirectional_block_depth_change;
            if depth > 0 {
                in_block.insert(i);
            } else {
                in_block.clear();
            }

            if semantics.has_full_position_significance {
                for &p in &pending_full {
                    add_edge(&mut graph, p, i, EdgeType::PositionFull, None);
                }
                pending_full.clear();
                last_full = Some(i);
            } else if let Some(lf) = last_full {
                add_edge(&mut graph, lf, i, EdgeType::PositionFull, None);
            }
            pending_full.push(i);

            if semantics.has_partial_position_significance {
                if let Some(lp) = last_partial {
                    add_edge(&mut graph, lp, i, EdgeType::PositionPartial, None);
                }
                last_partial = Some(i);
            }

            for v in &semantics.reads {
                if let Some(writers) = writes_of.get(v) {
                    for &n in writers {
                        add_edge(&mut graph, n, i, EdgeType::VarFlow, Some(*v));
                    }
                }
            }

            for v in &semantics.writes {
                if let Some(writers) = writes_of.get(v) {
                    for &n in writers {
                        add_edge(&mut graph, n, i, EdgeType::VarOrder, Some(*v));
                    }
                }
                if let Some(readers) = reads_of.get(v) {
                    for &n in readers {
                        let ty = if in_block.contains(&n) {
                            EdgeType::VarReverseFlow
                        } else {
                            EdgeType::VarOrder
                        };
                        add_edge(&mut graph, n, i, ty, Some(*v));
                    }
                }
                writes_of.entry(*v).or_default().push(i);
            }

            for v in &semantics.reads {
                reads_of.entry(*v).or_default().push(i);
            }
        }

        NormalizationGraph { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn line(&self, idx: NodeIndex) -> &TokenLine {
        &self.graph[idx]
    }
}

/// Group a flat token stream into [`TokenLine`] nodes by consecutive,
/// equal `line` values.
fn group_into_lines(tokens: &[Token]) -> Vec<TokenLine> {
    let mut lines = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    for t in tokens {
        if let Some(last) = current.last() {
            if last.line != t.line {
                lines.push(TokenLine::from_run(std::mem::take(&mut current)));
            }
        }
        current.push(t.clone());
    }
    if !current.is_empty() {
        lines.push(TokenLine::from_run(current));
    }
    lines
}
