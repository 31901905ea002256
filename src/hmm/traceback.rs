//!
//! Decoded paths and their presentation
//!
//! * `TracebackPath`: one state path with its score
//! * `MultiTraceback`: tally of sampled paths
//! * `HitTable`: per (position, state) counts of a `MultiTraceback`
//! * `GffFeature`: a run of positions sharing a GFF tag
//!
//! Nothing here is random; the same path always renders the same way.
//!
use crate::common::StateIndex;
use crate::graph::StateGraph;
use crate::prob::Prob;
use derive_new::new;
use fnv::FnvHashMap;
use itertools::Itertools;

///
/// State path `states[pos]` for `pos = 0..len` with its score.
///
#[derive(Debug, Clone, PartialEq)]
pub struct TracebackPath {
    states: Vec<StateIndex>,
    score: Prob,
}

impl TracebackPath {
    pub fn new(states: Vec<StateIndex>, score: Prob) -> Self {
        TracebackPath { states, score }
    }
    ///
    /// Create from states collected from the last position to the first.
    ///
    pub fn from_tail_first(mut states: Vec<StateIndex>, score: Prob) -> Self {
        states.reverse();
        TracebackPath { states, score }
    }
    pub fn states(&self) -> &[StateIndex] {
        &self.states
    }
    pub fn score(&self) -> Prob {
        self.score
    }
    pub fn len(&self) -> usize {
        self.states.len()
    }
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
    pub fn names<'g, P>(&self, graph: &'g StateGraph<P>) -> Vec<&'g str> {
        self.states
            .iter()
            .map(|&s| graph.state(s).name.as_str())
            .collect()
    }
    pub fn labels<'g, P>(&self, graph: &'g StateGraph<P>) -> Vec<&'g str> {
        self.states
            .iter()
            .map(|&s| graph.state(s).label.as_str())
            .collect()
    }
    /// labels separated by a space
    pub fn label_string<P>(&self, graph: &StateGraph<P>) -> String {
        self.labels(graph).join(" ")
    }
    ///
    /// Merge runs of positions sharing the same GFF tag into features.
    ///
    /// Coordinates are 1-based and inclusive. Positions of states with an
    /// empty tag are not covered by any feature.
    ///
    pub fn gff<P>(&self, graph: &StateGraph<P>, seqname: &str, source: &str) -> Vec<GffFeature> {
        let mut features = Vec::new();
        for (tag, run) in &self
            .states
            .iter()
            .enumerate()
            .group_by(|&(_, &s)| graph.state(s).gff.as_str())
        {
            if tag.is_empty() {
                continue;
            }
            let positions: Vec<usize> = run.map(|(pos, _)| pos).collect();
            let start = positions[0] + 1;
            let end = positions[positions.len() - 1] + 1;
            features.push(GffFeature::new(
                seqname.to_string(),
                source.to_string(),
                tag.to_string(),
                start,
                end,
            ));
        }
        features
    }
}

impl std::fmt::Display for TracebackPath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.states.iter().join(" "))
    }
}

///
/// One line of GFF
///
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct GffFeature {
    pub seqname: String,
    pub source: String,
    pub feature: String,
    /// 1-based, inclusive
    pub start: usize,
    /// 1-based, inclusive
    pub end: usize,
}

impl std::fmt::Display for GffFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t.\t+\t.\t.",
            self.seqname, self.source, self.feature, self.start, self.end
        )
    }
}

///
/// Distinct paths with their occurrence counts.
///
/// Paths are kept in the insertion order until `finalize` sorts them by
/// count (descending), then by states (ascending).
///
#[derive(Debug, Clone, Default)]
pub struct MultiTraceback {
    entries: Vec<(TracebackPath, usize)>,
    index: FnvHashMap<Vec<StateIndex>, usize>,
    total: usize,
}

impl MultiTraceback {
    pub fn new() -> Self {
        MultiTraceback::default()
    }
    pub fn push(&mut self, path: TracebackPath) {
        self.total += 1;
        match self.index.get(path.states()) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(path.states().to_vec(), self.entries.len());
                self.entries.push((path, 1));
            }
        }
    }
    pub fn finalize(&mut self) {
        self.entries
            .sort_by(|(pa, ca), (pb, cb)| cb.cmp(ca).then_with(|| pa.states().cmp(pb.states())));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (path, _))| (path.states().to_vec(), i))
            .collect();
    }
    /// iterate over `(path, count)`
    pub fn iter(&self) -> impl Iterator<Item = (&TracebackPath, usize)> + '_ {
        self.entries.iter().map(|(path, count)| (path, *count))
    }
    /// number of distinct paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// number of pushed paths
    pub fn total(&self) -> usize {
        self.total
    }
    /// count of the path
    pub fn count(&self, states: &[StateIndex]) -> usize {
        self.index
            .get(states)
            .map(|&i| self.entries[i].1)
            .unwrap_or(0)
    }
    /// fraction of draws that produced the path
    pub fn frequency(&self, states: &[StateIndex]) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(states) as f64 / self.total as f64
        }
    }
    ///
    /// Count how many draws visited each (position, state).
    ///
    pub fn hit_table(&self, n_positions: usize, n_states: usize) -> HitTable {
        let mut table = HitTable::new(n_positions, n_states);
        for (path, count) in self.iter() {
            for (pos, &s) in path.states().iter().enumerate().take(n_positions) {
                table.add(pos, s, count);
            }
        }
        table
    }
}

///
/// `n_positions x n_states` table of counts
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitTable {
    n_states: usize,
    counts: Vec<usize>,
}

impl HitTable {
    pub fn new(n_positions: usize, n_states: usize) -> Self {
        HitTable {
            n_states,
            counts: vec![0; n_positions * n_states],
        }
    }
    pub fn get(&self, pos: usize, state: StateIndex) -> usize {
        self.counts[pos * self.n_states + state]
    }
    fn add(&mut self, pos: usize, state: StateIndex, count: usize) {
        self.counts[pos * self.n_states + state] += count;
    }
    pub fn row(&self, pos: usize) -> &[usize] {
        &self.counts[pos * self.n_states..(pos + 1) * self.n_states]
    }
    pub fn n_positions(&self) -> usize {
        if self.n_states == 0 {
            0
        } else {
            self.counts.len() / self.n_states
        }
    }
}

impl std::fmt::Display for HitTable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for pos in 0..self.n_positions() {
            writeln!(f, "{}\t{}", pos, self.row(pos).iter().join("\t"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::prob::p;

    fn gene_graph() -> StateGraph<()> {
        GraphBuilder::new()
            .state("bg", "N", "", p(1.0))
            .state("exon1", "E", "exon", p(1.0))
            .state("exon2", "E", "exon", p(1.0))
            .state("intron", "I", "intron", p(1.0))
            .finalize(())
            .unwrap()
    }

    #[test]
    fn traceback_path_labels() {
        let g = gene_graph();
        let path = TracebackPath::from_tail_first(vec![0, 1, 3, 0], p(0.5));
        assert_eq!(path.states(), &[0, 3, 1, 0]);
        assert_eq!(path.len(), 4);
        assert_eq!(path.to_string(), "0 3 1 0");
        assert_eq!(path.names(&g), vec!["bg", "intron", "exon1", "bg"]);
        let s1 = path.label_string(&g);
        let s2 = path.label_string(&g);
        assert_eq!(s1, "N I E N");
        assert_eq!(s1, s2);
    }
    #[test]
    fn traceback_path_gff() {
        let g = gene_graph();
        // bg exon1 exon2 exon1 intron intron bg exon2
        let path = TracebackPath::new(vec![0, 1, 2, 1, 3, 3, 0, 2], p(0.1));
        let features = path.gff(&g, "chr1", "toy");
        assert_eq!(
            features,
            vec![
                GffFeature::new("chr1".into(), "toy".into(), "exon".into(), 2, 4),
                GffFeature::new("chr1".into(), "toy".into(), "intron".into(), 5, 6),
                GffFeature::new("chr1".into(), "toy".into(), "exon".into(), 8, 8),
            ]
        );
        assert_eq!(features[0].to_string(), "chr1\ttoy\texon\t2\t4\t.\t+\t.\t.");
        // all background
        let path = TracebackPath::new(vec![0, 0], p(0.1));
        assert!(path.gff(&g, "chr1", "toy").is_empty());
    }
    #[test]
    fn multi_traceback_tally() {
        let mut m = MultiTraceback::new();
        m.push(TracebackPath::new(vec![1, 1], p(0.1)));
        m.push(TracebackPath::new(vec![0, 1], p(0.2)));
        m.push(TracebackPath::new(vec![0, 1], p(0.2)));
        m.push(TracebackPath::new(vec![0, 0], p(0.3)));
        m.finalize();
        assert_eq!(m.len(), 3);
        assert_eq!(m.total(), 4);
        let order: Vec<(Vec<usize>, usize)> = m.iter().map(|(p, c)| (p.states().to_vec(), c)).collect();
        assert_eq!(order, vec![(vec![0, 1], 2), (vec![0, 0], 1), (vec![1, 1], 1)]);
        assert_eq!(m.count(&[0, 1]), 2);
        assert_eq!(m.count(&[1, 0]), 0);
        assert_abs_diff_eq!(m.frequency(&[0, 1]), 0.5);

        let h = m.hit_table(2, 2);
        assert_eq!(h.row(0), &[3, 1]);
        assert_eq!(h.row(1), &[1, 3]);
        assert_eq!(h.get(1, 1), 3);
        assert_eq!(h.to_string(), "0\t3\t1\n1\t1\t3\n");
    }
}
