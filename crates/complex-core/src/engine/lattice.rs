use super::progress::{Progress, ProgressReporter};
use crate::core::composition::{Composition, ContainmentPair};
use crate::core::models::ids::RecordId;
use crate::core::models::record::{ComplexRecordSet, SubcomplexEdge};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The full strict-containment relation over a finalized record set.
#[derive(Debug, Clone, Default)]
pub struct SubcomplexLattice {
    edges: Vec<SubcomplexEdge>,
}

impl SubcomplexLattice {
    /// Edges sorted by `(super ordinal, sub ordinal)`.
    pub fn edges(&self) -> &[SubcomplexEdge] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<SubcomplexEdge> {
        self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, super_id: RecordId, sub_id: RecordId) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.super_id == super_id && edge.sub_id == sub_id)
    }
}

/// Inverted index from interned `(kind, id, stoichiometry)` pairs to the positions of
/// the records containing them.
struct ContainmentIndex {
    /// Sorted, distinct pair ids of each record, by record position.
    record_pairs: Vec<Vec<u32>>,
    /// Sorted record positions for each pair id.
    postings: Vec<Vec<u32>>,
}

impl ContainmentIndex {
    fn build(records: &ComplexRecordSet) -> Self {
        let mut interned: HashMap<ContainmentPair<'_>, u32> = HashMap::new();
        let mut postings: Vec<Vec<u32>> = Vec::new();
        let mut record_pairs = Vec::with_capacity(records.len());

        for (position, (_, record)) in records.iter().enumerate() {
            let mut pairs: Vec<u32> = record
                .composition
                .containment_pairs()
                .into_iter()
                .map(|pair| {
                    *interned.entry(pair).or_insert_with(|| {
                        postings.push(Vec::new());
                        (postings.len() - 1) as u32
                    })
                })
                .collect();
            pairs.sort_unstable();
            for &pair in &pairs {
                // Positions are visited in increasing order, so every posting list stays sorted.
                postings[pair as usize].push(position as u32);
            }
            record_pairs.push(pairs);
        }

        debug!(
            "Containment index holds {} distinct pairs over {} records.",
            postings.len(),
            record_pairs.len()
        );
        Self {
            record_pairs,
            postings,
        }
    }

    /// Positions of the records whose pair sets strictly contain the pair set at `position`.
    fn strict_supersets(&self, position: usize) -> Vec<u32> {
        let pairs = &self.record_pairs[position];
        if pairs.is_empty() {
            return Vec::new();
        }

        let mut lists: Vec<&[u32]> = pairs
            .iter()
            .map(|&pair| self.postings[pair as usize].as_slice())
            .collect();
        lists.sort_unstable_by_key(|list| list.len());

        let mut candidates: Vec<u32> = lists[0].to_vec();
        for list in &lists[1..] {
            if candidates.is_empty() {
                break;
            }
            candidates = intersect_sorted(&candidates, list);
        }

        candidates.retain(|&other| {
            other as usize != position && self.record_pairs[other as usize].len() > pairs.len()
        });
        candidates
    }
}

fn intersect_sorted(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Computes every subcomplex edge of the record set.
///
/// `A` is a subcomplex of `B` when every `(kind, id, stoichiometry)` pair of `A` also
/// occurs in `B` and `B` has strictly more pairs. The relation is emitted in full,
/// transitive pairs included. Records with an empty composition take no part.
#[instrument(skip_all, name = "subcomplex_lattice")]
pub fn build(records: &ComplexRecordSet, reporter: &ProgressReporter) -> SubcomplexLattice {
    let index = ContainmentIndex::build(records);
    let positions: Vec<usize> = (0..index.record_pairs.len()).collect();

    reporter.report(Progress::TaskStart {
        total_steps: positions.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = positions.iter();

    #[cfg(feature = "parallel")]
    let iterator = positions.par_iter();

    let per_record: Vec<Vec<(u32, u32)>> = iterator
        .map(|&sub| {
            let supers = index.strict_supersets(sub);
            reporter.report(Progress::TaskIncrement);
            supers.into_iter().map(|sup| (sup, sub as u32)).collect()
        })
        .collect();

    reporter.report(Progress::TaskFinish);

    let mut pairs: Vec<(u32, u32)> = per_record.into_iter().flatten().collect();
    pairs.sort_unstable();

    let ids = records.ids();
    let edges: Vec<SubcomplexEdge> = pairs
        .into_iter()
        .map(|(sup, sub)| SubcomplexEdge {
            super_id: ids[sup as usize],
            sub_id: ids[sub as usize],
        })
        .collect();

    info!(
        "Found {} subcomplex relationships among {} complexes.",
        edges.len(),
        records.len()
    );
    SubcomplexLattice { edges }
}

/// Direct pairwise containment test, used to cross-check the indexed computation.
pub fn is_subcomplex(sub: &Composition, sup: &Composition) -> bool {
    let sub_pairs = sub.containment_pairs();
    let sup_pairs = sup.containment_pairs();
    !sub_pairs.is_empty() && sup_pairs.len() > sub_pairs.len() && sub_pairs.is_subset(&sup_pairs)
}
