use serde::Serialize;

use laroue_db::models::Symbol;
use crate::percent::{exact_percent, normalize_percentages, sort_by_share_desc, Share};

/// Ordre du modèle n-gramme utilisé : paire (1 tour de contexte),
/// triplet (2 tours) ou quadruplet (3 tours).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinationSource {
    Pair,
    Triple,
    Quadruple,
}

impl CombinationSource {
    /// Longueur du préfixe.
    pub fn order(&self) -> usize {
        match self {
            CombinationSource::Pair => 1,
            CombinationSource::Triple => 2,
            CombinationSource::Quadruple => 3,
        }
    }
}

impl std::fmt::Display for CombinationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombinationSource::Pair => write!(f, "paire"),
            CombinationSource::Triple => write!(f, "triplet"),
            CombinationSource::Quadruple => write!(f, "quadruplet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub prefix: Vec<Symbol>,
    pub next: Symbol,
    pub count: u32,
    /// Part de `next` parmi tous les successeurs de `prefix`.
    pub percentage: f64,
}

impl Share for Transition {
    fn count(&self) -> u32 {
        self.count
    }
    fn percentage(&self) -> f64 {
        self.percentage
    }
    fn percentage_mut(&mut self) -> &mut f64 {
        &mut self.percentage
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionGroup {
    pub prefix: Vec<Symbol>,
    /// Nombre de fois où le préfixe a été suivi d'un tour.
    pub total: u32,
    /// Successeurs triés par part décroissante.
    pub transitions: Vec<Transition>,
}

impl TransitionGroup {
    pub fn find(&self, next: Symbol) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.next == next)
    }

    /// Successeur le plus fréquent (premier dans l'ordre de l'alphabet à égalité).
    pub fn best(&self) -> Option<&Transition> {
        self.transitions.first()
    }
}

/// Table de transitions d'ordre k, matérialisée pour les 4^k préfixes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionTable {
    pub order: usize,
    /// `max(0, n - k)`.
    pub total: usize,
    /// Vue brute : préfixe puis successeur, dans l'ordre de l'alphabet.
    pub transitions: Vec<Transition>,
    /// Vue par préfixe, indexée par `prefix_index`.
    pub groups: Vec<TransitionGroup>,
}

fn prefix_index(prefix: &[Symbol]) -> usize {
    prefix.iter().fold(0, |acc, s| acc * Symbol::COUNT + s.index())
}

fn prefix_at(index: usize, order: usize) -> Vec<Symbol> {
    let mut prefix = vec![Symbol::ALL[0]; order];
    let mut rest = index;
    for slot in prefix.iter_mut().rev() {
        *slot = Symbol::ALL[rest % Symbol::COUNT];
        rest /= Symbol::COUNT;
    }
    prefix
}

impl TransitionTable {
    pub fn build(history: &[Symbol], order: usize) -> Self {
        let n_prefixes = Symbol::COUNT.pow(order as u32);
        let mut counts = vec![0u32; n_prefixes * Symbol::COUNT];
        let mut totals = vec![0u32; n_prefixes];

        for window in history.windows(order + 1) {
            let idx = prefix_index(&window[..order]);
            counts[idx * Symbol::COUNT + window[order].index()] += 1;
            totals[idx] += 1;
        }

        let mut transitions = Vec::with_capacity(counts.len());
        let mut groups = Vec::with_capacity(n_prefixes);

        for (idx, &total) in totals.iter().enumerate() {
            let prefix = prefix_at(idx, order);
            let mut list: Vec<Transition> = Symbol::ALL
                .iter()
                .map(|&next| {
                    let count = counts[idx * Symbol::COUNT + next.index()];
                    Transition {
                        prefix: prefix.clone(),
                        next,
                        count,
                        percentage: exact_percent(count as f64, total as f64),
                    }
                })
                .collect();
            normalize_percentages(&mut list);
            transitions.extend(list.iter().cloned());
            sort_by_share_desc(&mut list);
            groups.push(TransitionGroup {
                prefix,
                total,
                transitions: list,
            });
        }

        TransitionTable {
            order,
            total: history.len().saturating_sub(order),
            transitions,
            groups,
        }
    }

    /// Groupe du préfixe donné ; `None` si sa longueur ne correspond pas à l'ordre.
    pub fn group(&self, prefix: &[Symbol]) -> Option<&TransitionGroup> {
        if prefix.len() != self.order {
            return None;
        }
        self.groups.get(prefix_index(prefix))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationScore {
    pub score: f64,
    pub source: Option<CombinationSource>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationStats {
    pub pairs: TransitionTable,
    pub triples: TransitionTable,
    pub quadruples: TransitionTable,
}

impl CombinationStats {
    pub fn compute(history: &[Symbol]) -> Self {
        Self {
            pairs: TransitionTable::build(history, 1),
            triples: TransitionTable::build(history, 2),
            quadruples: TransitionTable::build(history, 3),
        }
    }

    pub fn total_pairs(&self) -> usize {
        self.pairs.total
    }

    pub fn total_triples(&self) -> usize {
        self.triples.total
    }

    pub fn total_quadruples(&self) -> usize {
        self.quadruples.total
    }

    pub fn table(&self, source: CombinationSource) -> &TransitionTable {
        match source {
            CombinationSource::Pair => &self.pairs,
            CombinationSource::Triple => &self.triples,
            CombinationSource::Quadruple => &self.quadruples,
        }
    }

    /// Contexte actif en fin d'historique : quadruplet dès 4 tours,
    /// triplet dès 2, paire dès 1.
    pub fn active_prefix(history: &[Symbol]) -> Option<(CombinationSource, &[Symbol])> {
        let source = match history.len() {
            0 => return None,
            1 => CombinationSource::Pair,
            2 | 3 => CombinationSource::Triple,
            _ => CombinationSource::Quadruple,
        };
        Some((source, &history[history.len() - source.order()..]))
    }

    /// Part du symbole comme successeur du contexte actif.
    pub fn lookup(&self, history: &[Symbol], symbol: Symbol) -> CombinationScore {
        let Some((source, prefix)) = Self::active_prefix(history) else {
            return CombinationScore { score: 0.0, source: None, count: 0 };
        };
        let found = self
            .table(source)
            .group(prefix)
            .and_then(|g| g.find(symbol));
        CombinationScore {
            score: found.map(|t| t.percentage).unwrap_or(0.0),
            source: Some(source),
            count: found.map(|t| t.count).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_history;
    use laroue_db::models::Symbol::{Five, Ten, Three, Two};

    #[test]
    fn test_prefix_index_roundtrip() {
        for order in 1..=3 {
            for idx in 0..Symbol::COUNT.pow(order as u32) {
                assert_eq!(prefix_index(&prefix_at(idx, order)), idx);
            }
        }
        assert_eq!(prefix_at(0, 2), vec![Two, Two]);
        assert_eq!(prefix_at(1, 2), vec![Two, Three]);
    }

    #[test]
    fn test_totals() {
        for n in 0..6 {
            let history = make_test_history(n);
            let stats = CombinationStats::compute(&history);
            assert_eq!(stats.total_pairs(), n.saturating_sub(1));
            assert_eq!(stats.total_triples(), n.saturating_sub(2));
            assert_eq!(stats.total_quadruples(), n.saturating_sub(3));
        }
    }

    #[test]
    fn test_dense_tables() {
        let stats = CombinationStats::compute(&[]);
        assert_eq!(stats.pairs.groups.len(), 4);
        assert_eq!(stats.triples.groups.len(), 16);
        assert_eq!(stats.quadruples.groups.len(), 64);
        assert_eq!(stats.quadruples.transitions.len(), 256);
        for group in &stats.quadruples.groups {
            assert_eq!(group.total, 0);
            assert!(group.transitions.iter().all(|t| t.percentage == 0.0));
        }
    }

    #[test]
    fn test_group_counts_match_totals() {
        let history = make_test_history(50);
        let stats = CombinationStats::compute(&history);
        for table in [&stats.pairs, &stats.triples, &stats.quadruples] {
            let sum: u32 = table.groups.iter().map(|g| g.total).sum();
            assert_eq!(sum as usize, table.total);
            for group in &table.groups {
                let counted: u32 = group.transitions.iter().map(|t| t.count).sum();
                assert_eq!(counted, group.total);
            }
        }
    }

    #[test]
    fn test_observed_groups_sum_to_hundred() {
        let history = make_test_history(61);
        let stats = CombinationStats::compute(&history);
        for table in [&stats.pairs, &stats.triples, &stats.quadruples] {
            for group in table.groups.iter().filter(|g| g.total > 0) {
                let sum: f64 = group.transitions.iter().map(|t| t.percentage).sum();
                assert!((sum - 100.0).abs() < 1e-9, "Sum = {} pour {:?}", sum, group.prefix);
            }
        }
    }

    #[test]
    fn test_groups_sorted_descending() {
        let history = make_test_history(40);
        let stats = CombinationStats::compute(&history);
        for group in &stats.triples.groups {
            for w in group.transitions.windows(2) {
                assert!(w[0].percentage >= w[1].percentage);
            }
        }
    }

    #[test]
    fn test_pair_table_alternating_sequence() {
        let history = vec![Two, Two, Three, Two, Two, Three, Two, Two, Three];
        let stats = CombinationStats::compute(&history);
        let group = stats.pairs.group(&[Two]).unwrap();
        assert_eq!(group.total, 6);
        let to_two = group.find(Two).unwrap();
        let to_three = group.find(Three).unwrap();
        assert_eq!(to_two.count, 3);
        assert_eq!(to_three.count, 3);
        assert!((to_two.percentage - 50.0).abs() < 1e-9);
        assert!((to_three.percentage - 50.0).abs() < 1e-9);
        // égalité : l'ordre de l'alphabet est conservé
        assert_eq!(group.best().unwrap().next, Two);

        let from_three = stats.pairs.group(&[Three]).unwrap();
        assert_eq!(from_three.best().unwrap().next, Two);
        assert_eq!(from_three.best().unwrap().percentage, 100.0);
    }

    #[test]
    fn test_raw_view_is_prefix_major() {
        let history = vec![Ten, Five, Ten];
        let stats = CombinationStats::compute(&history);
        assert_eq!(stats.pairs.transitions.len(), 16);
        assert_eq!(stats.pairs.transitions[0].prefix, vec![Two]);
        assert_eq!(stats.pairs.transitions[0].next, Two);
        let ten_five = &stats.pairs.transitions[3 * 4 + 2];
        assert_eq!((ten_five.prefix[0], ten_five.next), (Ten, Five));
        assert_eq!(ten_five.count, 1);
        assert_eq!(ten_five.percentage, 100.0);
    }

    #[test]
    fn test_group_rejects_wrong_prefix_length() {
        let stats = CombinationStats::compute(&[Two, Three]);
        assert!(stats.pairs.group(&[Two, Three]).is_none());
        assert!(stats.triples.group(&[Two]).is_none());
    }

    #[test]
    fn test_active_prefix_fallback() {
        assert!(CombinationStats::active_prefix(&[]).is_none());
        let (source, prefix) = CombinationStats::active_prefix(&[Five]).unwrap();
        assert_eq!(source, CombinationSource::Pair);
        assert_eq!(prefix, &[Five]);
        let (source, prefix) = CombinationStats::active_prefix(&[Five, Two, Ten]).unwrap();
        assert_eq!(source, CombinationSource::Triple);
        assert_eq!(prefix, &[Two, Ten]);
        let (source, prefix) = CombinationStats::active_prefix(&[Three, Five, Two, Ten]).unwrap();
        assert_eq!(source, CombinationSource::Quadruple);
        assert_eq!(prefix, &[Five, Two, Ten]);
    }

    #[test]
    fn test_lookup() {
        let history = vec![Two, Two, Three, Two, Two, Three, Two, Two, Three];
        let stats = CombinationStats::compute(&history);
        // contexte 2 -> 2 -> 3, toujours suivi de 2
        let two = stats.lookup(&history, Two);
        assert_eq!(two.source, Some(CombinationSource::Quadruple));
        assert_eq!(two.count, 2);
        assert_eq!(two.score, 100.0);

        let five = stats.lookup(&history, Five);
        assert_eq!(five.count, 0);
        assert_eq!(five.score, 0.0);

        let empty = CombinationStats::compute(&[]);
        let none = empty.lookup(&[], Two);
        assert_eq!(none.source, None);
    }
}
