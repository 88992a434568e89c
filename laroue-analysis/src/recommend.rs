use serde::Serialize;

use laroue_db::models::Symbol;
use crate::combinations::{CombinationSource, CombinationStats};
use crate::scoring::ProbabilityAnalysis;
use crate::stats::{current_streak, SymbolStats};
use crate::streaks::{StreakBreakItem, StreakBreakStats};

pub const TOP_RECOMMENDATIONS: usize = 2;

/// Part d'arrêt à partir de laquelle la série en cours justifie à elle seule la recommandation.
const STREAK_REASON_PCT: f64 = 25.0;
/// Part d'arrêt à partir de laquelle la série du dernier symbole est signalée en contexte.
const STREAK_CONTEXT_PCT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub symbol: Symbol,
    pub probability: f64,
    pub confidence: f64,
    pub reason: String,
    pub combination_source: Option<CombinationSource>,
    pub combination_count: u32,
}

struct ReasonContext<'a> {
    prob: &'a ProbabilityAnalysis,
    stats: &'a SymbolStats,
    history: &'a [Symbol],
    combinations: &'a CombinationStats,
    current_streak: usize,
    break_at_streak: Option<&'a StreakBreakItem>,
    prefix: &'a str,
}

type ReasonRule = fn(&ReasonContext<'_>) -> Option<String>;

/// Évaluées dans cet ordre, la première qui s'applique gagne.
const REASON_RULES: [ReasonRule; 7] = [
    streak_break_reason,
    combination_reason,
    best_successor_reason,
    frequency_reason,
    hot_reason,
    cold_reason,
    balanced_reason,
];

fn streak_break_reason(ctx: &ReasonContext<'_>) -> Option<String> {
    let item = ctx.break_at_streak?;
    if ctx.current_streak == 0 || item.percentage < STREAK_REASON_PCT {
        return None;
    }
    Some(format!(
        "{} est sorti {} fois de suite : dans {:.2}% des cas la série s'arrête à cette longueur",
        ctx.prob.symbol, ctx.current_streak, item.percentage
    ))
}

fn combination_reason(ctx: &ReasonContext<'_>) -> Option<String> {
    if ctx.prob.combination_count == 0 {
        return None;
    }
    let source = ctx.prob.combination_source?;
    let (_, prefix) = CombinationStats::active_prefix(ctx.history)?;
    let path = prefix
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("→");
    Some(format!(
        "{}Par {} (après {}) : sort dans {:.2}% des cas ({} fois)",
        ctx.prefix, source, path, ctx.prob.combination_score, ctx.prob.combination_count
    ))
}

fn best_successor_reason(ctx: &ReasonContext<'_>) -> Option<String> {
    let &last = ctx.history.last()?;
    let best = ctx.combinations.pairs.group(&[last])?.best()?;
    if best.next != ctx.prob.symbol || best.count == 0 {
        return None;
    }
    Some(format!(
        "{}Après {}, c'est {} qui sort le plus souvent ({:.2}%, {} fois)",
        ctx.prefix, last, ctx.prob.symbol, best.percentage, best.count
    ))
}

fn frequency_reason(ctx: &ReasonContext<'_>) -> Option<String> {
    if ctx.prob.frequency_score < 25.0 {
        return None;
    }
    Some(format!(
        "{}Sur tout l'historique : sort dans {:.2}% des tours ({} fois)",
        ctx.prefix, ctx.stats.percentage, ctx.stats.count
    ))
}

fn hot_reason(ctx: &ReasonContext<'_>) -> Option<String> {
    if !ctx.stats.is_hot {
        return None;
    }
    Some(format!(
        "{}Chaud : fréquent dans les derniers tours ({:.2}%)",
        ctx.prefix, ctx.prob.hot_cold_score
    ))
}

fn cold_reason(ctx: &ReasonContext<'_>) -> Option<String> {
    if !ctx.stats.is_cold {
        return None;
    }
    Some(format!(
        "{}Froid : absent depuis longtemps, pourrait bientôt sortir",
        ctx.prefix
    ))
}

fn balanced_reason(ctx: &ReasonContext<'_>) -> Option<String> {
    Some(format!(
        "{}Choix équilibré (fréquence {:.2}%)",
        ctx.prefix, ctx.prob.frequency_score
    ))
}

fn profile_for(streak_breaks: &[StreakBreakStats], symbol: Symbol) -> Option<&StreakBreakStats> {
    streak_breaks.iter().find(|s| s.symbol == symbol)
}

/// Phrase de contexte quand le dernier symbole enchaîne une série qui
/// s'arrête souvent à sa longueur actuelle.
fn streak_context(history: &[Symbol], streak_breaks: &[StreakBreakStats]) -> Option<(Symbol, String)> {
    let &last = history.last()?;
    let streak = current_streak(history, last);
    if streak < 2 {
        return None;
    }
    let item = profile_for(streak_breaks, last)?.break_at(streak)?;
    if item.percentage < STREAK_CONTEXT_PCT {
        return None;
    }
    Some((
        last,
        format!("{} déjà {} fois de suite, la série s'arrête souvent ici. ", last, streak),
    ))
}

pub fn generate_recommendations(
    probabilities: &[ProbabilityAnalysis],
    symbol_stats: &[SymbolStats],
    history: &[Symbol],
    combinations: &CombinationStats,
    streak_breaks: &[StreakBreakStats],
) -> Vec<Recommendation> {
    let mut sorted: Vec<&ProbabilityAnalysis> = probabilities.iter().collect();
    sorted.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let context = streak_context(history, streak_breaks);

    sorted
        .into_iter()
        .take(TOP_RECOMMENDATIONS)
        .filter_map(|prob| {
            let stats = symbol_stats.iter().find(|s| s.symbol == prob.symbol)?;
            let streak = current_streak(history, prob.symbol);
            let break_at_streak = profile_for(streak_breaks, prob.symbol)
                .and_then(|p| p.break_at(streak));
            let prefix = match &context {
                Some((symbol, text)) if *symbol != prob.symbol => text.as_str(),
                _ => "",
            };

            let ctx = ReasonContext {
                prob,
                stats,
                history,
                combinations,
                current_streak: streak,
                break_at_streak,
                prefix,
            };
            let reason = REASON_RULES
                .iter()
                .find_map(|rule| rule(&ctx))
                .unwrap_or_default();

            Some(Recommendation {
                symbol: prob.symbol,
                probability: prob.probability,
                confidence: prob.confidence,
                reason: reason.trim().to_string(),
                combination_source: prob.combination_source,
                combination_count: prob.combination_count,
            })
        })
        .collect()
}
