/// Somme minimale en dessous de laquelle un groupe est considéré sans données.
const EMPTY_GROUP_THRESHOLD: f64 = 0.01;

/// Écart à 100 considéré comme du bruit flottant.
const ROUNDING_NOISE: f64 = 1e-10;

/// Élément d'un groupe de parts partageant le même dénominateur.
pub trait Share {
    fn count(&self) -> u32;
    fn percentage(&self) -> f64;
    fn percentage_mut(&mut self) -> &mut f64;
}

/// Pourcentage exact `100 * count / total`, sans arrondi. `total <= 0` donne 0.
pub fn exact_percent(count: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    count / total * 100.0
}

/// Force la somme des parts d'un groupe à 100 en reportant l'écart sur
/// l'élément de plus grand effectif (le premier en cas d'égalité).
/// Un groupe sans observation reste intact.
pub fn normalize_percentages<T: Share>(items: &mut [T]) {
    if items.is_empty() {
        return;
    }
    let sum: f64 = items.iter().map(Share::percentage).sum();
    if sum < EMPTY_GROUP_THRESHOLD {
        return;
    }
    let diff = 100.0 - sum;
    if diff.abs() < ROUNDING_NOISE {
        return;
    }

    let mut max_idx = 0;
    for (i, item) in items.iter().enumerate() {
        if item.count() > items[max_idx].count() {
            max_idx = i;
        }
    }
    *items[max_idx].percentage_mut() += diff;
}

/// Tri décroissant par part, stable : à part égale l'ordre d'entrée est conservé.
pub fn sort_by_share_desc<T: Share>(items: &mut [T]) {
    items.sort_by(|a, b| {
        b.percentage()
            .partial_cmp(&a.percentage())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
