use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Valeur affichée sur un secteur de la roue. L'ordre des variantes est
/// l'ordre canonique utilisé pour tous les départages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Symbol {
    Two,
    Three,
    Five,
    Ten,
}

impl Symbol {
    pub const ALL: [Symbol; 4] = [Symbol::Two, Symbol::Three, Symbol::Five, Symbol::Ten];
    pub const COUNT: usize = Self::ALL.len();

    pub fn value(&self) -> u8 {
        match self {
            Symbol::Two => 2,
            Symbol::Three => 3,
            Symbol::Five => 5,
            Symbol::Ten => 10,
        }
    }

    /// Position dans `Symbol::ALL`.
    pub fn index(&self) -> usize {
        match self {
            Symbol::Two => 0,
            Symbol::Three => 1,
            Symbol::Five => 2,
            Symbol::Ten => 3,
        }
    }

    pub fn from_value(value: u8) -> Option<Symbol> {
        match value {
            2 => Some(Symbol::Two),
            3 => Some(Symbol::Three),
            5 => Some(Symbol::Five),
            10 => Some(Symbol::Ten),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Symbol {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Symbol::from_value(value).ok_or_else(|| format!("Valeur {} absente de la roue (2, 3, 5, 10)", value))
    }
}

impl From<Symbol> for u8 {
    fn from(symbol: Symbol) -> u8 {
        symbol.value()
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.value(), f)
    }
}

/// Un tour de roue enregistré.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    pub id: String,
    #[serde(rename = "number")]
    pub symbol: Symbol,
    /// Millisecondes depuis l'epoch Unix.
    pub timestamp: i64,
}

/// Crée un tour horodaté maintenant, avec un identifiant `"{timestamp}-{aléa}"`.
pub fn new_spin(symbol: Symbol) -> Spin {
    let timestamp = chrono::Utc::now().timestamp_millis();
    Spin {
        id: generate_id(timestamp),
        symbol,
        timestamp,
    }
}

pub fn generate_id(timestamp: i64) -> String {
    format!("{}-{}", timestamp, rand::random::<u32>())
}

pub fn parse_symbol(raw: &str) -> Result<Symbol> {
    let raw = raw.trim();
    let value: u8 = match raw.parse() {
        Ok(v) => v,
        Err(_) => bail!("Valeur invalide : '{}' (attendu 2, 3, 5 ou 10)", raw),
    };
    match Symbol::from_value(value) {
        Some(symbol) => Ok(symbol),
        None => bail!("Valeur {} hors roue (2, 3, 5, 10)", value),
    }
}

/// Vue chronologique des symboles (le plus ancien en premier).
pub fn symbols_of(spins: &[Spin]) -> Vec<Symbol> {
    spins.iter().map(|s| s.symbol).collect()
}
