//! Enumeration types for the game world.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The species of a spawned pokemon.
///
/// Assigned uniformly at random at spawn time from the configured kind
/// list and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum PokemonKind {
    /// Electric mouse.
    Pikachu,
    /// Balloon.
    Jigglypuff,
    /// Penguin.
    Piplup,
    /// Evolution pokemon.
    Eevee,
    /// Licking pokemon.
    Lickitung,
}

impl PokemonKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Pikachu,
        Self::Jigglypuff,
        Self::Piplup,
        Self::Eevee,
        Self::Lickitung,
    ];

    /// Lowercase wire name, as used in JSON and the text response format.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pikachu => "pikachu",
            Self::Jigglypuff => "jigglypuff",
            Self::Piplup => "piplup",
            Self::Eevee => "eevee",
            Self::Lickitung => "lickitung",
        }
    }
}

impl core::fmt::Display for PokemonKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PokemonKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown pokemon kind: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_name_matches_serde() {
        for kind in PokemonKind::ALL {
            let json = serde_json::to_string(&kind).ok();
            assert_eq!(json, Some(format!("\"{}\"", kind.as_str())));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Eevee".parse::<PokemonKind>(), Ok(PokemonKind::Eevee));
        assert!("mewtwo".parse::<PokemonKind>().is_err());
    }
}
