//! Ordinal color scale keyed by category

use std::fmt;
use std::str::FromStr;

/// d3 `schemeCategory10`
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// d3 `schemeTableau10`
pub const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// Named categorical palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Ten-color d3 default
    #[default]
    Category10,
    /// Tableau's ten-color palette
    Tableau10,
}

impl Scheme {
    /// Colors of the palette
    #[must_use]
    pub const fn colors(self) -> &'static [&'static str] {
        match self {
            Self::Category10 => &CATEGORY10,
            Self::Tableau10 => &TABLEAU10,
        }
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category10" => Ok(Self::Category10),
            "tableau10" => Ok(Self::Tableau10),
            _ => Err(format!("Unknown color scheme: {s}")),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category10 => write!(f, "category10"),
            Self::Tableau10 => write!(f, "tableau10"),
        }
    }
}

/// Maps category strings to palette colors
///
/// Categories are numbered in the order they are first seen and the palette
/// wraps around, so the same sequence of lookups always yields the same colors.
#[derive(Debug, Clone)]
pub struct ColorScale {
    palette: &'static [&'static str],
    domain: Vec<String>,
}

impl ColorScale {
    /// Create an empty scale over a palette
    #[must_use]
    pub const fn new(scheme: Scheme) -> Self {
        Self {
            palette: scheme.colors(),
            domain: Vec::new(),
        }
    }

    /// Color for a category, adding it to the domain if unseen
    pub fn color(&mut self, category: &str) -> &'static str {
        let index = match self.domain.iter().position(|c| c == category) {
            Some(index) => index,
            None => {
                self.domain.push(category.to_string());
                self.domain.len() - 1
            }
        };
        self.palette[index % self.palette.len()]
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new(Scheme::default())
    }
}
