// * Team synonym tables for the three site vocabularies.
// * Built once and handed to the adapters; never mutated.

use std::collections::HashMap;

const ROTOWIRE_TEAMS: [(&str, &str); 30] = [
    ("ARI", "Arizona Diamondbacks"),
    ("ATL", "Atlanta Braves"),
    ("BAL", "Baltimore Orioles"),
    ("BOS", "Boston Red Sox"),
    ("CHC", "Chicago Cubs"),
    ("CWS", "Chicago White Sox"),
    ("CIN", "Cincinnati Reds"),
    ("CLE", "Cleveland Indians"),
    ("COL", "Colorado Rockies"),
    ("DET", "Detroit Tigers"),
    ("HOU", "Houston Astros"),
    ("KC", "Kansas City Royals"),
    ("LAA", "Los Angeles Angels"),
    ("LAD", "Los Angeles Dodgers"),
    ("MIA", "Miami Marlins"),
    ("MIL", "Milwaukee Brewers"),
    ("MIN", "Minnesota Twins"),
    ("NYM", "New York Mets"),
    ("NYY", "New York Yankees"),
    ("OAK", "Oakland Athletics"),
    ("PHI", "Philadelphia Phillies"),
    ("PIT", "Pittsburgh Pirates"),
    ("SD", "San Diego Padres"),
    ("SEA", "Seattle Mariners"),
    ("SF", "San Francisco Giants"),
    ("STL", "St. Louis Cardinals"),
    ("TB", "Tampa Bay Rays"),
    ("TEX", "Texas Rangers"),
    ("TOR", "Toronto Blue Jays"),
    ("WAS", "Washington Nationals"),
];

const BASEBALL_REFERENCE_TEAMS: [(&str, &str); 33] = [
    ("ANA", "Anaheim Angels"),
    ("ARI", "Arizona Diamondbacks"),
    ("ATL", "Atlanta Braves"),
    ("BAL", "Baltimore Orioles"),
    ("BOS", "Boston Red Sox"),
    ("CHC", "Chicago Cubs"),
    ("CHW", "Chicago White Sox"),
    ("CIN", "Cincinnati Reds"),
    ("CLE", "Cleveland Indians"),
    ("COL", "Colorado Rockies"),
    ("DET", "Detroit Tigers"),
    ("HOU", "Houston Astros"),
    ("KCR", "Kansas City Royals"),
    ("LAA", "Los Angeles Angels of Anaheim"),
    ("LAD", "Los Angeles Dodgers"),
    ("MIA", "Miami Marlins"),
    ("MIL", "Milwaukee Brewers"),
    ("MIN", "Minnesota Twins"),
    ("MON", "Montreal Expos"),
    ("NYM", "New York Mets"),
    ("NYY", "New York Yankees"),
    ("OAK", "Oakland Athletics"),
    ("PHI", "Philadelphia Phillies"),
    ("PIT", "Pittsburgh Pirates"),
    ("SDP", "San Diego Padres"),
    ("SEA", "Seattle Mariners"),
    ("SFG", "San Francisco Giants"),
    ("STL", "St. Louis Cardinals"),
    ("TBR", "Tampa Bay Rays"),
    ("TBD", "Tampa Bay Devil Rays"),
    ("TEX", "Texas Rangers"),
    ("TOR", "Toronto Blue Jays"),
    ("WSN", "Washington Nationals"),
];

// * Keyed by Baseball-Reference abbreviation
const FANGRAPHS_TEAMS: [(&str, &str); 30] = [
    ("ARI", "diamondbacks"),
    ("ATL", "braves"),
    ("BAL", "orioles"),
    ("BOS", "red-sox"),
    ("CHC", "cubs"),
    ("CHW", "white-sox"),
    ("CIN", "reds"),
    ("CLE", "guardians"),
    ("COL", "rockies"),
    ("DET", "tigers"),
    ("HOU", "astros"),
    ("KCR", "royals"),
    ("LAA", "angels"),
    ("LAD", "dodgers"),
    ("MIA", "marlins"),
    ("MIL", "brewers"),
    ("MIN", "twins"),
    ("NYM", "mets"),
    ("NYY", "yankees"),
    ("OAK", "athletics"),
    ("PHI", "phillies"),
    ("PIT", "pirates"),
    ("SDP", "padres"),
    ("SEA", "mariners"),
    ("SFG", "giants"),
    ("STL", "cardinals"),
    ("TBR", "rays"),
    ("TEX", "rangers"),
    ("TOR", "blue-jays"),
    ("WSN", "nationals"),
];

// * Rotowire's Angels name has no Baseball-Reference counterpart
const ANGELS_ROTOWIRE_NAME: &str = "Los Angeles Angels";
const ANGELS_BASEBALL_REFERENCE_NAME: &str = "Los Angeles Angels of Anaheim";

/// Bidirectional abbreviation/name lookup
#[derive(Debug, Clone, Default)]
pub struct BiMap {
    forward: HashMap<String, String>,
    inverse: HashMap<String, String>,
}

impl BiMap {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut map = Self::default();
        for (key, value) in pairs {
            map.forward.insert(key.to_string(), value.to_string());
            map.inverse.insert(value.to_string(), key.to_string());
        }
        map
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.forward.get(key).map(String::as_str)
    }

    pub fn inverse(&self, value: &str) -> Option<&str> {
        self.inverse.get(value).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// The three team vocabularies
#[derive(Debug, Clone)]
pub struct TeamDictionary {
    rotowire: BiMap,
    baseball_reference: BiMap,
    fangraphs: BiMap,
}

impl TeamDictionary {
    pub fn new() -> Self {
        Self {
            rotowire: BiMap::from_pairs(&ROTOWIRE_TEAMS),
            baseball_reference: BiMap::from_pairs(&BASEBALL_REFERENCE_TEAMS),
            fangraphs: BiMap::from_pairs(&FANGRAPHS_TEAMS),
        }
    }

    /// Rotowire abbreviation to full team name
    pub fn rotowire_name(&self, abbreviation: &str) -> Option<&str> {
        self.rotowire.get(abbreviation)
    }

    pub fn rotowire_abbreviation(&self, name: &str) -> Option<&str> {
        self.rotowire.inverse(name)
    }

    /// Baseball-Reference abbreviation to full team name
    pub fn baseball_reference_name(&self, abbreviation: &str) -> Option<&str> {
        self.baseball_reference.get(abbreviation)
    }

    pub fn baseball_reference_abbreviation(&self, name: &str) -> Option<&str> {
        self.baseball_reference.inverse(name)
    }

    /// FanGraphs URL slug for a Baseball-Reference abbreviation
    pub fn fangraphs_slug(&self, baseball_reference_abbreviation: &str) -> Option<&str> {
        self.fangraphs.get(baseball_reference_abbreviation)
    }

    pub fn from_fangraphs_slug(&self, slug: &str) -> Option<&str> {
        self.fangraphs.inverse(slug)
    }

    /// Translates a Rotowire abbreviation into Baseball-Reference's
    pub fn rotowire_to_baseball_reference(&self, rotowire_abbreviation: &str) -> Option<&str> {
        let name = self.rotowire_name(rotowire_abbreviation)?;
        let name = if name == ANGELS_ROTOWIRE_NAME {
            ANGELS_BASEBALL_REFERENCE_NAME
        } else {
            name
        };
        self.baseball_reference_abbreviation(name)
    }

    /// Translates a Rotowire abbreviation into a FanGraphs slug
    pub fn rotowire_to_fangraphs(&self, rotowire_abbreviation: &str) -> Option<&str> {
        let abbreviation = self.rotowire_to_baseball_reference(rotowire_abbreviation)?;
        self.fangraphs_slug(abbreviation)
    }
}

impl Default for TeamDictionary {
    fn default() -> Self {
        Self::new()
    }
}
