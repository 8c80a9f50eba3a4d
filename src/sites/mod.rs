// * Site adapters.
// * Each adapter knows one site's URLs and page layout and feeds fetched
// * documents through the refinery. Parsers are plain functions over a
// * StatDocument; the async clients only compose fetch + parse.

pub mod baseball_reference;
pub mod fangraphs;
pub mod gameday;
pub mod rotowire;
pub mod stathead;

pub use baseball_reference::{BaseballReference, ParkFactors, PlayerRole, SplitYear};
pub use fangraphs::{FanGraphs, FanGraphsId};
pub use gameday::{Gameday, GamedayRole, PitchSeasonStats};
pub use rotowire::{Game, LineupPlayer, Rotowire};
pub use stathead::{Credentials, GameLogEntry, SeasonEntry, Stathead, VersusEntry};

use crate::error::{MinerError, Result};
use crate::network::NetworkError;

// * A missing page is an error once the caller needed its content
pub(crate) fn require_page<T>(page: Option<T>, url: &str) -> Result<T> {
    page.ok_or_else(|| MinerError::Network(NetworkError::NotFound(url.to_string())))
}

// * URL builders only fail on a malformed base, which is a constant
pub(crate) fn require_url(url: Option<String>, what: &str) -> Result<String> {
    url.ok_or_else(|| MinerError::Parse(format!("{what} URL")))
}
