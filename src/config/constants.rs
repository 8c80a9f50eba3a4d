// * Configuration Constants
// * Central location for site addresses, table markers, stat key sets and timeouts

// * Site base URLs
pub const BASEBALL_REFERENCE_BASE_URL: &str = "https://www.baseball-reference.com";
pub const STATHEAD_BASE_URL: &str = "https://stathead.com";
pub const ROTOWIRE_LINEUPS_URL: &str = "https://www.rotowire.com/baseball/daily-lineups.php";
pub const FANGRAPHS_BASE_URL: &str = "https://www.fangraphs.com";
pub const GAMEDAY_BASE_URL: &str = "http://gd2.mlb.com/components/game/mlb/";

// * Roster tables
pub const BATTING_ROSTER_TABLE_ID: &str = "players_standard_batting";
pub const PITCHING_ROSTER_TABLE_ID: &str = "players_standard_pitching";
pub const ROSTER_DIVIDER_CLASS: &str = "thead";
pub const PLAYER_ID_SUFFIX: &str = ".shtml";

// * Summary (footer) rows
pub const SUMMARY_MARKER_ATTRIBUTE: &str = "data-stat";
pub const SUMMARY_MARKER_VALUE: &str = "stats_summary_explain";
// * Trailing non-statistical footer columns (position / awards)
pub const SUMMARY_TRAILING_COLUMNS: usize = 1;

// * Stat keys kept from a hitter's career line
pub const HITTER_RELEVANT_STAT_KEYS: [&str; 19] = [
    "G", "PA", "AB", "R", "H", "2B", "3B", "HR", "RBI", "SB", "CS", "BB", "SO", "TB", "GIDP",
    "HBP", "SH", "SF", "IBB",
];

// * Game log date labels ("Apr 5")
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// * FanGraphs / Gameday pitch type codes
pub const PITCH_TYPE_CODES: [&str; 10] = ["FA", "SI", "SL", "CH", "CU", "FC", "FS", "KN", "CS", "SB"];
pub const GAMEDAY_PITCH_FILES: [&str; 10] = [
    "pch", "pcu", "pfa", "pfc", "pff", "pfs", "pft", "pkn", "psi", "psl",
];

// * Days searched backwards for the latest Gameday season stats (1 through 24)
pub const GAMEDAY_LOOKBACK_DAYS: u32 = 24;

// * Hitters per side in a confirmed lineup
pub const LINEUP_SIZE: usize = 9;

// * Network defaults
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
pub const FETCH_ATTEMPTS: u32 = 5;
pub const REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const RETRY_BACKOFF_MS: u64 = 500;

// * Page fetch timeout in milliseconds (browser sessions)
pub const PAGE_TIMEOUT_MS: u64 = 60_000;
pub const ELEMENT_POLL_INTERVAL_MS: u64 = 250;

// * Per-site politeness and worker pool size
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 1;
pub const DEFAULT_WORKER_COUNT: usize = 6;
