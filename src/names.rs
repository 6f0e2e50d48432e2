pub const HOME_URL: &str = "/";
pub const SELECT_DIFFICULTY_URL: &str = "/difficulty";
pub const PLAY_AGAIN_URL: &str = "/play-again";
pub const REFRESH_URL: &str = "/refresh";
pub const BOARD_URL: &str = "/board";

pub const GAME_SESSION_COOKIE_NAME: &str = "game_session";

/// Id of the element every game action swaps its fragment into.
pub const BOARD_ID: &str = "board";

pub fn selection_url(level: u8) -> String {
    format!("/level/{level}/selection")
}

pub fn reveal_url(level: u8) -> String {
    format!("/level/{level}/reveal")
}

// Game defaults
pub const LEVEL_COUNT: u8 = 10;
pub const DEFAULT_COMPETITION: &str = "Champions League";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 1200;
pub const DEFAULT_RESET_DELAY_SECS: u64 = 3;
pub const DEFAULT_SESSION_IDLE_MINS: u64 = 120;
