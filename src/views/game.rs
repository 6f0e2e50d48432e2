use std::time::Duration;

use chrono::NaiveDate;
use maud::{html, Markup};

use crate::{
    models::Difficulty,
    names,
    services::quiz::{Feedback, LevelView, RunStatus, RunView},
    utils,
};

pub struct BoardData<'a> {
    pub run: Option<RunView>,
    pub teams: &'a [String],
    pub competition: &'a str,
    /// Club just added by a reveal.
    pub revealed: Option<String>,
}

pub struct HomeData<'a> {
    pub latest_game_date: NaiveDate,
    pub competition: &'a str,
    pub difficulty: Option<Difficulty>,
    pub board: Markup,
}

pub fn home(data: HomeData) -> Markup {
    html! {
        p style="color: #FF800E; font-size: 0.9rem;" {
            "Latest game date: " (data.latest_game_date.format("%B %d, %Y"))
        }
        h1 style="text-align: center; color: #FF800E;" { "⚽ Who'd they play for? ⚽" }

        button."secondary" hx-post=(names::REFRESH_URL) hx-swap="none" style="width: fit-content;" {
            "🔄 Check for updates."
        }

        (description(data.competition))
        (difficulty_picker(data.difficulty))

        div id=(names::BOARD_ID) {
            (data.board)
        }
    }
}

fn description(competition: &str) -> Markup {
    html! {
        article {
            header { strong { "Game description" } }
            p { "You will be given random players who have played in the " (competition) "." }
            p { "Name every team the player has played for in the " (competition) "." }
            p { "Each difficulty contains " (names::LEVEL_COUNT) " levels, and every level lowers the minimum seasons played by one:" }
            ul {
                @for difficulty in Difficulty::ALL {
                    li {
                        strong { (difficulty.label()) }
                        ": from " (difficulty.starting_min_seasons())
                        " down to " (difficulty.final_min_seasons()) " seasons, "
                        (utils::plural(difficulty.reveals() as usize, "reveal", "reveals")) "."
                    }
                }
            }
            p { "Get " (names::LEVEL_COUNT) " correct answers in a row to finish. One wrong answer and the game starts again." }
            p { "Good luck!" }
        }
    }
}

fn difficulty_picker(current: Option<Difficulty>) -> Markup {
    html! {
        label {
            "Please select a difficulty level:"
            select name="difficulty"
                   hx-post=(names::SELECT_DIFFICULTY_URL)
                   hx-trigger="change"
                   hx-target=(format!("#{}", names::BOARD_ID)) {
                option value="" selected[current.is_none()] { "Select a difficulty level" }
                @for difficulty in Difficulty::ALL {
                    option value=(difficulty.key()) selected[current == Some(difficulty)] {
                        (difficulty.label())
                    }
                }
            }
        }
    }
}

pub fn board(data: BoardData) -> Markup {
    html! {
        @if let Some(team) = data.revealed {
            p style="color: #28a745; font-weight: 500;" { "🎁 Revealed one team: " (team) }
        }

        @match data.run {
            None => {
                p style="color: #d32f2f;" { "Please select a difficulty level." }
            },
            Some(run) => { (run_view(&run, data.teams, data.competition)) },
        }
    }
}

/// Feedback for a wrong answer. The run is already restarted server side;
/// the fresh board is fetched once `delay` has passed.
pub fn restarting(feedback: &Feedback, delay: Duration) -> Markup {
    let wrong: Vec<&str> = feedback.wrong_teams.iter().map(String::as_str).collect();
    html! {
        div hx-get=(names::BOARD_URL)
            hx-trigger=(format!("load delay:{}ms", delay.as_millis()))
            hx-target=(format!("#{}", names::BOARD_ID)) {}
        article style="border-left: 4px solid #d32f2f;" {
            p {
                "Unlucky, that is incorrect. You got " (feedback.correct_count)
                " out of " (utils::plural(feedback.answer_count, "team", "teams")) " correct."
            }
            @if !wrong.is_empty() {
                p { "Incorrect team(s): " (wrong.join(", ")) "." }
            }
            p { "🔄 Restarting game..." }
        }
    }
}

fn run_view(run: &RunView, teams: &[String], competition: &str) -> Markup {
    html! {
        @for level in &run.levels {
            (level_section(level, run.remaining_reveals, teams, competition))
        }

        @match run.status {
            RunStatus::InProgress => {},
            RunStatus::Completed => {
                article {
                    p { "You have completed the game, congratulations! 🥳 🎉" }
                    p { "Please feel free to try a new difficulty level 😊." }
                    (play_again_button())
                }
            },
            RunStatus::PoolExhausted { level, min_seasons } => {
                article {
                    p {
                        "Level " (level) ": no players with at least " (min_seasons)
                        " seasons are left to pick from."
                    }
                    (play_again_button())
                }
            },
        }
    }
}

fn level_section(
    level: &LevelView,
    remaining_reveals: u32,
    teams: &[String],
    competition: &str,
) -> Markup {
    let target = format!("#{}", names::BOARD_ID);
    html! {
        section id=(format!("level-{}", level.level)) {
            h4 style="color: #FF800E;" {
                "Level " (level.level) ": Minimum " (level.min_seasons) " seasons played. "
                (level.pool_size) " players to pick from."
            }
            hr style="height: 2px; background-color: #FF800E; border: none;";

            p {
                "Your player is " strong { (level.player) } ", who has played "
                (utils::plural(level.number_of_seasons.max(0) as usize, "season", "seasons"))
                " in the " (competition) "."
            }
            p {
                "They have played for " (utils::plural(level.answer_count, "team", "teams"))
                " in the " (competition) ". "
                @if level.answer_count == 1 { "Who is this team?" } @else { "Who are these teams?" }
            }

            @if level.is_passed() {
                p { "Your answer: " (level.selection.join(", ")) }
                p style="color: #1C9CE0; font-weight: 500;" { "That is correct!" }
            } @else {
                label {
                    "Please select " (utils::plural(level.answer_count, "team", "teams")) ":"
                    select name="teams" multiple
                           hx-post=(names::selection_url(level.level))
                           hx-trigger="change"
                           hx-target=(target) {
                        @for team in teams {
                            option value=(team) selected[level.selection.contains(team)] { (team) }
                        }
                    }
                }
                @if remaining_reveals > 0 {
                    button."secondary"
                           hx-post=(names::reveal_url(level.level))
                           hx-target=(target)
                           style="width: fit-content;" {
                        "Reveal 1 Team (" (remaining_reveals) " left)"
                    }
                } @else {
                    p style="color: #1C9CE0;" { "No reveals remaining." }
                }
            }
        }
    }
}

fn play_again_button() -> Markup {
    html! {
        button hx-post=(names::PLAY_AGAIN_URL)
               hx-target=(format!("#{}", names::BOARD_ID))
               style="width: fit-content;" {
            "🔄 Play Again"
        }
    }
}
