use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use maud::Markup;
use serde::Deserialize;

use crate::{
    extractors::{IsHtmx, PlayerSession},
    models::Difficulty,
    names,
    rejections::{AppError, ResultExt},
    services::quiz::{AppearanceRepository, RevealOutcome, SubmitOutcome},
    session::GameSession,
    views,
    views::game::{self as game_views, BoardData, HomeData},
    AppState,
};

pub fn routes<R: AppearanceRepository + 'static>() -> Router<AppState<R>> {
    Router::new()
        .route(names::HOME_URL, get(home::<R>))
        .route(names::BOARD_URL, get(current_board::<R>))
        .route(names::SELECT_DIFFICULTY_URL, post(select_difficulty::<R>))
        .route("/level/{level}/selection", post(update_selection::<R>))
        .route("/level/{level}/reveal", post(reveal::<R>))
        .route(names::PLAY_AGAIN_URL, post(play_again::<R>))
        .route(names::REFRESH_URL, post(refresh::<R>))
}

/// Deserialize a value that may be either a single string or a list of strings.
/// htmx json-enc sends a multi-select with one chosen option as a plain string.
fn deserialize_one_or_many<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    struct Vis;
    impl<'de> serde::de::Visitor<'de> for Vis {
        type Value = Vec<String>;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("string or list of strings")
        }
        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Vec<String>, E> {
            Ok(vec![v.to_string()])
        }
        fn visit_unit<E: serde::de::Error>(self) -> Result<Vec<String>, E> {
            Ok(Vec::new())
        }
        fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<String>, A::Error> {
            let mut teams = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(team) = seq.next_element::<String>()? {
                teams.push(team);
            }
            Ok(teams)
        }
    }
    d.deserialize_any(Vis)
}

#[derive(Deserialize)]
struct SelectDifficultyBody {
    #[serde(default)]
    difficulty: String,
}

#[derive(Deserialize)]
struct SelectionBody {
    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    teams: Vec<String>,
}

/// Renders the run after an action. Any lookup failure fails the whole fragment.
async fn board<R: AppearanceRepository>(
    state: &AppState<R>,
    game: &mut GameSession,
    revealed: Option<String>,
) -> Result<Markup, AppError> {
    let run = state
        .quiz
        .run(game)
        .await
        .unavailable("could not load the run")?;
    // The picker is only shown once a difficulty is chosen.
    let teams = match run {
        Some(_) => state
            .quiz
            .teams()
            .await
            .unavailable("could not load teams")?,
        None => Vec::new(),
    };

    Ok(game_views::board(BoardData {
        run,
        teams: &teams,
        competition: &state.competition,
        revealed,
    }))
}

async fn home<R: AppearanceRepository>(
    State(state): State<AppState<R>>,
    IsHtmx(is_htmx): IsHtmx,
    player: PlayerSession,
) -> Result<Response, AppError> {
    let latest_game_date = state
        .quiz
        .latest_game_date()
        .await
        .unavailable("could not load latest game date")?;

    let page = {
        let mut game = player.handle.game.lock().await;
        let board = board(&state, &mut game, None).await?;
        game_views::home(HomeData {
            latest_game_date,
            competition: &state.competition,
            difficulty: game.difficulty(),
            board,
        })
    };

    Ok(player.respond(views::render(is_htmx, "Play", page)))
}

/// The board as it stands, fetched after a wrong answer has been shown.
async fn current_board<R: AppearanceRepository>(
    State(state): State<AppState<R>>,
    player: PlayerSession,
) -> Result<Response, AppError> {
    let fragment = {
        let mut game = player.handle.game.lock().await;
        board(&state, &mut game, None).await?
    };

    Ok(player.respond(fragment))
}

async fn select_difficulty<R: AppearanceRepository>(
    State(state): State<AppState<R>>,
    player: PlayerSession,
    Json(body): Json<SelectDifficultyBody>,
) -> Result<Response, AppError> {
    let difficulty = match body.difficulty.trim() {
        "" => None,
        key => Some(
            key.parse::<Difficulty>()
                .reject_input("unknown difficulty")?,
        ),
    };

    let fragment = {
        let mut game = player.handle.game.lock().await;
        state.quiz.select_difficulty(&mut game, difficulty);
        board(&state, &mut game, None).await?
    };

    Ok(player.respond(fragment))
}

async fn update_selection<R: AppearanceRepository>(
    State(state): State<AppState<R>>,
    Path(level): Path<u8>,
    player: PlayerSession,
    Json(body): Json<SelectionBody>,
) -> Result<Response, AppError> {
    let fragment = {
        let mut game = player.handle.game.lock().await;
        let outcome = state
            .quiz
            .update_selection(&mut game, level, body.teams)
            .await
            .unavailable("could not check answer")?;

        match outcome {
            SubmitOutcome::Incorrect(feedback) => {
                game_views::restarting(&feedback, state.reset_delay)
            }
            SubmitOutcome::Pending | SubmitOutcome::Correct { .. } | SubmitOutcome::Ignored => {
                board(&state, &mut game, None).await?
            }
        }
    };

    Ok(player.respond(fragment))
}

async fn reveal<R: AppearanceRepository>(
    State(state): State<AppState<R>>,
    Path(level): Path<u8>,
    player: PlayerSession,
) -> Result<Response, AppError> {
    let fragment = {
        let mut game = player.handle.game.lock().await;
        let outcome = state
            .quiz
            .reveal(&mut game, level)
            .await
            .unavailable("could not reveal a team")?;

        match outcome {
            RevealOutcome::Revealed {
                outcome: SubmitOutcome::Incorrect(feedback),
                ..
            } => game_views::restarting(&feedback, state.reset_delay),
            RevealOutcome::Revealed { team, .. } => board(&state, &mut game, Some(team)).await?,
            RevealOutcome::NoRevealsLeft | RevealOutcome::Ignored => {
                board(&state, &mut game, None).await?
            }
        }
    };

    Ok(player.respond(fragment))
}

async fn play_again<R: AppearanceRepository>(
    State(state): State<AppState<R>>,
    player: PlayerSession,
) -> Result<Response, AppError> {
    let fragment = {
        let mut game = player.handle.game.lock().await;
        state.quiz.play_again(&mut game);
        board(&state, &mut game, None).await?
    };

    Ok(player.respond(fragment))
}

/// Drops cached query results and asks htmx to reload the page.
async fn refresh<R: AppearanceRepository>(State(state): State<AppState<R>>) -> impl IntoResponse {
    state.quiz.refresh();
    (StatusCode::OK, [("HX-Refresh", "true")])
}
