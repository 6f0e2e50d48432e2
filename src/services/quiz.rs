use std::collections::BTreeSet;

use chrono::NaiveDate;
use color_eyre::Result;
use rand::seq::{IteratorRandom, SliceRandom};

use crate::cache::CachedRepository;
use crate::db::Db;
use crate::models::{Difficulty, PlayerRecord};
use crate::names::LEVEL_COUNT;
use crate::session::GameSession;

// ---------------------------------------------------------------------------
// AppearanceRepository trait (the engine only needs these four reads)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AppearanceRepository: Send + Sync {
    fn latest_game_date(&self) -> impl std::future::Future<Output = Result<NaiveDate>> + Send;

    fn players(
        &self,
        min_seasons: i32,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    fn player_record(
        &self,
        player_name: &str,
    ) -> impl std::future::Future<Output = Result<PlayerRecord>> + Send;

    fn teams(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What the user got wrong on a level, reported before the run restarts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub correct_count: usize,
    pub answer_count: usize,
    pub wrong_teams: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// Fewer (or more) picks than the player has clubs.
    Pending,
    Correct,
    Incorrect(Feedback),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Pending,
    /// `completed` is set when the last level was just passed.
    Correct { completed: bool },
    /// The run has already been restarted when this is returned; the
    /// feedback is all that is left of the failed attempt.
    Incorrect(Feedback),
    /// The level is not the one currently being played.
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    Revealed { team: String, outcome: SubmitOutcome },
    NoRevealsLeft,
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelView {
    pub level: u8,
    pub min_seasons: i32,
    /// Players this level could have drawn from.
    pub pool_size: usize,
    pub player: String,
    pub number_of_seasons: i32,
    pub answer_count: usize,
    pub selection: Vec<String>,
    pub evaluation: Evaluation,
}

impl LevelView {
    pub fn is_passed(&self) -> bool {
        self.evaluation == Evaluation::Correct
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    InProgress,
    Completed,
    /// Nobody is left to draw for `level`.
    PoolExhausted { level: u8, min_seasons: i32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunView {
    pub difficulty: Difficulty,
    pub remaining_reveals: u32,
    /// Levels reached so far, ending at the one being played.
    pub levels: Vec<LevelView>,
    pub status: RunStatus,
}

enum LevelStep {
    Ready(LevelView),
    NoPlayersLeft { min_seasons: i32 },
}

/// Compares a selection against the answer set.
///
/// Nothing is judged until the selection has as many entries as there are
/// answers; after that, only set equality counts.
pub fn evaluate(selection: &[String], answers: &BTreeSet<String>) -> Evaluation {
    if selection.len() != answers.len() {
        return Evaluation::Pending;
    }

    let selected: BTreeSet<&String> = selection.iter().collect();
    if selected.len() == answers.len() && selected.iter().all(|team| answers.contains(*team)) {
        return Evaluation::Correct;
    }

    Evaluation::Incorrect(Feedback {
        correct_count: selected.iter().filter(|team| answers.contains(**team)).count(),
        answer_count: answers.len(),
        wrong_teams: selected
            .into_iter()
            .filter(|team| !answers.contains(*team))
            .cloned()
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// QuizService
// ---------------------------------------------------------------------------

pub struct QuizService<R: AppearanceRepository = CachedRepository<Db>> {
    repo: R,
}

impl<R: AppearanceRepository> QuizService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn latest_game_date(&self) -> Result<NaiveDate> {
        self.repo.latest_game_date().await
    }

    /// Every club the picker offers.
    pub async fn teams(&self) -> Result<Vec<String>> {
        self.repo.teams().await
    }

    pub fn select_difficulty(&self, session: &mut GameSession, difficulty: Option<Difficulty>) {
        if session.set_difficulty(difficulty) {
            tracing::info!(
                difficulty = difficulty.map_or("none", Difficulty::label),
                "difficulty changed, run restarted"
            );
        }
    }

    /// Starts the current difficulty from scratch with a full reveal budget.
    pub fn play_again(&self, session: &mut GameSession) {
        session.clear_levels();
        session.refill_reveals();
        tracing::info!("run cleared for another attempt");
    }

    /// Renders the run from level 1 up to the first level not yet answered correctly,
    /// drawing players for levels reached for the first time.
    pub async fn run(&self, session: &mut GameSession) -> Result<Option<RunView>> {
        let Some(difficulty) = session.difficulty() else {
            return Ok(None);
        };

        let mut levels = Vec::new();
        let mut status = RunStatus::Completed;

        for level in 1..=LEVEL_COUNT {
            match self.level(session, difficulty, level).await? {
                LevelStep::Ready(view) => {
                    let passed = view.is_passed();
                    levels.push(view);
                    if !passed {
                        status = RunStatus::InProgress;
                        break;
                    }
                }
                LevelStep::NoPlayersLeft { min_seasons } => {
                    status = RunStatus::PoolExhausted { level, min_seasons };
                    break;
                }
            }
        }

        Ok(Some(RunView {
            difficulty,
            remaining_reveals: session.remaining_reveals(),
            levels,
            status,
        }))
    }

    async fn level(
        &self,
        session: &mut GameSession,
        difficulty: Difficulty,
        level: u8,
    ) -> Result<LevelStep> {
        let min_seasons = difficulty.min_seasons(level);
        let Some((player, pool_size)) = self.assign_player(session, level, min_seasons).await?
        else {
            return Ok(LevelStep::NoPlayersLeft { min_seasons });
        };

        let record = self.repo.player_record(&player).await?;
        let selection = session.selection(level).to_vec();
        let evaluation = evaluate(&selection, &record.teams);

        Ok(LevelStep::Ready(LevelView {
            level,
            min_seasons,
            pool_size,
            player,
            number_of_seasons: record.number_of_seasons,
            answer_count: record.teams.len(),
            selection,
            evaluation,
        }))
    }

    /// Returns the level's player, drawing one if none is assigned yet,
    /// together with the number of candidates the level draws from.
    async fn assign_player(
        &self,
        session: &mut GameSession,
        level: u8,
        min_seasons: i32,
    ) -> Result<Option<(String, usize)>> {
        let eligible = self.repo.players(min_seasons).await?;
        let candidates: Vec<&String> = {
            let taken = session.players_except(level);
            eligible
                .iter()
                .filter(|player| !taken.contains(player.as_str()))
                .collect()
        };
        let pool_size = candidates.len();

        if let Some(player) = session.player(level) {
            return Ok(Some((player.to_string(), pool_size)));
        }

        let Some(player) = candidates
            .choose(&mut rand::thread_rng())
            .map(|player| player.to_string())
        else {
            tracing::warn!(level, min_seasons, "no players left to draw");
            return Ok(None);
        };

        tracing::debug!(level, min_seasons, %player, "player drawn for level");
        session.assign_player(level, player.clone());
        Ok(Some((player, pool_size)))
    }

    /// The first assigned level whose selection is not correct yet.
    async fn active_level(&self, session: &GameSession) -> Result<Option<(u8, PlayerRecord)>> {
        for level in 1..=LEVEL_COUNT {
            let Some(player) = session.player(level) else {
                return Ok(None);
            };
            let record = self.repo.player_record(player).await?;
            if evaluate(session.selection(level), &record.teams) != Evaluation::Correct {
                return Ok(Some((level, record)));
            }
        }
        Ok(None)
    }

    /// Replaces the picker contents of `level` and judges them.
    pub async fn update_selection(
        &self,
        session: &mut GameSession,
        level: u8,
        teams: Vec<String>,
    ) -> Result<SubmitOutcome> {
        let Some(record) = self.active_record(session, level).await? else {
            return Ok(SubmitOutcome::Ignored);
        };

        session.set_selection(level, teams);
        self.judge(session, level, &record).await
    }

    /// Adds one random correct club to the level's picker, if a reveal is left.
    pub async fn reveal(&self, session: &mut GameSession, level: u8) -> Result<RevealOutcome> {
        if session.remaining_reveals() == 0 {
            return Ok(RevealOutcome::NoRevealsLeft);
        }

        let Some(record) = self.active_record(session, level).await? else {
            return Ok(RevealOutcome::Ignored);
        };

        let Some(team) = record.teams.iter().choose(&mut rand::thread_rng()).cloned() else {
            return Ok(RevealOutcome::Ignored);
        };

        // Not deduplicated: revealing a club already picked still takes a slot.
        session.push_selection(level, team.clone());
        session.spend_reveal();
        tracing::info!(level, %team, left = session.remaining_reveals(), "team revealed");

        let outcome = self.judge(session, level, &record).await?;
        Ok(RevealOutcome::Revealed { team, outcome })
    }

    async fn active_record(
        &self,
        session: &GameSession,
        level: u8,
    ) -> Result<Option<PlayerRecord>> {
        match self.active_level(session).await? {
            Some((active, record)) if active == level => Ok(Some(record)),
            _ => {
                tracing::debug!(level, "action for a level that is not being played");
                Ok(None)
            }
        }
    }

    async fn judge(
        &self,
        session: &mut GameSession,
        level: u8,
        record: &PlayerRecord,
    ) -> Result<SubmitOutcome> {
        match evaluate(session.selection(level), &record.teams) {
            Evaluation::Pending => Ok(SubmitOutcome::Pending),
            Evaluation::Correct => {
                let completed = level == LEVEL_COUNT;
                tracing::info!(level, completed, "level passed");
                Ok(SubmitOutcome::Correct { completed })
            }
            Evaluation::Incorrect(feedback) => {
                tracing::info!(
                    level,
                    correct = feedback.correct_count,
                    of = feedback.answer_count,
                    "wrong answer, restarting run"
                );
                self.reset_run(session).await?;
                Ok(SubmitOutcome::Incorrect(feedback))
            }
        }
    }

    /// Clears every level and draws a fresh level 1 player from the full pool.
    /// Reveals are not given back.
    pub async fn reset_run(&self, session: &mut GameSession) -> Result<()> {
        session.clear_levels();
        if let Some(difficulty) = session.difficulty() {
            self.assign_player(session, 1, difficulty.starting_min_seasons())
                .await?;
        }
        Ok(())
    }
}

impl<R: AppearanceRepository> QuizService<CachedRepository<R>> {
    /// Forgets every cached lookup so the next render reads fresh data.
    pub fn refresh(&self) {
        self.repo.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
