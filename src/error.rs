use thiserror::Error;

/// Errors surfaced by the reproduction scenario.
///
/// Unmet expectations are not errors here: the scenario reports what it
/// measured (`ReproOutcome`) and callers decide what to assert.
#[derive(Debug, Error)]
pub enum ReproError {
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}
