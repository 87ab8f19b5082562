//! Minimal reproduction: delete lifecycle hooks are not invoked for rows
//! removed by a cascading parent delete.
//!
//! The scenario declares a `parent` entity with a one-to-many association to
//! `child` (`on_delete = "Cascade"`), registers an after-delete hook on the
//! child, force-synchronizes the schema, creates one parent and two children,
//! destroys the parent through the ORM and measures three facts:
//!
//! 1. the after-bulk-sync hook fired exactly once;
//! 2. no child rows remain (the cascade itself holds);
//! 3. how many times the child's after-delete hook fired. One call per
//!    destroyed child is expected — two here — but the cascade happens inside
//!    the database, bypassing hook dispatch, so the observed count is zero.
//!
//! [`run`] returns the measured [`ReproOutcome`]; the `sscce` binary asserts
//! the expected behavior (and exits non-zero while the defect is present),
//! the test suite asserts the observed behavior.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod spy;

use std::time::Instant;

use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, PaginatorTrait, Set};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub use crate::config::ReproConfig;
use crate::db::{DbHandle, SyncOptions};
use crate::entity::{child, parent};
pub use crate::error::ReproError;
use crate::spy::CallSpy;

/// What a single scenario run measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReproOutcome {
    /// After-bulk-sync hook invocations (expected: 1).
    pub sync_hook_calls: u64,
    /// Child rows present before the parent was destroyed.
    pub children_created: u64,
    /// Child rows remaining after the parent was destroyed (expected: 0).
    pub children_after_destroy: u64,
    /// Child after-delete hook invocations (expected: one per child).
    pub destroy_hook_calls: u64,
}

impl ReproOutcome {
    #[must_use]
    pub fn expected_destroy_hook_calls(&self) -> u64 {
        self.children_created
    }

    /// The cascade itself worked: destroying the parent removed the children.
    #[must_use]
    pub fn cascade_delete_held(&self) -> bool {
        self.children_after_destroy == 0
    }

    /// The after-delete hook fired once per destroyed child.
    #[must_use]
    pub fn hooks_fired_per_child(&self) -> bool {
        self.destroy_hook_calls == self.expected_destroy_hook_calls()
    }

    /// Children were cascade-deleted, yet their hook did not fire for each.
    #[must_use]
    pub fn defect_reproduced(&self) -> bool {
        self.cascade_delete_held() && !self.hooks_fired_per_child()
    }
}

// The child's after-delete hook reports into a process-global spy, so only
// one scenario may run at a time.
static RUN_LOCK: Mutex<()> = Mutex::const_new(());

/// Runs the reproduction scenario against the configured database.
pub async fn run(cfg: ReproConfig) -> Result<ReproOutcome, ReproError> {
    let _guard = RUN_LOCK.lock().await;
    spy::destroy_spy().reset();

    let started = Instant::now();
    let db = DbHandle::connect(&cfg).await?;

    let sync_spy = CallSpy::new();
    db.after_bulk_sync({
        let sync_spy = sync_spy.clone();
        move || sync_spy.call()
    });
    db.sync(SyncOptions { force: true }).await?;
    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "schema ready");

    let parent = parent::ActiveModel {
        name: Set("parent".to_owned()),
        ..Default::default()
    }
    .insert(db.conn())
    .await?;

    child::Entity::insert_many([
        child::ActiveModel {
            parent_id: Set(parent.id),
            ..Default::default()
        },
        child::ActiveModel {
            parent_id: Set(parent.id),
            ..Default::default()
        },
    ])
    .exec(db.conn())
    .await?;

    let children_created = child::Entity::find().count(db.conn()).await?;
    debug!(children_created, parent_id = parent.id, "fixtures in place");

    parent.delete(db.conn()).await?;

    let children_after_destroy = child::Entity::find().count(db.conn()).await?;
    db.close().await?;

    let outcome = ReproOutcome {
        sync_hook_calls: sync_spy.count(),
        children_created,
        children_after_destroy,
        destroy_hook_calls: spy::destroy_spy().count(),
    };
    info!(
        sync_hook_calls = outcome.sync_hook_calls,
        children_created = outcome.children_created,
        children_after_destroy = outcome.children_after_destroy,
        destroy_hook_calls = outcome.destroy_hook_calls,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scenario finished"
    );

    Ok(outcome)
}
