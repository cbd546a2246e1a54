use acmcore::{
    entity::{
        EntityKind,
        EntityRow,
    },
    error::BackendError,
    transition::TransitionsFor,
};
use std::collections::HashMap;

use crate::{
    platform::Platform,
    render,
    scheduler::Scheduler,
    view::SchedulerView,
};

/// Every scheduler of a listing, built from one batched fetch.
pub struct Page {
    platform: Platform,
    rows: Vec<EntityRow>,
    schedulers: Vec<Scheduler>,
}

impl Page {
    /// Loads the reference lists and the transitions of every row before
    /// building one scheduler per row, in row order.  When the transitions
    /// cannot be fetched the schedulers show only their current ACL.
    pub async fn load(platform: Platform, rows: Vec<EntityRow>) -> Self {
        platform.preload().await;
        let data = platform.transitions_for(&rows, false)
            .await
            .unwrap_or_default();
        let schedulers = Self::build(&platform, &rows, &data).await;
        log::info!("page loaded with {} scheduler(s)", schedulers.len());
        Self { platform, rows, schedulers }
    }

    async fn build(
        platform: &Platform,
        rows: &[EntityRow],
        data: &TransitionsFor,
    ) -> Vec<Scheduler> {
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(Scheduler::init(platform.clone(), row.clone(), data).await);
        }
        result
    }

    /// Refetches the transitions and rebuilds the schedulers, keeping
    /// their collapsed state; unsaved edits are dropped.  A failed fetch
    /// leaves the schedulers as they were.
    pub async fn reload(&mut self) -> Result<(), BackendError> {
        let data = self.platform.transitions_for(&self.rows, true).await?;
        let collapsed = self.schedulers.iter()
            .map(|s| ((s.kind(), s.entity_id().to_string()), s.is_collapsed()))
            .collect::<HashMap<_, _>>();
        let mut schedulers = Self::build(&self.platform, &self.rows, &data).await;
        for scheduler in schedulers.iter_mut() {
            let key = (scheduler.kind(), scheduler.entity_id().to_string());
            if let Some(value) = collapsed.get(&key) {
                scheduler.set_collapsed(*value);
            }
        }
        self.schedulers = schedulers;
        Ok(())
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn rows(&self) -> &[EntityRow] {
        &self.rows
    }

    pub fn schedulers(&self) -> &[Scheduler] {
        &self.schedulers
    }

    pub fn scheduler(&self, kind: EntityKind, id: &str) -> Option<&Scheduler> {
        self.schedulers.iter()
            .find(|s| s.kind() == kind && s.entity_id() == id)
    }

    pub fn scheduler_mut(&mut self, kind: EntityKind, id: &str) -> Option<&mut Scheduler> {
        self.schedulers.iter_mut()
            .find(|s| s.kind() == kind && s.entity_id() == id)
    }

    pub fn draw(&mut self) -> Vec<SchedulerView> {
        self.schedulers.iter_mut()
            .map(Scheduler::draw)
            .collect()
    }

    pub fn render(&mut self) -> String {
        render::page(&self.draw())
    }
}
