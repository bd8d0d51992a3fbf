//! Next/previous model selection with stale-load detection.
//!
//! Loads cannot be aborted once started. Instead every selection change hands
//! out a new [`LoadTicket`], and a finished load is only applied when its
//! ticket is still current. Superseded loads run to completion and their
//! results are dropped (they still warm the model cache).

use crate::{
    loader::{Fallback, LoadResult, ModelLoader, ProgressFn},
    manifest::ModelEntry,
    resources::AssetParser,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    index: usize,
}

impl LoadTicket {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug)]
pub struct ModelCarousel<'m> {
    models: &'m [ModelEntry],
    index: usize,
    generation: u64,
}

impl<'m> ModelCarousel<'m> {
    /// `models` must not be empty.
    pub fn new(models: &'m [ModelEntry]) -> anyhow::Result<Self> {
        if models.is_empty() {
            anyhow::bail!("a carousel needs at least one model");
        }
        Ok(Self {
            models,
            index: 0,
            generation: 0,
        })
    }

    pub fn current(&self) -> &'m ModelEntry {
        &self.models[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Ticket for the model that is selected right now.
    pub fn ticket(&self) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            index: self.index,
        }
    }

    fn select(&mut self, index: usize) -> LoadTicket {
        self.index = index;
        self.generation += 1;
        log::debug!("Selected model {} ({})", self.current().id, self.index);
        self.ticket()
    }

    pub fn next(&mut self) -> LoadTicket {
        self.select((self.index + 1) % self.models.len())
    }

    pub fn prev(&mut self) -> LoadTicket {
        let index = if self.index == 0 {
            self.models.len() - 1
        } else {
            self.index - 1
        };
        self.select(index)
    }

    /// Whether a load started with `ticket` should still be applied.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Loads the model selected by `ticket`. Entries without a URL become a fallback.
    pub async fn load<P: AssetParser + 'static>(
        &self,
        loader: &ModelLoader<P>,
        ticket: LoadTicket,
        on_progress: Option<ProgressFn>,
    ) -> LoadResult {
        let entry = &self.models[ticket.index];
        let mut result = match entry.url {
            Some(url) => loader.load_with_animations(url, on_progress).await,
            None => LoadResult::Fallback(Fallback::default()),
        };
        result.scene_mut().transform = entry.placement.to_instance();
        result
    }
}
