//! Message builder: groups the games relevant to one user into push messages.
//!
//! Batching is a single fold over the (already start-time ordered) games,
//! carrying the finished batches and the batch being filled. The current batch
//! is flushed when:
//! 1. it reaches the per-message item cap, or
//! 2. the next item would push it over the layout's content-size budget, or
//! 3. the input is exhausted and the batch is non-empty.
//!
//! Only the first message carries the date banner. The batching is identical
//! for every layout; layouts only decide how a batch is rendered and how big
//! an item is.

pub mod flex;
pub mod text;

use ballpark_common::types::{GameContentData, MessageFormat, PushMessage};

/// Default per-message item cap for the flex layout.
pub const DEFAULT_MAX_ITEMS_PER_MESSAGE: usize = 10;

/// Builds push messages in one layout with a fixed item cap.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    format: MessageFormat,
    max_items: usize,
}

struct BatchFold<'a> {
    finished: Vec<Vec<&'a GameContentData>>,
    current: Vec<&'a GameContentData>,
    current_size: usize,
}

impl<'a> BatchFold<'a> {
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.finished.push(std::mem::take(&mut self.current));
            self.current_size = 0;
        }
    }
}

impl MessageBuilder {
    pub fn new(format: MessageFormat, max_items: usize) -> Self {
        Self {
            format,
            max_items: max_items.max(1),
        }
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    fn item_size(&self, game: &GameContentData) -> usize {
        match self.format {
            MessageFormat::Flex => flex::item_size(game),
            MessageFormat::Text => text::item_size(game),
        }
    }

    fn size_budget(&self) -> usize {
        match self.format {
            MessageFormat::Flex => flex::CONTENT_SIZE_BUDGET,
            MessageFormat::Text => text::CONTENT_SIZE_BUDGET,
        }
    }

    /// Split `games` into batches, preserving order.
    pub fn batch<'a, I>(&self, games: I) -> Vec<Vec<&'a GameContentData>>
    where
        I: IntoIterator<Item = &'a GameContentData>,
    {
        let budget = self.size_budget();
        let init = BatchFold {
            finished: Vec::new(),
            current: Vec::new(),
            current_size: 0,
        };

        let mut fold = games.into_iter().fold(init, |mut acc, game| {
            let size = self.item_size(game);
            if !acc.current.is_empty() && acc.current_size + size > budget {
                acc.flush();
            }

            acc.current.push(game);
            acc.current_size += size;

            if acc.current.len() >= self.max_items {
                acc.flush();
            }
            acc
        });

        fold.flush();
        fold.finished
    }

    /// Render the relevant games into push messages. Returns no messages when
    /// `games` is empty.
    pub fn build<'a, I>(&self, banner_date: &str, games: I) -> Vec<PushMessage>
    where
        I: IntoIterator<Item = &'a GameContentData>,
    {
        self.batch(games)
            .iter()
            .enumerate()
            .map(|(index, batch)| {
                let banner = (index == 0).then_some(banner_date);
                match self.format {
                    MessageFormat::Flex => flex::render(batch, banner_date, banner),
                    MessageFormat::Text => text::render(batch, banner),
                }
            })
            .collect()
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new(MessageFormat::Flex, DEFAULT_MAX_ITEMS_PER_MESSAGE)
    }
}
