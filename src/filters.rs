//! Typed filter hooks for the media pipeline.
//!
//! Each hook carries one value type. Callbacks run in ascending priority
//! order; callbacks sharing a priority run in the order they were added.

use crate::models::{ImageAttributes, ImageSrc, Srcset};
use std::sync::Arc;

type Callback<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

pub struct Hook<T> {
    callbacks: Vec<(i32, Callback<T>)>,
}

impl<T> Default for Hook<T> {
    fn default() -> Self {
        Self { callbacks: Vec::new() }
    }
}

impl<T> Clone for Hook<T> {
    fn clone(&self) -> Self {
        Self {
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("priorities", &self.callbacks.iter().map(|(p, _)| *p).collect::<Vec<_>>())
            .finish()
    }
}

impl<T> Hook<T> {
    pub fn add<F>(&mut self, priority: i32, callback: F)
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        let index = self.callbacks.partition_point(|(p, _)| *p <= priority);
        self.callbacks.insert(index, (priority, Arc::new(callback)));
    }

    pub fn apply(&self, value: T) -> T {
        self.callbacks.iter().fold(value, |value, (_, callback)| callback(value))
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// All media hooks, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct FilterTable {
    pub attachment_url: Hook<String>,
    pub attachment_image_src: Hook<Option<ImageSrc>>,
    pub attachment_image_attributes: Hook<ImageAttributes>,
    pub calculate_image_srcset: Hook<Srcset>,
    pub the_content: Hook<String>,
}

impl FilterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.attachment_url.is_empty()
            && self.attachment_image_src.is_empty()
            && self.attachment_image_attributes.is_empty()
            && self.calculate_image_srcset.is_empty()
            && self.the_content.is_empty()
    }
}
