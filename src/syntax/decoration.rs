//! Host decoration boundary
//!
//! The host owns the text widget; the engine hands it spans through this
//! trait. Search and active-line decorations are painted by the host on its
//! own and are not touched by `clear_categories`.

use super::category::Category;

/// Receives classified spans for painting
pub trait DecorationSink {
    /// Remove every category decoration applied by earlier passes
    fn clear_categories(&mut self);

    /// Paint `category` over the character range `start..end`
    fn apply(&mut self, category: &Category, start: usize, end: usize);
}
