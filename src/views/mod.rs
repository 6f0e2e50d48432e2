pub mod game;
pub mod layout;

// Re-export commonly used functions from layout
pub use layout::{page, titled};

use maud::Markup;

/// Full page for direct navigation, a titled fragment for htmx swaps.
pub fn render(is_htmx: bool, title: &str, body: Markup) -> Markup {
    if is_htmx {
        titled(title, body)
    } else {
        page(title, body)
    }
}
