use crate::types::CapturedItem;
use tracing::{debug, warn};

/// Editors, developer tools and terminals: their text is code, not tasks.
const EXCLUDED_APPS: [&str; 12] = [
    "visual studio code",
    "code",
    "cursor",
    "chrome devtools",
    "devtools",
    "terminal",
    "iterm",
    "warp",
    "alacritty",
    "kitty",
    "xcode",
    "intellij",
];

/// The capture host's own chrome, which must never turn into tasks.
const EXCLUDED_PHRASES: [&str; 7] = [
    "screenpipe",
    "localhost",
    "127.0.0.1",
    "connecting to",
    "connection status",
    "not connected",
    "scanning for new tasks",
];

const DEFAULT_SCREEN_HEIGHT: f64 = 1080.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    /// Minimum trimmed text length, in characters.
    pub min_chars: usize,
    pub min_words: usize,
    /// Share of the screen height treated as title bar (top) and taskbar (bottom).
    pub edge_fraction: f64,
    /// Additional application names excluded on top of the built-in list.
    pub extra_excluded_apps: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_chars: 10,
            min_words: 2,
            edge_fraction: 0.05,
            extra_excluded_apps: Vec::new(),
        }
    }
}

/// Why a capture was rejected by the strict pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ExcludedApp,
    TooShort,
    Boilerplate,
    TooFewWords,
    ScreenEdge,
}

/// Keep captures that plausibly carry tasks.
///
/// When the strict rules reject everything, the lenient pass keeps any item
/// whose text clears the length rule, so noisy metadata cannot silently
/// zero out a scan.
pub fn filter_captures(items: &[CapturedItem], options: &FilterOptions) -> Vec<CapturedItem> {
    let strict: Vec<CapturedItem> = items
        .iter()
        .filter(|item| match check_strict(item, options) {
            Ok(()) => true,
            Err(reason) => {
                debug!(source = item.source_label(), ?reason, "capture excluded");
                false
            }
        })
        .cloned()
        .collect();
    if !strict.is_empty() || items.is_empty() {
        return strict;
    }

    let lenient: Vec<CapturedItem> = items
        .iter()
        .filter(|item| has_enough_text(item, options))
        .cloned()
        .collect();
    warn!(
        total = items.len(),
        kept = lenient.len(),
        "strict capture filter kept nothing; using lenient mode"
    );
    lenient
}

pub fn check_strict(item: &CapturedItem, options: &FilterOptions) -> Result<(), Rejection> {
    if is_excluded_app(&item.source_app, &options.extra_excluded_apps) {
        return Err(Rejection::ExcludedApp);
    }
    if !has_enough_text(item, options) {
        return Err(Rejection::TooShort);
    }
    let lowered = item.text.to_lowercase();
    if EXCLUDED_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
        return Err(Rejection::Boilerplate);
    }
    if item.text.split_whitespace().count() < options.min_words {
        return Err(Rejection::TooFewWords);
    }
    if let Some(position) = item.position {
        let screen_height = position
            .screen_height
            .filter(|value| *value > 0.0)
            .unwrap_or(DEFAULT_SCREEN_HEIGHT);
        let edge = screen_height * options.edge_fraction;
        if position.top < edge || position.top > screen_height - edge {
            return Err(Rejection::ScreenEdge);
        }
    }
    Ok(())
}

fn has_enough_text(item: &CapturedItem, options: &FilterOptions) -> bool {
    let trimmed = item.text.trim();
    !trimmed.is_empty() && trimmed.chars().count() >= options.min_chars
}

fn is_excluded_app(source_app: &str, extra: &[String]) -> bool {
    let app = source_app.to_lowercase();
    if app.is_empty() {
        return false;
    }
    EXCLUDED_APPS.iter().any(|excluded| app.contains(excluded))
        || extra
            .iter()
            .map(|value| value.trim().to_lowercase())
            .any(|excluded| !excluded.is_empty() && app.contains(&excluded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScreenPosition;

    fn item(app: &str, text: &str) -> CapturedItem {
        CapturedItem::ocr(app, text)
    }

    fn at(mut item: CapturedItem, top: f64, screen_height: Option<f64>) -> CapturedItem {
        item.position = Some(ScreenPosition {
            top,
            height: 20.0,
            screen_height,
        });
        item
    }

    #[test]
    fn short_text_rejected_and_real_sentence_kept() {
        let options = FilterOptions::default();
        assert_eq!(
            check_strict(&item("Mail", "ok"), &options),
            Err(Rejection::TooShort)
        );
        assert_eq!(
            check_strict(&item("Mail", "please review the quarterly report"), &options),
            Ok(())
        );
    }

    #[test]
    fn excluded_apps_match_case_insensitively() {
        let options = FilterOptions::default();
        let text = "please review the quarterly report";
        assert_eq!(
            check_strict(&item("Visual Studio Code", text), &options),
            Err(Rejection::ExcludedApp)
        );
        assert_eq!(
            check_strict(&item("Code", text), &options),
            Err(Rejection::ExcludedApp)
        );
        assert_eq!(
            check_strict(&item("iTerm2", text), &options),
            Err(Rejection::ExcludedApp)
        );
    }

    #[test]
    fn extra_excluded_apps_extend_the_list() {
        let options = FilterOptions {
            extra_excluded_apps: vec![" Spotify ".to_string(), String::new()],
            ..FilterOptions::default()
        };
        let text = "please review the quarterly report";
        assert_eq!(
            check_strict(&item("spotify", text), &options),
            Err(Rejection::ExcludedApp)
        );
        assert_eq!(check_strict(&item("Slack", text), &options), Ok(()));
    }

    #[test]
    fn host_chrome_is_boilerplate() {
        let options = FilterOptions::default();
        assert_eq!(
            check_strict(&item("Arc", "Connected to localhost:3030 ok"), &options),
            Err(Rejection::Boilerplate)
        );
    }

    #[test]
    fn single_long_word_rejected() {
        let options = FilterOptions::default();
        assert_eq!(
            check_strict(&item("Finder", "Applications"), &options),
            Err(Rejection::TooFewWords)
        );
    }

    #[test]
    fn screen_edges_rejected() {
        let options = FilterOptions::default();
        let text = "please review the quarterly report";
        assert_eq!(
            check_strict(&at(item("Mail", text), 10.0, Some(1000.0)), &options),
            Err(Rejection::ScreenEdge)
        );
        assert_eq!(
            check_strict(&at(item("Mail", text), 990.0, Some(1000.0)), &options),
            Err(Rejection::ScreenEdge)
        );
        assert_eq!(
            check_strict(&at(item("Mail", text), 500.0, Some(1000.0)), &options),
            Ok(())
        );
        // Missing screen height falls back to 1080.
        assert_eq!(
            check_strict(&at(item("Mail", text), 1040.0, None), &options),
            Err(Rejection::ScreenEdge)
        );
    }

    #[test]
    fn lenient_mode_when_strict_pass_is_empty() {
        let options = FilterOptions::default();
        let items = vec![
            item("Terminal", "please review the quarterly report"),
            item("Terminal", "ok"),
        ];
        let kept = filter_captures(&items, &options);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "please review the quarterly report");
    }

    #[test]
    fn no_lenient_mode_when_strict_pass_keeps_something() {
        let options = FilterOptions::default();
        let items = vec![
            item("Terminal", "please review the quarterly report"),
            item("Slack", "remember to send the invoice"),
        ];
        let kept = filter_captures(&items, &options);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_app, "Slack");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(filter_captures(&[], &FilterOptions::default()).is_empty());
    }
}
