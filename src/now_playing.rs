//! The canonical "what is playing" record and its display rendering.

use crate::upstream::plex::MediaSession;
use serde::Serialize;
use std::fmt;

/// Placeholder shown whenever the title is empty.
pub const NOTHING_PLAYING: &str = "Nothing is currently playing";

/// Album name the streaming device reports while the live TV app is in front.
pub const LIVE_TV_APP: &str = "FuboTV";

/// Compact label for live broadcasts, which carry no progress.
pub const LIVE_TV_LABEL: &str = "FuboTV · Live";

const UHD_ALIASES: &[&str] = &["4k", "2160", "2160p"];
const UHD_LABEL: &str = "4k";

/// One reconciled playback status.
///
/// An empty `title` means nothing is playing and overrides every other field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NowPlaying {
    /// Fraction watched. Not finite when the upstream duration is zero.
    pub progress: f64,
    pub show_title: Option<String>,
    pub title: String,
    /// Raw resolution label as reported upstream (`"1080"`, `"4K"`, ...).
    pub resolution: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl NowPlaying {
    pub fn nothing() -> Self {
        Self::default()
    }

    pub fn live_tv() -> Self {
        Self {
            title: LIVE_TV_APP.to_string(),
            ..Self::default()
        }
    }

    /// Build a status straight from a Plex session.
    pub fn from_session(session: &MediaSession) -> Self {
        Self {
            progress: ratio(session.view_offset as f64, session.duration as f64),
            show_title: non_empty(&session.grandparent_title),
            title: session.title.clone(),
            resolution: session.resolution().and_then(non_empty),
            season: nonzero(session.parent_index),
            episode: nonzero(session.index),
        }
    }

    pub fn is_nothing(&self) -> bool {
        self.title.is_empty()
    }

    /// Season and episode, only when both are known.
    pub fn episode_marker(&self) -> Option<(u32, u32)> {
        match (self.season, self.episode) {
            (Some(season), Some(episode)) if season != 0 && episode != 0 => Some((season, episode)),
            _ => None,
        }
    }

    /// Render the single display line for this status.
    pub fn render(&self) -> String {
        if self.is_nothing() {
            return NOTHING_PLAYING.to_string();
        }
        if self.title == LIVE_TV_APP {
            return LIVE_TV_LABEL.to_string();
        }

        let resolution = self
            .resolution
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .map(normalize_resolution);

        let mut line = String::new();
        if let Some(show) = self.show_title.as_deref() {
            line.push_str(show);
        }
        if let Some((season, episode)) = self.episode_marker() {
            line.push_str(&format!(" S{season:02} · E{episode:02}:"));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&self.title);

        line.push_str(&format!(" [{}%]", progress_percent(self.progress)));
        if let Some(resolution) = resolution {
            line.push_str(&format!(" ({resolution})"));
        }

        line.trim().to_string()
    }
}

impl fmt::Display for NowPlaying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Canonicalize a resolution label: UHD aliases become `4k`, anything not
/// already ending in `p` gains one. Applying it twice changes nothing.
pub fn normalize_resolution(label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }

    if UHD_ALIASES
        .iter()
        .any(|alias| label.eq_ignore_ascii_case(alias))
    {
        return UHD_LABEL.to_string();
    }

    if label
        .chars()
        .last()
        .is_some_and(|last| last.eq_ignore_ascii_case(&'p'))
    {
        label.to_string()
    } else {
        format!("{label}p")
    }
}

/// Whole percent for display. Non-finite progress shows as 0.
fn progress_percent(progress: f64) -> u32 {
    if !progress.is_finite() {
        return 0;
    }
    (progress * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Plain division; a zero denominator yields a non-finite value on purpose.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn nonzero(value: u32) -> Option<u32> {
    (value != 0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(show: &str, title: &str, season: u32, episode: u32) -> NowPlaying {
        NowPlaying {
            progress: 0.5,
            show_title: Some(show.to_string()),
            title: title.to_string(),
            resolution: None,
            season: Some(season),
            episode: Some(episode),
        }
    }

    #[test]
    fn test_uhd_aliases_normalize_to_4k() {
        for raw in ["4K", "4k", "2160", "2160p", "2160P"] {
            assert_eq!(normalize_resolution(raw), "4k", "input {raw}");
        }
    }

    #[test]
    fn test_line_counts_gain_p_suffix() {
        assert_eq!(normalize_resolution("1080"), "1080p");
        assert_eq!(normalize_resolution("720"), "720p");
        assert_eq!(normalize_resolution("sd"), "sdp");
        assert_eq!(normalize_resolution("1080p"), "1080p");
        assert_eq!(normalize_resolution("480P"), "480P");
        assert_eq!(normalize_resolution(""), "");
    }

    #[test]
    fn test_suffix_rule_looks_at_last_character_only() {
        assert_eq!(normalize_resolution("1080 "), "1080 p");
        assert_eq!(normalize_resolution(" 4k"), " 4kp");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in ["4K", "2160", "1080", "720p", "sd", "576P"] {
            let once = normalize_resolution(raw);
            assert_eq!(normalize_resolution(&once), once, "input {raw}");
        }
    }

    #[test]
    fn test_render_does_not_touch_source_resolution() {
        let mut status = episode("Severance", "Hello, Ms. Cobel", 2, 1);
        status.resolution = Some("2160".to_string());
        assert!(status.render().ends_with("(4k)"));
        assert_eq!(status.resolution.as_deref(), Some("2160"));
    }

    #[test]
    fn test_empty_title_overrides_everything() {
        let status = NowPlaying {
            progress: 0.42,
            show_title: Some("The Bear".to_string()),
            title: String::new(),
            resolution: Some("1080".to_string()),
            season: Some(3),
            episode: Some(7),
        };
        assert_eq!(status.render(), NOTHING_PLAYING);
        assert_eq!(NowPlaying::nothing().render(), NOTHING_PLAYING);
    }

    #[test]
    fn test_live_tv_ignores_other_fields() {
        let status = NowPlaying {
            progress: 0.9,
            resolution: Some("1080".to_string()),
            ..NowPlaying::live_tv()
        };
        assert_eq!(status.render(), LIVE_TV_LABEL);
    }

    #[test]
    fn test_full_episode_line() {
        let mut status = episode("Severance", "Hello, Ms. Cobel", 2, 1);
        status.progress = 0.256;
        status.resolution = Some("4K".to_string());
        assert_eq!(
            status.render(),
            "Severance S02 · E01: Hello, Ms. Cobel [26%] (4k)"
        );
    }

    #[test]
    fn test_season_episode_pair_is_all_or_nothing() {
        let line = episode("Show", "Pilot", 1, 2).render();
        assert!(line.contains("S01 · E02:"), "{line}");

        for (season, ep) in [(0, 5), (5, 0)] {
            let line = episode("Show", "Pilot", season, ep).render();
            assert!(!line.contains(" S0"), "{line}");
            assert!(!line.contains('·'), "{line}");
            assert_eq!(line, "Show Pilot [50%]");
        }

        let mut missing = episode("Show", "Pilot", 4, 4);
        missing.episode = None;
        assert_eq!(missing.render(), "Show Pilot [50%]");
    }

    #[test]
    fn test_movie_without_show_or_resolution() {
        let status = NowPlaying {
            progress: 0.1,
            title: "Heat".to_string(),
            ..NowPlaying::default()
        };
        assert_eq!(status.render(), "Heat [10%]");
    }

    #[test]
    fn test_episode_marker_without_show_title_is_trimmed() {
        let status = NowPlaying {
            progress: 0.0,
            title: "Pilot".to_string(),
            season: Some(1),
            episode: Some(1),
            ..NowPlaying::default()
        };
        assert_eq!(status.render(), "S01 · E01: Pilot [0%]");
    }

    #[test]
    fn test_non_finite_progress_renders_as_zero() {
        for progress in [f64::NAN, f64::INFINITY, ratio(0.0, 0.0), ratio(5.0, 0.0)] {
            let status = NowPlaying {
                progress,
                title: "Heat".to_string(),
                ..NowPlaying::default()
            };
            assert_eq!(status.render(), "Heat [0%]");
        }
    }

    #[test]
    fn test_progress_rounds_and_clamps() {
        assert_eq!(progress_percent(0.004), 0);
        assert_eq!(progress_percent(0.005), 1);
        assert_eq!(progress_percent(0.999), 100);
        assert_eq!(progress_percent(1.7), 100);
        assert_eq!(progress_percent(-0.2), 0);
    }

    #[test]
    fn test_blank_resolution_is_hidden() {
        let status = NowPlaying {
            progress: 0.5,
            title: "Heat".to_string(),
            resolution: Some("  ".to_string()),
            ..NowPlaying::default()
        };
        assert_eq!(status.render(), "Heat [50%]");
    }

    #[test]
    fn test_display_matches_render() {
        let status = episode("Andor", "One Way Out", 1, 10);
        assert_eq!(status.to_string(), status.render());
    }
}
