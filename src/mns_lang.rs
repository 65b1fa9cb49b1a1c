// Multi-language support module
// Localized UI strings for English and German, looked up by symbolic field

use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Clone)]
pub struct Assets {
    // Main menu
    pub menu_normal: &'static str,
    pub menu_hexagon: &'static str,
    pub menu_quit_game: &'static str,

    // Difficulty selection
    pub preset_names: [&'static str; 6], // same order as the preset catalog
    pub start_game: &'static str,
    pub back: &'static str,
    pub next_arrow: &'static str,
    pub prev_arrow: &'static str,
    pub field_size: &'static str,
    pub mine_count: &'static str,

    // Overlays
    pub paused: &'static str,
    pub esc_to_resume: &'static [&'static str],
    pub game_over: &'static str,
    pub game_over_2nd: &'static [&'static str],
    pub you_won: &'static str,
    pub you_won_2nd: &'static [&'static str],
    pub restart: &'static str,
    pub retry: &'static str,
    pub quit: &'static str,

    // Focused button decoration
    pub focus_left: &'static str,
    pub focus_right: &'static str,

    // Status bar
    pub status_mines_fmt: &'static str, // " Mines: {} "
    pub status_pause_hint: &'static str,

    // Terminal size messages
    pub tsmsg_line1: &'static str,
    pub tsmsg_line2: &'static str, // "Minimum size required: {} x {}"
    pub tsmsg_title: &'static str,

    // Menu notice when a game cannot start
    pub notice_cannot_start: &'static str,
}

/// Returns English language assets
pub fn english_assets() -> Assets {
    Assets {
        menu_normal: "Normal game",
        menu_hexagon: "Hexagon (soon)",
        menu_quit_game: "Quit game",

        preset_names: ["Easy", "Medium", "Hard", "Very Hard", "Extreme", "Insane"],
        start_game: "Start",
        back: "Back",
        next_arrow: ">",
        prev_arrow: "<",
        field_size: "Field: ",
        mine_count: "Mines: ",

        paused: "Paused",
        esc_to_resume: &["Press Esc to resume", "Esc brings you back"],
        game_over: "Game over",
        game_over_2nd: &[
            "That one was a mine.",
            "Boom. Better luck next time.",
            "The field wins this round.",
        ],
        you_won: "You won!",
        you_won_2nd: &[
            "Every mine avoided.",
            "Field cleared, well played.",
            "Not a single misstep.",
        ],
        restart: "Restart",
        retry: "Retry",
        quit: "Quit",

        focus_left: "> ",
        focus_right: " <",

        status_mines_fmt: " Mines: {} ",
        status_pause_hint: "Esc: Pause ",

        tsmsg_line1: "Terminal layout too small",
        tsmsg_line2: "Minimum size required: {} x {}",
        tsmsg_title: "Resize needed",

        notice_cannot_start: "Cannot start this game:",
    }
}

/// Returns German language assets
pub fn german_assets() -> Assets {
    Assets {
        menu_normal: "Normales Spiel",
        menu_hexagon: "Hexagon (bald)",
        menu_quit_game: "Spiel beenden",

        preset_names: ["Leicht", "Mittel", "Schwer", "Sehr schwer", "Extrem", "Wahnsinn"],
        start_game: "Start",
        back: "Zurück",
        next_arrow: ">",
        prev_arrow: "<",
        field_size: "Feld: ",
        mine_count: "Minen: ",

        paused: "Pause",
        esc_to_resume: &["Esc zum Fortsetzen", "Mit Esc geht es weiter"],
        game_over: "Verloren",
        game_over_2nd: &[
            "Das war eine Mine.",
            "Bumm. Nächstes Mal klappt es.",
            "Diese Runde geht an das Feld.",
        ],
        you_won: "Gewonnen!",
        you_won_2nd: &[
            "Allen Minen ausgewichen.",
            "Feld geräumt, gut gespielt.",
            "Kein einziger Fehltritt.",
        ],
        restart: "Neustart",
        retry: "Nochmal",
        quit: "Beenden",

        focus_left: "> ",
        focus_right: " <",

        status_mines_fmt: " Minen: {} ",
        status_pause_hint: "Esc: Pause ",

        tsmsg_line1: "Terminal zu klein",
        tsmsg_line2: "Mindestgröße: {} x {}",
        tsmsg_title: "Größe anpassen",

        notice_cannot_start: "Spiel kann nicht starten:",
    }
}

/// Main language manager struct
/// Holds the current language code and active string assets
pub struct Lang {
    pub current_lang: String,
    pub assets: Assets,
}

impl Lang {
    /// Creates a new Lang instance from a language code
    /// Normalizes input (e.g., "de-AT" → "de") and defaults to English for unsupported languages
    pub fn new(lang_code: &str) -> Self {
        let code = if lang_code.to_lowercase().starts_with("de") { "de" } else { "en" };

        Lang {
            current_lang: code.to_string(),
            assets: if code == "de" { german_assets() } else { english_assets() },
        }
    }

    /// Localized preset name by catalog index
    pub fn preset_name(&self, index: usize) -> &'static str {
        let names = &self.assets.preset_names;
        names[index.min(names.len() - 1)]
    }

    /// Wrap a button label in the focus decoration
    pub fn decorate(&self, label: &str) -> String {
        format!("{}{}{}", self.assets.focus_left, label, self.assets.focus_right)
    }

    /// One of several equivalent lines, chosen at random
    pub fn pick<R: Rng>(variants: &[&'static str], rng: &mut R) -> &'static str {
        variants.choose(rng).copied().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_language_normalization() {
        assert_eq!(Lang::new("de-AT").current_lang, "de");
        assert_eq!(Lang::new("DE").assets.quit, "Beenden");
        assert_eq!(Lang::new("fr").current_lang, "en");
        assert_eq!(Lang::new("").assets.quit, "Quit");
    }

    #[test]
    fn test_preset_names_clamped() {
        let lang = Lang::new("en");
        assert_eq!(lang.preset_name(0), "Easy");
        assert_eq!(lang.preset_name(17), "Insane");
    }

    #[test]
    fn test_decorate() {
        assert_eq!(Lang::new("en").decorate("Retry"), "> Retry <");
    }

    #[test]
    fn test_pick_returns_a_variant() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let lang = Lang::new("en");
        for _ in 0..20 {
            let line = Lang::pick(lang.assets.game_over_2nd, &mut rng);
            assert!(lang.assets.game_over_2nd.contains(&line));
        }
        assert_eq!(Lang::pick(&[], &mut rng), "");
    }

    #[test]
    fn test_every_overlay_has_variants() {
        for lang in [Lang::new("en"), Lang::new("de")] {
            assert!(!lang.assets.esc_to_resume.is_empty());
            assert!(!lang.assets.game_over_2nd.is_empty());
            assert!(!lang.assets.you_won_2nd.is_empty());
        }
    }
}
