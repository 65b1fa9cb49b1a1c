// Menu flow: main menu and difficulty selection
// Pure state plus a transition function; drawing lives in the UI module

use tracing::{debug, info};

use crate::mns_game::Preset;
use crate::mns_session::{HitRect, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuScreen {
    Main,
    DifficultySelect,
}

/// Clickable (or at least drawable) menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Normal,  // "normal game" entry on the main screen
    Hexagon, // hexagonal board, shown but disabled
    Quit,
    Chooser, // preset name and details, not clickable
    Start,
    Back,
    Next,
    Prev,
}

impl MenuItem {
    const COUNT: usize = 8;

    fn slot(self) -> usize {
        self as usize
    }
}

const MAIN_ITEMS: [MenuItem; 3] = [MenuItem::Normal, MenuItem::Hexagon, MenuItem::Quit];
const SELECT_ITEMS: [MenuItem; 5] = [
    MenuItem::Chooser,
    MenuItem::Start,
    MenuItem::Back,
    MenuItem::Next,
    MenuItem::Prev,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Stay,
    StartGame(usize), // index into the preset catalog
    Quit,
}

pub struct MenuFlow {
    screen: MenuScreen,
    presets: &'static [Preset],
    preset_index: usize,
    pending_click: bool,
    rects: [HitRect; MenuItem::COUNT],
}

impl MenuFlow {
    pub fn new(presets: &'static [Preset]) -> Self {
        MenuFlow {
            screen: MenuScreen::Main,
            presets,
            preset_index: 0,
            pending_click: false,
            rects: [HitRect::default(); MenuItem::COUNT],
        }
    }

    /// Start the difficulty cursor at a remembered preset
    pub fn with_preset(mut self, index: usize) -> Self {
        self.preset_index = index.min(self.last_index());
        self
    }

    pub fn screen(&self) -> MenuScreen {
        self.screen
    }

    pub fn items(&self) -> &'static [MenuItem] {
        match self.screen {
            MenuScreen::Main => &MAIN_ITEMS,
            MenuScreen::DifficultySelect => &SELECT_ITEMS,
        }
    }

    pub fn preset_index(&self) -> usize {
        self.preset_index
    }

    pub fn selected_preset(&self) -> Preset {
        self.presets[self.preset_index]
    }

    pub fn can_next(&self) -> bool {
        self.preset_index < self.last_index()
    }

    pub fn can_prev(&self) -> bool {
        self.preset_index > 0
    }

    pub fn notify_primary_click(&mut self) {
        self.pending_click = true;
    }

    pub fn set_item_rect(&mut self, item: MenuItem, rect: HitRect) {
        self.rects[item.slot()] = rect;
    }

    pub fn clear_hit_rects(&mut self) {
        self.rects = [HitRect::default(); MenuItem::COUNT];
    }

    /// Enabled item of the current screen under the pointer, for highlighting
    pub fn focus(&self, pointer: Point) -> Option<MenuItem> {
        self.items()
            .iter()
            .copied()
            .filter(|&item| !matches!(item, MenuItem::Hexagon | MenuItem::Chooser))
            .find(|&item| self.hit(item, pointer))
    }

    /// Consume a pending click against the pointer position. Called once per frame.
    pub fn update(&mut self, pointer: Point) -> MenuOutcome {
        if !self.pending_click {
            return MenuOutcome::Stay;
        }
        self.pending_click = false;

        match self.screen {
            MenuScreen::Main => {
                if self.hit(MenuItem::Normal, pointer) {
                    self.screen = MenuScreen::DifficultySelect;
                    debug!("difficulty selection opened");
                } else if self.hit(MenuItem::Quit, pointer) {
                    info!("quit requested from menu");
                    return MenuOutcome::Quit;
                }
            }
            MenuScreen::DifficultySelect => {
                if self.hit(MenuItem::Start, pointer) {
                    info!(preset = self.selected_preset().name, "starting game");
                    return MenuOutcome::StartGame(self.preset_index);
                }
                if self.hit(MenuItem::Back, pointer) {
                    self.screen = MenuScreen::Main;
                    debug!("back to main menu");
                } else if self.hit(MenuItem::Prev, pointer) && self.can_prev() {
                    self.preset_index -= 1;
                } else if self.hit(MenuItem::Next, pointer) && self.can_next() {
                    self.preset_index += 1;
                }
            }
        }
        MenuOutcome::Stay
    }

    fn hit(&self, item: MenuItem, pointer: Point) -> bool {
        self.rects[item.slot()].contains(pointer)
    }

    fn last_index(&self) -> usize {
        self.presets.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mns_game::PRESETS;

    fn inside(r: HitRect) -> Point {
        Point::new(r.x + 1, r.y + 1)
    }

    fn menu() -> MenuFlow {
        let mut m = MenuFlow::new(&PRESETS);
        let items = [
            MenuItem::Normal,
            MenuItem::Hexagon,
            MenuItem::Quit,
            MenuItem::Chooser,
            MenuItem::Start,
            MenuItem::Back,
            MenuItem::Next,
            MenuItem::Prev,
        ];
        for (i, item) in items.into_iter().enumerate() {
            m.set_item_rect(item, HitRect::new(0, i as i32 * 10, 20, 5));
        }
        m
    }

    fn click(m: &mut MenuFlow, item: MenuItem) -> MenuOutcome {
        let p = inside(m.rects[item.slot()]);
        m.notify_primary_click();
        m.update(p)
    }

    #[test]
    fn test_no_click_stays() {
        let mut m = menu();
        assert_eq!(m.update(inside(m.rects[MenuItem::Quit.slot()])), MenuOutcome::Stay);
    }

    #[test]
    fn test_main_to_selection_and_back() {
        let mut m = menu();
        assert_eq!(click(&mut m, MenuItem::Normal), MenuOutcome::Stay);
        assert_eq!(m.screen(), MenuScreen::DifficultySelect);
        assert_eq!(click(&mut m, MenuItem::Back), MenuOutcome::Stay);
        assert_eq!(m.screen(), MenuScreen::Main);
    }

    #[test]
    fn test_quit_from_main() {
        let mut m = menu();
        assert_eq!(click(&mut m, MenuItem::Quit), MenuOutcome::Quit);
    }

    #[test]
    fn test_hexagon_entry_is_disabled() {
        let mut m = menu();
        assert_eq!(click(&mut m, MenuItem::Hexagon), MenuOutcome::Stay);
        assert_eq!(m.screen(), MenuScreen::Main);
        assert_eq!(m.focus(inside(m.rects[MenuItem::Hexagon.slot()])), None);
    }

    #[test]
    fn test_selection_items_inactive_on_main() {
        let mut m = menu();
        assert_eq!(click(&mut m, MenuItem::Start), MenuOutcome::Stay);
        assert_eq!(m.screen(), MenuScreen::Main);
    }

    #[test]
    fn test_cursor_clamped_without_wrapping() {
        let mut m = menu();
        click(&mut m, MenuItem::Normal);
        assert!(!m.can_prev());
        click(&mut m, MenuItem::Prev);
        assert_eq!(m.preset_index(), 0);

        for _ in 0..10 {
            click(&mut m, MenuItem::Next);
        }
        assert_eq!(m.preset_index(), PRESETS.len() - 1);
        assert!(!m.can_next());
        assert_eq!(m.selected_preset().name, "Insane");

        click(&mut m, MenuItem::Prev);
        assert_eq!(m.preset_index(), PRESETS.len() - 2);
    }

    #[test]
    fn test_start_emits_selected_index() {
        let mut m = menu();
        click(&mut m, MenuItem::Normal);
        click(&mut m, MenuItem::Next);
        click(&mut m, MenuItem::Next);
        assert_eq!(click(&mut m, MenuItem::Start), MenuOutcome::StartGame(2));
    }

    #[test]
    fn test_with_preset_clamps() {
        let m = MenuFlow::new(&PRESETS).with_preset(42);
        assert_eq!(m.preset_index(), PRESETS.len() - 1);
        assert_eq!(MenuFlow::new(&PRESETS).with_preset(3).selected_preset().name, "Very Hard");
    }

    #[test]
    fn test_focus_only_on_current_screen() {
        let mut m = menu();
        let start = inside(m.rects[MenuItem::Start.slot()]);
        assert_eq!(m.focus(start), None);
        click(&mut m, MenuItem::Normal);
        assert_eq!(m.focus(start), Some(MenuItem::Start));
        assert_eq!(m.focus(inside(m.rects[MenuItem::Chooser.slot()])), None);
    }

    #[test]
    fn test_cleared_rects_ignore_clicks() {
        let mut m = menu();
        let quit = inside(m.rects[MenuItem::Quit.slot()]);
        m.clear_hit_rects();
        m.notify_primary_click();
        assert_eq!(m.update(quit), MenuOutcome::Stay);
    }
}
