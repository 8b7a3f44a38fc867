//! Expandable System → Game → Track view over a scanned `Library`.

use std::collections::BTreeSet;

use super::model::{Library, Track};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibNode {
    System(String),
    Game { system: String, game: String },
    Track { system: String, game: String, index: usize },
}

impl LibNode {
    pub fn depth(&self) -> usize {
        match self {
            Self::System(_) => 0,
            Self::Game { .. } => 1,
            Self::Track { .. } => 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LibBrowser {
    library: Library,
    open_systems: BTreeSet<String>,
    open_games: BTreeSet<(String, String)>,
    /// Visible rows, rebuilt whenever the expansion state changes.
    rows: Vec<LibNode>,
    selected: usize,
}

impl LibBrowser {
    pub fn new(library: Library) -> Self {
        let mut b = Self {
            library,
            ..Self::default()
        };
        b.rebuild();
        b
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn rows(&self) -> &[LibNode] {
        &self.rows
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&LibNode> {
        self.rows.get(self.selected)
    }

    pub fn is_expanded(&self, node: &LibNode) -> bool {
        match node {
            LibNode::System(s) => self.open_systems.contains(s),
            LibNode::Game { system, game } => {
                self.open_games.contains(&(system.clone(), game.clone()))
            }
            LibNode::Track { .. } => false,
        }
    }

    /// Text shown for a row, without indentation.
    pub fn label(&self, node: &LibNode) -> String {
        let marker = if self.is_expanded(node) { "[-]" } else { "[+]" };
        match node {
            LibNode::System(name) => format!("{marker} {name}"),
            LibNode::Game { game, .. } => format!("{marker} {game}"),
            LibNode::Track { .. } => self.track(node).map(|t| t.title.clone()).unwrap_or_default(),
        }
    }

    fn track(&self, node: &LibNode) -> Option<&Track> {
        match node {
            LibNode::Track {
                system,
                game,
                index,
            } => self.library.tracks(system, game).get(*index),
            _ => None,
        }
    }

    fn rebuild(&mut self) {
        self.rows.clear();
        for system in self.library.systems() {
            self.rows.push(LibNode::System(system.to_string()));
            if !self.open_systems.contains(system) {
                continue;
            }
            for game in self.library.games(system) {
                self.rows.push(LibNode::Game {
                    system: system.to_string(),
                    game: game.to_string(),
                });
                if !self
                    .open_games
                    .contains(&(system.to_string(), game.to_string()))
                {
                    continue;
                }
                let count = self.library.tracks(system, game).len();
                self.rows.extend((0..count).map(|index| LibNode::Track {
                    system: system.to_string(),
                    game: game.to_string(),
                    index,
                }));
            }
        }
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }

    fn set_expanded(&mut self, node: &LibNode, open: bool) {
        match node {
            LibNode::System(s) => {
                if open {
                    self.open_systems.insert(s.clone());
                } else {
                    self.open_systems.remove(s);
                }
            }
            LibNode::Game { system, game } => {
                let key = (system.clone(), game.clone());
                if open {
                    self.open_games.insert(key);
                } else {
                    self.open_games.remove(&key);
                }
            }
            LibNode::Track { .. } => return,
        }
        self.rebuild();
    }

    /// Toggle a system or game; on a track, return it for adding.
    pub fn enter(&mut self) -> Option<Track> {
        let node = self.selected_node()?.clone();
        if let LibNode::Track { .. } = node {
            return self.track(&node).cloned();
        }
        let open = !self.is_expanded(&node);
        self.set_expanded(&node, open);
        None
    }

    /// Collapse the selected node, or select its parent.
    pub fn back(&mut self) {
        let Some(node) = self.selected_node().cloned() else {
            return;
        };
        if self.is_expanded(&node) {
            self.set_expanded(&node, false);
            return;
        }
        let parent = match node {
            LibNode::System(_) => return,
            LibNode::Game { system, .. } => LibNode::System(system),
            LibNode::Track { system, game, .. } => LibNode::Game { system, game },
        };
        if let Some(i) = self.rows.iter().position(|n| *n == parent) {
            self.selected = i;
        }
    }

    /// Every track under the selected node, in display order.
    pub fn selected_tracks(&self) -> Vec<Track> {
        match self.selected_node() {
            Some(LibNode::System(system)) => self
                .library
                .games(system)
                .into_iter()
                .flat_map(|game| self.library.tracks(system, game).iter().cloned())
                .collect(),
            Some(LibNode::Game { system, game }) => self.library.tracks(system, game).to_vec(),
            Some(node @ LibNode::Track { .. }) => self.track(node).cloned().into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn move_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn move_down(&mut self, n: usize) {
        let last = self.rows.len().saturating_sub(1);
        self.selected = self.selected.saturating_add(n).min(last);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }
}
