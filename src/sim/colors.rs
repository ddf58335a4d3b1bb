//! Bot color assignment
//!
//! Owned by the simulation. Bots draw distinct palette colors that never
//! match the player's, and hand them back when the round resets.

use rand::Rng;

#[derive(Debug, Clone)]
pub struct ColorPool {
    palette: Vec<String>,
    available: Vec<String>,
    assigned: Vec<String>,
    player_color: String,
}

impl ColorPool {
    pub fn new(palette: Vec<String>, player_color: impl Into<String>) -> Self {
        let mut pool = Self {
            available: palette.clone(),
            palette,
            assigned: Vec::new(),
            player_color: String::new(),
        };
        pool.set_player_color(player_color);
        pool
    }

    pub fn player_color(&self) -> &str {
        &self.player_color
    }

    /// Reserve `color` for the player, returning the previous one to the pool
    pub fn set_player_color(&mut self, color: impl Into<String>) {
        let previous = std::mem::replace(&mut self.player_color, color.into());
        if !previous.is_empty()
            && self.palette.contains(&previous)
            && !self.available.contains(&previous)
            && !self.assigned.contains(&previous)
        {
            self.available.push(previous);
        }
        self.available.retain(|c| *c != self.player_color);
        self.assigned.retain(|c| *c != self.player_color);
    }

    /// Draw a color for a bot.
    ///
    /// Once the palette is exhausted colors repeat.
    pub fn assign<R: Rng>(&mut self, rng: &mut R) -> String {
        if self.available.is_empty() {
            log::warn!("Color palette exhausted, reusing colors");
            if self.palette.is_empty() {
                return self.player_color.clone();
            }
            return self.palette[rng.random_range(0..self.palette.len())].clone();
        }

        let color = self.available.swap_remove(rng.random_range(0..self.available.len()));
        self.assigned.push(color.clone());
        color
    }

    /// Return a bot color to the pool
    pub fn release(&mut self, color: &str) {
        if let Some(idx) = self.assigned.iter().position(|c| c == color) {
            let color = self.assigned.swap_remove(idx);
            if color != self.player_color && !self.available.contains(&color) {
                self.available.push(color);
            }
        }
    }

    /// Return every bot color, keeping the player's reservation
    pub fn reset(&mut self) {
        self.assigned.clear();
        self.available = self.palette.clone();
        self.available.retain(|c| *c != self.player_color);
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }
}
