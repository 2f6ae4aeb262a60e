use crate::commands;

/// The line being typed plus the submitted-command history.
///
/// `history_index` points into `command_history`, or equals its length when
/// the prompt shows a fresh line.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    input_buffer: String,
    command_history: Vec<String>,
    history_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Older,
    Newer,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    pub fn history(&self) -> &[String] {
        &self.command_history
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn append_char(&mut self, ch: char) {
        self.input_buffer.push(ch);
    }

    pub fn overwrite(&mut self, value: &str) {
        self.input_buffer = value.to_string();
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn navigate(&mut self, direction: HistoryDirection) {
        match direction {
            HistoryDirection::Older => self.history_up(),
            HistoryDirection::Newer => self.history_down(),
        }
    }

    pub fn history_up(&mut self) {
        if self.command_history.is_empty() || self.history_index == 0 {
            return;
        }
        self.history_index -= 1;
        self.input_buffer = self.command_history[self.history_index].clone();
    }

    pub fn history_down(&mut self) {
        if self.history_index + 1 < self.command_history.len() {
            self.history_index += 1;
            self.input_buffer = self.command_history[self.history_index].clone();
        } else {
            self.history_index = self.command_history.len();
            self.input_buffer.clear();
        }
    }

    /// Replaces the line with the only command it prefixes. Returns whether
    /// the line changed.
    pub fn complete(&mut self) -> bool {
        match commands::autocomplete(&self.input_buffer) {
            Some(name) if name != self.input_buffer => {
                self.input_buffer = name.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn submit(&mut self) -> String {
        let line = std::mem::take(&mut self.input_buffer);
        if !line.is_empty() {
            self.command_history.push(line.clone());
        }
        self.history_index = self.command_history.len();
        line
    }
}
