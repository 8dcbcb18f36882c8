use unicode_width::UnicodeWidthStr;

use crate::query::clamp_cursor;

/// The text of the search input and the cursor inside it.
///
/// The cursor is tracked in characters; the tokenizer works in bytes, so both
/// views are exposed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryBuffer {
    content: String,
    cursor_char_pos: usize,
    max_len: Option<usize>,
}

impl QueryBuffer {
    #[must_use]
    pub fn new(content: String) -> Self {
        let cursor_char_pos = content.chars().count();
        Self {
            content,
            cursor_char_pos,
            max_len: None,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Limits the content to `max_len` characters; longer input is rejected.
    #[must_use]
    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn cursor_byte_pos(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor_char_pos)
            .map_or(self.content.len(), |(i, _)| i)
    }

    pub fn cursor_char_pos(&self) -> usize {
        self.cursor_char_pos
    }

    pub fn cursor_display_pos(&self) -> usize {
        self.content[..self.cursor_byte_pos()].width()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn len_chars(&self) -> usize {
        self.content.chars().count()
    }

    fn room_for(&self, chars: usize) -> bool {
        self.max_len
            .is_none_or(|max| self.len_chars() + chars <= max)
    }

    /// Returns false when the length limit rejected the character.
    pub fn insert_char(&mut self, c: char) -> bool {
        if !self.room_for(1) {
            return false;
        }
        let byte_pos = self.cursor_byte_pos();
        self.content.insert(byte_pos, c);
        self.cursor_char_pos += 1;
        true
    }

    pub fn insert_str(&mut self, s: &str) -> bool {
        let chars = s.chars().count();
        if !self.room_for(chars) {
            return false;
        }
        let byte_pos = self.cursor_byte_pos();
        self.content.insert_str(byte_pos, s);
        self.cursor_char_pos += chars;
        true
    }

    pub fn delete_char_before(&mut self) -> bool {
        if self.cursor_char_pos == 0 {
            return false;
        }
        let byte_pos = self.cursor_byte_pos();
        let prev_char_start = self.content[..byte_pos]
            .char_indices()
            .last()
            .map_or(0, |(i, _)| i);
        self.content.remove(prev_char_start);
        self.cursor_char_pos -= 1;
        true
    }

    pub fn delete_char_after(&mut self) -> bool {
        if self.cursor_char_pos >= self.len_chars() {
            return false;
        }
        let byte_pos = self.cursor_byte_pos();
        self.content.remove(byte_pos);
        true
    }

    pub fn move_left(&mut self) {
        if self.cursor_char_pos > 0 {
            self.cursor_char_pos -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_char_pos < self.len_chars() {
            self.cursor_char_pos += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor_char_pos = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor_char_pos = self.len_chars();
    }

    pub fn move_word_left(&mut self) {
        let chars: Vec<char> = self.content.chars().collect();
        let mut pos = self.cursor_char_pos;

        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }

        self.cursor_char_pos = pos;
    }

    pub fn move_word_right(&mut self) {
        let chars: Vec<char> = self.content.chars().collect();
        let len = chars.len();
        let mut pos = self.cursor_char_pos;

        while pos < len && !chars[pos].is_whitespace() {
            pos += 1;
        }
        while pos < len && chars[pos].is_whitespace() {
            pos += 1;
        }

        self.cursor_char_pos = pos;
    }

    /// Places the cursor at a byte offset, snapping back to a char boundary.
    pub fn set_cursor_byte(&mut self, byte_pos: usize) {
        let byte_pos = clamp_cursor(&self.content, byte_pos);
        self.cursor_char_pos = self.content[..byte_pos].chars().count();
    }

    /// Replaces the whole text. Autocomplete splices bypass the length limit,
    /// since candidates were already filtered against it.
    pub fn replace(&mut self, content: &str, cursor_byte_pos: usize) {
        self.content = content.to_string();
        self.set_cursor_byte(cursor_byte_pos);
    }

    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor_char_pos = self.len_chars();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_char_pos = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Appends a space to a non-empty query so the next keystroke starts a new term.
#[must_use]
pub fn add_space(query: &str) -> String {
    if !query.is_empty() && !query.ends_with(' ') {
        format!("{query} ")
    } else {
        query.to_string()
    }
}

/// Drops the single trailing space added by [`add_space`] or by autocomplete.
#[must_use]
pub fn remove_space(query: &str) -> &str {
    query.strip_suffix(' ').unwrap_or(query)
}
