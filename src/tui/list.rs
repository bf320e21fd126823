use crate::browser::ThemeEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Off,
    /// The filter input has focus; keys are text.
    Editing,
    /// A filter narrows the list but navigation keys work again.
    Applied,
}

/// Cursor, paging and filtering over the entries of one directory.
#[derive(Debug, Clone)]
pub struct ThemeList {
    entries: Vec<ThemeEntry>,
    /// Indices into `entries` that pass the filter.
    visible: Vec<usize>,
    cursor: usize,
    per_page: usize,
    filter: String,
    filter_state: FilterState,
}

impl Default for ThemeList {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            visible: Vec::new(),
            cursor: 0,
            per_page: 10,
            filter: String::new(),
            filter_state: FilterState::Off,
        }
    }

    /// Replace the whole list. Any filter is dropped and the cursor resets.
    pub fn set_entries(&mut self, entries: Vec<ThemeEntry>) {
        self.entries = entries;
        self.filter.clear();
        self.filter_state = FilterState::Off;
        self.refilter();
    }

    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Position of the cursor among the visible entries.
    pub fn index(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&ThemeEntry> {
        self.visible.get(self.cursor).map(|&i| &self.entries[i])
    }

    pub fn visible(&self) -> impl Iterator<Item = &ThemeEntry> + '_ {
        self.visible.iter().map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.entries.len()
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.len() {
            self.cursor += 1;
        }
    }

    pub fn go_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn go_to_end(&mut self) {
        self.cursor = self.len().saturating_sub(1);
    }

    pub fn page(&self) -> usize {
        self.cursor / self.per_page
    }

    pub fn total_pages(&self) -> usize {
        self.len().div_ceil(self.per_page).max(1)
    }

    /// First visible position of the current page.
    pub fn page_start(&self) -> usize {
        self.page() * self.per_page
    }

    /// Move one page forward, keeping the row within the page when possible.
    pub fn next_page(&mut self) {
        if self.page() + 1 < self.total_pages() {
            self.cursor = (self.cursor + self.per_page).min(self.len() - 1);
        }
    }

    pub fn prev_page(&mut self) {
        if self.page() > 0 {
            self.cursor -= self.per_page;
        }
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    pub fn is_editing_filter(&self) -> bool {
        self.filter_state == FilterState::Editing
    }

    pub fn start_filter(&mut self) {
        self.filter_state = FilterState::Editing;
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.refilter();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.refilter();
    }

    /// Leave the filter input, keeping the narrowed list.
    pub fn accept_filter(&mut self) {
        self.filter_state = if self.filter.is_empty() {
            FilterState::Off
        } else {
            FilterState::Applied
        };
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.filter_state = FilterState::Off;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| fuzzy_match(&self.filter, &e.name))
            .map(|(i, _)| i)
            .collect();
        self.cursor = 0;
    }
}

/// Case-insensitive subsequence match. An empty needle matches everything.
fn fuzzy_match(needle: &str, haystack: &str) -> bool {
    let mut hay = haystack.chars().flat_map(char::to_lowercase);
    needle
        .chars()
        .flat_map(char::to_lowercase)
        .all(|c| hay.any(|h| h == c))
}
