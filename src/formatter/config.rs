#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Indentation of continued `then`/`else` lines.
    pub indent_spaces: usize,
    /// Keep every statement on one line.
    pub inline_chains: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            indent_spaces: 4,
            inline_chains: false,
        }
    }
}

impl FormatterConfig {
    pub fn inline() -> Self {
        Self {
            inline_chains: true,
            ..Self::default()
        }
    }
}
