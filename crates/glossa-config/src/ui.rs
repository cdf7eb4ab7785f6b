use serde::{Deserialize, Serialize};

fn default_show_dictionary_bar() -> bool {
    true
}

fn default_word_list_limit() -> usize {
    100
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    /// Hiding the bar drops every mute overlay
    #[serde(default = "default_show_dictionary_bar")]
    pub show_dictionary_bar: bool,
    #[serde(default = "default_word_list_limit")]
    pub word_list_limit: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_dictionary_bar: default_show_dictionary_bar(),
            word_list_limit: default_word_list_limit(),
        }
    }
}
