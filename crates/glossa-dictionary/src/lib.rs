pub mod loaders;
pub mod types;
pub mod word_list;

pub use loaders::json::JsonLoader;
pub use loaders::load_paths;
pub use types::{DictEntry, DictFile};
pub use word_list::WordListDictionary;
