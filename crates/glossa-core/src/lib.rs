pub mod aggregator;
pub mod dictionary;
pub mod error;
pub mod groups;
pub mod history;
pub mod lookup;
pub mod navigation;
pub mod preprocess;
pub mod registry;
pub mod session;
pub mod tabs;

pub use aggregator::{Query, SearchAggregator, SearchEvent, SearchSettings};
pub use dictionary::{Article, Capabilities, Definition, Dictionary, DictionaryLoader, LoadError};
pub use error::{BackendError, GroupError, LookupFailure, TabError};
pub use groups::{Group, Groups, MuteSet};
pub use history::History;
pub use lookup::{ArticleLookup, FoundArticle, LookupOutcome};
pub use navigation::{Navigation, ViewState, Visit};
pub use registry::Registry;
pub use session::Session;
pub use tabs::{Tab, TabManager};

#[cfg(test)]
mod tests;
