use glossa_types::{GroupId, TabId, TabSummary};

use crate::error::TabError;
use crate::navigation::Navigation;

#[derive(Debug, Clone)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    pub icon: Option<String>,
    pub group: Option<GroupId>,
    /// Text currently typed for this tab
    pub input: String,
    pub navigation: Navigation,
}

impl Tab {
    fn new(id: TabId, group: Option<GroupId>) -> Self {
        Self {
            id,
            title: String::new(),
            icon: None,
            group,
            input: String::new(),
            navigation: Navigation::new(),
        }
    }

    pub fn word(&self) -> Option<&str> {
        self.navigation.current().word()
    }
}

/// Ordered open tabs; there is always at least one
#[derive(Debug, Clone)]
pub struct TabManager {
    tabs: Vec<Tab>,
    active: usize,
    next_id: u64,
}

impl TabManager {
    pub fn new(group: Option<GroupId>) -> Self {
        Self {
            tabs: vec![Tab::new(TabId(1), group)],
            active: 0,
            next_id: 2,
        }
    }

    /// Open an idle tab right after the active one, inheriting its group
    pub fn create_tab(&mut self, switch_to: bool) -> TabId {
        let id = TabId(self.next_id);
        self.next_id += 1;

        let group = self.active().group;
        let index = self.active + 1;
        self.tabs.insert(index, Tab::new(id, group));

        if switch_to {
            self.active = index;
        }

        tracing::debug!("Opened {} ({} tabs)", id, self.tabs.len());
        id
    }

    /// Close a tab. Returns false, leaving everything untouched, if it is
    /// the last one. Closing the active tab selects the one before it.
    pub fn close_tab(&mut self, id: TabId) -> Result<bool, TabError> {
        let index = self.index_of(id)?;

        if self.tabs.len() == 1 {
            tracing::debug!("Refusing to close the last tab");
            return Ok(false);
        }

        self.tabs.remove(index);
        if index < self.active || (index == self.active && index > 0) {
            self.active -= 1;
        }

        tracing::debug!("Closed {}", id);
        Ok(true)
    }

    pub fn close_current(&mut self) -> bool {
        let id = self.active().id;
        self.close_tab(id).unwrap_or(false)
    }

    pub fn switch_to(&mut self, id: TabId) -> Result<(), TabError> {
        self.active = self.index_of(id)?;
        Ok(())
    }

    pub fn switch_to_next(&mut self) -> TabId {
        self.active = (self.active + 1) % self.tabs.len();
        self.active().id
    }

    pub fn switch_to_previous(&mut self) -> TabId {
        self.active = (self.active + self.tabs.len() - 1) % self.tabs.len();
        self.active().id
    }

    pub fn active(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn get_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tab> {
        self.tabs.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn set_title(&mut self, id: TabId, title: &str) -> Result<(), TabError> {
        let tab = self.get_mut(id).ok_or(TabError::UnknownTab(id))?;
        tab.title = title.to_string();
        Ok(())
    }

    pub fn set_icon(&mut self, id: TabId, icon: Option<String>) -> Result<(), TabError> {
        let tab = self.get_mut(id).ok_or(TabError::UnknownTab(id))?;
        tab.icon = icon;
        Ok(())
    }

    /// Move every tab using `group` to the no-group state. Returns how many moved.
    pub fn reassign_group(&mut self, group: GroupId) -> usize {
        let mut moved = 0;
        for tab in self.tabs.iter_mut().filter(|tab| tab.group == Some(group)) {
            tab.group = None;
            moved += 1;
        }
        moved
    }

    pub fn summaries(&self) -> Vec<TabSummary> {
        self.tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| TabSummary {
                id: tab.id,
                title: if tab.title.is_empty() {
                    "(untitled)".to_string()
                } else {
                    tab.title.clone()
                },
                active: index == self.active,
            })
            .collect()
    }

    fn index_of(&self, id: TabId) -> Result<usize, TabError> {
        self.tabs
            .iter()
            .position(|tab| tab.id == id)
            .ok_or(TabError::UnknownTab(id))
    }
}
