//! Electrode catalog and the user's channel selection.

use serde::Serialize;

use crate::error::ChannelError;

/// Fixed catalog of electrode positions the live view can display.
pub const AVAILABLE_CHANNELS: [&str; 9] = ["Fz", "Cz", "Pz", "C3", "C4", "F3", "F4", "P3", "P4"];

/// Channels selected when a session is created.
pub const DEFAULT_CHANNELS: [&str; 3] = ["Fz", "Cz", "Pz"];

/// Returns true if `name` is in [`AVAILABLE_CHANNELS`].
pub fn is_available(name: &str) -> bool {
    AVAILABLE_CHANNELS.contains(&name)
}

/// Ordered set of selected channel names.
///
/// Order is display order: channels appear in the order they were selected.
/// Every member is in [`AVAILABLE_CHANNELS`] and appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedChannels {
    names: Vec<String>,
}

impl Default for SelectedChannels {
    fn default() -> Self {
        Self { names: DEFAULT_CHANNELS.iter().map(|&name| name.to_owned()).collect() }
    }
}

impl SelectedChannels {
    /// Empty selection.
    pub fn empty() -> Self {
        Self { names: Vec::new() }
    }

    /// Selection from names in order. Duplicates are collapsed.
    ///
    /// # Errors
    ///
    /// - `ChannelError::Unknown` for the first name not in the catalog
    pub fn from_names<I, S>(names: I) -> Result<Self, ChannelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::empty();
        for name in names {
            selection.select(name.as_ref())?;
        }
        Ok(selection)
    }

    /// Append `name` to the selection.
    ///
    /// Returns `Ok(false)` if it was already selected.
    ///
    /// # Errors
    ///
    /// - `ChannelError::Unknown` if `name` is not in the catalog
    pub fn select(&mut self, name: &str) -> Result<bool, ChannelError> {
        if !is_available(name) {
            return Err(ChannelError::Unknown(name.to_owned()));
        }
        if self.contains(name) {
            return Ok(false);
        }
        self.names.push(name.to_owned());
        Ok(true)
    }

    /// Remove `name` from the selection. Returns false if it was not selected.
    pub fn deselect(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|selected| selected != name);
        self.names.len() != before
    }

    /// Returns true if `name` is selected.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|selected| selected == name)
    }

    /// Selected names in display order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Selected names in display order.
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    /// Number of selected channels.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_is_midline() {
        let selection = SelectedChannels::default();
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec!["Fz", "Cz", "Pz"]);
    }

    #[test]
    fn select_appends_in_display_order() {
        let mut selection = SelectedChannels::empty();
        assert_eq!(selection.select("C4"), Ok(true));
        assert_eq!(selection.select("Fz"), Ok(true));
        assert_eq!(selection.select("C4"), Ok(false));

        assert_eq!(selection.as_slice(), &["C4".to_owned(), "Fz".to_owned()]);
    }

    #[test]
    fn unknown_channels_are_rejected() {
        let mut selection = SelectedChannels::default();
        assert_eq!(selection.select("O1"), Err(ChannelError::Unknown("O1".to_owned())));
        assert_eq!(selection.len(), 3);

        assert!(SelectedChannels::from_names(["Fz", "T7"]).is_err());
    }

    #[test]
    fn deselect_preserves_remaining_order() {
        let mut selection = SelectedChannels::from_names(["P3", "Cz", "F4"]).unwrap();
        assert!(selection.deselect("Cz"));
        assert!(!selection.deselect("Cz"));

        assert_eq!(selection.iter().collect::<Vec<_>>(), vec!["P3", "F4"]);
    }
}
