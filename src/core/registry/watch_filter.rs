use std::collections::HashSet;

use super::Watchable;

/// Admission rule for lifecycle registrations in structured mode.
///
/// An object is admitted when its native id is allow-listed. Otherwise it is admitted unless an
/// allow-list exists or its type name matches an ignored type (case-insensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchFilter {
    allowed_ids: HashSet<u64>,
    ignored_types: HashSet<String>,
}

impl WatchFilter {
    pub fn new<'a>(
        allowed_ids: impl IntoIterator<Item = u64>,
        ignored_types: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            allowed_ids: allowed_ids.into_iter().collect(),
            ignored_types: ignored_types.into_iter().map(str::to_lowercase).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed_ids.is_empty() && self.ignored_types.is_empty()
    }

    pub fn admits(
        &self,
        type_name: &str,
        native_id: Option<u64>,
    ) -> bool {
        if let Some(id) = native_id {
            if self.allowed_ids.contains(&id) {
                return true;
            }
        }
        if !self.allowed_ids.is_empty() {
            return false;
        }
        !self.ignored_types.contains(&type_name.to_lowercase())
    }

    pub fn admits_object(
        &self,
        object: &dyn Watchable,
    ) -> bool {
        self.admits(object.type_name(), object.native_id())
    }
}
