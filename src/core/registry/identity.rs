use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

/// An object the host can hand to the watcher.
///
/// The watcher never keeps one alive: it stores a weak reference and a descriptor.
pub trait Watchable: Send + Sync + 'static {
    /// Runtime type name recorded in leak lists
    fn type_name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Host-assigned unique id, used by id allow-lists
    fn native_id(&self) -> Option<u64> {
        None
    }
}

/// Stable numeric identity of a live object.
///
/// Equal for the same object for as long as it lives.
pub trait IdentityHasher: Send + Sync {
    fn hash(
        &self,
        object: &Arc<dyn Watchable>,
    ) -> u64;
}

/// Derives identity from the allocation address, which cannot be reused while the object lives
#[derive(Debug, Default, Clone, Copy)]
pub struct AddressHasher;

impl IdentityHasher for AddressHasher {
    fn hash(
        &self,
        object: &Arc<dyn Watchable>,
    ) -> u64 {
        let address = Arc::as_ptr(object) as *const () as usize;
        let mut hasher = DefaultHasher::new();
        address.hash(&mut hasher);
        hasher.finish()
    }
}

/// `my_crate::ui::Button<T>` -> `Button`
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
