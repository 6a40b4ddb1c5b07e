use std::fmt;
use std::rc::Rc;

use crate::record::{CandidateFile, ImageId};

/// URI-like reference to a displayable resource, e.g. `bytes://img-…/shoe.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleKey(String);

impl HandleKey {
    pub fn new(id: &ImageId, name: &str) -> Self {
        Self(format!("bytes://{}/{}", id, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform capability that turns raw file content into something the UI can
/// draw, and takes it back again.
pub trait HandleProvider {
    fn acquire(&self, id: &ImageId, file: &CandidateFile) -> anyhow::Result<HandleKey>;
    fn release(&self, key: &HandleKey);
}

/// Exclusive owner of one acquired resource.
///
/// The resource is returned to its provider when the handle is dropped, which
/// is the only release path. Removing a record from the collection and tearing
/// the collection down both end in that drop, so a handle is released exactly
/// once and cannot be touched afterwards.
pub struct DisplayHandle {
    key: HandleKey,
    provider: Rc<dyn HandleProvider>,
}

impl DisplayHandle {
    pub fn acquire(
        provider: &Rc<dyn HandleProvider>,
        id: &ImageId,
        file: &CandidateFile,
    ) -> anyhow::Result<Self> {
        let key = provider.acquire(id, file)?;
        Ok(Self {
            key,
            provider: Rc::clone(provider),
        })
    }

    pub fn key(&self) -> &HandleKey {
        &self.key
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        tracing::trace!(key = %self.key, "releasing display handle");
        self.provider.release(&self.key);
    }
}

impl fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayHandle")
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::{HandleKey, HandleProvider};
    use crate::record::{CandidateFile, ImageId};

    /// Provider double that records every acquire/release and can be told to
    /// fail a specific acquire call.
    #[derive(Default)]
    pub struct CountingProvider {
        acquired: RefCell<Vec<HandleKey>>,
        released: RefCell<Vec<HandleKey>>,
        calls: Cell<usize>,
        fail_on: Cell<Option<usize>>,
    }

    impl CountingProvider {
        pub fn shared() -> (Rc<Self>, Rc<dyn HandleProvider>) {
            let provider = Rc::new(Self::default());
            let dyn_provider: Rc<dyn HandleProvider> = provider.clone();
            (provider, dyn_provider)
        }

        /// Make the `n`th acquire call (0-based, counted from now on) fail.
        pub fn fail_on_call(&self, n: usize) {
            self.fail_on.set(Some(self.calls.get() + n));
        }

        pub fn acquired(&self) -> usize {
            self.acquired.borrow().len()
        }

        pub fn released(&self) -> usize {
            self.released.borrow().len()
        }

        pub fn live(&self) -> usize {
            self.acquired() - self.released()
        }

        pub fn release_count_of(&self, key: &HandleKey) -> usize {
            self.released.borrow().iter().filter(|k| *k == key).count()
        }
    }

    impl HandleProvider for CountingProvider {
        fn acquire(&self, id: &ImageId, file: &CandidateFile) -> anyhow::Result<HandleKey> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if self.fail_on.get() == Some(call) {
                anyhow::bail!("provider refused {}", file.name);
            }
            let key = HandleKey::new(id, &file.name);
            self.acquired.borrow_mut().push(key.clone());
            Ok(key)
        }

        fn release(&self, key: &HandleKey) {
            self.released.borrow_mut().push(key.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::CountingProvider;
    use super::*;

    fn file(name: &str) -> CandidateFile {
        CandidateFile::from_bytes(name, "image/png", vec![1, 2, 3])
    }

    #[test]
    fn key_embeds_id_and_name() {
        let id = ImageId::from_raw("img-1-abc");
        assert_eq!(
            HandleKey::new(&id, "shoe.png").as_str(),
            "bytes://img-1-abc/shoe.png"
        );
    }

    #[test]
    fn drop_releases_exactly_once() {
        let (counter, provider) = CountingProvider::shared();
        let id = ImageId::from_raw("img-1-abc");
        let handle = DisplayHandle::acquire(&provider, &id, &file("a.png")).unwrap();
        let key = handle.key().clone();
        assert_eq!(counter.live(), 1);

        drop(handle);

        assert_eq!(counter.release_count_of(&key), 1);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn failed_acquire_leaves_nothing_to_release() {
        let (counter, provider) = CountingProvider::shared();
        counter.fail_on_call(0);
        let id = ImageId::from_raw("img-1-abc");

        assert!(DisplayHandle::acquire(&provider, &id, &file("a.png")).is_err());
        assert_eq!(counter.acquired(), 0);
        assert_eq!(counter.released(), 0);
    }
}
