//! Key-addressed storage for shell windows and graphics contexts

use std::collections::BTreeMap;

use dear_imgui_win32_viewports::{ContextKey, HostError, WindowKey};

/// Windows and graphics contexts owned by the application, addressed by the
/// opaque keys the viewport platform stores.
///
/// Keys start at 1 and are never reused, so a stale key held by a destroyed
/// viewport can only miss.
#[derive(Debug)]
pub struct Registry<W, C> {
    windows: BTreeMap<WindowKey, W>,
    contexts: BTreeMap<ContextKey, C>,
    next_window: u32,
    next_context: u32,
    max_windows: usize,
}

impl<W, C> Registry<W, C> {
    pub fn new(max_windows: usize) -> Self {
        Self {
            windows: BTreeMap::new(),
            contexts: BTreeMap::new(),
            next_window: 1,
            next_context: 1,
            max_windows,
        }
    }

    pub fn max_windows(&self) -> usize {
        self.max_windows
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Create a window through `open` and store it, unless the cap is reached.
    ///
    /// `open` is not called when the registry is full.
    pub fn try_insert_window(
        &mut self,
        open: impl FnOnce() -> Result<W, HostError>,
    ) -> Result<WindowKey, HostError> {
        if self.windows.len() >= self.max_windows {
            return Err(HostError::WindowLimit {
                limit: self.max_windows,
            });
        }
        let window = open()?;
        let key = WindowKey(self.next_window);
        self.next_window += 1;
        self.windows.insert(key, window);
        Ok(key)
    }

    pub fn insert_window(&mut self, window: W) -> Result<WindowKey, HostError> {
        self.try_insert_window(|| Ok(window))
    }

    pub fn remove_window(&mut self, key: WindowKey) -> Option<W> {
        self.windows.remove(&key)
    }

    pub fn window(&self, key: WindowKey) -> Option<&W> {
        self.windows.get(&key)
    }

    /// First window matching `pred`
    pub fn find_window(&self, mut pred: impl FnMut(&W) -> bool) -> Option<WindowKey> {
        self.windows
            .iter()
            .find_map(|(key, window)| pred(window).then_some(*key))
    }

    pub fn insert_context(&mut self, context: C) -> ContextKey {
        let key = ContextKey(self.next_context);
        self.next_context += 1;
        self.contexts.insert(key, context);
        key
    }

    pub fn remove_context(&mut self, key: ContextKey) -> Option<C> {
        self.contexts.remove(&key)
    }

    pub fn context(&self, key: ContextKey) -> Option<&C> {
        self.contexts.get(&key)
    }

    pub fn context_mut(&mut self, key: ContextKey) -> Option<&mut C> {
        self.contexts.get_mut(&key)
    }

    pub fn contexts(&self) -> impl Iterator<Item = (ContextKey, &C)> {
        self.contexts.iter().map(|(key, ctx)| (*key, ctx))
    }

    pub fn contexts_mut(&mut self) -> impl Iterator<Item = (ContextKey, &mut C)> {
        self.contexts.iter_mut().map(|(key, ctx)| (*key, ctx))
    }

    /// Drop every context, then every window
    pub fn clear(&mut self) {
        self.contexts.clear();
        self.windows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type Reg = Registry<&'static str, u32>;

    #[test]
    fn keys_start_at_one_and_are_not_reused() {
        let mut reg = Reg::new(8);
        let a = reg.insert_window("a").unwrap();
        let b = reg.insert_window("b").unwrap();
        assert_eq!((a, b), (WindowKey(1), WindowKey(2)));

        reg.remove_window(a);
        let c = reg.insert_window("c").unwrap();
        assert_eq!(c, WindowKey(3));
        assert_eq!(reg.window(a), None);
        assert_eq!(reg.window(c), Some(&"c"));
    }

    #[test]
    fn window_cap_is_enforced_before_opening() {
        let mut reg = Reg::new(2);
        reg.insert_window("main").unwrap();
        reg.insert_window("one").unwrap();

        let mut opened = false;
        let err = reg
            .try_insert_window(|| {
                opened = true;
                Ok("two")
            })
            .unwrap_err();
        assert!(matches!(err, HostError::WindowLimit { limit: 2 }));
        assert!(!opened);
        assert_eq!(reg.window_count(), 2);
    }

    #[test]
    fn failed_open_allocates_no_key() {
        let mut reg = Reg::new(4);
        let err = reg
            .try_insert_window(|| Err(HostError::NoEventLoop))
            .unwrap_err();
        assert!(matches!(err, HostError::NoEventLoop));
        assert_eq!(reg.insert_window("w").unwrap(), WindowKey(1));
    }

    #[test]
    fn find_window_by_predicate() {
        let mut reg = Reg::new(4);
        reg.insert_window("main").unwrap();
        let tool = reg.insert_window("tool").unwrap();
        assert_eq!(reg.find_window(|w| *w == "tool"), Some(tool));
        assert_eq!(reg.find_window(|w| *w == "gone"), None);
    }

    #[test]
    fn contexts_are_independent_of_windows() {
        let mut reg = Reg::new(4);
        let first = reg.insert_context(10);
        let second = reg.insert_context(20);
        assert_eq!(first, ContextKey(1));

        if let Some(ctx) = reg.context_mut(second) {
            *ctx += 1;
        }
        assert_eq!(reg.context(second), Some(&21));
        assert_eq!(reg.remove_context(first), Some(10));

        let keys: Vec<ContextKey> = reg.contexts().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![second]);

        reg.insert_window("w").unwrap();
        reg.clear();
        assert_eq!((reg.window_count(), reg.context_count()), (0, 0));
    }
}
