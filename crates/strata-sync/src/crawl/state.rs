use std::collections::HashMap;

/// Visited set and work stack for one crawl. Paths live in an arena and
/// the stack refers to them by index.
#[derive(Debug, Default)]
pub struct CrawlState {
    paths: Vec<String>,
    index: HashMap<String, usize>,
    stack: Vec<(usize, usize)>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a path visited. Returns its arena id, or `None` when it was
    /// already seen.
    pub fn mark_visited(&mut self, path: &str) -> Option<usize> {
        if self.index.contains_key(path) {
            return None;
        }
        let id = self.paths.len();
        self.paths.push(path.to_string());
        self.index.insert(path.to_string(), id);
        Some(id)
    }

    /// Mark visited and schedule for a visit at `depth`. Returns whether
    /// the path was new.
    pub fn discover(&mut self, path: &str, depth: usize) -> bool {
        match self.mark_visited(path) {
            Some(id) => {
                self.stack.push((id, depth));
                true
            }
            None => false,
        }
    }

    /// Next `(path, depth)` to visit.
    pub fn pop(&mut self) -> Option<(String, usize)> {
        let (id, depth) = self.stack.pop()?;
        Some((self.paths[id].clone(), depth))
    }

    pub fn is_visited(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn visited_count(&self) -> usize {
        self.paths.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_each_path_once() {
        let mut state = CrawlState::new();
        assert!(state.discover("/a", 0));
        assert!(!state.discover("/a", 3));
        assert!(state.discover("/b", 1));
        assert_eq!(state.pop(), Some(("/b".to_string(), 1)));
        assert_eq!(state.pop(), Some(("/a".to_string(), 0)));
        assert_eq!(state.pop(), None);
        assert!(state.is_visited("/a"));
        assert_eq!(state.visited_count(), 2);
    }
}
