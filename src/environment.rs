use std::collections::HashMap;

/// The Environment models variable scope: a global frame plus one frame
/// per active function call.
///
/// Lookups consult the innermost frame, then the global frame.
#[derive(Debug, Clone)]
pub struct Environment<V> {
    frames: Vec<HashMap<String, V>>,
}

impl<V> Environment<V> {
    pub fn new() -> Self {
        Environment {
            frames: vec![HashMap::new()],
        }
    }

    /// Bind the key to the given value in the innermost frame, replacing
    /// any previous binding there.
    pub fn assign(&mut self, key: String, value: V) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(key, value);
        }
    }

    /// Access the value behind a key in the environment.
    pub fn lookup(&self, key: &str) -> Option<&V> {
        let innermost = self.frames.last().and_then(|frame| frame.get(key));
        innermost.or_else(|| self.frames.first().and_then(|frame| frame.get(key)))
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Drop the innermost frame. The global frame is never dropped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl<V> Default for Environment<V> {
    fn default() -> Self {
        Self::new()
    }
}
