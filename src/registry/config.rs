//! Registry configuration

/// Capture registry configuration options
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Capacity of the event broadcast channel
    ///
    /// Subscribers that fall further behind than this lose the oldest events.
    pub event_capacity: usize,

    /// Assert that enumeration, reload and shutdown run on the thread that
    /// built the registry
    pub enforce_owner_thread: bool,

    /// Load a capture for every attached video device during construction
    pub load_on_start: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            enforce_owner_thread: true,
            load_on_start: false,
        }
    }
}

impl RegistryConfig {
    /// Set the event channel capacity (minimum 1)
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Enable or disable the owner-thread assertion
    pub fn enforce_owner_thread(mut self, enforce: bool) -> Self {
        self.enforce_owner_thread = enforce;
        self
    }

    /// Load all attached video devices when the registry is built
    pub fn load_on_start(mut self, load: bool) -> Self {
        self.load_on_start = load;
        self
    }
}
