//! Effective put settings for an interactive session.
//!
//! A single [`Settings`] value is created when the session starts and is then
//! updated in place by every successful `set` command. Each `put` is issued
//! with whatever the record holds at that moment.

/// Tube used when nothing else is configured.
pub const DEFAULT_TUBE: &str = "default";
/// Priority used when nothing else is configured. Lower is more urgent.
pub const DEFAULT_PRIORITY: u32 = 1;
/// Delay in seconds before a new job becomes ready.
pub const DEFAULT_DELAY: u32 = 0;
/// Seconds a worker may hold a reserved job before it is released again.
pub const DEFAULT_TTR: u32 = 60;

/// The four queue parameters an operator can change with `set`.
///
/// # Examples
///
/// ```rust
/// use tubeline::Settings;
///
/// let mut settings = Settings::default();
/// assert_eq!(settings.tube(), "default");
/// assert_eq!(settings.ttr(), 60);
///
/// settings.set_priority(1024);
/// assert_eq!(settings.priority(), 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    tube: String,
    priority: u32,
    delay: u32,
    ttr: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tube: DEFAULT_TUBE.to_string(),
            priority: DEFAULT_PRIORITY,
            delay: DEFAULT_DELAY,
            ttr: DEFAULT_TTR,
        }
    }
}

impl Settings {
    pub fn tube(&self) -> &str {
        &self.tube
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Delay in seconds.
    pub fn delay(&self) -> u32 {
        self.delay
    }

    /// Time-to-run in seconds.
    pub fn ttr(&self) -> u32 {
        self.ttr
    }

    pub fn set_tube(&mut self, tube: impl Into<String>) {
        self.tube = tube.into();
    }

    pub fn set_priority(&mut self, priority: u32) {
        self.priority = priority;
    }

    pub fn set_delay(&mut self, delay: u32) {
        self.delay = delay;
    }

    pub fn set_ttr(&mut self, ttr: u32) {
        self.ttr = ttr;
    }
}
