/// How far an attempt has got, counted in locked questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub submitted: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Locked questions as a percentage of the quiz, for progress bars.
    #[must_use]
    pub fn percent_submitted(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.submitted as f64 * 100.0 / self.total as f64
    }
}
