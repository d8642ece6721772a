use chrono::{DateTime, NaiveDateTime, Utc};

/// Source of "now" for picking the default reporting window.
///
/// Hosts pass [`SystemClock`]; tests pin the window with [`FixedClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar instant that [`ViewWindow::current`](crate::ledger::ViewWindow::current)
    /// buckets. Ledger dates carry no zone, so this is the UTC wall time.
    fn window_instant(&self) -> NaiveDateTime {
        self.now().naive_utc()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
