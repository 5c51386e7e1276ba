use anyhow::{anyhow, Result};

pub const DAY_COUNT: u8 = 6;
pub const PERIOD_COUNT: u8 = 6;

/// Short labels for day indexes 0..=5.
pub const DAY_LABELS: [&str; DAY_COUNT as usize] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A (day, period) cell of the weekly grid. Day is 0 (Monday) to 5 (Saturday),
/// period is 1 to 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    day: u8,
    period: u8,
}

impl Slot {
    pub fn new(day: u8, period: u8) -> Result<Self> {
        if day >= DAY_COUNT {
            return Err(anyhow!("Day must be between 0 and {}, got {}", DAY_COUNT - 1, day));
        }
        if period == 0 || period > PERIOD_COUNT {
            return Err(anyhow!("Period must be between 1 and {}, got {}", PERIOD_COUNT, period));
        }
        Ok(Self { day, period })
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn period(&self) -> u8 {
        self.period
    }

    pub fn day_label(&self) -> &'static str {
        DAY_LABELS[self.day as usize]
    }

    /// The slot `days` columns and `periods` rows away, wrapping around the grid.
    pub fn offset(&self, days: i8, periods: i8) -> Slot {
        let day = (self.day as i8 + days).rem_euclid(DAY_COUNT as i8) as u8;
        let period = (self.period as i8 - 1 + periods).rem_euclid(PERIOD_COUNT as i8) as u8 + 1;
        Slot { day, period }
    }

    /// Every slot in grid order: row by row (period), then column by column (day).
    pub fn all() -> impl Iterator<Item = Slot> {
        (1..=PERIOD_COUNT).flat_map(|period| (0..DAY_COUNT).map(move |day| Slot { day, period }))
    }
}

impl Default for Slot {
    fn default() -> Self {
        Slot { day: 0, period: 1 }
    }
}
