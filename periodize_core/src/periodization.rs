//! Fixed 21-week periodization table.
//!
//! Three blocks of seven weeks. Weeks 1-6 of a block trade volume for
//! intensity; the seventh week is a deload.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

pub const WEEKS_PER_BLOCK: u32 = 7;
pub const PROGRAM_BLOCKS: u32 = 3;
pub const PROGRAM_WEEKS: u32 = WEEKS_PER_BLOCK * PROGRAM_BLOCKS;

/// Prescription parameters for one program week
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct WeekParameters {
    pub week: u32,
    pub intensity: Decimal,
    pub sets: u32,
    pub target_reps: u32,
    pub is_deload: bool,
}

const fn row(week: u32, intensity: Decimal, sets: u32, target_reps: u32) -> WeekParameters {
    WeekParameters {
        week,
        intensity,
        sets,
        target_reps,
        is_deload: false,
    }
}

const fn deload(week: u32) -> WeekParameters {
    WeekParameters {
        week,
        intensity: dec!(0.65),
        sets: 5,
        target_reps: 10,
        is_deload: true,
    }
}

/// Built once, shared for the life of the process
static TABLE: Lazy<[WeekParameters; PROGRAM_WEEKS as usize]> = Lazy::new(|| {
    [
        // Block 1
        row(1, dec!(0.750), 5, 10),
        row(2, dec!(0.775), 5, 9),
        row(3, dec!(0.800), 4, 8),
        row(4, dec!(0.825), 4, 7),
        row(5, dec!(0.850), 4, 6),
        row(6, dec!(0.875), 3, 5),
        deload(7),
        // Block 2
        row(8, dec!(0.775), 5, 9),
        row(9, dec!(0.800), 5, 8),
        row(10, dec!(0.825), 4, 7),
        row(11, dec!(0.850), 4, 6),
        row(12, dec!(0.875), 3, 5),
        row(13, dec!(0.900), 3, 4),
        deload(14),
        // Block 3
        row(15, dec!(0.800), 5, 8),
        row(16, dec!(0.825), 4, 7),
        row(17, dec!(0.850), 4, 6),
        row(18, dec!(0.875), 3, 5),
        row(19, dec!(0.900), 3, 4),
        row(20, dec!(0.925), 3, 3),
        deload(21),
    ]
});

/// Look up the parameters for `week`
///
/// Weeks outside 1..=21 fall back to week 1's row.
pub fn week_parameters(week: u32) -> WeekParameters {
    match week.checked_sub(1).and_then(|idx| TABLE.get(idx as usize)) {
        Some(params) => *params,
        None => {
            tracing::debug!("Week {} outside the program table, using week 1", week);
            TABLE[0]
        }
    }
}

/// Block number for a week: `ceil(week / 7)`
pub fn block_for_week(week: u32) -> u32 {
    week.div_ceil(WEEKS_PER_BLOCK)
}

pub fn is_deload_week(week: u32) -> bool {
    week > 0 && week % WEEKS_PER_BLOCK == 0
}

/// The whole table, in week order
pub fn all_weeks() -> &'static [WeekParameters] {
    TABLE.as_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_21_weeks_in_order() {
        let weeks = all_weeks();
        assert_eq!(weeks.len(), 21);
        for (idx, params) in weeks.iter().enumerate() {
            assert_eq!(params.week, idx as u32 + 1);
        }
    }

    #[test]
    fn test_deload_weeks() {
        for week in 1..=PROGRAM_WEEKS {
            let params = week_parameters(week);
            assert_eq!(params.is_deload, is_deload_week(week), "week {}", week);
            if params.is_deload {
                assert_eq!(params.intensity, dec!(0.65));
                assert_eq!(params.sets, 5);
                assert_eq!(params.target_reps, 10);
            }
        }
        assert!(is_deload_week(7));
        assert!(is_deload_week(14));
        assert!(is_deload_week(21));
    }

    #[test]
    fn test_blocks_ramp_intensity() {
        for block in 0..PROGRAM_BLOCKS {
            let start = block * WEEKS_PER_BLOCK + 1;
            for week in start..start + 5 {
                let a = week_parameters(week);
                let b = week_parameters(week + 1);
                assert!(b.intensity > a.intensity, "week {} -> {}", week, week + 1);
                assert!(b.sets <= a.sets);
                assert!(b.target_reps <= a.target_reps);
            }
        }
    }

    #[test]
    fn test_week_one() {
        let params = week_parameters(1);
        assert_eq!(params.intensity, dec!(0.75));
        assert!(!params.is_deload);
    }

    #[test]
    fn test_out_of_range_falls_back_to_week_one() {
        assert_eq!(week_parameters(0), week_parameters(1));
        assert_eq!(week_parameters(22), week_parameters(1));
        assert_eq!(week_parameters(500).intensity, dec!(0.75));
    }

    #[test]
    fn test_block_for_week() {
        assert_eq!(block_for_week(1), 1);
        assert_eq!(block_for_week(7), 1);
        assert_eq!(block_for_week(8), 2);
        assert_eq!(block_for_week(14), 2);
        assert_eq!(block_for_week(15), 3);
        assert_eq!(block_for_week(21), 3);
    }
}
