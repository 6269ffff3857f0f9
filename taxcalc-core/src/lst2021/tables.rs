//! Allowance tables indexed by the year pensions or old-age relief began
//! (index 1 = 2005 and earlier, index 36 = 2040 and later).

use rust_decimal::Decimal;

/// Pension allowance rate in per mille (TAB1), also used as the old-age
/// relief rate (TAB4).
const RATE_PER_MILLE: [i64; 37] = [
    0, 400, 384, 368, 352, 336, 320, 304, 288, 272, 256, 240, 224, 208, 192, 176, 160, 152, 144,
    136, 128, 120, 112, 104, 96, 88, 80, 72, 64, 56, 48, 40, 32, 24, 16, 8, 0,
];

/// Pension allowance cap (TAB2).
const PENSION_CAP: [i64; 37] = [
    0, 3000, 2880, 2760, 2640, 2520, 2400, 2280, 2160, 2040, 1920, 1800, 1680, 1560, 1440, 1320,
    1200, 1140, 1080, 1020, 960, 900, 840, 780, 720, 660, 600, 540, 480, 420, 360, 300, 240, 180,
    120, 60, 0,
];

/// Pension allowance supplement (TAB3).
const PENSION_SUPPLEMENT: [i64; 37] = [
    0, 900, 864, 828, 792, 756, 720, 684, 648, 612, 576, 540, 504, 468, 432, 396, 360, 342, 324,
    306, 288, 270, 252, 234, 216, 198, 180, 162, 144, 126, 108, 90, 72, 54, 36, 18, 0,
];

/// Old-age relief cap (TAB5).
const AGE_RELIEF_CAP: [i64; 37] = [
    0, 1900, 1824, 1748, 1672, 1596, 1520, 1444, 1368, 1292, 1216, 1140, 1064, 988, 912, 836,
    760, 722, 684, 646, 608, 570, 532, 494, 456, 418, 380, 342, 304, 266, 228, 190, 152, 114, 76,
    38, 0,
];

/// Maps the start year of a pension or of old-age relief to its table index.
pub(super) fn index_for_year(year: i32) -> usize {
    if year < 2006 {
        1
    } else if year < 2040 {
        (year - 2004) as usize
    } else {
        36
    }
}

pub(super) fn tab1(index: usize) -> Decimal {
    Decimal::new(RATE_PER_MILLE[index], 3)
}

pub(super) fn tab2(index: usize) -> Decimal {
    Decimal::from(PENSION_CAP[index])
}

pub(super) fn tab3(index: usize) -> Decimal {
    Decimal::from(PENSION_SUPPLEMENT[index])
}

pub(super) fn tab4(index: usize) -> Decimal {
    tab1(index)
}

pub(super) fn tab5(index: usize) -> Decimal {
    Decimal::from(AGE_RELIEF_CAP[index])
}
