use serde::Serialize;
use std::fmt;

/// Assumed daily usage for a bare Watt rating
pub const WATT_HOURS_PER_DAY: f64 = 3.0;
/// Assumed daily usage for a kW rating with no period
pub const KILOWATT_HOURS_PER_DAY: f64 = 24.0;
pub const DAYS_PER_YEAR: f64 = 365.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyUnit {
    Watt,
    Kilowatt,
    KilowattHour,
}

impl EnergyUnit {
    /// Unit tokens in the order they are tried; longer spellings first
    pub const TOKENS: [(&'static str, EnergyUnit); 3] = [
        ("kwh", EnergyUnit::KilowattHour),
        ("kw", EnergyUnit::Kilowatt),
        ("w", EnergyUnit::Watt),
    ];
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Watt => "W",
            Self::Kilowatt => "kW",
            Self::KilowattHour => "kWh",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPeriod {
    Year,
    Month,
    Day,
    Unspecified,
}

impl ReportingPeriod {
    /// Period tokens in the order they are tried
    pub const TOKENS: [(&'static str, ReportingPeriod); 6] = [
        ("year", ReportingPeriod::Year),
        ("yr", ReportingPeriod::Year),
        ("month", ReportingPeriod::Month),
        ("mo", ReportingPeriod::Month),
        ("day", ReportingPeriod::Day),
        ("d", ReportingPeriod::Day),
    ];
}

/// A number, its unit and reporting period as read off a label
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParsedReading {
    pub value: f64,
    pub unit: EnergyUnit,
    pub period: ReportingPeriod,
}

impl ParsedReading {
    pub fn new(value: f64, unit: EnergyUnit, period: ReportingPeriod) -> Self {
        Self { value, unit, period }
    }

    /// Annual consumption in kWh, rounded to 2 decimals
    ///
    /// kW is read two ways: as a continuous draw when no period is given, but
    /// as an energy total already covering the period when one is. Labels in
    /// the wild use "kW" for both, so both readings are kept as-is.
    pub fn annual_kwh(&self) -> f64 {
        use EnergyUnit::*;
        use ReportingPeriod::*;

        let annual = match (self.unit, self.period) {
            (Watt, _) => self.value / 1000.0 * WATT_HOURS_PER_DAY * DAYS_PER_YEAR,
            (Kilowatt, Month) => self.value * MONTHS_PER_YEAR,
            (Kilowatt, Day) => self.value * DAYS_PER_YEAR,
            (Kilowatt, Year | Unspecified) => self.value * KILOWATT_HOURS_PER_DAY * DAYS_PER_YEAR,
            (KilowattHour, Month) => self.value * MONTHS_PER_YEAR,
            (KilowattHour, Day) => self.value * DAYS_PER_YEAR,
            (KilowattHour, Year | Unspecified) => self.value,
        };

        round2(annual)
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Round the exact binary value to `places` decimals, ties to even
///
/// `(x * 100).round() / 100` disagrees whenever the scaled product lands on
/// the other side of a half, e.g. 1.095 is stored just below 1.095 and must
/// give 1.09. Decimal formatting works on the exact value instead.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", places, value).parse().unwrap_or(value)
}
