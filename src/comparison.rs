//! Running-cost and carbon comparison between two appliances

use crate::config::DEFAULT_CO2_FACTOR;
use crate::extraction::{round2, round_to};
use serde::{Deserialize, Serialize, Serializer};

/// Appliance data supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceProfile {
    pub name: String,
    /// Annual consumption in kWh, usually from a label estimate
    #[serde(default)]
    pub annual_kwh: Option<f64>,
    /// Purchase price
    #[serde(default)]
    pub price: Option<f64>,
    /// Electricity price per kWh
    #[serde(default)]
    pub energy_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplianceMetrics {
    pub name: String,
    pub annual_kwh: f64,
    pub annual_cost: f64,
    pub monthly_cost: f64,
    pub carbon_kg: f64,
    pub price: Option<f64>,
}

/// Months for the cheaper-to-run appliance to recover a price difference
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payback {
    Months(f64),
    /// Running costs are equal, so the difference is never recovered
    Never,
}

impl Serialize for Payback {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payback::Months(months) => serializer.serialize_f64(*months),
            Payback::Never => serializer.serialize_str("∞"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    #[serde(rename = "A")]
    pub a: ApplianceMetrics,
    #[serde(rename = "B")]
    pub b: ApplianceMetrics,
    pub recommended: String,
    pub time_to_save_months: Payback,
}

/// Cost and emissions calculator
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    /// kg CO2 per kWh
    co2_factor: f64,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(DEFAULT_CO2_FACTOR)
    }
}

impl Comparator {
    pub fn new(co2_factor: f64) -> Self {
        Self { co2_factor }
    }

    pub fn metrics(&self, profile: &ApplianceProfile) -> ApplianceMetrics {
        let annual_kwh = profile.annual_kwh.unwrap_or(0.0);
        let annual_cost = round2(annual_kwh * profile.energy_rate.unwrap_or(0.0));

        ApplianceMetrics {
            name: profile.name.clone(),
            annual_kwh,
            annual_cost,
            monthly_cost: round2(annual_cost / 12.0),
            carbon_kg: round2(annual_kwh * self.co2_factor),
            price: profile.price,
        }
    }

    /// Compare two appliances; ties in running cost recommend `b`
    pub fn compare(&self, a: &ApplianceProfile, b: &ApplianceProfile) -> Comparison {
        let a = self.metrics(a);
        let b = self.metrics(b);

        let recommended = if a.annual_cost < b.annual_cost {
            a.name.clone()
        } else {
            b.name.clone()
        };

        let price_diff = (a.price.unwrap_or(0.0) - b.price.unwrap_or(0.0)).abs();
        let yearly_savings = (a.annual_cost - b.annual_cost).abs();
        let time_to_save_months = if yearly_savings == 0.0 {
            Payback::Never
        } else {
            Payback::Months(round_to(price_diff / yearly_savings * 12.0, 1))
        };

        Comparison {
            a,
            b,
            recommended,
            time_to_save_months,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, kwh: Option<f64>, price: Option<f64>, rate: Option<f64>) -> ApplianceProfile {
        ApplianceProfile {
            name: name.to_string(),
            annual_kwh: kwh,
            price,
            energy_rate: rate,
        }
    }

    #[test]
    fn test_metrics() {
        let m = Comparator::default().metrics(&profile("Fridge", Some(150.0), Some(500.0), Some(0.3)));
        assert_eq!(m.annual_kwh, 150.0);
        assert_eq!(m.annual_cost, 45.0);
        assert_eq!(m.monthly_cost, 3.75);
        assert_eq!(m.carbon_kg, 123.0);
        assert_eq!(m.price, Some(500.0));
    }

    #[test]
    fn test_missing_values_count_as_zero() {
        let m = Comparator::default().metrics(&profile("Unknown", None, None, None));
        assert_eq!(m.annual_kwh, 0.0);
        assert_eq!(m.annual_cost, 0.0);
        assert_eq!(m.carbon_kg, 0.0);
    }

    #[test]
    fn test_compare_recommends_cheaper_to_run() {
        let a = profile("Old", Some(400.0), Some(300.0), Some(0.25));
        let b = profile("New", Some(150.0), Some(600.0), Some(0.25));

        let c = Comparator::default().compare(&a, &b);

        assert_eq!(c.a.annual_cost, 100.0);
        assert_eq!(c.b.annual_cost, 37.5);
        assert_eq!(c.recommended, "New");
        // 300 extra paid back at 62.5/year
        assert_eq!(c.time_to_save_months, Payback::Months(57.6));
    }

    #[test]
    fn test_equal_running_costs_never_pay_back() {
        let a = profile("A", Some(100.0), Some(200.0), Some(0.2));
        let b = profile("B", Some(100.0), Some(250.0), Some(0.2));

        let c = Comparator::default().compare(&a, &b);

        assert_eq!(c.recommended, "B");
        assert_eq!(c.time_to_save_months, Payback::Never);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["time_to_save_months"], "∞");
        assert_eq!(json["A"]["name"], "A");
    }

    #[test]
    fn test_payback_rounds_ties_to_even() {
        // 1 extra paid back at 48/year is exactly 0.25 months
        let a = profile("Cheap", Some(480.0), Some(101.0), Some(0.1));
        let b = profile("Free", Some(0.0), Some(100.0), Some(0.1));

        let c = Comparator::default().compare(&a, &b);

        assert_eq!(c.recommended, "Free");
        assert_eq!(c.time_to_save_months, Payback::Months(0.2));
    }

    #[test]
    fn test_custom_co2_factor() {
        let m = Comparator::new(0.5).metrics(&profile("Heater", Some(1000.0), None, None));
        assert_eq!(m.carbon_kg, 500.0);
    }

    #[test]
    fn test_profile_deserializes_with_missing_fields() {
        let p: ApplianceProfile = serde_json::from_str(r#"{"name":"Lamp","annual_kwh":43.8}"#).unwrap();
        assert_eq!(p.annual_kwh, Some(43.8));
        assert_eq!(p.price, None);
    }
}
