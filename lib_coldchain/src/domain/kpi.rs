//! # KPI Snapshot
//!
//! A flat mapping of metric name to value, replaced wholesale on every
//! successful `/api/kpis` fetch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named KPI values keyed by their wire names (`slaPercentage`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiSnapshot(BTreeMap<String, f64>);

impl KpiSnapshot {
    pub const SLA_PERCENTAGE: &'static str = "slaPercentage";
    pub const TEMPERATURE_COMPLIANCE: &'static str = "temperatureCompliance";
    pub const AVG_DELIVERY_TIME: &'static str = "avgDeliveryTime";
    pub const PRODUCT_CONDITION_RATE: &'static str = "productConditionRate";
    pub const CUSTOMER_SATISFACTION: &'static str = "customerSatisfaction";
    pub const MTT_DETECTION: &'static str = "mttDetection";
    pub const ALERT_COUNT: &'static str = "alertCount";

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.0.get(metric).copied()
    }

    pub fn insert(&mut self, metric: impl Into<String>, value: f64) {
        self.0.insert(metric.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn sla_percentage(&self) -> Option<f64> {
        self.get(Self::SLA_PERCENTAGE)
    }

    pub fn temperature_compliance(&self) -> Option<f64> {
        self.get(Self::TEMPERATURE_COMPLIANCE)
    }

    /// Minutes.
    pub fn avg_delivery_time(&self) -> Option<f64> {
        self.get(Self::AVG_DELIVERY_TIME)
    }

    pub fn product_condition_rate(&self) -> Option<f64> {
        self.get(Self::PRODUCT_CONDITION_RATE)
    }

    /// Score out of 5.
    pub fn customer_satisfaction(&self) -> Option<f64> {
        self.get(Self::CUSTOMER_SATISFACTION)
    }

    /// Mean time to detect, in seconds.
    pub fn mtt_detection(&self) -> Option<f64> {
        self.get(Self::MTT_DETECTION)
    }

    pub fn alert_count(&self) -> Option<f64> {
        self.get(Self::ALERT_COUNT)
    }
}

impl FromIterator<(String, f64)> for KpiSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
