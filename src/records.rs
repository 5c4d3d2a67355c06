//! Request and response bodies of the planning API, apart from schedule tasks
//!
//! The server owns these schemas. Only the fields this crate reads or sends are typed; everything else
//! is kept in a flattened map so that nothing is lost when echoing records back.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::task::FieldId;

/// A field (a plot of land), as sent on creation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewField {
    pub variety: String,
    /// `new_plant` or `ratoon`
    pub crop_type: String,
    pub area_rai: f64,
    pub province: String,
    pub district: String,
    /// `sand`, `loam` or `clay`
    pub soil_texture: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_m3h: Option<f64>,
    /// `well`, `surface` or `none`
    pub irrigation_src: String,
    /// `low`, `med` or `high`
    pub budget_tier: String,
    /// `organic`, `chemical` or `mixed`
    pub fert_base: String,
    /// `YYYY-MM-DD`
    pub planting_date: String,
}

/// A field, as stored on the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub field_id: FieldId,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplanRequest {
    pub reason: String,
    /// Problems picked in the UI (e.g. `drought`, `pest`)
    pub problems: Vec<String>,
}

/// A field measurement. Every reading is optional
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMeasurement {
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cane_height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_moist_pct: Option<f64>,
    /// `dry`, `ok` or `wet`
    pub moist_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pest_scale: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

/// A delivery of harvested cane to a mill
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDelivery {
    /// `YYYY-MM-DD`. The UI locks it to the last day of the plan
    pub date: String,
    pub mill_name: String,
    pub mill_quota_ton: f64,
    /// `HH:MM`
    pub time_window_from: Option<String>,
    /// `HH:MM`
    pub time_window_to: Option<String>,
    pub notes: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KbIngestUrl {
    pub url: String,
    pub tags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KbIngestText {
    pub title: String,
    pub tags: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}


/// The summary the per-rai analysis endpoint returns
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Infographic {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub chart: Option<Chart>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    /// Numbers and pre-formatted strings both happen
    pub value: Value,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Data of a doughnut chart
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub series: Vec<f64>,
}

impl Infographic {
    pub fn title(&self) -> &str {
        self.title.as_deref().filter(|t| t.is_empty() == false).unwrap_or("Result")
    }

    /// Chart slices as (label, share of the total in percent). Missing labels are left empty
    pub fn chart_shares(&self) -> Vec<(String, f64)> {
        let chart = match &self.chart {
            None => return Vec::new(),
            Some(c) => c,
        };
        let total: f64 = chart.series.iter().sum();
        chart.series.iter()
            .enumerate()
            .map(|(i, v)| {
                let label = chart.labels.get(i).cloned().unwrap_or_default();
                let share = if total == 0.0 { 0.0 } else { v * 100.0 / total };
                (label, share)
            })
            .collect()
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let value = match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        write!(f, "{}: {} {}", self.name, value, self.unit.as_deref().unwrap_or(""))?;
        Ok(())
    }
}

impl Display for Infographic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title())?;
        if self.summary.is_empty() == false {
            writeln!(f, "{}", self.summary)?;
        }
        for bullet in &self.bullets {
            writeln!(f, "  - {}", bullet)?;
        }
        for metric in &self.metrics {
            writeln!(f, "  {}", metric.to_string().trim_end())?;
        }
        for (label, share) in self.chart_shares() {
            writeln!(f, "  {:<20} {:>5.1}%", label, share)?;
        }
        Ok(())
    }
}
