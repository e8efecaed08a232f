//! Report prompts and the `{name}` placeholder renderer that fills them.

use crate::utils::error::{GreenMeError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const PLACEHOLDER_PATTERN: &str = r"\{([a-z_]+)\}";

pub const SUMMARY_TEMPLATE: &str = "\
Generate a detailed sustainability lifestyle report for {nickname}, who lives in {region} in a household of {family_size} members.
Their current lifestyle details are:
- Energy usage contributing {energy_emissions} kg of CO2 emissions monthly, with {renewable_ratio}% from renewables.
- Water usage of {water_consumption} liters monthly.
- Weekly travel of {weekly_travel} km by {transport_mode}, contributing {commute_emissions} kg of CO2 emissions.
- Waste generation of {weekly_waste} kg weekly, recycling {recycle_types}.

Provide recommendations to improve their sustainability practices and reduce their carbon footprint.
";

pub const DETAILED_TEMPLATE: &str = "\
Generate a detailed sustainability lifestyle report for {nickname}, who lives in {region} in a household of {family_size} members.
Their current lifestyle details are:
- Energy usage contributing {energy_emissions} kg of CO2 emissions monthly, with {renewable_ratio}% from renewables.
- Water usage of {water_consumption} liters monthly.
- Weekly travel of {weekly_travel} km by {transport_mode}, contributing {commute_emissions} kg of CO2 emissions.
- Waste generation of {weekly_waste} kg weekly, recycling {recycle_types}.

Provide recommendations to improve their sustainability practices and reduce their carbon footprint across:

1. Energy:
    - Suggest practical ways to cut energy emissions and reliance on non-renewable sources.
2. Water:
    - Give tips for conserving water and reducing wasteful consumption.
3. Transportation:
    - Highlight actionable strategies to lower travel emissions given {transport_mode} and {commute_emissions} kg of CO2 per week.
4. Waste Management:
    - Recommend ways to reduce the {weekly_waste} kg of weekly waste and improve recycling of {recycle_types}.

Make sure every suggestion is:
- Specific to {nickname}'s household size, region and current practices.
- Measurable, with clear outcomes such as CO2 savings, cost reductions or water saved.
- Balanced between environmental impact and practicality.
";

#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    template: &'static str,
}

impl PromptTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    fn placeholder_regex() -> Result<Regex> {
        Regex::new(PLACEHOLDER_PATTERN).map_err(|e| GreenMeError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })
    }

    /// Placeholder names in order of first appearance.
    pub fn input_variables(&self) -> Result<Vec<String>> {
        let re = Self::placeholder_regex()?;
        let mut names: Vec<String> = Vec::new();
        for caps in re.captures_iter(self.template) {
            let name = &caps[1];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    pub fn render(&self, values: &HashMap<&str, String>) -> Result<String> {
        if let Some(missing) = self
            .input_variables()?
            .into_iter()
            .find(|name| !values.contains_key(name.as_str()))
        {
            return Err(GreenMeError::TemplateError { variable: missing });
        }

        let re = Self::placeholder_regex()?;
        let rendered = re.replace_all(self.template, |caps: &regex::Captures| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReportTemplate {
    #[default]
    Summary,
    Detailed,
}

impl ReportTemplate {
    pub fn prompt(&self) -> PromptTemplate {
        match self {
            ReportTemplate::Summary => PromptTemplate::new(SUMMARY_TEMPLATE),
            ReportTemplate::Detailed => PromptTemplate::new(DETAILED_TEMPLATE),
        }
    }
}

impl fmt::Display for ReportTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportTemplate::Summary => f.write_str("summary"),
            ReportTemplate::Detailed => f.write_str("detailed"),
        }
    }
}

impl FromStr for ReportTemplate {
    type Err = GreenMeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(ReportTemplate::Summary),
            "detailed" => Ok(ReportTemplate::Detailed),
            other => Err(GreenMeError::InvalidConfigValueError {
                field: "report.template".to_string(),
                value: other.to_string(),
                reason: "Valid templates: summary, detailed".to_string(),
            }),
        }
    }
}
