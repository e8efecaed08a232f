use crate::core::emissions::{commute_emissions, static_emissions, EmissionsEstimator};
use crate::core::report::ReportComposer;
use crate::domain::model::{
    EmissionsEstimate, EstimateSource, FootprintBreakdown, HouseholdProfile, Notice,
};
use crate::domain::ports::{CarbonApi, TextGenerator, UsageTable};
use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// Everything produced by one form submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub energy: EmissionsEstimate,
    pub breakdown: FootprintBreakdown,
    pub report: Option<String>,
    pub notices: Vec<Notice>,
}

/// Result of a dry run. Built without touching any service or the usage table.
#[derive(Debug, Clone)]
pub struct Preview {
    pub breakdown: FootprintBreakdown,
    pub prompt: String,
}

pub struct GreenMeEngine<T: UsageTable, A: CarbonApi, G: TextGenerator> {
    estimator: EmissionsEstimator<T, A>,
    composer: ReportComposer<G>,
}

impl<T: UsageTable, A: CarbonApi, G: TextGenerator> GreenMeEngine<T, A, G> {
    pub fn new(estimator: EmissionsEstimator<T, A>, composer: ReportComposer<G>) -> Self {
        Self {
            estimator,
            composer,
        }
    }

    pub fn estimator(&self) -> &EmissionsEstimator<T, A> {
        &self.estimator
    }

    pub async fn run(&self, profile: &HouseholdProfile, country: Option<&str>) -> Result<Submission> {
        profile.validate()?;
        tracing::info!("Estimating footprint for {}", profile.nickname);

        let outcome = self
            .estimator
            .estimate(profile.monthly_energy_kwh, country)
            .await;
        let mut notices = outcome.notices;

        let breakdown = FootprintBreakdown {
            energy_kg: outcome.estimate.value_kg_co2,
            commute_kg: commute_emissions(profile.weekly_travel_km),
        };
        tracing::info!(
            "Energy {:.2} kg ({}), commute {:.2} kg",
            breakdown.energy_kg,
            outcome.estimate.source,
            breakdown.commute_kg
        );

        let report = match self.composer.compose(profile, &breakdown).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!(
                    "Error generating tips: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                notices.push(Notice::ReportFailed {
                    message: e.user_friendly_message(),
                });
                None
            }
        };

        Ok(Submission {
            energy: outcome.estimate,
            breakdown,
            report,
            notices,
        })
    }

    pub fn preview(&self, profile: &HouseholdProfile) -> Result<Preview> {
        profile.validate()?;

        let breakdown = FootprintBreakdown {
            energy_kg: static_emissions(profile.monthly_energy_kwh),
            commute_kg: commute_emissions(profile.weekly_travel_km),
        };
        let prompt = self.composer.render_prompt(profile, &breakdown)?;

        Ok(Preview { breakdown, prompt })
    }
}

impl Submission {
    pub fn used_api(&self) -> bool {
        self.energy.source == EstimateSource::Api
    }
}
