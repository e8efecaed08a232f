use crate::core::prompt::ReportTemplate;
use crate::domain::model::{FootprintBreakdown, HouseholdProfile};
use crate::domain::ports::TextGenerator;
use crate::utils::error::Result;
use std::collections::HashMap;

pub struct ReportComposer<G: TextGenerator> {
    generator: G,
    template: ReportTemplate,
}

impl<G: TextGenerator> ReportComposer<G> {
    pub fn new(generator: G, template: ReportTemplate) -> Self {
        Self {
            generator,
            template,
        }
    }

    pub fn render_prompt(
        &self,
        profile: &HouseholdProfile,
        breakdown: &FootprintBreakdown,
    ) -> Result<String> {
        self.template
            .prompt()
            .render(&report_inputs(profile, breakdown))
    }

    /// Renders the prompt and asks the generator for the report text.
    pub async fn compose(
        &self,
        profile: &HouseholdProfile,
        breakdown: &FootprintBreakdown,
    ) -> Result<String> {
        let prompt = self.render_prompt(profile, breakdown)?;
        tracing::debug!("Rendered {} prompt ({} chars)", self.template, prompt.len());
        self.generator.generate(&prompt).await
    }
}

pub fn report_inputs(
    profile: &HouseholdProfile,
    breakdown: &FootprintBreakdown,
) -> HashMap<&'static str, String> {
    HashMap::from([
        ("nickname", profile.nickname.clone()),
        ("region", profile.region.clone()),
        ("family_size", profile.family_size.to_string()),
        ("energy_emissions", format!("{:.2}", breakdown.energy_kg)),
        ("renewable_ratio", profile.renewable_percent.to_string()),
        ("water_consumption", profile.monthly_water_liters.to_string()),
        ("weekly_travel", profile.weekly_travel_km.to_string()),
        ("transport_mode", profile.transport_mode.to_string()),
        ("commute_emissions", format!("{:.2}", breakdown.commute_kg)),
        ("weekly_waste", profile.weekly_waste_kg.to_string()),
        ("recycle_types", profile.recycle_types()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RecycledMaterial, TransportMode};
    use crate::utils::error::GreenMeError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingGenerator {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().ok_or_else(|| GreenMeError::UnexpectedStatus {
                service: "stub".to_string(),
                status: 500,
                body: String::new(),
            })
        }
    }

    fn profile() -> HouseholdProfile {
        HouseholdProfile {
            nickname: "Sam".to_string(),
            region: "Lisbon".to_string(),
            family_size: 4,
            monthly_energy_kwh: 100.0,
            renewable_percent: 35,
            monthly_water_liters: 12000.0,
            weekly_travel_km: 80.5,
            transport_mode: TransportMode::ElectricVehicle,
            weekly_waste_kg: 9.0,
            recycled: vec![RecycledMaterial::Glass, RecycledMaterial::Paper],
        }
    }

    fn breakdown() -> FootprintBreakdown {
        FootprintBreakdown {
            energy_kg: 50.0,
            commute_kg: 9.66,
        }
    }

    #[test]
    fn test_inputs_format_profile_and_emissions() {
        let inputs = report_inputs(&profile(), &breakdown());
        assert_eq!(inputs["nickname"], "Sam");
        assert_eq!(inputs["family_size"], "4");
        assert_eq!(inputs["energy_emissions"], "50.00");
        assert_eq!(inputs["weekly_travel"], "80.5");
        assert_eq!(inputs["commute_emissions"], "9.66");
        assert_eq!(inputs["transport_mode"], "Electric Vehicle");
        assert_eq!(inputs["recycle_types"], "Glass, Paper");
    }

    #[tokio::test]
    async fn test_compose_sends_rendered_prompt() {
        let composer = ReportComposer::new(
            RecordingGenerator::replying("Switch to LED bulbs."),
            ReportTemplate::Summary,
        );

        let report = composer.compose(&profile(), &breakdown()).await.unwrap();

        assert_eq!(report, "Switch to LED bulbs.");
        let prompts = composer.generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("report for Sam, who lives in Lisbon"));
        assert!(prompts[0].contains("50.00 kg of CO2 emissions monthly, with 35% from renewables"));
    }

    #[tokio::test]
    async fn test_compose_surfaces_generator_failure() {
        let composer = ReportComposer::new(RecordingGenerator::failing(), ReportTemplate::Detailed);
        let err = composer.compose(&profile(), &breakdown()).await.unwrap_err();
        assert!(matches!(err, GreenMeError::UnexpectedStatus { .. }));
    }
}
