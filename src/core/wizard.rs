use crate::core::pricing;
use crate::core::submission;
use crate::domain::model::{
    AreaUnits, BusinessCategory, ContactInfo, EstimateInput, EstimateOption, EstimateResult, Lead,
};
use crate::domain::ports::LeadRepository;
use crate::utils::error::{Result, SiteError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    SelectCategory,
    SelectArea,
    SelectOptions,
}

/// Live summary shown next to every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateSummary {
    pub step: WizardStep,
    pub category: Option<&'static str>,
    pub area: u32,
    pub square_meters: u32,
    pub options: Vec<&'static str>,
    /// `None` until a category is chosen.
    pub estimate: Option<EstimateResult>,
}

/// Three-step estimate calculator.
///
/// Steps only move one at a time. Leaving `SelectCategory` requires a category;
/// going back never clears anything. The contact form is independent of the
/// step: opening or cancelling it leaves the wizard where it was.
#[derive(Debug, Clone, Default)]
pub struct EstimateWizard {
    step: WizardStep,
    input: EstimateInput,
    contact: Option<ContactInfo>,
}

impl EstimateWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn input(&self) -> &EstimateInput {
        &self.input
    }

    pub fn select_category(&mut self, category: BusinessCategory) {
        self.input.category = Some(category);
    }

    pub fn set_area_units(&mut self, units: u32) -> Result<()> {
        self.input.area = AreaUnits::new(units)?;
        Ok(())
    }

    pub fn set_option(&mut self, option: EstimateOption, on: bool) {
        self.input.options.set(option, on);
    }

    pub fn toggle_option(&mut self, option: EstimateOption) {
        self.input.options.toggle(option);
    }

    /// Advance one step. Staying on the last step is a no-op.
    pub fn next(&mut self) -> Result<WizardStep> {
        let next = match self.step() {
            WizardStep::SelectCategory => {
                if self.input.category.is_none() {
                    return Err(SiteError::MissingCategory);
                }
                WizardStep::SelectArea
            }
            WizardStep::SelectArea | WizardStep::SelectOptions => WizardStep::SelectOptions,
        };
        self.step = next;
        Ok(next)
    }

    /// Go back one step. Staying on the first step is a no-op.
    pub fn back(&mut self) -> WizardStep {
        let prev = match self.step() {
            WizardStep::SelectOptions => WizardStep::SelectArea,
            WizardStep::SelectArea | WizardStep::SelectCategory => WizardStep::SelectCategory,
        };
        self.step = prev;
        prev
    }

    /// Recomputed from the current input on every call.
    pub fn estimate(&self) -> EstimateResult {
        pricing::estimate_for(&self.input)
    }

    pub fn summary(&self) -> EstimateSummary {
        EstimateSummary {
            step: self.step(),
            category: self.input.category.map(BusinessCategory::label),
            area: self.input.area.get(),
            square_meters: self.input.area.square_meters(),
            options: self.input.options.selected().map(EstimateOption::label).collect(),
            estimate: self.input.category.map(|_| self.estimate()),
        }
    }

    /// Opens an empty contact form. Needs a category, like the request button.
    pub fn open_contact(&mut self) -> Result<&mut ContactInfo> {
        if self.input.category.is_none() {
            return Err(SiteError::MissingCategory);
        }
        Ok(self.contact.get_or_insert_with(ContactInfo::default))
    }

    pub fn contact_mut(&mut self) -> Option<&mut ContactInfo> {
        self.contact.as_mut()
    }

    pub fn is_contact_open(&self) -> bool {
        self.contact.is_some()
    }

    /// Discards whatever was typed into the contact form.
    pub fn cancel_contact(&mut self) {
        self.contact = None;
    }

    /// Submits the open contact form. On success the form is discarded; on any
    /// error the wizard and the form are left exactly as they were.
    pub async fn submit<R>(&mut self, repository: &R) -> Result<Lead>
    where
        R: LeadRepository + ?Sized,
    {
        let contact = self
            .contact
            .as_ref()
            .ok_or_else(|| SiteError::InvalidInput {
                field: "contact".to_string(),
                value: String::new(),
                reason: "contact form is not open".to_string(),
            })?;

        let lead = submission::submit(repository, contact, &self.input, self.estimate()).await?;
        self.contact = None;
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryBackend;

    #[test]
    fn test_cannot_leave_first_step_without_category() {
        let mut wizard = EstimateWizard::new();
        let err = wizard.next().unwrap_err();
        assert!(matches!(err, SiteError::MissingCategory));
        assert_eq!(wizard.step(), WizardStep::SelectCategory);
    }

    #[test]
    fn test_forward_then_back_preserves_input() {
        let mut wizard = EstimateWizard::new();
        wizard.select_category(BusinessCategory::Retail);
        assert_eq!(wizard.next().unwrap(), WizardStep::SelectArea);
        wizard.set_area_units(75).unwrap();
        assert_eq!(wizard.next().unwrap(), WizardStep::SelectOptions);
        wizard.set_option(EstimateOption::Lighting, true);
        wizard.toggle_option(EstimateOption::Signage);

        let snapshot = wizard.input().clone();

        assert_eq!(wizard.back(), WizardStep::SelectArea);
        assert_eq!(wizard.back(), WizardStep::SelectCategory);
        assert_eq!(wizard.back(), WizardStep::SelectCategory);
        assert_eq!(wizard.input(), &snapshot);

        wizard.next().unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.next().unwrap(), WizardStep::SelectOptions);
        assert_eq!(wizard.input(), &snapshot);
    }

    #[test]
    fn test_area_step_always_advances() {
        let mut wizard = EstimateWizard::new();
        wizard.select_category(BusinessCategory::Cafe);
        wizard.next().unwrap();
        assert_eq!(wizard.input().area.get(), AreaUnits::DEFAULT);
        assert_eq!(wizard.next().unwrap(), WizardStep::SelectOptions);
    }

    #[test]
    fn test_invalid_area_keeps_previous_value() {
        let mut wizard = EstimateWizard::new();
        wizard.set_area_units(40).unwrap();
        assert!(wizard.set_area_units(7).is_err());
        assert!(wizard.set_area_units(210).is_err());
        assert_eq!(wizard.input().area.get(), 40);
    }

    #[test]
    fn test_summary_tracks_every_change() {
        let mut wizard = EstimateWizard::new();
        assert_eq!(wizard.summary().estimate, None);

        wizard.select_category(BusinessCategory::Cafe);
        assert_eq!(
            wizard.summary().estimate,
            Some(EstimateResult { low: 5400, high: 7020 })
        );

        wizard.set_option(EstimateOption::Flooring, true);
        let summary = wizard.summary();
        assert_eq!(summary.estimate, Some(EstimateResult { low: 6300, high: 8190 }));
        assert_eq!(summary.options, vec!["바닥재 시공"]);
        assert_eq!(summary.category, Some("카페"));
        assert_eq!(summary.step, WizardStep::SelectCategory);
    }

    #[test]
    fn test_contact_form_does_not_move_steps() {
        let mut wizard = EstimateWizard::new();
        assert!(wizard.open_contact().is_err());

        wizard.select_category(BusinessCategory::Office);
        wizard.next().unwrap();
        wizard.next().unwrap();

        wizard.open_contact().unwrap().name = "김철수".to_string();
        assert!(wizard.is_contact_open());
        assert_eq!(wizard.step(), WizardStep::SelectOptions);

        wizard.cancel_contact();
        assert!(!wizard.is_contact_open());
        assert_eq!(wizard.step(), WizardStep::SelectOptions);

        // reopened form starts empty
        assert_eq!(wizard.open_contact().unwrap(), &ContactInfo::default());
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_form_for_retry() {
        let backend = InMemoryBackend::new();
        let mut wizard = EstimateWizard::new();
        wizard.select_category(BusinessCategory::Restaurant);
        wizard.next().unwrap();
        wizard.set_area_units(45).unwrap();
        wizard.next().unwrap();
        wizard.set_option(EstimateOption::Hvac, true);

        let filled = ContactInfo {
            name: "한지민".to_string(),
            phone: "010-2222-3333".to_string(),
            email: "jimin@example.com".to_string(),
            message: "주방 설비 포함 견적 요청".to_string(),
        };
        *wizard.open_contact().unwrap() = filled.clone();
        let input_before = wizard.input().clone();

        backend.set_unavailable(true);
        let err = wizard.submit(&backend).await.unwrap_err();
        assert!(matches!(err, SiteError::PersistenceFailure { .. }));
        assert!(wizard.is_contact_open());
        assert_eq!(wizard.step(), WizardStep::SelectOptions);
        assert_eq!(wizard.contact_mut().unwrap(), &filled);
        assert_eq!(wizard.input(), &input_before);

        backend.set_unavailable(false);
        let lead = wizard.submit(&backend).await.unwrap();
        assert_eq!(lead.client_name, "한지민");
        assert_eq!(lead.area, "45평");
        assert!(!wizard.is_contact_open());
        assert_eq!(backend.lead_count().await, 1);
    }
}
