use crate::domain::model::{ContactInfo, EstimateInput, EstimateResult, Lead, NewLead};
use crate::domain::ports::LeadRepository;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::require_filled;

/// Checks run before anything is sent to the lead store.
pub fn validate_request(contact: &ContactInfo, input: &EstimateInput) -> Result<()> {
    require_filled("name", &contact.name)?;
    require_filled("phone", &contact.phone)?;
    require_filled("email", &contact.email)?;
    if input.category.is_none() {
        return Err(SiteError::MissingCategory);
    }
    Ok(())
}

/// Turns a filled contact form plus the wizard state into a persisted lead.
///
/// Exactly one `create_lead` call is made, and only after validation passes.
/// Collaborator failures surface as `PersistenceFailure`; callers keep their
/// own state so the user can retry.
pub async fn submit<R>(
    repository: &R,
    contact: &ContactInfo,
    input: &EstimateInput,
    result: EstimateResult,
) -> Result<Lead>
where
    R: LeadRepository + ?Sized,
{
    validate_request(contact, input)?;
    let category = input.category.ok_or(SiteError::MissingCategory)?;

    let new_lead = NewLead {
        client_name: contact.name.trim().to_string(),
        phone: contact.phone.trim().to_string(),
        email: contact.email.trim().to_string(),
        message: contact.message.clone(),
        business_type: category.label().to_string(),
        area: input.area.get(),
        estimate_min: result.low,
        estimate_max: result.high,
    };

    tracing::debug!(
        "Submitting lead: {} / {} / {}",
        new_lead.business_type,
        new_lead.formatted_area(),
        new_lead.formatted_budget()
    );

    match repository.create_lead(new_lead).await {
        Ok(lead) => {
            tracing::info!("✅ Lead #{} created ({})", lead.id, lead.business_type);
            Ok(lead)
        }
        Err(e) => {
            tracing::warn!("❌ Lead submission failed: {}", e);
            Err(match e {
                err @ SiteError::PersistenceFailure { .. } => err,
                other => SiteError::persistence("create_lead", other.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AreaUnits, BusinessCategory, EstimateOption, LeadStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLeads {
        calls: Mutex<Vec<NewLead>>,
        fail: bool,
    }

    #[async_trait]
    impl LeadRepository for RecordingLeads {
        async fn fetch_leads(&self) -> Result<Vec<Lead>> {
            Ok(Vec::new())
        }

        async fn create_lead(&self, lead: NewLead) -> Result<Lead> {
            self.calls.lock().unwrap().push(lead.clone());
            if self.fail {
                return Err(SiteError::persistence("create_lead", "backend unavailable"));
            }
            Ok(Lead {
                id: 1,
                client_name: lead.client_name.clone(),
                phone: lead.phone.clone(),
                email: lead.email.clone(),
                message: lead.message.clone(),
                business_type: lead.business_type.clone(),
                area: lead.formatted_area(),
                budget: lead.formatted_budget(),
                estimate_min: Some(lead.estimate_min),
                estimate_max: Some(lead.estimate_max),
                status: LeadStatus::New,
                created_at: None,
            })
        }

        async fn update_lead_status(&self, _id: i64, _status: LeadStatus) -> Result<()> {
            Ok(())
        }
    }

    fn contact() -> ContactInfo {
        ContactInfo {
            name: "홍길동".to_string(),
            phone: "010-1234-5678".to_string(),
            email: "hong@example.com".to_string(),
            message: "오픈 일정이 빠듯합니다".to_string(),
        }
    }

    fn cafe_input() -> EstimateInput {
        EstimateInput {
            category: Some(BusinessCategory::Cafe),
            area: AreaUnits::new(30).unwrap(),
            options: [EstimateOption::Flooring].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_submit_passes_label_and_bounds() {
        let repo = RecordingLeads::default();
        let result = EstimateResult { low: 6300, high: 8190 };

        let lead = submit(&repo, &contact(), &cafe_input(), result).await.unwrap();

        assert_eq!(lead.business_type, "카페");
        assert_eq!(lead.area, "30평");
        assert_eq!(lead.budget, "6,300만원 ~ 8,190만원");
        let calls = repo.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].area, 30);
        assert_eq!(calls[0].estimate_min, 6300);
        assert_eq!(calls[0].estimate_max, 8190);
    }

    #[tokio::test]
    async fn test_empty_phone_makes_no_backend_call() {
        let repo = RecordingLeads::default();
        let mut info = contact();
        info.phone = String::new();

        let err = submit(&repo, &info, &cafe_input(), EstimateResult::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SiteError::MissingRequiredField { ref field } if field == "phone"));
        assert!(repo.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_name_is_missing() {
        let repo = RecordingLeads::default();
        let mut info = contact();
        info.name = "   ".to_string();

        let err = submit(&repo, &info, &cafe_input(), EstimateResult::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::MissingRequiredField { ref field } if field == "name"));
    }

    #[tokio::test]
    async fn test_missing_category_rejected() {
        let repo = RecordingLeads::default();
        let input = EstimateInput::default();

        let err = submit(&repo, &contact(), &input, EstimateResult::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SiteError::MissingCategory));
        assert!(repo.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_is_persistence_failure() {
        let repo = RecordingLeads {
            fail: true,
            ..Default::default()
        };

        let err = submit(&repo, &contact(), &cafe_input(), EstimateResult::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SiteError::PersistenceFailure { .. }));
        assert_eq!(repo.calls.lock().unwrap().len(), 1);
    }
}
