use crate::error::ApiError;
use crate::filters::JobType;
use crate::validation::{to_payload, ValidationIssue};

/// Body shared by create and update; every field is required.
#[derive(serde::Deserialize)]
pub struct JobPayload {
    pub title: String,
    #[serde(alias = "companyName")]
    pub company_name: String,
    pub description: String,
    pub location: String,
    #[serde(alias = "jobType")]
    pub job_type: String,
}

/// Trimmed and type-checked job fields, ready to persist.
pub struct ValidatedJob {
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
}

impl JobPayload {
    pub fn validate(self) -> Result<ValidatedJob, ApiError> {
        let mut issues: Vec<ValidationIssue> = Vec::new();

        let title = self.title.trim().to_string();
        let company_name = self.company_name.trim().to_string();
        let description = self.description.trim().to_string();
        let location = self.location.trim().to_string();

        for (field, value) in [
            ("title", &title),
            ("company_name", &company_name),
            ("description", &description),
            ("location", &location),
        ] {
            if value.is_empty() {
                issues.push(ValidationIssue::new(
                    field,
                    "required",
                    format!("{field} is required"),
                ));
            }
        }

        let job_type = match self.job_type.trim().parse::<JobType>() {
            Ok(jt) => Some(jt),
            Err(e) => {
                issues.push(ValidationIssue::new("job_type", "invalid", e.to_string()));
                None
            }
        };

        if !issues.is_empty() {
            return Err(ApiError::Validation(to_payload(&issues)));
        }

        Ok(ValidatedJob {
            title,
            company_name,
            description,
            location,
            // issues is empty, so the parse above succeeded
            job_type: job_type.expect("job_type parsed"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_and_type_checks() {
        let payload = JobPayload {
            title: "  Backend Engineer ".into(),
            company_name: "Acme".into(),
            description: "Build services".into(),
            location: "NY".into(),
            job_type: "Full-Time".into(),
        };
        let job = payload.validate().expect("valid");
        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.job_type, JobType::FullTime);
    }

    #[test]
    fn validate_rejects_blank_fields_and_bad_type() {
        let payload = JobPayload {
            title: "   ".into(),
            company_name: "Acme".into(),
            description: "d".into(),
            location: "NY".into(),
            job_type: "Internship".into(),
        };
        assert!(payload.validate().is_err());
    }
}
