//! Signup field validation, shared by password signup and bridge sync.

use crate::error::{FieldErrors, Result};
use crate::models::*;
use validator::ValidateEmail;

pub const DEFAULT_SPECIALIZATION: &str = "General Medicine";

/// Canonical email form: trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate the identity part of a signup and build the initial profile.
///
/// `password` carries the candidate password and the configured minimum
/// length; bridge-provisioned accounts pass `None`. All problems are
/// collected before returning.
pub fn validate_identity(
    email: &str,
    role: Role,
    fields: &ProfileFields,
    password: Option<(&str, usize)>,
) -> Result<(String, Profile)> {
    let mut errors = FieldErrors::new();
    let email = normalize_email(email);

    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !email.validate_email() {
        errors.add("email", "Email address is not valid");
    }

    if let Some((password, min_length)) = password {
        if password.chars().count() < min_length {
            errors.add(
                "password",
                format!("Password must be at least {} characters long", min_length),
            );
        }
    }

    let full_name = fields.full_name.trim();
    if full_name.is_empty() {
        errors.add("full_name", "Full name is required");
    }

    let profile = match role {
        Role::Patient => Some(Profile::Patient(PatientProfile {
            full_name: full_name.to_string(),
            date_of_birth: fields.date_of_birth,
            gender: optional(&fields.gender),
            phone: optional(&fields.phone),
            address: optional(&fields.address),
        })),
        Role::Doctor => {
            let license_number = required(&mut errors, "license_number", &fields.license_number);
            let medical_council = required(&mut errors, "medical_council", &fields.medical_council);
            let specialization = optional(&fields.specialization)
                .unwrap_or_else(|| DEFAULT_SPECIALIZATION.to_string());

            Some(Profile::Doctor(DoctorProfile {
                full_name: full_name.to_string(),
                specialization,
                license_number: license_number.to_uppercase(),
                medical_council,
                verification_status: VerificationStatus::Pending,
                verification_document: None,
                verified_at: None,
                verified_by: None,
            }))
        }
        Role::Staff => {
            let organization_id = required(&mut errors, "organization_id", &fields.organization_id);
            let employee_id = required(&mut errors, "employee_id", &fields.employee_id);
            let department = required(&mut errors, "department", &fields.department);

            Some(Profile::Staff(StaffProfile {
                full_name: full_name.to_string(),
                organization_id,
                employee_id,
                department,
                verification_status: VerificationStatus::Pending,
                verification_document: None,
                verified_at: None,
                verified_by: None,
            }))
        }
        Role::Admin => {
            errors.add("role", "Role must be one of: patient, doctor, staff");
            None
        }
    };

    errors.into_result()?;
    match profile {
        Some(profile) => Ok((email, profile)),
        None => Err(crate::error::IdentityError::validation("role", "Unsupported role")),
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(errors: &mut FieldErrors, field: &str, value: &Option<String>) -> String {
    match optional(value) {
        Some(value) => value,
        None => {
            errors.add(field, format!("{} is required for this role", field));
            String::new()
        }
    }
}
