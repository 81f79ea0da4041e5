use serde::{Deserialize, Serialize};
use milton_shared::Masked;
use crate::{CoreError, CoreResult, FieldErrors};

const MAX_NAME_LEN: usize = 64;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PHONE_LEN: usize = 6;
const MAX_PHONE_LEN: usize = 20;

/// Raw checkout form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Validated customer contact written onto a submitted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub first_name: String,
    pub surname: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

impl CheckoutForm {
    /// Names of the fields the form expects, in display order.
    pub const FIELDS: [&'static str; 4] = ["firstname", "surname", "email", "phone"];

    pub fn validate(&self) -> CoreResult<ContactDetails> {
        let mut errors = FieldErrors::default();

        let firstname = self.firstname.trim();
        let surname = self.surname.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();

        for (field, value) in [("firstname", firstname), ("surname", surname)] {
            if require_non_empty(value, field, &mut errors) {
                require_max_length(value, MAX_NAME_LEN, field, &mut errors);
            }
        }

        if require_non_empty(email, "email", &mut errors)
            && (email.len() > MAX_EMAIL_LEN || !looks_like_email(email))
        {
            errors.push("email", "Invalid email address");
        }

        if require_non_empty(phone, "phone", &mut errors) && !looks_like_phone(phone) {
            errors.push("phone", "Invalid phone number");
        }

        if !errors.is_empty() {
            return Err(CoreError::Validation(errors));
        }

        Ok(ContactDetails {
            first_name: firstname.to_string(),
            surname: surname.to_string(),
            email: Masked(email.to_string()),
            phone: Masked(phone.to_string()),
        })
    }
}

/// Records a "required" error for an empty value. Returns whether the value is present.
fn require_non_empty(value: &str, field: &'static str, errors: &mut FieldErrors) -> bool {
    if value.is_empty() {
        errors.push(field, "This field is required");
        return false;
    }
    true
}

fn require_max_length(
    value: &str,
    max: usize,
    field: &'static str,
    errors: &mut FieldErrors,
) -> bool {
    if value.chars().count() > max {
        errors.push(field, format!("Must be at most {} characters", max));
        return false;
    }
    true
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

fn looks_like_phone(value: &str) -> bool {
    if !(MIN_PHONE_LEN..=MAX_PHONE_LEN).contains(&value.len()) {
        return false;
    }
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    let digits = value.chars().filter(char::is_ascii_digit).count();
    allowed && digits >= 6
}
