//! Delivery address entered at checkout.

use serde::{Deserialize, Serialize};

/// Minimum number of characters in a phone number.
pub const PHONE_MIN_LENGTH: usize = 10;

/// Required address fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    City,
    Street,
    House,
    Phone,
}

impl AddressField {
    /// Form label of the field.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::City => "город",
            Self::Street => "улица",
            Self::House => "дом",
            Self::Phone => "телефон",
        }
    }
}

/// Errors that can occur when validating a [`DeliveryAddress`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// One or more required fields are blank.
    #[error("Пожалуйста, заполните все обязательные поля (город, улица, дом, телефон)")]
    MissingFields(Vec<AddressField>),
    /// The phone number has too few characters or characters other than
    /// digits, spaces, `+`, `-` and parentheses.
    #[error("Пожалуйста, введите корректный номер телефона")]
    InvalidPhone,
}

/// A validated delivery address.
///
/// Required parts are non-blank; optional parts are `None` rather than empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub city: String,
    pub street: String,
    pub house: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment: Option<String>,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl DeliveryAddress {
    /// Validate raw form input into an address.
    ///
    /// All inputs are trimmed. Missing required fields are reported before
    /// the phone format is checked.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingFields`] listing every blank required
    /// field, or [`AddressError::InvalidPhone`] for a malformed phone number.
    ///
    /// # Examples
    ///
    /// ```
    /// use wheelhouse_core::DeliveryAddress;
    ///
    /// let address = DeliveryAddress::parse("Тюмень", "Ленина", "15", "", "+7 (912) 345-67-89", "")
    ///     .expect("valid address");
    /// assert_eq!(address.apartment, None);
    ///
    /// assert!(DeliveryAddress::parse("Тюмень", "Ленина", "15", "", "12345", "").is_err());
    /// ```
    pub fn parse(
        city: &str,
        street: &str,
        house: &str,
        apartment: &str,
        phone: &str,
        comment: &str,
    ) -> Result<Self, AddressError> {
        let missing: Vec<AddressField> = [
            (AddressField::City, city),
            (AddressField::Street, street),
            (AddressField::House, house),
            (AddressField::Phone, phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(AddressError::MissingFields(missing));
        }

        let phone = phone.trim();
        if !is_valid_phone(phone) {
            return Err(AddressError::InvalidPhone);
        }

        Ok(Self {
            city: city.trim().to_owned(),
            street: street.trim().to_owned(),
            house: house.trim().to_owned(),
            apartment: non_blank(apartment),
            phone: phone.to_owned(),
            comment: non_blank(comment),
        })
    }

    /// Single-line form, e.g. `Тюмень, Ленина, д. 15, кв. 4`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!("{}, {}, д. {}", self.city, self.street, self.house);
        if let Some(apartment) = &self.apartment {
            out.push_str(", кв. ");
            out.push_str(apartment);
        }
        out
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn is_valid_phone(phone: &str) -> bool {
    phone.chars().count() >= PHONE_MIN_LENGTH
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '(' | ')'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_valid_address() {
        let address = DeliveryAddress::parse(
            " Сургут ",
            "Ленина",
            "15",
            "4",
            "+7 (912) 345-67-89",
            "  ",
        )
        .expect("valid");

        assert_eq!(address.city, "Сургут");
        assert_eq!(address.apartment.as_deref(), Some("4"));
        assert_eq!(address.comment, None);
        assert_eq!(address.summary(), "Сургут, Ленина, д. 15, кв. 4");
    }

    #[test]
    fn test_parse_reports_all_missing_fields() {
        let err = DeliveryAddress::parse("", "Ленина", " ", "", "", "").expect_err("missing");
        assert_eq!(
            err,
            AddressError::MissingFields(vec![
                AddressField::City,
                AddressField::House,
                AddressField::Phone
            ])
        );
    }

    #[test]
    fn test_parse_rejects_short_phone() {
        let err = DeliveryAddress::parse("Тюмень", "Ленина", "1", "", "12-34", "").expect_err("short");
        assert_eq!(err, AddressError::InvalidPhone);
    }

    #[test]
    fn test_parse_rejects_letters_in_phone() {
        let err = DeliveryAddress::parse("Тюмень", "Ленина", "1", "", "8912abc4567", "")
            .expect_err("letters");
        assert_eq!(err, AddressError::InvalidPhone);
    }

    #[test]
    fn test_optional_fields_skipped_in_json() {
        let address =
            DeliveryAddress::parse("Тюмень", "Ленина", "1", "", "89123456789", "").expect("valid");
        let json = serde_json::to_value(&address).expect("serialize");
        assert!(json.get("apartment").is_none());
        assert!(json.get("comment").is_none());
    }
}
